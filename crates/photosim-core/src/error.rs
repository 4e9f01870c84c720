//! Error types for the `photosim-core` crate.
//!
//! Invalid state transitions are not errors: they are reported as
//! [`DayOutcome::Ignored`](crate::day_cycle::DayOutcome::Ignored) or a
//! `false` return. Errors here are bad input from the host or arithmetic
//! that would leave the glucose totals meaningless.

use photosim_feedback::FeedbackConfigError;
use photosim_trials::TrialError;
use photosim_types::{LightLevel, LightOptionCount};

use crate::config::ConfigError;

/// Errors raised by the day-cycle state machine.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The requested light level is not a position of the configured switch.
    #[error("light level {level} is not available on the {options:?} light switch")]
    UnsupportedLight {
        /// The requested level.
        level: LightLevel,
        /// The configured switch.
        options: LightOptionCount,
    },

    /// The water control is hidden, so water changes are refused.
    #[error("water control is disabled")]
    WaterDisabled,

    /// Speed ratio outside `(0, 1]`.
    #[error("speed ratio must be in (0, 1], got {ratio}")]
    InvalidSpeedRatio {
        /// The rejected ratio.
        ratio: f64,
    },

    /// A glucose total or the day counter would overflow.
    #[error("arithmetic overflow while {operation}")]
    Overflow {
        /// What was being computed.
        operation: &'static str,
    },

    /// The trial store rejected a day point.
    #[error("trial store error: {source}")]
    Trial {
        /// The underlying trial store error.
        #[from]
        source: TrialError,
    },
}

/// Errors surfaced by the [`Session`](crate::session::Session) facade.
///
/// Each variant wraps a subsystem error so the host can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The feedback configuration is invalid.
    #[error("feedback config error: {source}")]
    Feedback {
        /// The underlying feedback config error.
        #[from]
        source: FeedbackConfigError,
    },

    /// The day cycle rejected an operation.
    #[error("day cycle error: {source}")]
    Cycle {
        /// The underlying day-cycle error.
        #[from]
        source: CycleError,
    },
}
