//! Day-cycle engine for the photosynthesis simulation.
//!
//! A trial runs for a configured number of simulated days. Each day the
//! [`DayCycle`] applies any buffered light/water changes, books the day's
//! glucose into the [`GlucoseLedger`], records the totals on the current
//! trial, and decides whether the plant died or the trial ran out of days.
//! The [`Session`] facade wraps the cycle with its collaborators: a
//! [`Renderer`] for drawing, a [`TrialSink`] for persistence, and the
//! feedback classifier.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `photosim-config.yaml`.
//! - [`day_cycle`] -- [`DayCycle`], the Stopped/Running/Paused/Ended machine.
//! - [`light`] -- [`Switches`] with deferred light and water changes.
//! - [`resource`] -- [`GlucoseLedger`] and the conservation check.
//! - [`phases`] -- Sub-day animation phases and [`SpeedRatio`].
//! - [`render`] -- The [`Renderer`] seam and plot band colours.
//! - [`session`] -- [`Session`], the facade a host drives.
//! - [`error`] -- [`CycleError`] and [`SessionError`].
//!
//! [`TrialSink`]: photosim_trials::TrialSink

pub mod config;
pub mod day_cycle;
pub mod error;
pub mod light;
pub mod phases;
pub mod render;
pub mod resource;
pub mod session;

pub use config::{ConfigError, SimulationConfig};
pub use day_cycle::{Control, DayCycle, DayOutcome};
pub use error::{CycleError, SessionError};
pub use light::{SwitchChange, Switches};
pub use phases::{Phase, PhaseKind, PhasePlan, SpeedRatio};
pub use render::{BandColor, NullRenderer, RecordingRenderer, RenderCall, Renderer};
pub use resource::{ConservationResult, GlucoseLedger, verify_trial_conservation};
pub use session::Session;
