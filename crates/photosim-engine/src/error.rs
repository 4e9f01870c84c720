//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and of a scripted
//! run, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: photosim_core::ConfigError,
    },

    /// The session rejected its configuration or a control request.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: photosim_core::SessionError,
    },

    /// The trial log could not be opened.
    #[error("trial log error: {source}")]
    TrialLog {
        /// The underlying trial store error.
        #[from]
        source: photosim_trials::TrialError,
    },

    /// The scenario file could not be read or parsed.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario failure.
        message: String,
    },
}
