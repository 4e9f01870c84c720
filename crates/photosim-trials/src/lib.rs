//! Event log, trial store, and persistence seam for the photosynthesis
//! simulation.
//!
//! Every student action and every terminal condition becomes an immutable,
//! timestamped [`Event`] in the current trial's log. The log is the source
//! of truth for the feedback classifier, which replays it to reconstruct
//! how long the simulation actually ran and what the student tried.
//!
//! # Modules
//!
//! - [`recorder`] -- [`TrialRecorder`]: the append-only trial store.
//! - [`time`] -- [`TimeSource`] and its system/manual implementations.
//! - [`sink`] -- [`TrialSink`]: fire-and-forget persistence of finished trials.
//! - [`error`] -- [`TrialError`].
//!
//! [`Event`]: photosim_types::Event

pub mod error;
pub mod recorder;
pub mod sink;
pub mod time;

pub use error::TrialError;
pub use recorder::TrialRecorder;
pub use sink::{JsonLinesSink, MemorySink, NullSink, TrialRecord, TrialSink};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
