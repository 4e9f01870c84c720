//! Learning-analytics layer for the photosynthesis simulation.
//!
//! After each trial the host hands the completed trials to a
//! [`FeedbackClassifier`]. The classifier folds every new trial into a
//! cumulative [`PolicyState`] and then walks its policy's rules to decide
//! whether a message is due.
//!
//! # Modules
//!
//! - [`features`] -- per-trial features replayed from the event log.
//! - [`template`] -- day-by-day behaviour templates and the matcher.
//! - [`state`] -- [`PolicyState`] and the idempotent fold.
//! - [`policy`] -- [`FeedbackPolicy`] and [`FeedbackConfig`].
//! - [`messages`] -- the canned [`FeedbackMessage`] table.
//! - [`classifier`] -- [`FeedbackClassifier`], the rule evaluator.
//! - [`error`] -- [`TemplateError`] and [`FeedbackConfigError`].
//!
//! # Usage
//!
//! ```
//! use photosim_feedback::{FeedbackClassifier, FeedbackConfig};
//!
//! let config = FeedbackConfig {
//!     policy: Some("default".to_owned()),
//!     ..FeedbackConfig::default()
//! };
//! let mut classifier = FeedbackClassifier::new(&config).ok();
//! assert!(classifier.as_mut().and_then(|c| c.classify(&[])).is_none());
//! ```

pub mod classifier;
pub mod error;
pub mod features;
pub mod messages;
pub mod policy;
pub mod state;
pub mod template;

pub use classifier::FeedbackClassifier;
pub use error::{FeedbackConfigError, TemplateError};
pub use features::TrialFeatures;
pub use messages::{FeedbackMessage, MessageId};
pub use policy::{FeedbackConfig, FeedbackPolicy};
pub use state::PolicyState;
pub use template::{TEMPLATE_LEN, Template, TemplateSet};
