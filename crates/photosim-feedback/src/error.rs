//! Error types for the `photosim-feedback` crate.
//!
//! Configuration problems are reported when the classifier is built so
//! that a bad template never silently mismatches at runtime.

use photosim_types::InvalidTemplateCode;

/// Errors that can occur when validating a behaviour template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template does not have exactly one slot per day (plus day 0).
    #[error("template {name:?} has {actual} slots, expected {expected}")]
    WrongLength {
        /// Template name.
        name: String,
        /// Required slot count.
        expected: usize,
        /// Slot count found in configuration.
        actual: usize,
    },

    /// A slot holds a code outside `-1..=2`.
    #[error("template {name:?} slot {slot}: {source}")]
    InvalidCode {
        /// Template name.
        name: String,
        /// Offending slot index.
        slot: usize,
        /// The underlying code error.
        source: InvalidTemplateCode,
    },
}

/// Errors that can occur when building a feedback classifier.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackConfigError {
    /// A configured template is malformed.
    #[error("invalid template: {source}")]
    Template {
        /// The underlying template error.
        #[from]
        source: TemplateError,
    },

    /// The selected policy needs a template that is not configured.
    #[error("policy {policy} requires template {template:?}, which is not configured")]
    MissingTemplate {
        /// Policy name.
        policy: String,
        /// Template the policy depends on.
        template: String,
    },

    /// A threshold has an unusable value.
    #[error("invalid feedback setting: {reason}")]
    InvalidSetting {
        /// Explanation of what is wrong.
        reason: String,
    },
}
