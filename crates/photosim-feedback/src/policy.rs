//! Feedback policies and their configuration.
//!
//! A policy is the rule set that turns cumulative [`PolicyState`] into a
//! message. The configuration mirrors the `feedback` section of
//! `photosim-config.yaml`; every field has a default matching the
//! classroom deployment.
//!
//! [`PolicyState`]: crate::state::PolicyState

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::template::TEMPLATE_LEN;

/// Which rule set selects feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackPolicy {
    /// Feedback is disabled.
    None,
    /// The default heuristic policy with minimum-trial and cooldown gates.
    Default,
    /// Experiment A: light-off nudge, then "move on" after many days.
    ExperimentA,
    /// Experiment B: template-driven nudge towards a four-days-on run.
    ExperimentB,
}

impl FeedbackPolicy {
    /// Interpret the configured policy name.
    ///
    /// `None`, `"none"` and the empty string disable feedback. The
    /// experiment names are matched case-insensitively; any other string
    /// selects the default heuristic policy.
    pub fn from_name(name: Option<&str>) -> Self {
        let Some(name) = name.map(str::trim) else {
            return Self::None;
        };
        match name.to_ascii_lowercase().as_str() {
            "" | "none" => Self::None,
            "experimenta" | "experiment-a" | "experiment_a" => Self::ExperimentA,
            "experimentb" | "experiment-b" | "experiment_b" => Self::ExperimentB,
            _ => Self::Default,
        }
    }

    /// Canonical name, used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Default => "default",
            Self::ExperimentA => "experimentA",
            Self::ExperimentB => "experimentB",
        }
    }
}

impl core::fmt::Display for FeedbackPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Feedback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackConfig {
    /// Policy name; `null` disables feedback.
    #[serde(default, alias = "feedbackPolicy")]
    pub policy: Option<String>,

    /// Default policy: completed trials required before any feedback.
    #[serde(default = "default_min_trials_before_feedback", alias = "minTrialsBeforeFeedback")]
    pub min_trials_before_feedback: usize,

    /// Default policy: trials that must pass between two messages.
    #[serde(
        default = "default_interval_between_feedback_trials",
        alias = "intervalBetweenFeedbackTrials"
    )]
    pub interval_between_feedback_trials: usize,

    /// Default policy: a longest run shorter than this is "too short".
    #[serde(default = "default_short_trial_cutoff_ms", alias = "shortTrialCutoffMs")]
    pub short_trial_cutoff_ms: u64,

    /// Default policy and experiment A: total days after which the student
    /// is told to move on.
    #[serde(default = "default_days_run_cutoff", alias = "daysRunCutoff")]
    pub days_run_cutoff: u64,

    /// Experiment A: completed trials required before any feedback.
    #[serde(default = "default_experiment_a_min_trials", alias = "experimentAMinTrials")]
    pub experiment_a_min_trials: usize,

    /// Experiment B: total simulated days required before any feedback.
    #[serde(default = "default_experiment_b_min_days", alias = "experimentBMinDays")]
    pub experiment_b_min_days: u64,

    /// Experiment B: the template the student is nudged towards.
    #[serde(default = "default_experiment_b_template", alias = "experimentBTemplate")]
    pub experiment_b_template: String,

    /// Behaviour templates, `name -> 21 codes`.
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<String, Vec<i8>>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            policy: None,
            min_trials_before_feedback: default_min_trials_before_feedback(),
            interval_between_feedback_trials: default_interval_between_feedback_trials(),
            short_trial_cutoff_ms: default_short_trial_cutoff_ms(),
            days_run_cutoff: default_days_run_cutoff(),
            experiment_a_min_trials: default_experiment_a_min_trials(),
            experiment_b_min_days: default_experiment_b_min_days(),
            experiment_b_template: default_experiment_b_template(),
            templates: default_templates(),
        }
    }
}

impl FeedbackConfig {
    /// The configured policy.
    pub fn policy(&self) -> FeedbackPolicy {
        FeedbackPolicy::from_name(self.policy.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_min_trials_before_feedback() -> usize {
    2
}

const fn default_interval_between_feedback_trials() -> usize {
    2
}

const fn default_short_trial_cutoff_ms() -> u64 {
    2_000
}

const fn default_days_run_cutoff() -> u64 {
    60
}

const fn default_experiment_a_min_trials() -> usize {
    2
}

const fn default_experiment_b_min_days() -> u64 {
    6
}

fn default_experiment_b_template() -> String {
    "fourWeeksOn".to_owned()
}

/// Built-in templates: four lit days then darkness, and lit every day.
fn default_templates() -> BTreeMap<String, Vec<i8>> {
    let mut four_weeks_on = vec![0_i8; TEMPLATE_LEN];
    let mut always_on = vec![1_i8; TEMPLATE_LEN];
    for (day, slot) in four_weeks_on.iter_mut().enumerate() {
        *slot = match day {
            0 => -1,
            1..=4 => 1,
            _ => 0,
        };
    }
    if let Some(first) = always_on.first_mut() {
        *first = -1;
    }

    let mut templates = BTreeMap::new();
    templates.insert("fourWeeksOn".to_owned(), four_weeks_on);
    templates.insert("alwaysOn".to_owned(), always_on);
    templates
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn policy_names() {
        assert_eq!(FeedbackPolicy::from_name(None), FeedbackPolicy::None);
        assert_eq!(FeedbackPolicy::from_name(Some("none")), FeedbackPolicy::None);
        assert_eq!(FeedbackPolicy::from_name(Some("  ")), FeedbackPolicy::None);
        assert_eq!(
            FeedbackPolicy::from_name(Some("experimentA")),
            FeedbackPolicy::ExperimentA
        );
        assert_eq!(
            FeedbackPolicy::from_name(Some("Experiment-B")),
            FeedbackPolicy::ExperimentB
        );
        assert_eq!(
            FeedbackPolicy::from_name(Some("heuristic")),
            FeedbackPolicy::Default
        );
    }

    #[test]
    fn default_templates_are_well_formed() {
        let templates = default_templates();
        let four = &templates["fourWeeksOn"];
        assert_eq!(four.len(), TEMPLATE_LEN);
        assert_eq!(&four[..6], &[-1, 1, 1, 1, 1, 0]);
        assert!(four[5..].iter().all(|&c| c == 0));
        assert_eq!(templates["alwaysOn"][0], -1);
    }

    #[test]
    fn config_parses_with_defaults() {
        let config: FeedbackConfig = serde_yml::from_str("policy: experimentB\n").unwrap();
        assert_eq!(config.policy(), FeedbackPolicy::ExperimentB);
        assert_eq!(config.min_trials_before_feedback, 2);
        assert_eq!(config.experiment_b_template, "fourWeeksOn");
        assert!(config.templates.contains_key("fourWeeksOn"));
    }

    #[test]
    fn null_policy_disables_feedback() {
        let config: FeedbackConfig = serde_yml::from_str("policy: null\n").unwrap();
        assert_eq!(config.policy(), FeedbackPolicy::None);
    }
}
