//! Cumulative feedback state folded from completed trials.
//!
//! Every completed trial is folded exactly once. The watermark
//! `next_trial_to_fold` records how far the fold has progressed, so the
//! classifier may be handed the same trial list any number of times.

use std::collections::BTreeMap;

use photosim_types::Trial;
use serde::Serialize;
use tracing::debug;

use crate::features::TrialFeatures;
use crate::template::TemplateSet;

/// Aggregated behaviour across every folded trial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyState {
    /// Any trial ran with the light off.
    pub trial_with_light_off_occurred: bool,
    /// Longest active (unpaused) running time of any single trial.
    pub longest_trial_active_duration_ms: u64,
    /// Days simulated, summed over all trials.
    pub total_days_simulated: u64,
    /// The plant died in at least one trial.
    pub plant_has_ever_died: bool,
    /// Trial count at which the last message was shown, if any.
    pub last_feedback_shown_at_trial_count: Option<usize>,
    /// Trial indices matching each template, in fold order.
    pub template_matches: BTreeMap<String, Vec<usize>>,
    /// Index of the next trial that has not been folded yet.
    next_trial_to_fold: usize,
}

impl PolicyState {
    /// Fresh state with nothing folded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next trial that has not been folded yet.
    pub const fn next_trial_to_fold(&self) -> usize {
        self.next_trial_to_fold
    }

    /// Fold every not-yet-seen trial in `trials` and return how many were
    /// folded.
    ///
    /// `trials` must be the same growing list on every call; trials before
    /// the watermark are skipped.
    pub fn fold(&mut self, trials: &[Trial], templates: &TemplateSet) -> usize {
        let mut folded: usize = 0;
        for (index, trial) in trials.iter().enumerate().skip(self.next_trial_to_fold) {
            self.fold_one(index, trial, templates);
            folded = folded.saturating_add(1);
        }
        self.next_trial_to_fold = self.next_trial_to_fold.max(trials.len());
        folded
    }

    fn fold_one(&mut self, index: usize, trial: &Trial, templates: &TemplateSet) {
        let features = TrialFeatures::extract(trial);
        self.trial_with_light_off_occurred |= features.includes_light_off;
        self.longest_trial_active_duration_ms = self
            .longest_trial_active_duration_ms
            .max(features.active_duration_ms);
        self.total_days_simulated = self
            .total_days_simulated
            .saturating_add(u64::from(features.days_simulated));
        self.plant_has_ever_died |= features.died;

        for name in templates.matching(trial) {
            self.template_matches
                .entry(name.to_owned())
                .or_default()
                .push(index);
        }

        debug!(
            trial = index,
            active_ms = features.active_duration_ms,
            light_off = features.includes_light_off,
            died = features.died,
            days = features.days_simulated,
            "Trial folded into feedback state"
        );
    }

    /// Index of the first trial that matched `template`, if any.
    pub fn first_match(&self, template: &str) -> Option<usize> {
        self.template_matches
            .get(template)
            .and_then(|indices| indices.first().copied())
    }
}
