//! The feedback classifier: folds completed trials and picks a message.
//!
//! Each policy is an ordered rule list; the first rule that fires wins. The
//! default policy is additionally gated by a minimum trial count and a
//! cooldown measured in trials since the last message.

use photosim_types::Trial;
use tracing::{debug, info};

use crate::error::FeedbackConfigError;
use crate::messages::{FeedbackMessage, MessageId};
use crate::policy::{FeedbackConfig, FeedbackPolicy};
use crate::state::PolicyState;
use crate::template::TemplateSet;

/// Chooses feedback for a student from their trial history.
#[derive(Debug, Clone)]
pub struct FeedbackClassifier {
    policy: FeedbackPolicy,
    config: FeedbackConfig,
    templates: TemplateSet,
    state: PolicyState,
}

impl FeedbackClassifier {
    /// Validate `config` and build a classifier with empty state.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackConfigError::Template`] for a malformed template,
    /// [`FeedbackConfigError::MissingTemplate`] when experiment B's template
    /// is not configured, and [`FeedbackConfigError::InvalidSetting`] for a
    /// zero minimum trial count.
    pub fn new(config: &FeedbackConfig) -> Result<Self, FeedbackConfigError> {
        let policy = config.policy();
        let templates = TemplateSet::from_raw(&config.templates)?;

        match policy {
            FeedbackPolicy::Default if config.min_trials_before_feedback == 0 => {
                return Err(FeedbackConfigError::InvalidSetting {
                    reason: "min_trials_before_feedback must be at least 1".to_owned(),
                });
            }
            FeedbackPolicy::ExperimentA if config.experiment_a_min_trials == 0 => {
                return Err(FeedbackConfigError::InvalidSetting {
                    reason: "experiment_a_min_trials must be at least 1".to_owned(),
                });
            }
            FeedbackPolicy::ExperimentB if !templates.contains(&config.experiment_b_template) => {
                return Err(FeedbackConfigError::MissingTemplate {
                    policy: policy.to_string(),
                    template: config.experiment_b_template.clone(),
                });
            }
            _ => {}
        }

        debug!(
            policy = %policy,
            templates = templates.len(),
            "Feedback classifier configured"
        );

        Ok(Self {
            policy,
            config: config.clone(),
            templates,
            state: PolicyState::new(),
        })
    }

    /// The active policy.
    pub const fn policy(&self) -> FeedbackPolicy {
        self.policy
    }

    /// The cumulative state folded so far.
    pub const fn state(&self) -> &PolicyState {
        &self.state
    }

    /// The validated templates.
    pub const fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Fold any new trials and select a message, if one is due.
    ///
    /// `trials` is the list of completed trials, oldest first. When a
    /// message is selected the cooldown marker is set to the trial count.
    pub fn classify(&mut self, trials: &[Trial]) -> Option<FeedbackMessage> {
        if self.policy == FeedbackPolicy::None {
            return None;
        }
        self.state.fold(trials, &self.templates);

        let num_trials = trials.len();
        let id = match self.policy {
            FeedbackPolicy::None => None,
            FeedbackPolicy::Default => self.default_rules(num_trials),
            FeedbackPolicy::ExperimentA => self.experiment_a_rules(num_trials),
            FeedbackPolicy::ExperimentB => self.experiment_b_rules(num_trials),
        }?;

        self.state.last_feedback_shown_at_trial_count = Some(num_trials);
        info!(
            policy = %self.policy,
            message = ?id,
            trials = num_trials,
            total_days = self.state.total_days_simulated,
            "Feedback selected"
        );
        Some(FeedbackMessage::new(id, num_trials))
    }

    fn cooldown_elapsed(&self, num_trials: usize) -> bool {
        match self.state.last_feedback_shown_at_trial_count {
            None => true,
            Some(last) => num_trials
                .checked_sub(1)
                .and_then(|prior| prior.checked_sub(last))
                .is_some_and(|gap| gap >= self.config.interval_between_feedback_trials),
        }
    }

    fn default_rules(&self, num_trials: usize) -> Option<MessageId> {
        if num_trials < self.config.min_trials_before_feedback || !self.cooldown_elapsed(num_trials)
        {
            return None;
        }
        let state = &self.state;
        if !state.trial_with_light_off_occurred {
            Some(MessageId::TryLightOff)
        } else if state.longest_trial_active_duration_ms < self.config.short_trial_cutoff_ms {
            Some(MessageId::TrialsTooShort)
        } else if !state.plant_has_ever_died {
            Some(MessageId::TryPlantDeath)
        } else if state.total_days_simulated > self.config.days_run_cutoff {
            Some(MessageId::MoveOn)
        } else {
            None
        }
    }

    fn experiment_a_rules(&self, num_trials: usize) -> Option<MessageId> {
        if num_trials < self.config.experiment_a_min_trials {
            return None;
        }
        if !self.state.trial_with_light_off_occurred {
            Some(MessageId::TryLightOff)
        } else if self.state.total_days_simulated > self.config.days_run_cutoff {
            Some(MessageId::MoveOnOrAskTeacher)
        } else {
            None
        }
    }

    fn experiment_b_rules(&self, num_trials: usize) -> Option<MessageId> {
        if self.state.total_days_simulated < self.config.experiment_b_min_days {
            return None;
        }
        match self.state.first_match(&self.config.experiment_b_template) {
            None => Some(MessageId::TryFourWeeksOnThenOff),
            Some(first) if num_trials > first.saturating_add(1) => {
                Some(MessageId::MoveOnOrAskTeacher)
            }
            Some(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use photosim_types::{Event, EventKind, LightLevel, ResourceTotals, SeriesPoint};

    use super::*;

    /// A trial built from per-day created deltas, 2 glucose used per day.
    fn trial(deltas: &[i64], events: &[(EventKind, i64)]) -> Trial {
        let mut trial = Trial::new(0, ResourceTotals::default(), LightLevel::Full);
        let (mut created, mut used) = (0_i64, 0_i64);
        for (offset, delta) in deltas.iter().enumerate() {
            let day = u32::try_from(offset).unwrap() + 1;
            created += delta;
            used += 2;
            trial.created.push(SeriesPoint { day, value: created });
            trial.used.push(SeriesPoint { day, value: used });
            trial.stored.push(SeriesPoint {
                day,
                value: created - used,
            });
        }
        trial.events = events
            .iter()
            .map(|(kind, ts)| Event::new(kind.clone(), *ts))
            .collect();
        trial
    }

    fn short_run() -> Trial {
        trial(
            &[4],
            &[
                (EventKind::StartButtonClicked, 0),
                (EventKind::ResetButtonClicked, 500),
            ],
        )
    }

    fn with_policy(policy: &str) -> FeedbackClassifier {
        FeedbackClassifier::new(&FeedbackConfig {
            policy: Some(policy.to_owned()),
            ..FeedbackConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn none_policy_never_folds() {
        let mut classifier = FeedbackClassifier::new(&FeedbackConfig::default()).unwrap();
        let trials = vec![short_run(), short_run(), short_run()];
        assert!(classifier.classify(&trials).is_none());
        assert_eq!(classifier.state().next_trial_to_fold(), 0);
    }

    #[test]
    fn default_policy_cooldown() {
        let mut classifier = with_policy("default");
        let mut trials = vec![short_run()];
        assert!(classifier.classify(&trials).is_none());

        trials.push(short_run());
        let shown = classifier.classify(&trials).unwrap();
        assert_eq!(shown.id, MessageId::TryLightOff);
        assert_eq!(shown.trial_count, 2);

        trials.push(short_run());
        assert!(classifier.classify(&trials).is_none());
        trials.push(short_run());
        assert!(classifier.classify(&trials).is_none());
        trials.push(short_run());
        assert!(classifier.classify(&trials).is_some());
        assert_eq!(
            classifier.state().last_feedback_shown_at_trial_count,
            Some(5)
        );
    }

    #[test]
    fn default_policy_rule_order() {
        let light_off_short = trial(
            &[0],
            &[
                (EventKind::StartButtonClicked, 0),
                (EventKind::TurnLightOffButtonClicked, 100),
                (EventKind::PauseButtonClicked, 1_000),
            ],
        );
        let mut classifier = with_policy("default");
        let msg = classifier
            .classify(&[light_off_short.clone(), short_run()])
            .unwrap();
        assert_eq!(msg.id, MessageId::TrialsTooShort);

        let long_run = trial(
            &[4, 4, 4],
            &[
                (EventKind::StartButtonClicked, 0),
                (EventKind::PauseButtonClicked, 12_000),
            ],
        );
        let mut classifier = with_policy("default");
        let msg = classifier
            .classify(&[light_off_short, long_run])
            .unwrap();
        assert_eq!(msg.id, MessageId::TryPlantDeath);
    }

    #[test]
    fn default_policy_move_on_and_silence() {
        let died = trial(
            &[0],
            &[
                (EventKind::StartButtonClicked, 0),
                (EventKind::TurnLightOffButtonClicked, 10),
                (EventKind::PlantDied, 4_000),
            ],
        );
        let long = trial(&[4; 20], &[(EventKind::StartButtonClicked, 0)]);

        let mut quiet = with_policy("default");
        assert!(quiet.classify(&[died.clone(), long.clone()]).is_none());

        let mut many_days = with_policy("default");
        let trials = vec![died, long.clone(), long.clone(), long];
        assert_eq!(many_days.state().total_days_simulated, 0);
        let msg = many_days.classify(&trials).unwrap();
        assert_eq!(msg.id, MessageId::MoveOn);
    }

    #[test]
    fn experiment_a_rules() {
        let mut classifier = with_policy("experimentA");
        assert!(classifier.classify(&[short_run()]).is_none());
        let msg = classifier.classify(&[short_run(), short_run()]).unwrap();
        assert_eq!(msg.id, MessageId::TryLightOff);

        let dark = trial(
            &[0],
            &[
                (EventKind::TurnLightOffButtonClicked, 0),
                (EventKind::StartButtonClicked, 10),
            ],
        );
        let long = trial(&[4; 20], &[]);
        let mut classifier = with_policy("experiment-a");
        let msg = classifier
            .classify(&[dark, long.clone(), long.clone(), long])
            .unwrap();
        assert_eq!(msg.id, MessageId::MoveOnOrAskTeacher);
    }

    #[test]
    fn experiment_b_rules() {
        let mut four_on = vec![4_i64; 4];
        four_on.extend(std::iter::repeat_n(0, 16));
        let matching = trial(&four_on, &[]);
        let other = trial(&[4, 4, 4, 4, 4, 4], &[]);

        let mut classifier = with_policy("experimentB");
        assert!(classifier.classify(&[trial(&[4, 4], &[])]).is_none());

        let mut history = vec![trial(&[4, 4], &[]), other];
        let msg = classifier.classify(&history).unwrap();
        assert_eq!(msg.id, MessageId::TryFourWeeksOnThenOff);

        history.push(matching);
        assert!(classifier.classify(&history).is_none());
        assert_eq!(classifier.state().first_match("fourWeeksOn"), Some(2));

        history.push(trial(&[4], &[]));
        let msg = classifier.classify(&history).unwrap();
        assert_eq!(msg.id, MessageId::MoveOnOrAskTeacher);
    }

    #[test]
    fn experiment_b_requires_its_template() {
        let config = FeedbackConfig {
            policy: Some("experimentB".to_owned()),
            experiment_b_template: "missing".to_owned(),
            ..FeedbackConfig::default()
        };
        let err = FeedbackClassifier::new(&config).unwrap_err();
        assert!(matches!(err, FeedbackConfigError::MissingTemplate { .. }));
    }

    #[test]
    fn malformed_template_fails_at_construction() {
        let mut config = FeedbackConfig::default();
        config.templates.insert("broken".to_owned(), vec![-1, 1]);
        let err = FeedbackClassifier::new(&config).unwrap_err();
        assert!(matches!(err, FeedbackConfigError::Template { .. }));
    }
}
