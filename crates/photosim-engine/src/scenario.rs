//! Scripted student sessions.
//!
//! A scenario is an ordered list of control actions, loaded from YAML or
//! taken from the built-in classroom script. The runner plays each step
//! against a [`Session`], pacing every simulated day over its animation
//! phases with `tokio::time::sleep` when pacing is on.
//!
//! ```yaml
//! steps:
//!   - action: start
//!   - action: run_days
//!     days: 3
//!   - action: light
//!     level: off
//!   - action: run_days
//!     days: 10
//!   - action: reset
//! ```

use std::path::Path;

use photosim_core::{DayOutcome, PhasePlan, Session};
use photosim_types::{LightLevel, WaterLevel};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// One control action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Press start.
    Start,
    /// Press pause.
    Pause,
    /// Press resume.
    Resume,
    /// Press reset.
    Reset,
    /// Move the light switch.
    Light {
        /// Requested level.
        level: LightLevel,
    },
    /// Move the water switch.
    Water {
        /// Requested level.
        level: WaterLevel,
    },
    /// Move the speed slider.
    Speed {
        /// Ratio in `(0, 1]`.
        ratio: f64,
    },
    /// Simulate up to `days` days; stops early when the trial ends.
    RunDays {
        /// Maximum number of days to simulate.
        days: u32,
    },
    /// Log a host-defined event.
    Event {
        /// Event name.
        name: String,
    },
}

/// An ordered script of steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Steps in play order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Scenario {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] if the YAML does not describe a
    /// scenario.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        serde_yml::from_str(yaml).map_err(|e| EngineError::Scenario {
            message: format!("failed to parse scenario YAML: {e}"),
        })
    }

    /// The built-in script: a short lit trial, a trial that goes dark until
    /// the plant dies, and a full-length trial at double speed.
    pub fn classroom() -> Self {
        Self {
            steps: vec![
                Step::Start,
                Step::RunDays { days: 4 },
                Step::Reset,
                Step::Start,
                Step::RunDays { days: 3 },
                Step::Light {
                    level: LightLevel::Off,
                },
                Step::RunDays { days: 10 },
                Step::Reset,
                Step::Light {
                    level: LightLevel::Full,
                },
                Step::Speed { ratio: 0.5 },
                Step::Start,
                Step::RunDays { days: 25 },
                Step::Reset,
            ],
        }
    }
}

/// What a scenario run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioSummary {
    /// Steps played.
    pub steps: usize,
    /// Days simulated across all trials.
    pub days_simulated: u64,
    /// Trials completed by the end of the run.
    pub trials_completed: usize,
}

/// Play `scenario` against `session`.
///
/// Control requests the session rejects (a light level the switch does not
/// have, a hidden water control) are logged and skipped.
///
/// # Errors
///
/// Returns [`EngineError::Session`] if a simulated day fails.
pub async fn run(
    session: &mut Session,
    scenario: &Scenario,
    pace: bool,
) -> Result<ScenarioSummary, EngineError> {
    let mut summary = ScenarioSummary::default();

    for step in &scenario.steps {
        debug!(step = ?step, "Scenario step");
        match step {
            Step::Start => {
                session.start();
            }
            Step::Pause => {
                session.pause();
            }
            Step::Resume => {
                session.resume();
            }
            Step::Reset => session.reset(),
            Step::Light { level } => {
                if let Err(e) = session.request_light_change(*level) {
                    warn!(error = %e, "Light change rejected");
                }
            }
            Step::Water { level } => {
                if let Err(e) = session.request_water_change(*level) {
                    warn!(error = %e, "Water change rejected");
                }
            }
            Step::Speed { ratio } => {
                if let Err(e) = session.set_speed_ratio(*ratio) {
                    warn!(error = %e, "Speed change rejected");
                }
            }
            Step::RunDays { days } => {
                let simulated = run_days(session, *days, pace).await?;
                summary.days_simulated = summary.days_simulated.saturating_add(simulated);
            }
            Step::Event { name } => {
                session.record_event(name);
            }
        }
        summary.steps = summary.steps.saturating_add(1);
    }

    summary.trials_completed = session.completed_trials().len();
    info!(
        steps = summary.steps,
        days_simulated = summary.days_simulated,
        trials_completed = summary.trials_completed,
        "Scenario finished"
    );
    Ok(summary)
}

async fn run_days(session: &mut Session, days: u32, pace: bool) -> Result<u64, EngineError> {
    let mut simulated: u64 = 0;
    while simulated < u64::from(days) {
        match session.advance_day()? {
            DayOutcome::Advanced { .. } => {
                simulated = simulated.saturating_add(1);
                if pace {
                    play(&session.phase_plan()).await;
                }
                session.finish_day();
            }
            DayOutcome::PlantDied { .. } => {
                simulated = simulated.saturating_add(1);
                break;
            }
            DayOutcome::SimulationEnded { .. } | DayOutcome::Ignored => break,
        }
    }
    Ok(simulated)
}

/// Sleep through each phase of the day's animation.
async fn play(plan: &PhasePlan) {
    for phase in &plan.phases {
        tokio::time::sleep(phase.duration).await;
        debug!(phase = ?phase.kind, energy = phase.energy_end, "Phase complete");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use photosim_core::{NullRenderer, SimulationConfig};
    use photosim_feedback::MessageId;
    use photosim_trials::{ManualTimeSource, MemorySink};
    use photosim_types::EndReason;

    use super::*;

    fn session(yaml: &str, sink: &MemorySink) -> Session {
        let config = SimulationConfig::parse(yaml).unwrap();
        Session::new(
            &config,
            Arc::new(ManualTimeSource::new(0)),
            Box::new(NullRenderer),
            Box::new(sink.clone()),
        )
        .unwrap()
    }

    #[test]
    fn parses_yaml_steps() {
        let scenario = Scenario::parse(
            "steps:\n  - action: start\n  - action: light\n    level: half\n  - action: run_days\n    days: 2\n  - action: event\n    name: zoomChanged\n",
        )
        .unwrap();
        assert_eq!(
            scenario.steps,
            vec![
                Step::Start,
                Step::Light {
                    level: LightLevel::Half
                },
                Step::RunDays { days: 2 },
                Step::Event {
                    name: "zoomChanged".to_owned()
                },
            ]
        );
    }

    #[test]
    fn shipped_scenario_parses() {
        let scenario = Scenario::parse(include_str!("../../../scenarios/light-off.yaml")).unwrap();
        assert_eq!(scenario.steps.first(), Some(&Step::Start));
        assert!(scenario.steps.contains(&Step::Water {
            level: WaterLevel::Off
        }));
    }

    #[test]
    fn rejects_unknown_actions() {
        let err = Scenario::parse("steps:\n  - action: water_the_cat\n").unwrap_err();
        assert!(matches!(err, EngineError::Scenario { .. }));
    }

    #[tokio::test]
    async fn classroom_script_produces_three_trials() {
        let sink = MemorySink::new();
        let mut session = session("feedback:\n  policy: default\n", &sink);

        let summary = run(&mut session, &Scenario::classroom(), false)
            .await
            .unwrap();

        assert_eq!(summary.steps, Scenario::classroom().steps.len());
        // 4 lit days, 3 lit + 4 dark days until death, then 20 days.
        assert_eq!(summary.days_simulated, 31);
        assert_eq!(summary.trials_completed, 3);

        let reasons: Vec<EndReason> = sink.records().iter().map(|r| r.end_reason).collect();
        assert_eq!(
            reasons,
            vec![
                EndReason::Reset,
                EndReason::PlantDied,
                EndReason::DayLimitReached
            ]
        );
        // The clock never moved, so every trial counts as too short.
        assert_eq!(
            session.feedback().map(|m| m.id),
            Some(MessageId::TrialsTooShort)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn paced_days_take_their_animation_time() {
        let sink = MemorySink::new();
        let mut session = session("pacing:\n  day_duration_ms: 1000\n", &sink);
        let scenario = Scenario::parse(
            "steps:\n  - action: start\n  - action: run_days\n    days: 3\n",
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        let summary = run(&mut session, &scenario, true).await.unwrap();
        assert_eq!(summary.days_simulated, 3);
        assert!(started.elapsed() >= Duration::from_millis(3_000));
        assert!(!session.cycle().is_day_in_flight());
    }

    #[tokio::test]
    async fn rejected_controls_are_skipped() {
        let sink = MemorySink::new();
        let mut session = session("display:\n  show_water: false\n", &sink);
        let scenario = Scenario::parse(
            "steps:\n  - action: water\n    level: off\n  - action: light\n    level: quarter\n  - action: speed\n    ratio: 3.0\n",
        )
        .unwrap();
        let summary = run(&mut session, &scenario, false).await.unwrap();
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.days_simulated, 0);
    }
}
