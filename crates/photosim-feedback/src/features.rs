//! Behavioural features derived from one trial's event log and series.
//!
//! Extraction replays the event log in append order. Timestamps are not
//! assumed to be monotonic (a reset can land mid-animation), so negative
//! segment lengths are clamped to zero. Event kinds the replay does not
//! care about, including unrecognized names, are skipped.

use photosim_types::{EventKind, Trial};

/// Features of a single trial that feed the cumulative policy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrialFeatures {
    /// Wall-clock milliseconds the simulation was running (pauses excluded).
    pub active_duration_ms: u64,
    /// Whether the light was off at some point while the simulation ran.
    pub includes_light_off: bool,
    /// Whether the plant died.
    pub died: bool,
    /// Number of simulated days (excluding the seeded day 0).
    pub days_simulated: u32,
}

impl TrialFeatures {
    /// Extract every feature from `trial`.
    pub fn extract(trial: &Trial) -> Self {
        Self {
            active_duration_ms: active_duration_ms(trial),
            includes_light_off: includes_light_off(trial),
            died: trial.has_event(&EventKind::PlantDied),
            days_simulated: trial.days_simulated(),
        }
    }
}

/// Sum of closed running segments in the event log.
///
/// `start`/`resume` open a segment; `pause`, `plantDied`, `reset` and
/// `simulationEnded` close it. A segment still open at the end of the log
/// does not count.
pub fn active_duration_ms(trial: &Trial) -> u64 {
    let mut total: u64 = 0;
    let mut segment_start: Option<i64> = None;

    for event in &trial.events {
        match event.kind {
            EventKind::StartButtonClicked | EventKind::ResumeButtonClicked => {
                // A repeated start or resume keeps the earliest opening.
                if segment_start.is_none() {
                    segment_start = Some(event.timestamp_ms);
                }
            }
            EventKind::PauseButtonClicked
            | EventKind::PlantDied
            | EventKind::ResetButtonClicked
            | EventKind::SimulationEnded => {
                if let Some(start) = segment_start.take() {
                    let elapsed = event.timestamp_ms.saturating_sub(start).max(0);
                    total = total.saturating_add(u64::try_from(elapsed).unwrap_or(0));
                }
            }
            _ => {}
        }
    }
    total
}

/// Whether the light was off while the simulation was running.
///
/// True when the light is switched off during a running segment, or when
/// the simulation is started with the light already off (including a light
/// left off by a previous trial).
pub fn includes_light_off(trial: &Trial) -> bool {
    let mut light_on = trial.initial_light.is_on();
    let mut running = false;

    for event in &trial.events {
        match event.kind {
            EventKind::TurnLightOffButtonClicked => {
                light_on = false;
                if running {
                    return true;
                }
            }
            EventKind::TurnLightOnButtonClicked => light_on = true,
            EventKind::StartButtonClicked => {
                running = true;
                if !light_on {
                    return true;
                }
            }
            EventKind::ResumeButtonClicked => running = true,
            EventKind::PauseButtonClicked
            | EventKind::PlantDied
            | EventKind::ResetButtonClicked
            | EventKind::SimulationEnded => running = false,
            _ => {}
        }
    }
    false
}
