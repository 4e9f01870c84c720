//! Core record types: events, series points, trials, and render snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CycleState, EventKind, LightLevel, SeriesKind, WaterLevel};
use crate::ids::TrialId;

/// A timestamped entry in a trial's event log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// What happened.
    #[serde(rename = "name")]
    #[ts(type = "string")]
    pub kind: EventKind,
    /// Wall-clock milliseconds when it happened.
    #[serde(rename = "timestamp")]
    #[ts(type = "number")]
    pub timestamp_ms: i64,
}

impl Event {
    /// Create an event.
    pub const fn new(kind: EventKind, timestamp_ms: i64) -> Self {
        Self { kind, timestamp_ms }
    }
}

/// One `(day, cumulative value)` point of a glucose series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeriesPoint {
    /// Day index, 0 for the seeded starting point.
    pub day: u32,
    /// Cumulative glucose at the end of that day.
    #[ts(type = "number")]
    pub value: i64,
}

/// Cumulative glucose totals at a day boundary.
///
/// `stored` always equals `created - used`; the constructor is the only
/// way to build a value from flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceTotals {
    /// Total glucose created so far.
    #[ts(type = "number")]
    pub created: i64,
    /// Total glucose used so far.
    #[ts(type = "number")]
    pub used: i64,
    /// Glucose currently stored.
    #[ts(type = "number")]
    pub stored: i64,
}

impl ResourceTotals {
    /// Build totals from cumulative flows. Returns `None` on overflow.
    pub const fn from_flows(created: i64, used: i64) -> Option<Self> {
        match created.checked_sub(used) {
            Some(stored) => Some(Self {
                created,
                used,
                stored,
            }),
            None => None,
        }
    }

    /// Whether `stored == created - used`.
    pub fn is_balanced(&self) -> bool {
        self.created.checked_sub(self.used) == Some(self.stored)
    }
}

/// One attempt at running the simulation.
///
/// The three series always start with a day-0 point holding the seed
/// totals. Day indices increase by exactly one per recorded day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Trial {
    /// Unique trial identifier.
    pub id: TrialId,
    /// Position of this trial in its store (0-based).
    pub index: usize,
    /// When the trial was created.
    pub started_at: DateTime<Utc>,
    /// Light level in force when the trial was created.
    pub initial_light: LightLevel,
    /// Cumulative glucose created, one point per day.
    pub created: Vec<SeriesPoint>,
    /// Cumulative glucose used, one point per day.
    pub used: Vec<SeriesPoint>,
    /// Glucose stored, one point per day.
    pub stored: Vec<SeriesPoint>,
    /// Ordered event log.
    pub events: Vec<Event>,
}

impl Trial {
    /// Create a trial seeded with a day-0 point for every series.
    pub fn new(index: usize, seed: ResourceTotals, initial_light: LightLevel) -> Self {
        Self {
            id: TrialId::new(),
            index,
            started_at: Utc::now(),
            initial_light,
            created: vec![SeriesPoint {
                day: 0,
                value: seed.created,
            }],
            used: vec![SeriesPoint {
                day: 0,
                value: seed.used,
            }],
            stored: vec![SeriesPoint {
                day: 0,
                value: seed.stored,
            }],
            events: Vec::new(),
        }
    }

    /// The points of one series.
    pub fn series(&self, kind: SeriesKind) -> &[SeriesPoint] {
        match kind {
            SeriesKind::Created => &self.created,
            SeriesKind::Used => &self.used,
            SeriesKind::Stored => &self.stored,
        }
    }

    /// The recorded value of `kind` at `day`, if that day was simulated.
    pub fn value_at(&self, kind: SeriesKind, day: u32) -> Option<i64> {
        let idx = usize::try_from(day).ok()?;
        self.series(kind)
            .get(idx)
            .filter(|point| point.day == day)
            .map(|point| point.value)
    }

    /// The last recorded day index (0 when nothing has been simulated).
    pub fn last_day(&self) -> u32 {
        self.created.last().map_or(0, |point| point.day)
    }

    /// Number of simulated days, excluding the seeded day-0 point.
    pub fn days_simulated(&self) -> u32 {
        u32::try_from(self.created.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// The totals recorded at the last simulated day.
    pub fn latest_totals(&self) -> ResourceTotals {
        ResourceTotals {
            created: self.created.last().map_or(0, |p| p.value),
            used: self.used.last().map_or(0, |p| p.value),
            stored: self.stored.last().map_or(0, |p| p.value),
        }
    }

    /// Whether the log contains at least one event of `kind`.
    pub fn has_event(&self, kind: &EventKind) -> bool {
        self.events.iter().any(|event| event.kind == *kind)
    }
}

/// Everything a renderer needs to draw one moment of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DaySnapshot {
    /// Current day number (0 before the first day).
    pub day: u32,
    /// Current state of the day-cycle machine.
    pub state: CycleState,
    /// Light level in force for this day.
    pub light: LightLevel,
    /// Display colour for the light level.
    pub light_color: String,
    /// Water setting in force for this day.
    pub water: WaterLevel,
    /// Transient display energy in `0..=100`.
    pub energy_remaining: f64,
    /// Cumulative totals at the last day boundary.
    pub totals: ResourceTotals,
    /// A buffered light change waiting for the next day, if any.
    pub pending_light: Option<LightLevel>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_trial_is_seeded_at_day_zero() {
        let seed = ResourceTotals::from_flows(3, 1).unwrap();
        let trial = Trial::new(0, seed, LightLevel::Full);
        assert_eq!(trial.days_simulated(), 0);
        assert_eq!(trial.value_at(SeriesKind::Stored, 0), Some(2));
        assert_eq!(trial.value_at(SeriesKind::Created, 1), None);
        assert_eq!(trial.latest_totals(), seed);
    }

    #[test]
    fn totals_balance() {
        let totals = ResourceTotals::from_flows(4, 6).unwrap();
        assert_eq!(totals.stored, -2);
        assert!(totals.is_balanced());
        let broken = ResourceTotals {
            created: 1,
            used: 1,
            stored: 5,
        };
        assert!(!broken.is_balanced());
        assert!(ResourceTotals::from_flows(i64::MIN, 1).is_none());
    }

    #[test]
    fn event_serializes_with_host_field_names() {
        let event = Event::new(EventKind::PlantDied, 1_500);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "plantDied");
        assert_eq!(json["timestamp"], 1_500);
    }
}
