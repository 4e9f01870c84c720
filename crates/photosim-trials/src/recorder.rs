//! The trial store and its recorder.
//!
//! The store is append-only: trials are pushed when a new attempt starts and
//! are never removed or edited after being superseded. Only the current
//! (last) trial accepts new events and day points.

use std::sync::Arc;

use photosim_types::{Event, EventKind, LightLevel, ResourceTotals, SeriesPoint, SessionId, Trial};
use tracing::debug;

use crate::error::TrialError;
use crate::time::TimeSource;

/// Owns every trial of a session and appends to the current one.
#[derive(Debug)]
pub struct TrialRecorder {
    /// Session identifier shared by every trial in this store.
    session_id: SessionId,
    /// Superseded trials, oldest first. Immutable once moved here.
    completed: Vec<Trial>,
    /// The trial currently accepting events and day points.
    current: Trial,
    /// Clock used to stamp events.
    time: Arc<dyn TimeSource>,
}

impl TrialRecorder {
    /// Create a store holding one fresh trial.
    pub fn new(time: Arc<dyn TimeSource>, seed: ResourceTotals, initial_light: LightLevel) -> Self {
        Self {
            session_id: SessionId::new(),
            completed: Vec::new(),
            current: Trial::new(0, seed, initial_light),
            time,
        }
    }

    /// The session identifier.
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Append an event of `kind` to the current trial, stamped with `now()`.
    pub fn add_event(&mut self, kind: EventKind) -> Event {
        let event = Event::new(kind, self.time.now_ms());
        debug!(
            trial = self.current.index,
            event = %event.kind,
            timestamp = event.timestamp_ms,
            "Event recorded"
        );
        self.current.events.push(event.clone());
        event
    }

    /// Append an event by host-supplied name. Unknown names are kept.
    pub fn add_named_event(&mut self, name: &str) -> Event {
        self.add_event(EventKind::from_name(name))
    }

    /// Supersede the current trial with a fresh one and return it.
    pub fn start_new_trial(&mut self, seed: ResourceTotals, initial_light: LightLevel) -> &Trial {
        let index = self.completed.len().saturating_add(1);
        let fresh = Trial::new(index, seed, initial_light);
        let previous = std::mem::replace(&mut self.current, fresh);
        debug!(
            finished_trial = previous.index,
            days = previous.days_simulated(),
            events = previous.events.len(),
            new_trial = index,
            "Trial superseded"
        );
        self.completed.push(previous);
        &self.current
    }

    /// Append one point per series for `day` to the current trial.
    ///
    /// # Errors
    ///
    /// Returns [`TrialError::NonContiguousDay`] unless `day` is exactly one
    /// past the last recorded day, and [`TrialError::Unbalanced`] if the
    /// totals violate `stored == created - used`.
    pub fn record_day(&mut self, day: u32, totals: ResourceTotals) -> Result<(), TrialError> {
        let expected = self
            .current
            .last_day()
            .checked_add(1)
            .ok_or(TrialError::DayOverflow)?;
        if day != expected {
            return Err(TrialError::NonContiguousDay { expected, got: day });
        }
        if !totals.is_balanced() {
            return Err(TrialError::Unbalanced {
                day,
                created: totals.created,
                used: totals.used,
                stored: totals.stored,
            });
        }
        self.current.created.push(SeriesPoint {
            day,
            value: totals.created,
        });
        self.current.used.push(SeriesPoint {
            day,
            value: totals.used,
        });
        self.current.stored.push(SeriesPoint {
            day,
            value: totals.stored,
        });
        Ok(())
    }

    /// The trial currently being recorded.
    pub const fn current(&self) -> &Trial {
        &self.current
    }

    /// All superseded trials, oldest first.
    pub fn completed(&self) -> &[Trial] {
        &self.completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use photosim_types::SeriesKind;

    use super::*;
    use crate::time::ManualTimeSource;

    fn recorder(clock: &ManualTimeSource) -> TrialRecorder {
        TrialRecorder::new(
            Arc::new(clock.clone()),
            ResourceTotals::default(),
            LightLevel::Full,
        )
    }

    #[test]
    fn events_are_stamped_and_appended_in_order() {
        let clock = ManualTimeSource::new(100);
        let mut rec = recorder(&clock);
        rec.add_event(EventKind::StartButtonClicked);
        clock.advance(40);
        rec.add_event(EventKind::PauseButtonClicked);
        clock.advance(10);
        rec.add_event(EventKind::PauseButtonClicked);

        let events = &rec.current().events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp_ms, 100);
        assert_eq!(events[1].timestamp_ms, 140);
        assert_eq!(events[2].kind, EventKind::PauseButtonClicked);
    }

    #[test]
    fn named_events_tolerate_unknown_names() {
        let clock = ManualTimeSource::new(0);
        let mut rec = recorder(&clock);
        let event = rec.add_named_event("graphHidden");
        assert_eq!(event.kind.name(), "graphHidden");
        assert!(!event.kind.is_recognized());
    }

    #[test]
    fn new_trials_are_appended_never_removed() {
        let clock = ManualTimeSource::new(0);
        let mut rec = recorder(&clock);
        rec.add_event(EventKind::StartButtonClicked);
        rec.start_new_trial(ResourceTotals::default(), LightLevel::Off);
        rec.start_new_trial(ResourceTotals::default(), LightLevel::Full);

        assert_eq!(rec.completed().len(), 2);
        assert_eq!(rec.completed()[0].events.len(), 1);
        assert_eq!(rec.completed()[1].initial_light, LightLevel::Off);
        assert_eq!(rec.current().index, 2);
        assert!(rec.current().events.is_empty());
        let indices: Vec<usize> = rec.completed().iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn days_must_be_contiguous() {
        let clock = ManualTimeSource::new(0);
        let mut rec = recorder(&clock);
        let totals = ResourceTotals::from_flows(4, 2).unwrap();
        rec.record_day(1, totals).unwrap();
        let err = rec.record_day(3, totals).unwrap_err();
        assert!(matches!(
            err,
            TrialError::NonContiguousDay {
                expected: 2,
                got: 3
            }
        ));
        assert_eq!(rec.current().value_at(SeriesKind::Stored, 1), Some(2));
        assert_eq!(rec.current().days_simulated(), 1);
    }

    #[test]
    fn unbalanced_totals_are_rejected() {
        let clock = ManualTimeSource::new(0);
        let mut rec = recorder(&clock);
        let broken = ResourceTotals {
            created: 4,
            used: 2,
            stored: 3,
        };
        assert!(matches!(
            rec.record_day(1, broken),
            Err(TrialError::Unbalanced { day: 1, .. })
        ));
        assert_eq!(rec.current().days_simulated(), 0);
    }
}
