//! Integration tests for the trial store: a multi-trial session recorded
//! through the public API and persisted through a sink.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use photosim_trials::{ManualTimeSource, MemorySink, TrialRecord, TrialRecorder, TrialSink};
use photosim_types::{EndReason, EventKind, LightLevel, ResourceTotals, SeriesKind};

#[test]
fn session_of_two_trials_keeps_history_intact() {
    let clock = ManualTimeSource::new(0);
    let mut recorder = TrialRecorder::new(
        Arc::new(clock.clone()),
        ResourceTotals::default(),
        LightLevel::Full,
    );
    let mut sink = MemorySink::new();

    recorder.add_event(EventKind::StartButtonClicked);
    for day in 1..=3_u32 {
        clock.advance(1_000);
        let created = i64::from(day) * 4;
        let used = i64::from(day) * 2;
        recorder
            .record_day(day, ResourceTotals::from_flows(created, used).unwrap())
            .unwrap();
    }
    recorder.add_event(EventKind::ResetButtonClicked);
    sink.save(&TrialRecord {
        session_id: recorder.session_id(),
        end_reason: EndReason::Reset,
        trial: recorder.current().clone(),
    });
    recorder.start_new_trial(ResourceTotals::default(), LightLevel::Full);
    recorder.add_event(EventKind::StartButtonClicked);

    let first = &recorder.completed()[0];
    assert_eq!(first.days_simulated(), 3);
    assert_eq!(first.events.len(), 2);
    assert_eq!(first.events[1].timestamp_ms, 3_000);
    for day in 0..=3 {
        let created = first.value_at(SeriesKind::Created, day).unwrap();
        let used = first.value_at(SeriesKind::Used, day).unwrap();
        let stored = first.value_at(SeriesKind::Stored, day).unwrap();
        assert_eq!(stored, created - used);
    }

    assert_eq!(recorder.current().days_simulated(), 0);
    assert_eq!(recorder.current().events.len(), 1);

    let saved = sink.records();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].trial.id, first.id);
    assert_eq!(saved[0].session_id, recorder.session_id());
}
