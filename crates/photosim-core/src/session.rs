//! The session facade the host drives.
//!
//! A [`Session`] ties the day cycle to its collaborators: it pushes every
//! state change to the [`Renderer`], hands finished trials to the
//! [`TrialSink`], and asks the feedback classifier for a message whenever a
//! new trial has been completed and the student starts or resets.

use std::sync::Arc;

use photosim_feedback::{FeedbackClassifier, FeedbackMessage};
use photosim_trials::{TimeSource, TrialRecord, TrialSink};
use photosim_types::{
    DaySnapshot, EndReason, Event, LightLevel, SeriesKind, SessionId, Trial, WaterLevel,
};
use tracing::{info, warn};

use crate::config::{DisplayConfig, SimulationConfig};
use crate::day_cycle::{Control, DayCycle, DayOutcome};
use crate::error::SessionError;
use crate::light::SwitchChange;
use crate::phases::PhasePlan;
use crate::render::{BandColor, Renderer};
use crate::resource::{ConservationResult, verify_trial_conservation};

/// One student's run of the simulation.
#[derive(Debug)]
pub struct Session {
    cycle: DayCycle,
    classifier: FeedbackClassifier,
    renderer: Box<dyn Renderer>,
    sink: Box<dyn TrialSink>,
    display: DisplayConfig,
    /// Whether the current trial has already been handed to the sink.
    current_saved: bool,
    /// Completed-trial count at the last classification.
    classified_at: Option<usize>,
    feedback: Option<FeedbackMessage>,
}

impl Session {
    /// Validate `config` and open a session with one empty trial.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] for an invalid configuration, or
    /// the feedback/cycle error that rejected it.
    pub fn new(
        config: &SimulationConfig,
        time: Arc<dyn TimeSource>,
        renderer: Box<dyn Renderer>,
        sink: Box<dyn TrialSink>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let classifier = FeedbackClassifier::new(&config.feedback)?;
        let cycle = DayCycle::new(config, time)?;

        let mut session = Self {
            cycle,
            classifier,
            renderer,
            sink,
            display: config.display.clone(),
            current_saved: false,
            classified_at: None,
            feedback: None,
        };
        info!(
            session = %session.session_id(),
            policy = %session.classifier.policy(),
            num_days = session.cycle.num_days(),
            "Session opened"
        );
        session.redraw();
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Session identifier stamped on every saved record.
    pub const fn session_id(&self) -> SessionId {
        self.cycle.recorder().session_id()
    }

    /// The day-cycle state machine.
    pub const fn cycle(&self) -> &DayCycle {
        &self.cycle
    }

    /// The feedback classifier and its folded state.
    pub const fn classifier(&self) -> &FeedbackClassifier {
        &self.classifier
    }

    /// The last feedback message shown, if any.
    pub const fn feedback(&self) -> Option<&FeedbackMessage> {
        self.feedback.as_ref()
    }

    /// Every completed trial, oldest first.
    pub fn completed_trials(&self) -> &[Trial] {
        self.cycle.recorder().completed()
    }

    /// Current state for drawing.
    pub fn snapshot(&self) -> DaySnapshot {
        self.cycle.snapshot()
    }

    /// Phases of the current day at the current speed.
    pub fn phase_plan(&self) -> PhasePlan {
        self.cycle.phase_plan()
    }

    /// Whether `control` is usable now.
    pub fn is_control_enabled(&self, control: Control) -> bool {
        self.cycle.is_control_enabled(control)
    }

    // -----------------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------------

    /// Start the current trial.
    pub fn start(&mut self) -> bool {
        if !self.cycle.start() {
            return false;
        }
        self.evaluate_feedback();
        self.render();
        true
    }

    /// Pause a running trial.
    pub fn pause(&mut self) -> bool {
        let paused = self.cycle.pause();
        if paused {
            self.render();
        }
        paused
    }

    /// Resume a paused trial.
    pub fn resume(&mut self) -> bool {
        let resumed = self.cycle.resume();
        if resumed {
            self.render();
        }
        resumed
    }

    /// Supersede the current trial and stop.
    ///
    /// A trial that had not ended on its own is saved with
    /// [`EndReason::Reset`].
    pub fn reset(&mut self) {
        self.cycle.reset();
        let unsaved = self
            .cycle
            .recorder()
            .completed()
            .last()
            .filter(|_| !self.current_saved)
            .cloned();
        if let Some(trial) = unsaved {
            let record = TrialRecord {
                session_id: self.session_id(),
                end_reason: EndReason::Reset,
                trial,
            };
            self.persist(&record);
        }
        self.current_saved = false;
        self.renderer.clear_plot_bands();
        self.evaluate_feedback();
        self.redraw();
    }

    /// Simulate the next day and push the result to the collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cycle`] on arithmetic overflow or a trial
    /// store rejection.
    pub fn advance_day(&mut self) -> Result<DayOutcome, SessionError> {
        let outcome = self.cycle.advance_day()?;
        match outcome {
            DayOutcome::Ignored => return Ok(outcome),
            DayOutcome::Advanced { day, .. } | DayOutcome::PlantDied { day, .. } => {
                self.draw_day(day);
            }
            DayOutcome::SimulationEnded { .. } => {}
        }
        if let Some(reason) = outcome.end_reason() {
            self.save_current(reason);
        }
        self.render();
        Ok(outcome)
    }

    /// Report that the in-flight day's animation finished.
    pub fn finish_day(&mut self) -> bool {
        let finished = self.cycle.finish_day();
        if finished {
            self.render();
        }
        finished
    }

    /// Ask for a light level.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cycle`] for a level the switch does not have.
    pub fn request_light_change(
        &mut self,
        level: LightLevel,
    ) -> Result<SwitchChange<LightLevel>, SessionError> {
        let change = self.cycle.request_light_change(level)?;
        if change != SwitchChange::Unchanged {
            self.render();
        }
        Ok(change)
    }

    /// Ask for a water level.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cycle`] when the water control is hidden.
    pub fn request_water_change(
        &mut self,
        level: WaterLevel,
    ) -> Result<SwitchChange<WaterLevel>, SessionError> {
        let change = self.cycle.request_water_change(level)?;
        if change != SwitchChange::Unchanged {
            self.render();
        }
        Ok(change)
    }

    /// Change animation speed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cycle`] for a ratio outside `(0, 1]`.
    pub fn set_speed_ratio(&mut self, ratio: f64) -> Result<(), SessionError> {
        self.cycle.set_speed_ratio(ratio)?;
        Ok(())
    }

    /// Log a host-supplied event on the current trial.
    pub fn record_event(&mut self, name: &str) -> Event {
        self.cycle.record_named_event(name)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn evaluate_feedback(&mut self) {
        let completed = self.cycle.recorder().completed();
        if self.classified_at == Some(completed.len()) {
            return;
        }
        self.classified_at = Some(completed.len());
        if let Some(message) = self.classifier.classify(completed) {
            self.renderer.show_feedback(&message);
            self.feedback = Some(message);
        }
    }

    fn save_current(&mut self, reason: EndReason) {
        if self.current_saved {
            return;
        }
        let record = TrialRecord {
            session_id: self.session_id(),
            end_reason: reason,
            trial: self.cycle.current_trial().clone(),
        };
        self.persist(&record);
        self.current_saved = true;
    }

    fn persist(&mut self, record: &TrialRecord) {
        if let ConservationResult::Anomaly(anomaly) = verify_trial_conservation(&record.trial) {
            warn!(trial = anomaly.trial, day = anomaly.day, "{anomaly}");
        }
        info!(
            trial = record.trial.index,
            reason = ?record.end_reason,
            days = record.trial.days_simulated(),
            events = record.trial.events.len(),
            "Trial saved"
        );
        self.sink.save(record);
    }

    fn render(&mut self) {
        let snapshot = self.cycle.snapshot();
        self.renderer.render(&snapshot);
    }

    /// Redraw everything: snapshot and every visible series.
    fn redraw(&mut self) {
        self.render();
        if self.display.show_graph {
            self.push_series();
        }
    }

    fn draw_day(&mut self, day: u32) {
        if !self.display.show_graph {
            return;
        }
        self.push_series();
        if let Some(color) = BandColor::for_day(self.cycle.light(), self.cycle.water()) {
            self.renderer.add_plot_band(day.saturating_sub(1), day, color);
        }
    }

    fn push_series(&mut self) {
        let trial = self.cycle.current_trial();
        for kind in SeriesKind::ALL {
            if self.display.show_series.shows(kind) {
                self.renderer.update_series(kind, trial.series(kind));
            }
        }
    }
}
