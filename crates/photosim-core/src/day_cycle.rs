//! The day-cycle state machine.
//!
//! ```text
//! Stopped --start--> Running <--pause/resume--> Paused
//!                       |
//!                       +--advance_day--> Ended (plant died / day limit)
//! any state --reset--> Stopped (new trial)
//! ```
//!
//! The machine owns the trial recorder: every transition appends its event
//! to the current trial, and every simulated day appends one point per
//! series. Calls that do not fit the current state are no-ops, logged at
//! debug level and reported as [`DayOutcome::Ignored`] or `false`.
//!
//! A day is "in flight" from [`DayCycle::advance_day`] until the host
//! reports its animation complete with [`DayCycle::finish_day`]. Light and
//! water requests made in that window are buffered for the next day.

use std::sync::Arc;
use std::time::Duration;

use photosim_trials::{TimeSource, TrialRecorder};
use photosim_types::{
    CycleState, DaySnapshot, EndReason, Event, EventKind, LightLevel, ResourceTotals, Trial,
    WaterLevel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::CycleError;
use crate::light::{SwitchChange, Switches, light_events, water_event};
use crate::phases::{FULL_ENERGY, PhasePlan, SpeedRatio};
use crate::resource::GlucoseLedger;

/// A user-facing control whose enabled state the host mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    /// Start button.
    Start,
    /// Pause button.
    Pause,
    /// Resume button.
    Resume,
    /// Reset button.
    Reset,
    /// Light switch.
    Light,
    /// Water switch.
    Water,
    /// Speed slider.
    Speed,
}

/// Result of one [`DayCycle::advance_day`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    /// A day was simulated and the plant is alive.
    Advanced {
        /// The day just simulated.
        day: u32,
        /// Totals at the end of the day.
        totals: ResourceTotals,
    },
    /// A dark day left stored glucose negative; the trial is over.
    PlantDied {
        /// The day the plant died.
        day: u32,
        /// Totals at the end of the day.
        totals: ResourceTotals,
    },
    /// Every configured day had been simulated; the trial is over.
    SimulationEnded {
        /// The last simulated day.
        day: u32,
    },
    /// The call did not fit the current state.
    Ignored,
}

impl DayOutcome {
    /// The reason the trial ended, if this outcome ended it.
    pub const fn end_reason(&self) -> Option<EndReason> {
        match self {
            Self::PlantDied { .. } => Some(EndReason::PlantDied),
            Self::SimulationEnded { .. } => Some(EndReason::DayLimitReached),
            Self::Advanced { .. } | Self::Ignored => None,
        }
    }
}

/// The resource state machine for one session.
#[derive(Debug)]
pub struct DayCycle {
    state: CycleState,
    end_reason: Option<EndReason>,
    current_day: u32,
    num_days: u32,
    seed: ResourceTotals,
    ledger: GlucoseLedger,
    switches: Switches,
    speed: SpeedRatio,
    day_duration: Duration,
    energy_remaining: f64,
    day_in_flight: bool,
    recorder: TrialRecorder,
}

impl DayCycle {
    /// Build a stopped machine with one empty trial.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidSpeedRatio`] or [`CycleError::Overflow`]
    /// for values [`SimulationConfig::validate`] would also reject.
    pub fn new(config: &SimulationConfig, time: Arc<dyn TimeSource>) -> Result<Self, CycleError> {
        let sim = &config.simulation;
        let seed = sim.seed_totals().ok_or(CycleError::Overflow {
            operation: "computing the day-0 totals",
        })?;
        let speed = SpeedRatio::new(config.pacing.speed_ratio)?;
        let recorder = TrialRecorder::new(time, seed, sim.initial_light);

        Ok(Self {
            state: CycleState::Stopped,
            end_reason: None,
            current_day: 0,
            num_days: sim.num_days,
            seed,
            ledger: GlucoseLedger::new(seed, sim.glucose_per_full_day, sim.glucose_used_per_day),
            switches: Switches::new(
                sim.light_option_count,
                sim.initial_light,
                config.display.show_water,
            ),
            speed,
            day_duration: Duration::from_millis(config.pacing.day_duration_ms),
            energy_remaining: FULL_ENERGY,
            day_in_flight: false,
            recorder,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current state.
    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Why the current trial ended, once it has.
    pub const fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Last simulated day of the current trial (0 before the first).
    pub const fn current_day(&self) -> u32 {
        self.current_day
    }

    /// Days in a full trial.
    pub const fn num_days(&self) -> u32 {
        self.num_days
    }

    /// Current glucose totals.
    pub const fn totals(&self) -> ResourceTotals {
        self.ledger.totals()
    }

    /// Light level in force for the current day.
    pub const fn light(&self) -> LightLevel {
        self.switches.light()
    }

    /// Water level in force for the current day.
    pub const fn water(&self) -> WaterLevel {
        self.switches.water()
    }

    /// Light change waiting for the next day, if any.
    pub const fn pending_light_change(&self) -> Option<LightLevel> {
        self.switches.pending_light()
    }

    /// Displayed energy in `[0, 100]`.
    pub const fn energy_remaining(&self) -> f64 {
        self.energy_remaining
    }

    /// Whether a day's animation is playing.
    pub const fn is_day_in_flight(&self) -> bool {
        self.day_in_flight
    }

    /// Current animation speed.
    pub const fn speed_ratio(&self) -> SpeedRatio {
        self.speed
    }

    /// The trial store.
    pub const fn recorder(&self) -> &TrialRecorder {
        &self.recorder
    }

    /// The trial currently being recorded.
    pub const fn current_trial(&self) -> &Trial {
        self.recorder.current()
    }

    /// Everything a renderer needs to draw the current state.
    pub fn snapshot(&self) -> DaySnapshot {
        let light = self.light();
        DaySnapshot {
            day: self.current_day,
            state: self.state,
            light,
            light_color: light.display_color().to_owned(),
            water: self.water(),
            energy_remaining: self.energy_remaining,
            totals: self.totals(),
            pending_light: self.pending_light_change(),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// `Stopped -> Running`.
    pub fn start(&mut self) -> bool {
        if self.state != CycleState::Stopped {
            return self.ignore("start");
        }
        self.state = CycleState::Running;
        self.recorder.add_event(EventKind::StartButtonClicked);
        info!(
            trial = self.recorder.current().index,
            light = %self.light(),
            "Trial started"
        );
        true
    }

    /// `Running -> Paused`.
    pub fn pause(&mut self) -> bool {
        if self.state != CycleState::Running {
            return self.ignore("pause");
        }
        self.state = CycleState::Paused;
        self.recorder.add_event(EventKind::PauseButtonClicked);
        true
    }

    /// `Paused -> Running`.
    pub fn resume(&mut self) -> bool {
        if self.state != CycleState::Paused {
            return self.ignore("resume");
        }
        self.state = CycleState::Running;
        self.recorder.add_event(EventKind::ResumeButtonClicked);
        true
    }

    /// Any state -> `Stopped`, superseding the current trial.
    ///
    /// Pending switch changes take effect immediately, so the new trial
    /// starts with the light the student last chose.
    pub fn reset(&mut self) {
        self.recorder.add_event(EventKind::ResetButtonClicked);
        let previous = self.recorder.current().index;
        let day = self.current_day;

        self.switches.resolve();
        self.state = CycleState::Stopped;
        self.end_reason = None;
        self.current_day = 0;
        self.ledger.reset(self.seed);
        self.energy_remaining = FULL_ENERGY;
        self.day_in_flight = false;
        self.recorder.start_new_trial(self.seed, self.switches.light());

        info!(
            finished_trial = previous,
            day,
            new_trial = self.recorder.current().index,
            "Simulation reset"
        );
    }

    /// Simulate the next day.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Overflow`] if the day counter or a glucose
    /// total would overflow, or [`CycleError::Trial`] if the trial store
    /// rejects the day. The machine, including any pending switch change,
    /// is unchanged when an error is returned.
    pub fn advance_day(&mut self) -> Result<DayOutcome, CycleError> {
        if self.state != CycleState::Running {
            self.ignore("advance_day");
            return Ok(DayOutcome::Ignored);
        }
        if self.day_in_flight {
            debug!(day = self.current_day, "Day still in flight, tick ignored");
            return Ok(DayOutcome::Ignored);
        }
        if self.current_day >= self.num_days {
            self.end(EndReason::DayLimitReached, EventKind::SimulationEnded);
            return Ok(DayOutcome::SimulationEnded {
                day: self.current_day,
            });
        }

        let day = self.current_day.checked_add(1).ok_or(CycleError::Overflow {
            operation: "advancing the day counter",
        })?;
        let light = self.switches.effective_light();
        let water = self.switches.effective_water();
        let totals = self.ledger.next_totals(light, water)?;
        self.recorder.record_day(day, totals)?;

        self.ledger.commit(totals);
        let (previous_light, previous_water) = self.switches.resolve();
        if previous_light != light || previous_water != water {
            debug!(day, light = %light, water = ?water, "Pending switch change applied");
        }
        self.current_day = day;
        self.energy_remaining = FULL_ENERGY;

        if !light.is_on() && totals.stored < 0 {
            self.end(EndReason::PlantDied, EventKind::PlantDied);
            return Ok(DayOutcome::PlantDied { day, totals });
        }

        self.day_in_flight = true;
        debug!(
            day,
            created = totals.created,
            used = totals.used,
            stored = totals.stored,
            "Day simulated"
        );
        Ok(DayOutcome::Advanced { day, totals })
    }

    /// Mark the in-flight day's animation as complete.
    ///
    /// Returns `false` if no day was in flight.
    pub fn finish_day(&mut self) -> bool {
        if !self.day_in_flight {
            return self.ignore("finish_day");
        }
        self.day_in_flight = false;
        self.energy_remaining = self.phase_plan().final_energy();
        true
    }

    /// Ask for a light level.
    ///
    /// The change applies now if no day is in flight, otherwise it waits
    /// for the next day. The student's click is logged either way.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::UnsupportedLight`] for a level that is not on
    /// the configured switch.
    pub fn request_light_change(
        &mut self,
        level: LightLevel,
    ) -> Result<SwitchChange<LightLevel>, CycleError> {
        if self.state == CycleState::Ended {
            self.ignore("request_light_change");
            return Ok(SwitchChange::Unchanged);
        }
        let before = self.switches.effective_light();
        let change = self.switches.request_light(level, self.day_in_flight)?;
        for kind in light_events(before, self.switches.effective_light()) {
            self.recorder.add_event(kind);
        }
        if let SwitchChange::Buffered(pending) = change {
            debug!(day = self.current_day, pending = ?pending, "Light change buffered");
        }
        Ok(change)
    }

    /// Ask for a water level. Same buffering rule as the light.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::WaterDisabled`] when the water control is
    /// hidden.
    pub fn request_water_change(
        &mut self,
        level: WaterLevel,
    ) -> Result<SwitchChange<WaterLevel>, CycleError> {
        if self.state == CycleState::Ended {
            self.ignore("request_water_change");
            return Ok(SwitchChange::Unchanged);
        }
        let change = self.switches.request_water(level, self.day_in_flight)?;
        if change != SwitchChange::Unchanged {
            self.recorder.add_event(water_event(level));
        }
        Ok(change)
    }

    /// Change animation speed. Never affects glucose.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidSpeedRatio`] outside `(0, 1]`.
    pub fn set_speed_ratio(&mut self, ratio: f64) -> Result<(), CycleError> {
        let speed = SpeedRatio::new(ratio)?;
        if speed != self.speed {
            self.speed = speed;
            self.recorder.add_event(EventKind::SpeedChanged);
        }
        Ok(())
    }

    /// Log a host-supplied event by name on the current trial.
    pub fn record_named_event(&mut self, name: &str) -> Event {
        self.recorder.add_named_event(name)
    }

    /// Phases of the current day at the current speed.
    pub fn phase_plan(&self) -> PhasePlan {
        PhasePlan::build(self.light().is_on(), self.day_duration, self.speed)
    }

    /// Whether `control` is usable in the current state.
    pub fn is_control_enabled(&self, control: Control) -> bool {
        match control {
            Control::Start => self.state == CycleState::Stopped,
            Control::Pause => self.state == CycleState::Running,
            Control::Resume => self.state == CycleState::Paused,
            Control::Reset => !(self.state == CycleState::Stopped && self.is_trial_untouched()),
            Control::Light | Control::Speed => self.state != CycleState::Ended,
            Control::Water => self.state != CycleState::Ended && self.switches.water_enabled(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn end(&mut self, reason: EndReason, event: EventKind) {
        self.state = CycleState::Ended;
        self.end_reason = Some(reason);
        self.day_in_flight = false;
        self.recorder.add_event(event);
        let totals = self.totals();
        info!(
            trial = self.recorder.current().index,
            day = self.current_day,
            reason = ?reason,
            stored = totals.stored,
            "Trial ended"
        );
    }

    fn ignore(&self, operation: &'static str) -> bool {
        debug!(operation, state = ?self.state, "Transition ignored");
        false
    }

    fn is_trial_untouched(&self) -> bool {
        let trial = self.recorder.current();
        trial.events.is_empty() && trial.days_simulated() == 0
    }
}
