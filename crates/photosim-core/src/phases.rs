//! Sub-day animation phases and speed control.
//!
//! A day plays out as a short sequence of phases. Each phase drives the
//! plant's displayed energy from one value to the next; the sequence always
//! starts at 100. Phases are display-only: the glucose ledger is updated
//! once per day, before the first phase plays.

use std::time::Duration;

use serde::Serialize;

use crate::error::CycleError;

/// Energy shown at the start of every day.
pub const FULL_ENERGY: f64 = 100.0;

/// What the plant is shown doing during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKind {
    /// Leaves absorb light.
    AbsorbLight,
    /// Glucose is made from water and carbon dioxide.
    MakeGlucose,
    /// The plant sits in the dark.
    Darkness,
    /// The plant spends glucose to live.
    UseGlucose,
    /// End of the day.
    Rest,
}

/// One phase with its energy endpoints and wall-clock duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// What the phase depicts.
    pub kind: PhaseKind,
    /// Energy when the phase starts.
    pub energy_start: f64,
    /// Energy when the phase ends.
    pub energy_end: f64,
    /// How long the phase plays at the current speed.
    pub duration: Duration,
}

impl Phase {
    /// Energy at `progress` through the phase (clamped to `[0, 1]`).
    pub fn energy_at(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        (self.energy_end - self.energy_start).mul_add(progress, self.energy_start)
    }
}

/// `(kind, share of the day in percent, energy at the end)`.
type PhaseTemplate = (PhaseKind, u32, f64);

const LIGHT_ON_PHASES: [PhaseTemplate; 4] = [
    (PhaseKind::AbsorbLight, 25, 100.0),
    (PhaseKind::MakeGlucose, 35, 70.0),
    (PhaseKind::UseGlucose, 25, 35.0),
    (PhaseKind::Rest, 15, 0.0),
];

const LIGHT_OFF_PHASES: [PhaseTemplate; 3] = [
    (PhaseKind::Darkness, 40, 60.0),
    (PhaseKind::UseGlucose, 45, 15.0),
    (PhaseKind::Rest, 15, 0.0),
];

/// The phases of one day, in play order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasePlan {
    /// Whether this is the lit variant.
    pub light_on: bool,
    /// Phases in order.
    pub phases: Vec<Phase>,
}

impl PhasePlan {
    /// Build the plan for a day of `day_duration` at `speed`.
    pub fn build(light_on: bool, day_duration: Duration, speed: SpeedRatio) -> Self {
        let templates: &[PhaseTemplate] = if light_on {
            &LIGHT_ON_PHASES
        } else {
            &LIGHT_OFF_PHASES
        };
        let scaled = speed.scale(day_duration);

        let mut energy = FULL_ENERGY;
        let phases = templates
            .iter()
            .map(|&(kind, share, energy_end)| {
                let phase = Phase {
                    kind,
                    energy_start: energy,
                    energy_end,
                    duration: scaled
                        .checked_mul(share)
                        .and_then(|d| d.checked_div(100))
                        .unwrap_or(scaled),
                };
                energy = energy_end;
                phase
            })
            .collect();
        Self { light_on, phases }
    }

    /// Energy at the start of the day.
    pub fn initial_energy(&self) -> f64 {
        self.phases.first().map_or(FULL_ENERGY, |p| p.energy_start)
    }

    /// Energy once every phase has played.
    pub fn final_energy(&self) -> f64 {
        self.phases.last().map_or(FULL_ENERGY, |p| p.energy_end)
    }

    /// Total wall-clock duration of the plan.
    pub fn total_duration(&self) -> Duration {
        self.phases
            .iter()
            .fold(Duration::ZERO, |total, p| total.saturating_add(p.duration))
    }
}

/// Animation speed: phase durations are multiplied by this ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct SpeedRatio(f64);

impl SpeedRatio {
    /// Normal speed.
    pub const NORMAL: Self = Self(1.0);

    /// Validate a ratio in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidSpeedRatio`] for zero, negative,
    /// greater than one, or NaN ratios.
    pub fn new(ratio: f64) -> Result<Self, CycleError> {
        if ratio > 0.0 && ratio <= 1.0 {
            Ok(Self(ratio))
        } else {
            Err(CycleError::InvalidSpeedRatio { ratio })
        }
    }

    /// Scale a base duration by this ratio.
    pub fn scale(self, base: Duration) -> Duration {
        base.mul_f64(self.0)
    }
}

impl Default for SpeedRatio {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn every_plan_starts_at_full_energy_and_ends_drained() {
        for light_on in [true, false] {
            let plan = PhasePlan::build(light_on, Duration::from_millis(4_000), SpeedRatio::NORMAL);
            assert_eq!(plan.initial_energy(), FULL_ENERGY);
            assert_eq!(plan.final_energy(), 0.0);
            for pair in plan.phases.windows(2) {
                assert_eq!(pair[0].energy_end, pair[1].energy_start);
            }
        }
    }

    #[test]
    fn variants_differ() {
        let on = PhasePlan::build(true, Duration::from_millis(4_000), SpeedRatio::NORMAL);
        let off = PhasePlan::build(false, Duration::from_millis(4_000), SpeedRatio::NORMAL);
        assert_eq!(on.phases[1].kind, PhaseKind::MakeGlucose);
        assert_eq!(off.phases[0].kind, PhaseKind::Darkness);
    }

    #[test]
    fn durations_scale_with_speed() {
        let base = Duration::from_millis(4_000);
        let normal = PhasePlan::build(true, base, SpeedRatio::NORMAL);
        let fast = PhasePlan::build(true, base, SpeedRatio::new(0.25).unwrap());
        assert_eq!(normal.total_duration(), base);
        assert_eq!(fast.total_duration(), Duration::from_millis(1_000));
        assert_eq!(normal.phases[0].duration, Duration::from_millis(1_000));
    }

    #[test]
    fn speed_ratio_bounds() {
        assert!(SpeedRatio::new(1.0).is_ok());
        assert!(SpeedRatio::new(0.01).is_ok());
        assert!(SpeedRatio::new(0.0).is_err());
        assert!(SpeedRatio::new(-0.5).is_err());
        assert!(SpeedRatio::new(1.01).is_err());
        assert!(SpeedRatio::new(f64::NAN).is_err());
    }

    #[test]
    fn energy_interpolates_within_a_phase() {
        let plan = PhasePlan::build(true, Duration::from_millis(4_000), SpeedRatio::NORMAL);
        let make = plan.phases[1];
        assert_eq!(make.energy_at(0.0), 100.0);
        assert_eq!(make.energy_at(0.5), 85.0);
        assert_eq!(make.energy_at(2.0), 70.0);
    }
}
