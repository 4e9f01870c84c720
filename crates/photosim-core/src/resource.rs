//! The glucose ledger and its conservation check.
//!
//! Glucose enters the plant only through photosynthesis and leaves only
//! through daily use. Totals are cumulative, so for every recorded day:
//!
//! ```text
//! stored == created - used
//! ```
//!
//! The ledger maintains this by construction. [`verify_trial_conservation`]
//! re-checks a recorded trial after the fact and reports an anomaly rather
//! than panicking.

use photosim_types::{LightLevel, ResourceTotals, SeriesKind, Trial, WaterLevel};

use crate::error::CycleError;

/// Glucose created and used over one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayFlows {
    /// Glucose created today.
    pub created: i64,
    /// Glucose used today.
    pub used: i64,
}

/// Running glucose totals for the current trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlucoseLedger {
    totals: ResourceTotals,
    per_full_day: i64,
    used_per_day: i64,
}

impl GlucoseLedger {
    /// A ledger starting at `seed`.
    pub const fn new(seed: ResourceTotals, per_full_day: i64, used_per_day: i64) -> Self {
        Self {
            totals: seed,
            per_full_day,
            used_per_day,
        }
    }

    /// Current totals.
    pub const fn totals(&self) -> ResourceTotals {
        self.totals
    }

    /// Discard the running totals and start again from `seed`.
    pub const fn reset(&mut self, seed: ResourceTotals) {
        self.totals = seed;
    }

    /// Flows for a day lit at `light` with `water`.
    ///
    /// Nothing is created without both light and water; otherwise creation
    /// scales with light intensity. Use is fixed.
    pub fn day_flows(&self, light: LightLevel, water: WaterLevel) -> DayFlows {
        let created = if light.is_on() && water.is_on() {
            self.per_full_day
                .saturating_mul(i64::from(light.percent()))
                .checked_div(100)
                .unwrap_or(0)
        } else {
            0
        };
        DayFlows {
            created,
            used: self.used_per_day,
        }
    }

    /// Totals after one more day at `light` and `water`. The ledger is not
    /// touched; pass the result to [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Overflow`] if a total would overflow.
    pub fn next_totals(
        &self,
        light: LightLevel,
        water: WaterLevel,
    ) -> Result<ResourceTotals, CycleError> {
        let flows = self.day_flows(light, water);
        let created = self
            .totals
            .created
            .checked_add(flows.created)
            .ok_or(overflow("adding created glucose"))?;
        let used = self
            .totals
            .used
            .checked_add(flows.used)
            .ok_or(overflow("adding used glucose"))?;
        let totals =
            ResourceTotals::from_flows(created, used).ok_or(overflow("computing stored glucose"))?;
        debug_assert!(totals.is_balanced());
        Ok(totals)
    }

    /// Make `totals` the running totals.
    pub const fn commit(&mut self, totals: ResourceTotals) {
        self.totals = totals;
    }
}

const fn overflow(operation: &'static str) -> CycleError {
    CycleError::Overflow { operation }
}

/// A day whose recorded totals do not balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConservationAnomaly {
    /// Trial index within its store.
    pub trial: usize,
    /// First offending day.
    pub day: u32,
    /// The totals recorded for that day.
    pub totals: ResourceTotals,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for ConservationAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The result of a conservation check for one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every recorded day balances.
    Balanced,
    /// A recorded day does not balance, or the series are misaligned.
    Anomaly(ConservationAnomaly),
}

/// Check `stored == created - used` on every recorded day of `trial`.
pub fn verify_trial_conservation(trial: &Trial) -> ConservationResult {
    let series = (
        trial.series(SeriesKind::Created),
        trial.series(SeriesKind::Used),
        trial.series(SeriesKind::Stored),
    );
    if series.0.len() != series.1.len() || series.0.len() != series.2.len() {
        return ConservationResult::Anomaly(ConservationAnomaly {
            trial: trial.index,
            day: trial.last_day(),
            totals: trial.latest_totals(),
            message: format!(
                "CONSERVATION_ANOMALY in trial {}: series lengths differ ({}/{}/{})",
                trial.index,
                series.0.len(),
                series.1.len(),
                series.2.len()
            ),
        });
    }

    for ((created, used), stored) in series.0.iter().zip(series.1).zip(series.2) {
        let totals = ResourceTotals {
            created: created.value,
            used: used.value,
            stored: stored.value,
        };
        let aligned = created.day == used.day && created.day == stored.day;
        if !aligned || !totals.is_balanced() {
            return ConservationResult::Anomaly(ConservationAnomaly {
                trial: trial.index,
                day: created.day,
                totals,
                message: format!(
                    "CONSERVATION_ANOMALY in trial {} day {}: created {} - used {} != stored {}",
                    trial.index, created.day, totals.created, totals.used, totals.stored
                ),
            });
        }
    }
    ConservationResult::Balanced
}
