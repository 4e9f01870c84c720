//! Light and water switches with deferred application.
//!
//! While a day's animation is in flight its light and water are fixed. A
//! change requested during that window is buffered as a pending value and
//! takes effect when the next day begins. Outside that window a change
//! applies immediately.

use photosim_types::{EventKind, LightLevel, LightOptionCount, WaterLevel};

use crate::error::CycleError;

/// What happened to a switch change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchChange<T> {
    /// The request matched the effective setting; nothing changed.
    Unchanged,
    /// The setting changed now.
    Applied {
        /// Setting before the change.
        from: T,
        /// Setting after the change.
        to: T,
    },
    /// The change waits for the next day. `None` means a previously
    /// pending change was cancelled by switching back.
    Buffered(Option<T>),
}

/// Events that describe a light switch moving from `from` to `to`.
pub fn light_events(from: LightLevel, to: LightLevel) -> Vec<EventKind> {
    match (from.is_on(), to.is_on()) {
        _ if from == to => Vec::new(),
        (true, false) => vec![EventKind::TurnLightOffButtonClicked],
        (false, true) => {
            if to == LightLevel::Full {
                vec![EventKind::TurnLightOnButtonClicked]
            } else {
                vec![
                    EventKind::TurnLightOnButtonClicked,
                    EventKind::LightLevelChanged,
                ]
            }
        }
        _ => vec![EventKind::LightLevelChanged],
    }
}

/// Event that describes the water switch moving to `to`.
pub const fn water_event(to: WaterLevel) -> EventKind {
    match to {
        WaterLevel::On => EventKind::TurnWaterOnButtonClicked,
        WaterLevel::Off => EventKind::TurnWaterOffButtonClicked,
    }
}

/// Current and pending switch positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switches {
    options: LightOptionCount,
    water_enabled: bool,
    light: LightLevel,
    water: WaterLevel,
    pending_light: Option<LightLevel>,
    pending_water: Option<WaterLevel>,
}

impl Switches {
    /// Switches at `light` with water on.
    pub const fn new(options: LightOptionCount, light: LightLevel, water_enabled: bool) -> Self {
        Self {
            options,
            water_enabled,
            light,
            water: WaterLevel::On,
            pending_light: None,
            pending_water: None,
        }
    }

    /// Light level in force for the current day.
    pub const fn light(&self) -> LightLevel {
        self.light
    }

    /// Water level in force for the current day.
    pub const fn water(&self) -> WaterLevel {
        self.water
    }

    /// Light change waiting for the next day, if any.
    pub const fn pending_light(&self) -> Option<LightLevel> {
        self.pending_light
    }

    /// Whether the water control is offered.
    pub const fn water_enabled(&self) -> bool {
        self.water_enabled
    }

    /// The light level the student last asked for.
    pub fn effective_light(&self) -> LightLevel {
        self.pending_light.unwrap_or(self.light)
    }

    /// The water level the student last asked for.
    pub fn effective_water(&self) -> WaterLevel {
        self.pending_water.unwrap_or(self.water)
    }

    /// Request a light level.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::UnsupportedLight`] if `level` is not a
    /// position of the configured switch.
    pub fn request_light(
        &mut self,
        level: LightLevel,
        in_flight: bool,
    ) -> Result<SwitchChange<LightLevel>, CycleError> {
        if !self.options.supports(level) {
            return Err(CycleError::UnsupportedLight {
                level,
                options: self.options,
            });
        }
        Ok(request(&mut self.light, &mut self.pending_light, level, in_flight))
    }

    /// Request a water level.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::WaterDisabled`] if the water control is off.
    pub fn request_water(
        &mut self,
        level: WaterLevel,
        in_flight: bool,
    ) -> Result<SwitchChange<WaterLevel>, CycleError> {
        if !self.water_enabled {
            return Err(CycleError::WaterDisabled);
        }
        Ok(request(&mut self.water, &mut self.pending_water, level, in_flight))
    }

    /// Apply any pending changes. Returns the previous `(light, water)`.
    pub fn resolve(&mut self) -> (LightLevel, WaterLevel) {
        let previous = (self.light, self.water);
        if let Some(level) = self.pending_light.take() {
            self.light = level;
        }
        if let Some(level) = self.pending_water.take() {
            self.water = level;
        }
        previous
    }
}

fn request<T: Copy + PartialEq>(
    current: &mut T,
    pending: &mut Option<T>,
    level: T,
    in_flight: bool,
) -> SwitchChange<T> {
    if pending.unwrap_or(*current) == level {
        return SwitchChange::Unchanged;
    }
    if in_flight {
        *pending = (level != *current).then_some(level);
        return SwitchChange::Buffered(*pending);
    }
    let from = *current;
    *current = level;
    *pending = None;
    SwitchChange::Applied { from, to: level }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn immediate_change_outside_animation() {
        let mut switches = Switches::new(LightOptionCount::Two, LightLevel::Full, true);
        let change = switches.request_light(LightLevel::Off, false).unwrap();
        assert_eq!(
            change,
            SwitchChange::Applied {
                from: LightLevel::Full,
                to: LightLevel::Off
            }
        );
        assert_eq!(switches.light(), LightLevel::Off);
        assert_eq!(switches.pending_light(), None);
    }

    #[test]
    fn buffered_change_during_animation() {
        let mut switches = Switches::new(LightOptionCount::Two, LightLevel::Full, true);
        let change = switches.request_light(LightLevel::Off, true).unwrap();
        assert_eq!(change, SwitchChange::Buffered(Some(LightLevel::Off)));
        assert_eq!(switches.light(), LightLevel::Full);
        assert_eq!(switches.pending_light(), Some(LightLevel::Off));

        let (previous_light, _) = switches.resolve();
        assert_eq!(previous_light, LightLevel::Full);
        assert_eq!(switches.light(), LightLevel::Off);
        assert_eq!(switches.pending_light(), None);
    }

    #[test]
    fn switching_back_cancels_pending() {
        let mut switches = Switches::new(LightOptionCount::Two, LightLevel::Full, true);
        switches.request_light(LightLevel::Off, true).unwrap();
        let change = switches.request_light(LightLevel::Full, true).unwrap();
        assert_eq!(change, SwitchChange::Buffered(None));
        assert_eq!(switches.pending_light(), None);
        assert_eq!(
            switches.request_light(LightLevel::Full, true).unwrap(),
            SwitchChange::Unchanged
        );
    }

    #[test]
    fn rejects_levels_off_the_switch() {
        let mut switches = Switches::new(LightOptionCount::Three, LightLevel::Full, true);
        assert!(switches.request_light(LightLevel::Half, false).is_ok());
        let err = switches.request_light(LightLevel::Quarter, false).unwrap_err();
        assert!(matches!(err, CycleError::UnsupportedLight { .. }));
    }

    #[test]
    fn water_requires_enabled_control() {
        let mut switches = Switches::new(LightOptionCount::Two, LightLevel::Full, false);
        let err = switches.request_water(WaterLevel::Off, false).unwrap_err();
        assert!(matches!(err, CycleError::WaterDisabled));

        let mut switches = Switches::new(LightOptionCount::Two, LightLevel::Full, true);
        switches.request_water(WaterLevel::Off, true).unwrap();
        assert_eq!(switches.water(), WaterLevel::On);
        assert_eq!(switches.effective_water(), WaterLevel::Off);
        switches.resolve();
        assert_eq!(switches.water(), WaterLevel::Off);
    }

    #[test]
    fn light_event_names() {
        assert_eq!(
            light_events(LightLevel::Full, LightLevel::Off),
            vec![EventKind::TurnLightOffButtonClicked]
        );
        assert_eq!(
            light_events(LightLevel::Off, LightLevel::Full),
            vec![EventKind::TurnLightOnButtonClicked]
        );
        assert_eq!(
            light_events(LightLevel::Half, LightLevel::Full),
            vec![EventKind::LightLevelChanged]
        );
        assert_eq!(
            light_events(LightLevel::Off, LightLevel::Half),
            vec![
                EventKind::TurnLightOnButtonClicked,
                EventKind::LightLevelChanged
            ]
        );
        assert!(light_events(LightLevel::Half, LightLevel::Half).is_empty());
    }
}
