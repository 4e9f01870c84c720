//! Enumeration types for the photosynthesis simulation.
//!
//! Everything the simulation records or branches on is a closed enum:
//! event kinds, light and water levels, template codes, series kinds, and
//! the day-cycle states. Host-facing names (event names, configuration
//! values) are parsed into these enums at the boundary.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The kind of an event recorded in a trial's event log.
///
/// Events serialize as their camelCase name (`"startButtonClicked"`), which
/// is also the vocabulary hosts use when recording events by name. Names
/// that are not part of the recognized set are kept verbatim in
/// [`EventKind::Unrecognized`] so that replaying an old log never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// The student pressed start.
    StartButtonClicked,
    /// The student paused a running simulation.
    PauseButtonClicked,
    /// The student resumed a paused simulation.
    ResumeButtonClicked,
    /// The student reset the simulation, ending the current trial.
    ResetButtonClicked,
    /// The light was switched off.
    TurnLightOffButtonClicked,
    /// The light was switched on.
    TurnLightOnButtonClicked,
    /// The light moved between two non-off intensities.
    LightLevelChanged,
    /// Water was switched on.
    TurnWaterOnButtonClicked,
    /// Water was switched off.
    TurnWaterOffButtonClicked,
    /// The animation speed ratio changed.
    SpeedChanged,
    /// Stored glucose went negative on a dark day.
    PlantDied,
    /// The configured number of days elapsed.
    SimulationEnded,
    /// Any other event name supplied by a host.
    Unrecognized(String),
}

impl EventKind {
    /// The wire name of this event kind.
    pub fn name(&self) -> &str {
        match self {
            Self::StartButtonClicked => "startButtonClicked",
            Self::PauseButtonClicked => "pauseButtonClicked",
            Self::ResumeButtonClicked => "resumeButtonClicked",
            Self::ResetButtonClicked => "resetButtonClicked",
            Self::TurnLightOffButtonClicked => "turnLightOffButtonClicked",
            Self::TurnLightOnButtonClicked => "turnLightOnButtonClicked",
            Self::LightLevelChanged => "lightLevelChanged",
            Self::TurnWaterOnButtonClicked => "turnWaterOnButtonClicked",
            Self::TurnWaterOffButtonClicked => "turnWaterOffButtonClicked",
            Self::SpeedChanged => "speedChanged",
            Self::PlantDied => "plantDied",
            Self::SimulationEnded => "simulationEnded",
            Self::Unrecognized(name) => name,
        }
    }

    /// Parse a host-supplied event name. Unknown names are preserved.
    pub fn from_name(name: &str) -> Self {
        match name {
            "startButtonClicked" => Self::StartButtonClicked,
            "pauseButtonClicked" => Self::PauseButtonClicked,
            "resumeButtonClicked" => Self::ResumeButtonClicked,
            "resetButtonClicked" => Self::ResetButtonClicked,
            "turnLightOffButtonClicked" => Self::TurnLightOffButtonClicked,
            "turnLightOnButtonClicked" => Self::TurnLightOnButtonClicked,
            "lightLevelChanged" => Self::LightLevelChanged,
            "turnWaterOnButtonClicked" => Self::TurnWaterOnButtonClicked,
            "turnWaterOffButtonClicked" => Self::TurnWaterOffButtonClicked,
            "speedChanged" => Self::SpeedChanged,
            "plantDied" => Self::PlantDied,
            "simulationEnded" => Self::SimulationEnded,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    /// Whether this kind is part of the recognized vocabulary.
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        match Self::from_name(&name) {
            Self::Unrecognized(_) => Self::Unrecognized(name),
            known => known,
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Unrecognized(name) => name,
            known => known.name().to_owned(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Light
// ---------------------------------------------------------------------------

/// A light intensity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum LightLevel {
    /// No light.
    Off,
    /// 25% intensity.
    Quarter,
    /// 50% intensity (the "half" setting of the three-way switch).
    Half,
    /// 75% intensity.
    ThreeQuarters,
    /// Full intensity (the "on" setting of the two-way switch).
    Full,
}

impl LightLevel {
    /// Intensity as a percentage in `0..=100`.
    pub const fn percent(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Quarter => 25,
            Self::Half => 50,
            Self::ThreeQuarters => 75,
            Self::Full => 100,
        }
    }

    /// Look up a level from its percentage.
    pub const fn from_percent(percent: u8) -> Option<Self> {
        match percent {
            0 => Some(Self::Off),
            25 => Some(Self::Quarter),
            50 => Some(Self::Half),
            75 => Some(Self::ThreeQuarters),
            100 => Some(Self::Full),
            _ => None,
        }
    }

    /// Whether any light reaches the plant.
    pub const fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Display colour for the sky/lamp at this level (CSS hex).
    pub const fn display_color(self) -> &'static str {
        match self {
            Self::Off => "#1c1c3a",
            Self::Quarter => "#6d6f4a",
            Self::Half => "#a7a95a",
            Self::ThreeQuarters => "#d8d96b",
            Self::Full => "#fffb84",
        }
    }
}

impl fmt::Display for LightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Error returned when a light option count is not 2, 3 or 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("light option count must be 2, 3 or 5, got {0}")]
pub struct InvalidLightOptionCount(pub u8);

/// How many positions the light switch offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LightOptionCount {
    /// On / off.
    #[default]
    Two,
    /// Off / half / on.
    Three,
    /// Off / 25 / 50 / 75 / 100.
    Five,
}

impl LightOptionCount {
    /// The levels selectable with this switch, dimmest first.
    pub const fn levels(self) -> &'static [LightLevel] {
        match self {
            Self::Two => &[LightLevel::Off, LightLevel::Full],
            Self::Three => &[LightLevel::Off, LightLevel::Half, LightLevel::Full],
            Self::Five => &[
                LightLevel::Off,
                LightLevel::Quarter,
                LightLevel::Half,
                LightLevel::ThreeQuarters,
                LightLevel::Full,
            ],
        }
    }

    /// Whether `level` is one of this switch's positions.
    pub fn supports(self, level: LightLevel) -> bool {
        self.levels().contains(&level)
    }
}

impl TryFrom<u8> for LightOptionCount {
    type Error = InvalidLightOptionCount;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            other => Err(InvalidLightOptionCount(other)),
        }
    }
}

impl From<LightOptionCount> for u8 {
    fn from(count: LightOptionCount) -> Self {
        match count {
            LightOptionCount::Two => 2,
            LightOptionCount::Three => 3,
            LightOptionCount::Five => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

/// Whether the plant is being watered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum WaterLevel {
    /// Water available; photosynthesis can proceed.
    #[default]
    On,
    /// No water; no glucose is created regardless of light.
    Off,
}

impl WaterLevel {
    /// Whether water is available.
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Error returned when a template slot holds a code outside `-1..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("template code must be -1, 0, 1 or 2, got {0}")]
pub struct InvalidTemplateCode(pub i8);

/// One slot of a behaviour template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum TemplateCode {
    /// `-1`: no constraint for this day.
    DontCare,
    /// `0`: the light was off (or the plant dead) on this day.
    LightOffOrDead,
    /// `1`: the light was on and produced glucose on this day.
    LightOn,
    /// `2`: the plant was dead on this day.
    Dead,
}

impl TryFrom<i8> for TemplateCode {
    type Error = InvalidTemplateCode;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::DontCare),
            0 => Ok(Self::LightOffOrDead),
            1 => Ok(Self::LightOn),
            2 => Ok(Self::Dead),
            other => Err(InvalidTemplateCode(other)),
        }
    }
}

impl From<TemplateCode> for i8 {
    fn from(code: TemplateCode) -> Self {
        match code {
            TemplateCode::DontCare => -1,
            TemplateCode::LightOffOrDead => 0,
            TemplateCode::LightOn => 1,
            TemplateCode::Dead => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Series and cycle state
// ---------------------------------------------------------------------------

/// Which cumulative glucose series a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum SeriesKind {
    /// Glucose created by photosynthesis.
    Created,
    /// Glucose used by respiration.
    Used,
    /// Glucose stored (`created - used`).
    Stored,
}

impl SeriesKind {
    /// All series in display order.
    pub const ALL: [Self; 3] = [Self::Created, Self::Used, Self::Stored];
}

/// State of the day-cycle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum CycleState {
    /// Not started, or reset.
    #[default]
    Stopped,
    /// Days are advancing.
    Running,
    /// Temporarily halted by the student.
    Paused,
    /// The trial is over (plant died or day limit reached).
    Ended,
}

/// Why a trial reached [`CycleState::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum EndReason {
    /// Stored glucose dropped below zero on a dark day.
    PlantDied,
    /// All configured days were simulated.
    DayLimitReached,
    /// The student reset before the trial ended on its own.
    Reset,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_names_round_trip() {
        for kind in [
            EventKind::StartButtonClicked,
            EventKind::PauseButtonClicked,
            EventKind::PlantDied,
            EventKind::SimulationEnded,
            EventKind::TurnLightOffButtonClicked,
        ] {
            assert_eq!(EventKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn unrecognized_event_names_are_preserved() {
        let kind = EventKind::from(String::from("graphToggled"));
        assert_eq!(kind, EventKind::Unrecognized(String::from("graphToggled")));
        assert!(!kind.is_recognized());
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"graphToggled\"");
    }

    #[test]
    fn event_kind_serializes_as_camel_case_name() {
        let json = serde_json::to_string(&EventKind::TurnLightOnButtonClicked).unwrap();
        assert_eq!(json, "\"turnLightOnButtonClicked\"");
        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventKind::TurnLightOnButtonClicked);
    }

    #[test]
    fn light_option_counts() {
        assert_eq!(LightOptionCount::try_from(2).unwrap().levels().len(), 2);
        assert_eq!(LightOptionCount::try_from(3).unwrap().levels().len(), 3);
        assert_eq!(LightOptionCount::try_from(5).unwrap().levels().len(), 5);
        assert!(LightOptionCount::try_from(4).is_err());
        assert!(!LightOptionCount::Two.supports(LightLevel::Half));
        assert!(LightOptionCount::Three.supports(LightLevel::Half));
    }

    #[test]
    fn light_percent_lookup() {
        assert_eq!(LightLevel::from_percent(75), Some(LightLevel::ThreeQuarters));
        assert_eq!(LightLevel::from_percent(60), None);
        assert!(!LightLevel::Off.is_on());
        assert!(LightLevel::Quarter.is_on());
    }

    #[test]
    fn template_codes_parse_from_integers() {
        let codes: Vec<TemplateCode> = serde_json::from_str("[-1, 0, 1, 2]").unwrap();
        assert_eq!(
            codes,
            vec![
                TemplateCode::DontCare,
                TemplateCode::LightOffOrDead,
                TemplateCode::LightOn,
                TemplateCode::Dead,
            ]
        );
        assert!(serde_json::from_str::<TemplateCode>("3").is_err());
        assert_eq!(TemplateCode::try_from(-2), Err(InvalidTemplateCode(-2)));
    }

    #[test]
    fn conversion_errors_describe_the_bad_value() {
        let err: Box<dyn std::error::Error> = Box::new(InvalidTemplateCode(7));
        assert_eq!(err.to_string(), "template code must be -1, 0, 1 or 2, got 7");
        assert_eq!(
            LightOptionCount::try_from(4).unwrap_err().to_string(),
            "light option count must be 2, 3 or 5, got 4"
        );
    }
}
