//! Configuration loading and typed config structures for the simulation.
//!
//! The canonical configuration lives in `photosim-config.yaml` at the
//! project root. Every key is optional; missing keys take the defaults of
//! the classroom deployment. Keys are snake_case, and the camelCase
//! spellings used by embedding pages are accepted as aliases.

use std::path::Path;

use photosim_feedback::{FeedbackClassifier, FeedbackConfig};
use photosim_types::{LightLevel, LightOptionCount, ResourceTotals};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `photosim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Day count, light switch and glucose model.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Feedback policy, thresholds and templates.
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Which collaborator outputs are shown.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Wall-clock pacing of day animations.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// Templates are validated here too, so a broken template fails at
    /// load time rather than when the first trial is classified.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.num_days == 0 {
            return Err(invalid("simulation.num_days must be at least 1"));
        }
        if !sim.light_option_count.supports(sim.initial_light) {
            return Err(invalid(format!(
                "simulation.initial_light {} is not a position of a {}-way switch",
                sim.initial_light,
                u8::from(sim.light_option_count),
            )));
        }
        if sim.glucose_per_full_day < 0 || sim.glucose_used_per_day < 0 {
            return Err(invalid("glucose rates must not be negative"));
        }
        if sim.seed_totals().is_none() {
            return Err(invalid("simulation.initial_created - initial_used overflows"));
        }
        if self.pacing.day_duration_ms == 0 {
            return Err(invalid("pacing.day_duration_ms must be at least 1"));
        }
        if !(self.pacing.speed_ratio > 0.0 && self.pacing.speed_ratio <= 1.0) {
            return Err(invalid(format!(
                "pacing.speed_ratio must be in (0, 1], got {}",
                self.pacing.speed_ratio
            )));
        }
        FeedbackClassifier::new(&self.feedback).map_err(|err| invalid(err.to_string()))?;
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// Day count, light switch and glucose model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Days in one trial before it ends on its own.
    #[serde(default = "default_num_days", alias = "numDays")]
    pub num_days: u32,

    /// Positions on the light switch: 2, 3 or 5.
    #[serde(default, alias = "lightOptionCount")]
    pub light_option_count: LightOptionCount,

    /// Light level when the session opens.
    #[serde(default = "default_initial_light", alias = "initialLight")]
    pub initial_light: LightLevel,

    /// Glucose created on a day with full light and water.
    #[serde(default = "default_glucose_per_full_day", alias = "glucosePerFullDay")]
    pub glucose_per_full_day: i64,

    /// Glucose used every day, light or not.
    #[serde(default = "default_glucose_used_per_day", alias = "glucoseUsedPerDay")]
    pub glucose_used_per_day: i64,

    /// Created total on day 0 of every trial.
    #[serde(default, alias = "initialCreated")]
    pub initial_created: i64,

    /// Used total on day 0 of every trial.
    #[serde(default, alias = "initialUsed")]
    pub initial_used: i64,
}

impl SimulationSettings {
    /// Day-0 totals for every trial, or `None` if they overflow.
    pub const fn seed_totals(&self) -> Option<ResourceTotals> {
        ResourceTotals::from_flows(self.initial_created, self.initial_used)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_days: default_num_days(),
            light_option_count: LightOptionCount::default(),
            initial_light: default_initial_light(),
            glucose_per_full_day: default_glucose_per_full_day(),
            glucose_used_per_day: default_glucose_used_per_day(),
            initial_created: 0,
            initial_used: 0,
        }
    }
}

/// Which collaborator outputs are shown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Whether the graph is drawn at all.
    #[serde(default = "default_true", alias = "showGraph")]
    pub show_graph: bool,

    /// Per-series visibility.
    #[serde(default, alias = "showSeries")]
    pub show_series: SeriesVisibility,

    /// Whether the water control is offered.
    #[serde(default = "default_true", alias = "showWater")]
    pub show_water: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_graph: true,
            show_series: SeriesVisibility::default(),
            show_water: true,
        }
    }
}

/// Visibility of each glucose series on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SeriesVisibility {
    /// Cumulative glucose created.
    #[serde(default = "default_true")]
    pub created: bool,
    /// Cumulative glucose used.
    #[serde(default = "default_true")]
    pub used: bool,
    /// Glucose stored.
    #[serde(default = "default_true")]
    pub stored: bool,
}

impl SeriesVisibility {
    /// Whether `kind` is drawn.
    pub const fn shows(&self, kind: photosim_types::SeriesKind) -> bool {
        match kind {
            photosim_types::SeriesKind::Created => self.created,
            photosim_types::SeriesKind::Used => self.used,
            photosim_types::SeriesKind::Stored => self.stored,
        }
    }
}

impl Default for SeriesVisibility {
    fn default() -> Self {
        Self {
            created: true,
            used: true,
            stored: true,
        }
    }
}

/// Wall-clock pacing of day animations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PacingConfig {
    /// Duration of one day's phase sequence at speed ratio 1.
    #[serde(default = "default_day_duration_ms", alias = "dayDurationMs")]
    pub day_duration_ms: u64,

    /// Initial speed ratio in `(0, 1]`; smaller is faster.
    #[serde(default = "default_speed_ratio", alias = "speedRatio")]
    pub speed_ratio: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            day_duration_ms: default_day_duration_ms(),
            speed_ratio: default_speed_ratio(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_num_days() -> u32 {
    20
}

const fn default_initial_light() -> LightLevel {
    LightLevel::Full
}

const fn default_glucose_per_full_day() -> i64 {
    4
}

const fn default_glucose_used_per_day() -> i64 {
    2
}

const fn default_day_duration_ms() -> u64 {
    4_000
}

const fn default_speed_ratio() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use photosim_feedback::FeedbackPolicy;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.num_days, 20);
        assert_eq!(config.simulation.light_option_count, LightOptionCount::Two);
        assert_eq!(config.simulation.initial_light, LightLevel::Full);
        assert_eq!(config.feedback.policy(), FeedbackPolicy::None);
        assert!(config.display.show_graph);
        assert!(config.display.show_water);
        assert_eq!(config.pacing.day_duration_ms, 4_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  num_days: 10
  light_option_count: 5
  initial_light: threeQuarters
  glucose_per_full_day: 8
feedback:
  policy: experimentA
display:
  show_graph: true
  show_series:
    used: false
  show_water: false
pacing:
  day_duration_ms: 1000
  speed_ratio: 0.5
logging:
  level: debug
  format: json
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.num_days, 10);
        assert_eq!(config.simulation.light_option_count, LightOptionCount::Five);
        assert_eq!(config.simulation.initial_light, LightLevel::ThreeQuarters);
        assert_eq!(config.simulation.glucose_per_full_day, 8);
        assert_eq!(config.simulation.glucose_used_per_day, 2);
        assert_eq!(config.feedback.policy(), FeedbackPolicy::ExperimentA);
        assert!(!config.display.show_series.used);
        assert!(config.display.show_series.stored);
        assert!(!config.display.show_water);
        assert_eq!(config.pacing.speed_ratio, 0.5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn camel_case_aliases() {
        let yaml = r"
simulation:
  numDays: 5
  lightOptionCount: 3
display:
  showGraph: false
feedback:
  feedbackPolicy: experimentB
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.num_days, 5);
        assert_eq!(config.simulation.light_option_count, LightOptionCount::Three);
        assert!(!config.display.show_graph);
        assert_eq!(config.feedback.policy(), FeedbackPolicy::ExperimentB);
    }

    #[test]
    fn rejects_unsupported_light_option_count() {
        let err = SimulationConfig::parse("simulation:\n  light_option_count: 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn rejects_initial_light_off_the_switch() {
        let err = SimulationConfig::parse("simulation:\n  initial_light: half\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_bad_speed_ratio_and_zero_days() {
        assert!(SimulationConfig::parse("pacing:\n  speed_ratio: 0\n").is_err());
        assert!(SimulationConfig::parse("pacing:\n  speed_ratio: 1.5\n").is_err());
        assert!(SimulationConfig::parse("simulation:\n  num_days: 0\n").is_err());
    }

    #[test]
    fn broken_template_fails_at_load() {
        let yaml = r"
feedback:
  policy: default
  templates:
    tooShort: [-1, 1]
";
        let err = SimulationConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn from_file_reads_disk() {
        let path = std::env::temp_dir().join(format!(
            "photosim-config-test-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "simulation:\n  num_days: 7\n").unwrap();
        let config = SimulationConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.simulation.num_days, 7);

        let missing = SimulationConfig::from_file(Path::new("/nonexistent/photosim.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config =
            SimulationConfig::parse(include_str!("../../../photosim-config.yaml")).unwrap();
        let expected = SimulationConfig {
            feedback: FeedbackConfig {
                policy: Some("default".to_owned()),
                ..FeedbackConfig::default()
            },
            ..SimulationConfig::default()
        };
        assert_eq!(config, expected);
    }
}
