// Configuration management for the market simulator

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::core::instrument::{InstrumentKind, InstrumentSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub ticks: usize,
    pub std_min: f64,             // Quote noise at the final tick
    pub std_max: f64,             // Quote noise at tick 0
    pub settlement_std: f64,      // Settlement noise around theo
    pub cross_prob: f64,          // Chance a generated quote is marketable
    pub max_depth: usize,         // Entries kept per side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            ticks: 35,
            std_min: 5.0,
            std_max: 50.0,
            settlement_std: 25.0,
            cross_prob: 0.4,
            max_depth: 5,
            seed: None,
        }
    }
}

/// How long the player gets per window. Harder means shorter review windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 3.0,
            Difficulty::Medium => 2.0,
            Difficulty::Hard => 1.0,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ConfigError::Validation(format!(
                "unknown difficulty '{}', expected easy, medium or hard",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    pub action_window_secs: f64,  // First window, right after quotes print
    pub review_min_secs: f64,     // Second window lower bound before the multiplier
    pub review_max_secs: f64,
    pub difficulty: Difficulty,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            action_window_secs: 1.5,
            review_min_secs: 0.2,
            review_max_secs: 2.0,
            difficulty: Difficulty::Hard,
        }
    }
}

impl TimingConfig {
    pub fn action_window(&self) -> Duration {
        Duration::from_secs_f64(self.action_window_secs.max(0.0))
    }

    /// Second window for one tick, a whole number of seconds
    pub fn review_window<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let m = self.difficulty.multiplier();
        let (low, high) = (self.review_min_secs * m, self.review_max_secs * m);
        let secs = if low < high { rng.gen_range(low..high) } else { low };
        Duration::from_secs_f64(secs.round().max(0.0))
    }

    /// Every window closes immediately
    pub fn instant() -> Self {
        Self {
            action_window_secs: 0.0,
            review_min_secs: 0.0,
            review_max_secs: 0.0,
            difficulty: Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub market: MarketConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    pub instruments: Vec<InstrumentSpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            timing: TimingConfig::default(),
            instruments: vec![
                InstrumentSpec {
                    name: "Future A".to_string(),
                    label: "a".to_string(),
                    kind: InstrumentKind::Future { theo_min: 250.0, theo_max: 400.0 },
                },
                InstrumentSpec {
                    name: "Future B".to_string(),
                    label: "b".to_string(),
                    kind: InstrumentKind::Future { theo_min: 100.0, theo_max: 250.0 },
                },
                InstrumentSpec {
                    name: "A-B Spread".to_string(),
                    label: "s".to_string(),
                    kind: InstrumentKind::Spread {
                        long: "a".to_string(),
                        short: "b".to_string(),
                    },
                },
            ],
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.market;
        let t = &self.timing;
        require_finite("market", &[
            ("std_min", m.std_min),
            ("std_max", m.std_max),
            ("settlement_std", m.settlement_std),
            ("cross_prob", m.cross_prob),
        ])?;
        require_finite("timing", &[
            ("action_window_secs", t.action_window_secs),
            ("review_min_secs", t.review_min_secs),
            ("review_max_secs", t.review_max_secs),
        ])?;

        if m.ticks == 0 {
            return Err(ConfigError::Validation("ticks must be greater than 0".to_string()));
        }

        if m.std_min < 0.0 || m.std_max < m.std_min {
            return Err(ConfigError::Validation(
                "volatility range must satisfy 0 <= std_min <= std_max".to_string(),
            ));
        }

        if m.settlement_std < 0.0 {
            return Err(ConfigError::Validation("settlement_std must be non-negative".to_string()));
        }

        if !(0.0..=1.0).contains(&m.cross_prob) {
            return Err(ConfigError::Validation("cross_prob must be between 0 and 1".to_string()));
        }

        if m.max_depth == 0 {
            return Err(ConfigError::Validation("max_depth must be greater than 0".to_string()));
        }

        if t.action_window_secs < 0.0 || t.review_min_secs < 0.0 || t.review_max_secs < t.review_min_secs {
            return Err(ConfigError::Validation(
                "timing windows must be non-negative with review_min_secs <= review_max_secs".to_string(),
            ));
        }

        if t.action_window_secs > MAX_WINDOW_SECS || t.review_max_secs > MAX_WINDOW_SECS {
            return Err(ConfigError::Validation(format!(
                "timing windows must not exceed {} seconds",
                MAX_WINDOW_SECS
            )));
        }

        self.validate_instruments()
    }

    fn validate_instruments(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Validation("at least one instrument is required".to_string()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &self.instruments {
            let mut chars = spec.label.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "instrument label '{}' must be a single letter or digit",
                        spec.label
                    )));
                }
            }

            match &spec.kind {
                InstrumentKind::Future { theo_min, theo_max } => {
                    require_finite(&spec.name, &[("theo_min", *theo_min), ("theo_max", *theo_max)])?;
                }
                InstrumentKind::Call { strike, .. } | InstrumentKind::Put { strike, .. } => {
                    require_finite(&spec.name, &[("strike", *strike)])?;
                }
                InstrumentKind::Spread { .. } => {}
            }

            if let InstrumentKind::Future { theo_min, theo_max } = spec.kind {
                if theo_min > theo_max {
                    return Err(ConfigError::Validation(format!(
                        "{}: theo_min must not exceed theo_max",
                        spec.name
                    )));
                }
            }

            for dep in spec.kind.dependencies() {
                if !seen.contains(dep) {
                    return Err(ConfigError::Validation(format!(
                        "{} depends on '{}', which must be declared before it",
                        spec.name, dep
                    )));
                }
            }

            if !seen.insert(spec.label.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate instrument label '{}'",
                    spec.label
                )));
            }
        }

        Ok(())
    }
}

/// Upper bound on any single input window
const MAX_WINDOW_SECS: f64 = 3600.0;

/// TOML happily parses `inf` and `nan`; none of our numbers may be either
fn require_finite(owner: &str, values: &[(&str, f64)]) -> Result<(), ConfigError> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, v)) => Err(ConfigError::Validation(format!(
            "{}: {} must be a finite number, got {}",
            owner, name, v
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_cross_prob() {
        let mut config = SessionConfig::default();
        config.market.cross_prob = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_inverted_volatility() {
        let mut config = SessionConfig::default();
        config.market.std_min = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_and_long_labels() {
        let mut config = SessionConfig::default();
        config.instruments[1].label = "a".to_string();
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.instruments[0].label = "aa".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_forward_dependency() {
        let mut config = SessionConfig::default();
        config.instruments.swap(0, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("insane".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_review_window_scales_with_difficulty() {
        let mut rng = StdRng::seed_from_u64(4);
        let timing = TimingConfig {
            action_window_secs: 1.0,
            review_min_secs: 2.0,
            review_max_secs: 4.0,
            difficulty: Difficulty::Easy,
        };
        for _ in 0..50 {
            let secs = timing.review_window(&mut rng).as_secs_f64();
            assert!((6.0..=12.0).contains(&secs));
            assert_eq!(secs, secs.round());
        }
        assert_eq!(TimingConfig::instant().review_window(&mut rng), Duration::ZERO);
    }
}
