use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{defaults, timing};
use crate::error::MorseError;
use crate::symbol_table::Mark;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MessageConfig {
    #[serde(default = "default_text")]
    pub text: String,
}

fn default_text() -> String {
    defaults::TEXT.to_string()
}

impl Default for MessageConfig {
    fn default() -> Self {
        MessageConfig { text: default_text() }
    }
}

/// Timing constants every Morse duration is derived from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_dot_duration")]
    pub dot_duration_ms: f64,
    #[serde(default = "default_pitch")]
    pub pitch_hz: f64,
    /// Silence stretch divisor: one silence unit lasts `dot_duration_ms * 1000 / gap_scale` ms
    #[serde(default = "default_gap_scale")]
    pub gap_scale: f64,
    #[serde(default)]
    pub word_gap: WordGapMode,
}

/// How a word gap combines with the letter gap that precedes it
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WordGapMode {
    /// Every separator adds its own extra silence (letter gap + word gap = 9 units)
    #[default]
    Additive,
    /// A word gap tops the silence since the last tone up to exactly 7 units
    Absolute,
}

fn default_dot_duration() -> f64 {
    defaults::DOT_DURATION_MS
}

fn default_pitch() -> f64 {
    defaults::PITCH_HZ
}

fn default_gap_scale() -> f64 {
    defaults::GAP_SCALE
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            dot_duration_ms: default_dot_duration(),
            pitch_hz: default_pitch(),
            gap_scale: default_gap_scale(),
            word_gap: WordGapMode::default(),
        }
    }
}

impl TimingConfig {
    pub fn new(dot_duration_ms: f64, pitch_hz: f64, gap_scale: f64) -> Result<Self, MorseError> {
        let timing = TimingConfig {
            dot_duration_ms,
            pitch_hz,
            gap_scale,
            word_gap: WordGapMode::default(),
        };
        timing.validate()?;
        Ok(timing)
    }

    pub fn with_word_gap(mut self, word_gap: WordGapMode) -> Self {
        self.word_gap = word_gap;
        self
    }

    /// Every parameter must be a finite positive number, and every duration derived
    /// from them (dash tone, full word gap) must fit in a `Duration`
    pub fn validate(&self) -> Result<(), MorseError> {
        for (parameter, value) in [
            ("dot_duration_ms", self.dot_duration_ms),
            ("pitch_hz", self.pitch_hz),
            ("gap_scale", self.gap_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MorseError::InvalidTimingConfig { parameter, value });
            }
        }

        let dash = Duration::try_from_secs_f64(self.tone_secs(timing::DASH_UNITS));
        if self.dot_duration_ms > timing::MAX_DOT_DURATION_MS || dash.is_err() {
            return Err(MorseError::InvalidTimingConfig {
                parameter: "dot_duration_ms",
                value: self.dot_duration_ms,
            });
        }

        let word_gap = Duration::try_from_secs_f64(self.silence_unit_secs())
            .ok()
            .and_then(|unit| unit.checked_mul(timing::WORD_GAP_TOTAL_UNITS));
        if word_gap.is_none() {
            return Err(MorseError::InvalidTimingConfig {
                parameter: "gap_scale",
                value: self.gap_scale,
            });
        }

        Ok(())
    }

    fn tone_secs(&self, units: u32) -> f64 {
        self.dot_duration_ms * units as f64 / 1000.0
    }

    fn silence_unit_secs(&self) -> f64 {
        self.dot_duration_ms * timing::NEUTRAL_GAP_SCALE / self.gap_scale / 1000.0
    }

    /// Nominal tone length: 1 unit for a dot, 3 for a dash
    pub fn tone_duration(&self, mark: Mark) -> Duration {
        let units = match mark {
            Mark::Dot => 1,
            Mark::Dash => timing::DASH_UNITS,
        };
        Duration::from_secs_f64(self.tone_secs(units))
    }

    /// Length of one unit of silence after applying gap_scale
    pub fn silence_unit(&self) -> Duration {
        Duration::from_secs_f64(self.silence_unit_secs())
    }

    pub fn silence(&self, units: u32) -> Duration {
        self.silence_unit() * units
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    /// Tone amplitude relative to full 16-bit scale
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
}

fn default_amplitude() -> f64 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { amplitude: default_amplitude() }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".morse-player"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.yaml"))
    }

    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            log::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;

        if !(self.audio.amplitude > 0.0 && self.audio.amplitude <= 1.0) {
            bail!("amplitude must be in (0.0, 1.0] (got {})", self.audio.amplitude);
        }

        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context("Failed to create config directory")?;
        }

        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs::write(path, yaml)
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let timing = TimingConfig::default();
        assert_eq!(timing.dot_duration_ms, 42.0);
        assert_eq!(timing.pitch_hz, 2000.0);
        assert_eq!(timing.gap_scale, 300.0);
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("timing:\n  dot_duration_ms: 60\n").unwrap();
        assert_eq!(config.timing.dot_duration_ms, 60.0);
        assert_eq!(config.timing.pitch_hz, 2000.0);
        assert_eq!(config.message.text, defaults::TEXT);
        assert_eq!(config.timing.word_gap, WordGapMode::Additive);
    }

    #[test]
    fn test_word_gap_mode_from_yaml() {
        let config = Config::from_yaml("timing:\n  word_gap: absolute\n").unwrap();
        assert_eq!(config.timing.word_gap, WordGapMode::Absolute);
        assert!(Config::from_yaml("timing:\n  word_gap: sometimes\n").is_err());
    }

    #[test]
    fn test_rejects_non_positive_timing() {
        let err = TimingConfig::new(42.0, 0.0, 300.0).unwrap_err();
        assert_eq!(err, MorseError::InvalidTimingConfig { parameter: "pitch_hz", value: 0.0 });

        assert!(TimingConfig::new(-1.0, 2000.0, 300.0).is_err());
        assert!(TimingConfig::new(42.0, 2000.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_yaml_timing_is_typed_error() {
        let err = Config::from_yaml("timing:\n  gap_scale: 0\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MorseError>(),
            Some(MorseError::InvalidTimingConfig { parameter: "gap_scale", .. })
        ));
    }

    #[test]
    fn test_rejects_durations_that_overflow() {
        let err = TimingConfig::new(42.0, 2000.0, 1e-20).unwrap_err();
        assert_eq!(err, MorseError::InvalidTimingConfig { parameter: "gap_scale", value: 1e-20 });

        let err = TimingConfig::new(1e300, 2000.0, 300.0).unwrap_err();
        assert_eq!(err, MorseError::InvalidTimingConfig { parameter: "dot_duration_ms", value: 1e300 });

        assert!(TimingConfig::new(timing::MAX_DOT_DURATION_MS * 2.0, 2000.0, 300.0).is_err());
    }

    #[test]
    fn test_extreme_but_valid_timing_builds_durations() {
        let slow = TimingConfig::new(timing::MAX_DOT_DURATION_MS, 2000.0, 1e-3).unwrap();
        assert!(slow.silence(timing::WORD_GAP_TOTAL_UNITS) > slow.tone_duration(Mark::Dash));
    }

    #[test]
    fn test_rejects_bad_amplitude() {
        assert!(Config::from_yaml("audio:\n  amplitude: 1.5\n").is_err());
        assert!(Config::from_yaml("audio:\n  amplitude: 0\n").is_err());
    }

    #[test]
    fn test_durations() {
        let timing = TimingConfig::new(42.0, 2000.0, 1000.0).unwrap();
        assert_eq!(timing.tone_duration(Mark::Dot), Duration::from_millis(42));
        assert_eq!(timing.tone_duration(Mark::Dash), Duration::from_millis(126));
        assert_eq!(timing.silence_unit(), Duration::from_millis(42));
        assert_eq!(timing.silence(7), Duration::from_millis(294));
    }

    #[test]
    fn test_gap_scale_stretches_silence() {
        let timing = TimingConfig::new(42.0, 2000.0, 300.0).unwrap();
        assert_eq!(timing.silence_unit(), Duration::from_millis(140));
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("morse-player-test-{}.yaml", std::process::id()));
        let mut config = Config::default();
        config.message.text = "SOS".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }
}
