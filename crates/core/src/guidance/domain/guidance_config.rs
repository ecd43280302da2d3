use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guidance::domain::alignment::AlignmentThresholds;
use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_BRIGHTNESS_SAMPLE_SCALE,
    DEFAULT_GUIDANCE_REGION_FRACTION, DEFAULT_HOLD_DURATION_MS, DEFAULT_MIN_BRIGHTNESS,
    DEFAULT_MIN_COVERAGE_RATIO, DEFAULT_TOO_CLOSE_RATIO, DEFAULT_TOO_FAR_RATIO,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Tunables for the guidance engine. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Mean luma (0-255) below which the low-light prompt takes over.
    pub min_brightness: f64,
    pub min_coverage_ratio: f64,
    pub too_close_ratio_threshold: f64,
    pub too_far_ratio_threshold: f64,
    pub guidance_region_fraction: f64,
    pub hold_duration_ms: u64,
    pub brightness_sample_scale: f64,
    /// End the session after the first capture.
    pub stop_after_capture: bool,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            min_brightness: DEFAULT_MIN_BRIGHTNESS,
            min_coverage_ratio: DEFAULT_MIN_COVERAGE_RATIO,
            too_close_ratio_threshold: DEFAULT_TOO_CLOSE_RATIO,
            too_far_ratio_threshold: DEFAULT_TOO_FAR_RATIO,
            guidance_region_fraction: DEFAULT_GUIDANCE_REGION_FRACTION,
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            brightness_sample_scale: DEFAULT_BRIGHTNESS_SAMPLE_SCALE,
            stop_after_capture: true,
        }
    }
}

fn check(
    field: &'static str,
    value: f64,
    expected: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

impl GuidanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("min_brightness", self.min_brightness, "between 0 and 255", |v| {
            (0.0..=255.0).contains(&v)
        })?;
        check("min_coverage_ratio", self.min_coverage_ratio, ">= 0", |v| v >= 0.0)?;
        check(
            "too_close_ratio_threshold",
            self.too_close_ratio_threshold,
            ">= 0",
            |v| v >= 0.0,
        )?;
        check(
            "too_far_ratio_threshold",
            self.too_far_ratio_threshold,
            ">= 0",
            |v| v >= 0.0,
        )?;
        check(
            "guidance_region_fraction",
            self.guidance_region_fraction,
            "in (0, 1]",
            |v| v > 0.0 && v <= 1.0,
        )?;
        check(
            "brightness_sample_scale",
            self.brightness_sample_scale,
            "in (0, 1]",
            |v| v > 0.0 && v <= 1.0,
        )?;

        if self.too_far_ratio_threshold > self.too_close_ratio_threshold {
            log::warn!(
                "too_far_ratio_threshold ({}) exceeds too_close_ratio_threshold ({}); \
                 some faces will be flagged both too close and too far",
                self.too_far_ratio_threshold,
                self.too_close_ratio_threshold
            );
        }
        Ok(())
    }

    pub fn alignment_thresholds(&self) -> AlignmentThresholds {
        AlignmentThresholds {
            min_coverage_ratio: self.min_coverage_ratio,
            too_close_ratio: self.too_close_ratio_threshold,
            too_far_ratio: self.too_far_ratio_threshold,
        }
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads and validates a config file, failing on any problem.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the per-user config, falling back to defaults when it is
    /// missing or unusable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = GuidanceConfig::default();
        assert_relative_eq!(config.min_coverage_ratio, 0.3);
        assert_relative_eq!(config.guidance_region_fraction, 0.8);
        assert_eq!(config.hold_duration(), Duration::from_millis(2000));
        assert!(config.stop_after_capture);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: GuidanceConfig =
            serde_json::from_str(r#"{"hold_duration_ms": 1500, "min_brightness": 80.0}"#).unwrap();
        assert_eq!(config.hold_duration_ms, 1500);
        assert_relative_eq!(config.min_brightness, 80.0);
        assert_relative_eq!(config.too_close_ratio_threshold, DEFAULT_TOO_CLOSE_RATIO);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GuidanceConfig {
            min_brightness: 42.0,
            stop_after_capture: false,
            ..GuidanceConfig::default()
        };
        let json = config.to_json().unwrap();
        let parsed: GuidanceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[rstest]
    #[case::brightness_high(GuidanceConfig { min_brightness: 300.0, ..GuidanceConfig::default() }, "min_brightness")]
    #[case::coverage_negative(GuidanceConfig { min_coverage_ratio: -0.1, ..GuidanceConfig::default() }, "min_coverage_ratio")]
    #[case::fraction_zero(GuidanceConfig { guidance_region_fraction: 0.0, ..GuidanceConfig::default() }, "guidance_region_fraction")]
    #[case::scale_nan(GuidanceConfig { brightness_sample_scale: f64::NAN, ..GuidanceConfig::default() }, "brightness_sample_scale")]
    fn test_validate_rejects(#[case] config: GuidanceConfig, #[case] expected_field: &str) {
        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"guidance_region_fraction": 0.9}"#).unwrap();
        let config = GuidanceConfig::load_from(&path).unwrap();
        assert_relative_eq!(config.guidance_region_fraction, 0.9);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GuidanceConfig::load_from(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_from_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GuidanceConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"brightness_sample_scale": 3.0}"#).unwrap();
        assert!(matches!(
            GuidanceConfig::load_from(&path),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_alignment_thresholds_mirror_config() {
        let config = GuidanceConfig::default();
        let t = config.alignment_thresholds();
        assert_relative_eq!(t.min_coverage_ratio, config.min_coverage_ratio);
        assert_relative_eq!(t.too_close_ratio, config.too_close_ratio_threshold);
        assert_relative_eq!(t.too_far_ratio, config.too_far_ratio_threshold);
    }
}
