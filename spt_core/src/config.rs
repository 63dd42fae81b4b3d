//! # Configuration
//!
//! Layered settings for the analysis and report stages, loaded with figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`GEOSPT_*`, `__` separates sections)
//! 2. `geospt.toml` in the working directory, or an explicit file
//! 3. Built-in defaults
//!
//! `GEOSPT_ANALYSIS__SAFETY_FACTOR=2` maps to `analysis.safety_factor`.
//!
//! NBR 6484:2020 tolerances are not configurable; they live next to the
//! validator as constants.
//!
//! ```toml
//! [analysis]
//! soft_layer_max_nspt = 4
//! safety_factor = 3
//!
//! [report]
//! include_photos = false
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::calculations::nbr::DEFAULT_BLOW_LIMIT;
use crate::errors::{SptError, SptResult};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "geospt.toml";
/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "GEOSPT_";

const fn default_soft_layer_max_nspt() -> i32 {
    4
}

const fn default_soft_layer_min_thickness() -> f64 {
    1.0
}

const fn default_foundation_min_nspt() -> i32 {
    8
}

const fn default_foundation_min_thickness() -> f64 {
    2.0
}

const fn default_base_width() -> f64 {
    1.0
}

const fn default_safety_factor() -> u32 {
    3
}

const fn default_blow_limit() -> i32 {
    DEFAULT_BLOW_LIMIT
}

const fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Relatório de Sondagem à Percussão - SPT".to_string()
}

/// Parameters of the geotechnical analysis block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Samples at or below this NSPT count as soft
    #[serde(default = "default_soft_layer_max_nspt")]
    pub soft_layer_max_nspt: i32,
    #[serde(default = "default_soft_layer_min_thickness")]
    pub soft_layer_min_thickness_m: f64,

    /// Samples at or above this NSPT can bear a foundation
    #[serde(default = "default_foundation_min_nspt")]
    pub foundation_min_nspt: i32,
    #[serde(default = "default_foundation_min_thickness")]
    pub foundation_min_thickness_m: f64,

    /// Footing width for the admissible stress estimate
    #[serde(default = "default_base_width")]
    pub base_width_m: f64,
    #[serde(default = "default_safety_factor")]
    pub safety_factor: u32,

    /// Blow count that characterizes refusal
    #[serde(default = "default_blow_limit")]
    pub blow_limit: i32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            soft_layer_max_nspt: default_soft_layer_max_nspt(),
            soft_layer_min_thickness_m: default_soft_layer_min_thickness(),
            foundation_min_nspt: default_foundation_min_nspt(),
            foundation_min_thickness_m: default_foundation_min_thickness(),
            base_width_m: default_base_width(),
            safety_factor: default_safety_factor(),
            blow_limit: default_blow_limit(),
        }
    }
}

impl AnalysisSettings {
    /// Reject values the analysis formulas cannot work with.
    pub fn validate(&self) -> SptResult<()> {
        if self.base_width_m.is_nan() || self.base_width_m <= 0.0 {
            return Err(SptError::invalid_input(
                "analysis.base_width_m",
                self.base_width_m.to_string(),
                "Base width must be positive",
            ));
        }
        if self.safety_factor == 0 {
            return Err(SptError::invalid_input(
                "analysis.safety_factor",
                "0",
                "Safety factor must be at least 1",
            ));
        }
        if self.soft_layer_min_thickness_m < 0.0 || self.foundation_min_thickness_m < 0.0 {
            return Err(SptError::invalid_input(
                "analysis.*_min_thickness_m",
                format!(
                    "{}/{}",
                    self.soft_layer_min_thickness_m, self.foundation_min_thickness_m
                ),
                "Minimum thickness cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Presentation options of the assembled report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub include_photos: bool,
    /// Soft layers, foundation depth, admissible stress, liquefaction
    #[serde(default = "default_true")]
    pub include_analysis: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            include_photos: true,
            include_analysis: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SptConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

impl SptConfig {
    /// Load from defaults, `geospt.toml` (if present) and the environment.
    pub fn load() -> SptResult<Self> {
        Self::extract(Self::figment())
    }

    /// Load with an explicit config file instead of `geospt.toml`.
    ///
    /// # Errors
    ///
    /// `FileError` when `path` does not exist.
    pub fn load_from(path: &Path) -> SptResult<Self> {
        if !path.exists() {
            return Err(SptError::file_error(
                "read config",
                path.display().to_string(),
                "file not found",
            ));
        }
        Self::extract(Self::figment_with(Some(path)))
    }

    /// Provider chain used by [`SptConfig::load`].
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    fn figment_with(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.exists() {
                    figment = figment.merge(Toml::file(local));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> SptResult<Self> {
        let config: SptConfig = figment.extract()?;
        config.analysis.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SptConfig::default();
        assert_eq!(config.analysis.soft_layer_max_nspt, 4);
        assert_eq!(config.analysis.soft_layer_min_thickness_m, 1.0);
        assert_eq!(config.analysis.foundation_min_nspt, 8);
        assert_eq!(config.analysis.foundation_min_thickness_m, 2.0);
        assert_eq!(config.analysis.base_width_m, 1.0);
        assert_eq!(config.analysis.safety_factor, 3);
        assert_eq!(config.analysis.blow_limit, 50);
        assert_eq!(config.report.title, "Relatório de Sondagem à Percussão - SPT");
        assert!(config.report.include_photos);
        assert!(config.report.include_analysis);
    }

    #[test]
    fn test_load_without_sources_gives_defaults() {
        Jail::expect_with(|_jail| {
            let config = SptConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, SptConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_local_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
[analysis]
safety_factor = 2
base_width_m = 1.5

[report]
include_photos = false
"#,
            )?;

            let config = SptConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.analysis.safety_factor, 2);
            assert_eq!(config.analysis.base_width_m, 1.5);
            assert_eq!(config.analysis.soft_layer_max_nspt, 4);
            assert!(!config.report.include_photos);
            assert!(config.report.include_analysis);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[analysis]\nsafety_factor = 2\n")?;
            jail.set_env("GEOSPT_ANALYSIS__SAFETY_FACTOR", "4");
            jail.set_env("GEOSPT_REPORT__TITLE", "Boletim SPT");

            let config: SptConfig = SptConfig::figment().extract()?;
            assert_eq!(config.analysis.safety_factor, 4);
            assert_eq!(config.report.title, "Boletim SPT");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[analysis]\nfoundation_min_nspt = 12\n")?;
            let config = SptConfig::load_from(Path::new("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.analysis.foundation_min_nspt, 12);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = SptConfig::load_from(Path::new("nope.toml")).unwrap_err();
            assert_eq!(err.error_code(), "FILE_ERROR");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_analysis_values_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("GEOSPT_ANALYSIS__SAFETY_FACTOR", "0");
            let err = SptConfig::load().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[analysis]\nsafety_factor = \"three\"\n")?;
            let err = SptConfig::load().unwrap_err();
            assert_eq!(err.error_code(), "CONFIG_ERROR");
            Ok(())
        });
    }
}
