use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use varcon_core::errors::VarconError;
use varcon_io::OutputFormat;

pub const DEFAULT_CATEGORY_COLUMN: &str = "category";
pub const DEFAULT_IMPACT_COLUMN: &str = "ANN[0].IMPACT";
pub const DEFAULT_GENE_COLUMN: &str = "ANN[0].GENE";
pub const DEFAULT_POPULATION_AF_COLUMN: &str = "Freq_gnomAD_genome_ALL";
pub const DEFAULT_CADD_COLUMN: &str = "CADD_phred";
pub const DEFAULT_CLNSIGCONF_COLUMN: &str = "CLNSIGCONF";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file must have a `toml` extension: {0}")]
    InvalidFileType(PathBuf),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for VarconError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => VarconError::Io(e),
            other => VarconError::InvalidConfig(other.to_string()),
        }
    }
}

fn default_category_column() -> String {
    DEFAULT_CATEGORY_COLUMN.to_string()
}

fn default_impact_column() -> String {
    DEFAULT_IMPACT_COLUMN.to_string()
}

fn default_gene_column() -> String {
    DEFAULT_GENE_COLUMN.to_string()
}

fn default_population_af_column() -> String {
    DEFAULT_POPULATION_AF_COLUMN.to_string()
}

fn default_cadd_column() -> String {
    DEFAULT_CADD_COLUMN.to_string()
}

fn default_clnsigconf_column() -> String {
    DEFAULT_CLNSIGCONF_COLUMN.to_string()
}

///
/// Ranker configuration. Every prefilter is off unless set.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PrioritizeConfig {
    /// Number of records to report; 0 reports all of them.
    #[serde(default)]
    pub top_n: usize,
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub exclude_benign: bool,
    pub max_population_af: Option<f64>,
    #[serde(default = "default_population_af_column")]
    pub population_af_column: String,
    pub min_cadd: Option<f64>,
    #[serde(default = "default_cadd_column")]
    pub cadd_column: String,
    /// One gene symbol per line; only listed genes are kept.
    pub genes: Option<PathBuf>,
    #[serde(default = "default_gene_column")]
    pub gene_column: String,

    #[serde(default = "default_category_column")]
    pub category_column: String,
    #[serde(default = "default_impact_column")]
    pub impact_column: String,
    #[serde(default = "default_clnsigconf_column")]
    pub clnsigconf_column: String,
}

impl Default for PrioritizeConfig {
    fn default() -> Self {
        PrioritizeConfig {
            top_n: 0,
            format: OutputFormat::default(),
            exclude_benign: false,
            max_population_af: None,
            population_af_column: default_population_af_column(),
            min_cadd: None,
            cadd_column: default_cadd_column(),
            genes: None,
            gene_column: default_gene_column(),
            category_column: default_category_column(),
            impact_column: default_impact_column(),
            clnsigconf_column: default_clnsigconf_column(),
        }
    }
}

impl PrioritizeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(af) = self.max_population_af {
            if !(0.0..=1.0).contains(&af) {
                return Err(ConfigError::Invalid(format!(
                    "max_population_af must be within [0, 1], got {}",
                    af
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&Path> for PrioritizeConfig {
    type Error = ConfigError;

    fn try_from(value: &Path) -> ConfigResult<Self> {
        if value.extension() != Some(OsStr::new("toml")) {
            return Err(ConfigError::InvalidFileType(value.to_path_buf()));
        }
        let toml_str = read_to_string(value)?;
        let config: PrioritizeConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parse_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prio.toml");
        fs::write(
            &path,
            "top_n = 50\nformat = \"json\"\nexclude_benign = true\nmax_population_af = 0.01\n",
        )
        .unwrap();

        let config = PrioritizeConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.top_n, 50);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.exclude_benign);
        assert_eq!(config.max_population_af, Some(0.01));
        assert_eq!(config.population_af_column, "Freq_gnomAD_genome_ALL");
        assert_eq!(config.impact_column, "ANN[0].IMPACT");
    }

    #[rstest]
    fn test_empty_config_is_default() {
        let config: PrioritizeConfig = toml::from_str("").unwrap();
        assert_eq!(config, PrioritizeConfig::default());
    }

    #[rstest]
    fn test_reject_out_of_range_af() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prio.toml");
        fs::write(&path, "max_population_af = 5.0\n").unwrap();
        assert!(matches!(
            PrioritizeConfig::try_from(path.as_path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[rstest]
    fn test_reject_unknown_keys_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prio.toml");
        fs::write(&path, "topn = 5\n").unwrap();
        assert!(matches!(
            PrioritizeConfig::try_from(path.as_path()),
            Err(ConfigError::Toml(_))
        ));

        let yaml = dir.path().join("prio.yaml");
        fs::write(&yaml, "").unwrap();
        assert!(matches!(
            PrioritizeConfig::try_from(yaml.as_path()),
            Err(ConfigError::InvalidFileType(_))
        ));
    }
}
