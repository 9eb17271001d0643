//! Pipeline configuration and database path resolution
//!
//! Column names drift from one survey year to the next, so each dimension
//! carries a year -> column selector table. Adding a survey year is a
//! configuration change only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::source::is_valid_identifier;
use crate::trend::CanonicalMapping;
use crate::{validate_dimension, Dimension, Error, Result};

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "DEVTREND_DB_PATH";

/// Compiled default database location
pub const DEFAULT_DB_PATH: &str = "data/devtrend.db";

/// Default multi-value separator used by the survey exports
pub const DEFAULT_SEPARATOR: &str = ";";

/// Where to read one year's have/want answers from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSource {
    pub year: i64,
    /// Raw per-year table, e.g. `survey_results_2019`
    pub source: String,
    /// Column holding "worked with" answers
    pub have: String,
    /// Column holding "want to work with" answers
    pub want: String,
}

/// Per-dimension pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(default)]
    pub years: Vec<YearSource>,

    /// Raw alias -> canonical name; must already be flattened
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl DimensionConfig {
    pub fn mapping(&self) -> Result<CanonicalMapping> {
        CanonicalMapping::new(self.aliases.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Years sorted ascending
    pub fn sorted_years(&self) -> Vec<&YearSource> {
        let mut years: Vec<&YearSource> = self.years.iter().collect();
        years.sort_by_key(|y| y.year);
        years
    }
}

/// Full pipeline configuration (TOML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Keyed by dimension key (`language`, `database`, ...)
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionConfig>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: None,
            separator: default_separator(),
            dimensions: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: PipelineConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        parsed.normalized()
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(
            "Loaded pipeline config from {} ({} dimensions)",
            path.display(),
            config.dimensions.len()
        );
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to [`PipelineConfig::builtin`]
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                info!("No pipeline config given, using built-in survey layout");
                Ok(Self::builtin())
            }
        }
    }

    /// Canonicalize dimension keys and check every invariant
    fn normalized(self) -> Result<Self> {
        let mut dimensions = BTreeMap::new();
        for (key, dim_config) in self.dimensions {
            let dimension = validate_dimension(&key)?;
            if dimensions.insert(dimension.key().to_string(), dim_config).is_some() {
                return Err(Error::Config(format!("Dimension '{}' configured twice", dimension)));
            }
        }

        let config = Self { dimensions, ..self };
        config.validate()?;
        Ok(config)
    }

    /// Check separators, identifiers, year uniqueness and alias flattening
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("separator must not be empty".to_string()));
        }

        for (key, dim_config) in &self.dimensions {
            let dimension = validate_dimension(key)?;

            if matches!(dim_config.separator.as_deref(), Some("")) {
                return Err(Error::Config(format!("{}: separator must not be empty", dimension)));
            }

            let mut seen = BTreeSet::new();
            for year in &dim_config.years {
                if !seen.insert(year.year) {
                    return Err(Error::Config(format!(
                        "{}: year {} configured twice",
                        dimension, year.year
                    )));
                }
                for name in [&year.source, &year.have, &year.want] {
                    if !is_valid_identifier(name) {
                        return Err(Error::Config(format!(
                            "{} {}: invalid identifier '{}'",
                            dimension, year.year, name
                        )));
                    }
                }
            }

            dim_config
                .mapping()
                .map_err(|e| Error::Config(format!("{}: {}", dimension, e)))?;

            if dim_config.years.is_empty() {
                warn!("Dimension {} has no configured years", dimension);
            }
        }

        Ok(())
    }

    /// Settings for one dimension, if configured
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionConfig> {
        self.dimensions.get(dimension.key())
    }

    /// Separator for a dimension (its override, else the global one)
    pub fn separator_for(&self, dimension: Dimension) -> &str {
        self.dimension(dimension)
            .and_then(|d| d.separator.as_deref())
            .unwrap_or(self.separator.as_str())
    }

    /// Configured dimensions in registry order
    pub fn configured_dimensions(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.dimensions.contains_key(d.key()))
            .collect()
    }

    /// Render back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))
    }

    /// Known layout of the yearly survey exports, 2017 through 2025
    pub fn builtin() -> Self {
        let mut dimensions = BTreeMap::new();

        dimensions.insert(
            Dimension::Language.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2017, "HaveWorkedLanguage", "WantWorkLanguage"),
                    (2018, "LanguageWorkedWith", "LanguageDesireNextYear"),
                    (2019, "LanguageWorkedWith", "LanguageDesireNextYear"),
                    (2020, "LanguageWorkedWith", "LanguageDesireNextYear"),
                    (2021, "LanguageHaveWorkedWith", "LanguageWantToWorkWith"),
                    (2022, "LanguageHaveWorkedWith", "LanguageWantToWorkWith"),
                    (2023, "LanguageHaveWorkedWith", "LanguageWantToWorkWith"),
                    (2024, "LanguageHaveWorkedWith", "LanguageWantToWorkWith"),
                    (2025, "LanguageHaveWorkedWith", "LanguageWantToWorkWith"),
                ]),
                aliases: aliases(&[
                    ("Bash/Shell/PowerShell", "Bash/Shell"),
                    ("Bash/Shell (all shells)", "Bash/Shell"),
                ]),
            },
        );

        dimensions.insert(
            Dimension::Database.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2017, "HaveWorkedDatabase", "WantWorkDatabase"),
                    (2018, "DatabaseWorkedWith", "DatabaseDesireNextYear"),
                    (2019, "DatabaseWorkedWith", "DatabaseDesireNextYear"),
                    (2020, "DatabaseWorkedWith", "DatabaseDesireNextYear"),
                    (2021, "DatabaseHaveWorkedWith", "DatabaseWantToWorkWith"),
                    (2022, "DatabaseHaveWorkedWith", "DatabaseWantToWorkWith"),
                    (2023, "DatabaseHaveWorkedWith", "DatabaseWantToWorkWith"),
                    (2024, "DatabaseHaveWorkedWith", "DatabaseWantToWorkWith"),
                    (2025, "DatabaseHaveWorkedWith", "DatabaseWantToWorkWith"),
                ]),
                aliases: aliases(&[("SQL Server", "Microsoft SQL Server")]),
            },
        );

        dimensions.insert(
            Dimension::Platform.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2017, "HaveWorkedPlatform", "WantWorkPlatform"),
                    (2018, "PlatformWorkedWith", "PlatformDesireNextYear"),
                    (2019, "PlatformWorkedWith", "PlatformDesireNextYear"),
                    (2020, "PlatformWorkedWith", "PlatformDesireNextYear"),
                    (2021, "PlatformHaveWorkedWith", "PlatformWantToWorkWith"),
                    (2022, "PlatformHaveWorkedWith", "PlatformWantToWorkWith"),
                    (2023, "PlatformHaveWorkedWith", "PlatformWantToWorkWith"),
                    (2024, "PlatformHaveWorkedWith", "PlatformWantToWorkWith"),
                    (2025, "PlatformHaveWorkedWith", "PlatformWantToWorkWith"),
                ]),
                aliases: BTreeMap::new(),
            },
        );

        dimensions.insert(
            Dimension::Webframe.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2017, "HaveWorkedFramework", "WantWorkFramework"),
                    (2018, "FrameworkWorkedWith", "FrameworkDesireNextYear"),
                    (2019, "WebFrameWorkedWith", "WebFrameDesireNextYear"),
                    (2020, "WebframeWorkedWith", "WebframeDesireNextYear"),
                    (2021, "WebframeHaveWorkedWith", "WebframeWantToWorkWith"),
                    (2022, "WebframeHaveWorkedWith", "WebframeWantToWorkWith"),
                    (2023, "WebframeHaveWorkedWith", "WebframeWantToWorkWith"),
                    (2024, "WebframeHaveWorkedWith", "WebframeWantToWorkWith"),
                    (2025, "WebframeHaveWorkedWith", "WebframeWantToWorkWith"),
                ]),
                aliases: aliases(&[("React", "React.js")]),
            },
        );

        dimensions.insert(
            Dimension::Misctech.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2019, "MiscTechWorkedWith", "MiscTechDesireNextYear"),
                    (2020, "MiscTechWorkedWith", "MiscTechDesireNextYear"),
                    (2021, "MiscTechHaveWorkedWith", "MiscTechWantToWorkWith"),
                    (2022, "MiscTechHaveWorkedWith", "MiscTechWantToWorkWith"),
                    (2023, "MiscTechHaveWorkedWith", "MiscTechWantToWorkWith"),
                    (2024, "MiscTechHaveWorkedWith", "MiscTechWantToWorkWith"),
                ]),
                aliases: BTreeMap::new(),
            },
        );

        dimensions.insert(
            Dimension::Toolstech.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2021, "ToolsTechHaveWorkedWith", "ToolsTechWantToWorkWith"),
                    (2022, "ToolsTechHaveWorkedWith", "ToolsTechWantToWorkWith"),
                    (2023, "ToolsTechHaveWorkedWith", "ToolsTechWantToWorkWith"),
                    (2024, "ToolsTechHaveWorkedWith", "ToolsTechWantToWorkWith"),
                ]),
                aliases: BTreeMap::new(),
            },
        );

        dimensions.insert(
            Dimension::Collabtools.key().to_string(),
            DimensionConfig {
                separator: None,
                years: layout(&[
                    (2020, "NEWCollabToolsWorkedWith", "NEWCollabToolsDesireNextYear"),
                    (2021, "NEWCollabToolsHaveWorkedWith", "NEWCollabToolsWantToWorkWith"),
                    (2022, "NEWCollabToolsHaveWorkedWith", "NEWCollabToolsWantToWorkWith"),
                    (2023, "NEWCollabToolsHaveWorkedWith", "NEWCollabToolsWantToWorkWith"),
                    (2024, "NEWCollabToolsHaveWorkedWith", "NEWCollabToolsWantToWorkWith"),
                ]),
                aliases: BTreeMap::new(),
            },
        );

        Self {
            database: None,
            separator: default_separator(),
            dimensions,
        }
    }
}

/// Per-year selectors reading from the `survey_results_<year>` tables
fn layout(entries: &[(i64, &str, &str)]) -> Vec<YearSource> {
    entries
        .iter()
        .map(|&(year, have, want)| YearSource {
            year,
            source: format!("survey_results_{}", year),
            have: have.to_string(),
            want: want.to_string(),
        })
        .collect()
}

fn aliases(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|&(alias, canonical)| (alias.to_string(), canonical.to_string()))
        .collect()
}

/// Database path resolution, highest priority first:
/// 1. Command-line argument
/// 2. `DEVTREND_DB_PATH` environment variable
/// 3. `database` key of the pipeline TOML
/// 4. Compiled default (`data/devtrend.db`)
pub fn resolve_database_path(cli_arg: Option<&Path>, toml_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    PathBuf::from(DEFAULT_DB_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let config = PipelineConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.configured_dimensions(), Dimension::ALL.to_vec());
    }

    #[test]
    fn test_builtin_covers_schema_drift() {
        let config = PipelineConfig::builtin();
        let language = config.dimension(Dimension::Language).unwrap();
        let by_year: BTreeMap<i64, &YearSource> =
            language.years.iter().map(|y| (y.year, y)).collect();

        assert_eq!(by_year[&2017].have, "HaveWorkedLanguage");
        assert_eq!(by_year[&2019].have, "LanguageWorkedWith");
        assert_eq!(by_year[&2021].want, "LanguageWantToWorkWith");
        assert_eq!(by_year[&2021].source, "survey_results_2021");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [dimensions.Language]
            [[dimensions.Language.years]]
            year = 2020
            source = "survey_results_2020"
            have = "LanguageWorkedWith"
            want = "LanguageDesireNextYear"

            [dimensions.Language.aliases]
            "Golang" = "Go"
            "#,
        )
        .unwrap();

        assert_eq!(config.separator, ";");
        assert!(config.database.is_none());
        let language = config.dimension(Dimension::Language).unwrap();
        assert_eq!(language.years.len(), 1);
        assert_eq!(language.mapping().unwrap().resolve("Golang"), "Go");
        assert_eq!(config.configured_dimensions(), vec![Dimension::Language]);
    }

    #[test]
    fn test_separator_override() {
        let config = PipelineConfig::from_toml_str(
            r#"
            separator = ";"
            [dimensions.platform]
            separator = "|"
            "#,
        )
        .unwrap();
        assert_eq!(config.separator_for(Dimension::Platform), "|");
        assert_eq!(config.separator_for(Dimension::Language), ";");
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let result = PipelineConfig::from_toml_str("[dimensions.salary]\n");
        assert!(matches!(result, Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn test_duplicate_dimension_after_case_folding_rejected() {
        let result = PipelineConfig::from_toml_str("[dimensions.language]\n[dimensions.LANGUAGE]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_separator_rejected() {
        let result = PipelineConfig::from_toml_str("separator = \"\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [[dimensions.database.years]]
            year = 2020
            source = "a"
            have = "b"
            want = "c"
            [[dimensions.database.years]]
            year = 2020
            source = "d"
            have = "e"
            want = "f"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unsafe_identifier_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [[dimensions.database.years]]
            year = 2020
            source = "survey; DROP TABLE x"
            have = "b"
            want = "c"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_alias_chain_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [dimensions.language.aliases]
            "JS" = "Javascript"
            "Javascript" = "JavaScript"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_alias_target_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [dimensions.language.aliases]
            "Go" = "  "
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_round_trip_of_builtin() {
        let builtin = PipelineConfig::builtin();
        let rendered = builtin.to_toml_string().unwrap();
        let reparsed = PipelineConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, builtin);
    }

    #[test]
    fn test_sorted_years() {
        let config = DimensionConfig {
            separator: None,
            years: layout(&[(2022, "a", "b"), (2019, "a", "b"), (2020, "a", "b")]),
            aliases: BTreeMap::new(),
        };
        let years: Vec<i64> = config.sorted_years().iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2019, 2020, 2022]);
    }
}
