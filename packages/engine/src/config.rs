//! Parser configuration.
//!
//! Defaults are embedded from `config/default.toml`; a user file only needs
//! the keys it changes.

use std::path::Path;

use card_parser_pdf::TableSettings;
use serde::{Deserialize, Serialize};

/// The embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration TOML.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for the line-based transaction extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Maximum transactions the generic extractor returns.
    pub max_rows: usize,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self { max_rows: 50 }
    }
}

/// Settings for table-based extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Text a page must contain (case-sensitive) before its tables are
    /// read.
    pub section_marker: String,
    /// Detection tolerances.
    #[serde(flatten)]
    pub settings: TableSettings,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            section_marker: "TRANSACTION DETAILS".to_string(),
            settings: TableSettings::default(),
        }
    }
}

/// Complete parser configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Generic extractor settings.
    pub transactions: TransactionConfig,
    /// Table extraction settings.
    pub tables: TableConfig,
}

impl ParserConfig {
    /// Parses configuration from TOML text; absent keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Toml`] if the text is not valid configuration
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads configuration from `path`, or the embedded defaults when no
    /// path is given.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Io`] if the file cannot be read
    /// * [`ConfigError::Toml`] if its contents are invalid
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::from_toml_str(DEFAULT_CONFIG_TOML);
        };

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_code_defaults() {
        assert_eq!(
            ParserConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap(),
            ParserConfig::default()
        );
        assert_eq!(ParserConfig::load(None).unwrap(), ParserConfig::default());
    }

    #[test]
    fn partial_files_keep_other_defaults() {
        let config = ParserConfig::from_toml_str(
            "[transactions]\nmax_rows = 10\n\n[tables]\nedge_min_length = 20.0\n",
        )
        .unwrap();

        assert_eq!(config.transactions.max_rows, 10);
        assert!((config.tables.settings.edge_min_length - 20.0).abs() < f64::EPSILON);
        assert!((config.tables.settings.intersection_y_tolerance - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.tables.section_marker, "TRANSACTION DETAILS");
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            ParserConfig::from_toml_str("[transactions]\nmax_rows = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ParserConfig::load(Some(Path::new("/nonexistent/card_parser.toml"))),
            Err(ConfigError::Io(_))
        ));
    }
}
