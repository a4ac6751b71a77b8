//! Subcommand implementations.
//!
//! Every command writes its result to stdout; logs and progress go to
//! stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use card_parser_cli_utils::{BatchProgress, FilesBar, MultiProgress, silent};
use card_parser_engine::{ConfigError, ParseError, ParserConfig, UploadError, bank, parse_upload};
use card_parser_pdf::{PdfDocument, PdfError, TableSource};
use card_parser_statement_models::ParseResponse;
use serde_json::json;

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration could not be rendered.
    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UploadError> for CliError {
    fn from(e: UploadError) -> Self {
        Self::Parse(e.into())
    }
}

impl From<PdfError> for CliError {
    fn from(e: PdfError) -> Self {
        Self::Parse(e.into())
    }
}

impl CliError {
    /// Process exit status: 2 for bad input, 1 for everything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(e) if e.is_client_error() => 2,
            _ => 1,
        }
    }

    /// The error as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

fn load_config(path: Option<&Path>) -> Result<ParserConfig, CliError> {
    Ok(ParserConfig::load(path)?)
}

fn read_statement(path: &Path) -> Result<Vec<u8>, CliError> {
    if !path.is_file() {
        return Err(UploadError::MissingFile.into());
    }
    Ok(std::fs::read(path)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validates and parses one statement file.
///
/// # Errors
///
/// * If the file is missing or misnamed, unreadable, or not a usable PDF
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParseResponse, CliError> {
    let bytes = read_statement(path)?;
    Ok(parse_upload(&file_name(path), &bytes, config)?)
}

/// Parses every file, reporting progress, and returns the JSON document to
/// print plus the exit status.
///
/// One file yields its envelope (or error object); several yield an array
/// in argument order.
///
/// # Errors
///
/// * If the configuration cannot be loaded or output cannot be serialized
pub fn parse(
    multi: &MultiProgress,
    files: &[PathBuf],
    config_path: Option<&Path>,
) -> Result<(serde_json::Value, i32), CliError> {
    let config = load_config(config_path)?;

    let progress: Arc<dyn BatchProgress> = if files.len() > 1 {
        FilesBar::shared(multi, files.len() as u64)
    } else {
        silent()
    };

    let mut outputs = Vec::with_capacity(files.len());
    let mut exit_code = 0;

    for path in files {
        progress.start_file(&file_name(path));

        let output = match parse_file(path, &config) {
            Ok(response) => serde_json::to_value(response)?,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                exit_code = merge_exit_codes(exit_code, e.exit_code());
                e.to_json()
            }
        };
        outputs.push(output);
        progress.file_done();
    }
    progress.finish();

    let document = if outputs.len() == 1 {
        outputs.remove(0)
    } else {
        serde_json::Value::Array(outputs)
    };

    Ok((document, exit_code))
}

/// Extraction failures outrank bad-input failures.
const fn merge_exit_codes(current: i32, next: i32) -> i32 {
    match (current, next) {
        (1, _) | (_, 1) => 1,
        (0, code) | (code, _) => code,
    }
}

/// The detected bank of a statement.
///
/// # Errors
///
/// * If the file cannot be read or is not a usable PDF
pub fn identify(path: &Path) -> Result<String, CliError> {
    let pdf = PdfDocument::from_bytes(&read_statement(path)?)?;
    Ok(bank::identify(pdf.text().text()).to_string())
}

/// The extracted text of a statement.
///
/// # Errors
///
/// * If the file cannot be read or is not a usable PDF
pub fn text(path: &Path) -> Result<String, CliError> {
    let pdf = PdfDocument::from_bytes(&read_statement(path)?)?;
    Ok(pdf.into_text().text().to_string())
}

/// Detected tables, tab separated, under a heading per table.
///
/// # Errors
///
/// * If the file cannot be read, is not a usable PDF, or a requested page
///   does not exist
pub fn tables(
    path: &Path,
    page: Option<u32>,
    config_path: Option<&Path>,
) -> Result<String, CliError> {
    let config = load_config(config_path)?;
    let pdf = PdfDocument::from_bytes(&read_statement(path)?)?;

    let pages: Vec<u32> = match page {
        Some(page) => vec![page],
        None => (1..=u32::try_from(pdf.page_count()).unwrap_or(u32::MAX)).collect(),
    };

    let mut out = String::new();
    for page in pages {
        let tables = pdf.tables(page, &config.tables.settings)?;
        for (idx, table) in tables.iter().enumerate() {
            out.push_str(&format!("# page {page}, table {}\n", idx + 1));
            out.push_str(&table.to_tsv());
            out.push_str("\n\n");
        }
    }

    Ok(out)
}

/// The effective configuration as TOML.
///
/// # Errors
///
/// * If the configuration cannot be loaded or rendered
pub fn config(config_path: Option<&Path>) -> Result<String, CliError> {
    Ok(toml::to_string(&load_config(config_path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_exit_with_two() {
        let err = CliError::from(UploadError::InvalidExtension("a.txt".to_string()));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_json()["error"],
            "Invalid file type (only .pdf allowed): a.txt"
        );

        let err = CliError::from(PdfError::PageNotFound(3));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn extraction_failures_dominate_exit_code() {
        assert_eq!(merge_exit_codes(0, 2), 2);
        assert_eq!(merge_exit_codes(2, 1), 1);
        assert_eq!(merge_exit_codes(1, 2), 1);
        assert_eq!(merge_exit_codes(2, 2), 2);
    }

    #[test]
    fn missing_file_is_a_client_error() {
        let path = Path::new("/nonexistent/statement.pdf");
        let err = parse_file(path, &ParserConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Parse(ParseError::Upload(UploadError::MissingFile))
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = config(None).unwrap();
        assert!(rendered.contains("max_rows = 50"));
        assert!(rendered.contains("section_marker = \"TRANSACTION DETAILS\""));
        assert_eq!(
            ParserConfig::from_toml_str(&rendered).unwrap(),
            ParserConfig::default()
        );
    }
}
