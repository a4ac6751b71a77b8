//! Validation of uploaded statement files, applied before any parsing.

/// Problems with the uploaded file itself. These are caller errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// No file was supplied.
    #[error("Missing file")]
    MissingFile,

    /// The file has no name.
    #[error("No file selected")]
    EmptyFilename,

    /// The file name does not end in `.pdf`.
    #[error("Invalid file type (only .pdf allowed): {0}")]
    InvalidExtension(String),
}

/// Checks that `filename` names a PDF.
///
/// # Errors
///
/// * [`UploadError::EmptyFilename`] if the name is empty
/// * [`UploadError::InvalidExtension`] unless the name ends in `.pdf`
///   (any case)
pub fn validate_filename(filename: &str) -> Result<(), UploadError> {
    if filename.is_empty() {
        return Err(UploadError::EmptyFilename);
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(UploadError::InvalidExtension(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_names_in_any_case() {
        assert_eq!(validate_filename("statement.pdf"), Ok(()));
        assert_eq!(validate_filename("STATEMENT.PDF"), Ok(()));
    }

    #[test]
    fn rejects_empty_and_foreign_names() {
        assert_eq!(validate_filename(""), Err(UploadError::EmptyFilename));
        assert_eq!(
            validate_filename("statement.pdf.txt"),
            Err(UploadError::InvalidExtension("statement.pdf.txt".to_string()))
        );
        assert_eq!(
            validate_filename("pdf"),
            Err(UploadError::InvalidExtension("pdf".to_string()))
        );
    }
}
