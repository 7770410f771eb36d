//! Attachment validation
//!
//! The form only accepts image receipts. The content type is derived from
//! the file extension; anything outside the accepted set is rejected before
//! a single byte leaves the machine.

use std::path::Path;

use crate::errors::ValidationError;

/// Extensions the form accepts, lower-cased.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// The multipart payload staged with the store on file selection.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// The session's email rides along so the backend can attribute the file.
    pub email: String,
}

/// Content type for a file name, if it is in the accepted set.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    match ext.as_str() {
        "png" => Some("image/png"),
        _ => Some("image/jpeg"),
    }
}

/// Base name of the selected file, as shown to the user and sent to the store.
pub fn file_base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Validate a selected file, returning its base name and content type.
pub fn validate(path: &Path) -> Result<(String, &'static str), ValidationError> {
    let file_name = file_base_name(path);
    match content_type_for(&file_name) {
        Some(content_type) => Ok((file_name, content_type)),
        None => Err(ValidationError::UnsupportedFileType(file_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_extensions_case_insensitively() {
        assert_eq!(content_type_for("image.png"), Some("image/png"));
        assert_eq!(content_type_for("scan.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("receipt.jpeg"), Some("image/jpeg"));
    }

    #[test]
    fn rejects_non_image_extensions() {
        assert_eq!(content_type_for("facture.pdf"), None);
        assert_eq!(content_type_for("notes.txt"), None);
        assert_eq!(content_type_for("no_extension"), None);
    }

    #[test]
    fn validate_extracts_base_name() {
        let (name, content_type) = validate(Path::new("/tmp/uploads/image.png")).unwrap();
        assert_eq!(name, "image.png");
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn validate_names_the_offending_file() {
        let err = validate(Path::new("/tmp/facture.pdf")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedFileType("facture.pdf".to_string())
        );
    }
}
