//! Document loading
//!
//! PDFs and images are embedded as base64 payloads with their media type;
//! everything else is read as text under a file-name header.

use crate::error::PipelineError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rulekeeper_domain::ContentPart;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A document ready to be sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Base name of the file; this is what rules are stamped with
    pub name: String,

    /// Path the document was read from
    pub path: PathBuf,

    /// Size on disk in bytes
    pub size_bytes: u64,

    /// Content to send
    pub part: ContentPart,
}

/// How a file is sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Image(&'static str),
    Text,
}

impl DocumentKind {
    fn classify(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "png" => DocumentKind::Image("image/png"),
            "jpg" | "jpeg" => DocumentKind::Image("image/jpeg"),
            "gif" => DocumentKind::Image("image/gif"),
            "webp" => DocumentKind::Image("image/webp"),
            _ => DocumentKind::Text,
        }
    }
}

/// Base name of `path`, falling back to the full path when it has none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load a document for a model request
///
/// # Errors
///
/// - `NotFound` if the path does not exist
/// - `InvalidFormat` if the path is not a regular file
/// - `TooLarge` if the file exceeds `max_bytes`
/// - `Io` for any other read failure
pub fn load_document(path: &Path, max_bytes: u64) -> Result<LoadedDocument, PipelineError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;

    if !metadata.is_file() {
        return Err(PipelineError::InvalidFormat(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let size_bytes = metadata.len();
    if size_bytes > max_bytes {
        return Err(PipelineError::TooLarge {
            path: path.to_path_buf(),
            size: size_bytes,
            max: max_bytes,
        });
    }

    let name = file_name(path);
    let bytes = fs::read(path)?;
    let kind = DocumentKind::classify(path);
    debug!("Loaded {} ({} bytes, {:?})", name, size_bytes, kind);

    let part = match kind {
        DocumentKind::Pdf => ContentPart::File {
            filename: name.clone(),
            media_type: "application/pdf".to_string(),
            data: STANDARD.encode(&bytes),
        },
        DocumentKind::Image(media_type) => ContentPart::Image {
            media_type: media_type.to_string(),
            data: STANDARD.encode(&bytes),
        },
        DocumentKind::Text => {
            let text = String::from_utf8_lossy(&bytes);
            ContentPart::Text(format!("# File: {}\n\n{}", name, text))
        }
    };

    Ok(LoadedDocument {
        name,
        path: path.to_path_buf(),
        size_bytes,
        part,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_text_document_has_header() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "policy.md", b"All laptops must use disk encryption.");

        let doc = load_document(&path, 1024).unwrap();
        assert_eq!(doc.name, "policy.md");
        assert_eq!(
            doc.part,
            ContentPart::Text(
                "# File: policy.md\n\nAll laptops must use disk encryption.".to_string()
            )
        );
    }

    #[test]
    fn test_pdf_document_is_base64() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "Policy.PDF", b"%PDF-1.4");

        let doc = load_document(&path, 1024).unwrap();
        match doc.part {
            ContentPart::File {
                filename,
                media_type,
                data,
            } => {
                assert_eq!(filename, "Policy.PDF");
                assert_eq!(media_type, "application/pdf");
                assert_eq!(STANDARD.decode(data).unwrap(), b"%PDF-1.4");
            }
            other => panic!("Expected File part, got {:?}", other),
        }
    }

    #[test]
    fn test_image_document() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "scan.jpeg", &[0xFF, 0xD8, 0xFF]);

        let doc = load_document(&path, 1024).unwrap();
        assert_eq!(doc.part.media_type(), "image/jpeg");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", &[b'o', b'k', 0xFF]);

        let doc = load_document(&path, 1024).unwrap();
        assert!(doc.part.as_text().unwrap().contains("ok"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_document(Path::new("/definitely/not/here.md"), 1024);
        assert!(matches!(result, Err(PipelineError::NotFound(_))));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load_document(dir.path(), 1024);
        assert!(matches!(result, Err(PipelineError::InvalidFormat(_))));
    }

    #[test]
    fn test_too_large() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "big.txt", &[b'a'; 64]);

        let result = load_document(&path, 10);
        assert!(matches!(
            result,
            Err(PipelineError::TooLarge { size: 64, max: 10, .. })
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("docs/a.md")), "a.md");
        assert_eq!(file_name(Path::new("a.md")), "a.md");
    }
}
