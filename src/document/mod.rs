pub mod cache;
pub mod extract;
#[cfg(feature = "ocr")]
pub mod ocr;

pub use cache::ExtractionCache;
pub use extract::TextExtractor;

use crate::error::PipelineError;
use std::path::Path;
use std::sync::Arc;

/// Accepted upload types. Anything else is rejected at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
}

impl MediaType {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "docx" | "doc" => Some(MediaType::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// An uploaded document: original filename, declared type, raw bytes.
///
/// The bytes are shared read-only so extraction workers can each own a
/// handle without copying file content. Extracted text is not stored here;
/// it lives in the session [`ExtractionCache`] keyed by content hash.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub media_type: MediaType,
    pub content: Arc<Vec<u8>>,
}

impl Document {
    pub fn new(name: impl Into<String>, media_type: MediaType, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            content: Arc::new(content),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let media_type = MediaType::from_path(path)
            .ok_or_else(|| PipelineError::UnsupportedMediaType(name.clone()))?;

        let content = std::fs::read(path).map_err(|source| PipelineError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self::new(name, media_type, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(MediaType::from_path(Path::new("a/report.PDF")), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_path(Path::new("notes.docx")), Some(MediaType::Docx));
        assert_eq!(MediaType::from_path(Path::new("image.png")), None);
        assert_eq!(MediaType::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn from_path_rejects_unsupported() {
        let err = Document::from_path(Path::new("slides.pptx")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMediaType(name) if name == "slides.pptx"));
    }
}
