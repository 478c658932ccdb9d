//! Classification of uploaded files into requirements text and image payloads.

use bytes::Bytes;
use tracing::info;

/// Filename suffix that marks an upload as requirements text.
pub const TEXT_FILE_SUFFIX: &str = ".txt";

/// Mime type sent to the model for every non-text upload, whatever its real content.
pub const IMAGE_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Image,
}

impl UploadKind {
    /// Classify by filename suffix alone. Uploads without a filename are images.
    pub fn classify(filename: Option<&str>) -> Self {
        match filename {
            Some(name) if name.ends_with(TEXT_FILE_SUFFIX) => UploadKind::Text,
            _ => UploadKind::Image,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("File {filename} is not valid UTF-8 text")]
pub struct InvalidTextUpload {
    pub filename: String,
}

/// Accumulates uploads in the order they were received.
#[derive(Debug, Default)]
pub struct Uploads {
    requirements: String,
    images: Vec<Bytes>,
    text_files: usize,
}

impl Uploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one uploaded file. Text is appended followed by a blank line; everything else is kept
    /// as an image payload.
    pub fn push(&mut self, filename: Option<&str>, content: Bytes) -> Result<UploadKind, InvalidTextUpload> {
        let kind = UploadKind::classify(filename);
        match kind {
            UploadKind::Text => {
                let text = std::str::from_utf8(&content).map_err(|_| InvalidTextUpload {
                    filename: filename.unwrap_or_default().to_string(),
                })?;
                self.requirements.push_str(text);
                self.requirements.push_str("\n\n");
                self.text_files += 1;
                info!(filename = filename.unwrap_or_default(), bytes = content.len(), "Text file");
            }
            UploadKind::Image => {
                info!(filename = filename.unwrap_or_default(), bytes = content.len(), "Image file");
                self.images.push(content);
            }
        }
        Ok(kind)
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    pub fn images(&self) -> &[Bytes] {
        &self.images
    }

    pub fn text_files(&self) -> usize {
        self.text_files
    }

    pub fn is_empty(&self) -> bool {
        self.text_files == 0 && self.images.is_empty()
    }

    /// Whether any uploaded text survives whitespace trimming.
    pub fn has_requirements(&self) -> bool {
        !self.requirements.trim().is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Bytes>) {
        (self.requirements, self.images)
    }
}
