//! Audio input files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::file_set::{FileSetError, FileSetResult};

/// Mime prefix every accepted input must carry.
pub const AUDIO_MIME_PREFIX: &str = "audio/";

/// Fallback for content that is neither sniffed nor recognised by extension.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// One user-selected input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    /// Display name (file name without directories)
    pub name: String,
    /// Local path the bytes are streamed from at submit time
    pub path: PathBuf,
    /// Size in bytes at selection time
    pub byte_size: u64,
    /// Mime type, e.g. `audio/mpeg`
    pub mime_type: String,
}

impl AudioFile {
    /// Describe a file without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>, byte_size: u64, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            name,
            path,
            byte_size,
            mime_type: mime_type.into(),
        }
    }

    /// Build a candidate from a file on disk.
    ///
    /// The mime type is sniffed from the file header and falls back to the
    /// extension. The result is a candidate only: whether it is audio is
    /// decided when it is offered to a [`crate::WorkingFileSet`].
    pub fn from_path(path: impl AsRef<Path>) -> FileSetResult<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| FileSetError::unreadable(path, e))?;

        if !metadata.is_file() {
            return Err(FileSetError::unreadable(path, "not a regular file"));
        }

        let mime_type = sniff_mime_type(path);
        Ok(Self::new(path, metadata.len(), mime_type))
    }

    /// Whether the mime type is in the audio category.
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with(AUDIO_MIME_PREFIX)
    }

    /// Size in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.byte_size as f64 / 1024.0 / 1024.0
    }
}

fn sniff_mime_type(path: &Path) -> String {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => kind.mime_type().to_string(),
        _ => mime_from_extension(path).to_string(),
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("aif") | Some("aiff") => "audio/aiff",
        _ => UNKNOWN_MIME,
    }
}
