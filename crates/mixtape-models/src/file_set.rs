//! The ordered set of audio inputs staged for submission.
//!
//! Insertion order is significant: it is the track order of the mixtape and
//! therefore the order of the generated description.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioFile;

/// Fewer files than this produce an advisory.
pub const MIN_RECOMMENDED_FILES: usize = 2;
/// More files than this produce an advisory.
pub const MAX_RECOMMENDED_FILES: usize = 10;
/// Files above this size produce an advisory (2 GB).
pub const MAX_RECOMMENDED_FILE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Result type for file set operations.
pub type FileSetResult<T> = Result<T, FileSetError>;

/// Errors raised while building the working set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSetError {
    #[error("Please select audio files only (MP3, WAV, OGG, M4A, etc.); {rejected} file(s) skipped")]
    NoValidFiles { rejected: usize },

    #[error("No file at position {index} (working set holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot read {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
}

impl FileSetError {
    pub fn unreadable(path: &Path, message: impl fmt::Display) -> Self {
        Self::Unreadable {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Counts reported by a successful [`WorkingFileSet::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptOutcome {
    pub accepted: usize,
    pub rejected: usize,
}

/// Guidance that is reported but never enforced; the remote service has the
/// final say on what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    TooFewFiles { count: usize },
    TooManyFiles { count: usize },
    FileTooLarge { name: String, byte_size: u64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::TooFewFiles { count } => write!(
                f,
                "{} file(s) selected; a mixtape works best with {}-{} tracks",
                count, MIN_RECOMMENDED_FILES, MAX_RECOMMENDED_FILES
            ),
            Advisory::TooManyFiles { count } => write!(
                f,
                "{} files selected; more than {} may be rejected or take very long",
                count, MAX_RECOMMENDED_FILES
            ),
            Advisory::FileTooLarge { name, byte_size } => write!(
                f,
                "{} is {:.1} MB; files above 2 GB are likely to be rejected",
                name,
                *byte_size as f64 / 1024.0 / 1024.0
            ),
        }
    }
}

/// Ordered working set of audio files.
///
/// The sequence sits behind an `Arc` and is replaced wholesale on every
/// change, so [`WorkingFileSet::snapshot`] hands out an immutable view that
/// later edits never touch.
#[derive(Debug, Clone, Default)]
pub struct WorkingFileSet {
    files: Arc<Vec<AudioFile>>,
}

impl WorkingFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every audio candidate in arrival order.
    ///
    /// Non-audio candidates are counted and dropped. When nothing passes the
    /// filter the set is left untouched and `NoValidFiles` is returned.
    pub fn accept<I>(&mut self, candidates: I) -> FileSetResult<AcceptOutcome>
    where
        I: IntoIterator<Item = AudioFile>,
    {
        let (audio, other): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(AudioFile::is_audio);

        if audio.is_empty() {
            return Err(FileSetError::NoValidFiles {
                rejected: other.len(),
            });
        }

        let outcome = AcceptOutcome {
            accepted: audio.len(),
            rejected: other.len(),
        };

        let mut next = Vec::with_capacity(self.files.len() + audio.len());
        next.extend(self.files.iter().cloned());
        next.extend(audio);
        self.files = Arc::new(next);

        Ok(outcome)
    }

    /// Remove the file currently at `index`.
    pub fn remove(&mut self, index: usize) -> FileSetResult<AudioFile> {
        let len = self.files.len();
        if index >= len {
            return Err(FileSetError::IndexOutOfRange { index, len });
        }

        let mut next = self.files.as_ref().clone();
        let removed = next.remove(index);
        self.files = Arc::new(next);

        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.files = Arc::new(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AudioFile> {
        self.files.get(index)
    }

    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioFile> {
        self.files.iter()
    }

    /// Immutable view of the current sequence.
    pub fn snapshot(&self) -> Arc<Vec<AudioFile>> {
        Arc::clone(&self.files)
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.byte_size).sum()
    }

    /// Aggregate size for display.
    pub fn aggregate_size_mb(&self) -> f64 {
        self.total_bytes() as f64 / 1024.0 / 1024.0
    }

    /// Advisory limits the current set exceeds.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        let count = self.files.len();

        if count > 0 && count < MIN_RECOMMENDED_FILES {
            advisories.push(Advisory::TooFewFiles { count });
        }
        if count > MAX_RECOMMENDED_FILES {
            advisories.push(Advisory::TooManyFiles { count });
        }

        advisories.extend(
            self.files
                .iter()
                .filter(|f| f.byte_size > MAX_RECOMMENDED_FILE_BYTES)
                .map(|f| Advisory::FileTooLarge {
                    name: f.name.clone(),
                    byte_size: f.byte_size,
                }),
        );

        advisories
    }
}
