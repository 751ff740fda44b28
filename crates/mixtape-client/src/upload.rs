//! Multipart request body that reports upload progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use mixtape_models::AudioFile;

use crate::error::ClientResult;
use crate::transport::ProgressSender;

/// Multipart field every file is sent under, once per file.
pub(crate) const FILES_FIELD: &str = "files";

/// A ready-to-send form and the byte count its progress is measured against.
pub(crate) struct UploadForm {
    pub form: Form,
    pub total_bytes: u64,
}

/// Build the form with one streamed part per file, in set order.
///
/// Every chunk read from disk bumps a counter shared by all parts, so the
/// reported `loaded` is cumulative over the whole body.
pub(crate) async fn build_form(
    files: &[AudioFile],
    progress: &ProgressSender,
) -> ClientResult<UploadForm> {
    let mut opened = Vec::with_capacity(files.len());
    for file in files {
        let handle = File::open(&file.path).await?;
        // Sizes are re-read: the file may have changed since it was selected
        let len = handle.metadata().await?.len();
        opened.push((file, handle, len));
    }

    let total: u64 = opened.iter().map(|(_, _, len)| len).sum();
    let loaded = Arc::new(AtomicU64::new(0));

    let mut form = Form::new();
    for (file, handle, len) in opened {
        let counter = Arc::clone(&loaded);
        let progress = progress.clone();

        let stream = ReaderStream::new(handle).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let n = bytes.len() as u64;
                let sent = counter.fetch_add(n, Ordering::Relaxed) + n;
                progress.upload(sent.min(total), total);
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), len)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;

        debug!(file = %file.name, bytes = len, "Queued file for upload");
        form = form.part(FILES_FIELD, part);
    }

    Ok(UploadForm {
        form,
        total_bytes: total,
    })
}
