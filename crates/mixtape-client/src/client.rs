//! HTTP implementation of [`Transport`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, info_span, warn, Instrument};

use mixtape_models::{AudioFile, GenerationResult, HealthStatus};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ProgressSender, Transport};
use crate::upload::build_form;

/// File name used when the artifact path has no usable last segment.
const DEFAULT_ARTIFACT_NAME: &str = "video.mp4";

/// Upper bound on the buffer reserved from an announced `Content-Length`.
const MAX_BODY_RESERVE: u64 = 1024 * 1024;

/// Error body of a non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Client for the generation service.
#[derive(Clone)]
pub struct MixtapeClient {
    http: Client,
    config: ClientConfig,
}

impl MixtapeClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        // The overall ceiling is applied around the whole exchange in
        // `submit`, not per request, so the long silent phase is not cut short.
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("mixtape-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL of an artifact path returned by the service.
    pub fn artifact_url(&self, video_path: &str) -> String {
        self.config.endpoint(video_path)
    }

    async fn exchange(
        &self,
        files: &[AudioFile],
        progress: &ProgressSender,
    ) -> ClientResult<GenerationResult> {
        let upload = build_form(files, progress).await?;
        let url = self.config.endpoint("/generate");

        info!(
            files = files.len(),
            bytes = upload.total_bytes,
            "Uploading {} file(s)",
            files.len()
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(upload.form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = Self::read_body(response, progress).await?;
        serde_json::from_slice(&body).map_err(|e| {
            ClientError::invalid_response(format!("generation result is not valid JSON: {}", e))
        })
    }

    /// Read the response body, reporting download progress when the server
    /// announced a length.
    async fn read_body(response: Response, progress: &ProgressSender) -> ClientResult<Vec<u8>> {
        let total = response.content_length().filter(|len| *len > 0);
        // The announced length is only a hint; the buffer grows with what arrives
        let reserve = total.unwrap_or(0).min(MAX_BODY_RESERVE);
        let mut body = Vec::with_capacity(reserve as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            body.extend_from_slice(&chunk);
            if let Some(total) = total {
                progress.download(body.len() as u64, total);
            }
        }

        Ok(body)
    }

    /// Stream the response body into `dest`, returning the bytes written.
    async fn save_body(response: Response, dest: &Path) -> ClientResult<u64> {
        let mut file = tokio::fs::File::create(dest).await?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn error_from_response(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.detail);

        warn!(status, detail = ?detail, "Service rejected request");
        ClientError::from_http_status(status, detail)
    }
}

#[async_trait]
impl Transport for MixtapeClient {
    async fn submit(
        &self,
        files: Arc<Vec<AudioFile>>,
        progress: ProgressSender,
    ) -> ClientResult<GenerationResult> {
        if files.is_empty() {
            return Err(ClientError::EmptyFileSet);
        }

        let span = info_span!("generate", files = files.len());
        let started = Instant::now();

        let result = tokio::time::timeout(
            self.config.request_timeout,
            self.exchange(&files, &progress),
        )
        .instrument(span)
        .await
        .map_err(|_| {
            warn!(
                timeout_secs = self.config.request_timeout.as_secs(),
                "Generation exceeded request ceiling"
            );
            ClientError::Timeout
        })?;

        match &result {
            Ok(_) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generation response received"
            ),
            Err(e) => warn!(error = %e, "Generation request failed"),
        }

        result
    }

    async fn retrieve(&self, video_path: &str, dest_dir: &Path) -> ClientResult<PathBuf> {
        let video_path = video_path.trim();
        if video_path.is_empty() {
            return Err(ClientError::NoArtifact);
        }

        let url = self.artifact_url(video_path);
        info!(url = %url, "Downloading artifact");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        tokio::fs::create_dir_all(dest_dir).await?;
        let dest = dest_dir.join(artifact_file_name(video_path));

        match Self::save_body(response, &dest).await {
            Ok(written) => {
                info!(path = %dest.display(), bytes = written, "Artifact saved");
                Ok(dest)
            }
            Err(e) => {
                warn!(path = %dest.display(), error = %e, "Artifact download interrupted");
                if let Err(remove_err) = tokio::fs::remove_file(&dest).await {
                    debug!(error = %remove_err, "Could not remove partial artifact");
                }
                Err(e)
            }
        }
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        let url = self.config.endpoint("/health");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ConnectionUnavailable(format!(
                "health check returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::ConnectionUnavailable(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(ClientError::ConnectionUnavailable(
                "health check returned an empty body".to_string(),
            ));
        }

        let health = serde_json::from_str(&body).unwrap_or_else(|_| HealthStatus {
            status: None,
            message: Some(body.trim().to_string()),
        });
        debug!(?health, "Service reachable");
        Ok(health)
    }
}

/// Last path segment of an artifact path, or a default name.
pub(crate) fn artifact_file_name(video_path: &str) -> &str {
    match video_path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => DEFAULT_ARTIFACT_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("/download/final_video.mp4"), "final_video.mp4");
        assert_eq!(artifact_file_name("clip.mp4"), "clip.mp4");
        assert_eq!(artifact_file_name("/download/"), DEFAULT_ARTIFACT_NAME);
        assert_eq!(artifact_file_name("/download/.."), DEFAULT_ARTIFACT_NAME);
    }

    #[test]
    fn test_artifact_url() {
        let client = MixtapeClient::new(ClientConfig::new("http://127.0.0.1:8000")).unwrap();
        assert_eq!(
            client.artifact_url("/download/a.mp4"),
            "http://127.0.0.1:8000/download/a.mp4"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(MixtapeClient::new(ClientConfig::new("localhost")).is_err());
    }
}
