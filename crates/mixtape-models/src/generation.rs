//! Wire types returned by the remote generation service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct GenerationResult {
    /// Generated description text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Server-relative path of the video, e.g. `/download/final_video.mp4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,

    /// Informational status string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Informational file name of the video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,
}

/// What a result means for the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// A description without a video
    Described { description: String },
    /// A video, with the description when one was produced
    Rendered {
        video_path: String,
        description: Option<String>,
    },
}

impl GenerationResult {
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn with_video(video_path: impl Into<String>) -> Self {
        Self {
            video_path: Some(video_path.into()),
            ..Default::default()
        }
    }

    /// Interpret the result. Blank strings count as absent; `None` means
    /// neither a description nor a video came back.
    pub fn outcome(&self) -> Option<GenerationOutcome> {
        let description = non_blank(&self.description);
        match non_blank(&self.video_path) {
            Some(video_path) => Some(GenerationOutcome::Rendered {
                video_path,
                description,
            }),
            None => description.map(|description| GenerationOutcome::Described { description }),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Body of `GET /health`, parsed leniently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_service_response() {
        let body = r#"{
            "status": "success",
            "video_path": "/download/final_video.mp4",
            "video_filename": "final_video.mp4",
            "description": "1. Intro\n2. Outro"
        }"#;

        let result: GenerationResult = serde_json::from_str(body).unwrap();
        assert_eq!(
            result.outcome(),
            Some(GenerationOutcome::Rendered {
                video_path: "/download/final_video.mp4".into(),
                description: Some("1. Intro\n2. Outro".into()),
            })
        );
    }

    #[test]
    fn test_description_only() {
        let result: GenerationResult =
            serde_json::from_str(r#"{"description": "X", "video_path": null}"#).unwrap();
        assert_eq!(
            result.outcome(),
            Some(GenerationOutcome::Described {
                description: "X".into()
            })
        );
    }

    #[test]
    fn test_video_only() {
        let result = GenerationResult::with_video("/download/a.mp4");
        assert_eq!(
            result.outcome(),
            Some(GenerationOutcome::Rendered {
                video_path: "/download/a.mp4".into(),
                description: None,
            })
        );
    }

    #[test]
    fn test_missing_or_blank_fields_are_incomplete() {
        let empty: GenerationResult = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.outcome(), None);

        let blank: GenerationResult =
            serde_json::from_str(r#"{"description": "", "video_path": "  "}"#).unwrap();
        assert_eq!(blank.outcome(), None);
    }

    #[test]
    fn test_health_tolerates_extra_fields() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "message": "Backend is running", "uptime": 3}"#)
                .unwrap();
        assert_eq!(health.status.as_deref(), Some("ok"));
    }
}
