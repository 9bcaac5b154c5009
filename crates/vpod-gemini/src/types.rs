//! Wire types for the Gemini file and generation APIs.

use serde::{Deserialize, Serialize};

/// Processing state of a remote file.
///
/// Authoritative only via re-query; the client never assumes a state
/// without polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    #[serde(alias = "STATE_UNSPECIFIED")]
    Pending,
    Processing,
    Active,
    Failed,
}

impl FileState {
    /// Whether the remote service is done with this file, for better or
    /// worse.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Failed)
    }
}

/// Handle to a file uploaded to the remote service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name (e.g. `files/abc-123`)
    pub name: String,

    /// URI referenced by generation requests
    pub uri: String,

    /// Last observed processing state
    #[serde(default)]
    pub state: FileState,

    /// MIME type the service recorded on upload
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Upload endpoint response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: RemoteFile,
}

/// Generation request.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    pub fn file(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FileData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

/// Generation response.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: ResponseContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_wire_form() {
        assert_eq!(
            serde_json::from_str::<FileState>("\"PROCESSING\"").unwrap(),
            FileState::Processing
        );
        assert_eq!(
            serde_json::from_str::<FileState>("\"ACTIVE\"").unwrap(),
            FileState::Active
        );
        assert_eq!(
            serde_json::from_str::<FileState>("\"STATE_UNSPECIFIED\"").unwrap(),
            FileState::Pending
        );
    }

    #[test]
    fn test_file_state_terminal() {
        assert!(FileState::Active.is_terminal());
        assert!(FileState::Failed.is_terminal());
        assert!(!FileState::Processing.is_terminal());
        assert!(!FileState::Pending.is_terminal());
    }

    #[test]
    fn test_remote_file_state_defaults_to_pending() {
        let file: RemoteFile =
            serde_json::from_str(r#"{"name": "files/x", "uri": "https://e/files/x"}"#).unwrap();
        assert_eq!(file.state, FileState::Pending);
    }

    #[test]
    fn test_generate_request_part_shapes() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::file("audio/mp3", "https://e/files/x"), Part::text("p")],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["fileData"]["fileUri"], "https://e/files/x");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], "p");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }
}
