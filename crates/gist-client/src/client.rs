//! GitHub Gist REST client.
//!
//! Reads may be anonymous; creates and updates require a cached bearer
//! token. When no token is available a write fails fast with
//! [`GistError::MissingToken`] so the caller can capture the call as a
//! [`PendingWrite`], prompt the user, and resume the identical operation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::TokenStore;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The single file a document session mirrors into its gist.
pub const DOCUMENT_FILENAME: &str = "document.md";

const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("nexus-editor/", env!("CARGO_PKG_VERSION"));
const DEFAULT_DESCRIPTION: &str = "Markdown document from Nexus";

#[derive(Debug, Error)]
pub enum GistError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gist API error: HTTP {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Gist has no files")]
    NoFiles,
    #[error("No access token available for gist writes")]
    MissingToken,
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Token storage error: {0}")]
    Storage(String),
}

pub type GistResult<T> = Result<T, GistError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Gist {
    /// The file holding the document: the first file whose name has a
    /// markdown extension, else the first file at all.
    pub fn markdown_file(&self) -> GistResult<&GistFile> {
        self.files
            .values()
            .find(|file| {
                file.filename.ends_with(".md") || file.filename.ends_with(".markdown")
            })
            .or_else(|| self.files.values().next())
            .ok_or(GistError::NoFiles)
    }

    pub fn markdown_content(&self) -> GistResult<&str> {
        Ok(self.markdown_file()?.content.as_str())
    }
}

/// A write captured while the credential prompt is outstanding. Holds the
/// original call's parameters so exactly the same operation resumes once
/// the user supplies a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Create {
        content: String,
        description: Option<String>,
    },
    Update {
        id: String,
        content: String,
    },
}

#[derive(Clone)]
pub struct GistClient<S: TokenStore> {
    api_url: String,
    client: Client,
    store: S,
}

impl<S: TokenStore> GistClient<S> {
    pub fn new(store: S) -> GistResult<Self> {
        Self::with_api_url(DEFAULT_API_URL, store)
    }

    pub fn with_api_url(url: impl AsRef<str>, store: S) -> GistResult<Self> {
        Ok(Self {
            api_url: url.as_ref().trim_end_matches('/').to_string(),
            client: Client::builder().build()?,
            store,
        })
    }

    pub fn has_token(&self) -> GistResult<bool> {
        Ok(self.store.load()?.is_some())
    }

    /// Cache a user-supplied token for this and all later writes.
    pub fn save_token(&self, token: &str) -> GistResult<()> {
        self.store.save(token)
    }

    pub async fn create(&self, content: &str, description: Option<&str>) -> GistResult<Gist> {
        let token = self.require_token()?;
        let payload = serde_json::json!({
            "description": description.unwrap_or(DEFAULT_DESCRIPTION),
            "public": true,
            "files": {
                DOCUMENT_FILENAME: { "content": content },
            },
        });
        let request = self
            .authorized(self.client.post(format!("{}/gists", self.api_url)), Some(&token))
            .json(&payload);
        self.send(request).await
    }

    pub async fn read(&self, id: &str) -> GistResult<Gist> {
        // Public gists are readable without a credential.
        let token = self.store.load()?;
        let request = self.authorized(
            self.client.get(format!("{}/gists/{}", self.api_url, id)),
            token.as_deref(),
        );
        self.send(request).await
    }

    pub async fn update(&self, id: &str, content: &str) -> GistResult<Gist> {
        let token = self.require_token()?;
        let payload = serde_json::json!({
            "files": {
                DOCUMENT_FILENAME: { "content": content },
            },
        });
        let request = self
            .authorized(
                self.client.patch(format!("{}/gists/{}", self.api_url, id)),
                Some(&token),
            )
            .json(&payload);
        self.send(request).await
    }

    /// Re-issue a write that was suspended for credential acquisition,
    /// with its originally captured parameters.
    pub async fn resume(&self, write: PendingWrite) -> GistResult<Gist> {
        match write {
            PendingWrite::Create {
                content,
                description,
            } => self.create(&content, description.as_deref()).await,
            PendingWrite::Update { id, content } => self.update(&id, &content).await,
        }
    }

    fn require_token(&self) -> GistResult<String> {
        self.store.load()?.ok_or(GistError::MissingToken)
    }

    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let request = request
            .header("Content-Type", "application/json")
            .header("Accept", ACCEPT_HEADER)
            .header("User-Agent", USER_AGENT);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> GistResult<Gist> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }
        Ok(response.json::<Gist>().await?)
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> GistError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(error) => {
            log::warn!("Unparseable gist API error body: {}", error);
            None
        }
    };
    GistError::Api {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| status.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    fn gist_with_files(names: &[&str]) -> Gist {
        let files = names
            .iter()
            .map(|name| {
                (
                    (*name).to_string(),
                    GistFile {
                        filename: (*name).to_string(),
                        content: format!("body of {}", name),
                    },
                )
            })
            .collect();
        Gist {
            id: "abc123".to_string(),
            html_url: "https://gist.github.com/abc123".to_string(),
            description: None,
            files,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_markdown_file_prefers_markdown_extension() {
        let gist = gist_with_files(&["archive.zip", "notes.md"]);
        assert_eq!(gist.markdown_file().unwrap().filename, "notes.md");

        let gist = gist_with_files(&["a.markdown"]);
        assert_eq!(gist.markdown_file().unwrap().filename, "a.markdown");
    }

    #[test]
    fn test_markdown_file_falls_back_to_first_file() {
        let gist = gist_with_files(&["script.py"]);
        assert_eq!(gist.markdown_file().unwrap().filename, "script.py");
    }

    #[test]
    fn test_markdown_file_fails_on_empty_gist() {
        let gist = gist_with_files(&[]);
        assert!(matches!(gist.markdown_file(), Err(GistError::NoFiles)));
    }

    #[test]
    fn test_gist_response_deserializes() {
        let json = r##"{
            "id": "abc123",
            "html_url": "https://gist.github.com/abc123",
            "description": "Markdown document from Nexus",
            "files": {
                "document.md": { "filename": "document.md", "content": "# Hi" }
            },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"##;
        let gist: Gist = serde_json::from_str(json).unwrap();
        assert_eq!(gist.id, "abc123");
        assert_eq!(gist.markdown_content().unwrap(), "# Hi");
        assert!(gist.created_at.is_some());
    }

    #[test]
    fn test_parse_api_error_uses_server_message() {
        let error = parse_api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message": "Validation Failed"}"#,
        );
        match error {
            GistError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation Failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_api_error_falls_back_to_status() {
        let error = parse_api_error(StatusCode::NOT_FOUND, "not json");
        match error {
            GistError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_without_token_fails_before_any_request() {
        // An unroutable URL: reaching the network would fail differently.
        let client =
            GistClient::with_api_url("http://invalid.invalid", MemoryTokenStore::new()).unwrap();
        let result = client.create("# Hi", None).await;
        assert!(matches!(result, Err(GistError::MissingToken)));
    }

    #[tokio::test]
    async fn test_update_without_token_fails_before_any_request() {
        let client =
            GistClient::with_api_url("http://invalid.invalid", MemoryTokenStore::new()).unwrap();
        let result = client.update("abc123", "# Hi").await;
        assert!(matches!(result, Err(GistError::MissingToken)));
    }

    #[tokio::test]
    async fn test_resume_carries_original_parameters() {
        // A resumed create with no token still fails the same way: resume
        // re-enters the normal write path rather than a special one.
        let client =
            GistClient::with_api_url("http://invalid.invalid", MemoryTokenStore::new()).unwrap();
        let pending = PendingWrite::Create {
            content: "# Hi".to_string(),
            description: Some("notes".to_string()),
        };
        let result = client.resume(pending).await;
        assert!(matches!(result, Err(GistError::MissingToken)));
    }

    #[test]
    fn test_save_token_gates_future_writes() {
        let store = MemoryTokenStore::new();
        let client = GistClient::with_api_url("http://invalid.invalid", store).unwrap();
        assert!(!client.has_token().unwrap());
        client.save_token("ghp_example").unwrap();
        assert!(client.has_token().unwrap());
    }
}
