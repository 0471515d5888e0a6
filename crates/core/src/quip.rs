//! Pure request/response handling for the Quip `new-document` API
//!
//! This module contains zero I/O operations and is fully testable with fixture data.

use serde::{Deserialize, Serialize};

/// Path of the document creation endpoint
pub const NEW_DOCUMENT_PATH: &str = "/1/threads/new-document";

// ============================================================================
// Domain Models (Input to API)
// ============================================================================

/// Declared format of the published content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Html,
    Markdown,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single document creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRequest {
    pub content: String,
    pub title: Option<String>,
    pub format: DocumentFormat,
    pub member_ids: Option<Vec<String>>,
}

impl PublishRequest {
    pub fn new(content: String, format: DocumentFormat) -> Self {
        Self {
            content,
            title: None,
            format,
            member_ids: None,
        }
    }

    /// Form fields sent to the API, in a stable order
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("content", self.content.clone()),
            ("format", self.format.as_str().to_string()),
        ];

        if let Some(title) = self.title.as_ref().filter(|t| !t.trim().is_empty()) {
            params.push(("title", title.clone()));
        }

        if let Some(ids) = self.member_ids.as_ref().filter(|ids| !ids.is_empty()) {
            params.push(("member_ids", ids.join(",")));
        }

        params
    }
}

// ============================================================================
// Domain Models (Output from API)
// ============================================================================

/// Thread block of a `new-document` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThreadInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Raw `new-document` response
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocumentResponse {
    pub thread: ThreadInfo,
}

/// A successfully created remote document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedDocument {
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Structured failure of a publish attempt
///
/// `info` is the machine-readable payload shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{info}")]
pub struct QuipError {
    pub status: Option<u16>,
    pub info: serde_json::Value,
}

impl QuipError {
    /// Error for a non-success HTTP response; JSON bodies are kept as is
    pub fn from_response(status: u16, body: &str) -> Self {
        let info = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .filter(|value| value.is_object())
            .unwrap_or_else(|| {
                serde_json::json!({
                    "error": "http_error",
                    "error_code": status,
                    "error_description": body.trim(),
                })
            });

        Self {
            status: Some(status),
            info,
        }
    }

    /// Error for a request that never produced a response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            info: serde_json::json!({
                "error": "transport_error",
                "error_description": message.into(),
            }),
        }
    }

    /// Error for a success response whose body cannot be understood
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            info: serde_json::json!({
                "error": "malformed_response",
                "error_description": message.into(),
            }),
        }
    }
}

// ============================================================================
// Pure Transformation Functions
// ============================================================================

/// Build the endpoint URL from a configured hostname
///
/// A bare hostname gets `https://`; an explicit scheme is kept.
pub fn new_document_url(hostname: &str) -> String {
    let host = hostname.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}{NEW_DOCUMENT_PATH}")
    } else {
        format!("https://{host}{NEW_DOCUMENT_PATH}")
    }
}

/// Convert a successful response body into the created document
pub fn parse_create_response(status: u16, body: &str) -> Result<CreatedDocument, QuipError> {
    let response: NewDocumentResponse = serde_json::from_str(body)
        .map_err(|e| QuipError::malformed(status, format!("Invalid response body: {e}")))?;

    let ThreadInfo { id, title, link } = response.thread;
    let link = link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| QuipError::malformed(status, "Response has no thread link"))?;

    Ok(CreatedDocument { link, id, title })
}
