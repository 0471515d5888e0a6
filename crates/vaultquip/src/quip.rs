use crate::prelude::*;

// Import domain models and pure functions from core crate
use vaultquip_core::quip::{new_document_url, parse_create_response};
pub use vaultquip_core::quip::{CreatedDocument, DocumentFormat, PublishRequest, QuipError};
use vaultquip_core::settings::Settings;

/// Quip connection settings
#[derive(Debug, Clone)]
pub struct QuipConfig {
    pub hostname: String,
    pub token: String,
}

impl QuipConfig {
    /// Build the connection settings from the persisted settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if !settings.has_token() {
            return Err(Error::MissingToken.into());
        }

        Ok(Self {
            hostname: settings.hostname.clone(),
            token: settings.token.trim().to_string(),
        })
    }
}

/// Create an authenticated HTTP client with a Bearer token header
pub fn create_quip_client(config: &QuipConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
        .map_err(|e| eyre!("Invalid header value: {}", e))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("vaultquip/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Create a new Quip document
///
/// A single request; every failure is returned as a structured [`QuipError`]
/// and nothing is retried.
pub async fn create_document(
    client: &reqwest::Client,
    config: &QuipConfig,
    request: &PublishRequest,
) -> std::result::Result<CreatedDocument, QuipError> {
    let url = new_document_url(&config.hostname);
    log::debug!(
        "POST {} (format={}, {} bytes)",
        url,
        request.format,
        request.content.len()
    );

    let response = client
        .post(&url)
        .form(&request.form_params())
        .send()
        .await
        .map_err(|e| QuipError::transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| QuipError::transport(format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        log::debug!("Quip API error [{}]: {}", status, body);
        return Err(QuipError::from_response(status.as_u16(), &body));
    }

    let document = parse_create_response(status.as_u16(), &body)?;
    log::info!("Created Quip document {}", document.link);

    Ok(document)
}
