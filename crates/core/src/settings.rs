//! Persisted settings model
//!
//! Pure data and validation; loading and saving the blob lives in the shell.

use serde::{Deserialize, Serialize};

/// Default Quip API host
pub const DEFAULT_HOSTNAME: &str = "platform.quip.com";

/// Settings keys accepted by [`Settings::set`]
pub const SETTING_KEYS: &[&str] = &[
    "hostname",
    "token",
    "stripFrontMatter",
    "appendLink",
    "inlineEmbeds",
];

/// Errors raised while editing settings
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("Unknown setting '{0}' (expected one of: {keys})", keys = SETTING_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid boolean '{value}' for {key}")]
    InvalidBool { key: String, value: String },

    #[error("Setting '{0}' cannot be empty")]
    Empty(String),
}

/// Plugin settings, stored as a single JSON blob
///
/// Fields missing from a stored blob are backfilled with their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Quip API host, optionally with an explicit scheme
    pub hostname: String,
    /// Personal access token used as a bearer token
    pub token: String,
    /// Remove the front matter before publishing
    pub strip_front_matter: bool,
    /// Record the new document link in the note's front matter
    pub append_link: bool,
    /// Inline embedded notes before publishing
    pub inline_embeds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            token: String::new(),
            strip_front_matter: true,
            append_link: true,
            inline_embeds: true,
        }
    }
}

impl Settings {
    /// Update a single setting from its textual value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "hostname" => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(SettingsError::Empty(key.to_string()));
                }
                self.hostname = value.to_string();
            }
            "token" => self.token = value.trim().to_string(),
            "stripFrontMatter" => self.strip_front_matter = parse_bool(key, value)?,
            "appendLink" => self.append_link = parse_bool(key, value)?,
            "inlineEmbeds" => self.inline_embeds = parse_bool(key, value)?,
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }

        Ok(())
    }

    /// Copy safe to display: the token is masked except for its last 4 characters
    pub fn redacted(&self) -> Self {
        let token = if self.token.is_empty() {
            String::new()
        } else {
            let chars: Vec<char> = self.token.chars().collect();
            let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("****{visible}")
        };

        Self {
            token,
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// Parse a boolean setting value
pub fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
