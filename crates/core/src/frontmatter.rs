//! Pure functions for YAML front matter (the `---` delimited metadata header)
//!
//! This module contains zero I/O operations and is fully testable with fixture data.

use serde_yaml::{Mapping, Value};

/// Delimiter that opens and closes a front matter block
pub const DELIMITER: &str = "---";

/// Front matter key that accumulates published document links
pub const QUIP_KEY: &str = "quip";

/// Errors raised while rewriting front matter
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrontMatterError {
    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),

    #[error("Front matter is not a key-value mapping")]
    NotAMapping,

    #[error("Failed to serialize front matter: {0}")]
    Serialize(String),
}

// ============================================================================
// Pure Helper Functions
// ============================================================================

/// Strip a leading front matter block from note content
///
/// When the content starts with `---`, everything up to and including the next
/// `---` is discarded and the remainder is trimmed. Content that does not start
/// with the delimiter is returned untouched. A header without a closing
/// delimiter is treated as absent.
pub fn strip_front_matter(content: &str) -> &str {
    let Some(rest) = content.strip_prefix(DELIMITER) else {
        return content;
    };

    match rest.find(DELIMITER) {
        Some(end) => rest[end + DELIMITER.len()..].trim(),
        None => content,
    }
}

/// Split content into its raw YAML header and the body that follows it
///
/// Unlike [`strip_front_matter`], the closing delimiter must sit on its own line
/// and the body is returned exactly as written, so the note can be reassembled.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// Body of a note, skipping its front matter if it has a well-formed one
pub fn body(content: &str) -> &str {
    split_front_matter(content)
        .map(|(_, body)| body)
        .unwrap_or(content)
}

/// Merge a new link into an existing `quip` value
///
/// - absent (or null) becomes the link itself
/// - a single value becomes a two-element list
/// - a list gets the link appended
pub fn merge_link(existing: Option<Value>, link: &str) -> Value {
    let new = Value::String(link.to_string());

    match existing {
        None | Some(Value::Null) => new,
        Some(Value::Sequence(mut links)) => {
            links.push(new);
            Value::Sequence(links)
        }
        Some(single) => Value::Sequence(vec![single, new]),
    }
}

// ============================================================================
// Pure Transformation Functions
// ============================================================================

/// Record a published link in the note's front matter
///
/// Notes without front matter gain a new block holding only the link. The body
/// is preserved byte for byte.
pub fn append_link(content: &str, link: &str) -> Result<String, FrontMatterError> {
    let (yaml, body) = split_front_matter(content).unwrap_or(("", content));

    let mut mapping = if yaml.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)
            .map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?
        {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(FrontMatterError::NotAMapping),
        }
    };

    let key = Value::String(QUIP_KEY.to_string());
    // insert() on an existing key keeps its position
    let merged = merge_link(mapping.get(&key).cloned(), link);
    mapping.insert(key, merged);

    let serialized = serde_yaml::to_string(&Value::Mapping(mapping))
        .map_err(|e| FrontMatterError::Serialize(e.to_string()))?;

    Ok(format!("{DELIMITER}\n{serialized}{DELIMITER}\n{body}"))
}

/// Read the published links recorded in the front matter, oldest first
pub fn recorded_links(content: &str) -> Vec<String> {
    let Some((yaml, _)) = split_front_matter(content) else {
        return Vec::new();
    };

    let Ok(Value::Mapping(map)) = serde_yaml::from_str::<Value>(yaml) else {
        return Vec::new();
    };

    match map.get(QUIP_KEY) {
        Some(Value::String(link)) => vec![link.clone()],
        Some(Value::Sequence(links)) => links
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
