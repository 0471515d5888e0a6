//! Note store abstraction and link resolution
//!
//! The note store is the capability the publishing flow needs from its host:
//! read a note, write it back, and resolve a link relative to another note.
//! Link resolution itself is pure and shared by every store implementation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::embeds::{link_path, NOTE_EXTENSION};

/// Reference to a note inside a vault
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NoteRef {
    /// Vault-relative path with `/` separators (`folder/Note.md`)
    pub path: String,
    /// Display title: the file name without extension
    pub title: String,
}

impl NoteRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let title = Path::new(&path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        Self { path, title }
    }

    /// Folder containing the note, empty for the vault root
    pub fn folder(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// Errors raised by a note store
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Host capability for reading, writing and resolving notes
pub trait NoteStore {
    /// Read the full text of a note
    fn read(&self, note: &NoteRef) -> Result<String, StoreError>;

    /// Replace the full text of a note
    fn write(&self, note: &NoteRef, content: &str) -> Result<(), StoreError>;

    /// Resolve a link found in `from` to the note it points at
    fn resolve(&self, link: &str, from: &NoteRef) -> Option<NoteRef>;
}

// ============================================================================
// Pure Helper Functions
// ============================================================================

/// Normalize `.` and `..` segments of a `/`-separated path
///
/// Returns `None` when `..` would escape the vault root.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}

fn with_note_extension(path: &str) -> String {
    let has_extension = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION));

    if has_extension {
        path.to_string()
    } else {
        format!("{path}.{NOTE_EXTENSION}")
    }
}

/// Resolve a link against the set of notes in a vault
///
/// Resolution order:
/// 1. the path relative to the linking note's folder
/// 2. the path relative to the vault root
/// 3. any note whose path ends with the link path (case-insensitive),
///    preferring the linking note's folder, then the shortest path
pub fn resolve_link<'a, I>(link: &str, from: &NoteRef, notes: I) -> Option<NoteRef>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = link_path(link);
    if target.is_empty() {
        return None;
    }

    let target = with_note_extension(target.trim_start_matches('/'));
    let notes: Vec<&str> = notes.into_iter().collect();

    let folder = from.folder();
    let relative = if folder.is_empty() {
        normalize_path(&target)
    } else {
        normalize_path(&format!("{folder}/{target}"))
    };

    for candidate in [relative, normalize_path(&target)].into_iter().flatten() {
        if notes.contains(&candidate.as_str()) {
            return Some(NoteRef::new(candidate));
        }
    }

    let wanted = normalize_path(&target)?.to_lowercase();
    let suffix = format!("/{wanted}");

    notes
        .iter()
        .filter(|note| {
            let lower = note.to_lowercase();
            lower == wanted || lower.ends_with(&suffix)
        })
        .min_by_key(|note| {
            let same_folder = NoteRef::new(**note).folder() == folder;
            (!same_folder, note.len(), **note)
        })
        .map(|note| NoteRef::new(*note))
}

// ============================================================================
// In-memory store
// ============================================================================

/// Note store backed by a map, for fixtures and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a note, builder style
    pub fn with_note(self, path: &str, content: &str) -> Self {
        self.notes
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Current content of a note, if present
    pub fn content(&self, path: &str) -> Option<String> {
        self.notes.borrow().get(path).cloned()
    }
}

impl NoteStore for MemoryStore {
    fn read(&self, note: &NoteRef) -> Result<String, StoreError> {
        self.content(&note.path)
            .ok_or_else(|| StoreError::NotFound(note.path.clone()))
    }

    fn write(&self, note: &NoteRef, content: &str) -> Result<(), StoreError> {
        self.notes
            .borrow_mut()
            .insert(note.path.clone(), content.to_string());
        Ok(())
    }

    fn resolve(&self, link: &str, from: &NoteRef) -> Option<NoteRef> {
        let notes = self.notes.borrow();
        resolve_link(link, from, notes.keys().map(String::as_str))
    }
}
