//! Filesystem note store
//!
//! A vault is a directory tree of markdown notes. Paths handed to the core are
//! vault-relative with `/` separators.

use crate::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use vaultquip_core::embeds::NOTE_EXTENSION;
use vaultquip_core::store::{resolve_link, NoteRef, NoteStore, StoreError};

/// Directories in a vault that hold application state rather than notes
const SKIPPED_DIRS: &[&str] = &[".obsidian", ".git", ".trash"];

#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    notes: OnceLock<Vec<String>>,
}

impl FsVault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let root = root
            .canonicalize()
            .with_context(|| f!("Vault directory not found: {}", root.display()))?;

        if !root.is_dir() {
            return Err(eyre!("Vault is not a directory: {}", root.display()));
        }

        Ok(Self {
            root,
            notes: OnceLock::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a note
    pub fn absolute(&self, note: &NoteRef) -> PathBuf {
        note.path
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Turn a user-supplied path (absolute, or relative to the vault) into a note reference
    pub fn note_ref(&self, path: &Path) -> Result<NoteRef> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        // Canonicalize when possible so symlinked vaults compare equal
        let absolute = absolute.canonicalize().unwrap_or(absolute);

        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| Error::OutsideVault {
                vault: self.root.display().to_string(),
                note: path.display().to_string(),
            })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::OutsideVault {
                        vault: self.root.display().to_string(),
                        note: path.display().to_string(),
                    }
                    .into())
                }
            }
        }

        Ok(NoteRef::new(segments.join("/")))
    }

    /// A note is editable when it is an existing, writable markdown file
    pub fn is_editable(&self, note: &NoteRef) -> bool {
        let path = self.absolute(note);
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION));

        is_markdown
            && fs::metadata(&path)
                .map(|meta| meta.is_file() && !meta.permissions().readonly())
                .unwrap_or(false)
    }

    /// All notes in the vault, vault-relative, sorted; only application state
    /// directories are skipped
    pub fn notes(&self) -> &[String] {
        self.notes.get_or_init(|| {
            let mut notes: Vec<String> = ignore::WalkBuilder::new(&self.root)
                .standard_filters(false)
                .filter_entry(|entry| {
                    let skipped = entry.depth() > 0
                        && entry.file_type().is_some_and(|t| t.is_dir())
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| SKIPPED_DIRS.contains(&name));
                    !skipped
                })
                .build()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
                .filter_map(|entry| {
                    let path = entry.path();
                    let is_note = path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION));
                    if !is_note {
                        return None;
                    }

                    let relative = path.strip_prefix(&self.root).ok()?;
                    let segments: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    Some(segments.join("/"))
                })
                .collect();

            notes.sort();
            log::debug!("Indexed {} notes in {}", notes.len(), self.root.display());
            notes
        })
    }
}

impl NoteStore for FsVault {
    fn read(&self, note: &NoteRef) -> std::result::Result<String, StoreError> {
        let path = self.absolute(note);
        log::debug!("Reading {}", path.display());

        fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(note.path.clone()),
            _ => StoreError::Read {
                path: note.path.clone(),
                message: e.to_string(),
            },
        })
    }

    fn write(&self, note: &NoteRef, content: &str) -> std::result::Result<(), StoreError> {
        let path = self.absolute(note);
        log::debug!("Writing {}", path.display());

        fs::write(&path, content).map_err(|e| StoreError::Write {
            path: note.path.clone(),
            message: e.to_string(),
        })
    }

    fn resolve(&self, link: &str, from: &NoteRef) -> Option<NoteRef> {
        let resolved = resolve_link(link, from, self.notes().iter().map(String::as_str));
        log::debug!(
            "Resolved '{}' from {} to {:?}",
            link,
            from.path,
            resolved.as_ref().map(|n| &n.path)
        );
        resolved
    }
}
