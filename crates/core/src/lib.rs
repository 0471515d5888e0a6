//! Core library for vaultquip
//!
//! This crate implements the **Functional Core** of the vaultquip application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The vaultquip project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`vaultquip_core`** (this crate): Pure transformation functions with zero I/O
//! - **`vaultquip`**: Filesystem, HTTP and terminal interaction (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: Notes are read and written through the [`store::NoteStore`]
//!   capability, never directly
//! - **Testable**: Everything here is tested with fixture data and the in-memory
//!   [`store::MemoryStore`]
//!
//! # Module Organization
//!
//! - [`frontmatter`]: Stripping the metadata header and recording published links
//! - [`embeds`]: Finding transclusions (`![[Note]]`) in note text
//! - [`store`]: The note store capability and link resolution
//! - [`transform`]: Turning a note into publishable markdown
//! - [`render`]: Markdown to HTML for the rendered publish format
//! - [`quip`]: Quip `new-document` request and response models
//! - [`settings`]: The persisted settings blob
//!
//! # Example Usage
//!
//! ```rust
//! use vaultquip_core::store::{MemoryStore, NoteRef};
//! use vaultquip_core::transform::{transform, TransformOptions};
//!
//! let store = MemoryStore::new()
//!     .with_note("Notes.md", "Hello ![[Other]]")
//!     .with_note("Other.md", "---\ntags: [x]\n---\nworld");
//!
//! let output = transform(&store, &TransformOptions::default(), &NoteRef::new("Notes.md")).unwrap();
//! assert_eq!(output, "# Notes\nHello # Other\nworld");
//! ```

pub mod embeds;
pub mod frontmatter;
pub mod quip;
pub mod render;
pub mod settings;
pub mod store;
pub mod transform;
