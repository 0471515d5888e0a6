//! Content transformer: turns a note into the text that gets published
//!
//! Steps, in order:
//! 1. strip the front matter (when enabled)
//! 2. inline embedded notes recursively, depth-first (when enabled)
//! 3. prepend a `# <title>` heading

use crate::embeds::extract_embeds;
use crate::frontmatter::{body, strip_front_matter};
use crate::settings::Settings;
use crate::store::{NoteRef, NoteStore, StoreError};

/// Default bound on embed nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options controlling the transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub strip_front_matter: bool,
    pub inline_embeds: bool,
    pub max_depth: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            strip_front_matter: true,
            inline_embeds: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&Settings> for TransformOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            strip_front_matter: settings.strip_front_matter,
            inline_embeds: settings.inline_embeds,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Errors that abort a transform
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cannot resolve embed '{link}' in {from}")]
    UnresolvedEmbed { link: String, from: String },

    #[error("Embed cycle detected: {}", chain.join(" -> "))]
    EmbedCycle { chain: Vec<String> },

    #[error("Embeds nested deeper than {max_depth} levels at {path}")]
    DepthExceeded { path: String, max_depth: usize },
}

/// Heading line prepended to every transformed note
pub fn title_heading(title: &str) -> String {
    format!("# {title}")
}

/// Transform a note into publishable markdown
pub fn transform<S>(
    store: &S,
    options: &TransformOptions,
    note: &NoteRef,
) -> Result<String, TransformError>
where
    S: NoteStore + ?Sized,
{
    let mut stack = Vec::new();
    transform_note(store, options, note, &mut stack)
}

fn transform_note<S>(
    store: &S,
    options: &TransformOptions,
    note: &NoteRef,
    stack: &mut Vec<String>,
) -> Result<String, TransformError>
where
    S: NoteStore + ?Sized,
{
    if stack.contains(&note.path) {
        let mut chain = stack.clone();
        chain.push(note.path.clone());
        return Err(TransformError::EmbedCycle { chain });
    }

    if stack.len() > options.max_depth {
        return Err(TransformError::DepthExceeded {
            path: note.path.clone(),
            max_depth: options.max_depth,
        });
    }

    let text = store.read(note)?;

    let mut content = if options.strip_front_matter {
        strip_front_matter(&text).to_string()
    } else {
        text.clone()
    };

    if options.inline_embeds {
        stack.push(note.path.clone());

        for embed in extract_embeds(body(&text)) {
            // Attachments (images, PDFs, ...) stay as written
            if !embed.is_note() {
                continue;
            }

            let target = store.resolve(&embed.link, note).ok_or_else(|| {
                TransformError::UnresolvedEmbed {
                    link: embed.link.clone(),
                    from: note.path.clone(),
                }
            })?;

            let inlined = transform_note(store, options, &target, stack)?;
            // Literal substitution: every occurrence of the embed text is replaced
            content = content.replace(&embed.original, &inlined);
        }

        stack.pop();
    }

    Ok(format!("{}\n{}", title_heading(&note.title), content))
}
