//! Result notifier: records the published link and tells the user about it

use crate::prelude::{eprintln, *};
use colored::Colorize;
use std::io::Write;

use vaultquip_core::frontmatter::append_link;
use vaultquip_core::settings::Settings;
use vaultquip_core::store::{NoteRef, NoteStore};

use crate::quip::{CreatedDocument, QuipError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Failure,
}

/// Transient message sink
pub trait Notice {
    fn show(&mut self, kind: NoticeKind, message: &str);
}

/// A dialog that can be opened, rendered and closed
pub trait Modal {
    fn title(&self) -> &str;

    fn render(&self) -> String;

    fn open(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "{}", self.render())
    }

    fn close(&self) {}
}

/// Notices printed to stderr
#[derive(Debug, Default)]
pub struct TerminalNotice;

impl Notice for TerminalNotice {
    fn show(&mut self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => eprintln!("{}", message.green().bold()),
            NoticeKind::Warning => eprintln!("{}", message.yellow()),
            NoticeKind::Failure => eprintln!("{} {}", "Error:".red().bold(), message),
        }
    }
}

/// Modal showing the link of a freshly created document
#[derive(Debug, Clone, PartialEq)]
pub struct LinkModal {
    pub link: String,
}

impl Modal for LinkModal {
    fn title(&self) -> &str {
        "Published to Quip"
    }

    fn render(&self) -> String {
        let mut table = new_table();
        table.set_titles(prettytable::row![self.title().bold().cyan()]);
        table.add_row(prettytable::row![self.link.underline().bright_blue()]);
        table.to_string()
    }
}

/// What the notifier did with a publish outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Notified {
    Published {
        modal: LinkModal,
        link_recorded: bool,
    },
    Failed(QuipError),
}

/// Route a publish outcome to the note and the user
///
/// On success the link is appended to the note's `quip` front matter key (when
/// enabled) and a [`LinkModal`] is returned for the caller to open. A failed
/// front matter rewrite is reported as a warning; the document exists either way.
pub fn handle_outcome<S, N>(
    store: &S,
    notice: &mut N,
    settings: &Settings,
    note: &NoteRef,
    outcome: std::result::Result<CreatedDocument, QuipError>,
) -> Notified
where
    S: NoteStore + ?Sized,
    N: Notice + ?Sized,
{
    let document = match outcome {
        Ok(document) => document,
        Err(error) => {
            log::warn!("Publishing {} failed: {}", note.path, error);
            notice.show(NoticeKind::Failure, &error.to_string());
            return Notified::Failed(error);
        }
    };

    let link_recorded = settings.append_link && {
        match record_link(store, note, &document.link) {
            Ok(()) => true,
            Err(e) => {
                notice.show(
                    NoticeKind::Warning,
                    &f!("Published, but could not update {}: {}", note.path, e),
                );
                false
            }
        }
    };

    notice.show(
        NoticeKind::Success,
        &f!("Published {} to Quip", note.title),
    );

    Notified::Published {
        modal: LinkModal {
            link: document.link,
        },
        link_recorded,
    }
}

/// Append a link to the note's front matter and save it
pub fn record_link<S>(store: &S, note: &NoteRef, link: &str) -> Result<()>
where
    S: NoteStore + ?Sized,
{
    let content = store.read(note)?;
    let updated = append_link(&content, link)?;
    store.write(note, &updated)?;
    log::debug!("Recorded {} in {}", link, note.path);
    Ok(())
}
