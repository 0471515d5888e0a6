use crate::prelude::{println, *};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};

use vaultquip_core::store::NoteRef;

use crate::notify::{Modal, Notified, TerminalNotice};
use crate::plugin::{Plugin, PublishParams, QuipPlugin, SettingsOverrides};
use crate::quip::DocumentFormat;
use crate::vault::FsVault;

/// Options shared by both publish commands
#[derive(Debug, clap::Args, Clone)]
pub struct PublishOptions {
    /// Note to publish (relative to the vault, or absolute)
    pub note: PathBuf,

    /// Explicit document title (Quip otherwise uses the first heading)
    #[arg(long)]
    pub title: Option<String>,

    /// Quip user or folder id to share the document with (repeatable)
    #[arg(long = "member", value_name = "ID")]
    pub members: Vec<String>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for previewing the published content
#[derive(Debug, clap::Args, Clone)]
pub struct PreviewOptions {
    /// Note to preview (relative to the vault, or absolute)
    pub note: PathBuf,

    /// Show the rendered HTML instead of Markdown
    #[arg(long)]
    pub html: bool,
}

/// Options for listing commands
#[derive(Debug, clap::Args, Clone)]
pub struct CommandsOptions {
    /// Note to check each command's availability against
    pub note: Option<PathBuf>,
}

/// Build and load the plugin for this run
pub fn load_plugin(global: &crate::Global) -> Result<QuipPlugin> {
    let vault = FsVault::open(&global.vault)?;
    let settings_path = crate::config::settings_path(global.config.as_deref())?;
    let overrides = SettingsOverrides {
        hostname: global.hostname.clone(),
        token: global.token.clone(),
    };

    let mut plugin = QuipPlugin::new(vault, settings_path, overrides);
    plugin.on_load()?;

    Ok(plugin)
}

/// CLI handler for both publish commands
pub async fn handler(id: &str, options: PublishOptions, global: crate::Global) -> Result<()> {
    let plugin = load_plugin(&global)?;
    let params = PublishParams {
        title: options.title.clone(),
        member_ids: options.members.clone(),
    };

    let notified = plugin
        .dispatch(id, &options.note, params, &mut TerminalNotice)
        .await?;

    report(&notified, options.json, &mut anstream::stdout())?;

    match notified {
        Notified::Published { .. } => Ok(()),
        Notified::Failed(_) => Err(eyre!("Publishing {} failed", options.note.display())),
    }
}

/// Write the outcome of a publish to stdout: the link modal, or JSON only
fn report(notified: &Notified, json: bool, out: &mut dyn Write) -> Result<()> {
    match notified {
        Notified::Published {
            modal,
            link_recorded,
        } => {
            if json {
                let value = serde_json::json!({
                    "link": modal.link,
                    "linkRecorded": link_recorded,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            } else {
                modal.open(out)?;
                modal.close();
            }
        }
        Notified::Failed(error) => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&error.info)?)?;
            }
        }
    }

    Ok(())
}

/// CLI handler for the preview command
pub async fn preview_handler(options: PreviewOptions, global: crate::Global) -> Result<()> {
    let plugin = load_plugin(&global)?;
    let note = plugin.vault().note_ref(&options.note)?;
    let format = if options.html {
        DocumentFormat::Html
    } else {
        DocumentFormat::Markdown
    };

    println!("{}", plugin.render(&note, format)?);

    Ok(())
}

fn availability(plugin: &QuipPlugin, note: Option<&Path>) -> Result<Option<NoteRef>> {
    note.map(|path| plugin.vault().note_ref(path)).transpose()
}

/// CLI handler for the commands listing
pub async fn commands_handler(options: CommandsOptions, global: crate::Global) -> Result<()> {
    let plugin = load_plugin(&global)?;
    let note = availability(&plugin, options.note.as_deref())?;

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Command".bold().cyan(),
        "Name".bold().cyan(),
        "Format".bold().cyan(),
        "Enabled".bold().cyan()
    ]);

    for spec in plugin.commands() {
        let enabled = match &note {
            Some(note) if (spec.check)(plugin.vault(), note) => "yes".green().to_string(),
            Some(_) => "no".red().to_string(),
            None => "-".bright_black().to_string(),
        };
        table.add_row(prettytable::row![spec.id, spec.name, spec.format, enabled]);
    }

    table.printstd();

    Ok(())
}
