//! Plugin capability and the command dispatcher
//!
//! The plugin holds a [`SettingsController`] for its lifetime: settings are
//! loaded once in [`Plugin::on_load`] and read-only while commands run.

use crate::prelude::*;
use std::path::{Path, PathBuf};

use vaultquip_core::render::markdown_to_html;
use vaultquip_core::settings::Settings;
use vaultquip_core::store::NoteRef;
use vaultquip_core::transform::{transform, TransformOptions};

use crate::config::SettingsController;
use crate::notify::{handle_outcome, Notice, Notified};
use crate::quip::{create_document, create_quip_client, DocumentFormat, PublishRequest, QuipConfig};
use crate::vault::FsVault;

/// Id of the "publish as rendered markup" command
pub const PUBLISH_HTML: &str = "publish-html";

/// Id of the "publish as plain markup" command
pub const PUBLISH_MARKDOWN: &str = "publish-markdown";

/// A registered, user-invokable command
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub format: DocumentFormat,
    /// Enabled-predicate: is there an editable note to act on
    pub check: fn(&FsVault, &NoteRef) -> bool,
}

/// Lifecycle and command registration capability of a plugin
pub trait Plugin {
    /// Load persisted state; called once before any command runs
    fn on_load(&mut self) -> Result<()>;

    /// Commands this plugin registers
    fn commands(&self) -> Vec<CommandSpec>;

    /// Look up a registered command by id
    fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands().into_iter().find(|spec| spec.id == id)
    }
}

/// Per-invocation options of a publish command
#[derive(Debug, Clone, Default)]
pub struct PublishParams {
    pub title: Option<String>,
    pub member_ids: Vec<String>,
}

/// One-off overrides of persisted connection settings (from flags or env)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub hostname: Option<String>,
    pub token: Option<String>,
}

pub struct QuipPlugin {
    vault: FsVault,
    settings: SettingsController,
    overrides: SettingsOverrides,
}

fn note_is_editable(vault: &FsVault, note: &NoteRef) -> bool {
    vault.is_editable(note)
}

impl QuipPlugin {
    pub fn new(vault: FsVault, settings_path: PathBuf, overrides: SettingsOverrides) -> Self {
        Self {
            vault,
            settings: SettingsController::new(settings_path),
            overrides,
        }
    }

    pub fn vault(&self) -> &FsVault {
        &self.vault
    }

    /// Settings in effect for this run, overrides applied
    pub fn settings(&self) -> Settings {
        let mut settings = self.settings.settings().clone();
        if let Some(hostname) = self.overrides.hostname.as_ref().filter(|h| !h.is_empty()) {
            settings.hostname = hostname.clone();
        }
        if let Some(token) = self.overrides.token.as_ref().filter(|t| !t.is_empty()) {
            settings.token = token.clone();
        }
        settings
    }

    /// Resolve a user-supplied note path and check the command is enabled for it
    pub fn enabled_note(&self, spec: &CommandSpec, path: &Path) -> Result<NoteRef> {
        let note = self.vault.note_ref(path)?;
        if !(spec.check)(&self.vault, &note) {
            return Err(Error::CommandDisabled {
                command: spec.id.to_string(),
                note: note.path,
            }
            .into());
        }
        Ok(note)
    }

    /// Produce the content a command would publish, without publishing it
    pub fn render(&self, note: &NoteRef, format: DocumentFormat) -> Result<String> {
        let options = TransformOptions::from(&self.settings());
        let markdown = transform(&self.vault, &options, note)?;

        Ok(match format {
            DocumentFormat::Markdown => markdown,
            DocumentFormat::Html => markdown_to_html(&markdown),
        })
    }

    /// Run a registered command against a note; opening the link modal is left
    /// to the caller
    pub async fn dispatch<N>(
        &self,
        id: &str,
        path: &Path,
        params: PublishParams,
        notice: &mut N,
    ) -> Result<Notified>
    where
        N: Notice + ?Sized,
    {
        let spec = self
            .command(id)
            .ok_or_else(|| Error::UnknownCommand(id.to_string()))?;
        let note = self.enabled_note(&spec, path)?;

        // Build the client first so a missing token fails before any work
        let settings = self.settings();
        let config = QuipConfig::from_settings(&settings)?;
        let client = create_quip_client(&config)?;

        log::info!("Running {} on {}", spec.name, note.path);
        let content = self.render(&note, spec.format)?;

        let request = PublishRequest {
            title: params.title,
            member_ids: (!params.member_ids.is_empty()).then_some(params.member_ids),
            ..PublishRequest::new(content, spec.format)
        };

        let outcome = create_document(&client, &config, &request).await;
        Ok(handle_outcome(&self.vault, notice, &settings, &note, outcome))
    }
}

impl Plugin for QuipPlugin {
    fn on_load(&mut self) -> Result<()> {
        self.settings.load()
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec {
                id: PUBLISH_HTML,
                name: "Publish as rendered HTML",
                format: DocumentFormat::Html,
                check: note_is_editable,
            },
            CommandSpec {
                id: PUBLISH_MARKDOWN,
                name: "Publish as Markdown",
                format: DocumentFormat::Markdown,
                check: note_is_editable,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoticeKind, TerminalNotice};
    use std::fs;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        _vault_dir: tempfile::TempDir,
        _config_dir: tempfile::TempDir,
        plugin: QuipPlugin,
    }

    fn fixture(files: &[(&str, &str)], settings: &Settings) -> Fixture {
        let vault_dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = vault_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }

        let config_dir = tempfile::tempdir().unwrap();
        let settings_path = config_dir.path().join("settings.json");
        crate::config::save_settings(&settings_path, settings).unwrap();

        let vault = FsVault::open(vault_dir.path()).unwrap();
        let mut plugin = QuipPlugin::new(vault, settings_path, SettingsOverrides::default());
        plugin.on_load().unwrap();

        Fixture {
            _vault_dir: vault_dir,
            _config_dir: config_dir,
            plugin,
        }
    }

    fn settings_for(server: &MockServer) -> Settings {
        Settings {
            hostname: server.uri(),
            token: "tok".into(),
            ..Settings::default()
        }
    }

    #[derive(Default)]
    struct Quiet(Vec<NoticeKind>);

    impl Notice for Quiet {
        fn show(&mut self, kind: NoticeKind, _message: &str) {
            self.0.push(kind);
        }
    }

    #[test]
    fn test_registers_two_commands() {
        let fx = fixture(&[], &Settings::default());
        let ids: Vec<_> = fx.plugin.commands().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![PUBLISH_HTML, PUBLISH_MARKDOWN]);
        assert!(fx.plugin.command("publish-pdf").is_none());
    }

    #[test]
    fn test_commands_disabled_without_editable_note() {
        let fx = fixture(&[("Notes.md", "Hello"), ("data.csv", "a,b")], &Settings::default());
        let spec = fx.plugin.command(PUBLISH_MARKDOWN).unwrap();

        assert!(fx.plugin.enabled_note(&spec, Path::new("Notes.md")).is_ok());
        assert!(fx.plugin.enabled_note(&spec, Path::new("data.csv")).is_err());
        assert!(fx.plugin.enabled_note(&spec, Path::new("Missing.md")).is_err());
    }

    #[test]
    fn test_render_markdown_and_html() {
        let fx = fixture(&[("Notes.md", "Hello")], &Settings::default());
        let note = NoteRef::new("Notes.md");

        assert_eq!(
            fx.plugin.render(&note, DocumentFormat::Markdown).unwrap(),
            "# Notes\nHello"
        );
        assert_eq!(
            fx.plugin.render(&note, DocumentFormat::Html).unwrap(),
            "<h1>Notes</h1>\n<p>Hello</p>\n"
        );
    }

    #[test]
    fn test_overrides_win_over_persisted_settings() {
        let mut fx = fixture(&[], &Settings::default());
        fx.plugin.overrides = SettingsOverrides {
            hostname: Some("quip.internal".into()),
            token: Some("env-token".into()),
        };

        let settings = fx.plugin.settings();
        assert_eq!(settings.hostname, "quip.internal");
        assert_eq!(settings.token, "env-token");
    }

    #[test]
    fn test_on_load_reads_persisted_settings() {
        let persisted = Settings {
            inline_embeds: false,
            ..Settings::default()
        };
        let fx = fixture(&[], &persisted);

        assert!(!fx.plugin.settings().inline_embeds);
    }

    #[tokio::test]
    async fn test_dispatch_without_token_fails_before_network() {
        let fx = fixture(&[("Notes.md", "Hello")], &Settings::default());

        let result = fx
            .plugin
            .dispatch(
                PUBLISH_MARKDOWN,
                Path::new("Notes.md"),
                PublishParams::default(),
                &mut TerminalNotice,
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_publishes_and_records_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/threads/new-document"))
            .and(body_string_contains("format=html"))
            .and(body_string_contains("title=Custom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "thread": {"id": "abc", "link": "https://service/abc"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&[("Notes.md", "Hello ![[Part]]"), ("Part.md", "part")], &settings_for(&server));
        let mut notice = Quiet::default();

        let notified = fx
            .plugin
            .dispatch(
                PUBLISH_HTML,
                Path::new("Notes.md"),
                PublishParams {
                    title: Some("Custom".into()),
                    member_ids: vec![],
                },
                &mut notice,
            )
            .await
            .unwrap();

        assert!(matches!(
            notified,
            Notified::Published {
                link_recorded: true,
                ..
            }
        ));
        let content = fs::read_to_string(fx.plugin.vault().root().join("Notes.md")).unwrap();
        assert_eq!(
            vaultquip_core::frontmatter::recorded_links(&content),
            vec!["https://service/abc"]
        );
        assert_eq!(notice.0, vec![NoticeKind::Success]);
    }

    #[tokio::test]
    async fn test_dispatch_failure_leaves_note_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error_code": 500,
                "error_description": "boom"
            })))
            .mount(&server)
            .await;

        let fx = fixture(&[("Notes.md", "Hello")], &settings_for(&server));
        let mut notice = Quiet::default();

        let notified = fx
            .plugin
            .dispatch(
                PUBLISH_MARKDOWN,
                Path::new("Notes.md"),
                PublishParams::default(),
                &mut notice,
            )
            .await
            .unwrap();

        assert!(matches!(notified, Notified::Failed(_)));
        let content = fs::read_to_string(fx.plugin.vault().root().join("Notes.md")).unwrap();
        assert_eq!(content, "Hello");
        assert_eq!(notice.0, vec![NoticeKind::Failure]);
    }

    #[tokio::test]
    async fn test_dispatch_unresolved_embed_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fx = fixture(&[("Notes.md", "![[Nowhere]]")], &settings_for(&server));

        let result = fx
            .plugin
            .dispatch(
                PUBLISH_MARKDOWN,
                Path::new("Notes.md"),
                PublishParams::default(),
                &mut Quiet::default(),
            )
            .await;

        assert!(result.is_err());
    }
}
