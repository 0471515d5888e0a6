use crate::prelude::{println, *};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use vaultquip_core::settings::Settings;

/// Directory name under the user config dir
const CONFIG_DIR_NAME: &str = "vaultquip";

/// Settings file name
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Settings commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Show the current settings (the token is masked)
    #[clap(name = "show")]
    Show(ShowOptions),

    /// Change a setting and save it immediately
    #[clap(name = "set")]
    Set(SetOptions),

    /// Print the settings file location
    #[clap(name = "path")]
    Path,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct SetOptions {
    /// Setting name: hostname, token, stripFrontMatter, appendLink or inlineEmbeds
    pub key: String,

    /// New value (booleans accept true/false, yes/no, on/off, 1/0)
    pub value: String,
}

/// Resolve the settings file path, honoring an explicit override
pub fn settings_path(config: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config {
        return Ok(path.to_path_buf());
    }

    Ok(dirs_next::config_dir()
        .ok_or_eyre("Unable to determine config directory")?
        .join(CONFIG_DIR_NAME)
        .join(SETTINGS_FILE_NAME))
}

/// Load settings, creating the file with defaults on first run
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::info!("No settings at {}, writing defaults", path.display());
        let settings = Settings::default();
        save_settings(path, &settings)?;
        return Ok(settings);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| f!("Failed to read settings from {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_json::from_str(&raw).with_context(|| f!("Invalid settings file {}", path.display()))
}

/// Persist settings as pretty-printed JSON
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(|e| eyre!("Failed to write settings: {}", e))?;
    log::debug!("Saved settings to {}", path.display());

    Ok(())
}

/// Owner of the persisted settings: loads them once and persists every change
#[derive(Debug, Clone)]
pub struct SettingsController {
    path: PathBuf,
    settings: Settings,
}

impl SettingsController {
    /// A controller holding defaults until [`SettingsController::load`] runs
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn load(&mut self) -> Result<()> {
        self.settings = load_settings(&self.path)?;
        log::debug!("Loaded settings from {}", self.path.display());
        Ok(())
    }

    /// Apply a single change and persist it immediately
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.set(key, value).map_err(|e| eyre!(e))?;
        save_settings(&self.path, &settings)?;
        self.settings = settings;
        Ok(())
    }
}

fn show_handler(path: &Path, options: ShowOptions) -> Result<()> {
    let settings = load_settings(path)?.redacted();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let flag = |value: bool| {
        if value {
            "on".green().to_string()
        } else {
            "off".bright_black().to_string()
        }
    };
    let token = if settings.token.is_empty() {
        "(not set)".yellow().to_string()
    } else {
        settings.token.clone()
    };

    let mut table = new_table();
    table.add_row(prettytable::row!["hostname".bold().cyan(), settings.hostname]);
    table.add_row(prettytable::row!["token".bold().cyan(), token]);
    table.add_row(prettytable::row![
        "stripFrontMatter".bold().cyan(),
        flag(settings.strip_front_matter)
    ]);
    table.add_row(prettytable::row![
        "appendLink".bold().cyan(),
        flag(settings.append_link)
    ]);
    table.add_row(prettytable::row![
        "inlineEmbeds".bold().cyan(),
        flag(settings.inline_embeds)
    ]);
    table.printstd();

    Ok(())
}

/// Run settings commands
pub async fn run(cmd: Commands, global: crate::Global) -> Result<()> {
    let path = settings_path(global.config.as_deref())?;

    match cmd {
        Commands::Show(options) => show_handler(&path, options),
        Commands::Set(options) => {
            let mut controller = SettingsController::new(path);
            controller.load()?;
            controller.update(&options.key, &options.value)?;
            println!("{} {}", "Saved".green().bold(), options.key);
            Ok(())
        }
        Commands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = load_settings(&path).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_backfills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"token": "t0k3n", "inlineEmbeds": false}"#).unwrap();

        let settings = load_settings(&path).unwrap();

        assert_eq!(settings.token, "t0k3n");
        assert!(!settings.inline_embeds);
        assert!(settings.append_link);
        assert_eq!(settings.hostname, "platform.quip.com");
    }

    fn controller(dir: &tempfile::TempDir) -> SettingsController {
        let mut controller = SettingsController::new(dir.path().join("settings.json"));
        controller.load().unwrap();
        controller
    }

    #[test]
    fn test_update_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(&dir);

        controller.update("appendLink", "no").unwrap();
        controller.update("token", "secret").unwrap();

        assert!(!controller.settings().append_link);
        let reloaded = load_settings(controller.path()).unwrap();
        assert!(!reloaded.append_link);
        assert_eq!(reloaded.token, "secret");
    }

    #[test]
    fn test_update_rejects_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(&dir);

        assert!(controller.update("appendLink", "sometimes").is_err());
        assert!(controller.settings().append_link);
        assert!(load_settings(controller.path()).unwrap().append_link);
    }

    #[test]
    fn test_update_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(&dir);

        let err = controller.update("colour", "blue").unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn test_settings_path_override() {
        let path = settings_path(Some(Path::new("/tmp/custom.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }
}
