use crate::prelude::{eprintln, *};
use clap::Parser;
use std::path::PathBuf;

mod config;
mod error;
mod notify;
mod plugin;
mod prelude;
mod publish;
mod quip;
mod vault;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Publish notes from a markdown vault to Quip"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Vault directory holding the notes
    #[clap(long, env = "VAULTQUIP_VAULT", global = true, default_value = ".")]
    vault: PathBuf,

    /// Settings file (defaults to the user config directory)
    #[clap(long, env = "VAULTQUIP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Quip API host for this run, overriding the saved setting
    #[clap(long, env = "QUIP_HOSTNAME", global = true)]
    hostname: Option<String>,

    /// Quip access token for this run, overriding the saved setting
    #[clap(long, env = "QUIP_ACCESS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "VAULTQUIP_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Publish a note to Quip as rendered HTML
    PublishHtml(publish::PublishOptions),

    /// Publish a note to Quip as Markdown
    PublishMarkdown(publish::PublishOptions),

    /// Print the content a publish command would send
    Preview(publish::PreviewOptions),

    /// List the registered commands and whether they are enabled for a note
    Commands(publish::CommandsOptions),

    /// Show or change saved settings
    #[command(subcommand)]
    Config(config::Commands),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    if app.global.verbose {
        eprintln!("Vault: {}", app.global.vault.display());
    }

    match app.command {
        SubCommands::PublishHtml(options) => {
            publish::handler(plugin::PUBLISH_HTML, options, app.global).await
        }
        SubCommands::PublishMarkdown(options) => {
            publish::handler(plugin::PUBLISH_MARKDOWN, options, app.global).await
        }
        SubCommands::Preview(options) => publish::preview_handler(options, app.global).await,
        SubCommands::Commands(options) => publish::commands_handler(options, app.global).await,
        SubCommands::Config(cmd) => config::run(cmd, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
