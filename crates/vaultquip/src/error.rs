#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Command '{0}' is not registered")]
    UnknownCommand(String),

    #[error("Command '{command}' is not available for {note}: open an existing, writable markdown note inside the vault")]
    CommandDisabled { command: String, note: String },

    #[error("No Quip access token configured. Run `vaultquip config set token <TOKEN>` or set QUIP_ACCESS_TOKEN")]
    MissingToken,

    #[error("Note is outside the vault {vault}: {note}")]
    OutsideVault { vault: String, note: String },
}
