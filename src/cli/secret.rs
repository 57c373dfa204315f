//! Credential store CLI commands

use clap::Subcommand;

use crate::credentials::CredentialStore;
use crate::crypto::SecureString;
use crate::error::KeywardResult;

use super::passphrase::prompt_passphrase;

/// Environment variable holding the value for `secret set`
pub const SECRET_ENV: &str = "KEYWARD_SECRET";

/// Secret management subcommands
#[derive(Subcommand, Debug)]
pub enum SecretCommands {
    /// Store a secret, replacing any existing one
    Set {
        service: String,
        account: String,
        /// Read from `KEYWARD_SECRET`, or prompted for
        #[arg(skip)]
        secret: Option<SecureString>,
    },

    /// Print a stored secret
    Get { service: String, account: String },

    /// Delete a stored secret
    #[command(alias = "rm")]
    Delete { service: String, account: String },
}

/// Handle a secret command
pub fn handle_secret_command(
    store: &dyn CredentialStore,
    cmd: SecretCommands,
) -> KeywardResult<()> {
    match cmd {
        SecretCommands::Set {
            service,
            account,
            secret,
        } => {
            let from_env = || std::env::var(SECRET_ENV).ok().map(SecureString::from);
            let secret = match secret.or_else(from_env) {
                Some(secret) => secret,
                None => prompt_passphrase(&format!("Secret for {}/{}: ", service, account))?,
            };
            store.store(&service, &account, &secret)?;
            println!("Stored secret for {}/{}", service, account);
        }
        SecretCommands::Get { service, account } => {
            let secret = store.retrieve(&service, &account)?;
            println!("{}", secret.as_str());
        }
        SecretCommands::Delete { service, account } => {
            store.delete(&service, &account)?;
            println!("Deleted secret for {}/{}", service, account);
        }
    }

    Ok(())
}
