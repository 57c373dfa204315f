use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use keyward::backup::OperationState;
use keyward::cli::{
    handle_backup_command, handle_info_command, handle_restore_command, handle_secret_command,
    BackupArgs, InfoArgs, RestoreArgs, SecretCommands,
};
use keyward::config::{paths::KeywardPaths, settings::Settings};
use keyward::credentials::KeychainCredentialStore;

#[derive(Parser)]
#[command(
    name = "keyward",
    author = "Kaylee Beyene",
    version,
    about = "Encrypted backup and restore of SSH keys and signing keyrings",
    long_about = "Keyward captures your SSH keys, SSH config and exported GPG keyring \
                  into a passphrase-protected backup directory, and restores them with \
                  verified integrity and the right file permissions."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt SSH material and the signing keyring into a backup directory
    Backup(BackupArgs),

    /// Verify, decrypt and restore a backup
    Restore(RestoreArgs),

    /// Show the manifest of a backup
    Info(InfoArgs),

    /// Platform credential store commands
    #[command(subcommand)]
    Secret(SecretCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Initialize paths and settings
    let paths = KeywardPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Backup(args)) => {
            handle_backup_command(&paths, &settings, args)?;
        }
        Some(Commands::Restore(args)) => {
            let report = handle_restore_command(&paths, &settings, args)?;
            if report.failed_count() > 0 || report.state == OperationState::Failed {
                std::process::exit(1);
            }
        }
        Some(Commands::Info(args)) => {
            handle_info_command(&paths, args)?;
        }
        Some(Commands::Secret(cmd)) => {
            handle_secret_command(&KeychainCredentialStore::new(), cmd)?;
        }
        Some(Commands::Config) => {
            println!("Keyward Configuration");
            println!("=====================");
            println!("Config file:      {}", paths.settings_file().display());
            println!("SSH directory:    {}", paths.ssh_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!();
            println!("Settings:");
            println!("  Sources:        {}", settings.sources.join(", "));
            println!(
                "  KDF:            {:?} ({} iterations, {:?} salt)",
                settings.kdf.algorithm, settings.kdf.iterations, settings.kdf.salt_policy
            );
            println!("  Keyring backup: {}", settings.include_keyring);
            println!("  Keyring import: {}", settings.import_keyring);
            println!("  Load into agent: {}", settings.load_into_agent);
            println!(
                "  Abort on integrity failure: {}",
                settings.abort_on_integrity_failure
            );
        }
        None => {
            println!("Keyward - encrypted backup of SSH and signing keys");
            println!();
            println!("Run 'keyward --help' for usage information.");
        }
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("keyward=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyward=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
