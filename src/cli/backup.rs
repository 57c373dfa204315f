//! Backup CLI commands
//!
//! Implements the `backup`, `restore` and `info` commands.

use clap::Args;
use std::path::PathBuf;

use crate::backup::{
    load_kdf_params, BackupManager, BackupReport, ItemStatus, RestoreManager, RestoreReport,
    SourceFile,
};
use crate::config::paths::KeywardPaths;
use crate::config::settings::Settings;
use crate::crypto::SecureString;
use crate::error::KeywardResult;
use crate::integrations::{GpgKeyring, KeyringSource, SshAgent};

use super::passphrase::passphrase_or_prompt;

/// Arguments for `keyward backup`
#[derive(Args, Debug, Default)]
pub struct BackupArgs {
    /// Backup directory (defaults to ~/.keyward-backup)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Directory holding the configured sources (defaults to ~/.ssh)
    #[arg(long)]
    pub ssh_dir: Option<PathBuf>,

    /// Back up this file instead of the configured sources (repeatable)
    #[arg(short, long = "source")]
    pub sources: Vec<PathBuf>,

    /// Don't export the signing keyring
    #[arg(long)]
    pub no_keyring: bool,

    /// Set by callers that already hold the passphrase
    #[arg(skip)]
    pub passphrase: Option<SecureString>,
}

/// Arguments for `keyward restore`
#[derive(Args, Debug, Default)]
pub struct RestoreArgs {
    /// Backup directory to restore from (defaults to ~/.keyward-backup)
    #[arg(short, long)]
    pub from: Option<PathBuf>,

    /// Directory to restore into (defaults to ~/.ssh)
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Don't load restored private keys into ssh-agent
    #[arg(long)]
    pub no_agent: bool,

    /// Don't import restored keyring material
    #[arg(long)]
    pub no_import: bool,

    #[arg(skip)]
    pub passphrase: Option<SecureString>,
}

/// Arguments for `keyward info`
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    /// Backup directory (defaults to ~/.keyward-backup)
    #[arg(short, long)]
    pub from: Option<PathBuf>,
}

/// Handle `keyward backup`
///
/// The passphrase comes from `KEYWARD_PASSPHRASE` or a confirmed prompt.
pub fn handle_backup_command(
    paths: &KeywardPaths,
    settings: &Settings,
    args: BackupArgs,
) -> KeywardResult<BackupReport> {
    let location = args.dest.unwrap_or_else(|| paths.backup_dir());
    let sources = resolve_sources(paths, settings, args.ssh_dir, args.sources)?;
    let passphrase = passphrase_or_prompt(args.passphrase, true)?;

    let gpg = GpgKeyring::default();
    let keyring: Option<&dyn KeyringSource> = if settings.include_keyring && !args.no_keyring {
        Some(&gpg)
    } else {
        None
    };

    println!("Creating backup in {}...", location.display());
    let report = BackupManager::new(&location, settings.kdf.clone())
        .backup(passphrase, &sources, keyring)?;

    for outcome in &report.outcomes {
        match &outcome.status {
            ItemStatus::Captured => println!("  captured  {}", outcome.id),
            ItemStatus::Skipped(reason) => println!("  skipped   {} ({})", outcome.id, reason),
            ItemStatus::Failed(err) => println!("  FAILED    {} ({})", outcome.id, err),
            ItemStatus::Restored(_) => {}
        }
    }
    println!();
    println!("{}", report.summary());
    println!("Location: {}", report.location.display());

    Ok(report)
}

/// Handle `keyward restore`
pub fn handle_restore_command(
    paths: &KeywardPaths,
    settings: &Settings,
    args: RestoreArgs,
) -> KeywardResult<RestoreReport> {
    let location = args.from.unwrap_or_else(|| paths.backup_dir());
    let target = args.target.unwrap_or_else(|| paths.ssh_dir());

    let passphrase = passphrase_or_prompt(args.passphrase, false)?;

    let gpg = GpgKeyring::default();
    let agent = SshAgent::new(settings.use_platform_keychain);

    let mut manager = RestoreManager::new(&location, &target)
        .abort_on_integrity_failure(settings.abort_on_integrity_failure);
    if settings.import_keyring && !args.no_import {
        manager = manager.with_import_sink(&gpg);
    }
    if settings.load_into_agent && !args.no_agent {
        manager = manager.with_agent(&agent);
    }

    println!("Restoring from {}...", location.display());
    let report = manager.restore(passphrase)?;

    if let Some(manifest) = &report.manifest {
        println!("{}", manifest.summary());
    }
    for outcome in &report.outcomes {
        match &outcome.status {
            ItemStatus::Restored(path) => println!("  restored  {}", path.display()),
            ItemStatus::Skipped(reason) => println!("  skipped   {} ({})", outcome.id, reason),
            ItemStatus::Failed(err) => println!("  FAILED    {} ({})", outcome.id, err),
            ItemStatus::Captured => {}
        }
    }
    for warning in report.warnings() {
        println!("  warning   {}", warning);
    }
    println!();
    println!("{}", report.summary());

    if !report.all_restored() && report.failed_count() > 0 {
        println!("\nSome items could not be restored. Check the passphrase and backup contents.");
    }

    Ok(report)
}

/// Handle `keyward info`
pub fn handle_info_command(paths: &KeywardPaths, args: InfoArgs) -> KeywardResult<()> {
    let location = args.from.unwrap_or_else(|| paths.backup_dir());
    let manifest = RestoreManager::new(&location, paths.ssh_dir()).read_manifest()?;
    let params = load_kdf_params(&location)?;

    println!("Backup Details");
    println!("==============");
    println!("Location: {}", location.display());
    println!(
        "Created:  {}",
        manifest.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Keyring:  {}", if manifest.keyring_included { "Yes" } else { "No" });
    println!("KDF:      {:?} ({} iterations)", params.algorithm, params.iterations);
    println!();
    println!("Files:");
    for file in &manifest.included_sources {
        println!("  {}", file);
    }

    Ok(())
}

/// Explicit `--source` paths win over the configured source names
fn resolve_sources(
    paths: &KeywardPaths,
    settings: &Settings,
    ssh_dir: Option<PathBuf>,
    explicit: Vec<PathBuf>,
) -> KeywardResult<Vec<SourceFile>> {
    if !explicit.is_empty() {
        return explicit.into_iter().map(SourceFile::from_path).collect();
    }

    let ssh_dir = ssh_dir.unwrap_or_else(|| paths.ssh_dir());
    settings
        .sources
        .iter()
        .map(|name| SourceFile::in_dir(&ssh_dir, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::OperationState;
    use crate::config::settings::KdfSettings;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, KeywardPaths, Settings) {
        let temp = TempDir::new().unwrap();
        let paths = KeywardPaths::with_base_dir(temp.path().to_path_buf());
        let settings = Settings {
            kdf: KdfSettings {
                iterations: 1_000,
                ..KdfSettings::default()
            },
            include_keyring: false,
            import_keyring: false,
            load_into_agent: false,
            ..Settings::default()
        };

        let ssh = paths.ssh_dir();
        fs::create_dir_all(&ssh).unwrap();
        fs::write(ssh.join("id_ed25519"), "private").unwrap();
        fs::write(ssh.join("id_ed25519.pub"), "public").unwrap();
        fs::write(ssh.join("config"), "Host *").unwrap();

        (temp, paths, settings)
    }

    fn backup_args() -> BackupArgs {
        BackupArgs {
            passphrase: Some(SecureString::new("correct-horse")),
            ..BackupArgs::default()
        }
    }

    fn restore_args(target: PathBuf, passphrase: &str) -> RestoreArgs {
        RestoreArgs {
            target: Some(target),
            passphrase: Some(SecureString::new(passphrase)),
            ..RestoreArgs::default()
        }
    }

    #[test]
    fn test_backup_uses_configured_sources() {
        let (_temp, paths, settings) = setup();

        let report = handle_backup_command(&paths, &settings, backup_args()).unwrap();

        assert_eq!(report.captured_count(), 3);
        assert_eq!(report.location, paths.backup_dir());
    }

    #[test]
    fn test_explicit_sources() {
        let (temp, paths, settings) = setup();
        let extra = temp.path().join("known_hosts");
        fs::write(&extra, "github.com ssh-ed25519 AAAA").unwrap();

        let args = BackupArgs {
            sources: vec![extra],
            ..backup_args()
        };
        let report = handle_backup_command(&paths, &settings, args).unwrap();

        assert_eq!(report.manifest.included_sources, vec!["known_hosts"]);
    }

    #[test]
    fn test_restore_round_trip() {
        let (temp, paths, settings) = setup();
        handle_backup_command(&paths, &settings, backup_args()).unwrap();

        let target = temp.path().join("restored");
        let args = restore_args(target.clone(), "correct-horse");
        let report = handle_restore_command(&paths, &settings, args).unwrap();

        assert_eq!(report.state, OperationState::Complete);
        assert_eq!(report.restored_count(), 3);
        assert_eq!(fs::read_to_string(target.join("config")).unwrap(), "Host *");
    }

    #[test]
    fn test_restore_with_wrong_passphrase_reports_failures() {
        let (temp, paths, settings) = setup();
        handle_backup_command(&paths, &settings, backup_args()).unwrap();

        let target = temp.path().join("restored");
        let args = restore_args(target.clone(), "wrong-password");
        let report = handle_restore_command(&paths, &settings, args).unwrap();

        assert_eq!(report.failed_count(), 3);
        assert_eq!(report.state, OperationState::Failed);
        assert!(!target.exists());
    }

    #[test]
    fn test_info_requires_manifest() {
        let (_temp, paths, settings) = setup();

        assert!(handle_info_command(&paths, InfoArgs::default()).is_err());

        handle_backup_command(&paths, &settings, backup_args()).unwrap();
        handle_info_command(&paths, InfoArgs::default()).unwrap();
    }
}
