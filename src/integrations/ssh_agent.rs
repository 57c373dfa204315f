use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{KeywardError, KeywardResult};

use super::KeyAgent;

/// Key agent adapter over `ssh-add`
#[derive(Debug, Clone)]
pub struct SshAgent {
    program: String,
    /// Pass `--apple-use-keychain` so macOS remembers the key passphrase
    use_platform_keychain: bool,
}

impl Default for SshAgent {
    fn default() -> Self {
        Self::new(cfg!(target_os = "macos"))
    }
}

impl SshAgent {
    pub fn new(use_platform_keychain: bool) -> Self {
        Self {
            program: "ssh-add".to_string(),
            use_platform_keychain,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args<'a>(&self, private_key: &'a Path) -> Vec<&'a std::ffi::OsStr> {
        let mut args: Vec<&std::ffi::OsStr> = Vec::new();
        if self.use_platform_keychain {
            args.push(std::ffi::OsStr::new("--apple-use-keychain"));
        }
        args.push(private_key.as_os_str());
        args
    }
}

impl KeyAgent for SshAgent {
    fn add_key(&self, private_key: &Path) -> KeywardResult<()> {
        let output = Command::new(&self.program)
            .args(self.args(private_key))
            .stdin(Stdio::inherit())
            .output()
            .map_err(|e| KeywardError::Agent(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(KeywardError::Agent(format!(
                "{} rejected {}: {}",
                self.program,
                private_key.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Loaded {} into ssh-agent", private_key.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_keychain() {
        let agent = SshAgent::new(true);
        let path = Path::new("/tmp/id_ed25519");
        let args = agent.args(path);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], "--apple-use-keychain");
        assert_eq!(args[1], path.as_os_str());
    }

    #[test]
    fn test_args_without_keychain() {
        let agent = SshAgent::new(false);
        let args = agent.args(Path::new("/tmp/id_ed25519"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_missing_program_is_agent_error() {
        let agent = SshAgent::new(false).with_program("keyward-test-no-such-ssh-add");
        let err = agent.add_key(Path::new("/tmp/id_ed25519")).unwrap_err();
        assert!(matches!(err, KeywardError::Agent(_)));
    }
}
