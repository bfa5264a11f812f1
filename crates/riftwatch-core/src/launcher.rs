// ── Client launcher ──
//
// Starting the Riot Client is the only process management done here.
// The launched client is detached: riftwatch never waits on it, and
// exiting riftwatch leaves it running.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::accounts::Account;
use crate::error::LaunchError;

const EXECUTABLE: &str = "RiotClientServices.exe";
const LAUNCH_ARGS: [&str; 2] = ["--launch-product=league_of_legends", "--launch-patchline=live"];

/// Starts the external client for an account.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, account: &Account) -> Result<(), LaunchError>;
}

/// Spawns `RiotClientServices` from the configured path or the usual
/// install locations.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    executable: Option<PathBuf>,
}

impl ProcessLauncher {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    /// Paths tried in order. A configured executable comes first.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.executable.iter().cloned().collect();
        paths.push(riot_client_dir(Path::new("C:\\")));
        for (var, fallback) in [
            ("PROGRAMFILES", "C:\\Program Files"),
            ("PROGRAMFILES(X86)", "C:\\Program Files (x86)"),
        ] {
            let root = std::env::var_os(var).map_or_else(|| PathBuf::from(fallback), PathBuf::from);
            paths.push(riot_client_dir(&root));
        }
        paths
    }

    async fn locate(&self) -> Option<PathBuf> {
        for path in self.candidates() {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Some(path);
            }
            debug!(path = %path.display(), "riot client not here");
        }
        None
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, account: &Account) -> Result<(), LaunchError> {
        let path = self.locate().await.ok_or(LaunchError::NotFound)?;
        tokio::process::Command::new(&path)
            .args(LAUNCH_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                path: path.clone(),
                source,
            })?;
        info!(username = %account.username, path = %path.display(), "riot client launched");
        Ok(())
    }
}

fn riot_client_dir(root: &Path) -> PathBuf {
    root.join("Riot Games").join("Riot Client").join(EXECUTABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_executable_is_tried_first() {
        let launcher = ProcessLauncher::new(Some(PathBuf::from("/opt/riot/client")));
        let candidates = launcher.candidates();
        assert_eq!(candidates[0], PathBuf::from("/opt/riot/client"));
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().skip(1).all(|p| p.ends_with(EXECUTABLE)));
    }

    #[tokio::test]
    async fn missing_executable_is_not_found() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let launcher = ProcessLauncher::new(Some(dir.path().join("nope.exe")));
        // The default Windows paths don't exist on the test host either.
        if launcher.locate().await.is_none() {
            assert!(matches!(
                launcher.launch(&Account::new("u")).await,
                Err(LaunchError::NotFound)
            ));
        }
    }
}
