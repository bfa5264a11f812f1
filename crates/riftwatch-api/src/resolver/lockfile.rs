use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::Resolve;
use crate::credentials::{Credentials, Protocol};
use crate::error::ResolutionError;

const LOCKFILE_NAME: &str = "lockfile";

const DEFAULT_INSTALL_DIRS: &[&str] = &[
    r"C:\Riot Games\League of Legends",
    "/Applications/League of Legends.app/Contents/LoL",
];

/// Reads the `lockfile` the service writes into its install directory
/// while it runs.
pub struct LockfileResolver {
    candidates: Vec<PathBuf>,
}

impl LockfileResolver {
    /// Look in `install_dir` first (if given), then the platform default
    /// install locations.
    pub fn new(install_dir: Option<PathBuf>) -> Self {
        let candidates = install_dir
            .into_iter()
            .chain(DEFAULT_INSTALL_DIRS.iter().map(PathBuf::from))
            .map(|dir| dir.join(LOCKFILE_NAME))
            .collect();
        Self { candidates }
    }

    /// Read exactly this file and nothing else.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

#[async_trait]
impl Resolve for LockfileResolver {
    async fn resolve(&self) -> Result<Credentials, ResolutionError> {
        for path in &self.candidates {
            match tokio::fs::read_to_string(path).await {
                Ok(contents) => {
                    debug!(path = %path.display(), "found lockfile");
                    return parse_lockfile(&contents, path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ResolutionError::Io {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
        Err(ResolutionError::NotFound)
    }

    fn name(&self) -> &'static str {
        "lockfile"
    }
}

/// Parse `name:pid:port:password:protocol`.
pub fn parse_lockfile(contents: &str, path: &Path) -> Result<Credentials, ResolutionError> {
    let fail = |reason: String| ResolutionError::ParseError {
        source_name: path.display().to_string(),
        reason,
    };

    let fields: Vec<&str> = contents.trim().split(':').collect();
    let [_name, _pid, port, password, protocol] = fields.as_slice() else {
        return Err(fail(format!("expected 5 fields, found {}", fields.len())));
    };

    let port = port
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| fail(format!("invalid port {port:?}")))?;
    if password.is_empty() {
        return Err(fail("empty auth token".into()));
    }
    let protocol = protocol
        .parse::<Protocol>()
        .map_err(|_| fail(format!("unknown protocol {protocol:?}")))?;

    Ok(Credentials::new(port, *password, protocol))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Credentials, ResolutionError> {
        parse_lockfile(s, Path::new("lockfile"))
    }

    #[test]
    fn parses_well_formed_lockfile() {
        let creds = parse("LeagueClient:12345:54321:s3cr3t:https\n")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(creds.port, 54321);
        assert_eq!(creds.auth_token(), "s3cr3t");
        assert_eq!(creds.protocol, Protocol::Https);
    }

    #[test]
    fn truncated_lockfile_is_a_parse_error() {
        assert!(matches!(
            parse("LeagueClient:12345:54321"),
            Err(ResolutionError::ParseError { .. })
        ));
    }

    #[test]
    fn bad_port_is_a_parse_error() {
        for bad in [
            "LeagueClient:1:0:tok:https",
            "LeagueClient:1:99999:tok:https",
            "LeagueClient:1:abc:tok:https",
        ] {
            assert!(matches!(parse(bad), Err(ResolutionError::ParseError { .. })), "{bad}");
        }
    }

    #[test]
    fn empty_token_is_a_parse_error() {
        assert!(matches!(
            parse("LeagueClient:1:2999::https"),
            Err(ResolutionError::ParseError { .. })
        ));
    }

    #[test]
    fn custom_install_dir_is_tried_first() {
        let r = LockfileResolver::new(Some(PathBuf::from("/opt/league")));
        assert_eq!(r.candidates()[0], PathBuf::from("/opt/league/lockfile"));
        assert_eq!(r.candidates().len(), 1 + DEFAULT_INSTALL_DIRS.len());
    }
}
