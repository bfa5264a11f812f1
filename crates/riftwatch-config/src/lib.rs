//! Configuration for the riftwatch binary.
//!
//! Layered loading (defaults, then `config.toml`, then `RIFTWATCH_*`
//! environment variables), platform file paths, and translation into the
//! disk-free `riftwatch_core::CoreConfig` and resolver chain. The core
//! never reads files itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use riftwatch_api::{
    ChainResolver, LockfileResolver, ProcessResolver, Resolve, TlsMode, TransportConfig,
};
use riftwatch_core::CoreConfig;
use riftwatch_core::config::{DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_PATH, DEFAULT_RECONNECT_DELAY};

const ENV_PREFIX: &str = "RIFTWATCH_";
const MIN_POLL_INTERVAL_MS: u64 = 50;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub resolver: ResolverConfig,
    pub accounts: AccountsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub poll_interval_ms: u64,
    /// Kept short: the service is local, a slow answer means it's gone.
    pub request_timeout_ms: u64,
    pub probe_path: String,
    /// Trust only this CA instead of accepting any loopback certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: millis(DEFAULT_POLL_INTERVAL),
            request_timeout_ms: millis(TransportConfig::default().timeout),
            probe_path: DEFAULT_PROBE_PATH.to_owned(),
            ca_cert: None,
        }
    }
}

/// How to find the running client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResolverStrategy {
    /// Lockfile first, then the process list.
    #[default]
    Auto,
    Lockfile,
    Process,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub strategy: ResolverStrategy,
    /// Searched before the platform default install directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    /// Explicit lockfile, tried before anything else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockfile: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Defaults to `accounts.json` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub reconnect_delay_ms: u64,
    /// Riot Client executable. The usual install paths are tried if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launcher: Option<PathBuf>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            file: None,
            reconnect_delay_ms: millis(DEFAULT_RECONNECT_DELAY),
            launcher: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write a daily-rolling log file under the data directory.
    pub file: bool,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("gg", "riftwatch", "riftwatch")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("riftwatch");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for the account store and log files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
}

pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` plus environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, cfg.to_toml()?)?;
    Ok(())
}

/// Write a default config to `path`. Refuses to overwrite unless `force`.
pub fn init_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    save_config(&Config::default(), path)
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::Validation {
                field: "connection.poll_interval_ms".into(),
                reason: format!("must be at least {MIN_POLL_INTERVAL_MS}"),
            });
        }
        if self.connection.request_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "connection.request_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if !self.connection.probe_path.starts_with('/') {
            return Err(ConfigError::Validation {
                field: "connection.probe_path".into(),
                reason: format!("must start with '/', got '{}'", self.connection.probe_path),
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = self
            .connection
            .ca_cert
            .clone()
            .map_or(TlsMode::LoopbackAcceptInvalid, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: Duration::from_millis(self.connection.request_timeout_ms),
        }
    }

    pub fn to_core_config(&self) -> CoreConfig {
        CoreConfig {
            poll_interval: Duration::from_millis(self.connection.poll_interval_ms),
            transport: self.transport(),
            probe_path: self.connection.probe_path.clone(),
            reconnect_delay: Duration::from_millis(self.accounts.reconnect_delay_ms),
        }
    }

    /// Resolver chain for the configured strategy. An explicit lockfile
    /// always goes first.
    pub fn build_resolver(&self) -> Arc<dyn Resolve> {
        let r = &self.resolver;
        let mut chain: Vec<Box<dyn Resolve>> = Vec::new();
        if let Some(lockfile) = &r.lockfile {
            chain.push(Box::new(LockfileResolver::at(lockfile.clone())));
        }
        if matches!(r.strategy, ResolverStrategy::Auto | ResolverStrategy::Lockfile) {
            chain.push(Box::new(LockfileResolver::new(r.install_dir.clone())));
        }
        if matches!(r.strategy, ResolverStrategy::Auto | ResolverStrategy::Process) {
            chain.push(Box::new(ProcessResolver::new()));
        }
        Arc::new(ChainResolver::new(chain))
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.accounts
            .file
            .clone()
            .unwrap_or_else(|| data_dir().join("accounts.json"))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_core_defaults() {
        let core = Config::default().to_core_config();
        assert_eq!(core.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(core.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(core.probe_path, DEFAULT_PROBE_PATH);
        assert_eq!(core.transport.tls, TlsMode::LoopbackAcceptInvalid);
        assert_eq!(core.transport.timeout, Duration::from_secs(2));
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [connection]
                poll_interval_ms = 1000
                ca_cert = "riotgames.pem"

                [resolver]
                strategy = "process"
                "#,
            )?;
            jail.set_env("RIFTWATCH_CONNECTION__POLL_INTERVAL_MS", "500");
            jail.set_env("RIFTWATCH_LOGGING__FILE", "true");

            let cfg = load_config_from(Path::new("config.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(cfg.connection.poll_interval_ms, 500);
            assert_eq!(cfg.resolver.strategy, ResolverStrategy::Process);
            assert!(cfg.logging.file);
            assert_eq!(
                cfg.transport().tls,
                TlsMode::CustomCa(PathBuf::from("riotgames.pem"))
            );
            Ok(())
        });
    }

    #[test]
    fn missing_file_uses_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("absent.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn tiny_poll_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[connection]\npoll_interval_ms = 10\n")?;
            let err = load_config_from(Path::new("config.toml")).err();
            assert!(matches!(err, Some(ConfigError::Validation { .. })));
            Ok(())
        });
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("sub").join("config.toml");
        init_config(&path, false).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            init_config(&path, false),
            Err(ConfigError::AlreadyExists { .. })
        ));
        init_config(&path, true).unwrap_or_else(|e| panic!("{e}"));

        let written = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(written.contains("[connection]"));
        assert!(written.contains("poll_interval_ms = 3000"));
    }

    #[test]
    fn explicit_accounts_file_wins() {
        let mut cfg = Config::default();
        cfg.accounts.file = Some(PathBuf::from("/tmp/acc.json"));
        assert_eq!(cfg.accounts_file(), PathBuf::from("/tmp/acc.json"));
        assert!(Config::default().accounts_file().ends_with("accounts.json"));
    }
}
