use std::ffi::OsString;

use async_trait::async_trait;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use super::Resolve;
use crate::credentials::{Credentials, Protocol};
use crate::error::ResolutionError;

const UX_PROCESS_NAMES: &[&str] = &["LeagueClientUx.exe", "LeagueClientUx"];

/// Which of the two local APIs to read off the UX process command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessTarget {
    /// The League client API (`--app-port`, `--remoting-auth-token`).
    #[default]
    League,
    /// The Riot Client API (`--riotclient-app-port`, `--riotclient-auth-token`).
    RiotClient,
}

impl ProcessTarget {
    fn flags(self) -> (&'static str, &'static str) {
        match self {
            Self::League => ("--app-port=", "--remoting-auth-token="),
            Self::RiotClient => ("--riotclient-app-port=", "--riotclient-auth-token="),
        }
    }
}

/// Scans the process table for the client UX process and reads the port
/// and token off its command line.
#[derive(Debug, Default)]
pub struct ProcessResolver {
    target: ProcessTarget,
}

impl ProcessResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the Riot Client API instead of the League client API.
    pub fn riot_client() -> Self {
        Self {
            target: ProcessTarget::RiotClient,
        }
    }
}

#[async_trait]
impl Resolve for ProcessResolver {
    async fn resolve(&self) -> Result<Credentials, ResolutionError> {
        // process enumeration is blocking and can take tens of milliseconds
        let cmdline = tokio::task::spawn_blocking(find_ux_command_line)
            .await
            .ok()
            .flatten()
            .ok_or(ResolutionError::NotFound)?;
        debug!(target = ?self.target, "found client UX process");
        parse_command_line(&cmdline, self.target)
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

fn find_ux_command_line() -> Option<Vec<String>> {
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
    );
    sys.processes()
        .values()
        .find(|p| {
            let name = p.name().to_string_lossy();
            UX_PROCESS_NAMES.iter().any(|n| name.eq_ignore_ascii_case(n))
        })
        .map(|p| p.cmd().iter().map(os_to_string).collect())
}

fn os_to_string(s: &OsString) -> String {
    s.to_string_lossy().into_owned()
}

/// Pull the port and token flags for `target` out of an argument list.
/// Values may be wrapped in quotes.
pub fn parse_command_line<S: AsRef<str>>(
    args: &[S],
    target: ProcessTarget,
) -> Result<Credentials, ResolutionError> {
    let (port_flag, token_flag) = target.flags();
    let fail = |reason: String| ResolutionError::ParseError {
        source_name: "process command line".into(),
        reason,
    };
    let flag = |prefix: &str| {
        args.iter()
            .find_map(|a| a.as_ref().trim_matches('"').strip_prefix(prefix))
            .map(|v| v.trim_matches('"').to_owned())
    };

    let port = flag(port_flag)
        .ok_or_else(|| fail(format!("missing {port_flag}")))?
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| fail(format!("invalid {port_flag}")))?;
    let token = flag(token_flag)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| fail(format!("missing {token_flag}")))?;

    Ok(Credentials::new(port, token, Protocol::Https))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_port_and_token() {
        let args = [
            "LeagueClientUx.exe",
            "\"--riotclient-auth-token=abc\"",
            "\"--app-port=61234\"",
            "\"--remoting-auth-token=xyz\"",
        ];
        let creds =
            parse_command_line(&args, ProcessTarget::League).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(creds.port, 61234);
        assert_eq!(creds.auth_token(), "xyz");
    }

    #[test]
    fn riot_client_flags_are_separate() {
        let args = [
            "--app-port=61234",
            "--remoting-auth-token=xyz",
            "--riotclient-app-port=50001",
            "--riotclient-auth-token=rc",
        ];
        let creds = parse_command_line(&args, ProcessTarget::RiotClient)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(creds.port, 50001);
        assert_eq!(creds.auth_token(), "rc");
    }

    #[test]
    fn missing_token_is_a_parse_error() {
        let args = ["LeagueClientUx", "--app-port=61234"];
        assert!(matches!(
            parse_command_line(&args, ProcessTarget::League),
            Err(ResolutionError::ParseError { .. })
        ));
    }
}
