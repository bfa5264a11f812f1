//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, the operation is refused rather than
/// silently approved.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Format a millisecond Unix timestamp as a local date and time.
pub fn format_timestamp_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// `mm:ss` for a game duration.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_minutes_and_seconds() {
        assert_eq!(format_duration(1805), "30:05");
        assert_eq!(format_duration(-3), "0:00");
    }

    #[test]
    fn confirm_short_circuits_on_yes() {
        assert!(matches!(confirm("purge", "sure?", true), Ok(true)));
    }

    #[test]
    fn out_of_range_timestamp_renders_dash() {
        assert_eq!(format_timestamp_ms(i64::MAX), "-");
    }
}
