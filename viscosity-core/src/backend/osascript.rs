//! AppleScript backend for Viscosity.app
//!
//! Runs `osascript -e <script>` for every primitive. Viscosity exposes
//! `connect`, `disconnect`, `disconnectall` and a `connections` collection
//! whose elements carry `name` and `state` properties.

use super::{ConnectionBackend, ConnectionScope};
use crate::error::BackendError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Application name addressed by every script
const APPLICATION: &str = "Viscosity";

/// Drives Viscosity through the `osascript` command line tool
#[derive(Debug, Clone)]
pub struct OsaScriptBackend {
    osascript: PathBuf,
}

impl OsaScriptBackend {
    /// Create a backend that runs the given `osascript` binary
    pub fn new(osascript: impl Into<PathBuf>) -> Self {
        Self {
            osascript: osascript.into(),
        }
    }

    /// Find `osascript` on PATH
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` when the binary cannot be found,
    /// which is the case on every platform other than macOS.
    pub fn locate() -> Result<Self, BackendError> {
        let path = which::which("osascript").map_err(|e| BackendError::Unavailable {
            reason: format!("osascript not found on PATH: {}", e),
        })?;
        debug!("Using osascript at {}", path.display());
        Ok(Self::new(path))
    }

    /// Path of the `osascript` binary in use
    pub fn osascript_path(&self) -> &Path {
        &self.osascript
    }

    /// Run a script and return its trimmed standard output
    fn run(&self, command: &str, script: &str) -> Result<String, BackendError> {
        debug!(command, "Running AppleScript");

        let output = Command::new(&self.osascript)
            .arg("-e")
            .arg(script)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::ScriptFailed {
                command: command.to_string(),
                reason: if stderr.trim().is_empty() {
                    format!("osascript exited with {}", output.status)
                } else {
                    stderr.trim().to_string()
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl ConnectionBackend for OsaScriptBackend {
    fn connect(&self, name: &str) -> Result<(), BackendError> {
        info!(connection = %name, "VPN: connecting");
        self.run("connect", &connect_script(name)).map(|_| ())
    }

    fn disconnect(&self, name: &str) -> Result<(), BackendError> {
        info!(connection = %name, "VPN: disconnecting");
        self.run("disconnect", &disconnect_script(name)).map(|_| ())
    }

    fn disconnect_all(&self) -> Result<(), BackendError> {
        info!("VPN: disconnecting all connections");
        self.run("disconnectall", &disconnect_all_script())
            .map(|_| ())
    }

    fn list_connections(&self, scope: ConnectionScope) -> Result<BTreeSet<String>, BackendError> {
        let command = match scope {
            ConnectionScope::All => "list connections",
            ConnectionScope::Active => "list active connections",
        };
        let stdout = self.run(command, &list_script(scope))?;
        Ok(parse_name_list(&stdout))
    }
}

/// Escape a value for use inside an AppleScript string literal
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn connect_script(name: &str) -> String {
    format!("tell application \"{}\" to connect {}", APPLICATION, quote(name))
}

fn disconnect_script(name: &str) -> String {
    format!("tell application \"{}\" to disconnect {}", APPLICATION, quote(name))
}

fn disconnect_all_script() -> String {
    format!("tell application \"{}\" to disconnectall", APPLICATION)
}

fn list_script(scope: ConnectionScope) -> String {
    match scope {
        ConnectionScope::All => format!(
            "tell application \"{}\" to get name of connections",
            APPLICATION
        ),
        ConnectionScope::Active => format!(
            "tell application \"{}\" to get name of connections where state is equal to \"Connected\"",
            APPLICATION
        ),
    }
}

/// Parse an AppleScript list as printed by `osascript` (`a, b, c`)
///
/// Names containing `", "` cannot be told apart from two entries.
fn parse_name_list(output: &str) -> BTreeSet<String> {
    output
        .split(", ")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_list() {
        let names = parse_name_list("Office, Home VPN, lab");
        assert_eq!(names.len(), 3);
        assert!(names.contains("Office"));
        assert!(names.contains("Home VPN"));
        assert!(names.contains("lab"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list("   ").is_empty());
    }

    #[test]
    fn test_parse_single_name() {
        let names = parse_name_list("Office");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Office"]);
    }

    #[test]
    fn test_quote_escapes_special_characters() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(
            connect_script("Office"),
            "tell application \"Viscosity\" to connect \"Office\""
        );
        assert_eq!(
            disconnect_script("Office"),
            "tell application \"Viscosity\" to disconnect \"Office\""
        );
        assert_eq!(
            disconnect_all_script(),
            "tell application \"Viscosity\" to disconnectall"
        );
        assert!(list_script(ConnectionScope::Active).contains("where state is equal to \"Connected\""));
        assert!(!list_script(ConnectionScope::All).contains("where"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_script_reports_script_failed() {
        // `false` ignores its arguments and exits non-zero
        let backend = OsaScriptBackend::new("false");
        let err = backend.disconnect_all().unwrap_err();
        assert!(matches!(err, BackendError::ScriptFailed { ref command, .. } if command == "disconnectall"));
    }

    #[test]
    fn test_osascript_path() {
        let backend = OsaScriptBackend::new("/usr/local/bin/osascript");
        assert_eq!(backend.osascript_path(), Path::new("/usr/local/bin/osascript"));
    }

    #[test]
    fn test_missing_binary_reports_io_error() {
        let backend = OsaScriptBackend::new("/nonexistent/osascript");
        let err = backend.list_connections(ConnectionScope::All).unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }
}
