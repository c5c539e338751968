//! Optional journald forwarding via systemd-cat.
//!
//! Best-effort: failure to forward must not break account operations.

use crate::constants;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// syslog priority passed to `systemd-cat -p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Info,
    Warning,
}

impl Priority {
    fn as_arg(self) -> &'static str {
        match self {
            Priority::Info => "info",
            Priority::Warning => "warning",
        }
    }
}

static AVAILABLE: OnceLock<bool> = OnceLock::new();

fn systemd_cat_available() -> bool {
    *AVAILABLE.get_or_init(|| {
        Command::new("systemd-cat")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Forward one audit line to journald. Returns whether it was handed off.
pub fn forward(priority: Priority, line: &str) -> bool {
    if !systemd_cat_available() {
        return false;
    }

    let Ok(mut child) = Command::new("systemd-cat")
        .args(["-t", constants::JOURNALD_TAG, "-p", priority.as_arg()])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    let written = match child.stdin.take() {
        Some(mut stdin) => writeln!(stdin, "{}", line).is_ok(),
        None => false,
    };

    child.wait().map(|s| s.success()).unwrap_or(false) && written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_args() {
        assert_eq!(Priority::Info.as_arg(), "info");
        assert_eq!(Priority::Warning.as_arg(), "warning");
    }

    #[test]
    fn test_forward_never_panics() {
        // Result depends on the host; only the absence of a panic matters.
        let _ = forward(Priority::Info, "{\"action\":\"test\"}");
    }
}
