//! Logging for the `tabnav` binary and selection diagnostics
//!
//! tabnav usually runs once per keystroke from an editor binding, so stdout
//! carries only the command result and logs go to stderr and a log file.
//!
//! Filtering:
//! - `TABNAV_LOG` sets the stderr filter and wins over `RUST_LOG`
//! - `RUST_LOG=command=debug,selection=debug` shows each command with its
//!   selection change
//! - `TABNAV_LOG_FILE=0` turns off the log file
//!
//! The log file is `tabnav.log` in the config dir's `logs/`, rotated daily
//! and always written at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::SelectionSet;

const LOG_ENV: &str = "TABNAV_LOG";
const LOG_FILE_ENV: &str = "TABNAV_LOG_FILE";
const DEFAULT_CONSOLE_FILTER: &str = "warn";

/// Install the stderr and log file layers. Does nothing when the host process
/// already set a global subscriber.
pub fn init() {
    let directives = std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter(directives.as_deref()));

    let file_layer = if file_logging_enabled(std::env::var(LOG_FILE_ENV).ok().as_deref()) {
        match crate::config_paths::ensure_logs_dir() {
            Ok(logs_dir) => Some(
                fmt::layer()
                    .with_writer(tracing_appender::rolling::daily(logs_dir, "tabnav.log"))
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            ),
            Err(e) => {
                eprintln!("tabnav: log file disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Filter for stderr output; unparsable directives fall back to `warn`
fn console_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_CONSOLE_FILTER))
}

fn file_logging_enabled(setting: Option<&str>) -> bool {
    !matches!(
        setting.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("0" | "false" | "off" | "no")
    )
}

/// Lightweight snapshot of a selection for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub regions: Vec<(usize, usize)>,
}

impl SelectionSnapshot {
    pub fn from_selection(selection: &SelectionSet) -> Self {
        Self {
            regions: selection.iter().map(|r| (r.anchor, r.head)).collect(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        if self.regions.len() != other.regions.len() {
            return Some(format!(
                "region count: {} → {}",
                self.regions.len(),
                other.regions.len()
            ));
        }

        let changes: Vec<String> = self
            .regions
            .iter()
            .zip(&other.regions)
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(|(i, (before, after))| {
                format!(
                    "#{}: [{},{}] → [{},{}]",
                    i, before.0, before.1, after.0, after.1
                )
            })
            .collect();

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_filter_falls_back_to_warn() {
        assert_eq!(console_filter(None).to_string(), "warn");
        assert_eq!(console_filter(Some("selection=debug")).to_string(), "selection=debug");
        assert_eq!(console_filter(Some("selection=loud")).to_string(), "warn");
    }

    #[test]
    fn test_log_file_switch() {
        assert!(file_logging_enabled(None));
        assert!(file_logging_enabled(Some("1")));
        assert!(!file_logging_enabled(Some("0")));
        assert!(!file_logging_enabled(Some(" Off ")));
    }

    #[test]
    fn test_snapshot_diff() {
        let before = SelectionSnapshot::from_selection(&SelectionSet::from_pairs(&[(1, 4)]));
        let same = before.clone();
        assert_eq!(before.diff(&same), None);

        let moved = SelectionSnapshot::from_selection(&SelectionSet::from_pairs(&[(5, 9)]));
        assert_eq!(before.diff(&moved).unwrap(), "#0: [1,4] → [5,9]");

        let more = SelectionSnapshot::from_selection(&SelectionSet::from_pairs(&[(1, 4), (5, 9)]));
        assert_eq!(before.diff(&more).unwrap(), "region count: 1 → 2");
    }
}
