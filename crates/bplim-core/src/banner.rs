//! Status banners written on logger transitions.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local};

/// Width of the dashed separator lines.
pub const SEPARATOR_WIDTH: usize = 130;

/// Format of the date shown on the action line, e.g. `09 Mar 2024, 07:05:01`.
pub const BANNER_DATE_FORMAT: &str = "%d %b %Y, %H:%M:%S";

/// The logger transition a banner announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Opened,
    Resumed,
    Paused,
    Closed,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Opened => "opened",
            StatusAction::Resumed => "resumed",
            StatusAction::Paused => "paused",
            StatusAction::Closed => "closed",
        }
    }

    /// Spaces in front of `log:` so its colon lines up with `<action> on:`.
    pub fn log_indent(&self) -> usize {
        // " <action> on:" has its colon at len + 4, "log:" at indent + 3
        self.as_str().len() + 1
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "opened" => Ok(StatusAction::Opened),
            "resumed" => Ok(StatusAction::Resumed),
            "paused" => Ok(StatusAction::Paused),
            "closed" => Ok(StatusAction::Closed),
            other => Err(format!(
                "unknown action '{}' (expected opened, resumed, paused or closed)",
                other
            )),
        }
    }
}

/// Build the multi-line banner for `action` on the log at `path`.
pub fn status_message(action: StatusAction, path: &Path, now: DateTime<Local>) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    format!(
        "\n{sep}\n{indent}log:  {path}\n {action} on:  {date}\n{sep}\n\n",
        sep = separator,
        indent = " ".repeat(action.log_indent()),
        path = path.display(),
        action = action,
        date = now.format(BANNER_DATE_FORMAT),
    )
}
