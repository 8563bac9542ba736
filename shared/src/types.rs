//! Process enumeration records

use std::fmt;

/// Command text used when a listing line carries a pid but nothing else
pub const UNKNOWN_COMMAND: &str = "unknown command";

/// One entry of a host process snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: String,
    pub command: String,
}

impl ProcessRecord {
    pub fn new(pid: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            command: command.into(),
        }
    }

    /// Parse a single `<pid> <command tokens...>` line.
    ///
    /// Leading padding is ignored (`ps` right-aligns pids). Returns `None`
    /// for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.split_once(char::is_whitespace) {
            Some((pid, command)) if !command.trim().is_empty() => {
                Some(Self::new(pid, command.trim()))
            }
            Some((pid, _)) => Some(Self::new(pid, UNKNOWN_COMMAND)),
            None => Some(Self::new(line, UNKNOWN_COMMAND)),
        }
    }

    /// Whether the command text contains the given marker
    pub fn contains(&self, marker: &str) -> bool {
        self.command.contains(marker)
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pid, self.command)
    }
}

/// Parse the full output of a process listing tool, one process per line
pub fn parse_listing(output: &str) -> Vec<ProcessRecord> {
    output.lines().filter_map(ProcessRecord::parse).collect()
}
