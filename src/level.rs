use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Normalized severity of a record.
///
/// Built from the record's `level` text by [`Severity::classify`]. Any text
/// outside the mapping table becomes [`Severity::Unmapped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Unmapped,
}

const LEVELS: [(&str, Severity); 4] = [
    ("DEBUG", Severity::Debug),
    ("INFO", Severity::Info),
    ("WARN", Severity::Warning),
    ("ERROR", Severity::Error),
];

impl Severity {
    /// Exact, case-sensitive lookup of a level name.
    pub fn classify(text: &str) -> Severity {
        LEVELS
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Unmapped)
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Unmapped => "unmapped",
        };
        f.write_str(name)
    }
}

/// Set of severities that are forwarded to the tracker.
///
/// Stored as a bitmask, so every [`Severity`] has an answer. The default
/// policy reports [`Severity::Error`] only.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReportPolicy {
    mask: u8,
}

impl ReportPolicy {
    /// A policy that reports nothing.
    pub const fn empty() -> Self {
        Self { mask: 0 }
    }

    pub fn with(mut self, severity: Severity) -> Self {
        self.mask |= severity.bit();
        self
    }

    pub fn contains(&self, severity: Severity) -> bool {
        self.mask & severity.bit() != 0
    }
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self::empty().with(Severity::Error)
    }
}

impl FromIterator<Severity> for ReportPolicy {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for ReportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = [
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Unmapped,
        ];
        f.debug_set()
            .entries(all.into_iter().filter(|s| self.contains(*s)))
            .finish()
    }
}

/// Parses a comma separated list of level names, e.g. `"ERROR,WARN"`.
impl FromStr for ReportPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| match Severity::classify(name) {
                Severity::Unmapped => Err(ConfigError::UnknownLevel(name.to_owned())),
                severity => Ok(severity),
            })
            .collect()
    }
}
