//! Syslog facility and severity codes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::level::Level;

/// Syslog facility code (0..=23) identifying the subsystem that logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Facility(u8);

/// Returned when a facility name or code is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown syslog facility: {0:?}")]
pub struct FacilityParseError(pub String);

const NAMES: [(&str, u8); 24] = [
    ("kern", 0),
    ("user", 1),
    ("mail", 2),
    ("daemon", 3),
    ("auth", 4),
    ("syslog", 5),
    ("lpr", 6),
    ("news", 7),
    ("uucp", 8),
    ("cron", 9),
    ("authpriv", 10),
    ("ftp", 11),
    ("ntp", 12),
    ("security", 13),
    ("console", 14),
    ("solariscron", 15),
    ("local0", 16),
    ("local1", 17),
    ("local2", 18),
    ("local3", 19),
    ("local4", 20),
    ("local5", 21),
    ("local6", 22),
    ("local7", 23),
];

impl Facility {
    pub const KERN: Facility = Facility(0);
    pub const USER: Facility = Facility(1);
    pub const MAIL: Facility = Facility(2);
    pub const DAEMON: Facility = Facility(3);
    pub const AUTH: Facility = Facility(4);
    pub const SYSLOG: Facility = Facility(5);
    pub const CRON: Facility = Facility(9);
    pub const AUTHPRIV: Facility = Facility(10);
    pub const LOCAL0: Facility = Facility(16);
    pub const LOCAL1: Facility = Facility(17);
    pub const LOCAL2: Facility = Facility(18);
    pub const LOCAL3: Facility = Facility(19);
    pub const LOCAL4: Facility = Facility(20);
    pub const LOCAL5: Facility = Facility(21);
    pub const LOCAL6: Facility = Facility(22);
    pub const LOCAL7: Facility = Facility(23);

    /// Facility for `code`, if it is a valid syslog facility.
    pub fn new(code: u8) -> Option<Self> {
        (code <= 23).then_some(Facility(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Conventional lower-case name, e.g. `"local0"`.
    pub fn name(self) -> &'static str {
        NAMES[usize::from(self.0)].0
    }
}

impl Default for Facility {
    fn default() -> Self {
        Facility::LOCAL0
    }
}

impl TryFrom<u8> for Facility {
    type Error = FacilityParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Facility::new(code).ok_or_else(|| FacilityParseError(code.to_string()))
    }
}

impl FromStr for Facility {
    type Err = FacilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Facility::new(code).ok_or_else(|| FacilityParseError(s.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        let name = lower.strip_prefix("log_").unwrap_or(&lower);
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, code)| Facility(code))
            .ok_or_else(|| FacilityParseError(s.to_string()))
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Syslog severity for `level` (RFC 5424 numbering).
pub fn severity(level: Level) -> u8 {
    match level {
        Level::Trace | Level::Debug => 7,
        Level::Info => 6,
        Level::Warning => 4,
        Level::Error => 3,
        Level::Critical => 2,
    }
}

/// Encoded `<PRI>` value for a record at `level` logged under `facility`.
pub fn priority(facility: Facility, level: Level) -> u8 {
    (facility.code() << 3) | severity(level)
}
