use std::fmt;

use serde::{Deserialize, Deserializer};

/// Severity attached to a log line by the remote job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    /// Any label the monitor does not recognise, kept verbatim.
    Other(String),
}

impl LogLevel {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("info") {
            LogLevel::Info
        } else if trimmed.eq_ignore_ascii_case("warning")
            || trimmed.eq_ignore_ascii_case("warn")
        {
            LogLevel::Warning
        } else if trimmed.eq_ignore_ascii_case("error") {
            LogLevel::Error
        } else {
            LogLevel::Other(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Other(label) => label,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(LogLevel::from_label).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub level: LogLevel,
    pub message: String,
}

/// One contact found by the remote job.
///
/// The backend names two of the fields in French (`nom`, `telephone`); both
/// spellings are accepted, and the English one wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireResult")]
pub struct ResultRecord {
    pub name: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
struct WireResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    telephone: Option<String>,
}

impl TryFrom<WireResult> for ResultRecord {
    type Error = &'static str;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        let name = wire.name.or(wire.nom).ok_or("missing field `name`")?;
        Ok(Self {
            name,
            website: wire.website,
            email: wire.email,
            phone: wire.phone.or(wire.telephone),
        })
    }
}

/// Placeholder used when an `error` event carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoneSummary {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "found")]
    pub total: Option<u64>,
}

pub fn parse_log_entry(data: &str) -> Result<LogEntry, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn parse_result_record(data: &str) -> Result<ResultRecord, serde_json::Error> {
    serde_json::from_str(data)
}

/// Extracts the message of an application `error` event, falling back to
/// [`UNKNOWN_ERROR`] for absent, empty or malformed payloads.
pub fn parse_error_message(data: &str) -> String {
    serde_json::from_str::<ErrorPayload>(data)
        .ok()
        .and_then(|payload| payload.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Best-effort decode of the `done` payload; malformed input yields an empty summary.
pub fn parse_done_summary(data: &str) -> DoneSummary {
    serde_json::from_str(data).unwrap_or_default()
}
