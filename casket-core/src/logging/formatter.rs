//! Log entries and their output formats

use super::LogLevel;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// How log lines are rendered
#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    /// One JSON object per line
    /// Example: {"level":"DEBUG","message":"Creating cookie [TGC]","target":"casket_core::cookie::manager","timestamp":"..."}
    Json,

    /// Example: 2026-01-15 10:30:00.123 DEBUG [casket_core::cookie::manager] Creating cookie [TGC]
    Human,

    /// Example: timestamp=... level=DEBUG target=casket_core::cookie::manager message="Creating cookie [TGC]"
    Logfmt,

    /// Template with `{timestamp}`, `{level}`, `{target}`, `{message}`,
    /// `{file}`, `{line}` and `{<context field>}` placeholders
    Custom(String),
}

impl FromStr for LogFormat {
    type Err = String;

    /// Parse `json`, `human`, `logfmt`, or `custom:<template>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(template) = s.strip_prefix("custom:") {
            return Ok(LogFormat::Custom(template.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "human" | "text" => Ok(LogFormat::Human),
            "logfmt" => Ok(LogFormat::Logfmt),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl LogFormat {
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
            LogFormat::Custom(template) => format_custom(entry, template),
        }
    }
}

/// One record on its way to an output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Module path of the call site
    pub target: String,
    pub location: Option<(String, u32)>,
    /// Static context fields, sorted for stable output
    pub fields: BTreeMap<String, Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            target: target.into(),
            location: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn from_record(record: &log::Record<'_>) -> Self {
        let mut entry = Self::new(record.level().into(), record.args().to_string(), record.target());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.location = Some((file.to_string(), line));
        }
        entry
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = serde_json::Map::new();
    json.insert("timestamp".to_string(), Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), Value::String(entry.level.as_str().to_string()));
    json.insert("target".to_string(), Value::String(entry.target.clone()));
    json.insert("message".to_string(), Value::String(entry.message.clone()));

    if let Some((file, line)) = &entry.location {
        json.insert("file".to_string(), Value::String(file.clone()));
        json.insert("line".to_string(), Value::from(*line));
    }

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    Value::Object(json).to_string()
}

fn format_human(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {:5} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        entry.level.as_str(),
        entry.target,
        entry.message
    );
    for (key, value) in &entry.fields {
        line.push_str(&format!(" {}={}", key, plain(value)));
    }
    line
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", entry.level.as_str()),
        format!("target={}", entry.target),
        format!("message={}", quoted(&entry.message)),
    ];

    for (key, value) in &entry.fields {
        let rendered = match value {
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => quoted(&plain(other)),
        };
        parts.push(format!("{}={}", key, rendered));
    }

    parts.join(" ")
}

fn format_custom(entry: &LogEntry, template: &str) -> String {
    let (file, line) = match &entry.location {
        Some((file, line)) => (file.clone(), line.to_string()),
        None => (String::new(), String::new()),
    };

    let mut result = template
        .replace("{timestamp}", &entry.timestamp.to_rfc3339())
        .replace("{level}", entry.level.as_str())
        .replace("{target}", &entry.target)
        .replace("{message}", &entry.message)
        .replace("{file}", &file)
        .replace("{line}", &line);

    for (key, value) in &entry.fields {
        result = result.replace(&format!("{{{}}}", key), &plain(value));
    }

    result
}
