//! Metric and log record types.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Kind of a metric series. A name keeps its kind for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Counter => f.write_str("counter"),
            MetricKind::Gauge => f.write_str("gauge"),
        }
    }
}

/// Current value of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Cumulative count since process start.
    Count(u64),
    /// Latest point value.
    Point(f64),
}

/// Identity of a series: metric name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl SeriesKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }
}

/// A `(method, route template)` pair identifying a logical endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub route: String,
}

impl RequestKey {
    pub fn new(method: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            route: route.into(),
        }
    }

    /// Series for a per-endpoint metric.
    pub fn series(&self, name: &str) -> SeriesKey {
        SeriesKey::new(name)
            .with_attribute("method", self.method.clone())
            .with_attribute("route", self.route.clone())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.route)
    }
}

/// Snapshot of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub kind: MetricKind,
    pub unit: String,
    pub value: MetricValue,
    pub attributes: Vec<(String, String)>,
}

impl MetricRecord {
    pub fn counter(key: &SeriesKey, unit: &str, total: u64) -> Self {
        Self {
            name: key.name.clone(),
            kind: MetricKind::Counter,
            unit: unit.to_string(),
            value: MetricValue::Count(total),
            attributes: key.attributes.clone(),
        }
    }

    pub fn gauge(key: &SeriesKey, unit: &str, value: f64) -> Self {
        Self {
            name: key.name.clone(),
            kind: MetricKind::Gauge,
            unit: unit.to_string(),
            value: MetricValue::Point(value),
            attributes: key.attributes.clone(),
        }
    }

    /// Numeric value regardless of kind.
    pub fn as_f64(&self) -> f64 {
        match self.value {
            MetricValue::Count(v) => v as f64,
            MetricValue::Point(v) => v,
        }
    }
}

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 5xx → error, 4xx → warn, anything else → info.
    pub fn from_status(status: u16) -> Self {
        match status {
            500..=u16::MAX => LogLevel::Error,
            400..=499 => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// A single structured log line bound for the log backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp_nanos: u64,
    pub level: LogLevel,
    pub labels: BTreeMap<String, String>,
    pub payload: serde_json::Value,
}

impl LogRecord {
    /// Build a record stamped with the current time and the standard
    /// `component`/`level`/`type` stream labels.
    pub fn new(component: &str, level: LogLevel, kind: &str, payload: serde_json::Value) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("component".to_string(), component.to_string());
        labels.insert("level".to_string(), level.as_str().to_string());
        labels.insert("type".to_string(), kind.to_string());
        Self {
            timestamp_nanos: unix_nanos(),
            level,
            labels,
            payload,
        }
    }
}

/// Nanoseconds since the Unix epoch.
pub fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
