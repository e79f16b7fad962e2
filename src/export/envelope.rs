//! Wire envelopes for the metrics and log backends.
//!
//! Metrics follow the OTLP/HTTP JSON layout
//! (`resourceMetrics → scopeMetrics → metrics`); logs follow the
//! Loki push layout (`streams → {stream, values}`). Encoding is total:
//! every record produces exactly one envelope.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::telemetry::{LogRecord, MetricRecord, MetricValue};

/// Temporality sent with every counter.
pub const CUMULATIVE: &str = "AGGREGATION_TEMPORALITY_CUMULATIVE";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsEnvelope {
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeMetrics {
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
    pub unit: String,
    #[serde(flatten)]
    pub data: MetricData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricData {
    Sum(Sum),
    Gauge(Gauge),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sum {
    pub data_points: Vec<NumberDataPoint>,
    pub aggregation_temporality: &'static str,
    pub is_monotonic: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauge {
    pub data_points: Vec<NumberDataPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberDataPoint {
    #[serde(flatten)]
    pub value: NumberValue,
    pub time_unix_nano: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum NumberValue {
    #[serde(rename = "asInt")]
    AsInt(i64),
    #[serde(rename = "asDouble")]
    AsDouble(f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnyValue {
    pub string_value: String,
}

impl KeyValue {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: AnyValue {
                string_value: value.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsEnvelope {
    pub streams: Vec<LogStream>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogStream {
    pub stream: BTreeMap<String, String>,
    /// `[timestamp nanos, payload JSON]` pairs.
    pub values: Vec<[String; 2]>,
}

/// Wrap one metric record as a single-point envelope.
pub fn encode_metric(record: &MetricRecord, source: &str, time_unix_nano: u64) -> MetricsEnvelope {
    let mut attributes: Vec<KeyValue> = record
        .attributes
        .iter()
        .map(|(k, v)| KeyValue::string(k.as_str(), v.as_str()))
        .collect();
    attributes.push(KeyValue::string("source", source));

    let point = NumberDataPoint {
        value: number_value(record.value),
        time_unix_nano,
        attributes,
    };

    let data = match record.value {
        MetricValue::Count(_) => MetricData::Sum(Sum {
            data_points: vec![point],
            aggregation_temporality: CUMULATIVE,
            is_monotonic: true,
        }),
        MetricValue::Point(_) => MetricData::Gauge(Gauge {
            data_points: vec![point],
        }),
    };

    MetricsEnvelope {
        resource_metrics: vec![ResourceMetrics {
            resource: Resource {
                attributes: vec![KeyValue::string("service.name", source)],
            },
            scope_metrics: vec![ScopeMetrics {
                metrics: vec![Metric {
                    name: record.name.clone(),
                    unit: record.unit.clone(),
                    data,
                }],
            }],
        }],
    }
}

/// Wrap one log record as a single-entry stream.
pub fn encode_log(record: &LogRecord) -> LogsEnvelope {
    LogsEnvelope {
        streams: vec![LogStream {
            stream: record.labels.clone(),
            values: vec![[record.timestamp_nanos.to_string(), record.payload.to_string()]],
        }],
    }
}

fn number_value(value: MetricValue) -> NumberValue {
    match value {
        MetricValue::Count(v) => NumberValue::AsInt(i64::try_from(v).unwrap_or(i64::MAX)),
        MetricValue::Point(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            NumberValue::AsInt(v as i64)
        }
        MetricValue::Point(v) => NumberValue::AsDouble(v),
    }
}
