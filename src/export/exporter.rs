//! Encoder + transport pairing for the two outbound streams.

use serde_json::Value;

use crate::config::{LoggingConfig, MetricsConfig};
use crate::export::envelope::{encode_log, encode_metric};
use crate::export::transport::{PushTarget, Transport};
use crate::telemetry::{unix_nanos, LogLevel, LogRecord, MetricRecord};

/// Pushes metric and log records to their configured backends.
#[derive(Clone)]
pub struct Exporter {
    transport: Transport,
    metrics_target: PushTarget,
    logs_target: PushTarget,
    metrics_source: String,
    log_component: String,
}

impl Exporter {
    pub fn new(transport: Transport, metrics: &MetricsConfig, logging: &LoggingConfig) -> Self {
        Self {
            transport,
            metrics_target: PushTarget::metrics(metrics.url.clone(), &metrics.api_key),
            logs_target: PushTarget::logs(logging.url.clone(), &logging.user_id, &logging.api_key),
            metrics_source: metrics.source.clone(),
            log_component: logging.source.clone(),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Encode and push one metric data point, stamped now.
    pub fn push_metric(&self, record: &MetricRecord) {
        let envelope = encode_metric(record, &self.metrics_source, unix_nanos());
        tracing::trace!(metric = %record.name, value = record.as_f64(), "Pushing metric");
        self.transport.push(&self.metrics_target, &envelope);
    }

    /// Encode and push one log record.
    pub fn push_log(&self, record: &LogRecord) {
        self.transport.push(&self.logs_target, &encode_log(record));
    }

    /// Emit a log line of the given `kind` (`http-request`, `db-query`, ...)
    /// through the log backend.
    pub fn log(&self, level: LogLevel, kind: &str, payload: Value) {
        let record = LogRecord::new(&self.log_component, level, kind, payload);
        self.push_log(&record);
    }
}
