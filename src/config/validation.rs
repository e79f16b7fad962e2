//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate backend URLs and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TelemetryConfig → Result<(), Vec<ValidationIssue>>
//! - Runs before config is accepted into the system

use std::fmt;

use url::Url;

use crate::config::schema::TelemetryConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TelemetryConfig) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    check_url(&mut issues, "metrics.url", &config.metrics.url);
    check_url(&mut issues, "logging.url", &config.logging.url);

    if config.sampler.period_ms == 0 {
        issues.push(ValidationIssue {
            field: "sampler.period_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if !config.instrumentation.purchase_route.starts_with('/') {
        issues.push(ValidationIssue {
            field: "instrumentation.purchase_route",
            message: format!(
                "route template must start with '/', got {:?}",
                config.instrumentation.purchase_route
            ),
        });
    }

    if axum::http::Method::from_bytes(config.instrumentation.purchase_method.as_bytes()).is_err() {
        issues.push(ValidationIssue {
            field: "instrumentation.purchase_method",
            message: format!("invalid HTTP method {:?}", config.instrumentation.purchase_method),
        });
    }

    if config.transport.timeout_ms == 0 {
        issues.push(ValidationIssue {
            field: "transport.timeout_ms",
            message: "must be greater than zero".to_string(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_url(issues: &mut Vec<ValidationIssue>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => issues.push(ValidationIssue {
            field,
            message: format!("unsupported scheme {:?}", url.scheme()),
        }),
        Err(e) => issues.push(ValidationIssue {
            field,
            message: format!("invalid URL {:?}: {}", value, e),
        }),
    }
}
