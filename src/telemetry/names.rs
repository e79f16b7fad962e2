//! Metric names and units reported by the pipeline.

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_LATENCY_MS: &str = "http_request_latency_ms";
pub const PIZZA_PURCHASES_TOTAL: &str = "pizza_purchases_total";
pub const PIZZA_REVENUE_TOTAL: &str = "pizza_revenue_total";
pub const PIZZA_ORDER_LATENCY_MS: &str = "pizza_order_latency_ms";
pub const CPU_USAGE_PERCENTAGE: &str = "cpu_usage_percentage";
pub const MEMORY_USAGE_PERCENTAGE: &str = "memory_usage_percentage";
pub const ACTIVE_USERS: &str = "active_users";

pub const UNIT_COUNT: &str = "1";
pub const UNIT_MILLIS: &str = "ms";
pub const UNIT_CENTS: &str = "cents";
pub const UNIT_PERCENT: &str = "%";
pub const UNIT_USERS: &str = "users";
