//! Push-based observability for churninsight
//!
//! Metrics are collected in a private Prometheus registry and rendered on
//! demand in the text exposition format. Nothing listens for requests.

pub mod latency_tracker;
pub mod metrics;

pub use latency_tracker::AttemptGuard;
pub use metrics::PredictionMetrics;
