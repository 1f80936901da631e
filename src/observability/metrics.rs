//! Metrics collection.
//!
//! # Metrics
//! - `ipgate_decisions_total` (counter): gate outcomes by `outcome`
//! - `ipgate_stub_warnings_total` (counter): stubbed ACL calls by `operation`

/// Count one gate outcome.
pub fn record_decision(outcome: &'static str) {
    ::metrics::counter!("ipgate_decisions_total", "outcome" => outcome).increment(1);
}

/// Count one call into a stubbed ACL.
pub fn record_stub_warning(operation: &'static str) {
    ::metrics::counter!("ipgate_stub_warnings_total", "operation" => operation).increment(1);
}
