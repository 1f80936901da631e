//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and ACLs produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (decision and stub-warning counters)
//!     → sink.rs (operator warnings from stubbed ACLs)
//! ```
//!
//! # Design Decisions
//! - Nothing here is process-global except the tracing subscriber the
//!   binary installs; stub warnings go to a per-instance sink
//! - Metrics use the `metrics` facade and cost nothing without a recorder

pub mod logging;
pub mod metrics;
pub mod sink;

pub use sink::{MemorySink, StubSink, TracingSink};
