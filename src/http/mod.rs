//! HTTP request gating.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → lookup (RequestLookup by default: ConnectInfo / RemoteAddr)
//!     → Acl::permitted
//!     → gate.rs: allow handler | deny handler | 401 | 500
//!     → middleware.rs: same decision, `Next` as the allow path
//! ```

pub mod gate;
pub mod middleware;
pub mod response;

pub use gate::{AclGate, AclGateBuilder, BoxHandler, Outcome, SharedLookup};
pub use middleware::{acl_middleware, GateState};
