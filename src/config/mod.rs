//! Policy configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, decode wire-form ACLs, merge host_file)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated)
//!     → GateConfig::into_acl() → Arc<dyn Acl> handed to the gate
//! ```
//!
//! # Design Decisions
//! - ACL members are embedded as wire-form strings, so one malformed
//!   literal rejects the whole file
//! - All fields have defaults; an empty file is a deny-all policy
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, LoadError};
pub use schema::{GateConfig, PolicyConfig, PolicyMode};
