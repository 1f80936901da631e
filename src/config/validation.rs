//! Configuration validation.
//!
//! # Responsibilities
//! - Reject members that would be silently ignored (stub mode)
//! - Warn about policies that deny everything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: &GateConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use super::schema::{GateConfig, PolicyMode};

/// A semantic problem in an otherwise well-formed config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let policy = &config.policy;
    let mut errors = Vec::new();

    if policy.mode == PolicyMode::Stub {
        if !policy.hosts.is_empty() {
            errors.push(ValidationError {
                field: "policy.hosts",
                message: "members are ignored when mode = \"stub\"".to_string(),
            });
        }
        if !policy.networks.is_empty() {
            errors.push(ValidationError {
                field: "policy.networks",
                message: "members are ignored when mode = \"stub\"".to_string(),
            });
        }
        if policy.host_file.is_some() {
            errors.push(ValidationError {
                field: "policy.host_file",
                message: "file is ignored when mode = \"stub\"".to_string(),
            });
        }
    } else if policy.hosts.is_empty() && policy.networks.is_empty() && policy.host_file.is_none() {
        tracing::warn!("Policy has no members; every request will be denied");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
