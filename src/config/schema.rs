//! Configuration schema definitions.
//!
//! ```toml
//! [policy]
//! mode = "enforce"
//! hosts = "127.0.0.1, ::1"
//! networks = "10.0.0.0/8"
//! host_file = "allow.txt"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::acl::{Acl, HostAcl, HostStub, NetAcl, Policy};

/// Root configuration document.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Access policy for the gated service.
    pub policy: PolicyConfig,
}

/// Whether the policy is enforced or only wired in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Requests are checked against the configured members.
    #[default]
    Enforce,
    /// Everything is permitted and every check logs a warning.
    Stub,
}

/// Access policy.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub mode: PolicyMode,

    /// Individually permitted addresses, wire form.
    pub hosts: HostAcl,

    /// Permitted networks, wire form.
    pub networks: NetAcl,

    /// Flat file of extra host addresses, resolved relative to the
    /// config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_file: Option<PathBuf>,
}

impl GateConfig {
    /// Turn the policy into the ACL the gate consults.
    pub fn into_acl(self) -> Arc<dyn Acl> {
        match self.policy.mode {
            PolicyMode::Stub => Arc::new(HostStub::new()),
            PolicyMode::Enforce => Arc::new(Policy::new(self.policy.hosts, self.policy.networks)),
        }
    }
}
