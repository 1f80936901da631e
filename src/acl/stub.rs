//! Pass-through ACLs.
//!
//! A stub keeps an enforcement point wired into a service before real
//! policy exists. It permits everything and reports every call to its
//! sink so operators can see that enforcement is still off.

use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;

use super::{Acl, Identity, MutableAcl};
use crate::observability::metrics;
use crate::observability::{StubSink, TracingSink};

/// Always-permit ACL over identities of type `I`.
pub struct Stub<I> {
    sink: Arc<dyn StubSink>,
    _identity: PhantomData<fn() -> I>,
}

/// Stubbed host ACL.
pub type HostStub = Stub<IpAddr>;

/// Stubbed network ACL.
pub type NetStub = Stub<IpNet>;

impl<I: Identity> Stub<I> {
    /// Stub that reports through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Stub that reports to `sink`.
    pub fn with_sink(sink: Arc<dyn StubSink>) -> Self {
        sink.warn("ACL is being stubbed");
        Self {
            sink,
            _identity: PhantomData,
        }
    }

    fn warn(&self, operation: &'static str, message: &str) {
        metrics::record_stub_warning(operation);
        self.sink.warn(message);
    }
}

impl Stub<IpAddr> {
    /// Accepts anything, valid or not, and only warns.
    pub fn add_octets(&self, octets: &[u8]) {
        self.warn("add", &format!("address {octets:?} added but ACL is stubbed"));
    }

    pub fn remove_octets(&self, octets: &[u8]) {
        self.warn("remove", &format!("address {octets:?} removed but ACL is stubbed"));
    }
}

impl<I: Identity> Default for Stub<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for Stub<I> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            _identity: PhantomData,
        }
    }
}

impl<I> fmt::Debug for Stub<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub").finish_non_exhaustive()
    }
}

impl<I: Identity> Acl for Stub<I> {
    fn permitted(&self, addr: &IpAddr) -> bool {
        self.warn("check", &format!("allow check for {addr} but ACL is stubbed"));
        true
    }

    fn permitted_octets(&self, octets: &[u8]) -> bool {
        self.warn("check", &format!("allow check for {octets:?} but ACL is stubbed"));
        true
    }
}

impl<I: Identity> MutableAcl<I> for Stub<I> {
    fn add(&self, id: I) {
        self.warn("add", &format!("{} {id} added but ACL is stubbed", I::KIND));
    }

    fn remove(&self, id: &I) {
        self.warn("remove", &format!("{} {id} removed but ACL is stubbed", I::KIND));
    }
}
