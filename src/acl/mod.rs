//! Access control lists.
//!
//! # Data Flow
//! ```text
//! Source address (IpAddr or raw octets)
//!     → Acl::permitted (shared lock, pure in-memory check)
//!     → bool decision
//!
//! Operator / loader:
//!     → MutableAcl::add / remove (exclusive lock)
//!     → Members::snapshot / replace (codec)
//! ```
//!
//! # Design Decisions
//! - One decision capability (`Acl`) composed with an optional mutation
//!   capability (`MutableAcl<I>`); host vs network is the identity type
//! - Reads dominate writes, so state sits behind `RwLock`
//! - No I/O ever happens while a lock is held
//! - v4 and v4-mapped-v6 addresses are distinct identities

pub mod host;
pub mod network;
pub mod policy;
pub mod stub;

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;

pub use host::HostAcl;
pub use network::NetAcl;
pub use policy::Policy;
pub use stub::{HostStub, NetStub, Stub};

/// Decides whether a source address may pass.
pub trait Acl: Send + Sync {
    /// Returns true if `addr` is permitted access.
    fn permitted(&self, addr: &IpAddr) -> bool;

    /// Decision over raw address octets. Anything other than a 4 or 16
    /// byte slice is not an address and is never permitted.
    fn permitted_octets(&self, octets: &[u8]) -> bool {
        match from_octets(octets) {
            Some(addr) => self.permitted(&addr),
            None => false,
        }
    }
}

/// An ACL whose membership can change at runtime.
pub trait MutableAcl<I: Identity>: Acl {
    /// Permit `id`. Adding a present member is a no-op.
    fn add(&self, id: I);

    /// Stop permitting `id`. Removing an absent member is a no-op.
    fn remove(&self, id: &I);
}

/// Enumeration used by the codecs.
pub trait Members {
    type Member: Identity;

    /// Copy of the current members, taken under the shared lock.
    fn snapshot(&self) -> Vec<Self::Member>;

    /// Replace all members in one exclusive critical section.
    fn replace(&self, members: Vec<Self::Member>);
}

/// A value an ACL can store: a single address or a network block.
pub trait Identity: Clone + PartialEq + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Human label used in operator warnings.
    const KIND: &'static str;

    /// Parse one textual member literal.
    fn parse_member(literal: &str) -> Option<Self>;
}

impl Identity for IpAddr {
    const KIND: &'static str = "IP address";

    fn parse_member(literal: &str) -> Option<Self> {
        literal.parse().ok()
    }
}

impl Identity for IpNet {
    const KIND: &'static str = "IP network";

    fn parse_member(literal: &str) -> Option<Self> {
        // host bits are masked off, so 10.1.2.3/8 is stored as 10.0.0.0/8
        literal.parse::<IpNet>().ok().map(|net| net.trunc())
    }
}

/// Build an address from raw octets, accepting only v4 (4 bytes) and
/// v6 (16 bytes) lengths. A 16-byte v4-mapped address stays v6.
pub fn from_octets(octets: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(octets) {
        return Some(IpAddr::from(v4));
    }
    if let Ok(v6) = <[u8; 16]>::try_from(octets) {
        return Some(IpAddr::from(v6));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octet_lengths() {
        assert_eq!(from_octets(&[127, 0, 0, 1]), Some("127.0.0.1".parse().unwrap()));
        assert!(from_octets(&[0u8; 16]).is_some());
        assert!(from_octets(&[]).is_none());
        assert!(from_octets(&[192, 168, 2]).is_none());
        assert!(from_octets(&[0u8; 5]).is_none());
    }

    #[test]
    fn mapped_address_is_not_v4() {
        let mut mapped = [0u8; 16];
        mapped[10] = 0xff;
        mapped[11] = 0xff;
        mapped[12..].copy_from_slice(&[127, 0, 0, 1]);
        let addr = from_octets(&mapped).unwrap();
        assert!(addr.is_ipv6());
        assert_ne!(addr, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn network_literal_is_truncated() {
        let net = IpNet::parse_member("10.1.2.3/8").unwrap();
        assert_eq!(net.to_string(), "10.0.0.0/8");
        assert!(IpNet::parse_member("10.0.0.0").is_none());
        assert!(IpAddr::parse_member("192.168.2").is_none());
    }
}
