//! Combined host and network policy.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::{Acl, HostAcl, NetAcl};

/// Permits an address listed in `hosts` or contained in any of `networks`.
///
/// Both halves stay independently mutable through the accessors, so an
/// admin endpoint can edit either list while traffic is flowing.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Policy {
    hosts: HostAcl,
    networks: NetAcl,
}

impl Policy {
    pub fn new(hosts: HostAcl, networks: NetAcl) -> Self {
        Self { hosts, networks }
    }

    pub fn hosts(&self) -> &HostAcl {
        &self.hosts
    }

    pub fn networks(&self) -> &NetAcl {
        &self.networks
    }
}

impl Acl for Policy {
    fn permitted(&self, addr: &IpAddr) -> bool {
        // hosts first: O(1) before the O(n) network scan
        self.hosts.permitted(addr) || self.networks.permitted(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::MutableAcl;

    #[test]
    fn either_list_permits() {
        let policy = Policy::default();
        let host: IpAddr = "192.0.2.7".parse().unwrap();
        let inside: IpAddr = "10.4.4.4".parse().unwrap();

        assert!(!policy.permitted(&host));
        assert!(!policy.permitted(&inside));

        policy.hosts().add(host);
        policy.networks().add("10.0.0.0/8".parse().unwrap());
        assert!(policy.permitted(&host));
        assert!(policy.permitted(&inside));
        assert!(!policy.permitted(&"172.16.0.1".parse().unwrap()));
    }

    #[test]
    fn deserializes_from_wire_form_fields() {
        let policy: Policy =
            serde_json::from_str(r#"{"hosts": "::1, 127.0.0.1", "networks": "10.0.0.0/8"}"#).unwrap();
        assert_eq!(policy.hosts().len(), 2);
        assert!(policy.permitted(&"10.9.8.7".parse().unwrap()));
    }
}
