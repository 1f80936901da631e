//! Network ACL: an ordered list of permitted CIDR blocks.
//!
//! Overlapping networks are not detected or merged. Adding `10.0.0.0/8`
//! does not absorb an earlier `10.1.0.0/16`, and removing the /8 leaves
//! the /16 in place. `permitted` scans the whole list under the read lock,
//! so its hold time grows with the number of stored networks.

use std::net::IpAddr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ipnet::IpNet;

use super::{Acl, Members, MutableAcl};

/// Vec-backed network ACL.
#[derive(Debug, Default)]
pub struct NetAcl {
    allowed: RwLock<Vec<IpNet>>,
}

impl NetAcl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<IpNet>> {
        self.allowed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<IpNet>> {
        self.allowed.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Acl for NetAcl {
    fn permitted(&self, addr: &IpAddr) -> bool {
        self.read().iter().any(|net| net.contains(addr))
    }
}

impl MutableAcl<IpNet> for NetAcl {
    fn add(&self, net: IpNet) {
        self.write().push(net.trunc());
    }

    /// Drops the first entry equal to `net`. Entries that merely overlap
    /// it are kept.
    fn remove(&self, net: &IpNet) {
        let target = net.trunc();
        let mut allowed = self.write();
        if let Some(index) = allowed.iter().position(|n| *n == target) {
            allowed.remove(index);
        }
    }
}

impl Members for NetAcl {
    type Member = IpNet;

    fn snapshot(&self) -> Vec<IpNet> {
        self.read().clone()
    }

    fn replace(&self, members: Vec<IpNet>) {
        let fresh: Vec<IpNet> = members.into_iter().map(|n| n.trunc()).collect();
        *self.write() = fresh;
    }
}

impl FromIterator<IpNet> for NetAcl {
    fn from_iter<T: IntoIterator<Item = IpNet>>(iter: T) -> Self {
        let acl = NetAcl::new();
        acl.replace(iter.into_iter().collect());
        acl
    }
}
