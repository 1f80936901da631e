//! Host ACL: a set of individually permitted addresses.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{from_octets, Acl, Members, MutableAcl};

/// Map-backed host ACL keyed by the canonical string form of each
/// address. `127.0.0.1` and `::ffff:127.0.0.1` are different members.
///
/// Lookups take the read lock; `add` and `remove` take the write lock.
/// Both hold it for O(1).
#[derive(Debug, Default)]
pub struct HostAcl {
    allowed: RwLock<HashMap<String, IpAddr>>,
}

impl HostAcl {
    /// Create an empty ACL. Nothing is permitted until added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit an address given as raw octets. Invalid lengths are ignored.
    pub fn add_octets(&self, octets: &[u8]) {
        if let Some(addr) = from_octets(octets) {
            self.add(addr);
        }
    }

    /// Remove an address given as raw octets. Invalid lengths are ignored.
    pub fn remove_octets(&self, octets: &[u8]) {
        if let Some(addr) = from_octets(octets) {
            self.remove(&addr);
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The map has no multi-step invariant, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, IpAddr>> {
        self.allowed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, IpAddr>> {
        self.allowed.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Acl for HostAcl {
    fn permitted(&self, addr: &IpAddr) -> bool {
        self.read().contains_key(&addr.to_string())
    }
}

impl MutableAcl<IpAddr> for HostAcl {
    fn add(&self, addr: IpAddr) {
        let key = addr.to_string();
        self.write().insert(key, addr);
    }

    fn remove(&self, addr: &IpAddr) {
        let key = addr.to_string();
        self.write().remove(&key);
    }
}

impl Members for HostAcl {
    type Member = IpAddr;

    fn snapshot(&self) -> Vec<IpAddr> {
        self.read().values().copied().collect()
    }

    fn replace(&self, members: Vec<IpAddr>) {
        let fresh: HashMap<String, IpAddr> = members
            .into_iter()
            .map(|addr| (addr.to_string(), addr))
            .collect();
        *self.write() = fresh;
    }
}

impl FromIterator<IpAddr> for HostAcl {
    fn from_iter<T: IntoIterator<Item = IpAddr>>(iter: T) -> Self {
        let acl = HostAcl::new();
        acl.replace(iter.into_iter().collect());
        acl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn add_check_remove() {
        let acl = HostAcl::new();
        assert!(!acl.permitted(&ip("127.0.0.1")));

        acl.add(ip("127.0.0.1"));
        assert!(acl.permitted(&ip("127.0.0.1")));

        acl.remove(&ip("127.0.0.1"));
        assert!(!acl.permitted(&ip("127.0.0.1")));
        assert!(acl.is_empty());
    }

    #[test]
    fn add_is_idempotent_and_remove_absent_is_noop() {
        let acl = HostAcl::new();
        acl.add(ip("::1"));
        acl.add(ip("::1"));
        assert_eq!(acl.len(), 1);

        acl.remove(&ip("10.0.0.1"));
        assert_eq!(acl.len(), 1);
        assert!(acl.permitted(&ip("::1")));
    }

    #[test]
    fn invalid_octets_never_match_or_store() {
        let acl = HostAcl::new();
        acl.add_octets(&[192, 168, 2]);
        assert!(acl.is_empty());
        assert!(!acl.permitted_octets(&[192, 168, 2]));

        acl.add_octets(&[192, 168, 2, 1]);
        assert!(acl.permitted_octets(&[192, 168, 2, 1]));
        assert!(!acl.permitted_octets(&[]));

        acl.remove_octets(&[192, 168]);
        assert_eq!(acl.len(), 1);
        acl.remove_octets(&[192, 168, 2, 1]);
        assert!(acl.is_empty());
    }

    #[test]
    fn families_are_not_normalized() {
        let acl = HostAcl::new();
        acl.add(ip("127.0.0.1"));
        assert!(!acl.permitted(&ip("::ffff:127.0.0.1")));
        assert!(!acl.permitted(&ip("::1")));
    }

    #[test]
    fn concurrent_mutation_loses_no_updates() {
        let acl = Arc::new(HostAcl::new());
        let workers = 8;
        let per_worker = 64u8;

        thread::scope(|scope| {
            for w in 0..workers {
                let acl = Arc::clone(&acl);
                scope.spawn(move || {
                    for i in 0..per_worker {
                        let addr = IpAddr::from([10, w, i, 1]);
                        acl.add(addr);
                        assert!(acl.permitted(&addr));
                        // odd entries are removed again, even ones stay
                        if i % 2 == 1 {
                            acl.remove(&addr);
                            assert!(!acl.permitted(&addr));
                        }
                    }
                });
            }
        });

        let expected: HashSet<IpAddr> = (0..workers)
            .flat_map(|w| (0..per_worker).filter(|i| i % 2 == 0).map(move |i| IpAddr::from([10, w, i, 1])))
            .collect();
        let actual: HashSet<IpAddr> = acl.snapshot().into_iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn contended_keys_end_in_the_last_written_state() {
        let acl = Arc::new(HostAcl::new());
        let keys: Vec<IpAddr> = (1..=4u8).map(|i| IpAddr::from([192, 0, 2, i])).collect();
        let contested = ip("192.0.2.99");

        thread::scope(|scope| {
            for w in 0..8usize {
                let acl = Arc::clone(&acl);
                let keys = &keys;
                scope.spawn(move || {
                    for round in 0..200usize {
                        for (k, key) in keys.iter().enumerate() {
                            acl.add(*key);
                            let _ = acl.permitted(key);
                            acl.remove(key);
                            // every worker's final operation on a key agrees:
                            // even keys end added, odd keys end removed
                            if k % 2 == 0 || round % 3 == 0 {
                                acl.add(*key);
                            }
                            if k % 2 == 1 {
                                acl.remove(key);
                            }
                        }
                        if w % 2 == 0 {
                            acl.add(contested);
                        } else {
                            acl.remove(&contested);
                        }
                    }
                });
            }
        });

        for (k, key) in keys.iter().enumerate() {
            assert_eq!(acl.permitted(key), k % 2 == 0, "key {key}");
        }

        // the contested key may land either way, but exactly once
        let snapshot = acl.snapshot();
        let unique: HashSet<IpAddr> = snapshot.iter().copied().collect();
        assert_eq!(unique.len(), snapshot.len());
        assert_eq!(acl.len(), 2 + usize::from(acl.permitted(&contested)));
    }

    #[test]
    fn replace_swaps_members() {
        let acl: HostAcl = [ip("10.0.0.1"), ip("10.0.0.2")].into_iter().collect();
        assert_eq!(acl.len(), 2);
        acl.replace(vec![ip("10.0.0.3")]);
        assert!(!acl.permitted(&ip("10.0.0.1")));
        assert!(acl.permitted(&ip("10.0.0.3")));
    }
}
