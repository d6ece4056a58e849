//! Sorted key-value store abstraction (spec §4.6) with an in-memory
//! reference implementation. A real deployment backs this with the chain's
//! IAVL/merkle store; keepers only ever go through this trait so tests run
//! against the same semantics a node would.

use std::collections::BTreeMap;
use std::ops::Bound;

/// A sorted byte-keyed store. Every tx handler reads, mutates, then writes
/// back (spec §4.6); `Store` itself does not provide transactions — callers
/// that need atomicity across a handler use [`InMemoryStore::checkpoint`] /
/// [`InMemoryStore::restore`] (or the chain's native transactional write-set
/// in a real deployment).
pub trait Store {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    fn set(&mut self, key: &[u8], value: Vec<u8>);
    fn remove(&mut self, key: &[u8]);
    /// Ascending iteration over all keys sharing `prefix`.
    fn prefix_scan(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore { data: BTreeMap::new() }
    }

    /// Snapshots current state for rollback on handler error (spec §7: "an
    /// error anywhere in the handler MUST leave the store unchanged").
    pub fn checkpoint(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.data.clone()
    }

    pub fn restore(&mut self, checkpoint: BTreeMap<Vec<u8>, Vec<u8>>) {
        self.data = checkpoint;
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.data.insert(key.to_vec(), value);
    }

    fn remove(&mut self, key: &[u8]) {
        self.data.remove(key);
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut upper = prefix.to_vec();
        loop {
            match upper.last_mut() {
                Some(byte) if *byte == 0xff => {
                    upper.pop();
                }
                Some(byte) => {
                    *byte += 1;
                    break;
                }
                None => break,
            }
        }
        let range = if upper.is_empty() {
            (Bound::Included(prefix.to_vec()), Bound::Unbounded)
        } else {
            (Bound::Included(prefix.to_vec()), Bound::Excluded(upper))
        };
        self.data
            .range::<Vec<u8>, _>(range)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Runs `handler` against `store`, restoring the pre-call state if it
/// returns `Err` (spec §7 atomicity requirement applied uniformly across
/// every Msg handler).
pub fn atomically<E>(store: &mut InMemoryStore, handler: impl FnOnce(&mut InMemoryStore) -> Result<(), E>) -> Result<(), E> {
    let checkpoint = store.checkpoint();
    match handler(store) {
        Ok(()) => Ok(()),
        Err(e) => {
            store.restore(checkpoint);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_scan_finds_only_matching_keys() {
        let mut store = InMemoryStore::new();
        store.set(b"a/1", vec![1]);
        store.set(b"a/2", vec![2]);
        store.set(b"b/1", vec![3]);
        let results = store.prefix_scan(b"a/");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1, vec![1]);
        assert_eq!(results[1].1, vec![2]);
    }

    #[test]
    fn atomically_rolls_back_on_error() {
        let mut store = InMemoryStore::new();
        store.set(b"k", vec![1]);
        let result: Result<(), &str> = atomically(&mut store, |s| {
            s.set(b"k", vec![2]);
            Err("boom")
        });
        assert!(result.is_err());
        assert_eq!(store.get(b"k"), Some(vec![1]));
    }

    #[test]
    fn atomically_commits_on_success() {
        let mut store = InMemoryStore::new();
        let result: Result<(), &str> = atomically(&mut store, |s| {
            s.set(b"k", vec![9]);
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(store.get(b"k"), Some(vec![9]));
    }
}
