//! Endpoint and branch storage.
//!
//! The registry is read on every dispatch and written rarely, so the two
//! sides use different primitives:
//!
//! - The endpoint list is an [`ArcSwap`] snapshot. Readers take a snapshot
//!   and never block; a writer publishes a new list with the endpoint added.
//! - Each endpoint's buckets sit behind a [`RwLock`]. Branches are inserted
//!   one at a time, so a concurrent reader sees each branch either fully
//!   present or absent.
//!
//! Writers are serialized by a [`Mutex`] so that two registrations of the
//! same endpoint id cannot both create it.

use crate::endpoint::{Branch, Endpoint, RegisteredBranch};
use crate::error::RouterError;
use crate::specificity::BucketKey;
use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Branches of one bucket keyed by their normalized expression.
type Bucket<R> = BTreeMap<String, Arc<RegisteredBranch<R>>>;

/// A registered endpoint and its branch buckets.
pub struct EndpointEntry<R> {
    endpoint: Arc<Endpoint<R>>,
    buckets: RwLock<BTreeMap<BucketKey, Bucket<R>>>,
}

impl<R> EndpointEntry<R> {
    fn new(endpoint: Endpoint<R>) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    /// The endpoint definition.
    pub fn endpoint(&self) -> &Arc<Endpoint<R>> {
        &self.endpoint
    }

    /// First branch, in priority order, whose pattern matches `path`.
    ///
    /// Buckets are visited in [`BucketKey`] order and skipped when they cannot
    /// hold a match for a path of `segments` segments. Within a bucket,
    /// branches are tried in lexicographic order of their expression.
    pub fn find_branch(&self, path: &str, segments: usize) -> Option<Arc<RegisteredBranch<R>>> {
        let buckets = self.buckets.read();
        buckets
            .iter()
            .filter(|(key, _)| key.accepts(segments))
            .flat_map(|(_, bucket)| bucket.values())
            .find(|branch| branch.is_match(path))
            .cloned()
    }

    fn insert(&self, branch: RegisteredBranch<R>) {
        let Some(key) = branch.key() else { return };
        let expression = branch.expression().to_string();
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(key).or_default();
        if bucket.contains_key(&expression) {
            crate::debug_log!(
                "Endpoint '{}' already has '{}'; keeping the first handler",
                self.endpoint.id(),
                expression
            );
            return;
        }
        bucket.insert(expression, Arc::new(branch));
    }

    /// Number of branches stored under `key`.
    pub fn bucket_len(&self, key: BucketKey) -> usize {
        self.buckets.read().get(&key).map_or(0, BTreeMap::len)
    }

    /// Total number of branches.
    pub fn branch_count(&self) -> usize {
        self.buckets.read().values().map(BTreeMap::len).sum()
    }

    /// Expressions in lookup order.
    pub fn expressions(&self) -> Vec<String> {
        self.buckets
            .read()
            .values()
            .flat_map(|bucket| bucket.keys().cloned())
            .collect()
    }
}

impl<R> fmt::Debug for EndpointEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointEntry")
            .field("endpoint", &self.endpoint)
            .field("branches", &self.branch_count())
            .finish()
    }
}

/// Snapshot of the registered endpoints, in registration order.
pub type Snapshot<R> = Arc<Vec<Arc<EndpointEntry<R>>>>;

/// Thread-safe endpoint registry.
pub struct Registry<R> {
    entries: ArcSwap<Vec<Arc<EndpointEntry<R>>>>,
    write_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<R> Registry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Register `endpoint` with `branches`.
    ///
    /// Every branch is validated before anything is stored; one bad branch
    /// rejects the whole call. Registering an id again keeps the first
    /// definition and merges the new branches into it. Branches passed with a
    /// terminal endpoint are ignored.
    pub fn register(&self, endpoint: Endpoint<R>, branches: Vec<Branch<R>>) -> Result<(), RouterError> {
        let compiled = branches
            .into_iter()
            .map(RegisteredBranch::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let _guard = self.write_lock.lock();
        let entry = self.entry_for(endpoint)?;

        if entry.endpoint.kind().is_terminal() {
            if !compiled.is_empty() {
                crate::warn_log!(
                    "Terminal endpoint '{}' ignores {} branch(es)",
                    entry.endpoint.id(),
                    compiled.len()
                );
            }
        } else {
            for branch in compiled {
                entry.insert(branch);
            }
        }

        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Existing entry with the endpoint's id, or a newly published one.
    /// Caller holds the write lock.
    fn entry_for(&self, endpoint: Endpoint<R>) -> Result<Arc<EndpointEntry<R>>, RouterError> {
        let current = self.entries.load_full();
        if let Some(existing) = current.iter().find(|e| e.endpoint.id() == endpoint.id()) {
            if existing.endpoint.kind().is_terminal() != endpoint.kind().is_terminal() {
                return Err(RouterError::EndpointConflict {
                    id: endpoint.id().to_string(),
                });
            }
            return Ok(Arc::clone(existing));
        }

        crate::debug_log!("Registering endpoint '{}'", endpoint.id());
        let entry = Arc::new(EndpointEntry::new(endpoint));
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::clone(&entry));
        self.entries.store(Arc::new(next));
        Ok(entry)
    }

    /// Remove every endpoint and branch.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.entries.store(Arc::new(Vec::new()));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Current endpoints in registration order.
    pub fn snapshot(&self) -> Snapshot<R> {
        self.entries.load_full()
    }

    /// Entry registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<EndpointEntry<R>>> {
        self.entries
            .load()
            .iter()
            .find(|e| e.endpoint.id() == id)
            .cloned()
    }

    /// Counter bumped after every mutation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("endpoints", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(expression: &str) -> Branch<u8> {
        Branch::new(expression, |_| 0)
    }

    #[test]
    fn test_register_and_get() {
        let registry = Registry::new();
        registry
            .register(Endpoint::routable("app"), vec![branch("/a"), branch("/b/<id>")])
            .unwrap();

        let entry = registry.get("app").unwrap();
        assert_eq!(entry.branch_count(), 2);
        assert_eq!(entry.bucket_len(BucketKey::from(2)), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_batch_rejected_atomically() {
        let registry = Registry::new();
        let err = registry
            .register(Endpoint::routable("app"), vec![branch("/ok"), branch("*")])
            .unwrap_err();
        assert!(matches!(err, RouterError::ReservedExpression { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_expression_stored_once() {
        let registry = Registry::new();
        registry
            .register(Endpoint::routable("app"), vec![branch("/login"), branch("login/")])
            .unwrap();
        registry
            .register(Endpoint::routable("app"), vec![branch("/login")])
            .unwrap();

        let entry = registry.get("app").unwrap();
        assert_eq!(entry.bucket_len(BucketKey::from(1)), 1);
    }

    #[test]
    fn test_reregister_keeps_first_definition() {
        let registry = Registry::new();
        registry
            .register(Endpoint::routable("app").scheme("app"), vec![branch("/a")])
            .unwrap();
        registry
            .register(Endpoint::routable("app").scheme("other"), vec![branch("/b")])
            .unwrap();

        let entry = registry.get("app").unwrap();
        assert!(entry.endpoint().accepted_schemes().contains("app"));
        assert!(!entry.endpoint().accepted_schemes().contains("other"));
        assert_eq!(entry.branch_count(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kind_conflict() {
        let registry = Registry::new();
        registry.register(Endpoint::routable("x"), Vec::new()).unwrap();
        let err = registry
            .register(Endpoint::terminal("x", |_| 0), Vec::new())
            .unwrap_err();
        assert!(matches!(err, RouterError::EndpointConflict { .. }));
    }

    #[test]
    fn test_generation_bumps() {
        let registry: Registry<u8> = Registry::new();
        let start = registry.generation();
        registry.register(Endpoint::routable("a"), Vec::new()).unwrap();
        registry.clear();
        assert_eq!(registry.generation(), start + 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_branch_priority() {
        let registry = Registry::new();
        registry
            .register(
                Endpoint::routable("app"),
                vec![branch("/a/<rest:.+>"), branch("/a/<id>"), branch("/a/b")],
            )
            .unwrap();
        let entry = registry.get("app").unwrap();

        let found = entry.find_branch("/a/b", 2).unwrap();
        assert_eq!(found.expression(), "/a/<id>");
        let found = entry.find_branch("/a/b/c", 3).unwrap();
        assert_eq!(found.expression(), "/a/<rest:.+>");
        assert!(entry.find_branch("/z", 1).is_none());
    }

    #[test]
    fn test_expressions_in_lookup_order() {
        let registry = Registry::new();
        registry
            .register(
                Endpoint::routable("app"),
                vec![branch("/x/<r:.*>"), branch("/b"), branch("/a/<id>"), branch("/a")],
            )
            .unwrap();
        let entry = registry.get("app").unwrap();
        assert_eq!(entry.expressions(), ["/a/<id>", "/a", "/b", "/x/<r:.*>"]);
    }
}
