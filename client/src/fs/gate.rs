use super::prelude::*;
use std::collections::HashSet;

/// Tracks which remote views a mutation has made stale.
///
/// With `InvalidationScope::Global` a single dirty flag is raised by the first
/// mutation and never lowered, so every later lookup skips the remote cache.
/// With `InvalidationScope::Path` only the mutated path and its parent are
/// marked, and each mark is cleared by the first fresh fetch of that path.
/// A removal also marks everything below the removed path: each descendant
/// is fetched fresh once before the cache may answer for it again.
#[derive(Debug)]
pub struct Staleness {
    scope: InvalidationScope,
    dirty: bool,
    stale: HashSet<String>,
    /// Removed subtrees, stored as `path/` prefixes.
    stale_trees: HashSet<String>,
    /// Paths under a removed subtree that were fetched fresh since.
    refetched: HashSet<String>,
}

impl Staleness {
    pub fn new(scope: InvalidationScope) -> Self {
        Self {
            scope,
            dirty: false,
            stale: HashSet::new(),
            stale_trees: HashSet::new(),
            refetched: HashSet::new(),
        }
    }

    pub fn mark(&mut self, path: &str) {
        match self.scope {
            InvalidationScope::Global => self.dirty = true,
            InvalidationScope::Path => {
                self.stale.insert(path.to_string());
                self.stale.insert(parent_of(path).to_string());
            }
        }
    }

    /// Marks `path`, its parent and every path below it.
    pub fn mark_tree(&mut self, path: &str) {
        self.mark(path);
        if self.scope == InvalidationScope::Path {
            let prefix = format!("{}/", path.trim_end_matches('/'));
            self.refetched.retain(|p| !p.starts_with(&prefix));
            self.stale_trees.insert(prefix);
        }
    }

    fn under_stale_tree(&self, path: &str) -> bool {
        self.stale_trees.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Whether a lookup of `path` may be answered from the remote client's cache.
    pub fn allows_cache(&self, path: &str) -> bool {
        match self.scope {
            InvalidationScope::Global => !self.dirty,
            InvalidationScope::Path => {
                !self.stale.contains(path)
                    && (!self.under_stale_tree(path) || self.refetched.contains(path))
            }
        }
    }

    /// Records that `path` was just fetched without the cache.
    pub fn refreshed(&mut self, path: &str) {
        if self.scope == InvalidationScope::Path {
            self.stale.remove(path);
            if self.under_stale_tree(path) {
                self.refetched.insert(path.to_string());
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self.scope {
            InvalidationScope::Global => self.dirty,
            InvalidationScope::Path => !self.stale.is_empty(),
        }
    }
}

impl ObjectFs {
    /// Looks `path` up remotely, skipping the remote cache when a mutation
    /// made it stale.
    ///
    /// Blacklisted paths fail with `Rejected` before any remote call; every
    /// remote failure becomes `NoSuchEntry`.
    pub(crate) fn resolve(&self, state: &mut State, path: &str) -> Result<RemoteObject> {
        if is_blacklisted(path) {
            return Err(FsError::Rejected { path: path.to_string() });
        }

        let use_cache = state.staleness.allows_cache(path);
        let result = self.store.lookup(path, use_cache);
        if !use_cache && matches!(result, Ok(_) | Err(StorageError::NotFound(_))) {
            state.staleness.refreshed(path);
        }

        result.map_err(|e| {
            debug!(path, error = %e, "remote lookup failed");
            FsError::no_such_entry(path)
        })
    }

    pub(crate) fn mark_mutated(&self, state: &mut State, path: &str) {
        state.staleness.mark(path);
    }

    pub(crate) fn mark_removed(&self, state: &mut State, path: &str) {
        state.staleness.mark_tree(path);
    }
}
