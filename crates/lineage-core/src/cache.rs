use thiserror::Error;
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::layout::{layout_with_fallback, LayoutMode, PositionedGraph, Viewport};
use crate::person::Person;
use crate::registry::RegistryError;
use crate::storage::{PersonStore, StorageError, TreeStore};
use crate::tree::{assemble, build_closure, merge_member, to_graph, AncestryTree, TreeError, TreeGraph};

/// Builds ancestry trees on demand and keeps them in a [`TreeStore`].
///
/// A stored tree is a snapshot: registry edits reach it only through
/// [`TreeCache::update`] or [`TreeCache::rebuild`].
pub struct TreeCache<S: PersonStore + TreeStore> {
    storage: S,
    layout: LayoutConfig,
}

impl<S: PersonStore + TreeStore> TreeCache<S> {
    /// Creates a new TreeCache with default layout settings.
    pub fn new(storage: S) -> Self {
        Self::with_layout_config(storage, LayoutConfig::default())
    }

    /// Creates a new TreeCache with custom layout settings.
    pub fn with_layout_config(storage: S, layout: LayoutConfig) -> Self {
        Self { storage, layout }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the layout settings.
    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the stored tree for `principal_id`, building it on first use.
    pub fn get_or_build(&self, principal_id: &str) -> Result<AncestryTree, CacheError> {
        let principal = self.principal(principal_id)?;

        if let Some(tree) = self.storage.load_tree(principal_id)? {
            debug!(principal = principal_id, members = tree.len(), "tree cache hit");
            return Ok(tree);
        }

        self.build_and_store(principal)
    }

    /// Builds the tree again from the current registry, replacing any stored one.
    pub fn rebuild(&self, principal_id: &str) -> Result<AncestryTree, CacheError> {
        let principal = self.principal(principal_id)?;
        self.build_and_store(principal)
    }

    /// Drops the stored tree. Returns false when there was none.
    pub fn invalidate(&self, principal_id: &str) -> Result<bool, CacheError> {
        match self.storage.delete_tree(principal_id) {
            Ok(()) => {
                debug!(principal = principal_id, "tree invalidated");
                Ok(true)
            }
            Err(StorageError::TreeNotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Merges `person` into `tree` and persists the result.
    pub fn update(&self, tree: AncestryTree, person: Person) -> Result<AncestryTree, CacheError> {
        let tree = merge_member(tree, person)?;
        self.storage.save_tree(&tree)?;
        info!(principal = tree.principal_id(), members = tree.len(), "tree updated");
        Ok(tree)
    }

    /// Merges an edited `person` into the stored tree they are principal of.
    ///
    /// Returns `None` when no tree is stored for them yet; the next
    /// [`TreeCache::get_or_build`] picks up the edit anyway.
    pub fn sync_principal(&self, person: Person) -> Result<Option<AncestryTree>, CacheError> {
        match self.storage.load_tree(&person.id)? {
            Some(tree) => self.update(tree, person).map(Some),
            None => Ok(None),
        }
    }

    /// Graph of the tree for `principal_id`.
    pub fn graph(&self, principal_id: &str) -> Result<TreeGraph, CacheError> {
        Ok(to_graph(&self.get_or_build(principal_id)?))
    }

    /// Positions the tree for `principal_id`.
    ///
    /// Falls back to the configured defaults when `mode` or `viewport` is
    /// not given.
    pub fn layout(
        &self,
        principal_id: &str,
        mode: Option<LayoutMode>,
        viewport: Option<Viewport>,
    ) -> Result<PositionedGraph, CacheError> {
        let graph = self.graph(principal_id)?;
        let mode = mode.unwrap_or(self.layout.mode);
        let viewport = viewport.unwrap_or_else(|| Viewport::from(&self.layout));
        Ok(layout_with_fallback(&graph, mode, viewport, &self.layout))
    }

    fn principal(&self, id: &str) -> Result<Person, CacheError> {
        self.storage
            .find_person(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()).into())
    }

    fn build_and_store(&self, principal: Person) -> Result<AncestryTree, CacheError> {
        let registry = self.storage.list_persons()?;
        let members = build_closure(&principal, &registry);
        let tree = assemble(principal, members);

        self.storage.save_tree(&tree)?;
        info!(
            principal = tree.principal_id(),
            members = tree.len(),
            depth = tree.depth(),
            "tree built"
        );
        Ok(tree)
    }
}

/// Errors that can occur in TreeCache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl CacheError {
    /// Returns true when the requested principal does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            CacheError::Registry(e) => e.is_not_found(),
            CacheError::Storage(StorageError::PersonNotFound(_) | StorageError::TreeNotFound(_)) => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_family;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_get_or_build_stores_tree() {
        let cache = TreeCache::new(MemoryStorage::with_persons(sample_family()));

        let tree = cache.get_or_build("1").unwrap();
        assert_eq!(tree.len(), 15);
        assert_eq!(cache.storage().list_trees().unwrap().len(), 1);

        let again = cache.get_or_build("1").unwrap();
        assert_eq!(again, tree);
    }

    #[test]
    fn test_missing_principal() {
        let cache = TreeCache::new(MemoryStorage::new());
        let err = cache.get_or_build("404").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalidate() {
        let cache = TreeCache::new(MemoryStorage::with_persons(sample_family()));
        assert!(!cache.invalidate("1").unwrap());
        cache.get_or_build("1").unwrap();
        assert!(cache.invalidate("1").unwrap());
        assert!(cache.storage().load_tree("1").unwrap().is_none());
    }

    #[test]
    fn test_sync_principal_without_stored_tree() {
        let cache = TreeCache::new(MemoryStorage::with_persons(sample_family()));
        let person = cache.storage().find_person("1").unwrap().unwrap();
        assert!(cache.sync_principal(person).unwrap().is_none());
        assert!(cache.storage().list_trees().unwrap().is_empty());
    }
}
