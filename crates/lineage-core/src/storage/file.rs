use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::StorageConfig;
use crate::person::Person;
use crate::tree::AncestryTree;

use super::error::StorageError;
use super::{PersonStore, TreeStore};

/// File-based storage implementation.
///
/// Keeps each collection as one pretty-printed JSON array:
/// ```text
/// .lineage/
///   persons.json      # Person registry
///   trees.json        # Cached ancestry trees, one per principal
/// ```
///
/// Every call reads the file again, so several processes can share a data
/// directory; concurrent writers race and the last one wins.
pub struct FileStorage {
    config: StorageConfig,
}

impl FileStorage {
    /// Creates a new FileStorage with default config (`./.lineage`).
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Creates a new FileStorage with custom configuration.
    pub fn with_config(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.data_dir)
    }

    /// Ensures the data directory exists.
    fn ensure_data_dir(&self) -> Result<(), StorageError> {
        let dir = self.data_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Reads a collection; a missing file is an empty collection.
    fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, StorageError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&json)?)
    }

    fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<(), StorageError> {
        self.ensure_data_dir()?;

        let json = serde_json::to_string_pretty(items)?;
        fs::write(path, json).map_err(|e| StorageError::io(path, e))?;

        debug!(path = %path.display(), count = items.len(), "collection written");
        Ok(())
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonStore for FileStorage {
    fn list_persons(&self) -> Result<Vec<Person>, StorageError> {
        self.read_collection(&self.config.persons_path())
    }

    fn find_person(&self, id: &str) -> Result<Option<Person>, StorageError> {
        Ok(self.list_persons()?.into_iter().find(|p| p.id == id))
    }

    fn find_person_by_nin(&self, nin: &str) -> Result<Option<Person>, StorageError> {
        Ok(self.list_persons()?.into_iter().find(|p| p.nin == nin))
    }

    fn save_person(&self, person: &Person) -> Result<Person, StorageError> {
        let path = self.config.persons_path();
        let mut persons: Vec<Person> = self.read_collection(&path)?;

        match persons.iter_mut().find(|p| p.id == person.id) {
            Some(existing) => *existing = person.clone(),
            None => persons.push(person.clone()),
        }

        self.write_collection(&path, &persons)?;
        Ok(person.clone())
    }

    fn delete_person(&self, id: &str) -> Result<(), StorageError> {
        let path = self.config.persons_path();
        let mut persons: Vec<Person> = self.read_collection(&path)?;

        let before = persons.len();
        persons.retain(|p| p.id != id);
        if persons.len() == before {
            return Err(StorageError::PersonNotFound(id.to_string()));
        }

        self.write_collection(&path, &persons)
    }
}

impl TreeStore for FileStorage {
    fn load_tree(&self, principal_id: &str) -> Result<Option<AncestryTree>, StorageError> {
        Ok(self
            .list_trees()?
            .into_iter()
            .find(|t| t.principal_id() == principal_id))
    }

    fn save_tree(&self, tree: &AncestryTree) -> Result<(), StorageError> {
        let path = self.config.trees_path();
        let mut trees: Vec<AncestryTree> = self.read_collection(&path)?;

        match trees
            .iter_mut()
            .find(|t| t.principal_id() == tree.principal_id())
        {
            Some(existing) => *existing = tree.clone(),
            None => trees.push(tree.clone()),
        }

        self.write_collection(&path, &trees)
    }

    fn list_trees(&self) -> Result<Vec<AncestryTree>, StorageError> {
        self.read_collection(&self.config.trees_path())
    }

    fn delete_tree(&self, principal_id: &str) -> Result<(), StorageError> {
        let path = self.config.trees_path();
        let mut trees: Vec<AncestryTree> = self.read_collection(&path)?;

        let before = trees.len();
        trees.retain(|t| t.principal_id() != principal_id);
        if trees.len() == before {
            return Err(StorageError::TreeNotFound(principal_id.to_string()));
        }

        self.write_collection(&path, &trees)
    }
}
