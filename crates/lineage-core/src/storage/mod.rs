mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::person::Person;
use crate::tree::AncestryTree;

/// Trait for person record backends.
///
/// Implementations own the registry collection; validation happens in
/// [`crate::registry::PersonRegistry`], not here.
pub trait PersonStore {
    /// Lists all persons in insertion order.
    fn list_persons(&self) -> Result<Vec<Person>, StorageError>;

    /// Loads a person by ID.
    fn find_person(&self, id: &str) -> Result<Option<Person>, StorageError>;

    /// Loads the first person holding `nin`.
    fn find_person_by_nin(&self, nin: &str) -> Result<Option<Person>, StorageError>;

    /// Inserts or replaces a person, keyed by ID.
    fn save_person(&self, person: &Person) -> Result<Person, StorageError>;

    /// Deletes a person by ID.
    fn delete_person(&self, id: &str) -> Result<(), StorageError>;
}

/// Trait for ancestry tree backends, keyed by principal ID.
pub trait TreeStore {
    /// Loads the tree built for `principal_id`, if any.
    fn load_tree(&self, principal_id: &str) -> Result<Option<AncestryTree>, StorageError>;

    /// Inserts or replaces a tree.
    fn save_tree(&self, tree: &AncestryTree) -> Result<(), StorageError>;

    /// Lists all stored trees.
    fn list_trees(&self) -> Result<Vec<AncestryTree>, StorageError>;

    /// Deletes the tree built for `principal_id`.
    fn delete_tree(&self, principal_id: &str) -> Result<(), StorageError>;
}
