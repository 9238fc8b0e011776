use std::sync::RwLock;

use crate::person::Person;
use crate::tree::AncestryTree;

use super::error::StorageError;
use super::{PersonStore, TreeStore};

/// In-memory storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    persons: RwLock<Vec<Person>>,
    trees: RwLock<Vec<AncestryTree>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-filled with `persons`.
    pub fn with_persons(persons: Vec<Person>) -> Self {
        Self {
            persons: RwLock::new(persons),
            trees: RwLock::new(Vec::new()),
        }
    }
}

impl PersonStore for MemoryStorage {
    fn list_persons(&self) -> Result<Vec<Person>, StorageError> {
        let persons = self.persons.read().map_err(|_| StorageError::Poisoned)?;
        Ok(persons.clone())
    }

    fn find_person(&self, id: &str) -> Result<Option<Person>, StorageError> {
        let persons = self.persons.read().map_err(|_| StorageError::Poisoned)?;
        Ok(persons.iter().find(|p| p.id == id).cloned())
    }

    fn find_person_by_nin(&self, nin: &str) -> Result<Option<Person>, StorageError> {
        let persons = self.persons.read().map_err(|_| StorageError::Poisoned)?;
        Ok(persons.iter().find(|p| p.nin == nin).cloned())
    }

    fn save_person(&self, person: &Person) -> Result<Person, StorageError> {
        let mut persons = self.persons.write().map_err(|_| StorageError::Poisoned)?;
        match persons.iter_mut().find(|p| p.id == person.id) {
            Some(existing) => *existing = person.clone(),
            None => persons.push(person.clone()),
        }
        Ok(person.clone())
    }

    fn delete_person(&self, id: &str) -> Result<(), StorageError> {
        let mut persons = self.persons.write().map_err(|_| StorageError::Poisoned)?;
        let before = persons.len();
        persons.retain(|p| p.id != id);
        if persons.len() == before {
            return Err(StorageError::PersonNotFound(id.to_string()));
        }
        Ok(())
    }
}

impl TreeStore for MemoryStorage {
    fn load_tree(&self, principal_id: &str) -> Result<Option<AncestryTree>, StorageError> {
        let trees = self.trees.read().map_err(|_| StorageError::Poisoned)?;
        Ok(trees
            .iter()
            .find(|t| t.principal_id() == principal_id)
            .cloned())
    }

    fn save_tree(&self, tree: &AncestryTree) -> Result<(), StorageError> {
        let mut trees = self.trees.write().map_err(|_| StorageError::Poisoned)?;
        match trees
            .iter_mut()
            .find(|t| t.principal_id() == tree.principal_id())
        {
            Some(existing) => *existing = tree.clone(),
            None => trees.push(tree.clone()),
        }
        Ok(())
    }

    fn list_trees(&self) -> Result<Vec<AncestryTree>, StorageError> {
        let trees = self.trees.read().map_err(|_| StorageError::Poisoned)?;
        Ok(trees.clone())
    }

    fn delete_tree(&self, principal_id: &str) -> Result<(), StorageError> {
        let mut trees = self.trees.write().map_err(|_| StorageError::Poisoned)?;
        let before = trees.len();
        trees.retain(|t| t.principal_id() != principal_id);
        if trees.len() == before {
            return Err(StorageError::TreeNotFound(principal_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{NewPerson, Sex};

    #[test]
    fn test_save_person_upserts_by_id() {
        let storage = MemoryStorage::new();
        let mut person = NewPerson::new("123456789012345", "Keita", "Amadou", Sex::Male).with_id("1");
        storage.save_person(&person).unwrap();

        person.given_name = "Amadou Junior".to_string();
        storage.save_person(&person).unwrap();

        let persons = storage.list_persons().unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].given_name, "Amadou Junior");
    }

    #[test]
    fn test_delete_missing_person() {
        let storage = MemoryStorage::new();
        let result = storage.delete_person("nope");
        assert!(matches!(result, Err(StorageError::PersonNotFound(_))));
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryStorage>();
    }
}
