use thiserror::Error;
use tracing::info;

use crate::person::{validate_nin, NewPerson, Person, PersonSearchCriteria};
use crate::seed::sample_family;
use crate::storage::{PersonStore, StorageError};

/// Manages person records.
///
/// Provides validated create, update and delete on top of a [`PersonStore`],
/// enforcing the NIN format and NIN uniqueness.
pub struct PersonRegistry<S: PersonStore> {
    storage: S,
}

impl<S: PersonStore> PersonRegistry<S> {
    /// Creates a new PersonRegistry with the given storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Lists all persons.
    pub fn list(&self) -> Result<Vec<Person>, RegistryError> {
        Ok(self.storage.list_persons()?)
    }

    /// Gets a person by ID.
    pub fn get(&self, id: &str) -> Result<Person, RegistryError> {
        self.storage
            .find_person(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Gets a person by NIN.
    pub fn get_by_nin(&self, nin: &str) -> Result<Person, RegistryError> {
        self.storage
            .find_person_by_nin(nin)?
            .ok_or_else(|| RegistryError::NinNotFound(nin.to_string()))
    }

    /// Creates a person with a fresh identifier and persists it.
    pub fn create(&self, new: NewPerson) -> Result<Person, RegistryError> {
        self.check_nin(&new.nin, None)?;

        let person = self.storage.save_person(&new.into_person())?;
        info!(id = %person.id, nin = %person.nin, "person created");
        Ok(person)
    }

    /// Replaces an existing person.
    ///
    /// Trees that already contain the person are not touched; callers merge
    /// or rebuild them.
    pub fn update(&self, person: Person) -> Result<Person, RegistryError> {
        self.get(&person.id)?;
        self.check_nin(&person.nin, Some(&person.id))?;

        let person = self.storage.save_person(&person)?;
        info!(id = %person.id, "person updated");
        Ok(person)
    }

    /// Deletes a person by ID.
    pub fn delete(&self, id: &str) -> Result<(), RegistryError> {
        self.get(id)?;
        self.storage.delete_person(id)?;
        info!(id, "person deleted");
        Ok(())
    }

    /// Returns persons matching every set criterion; empty criteria match all.
    pub fn search(&self, criteria: &PersonSearchCriteria) -> Result<Vec<Person>, RegistryError> {
        let persons = self.storage.list_persons()?;
        if criteria.is_empty() {
            return Ok(persons);
        }
        Ok(persons.into_iter().filter(|p| criteria.matches(p)).collect())
    }

    /// Loads the sample family when the registry holds nobody.
    ///
    /// Returns the number of persons inserted.
    pub fn seed_if_empty(&self) -> Result<usize, RegistryError> {
        if !self.storage.list_persons()?.is_empty() {
            return Ok(0);
        }

        let family = sample_family();
        for person in &family {
            self.storage.save_person(person)?;
        }
        info!(count = family.len(), "registry seeded with sample family");
        Ok(family.len())
    }

    /// Validates the format of `nin` and that no other record holds it.
    fn check_nin(&self, nin: &str, own_id: Option<&str>) -> Result<(), RegistryError> {
        if !validate_nin(nin) {
            return Err(RegistryError::InvalidNin(nin.to_string()));
        }
        match self.storage.find_person_by_nin(nin)? {
            Some(holder) if Some(holder.id.as_str()) != own_id => {
                Err(RegistryError::DuplicateNin(nin.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Errors that can occur in PersonRegistry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Person not found: {0}")]
    NotFound(String),

    #[error("No person with NIN {0}")]
    NinNotFound(String),

    #[error("Invalid NIN '{0}': expected exactly 15 digits")]
    InvalidNin(String),

    #[error("NIN {0} is already registered")]
    DuplicateNin(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RegistryError {
    /// Returns true for errors caused by caller input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::InvalidNin(_) | RegistryError::DuplicateNin(_))
    }

    /// Returns true when the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound(_)
                | RegistryError::NinNotFound(_)
                | RegistryError::Storage(StorageError::PersonNotFound(_))
        )
    }
}
