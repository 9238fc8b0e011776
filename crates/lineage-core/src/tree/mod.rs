//! Ancestry trees: closure building, assembly and incremental merges.

mod closure;
pub mod graph;

pub use closure::{build_closure, MAX_MEMBERS};
pub use graph::{to_graph, LinkKind, TreeGraph, TreeLink, TreeNode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::person::{ParentRole, Person};
use crate::relation::Relation;

/// A person as seen from one particular tree.
///
/// The same registry record can be the father in one tree and the paternal
/// grandfather in another, so generation and relation are kept here rather
/// than on [`Person`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMember {
    pub person: Person,
    pub generation: u8,
    pub relation: Relation,
}

impl TreeMember {
    /// Annotates `person` with `relation`; the generation follows from it.
    pub fn new(person: Person, relation: Relation) -> Self {
        Self {
            generation: relation.generation(),
            person,
            relation,
        }
    }
}

/// A principal and up to three generations of their ancestors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestryTree {
    /// The generation-0 person every relation is relative to.
    pub principal: Person,
    /// All members, principal included.
    pub members: Vec<TreeMember>,
    /// When the closure was built
    pub built_at: DateTime<Utc>,
    /// When the tree was last changed
    pub updated_at: DateTime<Utc>,
}

impl AncestryTree {
    /// Identifier the tree is keyed by.
    pub fn principal_id(&self) -> &str {
        &self.principal.id
    }

    /// Finds a member by record identifier.
    pub fn member(&self, id: &str) -> Option<&TreeMember> {
        self.members.iter().find(|m| m.person.id == id)
    }

    /// Finds the member holding `relation`.
    pub fn member_by_relation(&self, relation: Relation) -> Option<&TreeMember> {
        self.members.iter().find(|m| m.relation == relation)
    }

    /// Members of one generation, in tree order.
    pub fn generation(&self, generation: u8) -> impl Iterator<Item = &TreeMember> {
        self.members.iter().filter(move |m| m.generation == generation)
    }

    /// Deepest generation present.
    pub fn depth(&self) -> u8 {
        self.members.iter().map(|m| m.generation).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Errors from tree edits.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Person {id} cannot be placed in the tree of {principal}: no free parent slot references their NIN")]
    Unplaceable { id: String, principal: String },
}

/// Builds a tree from a principal and a closure.
///
/// The principal is guaranteed to be a generation-0 member; it is added in
/// front when `members` does not contain it.
pub fn assemble(principal: Person, mut members: Vec<TreeMember>) -> AncestryTree {
    match members.iter().position(|m| m.person.id == principal.id) {
        Some(index) => members[index] = TreeMember::new(principal.clone(), Relation::Principal),
        None => members.insert(0, TreeMember::new(principal.clone(), Relation::Principal)),
    }

    let now = Utc::now();
    AncestryTree {
        principal,
        members,
        built_at: now,
        updated_at: now,
    }
}

/// Merges an edited or newly created person into a tree without rebuilding it.
///
/// A member with the same id has its record replaced in place and keeps its
/// relation. Otherwise the person is appended, with the relation derived from
/// the member that lists their NIN as father or mother. The principal
/// reference follows the edit when the principal is the one being merged.
///
/// Appending is not unconditional: a newcomer that no member references, or
/// whose derived relation is already held or lies beyond great-grandparents,
/// is rejected with [`TreeError::Unplaceable`] instead of joining the tree
/// without a relation.
///
/// Persisting the result is up to the caller.
pub fn merge_member(mut tree: AncestryTree, person: Person) -> Result<AncestryTree, TreeError> {
    match tree.members.iter().position(|m| m.person.id == person.id) {
        Some(index) => {
            let existing = &mut tree.members[index];
            debug!(id = %person.id, relation = %existing.relation, "replacing tree member");
            existing.person = person.clone();
        }
        None => {
            let relation =
                derive_relation(&tree, &person).ok_or_else(|| TreeError::Unplaceable {
                    id: person.id.clone(),
                    principal: tree.principal.id.clone(),
                })?;
            debug!(id = %person.id, %relation, "appending tree member");
            tree.members.push(TreeMember::new(person.clone(), relation));
        }
    }

    if tree.principal.id == person.id {
        tree.principal = person;
    }
    tree.updated_at = Utc::now();

    Ok(tree)
}

/// Finds the free relation slot a newcomer fills, looking at which members
/// reference their NIN.
fn derive_relation(tree: &AncestryTree, person: &Person) -> Option<Relation> {
    tree.members.iter().find_map(|child| {
        ParentRole::BOTH
            .into_iter()
            .filter(|role| child.person.parent_ref(*role) == Some(person.nin.as_str()))
            .filter_map(|role| child.relation.parent(role))
            .find(|relation| tree.member_by_relation(*relation).is_none())
    })
}
