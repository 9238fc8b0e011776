//! Graph view of an ancestry tree, the input of both layout engines.
//!
//! Nodes carry the display fields of each member; links run from parent to
//! child and are resolved through the NIN back-references stored on the
//! child's record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::person::{ParentRole, Sex};
use crate::relation::Relation;

use super::AncestryTree;

// =============================================================================
// Graph Models
// =============================================================================

/// Render-ready graph of one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeGraph {
    pub nodes: Vec<TreeNode>,
    pub links: Vec<TreeLink>,
}

impl TreeGraph {
    /// Looks up a node by record identifier.
    pub fn node(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A tree member with the fields a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Record identifier, also the node key.
    pub id: String,
    pub nin: String,
    pub surname: String,
    pub given_name: String,
    pub sex: Sex,
    pub generation: u8,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_nin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_nin: Option<String>,
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeLink {
    /// Source node id (the parent for parent-child links).
    pub source: String,
    /// Target node id (the child for parent-child links).
    pub target: String,
    pub kind: LinkKind,
}

/// Kind of link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    ParentChild,
    /// Reserved for partner links; nothing produces it yet.
    Partner,
}

// =============================================================================
// Conversion
// =============================================================================

/// Converts a tree into nodes and parent-to-child links.
///
/// Every member becomes one node. A member whose father or mother NIN matches
/// another member gets one link from that member; references that do not
/// resolve inside the tree produce nothing. Duplicate links are dropped.
pub fn to_graph(tree: &AncestryTree) -> TreeGraph {
    let mut nodes = Vec::with_capacity(tree.members.len());
    let mut links = Vec::new();
    let mut seen_links: HashSet<(String, String)> = HashSet::new();

    for member in &tree.members {
        let person = &member.person;

        nodes.push(TreeNode {
            id: person.id.clone(),
            nin: person.nin.clone(),
            surname: person.surname.clone(),
            given_name: person.given_name.clone(),
            sex: person.sex,
            generation: member.generation,
            relation: member.relation,
            father_nin: person.father_ref().map(str::to_string),
            mother_nin: person.mother_ref().map(str::to_string),
        });

        for role in ParentRole::BOTH {
            let Some(nin) = person.parent_ref(role) else {
                continue;
            };
            let parent = tree
                .members
                .iter()
                .find(|m| m.person.nin == nin && m.person.id != person.id);

            if let Some(parent) = parent {
                let key = (parent.person.id.clone(), person.id.clone());
                if seen_links.insert(key) {
                    links.push(TreeLink {
                        source: parent.person.id.clone(),
                        target: person.id.clone(),
                        kind: LinkKind::ParentChild,
                    });
                }
            }
        }
    }

    TreeGraph { nodes, links }
}
