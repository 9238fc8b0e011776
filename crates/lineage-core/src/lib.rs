//! Ancestry tree construction and layout.
//!
//! A registry of persons linked by father/mother NINs is turned into
//! four-generation ancestry trees, cached per principal, converted into
//! graphs and positioned by one of two layout engines.

pub mod cache;
pub mod config;
pub mod layout;
pub mod person;
pub mod registry;
pub mod relation;
pub mod seed;
pub mod storage;
pub mod tree;

pub use cache::{CacheError, TreeCache};
pub use config::Config;
pub use layout::{
    layout_with_fallback, GenerationalLayout, HierarchicalLayout, LayoutEngine, LayoutError,
    LayoutMode, PositionedGraph, PositionedNode, Viewport,
};
pub use person::{NewPerson, Person, PersonSearchCriteria, Sex};
pub use registry::{PersonRegistry, RegistryError};
pub use relation::{Relation, Side};
pub use storage::{FileStorage, MemoryStorage, PersonStore, StorageError, TreeStore};
pub use tree::{merge_member, to_graph, AncestryTree, TreeError, TreeGraph, TreeMember};
