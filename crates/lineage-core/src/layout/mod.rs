//! Layout engines for ancestry graphs.
//!
//! Two interchangeable strategies turn a [`TreeGraph`] into coordinates:
//! - `hierarchical`: tidy tree rooted at the principal, ancestors as children
//! - `generational`: fixed generation bands with paternal/maternal slots
//!
//! The generational layout never fails, so it doubles as the fallback when
//! the hierarchical precondition (a single generation-0 root) does not hold.

mod generational;
mod hierarchical;

pub use generational::GenerationalLayout;
pub use hierarchical::{HierarchicalLayout, PositionedTree, PositionedTreeNode};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::{LayoutConfig, DEFAULT_LAYOUT_MODE};
use crate::tree::{TreeGraph, TreeLink, TreeNode};

/// Size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }
}

impl From<&LayoutConfig> for Viewport {
    fn from(config: &LayoutConfig) -> Self {
        Self::new(config.view_width, config.view_height)
    }
}

/// A graph node with coordinates attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: TreeNode,
    pub x: f64,
    pub y: f64,
}

/// Layout output: every positioned node plus the links to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedGraph {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<TreeLink>,
}

impl PositionedGraph {
    /// Looks up a positioned node by id.
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.node.id == id)
    }
}

/// Which layout to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Hierarchical,
    Generational,
}

impl Default for LayoutMode {
    fn default() -> Self {
        DEFAULT_LAYOUT_MODE
    }
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Hierarchical => "hierarchical",
            LayoutMode::Generational => "generational",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hierarchical" | "tree" => Ok(LayoutMode::Hierarchical),
            "generational" | "generation" | "bands" => Ok(LayoutMode::Generational),
            _ => Err(LayoutError::UnknownMode(s.to_string())),
        }
    }
}

/// Errors raised by layout engines.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Graph has no nodes")]
    EmptyGraph,

    #[error("Principal not found: no node has generation 0")]
    PrincipalNotFound,

    #[error("Expected a single principal, found {0} generation-0 nodes")]
    AmbiguousPrincipal(usize),

    #[error("Root node {0} could not be resolved")]
    RootUnresolved(String),

    #[error("Unknown layout mode: {0}")]
    UnknownMode(String),
}

/// A strategy that assigns coordinates to every node of a graph.
pub trait LayoutEngine {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Computes positions for `graph` inside `viewport`.
    fn layout(&self, graph: &TreeGraph, viewport: Viewport) -> Result<PositionedGraph, LayoutError>;
}

/// Runs the requested layout, degrading to the generational one on failure.
///
/// Hierarchical failures are only logged; callers always get a position for
/// every node.
pub fn layout_with_fallback(
    graph: &TreeGraph,
    mode: LayoutMode,
    viewport: Viewport,
    config: &LayoutConfig,
) -> PositionedGraph {
    let generational = GenerationalLayout::new(config.generational.clone());

    if mode == LayoutMode::Hierarchical {
        let hierarchical = HierarchicalLayout::new(config.hierarchical.clone());
        match hierarchical.layout(graph, viewport) {
            Ok(positioned) => return positioned,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = generational.name(),
                    "hierarchical layout failed, falling back"
                );
            }
        }
    }

    generational.place(graph, viewport)
}
