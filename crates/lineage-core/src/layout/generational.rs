//! Generation-banded layout.
//!
//! Each generation gets a horizontal band, principal at the bottom. Inside a
//! band, ancestors take fixed slots keyed by their relation so both parents
//! of any ancestor sit next to each other. Nodes that do not fit a slot are
//! still placed on their lineage side, so every node gets a position.

use std::collections::HashMap;

use tracing::debug;

use crate::config::GenerationalConfig;
use crate::person::Sex;
use crate::relation::{Relation, Side};
use crate::tree::{TreeGraph, TreeNode};

use super::{LayoutEngine, LayoutError, PositionedGraph, PositionedNode, Viewport};

/// Fixed-slot layout by generation band.
pub struct GenerationalLayout {
    config: GenerationalConfig,
}

/// Why a node claims a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    /// Relation matches the slot exactly.
    Labelled,
    /// Parent slot picked from the node's sex; only taken when free.
    BySex,
}

impl GenerationalLayout {
    pub fn new(config: GenerationalConfig) -> Self {
        Self { config }
    }

    /// Positions every node of `graph`. Output order follows input order.
    pub fn place(&self, graph: &TreeGraph, viewport: Viewport) -> PositionedGraph {
        let max_generation = graph.nodes.iter().map(|n| n.generation).max().unwrap_or(0);
        let spacing = self.band_spacing(max_generation, viewport.height);
        let band_y = |generation: u8| viewport.height - spacing * (f64::from(generation) + 0.5);

        // (generation, slot) -> index of the node holding it
        let mut taken: HashMap<(u8, usize), usize> = HashMap::new();
        let mut slot_of: Vec<Option<usize>> = vec![None; graph.nodes.len()];

        for (i, node) in graph.nodes.iter().enumerate() {
            let Some((slot, claim)) = slot_claim(node) else {
                continue;
            };
            let key = (node.generation, slot);
            match (taken.get(&key).copied(), claim) {
                (Some(_), Claim::BySex) => continue,
                (Some(previous), Claim::Labelled) => {
                    debug!(
                        slot,
                        generation = node.generation,
                        displaced = %graph.nodes[previous].id,
                        by = %node.id,
                        "generational slot collision"
                    );
                    slot_of[previous] = None;
                }
                (None, _) => {}
            }
            taken.insert(key, i);
            slot_of[i] = Some(slot);
        }

        let nodes = graph
            .nodes
            .iter()
            .zip(slot_of)
            .map(|(node, slot)| {
                let x = match slot {
                    Some(slot) => self.slot_x(node.generation, slot, viewport.width),
                    None => self.fallback_x(node, viewport),
                };
                PositionedNode {
                    node: node.clone(),
                    x,
                    y: band_y(node.generation),
                }
            })
            .collect();

        PositionedGraph {
            nodes,
            links: graph.links.clone(),
        }
    }

    /// Vertical distance between two bands.
    ///
    /// The widened spacing is capped so all bands stay within
    /// `band_height_fraction` of the height, measured from the bottom.
    fn band_spacing(&self, max_generation: u8, height: f64) -> f64 {
        let bands = f64::from(max_generation) + 1.0;
        let available = height * self.config.band_height_fraction;
        let widened = available / bands * self.config.band_spacing_factor;
        widened.min(available / bands)
    }

    fn slot_x(&self, generation: u8, slot: usize, width: f64) -> f64 {
        let fraction = match generation {
            0 => 0.5,
            1 if slot == 0 => 0.5 - self.config.parent_offset,
            1 => 0.5 + self.config.parent_offset,
            2 => self.config.grandparent_slots[slot],
            _ => self.config.great_grandparent_slots[slot],
        };
        fraction * width
    }

    fn fallback_x(&self, node: &TreeNode, viewport: Viewport) -> f64 {
        let center = viewport.center_x();
        let offset = self.config.fallback_side_offset * viewport.width;
        match node.relation.side() {
            Some(Side::Paternal) => center - offset,
            Some(Side::Maternal) => center + offset,
            None => center,
        }
    }
}

impl LayoutEngine for GenerationalLayout {
    fn name(&self) -> &'static str {
        "generational"
    }

    fn layout(&self, graph: &TreeGraph, viewport: Viewport) -> Result<PositionedGraph, LayoutError> {
        Ok(self.place(graph, viewport))
    }
}

/// The slot a node asks for, if any.
fn slot_claim(node: &TreeNode) -> Option<(usize, Claim)> {
    match node.generation {
        0 if node.relation == Relation::Principal => Some((0, Claim::Labelled)),
        1 => match node.relation {
            Relation::Father | Relation::Mother => Some((node.relation.slot(), Claim::Labelled)),
            _ => {
                let slot = match node.sex {
                    Sex::Male => 0,
                    Sex::Female => 1,
                };
                Some((slot, Claim::BySex))
            }
        },
        2 | 3 if node.relation.generation() == node.generation => {
            Some((node.relation.slot(), Claim::Labelled))
        }
        _ => None,
    }
}
