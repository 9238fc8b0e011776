//! Tidy tree layout rooted at the principal.
//!
//! Links are inverted so the principal is the root and ancestors hang below
//! it as display children. Positions come from the linear-time
//! Reingold-Tilford variant (Buchheim, Jünger, Leipert): subtrees are placed
//! left to right, pushed apart along their contours, and parents are centred
//! over their children.
//!
//! Output axes: `x` runs along siblings, `y` along depth. Renderers wanting a
//! left-to-right tree swap them.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::HierarchicalConfig;
use crate::tree::{TreeGraph, TreeLink, TreeNode};

use super::{LayoutEngine, LayoutError, PositionedGraph, PositionedNode, Viewport};

// =============================================================================
// Output
// =============================================================================

/// A positioned node with its display children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedTreeNode {
    #[serde(flatten)]
    pub node: TreeNode,
    /// Distance from the root.
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub children: Vec<PositionedTreeNode>,
}

/// Hierarchical layout result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedTree {
    pub root: PositionedTreeNode,
}

impl PositionedTree {
    /// All nodes, root first, in pre-order.
    pub fn descendants(&self) -> Vec<&PositionedTreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Display links as (parent id, child id) pairs, following the tree.
    pub fn links(&self) -> Vec<(&str, &str)> {
        self.descendants()
            .into_iter()
            .flat_map(|parent| {
                parent
                    .children
                    .iter()
                    .map(move |child| (parent.node.id.as_str(), child.node.id.as_str()))
            })
            .collect()
    }

    /// Flattens into a positioned graph, keeping the graph links whose
    /// endpoints were both laid out.
    pub fn into_graph(self, links: &[TreeLink]) -> PositionedGraph {
        let mut nodes = Vec::new();
        let mut stack = vec![self.root];
        while let Some(mut node) = stack.pop() {
            let children = std::mem::take(&mut node.children);
            nodes.push(PositionedNode {
                node: node.node,
                x: node.x,
                y: node.y,
            });
            stack.extend(children.into_iter().rev());
        }

        let placed: HashSet<&str> = nodes.iter().map(|n| n.node.id.as_str()).collect();
        let links = links
            .iter()
            .filter(|l| placed.contains(l.source.as_str()) && placed.contains(l.target.as_str()))
            .cloned()
            .collect();

        PositionedGraph { nodes, links }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Tidy tree layout with a node-size envelope and parent-aware separation.
pub struct HierarchicalLayout {
    config: HierarchicalConfig,
}

impl HierarchicalLayout {
    pub fn new(config: HierarchicalConfig) -> Self {
        Self { config }
    }

    /// Lays out the graph as a tree rooted at its single generation-0 node.
    ///
    /// Nodes that cannot be reached from the root through inverted links are
    /// left out.
    pub fn layout_tree(
        &self,
        graph: &TreeGraph,
        viewport: Viewport,
    ) -> Result<PositionedTree, LayoutError> {
        if graph.nodes.is_empty() {
            return Err(LayoutError::EmptyGraph);
        }

        let principals: Vec<&TreeNode> = graph.nodes.iter().filter(|n| n.generation == 0).collect();
        let principal = match principals.as_slice() {
            [] => return Err(LayoutError::PrincipalNotFound),
            [one] => *one,
            many => return Err(LayoutError::AmbiguousPrincipal(many.len())),
        };

        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let root = *index
            .get(principal.id.as_str())
            .filter(|&&i| graph.nodes[i].generation == 0)
            .ok_or_else(|| LayoutError::RootUnresolved(principal.id.clone()))?;

        // Invert parent->child links: the older node becomes a display child.
        let mut display_children: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
        for link in &graph.links {
            let (Some(&source), Some(&target)) =
                (index.get(link.source.as_str()), index.get(link.target.as_str()))
            else {
                continue;
            };
            if graph.nodes[target].generation < graph.nodes[source].generation {
                display_children[target].push(source);
            }
        }

        let mut walk = TidyTree::build(root, &display_children, &self.config);
        walk.run();

        let mut points: Vec<(f64, f64)> = walk
            .nodes
            .iter()
            .map(|n| (n.x * self.config.node_width, n.depth as f64 * self.config.node_height))
            .collect();

        if self.config.fit_to_viewport {
            fit_into(&mut points, viewport, self.config.viewport_fraction);
        }

        debug!(
            nodes = walk.nodes.len(),
            skipped = graph.nodes.len() - walk.nodes.len(),
            "hierarchical layout computed"
        );

        Ok(PositionedTree {
            root: walk.emit(0, graph, &points),
        })
    }
}

impl LayoutEngine for HierarchicalLayout {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn layout(&self, graph: &TreeGraph, viewport: Viewport) -> Result<PositionedGraph, LayoutError> {
        Ok(self.layout_tree(graph, viewport)?.into_graph(&graph.links))
    }
}

/// Scales points down uniformly to fit `fraction` of the viewport and centres them.
fn fit_into(points: &mut [(f64, f64)], viewport: Viewport, fraction: f64) {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points.iter() {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if points.is_empty() {
        return;
    }

    let extent_x = max_x - min_x;
    let extent_y = max_y - min_y;
    let mut scale: f64 = 1.0;
    if extent_x > 0.0 {
        scale = scale.min(viewport.width * fraction / extent_x);
    }
    if extent_y > 0.0 {
        scale = scale.min(viewport.height * fraction / extent_y);
    }

    let offset_x = (viewport.width - extent_x * scale) / 2.0;
    let offset_y = (viewport.height - extent_y * scale) / 2.0;
    for point in points.iter_mut() {
        point.0 = (point.0 - min_x) * scale + offset_x;
        point.1 = (point.1 - min_y) * scale + offset_y;
    }
}

// =============================================================================
// Tidy tree internals
// =============================================================================

/// Per-node state of the two walks.
#[derive(Debug, Clone)]
struct WalkNode {
    /// Index into the source graph's nodes.
    source: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    depth: usize,
    /// Preliminary x.
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    /// Contour thread for nodes without children.
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor used while apportioning this node's children.
    default_ancestor: Option<usize>,
    x: f64,
}

struct TidyTree {
    nodes: Vec<WalkNode>,
    sibling_separation: f64,
    cousin_separation: f64,
}

impl TidyTree {
    /// Builds the walk tree breadth-first from `root`; a node reachable
    /// through several links is attached to the first one only.
    fn build(root: usize, display_children: &[Vec<usize>], config: &HierarchicalConfig) -> Self {
        let mut nodes = vec![WalkNode::new(root, None, 0, 0, 0)];
        let mut visited: HashSet<usize> = HashSet::from([root]);

        let mut i = 0;
        while i < nodes.len() {
            let source = nodes[i].source;
            let depth = nodes[i].depth;
            for &child in &display_children[source] {
                if visited.insert(child) {
                    let id = nodes.len();
                    let number = nodes[i].children.len();
                    nodes.push(WalkNode::new(child, Some(i), number, depth + 1, id));
                    nodes[i].children.push(id);
                }
            }
            i += 1;
        }

        Self {
            nodes,
            sibling_separation: config.sibling_separation,
            cousin_separation: config.cousin_separation,
        }
    }

    fn run(&mut self) {
        let mut post_order = Vec::with_capacity(self.nodes.len());
        self.collect_post_order(0, &mut post_order);
        for v in post_order {
            self.first_walk(v);
        }

        // Nodes were pushed breadth-first, so index order visits parents first.
        let root_shift = -self.nodes[0].prelim;
        for v in 0..self.nodes.len() {
            let parent_modifier = match self.nodes[v].parent {
                Some(p) => self.nodes[p].modifier,
                None => root_shift,
            };
            let node = &mut self.nodes[v];
            node.x = node.prelim + parent_modifier;
            node.modifier += parent_modifier;
        }
    }

    fn collect_post_order(&self, v: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[v].children {
            self.collect_post_order(child, out);
        }
        out.push(v);
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            self.sibling_separation
        } else {
            self.cousin_separation
        }
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        match (node.parent, node.number) {
            (Some(p), n) if n > 0 => Some(self.nodes[p].children[n - 1]),
            _ => None,
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let w = self.left_sibling(v);

        if let (Some(&first), Some(&last)) =
            (self.nodes[v].children.first(), self.nodes[v].children.last())
        {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match w {
                Some(w) => {
                    let prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].prelim = prelim;
                    self.nodes[v].modifier = prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = w {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        if let Some(p) = self.nodes[v].parent {
            let ancestor = self.nodes[p]
                .default_ancestor
                .unwrap_or(self.nodes[p].children[0]);
            let ancestor = self.apportion(v, w, ancestor);
            self.nodes[p].default_ancestor = Some(ancestor);
        }
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for &w in children.iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = (self.nodes[wp].number - self.nodes[wm].number) as f64;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    /// Pushes the subtree of `v` right until its left contour clears the
    /// right contour of the subtrees to its left.
    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let Some(parent) = self.nodes[v].parent else {
            return ancestor;
        };

        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut next_vim = self.next_right(vim);
        let mut next_vip = self.next_left(vip);

        while let (Some(nvim), Some(nvip)) = (next_vim, next_vip) {
            vim = nvim;
            vip = nvip;
            let (Some(nvom), Some(nvop)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = nvom;
            vop = nvop;
            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let moved = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(moved, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            next_vim = self.next_right(vim);
            next_vip = self.next_left(vip);
        }

        if let Some(nvim) = next_vim {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(nvim);
                self.nodes[vop].modifier += sim - sop;
            }
        }

        if let Some(nvip) = next_vip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(nvip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }

        ancestor
    }

    /// Converts walk node `v` and its subtree into output nodes.
    fn emit(&self, v: usize, graph: &TreeGraph, points: &[(f64, f64)]) -> PositionedTreeNode {
        let node = &self.nodes[v];
        PositionedTreeNode {
            node: graph.nodes[node.source].clone(),
            depth: node.depth,
            x: points[v].0,
            y: points[v].1,
            children: node
                .children
                .iter()
                .map(|&c| self.emit(c, graph, points))
                .collect(),
        }
    }
}

impl WalkNode {
    fn new(source: usize, parent: Option<usize>, number: usize, depth: usize, id: usize) -> Self {
        Self {
            source,
            parent,
            children: Vec::new(),
            number,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: id,
            default_ancestor: None,
            x: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::Sex;
    use crate::relation::Relation;
    use crate::tree::LinkKind;

    const EPS: f64 = 1e-9;

    fn node(id: usize, relation: Relation) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            nin: format!("{:015}", id),
            surname: "Keita".to_string(),
            given_name: format!("P{id}"),
            sex: if id == 1 || id % 2 == 0 { Sex::Male } else { Sex::Female },
            generation: relation.generation(),
            relation,
            father_nin: None,
            mother_nin: None,
        }
    }

    /// Ahnentafel-numbered graph: node k has parents 2k and 2k+1.
    fn pedigree(count: usize) -> TreeGraph {
        let nodes: Vec<TreeNode> = (1..=count)
            .map(|k| node(k, Relation::ALL[k - 1]))
            .collect();
        let mut links = Vec::new();
        for k in 1..=count {
            for parent in [2 * k, 2 * k + 1] {
                if parent <= count {
                    links.push(TreeLink {
                        source: parent.to_string(),
                        target: k.to_string(),
                        kind: LinkKind::ParentChild,
                    });
                }
            }
        }
        TreeGraph { nodes, links }
    }

    fn raw_layout() -> HierarchicalLayout {
        HierarchicalLayout::new(HierarchicalConfig {
            fit_to_viewport: false,
            ..HierarchicalConfig::default()
        })
    }

    fn x_of(tree: &PositionedTree, id: &str) -> f64 {
        tree.descendants()
            .into_iter()
            .find(|n| n.node.id == id)
            .map(|n| n.x)
            .unwrap()
    }

    #[test]
    fn test_empty_graph_fails() {
        let graph = TreeGraph {
            nodes: Vec::new(),
            links: Vec::new(),
        };
        let err = raw_layout()
            .layout_tree(&graph, Viewport::new(800.0, 600.0))
            .unwrap_err();
        assert_eq!(err, LayoutError::EmptyGraph);
    }

    #[test]
    fn test_requires_single_principal() {
        let mut graph = pedigree(3);
        graph.nodes[0].generation = 1;
        let err = raw_layout()
            .layout_tree(&graph, Viewport::new(800.0, 600.0))
            .unwrap_err();
        assert_eq!(err, LayoutError::PrincipalNotFound);

        let mut graph = pedigree(3);
        graph.nodes[1].generation = 0;
        let err = raw_layout()
            .layout_tree(&graph, Viewport::new(800.0, 600.0))
            .unwrap_err();
        assert_eq!(err, LayoutError::AmbiguousPrincipal(2));
    }

    #[test]
    fn test_parents_are_centred_under_root() {
        let tree = raw_layout()
            .layout_tree(&pedigree(3), Viewport::new(800.0, 600.0))
            .unwrap();

        assert!((tree.root.x).abs() < EPS);
        assert_eq!(tree.root.children.len(), 2);
        let father = &tree.root.children[0];
        let mother = &tree.root.children[1];
        assert_eq!(father.node.id, "2");
        assert!((mother.x - father.x - 2.5 * 220.0).abs() < EPS);
        assert!((father.x + mother.x).abs() < EPS);
        assert!((father.y - 300.0).abs() < EPS);
    }

    #[test]
    fn test_cousins_are_spread_wider_than_siblings() {
        let tree = raw_layout()
            .layout_tree(&pedigree(15), Viewport::new(800.0, 600.0))
            .unwrap();

        let leaves: Vec<f64> = (8..=15).map(|k| x_of(&tree, &k.to_string())).collect();
        let gaps: Vec<f64> = leaves.windows(2).map(|w| (w[1] - w[0]) / 220.0).collect();
        for (i, gap) in gaps.iter().enumerate() {
            let expected = if i % 2 == 0 { 2.5 } else { 3.5 };
            assert!((gap - expected).abs() < EPS, "gap {i} was {gap}");
        }

        // every parent sits midway over its two display children
        for k in 1..=7usize {
            let mid = (x_of(&tree, &(2 * k).to_string()) + x_of(&tree, &(2 * k + 1).to_string())) / 2.0;
            assert!((x_of(&tree, &k.to_string()) - mid).abs() < EPS);
        }
    }

    #[test]
    fn test_fits_viewport() {
        let layout = HierarchicalLayout::new(HierarchicalConfig::default());
        let viewport = Viewport::new(800.0, 600.0);
        let tree = layout.layout_tree(&pedigree(15), viewport).unwrap();

        for n in tree.descendants() {
            assert!(n.x >= 0.05 * 800.0 - EPS && n.x <= 0.95 * 800.0 + EPS);
            assert!(n.y >= 0.05 * 600.0 - EPS && n.y <= 0.95 * 600.0 + EPS);
        }
        assert_eq!(tree.descendants().len(), 15);
        assert_eq!(tree.links().len(), 14);
    }

    #[test]
    fn test_unreachable_nodes_are_left_out() {
        let mut graph = pedigree(3);
        graph.nodes.push(node(9, Relation::GreatGrandfatherPaternalMaternal));
        let positioned = raw_layout()
            .layout(&graph, Viewport::new(800.0, 600.0))
            .unwrap();
        assert_eq!(positioned.nodes.len(), 3);
        assert!(positioned.node("9").is_none());
        assert_eq!(positioned.links.len(), 2);
    }

    #[test]
    fn test_links_to_younger_nodes_are_ignored() {
        let mut graph = pedigree(3);
        // A link pointing the wrong way must not attach the principal below a parent.
        graph.links.push(TreeLink {
            source: "1".to_string(),
            target: "2".to_string(),
            kind: LinkKind::ParentChild,
        });
        let tree = raw_layout()
            .layout_tree(&graph, Viewport::new(800.0, 600.0))
            .unwrap();
        assert_eq!(tree.descendants().len(), 3);
        assert!(tree.root.children.iter().all(|c| c.children.is_empty()));
    }
}
