use lineage_core::config::{GenerationalConfig, HierarchicalConfig, LayoutConfig};
use lineage_core::seed::sample_family;
use lineage_core::tree::{assemble, build_closure, to_graph, TreeGraph};
use lineage_core::{
    layout_with_fallback, GenerationalLayout, HierarchicalLayout, LayoutEngine, LayoutError,
    LayoutMode, Viewport,
};

fn sample_graph(principal_id: &str) -> TreeGraph {
    let family = sample_family();
    let principal = family.iter().find(|p| p.id == principal_id).unwrap().clone();
    let tree = assemble(principal.clone(), build_closure(&principal, &family));
    to_graph(&tree)
}

#[test]
fn test_generational_totality() {
    let layout = GenerationalLayout::new(GenerationalConfig::default());
    for id in ["1", "2", "3", "4", "8"] {
        let graph = sample_graph(id);
        let positioned = layout.place(&graph, Viewport::new(1200.0, 800.0));
        assert_eq!(positioned.nodes.len(), graph.nodes.len());
    }
}

#[test]
fn test_generational_bands_stay_in_viewport() {
    let layout = GenerationalLayout::new(GenerationalConfig::default());
    let graph = sample_graph("1");
    assert_eq!(graph.nodes.iter().map(|n| n.generation).max(), Some(3));

    for (width, height) in [(1200.0, 800.0), (800.0, 400.0), (1920.0, 1080.0)] {
        let positioned = layout.place(&graph, Viewport::new(width, height));
        for node in &positioned.nodes {
            assert!(
                node.y >= 0.0 && node.y <= height,
                "{} at y = {} outside 0..={}",
                node.node.id,
                node.y,
                height
            );
            assert!(node.x >= 0.0 && node.x <= width);
        }
    }

    // principal nearest the bottom, each older generation above
    let positioned = layout.place(&graph, Viewport::new(1200.0, 800.0));
    let y = |id: &str| positioned.node(id).unwrap().y;
    assert!(y("1") > y("2") && y("2") > y("4") && y("4") > y("8"));
    assert!(y("1") > 400.0);
}

#[test]
fn test_generational_keeps_couples_together() {
    let layout = GenerationalLayout::new(GenerationalConfig::default());
    let positioned = layout.place(&sample_graph("1"), Viewport::new(1600.0, 800.0));

    // father's parents sit left of mother's parents
    let x = |id: &str| positioned.node(id).unwrap().x;
    assert!(x("4") < x("5") && x("5") < x("6") && x("6") < x("7"));
    assert!(x("2") < x("1") && x("1") < x("3"));
    let great: Vec<f64> = (8..=15).map(|k| x(&k.to_string())).collect();
    assert!(great.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_hierarchical_sample_tree() {
    let layout = HierarchicalLayout::new(HierarchicalConfig::default());
    let viewport = Viewport::new(1200.0, 800.0);
    let tree = layout.layout_tree(&sample_graph("1"), viewport).unwrap();

    assert_eq!(tree.root.node.id, "1");
    assert_eq!(tree.root.depth, 0);
    assert_eq!(tree.descendants().len(), 15);
    let depths: Vec<usize> = tree.descendants().iter().map(|n| n.depth).collect();
    assert_eq!(depths.iter().max(), Some(&3));

    let positioned = layout.layout(&sample_graph("1"), viewport).unwrap();
    assert_eq!(positioned.nodes.len(), 15);
    assert_eq!(positioned.links.len(), 14);
}

#[test]
fn test_hierarchical_rejects_empty_graph() {
    let layout = HierarchicalLayout::new(HierarchicalConfig::default());
    let graph = TreeGraph {
        nodes: Vec::new(),
        links: Vec::new(),
    };
    assert_eq!(
        layout.layout_tree(&graph, Viewport::new(100.0, 100.0)).unwrap_err(),
        LayoutError::EmptyGraph
    );
}

#[test]
fn test_fallback_keeps_every_node() {
    let mut graph = sample_graph("1");
    // a second principal breaks the hierarchical precondition
    graph.nodes[1].generation = 0;

    let positioned = layout_with_fallback(
        &graph,
        LayoutMode::Hierarchical,
        Viewport::new(1200.0, 800.0),
        &LayoutConfig::default(),
    );
    assert_eq!(positioned.nodes.len(), graph.nodes.len());
}

#[test]
fn test_engines_share_trait() {
    let engines: Vec<Box<dyn LayoutEngine>> = vec![
        Box::new(HierarchicalLayout::new(HierarchicalConfig::default())),
        Box::new(GenerationalLayout::new(GenerationalConfig::default())),
    ];
    let graph = sample_graph("2");
    for engine in engines {
        let positioned = engine.layout(&graph, Viewport::new(1200.0, 800.0)).unwrap();
        assert_eq!(positioned.nodes.len(), 7, "{}", engine.name());
    }
}
