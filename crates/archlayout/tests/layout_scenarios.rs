//! End-to-end layout and anchor scenarios

use archlayout::anchors::{assign_anchors, classify};
use archlayout::core::{ArchitectureGraph, EdgeData, LayoutEngine, Point, Side, Size};
use archlayout::layout::{LayeredLayout, LayoutConfig, LayoutResult};
use archlayout::layout_graph;

fn anchored(graph: &ArchitectureGraph) -> (LayoutResult, Vec<EdgeData>) {
    let layout = LayeredLayout::new().layout(graph).unwrap();
    let mut edges: Vec<EdgeData> = graph.edges().cloned().collect();
    assign_anchors(&layout, &mut edges);
    (layout, edges)
}

#[test]
fn test_two_nodes_one_edge() {
    let mut graph = ArchitectureGraph::new();
    graph.add_simple_node("A", "A").unwrap();
    graph.add_simple_node("B", "B").unwrap();
    graph.add_simple_edge("A", "B").unwrap();

    let (layout, edges) = anchored(&graph);
    let a = layout.position("A").unwrap();
    let b = layout.position("B").unwrap();
    let config = LayoutConfig::default();

    assert!(b.x - a.x >= config.layer_spacing);
    assert!(b.x >= a.x + config.node_width + config.layer_spacing);
    assert_eq!(a.y, b.y);

    let anchors = edges[0].anchors.unwrap();
    assert_eq!(anchors.source, Side::Right);
    assert_eq!(anchors.target, Side::Left);
}

#[test]
fn test_fan_out_shares_a_layer() {
    let mut graph = ArchitectureGraph::new();
    for id in ["A", "B", "C"] {
        graph.add_simple_node(id, id).unwrap();
    }
    graph.add_simple_edge("A", "B").unwrap();
    graph.add_simple_edge("A", "C").unwrap();

    let (layout, _) = anchored(&graph);
    let a = layout.position("A").unwrap();
    let b = layout.position("B").unwrap();
    let c = layout.position("C").unwrap();
    let config = LayoutConfig::default();

    assert_eq!(b.x, c.x);
    assert!(b.x > a.x);
    let gap = (c.y - b.y).abs() - config.node_height;
    assert!(gap >= config.node_spacing, "gap {} below node spacing", gap);
}

#[test]
fn test_cross_group_edge() {
    let mut graph = ArchitectureGraph::new();
    graph.add_simple_group("G").unwrap();
    graph.add_simple_group("H").unwrap();
    graph.add_grouped_node("X", "X", "G").unwrap();
    graph.add_grouped_node("Y", "Y", "G").unwrap();
    graph.add_grouped_node("Z", "Z", "H").unwrap();
    graph.add_simple_edge("X", "Y").unwrap();
    graph.add_simple_edge("Y", "Z").unwrap();

    let (layout, edges) = anchored(&graph);
    let g = layout.group_box("G").unwrap();
    let h = layout.group_box("H").unwrap();

    assert!(g.right() <= h.x, "G should precede H along the flow");
    assert!(g.contains(&layout.node_rect("X").unwrap()));
    assert!(g.contains(&layout.node_rect("Y").unwrap()));
    assert!(h.contains(&layout.node_rect("Z").unwrap()));

    let cross = edges.iter().find(|e| e.id == "Y->Z").unwrap();
    let anchors = cross.anchors.unwrap();
    assert_eq!(anchors.source, Side::Right);
    assert_eq!(anchors.target, Side::Left);
}

#[test]
fn test_ghost_endpoint() {
    let mut graph = ArchitectureGraph::new();
    graph.add_simple_node("A", "A").unwrap();
    graph.add_simple_node("B", "B").unwrap();
    graph.add_simple_edge("A", "B").unwrap();
    graph.add_simple_edge("A", "ghost").unwrap();

    let diagram = layout_graph(&graph, LayoutConfig::default()).unwrap();
    assert_eq!(diagram.layout.node_positions.len(), 2);
    assert!(diagram.layout.position("ghost").is_none());

    let ghost_edge = diagram.edge("A->ghost").unwrap();
    assert!(ghost_edge.source_handle.is_none());
    assert!(ghost_edge.target_handle.is_none());
    assert!(!diagram.handles.contains("ghost"));

    // A keeps only the handle used by the resolved edge
    let a = diagram.handles.used_handles("A");
    assert_eq!(a.outgoing.len(), 1);
    assert!(a.outgoing.contains(Side::Right));
}

#[test]
fn test_exact_diagonal_is_horizontal() {
    let mut layout = LayoutResult::empty(Size::new(200.0, 150.0));
    layout.node_positions.insert("A".to_string(), Point::new(0.0, 0.0));
    layout
        .node_positions
        .insert("B".to_string(), Point::new(250.0, 250.0));
    layout
        .node_positions
        .insert("C".to_string(), Point::new(-100.0, -100.0));
    let edges = vec![EdgeData::new("ab", "A", "B"), EdgeData::new("ac", "A", "C")];

    for _ in 0..5 {
        let mut run = edges.clone();
        assign_anchors(&layout, &mut run);
        assert_eq!(run[0].anchors.unwrap().source, Side::Right);
        assert_eq!(run[0].anchors.unwrap().target, Side::Left);
        assert_eq!(run[1].anchors.unwrap().source, Side::Left);
        assert_eq!(run[1].anchors.unwrap().target, Side::Right);
    }
    assert_eq!(classify(-3.0, 3.0).source, Side::Left);
}

#[test]
fn test_layout_is_reproducible() {
    let mut graph = ArchitectureGraph::new();
    graph.add_simple_group("edge").unwrap();
    graph.add_simple_group("data").unwrap();
    graph.add_grouped_node("cdn", "CDN", "edge").unwrap();
    graph.add_grouped_node("alb", "ALB", "edge").unwrap();
    graph.add_simple_node("api", "API").unwrap();
    graph.add_grouped_node("db", "DB", "data").unwrap();
    graph.add_grouped_node("cache", "Cache", "data").unwrap();
    for (s, t) in [("cdn", "alb"), ("alb", "api"), ("api", "db"), ("api", "cache"), ("cache", "db")] {
        graph.add_simple_edge(s, t).unwrap();
    }

    let first = layout_graph(&graph, LayoutConfig::default()).unwrap();
    let second = layout_graph(&graph, LayoutConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bidirectional_edges_are_distinct() {
    let mut graph = ArchitectureGraph::new();
    graph.add_simple_node("A", "A").unwrap();
    graph.add_simple_node("B", "B").unwrap();
    graph.add_simple_edge("A", "B").unwrap();
    graph.add_simple_edge("B", "A").unwrap();

    let (layout, edges) = anchored(&graph);
    assert_eq!(layout.node_positions.len(), 2);
    let forward = edges[0].anchors.unwrap();
    let backward = edges[1].anchors.unwrap();
    assert_eq!(forward.source, Side::Right);
    assert_eq!(backward.source, Side::Left);
}

#[test]
fn test_edge_leaving_a_cycle_runs_forward() {
    // cache is inserted first but only reached from the api <-> db cycle
    let mut graph = ArchitectureGraph::new();
    for id in ["cache", "api", "db"] {
        graph.add_simple_node(id, id).unwrap();
    }
    graph.add_simple_edge("api", "db").unwrap();
    graph.add_simple_edge("db", "api").unwrap();
    graph.add_simple_edge("db", "cache").unwrap();

    let (layout, edges) = anchored(&graph);
    let api = layout.position("api").unwrap();
    let db = layout.position("db").unwrap();
    let cache = layout.position("cache").unwrap();
    assert!(api.x < db.x);
    assert!(db.x < cache.x, "db at {} should precede cache at {}", db.x, cache.x);

    let out = edges.iter().find(|e| e.id == "db->cache").unwrap();
    assert_eq!(out.anchors.unwrap().source, Side::Right);
    assert_eq!(out.anchors.unwrap().target, Side::Left);
}
