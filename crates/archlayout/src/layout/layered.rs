//! Flat layered layout
//!
//! Places a set of boxes connected by directed edges in a Sugiyama-style
//! layering: cycles cut inside their strongly connected components, layer
//! assignment by longest path, barycenter ordering within layers, then coordinate assignment with fixed spacing. Boxes are
//! addressed by index; callers map their own IDs onto indices.

use std::collections::VecDeque;
use tracing::{debug, span, trace, Level};

use super::ordering::order_layers;
use super::LayoutConfig;
use crate::core::{Point, Size};

/// A directed graph of sized boxes, addressed by index
#[derive(Debug, Clone, Default)]
pub struct LayerGraph {
    sizes: Vec<Size>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl LayerGraph {
    pub fn new(sizes: Vec<Size>) -> Self {
        let n = sizes.len();
        Self {
            sizes,
            successors: vec![Vec::new(); n],
            predecessors: vec![Vec::new(); n],
        }
    }

    /// A graph of `count` boxes of the same size
    pub fn uniform(count: usize, size: Size) -> Self {
        Self::new(vec![size; count])
    }

    /// Add `from -> to`.
    ///
    /// Self loops, out-of-range indices and repeated edges are ignored:
    /// none of them change the layering.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.len() || to >= self.len() {
            return false;
        }
        if self.successors[from].contains(&to) {
            return false;
        }
        self.successors[from].push(to);
        self.predecessors[to].push(from);
        true
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn size(&self, node: usize) -> Size {
        self.sizes[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}

/// Strongly connected component of every box (iterative Tarjan).
///
/// Components are numbered in the order Tarjan closes them, which is a
/// reverse topological order of the condensation.
pub fn strongly_connected(graph: &LayerGraph) -> Vec<usize> {
    const UNSEEN: usize = usize::MAX;
    let n = graph.len();
    let mut index = vec![UNSEEN; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut component = vec![UNSEEN; n];
    let mut next_index = 0;
    let mut next_component = 0;

    for root in 0..n {
        if index[root] != UNSEEN {
            continue;
        }
        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        // (box, next successor slot to visit)
        let mut frames = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            if let Some(&succ) = graph.successors(node).get(frame.1) {
                frame.1 += 1;
                if index[succ] == UNSEEN {
                    index[succ] = next_index;
                    low[succ] = next_index;
                    next_index += 1;
                    stack.push(succ);
                    on_stack[succ] = true;
                    frames.push((succ, 0));
                } else if on_stack[succ] {
                    low[node] = low[node].min(index[succ]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[node]);
            }
            if low[node] == index[node] {
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component[member] = next_component;
                    if member == node {
                        break;
                    }
                }
                next_component += 1;
            }
        }
    }

    component
}

/// Edges that drive layering, as successor lists.
///
/// Edges between different strongly connected components are all kept.
/// Inside a component only edges from a lower to a higher index survive, so
/// each cycle is cut at its back edges and the kept edges form a DAG.
pub fn layering_edges(graph: &LayerGraph) -> Vec<Vec<usize>> {
    let component = strongly_connected(graph);
    (0..graph.len())
        .map(|node| {
            graph
                .successors(node)
                .iter()
                .copied()
                .filter(|&succ| {
                    let kept = component[node] != component[succ] || node < succ;
                    if !kept {
                        debug!(from = node, to = succ, "Dropping back edge inside cycle");
                    }
                    kept
                })
                .collect()
        })
        .collect()
}

/// Processing order for layering: Kahn's algorithm over [`layering_edges`],
/// seeded in index order.
pub fn topological_order(graph: &LayerGraph) -> Vec<usize> {
    topological_order_of(&layering_edges(graph))
}

fn topological_order_of(successors: &[Vec<usize>]) -> Vec<usize> {
    let n = successors.len();
    let mut in_degree = vec![0usize; n];
    for succ in successors.iter().flatten() {
        in_degree[*succ] += 1;
    }
    let mut order = Vec::with_capacity(n);
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &succ in &successors[node] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                queue.push_back(succ);
            }
        }
    }

    order
}

/// Layer index of every box.
///
/// Layer = 1 + the deepest layering predecessor, so every edge that is not
/// part of a cycle points to a strictly deeper layer and the number of
/// layers equals the longest kept path.
pub fn assign_layers(graph: &LayerGraph) -> Vec<usize> {
    let successors = layering_edges(graph);
    let order = topological_order_of(&successors);

    let mut layers = vec![0; graph.len()];
    for &node in &order {
        let layer = layers[node];
        trace!(node, layer, "Assigned layer");
        for &succ in &successors[node] {
            layers[succ] = layers[succ].max(layer + 1);
        }
    }
    layers
}

/// Bucket boxes by layer, keeping index order inside each layer
pub fn group_by_layer(layers: &[usize]) -> Vec<Vec<usize>> {
    let layer_count = layers.iter().max().map_or(0, |&max| max + 1);
    let mut buckets = vec![Vec::new(); layer_count];
    for (node, &layer) in layers.iter().enumerate() {
        buckets[layer].push(node);
    }
    buckets
}

/// Top-left position of every box, indexed like the graph.
///
/// Layers advance along the flow axis of `config.direction`, separated by
/// `layer_spacing` past the thickest box of the previous layer. Inside a
/// layer boxes are stacked on the cross axis with `node_spacing` gaps, and
/// each layer is centred against the longest one.
pub fn layered_positions(graph: &LayerGraph, config: &LayoutConfig) -> Vec<Point> {
    let layout_span = span!(
        Level::DEBUG,
        "layered_positions",
        box_count = graph.len(),
        edge_count = graph.edge_count(),
        direction = %config.direction
    );
    let _enter = layout_span.enter();

    if graph.is_empty() {
        return Vec::new();
    }

    let layers = assign_layers(graph);
    let mut layer_nodes = group_by_layer(&layers);
    debug!(layer_count = layer_nodes.len(), "Assigned layers");

    let crossings = order_layers(graph, &layers, &mut layer_nodes, config);
    debug!(crossings, "Ordered layers");

    let horizontal = config.direction.is_horizontal();
    // (along flow axis, along cross axis)
    let extent = |node: usize| {
        let size = graph.size(node);
        if horizontal {
            (size.width, size.height)
        } else {
            (size.height, size.width)
        }
    };

    let thickness: Vec<f64> = layer_nodes
        .iter()
        .map(|layer| layer.iter().map(|&n| extent(n).0).fold(0.0, f64::max))
        .collect();
    let breadth: Vec<f64> = layer_nodes
        .iter()
        .map(|layer| {
            let boxes: f64 = layer.iter().map(|&n| extent(n).1).sum();
            boxes + layer.len().saturating_sub(1) as f64 * config.node_spacing
        })
        .collect();
    let max_breadth = breadth.iter().copied().fold(0.0, f64::max);

    let visit: Vec<usize> = if config.direction.is_reversed() {
        (0..layer_nodes.len()).rev().collect()
    } else {
        (0..layer_nodes.len()).collect()
    };

    let mut positions = vec![Point::default(); graph.len()];
    let mut flow = 0.0;
    for layer_idx in visit {
        let layer = &layer_nodes[layer_idx];
        let mut cross = (max_breadth - breadth[layer_idx]) / 2.0;

        for &node in layer {
            let (along, across) = extent(node);
            let flow_pos = flow + (thickness[layer_idx] - along) / 2.0;
            positions[node] = if horizontal {
                Point::new(flow_pos, cross)
            } else {
                Point::new(cross, flow_pos)
            };
            trace!(node, layer = layer_idx, x = positions[node].x, y = positions[node].y, "Positioned box");
            cross += across + config.node_spacing;
        }

        flow += thickness[layer_idx] + config.layer_spacing;
    }

    positions
}
