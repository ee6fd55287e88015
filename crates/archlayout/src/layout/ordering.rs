//! Crossing reduction inside layers
//!
//! Boxes in a layer are sorted by the mean cross-axis centre of their
//! neighbours in the layers the current sweep has already fixed. Centres are
//! taken from real box extents, so a tall group box pulls its neighbours the
//! way it will actually be drawn, and edges that skip layers steer the sweep
//! as well. Every sweep is followed by a transpose pass over adjacent pairs,
//! and the ordering with the fewest crossings is kept.
//!
//! Crossings are only counted between adjacent layers.

use tracing::{debug, trace};

use super::layered::LayerGraph;
use super::LayoutConfig;

/// Prefix sums over slot positions, for counting inversions
struct Accumulator {
    tree: Vec<usize>,
}

impl Accumulator {
    fn new(len: usize) -> Self {
        Self { tree: vec![0; len + 1] }
    }

    fn add(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Entries at or before `slot`
    fn count_through(&self, slot: usize) -> usize {
        let mut i = slot + 1;
        let mut total = 0;
        while i > 0 {
            total += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        total
    }
}

/// Neighbourhoods and box extents for ordering one [`LayerGraph`]
pub struct LayerOrdering<'a> {
    neighbours: Vec<Vec<usize>>,
    layer_of: &'a [usize],
    breadth: Vec<f64>,
    spacing: f64,
}

impl<'a> LayerOrdering<'a> {
    /// `layer_of` is the layer index of every box; `horizontal` selects
    /// box height (instead of width) as the cross-axis extent.
    pub fn new(graph: &LayerGraph, layer_of: &'a [usize], horizontal: bool, spacing: f64) -> Self {
        let neighbours = (0..graph.len())
            .map(|node| {
                let mut all: Vec<usize> = graph
                    .successors(node)
                    .iter()
                    .chain(graph.predecessors(node))
                    .copied()
                    .collect();
                all.sort_unstable();
                all.dedup();
                all
            })
            .collect();
        let breadth = (0..graph.len())
            .map(|node| {
                let size = graph.size(node);
                if horizontal {
                    size.height
                } else {
                    size.width
                }
            })
            .collect();

        Self {
            neighbours,
            layer_of,
            breadth,
            spacing,
        }
    }

    /// Write the cross-axis centre of every box in `layer` into `centres`,
    /// with the layer centred on zero as coordinate assignment will place it.
    pub fn place(&self, layer: &[usize], centres: &mut [f64]) {
        let boxes: f64 = layer.iter().map(|&n| self.breadth[n]).sum();
        let total = boxes + layer.len().saturating_sub(1) as f64 * self.spacing;
        let mut cursor = -total / 2.0;
        for &node in layer {
            centres[node] = cursor + self.breadth[node] / 2.0;
            cursor += self.breadth[node] + self.spacing;
        }
    }

    /// Crossings between one layer and the next.
    ///
    /// Edges run in either direction; an edge drawn both ways counts once.
    pub fn crossings_between(&self, north: &[usize], south: &[usize]) -> usize {
        let mut slot_of = vec![usize::MAX; self.neighbours.len()];
        for (slot, &node) in south.iter().enumerate() {
            slot_of[node] = slot;
        }

        let mut acc = Accumulator::new(south.len());
        let mut seen = 0;
        let mut crossings = 0;
        for &node in north {
            let slots: Vec<usize> = self.neighbours[node]
                .iter()
                .map(|&m| slot_of[m])
                .filter(|&slot| slot != usize::MAX)
                .collect();
            // Edges sharing a north endpoint never cross each other
            for &slot in &slots {
                crossings += seen - acc.count_through(slot);
            }
            for &slot in &slots {
                acc.add(slot);
                seen += 1;
            }
        }
        crossings
    }

    pub fn count_crossings(&self, layers: &[Vec<usize>]) -> usize {
        layers
            .windows(2)
            .map(|pair| self.crossings_between(&pair[0], &pair[1]))
            .sum()
    }

    /// Sort key of `node` in layer `layer`.
    fn barycenter(&self, node: usize, layer: usize, downward: bool, centres: &[f64]) -> f64 {
        let (sum, count) = self.neighbours[node]
            .iter()
            .filter(|&&m| {
                if downward {
                    self.layer_of[m] < layer
                } else {
                    self.layer_of[m] > layer
                }
            })
            .fold((0.0, 0usize), |(sum, count), &m| (sum + centres[m], count + 1));

        if count == 0 {
            centres[node]
        } else {
            sum / count as f64
        }
    }

    /// One barycenter sweep; `centres` is kept in step with `layers`.
    fn sweep(&self, layers: &mut [Vec<usize>], centres: &mut [f64], downward: bool) {
        let visit: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };

        for idx in visit {
            let mut keyed: Vec<(usize, f64)> = layers[idx]
                .iter()
                .map(|&node| (node, self.barycenter(node, idx, downward, centres)))
                .collect();
            keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
            layers[idx] = keyed.into_iter().map(|(node, _)| node).collect();
            self.place(&layers[idx], centres);
        }
    }

    fn crossings_around(&self, layers: &[Vec<usize>], idx: usize) -> usize {
        let above = match idx.checked_sub(1) {
            Some(prev) => self.crossings_between(&layers[prev], &layers[idx]),
            None => 0,
        };
        let below = match layers.get(idx + 1) {
            Some(next) => self.crossings_between(&layers[idx], next),
            None => 0,
        };
        above + below
    }

    /// Swap adjacent boxes wherever that lowers crossings.
    ///
    /// Returns whether anything moved.
    fn transpose(&self, layers: &mut [Vec<usize>]) -> bool {
        let mut moved = false;
        for idx in 0..layers.len() {
            for slot in 1..layers[idx].len() {
                let before = self.crossings_around(layers, idx);
                layers[idx].swap(slot - 1, slot);
                if self.crossings_around(layers, idx) < before {
                    moved = true;
                } else {
                    layers[idx].swap(slot - 1, slot);
                }
            }
        }
        moved
    }
}

/// Reorder every layer to reduce crossings and return the crossing count of
/// the ordering kept.
///
/// Runs `config.ordering_iterations` sweeps, alternating downward and
/// upward, each followed by transposition until it settles. Zero iterations
/// keeps the incoming order.
pub fn order_layers(
    graph: &LayerGraph,
    layer_of: &[usize],
    layers: &mut Vec<Vec<usize>>,
    config: &LayoutConfig,
) -> usize {
    let ordering = LayerOrdering::new(
        graph,
        layer_of,
        config.direction.is_horizontal(),
        config.node_spacing,
    );
    let mut best_crossings = ordering.count_crossings(layers);
    if layers.len() < 2 || config.ordering_iterations == 0 {
        return best_crossings;
    }
    let mut best_layers = layers.clone();

    let mut centres = vec![0.0; graph.len()];
    for layer in layers.iter() {
        ordering.place(layer, &mut centres);
    }

    for iteration in 0..config.ordering_iterations {
        if best_crossings == 0 {
            break;
        }
        ordering.sweep(layers, &mut centres, iteration % 2 == 0);
        while ordering.transpose(layers) {}
        for layer in layers.iter() {
            ordering.place(layer, &mut centres);
        }

        let crossings = ordering.count_crossings(layers);
        trace!(iteration, crossings, "Ordering sweep");
        if crossings < best_crossings {
            best_layers = layers.clone();
            best_crossings = crossings;
        }
    }

    debug!(crossings = best_crossings, "Layer ordering settled");
    *layers = best_layers;
    best_crossings
}
