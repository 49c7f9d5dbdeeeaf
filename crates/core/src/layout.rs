//! Automatic graph layout for the family-tree canvas.
//!
//! [`compute_layout`] is a pure, deterministic function from (nodes, edges)
//! to per-node 2D positions. It lays the graph out top-down in layers:
//! hierarchical edges (parent-child and the other non-lateral types) place
//! the child one layer below the parent, while lateral edges (spouse,
//! sibling, ...) pull their endpoints onto the same layer.
//!
//! Layout must never fail the caller: graphs the layering cannot handle
//! (hierarchical cycles, non-converging lateral constraints) degrade to a
//! deterministic grid. Callers persist the result as one atomic position
//! batch; unlaid-out nodes get [`placeholder_position`] for first render
//! only, which is never persisted.

use std::collections::HashMap;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default node box width in pixels.
pub const DEFAULT_NODE_WIDTH: f64 = 160.0;

/// Default node box height in pixels.
pub const DEFAULT_NODE_HEIGHT: f64 = 120.0;

/// Horizontal spacing between nodes in the same layer.
pub const DEFAULT_NODE_SPACING: f64 = 80.0;

/// Vertical spacing between layers.
pub const DEFAULT_LAYER_SPACING: f64 = 100.0;

/// Grid-fallback cell width.
const GRID_CELL_WIDTH: f64 = 180.0;

/// Grid-fallback cell height.
const GRID_CELL_HEIGHT: f64 = 140.0;

/// Grid-fallback padding between cells.
const GRID_PADDING: f64 = 40.0;

/// Horizontal offset between placeholder positions for unlaid-out nodes.
pub const PLACEHOLDER_X_STEP: f64 = 200.0;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// A node to lay out. Each member is treated as a fixed-size box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    pub id: DbId,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    /// A node with the default box size.
    pub fn sized_default(id: DbId) -> Self {
        LayoutNode {
            id,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
        }
    }
}

/// An edge between two laid-out nodes.
///
/// `lateral` edges keep their endpoints on one layer; hierarchical edges
/// place `to` below `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub from: DbId,
    pub to: DbId,
    pub lateral: bool,
}

/// Spacing configuration for the layered layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub node_spacing: f64,
    pub layer_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            node_spacing: DEFAULT_NODE_SPACING,
            layer_spacing: DEFAULT_LAYER_SPACING,
        }
    }
}

/// A computed 2D position (top-left corner of the node box).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Layout entry points
// ---------------------------------------------------------------------------

/// Deterministic placeholder for a node with no stored position, used for
/// first render only: nodes fan out horizontally at y = 0.
pub fn placeholder_position(index: usize) -> Point {
    Point {
        x: index as f64 * PLACEHOLDER_X_STEP,
        y: 0.0,
    }
}

/// Compute positions for every node.
///
/// Identical input always yields identical output. Inputs are borrowed and
/// never mutated. Edges referencing unknown node ids are ignored.
pub fn compute_layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    options: &LayoutOptions,
) -> HashMap<DbId, Point> {
    if nodes.is_empty() {
        return HashMap::new();
    }

    match layered_layout(nodes, edges, options) {
        Some(positions) => positions,
        None => grid_layout(nodes),
    }
}

/// Square-grid fallback layout, deterministic in node-id order.
pub fn grid_layout(nodes: &[LayoutNode]) -> HashMap<DbId, Point> {
    let mut ids: Vec<DbId> = nodes.iter().map(|n| n.id).collect();
    ids.sort_unstable();
    ids.dedup();

    let columns = (ids.len() as f64).sqrt().ceil().max(1.0) as usize;

    ids.iter()
        .enumerate()
        .map(|(index, &id)| {
            let row = index / columns;
            let col = index % columns;
            (
                id,
                Point {
                    x: col as f64 * (GRID_CELL_WIDTH + GRID_PADDING),
                    y: row as f64 * (GRID_CELL_HEIGHT + GRID_PADDING),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layered layout
// ---------------------------------------------------------------------------

/// Returns `None` when the graph cannot be layered (hierarchical cycle or
/// lateral constraints that fail to converge); the caller falls back to the
/// grid.
fn layered_layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    options: &LayoutOptions,
) -> Option<HashMap<DbId, Point>> {
    let index_of: HashMap<DbId, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    let n = nodes.len();

    // Hierarchical adjacency (from -> to), ignoring edges with unknown ids.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree: Vec<usize> = vec![0; n];
    let mut lateral_pairs: Vec<(usize, usize)> = Vec::new();

    for edge in edges {
        let (Some(&from), Some(&to)) = (index_of.get(&edge.from), index_of.get(&edge.to)) else {
            continue;
        };
        if from == to {
            continue;
        }
        if edge.lateral {
            lateral_pairs.push((from, to));
        } else {
            children[from].push(to);
            in_degree[to] += 1;
        }
    }

    // Longest-path layering via Kahn's algorithm. A leftover node means a
    // hierarchical cycle.
    let mut layer: Vec<usize> = vec![0; n];
    let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    queue.sort_unstable();
    let mut remaining = in_degree.clone();
    let mut visited = 0usize;
    let mut head = 0usize;

    while head < queue.len() {
        let node = queue[head];
        head += 1;
        visited += 1;
        for &child in &children[node] {
            if layer[node] + 1 > layer[child] {
                layer[child] = layer[node] + 1;
            }
            remaining[child] -= 1;
            if remaining[child] == 0 {
                queue.push(child);
            }
        }
    }
    if visited != n {
        return None;
    }

    // Lateral edges pull endpoints onto one layer (the deeper of the two).
    // Pulling a node down can put it level with its own hierarchical child,
    // so each pass re-propagates the child-below-parent constraint and the
    // two are iterated to a joint fixpoint. Layers only ever increase; a
    // graph whose constraints keep pushing (a lateral pair bridged by a
    // hierarchical path) exhausts the pass cap and falls back to the grid.
    let hier_pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|from| children[from].iter().map(move |&to| (from, to)))
        .collect();
    let mut changed = true;
    let mut passes = 0usize;
    while changed {
        changed = false;
        passes += 1;
        if passes > n * n + 1 {
            return None;
        }
        for &(a, b) in &lateral_pairs {
            let deepest = layer[a].max(layer[b]);
            if layer[a] != deepest {
                layer[a] = deepest;
                changed = true;
            }
            if layer[b] != deepest {
                layer[b] = deepest;
                changed = true;
            }
        }
        for &(parent, child) in &hier_pairs {
            if layer[child] <= layer[parent] {
                layer[child] = layer[parent] + 1;
                changed = true;
            }
        }
    }

    // Place nodes: within a layer, deterministic id order, cumulative x with
    // per-node widths; y from the layer index.
    let mut by_layer: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &l) in layer.iter().enumerate() {
        by_layer.entry(l).or_default().push(i);
    }

    let mut layer_heights: HashMap<usize, f64> = HashMap::new();
    for (&l, members) in &by_layer {
        let height = members
            .iter()
            .map(|&i| nodes[i].height)
            .fold(0.0_f64, f64::max);
        layer_heights.insert(l, height);
    }

    let mut positions = HashMap::with_capacity(n);
    let mut sorted_layers: Vec<usize> = by_layer.keys().copied().collect();
    sorted_layers.sort_unstable();

    let mut y = 0.0;
    for l in sorted_layers {
        let mut members = by_layer.remove(&l).unwrap_or_default();
        members.sort_by_key(|&i| nodes[i].id);

        let mut x = 0.0;
        for i in members {
            positions.insert(nodes[i].id, Point { x, y });
            x += nodes[i].width + options.node_spacing;
        }
        y += layer_heights.get(&l).copied().unwrap_or(0.0) + options.layer_spacing;
    }

    Some(positions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
