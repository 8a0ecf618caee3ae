//! Hierarchical top-to-bottom layout.
//!
//! Pipeline: cycle removal → longest-path ranking → rank tightening →
//! virtual nodes for long edges → barycenter ordering → coordinates →
//! edge routing. Every step iterates vectors in input order, so identical
//! input always yields identical output.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::LayoutConfig;
use crate::display_width::{wrap_label, wrapped_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Activity,
    ProteinComplex,
    Molecule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
}

/// `reverse` edges are drawn (and ranked) from `target` to `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub reverse: bool,
}

/// Measured content heights reported by the renderer, by node id.
pub type NodeHeights = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f64,
    pub height: f64,
    pub dynamic_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub rank: usize,
    /// Top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

impl NodeLayout {
    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.width / 2.0,
            y: self.position.y + self.height / 2.0,
        }
    }

    fn anchor(&self, handle: Handle) -> Point {
        let c = self.center();
        match handle {
            Handle::Top => Point {
                x: c.x,
                y: self.position.y,
            },
            Handle::Bottom => Point {
                x: c.x,
                y: self.position.y + self.height,
            },
            Handle::Right => Point {
                x: self.position.x + self.width,
                y: c.y,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Default,
    SmoothStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    Top,
    Bottom,
    Right,
}

/// `source`/`target` are the drawn endpoints (already swapped for reverse
/// links). `points` runs from the source anchor through any bends to the
/// target anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLayout {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub label_width: f64,
    pub label_height: f64,
    pub kind: EdgeKind,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub reverse: bool,
    pub points: Vec<Point>,
}

impl GraphLayout {
    fn empty(config: &LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: 0.0,
            height: 0.0,
            dynamic_height: config.min_container_height,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone)]
struct WorkNode {
    width: f64,
    height: f64,
    rank: usize,
    order: usize,
    x: f64,
    y: f64,
    is_virtual: bool,
}

impl WorkNode {
    fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// An input edge with both endpoints found, in drawn direction.
struct Resolved<'a> {
    edge: &'a LayoutEdge,
    from: usize,
    to: usize,
}

/// Ranking edge: `from` is ranked above `to`. `reversed` marks back edges
/// flipped during cycle removal.
#[derive(Debug, Clone, Copy)]
struct RankEdge {
    from: usize,
    to: usize,
    resolved: usize,
    reversed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visit {
    New,
    Active,
    Done,
}

pub fn compute(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    heights: &NodeHeights,
    config: &LayoutConfig,
) -> GraphLayout {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<&LayoutNode> = Vec::new();
    for node in nodes {
        if index.contains_key(node.id.as_str()) {
            debug!(node = %node.id, "skipping duplicate layout node");
            continue;
        }
        index.insert(node.id.as_str(), kept.len());
        kept.push(node);
    }
    if kept.is_empty() {
        return GraphLayout::empty(config);
    }

    let resolved: Vec<Resolved<'_>> = edges
        .iter()
        .filter_map(|edge| {
            let (Some(&source), Some(&target)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            else {
                debug!(edge = %edge.id, "skipping layout edge with unknown endpoint");
                return None;
            };
            let (from, to) = if edge.reverse {
                (target, source)
            } else {
                (source, target)
            };
            Some(Resolved { edge, from, to })
        })
        .collect();

    let mut work: Vec<WorkNode> = kept
        .iter()
        .map(|node| {
            let (width, height) = node_size(node, heights, config);
            WorkNode {
                width,
                height,
                rank: 0,
                order: 0,
                x: 0.0,
                y: 0.0,
                is_virtual: false,
            }
        })
        .collect();

    let rank_edges = acyclic_edges(kept.len(), &resolved);
    let ranks = assign_ranks(kept.len(), &rank_edges, config.tightening_rounds);
    for (node, rank) in work.iter_mut().zip(ranks) {
        node.rank = rank;
    }

    let (chains, unit_edges) = insert_virtual_nodes(&mut work, &rank_edges, resolved.len());
    let mut layers = build_layers(&mut work);
    order_layers(&mut work, &mut layers, &unit_edges, config.ordering_passes);

    let gaps = rank_gaps(&work, &layers, &rank_edges, &resolved, config);
    assign_y(&mut work, &layers, &gaps);
    assign_x(&mut work, &layers, &unit_edges, config);

    let positioned: Vec<NodeLayout> = kept
        .iter()
        .zip(&work)
        .map(|(node, w)| NodeLayout {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            rank: w.rank,
            position: Point { x: w.x, y: w.y },
            width: w.width,
            height: w.height,
        })
        .collect();

    let mut chain_reversed = vec![false; resolved.len()];
    for e in &rank_edges {
        chain_reversed[e.resolved] = e.reversed;
    }
    let routed: Vec<EdgeLayout> = resolved
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut bends: Vec<Point> = chains[i]
                .iter()
                .map(|&v| Point {
                    x: work[v].center_x(),
                    y: work[v].y,
                })
                .collect();
            if chain_reversed[i] {
                bends.reverse();
            }
            route_edge(r, &positioned, bends, config)
        })
        .collect();

    let width = positioned
        .iter()
        .map(|n| n.position.x + n.width)
        .fold(0.0, f64::max);
    let height = positioned
        .iter()
        .map(|n| n.position.y + n.height)
        .fold(0.0, f64::max);
    let top = positioned
        .iter()
        .map(|n| n.position.y)
        .fold(f64::INFINITY, f64::min);
    let dynamic_height = config
        .min_container_height
        .max(height - top + config.container_padding);

    trace!(
        nodes = positioned.len(),
        edges = routed.len(),
        ranks = layers.len(),
        width,
        height,
        "computed layout"
    );

    GraphLayout {
        nodes: positioned,
        edges: routed,
        width,
        height,
        dynamic_height,
    }
}

pub fn node_size(node: &LayoutNode, heights: &NodeHeights, config: &LayoutConfig) -> (f64, f64) {
    match node.kind {
        NodeKind::Molecule => (config.molecule_size, config.molecule_size),
        NodeKind::Activity | NodeKind::ProteinComplex => {
            let height = heights
                .get(&node.id)
                .copied()
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(config.default_node_height);
            (config.node_width, height)
        }
    }
}

/// Label box size after wrapping; zero for an empty label.
pub fn label_size(label: &str, config: &LayoutConfig) -> (f64, f64) {
    let lines = wrap_label(label, config.label_max_columns).len();
    if lines == 0 {
        return (0.0, 0.0);
    }
    let columns = wrapped_width(label, config.label_max_columns);
    (
        columns as f64 * config.label_char_width + 2.0 * config.label_padding,
        lines as f64 * config.label_line_height + 2.0 * config.label_padding,
    )
}

fn acyclic_edges(node_count: usize, resolved: &[Resolved<'_>]) -> Vec<RankEdge> {
    let mut outgoing = vec![Vec::new(); node_count];
    for (i, edge) in resolved.iter().enumerate() {
        if edge.from != edge.to {
            outgoing[edge.from].push(i);
        }
    }

    let mut state = vec![Visit::New; node_count];
    let mut reversed = vec![false; resolved.len()];
    for node in 0..node_count {
        if state[node] == Visit::New {
            break_cycles(node, &outgoing, resolved, &mut state, &mut reversed);
        }
    }

    resolved
        .iter()
        .enumerate()
        .filter(|(_, edge)| edge.from != edge.to)
        .map(|(i, edge)| {
            if reversed[i] {
                RankEdge {
                    from: edge.to,
                    to: edge.from,
                    resolved: i,
                    reversed: true,
                }
            } else {
                RankEdge {
                    from: edge.from,
                    to: edge.to,
                    resolved: i,
                    reversed: false,
                }
            }
        })
        .collect()
}

/// Iterative DFS from `start`; an edge into a node still on the stack is a
/// back edge and gets reversed.
fn break_cycles(
    start: usize,
    outgoing: &[Vec<usize>],
    resolved: &[Resolved<'_>],
    state: &mut [Visit],
    reversed: &mut [bool],
) {
    // (node, position of the next outgoing edge to look at)
    let mut stack = vec![(start, 0usize)];
    state[start] = Visit::Active;
    while let Some((node, next)) = stack.last_mut() {
        let Some(&i) = outgoing[*node].get(*next) else {
            state[*node] = Visit::Done;
            stack.pop();
            continue;
        };
        *next += 1;
        let to = resolved[i].to;
        match state[to] {
            Visit::New => {
                state[to] = Visit::Active;
                stack.push((to, 0));
            }
            Visit::Active => reversed[i] = true,
            Visit::Done => {}
        }
    }
}

fn assign_ranks(node_count: usize, edges: &[RankEdge], tightening_rounds: usize) -> Vec<usize> {
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge in edges {
        succs[edge.from].push(edge.to);
        preds[edge.to].push(edge.from);
    }

    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..node_count).filter(|&v| indegree[v] == 0).collect();
    let mut rank = vec![0isize; node_count];
    while let Some(v) = queue.pop_front() {
        for &s in &succs[v] {
            rank[s] = rank[s].max(rank[v] + 1);
            indegree[s] -= 1;
            if indegree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    tighten_ranks(&mut rank, &preds, &succs, tightening_rounds);

    let min = rank.iter().copied().min().unwrap_or(0);
    rank.into_iter().map(|r| (r - min) as usize).collect()
}

/// Moves each node to the edge of its feasible window on the side with more
/// incident edges. Every move strictly shortens total edge length and keeps
/// every edge at least one rank long, so this settles.
fn tighten_ranks(rank: &mut [isize], preds: &[Vec<usize>], succs: &[Vec<usize>], rounds: usize) {
    for round in 0..rounds {
        let mut moved = false;
        for v in 0..rank.len() {
            let (ins, outs) = (preds[v].len(), succs[v].len());
            let target = if outs > ins {
                succs[v].iter().map(|&s| rank[s] - 1).min()
            } else if ins > outs {
                preds[v].iter().map(|&p| rank[p] + 1).max()
            } else {
                None
            };
            if let Some(t) = target {
                if t != rank[v] {
                    rank[v] = t;
                    moved = true;
                }
            }
        }
        if !moved {
            trace!(rounds = round, "rank tightening settled");
            return;
        }
    }
}

fn insert_virtual_nodes(
    work: &mut Vec<WorkNode>,
    rank_edges: &[RankEdge],
    resolved_count: usize,
) -> (Vec<Vec<usize>>, Vec<(usize, usize)>) {
    let mut chains = vec![Vec::new(); resolved_count];
    let mut unit_edges = Vec::new();

    for edge in rank_edges {
        let (from_rank, to_rank) = (work[edge.from].rank, work[edge.to].rank);
        let mut prev = edge.from;
        for rank in (from_rank + 1)..to_rank {
            let v = work.len();
            work.push(WorkNode {
                width: 0.0,
                height: 0.0,
                rank,
                order: 0,
                x: 0.0,
                y: 0.0,
                is_virtual: true,
            });
            unit_edges.push((prev, v));
            chains[edge.resolved].push(v);
            prev = v;
        }
        unit_edges.push((prev, edge.to));
    }

    (chains, unit_edges)
}

fn build_layers(work: &mut [WorkNode]) -> Vec<Vec<usize>> {
    let max_rank = work.iter().map(|n| n.rank).max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max_rank + 1];
    for (i, node) in work.iter().enumerate() {
        layers[node.rank].push(i);
    }
    renumber(work, &layers);
    layers
}

fn renumber(work: &mut [WorkNode], layers: &[Vec<usize>]) {
    for layer in layers {
        for (order, &v) in layer.iter().enumerate() {
            work[v].order = order;
        }
    }
}

fn order_layers(
    work: &mut [WorkNode],
    layers: &mut [Vec<usize>],
    unit_edges: &[(usize, usize)],
    passes: usize,
) {
    let mut upper = vec![Vec::new(); work.len()];
    let mut lower = vec![Vec::new(); work.len()];
    for &(u, v) in unit_edges {
        lower[u].push(v);
        upper[v].push(u);
    }

    let mut best = layers.to_vec();
    let mut best_crossings = count_crossings(work, layers, &lower);
    for _ in 0..passes {
        if best_crossings == 0 {
            break;
        }
        for r in 1..layers.len() {
            reorder_layer(work, &mut layers[r], &upper);
        }
        for r in (0..layers.len().saturating_sub(1)).rev() {
            reorder_layer(work, &mut layers[r], &lower);
        }
        let crossings = count_crossings(work, layers, &lower);
        if crossings < best_crossings {
            best = layers.to_vec();
            best_crossings = crossings;
        }
    }

    layers.clone_from_slice(&best);
    renumber(work, layers);
}

/// Sorts a layer by the mean order of each node's neighbours in the adjacent
/// layer. Nodes without neighbours keep their own order as the key; ties
/// fall back to the current order.
fn reorder_layer(work: &mut [WorkNode], layer: &mut [usize], neighbours: &[Vec<usize>]) {
    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .map(|&v| {
            let ns = &neighbours[v];
            let barycenter = if ns.is_empty() {
                work[v].order as f64
            } else {
                ns.iter().map(|&n| work[n].order as f64).sum::<f64>() / ns.len() as f64
            };
            (barycenter, work[v].order, v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (order, &(_, _, v)) in keyed.iter().enumerate() {
        layer[order] = v;
        work[v].order = order;
    }
}

fn count_crossings(work: &[WorkNode], layers: &[Vec<usize>], lower: &[Vec<usize>]) -> usize {
    let mut count = 0;
    for layer in layers {
        let pairs: Vec<(usize, usize)> = layer
            .iter()
            .flat_map(|&u| lower[u].iter().map(move |&v| (u, v)))
            .map(|(u, v)| (work[u].order, work[v].order))
            .collect();
        for i in 0..pairs.len() {
            for j in (i + 1)..pairs.len() {
                let (a, b) = (pairs[i], pairs[j]);
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Gap below each rank: `rank_sep`, widened to fit the tallest label of an
/// edge leaving that rank.
fn rank_gaps(
    work: &[WorkNode],
    layers: &[Vec<usize>],
    rank_edges: &[RankEdge],
    resolved: &[Resolved<'_>],
    config: &LayoutConfig,
) -> Vec<f64> {
    let mut gaps = vec![config.rank_sep; layers.len()];
    for edge in rank_edges {
        let rank = work[edge.from].rank;
        let (_, label_height) = label_size(&resolved[edge.resolved].edge.label, config);
        gaps[rank] = gaps[rank].max(label_height);
    }
    gaps
}

/// Nodes are centred vertically within their rank.
fn assign_y(work: &mut [WorkNode], layers: &[Vec<usize>], gaps: &[f64]) {
    let mut top = 0.0;
    for (rank, layer) in layers.iter().enumerate() {
        let rank_height = layer.iter().map(|&v| work[v].height).fold(0.0, f64::max);
        for &v in layer {
            work[v].y = top + (rank_height - work[v].height) / 2.0;
        }
        top += rank_height + gaps[rank];
    }
}

/// Upper-left alignment: each node is centred on the median of its upper
/// neighbours, pushed right as needed to keep `node_sep` from its left
/// neighbour. The result is shifted so the leftmost node sits at x = 0.
fn assign_x(
    work: &mut [WorkNode],
    layers: &[Vec<usize>],
    unit_edges: &[(usize, usize)],
    config: &LayoutConfig,
) {
    let mut upper = vec![Vec::new(); work.len()];
    for &(u, v) in unit_edges {
        upper[v].push(u);
    }

    for layer in layers {
        let mut prev: Option<usize> = None;
        for &v in layer {
            let half = work[v].width / 2.0;
            let mut centers: Vec<f64> = upper[v].iter().map(|&u| work[u].center_x()).collect();
            let desired = median(&mut centers);
            let earliest = prev.map(|p| {
                let sep = if work[p].is_virtual || work[v].is_virtual {
                    config.node_sep / 2.0
                } else {
                    config.node_sep
                };
                work[p].x + work[p].width + sep + half
            });
            let center = match (desired, earliest) {
                (Some(d), Some(e)) => d.max(e),
                (Some(d), None) => d,
                (None, Some(e)) => e,
                (None, None) => half,
            };
            work[v].x = center - half;
            prev = Some(v);
        }
    }

    let left = work.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    if left.is_finite() {
        for node in work.iter_mut() {
            node.x -= left;
        }
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn route_edge(
    resolved: &Resolved<'_>,
    nodes: &[NodeLayout],
    bends: Vec<Point>,
    config: &LayoutConfig,
) -> EdgeLayout {
    let (source, target) = (&nodes[resolved.from], &nodes[resolved.to]);
    // Ranking keeps every other edge at least one rank long.
    let span = source.rank.abs_diff(target.rank);
    let kind = if span > 1 || resolved.from == resolved.to {
        EdgeKind::SmoothStep
    } else {
        EdgeKind::Default
    };
    let (source_handle, target_handle) = if resolved.from == resolved.to {
        (Handle::Right, Handle::Top)
    } else if target.rank > source.rank {
        (Handle::Bottom, Handle::Top)
    } else {
        (Handle::Top, Handle::Bottom)
    };

    let mut points = Vec::with_capacity(bends.len() + 2);
    points.push(source.anchor(source_handle));
    points.extend(bends);
    points.push(target.anchor(target_handle));

    let (label_width, label_height) = label_size(&resolved.edge.label, config);
    EdgeLayout {
        id: resolved.edge.id.clone(),
        source: source.id.clone(),
        target: target.id.clone(),
        label: resolved.edge.label.clone(),
        label_width,
        label_height,
        kind,
        source_handle,
        target_handle,
        reverse: resolved.edge.reverse,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn activity(id: &str) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            kind: NodeKind::Activity,
            label: id.to_string(),
        }
    }

    fn molecule(id: &str) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            kind: NodeKind::Molecule,
            label: id.to_string(),
        }
    }

    fn link(source: &str, target: &str) -> LayoutEdge {
        LayoutEdge {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            label: "causally upstream of".to_string(),
            reverse: false,
        }
    }

    fn run(nodes: &[LayoutNode], edges: &[LayoutEdge]) -> GraphLayout {
        compute(nodes, edges, &NodeHeights::new(), &LayoutConfig::default())
    }

    fn ranks(layout: &GraphLayout) -> Vec<(&str, usize)> {
        layout.nodes.iter().map(|n| (n.id.as_str(), n.rank)).collect()
    }

    #[test]
    fn rank_linear_chain() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C")],
            &[link("A", "B"), link("B", "C")],
        );
        assert_eq!(ranks(&layout), vec![("A", 0), ("B", 1), ("C", 2)]);
    }

    #[test]
    fn rank_fan_in() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C")],
            &[link("A", "C"), link("B", "C")],
        );
        assert_eq!(ranks(&layout), vec![("A", 0), ("B", 0), ("C", 1)]);
    }

    #[test]
    fn tightening_pulls_source_next_to_its_target() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C"), molecule("M")],
            &[link("A", "B"), link("B", "C"), link("M", "C")],
        );
        assert_eq!(layout.node("M").unwrap().rank, 1);
    }

    #[test]
    fn cycle_is_ranked_without_hanging() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C")],
            &[link("A", "B"), link("B", "C"), link("C", "A")],
        );
        assert_eq!(ranks(&layout), vec![("A", 0), ("B", 1), ("C", 2)]);
        assert_eq!(layout.edges.len(), 3);
        let back = &layout.edges[2];
        assert_eq!(back.source_handle, Handle::Top);
        assert_eq!(back.target_handle, Handle::Bottom);
        assert_eq!(back.kind, EdgeKind::SmoothStep);
    }

    #[test]
    fn deep_chain_cycle_breaking_keeps_stack_flat() {
        let count = 200_000;
        let template = link("X", "Y");
        let mut resolved: Vec<Resolved<'_>> = (0..count - 1)
            .map(|i| Resolved {
                edge: &template,
                from: i,
                to: i + 1,
            })
            .collect();
        resolved.push(Resolved {
            edge: &template,
            from: count - 1,
            to: 0,
        });

        let rank_edges = acyclic_edges(count, &resolved);

        let reversed: Vec<usize> = rank_edges
            .iter()
            .filter(|e| e.reversed)
            .map(|e| e.resolved)
            .collect();
        assert_eq!(reversed, vec![count - 1]);
        assert_eq!(rank_edges.len(), count);
    }

    #[test]
    fn children_sit_below_parent_side_by_side() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C")],
            &[link("A", "B"), link("A", "C")],
        );
        let a = layout.node("A").unwrap();
        let b = layout.node("B").unwrap();
        let c = layout.node("C").unwrap();
        assert_eq!(b.position.y, c.position.y);
        assert!(b.position.y >= a.position.y + a.height);
        assert!(b.position.x + b.width <= c.position.x, "B and C overlap");
    }

    #[test]
    fn single_child_is_aligned_under_parent() {
        let layout = run(&[activity("A"), activity("B")], &[link("A", "B")]);
        let a = layout.node("A").unwrap();
        let b = layout.node("B").unwrap();
        assert_eq!(a.center().x, b.center().x);
        assert_eq!(b.position.y, 140.0 + 100.0);
    }

    #[test]
    fn ordering_removes_crossing() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C"), activity("D")],
            &[link("A", "D"), link("B", "C")],
        );
        let c = layout.node("C").unwrap();
        let d = layout.node("D").unwrap();
        assert!(d.position.x < c.position.x, "D should move left of C");
    }

    #[test]
    fn node_sizes_follow_kind_and_measurements() {
        let config = LayoutConfig::default();
        let mut heights = NodeHeights::new();
        heights.insert("A".to_string(), 212.0);
        heights.insert("M".to_string(), 999.0);
        let layout = compute(
            &[activity("A"), activity("B"), molecule("M")],
            &[],
            &heights,
            &config,
        );
        let a = layout.node("A").unwrap();
        let b = layout.node("B").unwrap();
        let m = layout.node("M").unwrap();
        assert_eq!((a.width, a.height), (config.node_width, 212.0));
        assert_eq!((b.width, b.height), (config.node_width, config.default_node_height));
        assert_eq!((m.width, m.height), (config.molecule_size, config.molecule_size));
    }

    #[test]
    fn invalid_measured_height_falls_back() {
        let mut heights = NodeHeights::new();
        heights.insert("A".to_string(), f64::NAN);
        let layout = compute(&[activity("A")], &[], &heights, &LayoutConfig::default());
        assert_eq!(layout.nodes[0].height, 140.0);
    }

    #[test]
    fn empty_graph_has_minimum_height() {
        let layout = run(&[], &[]);
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.dynamic_height, LayoutConfig::default().min_container_height);
    }

    #[test]
    fn single_node_has_minimum_height() {
        let layout = run(&[activity("A")], &[]);
        assert!(layout.dynamic_height >= LayoutConfig::default().min_container_height);
        assert_eq!(layout.nodes[0].position, Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn tall_graph_grows_past_minimum() {
        let nodes: Vec<LayoutNode> = (0..6).map(|i| activity(&format!("N{i}"))).collect();
        let edges: Vec<LayoutEdge> = (0..5)
            .map(|i| link(&format!("N{i}"), &format!("N{}", i + 1)))
            .collect();
        let layout = run(&nodes, &edges);
        let config = LayoutConfig::default();
        assert_eq!(layout.dynamic_height, layout.height + config.container_padding);
        assert!(layout.dynamic_height > config.min_container_height);
    }

    #[test]
    fn unknown_endpoints_are_omitted() {
        let layout = run(&[activity("A")], &[link("A", "ghost")]);
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn duplicate_nodes_are_laid_out_once() {
        let layout = run(&[activity("A"), activity("A")], &[]);
        assert_eq!(layout.nodes.len(), 1);
    }

    #[test]
    fn reverse_edge_is_drawn_from_target() {
        let mut input = link("A", "M");
        input.reverse = true;
        input.label = "input of".to_string();
        let layout = run(&[activity("A"), molecule("M")], &[input]);

        let edge = &layout.edges[0];
        assert_eq!(edge.source, "M");
        assert_eq!(edge.target, "A");
        assert!(edge.reverse);
        assert!(layout.node("M").unwrap().rank < layout.node("A").unwrap().rank);
    }

    #[test]
    fn long_edge_bends_through_virtual_nodes() {
        let layout = run(
            &[activity("A"), activity("B"), activity("C")],
            &[link("A", "B"), link("B", "C"), link("A", "C")],
        );
        let long = &layout.edges[2];
        assert_eq!(long.kind, EdgeKind::SmoothStep);
        assert_eq!(long.points.len(), 3);
        let a = layout.node("A").unwrap();
        assert_eq!(long.points[0], Point { x: a.center().x, y: a.height });
    }

    #[test]
    fn self_loop_is_kept_for_output() {
        let layout = run(&[activity("A")], &[link("A", "A")]);
        let edge = &layout.edges[0];
        assert_eq!(layout.node("A").unwrap().rank, 0);
        assert_eq!((edge.source_handle, edge.target_handle), (Handle::Right, Handle::Top));
        assert_eq!(edge.points.len(), 2);
    }

    #[test]
    fn label_height_widens_rank_gap() {
        let config = LayoutConfig {
            rank_sep: 10.0,
            ..LayoutConfig::default()
        };
        let layout = compute(
            &[activity("A"), activity("B")],
            &[link("A", "B")],
            &NodeHeights::new(),
            &config,
        );
        let (_, label_height) = label_size("causally upstream of", &config);
        assert_eq!(layout.node("B").unwrap().position.y, 140.0 + label_height);
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = vec![
            activity("A"),
            activity("B"),
            molecule("M"),
            activity("C"),
            activity("D"),
        ];
        let edges = vec![
            link("A", "B"),
            link("M", "B"),
            link("A", "C"),
            link("C", "D"),
            link("B", "D"),
            link("D", "A"),
        ];
        assert_eq!(run(&nodes, &edges), run(&nodes, &edges));
    }
}
