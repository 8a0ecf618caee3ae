//! Partition of the flat graph into activities and free-standing molecules.
//!
//! Before any traversal every enabling-edge source owns itself and every
//! enabling target belongs to its source. Roots then walk in edge input
//! order, claiming each unowned node they reach, so chemicals consumed or
//! produced by an activity join that activity. A traversal only crosses
//! into nodes that are unowned or already owned by the activity being built,
//! so one activity can never absorb another's subgraph. Chemicals still
//! unclaimed afterwards become molecules, in node input order.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::annotation::latest_date;
use crate::builder::NodeIndex;
use crate::model::*;

/// uid → uid of the activity that owns it.
#[derive(Debug, Default)]
pub struct ClaimContext<'a> {
    owners: HashMap<&'a str, &'a str>,
}

impl<'a> ClaimContext<'a> {
    pub fn owner(&self, uid: &str) -> Option<&'a str> {
        self.owners.get(uid).copied()
    }

    /// Claims `uid` for `owner` unless someone got there first. Returns the
    /// owner in effect afterwards.
    pub fn claim(&mut self, uid: &'a str, owner: &'a str) -> &'a str {
        self.owners.entry(uid).or_insert(owner)
    }

    pub fn is_claimed(&self, uid: &str) -> bool {
        self.owners.contains_key(uid)
    }
}

/// Edge positions touching each node uid, in edge input order.
struct Incidence<'a> {
    by_uid: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Incidence<'a> {
    fn new(edges: &'a [Edge]) -> Self {
        let mut by_uid: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            by_uid.entry(edge.source_id.as_str()).or_default().push(i);
            if edge.target_id != edge.source_id {
                by_uid.entry(edge.target_id.as_str()).or_default().push(i);
            }
        }
        Self { by_uid }
    }

    fn edges_of(&self, uid: &str) -> &[usize] {
        self.by_uid.get(uid).map(Vec::as_slice).unwrap_or(&[])
    }
}

struct Closure {
    node_positions: Vec<usize>,
    edge_positions: Vec<usize>,
}

pub fn is_enabling(edge: &Edge) -> bool {
    edge.id == ENABLED_BY
}

/// Chemical entities that are not gene products.
pub fn is_molecule_candidate(node: &Node) -> bool {
    node.has_root_type(CHEMICAL_ENTITY) && !node.has_root_type(GENE_PRODUCT)
}

pub fn extract_activities(nodes: &[Node], edges: &[Edge]) -> Vec<Activity> {
    let index = NodeIndex::new(nodes);
    let incidence = Incidence::new(edges);
    let mut claims = ClaimContext::default();

    let mut roots: Vec<&Edge> = Vec::new();
    let mut seen_roots: HashSet<&str> = HashSet::new();
    for edge in edges.iter().filter(|e| is_enabling(e)) {
        if seen_roots.insert(edge.source_id.as_str()) {
            roots.push(edge);
        }
    }

    for enabling in &roots {
        claims.claim(&enabling.source_id, &enabling.source_id);
    }
    for enabling in edges.iter().filter(|e| is_enabling(e)) {
        claims.claim(&enabling.target_id, &enabling.source_id);
    }

    let mut activities = Vec::with_capacity(roots.len());

    for enabling in roots {
        let Some(root) = index.get(&enabling.source_id) else {
            continue;
        };
        let enabled_by = index.get(&enabling.target_id);
        let activity_type = match enabled_by {
            Some(enabler) if enabler.has_root_type(PROTEIN_COMPLEX) => ActivityType::ProteinComplex,
            _ => ActivityType::Activity,
        };
        let closure = collect_closure(&root.uid, &index, edges, &incidence, &mut claims);
        activities.push(assemble(
            root,
            activity_type,
            Some(root.clone()),
            enabled_by.cloned(),
            closure,
            nodes,
            edges,
        ));
    }

    // An earlier molecule's walk may already have taken a later candidate.
    for molecule in nodes.iter().filter(|n| is_molecule_candidate(n)) {
        if claims.is_claimed(&molecule.uid) {
            continue;
        }
        claims.claim(&molecule.uid, &molecule.uid);
        let closure = collect_closure(&molecule.uid, &index, edges, &incidence, &mut claims);
        activities.push(assemble(
            molecule,
            ActivityType::Molecule,
            None,
            None,
            closure,
            nodes,
            edges,
        ));
    }

    debug!(
        activities = activities.len(),
        claimed = claims.owners.len(),
        unclaimed = nodes.len().saturating_sub(claims.owners.len()),
        "extracted activities"
    );
    activities
}

/// Depth-first walk from `owner` over every edge touching a collected node.
/// Nodes owned by another activity are boundaries; unowned nodes are claimed.
fn collect_closure<'a>(
    owner: &'a str,
    index: &NodeIndex<'a>,
    edges: &'a [Edge],
    incidence: &Incidence<'a>,
    claims: &mut ClaimContext<'a>,
) -> Closure {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut taken: HashSet<usize> = HashSet::new();
    let mut node_positions = Vec::new();
    let mut edge_positions = Vec::new();
    let mut stack = vec![owner];
    visited.insert(owner);

    while let Some(uid) = stack.pop() {
        if let Some(position) = index.position(uid) {
            node_positions.push(position);
        }
        for &i in incidence.edges_of(uid) {
            if taken.contains(&i) {
                continue;
            }
            let edge = &edges[i];
            let other = if edge.source_id == uid {
                edge.target_id.as_str()
            } else {
                edge.source_id.as_str()
            };
            if claims.claim(other, owner) != owner {
                continue;
            }
            taken.insert(i);
            edge_positions.push(i);
            if visited.insert(other) {
                stack.push(other);
            }
        }
    }

    node_positions.sort_unstable();
    edge_positions.sort_unstable();
    trace!(
        root = owner,
        nodes = node_positions.len(),
        edges = edge_positions.len(),
        "collected closure"
    );
    Closure {
        node_positions,
        edge_positions,
    }
}

fn assemble(
    root: &Node,
    activity_type: ActivityType,
    molecular_function: Option<Node>,
    enabled_by: Option<Node>,
    closure: Closure,
    nodes: &[Node],
    edges: &[Edge],
) -> Activity {
    let members: Vec<Node> = closure
        .node_positions
        .iter()
        .map(|&i| nodes[i].clone())
        .collect();
    let member_edges: Vec<Edge> = closure
        .edge_positions
        .iter()
        .map(|&i| edges[i].clone())
        .collect();
    let date = latest_date(
        members
            .iter()
            .filter_map(|n| n.date.as_deref())
            .chain(member_edges.iter().filter_map(|e| e.date.as_deref())),
    )
    .map(str::to_string);

    Activity {
        uid: root.uid.clone(),
        activity_type,
        root_node: root.clone(),
        molecular_function,
        enabled_by,
        date,
        nodes: members,
        edges: member_edges,
    }
}
