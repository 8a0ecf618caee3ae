//! Renderer-facing elements: activities and their connections recast as
//! layout input, then positioned nodes and routed edges in the shape the
//! flow renderer consumes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::layout::{
    self, EdgeKind, GraphLayout, Handle, LayoutEdge, LayoutNode, NodeHeights, NodeKind, Point,
};
use crate::model::{Activity, ActivityType, GraphModel};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub dynamic_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeKind,
    pub position: Point,
    pub data: Activity,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    #[serde(rename = "type")]
    pub marker_type: &'static str,
}

pub const ARROW_CLOSED: Marker = Marker {
    marker_type: "arrowclosed",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeKind,
    pub marker_end: Marker,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub data: FlowEdgeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdgeData {
    pub relation_id: String,
    pub is_reverse_link: bool,
    pub label_width: f64,
    pub label_height: f64,
    pub points: Vec<Point>,
}

pub fn node_kind(activity_type: ActivityType) -> NodeKind {
    match activity_type {
        ActivityType::Activity => NodeKind::Activity,
        ActivityType::ProteinComplex => NodeKind::ProteinComplex,
        ActivityType::Molecule => NodeKind::Molecule,
    }
}

/// Layout nodes for every activity and layout edges for every connection,
/// with connection endpoints lifted from member nodes to their activities.
pub fn layout_input(model: &GraphModel) -> (Vec<LayoutNode>, Vec<LayoutEdge>) {
    let membership: HashMap<&str, &str> = model
        .activities
        .iter()
        .flat_map(|a| a.nodes.iter().map(move |n| (n.uid.as_str(), a.uid.as_str())))
        .collect();

    let nodes = model
        .activities
        .iter()
        .map(|activity| LayoutNode {
            id: activity.uid.clone(),
            kind: node_kind(activity.activity_type),
            label: activity.root_node.label.clone(),
        })
        .collect();

    let edges = model
        .activity_connections
        .iter()
        .filter_map(|connection| {
            let source = membership.get(connection.source_id.as_str())?;
            let target = membership.get(connection.target_id.as_str())?;
            let label = match (&connection.reverse_link_label, connection.is_reverse_link) {
                (Some(reverse), true) => reverse.clone(),
                _ => connection.label.clone(),
            };
            Some(LayoutEdge {
                id: connection.uid.clone(),
                source: source.to_string(),
                target: target.to_string(),
                label,
                reverse: connection.is_reverse_link,
            })
        })
        .collect();

    (nodes, edges)
}

pub fn layout_graph_model(
    model: &GraphModel,
    heights: &NodeHeights,
    config: &LayoutConfig,
) -> FlowGraph {
    let (nodes, edges) = layout_input(model);
    let computed = layout::compute(&nodes, &edges, heights, config);
    let flow = to_flow(model, computed);
    debug!(
        model = %model.id,
        nodes = flow.nodes.len(),
        edges = flow.edges.len(),
        dynamic_height = flow.dynamic_height,
        "laid out graph model"
    );
    flow
}

fn to_flow(model: &GraphModel, computed: GraphLayout) -> FlowGraph {
    let relation_ids: HashMap<&str, &str> = model
        .activity_connections
        .iter()
        .map(|c| (c.uid.as_str(), c.id.as_str()))
        .collect();

    let activities: HashMap<&str, &Activity> = model
        .activities
        .iter()
        .map(|a| (a.uid.as_str(), a))
        .collect();

    let nodes = computed
        .nodes
        .into_iter()
        .filter_map(|node| {
            let activity = *activities.get(node.id.as_str())?;
            Some(FlowNode {
                id: node.id,
                node_type: node.kind,
                position: node.position,
                data: activity.clone(),
                width: node.width,
                height: node.height,
            })
        })
        .collect();

    let edges = computed
        .edges
        .into_iter()
        .map(|edge| FlowEdge {
            data: FlowEdgeData {
                relation_id: relation_ids
                    .get(edge.id.as_str())
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                is_reverse_link: edge.reverse,
                label_width: edge.label_width,
                label_height: edge.label_height,
                points: edge.points,
            },
            id: edge.id,
            source: edge.source,
            target: edge.target,
            label: edge.label,
            edge_type: edge.kind,
            marker_end: ARROW_CLOSED,
            source_handle: edge.source_handle,
            target_handle: edge.target_handle,
        })
        .collect();

    FlowGraph {
        nodes,
        edges,
        dynamic_height: computed.dynamic_height,
    }
}
