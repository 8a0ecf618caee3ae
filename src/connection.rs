use std::collections::HashMap;

use tracing::debug;

use crate::model::*;

/// Relations drawn against their stored direction, with the label shown
/// when flipped.
const REVERSE_LINKS: &[(&str, &str)] = &[(HAS_INPUT, HAS_INPUT_REVERSE_LABEL)];

pub fn reverse_label(relation: &str) -> Option<&'static str> {
    REVERSE_LINKS
        .iter()
        .find(|(id, _)| *id == relation)
        .map(|(_, label)| *label)
}

/// Edges whose endpoints sit in two different activities.
pub fn extract_activity_connections(activities: &[Activity], edges: &[Edge]) -> Vec<Edge> {
    let membership: HashMap<&str, &str> = activities
        .iter()
        .flat_map(|a| a.nodes.iter().map(move |n| (n.uid.as_str(), a.uid.as_str())))
        .collect();

    let connections: Vec<Edge> = edges
        .iter()
        .filter(|e| {
            match (
                membership.get(e.source_id.as_str()),
                membership.get(e.target_id.as_str()),
            ) {
                (Some(from), Some(to)) => from != to,
                _ => false,
            }
        })
        .map(|e| {
            let mut connection = e.clone();
            if let Some(label) = reverse_label(&e.id) {
                connection.is_reverse_link = true;
                connection.reverse_link_label = Some(label.to_string());
            }
            connection
        })
        .collect();

    debug!(connections = connections.len(), "extracted activity connections");
    connections
}
