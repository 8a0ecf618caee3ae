use std::collections::HashMap;

use tracing::debug;

use crate::activity::extract_activities;
use crate::annotation::{Annotations, FrequencyTally};
use crate::connection::extract_activity_connections;
use crate::model::*;
use crate::raw::{RawClassExpression, RawFact, RawIndividual, RawModel};

/// Flat node/edge graph before activity extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub contributors: Vec<Contributor>,
    pub groups: Vec<Group>,
}

/// uid → position in the node list, built once per model.
pub struct NodeIndex<'a> {
    nodes: &'a [Node],
    by_uid: HashMap<&'a str, usize>,
}

impl<'a> NodeIndex<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        let by_uid = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.uid.as_str(), i))
            .collect();
        Self { nodes, by_uid }
    }

    pub fn position(&self, uid: &str) -> Option<usize> {
        self.by_uid.get(uid).copied()
    }

    pub fn get(&self, uid: &str) -> Option<&'a Node> {
        self.position(uid).map(|i| &self.nodes[i])
    }
}

pub fn build_graph_model(raw: &RawModel) -> GraphModel {
    let model_annotations = Annotations::decode(&raw.annotations);
    let graph = build_flat_graph(raw, &model_annotations);

    let activities = extract_activities(&graph.nodes, &graph.edges);
    let activity_connections = extract_activity_connections(&activities, &graph.edges);
    debug!(
        model = %raw.id,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        activities = activities.len(),
        connections = activity_connections.len(),
        "built graph model"
    );

    GraphModel {
        id: raw.id.clone(),
        nodes: graph.nodes,
        edges: graph.edges,
        activities,
        activity_connections,
        conforms_to_gpad: model_annotations.conforms_to_gpad(),
        state: model_annotations.state,
        date: model_annotations.date,
        title: model_annotations.title,
        comments: model_annotations.comments,
        contributors: graph.contributors,
        groups: graph.groups,
    }
}

/// Builds nodes and edges. Contributor and group frequencies count the model
/// annotations first, then individuals, then facts.
pub fn build_flat_graph(raw: &RawModel, model_annotations: &Annotations) -> FlatGraph {
    let mut contributors = FrequencyTally::default();
    let mut groups = FrequencyTally::default();
    contributors.record_all(&model_annotations.contributors);
    groups.record_all(&model_annotations.groups);

    let mut nodes = Vec::with_capacity(raw.individuals.len());
    let mut individual_annotations = Vec::with_capacity(raw.individuals.len());
    for individual in &raw.individuals {
        if individual.id.is_empty() {
            debug!("skipping individual without an id");
            continue;
        }
        let annotations = Annotations::decode(&individual.annotations);
        contributors.record_all(&annotations.contributors);
        groups.record_all(&annotations.groups);
        nodes.push(build_node(individual, &annotations));
        individual_annotations.push(annotations);
    }

    let edges = {
        let index = NodeIndex::new(&nodes);
        let mut edges = Vec::with_capacity(raw.facts.len());
        for fact in &raw.facts {
            if fact.subject.is_empty() || fact.object.is_empty() || fact.property.is_empty() {
                debug!(
                    subject = %fact.subject,
                    object = %fact.object,
                    property = %fact.property,
                    "skipping incomplete fact"
                );
                continue;
            }
            let (Some(source), Some(target)) =
                (index.get(&fact.subject), index.get(&fact.object))
            else {
                debug!(
                    subject = %fact.subject,
                    object = %fact.object,
                    property = %fact.property,
                    "skipping fact with unresolved endpoint"
                );
                continue;
            };
            let annotations = Annotations::decode(&fact.annotations);
            contributors.record_all(&annotations.contributors);
            groups.record_all(&annotations.groups);
            let evidence = annotations
                .evidence
                .iter()
                .filter_map(|uid| resolve_evidence(uid, &index, &individual_annotations))
                .collect();
            edges.push(build_edge(fact, &annotations, source, target, evidence));
        }
        edges
    };

    FlatGraph {
        nodes,
        edges,
        contributors: contributors
            .into_entries()
            .into_iter()
            .map(|(orcid, frequency)| Contributor { orcid, frequency })
            .collect(),
        groups: groups
            .into_entries()
            .into_iter()
            .map(|(url, frequency)| Group { url, frequency })
            .collect(),
    }
}

fn build_node(individual: &RawIndividual, annotations: &Annotations) -> Node {
    let (term, negated) = individual
        .types
        .first()
        .map(class_term)
        .unwrap_or_default();

    Node {
        uid: individual.id.clone(),
        id: term.id,
        label: term.label,
        root_types: individual
            .root_types
            .iter()
            .map(|t| class_term(t).0)
            .filter(|t| !t.id.is_empty())
            .collect(),
        negated,
        contributor: annotations.contributor().map(str::to_string),
        date: annotations.date.clone(),
        group: annotations.group().map(str::to_string),
        source: annotations.source.clone(),
    }
}

/// Named class, or the filler of a complement expression (flagged negated).
fn class_term(expr: &RawClassExpression) -> (Term, bool) {
    let (class, negated) = match &expr.filler {
        Some(filler) if expr.is_complement() => (filler.as_ref(), true),
        _ => (expr, false),
    };
    let id = class.id.clone().unwrap_or_default();
    let label = class.label.clone().unwrap_or_else(|| id.clone());
    (Term { id, label }, negated)
}

fn build_edge(
    fact: &RawFact,
    annotations: &Annotations,
    source: &Node,
    target: &Node,
    evidence: Vec<Evidence>,
) -> Edge {
    Edge {
        uid: format!("{}-{}-{}", fact.subject, fact.property, fact.object),
        id: fact.property.clone(),
        label: fact
            .property_label
            .clone()
            .unwrap_or_else(|| fact.property.clone()),
        source_id: source.uid.clone(),
        target_id: target.uid.clone(),
        source: source.clone(),
        target: target.clone(),
        evidence,
        contributor: annotations.contributor().map(str::to_string),
        date: annotations.date.clone(),
        group: annotations.group().map(str::to_string),
        is_reverse_link: false,
        reverse_link_label: None,
    }
}

fn resolve_evidence(
    uid: &str,
    index: &NodeIndex<'_>,
    individual_annotations: &[Annotations],
) -> Option<Evidence> {
    let Some(position) = index.position(uid) else {
        debug!(evidence = %uid, "skipping unresolved evidence");
        return None;
    };
    let node = &index.nodes[position];
    // `with` is not lifted onto Node; it lives on the evidence individual.
    let with = individual_annotations[position].with.clone();

    Some(Evidence {
        uid: node.uid.clone(),
        id: node.id.clone(),
        label: node.label.clone(),
        reference: node.source.clone(),
        with,
        contributor: node.contributor.clone(),
        date: node.date.clone(),
        group: node.group.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::parse_raw_model;
    use pretty_assertions::assert_eq;

    fn build(json: &str) -> GraphModel {
        build_graph_model(&parse_raw_model(json).unwrap())
    }

    #[test]
    fn individual_becomes_node() {
        let model = build(
            r#"{"id": "m", "individuals": [{
                "id": "i1",
                "type": [{"type": "class", "id": "GO:0004672", "label": "protein kinase activity"}],
                "root-type": [{"type": "class", "id": "GO:0003674", "label": "molecular_function"}],
                "annotations": [
                    {"key": "contributor", "value": "http://orcid.org/1"},
                    {"key": "date", "value": "2023-01-01"},
                    {"key": "providedBy", "value": "http://mgi.org"},
                    {"key": "source", "value": "PMID:1"}
                ]}]}"#,
        );

        assert_eq!(
            model.nodes,
            vec![Node {
                uid: "i1".into(),
                id: "GO:0004672".into(),
                label: "protein kinase activity".into(),
                root_types: vec![Term::new("GO:0003674", "molecular_function")],
                negated: false,
                contributor: Some("http://orcid.org/1".into()),
                date: Some("2023-01-01".into()),
                group: Some("http://mgi.org".into()),
                source: Some("PMID:1".into()),
            }]
        );
    }

    #[test]
    fn complement_type_is_negated() {
        let model = build(
            r#"{"individuals": [{"id": "i1", "type": [{"type": "complement",
                "filler": {"type": "class", "id": "GO:0005515", "label": "protein binding"}}]}]}"#,
        );
        assert!(model.nodes[0].negated);
        assert_eq!(model.nodes[0].id, "GO:0005515");
    }

    #[test]
    fn individual_without_type_still_becomes_node() {
        let model = build(r#"{"individuals": [{"id": "i1"}]}"#);
        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.nodes[0].id, "");
    }

    #[test]
    fn fact_with_unknown_subject_is_dropped() {
        let model = build(
            r#"{"individuals": [{"id": "a"}, {"id": "b"}],
                "facts": [
                    {"subject": "ghost", "object": "b", "property": "RO:0002333"},
                    {"subject": "a", "object": "b", "property": "BFO:0000050", "property-label": "part of"}
                ]}"#,
        );
        assert_eq!(model.edges.len(), 1);
        let edge = &model.edges[0];
        assert_eq!(edge.uid, "a-BFO:0000050-b");
        assert_eq!(edge.label, "part of");
        assert_eq!(edge.source.uid, "a");
        assert_eq!(edge.target.uid, "b");
    }

    #[test]
    fn incomplete_entries_are_skipped() {
        let model = build(
            r#"{"individuals": [{"id": "a"}, {"type": []}, {"id": "b"}],
                "facts": [
                    {"subject": "a", "object": "b"},
                    {"object": "b", "property": "RO:0002333"},
                    {"subject": "a", "object": "b", "property": "RO:0002333"}
                ]}"#,
        );
        let uids: Vec<&str> = model.nodes.iter().map(|n| n.uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b"]);
        assert_eq!(model.edges.len(), 1);
        assert_eq!(model.edges[0].uid, "a-RO:0002333-b");
    }

    #[test]
    fn model_annotations_are_coerced() {
        let model = build(
            r#"{"id": "gomodel:1", "annotations": [
                {"key": "conforms-to-gpad", "value": "true"},
                {"key": "state", "value": "production"},
                {"key": "title", "value": "Kinase cascade"},
                {"key": "date", "value": "2024-02-02"},
                {"key": "comment", "value": "first"},
                {"key": "comment", "value": "second"}
            ]}"#,
        );
        assert!(model.conforms_to_gpad);
        assert_eq!(model.state.as_deref(), Some("production"));
        assert_eq!(model.title.as_deref(), Some("Kinase cascade"));
        assert_eq!(model.date.as_deref(), Some("2024-02-02"));
        assert_eq!(model.comments, vec!["first", "second"]);
    }

    #[test]
    fn contributors_and_groups_tally_frequency() {
        let model = build(
            r#"{"annotations": [{"key": "contributor", "value": "orcid:1"}],
                "individuals": [
                    {"id": "a", "annotations": [
                        {"key": "contributor", "value": "orcid:2"},
                        {"key": "providedBy", "value": "mgi"}]},
                    {"id": "b", "annotations": [
                        {"key": "contributor", "value": "orcid:1"},
                        {"key": "providedBy", "value": "mgi"}]}
                ],
                "facts": [{"subject": "a", "object": "b", "property": "RO:1",
                    "annotations": [{"key": "contributor", "value": "orcid:2"}]}]}"#,
        );
        assert_eq!(
            model.contributors,
            vec![
                Contributor {
                    orcid: "orcid:1".into(),
                    frequency: 2
                },
                Contributor {
                    orcid: "orcid:2".into(),
                    frequency: 2
                },
            ]
        );
        assert_eq!(
            model.groups,
            vec![Group {
                url: "mgi".into(),
                frequency: 2
            }]
        );
    }

    #[test]
    fn evidence_is_resolved_from_individuals() {
        let model = build(
            r#"{"individuals": [
                    {"id": "a"}, {"id": "b"},
                    {"id": "ev1",
                     "type": [{"type": "class", "id": "ECO:0000314", "label": "direct assay evidence"}],
                     "annotations": [
                        {"key": "source", "value": "PMID:42"},
                        {"key": "with", "value": "UniProtKB:P1"}]}
                ],
                "facts": [{"subject": "a", "object": "b", "property": "RO:0002333",
                    "annotations": [
                        {"key": "evidence", "value": "ev1"},
                        {"key": "evidence", "value": "missing"}]}]}"#,
        );
        let evidence = &model.edges[0].evidence;
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].id, "ECO:0000314");
        assert_eq!(evidence[0].reference.as_deref(), Some("PMID:42"));
        assert_eq!(evidence[0].with.as_deref(), Some("UniProtKB:P1"));
    }
}
