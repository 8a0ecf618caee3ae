use crate::model::*;

pub(crate) fn node(uid: &str, id: &str, root_types: &[&str]) -> Node {
    Node {
        uid: uid.to_string(),
        id: id.to_string(),
        label: format!("{id} label"),
        root_types: root_types.iter().map(|r| Term::new(*r, *r)).collect(),
        ..Node::default()
    }
}

pub(crate) fn mf(uid: &str) -> Node {
    node(uid, "GO:0004672", &[MOLECULAR_FUNCTION])
}

pub(crate) fn gene_product(uid: &str) -> Node {
    node(uid, "UniProtKB:P12345", &[CHEMICAL_ENTITY, GENE_PRODUCT])
}

pub(crate) fn chemical(uid: &str) -> Node {
    node(uid, "CHEBI:15422", &[CHEMICAL_ENTITY])
}

pub(crate) fn edge(source: &Node, relation: &str, target: &Node) -> Edge {
    Edge {
        uid: format!("{}-{}-{}", source.uid, relation, target.uid),
        id: relation.to_string(),
        label: relation.to_string(),
        source_id: source.uid.clone(),
        target_id: target.uid.clone(),
        source: source.clone(),
        target: target.clone(),
        ..Edge::default()
    }
}

pub(crate) fn uids(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.uid.as_str()).collect()
}
