use serde::Serialize;

pub const ENABLED_BY: &str = "RO:0002333";
pub const HAS_INPUT: &str = "RO:0002233";
pub const HAS_INPUT_REVERSE_LABEL: &str = "input of";

pub const MOLECULAR_FUNCTION: &str = "GO:0003674";
pub const PROTEIN_COMPLEX: &str = "GO:0032991";
pub const CHEMICAL_ENTITY: &str = "CHEBI:24431";
/// Information biomacromolecule: the root class every gene product carries.
pub const GENE_PRODUCT: &str = "CHEBI:33695";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Term {
    pub id: String,
    pub label: String,
}

impl Term {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub uid: String,
    pub id: String,
    pub label: String,
    pub root_types: Vec<Term>,
    pub negated: bool,
    pub contributor: Option<String>,
    pub date: Option<String>,
    pub group: Option<String>,
    pub source: Option<String>,
}

impl Node {
    pub fn has_root_type(&self, class_id: &str) -> bool {
        self.root_types.iter().any(|t| t.id == class_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub uid: String,
    pub id: String,
    pub label: String,
    pub reference: Option<String>,
    pub with: Option<String>,
    pub contributor: Option<String>,
    pub date: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub uid: String,
    pub id: String,
    pub label: String,
    pub source_id: String,
    pub target_id: String,
    pub source: Node,
    pub target: Node,
    pub evidence: Vec<Evidence>,
    pub contributor: Option<String>,
    pub date: Option<String>,
    pub group: Option<String>,
    pub is_reverse_link: bool,
    pub reverse_link_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Activity,
    Molecule,
    ProteinComplex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub uid: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub root_node: Node,
    pub molecular_function: Option<Node>,
    pub enabled_by: Option<Node>,
    pub date: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Activity {
    pub fn contains_node(&self, uid: &str) -> bool {
        self.nodes.iter().any(|n| n.uid == uid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub orcid: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub url: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphModel {
    pub id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub activities: Vec<Activity>,
    pub activity_connections: Vec<Edge>,
    #[serde(rename = "conformsToGPAD")]
    pub conforms_to_gpad: bool,
    pub state: Option<String>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub comments: Vec<String>,
    pub contributors: Vec<Contributor>,
    pub groups: Vec<Group>,
}
