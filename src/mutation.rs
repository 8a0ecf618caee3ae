//! Minerva request operations for writing an authored activity back to a
//! model, or removing an existing one.

use serde::Serialize;
use tracing::debug;

use crate::model::Activity;
use crate::tree::{ActivityTree, TreeNode, TreeNodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Individual,
    Edge,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Add,
    Remove,
    AddAnnotation,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
}

impl Expression {
    pub fn class(id: impl Into<String>) -> Self {
        Self {
            kind: "class",
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationValue {
    pub key: String,
    pub value: String,
}

impl AnnotationValue {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Arguments {
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to_variable: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<AnnotationValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub entity: Entity,
    pub operation: OperationKind,
    pub arguments: Arguments,
}

impl Operation {
    fn new(entity: Entity, operation: OperationKind, arguments: Arguments) -> Self {
        Self {
            entity,
            operation,
            arguments,
        }
    }

    pub fn add_individual(model_id: &str, variable: String, class_id: &str) -> Self {
        Self::new(
            Entity::Individual,
            OperationKind::Add,
            Arguments {
                model_id: model_id.to_string(),
                assign_to_variable: Some(variable),
                expressions: vec![Expression::class(class_id)],
                ..Arguments::default()
            },
        )
    }

    pub fn remove_individual(model_id: &str, uid: &str) -> Self {
        Self::new(
            Entity::Individual,
            OperationKind::Remove,
            Arguments {
                model_id: model_id.to_string(),
                individual: Some(uid.to_string()),
                ..Arguments::default()
            },
        )
    }

    pub fn add_edge(model_id: &str, subject: String, predicate: &str, object: String) -> Self {
        Self::new(
            Entity::Edge,
            OperationKind::Add,
            Arguments {
                model_id: model_id.to_string(),
                subject: Some(subject),
                object: Some(object),
                predicate: Some(predicate.to_string()),
                ..Arguments::default()
            },
        )
    }

    pub fn annotate_edge(
        model_id: &str,
        subject: String,
        predicate: &str,
        object: String,
        values: Vec<AnnotationValue>,
    ) -> Self {
        Self::new(
            Entity::Edge,
            OperationKind::AddAnnotation,
            Arguments {
                model_id: model_id.to_string(),
                subject: Some(subject),
                object: Some(object),
                predicate: Some(predicate.to_string()),
                values,
                ..Arguments::default()
            },
        )
    }

    pub fn store_model(model_id: &str) -> Self {
        Self::new(
            Entity::Model,
            OperationKind::Store,
            Arguments {
                model_id: model_id.to_string(),
                ..Arguments::default()
            },
        )
    }
}

fn node_variable(id: TreeNodeId) -> String {
    format!("node-{id}")
}

fn evidence_variable(id: TreeNodeId, index: usize) -> String {
    format!("evidence-{id}-{index}")
}

/// Every node whose term is chosen, provided its whole ancestry was chosen
/// too. Pre-order, so parents come before their children.
fn writable_nodes(tree: &ActivityTree) -> Vec<&TreeNode> {
    let mut writable: Vec<&TreeNode> = Vec::new();
    let mut skipped = 0usize;
    for node in tree.iter() {
        let parent_written = node
            .parent_id
            .is_none_or(|parent| writable.iter().any(|w| w.id == parent));
        if node.term.is_some() && parent_written {
            writable.push(node);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!(skipped, "leaving out tree nodes without a term");
    }
    writable
}

pub fn build_activity_operations(tree: &ActivityTree, model_id: &str) -> Vec<Operation> {
    let writable = writable_nodes(tree);
    let mut operations = Vec::new();

    for node in &writable {
        if let Some(term) = &node.term {
            operations.push(Operation::add_individual(
                model_id,
                node_variable(node.id),
                &term.id,
            ));
        }
    }

    // Only non-root nodes carry a relation, and their parent was written.
    let links: Vec<(TreeNodeId, &str, &TreeNode)> = writable
        .iter()
        .filter_map(|node| Some((node.parent_id?, node.relation.as_ref()?.id.as_str(), *node)))
        .collect();

    for (parent, predicate, node) in &links {
        operations.push(Operation::add_edge(
            model_id,
            node_variable(*parent),
            predicate,
            node_variable(node.id),
        ));
    }

    for (parent, predicate, node) in &links {
        for (index, evidence) in node.evidence.iter().enumerate() {
            let variable = evidence_variable(node.id, index);
            let mut add = Operation::add_individual(
                model_id,
                variable.clone(),
                &evidence.evidence_code.id,
            );
            add.arguments
                .values
                .push(AnnotationValue::new("source", evidence.reference.clone()));
            if let Some(with) = &evidence.with {
                add.arguments
                    .values
                    .push(AnnotationValue::new("with", with.clone()));
            }
            operations.push(add);
            operations.push(Operation::annotate_edge(
                model_id,
                node_variable(*parent),
                predicate,
                node_variable(node.id),
                vec![AnnotationValue::new("evidence", variable)],
            ));
        }
    }

    operations.push(Operation::store_model(model_id));
    debug!(
        model = model_id,
        operations = operations.len(),
        "built activity operations"
    );
    operations
}

pub fn remove_activity_operations(activity: &Activity, model_id: &str) -> Vec<Operation> {
    activity
        .nodes
        .iter()
        .map(|node| Operation::remove_individual(model_id, &node.uid))
        .chain(std::iter::once(Operation::store_model(model_id)))
        .collect()
}
