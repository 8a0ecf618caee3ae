//! Authoring tree for a single activity before it is written back to the
//! model: a root term with relation-labelled children.
//!
//! Nodes live in an arena keyed by [`TreeNodeId`]. Parents and children
//! refer to each other by id, and children are only ever created under an
//! existing node, so the structure is always a tree.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::Term;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TreeNodeId(u64);

impl fmt::Display for TreeNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Evidence the curator attaches to the edge leading into a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredEvidence {
    pub evidence_code: Term,
    pub reference: String,
    pub with: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: TreeNodeId,
    pub parent_id: Option<TreeNodeId>,
    /// Relation from the parent. `None` only at the root.
    pub relation: Option<Term>,
    /// Not yet chosen when `None`; such nodes are left out of writes.
    pub term: Option<Term>,
    pub evidence: Vec<AuthoredEvidence>,
    pub children: Vec<TreeNodeId>,
}

#[derive(Debug, Clone)]
pub struct ActivityTree {
    nodes: HashMap<TreeNodeId, TreeNode>,
    root: TreeNodeId,
    next_id: u64,
}

impl ActivityTree {
    pub fn new(root_term: Term) -> Self {
        let root = TreeNodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            TreeNode {
                id: root,
                parent_id: None,
                relation: None,
                term: Some(root_term),
                evidence: Vec::new(),
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> TreeNodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TreeNodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    fn get_mut(&mut self, id: TreeNodeId) -> Result<&mut TreeNode> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownTreeNode(id))
    }

    pub fn add_child(
        &mut self,
        parent: TreeNodeId,
        relation: Term,
        term: Option<Term>,
    ) -> Result<TreeNodeId> {
        let id = TreeNodeId(self.next_id);
        self.get_mut(parent)?.children.push(id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            TreeNode {
                id,
                parent_id: Some(parent),
                relation: Some(relation),
                term,
                evidence: Vec::new(),
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn set_term(&mut self, id: TreeNodeId, term: Option<Term>) -> Result<()> {
        self.get_mut(id)?.term = term;
        Ok(())
    }

    pub fn add_evidence(&mut self, id: TreeNodeId, evidence: AuthoredEvidence) -> Result<()> {
        self.get_mut(id)?.evidence.push(evidence);
        Ok(())
    }

    /// Removes `id` and everything below it, returning how many nodes went.
    pub fn remove_subtree(&mut self, id: TreeNodeId) -> Result<usize> {
        if id == self.root {
            return Err(Error::RemoveTreeRoot);
        }
        let parent_id = self
            .get(id)
            .ok_or(Error::UnknownTreeNode(id))?
            .parent_id
            .ok_or(Error::RemoveTreeRoot)?;
        self.get_mut(parent_id)?.children.retain(|child| *child != id);

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn children(&self, id: TreeNodeId) -> Result<&[TreeNodeId]> {
        self.get(id)
            .map(|node| node.children.as_slice())
            .ok_or(Error::UnknownTreeNode(id))
    }

    pub fn parent(&self, id: TreeNodeId) -> Result<Option<TreeNodeId>> {
        self.get(id)
            .map(|node| node.parent_id)
            .ok_or(Error::UnknownTreeNode(id))
    }

    /// Pre-order, children in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            stack: vec![self.root],
        }
    }
}

pub struct Iter<'a> {
    tree: &'a ActivityTree,
    stack: Vec<TreeNodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(&id)?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ENABLED_BY, HAS_INPUT};
    use pretty_assertions::assert_eq;

    fn kinase_tree() -> (ActivityTree, TreeNodeId, TreeNodeId) {
        let mut tree = ActivityTree::new(Term::new("GO:0004672", "protein kinase activity"));
        let root = tree.root();
        let enabler = tree
            .add_child(
                root,
                Term::new(ENABLED_BY, "enabled by"),
                Some(Term::new("UniProtKB:P28482", "MAPK1")),
            )
            .unwrap();
        let input = tree
            .add_child(root, Term::new(HAS_INPUT, "has input"), None)
            .unwrap();
        (tree, enabler, input)
    }

    fn terms(tree: &ActivityTree) -> Vec<Option<&str>> {
        tree.iter()
            .map(|n| n.term.as_ref().map(|t| t.id.as_str()))
            .collect()
    }

    #[test]
    fn children_keep_insertion_order() {
        let (tree, enabler, input) = kinase_tree();
        assert_eq!(tree.children(tree.root()).unwrap(), &[enabler, input]);
        assert_eq!(tree.parent(input).unwrap(), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()).unwrap(), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn iter_is_depth_first() {
        let (mut tree, enabler, input) = kinase_tree();
        tree.add_child(
            enabler,
            Term::new("BFO:0000050", "part of"),
            Some(Term::new("GO:0005737", "cytoplasm")),
        )
        .unwrap();
        tree.set_term(input, Some(Term::new("CHEBI:15422", "ATP"))).unwrap();

        assert_eq!(
            terms(&tree),
            vec![
                Some("GO:0004672"),
                Some("UniProtKB:P28482"),
                Some("GO:0005737"),
                Some("CHEBI:15422"),
            ]
        );
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut tree, enabler, input) = kinase_tree();
        let location = tree
            .add_child(enabler, Term::new("BFO:0000050", "part of"), None)
            .unwrap();

        assert_eq!(tree.remove_subtree(enabler).unwrap(), 2);
        assert!(tree.get(location).is_none());
        assert_eq!(tree.children(tree.root()).unwrap(), &[input]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn root_cannot_be_removed() {
        let (mut tree, _, _) = kinase_tree();
        let root = tree.root();
        assert!(matches!(tree.remove_subtree(root), Err(Error::RemoveTreeRoot)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let (mut tree, enabler, _) = kinase_tree();
        tree.remove_subtree(enabler).unwrap();

        let err = tree
            .add_child(enabler, Term::new(HAS_INPUT, "has input"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), format!("unknown tree node: {enabler}"));
        assert!(tree.set_term(enabler, None).is_err());
        assert!(tree.children(enabler).is_err());
        assert!(tree.remove_subtree(enabler).is_err());
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut tree, enabler, input) = kinase_tree();
        tree.remove_subtree(input).unwrap();
        let added = tree
            .add_child(tree.root(), Term::new(HAS_INPUT, "has input"), None)
            .unwrap();
        assert!(added > input);
        assert!(added > enabler);
    }
}
