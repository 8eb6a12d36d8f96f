//! Arena-backed edit tree
//!
//! Containment nodes live in one `Vec` and refer to each other by
//! [`EditNodeId`]. A node's [`ModelNodeId`] is never stored: it is computed
//! from the tree's base identity and the chain of parents, so adding or
//! removing match nodes is visible immediately.

use serde::{Deserialize, Serialize};

use super::operation::{EditChangeNode, EditMatchNode, EditOperation};
use crate::identity::{ModelNodeId, Rdn};
use crate::model::QName;

/// Index of a containment node inside its [`EditTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditNodeId(usize);

impl EditNodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Container or list entry touched by an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContainmentNode {
    pub qname: QName,
    pub operation: EditOperation,
    /// Key leaves, in the order they were supplied
    pub match_nodes: Vec<EditMatchNode>,
    pub change_nodes: Vec<EditChangeNode>,
    children: Vec<EditNodeId>,
    parent: Option<EditNodeId>,
}

impl EditContainmentNode {
    fn new(qname: QName, operation: EditOperation, parent: Option<EditNodeId>) -> Self {
        Self {
            qname,
            operation,
            match_nodes: Vec::new(),
            change_nodes: Vec::new(),
            children: Vec::new(),
            parent,
        }
    }

    pub fn children(&self) -> &[EditNodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<EditNodeId> {
        self.parent
    }

    /// Same node name and the same key values (in any order)
    pub fn same_entry(&self, qname: &QName, matches: &[EditMatchNode]) -> bool {
        self.qname == *qname
            && self.match_nodes.len() == matches.len()
            && matches.iter().all(|m| self.match_nodes.contains(m))
    }
}

/// Structured edit: a forest of containment nodes below `base`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTree {
    base: ModelNodeId,
    nodes: Vec<EditContainmentNode>,
    roots: Vec<EditNodeId>,
}

impl EditTree {
    /// Empty tree rooted at the datastore root
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree whose roots sit directly under `base`
    pub fn with_base(base: ModelNodeId) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    pub fn base(&self) -> &ModelNodeId {
        &self.base
    }

    pub fn roots(&self) -> &[EditNodeId] {
        &self.roots
    }

    pub fn root(&self) -> Option<EditNodeId> {
        self.roots.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of containment nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_root(&mut self, qname: QName, operation: EditOperation) -> EditNodeId {
        let id = self.push(EditContainmentNode::new(qname, operation, None));
        self.roots.push(id);
        id
    }

    pub fn add_child(
        &mut self,
        parent: EditNodeId,
        qname: QName,
        operation: EditOperation,
    ) -> EditNodeId {
        let id = self.push(EditContainmentNode::new(qname, operation, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, node: EditContainmentNode) -> EditNodeId {
        self.nodes.push(node);
        EditNodeId(self.nodes.len() - 1)
    }

    pub fn add_match_node(&mut self, node: EditNodeId, match_node: EditMatchNode) {
        self.nodes[node.0].match_nodes.push(match_node);
    }

    /// Remove the match node for `qname`, returning it
    pub fn remove_match_node(&mut self, node: EditNodeId, qname: &QName) -> Option<EditMatchNode> {
        let matches = &mut self.nodes[node.0].match_nodes;
        let pos = matches.iter().position(|m| m.qname == *qname)?;
        Some(matches.remove(pos))
    }

    pub fn add_change_node(&mut self, node: EditNodeId, change: EditChangeNode) {
        self.nodes[node.0].change_nodes.push(change);
    }

    pub fn set_operation(&mut self, node: EditNodeId, operation: EditOperation) {
        self.nodes[node.0].operation = operation;
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: EditNodeId) -> &EditContainmentNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: EditNodeId) -> &[EditNodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: EditNodeId) -> Option<EditNodeId> {
        self.nodes[id.0].parent
    }

    /// Child of `parent` (or root when `parent` is `None`) for one entry
    pub fn find_child(
        &self,
        parent: Option<EditNodeId>,
        qname: &QName,
        matches: &[EditMatchNode],
    ) -> Option<EditNodeId> {
        let candidates = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        candidates
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].same_entry(qname, matches))
    }

    /// Identity of a containment node
    ///
    /// Base identity, then for every node from the root down its container
    /// Rdn followed by its match Rdns in order.
    pub fn node_id(&self, id: EditNodeId) -> ModelNodeId {
        let mut chain = vec![id];
        let mut cursor = self.nodes[id.0].parent;
        while let Some(p) = cursor {
            chain.push(p);
            cursor = self.nodes[p.0].parent;
        }

        let mut node_id = self.base.clone();
        for idx in chain.into_iter().rev() {
            let node = &self.nodes[idx.0];
            node_id.add_rdn(Rdn::container(
                node.qname.namespace.clone(),
                node.qname.name.clone(),
            ));
            node_id.add_rdns(node.match_nodes.iter().map(|m| {
                Rdn::key(
                    m.qname.namespace.clone(),
                    m.qname.name.clone(),
                    m.value.to_text(),
                )
            }));
        }
        node_id
    }

    /// Identity of the node a containment node sits under
    pub fn parent_node_id(&self, id: EditNodeId) -> ModelNodeId {
        match self.nodes[id.0].parent {
            Some(p) => self.node_id(p),
            None => self.base.clone(),
        }
    }

    /// Copy the subtree at `id` into a fresh tree based at its parent
    pub fn subtree(&self, id: EditNodeId) -> EditTree {
        let mut out = EditTree::with_base(self.parent_node_id(id));
        out.graft(None, self, id);
        out
    }

    /// Deep-copy `src`'s subtree at `src_id` under `parent` (or as a root)
    pub fn graft(
        &mut self,
        parent: Option<EditNodeId>,
        src: &EditTree,
        src_id: EditNodeId,
    ) -> EditNodeId {
        let src_node = &src.nodes[src_id.0];
        let id = match parent {
            Some(p) => self.add_child(p, src_node.qname.clone(), src_node.operation),
            None => self.add_root(src_node.qname.clone(), src_node.operation),
        };
        self.nodes[id.0].match_nodes = src_node.match_nodes.clone();
        self.nodes[id.0].change_nodes = src_node.change_nodes.clone();
        for child in &src_node.children {
            self.graft(Some(id), src, *child);
        }
        id
    }

    /// Move `id` (with its subtree) under `new_parent`, or make it a root
    pub fn reparent(&mut self, id: EditNodeId, new_parent: Option<EditNodeId>) {
        match self.nodes[id.0].parent {
            Some(old) => self.nodes[old.0].children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
        match new_parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes[id.0].parent = new_parent;
    }

    /// Nodes of the subtree at `id`, parents before children
    pub fn descendants(&self, id: EditNodeId) -> Vec<EditNodeId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend(self.nodes[out[i].0].children.iter().copied());
            i += 1;
        }
        out
    }
}
