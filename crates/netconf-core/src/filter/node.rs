use serde::{Deserialize, Serialize};

use crate::identity::{ModelNodeId, Rdn};

/// Leaf-value equality condition on a containment node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterMatchNode {
    pub node_name: String,
    pub namespace: String,
    /// Required leaf text
    pub filter: String,
}

impl FilterMatchNode {
    pub fn new(
        namespace: impl Into<String>,
        node_name: impl Into<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            namespace: namespace.into(),
            filter: filter.into(),
        }
    }
}

/// Node of a subtree filter
///
/// A node with neither `child_nodes` nor `select_nodes` nor `match_nodes`
/// is a select node: it asks for its whole subtree. The unnamed root node
/// returned by [`FilterNode::root`] holds the top-level filter nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterNode {
    pub node_name: String,
    pub namespace: String,
    /// Containment children
    pub child_nodes: Vec<FilterNode>,
    /// Select children
    pub select_nodes: Vec<FilterNode>,
    pub match_nodes: Vec<FilterMatchNode>,
}

impl FilterNode {
    pub fn new(namespace: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Unnamed holder of top-level filter nodes
    pub fn root() -> Self {
        Self::default()
    }

    /// Wrap top-level nodes in a root holder
    pub fn wrap_as_root(nodes: Vec<FilterNode>) -> Self {
        let mut root = Self::root();
        for node in nodes {
            if node.is_select() {
                root.select_nodes.push(node);
            } else {
                root.child_nodes.push(node);
            }
        }
        root
    }

    pub fn is_root(&self) -> bool {
        self.node_name.is_empty()
    }

    pub fn is_select(&self) -> bool {
        self.child_nodes.is_empty() && self.select_nodes.is_empty() && self.match_nodes.is_empty()
    }

    /// True when no child or select restricts the node's content
    pub fn selects_whole_subtree(&self) -> bool {
        self.child_nodes.is_empty() && self.select_nodes.is_empty()
    }

    /// Name and namespace check; an empty namespace matches any
    pub fn same_name(&self, namespace: &str, name: &str) -> bool {
        self.node_name == name
            && (self.namespace.is_empty() || namespace.is_empty() || self.namespace == namespace)
    }

    fn same_name_as(&self, other: &FilterNode) -> bool {
        self.node_name == other.node_name && self.namespace == other.namespace
    }

    pub fn add_child_node(&mut self, node: FilterNode) {
        self.child_nodes.push(node);
    }

    /// Add a select node; duplicates are dropped, the first one wins
    pub fn add_select_node(&mut self, node: FilterNode) {
        if !self.select_nodes.contains(&node) {
            self.select_nodes.push(node);
        }
    }

    pub fn add_match_node(&mut self, node: FilterMatchNode) {
        self.match_nodes.push(node);
    }

    /// Whether a containment or match node already claims (name, namespace)
    pub fn has_containment_or_match(&self, namespace: &str, name: &str) -> bool {
        self.child_nodes
            .iter()
            .any(|c| c.node_name == name && c.namespace == namespace)
            || self
                .match_nodes
                .iter()
                .any(|m| m.node_name == name && m.namespace == namespace)
    }

    /// Two nodes merge when they name the same node and their match sets
    /// are equal or at least one side is unconditional
    pub fn can_be_merged(&self, other: &FilterNode) -> bool {
        if !self.same_name_as(other) {
            return false;
        }
        if self.match_nodes.is_empty() || other.match_nodes.is_empty() {
            return true;
        }
        self.match_nodes.len() == other.match_nodes.len()
            && self
                .match_nodes
                .iter()
                .all(|m| other.match_nodes.contains(m))
    }

    /// Union `other`'s containment and select children into this node
    ///
    /// Match nodes are left alone.
    pub fn merge(&mut self, other: &FilterNode) {
        for child in &other.child_nodes {
            if !self.child_nodes.contains(child) {
                self.child_nodes.push(child.clone());
            }
        }
        for select in &other.select_nodes {
            if !self.select_nodes.contains(select) {
                self.select_nodes.push(select.clone());
            }
        }
    }

    /// Filter nodes that describe the location `id`
    ///
    /// Walks the identity's container hops from this root. A select node on
    /// the way covers everything below it and ends the walk. Match nodes on
    /// key leaves must agree with the identity's key values.
    pub fn nodes_at(&self, id: &ModelNodeId) -> Vec<&FilterNode> {
        let mut level: Vec<&FilterNode> = vec![self];
        for (container, keys) in id.entries() {
            let mut next = Vec::new();
            for node in &level {
                if !node.is_root() && node.selects_whole_subtree() {
                    return vec![*node];
                }
                if let Some(select) = node
                    .select_nodes
                    .iter()
                    .find(|s| s.same_name(container.namespace(), container.value()))
                {
                    return vec![select];
                }
                next.extend(node.child_nodes.iter().filter(|c| {
                    c.same_name(container.namespace(), container.value()) && keys_agree(c, keys)
                }));
            }
            if next.is_empty() {
                return Vec::new();
            }
            level = next;
        }
        level
    }
}

fn keys_agree(node: &FilterNode, keys: &[Rdn]) -> bool {
    node.match_nodes.iter().all(|m| {
        keys.iter()
            .find(|k| k.name() == m.node_name)
            .map_or(true, |k| k.value() == m.filter.trim())
    })
}
