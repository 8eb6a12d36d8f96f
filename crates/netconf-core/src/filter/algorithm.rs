//! Building and normalizing subtree filters

use super::node::{FilterMatchNode, FilterNode};
use crate::identity::ModelNodeId;
use crate::model::ConfigElement;

/// Classify raw filter elements into `tree`
///
/// An element with element children is a containment node, one with
/// non-blank text a match condition, anything else a select node. A select
/// is only added when no containment or match already claims the same
/// (name, namespace) at this level, and duplicate selects are dropped.
pub fn process_filter(tree: &mut FilterNode, raw_elements: &[ConfigElement]) {
    for element in raw_elements {
        if !element.children.is_empty() {
            let mut containment = FilterNode::new(element.namespace.clone(), element.name.clone());
            process_filter(&mut containment, &element.children);
            merge_into(&mut tree.child_nodes, containment);
        } else if let Some(text) = element.trimmed_text() {
            tree.add_match_node(FilterMatchNode::new(
                element.namespace.clone(),
                element.name.clone(),
                text,
            ));
        } else if !tree.has_containment_or_match(&element.namespace, &element.name) {
            tree.add_select_node(FilterNode::new(
                element.namespace.clone(),
                element.name.clone(),
            ));
        }
    }
    reduce_filter(tree);
}

/// Add a containment node to `nodes`, folding it into a mergeable sibling
///
/// Only siblings with the same match conditions (or both without any) are
/// folded together, so an unconditional node never picks up key
/// conditions.
pub fn merge_into(nodes: &mut Vec<FilterNode>, node: FilterNode) {
    let target = nodes.iter_mut().find(|existing| {
        existing.can_be_merged(&node)
            && existing.match_nodes.is_empty() == node.match_nodes.is_empty()
    });
    match target {
        Some(existing) => {
            existing.merge(&node);
            // the union may hold mergeable containment children of its own
            for child in std::mem::take(&mut existing.child_nodes) {
                merge_into(&mut existing.child_nodes, child);
            }
            reduce_filter(existing);
        }
        None => nodes.push(node),
    }
}

/// Parse a complete filter into a root holder
pub fn build_filter(raw_elements: &[ConfigElement]) -> FilterNode {
    let mut root = FilterNode::root();
    process_filter(&mut root, raw_elements);
    root
}

/// Drop containment and match nodes that a sibling select node subsumes
pub fn reduce_filter(tree: &mut FilterNode) {
    if tree.select_nodes.is_empty() {
        return;
    }
    let selects: Vec<(String, String)> = tree
        .select_nodes
        .iter()
        .map(|s| (s.namespace.clone(), s.node_name.clone()))
        .collect();
    let claimed = |namespace: &str, name: &str| {
        selects
            .iter()
            .any(|(ns, n)| n == name && ns == namespace)
    };
    tree.child_nodes
        .retain(|c| !claimed(&c.namespace, &c.node_name));
    tree.match_nodes
        .retain(|m| !claimed(&m.namespace, &m.node_name));
}

/// Turn a node location back into a filter selecting that node
///
/// Container hops become nested containment nodes, key Rdns become match
/// nodes and a final container without keys becomes a select node. The
/// result is a root holder; the root identity yields `None`.
pub fn node_id_to_filter(id: &ModelNodeId) -> Option<FilterNode> {
    let rdns = id.rdns();
    if rdns.is_empty() {
        return None;
    }

    let mut chain: Vec<FilterNode> = Vec::new();
    for rdn in rdns {
        if rdn.is_container() {
            chain.push(FilterNode::new(rdn.namespace(), rdn.value()));
        } else if let Some(current) = chain.last_mut() {
            current.add_match_node(FilterMatchNode::new(
                rdn.namespace(),
                rdn.name(),
                rdn.value(),
            ));
        }
    }

    let mut built: Option<FilterNode> = None;
    while let Some(mut node) = chain.pop() {
        if let Some(child) = built.take() {
            if child.is_select() {
                node.add_select_node(child);
            } else {
                node.add_child_node(child);
            }
        }
        built = Some(node);
    }
    built.map(|top| FilterNode::wrap_as_root(vec![top]))
}
