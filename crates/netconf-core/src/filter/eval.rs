//! Subtree filter evaluation (RFC 6241 §6)

use super::node::FilterNode;
use crate::model::ConfigElement;

/// Evaluate `root` against top-level `elements`
///
/// An empty root filter selects nothing.
pub fn apply_filter(root: &FilterNode, elements: &[ConfigElement]) -> Vec<ConfigElement> {
    filter_level(root, elements)
}

/// Apply the children of `parent` to sibling elements, in document order
fn filter_level(parent: &FilterNode, elements: &[ConfigElement]) -> Vec<ConfigElement> {
    let mut out = Vec::new();
    for element in elements {
        if parent
            .select_nodes
            .iter()
            .any(|s| s.same_name(&element.namespace, &element.name))
        {
            out.push(element.clone());
            continue;
        }

        let mut selected: Option<ConfigElement> = None;
        for containment in parent
            .child_nodes
            .iter()
            .filter(|c| c.same_name(&element.namespace, &element.name))
        {
            if let Some(result) = apply_containment(containment, element) {
                selected = Some(match selected {
                    Some(existing) => union(existing, result),
                    None => result,
                });
            }
        }
        if let Some(result) = selected {
            out.push(result);
        }
    }
    out
}

fn apply_containment(node: &FilterNode, element: &ConfigElement) -> Option<ConfigElement> {
    let matched = node.match_nodes.iter().all(|m| {
        element.children.iter().any(|c| {
            c.matches_name(&m.namespace, &m.node_name)
                && c.text.as_deref().map(str::trim) == Some(m.filter.trim())
        })
    });
    if !matched {
        return None;
    }
    if node.selects_whole_subtree() {
        return Some(element.clone());
    }

    let mut result = ConfigElement {
        name: element.name.clone(),
        namespace: element.namespace.clone(),
        text: element.text.clone(),
        children: Vec::new(),
    };
    let mut selected_any = false;
    for child in &element.children {
        let is_match_leaf = node
            .match_nodes
            .iter()
            .any(|m| child.matches_name(&m.namespace, &m.node_name));
        if is_match_leaf {
            result.children.push(child.clone());
            continue;
        }
        let picked = filter_level(node, std::slice::from_ref(child));
        if !picked.is_empty() {
            selected_any = true;
            result.children.extend(picked);
        }
    }

    if selected_any || !node.match_nodes.is_empty() {
        Some(result)
    } else {
        None
    }
}

/// Merge two filtered copies of the same element
fn union(mut left: ConfigElement, right: ConfigElement) -> ConfigElement {
    for child in right.children {
        if !left.children.contains(&child) {
            left.children.push(child);
        }
    }
    left
}
