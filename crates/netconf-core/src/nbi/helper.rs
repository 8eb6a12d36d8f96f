use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::types::{ChangedBy, ChangedLeafInfo, EditInfo, NetconfConfigChange};
use crate::edit::{EditMatchNode, EditNodeId, EditOperation, EditTree};
use crate::identity::ModelNodeId;
use crate::model::{ClientInfo, DatastoreName};
use crate::notification::{refine_and_add, ChangeNotification, SubsystemNotifications};

/// Namespace URI to YANG module prefix
pub trait PrefixResolver: Send + Sync {
    fn prefix(&self, namespace: &str) -> Option<String>;
}

/// Prefixes from a fixed table
#[derive(Debug, Clone, Default)]
pub struct StaticPrefixResolver {
    prefixes: BTreeMap<String, String>,
}

impl StaticPrefixResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(namespace.into(), prefix.into());
        self
    }
}

impl PrefixResolver for StaticPrefixResolver {
    fn prefix(&self, namespace: &str) -> Option<String> {
        self.prefixes.get(namespace).cloned()
    }
}

/// Last `:` or `/` separated segment of a namespace URI
pub fn fallback_prefix(namespace: &str) -> String {
    namespace
        .rsplit([':', '/'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(namespace)
        .to_string()
}

/// Projects committed changes into RFC 6470 config-change notifications
#[derive(Clone)]
pub struct NbiNotificationHelper {
    resolver: Arc<dyn PrefixResolver>,
}

impl fmt::Debug for NbiNotificationHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NbiNotificationHelper").finish_non_exhaustive()
    }
}

impl Default for NbiNotificationHelper {
    fn default() -> Self {
        Self::new(Arc::new(StaticPrefixResolver::new()))
    }
}

impl NbiNotificationHelper {
    pub fn new(resolver: Arc<dyn PrefixResolver>) -> Self {
        Self { resolver }
    }

    pub fn prefix_for(&self, namespace: &str) -> String {
        self.resolver
            .prefix(namespace)
            .unwrap_or_else(|| fallback_prefix(namespace))
    }

    /// Config-change notification for everything a client can see
    ///
    /// Implied (validator-derived) changes are left out, and changes are
    /// refined across all subsystems so each subtree is reported once.
    /// Returns an empty list when nothing visible changed.
    pub fn build_config_changes(
        &self,
        notifications: &SubsystemNotifications,
        datastore: DatastoreName,
        client: &ClientInfo,
    ) -> Vec<NetconfConfigChange> {
        let mut visible: Vec<ChangeNotification> = Vec::new();
        for notification in notifications.all().filter(|n| !n.is_implied()) {
            refine_and_add(&mut visible, notification.clone());
        }

        let mut edits: Vec<EditInfo> = Vec::new();
        for info in visible.iter().flat_map(|n| self.edit_infos(n)) {
            match edits
                .iter_mut()
                .find(|e| e.target == info.target && e.operation == info.operation)
            {
                Some(existing) => existing.changed_leaves.extend(info.changed_leaves),
                None => edits.push(info),
            }
        }
        if edits.is_empty() {
            return Vec::new();
        }
        vec![NetconfConfigChange {
            changed_by: ChangedBy::from(client),
            datastore,
            edits,
            event_time: Utc::now(),
        }]
    }

    /// Edit entries for one notification
    pub fn edit_infos(&self, notification: &ChangeNotification) -> Vec<EditInfo> {
        match notification {
            ChangeNotification::CopyConfig(copy) => vec![EditInfo {
                target: self.target_path(&copy.root_id),
                operation: EditOperation::Replace,
                changed_leaves: Vec::new(),
            }],
            ChangeNotification::EditConfig(edit) => {
                let base = self.target_path(edit.change.base());
                let mut out = Vec::new();
                for root in edit.change.roots() {
                    self.walk(&edit.change, *root, &base, &mut out);
                }
                out
            }
        }
    }

    /// Prefixed instance identifier of a node identity; empty for the root
    pub fn target_path(&self, id: &ModelNodeId) -> String {
        let mut path = String::new();
        for rdn in id.rdns() {
            let prefix = self.prefix_for(rdn.namespace());
            if rdn.is_container() {
                path.push_str(&format!("/{}:{}", prefix, rdn.value()));
            } else {
                path.push_str(&predicate(&prefix, rdn.name(), rdn.value()));
            }
        }
        path
    }

    fn walk(&self, tree: &EditTree, idx: EditNodeId, parent_path: &str, out: &mut Vec<EditInfo>) {
        let node = tree.node(idx);
        let mut path = format!(
            "{}/{}:{}",
            parent_path,
            self.prefix_for(&node.qname.namespace),
            node.qname.name
        );
        for m in &node.match_nodes {
            path.push_str(&self.match_predicate(m));
        }

        let mut by_operation: Vec<(EditOperation, Vec<ChangedLeafInfo>)> = Vec::new();
        for change in node.change_nodes.iter().filter(|c| c.is_user_change()) {
            let leaf = ChangedLeafInfo {
                name: change.qname.name.clone(),
                value: change.value.to_text(),
                namespace: change.qname.namespace.clone(),
                prefix: self.prefix_for(&change.qname.namespace),
            };
            match by_operation.iter_mut().find(|(op, _)| *op == change.operation) {
                Some((_, leaves)) => leaves.push(leaf),
                None => by_operation.push((change.operation, vec![leaf])),
            }
        }

        if node.operation != EditOperation::Merge {
            out.push(EditInfo {
                target: path,
                operation: node.operation,
                changed_leaves: by_operation.into_iter().flat_map(|(_, l)| l).collect(),
            });
            return;
        }

        for (operation, changed_leaves) in by_operation {
            out.push(EditInfo {
                target: path.clone(),
                operation,
                changed_leaves,
            });
        }
        for child in tree.children(idx) {
            self.walk(tree, *child, &path, out);
        }
    }

    fn match_predicate(&self, m: &EditMatchNode) -> String {
        predicate(
            &self.prefix_for(&m.qname.namespace),
            &m.qname.name,
            &m.value.to_text(),
        )
    }
}

fn predicate(prefix: &str, name: &str, value: &str) -> String {
    if value.contains('\'') {
        format!("[{}:{}=\"{}\"]", prefix, name, value)
    } else {
        format!("[{}:{}='{}']", prefix, name, value)
    }
}
