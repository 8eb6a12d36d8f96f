//! In-process model tree
//!
//! Configuration is held as plain [`DataNode`]s. Transactions snapshot the
//! node forest on begin and restore it on rollback.

use std::collections::HashMap;
use std::sync::Arc;

use super::{EditOutcome, ModelTree, StateLocation};
use crate::edit::{
    DefaultOperation, EditChangeNode, EditConfigRequest, EditContainmentNode, EditMatchNode,
    EditNodeId, EditOperation, EditTree, InsertDirective,
};
use crate::errors::{ErrorTag, NetconfError, Result, RpcError};
use crate::filter::{apply_filter, merge_into, FilterNode};
use crate::identity::{ModelNodeId, Rdn};
use crate::model::{ClientInfo, ConfigElement, LeafValue, QName, QueryParams, SchemaPath};
use crate::notification::{NotificationContext, NotificationInfo};
use crate::subsystem::{StateAttributeRequest, SubSystem, SubSystemRegistry};

/// One container or list entry
#[derive(Debug, Clone, PartialEq, Eq)]
struct DataNode {
    qname: QName,
    /// List keys in schema order; empty for containers
    keys: Vec<(QName, LeafValue)>,
    leaves: Vec<(QName, LeafValue)>,
    children: Vec<DataNode>,
}

impl DataNode {
    fn new(qname: QName, keys: Vec<(QName, LeafValue)>) -> Self {
        Self {
            qname,
            keys,
            leaves: Vec::new(),
            children: Vec::new(),
        }
    }

    fn rdns(&self) -> Vec<Rdn> {
        let mut rdns = vec![Rdn::container(
            self.qname.namespace.clone(),
            self.qname.name.clone(),
        )];
        rdns.extend(self.keys.iter().map(|(q, v)| {
            Rdn::key(q.namespace.clone(), q.name.clone(), v.to_text())
        }));
        rdns
    }

    /// Same entry as an edit node: name plus key values, key order ignored
    fn is_entry(&self, qname: &QName, matches: &[EditMatchNode]) -> bool {
        self.qname == *qname
            && self.keys.len() == matches.len()
            && matches.iter().all(|m| {
                self.keys
                    .iter()
                    .any(|(q, v)| *q == m.qname && v.to_text() == m.value.to_text())
            })
    }

    fn addressed_by(&self, container: &Rdn, keys: &[Rdn]) -> bool {
        self.qname.matches(container.namespace(), container.value())
            && self.keys.len() == keys.len()
            && keys.iter().all(|k| {
                self.keys
                    .iter()
                    .any(|(q, v)| q.name == k.name() && v.to_text() == k.value())
            })
    }

    fn to_element(&self) -> ConfigElement {
        let mut element = ConfigElement::container(
            self.qname.namespace.clone(),
            self.qname.name.clone(),
        );
        for (q, v) in self.keys.iter().chain(self.leaves.iter()) {
            element.children.push(ConfigElement::leaf(
                q.namespace.clone(),
                q.name.clone(),
                v.to_text(),
            ));
        }
        element
            .children
            .extend(self.children.iter().map(DataNode::to_element));
        element
    }
}

/// Reference [`ModelTree`] keeping configuration in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryModelTree {
    roots: Vec<DataNode>,
    checkpoint: Option<Vec<DataNode>>,
    list_keys: HashMap<SchemaPath, Vec<QName>>,
    state_leaves: HashMap<SchemaPath, Vec<QName>>,
    subsystems: SubSystemRegistry,
}

impl InMemoryModelTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the key leaves of the list at `path`, used by `copy-config`
    pub fn register_list_keys(&mut self, path: SchemaPath, keys: Vec<QName>) {
        self.list_keys.insert(path, keys);
    }

    /// Declare the state (config false) leaves of nodes at `path`
    pub fn register_state_leaves(&mut self, path: SchemaPath, leaves: Vec<QName>) {
        self.state_leaves.insert(path, leaves);
    }

    pub fn register_subsystem(&mut self, path: SchemaPath, subsystem: Arc<dyn SubSystem>) {
        self.subsystems.register(path, subsystem);
    }

    pub fn with_subsystem(mut self, path: SchemaPath, subsystem: Arc<dyn SubSystem>) -> Self {
        self.register_subsystem(path, subsystem);
        self
    }

    pub fn in_transaction(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Whether a node exists at `id`
    pub fn contains(&self, id: &ModelNodeId) -> bool {
        !id.is_root() && find_node(&self.roots, id).is_some()
    }

    /// Value of the leaf `name` on the node at `id`
    pub fn leaf_value(&self, id: &ModelNodeId, name: &str) -> Option<LeafValue> {
        let node = find_node(&self.roots, id)?;
        node.keys
            .iter()
            .chain(node.leaves.iter())
            .find(|(q, _)| q.name == name)
            .map(|(_, v)| v.clone())
    }

    /// Full configuration as elements
    pub fn to_elements(&self) -> Vec<ConfigElement> {
        self.roots.iter().map(DataNode::to_element).collect()
    }

    fn element_to_node(&self, element: &ConfigElement, parent: &SchemaPath) -> DataNode {
        let qname = QName::new(element.namespace.clone(), element.name.clone());
        let path = parent.child(qname.clone());
        let key_names = self.list_keys.get(&path);

        let mut node = DataNode::new(qname, Vec::new());
        let mut keys = Vec::new();
        for child in &element.children {
            if child.children.is_empty() && child.text.is_some() {
                let leaf = (
                    QName::new(child.namespace.clone(), child.name.clone()),
                    LeafValue::string(child.text.clone().unwrap_or_default()),
                );
                let is_key = key_names.map_or(false, |k| k.iter().any(|q| q.name == child.name));
                if is_key {
                    keys.push(leaf);
                } else {
                    node.leaves.push(leaf);
                }
            } else {
                node.children.push(self.element_to_node(child, &path));
            }
        }
        if let Some(order) = key_names {
            keys.sort_by_key(|(q, _)| order.iter().position(|k| k.name == q.name));
        }
        node.keys = keys;
        node
    }

    fn collect_state_locations(
        &self,
        nodes: &[DataNode],
        parent_id: &ModelNodeId,
        parent_path: &SchemaPath,
        filter: Option<&FilterNode>,
        out: &mut Vec<StateLocation>,
    ) {
        for node in nodes {
            let mut id = parent_id.clone();
            id.add_rdns(node.rdns());
            let path = parent_path.child(node.qname.clone());

            if let Some(registered) = self.state_leaves.get(&path) {
                if let Some(request) = state_request(registered, node, &id, filter) {
                    out.push(StateLocation {
                        node_id: id.clone(),
                        request,
                    });
                }
            }
            self.collect_state_locations(&node.children, &id, &path, filter, out);
        }
    }
}

/// What of `registered` the filter asks for at `id`; `None` when nothing
fn state_request(
    registered: &[QName],
    node: &DataNode,
    id: &ModelNodeId,
    filter: Option<&FilterNode>,
) -> Option<StateAttributeRequest> {
    let Some(filter) = filter else {
        return Some(StateAttributeRequest::default());
    };
    let nodes = filter.nodes_at(id);
    if nodes.is_empty() {
        return None;
    }
    if nodes.iter().any(|n| n.selects_whole_subtree()) {
        return Some(StateAttributeRequest::default());
    }

    let mut request = StateAttributeRequest::default();
    for n in &nodes {
        for select in &n.select_nodes {
            if let Some(q) = registered
                .iter()
                .find(|q| q.matches(&select.namespace, &select.node_name))
            {
                if !request.leaves.contains(q) {
                    request.leaves.push(q.clone());
                }
            }
        }
        for child in &n.child_nodes {
            let is_config_child = node
                .children
                .iter()
                .any(|c| c.qname.matches(&child.namespace, &child.node_name));
            if !is_config_child {
                merge_into(&mut request.filters, child.clone());
            }
        }
    }
    if request.leaves.is_empty() && request.filters.is_empty() {
        None
    } else {
        Some(request)
    }
}

fn find_node<'a>(roots: &'a [DataNode], id: &ModelNodeId) -> Option<&'a DataNode> {
    let mut level = roots;
    let mut found = None;
    for (container, keys) in id.entries() {
        let node = level.iter().find(|n| n.addressed_by(container, keys))?;
        level = &node.children;
        found = Some(node);
    }
    found
}

/// Child list of the node at `id` (the root list for the root identity)
fn children_at_mut<'a>(roots: &'a mut Vec<DataNode>, id: &ModelNodeId) -> Option<&'a mut Vec<DataNode>> {
    let mut level = roots;
    for (container, keys) in id.entries() {
        let node = level.iter_mut().find(|n| n.addressed_by(container, keys))?;
        level = &mut node.children;
    }
    Some(level)
}

fn entry_id(parent: &ModelNodeId, qname: &QName, matches: &[EditMatchNode]) -> ModelNodeId {
    let mut id = parent.clone();
    id.add_rdn(Rdn::container(qname.namespace.clone(), qname.name.clone()));
    id.add_rdns(matches.iter().map(|m| {
        Rdn::key(m.qname.namespace.clone(), m.qname.name.clone(), m.value.to_text())
    }));
    id
}

fn leaf_path(node_id: &ModelNodeId, qname: &QName) -> String {
    format!("{}/{}", node_id.xpath_string().trim_end_matches('/'), qname.name)
}

/// Materialized content of one containment node
#[derive(Default)]
struct ContentDiff {
    changes: Vec<EditChangeNode>,
    children: Vec<EditTree>,
}

impl ContentDiff {
    fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.children.is_empty()
    }
}

fn build_diff(
    parent_id: &ModelNodeId,
    node: &EditContainmentNode,
    operation: EditOperation,
    content: ContentDiff,
) -> EditTree {
    let mut diff = EditTree::with_base(parent_id.clone());
    let root = diff.add_root(node.qname.clone(), operation);
    for m in &node.match_nodes {
        diff.add_match_node(root, m.clone());
    }
    for change in content.changes {
        diff.add_change_node(root, change);
    }
    for child in &content.children {
        for child_root in child.roots() {
            diff.graft(Some(root), child, *child_root);
        }
    }
    diff
}

/// Applies one request's edit tree to the node forest
struct Applier<'a> {
    context: &'a mut NotificationContext,
    implied: bool,
    default_operation: DefaultOperation,
}

impl Applier<'_> {
    /// Apply the containment node `idx` among `siblings`
    ///
    /// Returns the materialized diff based at `parent_id`, or `None` when
    /// nothing changed. Notification infos are recorded child-first unless
    /// `record` is off (inside a freshly created subtree).
    fn apply_node(
        &mut self,
        siblings: &mut Vec<DataNode>,
        parent_id: &ModelNodeId,
        edit: &EditTree,
        idx: EditNodeId,
        record: bool,
        top_level: bool,
    ) -> Result<Option<EditTree>> {
        let node = edit.node(idx);
        let node_id = entry_id(parent_id, &node.qname, &node.match_nodes);
        let pos = siblings
            .iter()
            .position(|d| d.is_entry(&node.qname, &node.match_nodes));

        let mut operation = node.operation;
        if top_level
            && operation == EditOperation::Merge
            && self.default_operation == DefaultOperation::Replace
        {
            operation = EditOperation::Replace;
        }

        match (operation, pos) {
            (EditOperation::Create, Some(_)) => Err(NetconfError::validation(
                RpcError::data_exists(node_id.xpath_string()),
            )),
            (EditOperation::Create, None) => self.materialize(
                siblings, None, parent_id, &node_id, edit, idx, EditOperation::Create, record,
            ),
            (EditOperation::Merge, Some(p)) => {
                self.merge_existing(&mut siblings[p], parent_id, &node_id, edit, idx, record)
            }
            (EditOperation::Merge, None) => {
                if self.default_operation == DefaultOperation::None {
                    return Err(NetconfError::validation(RpcError::data_missing(
                        node_id.xpath_string(),
                    )));
                }
                self.materialize(
                    siblings, None, parent_id, &node_id, edit, idx, EditOperation::Create, record,
                )
            }
            (EditOperation::Replace, existing) => {
                if let Some(p) = existing {
                    siblings.remove(p);
                }
                self.materialize(
                    siblings, existing, parent_id, &node_id, edit, idx, EditOperation::Replace,
                    record,
                )
            }
            (EditOperation::Delete, None) => Err(NetconfError::validation(
                RpcError::data_missing(node_id.xpath_string()),
            )),
            (EditOperation::Remove, None) => Ok(None),
            (op @ (EditOperation::Delete | EditOperation::Remove), Some(p)) => {
                siblings.remove(p);
                let diff = build_diff(parent_id, node, op, ContentDiff::default());
                self.record(record, parent_id, &diff);
                Ok(Some(diff))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn materialize(
        &mut self,
        siblings: &mut Vec<DataNode>,
        at: Option<usize>,
        parent_id: &ModelNodeId,
        node_id: &ModelNodeId,
        edit: &EditTree,
        idx: EditNodeId,
        operation: EditOperation,
        record: bool,
    ) -> Result<Option<EditTree>> {
        let node = edit.node(idx);
        let keys = node
            .match_nodes
            .iter()
            .map(|m| (m.qname.clone(), m.value.clone()))
            .collect();
        let mut data = DataNode::new(node.qname.clone(), keys);
        let content = self.apply_contents(&mut data, node_id, edit, idx, false)?;

        let pos = at.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(pos, data);

        let diff = build_diff(parent_id, node, operation, content);
        self.record(record, parent_id, &diff);
        Ok(Some(diff))
    }

    fn merge_existing(
        &mut self,
        data: &mut DataNode,
        parent_id: &ModelNodeId,
        node_id: &ModelNodeId,
        edit: &EditTree,
        idx: EditNodeId,
        record: bool,
    ) -> Result<Option<EditTree>> {
        let content = self.apply_contents(data, node_id, edit, idx, record)?;
        if content.is_empty() {
            return Ok(None);
        }
        if record {
            // own leaves are reported one by one so they never cover the
            // child changes recorded above
            for change in &content.changes {
                let own = ContentDiff {
                    changes: vec![change.clone()],
                    children: Vec::new(),
                };
                let diff = build_diff(parent_id, edit.node(idx), EditOperation::Merge, own);
                self.context.push(NotificationInfo::leaf(
                    parent_id.clone(),
                    diff,
                    change.qname.clone(),
                    self.implied,
                ));
            }
        }
        Ok(Some(build_diff(
            parent_id,
            edit.node(idx),
            EditOperation::Merge,
            content,
        )))
    }

    fn apply_contents(
        &mut self,
        data: &mut DataNode,
        node_id: &ModelNodeId,
        edit: &EditTree,
        idx: EditNodeId,
        record: bool,
    ) -> Result<ContentDiff> {
        let mut content = ContentDiff::default();
        for change in &edit.node(idx).change_nodes {
            if let Some(applied) = apply_leaf(data, node_id, change)? {
                content.changes.push(applied);
            }
        }
        for child in edit.children(idx) {
            if let Some(diff) =
                self.apply_node(&mut data.children, node_id, edit, *child, record, false)?
            {
                content.children.push(diff);
            }
        }
        Ok(content)
    }

    fn record(&mut self, record: bool, parent_id: &ModelNodeId, diff: &EditTree) {
        if record {
            self.context.push(NotificationInfo::new(
                parent_id.clone(),
                diff.clone(),
                self.implied,
            ));
        }
    }
}

/// Apply one leaf change, returning it if the data actually changed
fn apply_leaf(
    data: &mut DataNode,
    node_id: &ModelNodeId,
    change: &EditChangeNode,
) -> Result<Option<EditChangeNode>> {
    let path = || leaf_path(node_id, &change.qname);

    if let Some((_, key_value)) = data.keys.iter().find(|(q, _)| *q == change.qname) {
        if key_value.to_text() == change.value.to_text() {
            return Ok(None);
        }
        return Err(NetconfError::validation(
            RpcError::new(ErrorTag::InvalidValue)
                .with_path(path())
                .with_message("list key values cannot be changed"),
        ));
    }

    match change.operation {
        EditOperation::Merge | EditOperation::Replace => {
            if let Some(directive) = &change.insert {
                if let Some(p) = leaf_list_entry(&data.leaves, change) {
                    data.leaves.remove(p);
                }
                let pos = insert_position(&data.leaves, &change.qname, directive);
                data.leaves
                    .insert(pos, (change.qname.clone(), change.value.clone()));
                return Ok(Some(change.clone()));
            }
            match data.leaves.iter_mut().find(|(q, _)| *q == change.qname) {
                Some((_, value)) if value.to_text() == change.value.to_text() => Ok(None),
                Some((_, value)) => {
                    *value = change.value.clone();
                    Ok(Some(change.clone()))
                }
                None => {
                    data.leaves
                        .push((change.qname.clone(), change.value.clone()));
                    Ok(Some(change.clone()))
                }
            }
        }
        EditOperation::Create => {
            let exists = match &change.insert {
                Some(_) => leaf_list_entry(&data.leaves, change).is_some(),
                None => data.leaves.iter().any(|(q, _)| *q == change.qname),
            };
            if exists {
                return Err(NetconfError::validation(RpcError::data_exists(path())));
            }
            let pos = match &change.insert {
                Some(directive) => insert_position(&data.leaves, &change.qname, directive),
                None => data.leaves.len(),
            };
            data.leaves
                .insert(pos, (change.qname.clone(), change.value.clone()));
            Ok(Some(change.clone()))
        }
        EditOperation::Delete | EditOperation::Remove => match find_leaf(&data.leaves, change) {
            Some(p) => {
                data.leaves.remove(p);
                Ok(Some(change.clone()))
            }
            None if change.operation == EditOperation::Delete => {
                Err(NetconfError::validation(RpcError::data_missing(path())))
            }
            None => Ok(None),
        },
    }
}

fn leaf_list_entry(leaves: &[(QName, LeafValue)], change: &EditChangeNode) -> Option<usize> {
    leaves
        .iter()
        .position(|(q, v)| *q == change.qname && v.to_text() == change.value.to_text())
}

/// Leaf by name, or by name and value when several entries share the name
fn find_leaf(leaves: &[(QName, LeafValue)], change: &EditChangeNode) -> Option<usize> {
    let same_name: Vec<usize> = leaves
        .iter()
        .enumerate()
        .filter(|(_, (q, _))| *q == change.qname)
        .map(|(i, _)| i)
        .collect();
    if same_name.len() > 1 {
        leaf_list_entry(leaves, change)
    } else {
        same_name.first().copied()
    }
}

fn insert_position(leaves: &[(QName, LeafValue)], qname: &QName, directive: &InsertDirective) -> usize {
    let same: Vec<usize> = leaves
        .iter()
        .enumerate()
        .filter(|(_, (q, _))| q == qname)
        .map(|(i, _)| i)
        .collect();
    let end_of_group = same.last().map_or(leaves.len(), |p| p + 1);
    let find = |value: &str| {
        same.iter()
            .copied()
            .find(|p| leaves[*p].1.to_text() == value)
    };
    match directive {
        InsertDirective::First => same.first().copied().unwrap_or(leaves.len()),
        InsertDirective::Last => end_of_group,
        InsertDirective::Before(value) => find(value).unwrap_or(end_of_group),
        InsertDirective::After(value) => find(value).map_or(end_of_group, |p| p + 1),
    }
}

impl ModelTree for InMemoryModelTree {
    fn edit_config(
        &mut self,
        request: &EditConfigRequest,
        _client: &ClientInfo,
    ) -> Result<EditOutcome> {
        let edit = &request.config;
        let base = edit.base().clone();
        let siblings = children_at_mut(&mut self.roots, &base).ok_or_else(|| {
            NetconfError::validation(RpcError::data_missing(base.xpath_string()))
        })?;

        let mut context = NotificationContext::new();
        let mut applier = Applier {
            context: &mut context,
            implied: request.internal,
            default_operation: request.default_operation,
        };
        let mut diffs = Vec::new();
        for root in edit.roots() {
            if let Some(diff) = applier.apply_node(siblings, &base, edit, *root, true, true)? {
                diffs.push(diff);
            }
        }

        tracing::debug!(
            message_id = %request.message_id,
            diff_count = diffs.len(),
            notification_count = context.len(),
            "applied edit to in-memory tree"
        );
        Ok(EditOutcome { diffs, context })
    }

    fn get_config(
        &self,
        filter: Option<&FilterNode>,
        params: &QueryParams,
    ) -> Result<Vec<ConfigElement>> {
        let elements = self.to_elements();
        let mut elements = match filter {
            Some(filter) => apply_filter(filter, &elements),
            None => elements,
        };
        if let Some(depth) = params.depth {
            ConfigElement::truncate_depth(&mut elements, depth);
        }
        Ok(elements)
    }

    fn copy_config(&mut self, elements: &[ConfigElement]) -> Result<Vec<ModelNodeId>> {
        let root_path = SchemaPath::root();
        let roots: Vec<DataNode> = elements
            .iter()
            .map(|e| self.element_to_node(e, &root_path))
            .collect();
        let ids = roots
            .iter()
            .map(|n| ModelNodeId::from_rdns(n.rdns()))
            .collect();
        self.roots = roots;
        Ok(ids)
    }

    fn subsystem_for(&self, path: &SchemaPath) -> Option<Arc<dyn SubSystem>> {
        self.subsystems.lookup(path)
    }

    fn state_locations(&self, filter: Option<&FilterNode>) -> Vec<StateLocation> {
        let mut out = Vec::new();
        self.collect_state_locations(
            &self.roots,
            &ModelNodeId::new(),
            &SchemaPath::root(),
            filter,
            &mut out,
        );
        out
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.checkpoint.is_some() {
            return Err(NetconfError::Transaction {
                message: "transaction already open".to_string(),
            });
        }
        self.checkpoint = Some(self.roots.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.checkpoint
            .take()
            .map(|_| ())
            .ok_or_else(|| NetconfError::Transaction {
                message: "no open transaction to commit".to_string(),
            })
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let snapshot = self
            .checkpoint
            .take()
            .ok_or_else(|| NetconfError::Transaction {
                message: "no open transaction to roll back".to_string(),
            })?;
        self.roots = snapshot;
        Ok(())
    }
}
