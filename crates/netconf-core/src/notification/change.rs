use crate::edit::{EditOperation, EditTree};
use crate::identity::{ModelNodeId, Rdn};
use crate::model::{ClientInfo, DatastoreName, QName};

/// One touched node, as reported by the model tree after an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInfo {
    /// Node under which the change happened
    pub node_id: ModelNodeId,
    /// Materialized change, based at `node_id`
    pub change: EditTree,
    /// Produced by a derived edit
    pub implied: bool,
    /// Set when only this leaf of an existing change root was touched
    pub changed_leaf: Option<QName>,
}

impl NotificationInfo {
    pub fn new(node_id: ModelNodeId, change: EditTree, implied: bool) -> Self {
        Self {
            node_id,
            change,
            implied,
            changed_leaf: None,
        }
    }

    /// Change to one leaf of the (otherwise untouched) change root
    pub fn leaf(node_id: ModelNodeId, change: EditTree, leaf: QName, implied: bool) -> Self {
        Self {
            changed_leaf: Some(leaf),
            ..Self::new(node_id, change, implied)
        }
    }

    /// Identity of the node that was actually mutated
    pub fn change_element_id(&self) -> ModelNodeId {
        change_element_id(&self.change, &self.node_id, self.changed_leaf.as_ref())
    }
}

/// Every node touched by one edit request, child-first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationContext {
    infos: Vec<NotificationInfo>,
}

impl NotificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, info: NotificationInfo) {
        self.infos.push(info);
    }

    pub fn extend(&mut self, other: NotificationContext) {
        self.infos.extend(other.infos);
    }

    pub fn infos(&self) -> &[NotificationInfo] {
        &self.infos
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationInfo> {
        self.infos.iter()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Flag every info as coming from a derived edit
    pub fn mark_implied(&mut self) {
        for info in &mut self.infos {
            info.implied = true;
        }
    }
}

/// Change delivered to a subsystem for an edit-config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditConfigChangeNotification {
    pub model_node_id: ModelNodeId,
    pub change: EditTree,
    pub datastore: DatastoreName,
    pub client: ClientInfo,
    pub implied: bool,
    /// Leaf of the change root, for leaf-only changes
    pub changed_leaf: Option<QName>,
}

/// Change delivered to a subsystem for a copy-config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyConfigChangeNotification {
    /// Model root that was replaced
    pub root_id: ModelNodeId,
    pub datastore: DatastoreName,
    pub client: ClientInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotification {
    EditConfig(EditConfigChangeNotification),
    CopyConfig(CopyConfigChangeNotification),
}

impl ChangeNotification {
    /// Identity of the mutated node: the change tree's root (or its changed
    /// leaf), or the replaced model root for copy-config
    pub fn change_element_id(&self) -> ModelNodeId {
        match self {
            ChangeNotification::EditConfig(n) => {
                change_element_id(&n.change, &n.model_node_id, n.changed_leaf.as_ref())
            }
            ChangeNotification::CopyConfig(n) => n.root_id.clone(),
        }
    }

    /// Operation on the change root; copy-config counts as replace
    pub fn operation(&self) -> EditOperation {
        match self {
            ChangeNotification::EditConfig(n) => n
                .change
                .root()
                .map(|r| n.change.node(r).operation)
                .unwrap_or_default(),
            ChangeNotification::CopyConfig(_) => EditOperation::Replace,
        }
    }

    pub fn datastore(&self) -> DatastoreName {
        match self {
            ChangeNotification::EditConfig(n) => n.datastore,
            ChangeNotification::CopyConfig(n) => n.datastore,
        }
    }

    pub fn client(&self) -> &ClientInfo {
        match self {
            ChangeNotification::EditConfig(n) => &n.client,
            ChangeNotification::CopyConfig(n) => &n.client,
        }
    }

    pub fn is_implied(&self) -> bool {
        match self {
            ChangeNotification::EditConfig(n) => n.implied,
            ChangeNotification::CopyConfig(_) => false,
        }
    }
}

fn change_element_id(
    change: &EditTree,
    fallback: &ModelNodeId,
    leaf: Option<&QName>,
) -> ModelNodeId {
    let mut id = change
        .root()
        .map(|r| change.node_id(r))
        .unwrap_or_else(|| fallback.clone());
    if let Some(leaf) = leaf {
        id.add_rdn(Rdn::container(leaf.namespace.clone(), leaf.name.clone()));
    }
    id
}
