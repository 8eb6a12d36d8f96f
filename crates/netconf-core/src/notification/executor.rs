//! Grouping, refinement and delivery of subsystem notifications

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::change::{ChangeNotification, EditConfigChangeNotification, NotificationInfo};
use crate::errors::{NetconfError, Result};
use crate::identity::RequestScope;
use crate::model::{ClientInfo, DatastoreName};
use crate::subsystem::SubSystem;
use crate::tree::ModelTree;

/// Notifications of one subsystem
#[derive(Clone)]
pub struct SubsystemBatch {
    pub subsystem: Arc<dyn SubSystem>,
    pub notifications: Vec<ChangeNotification>,
}

impl fmt::Debug for SubsystemBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsystemBatch")
            .field("subsystem", &self.subsystem.id())
            .field("notifications", &self.notifications)
            .finish()
    }
}

/// Notifications grouped per subsystem id
#[derive(Debug, Clone, Default)]
pub struct SubsystemNotifications {
    batches: BTreeMap<String, SubsystemBatch>,
}

impl SubsystemNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refine `notification` into the batch of `subsystem`
    ///
    /// Returns false if it was subsumed by one already present.
    pub fn add(&mut self, subsystem: &Arc<dyn SubSystem>, notification: ChangeNotification) -> bool {
        let batch = self
            .batches
            .entry(subsystem.id().to_string())
            .or_insert_with(|| SubsystemBatch {
                subsystem: Arc::clone(subsystem),
                notifications: Vec::new(),
            });
        refine_and_add(&mut batch.notifications, notification)
    }

    /// Put every batch in document order of change-element identity
    pub fn sort(&mut self, scope: &RequestScope) {
        for batch in self.batches.values_mut() {
            batch
                .notifications
                .sort_by(|a, b| scope.compare(&a.change_element_id(), &b.change_element_id()));
        }
    }

    pub fn notifications_for(&self, subsystem_id: &str) -> &[ChangeNotification] {
        self.batches
            .get(subsystem_id)
            .map(|b| b.notifications.as_slice())
            .unwrap_or_default()
    }

    pub fn subsystem_ids(&self) -> impl Iterator<Item = &str> {
        self.batches.keys().map(String::as_str)
    }

    pub fn batches(&self) -> impl Iterator<Item = &SubsystemBatch> {
        self.batches.values()
    }

    /// All notifications, subsystem by subsystem
    pub fn all(&self) -> impl Iterator<Item = &ChangeNotification> {
        self.batches.values().flat_map(|b| b.notifications.iter())
    }

    pub fn total(&self) -> usize {
        self.batches.values().map(|b| b.notifications.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Append `new` unless an existing notification already covers it
///
/// A notification covers another when its change-element identity is a
/// prefix of the other's. Notifications covered by `new` are removed
/// first. Returns whether `new` was kept.
pub fn refine_and_add(list: &mut Vec<ChangeNotification>, new: ChangeNotification) -> bool {
    let new_id = new.change_element_id();
    if list
        .iter()
        .any(|existing| new_id.begins_with(&existing.change_element_id()))
    {
        return false;
    }
    list.retain(|existing| !existing.change_element_id().begins_with(&new_id));
    list.push(new);
    true
}

/// Routes model-tree notifications to the subsystems that own them
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsystemNotificationExecutor;

impl SubsystemNotificationExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Group and refine `infos` per owning subsystem
    ///
    /// The owner is the subsystem of the node the change happened under,
    /// or of the changed element itself for top-level changes. Destructive
    /// changes are also copied to the subsystem owning the changed
    /// element's schema location when that is a different one.
    pub fn build_notifications<'a>(
        &self,
        model: &dyn ModelTree,
        infos: impl IntoIterator<Item = &'a NotificationInfo>,
        datastore: DatastoreName,
        client: &ClientInfo,
    ) -> SubsystemNotifications {
        let mut out = SubsystemNotifications::new();
        for info in infos {
            let change_id = info.change_element_id();
            let owner_path = if info.node_id.is_root() {
                change_id.schema_path()
            } else {
                info.node_id.schema_path()
            };

            let notification = ChangeNotification::EditConfig(EditConfigChangeNotification {
                model_node_id: info.node_id.clone(),
                change: info.change.clone(),
                datastore,
                client: client.clone(),
                implied: info.implied,
                changed_leaf: info.changed_leaf.clone(),
            });

            let primary = model.subsystem_for(&owner_path);
            match &primary {
                Some(subsystem) => {
                    out.add(subsystem, notification.clone());
                }
                None => {
                    tracing::debug!(
                        node_id = %info.node_id,
                        schema_path = %owner_path,
                        "no subsystem owns changed node, skipping notification"
                    );
                }
            }

            if notification.operation().is_destructive() {
                if let Some(child_owner) = model.subsystem_for(&change_id.schema_path()) {
                    let differs = primary
                        .as_ref()
                        .map_or(true, |p| p.id() != child_owner.id());
                    if differs {
                        out.add(&child_owner, notification);
                    }
                }
            }
        }
        out
    }

    /// Give every subsystem a chance to veto; the first failure aborts
    ///
    /// # Errors
    ///
    /// A `Validation` failure from a subsystem becomes `PreCommitVeto`;
    /// other errors pass through unchanged.
    pub fn send_pre_commit_notifications(&self, notifications: &SubsystemNotifications) -> Result<()> {
        for batch in notifications.batches() {
            let id = batch.subsystem.id().to_string();
            tracing::debug!(
                subsystem = %id,
                notification_count = batch.notifications.len(),
                "pre-commit notification"
            );
            batch
                .subsystem
                .notify_pre_commit_change(&batch.notifications)
                .map_err(|err| match err {
                    NetconfError::Validation { errors } => NetconfError::PreCommitVeto {
                        subsystem: id.clone(),
                        errors,
                    },
                    other => other,
                })?;
        }
        Ok(())
    }

    /// Post-commit delivery; failures are logged and do not stop delivery
    /// to other subsystems
    ///
    /// Returns the number of subsystems that accepted their notifications.
    pub fn send_notifications(&self, notifications: &SubsystemNotifications) -> usize {
        let mut delivered = 0;
        for batch in notifications.batches() {
            match batch.subsystem.notify_changed(&batch.notifications) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        subsystem = %batch.subsystem.id(),
                        notification_count = batch.notifications.len(),
                        error = %err,
                        "post-commit notification failed"
                    );
                }
            }
        }
        delivered
    }
}
