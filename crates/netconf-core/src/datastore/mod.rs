//! Datastore orchestration: locking, edit-config, get and copy-config
//!
//! ## Logging Ownership
//!
//! The public operations of [`DataStore`] own lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The model tree, notification executor and filter code below use only
//! `tracing::debug!()`/`warn!()`.

pub mod lock;
pub mod transaction;
pub mod validation;

pub use lock::LockState;
pub use transaction::{ModelTreeTransactionService, TransactionService};
pub use validation::EditValidator;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use netconf_core_types::{RequestContext, SessionId};

use crate::config::DataStoreConfig;
use crate::edit::{EditConfigRequest, EditTree, TestOption};
use crate::errors::{NetconfError, Result};
use crate::filter::{apply_filter, FilterNode};
use crate::identity::{ModelNodeId, RequestScope};
use crate::model::{ClientInfo, ConfigElement, DatastoreName, QueryParams};
use crate::nbi::{NbiNotificationHelper, NetconfConfigChange, PrefixResolver};
use crate::notification::{
    ChangeNotification, CopyConfigChangeNotification, NotificationContext,
    SubsystemNotificationExecutor, SubsystemNotifications,
};
use crate::subsystem::{StateAttributeRequest, SubSystem};
use crate::tree::ModelTree;
use crate::{log_op_end, log_op_error, log_op_start};

/// Where `copy_from` takes its configuration
#[derive(Debug, Clone, Copy)]
pub enum CopySource<'a> {
    Elements(&'a [ConfigElement]),
    DataStore(&'a DataStore),
}

/// One configuration datastore (running, candidate or startup)
///
/// Methods take `&mut self`; callers serialize access per datastore.
pub struct DataStore {
    name: DatastoreName,
    lock: LockState,
    uncommitted_changes: bool,
    confirmed_commit_pending: bool,
    model: Box<dyn ModelTree>,
    validator: Option<Arc<dyn EditValidator>>,
    transactions: Arc<dyn TransactionService>,
    executor: SubsystemNotificationExecutor,
    nbi: NbiNotificationHelper,
    config: DataStoreConfig,
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("name", &self.name)
            .field("lock", &self.lock)
            .field("uncommitted_changes", &self.uncommitted_changes)
            .field("confirmed_commit_pending", &self.confirmed_commit_pending)
            .field("has_validator", &self.validator.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataStore {
    pub fn new(name: DatastoreName, model: Box<dyn ModelTree>) -> Self {
        Self {
            name,
            lock: LockState::Unlocked,
            uncommitted_changes: false,
            confirmed_commit_pending: false,
            model,
            validator: None,
            transactions: Arc::new(ModelTreeTransactionService),
            executor: SubsystemNotificationExecutor::new(),
            nbi: NbiNotificationHelper::default(),
            config: DataStoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DataStoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn EditValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_transaction_service(mut self, transactions: Arc<dyn TransactionService>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_prefix_resolver(mut self, resolver: Arc<dyn PrefixResolver>) -> Self {
        self.nbi = NbiNotificationHelper::new(resolver);
        self
    }

    pub fn name(&self) -> DatastoreName {
        self.name
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn lock_owner(&self) -> Option<SessionId> {
        self.lock.owner()
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        self.uncommitted_changes
    }

    pub fn confirmed_commit_pending(&self) -> bool {
        self.confirmed_commit_pending
    }

    pub fn config(&self) -> &DataStoreConfig {
        &self.config
    }

    pub fn model(&self) -> &dyn ModelTree {
        self.model.as_ref()
    }

    /// Candidate changes were committed or discarded
    pub fn mark_committed(&mut self) {
        self.uncommitted_changes = false;
    }

    pub fn set_confirmed_commit_pending(&mut self, pending: bool) {
        self.confirmed_commit_pending = pending;
    }

    // ===== Locking =====

    /// Take the datastore lock for `session`
    ///
    /// Re-locking by the current owner succeeds.
    ///
    /// # Errors
    ///
    /// - `LockDeniedOtherOwner` when another session holds the lock
    /// - `LockDeniedUncommittedChanges` when the datastore has uncommitted changes
    /// - `LockDeniedConfirmedCommitPending` on running while a confirmed commit is pending
    pub fn lock(&mut self, session: SessionId) -> Result<()> {
        log_op_start!("lock", datastore = %self.name, session_id = %session);
        let start = Instant::now();

        self.lock_impl(session).map_err(|e| {
            log_op_error!(
                "lock",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name,
                session_id = %session
            );
            e
        })?;

        log_op_end!(
            "lock",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            session_id = %session
        );
        Ok(())
    }

    fn lock_impl(&mut self, session: SessionId) -> Result<()> {
        let datastore = self.name.to_string();
        if let Some(owner) = self.lock.held_by_other(session) {
            return Err(NetconfError::LockDeniedOtherOwner { datastore, owner });
        }
        if self.lock.is_locked() {
            return Ok(());
        }
        if self.uncommitted_changes {
            return Err(NetconfError::LockDeniedUncommittedChanges { datastore });
        }
        if self.confirmed_commit_pending && self.name == DatastoreName::Running {
            return Err(NetconfError::LockDeniedConfirmedCommitPending { datastore });
        }
        self.lock = LockState::LockedBy(session);
        Ok(())
    }

    /// Release the lock held by `session`
    ///
    /// # Errors
    ///
    /// - `UnlockNoActiveLock` when the datastore is not locked
    /// - `UnlockOtherOwner` when another session holds the lock
    pub fn unlock(&mut self, session: SessionId) -> Result<()> {
        log_op_start!("unlock", datastore = %self.name, session_id = %session);
        let start = Instant::now();

        self.unlock_impl(session).map_err(|e| {
            log_op_error!(
                "unlock",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name,
                session_id = %session
            );
            e
        })?;

        log_op_end!(
            "unlock",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            session_id = %session
        );
        Ok(())
    }

    fn unlock_impl(&mut self, session: SessionId) -> Result<()> {
        let datastore = self.name.to_string();
        match self.lock {
            LockState::Unlocked => Err(NetconfError::UnlockNoActiveLock { datastore }),
            LockState::LockedBy(owner) if owner != session => {
                Err(NetconfError::UnlockOtherOwner { datastore, owner })
            }
            LockState::LockedBy(_) => {
                self.lock = LockState::Unlocked;
                Ok(())
            }
        }
    }

    fn check_in_use(&self, session: SessionId) -> Result<()> {
        match self.lock.held_by_other(session) {
            Some(owner) => Err(NetconfError::InUse {
                datastore: self.name.to_string(),
                owner,
            }),
            None => Ok(()),
        }
    }

    // ===== edit-config =====

    /// Apply an edit-config request
    ///
    /// Validator-derived edits are applied recursively in the same
    /// transaction. Subsystems may veto before commit; after commit they
    /// are notified best-effort. Returns the northbound config-change
    /// notifications for the edit (empty when projection is disabled or
    /// nothing visible changed).
    ///
    /// # Errors
    ///
    /// - `InUse` when another session holds the lock
    /// - `InvalidEditRequest` / `TestOptionNotSupported` for malformed requests
    /// - `Validation` for data-exists, data-missing and validator failures
    /// - `PreCommitVeto` when a subsystem rejects the change
    /// - `DerivedEditDepthExceeded` when derived edits nest too deep
    ///
    /// Every error leaves the model tree as it was.
    pub fn edit(
        &mut self,
        request: &EditConfigRequest,
        client: &ClientInfo,
    ) -> Result<Vec<NetconfConfigChange>> {
        log_op_start!(
            "edit_config",
            datastore = %self.name,
            session_id = %client.session_id,
            message_id = %request.message_id
        );
        let start = Instant::now();

        let changes = self.edit_impl(request, client).map_err(|e| {
            log_op_error!(
                "edit_config",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name,
                session_id = %client.session_id,
                message_id = %request.message_id
            );
            e
        })?;

        log_op_end!(
            "edit_config",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            session_id = %client.session_id,
            message_id = %request.message_id,
            notification_count = changes.len()
        );
        Ok(changes)
    }

    fn edit_impl(
        &mut self,
        request: &EditConfigRequest,
        client: &ClientInfo,
    ) -> Result<Vec<NetconfConfigChange>> {
        self.check_in_use(client.session_id)?;

        let scope = RequestScope::new(
            RequestContext::new().with_message_id(request.message_id.clone()),
        );
        let run = EditRun {
            datastore: self.name,
            client,
            config: &self.config,
            validator: self.validator.as_deref(),
            executor: &self.executor,
            scope: &scope,
        };
        let mut committed: Option<EditResult> = None;
        self.transactions
            .execute_with_tx_required(&mut *self.model, &mut |model| {
                committed = Some(run.execute(model, request)?);
                Ok(())
            })?;
        let result = committed.ok_or_else(|| NetconfError::Internal {
            message: "transaction committed without running the edit".to_string(),
        })?;

        let delivered = self.executor.send_notifications(&result.notifications);
        tracing::debug!(
            request_id = %scope.context().request_id,
            message_id = %request.message_id,
            derived_edits = result.derived_edits,
            subsystems = delivered,
            cached_comparisons = scope.cached_comparisons(),
            "edit committed"
        );

        if result.changed && self.name == DatastoreName::Candidate {
            self.uncommitted_changes = true;
        }
        Ok(self.project(&result.notifications, client))
    }

    fn project(
        &self,
        notifications: &SubsystemNotifications,
        client: &ClientInfo,
    ) -> Vec<NetconfConfigChange> {
        if !self.config.nbi_notifications_enabled {
            return Vec::new();
        }
        self.nbi.build_config_changes(notifications, self.name, client)
    }

    // ===== get / get-config =====

    /// Configuration only
    ///
    /// # Errors
    ///
    /// Storage failures from the model tree.
    pub fn get_config(
        &self,
        filter: Option<&FilterNode>,
        params: &QueryParams,
    ) -> Result<Vec<ConfigElement>> {
        log_op_start!("get_config", datastore = %self.name);
        let start = Instant::now();

        let elements = self.model.get_config(filter, params).map_err(|e| {
            log_op_error!(
                "get_config",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name
            );
            e
        })?;

        log_op_end!(
            "get_config",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            element_count = elements.len()
        );
        Ok(elements)
    }

    /// Configuration plus the state attributes subsystems report for it
    ///
    /// # Errors
    ///
    /// Storage failures, or a subsystem failing to retrieve state.
    pub fn get(
        &self,
        filter: Option<&FilterNode>,
        params: &QueryParams,
    ) -> Result<Vec<ConfigElement>> {
        log_op_start!("get", datastore = %self.name);
        let start = Instant::now();

        let elements = self.get_impl(filter, params).map_err(|e| {
            log_op_error!(
                "get",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name
            );
            e
        })?;

        log_op_end!(
            "get",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            element_count = elements.len()
        );
        Ok(elements)
    }

    fn get_impl(
        &self,
        filter: Option<&FilterNode>,
        params: &QueryParams,
    ) -> Result<Vec<ConfigElement>> {
        let scope = RequestScope::new(RequestContext::new());
        // depth applies to the merged result, state included
        let mut elements = self.model.get_config(filter, &QueryParams::default())?;

        let mut locations = self.model.state_locations(filter);
        locations.sort_by(|a, b| scope.compare(&a.node_id, &b.node_id));

        type StateBatch = (Arc<dyn SubSystem>, BTreeMap<ModelNodeId, StateAttributeRequest>);
        let mut by_subsystem: BTreeMap<String, StateBatch> = BTreeMap::new();
        for location in locations {
            let path = location.node_id.schema_path();
            match self.model.subsystem_for(&path) {
                Some(subsystem) => {
                    by_subsystem
                        .entry(subsystem.id().to_string())
                        .or_insert_with(|| (Arc::clone(&subsystem), BTreeMap::new()))
                        .1
                        .insert(location.node_id, location.request);
                }
                None => {
                    tracing::debug!(
                        node_id = %location.node_id,
                        schema_path = %path,
                        "no subsystem owns state node, skipping"
                    );
                }
            }
        }

        let mut retrieved: Vec<(ModelNodeId, Vec<ConfigElement>)> = Vec::new();
        for (subsystem_id, (subsystem, requests)) in by_subsystem {
            let states = subsystem.retrieve_state_attributes(&requests, params)?;
            tracing::debug!(
                request_id = %scope.context().request_id,
                subsystem = %subsystem_id,
                requested = requests.len(),
                returned = states.len(),
                "retrieved state attributes"
            );
            retrieved.extend(states);
        }
        // ancestors first, so nested state lands under its merged parent
        retrieved.sort_by(|a, b| scope.compare(&a.0, &b.0));
        for (node_id, state) in retrieved {
            match ConfigElement::ensure_path(&mut elements, &node_id) {
                Some(target) => target.children.extend(state),
                None => elements.extend(state),
            }
        }

        if self.config.reapply_filter_on_get {
            if let Some(filter) = filter {
                elements = apply_filter(filter, &elements);
            }
        }
        if let Some(depth) = params.depth {
            ConfigElement::truncate_depth(&mut elements, depth);
        }
        Ok(elements)
    }

    // ===== copy-config =====

    /// Replace the whole configuration with `source`
    ///
    /// Each new model root produces one copy-config notification for its
    /// owning subsystem.
    ///
    /// # Errors
    ///
    /// - `InUse` when another session holds the lock
    /// - `PreCommitVeto` when a subsystem rejects the copy
    /// - storage failures from either datastore
    pub fn copy_from(
        &mut self,
        client: &ClientInfo,
        source: CopySource<'_>,
    ) -> Result<Vec<NetconfConfigChange>> {
        log_op_start!(
            "copy_config",
            datastore = %self.name,
            session_id = %client.session_id
        );
        let start = Instant::now();

        let changes = self.copy_impl(client, source).map_err(|e| {
            log_op_error!(
                "copy_config",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                datastore = %self.name,
                session_id = %client.session_id
            );
            e
        })?;

        log_op_end!(
            "copy_config",
            duration_ms = start.elapsed().as_millis() as u64,
            datastore = %self.name,
            session_id = %client.session_id,
            notification_count = changes.len()
        );
        Ok(changes)
    }

    fn copy_impl(
        &mut self,
        client: &ClientInfo,
        source: CopySource<'_>,
    ) -> Result<Vec<NetconfConfigChange>> {
        self.check_in_use(client.session_id)?;
        let elements = match source {
            CopySource::Elements(elements) => elements.to_vec(),
            CopySource::DataStore(other) => {
                other.model.get_config(None, &QueryParams::default())?
            }
        };

        let datastore = self.name;
        let executor = &self.executor;
        let scope = RequestScope::new(RequestContext::new());
        let mut committed: Option<SubsystemNotifications> = None;
        self.transactions
            .execute_with_tx_required(&mut *self.model, &mut |model| {
                let roots = model.copy_config(&elements)?;
                let mut notifications = SubsystemNotifications::new();
                for root_id in roots {
                    let path = root_id.schema_path();
                    let notification =
                        ChangeNotification::CopyConfig(CopyConfigChangeNotification {
                            root_id,
                            datastore,
                            client: client.clone(),
                        });
                    match model.subsystem_for(&path) {
                        Some(subsystem) => {
                            notifications.add(&subsystem, notification);
                        }
                        None => {
                            tracing::debug!(
                                schema_path = %path,
                                "no subsystem owns copied root, skipping notification"
                            );
                        }
                    }
                }
                notifications.sort(&scope);
                executor.send_pre_commit_notifications(&notifications)?;
                committed = Some(notifications);
                Ok(())
            })?;
        let notifications = committed.ok_or_else(|| NetconfError::Internal {
            message: "transaction committed without running the copy".to_string(),
        })?;

        self.executor.send_notifications(&notifications);
        if self.name == DatastoreName::Candidate {
            self.uncommitted_changes = true;
        }
        Ok(self.project(&notifications, client))
    }
}

/// Everything one edit needs besides the model tree
struct EditRun<'a> {
    datastore: DatastoreName,
    client: &'a ClientInfo,
    config: &'a DataStoreConfig,
    validator: Option<&'a dyn EditValidator>,
    executor: &'a SubsystemNotificationExecutor,
    scope: &'a RequestScope,
}

/// Changes made by one request, derived or not
struct AppliedEdit {
    context: NotificationContext,
    diffs: Vec<EditTree>,
}

struct EditResult {
    notifications: SubsystemNotifications,
    changed: bool,
    derived_edits: usize,
}

impl EditRun<'_> {
    fn execute(&self, model: &mut dyn ModelTree, request: &EditConfigRequest) -> Result<EditResult> {
        let mut applied = Vec::new();
        self.apply(model, request, 0, &mut applied)?;

        let diffs: Vec<EditTree> = applied
            .iter()
            .flat_map(|a| a.diffs.iter().cloned())
            .collect();
        if self.config.post_edit_validation {
            if let Some(validator) = self.validator {
                validator.validate_dynamic(&*model, &diffs)?;
            }
        }

        let mut notifications = self.executor.build_notifications(
            &*model,
            applied.iter().flat_map(|a| a.context.iter()),
            self.datastore,
            self.client,
        );
        notifications.sort(self.scope);
        self.executor.send_pre_commit_notifications(&notifications)?;

        Ok(EditResult {
            notifications,
            changed: !diffs.is_empty(),
            derived_edits: applied.len().saturating_sub(1),
        })
    }

    fn apply(
        &self,
        model: &mut dyn ModelTree,
        request: &EditConfigRequest,
        depth: usize,
        applied: &mut Vec<AppliedEdit>,
    ) -> Result<()> {
        if depth > self.config.max_derived_edit_depth {
            return Err(NetconfError::DerivedEditDepthExceeded {
                max_depth: self.config.max_derived_edit_depth,
            });
        }
        self.check_request(request)?;

        let outcome = model.edit_config(request, self.client)?;
        let mut context = outcome.context;
        if depth > 0 {
            context.mark_implied();
        }
        tracing::debug!(
            message_id = %request.message_id,
            derived_depth = depth,
            diff_count = outcome.diffs.len(),
            "edit applied"
        );

        let diffs = outcome.diffs;
        applied.push(AppliedEdit {
            context,
            diffs: diffs.clone(),
        });

        if !self.config.post_edit_validation {
            return Ok(());
        }
        let Some(validator) = self.validator else {
            return Ok(());
        };
        for diff in &diffs {
            let derived = validator.validate(&*model, diff, request, self.client)?;
            for derived_request in &derived {
                self.apply(model, derived_request, depth + 1, applied)?;
            }
        }
        Ok(())
    }

    fn check_request(&self, request: &EditConfigRequest) -> Result<()> {
        request.validate()?;
        if request.target != self.datastore {
            return Err(NetconfError::InvalidEditRequest {
                reason: format!(
                    "request targets {} but was sent to {}",
                    request.target, self.datastore
                ),
            });
        }
        if request.test_option != TestOption::Set {
            return Err(NetconfError::TestOptionNotSupported {
                option: request.test_option.as_str().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::InMemoryModelTree;

    fn store(name: DatastoreName) -> DataStore {
        DataStore::new(name, Box::new(InMemoryModelTree::new()))
    }

    #[test]
    fn test_lock_denied_with_uncommitted_changes() {
        let mut candidate = store(DatastoreName::Candidate);
        candidate.uncommitted_changes = true;

        let err = candidate.lock(SessionId::new(1)).unwrap_err();
        assert!(matches!(err, NetconfError::LockDeniedUncommittedChanges { .. }));

        candidate.mark_committed();
        assert!(candidate.lock(SessionId::new(1)).is_ok());
    }

    #[test]
    fn test_confirmed_commit_blocks_running_only() {
        let mut running = store(DatastoreName::Running);
        running.set_confirmed_commit_pending(true);
        let err = running.lock(SessionId::new(1)).unwrap_err();
        assert!(matches!(err, NetconfError::LockDeniedConfirmedCommitPending { .. }));

        let mut startup = store(DatastoreName::Startup);
        startup.set_confirmed_commit_pending(true);
        assert!(startup.lock(SessionId::new(1)).is_ok());
    }

    #[test]
    fn test_edit_rejects_other_test_options() {
        let mut running = store(DatastoreName::Running);
        let request = EditConfigRequest::new("1", DatastoreName::Running, EditTree::new())
            .with_test_option(TestOption::TestOnly);

        let err = running
            .edit(&request, &ClientInfo::new(SessionId::new(1), "admin"))
            .unwrap_err();
        assert!(matches!(err, NetconfError::TestOptionNotSupported { .. }));
    }

    #[test]
    fn test_edit_rejects_wrong_target() {
        let mut running = store(DatastoreName::Running);
        let request = EditConfigRequest::new("1", DatastoreName::Candidate, EditTree::new());

        let err = running
            .edit(&request, &ClientInfo::new(SessionId::new(1), "admin"))
            .unwrap_err();
        assert!(matches!(err, NetconfError::InvalidEditRequest { .. }));
    }
}
