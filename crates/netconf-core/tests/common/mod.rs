#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use netconf_core::datastore::EditValidator;
use netconf_core::edit::{EditChangeNode, EditMatchNode, EditOperation};
use netconf_core::errors::{ErrorTag, NetconfError, Result, RpcError};
use netconf_core::model::{LeafValue, QueryParams};
use netconf_core::nbi::StaticPrefixResolver;
use netconf_core::subsystem::StateAttributeRequest;
use netconf_core::{
    ChangeNotification, ClientInfo, ConfigElement, DataStore, DatastoreName, EditConfigRequest,
    EditTree, InMemoryModelTree, ModelNodeId, ModelTree, QName, Rdn, SchemaPath, SubSystem,
};
use netconf_core_types::SessionId;

pub const NS: &str = "urn:example:jukebox";

pub fn q(name: &str) -> QName {
    QName::new(NS, name)
}

pub fn path(names: &[&str]) -> SchemaPath {
    SchemaPath::from_qnames(names.iter().map(|n| q(n)).collect())
}

pub fn client(session: u32) -> ClientInfo {
    ClientInfo::new(SessionId::new(session), format!("user{}", session))
}

// ===== Identities =====

pub fn jukebox_id() -> ModelNodeId {
    ModelNodeId::from_rdns(vec![Rdn::container(NS, "jukebox")])
}

pub fn library_id() -> ModelNodeId {
    jukebox_id().with_rdn(Rdn::container(NS, "library"))
}

pub fn stats_id() -> ModelNodeId {
    jukebox_id().with_rdn(Rdn::container(NS, "stats"))
}

pub fn player_id() -> ModelNodeId {
    jukebox_id().with_rdn(Rdn::container(NS, "player"))
}

pub fn artist_id(name: &str) -> ModelNodeId {
    library_id()
        .with_rdn(Rdn::container(NS, "artist"))
        .with_rdn(Rdn::key(NS, "name", name))
}

pub fn album_id(artist: &str, album: &str) -> ModelNodeId {
    artist_id(artist)
        .with_rdn(Rdn::container(NS, "album"))
        .with_rdn(Rdn::key(NS, "name", album))
}

// ===== Requests =====

/// `jukebox/library/artist[name]/album[name]` with a year leaf; only the
/// album node carries `album_op`
pub fn album_request(
    message_id: &str,
    artist: &str,
    album: &str,
    album_op: EditOperation,
) -> EditConfigRequest {
    let mut tree = EditTree::new();
    let jukebox = tree.add_root(q("jukebox"), EditOperation::Merge);
    let library = tree.add_child(jukebox, q("library"), EditOperation::Merge);
    let artist_node = tree.add_child(library, q("artist"), EditOperation::Merge);
    tree.add_match_node(artist_node, EditMatchNode::new(q("name"), artist));
    let album_node = tree.add_child(artist_node, q("album"), album_op);
    tree.add_match_node(album_node, EditMatchNode::new(q("name"), album));
    tree.add_change_node(
        album_node,
        EditChangeNode::new(q("year"), LeafValue::Uint(1995)),
    );
    EditConfigRequest::new(message_id, DatastoreName::Running, tree)
}

/// Creates the empty `jukebox/library` and `jukebox/player` skeleton
pub fn skeleton_request(message_id: &str) -> EditConfigRequest {
    let mut tree = EditTree::new();
    let jukebox = tree.add_root(q("jukebox"), EditOperation::Merge);
    tree.add_child(jukebox, q("library"), EditOperation::Merge);
    let player = tree.add_child(jukebox, q("player"), EditOperation::Merge);
    tree.add_change_node(player, EditChangeNode::new(q("gap"), LeafValue::Uint(0)));
    EditConfigRequest::new(message_id, DatastoreName::Running, tree)
}

/// Sets `jukebox/player/gap`
pub fn gap_request(message_id: &str, gap: u64) -> EditConfigRequest {
    let mut tree = EditTree::with_base(jukebox_id());
    let player = tree.add_root(q("player"), EditOperation::Merge);
    tree.add_change_node(player, EditChangeNode::new(q("gap"), LeafValue::Uint(gap)));
    EditConfigRequest::new(message_id, DatastoreName::Running, tree)
}

// ===== Subsystems =====

/// Subsystem recording what it is told, optionally failing
#[derive(Default)]
pub struct RecordingSubsystem {
    id: String,
    veto: bool,
    fail_after_commit: bool,
    state: BTreeMap<String, String>,
    pub pre_commit: Mutex<Vec<ChangeNotification>>,
    pub changed: Mutex<Vec<ChangeNotification>>,
    pub state_requests: Mutex<Vec<ModelNodeId>>,
}

impl RecordingSubsystem {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn vetoing(mut self) -> Self {
        self.veto = true;
        self
    }

    pub fn failing_after_commit(mut self) -> Self {
        self.fail_after_commit = true;
        self
    }

    /// Report `leaf = value` for every node state is asked of
    pub fn with_state(mut self, leaf: &str, value: &str) -> Self {
        self.state.insert(leaf.to_string(), value.to_string());
        self
    }

    pub fn pre_commit_count(&self) -> usize {
        self.pre_commit.lock().unwrap().len()
    }

    pub fn changed_notifications(&self) -> Vec<ChangeNotification> {
        self.changed.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.pre_commit.lock().unwrap().clear();
        self.changed.lock().unwrap().clear();
        self.state_requests.lock().unwrap().clear();
    }
}

impl SubSystem for RecordingSubsystem {
    fn id(&self) -> &str {
        &self.id
    }

    fn notify_pre_commit_change(&self, notifications: &[ChangeNotification]) -> Result<()> {
        self.pre_commit
            .lock()
            .unwrap()
            .extend(notifications.iter().cloned());
        if self.veto {
            return Err(NetconfError::validation(
                RpcError::new(ErrorTag::InvalidValue).with_message("rejected by test subsystem"),
            ));
        }
        Ok(())
    }

    fn notify_changed(&self, notifications: &[ChangeNotification]) -> Result<()> {
        self.changed
            .lock()
            .unwrap()
            .extend(notifications.iter().cloned());
        if self.fail_after_commit {
            return Err(NetconfError::Internal {
                message: "post-commit handler failed".to_string(),
            });
        }
        Ok(())
    }

    fn retrieve_state_attributes(
        &self,
        requests: &BTreeMap<ModelNodeId, StateAttributeRequest>,
        _params: &QueryParams,
    ) -> Result<BTreeMap<ModelNodeId, Vec<ConfigElement>>> {
        let mut out = BTreeMap::new();
        for (id, request) in requests {
            self.state_requests.lock().unwrap().push(id.clone());
            let elements = self
                .state
                .iter()
                .filter(|(leaf, _)| {
                    request.leaves.is_empty() || request.leaves.iter().any(|l| l.name == **leaf)
                })
                .map(|(leaf, value)| ConfigElement::leaf(NS, leaf.clone(), value.clone()))
                .collect();
            out.insert(id.clone(), elements);
        }
        Ok(out)
    }
}

// ===== Validators =====

/// Records the number of albums on every diff that creates one
///
/// The derived edit sets `jukebox/stats/album-count`, which itself
/// derives nothing.
///
/// Every (message-id, session) it validates for is kept in `seen`.
#[derive(Default)]
pub struct AlbumCountValidator {
    albums: AtomicU64,
    pub seen: Mutex<Vec<(String, SessionId)>>,
}

impl EditValidator for AlbumCountValidator {
    fn validate(
        &self,
        _model: &dyn ModelTree,
        diff: &EditTree,
        request: &EditConfigRequest,
        client: &ClientInfo,
    ) -> Result<Vec<EditConfigRequest>> {
        self.seen
            .lock()
            .unwrap()
            .push((request.message_id.clone(), client.session_id));
        let creates_album = diff.roots().iter().any(|root| {
            diff.descendants(*root)
                .into_iter()
                .any(|n| diff.node(n).qname.name == "album")
        });
        if !creates_album {
            return Ok(Vec::new());
        }
        let count = self.albums.fetch_add(1, Ordering::SeqCst) + 1;

        let mut tree = EditTree::with_base(jukebox_id());
        let stats = tree.add_root(q("stats"), EditOperation::Merge);
        tree.add_change_node(
            stats,
            EditChangeNode::new(q("album-count"), LeafValue::Uint(count)),
        );
        Ok(vec![EditConfigRequest::derived(
            format!("derived-{}", count),
            request.target,
            tree,
        )])
    }
}

/// Derives a new counter edit from every diff, forever
#[derive(Default)]
pub struct RunawayValidator {
    counter: AtomicU64,
}

impl EditValidator for RunawayValidator {
    fn validate(
        &self,
        _model: &dyn ModelTree,
        _diff: &EditTree,
        request: &EditConfigRequest,
        _client: &ClientInfo,
    ) -> Result<Vec<EditConfigRequest>> {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut tree = EditTree::with_base(jukebox_id());
        let player = tree.add_root(q("player"), EditOperation::Merge);
        tree.add_change_node(player, EditChangeNode::new(q("counter"), LeafValue::Uint(next)));
        Ok(vec![EditConfigRequest::derived(
            format!("runaway-{}", next),
            request.target,
            tree,
        )])
    }
}

// ===== Stores =====

pub fn prefixes() -> Arc<StaticPrefixResolver> {
    Arc::new(StaticPrefixResolver::new().with(NS, "jbox"))
}

/// Running datastore over an in-memory tree with `subsystems` registered
pub fn running_store(subsystems: Vec<(SchemaPath, Arc<dyn SubSystem>)>) -> DataStore {
    DataStore::new(DatastoreName::Running, Box::new(jukebox_tree(subsystems)))
        .with_prefix_resolver(prefixes())
}

/// In-memory tree knowing the jukebox list keys
pub fn jukebox_tree(subsystems: Vec<(SchemaPath, Arc<dyn SubSystem>)>) -> InMemoryModelTree {
    let mut tree = InMemoryModelTree::new();
    tree.register_list_keys(path(&["jukebox", "library", "artist"]), vec![q("name")]);
    tree.register_list_keys(
        path(&["jukebox", "library", "artist", "album"]),
        vec![q("name")],
    );
    for (schema_path, subsystem) in subsystems {
        tree.register_subsystem(schema_path, subsystem);
    }
    tree
}

/// Number of album elements anywhere below `elements`
pub fn count_named(elements: &[ConfigElement], name: &str) -> usize {
    elements
        .iter()
        .map(|e| usize::from(e.name == name) + count_named(&e.children, name))
        .sum()
}
