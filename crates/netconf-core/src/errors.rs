use netconf_core_types::SessionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using NetconfError
pub type Result<T> = std::result::Result<T, NetconfError>;

// ========== RPC Error Facility ==========

/// NETCONF `error-tag` values (RFC 6241 Appendix A)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
    MalformedMessage,
}

impl ErrorTag {
    /// Wire representation of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::PartialOperation => "partial-operation",
            ErrorTag::MalformedMessage => "malformed-message",
        }
    }
}

/// NETCONF `error-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }
}

/// NETCONF `error-severity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

/// App tag attached to subsystem pre-commit vetoes
pub const APP_TAG_SUBSYSTEM_VETO: &str = "subsystem-veto";

/// Structured `<rpc-error>`
///
/// Built with the `with_*` methods and rendered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    error_type: ErrorType,
    error_tag: ErrorTag,
    severity: ErrorSeverity,
    app_tag: Option<String>,
    path: Option<String>,
    message: String,
    info: BTreeMap<String, String>,
}

impl RpcError {
    /// Create an application-level error with the given tag
    pub fn new(error_tag: ErrorTag) -> Self {
        Self {
            error_type: ErrorType::Application,
            error_tag,
            severity: ErrorSeverity::Error,
            app_tag: None,
            path: None,
            message: String::new(),
            info: BTreeMap::new(),
        }
    }

    /// `data-exists` for a create on an existing node
    pub fn data_exists(path: impl Into<String>) -> Self {
        Self::new(ErrorTag::DataExists)
            .with_path(path)
            .with_message("Data already exists; cannot be created")
    }

    /// `data-missing` for a delete on an absent node
    pub fn data_missing(path: impl Into<String>) -> Self {
        Self::new(ErrorTag::DataMissing)
            .with_path(path)
            .with_message("Data does not exist; cannot be deleted")
    }

    /// Generic `operation-failed` carrying the full cause chain
    ///
    /// Used at the outermost dispatch boundary for failures nothing below
    /// it classified.
    pub fn operation_failed_from(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut rpc = Self::new(ErrorTag::OperationFailed).with_message(err.to_string());
        let mut depth = 0;
        let mut source = err.source();
        while let Some(cause) = source {
            rpc = rpc.with_info(format!("cause.{}", depth), cause.to_string());
            depth += 1;
            source = cause.source();
        }
        rpc
    }

    pub fn with_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_app_tag(mut self, app_tag: impl Into<String>) -> Self {
        self.app_tag = Some(app_tag.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add one `error-info` entry
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn error_tag(&self) -> ErrorTag {
        self.error_tag
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn app_tag(&self) -> Option<&str> {
        self.app_tag.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}]", self.error_type.as_str(), self.error_tag.as_str())?;
        if let Some(app_tag) = &self.app_tag {
            write!(f, " ({})", app_tag)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " at {}", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

// ========== End RPC Error Facility ==========

/// Stable classification of every [`NetconfError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LockDenied,
    InUse,
    NoActiveLock,
    InvalidEditRequest,
    OperationNotSupported,
    Validation,
    PreCommitVeto,
    MalformedNodeId,
    DerivedEditDepthExceeded,
    Persistence,
    Transaction,
    Serialization,
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::LockDenied => "ERR_LOCK_DENIED",
            ErrorKind::InUse => "ERR_IN_USE",
            ErrorKind::NoActiveLock => "ERR_NO_ACTIVE_LOCK",
            ErrorKind::InvalidEditRequest => "ERR_INVALID_EDIT_REQUEST",
            ErrorKind::OperationNotSupported => "ERR_OPERATION_NOT_SUPPORTED",
            ErrorKind::Validation => "ERR_VALIDATION",
            ErrorKind::PreCommitVeto => "ERR_PRE_COMMIT_VETO",
            ErrorKind::MalformedNodeId => "ERR_MALFORMED_NODE_ID",
            ErrorKind::DerivedEditDepthExceeded => "ERR_DERIVED_EDIT_DEPTH_EXCEEDED",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Transaction => "ERR_TRANSACTION",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Error taxonomy for the configuration core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetconfError {
    // ===== Lock Errors =====
    /// Lock held by another session
    #[error("Lock denied on {datastore}: locked by session {owner}")]
    LockDeniedOtherOwner { datastore: String, owner: SessionId },

    /// Candidate has changes that were never committed or discarded
    #[error("Lock denied on {datastore}: datastore has uncommitted changes")]
    LockDeniedUncommittedChanges { datastore: String },

    /// A confirmed commit is waiting for its confirming commit
    #[error("Lock denied on {datastore}: confirmed commit is pending")]
    LockDeniedConfirmedCommitPending { datastore: String },

    #[error("Unlock failed on {datastore}: no active lock")]
    UnlockNoActiveLock { datastore: String },

    #[error("Unlock failed on {datastore}: lock is held by session {owner}")]
    UnlockOtherOwner { datastore: String, owner: SessionId },

    /// Edit or copy attempted while another session holds the lock
    #[error("Datastore {datastore} is locked by session {owner}")]
    InUse { datastore: String, owner: SessionId },

    // ===== Request Errors =====
    /// Structurally invalid edit request, detected before any mutation
    #[error("Invalid edit request: {reason}")]
    InvalidEditRequest { reason: String },

    #[error("test-option '{option}' is not supported")]
    TestOptionNotSupported { option: String },

    #[error("Malformed node identity segment '{segment}': {reason}")]
    MalformedNodeId { segment: String, reason: String },

    // ===== Validation Errors =====
    /// Static or dynamic validation failure
    #[error("Validation failed with {} error(s)", .errors.len())]
    Validation { errors: Vec<RpcError> },

    /// A subsystem rejected the change during pre-commit
    #[error("Subsystem {subsystem} rejected the change")]
    PreCommitVeto {
        subsystem: String,
        errors: Vec<RpcError>,
    },

    /// A validator kept producing derived edits past the configured bound
    #[error("Derived edit recursion exceeded depth {max_depth}")]
    DerivedEditDepthExceeded { max_depth: usize },

    // ===== Infrastructure Errors =====
    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    #[error("Transaction failure: {message}")]
    Transaction { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NetconfError {
    /// Shorthand for a single-error validation failure
    pub fn validation(error: RpcError) -> Self {
        NetconfError::Validation {
            errors: vec![error],
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NetconfError::LockDeniedOtherOwner { .. }
            | NetconfError::LockDeniedUncommittedChanges { .. }
            | NetconfError::LockDeniedConfirmedCommitPending { .. }
            | NetconfError::UnlockOtherOwner { .. } => ErrorKind::LockDenied,
            NetconfError::UnlockNoActiveLock { .. } => ErrorKind::NoActiveLock,
            NetconfError::InUse { .. } => ErrorKind::InUse,
            NetconfError::InvalidEditRequest { .. } => ErrorKind::InvalidEditRequest,
            NetconfError::TestOptionNotSupported { .. } => ErrorKind::OperationNotSupported,
            NetconfError::MalformedNodeId { .. } => ErrorKind::MalformedNodeId,
            NetconfError::Validation { .. } => ErrorKind::Validation,
            NetconfError::PreCommitVeto { .. } => ErrorKind::PreCommitVeto,
            NetconfError::DerivedEditDepthExceeded { .. } => ErrorKind::DerivedEditDepthExceeded,
            NetconfError::Persistence { .. } => ErrorKind::Persistence,
            NetconfError::Transaction { .. } => ErrorKind::Transaction,
            NetconfError::Serialization { .. } => ErrorKind::Serialization,
            NetconfError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Session id of the conflicting lock owner, for lock errors
    pub fn lock_owner(&self) -> Option<SessionId> {
        match self {
            NetconfError::LockDeniedOtherOwner { owner, .. }
            | NetconfError::UnlockOtherOwner { owner, .. }
            | NetconfError::InUse { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    /// All `<rpc-error>` elements this error renders to
    pub fn rpc_errors(&self) -> Vec<RpcError> {
        match self {
            NetconfError::Validation { errors } if !errors.is_empty() => errors.clone(),
            NetconfError::PreCommitVeto { subsystem, errors } if !errors.is_empty() => errors
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    if e.app_tag().is_none() {
                        e = e.with_app_tag(APP_TAG_SUBSYSTEM_VETO);
                    }
                    e.with_info("subsystem", subsystem.clone())
                })
                .collect(),
            other => vec![RpcError::from(other.clone())],
        }
    }
}

/// Conversion from NetconfError to its primary RpcError
impl From<NetconfError> for RpcError {
    fn from(err: NetconfError) -> Self {
        let message = err.to_string();
        match err {
            NetconfError::LockDeniedOtherOwner { owner, .. }
            | NetconfError::UnlockOtherOwner { owner, .. } => RpcError::new(ErrorTag::LockDenied)
                .with_type(ErrorType::Protocol)
                .with_message(message)
                .with_info("session-id", owner.to_string()),

            NetconfError::LockDeniedUncommittedChanges { .. }
            | NetconfError::LockDeniedConfirmedCommitPending { .. } => {
                RpcError::new(ErrorTag::LockDenied)
                    .with_type(ErrorType::Protocol)
                    .with_message(message)
                    .with_info("session-id", "0")
            }

            NetconfError::UnlockNoActiveLock { .. } => RpcError::new(ErrorTag::OperationFailed)
                .with_type(ErrorType::Protocol)
                .with_message(message),

            NetconfError::InUse { owner, .. } => RpcError::new(ErrorTag::InUse)
                .with_type(ErrorType::Protocol)
                .with_message(message)
                .with_info("session-id", owner.to_string()),

            NetconfError::InvalidEditRequest { .. } => RpcError::new(ErrorTag::InvalidValue)
                .with_type(ErrorType::Protocol)
                .with_message(message),

            NetconfError::TestOptionNotSupported { .. } => {
                RpcError::new(ErrorTag::OperationNotSupported)
                    .with_type(ErrorType::Protocol)
                    .with_message(message)
            }

            NetconfError::MalformedNodeId { segment, .. } => RpcError::new(ErrorTag::BadElement)
                .with_message(message)
                .with_info("bad-element", segment),

            NetconfError::Validation { errors } => errors
                .into_iter()
                .next()
                .unwrap_or_else(|| RpcError::new(ErrorTag::InvalidValue).with_message(message)),

            NetconfError::PreCommitVeto { subsystem, errors } => errors
                .into_iter()
                .next()
                .unwrap_or_else(|| RpcError::new(ErrorTag::InvalidValue).with_message(message))
                .with_app_tag(APP_TAG_SUBSYSTEM_VETO)
                .with_info("subsystem", subsystem),

            NetconfError::DerivedEditDepthExceeded { max_depth } => {
                RpcError::new(ErrorTag::OperationFailed)
                    .with_message(message)
                    .with_info("max-depth", max_depth.to_string())
            }

            NetconfError::Persistence { .. }
            | NetconfError::Transaction { .. }
            | NetconfError::Serialization { .. }
            | NetconfError::Internal { .. } => {
                RpcError::new(ErrorTag::OperationFailed).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to NetconfError
impl From<serde_json::Error> for NetconfError {
    fn from(err: serde_json::Error) -> Self {
        NetconfError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ErrorKind::LockDenied, "ERR_LOCK_DENIED"),
            (ErrorKind::NoActiveLock, "ERR_NO_ACTIVE_LOCK"),
            (ErrorKind::Validation, "ERR_VALIDATION"),
            (ErrorKind::PreCommitVeto, "ERR_PRE_COMMIT_VETO"),
            (ErrorKind::Persistence, "ERR_PERSISTENCE"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_lock_owner_is_reported() {
        let err = NetconfError::LockDeniedOtherOwner {
            datastore: "running".into(),
            owner: SessionId::new(3),
        };
        assert_eq!(err.lock_owner(), Some(SessionId::new(3)));
        let rpc = RpcError::from(err);
        assert_eq!(rpc.error_tag(), ErrorTag::LockDenied);
        assert_eq!(rpc.info().get("session-id").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_veto_is_distinguishable_from_infrastructure_failure() {
        let veto = RpcError::from(NetconfError::PreCommitVeto {
            subsystem: "jukebox".into(),
            errors: vec![],
        });
        let infra = RpcError::from(NetconfError::Persistence {
            message: "disk full".into(),
        });
        assert_ne!(veto.error_tag(), infra.error_tag());
        assert_eq!(veto.app_tag(), Some(APP_TAG_SUBSYSTEM_VETO));
    }

    #[test]
    fn test_validation_keeps_all_errors() {
        let err = NetconfError::Validation {
            errors: vec![
                RpcError::data_exists("/a"),
                RpcError::data_missing("/b"),
            ],
        };
        let rpc = err.rpc_errors();
        assert_eq!(rpc.len(), 2);
        assert_eq!(rpc[0].error_tag(), ErrorTag::DataExists);
        assert_eq!(rpc[1].path(), Some("/b"));
    }
}
