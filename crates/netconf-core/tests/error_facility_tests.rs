use netconf_core::errors::{
    ErrorKind, ErrorSeverity, ErrorTag, ErrorType, NetconfError, RpcError, APP_TAG_SUBSYSTEM_VETO,
};
use netconf_core_types::SessionId;

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ErrorKind::LockDenied, "ERR_LOCK_DENIED"),
        (ErrorKind::InUse, "ERR_IN_USE"),
        (ErrorKind::NoActiveLock, "ERR_NO_ACTIVE_LOCK"),
        (ErrorKind::InvalidEditRequest, "ERR_INVALID_EDIT_REQUEST"),
        (ErrorKind::OperationNotSupported, "ERR_OPERATION_NOT_SUPPORTED"),
        (ErrorKind::Validation, "ERR_VALIDATION"),
        (ErrorKind::PreCommitVeto, "ERR_PRE_COMMIT_VETO"),
        (ErrorKind::MalformedNodeId, "ERR_MALFORMED_NODE_ID"),
        (
            ErrorKind::DerivedEditDepthExceeded,
            "ERR_DERIVED_EDIT_DEPTH_EXCEEDED",
        ),
        (ErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ErrorKind::Transaction, "ERR_TRANSACTION"),
        (ErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

// ===== LOCK ERRORS =====

#[test]
fn test_lock_denied_variants_share_kind_and_tag() {
    let errors = vec![
        NetconfError::LockDeniedOtherOwner {
            datastore: "running".to_string(),
            owner: SessionId::new(2),
        },
        NetconfError::LockDeniedUncommittedChanges {
            datastore: "candidate".to_string(),
        },
        NetconfError::LockDeniedConfirmedCommitPending {
            datastore: "running".to_string(),
        },
    ];

    for err in errors {
        assert_eq!(err.kind(), ErrorKind::LockDenied);
        let rpc = RpcError::from(err);
        assert_eq!(rpc.error_tag(), ErrorTag::LockDenied);
        assert_eq!(rpc.error_type(), ErrorType::Protocol);
        assert!(rpc.info().contains_key("session-id"));
    }
}

#[test]
fn test_lock_denied_without_owner_reports_session_zero() {
    let rpc = RpcError::from(NetconfError::LockDeniedUncommittedChanges {
        datastore: "candidate".to_string(),
    });
    assert_eq!(rpc.info().get("session-id").map(String::as_str), Some("0"));
    assert!(rpc.message().contains("uncommitted"));
}

#[test]
fn test_unlock_without_lock_is_operation_failed() {
    let err = NetconfError::UnlockNoActiveLock {
        datastore: "running".to_string(),
    };
    assert_eq!(err.lock_owner(), None);
    assert_eq!(RpcError::from(err).error_tag(), ErrorTag::OperationFailed);
}

// ===== EDIT ERRORS =====

#[test]
fn test_test_option_not_supported_mapping() {
    let err = NetconfError::TestOptionNotSupported {
        option: "test-only".to_string(),
    };
    assert_eq!(err.kind(), ErrorKind::OperationNotSupported);
    let rpc = RpcError::from(err);
    assert_eq!(rpc.error_tag(), ErrorTag::OperationNotSupported);
    assert!(rpc.message().contains("test-only"));
}

#[test]
fn test_validation_keeps_every_rpc_error() {
    let err = NetconfError::Validation {
        errors: vec![
            RpcError::data_exists("/jukebox/library"),
            RpcError::data_missing("/jukebox/player"),
        ],
    };

    let rendered = err.rpc_errors();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].error_tag(), ErrorTag::DataExists);
    assert_eq!(rendered[0].path(), Some("/jukebox/library"));
    assert_eq!(rendered[1].error_tag(), ErrorTag::DataMissing);

    // the primary error is the first one
    assert_eq!(RpcError::from(err).error_tag(), ErrorTag::DataExists);
}

#[test]
fn test_derived_depth_reports_limit() {
    let rpc = RpcError::from(NetconfError::DerivedEditDepthExceeded { max_depth: 32 });
    assert_eq!(rpc.error_tag(), ErrorTag::OperationFailed);
    assert_eq!(rpc.info().get("max-depth").map(String::as_str), Some("32"));
}

#[test]
fn test_malformed_node_id_is_bad_element() {
    let rpc = RpcError::from(NetconfError::MalformedNodeId {
        segment: "name".to_string(),
        reason: "missing '='".to_string(),
    });
    assert_eq!(rpc.error_tag(), ErrorTag::BadElement);
    assert_eq!(rpc.info().get("bad-element").map(String::as_str), Some("name"));
}

// ===== VETO VS INFRASTRUCTURE =====

#[test]
fn test_rpc_errors_for_veto_are_tagged_per_subsystem() {
    let err = NetconfError::PreCommitVeto {
        subsystem: "jukebox".to_string(),
        errors: vec![
            RpcError::new(ErrorTag::InvalidValue).with_message("gap too long"),
            RpcError::new(ErrorTag::InvalidValue).with_app_tag("gap-range"),
        ],
    };

    let rendered = err.rpc_errors();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].app_tag(), Some(APP_TAG_SUBSYSTEM_VETO));
    assert_eq!(rendered[1].app_tag(), Some("gap-range"));
    for rpc in &rendered {
        assert_eq!(rpc.info().get("subsystem").map(String::as_str), Some("jukebox"));
    }
}

#[test]
fn test_infrastructure_failures_are_operation_failed() {
    let errors = vec![
        NetconfError::Persistence {
            message: "disk full".to_string(),
        },
        NetconfError::Transaction {
            message: "commit failed".to_string(),
        },
        NetconfError::Internal {
            message: "unexpected".to_string(),
        },
    ];
    for err in errors {
        let rpc = RpcError::from(err);
        assert_eq!(rpc.error_tag(), ErrorTag::OperationFailed);
        assert_eq!(rpc.app_tag(), None);
    }
}

// ===== RPC ERROR FACILITY =====

#[test]
fn test_rpc_error_defaults_and_builders() {
    let rpc = RpcError::new(ErrorTag::DataMissing)
        .with_path("/jukebox/player")
        .with_message("no player")
        .with_severity(ErrorSeverity::Warning)
        .with_info("bad-element", "player");

    assert_eq!(rpc.error_type(), ErrorType::Application);
    assert_eq!(rpc.severity(), ErrorSeverity::Warning);
    assert_eq!(rpc.path(), Some("/jukebox/player"));
    assert_eq!(
        rpc.to_string(),
        "[application/data-missing]: no player at /jukebox/player"
    );
}

#[test]
fn test_operation_failed_from_collects_cause_chain() {
    #[derive(Debug, thiserror::Error)]
    #[error("edit dispatch failed")]
    struct DispatchError(#[source] NetconfError);

    let outer = DispatchError(NetconfError::Persistence {
        message: "disk full".to_string(),
    });

    let rpc = RpcError::operation_failed_from(&outer);

    assert_eq!(rpc.error_tag(), ErrorTag::OperationFailed);
    assert_eq!(rpc.message(), "edit dispatch failed");
    assert_eq!(
        rpc.info().get("cause.0").map(String::as_str),
        Some("Persistence failure: disk full")
    );
}

#[test]
fn test_serde_json_errors_become_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: NetconfError = json_err.into();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}
