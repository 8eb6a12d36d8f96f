use serde::{Deserialize, Serialize};

use super::tree::EditTree;
use crate::errors::{NetconfError, Result};
use crate::model::DatastoreName;

/// `default-operation` parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultOperation {
    #[default]
    Merge,
    Replace,
    None,
}

impl DefaultOperation {
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` for unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "merge" => Ok(DefaultOperation::Merge),
            "replace" => Ok(DefaultOperation::Replace),
            "none" => Ok(DefaultOperation::None),
            other => Err(invalid("default-operation", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultOperation::Merge => "merge",
            DefaultOperation::Replace => "replace",
            DefaultOperation::None => "none",
        }
    }
}

/// `test-option` parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOption {
    #[default]
    Set,
    TestThenSet,
    TestOnly,
}

impl TestOption {
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` for unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "set" => Ok(TestOption::Set),
            "test-then-set" => Ok(TestOption::TestThenSet),
            "test-only" => Ok(TestOption::TestOnly),
            other => Err(invalid("test-option", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestOption::Set => "set",
            TestOption::TestThenSet => "test-then-set",
            TestOption::TestOnly => "test-only",
        }
    }
}

/// `error-option` parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorOption {
    #[default]
    StopOnError,
    ContinueOnError,
    RollbackOnError,
}

impl ErrorOption {
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` for unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "stop-on-error" => Ok(ErrorOption::StopOnError),
            "continue-on-error" => Ok(ErrorOption::ContinueOnError),
            "rollback-on-error" => Ok(ErrorOption::RollbackOnError),
            other => Err(invalid("error-option", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorOption::StopOnError => "stop-on-error",
            ErrorOption::ContinueOnError => "continue-on-error",
            ErrorOption::RollbackOnError => "rollback-on-error",
        }
    }
}

fn invalid(parameter: &str, value: &str) -> NetconfError {
    NetconfError::InvalidEditRequest {
        reason: format!("illegal {} value '{}'", parameter, value),
    }
}

/// Parsed `<edit-config>` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditConfigRequest {
    pub message_id: String,
    pub target: DatastoreName,
    pub default_operation: DefaultOperation,
    pub test_option: TestOption,
    pub error_option: ErrorOption,
    pub config: EditTree,
    /// Produced by a validator rather than sent by a client
    pub internal: bool,
}

impl EditConfigRequest {
    pub fn new(message_id: impl Into<String>, target: DatastoreName, config: EditTree) -> Self {
        Self {
            message_id: message_id.into(),
            target,
            default_operation: DefaultOperation::default(),
            test_option: TestOption::default(),
            error_option: ErrorOption::default(),
            config,
            internal: false,
        }
    }

    /// Build from raw option strings as they appear on the wire
    ///
    /// Absent options take their RFC defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` if any option value is illegal.
    pub fn from_parts(
        message_id: impl Into<String>,
        target: DatastoreName,
        default_operation: Option<&str>,
        test_option: Option<&str>,
        error_option: Option<&str>,
        config: EditTree,
    ) -> Result<Self> {
        let mut request = Self::new(message_id, target, config);
        if let Some(value) = default_operation {
            request.default_operation = DefaultOperation::parse(value)?;
        }
        if let Some(value) = test_option {
            request.test_option = TestOption::parse(value)?;
        }
        if let Some(value) = error_option {
            request.error_option = ErrorOption::parse(value)?;
        }
        Ok(request)
    }

    /// Request generated during validation of another edit
    pub fn derived(message_id: impl Into<String>, target: DatastoreName, config: EditTree) -> Self {
        Self {
            internal: true,
            ..Self::new(message_id, target, config)
        }
    }

    pub fn with_test_option(mut self, test_option: TestOption) -> Self {
        self.test_option = test_option;
        self
    }

    pub fn with_default_operation(mut self, default_operation: DefaultOperation) -> Self {
        self.default_operation = default_operation;
        self
    }

    /// Structural well-formedness check, run before any mutation
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` when the message id is blank.
    pub fn validate(&self) -> Result<()> {
        if self.message_id.trim().is_empty() {
            return Err(NetconfError::InvalidEditRequest {
                reason: "message-id must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
