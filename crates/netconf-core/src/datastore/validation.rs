use crate::edit::{EditConfigRequest, EditTree};
use crate::errors::Result;
use crate::model::ClientInfo;
use crate::tree::ModelTree;

/// Post-edit validation hook
///
/// Runs against the tree after an edit has been applied but before the
/// transaction commits.
pub trait EditValidator: Send + Sync {
    /// Validate one materialized diff of `request`, sent by `client`
    ///
    /// Returns follow-up edits the change implies (e.g. `when`/`must`
    /// cleanup); they are applied in the same transaction and their
    /// notifications are marked implied.
    ///
    /// # Errors
    ///
    /// `Validation` aborts the whole edit.
    fn validate(
        &self,
        model: &dyn ModelTree,
        diff: &EditTree,
        request: &EditConfigRequest,
        client: &ClientInfo,
    ) -> Result<Vec<EditConfigRequest>>;

    /// Tree-wide checks over every diff of the request, derived ones included
    ///
    /// # Errors
    ///
    /// `Validation` aborts the whole edit.
    fn validate_dynamic(&self, _model: &dyn ModelTree, _diffs: &[EditTree]) -> Result<()> {
        Ok(())
    }
}
