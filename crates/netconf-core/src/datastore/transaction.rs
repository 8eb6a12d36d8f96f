use crate::errors::Result;
use crate::tree::ModelTree;

/// Runs work against a model tree inside one transaction
pub trait TransactionService: Send + Sync {
    /// Commit when `work` succeeds, roll back when it fails
    ///
    /// # Errors
    ///
    /// The error from `work`, unchanged, or a `Transaction` error when the
    /// transaction itself cannot be opened or committed.
    fn execute_with_tx_required(
        &self,
        model: &mut dyn ModelTree,
        work: &mut dyn FnMut(&mut dyn ModelTree) -> Result<()>,
    ) -> Result<()>;
}

/// Transactions provided by the model tree itself
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelTreeTransactionService;

impl TransactionService for ModelTreeTransactionService {
    fn execute_with_tx_required(
        &self,
        model: &mut dyn ModelTree,
        work: &mut dyn FnMut(&mut dyn ModelTree) -> Result<()>,
    ) -> Result<()> {
        model.begin_transaction()?;
        match work(model) {
            Ok(()) => model.commit_transaction(),
            Err(err) => {
                if let Err(rollback_err) = model.rollback_transaction() {
                    tracing::warn!(
                        error = %rollback_err,
                        cause = %err,
                        "rollback failed after aborted transaction"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NetconfError, RpcError};
    use crate::model::ConfigElement;
    use crate::tree::InMemoryModelTree;

    #[test]
    fn test_failed_work_rolls_back() {
        let mut tree = InMemoryModelTree::new();
        let service = ModelTreeTransactionService;

        let result = service.execute_with_tx_required(&mut tree, &mut |model| {
            model.copy_config(&[ConfigElement::container("urn:t", "top")])?;
            Err(NetconfError::validation(RpcError::data_missing("/top")))
        });

        assert!(matches!(result, Err(NetconfError::Validation { .. })));
        assert!(tree.to_elements().is_empty());
        assert!(!tree.in_transaction());
    }

    #[test]
    fn test_successful_work_commits() {
        let mut tree = InMemoryModelTree::new();
        let service = ModelTreeTransactionService;

        service
            .execute_with_tx_required(&mut tree, &mut |model| {
                model.copy_config(&[ConfigElement::container("urn:t", "top")])?;
                Ok(())
            })
            .unwrap();

        assert_eq!(tree.to_elements().len(), 1);
        assert!(!tree.in_transaction());
    }
}
