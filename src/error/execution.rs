/// Errors returned while executing a proposal on-chain.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Building, estimating, or broadcasting the execution call failed.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// Waiting for the receipt failed or timed out.
    #[error(transparent)]
    Watch(#[from] alloy::providers::PendingTransactionError),
}
