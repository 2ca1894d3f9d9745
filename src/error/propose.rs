use super::{ServiceError, SignError};

/// Errors returned while proposing a new transaction.
#[derive(Debug, thiserror::Error)]
pub enum ProposeError {
    /// The on-chain `getTransactionHash` call failed, so the canonical hash
    /// could not be computed.
    #[error("failed to compute the canonical transaction hash")]
    Hash(#[from] alloy::contract::Error),
    /// The signer failed to produce a usable signature over the canonical hash.
    #[error(transparent)]
    Sign(#[from] SignError),
    /// The transaction service rejected or failed the submission.
    #[error(transparent)]
    Service(#[from] ServiceError),
}
