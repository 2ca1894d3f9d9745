//! Relay error types.

use alloy::{
    primitives::ChainId,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

mod execution;
pub use execution::ExecutionError;

mod propose;
pub use propose::ProposeError;

mod service;
pub use service::ServiceError;

mod sign;
pub use sign::SignError;

/// The overarching error type returned by relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Errors talking to the Safe Transaction Service.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Errors assembling signatures.
    #[error(transparent)]
    Sign(#[from] SignError),
    /// Errors executing a proposal on-chain.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// Errors proposing a new transaction.
    #[error(transparent)]
    Propose(#[from] ProposeError),
    /// The chain is not supported.
    #[error("unsupported chain {0}")]
    UnsupportedChain(ChainId),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}
