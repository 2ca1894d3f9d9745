//! Core relay types.

use alloy::primitives::B256;

mod proposal;
pub use proposal::{Confirmation, Operation, PendingProposal, ProposeRequest, SignatureType};

mod safe;
pub use safe::{GnosisSafe, SafeInfo};

/// Outcome of broadcasting an execution transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// Hash of the mined transaction.
    pub tx_hash: B256,
    /// Whether the receipt reported success (status 1).
    pub success: bool,
}
