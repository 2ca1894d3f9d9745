//! Relay signers.

use alloy::primitives::{Address, B256, Bytes};

mod r#dyn;
pub use r#dyn::DynSigner;

/// Trait for signing a Safe transaction's canonical hash.
///
/// The hash is signed raw, without an EIP-191 prefix, since the contract
/// recovers owners directly against the canonical hash.
#[async_trait::async_trait]
pub trait SafeHashSigner: std::fmt::Debug + Send + Sync {
    /// The owner address this signer signs for.
    fn address(&self) -> Address;

    /// Signs the 32-byte canonical hash, returning the 65-byte r‖s‖v encoding.
    async fn sign_safe_hash(&self, hash: B256) -> eyre::Result<Bytes>;
}
