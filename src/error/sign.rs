use alloy::primitives::Address;

/// Errors returned while assembling the signature bundle for a proposal.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The proposal carries no canonical hash and the signer has not already
    /// confirmed it, so there is nothing to sign.
    #[error("proposal at nonce {nonce} has no canonical hash to sign")]
    MissingSafeTxHash {
        /// The proposal's nonce.
        nonce: u64,
    },
    /// The signing key does not belong to any of the Safe's owners.
    #[error("{0} is not an owner of the Safe")]
    NotAnOwner(Address),
    /// A confirmation's signature bytes are not a 65-byte r‖s‖v signature.
    #[error("confirmation from {owner} has a malformed signature ({len} bytes)")]
    MalformedConfirmation {
        /// The confirming owner.
        owner: Address,
        /// Length of the rejected signature.
        len: usize,
    },
    /// The signer failed to produce a signature.
    #[error(transparent)]
    Signer(#[from] eyre::Error),
}
