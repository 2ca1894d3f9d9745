//! Signature bundle assembly.
//!
//! The Safe contract verifies the `signatures` payload of `execTransaction` by
//! recovering one owner per 65-byte slice and requiring the recovered owners to
//! be strictly ascending. Assembly therefore always sorts by owner address
//! before concatenating, and normalizes every recovery id into {0, 1}.

use crate::{
    error::SignError,
    signers::SafeHashSigner,
    types::PendingProposal,
};
use alloy::primitives::{Address, Bytes};
use itertools::Itertools;
use tracing::{debug, warn};

/// Length of an encoded ECDSA owner signature: 32-byte r, 32-byte s, 1-byte
/// recovery id.
pub const OWNER_SIGNATURE_LEN: usize = 65;

/// One owner's decoded signature over a proposal's canonical hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSignature {
    /// The owner the signature recovers to.
    pub owner: Address,
    /// The 65-byte r‖s‖v encoding, recovery id normalized into {0, 1}.
    pub signature: Bytes,
}

impl OwnerSignature {
    /// Builds an owner signature from raw bytes, normalizing the recovery id.
    pub fn new(owner: Address, raw: Bytes) -> Result<Self, SignError> {
        if raw.len() != OWNER_SIGNATURE_LEN {
            return Err(SignError::MalformedConfirmation { owner, len: raw.len() });
        }
        let mut bytes = raw.to_vec();
        bytes[64] = normalize_recovery_id(bytes[64]);
        Ok(Self { owner, signature: bytes.into() })
    }
}

/// Maps an Electrum-style recovery id in {27, 28} into {0, 1}. Ids already in
/// {0, 1} pass through unchanged.
pub const fn normalize_recovery_id(v: u8) -> u8 {
    if v >= 27 { v - 27 } else { v }
}

/// The set of owner signatures to submit with an execution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureBundle {
    entries: Vec<OwnerSignature>,
}

impl SignatureBundle {
    /// Decodes the executable confirmations of a proposal.
    ///
    /// Non-EOA confirmations and confirmations with malformed signature bytes
    /// are skipped with a logged reason; they cannot be concatenated into the
    /// execution payload.
    pub fn from_confirmations(proposal: &PendingProposal) -> Self {
        let mut entries = Vec::with_capacity(proposal.confirmations.len());
        for confirmation in &proposal.confirmations {
            if !confirmation.is_executable() {
                debug!(
                    owner = %confirmation.owner,
                    kind = ?confirmation.signature_type,
                    "skipping non-executable confirmation"
                );
                continue;
            }
            let raw = confirmation.signature.clone().unwrap_or_default();
            match OwnerSignature::new(confirmation.owner, raw) {
                Ok(signature) => entries.push(signature),
                Err(err) => warn!(owner = %confirmation.owner, %err, "skipping confirmation"),
            }
        }
        Self { entries }
    }

    /// Whether `owner` already has a signature in the bundle.
    pub fn contains(&self, owner: Address) -> bool {
        self.entries.iter().any(|entry| entry.owner == owner)
    }

    /// Number of signatures in the bundle.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle holds no signatures.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a signature to the bundle.
    pub fn push(&mut self, signature: OwnerSignature) {
        self.entries.push(signature);
    }

    /// Encodes the bundle into the exact payload `execTransaction` expects:
    /// every signature concatenated in owner-address-ascending order.
    ///
    /// Address comparison is on the raw 20 bytes, which is exactly
    /// case-insensitive lexicographic order on the hex form.
    pub fn encode(&self) -> Bytes {
        self.entries
            .iter()
            .sorted_by_key(|entry| entry.owner)
            .flat_map(|entry| entry.signature.iter().copied())
            .collect::<Vec<u8>>()
            .into()
    }
}

/// Produces the full signature payload for executing `proposal` as `signer`.
///
/// Reuses the signer's existing confirmation when present; otherwise signs the
/// proposal's canonical hash. A proposal with no canonical hash and no existing
/// confirmation from the signer cannot be signed.
pub async fn assemble(
    proposal: &PendingProposal,
    signer: &dyn SafeHashSigner,
) -> Result<Bytes, SignError> {
    let mut bundle = SignatureBundle::from_confirmations(proposal);

    if !bundle.contains(signer.address()) {
        let Some(safe_tx_hash) = proposal.safe_tx_hash else {
            return Err(SignError::MissingSafeTxHash { nonce: proposal.nonce });
        };
        let raw = signer.sign_safe_hash(safe_tx_hash).await?;
        let signature = OwnerSignature::new(signer.address(), raw)?;
        debug!(owner = %signature.owner, nonce = proposal.nonce, "added own signature");
        bundle.push(signature);
    }

    Ok(bundle.encode())
}

#[cfg(test)]
mod tests {
    use super::{OwnerSignature, SignatureBundle, assemble, normalize_recovery_id};
    use crate::{error::SignError, signers::DynSigner, types::PendingProposal};
    use alloy::primitives::{Bytes, address, b256};

    fn proposal_json(confirmations: &str) -> PendingProposal {
        let raw = format!(
            r#"{{
                "safe": "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326",
                "to": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "value": "0",
                "operation": 0,
                "nonce": 5,
                "safeTxHash": "0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186",
                "confirmations": {confirmations}
            }}"#
        );
        serde_json::from_str(&raw).unwrap()
    }

    fn sig_with_v(v: u8) -> Bytes {
        let mut raw = vec![0x11; 64];
        raw.push(v);
        raw.into()
    }

    // First two anvil dev keys.
    const KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OWNER_A: alloy::primitives::Address =
        address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[test]
    fn normalizes_electrum_recovery_ids() {
        assert_eq!(normalize_recovery_id(27), 0);
        assert_eq!(normalize_recovery_id(28), 1);
        assert_eq!(normalize_recovery_id(0), 0);
        assert_eq!(normalize_recovery_id(1), 1);
    }

    #[test]
    fn rejects_short_signatures() {
        let owner = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let err = OwnerSignature::new(owner, vec![0u8; 64].into()).unwrap_err();
        assert!(matches!(err, SignError::MalformedConfirmation { len: 64, .. }));
    }

    #[test]
    fn encode_sorts_by_owner_ascending() {
        let high = address!("0xffff7970C51812dc3A010C7d01b50e0d17dc79C8");
        let low = address!("0x00007970C51812dc3A010C7d01b50e0d17dc79C8");

        let mut forward = SignatureBundle::default();
        forward.push(OwnerSignature::new(high, sig_with_v(28)).unwrap());
        forward.push(OwnerSignature::new(low, sig_with_v(27)).unwrap());

        let mut reverse = SignatureBundle::default();
        reverse.push(OwnerSignature::new(low, sig_with_v(27)).unwrap());
        reverse.push(OwnerSignature::new(high, sig_with_v(28)).unwrap());

        // Sorting makes encoding independent of insertion order.
        assert_eq!(forward.encode(), reverse.encode());
        // The low owner's signature (v normalized to 0) comes first.
        assert_eq!(forward.encode()[64], 0);
        assert_eq!(forward.encode()[129], 1);
    }

    #[tokio::test]
    async fn assembly_is_idempotent() {
        let signer = DynSigner::from_signing_key(KEY_A).unwrap();
        let mut proposal = proposal_json("[]");

        let first = assemble(&proposal, &signer).await.unwrap();
        assert_eq!(first.len(), 65);
        assert!(first[64] == 0 || first[64] == 1);

        // Feed the produced signature back as an existing confirmation; assembly
        // must reuse it untouched.
        proposal.confirmations = vec![crate::types::Confirmation {
            owner: OWNER_A,
            signature: Some(first.clone()),
            signature_type: Some(crate::types::SignatureType::Eoa),
            submission_date: None,
        }];
        let second = assemble(&proposal, &signer).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_hash_without_confirmation_fails() {
        let signer = DynSigner::from_signing_key(KEY_A).unwrap();
        let mut proposal = proposal_json("[]");
        proposal.safe_tx_hash = None;

        let err = assemble(&proposal, &signer).await.unwrap_err();
        assert!(matches!(err, SignError::MissingSafeTxHash { nonce: 5 }));
    }

    #[tokio::test]
    async fn signature_recovers_to_signer() {
        let signer = DynSigner::from_signing_key(KEY_A).unwrap();
        let proposal = proposal_json("[]");
        let hash = b256!("0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186");

        let payload = assemble(&proposal, &signer).await.unwrap();
        let signature =
            alloy::primitives::Signature::from_raw(&payload).unwrap();
        let recovered = signature.recover_address_from_prehash(&hash).unwrap();
        assert_eq!(recovered, OWNER_A);
    }
}
