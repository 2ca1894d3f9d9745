//! Wire records for proposals stored on the Safe Transaction Service.
//!
//! The service is treated as untrusted input: records are strictly validated at
//! the serde boundary, and anything malformed is skipped by the caller instead
//! of flowing into signing.

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// How the Safe performs the call carried by a proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operation {
    /// A plain `CALL` to the destination.
    #[default]
    Call,
    /// A `DELEGATECALL`, executing the destination's code in the Safe's own
    /// storage context.
    DelegateCall,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(format!("invalid operation kind {other}")),
        }
    }
}

/// The kind of signature backing a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureType {
    /// A plain ECDSA signature from an externally owned account.
    Eoa,
    /// An `eth_sign` style signature.
    EthSign,
    /// An on-chain `approveHash` approval.
    ApprovedHash,
    /// An EIP-1271 contract signature.
    ContractSignature,
    /// Anything the service introduces later.
    #[serde(other)]
    Unknown,
}

impl SignatureType {
    /// Whether this confirmation kind can be concatenated into the
    /// `execTransaction` signature payload as-is.
    ///
    /// Approved-hash and contract confirmations use a different on-chain
    /// encoding and cannot be spliced in alongside plain ECDSA signatures.
    pub const fn is_executable(&self) -> bool {
        matches!(self, Self::Eoa)
    }
}

/// One owner's confirmation of a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// The confirming owner.
    pub owner: Address,
    /// The 65-byte r‖s‖v signature over the canonical hash.
    #[serde(default)]
    pub signature: Option<Bytes>,
    /// The signature kind. Missing means a plain EOA signature.
    #[serde(default)]
    pub signature_type: Option<SignatureType>,
    /// When the confirmation was submitted to the service.
    #[serde(default)]
    pub submission_date: Option<String>,
}

impl Confirmation {
    /// Whether this confirmation's signature may be used in the execution
    /// payload.
    pub fn is_executable(&self) -> bool {
        self.signature.is_some()
            && self.signature_type.map_or(true, |kind| kind.is_executable())
    }
}

/// A not-yet-executed multisig instruction stored on the transaction service.
///
/// `to`, `nonce`, and `safe` are required; a record without them fails
/// deserialization outright. The canonical hash is optional only because a
/// proposal the signer has already confirmed can still be executed without
/// re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProposal {
    /// The Safe this proposal belongs to.
    pub safe: Address,
    /// Destination of the call.
    pub to: Address,
    /// Native value forwarded with the call, in wei.
    #[serde(default, with = "crate::serde::dec_u256")]
    pub value: U256,
    /// Call data. `None` means a plain transfer.
    #[serde(default)]
    pub data: Option<Bytes>,
    /// Call vs delegate-call execution.
    #[serde(default)]
    pub operation: Operation,
    /// Gas the inner call may consume.
    #[serde(default, with = "crate::serde::lenient_u64")]
    pub safe_tx_gas: u64,
    /// Gas overhead independent of the inner call.
    #[serde(default, with = "crate::serde::lenient_u64")]
    pub base_gas: u64,
    /// Gas price used for the gas refund, zero for no refund.
    #[serde(default, with = "crate::serde::dec_u256")]
    pub gas_price: U256,
    /// Token the refund is paid in, `None` for the native currency.
    #[serde(default)]
    pub gas_token: Option<Address>,
    /// Receiver of the gas refund, `None` for the origin.
    #[serde(default)]
    pub refund_receiver: Option<Address>,
    /// Execution slot this proposal occupies.
    #[serde(with = "crate::serde::lenient_u64")]
    pub nonce: u64,
    /// The canonical hash every owner signs.
    #[serde(default)]
    pub safe_tx_hash: Option<B256>,
    /// Whether the service already saw this proposal executed.
    #[serde(default)]
    pub is_executed: bool,
    /// When the proposal was executed, if it was.
    #[serde(default)]
    pub execution_date: Option<String>,
    /// When the proposal was submitted to the service.
    #[serde(default)]
    pub submission_date: Option<String>,
    /// Owner confirmations collected so far.
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
}

impl PendingProposal {
    /// The call data, empty for a plain transfer.
    pub fn data(&self) -> Bytes {
        self.data.clone().unwrap_or_default()
    }

    /// The refund token, [`Address::ZERO`] for the native currency.
    pub fn gas_token(&self) -> Address {
        self.gas_token.unwrap_or(Address::ZERO)
    }

    /// The refund receiver, [`Address::ZERO`] for the origin.
    pub fn refund_receiver(&self) -> Address {
        self.refund_receiver.unwrap_or(Address::ZERO)
    }

    /// Whether `owner` has already confirmed this proposal.
    pub fn has_confirmation_from(&self, owner: Address) -> bool {
        self.confirmations.iter().any(|c| c.owner == owner)
    }
}

/// Payload for submitting a brand-new proposal to the transaction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeRequest {
    /// Destination of the call.
    pub to: Address,
    /// Native value forwarded with the call, in wei.
    #[serde(with = "crate::serde::dec_u256")]
    pub value: U256,
    /// Call data, `None` for a plain transfer.
    pub data: Option<Bytes>,
    /// Call vs delegate-call execution.
    pub operation: Operation,
    /// Token the refund is paid in.
    pub gas_token: Address,
    /// Gas the inner call may consume.
    #[serde(with = "crate::serde::dec_u256")]
    pub safe_tx_gas: U256,
    /// Gas overhead independent of the inner call.
    #[serde(with = "crate::serde::dec_u256")]
    pub base_gas: U256,
    /// Gas price used for the gas refund.
    #[serde(with = "crate::serde::dec_u256")]
    pub gas_price: U256,
    /// Receiver of the gas refund.
    pub refund_receiver: Address,
    /// Execution slot the proposal claims.
    pub nonce: u64,
    /// The canonical hash computed on-chain for these parameters.
    pub contract_transaction_hash: B256,
    /// The proposing owner.
    pub sender: Address,
    /// The proposing owner's signature over the canonical hash.
    pub signature: Bytes,
}

#[cfg(test)]
mod tests {
    use super::{Operation, PendingProposal, SignatureType};
    use alloy::primitives::{U256, address, b256};

    const RAW: &str = r#"{
        "safe": "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326",
        "to": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        "value": "1000000000000000000",
        "data": null,
        "operation": 0,
        "gasToken": null,
        "safeTxGas": 0,
        "baseGas": 0,
        "gasPrice": "0",
        "refundReceiver": null,
        "nonce": 5,
        "safeTxHash": "0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186",
        "isExecuted": false,
        "confirmations": [
            {
                "owner": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "signature": "0x00",
                "signatureType": "EOA"
            }
        ]
    }"#;

    #[test]
    fn deserializes_service_record() {
        let proposal: PendingProposal = serde_json::from_str(RAW).unwrap();
        assert_eq!(proposal.nonce, 5);
        assert_eq!(proposal.value, U256::from(10).pow(U256::from(18)));
        assert_eq!(proposal.operation, Operation::Call);
        assert_eq!(
            proposal.safe_tx_hash,
            Some(b256!("0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186"))
        );
        assert!(proposal.data().is_empty());
        assert!(proposal.gas_token().is_zero());
        assert!(
            proposal
                .has_confirmation_from(address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"))
        );
    }

    #[test]
    fn rejects_record_without_nonce() {
        let raw = r#"{
            "safe": "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326",
            "to": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        }"#;
        assert!(serde_json::from_str::<PendingProposal>(raw).is_err());
    }

    #[test]
    fn rejects_unknown_operation() {
        let raw = RAW.replace(r#""operation": 0"#, r#""operation": 2"#);
        assert!(serde_json::from_str::<PendingProposal>(&raw).is_err());
    }

    #[test]
    fn approved_hash_confirmations_are_not_executable() {
        let mut proposal: PendingProposal = serde_json::from_str(RAW).unwrap();
        proposal.confirmations[0].signature_type = Some(SignatureType::ApprovedHash);
        assert!(!proposal.confirmations[0].is_executable());
    }
}
