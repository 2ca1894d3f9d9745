//! Safe contract bindings and account state.

use alloy::{primitives::Address, sol};
use serde::{Deserialize, Serialize};

sol! {
    /// The subset of the Gnosis Safe contract the relay interacts with.
    #[sol(rpc)]
    #[derive(Debug)]
    contract GnosisSafe {
        /// The Safe's execution nonce. Incremented by one per successful
        /// `execTransaction`.
        function nonce() public view returns (uint256);

        /// The minimum number of owner signatures required to execute.
        function getThreshold() public view returns (uint256);

        /// The Safe's owners.
        function getOwners() public view returns (address[] memory);

        /// Computes the canonical hash owners sign to authorize a transaction
        /// with the given parameters at `_nonce`.
        function getTransactionHash(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) public view returns (bytes32);

        /// Executes a transaction once `signatures` carries enough owner
        /// signatures, sorted by owner address ascending.
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes memory signatures
        ) public payable returns (bool success);

        /// Marks `hashToApprove` as approved by the calling owner.
        function approveHash(bytes32 hashToApprove) external;
    }
}

/// The transaction service's view of a Safe account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeInfo {
    /// The Safe's current execution nonce.
    #[serde(with = "crate::serde::lenient_u64")]
    pub nonce: u64,
    /// The confirmation threshold.
    #[serde(with = "crate::serde::lenient_u64")]
    pub threshold: u64,
    /// The Safe's owners, where the service reports them.
    #[serde(default)]
    pub owners: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::SafeInfo;

    #[test]
    fn safe_info_tolerates_string_numbers() {
        let info: SafeInfo =
            serde_json::from_str(r#"{"nonce": "7", "threshold": 2}"#).unwrap();
        assert_eq!(info.nonce, 7);
        assert_eq!(info.threshold, 2);
        assert!(info.owners.is_empty());
    }
}
