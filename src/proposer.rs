//! Proposing new transactions.
//!
//! Computes a proposal's canonical hash on-chain via `getTransactionHash`,
//! signs it locally, and submits the proposal to the transaction service with
//! that single signature. The operation kind is taken from the caller verbatim:
//! a zero-value, empty-data proposal is inert as a plain call but carries full
//! delegated-context power as a delegate call, and exercising both kinds is the
//! point of this path.

use crate::{
    chains::SupportedChain,
    error::{ProposeError, RelayError, SignError},
    service::TxServiceClient,
    signatures::OwnerSignature,
    signers::{DynSigner, SafeHashSigner},
    types::{GnosisSafe, Operation, ProposeRequest},
};
use alloy::{
    primitives::{Address, B256, Bytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use tracing::info;
use url::Url;

/// The locally-known identity of a submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalHandle {
    /// The canonical hash owners must sign.
    pub safe_tx_hash: B256,
    /// The nonce slot the proposal claims.
    pub nonce: u64,
    /// The proposing owner.
    pub sender: Address,
}

/// Submits brand-new proposals for one Safe.
#[derive(Debug)]
pub struct Proposer {
    provider: DynProvider,
    service: TxServiceClient,
    safe: Address,
    signer: DynSigner,
}

impl Proposer {
    /// Connects a proposer to a supported chain.
    pub fn connect(
        chain: SupportedChain,
        safe: Address,
        signer: DynSigner,
        rpc_url: Option<Url>,
    ) -> Result<Self, RelayError> {
        let rpc_url = rpc_url.unwrap_or_else(|| chain.default_rpc_url());
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        let service = TxServiceClient::new(chain);
        Ok(Self::new(provider, service, safe, signer))
    }

    /// Creates a proposer over an explicit provider and service client.
    pub fn new(
        provider: DynProvider,
        service: TxServiceClient,
        safe: Address,
        signer: DynSigner,
    ) -> Self {
        Self { provider, service, safe, signer }
    }

    /// Proposes a zero-value, empty-data transaction to `destination` at the
    /// Safe's current nonce, with the given operation kind.
    pub async fn propose(
        &self,
        destination: Address,
        operation: Operation,
    ) -> Result<ProposalHandle, ProposeError> {
        let nonce = self.service.safe_info(self.safe).await?.nonce;

        let safe = GnosisSafe::new(self.safe, &self.provider);
        let safe_tx_hash = safe
            .getTransactionHash(
                destination,
                U256::ZERO,
                Bytes::new(),
                operation.into(),
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                Address::ZERO,
                Address::ZERO,
                U256::from(nonce),
            )
            .call()
            .await?;

        let sender = SafeHashSigner::address(&self.signer);
        let raw = self.signer.sign_safe_hash(safe_tx_hash).await.map_err(SignError::Signer)?;
        let signature = OwnerSignature::new(sender, raw)?;

        let request = ProposeRequest {
            to: destination,
            value: U256::ZERO,
            data: None,
            operation,
            gas_token: Address::ZERO,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
            contract_transaction_hash: safe_tx_hash,
            sender,
            signature: signature.signature,
        };
        self.service.propose(self.safe, &request).await?;

        info!(%safe_tx_hash, nonce, ?operation, "proposal submitted");
        Ok(ProposalHandle { safe_tx_hash, nonce, sender })
    }
}

#[cfg(test)]
mod tests {
    use super::Proposer;
    use crate::{service::TxServiceClient, signers::DynSigner, types::Operation};
    use alloy::{
        primitives::{address, b256},
        providers::{Provider, ProviderBuilder, mock::Asserter},
    };
    use httpmock::{Method::GET, Method::POST, MockServer};

    const KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn proposes_at_service_nonce_with_caller_operation() {
        let server = MockServer::start_async().await;
        let safe = address!("0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        let hash = b256!("0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186");

        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/v1/safes/{safe}/"));
                then.status(200)
                    .json_body(serde_json::json!({ "nonce": 12, "threshold": 2 }));
            })
            .await;
        let submit = server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path(format!("/api/v2/safes/{safe}/multisig-transactions/"))
                    .json_body_partial(
                        serde_json::json!({
                            "nonce": 12,
                            "operation": 1,
                            "value": "0",
                            "contractTransactionHash": hash
                        })
                        .to_string(),
                    );
                then.status(201);
            })
            .await;

        // The only RPC call is getTransactionHash; hand it the canonical hash.
        let asserter = Asserter::new();
        asserter.push_success(&hash);
        let provider = ProviderBuilder::new().connect_mocked_client(asserter).erased();

        let proposer = Proposer::new(
            provider,
            TxServiceClient::with_base_url(server.base_url().parse().unwrap()),
            safe,
            DynSigner::from_signing_key(KEY_A).unwrap(),
        );
        let handle = proposer
            .propose(
                address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
                Operation::DelegateCall,
            )
            .await
            .unwrap();

        assert_eq!(handle.safe_tx_hash, hash);
        assert_eq!(handle.nonce, 12);
        submit.assert_async().await;
    }
}
