//! Safe Transaction Service client.
//!
//! The coordination service stores proposals and confirmations before they are
//! executable on-chain. All reads tolerate individually malformed records by
//! skipping them; transport failures and non-2xx responses are surfaced to the
//! caller.

use crate::{
    chains::SupportedChain,
    constants::{CONFIRMATION_POLL_ATTEMPTS, CONFIRMATION_POLL_INTERVAL, SERVICE_REQUEST_TIMEOUT},
    error::ServiceError,
    types::{PendingProposal, ProposeRequest, SafeInfo},
};
use alloy::primitives::{Address, B256, Bytes};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// A paginated list response from the service.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Client for one chain's Safe Transaction Service.
#[derive(Debug, Clone)]
pub struct TxServiceClient {
    base_url: Url,
    client: reqwest::Client,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl TxServiceClient {
    /// Creates a client for the given chain's service.
    pub fn new(chain: SupportedChain) -> Self {
        Self::with_base_url(chain.tx_service_url())
    }

    /// Creates a client against an explicit service URL.
    pub fn with_base_url(base_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SERVICE_REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builds");
        Self {
            base_url,
            client,
            poll_interval: CONFIRMATION_POLL_INTERVAL,
            poll_attempts: CONFIRMATION_POLL_ATTEMPTS,
        }
    }

    /// Sets the interval between confirmation polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the number of confirmation polls before giving up.
    pub fn with_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }

    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }
        Ok(response)
    }

    /// Fetches the service's view of a Safe account.
    pub async fn safe_info(&self, safe: Address) -> Result<SafeInfo, ServiceError> {
        let url = self.url(&format!("/api/v1/safes/{safe}/"));
        let response = Self::expect_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Fetches all unexecuted proposals for a Safe, ordered by ascending nonce.
    ///
    /// An empty list means there is nothing to do, not an error. Records that
    /// fail validation are skipped with a logged reason so partial data never
    /// reaches signing.
    pub async fn pending_transactions(
        &self,
        safe: Address,
    ) -> Result<Vec<PendingProposal>, ServiceError> {
        let mut url =
            self.url(&format!("/api/v1/safes/{safe}/multisig-transactions/"));
        url.query_pairs_mut()
            .append_pair("executed", "false")
            .append_pair("ordering", "nonce");

        debug!(%url, "fetching pending transactions");
        let response = Self::expect_success(self.client.get(url).send().await?).await?;
        let page: Page = response.json().await?;

        let mut proposals = Vec::with_capacity(page.results.len());
        for record in page.results {
            match serde_json::from_value::<PendingProposal>(record) {
                Ok(proposal) => proposals.push(proposal),
                Err(err) => warn!(%err, "skipping malformed proposal record"),
            }
        }
        // The service honors `ordering`, but nonce order is a correctness
        // requirement downstream, not a preference.
        proposals.sort_by_key(|proposal| proposal.nonce);

        info!(count = proposals.len(), %safe, "fetched pending proposals");
        Ok(proposals)
    }

    /// Fetches the full detail of one proposal, including confirmations.
    pub async fn transaction(&self, safe_tx_hash: B256) -> Result<PendingProposal, ServiceError> {
        let url = self.url(&format!("/api/v1/multisig-transactions/{safe_tx_hash}/"));
        let response = Self::expect_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Submits a confirmation signature for a proposal.
    pub async fn confirm(
        &self,
        safe_tx_hash: B256,
        signature: &Bytes,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!(
            "/api/v1/multisig-transactions/{safe_tx_hash:x}/confirmations/"
        ));
        let body = serde_json::json!({ "signature": signature });
        let response = self.client.post(url).json(&body).send().await?;
        Self::expect_success(response).await?;
        info!(%safe_tx_hash, "submitted confirmation");
        Ok(())
    }

    /// Submits a brand-new proposal.
    pub async fn propose(
        &self,
        safe: Address,
        request: &ProposeRequest,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!("/api/v2/safes/{safe}/multisig-transactions/"));
        let response = self.client.post(url).json(request).send().await?;
        Self::expect_success(response).await?;
        info!(safe_tx_hash = %request.contract_transaction_hash, "submitted proposal");
        Ok(())
    }

    /// Polls the proposal until it has at least `threshold` confirmations.
    ///
    /// Returns the proposal detail once the threshold is met, or
    /// [`ServiceError::ThresholdNotReached`] after the polling budget runs out.
    pub async fn wait_for_threshold(
        &self,
        safe_tx_hash: B256,
        threshold: usize,
    ) -> Result<PendingProposal, ServiceError> {
        let mut have = 0;
        for attempt in 1..=self.poll_attempts {
            sleep(self.poll_interval).await;
            let detail = self.transaction(safe_tx_hash).await?;
            have = detail.confirmations.len();
            if have >= threshold {
                info!(%safe_tx_hash, have, "confirmation threshold reached");
                return Ok(detail);
            }
            debug!(attempt, have, want = threshold, "confirmations below threshold");
        }
        Err(ServiceError::ThresholdNotReached { have, want: threshold })
    }
}

#[cfg(test)]
mod tests {
    use super::TxServiceClient;
    use crate::error::ServiceError;
    use alloy::primitives::{address, b256};
    use httpmock::{Method::GET, Method::POST, MockServer};
    use std::time::Duration;

    fn client(server: &MockServer) -> TxServiceClient {
        TxServiceClient::with_base_url(server.base_url().parse().unwrap())
            .with_poll_interval(Duration::from_millis(10))
            .with_poll_attempts(3)
    }

    #[tokio::test]
    async fn skips_malformed_records() {
        let server = MockServer::start_async().await;
        let safe = address!("0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/v1/safes/{safe}/multisig-transactions/"))
                    .query_param("executed", "false");
                then.status(200).json_body(serde_json::json!({
                    "results": [
                        // no nonce, must be skipped
                        { "safe": safe, "to": safe },
                        { "safe": safe, "to": safe, "nonce": 7 },
                        { "safe": safe, "to": safe, "nonce": 6 }
                    ]
                }));
            })
            .await;

        let proposals = client(&server).pending_transactions(safe).await.unwrap();
        assert_eq!(
            proposals.iter().map(|p| p.nonce).collect::<Vec<_>>(),
            vec![6, 7]
        );
    }

    #[tokio::test]
    async fn surfaces_non_2xx() {
        let server = MockServer::start_async().await;
        let safe = address!("0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503).body("maintenance");
            })
            .await;

        let err = client(&server).pending_transactions(safe).await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { status, .. } if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn confirm_strips_hash_prefix() {
        let server = MockServer::start_async().await;
        let hash = b256!("0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186");
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(
                    "/api/v1/multisig-transactions/2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186/confirmations/",
                );
                then.status(201);
            })
            .await;

        client(&server)
            .confirm(hash, &vec![0u8; 65].into())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn threshold_wait_exhausts_budget() {
        let server = MockServer::start_async().await;
        let safe = address!("0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        let hash = b256!("0x2c531ab25b644b2ee43c93a44bcb5e727b7756d48dba44c7e4a0b3a7e7d0a186");
        let detail = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/v1/multisig-transactions/{hash}/"));
                then.status(200).json_body(serde_json::json!({
                    "safe": safe,
                    "to": safe,
                    "nonce": 5,
                    "safeTxHash": hash,
                    "confirmations": [
                        { "owner": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "signature": "0x00" }
                    ]
                }));
            })
            .await;

        let err = client(&server).wait_for_threshold(hash, 2).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ThresholdNotReached { have: 1, want: 2 }
        ));
        assert_eq!(detail.hits_async().await, 3);
    }
}
