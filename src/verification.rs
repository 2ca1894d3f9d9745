//! Contract verification lookups.
//!
//! Asks an Etherscan-compatible explorer whether an address has verified source
//! code. Purely informational: only the advisory path consumes this, execution
//! never depends on it.

use crate::{chains::SupportedChain, error::ServiceError};
use alloy::primitives::Address;
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct SourceCodeResponse {
    status: String,
    #[serde(default)]
    result: Vec<SourceCodeEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "SourceCode", default)]
    source_code: String,
}

/// Client for an Etherscan-compatible contract verification API.
#[derive(Debug, Clone)]
pub struct VerificationClient {
    api_url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl VerificationClient {
    /// Creates a client for the given chain's explorer, if it has one.
    ///
    /// The API key is read from the `EXPLORER_API_KEY` environment variable;
    /// explorers accept keyless requests at a lower rate limit.
    pub fn for_chain(chain: SupportedChain) -> Option<Self> {
        let api_url = chain.explorer_api_url()?;
        let api_key = std::env::var("EXPLORER_API_KEY").unwrap_or_default();
        Some(Self::new(api_url, api_key))
    }

    /// Creates a client against an explicit explorer API URL.
    pub fn new(api_url: Url, api_key: String) -> Self {
        Self { api_url, api_key, client: reqwest::Client::new() }
    }

    /// Whether `address` is a contract with verified source code.
    ///
    /// `status` 0 from the explorer means unverified or not a contract; a
    /// verified contract answers with a non-empty `SourceCode` entry.
    pub async fn is_verified(&self, address: Address) -> Result<bool, ServiceError> {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("module", "contract")
            .append_pair("action", "getsourcecode")
            .append_pair("address", &address.to_string())
            .append_pair("apikey", &self.api_key);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let body: SourceCodeResponse = response.json().await?;
        let verified = body.status == "1"
            && body
                .result
                .first()
                .is_some_and(|entry| !entry.source_code.trim().is_empty());
        debug!(%address, verified, "contract verification lookup");
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::VerificationClient;
    use alloy::primitives::address;
    use httpmock::{Method::GET, MockServer};

    #[tokio::test]
    async fn detects_verified_source() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("action", "getsourcecode");
                then.status(200).json_body(serde_json::json!({
                    "status": "1",
                    "result": [{ "SourceCode": "contract Foo {}" }]
                }));
            })
            .await;

        let client =
            VerificationClient::new(server.base_url().parse().unwrap(), String::new());
        let verified = client
            .is_verified(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"))
            .await
            .unwrap();
        assert!(verified);
    }

    #[tokio::test]
    async fn empty_source_is_unverified() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(serde_json::json!({
                    "status": "1",
                    "result": [{ "SourceCode": "" }]
                }));
            })
            .await;

        let client =
            VerificationClient::new(server.base_url().parse().unwrap(), String::new());
        let verified = client
            .is_verified(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"))
            .await
            .unwrap();
        assert!(!verified);
    }
}
