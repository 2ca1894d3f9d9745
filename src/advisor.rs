//! Advisory lookups over pending proposals.
//!
//! Surfaces the next actionable proposal for a Safe together with whether its
//! destination is a verified contract. This is analysis for an operator or an
//! upstream decision layer; nothing here feeds the execution path.

use crate::{
    error::RelayError,
    service::TxServiceClient,
    types::PendingProposal,
    verification::VerificationClient,
};
use alloy::primitives::Address;
use tracing::{debug, warn};

/// The lowest actionable pending proposal, annotated for review.
#[derive(Debug, Clone)]
pub struct Advisory {
    /// The proposal occupying the lowest valid nonce slot.
    pub proposal: PendingProposal,
    /// Whether the destination has verified source code. `None` when no
    /// explorer is configured for the chain or the lookup failed.
    pub destination_verified: Option<bool>,
}

/// Picks the lowest-nonce pending proposal at or above the Safe's current
/// nonce and annotates it with a destination verification check.
///
/// Returns `Ok(None)` when nothing actionable is pending.
pub async fn lowest_pending(
    service: &TxServiceClient,
    verifier: Option<&VerificationClient>,
    safe: Address,
) -> Result<Option<Advisory>, RelayError> {
    let info = service.safe_info(safe).await?;
    let pending = service.pending_transactions(safe).await?;

    let Some(proposal) = pending
        .into_iter()
        .filter(|p| p.nonce >= info.nonce && p.execution_date.is_none())
        .min_by_key(|p| p.nonce)
    else {
        debug!(%safe, nonce = info.nonce, "no actionable pending proposal");
        return Ok(None);
    };

    let destination_verified = match verifier {
        Some(verifier) => match verifier.is_verified(proposal.to).await {
            Ok(verified) => Some(verified),
            Err(err) => {
                // Advisory only; a failed lookup degrades to "unknown".
                warn!(%err, destination = %proposal.to, "verification lookup failed");
                None
            }
        },
        None => None,
    };

    Ok(Some(Advisory { proposal, destination_verified }))
}

#[cfg(test)]
mod tests {
    use super::lowest_pending;
    use crate::service::TxServiceClient;
    use alloy::primitives::address;
    use httpmock::{Method::GET, MockServer};

    #[tokio::test]
    async fn picks_lowest_valid_nonce() {
        let server = MockServer::start_async().await;
        let safe = address!("0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/v1/safes/{safe}/"));
                then.status(200)
                    .json_body(serde_json::json!({ "nonce": 5, "threshold": 2 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/v1/safes/{safe}/multisig-transactions/"));
                then.status(200).json_body(serde_json::json!({
                    "results": [
                        { "safe": safe, "to": safe, "nonce": 3 },
                        { "safe": safe, "to": safe, "nonce": 6 },
                        { "safe": safe, "to": safe, "nonce": 5 }
                    ]
                }));
            })
            .await;

        let client = TxServiceClient::with_base_url(server.base_url().parse().unwrap());
        let advisory = lowest_pending(&client, None, safe).await.unwrap().unwrap();
        assert_eq!(advisory.proposal.nonce, 5);
        assert_eq!(advisory.destination_verified, None);
    }
}
