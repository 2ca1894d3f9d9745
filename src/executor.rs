//! On-chain execution of fully-signed proposals.

use crate::{
    config::RelayConfig,
    error::ExecutionError,
    types::{ExecutionReceipt, GnosisSafe, PendingProposal},
};
use alloy::{
    primitives::{Address, Bytes, U256},
    providers::DynProvider,
};
use async_trait::async_trait;
use tracing::{info, warn};

/// The chain-side surface the engine drives.
///
/// Abstracted so the engine's queue semantics can be exercised without a live
/// chain behind them.
#[async_trait]
pub trait SafeExecutor: Send + Sync {
    /// The Safe's current on-chain execution nonce.
    async fn current_nonce(&self) -> Result<u64, ExecutionError>;

    /// The Safe's current owner set.
    async fn owners(&self) -> Result<Vec<Address>, ExecutionError>;

    /// Broadcasts the execution call for `proposal` carrying `signatures` and
    /// waits for a mined receipt.
    async fn execute(
        &self,
        proposal: &PendingProposal,
        signatures: Bytes,
    ) -> Result<ExecutionReceipt, ExecutionError>;
}

/// Executes proposals through a Safe contract on a live chain.
#[derive(Debug, Clone)]
pub struct Executor {
    provider: DynProvider,
    safe: Address,
    config: RelayConfig,
}

impl Executor {
    /// Creates an executor for one Safe.
    ///
    /// The provider must carry a wallet filler for the broadcasting key.
    pub fn new(provider: DynProvider, safe: Address, config: RelayConfig) -> Self {
        Self { provider, safe, config }
    }

    /// Gas limit to use when dynamic estimation is unavailable.
    ///
    /// A proposal that declares its own gas figures gets those plus a fixed
    /// allowance for signature checks; one that declares none gets a generous
    /// static limit.
    fn fallback_gas(&self, proposal: &PendingProposal) -> u64 {
        let declared = proposal.safe_tx_gas + proposal.base_gas;
        if declared > 0 {
            declared + self.config.estimation_fallback_gas
        } else {
            self.config.fallback_exec_gas
        }
    }

    fn buffered(&self, gas: u64) -> u64 {
        gas + gas * self.config.gas_buffer_percent / 100
    }
}

#[async_trait]
impl SafeExecutor for Executor {
    async fn current_nonce(&self) -> Result<u64, ExecutionError> {
        let safe = GnosisSafe::new(self.safe, &self.provider);
        let nonce = safe.nonce().call().await?;
        Ok(nonce.to::<u64>())
    }

    async fn owners(&self) -> Result<Vec<Address>, ExecutionError> {
        let safe = GnosisSafe::new(self.safe, &self.provider);
        Ok(safe.getOwners().call().await?)
    }

    async fn execute(
        &self,
        proposal: &PendingProposal,
        signatures: Bytes,
    ) -> Result<ExecutionReceipt, ExecutionError> {
        let safe = GnosisSafe::new(self.safe, &self.provider);
        let call = safe.execTransaction(
            proposal.to,
            proposal.value,
            proposal.data(),
            proposal.operation.into(),
            U256::from(proposal.safe_tx_gas),
            U256::from(proposal.base_gas),
            proposal.gas_price,
            proposal.gas_token(),
            proposal.refund_receiver(),
            signatures,
        );

        let gas = match call.estimate_gas().await {
            Ok(estimate) => estimate,
            Err(err) => {
                let fallback = self.fallback_gas(proposal);
                warn!(%err, fallback, "gas estimation failed, using fallback");
                fallback
            }
        };
        let gas_limit = self.buffered(gas);

        info!(
            nonce = proposal.nonce,
            to = %proposal.to,
            gas_limit,
            "broadcasting execution transaction"
        );
        let pending = call.gas(gas_limit).send().await?;
        let receipt = pending
            .with_timeout(Some(self.config.receipt_timeout))
            .get_receipt()
            .await?;

        let result = ExecutionReceipt {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
        };
        if result.success {
            info!(tx_hash = %result.tx_hash, nonce = proposal.nonce, "execution mined");
        } else {
            warn!(tx_hash = %result.tx_hash, nonce = proposal.nonce, "execution reverted");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::Executor;
    use crate::{config::RelayConfig, types::PendingProposal};
    use alloy::providers::{Provider, ProviderBuilder};

    fn proposal(safe_tx_gas: u64, base_gas: u64) -> PendingProposal {
        serde_json::from_str(&format!(
            r#"{{
                "safe": "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326",
                "to": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "nonce": 0,
                "safeTxGas": {safe_tx_gas},
                "baseGas": {base_gas}
            }}"#
        ))
        .unwrap()
    }

    fn executor() -> Executor {
        let provider = ProviderBuilder::new()
            .connect_http("http://localhost:8545".parse().unwrap())
            .erased();
        Executor::new(provider, Default::default(), RelayConfig::default())
    }

    #[test]
    fn fallback_prefers_declared_gas() {
        let executor = executor();
        assert_eq!(executor.fallback_gas(&proposal(120_000, 30_000)), 250_000);
        assert_eq!(executor.fallback_gas(&proposal(0, 0)), 300_000);
    }

    #[test]
    fn buffer_is_proportional() {
        let executor = executor();
        assert_eq!(executor.buffered(100_000), 120_000);
        assert_eq!(executor.buffered(250_000), 300_000);
    }
}
