//! Relay configuration.

use crate::constants::{
    CONFIRMATION_POLL_ATTEMPTS, CONFIRMATION_POLL_INTERVAL, ESTIMATION_FALLBACK_GAS,
    FALLBACK_EXEC_GAS, GAS_BUFFER_PERCENT, RECEIPT_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// How many pending proposals one engine run may execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Walk every consecutive executable nonce slot, stopping at the first
    /// gap, revert, or failure.
    #[default]
    DrainAll,
    /// Confirm the proposal at the current nonce, wait for it to reach the
    /// Safe's threshold on the service, and execute exactly that one.
    Single,
}

/// Tunables for one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// How many proposals a run may execute.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Overrides the chain's default RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
    /// How long to wait for an execution receipt.
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout: Duration,
    /// Proportional gas buffer in percent, applied to every estimate.
    #[serde(default = "default_gas_buffer_percent")]
    pub gas_buffer_percent: u64,
    /// Extra gas over `safeTxGas + baseGas` when estimation fails.
    #[serde(default = "default_estimation_fallback_gas")]
    pub estimation_fallback_gas: u64,
    /// Gas limit when estimation fails and the proposal declares no gas.
    #[serde(default = "default_fallback_exec_gas")]
    pub fallback_exec_gas: u64,
    /// Interval between confirmation polls in single mode.
    #[serde(default = "default_confirmation_poll_interval")]
    pub confirmation_poll_interval: Duration,
    /// Confirmation polls before the threshold wait is abandoned.
    #[serde(default = "default_confirmation_poll_attempts")]
    pub confirmation_poll_attempts: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            rpc_url: None,
            receipt_timeout: RECEIPT_TIMEOUT,
            gas_buffer_percent: GAS_BUFFER_PERCENT,
            estimation_fallback_gas: ESTIMATION_FALLBACK_GAS,
            fallback_exec_gas: FALLBACK_EXEC_GAS,
            confirmation_poll_interval: CONFIRMATION_POLL_INTERVAL,
            confirmation_poll_attempts: CONFIRMATION_POLL_ATTEMPTS,
        }
    }
}

impl RelayConfig {
    /// Sets the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: Url) -> Self {
        self.rpc_url = Some(rpc_url);
        self
    }

    /// Sets the receipt wait timeout.
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }
}

fn default_receipt_timeout() -> Duration {
    RECEIPT_TIMEOUT
}

fn default_gas_buffer_percent() -> u64 {
    GAS_BUFFER_PERCENT
}

fn default_estimation_fallback_gas() -> u64 {
    ESTIMATION_FALLBACK_GAS
}

fn default_fallback_exec_gas() -> u64 {
    FALLBACK_EXEC_GAS
}

fn default_confirmation_poll_interval() -> Duration {
    CONFIRMATION_POLL_INTERVAL
}

fn default_confirmation_poll_attempts() -> u32 {
    CONFIRMATION_POLL_ATTEMPTS
}
