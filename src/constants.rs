//! Relay constants.

use std::time::Duration;

/// Proportional buffer applied on top of any gas estimate for `execTransaction`,
/// in percent.
///
/// Signature verification and refund bookkeeping make the contract's real gas use
/// vary with state, so the raw estimate is never submitted as-is.
pub const GAS_BUFFER_PERCENT: u64 = 20;

/// Extra gas added to `safeTxGas + baseGas` when dynamic estimation fails but the
/// proposal declares its own gas figures.
pub const ESTIMATION_FALLBACK_GAS: u64 = 100_000;

/// Gas limit used when estimation fails and the proposal declares no gas figures
/// at all.
pub const FALLBACK_EXEC_GAS: u64 = 300_000;

/// How long to wait for an execution transaction to be mined before giving up.
pub const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Interval between polls of the transaction service while waiting for a proposal
/// to reach its confirmation threshold.
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Number of confirmation polls before the wait is abandoned.
pub const CONFIRMATION_POLL_ATTEMPTS: u32 = 10;

/// Timeout for individual transaction service requests.
pub const SERVICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The Safe Transaction Service for Ethereum mainnet.
pub const MAINNET_TX_SERVICE_URL: &str = "https://safe-transaction-mainnet.safe.global";

/// The Safe Transaction Service for Goerli.
pub const GOERLI_TX_SERVICE_URL: &str = "https://safe-transaction-goerli.safe.global";

/// The Safe Transaction Service for Polygon.
pub const POLYGON_TX_SERVICE_URL: &str = "https://safe-transaction-polygon.safe.global";

/// The Safe Transaction Service for Arbitrum One.
pub const ARBITRUM_TX_SERVICE_URL: &str = "https://safe-transaction-arbitrum.safe.global";

/// Default public RPC endpoint for Ethereum mainnet.
pub const MAINNET_RPC_URL: &str = "https://rpc.mevblocker.io";

/// Default public RPC endpoint for Goerli.
pub const GOERLI_RPC_URL: &str = "https://rpc.ankr.com/eth_goerli";

/// Default public RPC endpoint for Polygon.
pub const POLYGON_RPC_URL: &str = "https://rpc.ankr.com/polygon";

/// Default public RPC endpoint for Arbitrum One.
pub const ARBITRUM_RPC_URL: &str = "https://arb1.arbitrum.io/rpc";

/// Etherscan API endpoint used by the advisory path to check whether a
/// destination contract is verified.
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Arbiscan API endpoint used by the advisory path to check whether a
/// destination contract is verified.
pub const ARBISCAN_API_URL: &str = "https://api.arbiscan.io/api";
