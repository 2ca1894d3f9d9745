//! Supported chains and their service endpoints.
//!
//! Every chain the relay can operate on is a variant of [`SupportedChain`], so an
//! unsupported chain id is rejected at startup instead of surfacing later as a
//! missing dictionary key.

use crate::{
    constants::{
        ARBISCAN_API_URL, ARBITRUM_RPC_URL, ARBITRUM_TX_SERVICE_URL, ETHERSCAN_API_URL,
        GOERLI_RPC_URL, GOERLI_TX_SERVICE_URL, MAINNET_RPC_URL, MAINNET_TX_SERVICE_URL,
        POLYGON_RPC_URL, POLYGON_TX_SERVICE_URL,
    },
    error::RelayError,
};
use alloy::primitives::ChainId;
use alloy_chains::Chain;
use url::Url;

/// A chain the relay knows how to operate on.
///
/// Carries the Safe Transaction Service endpoint and a default public RPC
/// endpoint for each supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedChain {
    /// Ethereum mainnet.
    Mainnet,
    /// Goerli testnet.
    Goerli,
    /// Polygon PoS.
    Polygon,
    /// Arbitrum One.
    Arbitrum,
}

impl SupportedChain {
    /// Resolves a chain id into a supported chain.
    pub fn from_id(chain_id: ChainId) -> Result<Self, RelayError> {
        match chain_id {
            id if id == Chain::mainnet().id() => Ok(Self::Mainnet),
            id if id == Chain::goerli().id() => Ok(Self::Goerli),
            137 => Ok(Self::Polygon),
            id if id == Chain::arbitrum_mainnet().id() => Ok(Self::Arbitrum),
            other => Err(RelayError::UnsupportedChain(other)),
        }
    }

    /// The numeric chain id.
    pub const fn id(&self) -> ChainId {
        match self {
            Self::Mainnet => 1,
            Self::Goerli => 5,
            Self::Polygon => 137,
            Self::Arbitrum => 42161,
        }
    }

    /// Base URL of the Safe Transaction Service for this chain.
    pub fn tx_service_url(&self) -> Url {
        let url = match self {
            Self::Mainnet => MAINNET_TX_SERVICE_URL,
            Self::Goerli => GOERLI_TX_SERVICE_URL,
            Self::Polygon => POLYGON_TX_SERVICE_URL,
            Self::Arbitrum => ARBITRUM_TX_SERVICE_URL,
        };
        url.parse().expect("static service URL is valid")
    }

    /// Default public RPC endpoint for this chain.
    pub fn default_rpc_url(&self) -> Url {
        let url = match self {
            Self::Mainnet => MAINNET_RPC_URL,
            Self::Goerli => GOERLI_RPC_URL,
            Self::Polygon => POLYGON_RPC_URL,
            Self::Arbitrum => ARBITRUM_RPC_URL,
        };
        url.parse().expect("static RPC URL is valid")
    }

    /// Explorer API used to check contract verification, where one exists.
    ///
    /// Only consumed by the advisory path; execution never depends on it.
    pub fn explorer_api_url(&self) -> Option<Url> {
        let url = match self {
            Self::Mainnet => ETHERSCAN_API_URL,
            Self::Arbitrum => ARBISCAN_API_URL,
            Self::Goerli | Self::Polygon => return None,
        };
        Some(url.parse().expect("static explorer URL is valid"))
    }
}

impl std::fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mainnet => "mainnet",
            Self::Goerli => "goerli",
            Self::Polygon => "polygon",
            Self::Arbitrum => "arbitrum",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::SupportedChain;
    use crate::error::RelayError;

    #[test]
    fn resolves_known_chain_ids() {
        assert_eq!(SupportedChain::from_id(1).unwrap(), SupportedChain::Mainnet);
        assert_eq!(SupportedChain::from_id(5).unwrap(), SupportedChain::Goerli);
        assert_eq!(SupportedChain::from_id(137).unwrap(), SupportedChain::Polygon);
        assert_eq!(SupportedChain::from_id(42161).unwrap(), SupportedChain::Arbitrum);
    }

    #[test]
    fn rejects_unknown_chain_id() {
        assert!(matches!(
            SupportedChain::from_id(10),
            Err(RelayError::UnsupportedChain(10))
        ));
    }

    #[test]
    fn explorer_only_where_configured() {
        assert!(SupportedChain::Mainnet.explorer_api_url().is_some());
        assert!(SupportedChain::Arbitrum.explorer_api_url().is_some());
        assert!(SupportedChain::Polygon.explorer_api_url().is_none());
    }
}
