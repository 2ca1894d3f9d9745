//! # Relay CLI

use crate::{
    advisor,
    chains::SupportedChain,
    config::{ExecutionMode, RelayConfig},
    engine::Engine,
    proposer::Proposer,
    service::TxServiceClient,
    signers::DynSigner,
    types::Operation,
    verification::VerificationClient,
};
use alloy::primitives::{Address, ChainId};
use clap::{Parser, Subcommand};
use url::Url;

/// Executes, confirms, and proposes Safe multisig transactions.
#[derive(Debug, Parser)]
#[command(author, about = "Safe relay", long_about = None)]
pub struct Args {
    /// The chain to operate on.
    #[arg(long, value_name = "CHAIN_ID", global = true, default_value_t = 1)]
    pub chain_id: ChainId,
    /// Overrides the chain's default RPC endpoint.
    #[arg(long, value_name = "RPC_ENDPOINT", global = true)]
    pub rpc_url: Option<Url>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Executes pending transactions for a Safe.
    Execute {
        /// The Safe account.
        #[arg(long, value_name = "ADDRESS")]
        safe: Address,
        /// An owner's private key.
        #[arg(long, value_name = "SECRET_KEY", env = "SAFE_RELAY_SK")]
        private_key: String,
        /// Execute only the proposal at the current nonce, waiting for it to
        /// reach the confirmation threshold first.
        #[arg(long)]
        single: bool,
    },
    /// Proposes a zero-value, empty-data transaction.
    Propose {
        /// The Safe account.
        #[arg(long, value_name = "ADDRESS")]
        safe: Address,
        /// An owner's private key.
        #[arg(long, value_name = "SECRET_KEY", env = "SAFE_RELAY_SK")]
        private_key: String,
        /// Destination of the proposed call.
        #[arg(long, value_name = "ADDRESS")]
        destination: Address,
        /// Propose a delegate call instead of a plain call.
        #[arg(long)]
        delegate: bool,
    },
    /// Shows the next actionable proposal with a verification annotation.
    Inspect {
        /// The Safe account.
        #[arg(long, value_name = "ADDRESS")]
        safe: Address,
    },
}

impl Args {
    /// Runs the selected subcommand.
    pub async fn run(self) -> eyre::Result<()> {
        let chain = SupportedChain::from_id(self.chain_id)?;

        match self.command {
            Command::Execute { safe, private_key, single } => {
                let signer = DynSigner::from_signing_key(&private_key)?;
                let mode =
                    if single { ExecutionMode::Single } else { ExecutionMode::DrainAll };
                let mut config = RelayConfig::default().with_mode(mode);
                config.rpc_url = self.rpc_url;

                let report = Engine::connect(chain, safe, signer, config)?.run().await?;
                for tx_hash in &report.executed {
                    println!("executed {tx_hash}");
                }
                println!("stopped: {}", report.stop);
            }
            Command::Propose { safe, private_key, destination, delegate } => {
                let signer = DynSigner::from_signing_key(&private_key)?;
                let operation =
                    if delegate { Operation::DelegateCall } else { Operation::Call };

                let proposer = Proposer::connect(chain, safe, signer, self.rpc_url)?;
                let handle = proposer.propose(destination, operation).await?;
                println!("proposed {} at nonce {}", handle.safe_tx_hash, handle.nonce);
            }
            Command::Inspect { safe } => {
                let service = TxServiceClient::new(chain);
                let verifier = VerificationClient::for_chain(chain);
                match advisor::lowest_pending(&service, verifier.as_ref(), safe).await? {
                    Some(advisory) => {
                        let verified = match advisory.destination_verified {
                            Some(true) => "verified",
                            Some(false) => "unverified",
                            None => "unknown",
                        };
                        println!(
                            "nonce {} -> {} ({} destination, {} confirmations)",
                            advisory.proposal.nonce,
                            advisory.proposal.to,
                            verified,
                            advisory.proposal.confirmations.len(),
                        );
                    }
                    None => println!("nothing pending"),
                }
            }
        }

        Ok(())
    }
}
