//! The execution engine.
//!
//! One run walks the pending queue of a single Safe: fetch proposals, reconcile
//! nonces against the chain, assemble signatures, execute. Nonce slots are
//! globally ordered and exclusive, so callers must not run two engines for the
//! same Safe concurrently; the engine itself holds no lock.

use crate::{
    chains::SupportedChain,
    config::{ExecutionMode, RelayConfig},
    error::{RelayError, SignError},
    executor::{Executor, SafeExecutor},
    nonce::{SlotStatus, classify},
    service::TxServiceClient,
    signatures::{SignatureBundle, assemble},
    signers::{DynSigner, SafeHashSigner},
    types::PendingProposal,
};
use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, warn};

/// Cooperative cancellation handle for a running engine.
///
/// Checked at the top of every queue iteration; an external caller flips it to
/// stop the run at the next safe point.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a fresh, un-cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No executable proposal remained.
    Exhausted,
    /// A single-mode run executed its target proposal.
    Completed,
    /// The next pending proposal sits above the current nonce; slots must be
    /// consumed in order, so the run cannot proceed.
    NonceGap {
        /// The Safe's current nonce.
        expected: u64,
        /// The lowest pending nonce above it.
        next: u64,
    },
    /// The target proposal was already executed elsewhere.
    AlreadyExecuted {
        /// The proposal's nonce.
        nonce: u64,
    },
    /// Execution reverted on-chain. The nonce slot may have been consumed by
    /// the revert, so continuing under stale assumptions is unsafe.
    Reverted {
        /// The reverted proposal's nonce.
        nonce: u64,
        /// Hash of the reverted transaction.
        tx_hash: B256,
    },
    /// Broadcasting or receipt watching failed.
    Failed {
        /// The failing proposal's nonce.
        nonce: u64,
        /// Human-readable failure reason.
        reason: String,
    },
    /// The run was cancelled.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no executable proposals remain"),
            Self::Completed => write!(f, "target proposal executed"),
            Self::NonceGap { expected, next } => {
                write!(f, "nonce gap: safe is at {expected}, next pending is {next}")
            }
            Self::AlreadyExecuted { nonce } => {
                write!(f, "proposal at nonce {nonce} was already executed")
            }
            Self::Reverted { nonce, tx_hash } => {
                write!(f, "execution of nonce {nonce} reverted in {tx_hash}")
            }
            Self::Failed { nonce, reason } => {
                write!(f, "execution of nonce {nonce} failed: {reason}")
            }
            Self::Cancelled => write!(f, "run cancelled"),
        }
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Transaction hashes of successful executions, in nonce order.
    pub executed: Vec<B256>,
    /// Why the run stopped.
    pub stop: StopReason,
}

impl RunReport {
    fn new(executed: Vec<B256>, stop: StopReason) -> Self {
        Self { executed, stop }
    }
}

/// Drives pending proposals of one Safe to execution.
#[derive(Debug)]
pub struct Engine<E> {
    service: TxServiceClient,
    executor: E,
    signer: DynSigner,
    safe: Address,
    mode: ExecutionMode,
    cancel: CancelFlag,
}

impl Engine<Executor> {
    /// Connects an engine to a supported chain using the chain's default RPC
    /// endpoint unless the config overrides it.
    pub fn connect(
        chain: SupportedChain,
        safe: Address,
        signer: DynSigner,
        config: RelayConfig,
    ) -> Result<Self, RelayError> {
        let rpc_url = config.rpc_url.clone().unwrap_or_else(|| chain.default_rpc_url());
        let wallet = EthereumWallet::new(signer.0.clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url).erased();

        let service = TxServiceClient::new(chain)
            .with_poll_interval(config.confirmation_poll_interval)
            .with_poll_attempts(config.confirmation_poll_attempts);
        let mode = config.mode;
        let executor = Executor::new(provider, safe, config);

        Ok(Self::new(service, executor, signer, safe, mode))
    }
}

impl<E: SafeExecutor> Engine<E> {
    /// Creates an engine over an explicit service client and executor.
    pub fn new(
        service: TxServiceClient,
        executor: E,
        signer: DynSigner,
        safe: Address,
        mode: ExecutionMode,
    ) -> Self {
        Self { service, executor, signer, safe, mode, cancel: CancelFlag::new() }
    }

    /// Installs a cancellation flag shared with the caller.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The chain-side executor this engine drives.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the engine once, to completion or the first terminal condition.
    pub async fn run(&self) -> Result<RunReport, RelayError> {
        match self.mode {
            ExecutionMode::DrainAll => self.drain_all().await,
            ExecutionMode::Single => self.execute_single().await,
        }
    }

    /// Executes every consecutive executable proposal, in nonce order.
    async fn drain_all(&self) -> Result<RunReport, RelayError> {
        let owner = SafeHashSigner::address(&self.signer);
        let owners = self.executor.owners().await?;
        if !owners.contains(&owner) {
            return Err(SignError::NotAnOwner(owner).into());
        }

        let mut current = self.executor.current_nonce().await?;
        let pending = self.service.pending_transactions(self.safe).await?;
        info!(safe = %self.safe, current, pending = pending.len(), "starting drain");

        let mut executed = Vec::new();
        for proposal in &pending {
            if self.cancel.is_cancelled() {
                return Ok(RunReport::new(executed, StopReason::Cancelled));
            }

            match classify(current, proposal.nonce) {
                SlotStatus::Stale => {
                    debug!(nonce = proposal.nonce, current, "skipping stale proposal");
                }
                SlotStatus::Blocked => {
                    info!(nonce = proposal.nonce, current, "stopping at nonce gap");
                    return Ok(RunReport::new(
                        executed,
                        StopReason::NonceGap { expected: current, next: proposal.nonce },
                    ));
                }
                SlotStatus::Executable => {
                    let signatures = match assemble(proposal, &self.signer).await {
                        Ok(signatures) => signatures,
                        Err(err @ SignError::MissingSafeTxHash { .. }) => {
                            // Unsignable slot; the next proposal will read as a
                            // gap and stop the run.
                            warn!(nonce = proposal.nonce, %err, "skipping unsignable proposal");
                            continue;
                        }
                        Err(err) => return Err(err.into()),
                    };

                    match self.executor.execute(proposal, signatures).await {
                        Ok(receipt) if receipt.success => {
                            executed.push(receipt.tx_hash);
                            current += 1;
                        }
                        Ok(receipt) => {
                            return Ok(RunReport::new(
                                executed,
                                StopReason::Reverted {
                                    nonce: proposal.nonce,
                                    tx_hash: receipt.tx_hash,
                                },
                            ));
                        }
                        Err(err) => {
                            return Ok(RunReport::new(
                                executed,
                                StopReason::Failed {
                                    nonce: proposal.nonce,
                                    reason: err.to_string(),
                                },
                            ));
                        }
                    }
                }
            }
        }

        Ok(RunReport::new(executed, StopReason::Exhausted))
    }

    /// Confirms and executes exactly the proposal at the Safe's current nonce.
    async fn execute_single(&self) -> Result<RunReport, RelayError> {
        let info = self.service.safe_info(self.safe).await?;
        let pending = self.service.pending_transactions(self.safe).await?;

        let Some(candidate) = pending
            .iter()
            .filter(|p| p.nonce == info.nonce && !p.is_executed)
            .min_by_key(|p| p.submission_date.clone())
        else {
            return Ok(RunReport::new(Vec::new(), match lowest_above(&pending, info.nonce) {
                Some(next) => StopReason::NonceGap { expected: info.nonce, next },
                None => StopReason::Exhausted,
            }));
        };

        let safe_tx_hash = candidate
            .safe_tx_hash
            .ok_or(SignError::MissingSafeTxHash { nonce: candidate.nonce })?;

        // Re-fetch to avoid racing another executor on the same slot.
        let detail = self.service.transaction(safe_tx_hash).await?;
        if detail.is_executed {
            warn!(%safe_tx_hash, "proposal already executed, nothing to do");
            return Ok(RunReport::new(
                Vec::new(),
                StopReason::AlreadyExecuted { nonce: detail.nonce },
            ));
        }
        if detail.nonce != info.nonce {
            return Ok(RunReport::new(
                Vec::new(),
                StopReason::Failed {
                    nonce: detail.nonce,
                    reason: format!(
                        "nonce moved under us: safe is at {}, proposal holds {}",
                        info.nonce, detail.nonce
                    ),
                },
            ));
        }

        let owner = SafeHashSigner::address(&self.signer);
        if !detail.has_confirmation_from(owner) {
            let raw = self.signer.sign_safe_hash(safe_tx_hash).await.map_err(SignError::Signer)?;
            // The service stores the Electrum-style encoding as produced; the
            // recovery id is normalized at execution time.
            self.service.confirm(safe_tx_hash, &raw).await?;
        } else {
            debug!(%owner, %safe_tx_hash, "owner already confirmed");
        }

        let detail =
            self.service.wait_for_threshold(safe_tx_hash, info.threshold as usize).await?;

        if self.cancel.is_cancelled() {
            return Ok(RunReport::new(Vec::new(), StopReason::Cancelled));
        }

        let bundle = SignatureBundle::from_confirmations(&detail);
        if bundle.is_empty() {
            return Ok(RunReport::new(
                Vec::new(),
                StopReason::Failed {
                    nonce: detail.nonce,
                    reason: "no executable signatures among confirmations".into(),
                },
            ));
        }

        match self.executor.execute(&detail, bundle.encode()).await {
            Ok(receipt) if receipt.success => {
                Ok(RunReport::new(vec![receipt.tx_hash], StopReason::Completed))
            }
            Ok(receipt) => Ok(RunReport::new(
                Vec::new(),
                StopReason::Reverted { nonce: detail.nonce, tx_hash: receipt.tx_hash },
            )),
            Err(err) => Ok(RunReport::new(
                Vec::new(),
                StopReason::Failed { nonce: detail.nonce, reason: err.to_string() },
            )),
        }
    }
}

/// The lowest pending nonce strictly above `current`, if any.
fn lowest_above(pending: &[PendingProposal], current: u64) -> Option<u64> {
    pending.iter().map(|p| p.nonce).filter(|nonce| *nonce > current).min()
}
