//! Nonce reconciliation.
//!
//! A Safe consumes exactly one proposal per nonce slot, in order. Anything below
//! the on-chain nonce is a leftover of an already-consumed slot; anything above
//! it is blocked until the intermediate slots are filled. The reconciler never
//! skips ahead over a gap.

use crate::types::PendingProposal;

/// How a proposal's nonce relates to the Safe's current on-chain nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// The slot was already consumed; the proposal is a stale duplicate.
    Stale,
    /// The proposal occupies exactly the current slot and can run now.
    Executable,
    /// The proposal sits above the current slot and must wait.
    Blocked,
}

/// Classifies a proposal nonce against the Safe's current nonce.
pub const fn classify(current_nonce: u64, proposal_nonce: u64) -> SlotStatus {
    if proposal_nonce < current_nonce {
        SlotStatus::Stale
    } else if proposal_nonce == current_nonce {
        SlotStatus::Executable
    } else {
        SlotStatus::Blocked
    }
}

/// Returns the proposals executable in sequence starting at `current_nonce`.
///
/// Stale proposals are dropped, and the walk stops at the first nonce gap:
/// given nonce 5 and proposals at [3, 5, 6, 8], the run is [5, 6].
/// Expects `proposals` ordered by ascending nonce, as returned by the fetcher.
pub fn executable_run(
    current_nonce: u64,
    proposals: &[PendingProposal],
) -> Vec<&PendingProposal> {
    let mut next = current_nonce;
    let mut run = Vec::new();
    for proposal in proposals {
        match classify(next, proposal.nonce) {
            SlotStatus::Stale => continue,
            SlotStatus::Executable => {
                run.push(proposal);
                next += 1;
            }
            SlotStatus::Blocked => break,
        }
    }
    run
}

#[cfg(test)]
mod tests {
    use super::{SlotStatus, classify, executable_run};
    use crate::types::PendingProposal;

    fn proposal_at(nonce: u64) -> PendingProposal {
        let raw = format!(
            r#"{{
                "safe": "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326",
                "to": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "nonce": {nonce}
            }}"#
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn classifies_slots() {
        assert_eq!(classify(5, 3), SlotStatus::Stale);
        assert_eq!(classify(5, 5), SlotStatus::Executable);
        assert_eq!(classify(5, 6), SlotStatus::Blocked);
    }

    #[test]
    fn drops_stale_and_walks_consecutive_slots() {
        let proposals: Vec<_> = [3, 5, 6].into_iter().map(proposal_at).collect();
        let run = executable_run(5, &proposals);
        assert_eq!(run.iter().map(|p| p.nonce).collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn stops_at_first_gap() {
        let proposals: Vec<_> = [5, 6, 8, 9].into_iter().map(proposal_at).collect();
        let run = executable_run(5, &proposals);
        assert_eq!(run.iter().map(|p| p.nonce).collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn gap_at_head_yields_nothing() {
        let proposals: Vec<_> = [6, 7].into_iter().map(proposal_at).collect();
        assert!(executable_run(5, &proposals).is_empty());
    }

    #[test]
    fn never_yields_stale_nonces() {
        let proposals: Vec<_> = [0, 1, 2, 3, 4].into_iter().map(proposal_at).collect();
        assert!(executable_run(5, &proposals).is_empty());
    }
}
