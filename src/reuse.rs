//! Policies deciding whether a previously deployed contract is reused
//!
//! The decision is a capability separate from its interaction mechanics:
//! interactive runs plug in a prompt-backed policy, while automated runs and
//! tests supply a constant one and need no terminal.

use std::io::{self, BufRead, Write};

use alloy_primitives::Address;
use tracing::info;

use crate::types::ContractName;

/// A capability deciding whether to reuse an already-deployed contract
/// address instead of deploying a fresh instance
pub trait ReusePolicy {
    /// Offer `candidate` as the address of an already-deployed `contract`,
    /// returning whether to reuse it
    fn offer_reuse(&self, contract: ContractName, candidate: Address) -> bool;
}

/// Accept every offered address
pub struct AcceptAll;

impl ReusePolicy for AcceptAll {
    fn offer_reuse(&self, contract: ContractName, candidate: Address) -> bool {
        info!("reusing existing {contract} at {candidate}");
        true
    }
}

/// Reject every offered address, forcing fresh deployments
pub struct RejectAll;

impl ReusePolicy for RejectAll {
    fn offer_reuse(&self, _contract: ContractName, _candidate: Address) -> bool {
        false
    }
}

/// Ask for confirmation on stdin, defaulting to reuse on an empty answer
pub struct PromptReuse;

impl ReusePolicy for PromptReuse {
    fn offer_reuse(&self, contract: ContractName, candidate: Address) -> bool {
        print!("Found existing {contract} at {candidate}. Use this address? [Y/n] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        let answer = answer.trim().to_lowercase();
        answer.is_empty() || answer == "y" || answer == "yes"
    }
}
