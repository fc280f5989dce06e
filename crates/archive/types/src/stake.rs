//! Staking ledger entries.

use serde::{Deserialize, Serialize};

/// A single staking ledger account delegating to a block producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stake {
    /// Public key of the delegating account.
    pub public_key: String,
    /// Balance of the account in the staking ledger.
    pub stake: u64,
    /// Public key the account delegates to.
    pub delegate: String,
}

/// The stakes delegated to a key together with their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stakes {
    /// Individual delegations.
    pub entries: Vec<Stake>,
    /// Sum of all delegated stake.
    pub total_stake: u64,
}

impl FromIterator<Stake> for Stakes {
    fn from_iter<I: IntoIterator<Item = Stake>>(iter: I) -> Self {
        let entries: Vec<Stake> = iter.into_iter().collect();
        let total_stake = entries.iter().map(|entry| entry.stake).sum();
        Self { entries, total_stake }
    }
}
