//! Nullable voting-power oracle: a mutable weight table.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tidygen_governance::VotingPowerOracle;
use tidygen_types::AccountId;

/// Reports whatever weight the test last assigned. Unknown accounts have none.
#[derive(Clone, Debug, Default)]
pub struct NullVotingPower {
    weights: Rc<RefCell<HashMap<AccountId, u128>>>,
}

impl NullVotingPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (account, weight) pairs.
    pub fn with_weights(weights: impl IntoIterator<Item = (AccountId, u128)>) -> Self {
        let oracle = Self::new();
        oracle.weights.borrow_mut().extend(weights);
        oracle
    }

    pub fn set(&self, account: AccountId, weight: u128) {
        self.weights.borrow_mut().insert(account, weight);
    }
}

impl VotingPowerOracle for NullVotingPower {
    fn voting_power(&self, account: &AccountId) -> u128 {
        self.weights.borrow().get(account).copied().unwrap_or(0)
    }
}
