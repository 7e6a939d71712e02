//! The voting-power collaborator.

use tidygen_types::AccountId;

/// Reports an account's voting weight at the time of the call.
///
/// The engine treats this as a pure query. How weight is computed or
/// snapshotted is the implementor's concern.
pub trait VotingPowerOracle {
    fn voting_power(&self, account: &AccountId) -> u128;
}

impl<O: VotingPowerOracle + ?Sized> VotingPowerOracle for &O {
    fn voting_power(&self, account: &AccountId) -> u128 {
        (**self).voting_power(account)
    }
}

/// A fixed weight table. Accounts absent from the map have no power.
impl VotingPowerOracle for std::collections::HashMap<AccountId, u128> {
    fn voting_power(&self, account: &AccountId) -> u128 {
        self.get(account).copied().unwrap_or(0)
    }
}
