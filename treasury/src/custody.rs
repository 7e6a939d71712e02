//! Custody ledger: per-asset balances held on behalf of the organization.
//!
//! `credit` and `debit` are the only mutation entry points. A debit hands back
//! a [`Debit`] receipt that can be refunded if the movement it funded fails.

use crate::error::TreasuryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tidygen_types::AssetId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyLedger {
    balances: BTreeMap<AssetId, u128>,
}

/// Proof that `amount` of `asset` was removed from custody.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a debit must be kept as spent or refunded"]
pub struct Debit {
    asset: AssetId,
    amount: u128,
}

impl Debit {
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    pub fn amount(&self) -> u128 {
        self.amount
    }
}

impl CustodyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, asset: &AssetId) -> u128 {
        self.balances.get(asset).copied().unwrap_or(0)
    }

    /// Every asset with a recorded balance.
    pub fn balances(&self) -> impl Iterator<Item = (&AssetId, u128)> {
        self.balances.iter().map(|(asset, amount)| (asset, *amount))
    }

    /// Increase custody of `asset`. Returns the new balance.
    pub fn credit(&mut self, asset: &AssetId, amount: u128) -> Result<u128, TreasuryError> {
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }
        let updated = self
            .balance(asset)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        self.balances.insert(asset.clone(), updated);
        Ok(updated)
    }

    /// Remove `amount` of `asset`, checking sufficiency in the same step.
    pub fn debit(&mut self, asset: &AssetId, amount: u128) -> Result<Debit, TreasuryError> {
        let available = self.balance(asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| TreasuryError::InsufficientCustody {
                asset: asset.clone(),
                needed: amount,
                available,
            })?;
        self.balances.insert(asset.clone(), remaining);
        Ok(Debit {
            asset: asset.clone(),
            amount,
        })
    }

    /// Return a debit that funded a movement which did not happen.
    pub fn refund(&mut self, debit: Debit) {
        // The receipt was cut from this ledger, so adding it back restores a
        // balance that already fit in u128.
        let entry = self.balances.entry(debit.asset).or_insert(0);
        *entry = entry.saturating_add(debit.amount);
    }
}
