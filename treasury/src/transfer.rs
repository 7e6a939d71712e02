//! The asset-transfer collaborator.

use crate::error::TransferError;
use tidygen_types::{AccountId, AssetId};

/// Moves a fungible asset between accounts.
///
/// A transfer either completes in full or returns an error having moved
/// nothing.
pub trait AssetTransfer {
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

impl<T: AssetTransfer + ?Sized> AssetTransfer for &mut T {
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        (**self).transfer(asset, from, to, amount)
    }
}
