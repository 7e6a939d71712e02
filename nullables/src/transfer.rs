//! Nullable asset transfer: records movements, optionally rejects them.

use std::cell::RefCell;
use std::rc::Rc;
use tidygen_treasury::{AssetTransfer, TransferError};
use tidygen_types::{AccountId, AssetId};

/// One transfer the engine asked for and that was accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub asset: AssetId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

#[derive(Debug, Default)]
struct State {
    sent: Vec<TransferRecord>,
    reject_with: Option<TransferError>,
    attempts: usize,
}

/// Output-tracking transfer sink. Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct NullTransfer {
    state: Rc<RefCell<State>>,
}

impl NullTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent transfer with `error` until [`accept`](Self::accept).
    pub fn reject_with(&self, error: TransferError) {
        self.state.borrow_mut().reject_with = Some(error);
    }

    pub fn accept(&self) {
        self.state.borrow_mut().reject_with = None;
    }

    /// Accepted transfers, oldest first.
    pub fn sent(&self) -> Vec<TransferRecord> {
        self.state.borrow().sent.clone()
    }

    /// Total accepted amount of `asset` received by `to`.
    pub fn received(&self, to: &AccountId, asset: &AssetId) -> u128 {
        self.state
            .borrow()
            .sent
            .iter()
            .filter(|r| r.to == *to && r.asset == *asset)
            .fold(0u128, |sum, r| sum.saturating_add(r.amount))
    }

    /// Number of transfer calls, accepted or not.
    pub fn attempts(&self) -> usize {
        self.state.borrow().attempts
    }
}

impl AssetTransfer for NullTransfer {
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        state.attempts += 1;
        if let Some(error) = &state.reject_with {
            return Err(error.clone());
        }
        state.sent.push(TransferRecord {
            asset: asset.clone(),
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}
