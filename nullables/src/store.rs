//! Nullable store: thread-safe in-memory governance storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tidygen_store::{GovernanceStore, StoreError};
use tidygen_types::{AccountId, ProposalId, TransactionId};

/// An in-memory governance store for testing.
#[derive(Default)]
pub struct NullStore {
    proposals: Mutex<BTreeMap<ProposalId, Vec<u8>>>,
    votes: Mutex<BTreeMap<(ProposalId, AccountId), Vec<u8>>>,
    transactions: Mutex<BTreeMap<TransactionId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.lock().map(|m| m.len()).unwrap_or(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
}

impl GovernanceStore for NullStore {
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.proposals)?.insert(id, data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Vec<u8>, StoreError> {
        lock(&self.proposals)?
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("proposal", id))
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        Ok(lock(&self.proposals)?
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn put_vote(
        &self,
        proposal: ProposalId,
        voter: &AccountId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        lock(&self.votes)?.insert((proposal, *voter), data.to_vec());
        Ok(())
    }

    fn get_vote(&self, proposal: ProposalId, voter: &AccountId) -> Result<Vec<u8>, StoreError> {
        lock(&self.votes)?
            .get(&(proposal, *voter))
            .cloned()
            .ok_or_else(|| StoreError::not_found("vote", format!("{proposal}/{voter}")))
    }

    fn iter_votes(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(lock(&self.votes)?.values().cloned().collect())
    }

    fn put_treasury_transaction(&self, id: TransactionId, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.transactions)?.insert(id, data.to_vec());
        Ok(())
    }

    fn iter_treasury_transactions(&self) -> Result<Vec<(TransactionId, Vec<u8>)>, StoreError> {
        Ok(lock(&self.transactions)?
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        lock(&self.meta)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.meta)?.get(key).cloned())
    }
}
