//! Treasury executor: creates treasury actions and executes them exactly once.

use crate::custody::CustodyLedger;
use crate::error::TreasuryError;
use crate::transaction::TreasuryTransaction;
use crate::transfer::AssetTransfer;
use std::collections::{HashMap, HashSet};
use tidygen_governance::{
    EventLog, GovernanceError, GovernanceEvent, ProposalKind, ProposalRegistry, ProposalStatus,
    VotingPowerOracle,
};
use tidygen_types::{AccountId, AssetId, ExecutionRef, ProposalId, Timestamp, TransactionId};

/// Owns custody balances and treasury transactions.
///
/// Transactions live in an arena keyed by a monotonic id starting at 1, with
/// a secondary index from the owning proposal.
pub struct TreasuryExecutor {
    custody_account: AccountId,
    custody: CustodyLedger,
    transactions: Vec<TreasuryTransaction>,
    by_proposal: HashMap<ProposalId, TransactionId>,
    /// Transactions whose transfer is currently in flight.
    in_flight: HashSet<TransactionId>,
}

impl TreasuryExecutor {
    pub fn new(custody_account: AccountId) -> Self {
        Self {
            custody_account,
            custody: CustodyLedger::new(),
            transactions: Vec::new(),
            by_proposal: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Rebuild an executor from stored state. Transaction ids must form `1..=n`.
    pub fn restore(
        custody_account: AccountId,
        custody: CustodyLedger,
        mut transactions: Vec<TreasuryTransaction>,
    ) -> Result<Self, TreasuryError> {
        transactions.sort_by_key(|tx| tx.id);
        let mut by_proposal = HashMap::with_capacity(transactions.len());
        for (index, tx) in transactions.iter().enumerate() {
            if tx.id != index as u64 + 1 {
                return Err(TreasuryError::InconsistentState(format!(
                    "expected transaction id {}, found {}",
                    index + 1,
                    tx.id
                )));
            }
            if by_proposal.insert(tx.proposal_id, tx.id).is_some() {
                return Err(TreasuryError::InconsistentState(format!(
                    "proposal {} owns more than one transaction",
                    tx.proposal_id
                )));
            }
        }
        Ok(Self {
            custody_account,
            custody,
            transactions,
            by_proposal,
            in_flight: HashSet::new(),
        })
    }

    /// Check restored transactions against the proposals they belong to.
    ///
    /// Every Treasury proposal owns exactly one transaction, every
    /// transaction belongs to a Treasury proposal, and a transaction is
    /// executed exactly when its proposal is.
    pub fn verify_against(&self, registry: &ProposalRegistry) -> Result<(), TreasuryError> {
        for tx in &self.transactions {
            let proposal = registry.get(tx.proposal_id).ok_or_else(|| {
                TreasuryError::InconsistentState(format!(
                    "transaction {} references unknown proposal {}",
                    tx.id, tx.proposal_id
                ))
            })?;
            if proposal.kind != ProposalKind::Treasury {
                return Err(TreasuryError::InconsistentState(format!(
                    "transaction {} belongs to {:?} proposal {}",
                    tx.id, proposal.kind, proposal.id
                )));
            }
            let proposal_executed = proposal.status == ProposalStatus::Executed;
            if tx.executed != proposal_executed || tx.executed_at != proposal.executed_at {
                return Err(TreasuryError::InconsistentState(format!(
                    "transaction {} executed={} but proposal {} is {}",
                    tx.id, tx.executed, proposal.id, proposal.status
                )));
            }
        }
        if let Some(orphan) = registry
            .proposals()
            .find(|p| p.kind == ProposalKind::Treasury && !self.by_proposal.contains_key(&p.id))
        {
            return Err(TreasuryError::InconsistentState(format!(
                "treasury proposal {} has no transaction",
                orphan.id
            )));
        }
        Ok(())
    }

    pub fn custody_account(&self) -> &AccountId {
        &self.custody_account
    }

    pub fn custody(&self) -> &CustodyLedger {
        &self.custody
    }

    pub fn custody_balance(&self, asset: &AssetId) -> u128 {
        self.custody.balance(asset)
    }

    pub fn get_transaction(&self, id: TransactionId) -> Option<&TreasuryTransaction> {
        id.checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.transactions.get(i))
    }

    fn get_transaction_mut(&mut self, id: TransactionId) -> Option<&mut TreasuryTransaction> {
        id.checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.transactions.get_mut(i))
    }

    pub fn transaction_for_proposal(&self, proposal_id: ProposalId) -> Option<&TreasuryTransaction> {
        self.by_proposal
            .get(&proposal_id)
            .and_then(|id| self.get_transaction(*id))
    }

    pub fn transactions(&self) -> impl Iterator<Item = &TreasuryTransaction> {
        self.transactions.iter()
    }

    /// Increase custody of `asset`. Independent of the proposal flow.
    pub fn deposit(
        &mut self,
        asset: AssetId,
        amount: u128,
        events: &mut EventLog,
    ) -> Result<u128, TreasuryError> {
        let new_balance = self.custody.credit(&asset, amount)?;
        tracing::info!(%asset, amount, new_balance, "treasury deposit");
        events.emit(GovernanceEvent::TreasuryDeposit {
            asset,
            amount,
            new_balance,
        });
        Ok(new_balance)
    }

    /// Propose a treasury transfer and record its (unexecuted) transaction.
    ///
    /// The proposal's execution reference binds recipient, amount, asset and
    /// creation time.
    #[allow(clippy::too_many_arguments)]
    pub fn create_treasury_action<O: VotingPowerOracle + ?Sized>(
        &mut self,
        registry: &mut ProposalRegistry,
        oracle: &O,
        proposer: AccountId,
        recipient: AccountId,
        amount: u128,
        asset: AssetId,
        description: String,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<ProposalId, TreasuryError> {
        if recipient.is_null() {
            return Err(TreasuryError::InvalidRecipient);
        }
        if amount == 0 {
            return Err(TreasuryError::ZeroAmount);
        }
        let transaction_id = (self.transactions.len() as u64)
            .checked_add(1)
            .ok_or(TreasuryError::Overflow)?;

        let execution_ref = ExecutionRef::treasury_transfer(&recipient, amount, &asset, now);
        let title = format!("Treasury transfer of {amount} {asset} to {recipient}");
        let proposal_id = registry.propose(
            oracle,
            proposer,
            title,
            description,
            ProposalKind::Treasury,
            execution_ref,
            now,
            events,
        )?;

        self.transactions.push(TreasuryTransaction {
            id: transaction_id,
            proposal_id,
            recipient,
            amount,
            asset: asset.clone(),
            executed: false,
            created_at: now,
            executed_at: None,
        });
        self.by_proposal.insert(proposal_id, transaction_id);

        tracing::info!(transaction_id, proposal_id, %recipient, amount, %asset, "treasury action created");
        events.emit(GovernanceEvent::TreasuryTransactionCreated {
            transaction_id,
            proposal_id,
            recipient,
            amount,
            asset,
        });
        Ok(proposal_id)
    }

    /// Whether `execute(proposal_id)` would pass every state check right now.
    ///
    /// Custody sufficiency is not part of this check; a short balance surfaces
    /// as `TransferFailed` from `execute`.
    pub fn can_execute(
        &self,
        registry: &ProposalRegistry,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> bool {
        match self.transaction_for_proposal(proposal_id) {
            Some(tx) => {
                !tx.executed
                    && !self.in_flight.contains(&tx.id)
                    && registry.ensure_executable(proposal_id, now).is_ok()
            }
            None => false,
        }
    }

    /// Move the funds of a Succeeded treasury proposal to its recipient.
    ///
    /// Either everything commits (custody debited, transaction and proposal
    /// marked executed, events emitted) or nothing does.
    pub fn execute<T: AssetTransfer + ?Sized>(
        &mut self,
        registry: &mut ProposalRegistry,
        transfer: &mut T,
        proposal_id: ProposalId,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<TransactionId, TreasuryError> {
        let transaction_id = match self.by_proposal.get(&proposal_id) {
            Some(id) => *id,
            None if registry.get(proposal_id).is_none() => {
                return Err(GovernanceError::ProposalNotFound(proposal_id).into())
            }
            None => return Err(TreasuryError::NotTreasuryProposal(proposal_id)),
        };

        if !self.in_flight.insert(transaction_id) {
            tracing::warn!(transaction_id, proposal_id, "re-entrant execution rejected");
            return Err(TreasuryError::ExecutionInProgress(transaction_id));
        }
        let result = self.execute_guarded(registry, transfer, transaction_id, proposal_id, now, events);
        self.in_flight.remove(&transaction_id);
        result
    }

    fn execute_guarded<T: AssetTransfer + ?Sized>(
        &mut self,
        registry: &mut ProposalRegistry,
        transfer: &mut T,
        transaction_id: TransactionId,
        proposal_id: ProposalId,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<TransactionId, TreasuryError> {
        let tx = self
            .get_transaction(transaction_id)
            .ok_or(TreasuryError::TransactionNotFound(transaction_id))?;
        if tx.executed {
            return Err(TreasuryError::AlreadyExecuted {
                transaction_id,
                proposal_id,
            });
        }
        registry.ensure_executable(proposal_id, now)?;

        let recipient = tx.recipient;
        let amount = tx.amount;
        let asset = tx.asset.clone();

        let debit = self.custody.debit(&asset, amount).map_err(|e| {
            tracing::warn!(transaction_id, proposal_id, error = %e, "treasury execution rejected");
            TreasuryError::TransferFailed {
                transaction_id,
                reason: e.to_string(),
            }
        })?;
        if let Err(e) = transfer.transfer(&asset, &self.custody_account, &recipient, amount) {
            self.custody.refund(debit);
            tracing::warn!(transaction_id, proposal_id, error = %e, "treasury transfer failed");
            return Err(TreasuryError::TransferFailed {
                transaction_id,
                reason: e.to_string(),
            });
        }

        if let Err(e) = registry.mark_executed(proposal_id, now, events) {
            self.custody.refund(debit);
            tracing::warn!(transaction_id, proposal_id, error = %e, "treasury execution not committed");
            return Err(e.into());
        }
        if let Some(tx) = self.get_transaction_mut(transaction_id) {
            tx.executed = true;
            tx.executed_at = Some(now);
        }

        tracing::info!(transaction_id, proposal_id, %recipient, amount, %asset, "treasury transaction executed");
        events.emit(GovernanceEvent::TreasuryTransactionExecuted {
            transaction_id,
            proposal_id,
            recipient,
            amount,
            asset,
        });
        Ok(transaction_id)
    }
}
