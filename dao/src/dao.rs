//! The DAO facade: one clock read per call, fail-atomic operations,
//! buffered events and snapshot persistence.

use serde::de::DeserializeOwned;
use serde::Serialize;

use tidygen_governance::{
    EventLog, GovernanceError, GovernanceEvent, Proposal, ProposalKind, ProposalRegistry,
    ProposalStatus, Vote, VotingLedger, VotingPowerOracle,
};
use tidygen_store::{GovernanceStore, StoreError};
use tidygen_treasury::{AssetTransfer, CustodyLedger, TreasuryExecutor, TreasuryTransaction};
use tidygen_types::{
    AccountId, AssetId, Clock, ExecutionRef, GovernanceParams, ProposalId, Timestamp,
    TransactionId,
};
use tidygen_utils::format_duration;

use crate::{DaoConfig, DaoError};

const META_PARAMS: &[u8] = b"params";
const META_CUSTODY_ACCOUNT: &[u8] = b"custody_account";
const META_CUSTODY: &[u8] = b"custody";
const META_NEXT_PROPOSAL_ID: &[u8] = b"next_proposal_id";
const META_NEXT_TRANSACTION_ID: &[u8] = b"next_transaction_id";

/// Governance and treasury engine over a voting-power oracle `O`, an asset
/// transfer sink `T` and a clock `C`.
///
/// Every mutating call either commits all of its state changes and events or
/// returns an error having changed nothing.
pub struct Dao<O, T, C> {
    registry: ProposalRegistry,
    ledger: VotingLedger,
    treasury: TreasuryExecutor,
    oracle: O,
    transfer: T,
    clock: C,
    events: EventLog,
}

impl<O, T, C> Dao<O, T, C>
where
    O: VotingPowerOracle,
    T: AssetTransfer,
    C: Clock,
{
    /// Build an empty engine from a validated configuration.
    pub fn new(config: &DaoConfig, oracle: O, transfer: T, clock: C) -> Result<Self, DaoError> {
        config.validate()?;
        Self::with_params(
            config.governance_params(),
            config.custody_account,
            oracle,
            transfer,
            clock,
        )
    }

    pub fn with_params(
        params: GovernanceParams,
        custody_account: AccountId,
        oracle: O,
        transfer: T,
        clock: C,
    ) -> Result<Self, DaoError> {
        params.validate()?;
        if custody_account.is_null() {
            return Err(DaoError::Config(
                "custody_account must not be the null address".into(),
            ));
        }
        tracing::info!(
            %custody_account,
            voting_delay = %format_duration(params.voting_delay_secs),
            voting_period = %format_duration(params.voting_period_secs),
            proposal_threshold = params.proposal_threshold,
            quorum_threshold = params.quorum_threshold,
            "dao initialised"
        );
        Ok(Self {
            registry: ProposalRegistry::new(params),
            ledger: VotingLedger::new(),
            treasury: TreasuryExecutor::new(custody_account),
            oracle,
            transfer,
            clock,
            events: EventLog::new(),
        })
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Submit a non-treasury proposal.
    ///
    /// Fails with [`DaoError::TreasuryProposalRequiresAction`] for
    /// [`ProposalKind::Treasury`]: a treasury proposal is bound to exactly one
    /// transfer, so it must be created through
    /// [`create_treasury_action`](Self::create_treasury_action).
    pub fn propose(
        &mut self,
        proposer: AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: ProposalKind,
        execution_ref: ExecutionRef,
    ) -> Result<ProposalId, DaoError> {
        if kind == ProposalKind::Treasury {
            return Err(DaoError::TreasuryProposalRequiresAction);
        }
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self.registry.propose(
            &self.oracle,
            proposer,
            title.into(),
            description.into(),
            kind,
            execution_ref,
            now,
            &mut scratch,
        );
        self.settle(scratch, result)
    }

    /// Withdraw a proposal before its voting window opens.
    pub fn cancel(&mut self, caller: AccountId, proposal_id: ProposalId) -> Result<(), DaoError> {
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self.registry.cancel(proposal_id, &caller, now, &mut scratch);
        self.settle(scratch, result)
    }

    /// Cast a ballot. `support` is the raw tag: 0 against, 1 for, 2 abstain.
    pub fn cast_vote(
        &mut self,
        voter: AccountId,
        proposal_id: ProposalId,
        support: u8,
        reason: impl Into<String>,
    ) -> Result<Vote, DaoError> {
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self.ledger.cast_vote(
            &mut self.registry,
            &self.oracle,
            proposal_id,
            voter,
            support,
            reason.into(),
            now,
            &mut scratch,
        );
        self.settle(scratch, result)
    }

    /// Settle a proposal once its window has closed; a no-op before that.
    pub fn request_status_transition(
        &mut self,
        proposal_id: ProposalId,
    ) -> Result<ProposalStatus, DaoError> {
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self
            .registry
            .request_status_transition(proposal_id, now, &mut scratch);
        self.settle(scratch, result)
    }

    /// Propose moving `amount` of `asset` from custody to `recipient`.
    pub fn create_treasury_action(
        &mut self,
        proposer: AccountId,
        recipient: AccountId,
        amount: u128,
        asset: AssetId,
        description: impl Into<String>,
    ) -> Result<ProposalId, DaoError> {
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self.treasury.create_treasury_action(
            &mut self.registry,
            &self.oracle,
            proposer,
            recipient,
            amount,
            asset,
            description.into(),
            now,
            &mut scratch,
        );
        self.settle(scratch, result)
    }

    /// Execute a Succeeded treasury proposal, moving its funds.
    ///
    /// Only Treasury proposals have an execution step. Other kinds stay
    /// Succeeded and fail here with `NotTreasuryProposal`.
    pub fn execute(&mut self, proposal_id: ProposalId) -> Result<TransactionId, DaoError> {
        let now = self.clock.now();
        let mut scratch = EventLog::new();
        let result = self.treasury.execute(
            &mut self.registry,
            &mut self.transfer,
            proposal_id,
            now,
            &mut scratch,
        );
        self.settle(scratch, result)
    }

    /// Add funds to custody. Accounting only; the caller moves the asset.
    pub fn deposit(&mut self, asset: AssetId, amount: u128) -> Result<u128, DaoError> {
        let mut scratch = EventLog::new();
        let result = self.treasury.deposit(asset, amount, &mut scratch);
        self.settle(scratch, result)
    }

    fn settle<R, E>(&mut self, mut scratch: EventLog, result: Result<R, E>) -> Result<R, DaoError>
    where
        DaoError: From<E>,
    {
        let value = result?;
        for event in scratch.drain() {
            self.events.emit(event);
        }
        Ok(value)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn get_proposal(&self, proposal_id: ProposalId) -> Option<&Proposal> {
        self.registry.get(proposal_id)
    }

    pub fn get_vote(&self, proposal_id: ProposalId, voter: &AccountId) -> Option<&Vote> {
        self.ledger.get_vote(proposal_id, voter)
    }

    pub fn has_voted(&self, proposal_id: ProposalId, voter: &AccountId) -> bool {
        self.ledger.has_voted(proposal_id, voter)
    }

    pub fn votes_for_proposal(&self, proposal_id: ProposalId) -> impl Iterator<Item = &Vote> {
        self.ledger.votes_for_proposal(proposal_id)
    }

    pub fn get_treasury_transaction(&self, id: TransactionId) -> Option<&TreasuryTransaction> {
        self.treasury.get_transaction(id)
    }

    pub fn transaction_for_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Option<&TreasuryTransaction> {
        self.treasury.transaction_for_proposal(proposal_id)
    }

    /// Whether `execute(proposal_id)` would pass its state checks right now.
    pub fn can_execute(&self, proposal_id: ProposalId) -> bool {
        self.treasury
            .can_execute(&self.registry, proposal_id, self.clock.now())
    }

    pub fn custody_balance(&self, asset: &AssetId) -> u128 {
        self.treasury.custody_balance(asset)
    }

    pub fn custody_account(&self) -> &AccountId {
        self.treasury.custody_account()
    }

    pub fn proposal_count(&self) -> u64 {
        self.registry.proposal_count()
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.registry.proposals()
    }

    pub fn params(&self) -> &GovernanceParams {
        self.registry.params()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Persist the whole engine state to a governance store.
    ///
    /// Buffered events are not part of the snapshot.
    pub fn save_to_store(&self, store: &dyn GovernanceStore) -> Result<(), DaoError> {
        for proposal in self.registry.proposals() {
            store.put_proposal(proposal.id, &encode(proposal)?)?;
        }
        for vote in self.ledger.votes() {
            store.put_vote(vote.proposal_id, &vote.voter, &encode(vote)?)?;
        }
        let mut transaction_count = 0u64;
        for tx in self.treasury.transactions() {
            store.put_treasury_transaction(tx.id, &encode(tx)?)?;
            transaction_count += 1;
        }

        store.put_meta(META_PARAMS, &encode(self.registry.params())?)?;
        store.put_meta(META_CUSTODY_ACCOUNT, self.treasury.custody_account().as_bytes())?;
        store.put_meta(META_CUSTODY, &encode(self.treasury.custody())?)?;
        store.put_meta(
            META_NEXT_PROPOSAL_ID,
            &self.registry.next_id()?.to_be_bytes(),
        )?;
        store.put_meta(
            META_NEXT_TRANSACTION_ID,
            &(transaction_count + 1).to_be_bytes(),
        )?;

        tracing::debug!(
            proposals = self.registry.proposal_count(),
            transactions = transaction_count,
            "dao state saved"
        );
        Ok(())
    }

    /// Rebuild an engine from a snapshot written by [`save_to_store`](Self::save_to_store).
    ///
    /// The snapshot is checked for contiguous ids, consistent counters,
    /// tallies that match the stored ballots, and treasury transactions that
    /// agree with their proposals.
    pub fn load_from_store(
        store: &dyn GovernanceStore,
        oracle: O,
        transfer: T,
        clock: C,
    ) -> Result<Self, DaoError> {
        let params: GovernanceParams = decode(&require_meta(store, META_PARAMS)?)?;
        params.validate()?;

        let account_bytes: [u8; 32] = require_meta(store, META_CUSTODY_ACCOUNT)?
            .try_into()
            .map_err(|_| StoreError::Serialization("custody account is not 32 bytes".into()))?;
        let custody_account = AccountId::new(account_bytes);
        let custody: CustodyLedger = decode(&require_meta(store, META_CUSTODY)?)?;

        let proposals = store
            .iter_proposals()?
            .into_iter()
            .map(|(_, bytes)| decode::<Proposal>(&bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let registry = ProposalRegistry::restore(params, proposals)?;

        let votes = store
            .iter_votes()?
            .into_iter()
            .map(|bytes| decode::<Vote>(&bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let ledger = VotingLedger::restore(votes)?;
        check_tallies(&registry, &ledger)?;

        let transactions = store
            .iter_treasury_transactions()?
            .into_iter()
            .map(|(_, bytes)| decode::<TreasuryTransaction>(&bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let transaction_count = transactions.len() as u64;
        let treasury = TreasuryExecutor::restore(custody_account, custody, transactions)?;
        treasury.verify_against(&registry)?;

        check_counter(store, META_NEXT_PROPOSAL_ID, registry.next_id()?)?;
        check_counter(store, META_NEXT_TRANSACTION_ID, transaction_count + 1)?;

        tracing::info!(
            proposals = registry.proposal_count(),
            transactions = transaction_count,
            %custody_account,
            "dao state loaded"
        );
        Ok(Self {
            registry,
            ledger,
            treasury,
            oracle,
            transfer,
            clock,
            events: EventLog::new(),
        })
    }
}

// ── Snapshot helpers ───────────────────────────────────────────────────

fn encode<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn require_meta(store: &dyn GovernanceStore, key: &'static [u8]) -> Result<Vec<u8>, StoreError> {
    store
        .get_meta(key)?
        .ok_or_else(|| StoreError::not_found("meta", String::from_utf8_lossy(key)))
}

fn check_counter(
    store: &dyn GovernanceStore,
    key: &'static [u8],
    expected: u64,
) -> Result<(), DaoError> {
    let bytes = require_meta(store, key)?;
    let stored = <[u8; 8]>::try_from(bytes.as_slice())
        .map(u64::from_be_bytes)
        .map_err(|_| StoreError::Serialization("id counter is not 8 bytes".into()))?;
    if stored != expected {
        return Err(GovernanceError::InconsistentState(format!(
            "{} is {stored} but the stored records imply {expected}",
            String::from_utf8_lossy(key)
        ))
        .into());
    }
    Ok(())
}

/// Every ballot must reference a stored proposal and each proposal's tallies
/// must equal the summed weights of its ballots.
fn check_tallies(registry: &ProposalRegistry, ledger: &VotingLedger) -> Result<(), GovernanceError> {
    if let Some(orphan) = ledger.votes().find(|v| registry.get(v.proposal_id).is_none()) {
        return Err(GovernanceError::InconsistentState(format!(
            "ballot by {} references unknown proposal {}",
            orphan.voter, orphan.proposal_id
        )));
    }
    for proposal in registry.proposals() {
        let totals = (
            proposal.votes_for,
            proposal.votes_against,
            proposal.votes_abstain,
        );
        if ledger.weight_totals(proposal.id) != totals {
            return Err(GovernanceError::InconsistentState(format!(
                "tallies of proposal {} do not match its ballots",
                proposal.id
            )));
        }
    }
    Ok(())
}
