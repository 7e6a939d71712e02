//! End-to-end proposal lifecycles through the `Dao` facade, driven by the
//! deterministic nullables.

use tidygen_dao::{Dao, DaoConfig, DaoError};
use tidygen_governance::{GovernanceError, GovernanceEvent, ProposalKind, ProposalStatus};
use tidygen_nullables::{NullClock, NullTransfer, NullVotingPower, TransferRecord};
use tidygen_treasury::{TransferError, TreasuryError};
use tidygen_types::{AccountId, AssetId, ExecutionRef, GovernanceParams};

const DAY: u64 = 24 * 3600;
const GENESIS: u64 = 1_700_000_000;

const AGAINST: u8 = 0;
const FOR: u8 = 1;
const ABSTAIN: u8 = 2;

fn test_account(n: u8) -> AccountId {
    AccountId::new([n; 32])
}

fn custody() -> AccountId {
    test_account(0xCC)
}

fn recipient() -> AccountId {
    test_account(0xEE)
}

struct Harness {
    dao: Dao<NullVotingPower, NullTransfer, NullClock>,
    power: NullVotingPower,
    transfers: NullTransfer,
    clock: NullClock,
}

fn harness() -> Harness {
    let power = NullVotingPower::new();
    let transfers = NullTransfer::new();
    let clock = NullClock::new(GENESIS);
    let dao = Dao::new(
        &DaoConfig::new(custody()),
        power.clone(),
        transfers.clone(),
        clock.clone(),
    )
    .expect("default config is valid");
    Harness {
        dao,
        power,
        transfers,
        clock,
    }
}

impl Harness {
    /// Move the clock to the first second of the proposal's voting window.
    fn open_voting(&self, proposal_id: u64) {
        let start = self.dao.get_proposal(proposal_id).unwrap().start_time;
        self.clock.set(start.as_secs());
    }

    /// Move the clock just past the proposal's voting window.
    fn close_voting(&self, proposal_id: u64) {
        let end = self.dao.get_proposal(proposal_id).unwrap().end_time;
        self.clock.set(end.as_secs() + 1);
    }
}

#[test]
fn treasury_transfer_happy_path() {
    let mut h = harness();
    let proposer = test_account(1);
    let (a, b, c) = (test_account(2), test_account(3), test_account(4));
    h.power.set(proposer, 1_500);
    h.power.set(a, 4_000);
    h.power.set(b, 3_000);
    h.power.set(c, 3_500);

    h.dao.deposit(AssetId::Native, 2_000).unwrap();
    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 500, AssetId::Native, "fund cleanup")
        .unwrap();
    assert_eq!(id, 1);

    let proposal = h.dao.get_proposal(id).unwrap();
    assert_eq!(proposal.kind, ProposalKind::Treasury);
    assert_eq!(proposal.start_time.as_secs(), GENESIS + DAY);
    assert_eq!(proposal.end_time.as_secs(), GENESIS + 4 * DAY);

    h.open_voting(id);
    h.dao.cast_vote(a, id, FOR, "yes").unwrap();
    h.dao.cast_vote(b, id, AGAINST, "no").unwrap();
    h.dao.cast_vote(c, id, FOR, "").unwrap();

    let proposal = h.dao.get_proposal(id).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Active);
    assert_eq!(proposal.votes_for, 7_500);
    assert_eq!(proposal.votes_against, 3_000);
    assert_eq!(proposal.total_votes(), 10_500);

    h.close_voting(id);
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Succeeded
    );
    assert!(h.dao.can_execute(id));

    assert_eq!(h.dao.execute(id).unwrap(), 1);
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 1_500);
    assert_eq!(
        h.transfers.sent(),
        vec![TransferRecord {
            asset: AssetId::Native,
            from: custody(),
            to: recipient(),
            amount: 500,
        }]
    );
    let tx = h.dao.get_treasury_transaction(1).unwrap();
    assert!(tx.executed);
    assert_eq!(tx.executed_at.map(|t| t.as_secs()), Some(GENESIS + 4 * DAY + 1));
    assert_eq!(h.dao.get_proposal(id).unwrap().status, ProposalStatus::Executed);
    assert!(!h.dao.can_execute(id));

    let err = h.dao.execute(id).unwrap_err();
    assert!(matches!(
        err.as_treasury(),
        Some(TreasuryError::AlreadyExecuted { transaction_id: 1, proposal_id: 1 })
    ));
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 1_500);
    assert_eq!(h.transfers.attempts(), 1);
}

#[test]
fn events_describe_each_transition() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 20_000);

    h.dao.deposit(AssetId::token("TIDY"), 900).unwrap();
    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 900, AssetId::token("TIDY"), "")
        .unwrap();
    h.open_voting(id);
    h.dao.cast_vote(proposer, id, FOR, "mine").unwrap();
    h.close_voting(id);
    h.dao.request_status_transition(id).unwrap();
    h.dao.execute(id).unwrap();

    let events = h.dao.take_events();
    assert!(h.dao.take_events().is_empty());

    let names: Vec<&str> = events
        .iter()
        .map(|e| match e {
            GovernanceEvent::TreasuryDeposit { .. } => "deposit",
            GovernanceEvent::ProposalCreated { .. } => "created",
            GovernanceEvent::TreasuryTransactionCreated { .. } => "tx_created",
            GovernanceEvent::ProposalStatusChanged { .. } => "status",
            GovernanceEvent::VoteCast { .. } => "vote",
            GovernanceEvent::ProposalExecuted { .. } => "executed",
            GovernanceEvent::TreasuryTransactionExecuted { .. } => "tx_executed",
            GovernanceEvent::ProposalCancelled { .. } => "cancelled",
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "deposit",
            "created",
            "tx_created",
            "status",
            "vote",
            "status",
            "status",
            "executed",
            "tx_executed",
        ]
    );

    match &events[4] {
        GovernanceEvent::VoteCast {
            voter,
            weight,
            reason,
            ..
        } => {
            assert_eq!(*voter, proposer);
            assert_eq!(*weight, 20_000);
            assert_eq!(reason, "mine");
        }
        other => panic!("unexpected event {other:?}"),
    }
    match events.last() {
        Some(GovernanceEvent::TreasuryTransactionExecuted {
            recipient: to,
            amount,
            asset,
            ..
        }) => {
            assert_eq!(*to, recipient());
            assert_eq!(*amount, 900);
            assert_eq!(*asset, AssetId::token("TIDY"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn cancelled_proposal_rejects_votes_and_execution() {
    let mut h = harness();
    let proposer = test_account(1);
    let voter = test_account(2);
    h.power.set(proposer, 5_000);
    h.power.set(voter, 50_000);
    h.dao.deposit(AssetId::Native, 1_000).unwrap();

    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 100, AssetId::Native, "")
        .unwrap();

    let err = h.dao.cancel(voter, id).unwrap_err();
    assert_eq!(err.as_governance(), Some(&GovernanceError::NotProposer(id)));

    h.dao.cancel(proposer, id).unwrap();
    assert_eq!(h.dao.get_proposal(id).unwrap().status, ProposalStatus::Cancelled);
    assert!(h.dao.get_proposal(id).unwrap().cancelled);

    h.open_voting(id);
    let err = h.dao.cast_vote(voter, id, FOR, "").unwrap_err();
    assert_eq!(err.as_governance(), Some(&GovernanceError::ProposalCancelled(id)));

    h.close_voting(id);
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Cancelled
    );
    assert!(!h.dao.can_execute(id));
    let err = h.dao.execute(id).unwrap_err();
    assert_eq!(err.as_governance(), Some(&GovernanceError::ProposalCancelled(id)));
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 1_000);
    assert!(h.transfers.sent().is_empty());
}

#[test]
fn cancel_after_voting_starts_is_rejected() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 5_000);
    let id = h
        .dao
        .propose(proposer, "rename", "", ProposalKind::Community, ExecutionRef::ZERO)
        .unwrap();

    h.open_voting(id);
    let err = h.dao.cancel(proposer, id).unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::VotingAlreadyStarted(id))
    );
    assert_eq!(h.dao.get_proposal(id).unwrap().status, ProposalStatus::Pending);
}

fn settle_with_votes(votes: &[(u8, u128, u8)]) -> ProposalStatus {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 1_000);
    let id = h
        .dao
        .propose(proposer, "params", "", ProposalKind::Parameter, ExecutionRef::ZERO)
        .unwrap();
    h.open_voting(id);
    for (n, weight, support) in votes {
        h.power.set(test_account(*n), *weight);
        h.dao.cast_vote(test_account(*n), id, *support, "").unwrap();
    }
    h.close_voting(id);
    h.dao.request_status_transition(id).unwrap()
}

#[test]
fn quorum_boundary() {
    // 9_999 total: defeated however it splits.
    assert_eq!(
        settle_with_votes(&[(10, 9_999, FOR)]),
        ProposalStatus::Defeated
    );
    assert_eq!(
        settle_with_votes(&[(10, 9_000, FOR), (11, 999, ABSTAIN)]),
        ProposalStatus::Defeated
    );
    // 10_000 total with for > against: succeeded.
    assert_eq!(
        settle_with_votes(&[(10, 6_000, FOR), (11, 4_000, AGAINST)]),
        ProposalStatus::Succeeded
    );
    // Quorum met but tied.
    assert_eq!(
        settle_with_votes(&[(10, 5_000, FOR), (11, 5_000, AGAINST)]),
        ProposalStatus::Defeated
    );
}

#[test]
fn defeated_execution_reports_the_reason() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 2_000);
    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 10, AssetId::Native, "")
        .unwrap();
    h.open_voting(id);
    h.dao.cast_vote(proposer, id, FOR, "").unwrap();
    h.close_voting(id);

    let err = h.dao.execute(id).unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::VotingNotFinalized(id))
    );

    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Defeated
    );
    let err = h.dao.execute(id).unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::QuorumNotMet {
            have: 2_000,
            need: GovernanceParams::DEFAULT_QUORUM_THRESHOLD,
        })
    );
}

#[test]
fn timing_gate() {
    let mut h = harness();
    let proposer = test_account(1);
    let voter = test_account(2);
    h.power.set(proposer, 1_000);
    h.power.set(voter, 12_000);
    let id = h
        .dao
        .propose(proposer, "upgrade", "", ProposalKind::Upgrade, ExecutionRef::ZERO)
        .unwrap();
    let (start, end) = {
        let p = h.dao.get_proposal(id).unwrap();
        (p.start_time.as_secs(), p.end_time.as_secs())
    };

    h.clock.set(start - 1);
    let err = h.dao.cast_vote(voter, id, FOR, "").unwrap_err();
    assert!(matches!(
        err.as_governance(),
        Some(GovernanceError::VotingNotStarted { .. })
    ));

    // Inclusive upper bound.
    h.clock.set(end);
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Pending
    );
    h.dao.cast_vote(voter, id, FOR, "last second").unwrap();
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Active
    );
    let err = h.dao.execute(id).unwrap_err();
    assert!(matches!(
        err.as_governance(),
        Some(GovernanceError::VotingNotEnded { .. })
    ));

    h.clock.set(end + 1);
    let err = h.dao.cast_vote(test_account(3), id, FOR, "").unwrap_err();
    assert!(matches!(
        err.as_governance(),
        Some(GovernanceError::VotingEnded { .. })
    ));
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Succeeded
    );
}

#[test]
fn vote_validation_is_fail_atomic() {
    let mut h = harness();
    let proposer = test_account(1);
    let voter = test_account(2);
    h.power.set(proposer, 1_000);
    h.power.set(voter, 3_000);
    let id = h
        .dao
        .propose(proposer, "x", "", ProposalKind::Community, ExecutionRef::ZERO)
        .unwrap();
    h.open_voting(id);
    h.dao.take_events();

    let err = h.dao.cast_vote(voter, id, 7, "").unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::InvalidSupportValue(7))
    );
    let err = h.dao.cast_vote(test_account(9), id, FOR, "").unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::NoVotingPower(test_account(9)))
    );
    let err = h.dao.cast_vote(voter, 42, FOR, "").unwrap_err();
    assert_eq!(err.as_governance(), Some(&GovernanceError::ProposalNotFound(42)));
    assert!(!h.dao.has_voted(id, &voter));
    assert_eq!(h.dao.get_proposal(id).unwrap().total_votes(), 0);
    assert_eq!(h.dao.pending_events(), 0);

    h.dao.cast_vote(voter, id, ABSTAIN, "").unwrap();
    // Weight is fixed at cast time.
    h.power.set(voter, 1);
    let err = h.dao.cast_vote(voter, id, FOR, "").unwrap_err();
    assert!(matches!(
        err.as_governance(),
        Some(GovernanceError::DuplicateVote { .. })
    ));
    assert_eq!(h.dao.get_vote(id, &voter).unwrap().weight, 3_000);
    assert_eq!(h.dao.get_proposal(id).unwrap().votes_abstain, 3_000);
}

#[test]
fn proposal_input_validation() {
    let mut h = harness();
    let weak = test_account(1);
    let strong = test_account(2);
    h.power.set(weak, 999);
    h.power.set(strong, 1_000);

    let err = h
        .dao
        .propose(weak, "t", "", ProposalKind::Community, ExecutionRef::ZERO)
        .unwrap_err();
    assert_eq!(
        err.as_governance(),
        Some(&GovernanceError::InsufficientProposalPower {
            have: 999,
            need: 1_000
        })
    );

    let err = h
        .dao
        .create_treasury_action(strong, AccountId::NULL, 5, AssetId::Native, "")
        .unwrap_err();
    assert!(matches!(err.as_treasury(), Some(TreasuryError::InvalidRecipient)));

    let err = h
        .dao
        .create_treasury_action(strong, recipient(), 0, AssetId::Native, "")
        .unwrap_err();
    assert!(matches!(err.as_treasury(), Some(TreasuryError::ZeroAmount)));

    let long_title = "x".repeat(GovernanceParams::DEFAULT_MAX_TITLE_LEN + 1);
    let err = h
        .dao
        .propose(strong, long_title, "", ProposalKind::Community, ExecutionRef::ZERO)
        .unwrap_err();
    assert!(matches!(
        err.as_governance(),
        Some(GovernanceError::TitleTooLong { .. })
    ));

    assert_eq!(h.dao.proposal_count(), 0);
    assert!(h.dao.get_treasury_transaction(1).is_none());
}

#[test]
fn rejected_transfer_rolls_back_and_can_be_retried() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 10_000);
    h.dao.deposit(AssetId::Native, 300).unwrap();
    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 300, AssetId::Native, "")
        .unwrap();
    h.open_voting(id);
    h.dao.cast_vote(proposer, id, FOR, "").unwrap();
    h.close_voting(id);
    h.dao.request_status_transition(id).unwrap();
    h.dao.take_events();

    h.transfers
        .reject_with(TransferError::Rejected("recipient frozen".into()));
    let err = h.dao.execute(id).unwrap_err();
    match err {
        DaoError::Treasury(TreasuryError::TransferFailed { reason, .. }) => {
            assert!(reason.contains("recipient frozen"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 300);
    assert!(!h.dao.get_treasury_transaction(1).unwrap().executed);
    assert_eq!(h.dao.get_proposal(id).unwrap().status, ProposalStatus::Succeeded);
    assert_eq!(h.dao.pending_events(), 0);
    assert!(h.dao.can_execute(id));

    h.transfers.accept();
    h.dao.execute(id).unwrap();
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 0);
    assert_eq!(h.transfers.received(&recipient(), &AssetId::Native), 300);
}

#[test]
fn short_custody_fails_the_transfer() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 10_000);
    h.dao.deposit(AssetId::Native, 99).unwrap();
    let id = h
        .dao
        .create_treasury_action(proposer, recipient(), 100, AssetId::Native, "")
        .unwrap();
    h.open_voting(id);
    h.dao.cast_vote(proposer, id, FOR, "").unwrap();
    h.close_voting(id);
    h.dao.request_status_transition(id).unwrap();

    let err = h.dao.execute(id).unwrap_err();
    assert!(matches!(
        err.as_treasury(),
        Some(TreasuryError::TransferFailed { transaction_id: 1, .. })
    ));
    assert_eq!(h.transfers.attempts(), 0);

    h.dao.deposit(AssetId::Native, 1).unwrap();
    assert_eq!(h.dao.execute(id).unwrap(), 1);
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 0);
}

#[test]
fn non_treasury_proposal_stays_succeeded() {
    let mut h = harness();
    let proposer = test_account(1);
    h.power.set(proposer, 10_000);
    h.dao.deposit(AssetId::Native, 50).unwrap();
    let action = ExecutionRef::new([9u8; 32]);
    let id = h
        .dao
        .propose(proposer, "raise quorum", "", ProposalKind::Parameter, action)
        .unwrap();
    h.open_voting(id);
    h.dao.cast_vote(proposer, id, FOR, "").unwrap();
    h.close_voting(id);
    assert_eq!(
        h.dao.request_status_transition(id).unwrap(),
        ProposalStatus::Succeeded
    );
    h.dao.take_events();

    assert!(!h.dao.can_execute(id));
    for _ in 0..2 {
        let err = h.dao.execute(id).unwrap_err();
        assert!(matches!(
            err.as_treasury(),
            Some(TreasuryError::NotTreasuryProposal(p)) if *p == id
        ));
    }
    let proposal = h.dao.get_proposal(id).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Succeeded);
    assert_eq!(proposal.executed_at, None);
    assert_eq!(proposal.execution_ref, action);
    assert!(h.dao.transaction_for_proposal(id).is_none());
    assert!(h.transfers.sent().is_empty());
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 50);
    assert_eq!(h.dao.pending_events(), 0);
}

#[test]
fn deposits_track_each_asset() {
    let mut h = harness();
    assert_eq!(h.dao.deposit(AssetId::Native, 10).unwrap(), 10);
    assert_eq!(h.dao.deposit(AssetId::Native, 5).unwrap(), 15);
    assert_eq!(h.dao.deposit(AssetId::token("USDC"), 7).unwrap(), 7);
    assert_eq!(h.dao.custody_balance(&AssetId::token("DAI")), 0);

    let err = h.dao.deposit(AssetId::Native, 0).unwrap_err();
    assert!(matches!(err.as_treasury(), Some(TreasuryError::ZeroAmount)));
    assert_eq!(h.dao.custody_balance(&AssetId::Native), 15);
}
