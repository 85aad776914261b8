multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::tally::VotingTally;

// ============================================================
// Proposal Status: lifecycle states
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProposalStatus {
    /// Opened by the registry, nothing submitted yet.
    Empty,
    /// Submitted with its commitment locked. Under discussion.
    Draft,
    /// Committee snapshot taken. Voters are being assigned.
    Final,
    /// Every committee member assigned. Votes are being cast.
    Voting,
    /// Quorum, weighted quorum and majority reached. Awaiting council review.
    Approved,
    /// Scrutiny failed. Commitment refunded.
    Rejected,
    /// Council let the proposal through. Awaiting funding.
    Reviewed,
    /// Council veto. Commitment slashed to the registry.
    Blocked,
    /// Grant paid out by the registry. Commitment refunded.
    Funded,
    /// All voters removed and residue swept. May be deleted.
    Decommissioned,
}

impl ProposalStatus {
    /// Whether a commitment lock is held in this state.
    pub fn holds_lock(self) -> bool {
        matches!(
            self,
            ProposalStatus::Draft
                | ProposalStatus::Final
                | ProposalStatus::Voting
                | ProposalStatus::Approved
                | ProposalStatus::Reviewed
        )
    }

    /// Terminal outcomes of a round, from which decommissioning may start.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ProposalStatus::Rejected | ProposalStatus::Blocked | ProposalStatus::Funded
        )
    }
}

// ============================================================
// Classification
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FundingCategory {
    Small,
    Medium,
    Large,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FundingType {
    Proactive,
    Retroactive,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Classification {
    pub category: FundingCategory,
    pub funding_type: FundingType,
    pub focus: u8,
}

// ============================================================
// Committee snapshot: copied from the registry at finalize
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct CommitteeSnapshot<M: ManagedTypeApi> {
    pub id: ManagedBuffer<M>,
    pub members: u32,
    pub votes: u64,
}

impl<M: ManagedTypeApi> CommitteeSnapshot<M> {
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && self.members > 0 && self.votes > 0
    }
}

// ============================================================
// Custody: where the proposer's commitment stands
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub enum Custody<M: ManagedTypeApi> {
    /// Nothing paid yet.
    Unfunded,
    /// Commitment held by the proposal account.
    Locked { amount: BigUint<M> },
    /// Commitment refunded or slashed; the cooldown runs from `cooldown_start`.
    Released { cooldown_start: u64 },
}

impl<M: ManagedTypeApi> Custody<M> {
    pub fn locked_amount(&self) -> BigUint<M> {
        match self {
            Custody::Locked { amount } => amount.clone(),
            _ => BigUint::zero(),
        }
    }

    /// Zero while no cooldown is running.
    pub fn cooldown_start(&self) -> u64 {
        match self {
            Custody::Released { cooldown_start } => *cooldown_start,
            _ => 0,
        }
    }
}

/// Block timestamps of each milestone. Zero means not reached.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Timeline {
    pub opened_at: u64,
    pub submitted_at: u64,
    pub finalized_at: u64,
    pub vote_opened_at: u64,
}

// ============================================================
// Proposal Record: one per contract instance
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct ProposalRecord<M: ManagedTypeApi> {
    pub proposer: ManagedAddress<M>,
    pub registry: ManagedAddress<M>,
    pub title: ManagedBuffer<M>,
    /// Content identifier of the off-chain proposal document
    pub cid: ManagedBuffer<M>,
    pub requested_amount: BigUint<M>,
    pub classification: Option<Classification>,
    pub custody: Custody<M>,
    pub timeline: Timeline,
    pub committee: Option<CommitteeSnapshot<M>>,
    pub tally: VotingTally,
    pub status: ProposalStatus,
}

impl<M: ManagedTypeApi> ProposalRecord<M> {
    pub fn open(proposer: ManagedAddress<M>, registry: ManagedAddress<M>, opened_at: u64) -> Self {
        ProposalRecord {
            proposer,
            registry,
            title: ManagedBuffer::new(),
            cid: ManagedBuffer::new(),
            requested_amount: BigUint::zero(),
            classification: None,
            custody: Custody::Unfunded,
            timeline: Timeline {
                opened_at,
                ..Timeline::default()
            },
            committee: None,
            tally: VotingTally::default(),
            status: ProposalStatus::Empty,
        }
    }

    pub fn category(&self) -> Option<FundingCategory> {
        self.classification.map(|c| c.category)
    }

    pub fn locked_amount(&self) -> BigUint<M> {
        self.custody.locked_amount()
    }

    /// Drops everything the proposer submitted. Custody and status are left to the caller.
    pub fn clear_submission(&mut self) {
        self.title = ManagedBuffer::new();
        self.cid = ManagedBuffer::new();
        self.requested_amount = BigUint::zero();
        self.classification = None;
    }
}

// ============================================================
// Voter Record: one per assigned committee member
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub struct VoterRecord {
    pub power: u64,
    pub voted: bool,
}

/// Per-element result of a voter batch, in input order.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub enum VoterReceipt<M: ManagedTypeApi> {
    Assigned { voter: ManagedAddress<M>, power: u64 },
    Unassigned { voter: ManagedAddress<M>, power: u64 },
    NotAssigned { voter: ManagedAddress<M> },
}

// ============================================================
// Recoverable failures
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProposalError {
    WrongProposalStatus,
    VotingPeriodExpired,
    VoterNotFound,
    AlreadyVoted,
    VotesExceeded,
    MissingConfig,
}

impl ProposalError {
    pub fn message(self) -> &'static str {
        match self {
            ProposalError::WrongProposalStatus => "Wrong proposal status",
            ProposalError::VotingPeriodExpired => "Voting period has expired",
            ProposalError::VoterNotFound => "Voter not found",
            ProposalError::AlreadyVoted => "Voter already voted",
            ProposalError::VotesExceeded => "Votes exceed voting power",
            ProposalError::MissingConfig => "Missing configuration",
        }
    }
}

/// What registry-mediated endpoints hand back instead of aborting.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperationOutcome {
    Success,
    Failed(ProposalError),
}

impl From<Result<(), ProposalError>> for OperationOutcome {
    fn from(result: Result<(), ProposalError>) -> Self {
        match result {
            Ok(()) => OperationOutcome::Success,
            Err(err) => OperationOutcome::Failed(err),
        }
    }
}
