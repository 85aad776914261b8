#![no_std]

multiversx_sc::imports!();

/// Unwraps a recoverable result inside an endpoint that has no caller to report to,
/// turning the error into a transaction abort.
macro_rules! or_abort {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => sc_panic!(err.message()),
        }
    };
}

pub mod auth;
pub mod custody;
pub mod registry_config;
pub mod tally;
pub mod types;
pub mod voting;

use auth::{Operation, RegistryCapability};
use custody::Disposition;
use registry_config::ConfigKey;
use tally::{Verdict, VotingState};
use types::{
    Classification, CommitteeSnapshot, Custody, FundingCategory, FundingType, OperationOutcome,
    ProposalError, ProposalRecord, ProposalStatus, VoterReceipt,
};

// ============================================================
// Constants
// ============================================================

/// Maximum title length in bytes
pub const TITLE_MAX_BYTES: usize = 123;

/// Length of the content identifier of the proposal document
pub const CID_LENGTH: usize = 36;

/// Accepted committee identifier lengths
pub const COMMITTEE_ID_LENGTHS: [usize; 2] = [32, 36];

// ============================================================
// Contract
// ============================================================

#[multiversx_sc::contract]
pub trait GrantProposal:
    auth::AuthorizationModule
    + registry_config::RegistryConfigModule
    + custody::FundCustodyModule
    + voting::VotingModule
{
    // ========================================================
    // Init / Upgrade
    // Deployed by the registry, which advances the proposal fee.
    // ========================================================

    #[init]
    #[payable("EGLD")]
    fn init(&self, proposer: ManagedAddress) {
        let registry = self.blockchain().get_caller();
        let now = self.blockchain().get_block_timestamp();

        self.registry_address().set(&registry);
        self.proposer_address().set(&proposer);
        self.assigned_voters().set(0u32);
        self.assigned_votes().set(0u64);
        self.proposal()
            .set(ProposalRecord::open(proposer.clone(), registry, now));

        self.proposal_opened_event(&proposer, now);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: submit
    // Empty → Draft. The payment is the commitment lock.
    // ========================================================

    #[endpoint(submit)]
    #[payable("EGLD")]
    fn submit(
        &self,
        title: ManagedBuffer,
        cid: ManagedBuffer,
        funding_type: FundingType,
        focus: u8,
        requested_amount: BigUint,
    ) {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Submit, record.status));
        self.require_valid_content(&title, &cid);

        let bounds = or_abort!(self.category_bounds());
        let category = match bounds.categorize(&requested_amount) {
            Some(category) => category,
            None => sc_panic!("Requested amount out of bounds"),
        };

        let lock = or_abort!(self.required_lock(&requested_amount));
        let payment = self.call_value().egld_value().clone_value();
        require!(payment == lock, "Payment must equal the commitment lock");

        let now = self.blockchain().get_block_timestamp();
        record.title = title;
        record.cid = cid;
        record.requested_amount = requested_amount;
        record.classification = Some(Classification {
            category,
            funding_type,
            focus,
        });
        record.custody = Custody::Locked { amount: lock };
        record.timeline.submitted_at = now;
        record.status = ProposalStatus::Draft;
        self.proposal().set(&record);

        self.proposal_submitted_event(&record.proposer, category, &record.requested_amount);
    }

    // ========================================================
    // ENDPOINT: update
    // ========================================================

    #[endpoint(update)]
    fn update(&self, title: ManagedBuffer, cid: ManagedBuffer) {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Update, record.status));
        self.require_valid_content(&title, &cid);

        record.title = title;
        record.cid = cid;
        self.proposal().set(&record);

        self.proposal_updated_event(&record.proposer, &record.cid);
    }

    // ========================================================
    // ENDPOINT: drop
    // Draft → Decommissioned. Full refund of the lock.
    // ========================================================

    #[endpoint(drop)]
    fn drop_proposal(&self) {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Drop, record.status));

        self.settle_lock(&mut record, Disposition::Refund);
        self.sweep_residual(&record.registry);

        record.clear_submission();
        record.status = ProposalStatus::Decommissioned;
        self.proposal().set(&record);

        self.proposal_dropped_event(&record.proposer);
    }

    // ========================================================
    // ENDPOINT: finalize
    // Draft → Final. Snapshots the committee, pays the publisher.
    // ========================================================

    #[endpoint(finalize)]
    fn finalize(&self) {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Finalize, record.status));

        let category = self.require_category(&record);
        let discussion = or_abort!(self.config_param(ConfigKey::DiscussionDuration(category)));
        let now = self.blockchain().get_block_timestamp();
        require!(
            now.saturating_sub(record.timeline.submitted_at) >= discussion,
            "Discussion period has not elapsed"
        );

        require!(!self.declared_committee().is_empty(), "Committee not declared");
        let committee = self.declared_committee().get();
        require!(committee.is_complete(), "Committee is empty");

        require!(
            !self.committee_publisher().is_empty(),
            "Committee publisher not set"
        );
        let fee = or_abort!(self.publishing_fee());
        require!(
            self.custody_balance() >= record.locked_amount() + &fee,
            "Proposal fee float does not cover the publishing fee"
        );
        if fee > 0u64 {
            self.send()
                .direct_egld(&self.committee_publisher().get(), &fee);
        }

        record.timeline.finalized_at = now;
        record.status = ProposalStatus::Final;
        self.proposal_finalized_event(&record.proposer, &committee.id, &fee);
        record.committee = Some(committee);
        self.proposal().set(&record);
    }

    // ========================================================
    // ENDPOINT: assignVoters
    // Final → Final, and Final → Voting once the committee is complete.
    // ========================================================

    #[endpoint(assignVoters)]
    fn assign_voters(
        &self,
        voters: MultiValueEncoded<MultiValue2<ManagedAddress, u64>>,
    ) -> MultiValueEncoded<VoterReceipt<Self::Api>> {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::AssignVoter, record.status));
        let committee = self.require_committee(&record);

        let mut receipts = MultiValueEncoded::new();
        for entry in voters.into_iter() {
            let (voter, power) = entry.into_tuple();
            require!(
                record.status == ProposalStatus::Final,
                "Voting is already open"
            );
            require!(
                self.assigned_voters().get() < committee.members,
                "Committee is already complete"
            );

            self.assign_voter_record(&voter, power, committee.votes);
            self.voter_assigned_event(&voter, power);

            if self.assigned_voters().get() == committee.members {
                require!(
                    self.assigned_votes().get() == committee.votes,
                    "Assigned voting power does not match the committee"
                );
                let now = self.blockchain().get_block_timestamp();
                record.timeline.vote_opened_at = now;
                record.status = ProposalStatus::Voting;
                self.voting_opened_event(&committee.id, now);
            }

            receipts.push(VoterReceipt::Assigned { voter, power });
        }

        self.proposal().set(&record);
        receipts
    }

    // ========================================================
    // ENDPOINT: unassignVoters / unassignAbsentees
    // ========================================================

    #[endpoint(unassignVoters)]
    fn unassign_voters(
        &self,
        voters: MultiValueEncoded<ManagedAddress>,
    ) -> MultiValueEncoded<VoterReceipt<Self::Api>> {
        let record = self.load_record();
        or_abort!(self.authorize(Operation::UnassignVoter, record.status));
        self.unassign_batch(voters)
    }

    /// Registry cleanup of members who stayed away from a closed round.
    #[endpoint(unassignAbsentees)]
    fn unassign_absentees(
        &self,
        absentees: MultiValueEncoded<ManagedAddress>,
    ) -> MultiValueEncoded<VoterReceipt<Self::Api>> {
        self.registry_capability();
        let record = self.load_record();
        or_abort!(self.authorize(Operation::UnassignAbsentee, record.status));
        self.unassign_batch(absentees)
    }

    // ========================================================
    // ENDPOINT: vote
    // Cast by the registry on behalf of a committee member.
    // ========================================================

    #[endpoint(vote)]
    fn vote(&self, voter: ManagedAddress, approvals: u64, rejections: u64) -> OperationOutcome {
        let registry = self.registry_capability();
        self.cast_vote(&registry, &voter, approvals, rejections)
            .into()
    }

    fn cast_vote(
        &self,
        _registry: &RegistryCapability<Self::Api>,
        voter: &ManagedAddress,
        approvals: u64,
        rejections: u64,
    ) -> Result<(), ProposalError> {
        let mut record = self.load_record();
        self.authorize(Operation::Vote, record.status)?;

        let category = record
            .category()
            .ok_or(ProposalError::WrongProposalStatus)?;
        let voting_duration = self.config_param(ConfigKey::VotingDuration(category))?;
        let now = self.blockchain().get_block_timestamp();
        if now.saturating_sub(record.timeline.vote_opened_at) > voting_duration {
            return Err(ProposalError::VotingPeriodExpired);
        }

        self.cast_ballot(&mut record.tally, voter, approvals, rejections)?;
        self.proposal().set(&record);

        self.vote_cast_event(voter, approvals, rejections);
        Ok(())
    }

    // ========================================================
    // ENDPOINT: scrutiny
    // Voting → Approved | Rejected. Anyone, once voting is closed.
    // ========================================================

    #[endpoint(scrutiny)]
    fn scrutiny(&self) -> ProposalStatus {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Scrutiny, record.status));

        let category = self.require_category(&record);
        let committee = self.require_committee(&record);
        let voting_duration = or_abort!(self.config_param(ConfigKey::VotingDuration(category)));
        let now = self.blockchain().get_block_timestamp();
        let window_elapsed = now.saturating_sub(record.timeline.vote_opened_at) > voting_duration;
        let everyone_voted = record.tally.voted_members >= committee.members;
        require!(window_elapsed || everyone_voted, "Voting is still open");

        let rule = or_abort!(self.quorum_rule(category));
        let verdict = record.tally.verdict(committee.members, committee.votes, &rule);
        if verdict == Verdict::Rejected {
            self.settle_lock(&mut record, Disposition::Refund);
        }
        record.status = verdict.status();
        self.proposal().set(&record);

        self.proposal_scrutinized_event(
            record.status,
            record.tally.approvals,
            record.tally.rejections,
        );
        record.status
    }

    // ========================================================
    // ENDPOINT: review
    // Approved → Reviewed, or Approved → Blocked on a council veto.
    // ========================================================

    #[endpoint(review)]
    fn review(&self, block: bool) {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Review, record.status));

        if block {
            self.settle_lock(&mut record, Disposition::Slash);
            record.status = ProposalStatus::Blocked;
        } else {
            record.status = ProposalStatus::Reviewed;
        }
        self.proposal().set(&record);

        self.proposal_reviewed_event(block);
    }

    // ========================================================
    // ENDPOINT: fund
    // Reviewed → Funded. The grant itself is paid by the registry treasury.
    // ========================================================

    #[endpoint(fund)]
    fn fund(&self) -> OperationOutcome {
        let registry = self.registry_capability();
        self.settle_funding(&registry).into()
    }

    fn settle_funding(&self, _registry: &RegistryCapability<Self::Api>) -> Result<(), ProposalError> {
        let mut record = self.load_record();
        self.authorize(Operation::Fund, record.status)?;

        self.settle_lock(&mut record, Disposition::Refund);
        record.status = ProposalStatus::Funded;
        self.proposal().set(&record);

        self.proposal_funded_event(&record.proposer, &record.requested_amount);
        Ok(())
    }

    // ========================================================
    // ENDPOINT: decommission
    // Funded | Blocked | Rejected → Decommissioned. The batch must leave no voter assigned.
    // ========================================================

    #[endpoint(decommission)]
    fn decommission(
        &self,
        voters: MultiValueEncoded<ManagedAddress>,
    ) -> MultiValueEncoded<VoterReceipt<Self::Api>> {
        let mut record = self.load_record();
        or_abort!(self.authorize(Operation::Decommission, record.status));
        require!(
            or_abort!(self.cooldown_elapsed(&record.custody)),
            "Cooldown period has not elapsed"
        );

        let receipts = self.unassign_batch(voters);
        require!(
            self.assigned_voters().get() == 0,
            "Voters are still assigned"
        );

        self.sweep_residual(&record.registry);
        record.status = ProposalStatus::Decommissioned;
        self.proposal().set(&record);
        self.proposal_decommissioned_event(&record.proposer);

        receipts
    }

    // ========================================================
    // ENDPOINT: delete
    // Wipes a decommissioned proposal from storage.
    // ========================================================

    #[endpoint(delete)]
    fn delete(&self) -> OperationOutcome {
        let registry = self.registry_capability();
        self.wipe(&registry).into()
    }

    fn wipe(&self, registry: &RegistryCapability<Self::Api>) -> Result<(), ProposalError> {
        if self.proposal().is_empty() {
            return Err(ProposalError::WrongProposalStatus);
        }
        let record = self.proposal().get();
        self.authorize(Operation::Delete, record.status)?;

        self.sweep_residual(registry.registry());
        self.proposal().clear();
        self.declared_committee().clear();
        self.registry_params().clear();
        self.registry_amounts().clear();
        self.committee_publisher().clear();
        self.council().clear();

        self.proposal_deleted_event(&record.proposer);
        Ok(())
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn load_record(&self) -> ProposalRecord<Self::Api> {
        require!(!self.proposal().is_empty(), "Proposal has been deleted");
        self.proposal().get()
    }

    fn require_valid_content(&self, title: &ManagedBuffer, cid: &ManagedBuffer) {
        require!(
            !title.is_empty() && title.len() <= TITLE_MAX_BYTES,
            "Invalid title length"
        );
        require!(cid.len() == CID_LENGTH, "Invalid CID length");
    }

    fn require_category(&self, record: &ProposalRecord<Self::Api>) -> FundingCategory {
        match record.category() {
            Some(category) => category,
            None => sc_panic!("Proposal is not classified"),
        }
    }

    fn require_committee(&self, record: &ProposalRecord<Self::Api>) -> CommitteeSnapshot<Self::Api> {
        match &record.committee {
            Some(committee) => committee.clone(),
            None => sc_panic!("Committee snapshot missing"),
        }
    }

    /// Refunds go to the proposer, slashes to the registry treasury.
    /// Must run before the status leaves the lock-holding range.
    fn settle_lock(&self, record: &mut ProposalRecord<Self::Api>, disposition: Disposition) -> BigUint {
        require!(
            record.status.holds_lock(),
            "No commitment is held in this status"
        );
        let receiver = match disposition {
            Disposition::Refund => record.proposer.clone(),
            Disposition::Slash => record.registry.clone(),
        };
        self.release_lock(&mut record.custody, &receiver, disposition)
    }

    /// Absent voters are reported, not fatal.
    fn unassign_batch(
        &self,
        voters: MultiValueEncoded<ManagedAddress>,
    ) -> MultiValueEncoded<VoterReceipt<Self::Api>> {
        let mut receipts = MultiValueEncoded::new();
        for voter in voters.into_iter() {
            match self.remove_voter_record(&voter) {
                Some(power) => {
                    self.voter_unassigned_event(&voter, power);
                    receipts.push(VoterReceipt::Unassigned { voter, power });
                },
                None => receipts.push(VoterReceipt::NotAssigned { voter }),
            }
        }
        receipts
    }

    // ========================================================
    // VIEWS: read-only queries
    // ========================================================

    #[view(getProposal)]
    fn get_proposal(&self) -> ProposalRecord<Self::Api> {
        self.load_record()
    }

    #[view(getStatus)]
    fn get_status(&self) -> ProposalStatus {
        self.load_record().status
    }

    #[view(getLockedAmount)]
    fn get_locked_amount(&self) -> BigUint {
        self.load_record().locked_amount()
    }

    /// Empty until the committee is snapshotted and the category's quorums are configured.
    #[view(getVotingState)]
    fn get_voting_state(&self) -> OptionalValue<VotingState> {
        let record = self.load_record();
        let (category, committee) = match (record.category(), &record.committee) {
            (Some(category), Some(committee)) => (category, committee),
            _ => return OptionalValue::None,
        };
        let rule = match self.quorum_rule(category) {
            Ok(rule) => rule,
            Err(_) => return OptionalValue::None,
        };

        OptionalValue::Some(record.tally.state(
            committee.members,
            committee.votes,
            &rule,
            self.assigned_voters().get(),
        ))
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("proposalOpened")]
    fn proposal_opened_event(&self, #[indexed] proposer: &ManagedAddress, timestamp: u64);

    #[event("proposalSubmitted")]
    fn proposal_submitted_event(
        &self,
        #[indexed] proposer: &ManagedAddress,
        #[indexed] category: FundingCategory,
        requested_amount: &BigUint,
    );

    #[event("proposalUpdated")]
    fn proposal_updated_event(&self, #[indexed] proposer: &ManagedAddress, cid: &ManagedBuffer);

    #[event("proposalDropped")]
    fn proposal_dropped_event(&self, #[indexed] proposer: &ManagedAddress);

    #[event("proposalFinalized")]
    fn proposal_finalized_event(
        &self,
        #[indexed] proposer: &ManagedAddress,
        #[indexed] committee_id: &ManagedBuffer,
        publishing_fee: &BigUint,
    );

    #[event("voterAssigned")]
    fn voter_assigned_event(&self, #[indexed] voter: &ManagedAddress, power: u64);

    #[event("voterUnassigned")]
    fn voter_unassigned_event(&self, #[indexed] voter: &ManagedAddress, power: u64);

    #[event("votingOpened")]
    fn voting_opened_event(&self, #[indexed] committee_id: &ManagedBuffer, timestamp: u64);

    #[event("voteCast")]
    fn vote_cast_event(
        &self,
        #[indexed] voter: &ManagedAddress,
        #[indexed] approvals: u64,
        rejections: u64,
    );

    #[event("proposalScrutinized")]
    fn proposal_scrutinized_event(
        &self,
        #[indexed] status: ProposalStatus,
        #[indexed] approvals: u64,
        rejections: u64,
    );

    #[event("proposalReviewed")]
    fn proposal_reviewed_event(&self, #[indexed] blocked: bool);

    #[event("proposalFunded")]
    fn proposal_funded_event(&self, #[indexed] proposer: &ManagedAddress, requested_amount: &BigUint);

    #[event("proposalDecommissioned")]
    fn proposal_decommissioned_event(&self, #[indexed] proposer: &ManagedAddress);

    #[event("proposalDeleted")]
    fn proposal_deleted_event(&self, #[indexed] proposer: &ManagedAddress);

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("proposal")]
    fn proposal(&self) -> SingleValueMapper<ProposalRecord<Self::Api>>;
}
