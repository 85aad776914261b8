multiversx_sc::imports!();

use crate::tally::VotingTally;
use crate::types::{ProposalError, VoterRecord};

// ============================================================
// Voter records and assigned-power accounting
// ============================================================

#[multiversx_sc::module]
pub trait VotingModule {
    /// Fatal on duplicates, on zero power and once the assigned total would pass `committee_votes`.
    fn assign_voter_record(&self, voter: &ManagedAddress, power: u64, committee_votes: u64) {
        require!(power > 0, "Voting power must be positive");
        let record = self.voter(voter);
        require!(record.is_empty(), "Voter already assigned");

        let assigned_votes = match self.assigned_votes().get().checked_add(power) {
            Some(total) if total <= committee_votes => total,
            _ => sc_panic!("Assigned voting power exceeds the committee"),
        };

        record.set(VoterRecord { power, voted: false });
        self.assigned_voters().update(|count| *count += 1);
        self.assigned_votes().set(assigned_votes);
    }

    /// Returns the released power, `None` if the voter was not assigned.
    fn remove_voter_record(&self, voter: &ManagedAddress) -> Option<u64> {
        let record = self.voter(voter);
        if record.is_empty() {
            return None;
        }

        let power = record.take().power;
        self.assigned_voters().update(|count| *count -= 1);
        self.assigned_votes().update(|votes| *votes -= power);
        Some(power)
    }

    /// Checks every ballot guard before marking the voter, so a failed ballot writes nothing.
    fn cast_ballot(
        &self,
        tally: &mut VotingTally,
        voter: &ManagedAddress,
        approvals: u64,
        rejections: u64,
    ) -> Result<(), ProposalError> {
        let mapper = self.voter(voter);
        if mapper.is_empty() {
            return Err(ProposalError::VoterNotFound);
        }

        let mut record = mapper.get();
        if record.voted {
            return Err(ProposalError::AlreadyVoted);
        }

        tally.record(record.power, approvals, rejections)?;
        record.voted = true;
        mapper.set(record);
        Ok(())
    }

    #[view(getVoter)]
    fn get_voter(&self, voter: ManagedAddress) -> OptionalValue<VoterRecord> {
        let mapper = self.voter(&voter);
        if mapper.is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(mapper.get())
        }
    }

    #[storage_mapper("voter")]
    fn voter(&self, voter: &ManagedAddress) -> SingleValueMapper<VoterRecord>;

    #[view(getAssignedVoters)]
    #[storage_mapper("assignedVoters")]
    fn assigned_voters(&self) -> SingleValueMapper<u32>;

    #[view(getAssignedVotes)]
    #[storage_mapper("assignedVotes")]
    fn assigned_votes(&self) -> SingleValueMapper<u64>;
}
