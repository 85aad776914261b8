multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::types::{ProposalError, ProposalStatus};

/// Basis points denominator
pub const BPS: u64 = 10_000;

/// `floor(value * bps / BPS)`, computed without intermediate overflow.
pub fn bps_of(value: u64, bps: u64) -> u64 {
    ((value as u128 * bps as u128) / BPS as u128) as u64
}

/// Quorum thresholds of one funding category, in basis points.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct QuorumRule {
    pub quorum_bps: u64,
    pub weighted_quorum_bps: u64,
}

impl QuorumRule {
    /// Minimum number of members that must vote.
    pub fn quorum_voters(&self, committee_members: u32) -> u64 {
        bps_of(committee_members as u64, self.quorum_bps)
    }

    /// Minimum voting power that must be cast.
    pub fn weighted_quorum_votes(&self, committee_votes: u64) -> u64 {
        bps_of(committee_votes, self.weighted_quorum_bps)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn status(self) -> ProposalStatus {
        match self {
            Verdict::Approved => ProposalStatus::Approved,
            Verdict::Rejected => ProposalStatus::Rejected,
        }
    }
}

// ============================================================
// Voting Tally: running totals of one round
// ============================================================

/// Counters only ever grow while a round is open.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct VotingTally {
    pub voted_members: u32,
    pub approvals: u64,
    pub rejections: u64,
    pub nulls: u64,
}

impl VotingTally {
    pub fn total_votes(&self) -> u64 {
        self.approvals + self.rejections + self.nulls
    }

    /// Adds one member's ballot. Whatever part of `power` is not cast as
    /// approval or rejection is counted as null.
    ///
    /// Leaves the tally untouched on error.
    pub fn record(&mut self, power: u64, approvals: u64, rejections: u64) -> Result<(), ProposalError> {
        let cast = approvals
            .checked_add(rejections)
            .ok_or(ProposalError::VotesExceeded)?;
        if cast > power {
            return Err(ProposalError::VotesExceeded);
        }

        self.voted_members += 1;
        self.approvals += approvals;
        self.rejections += rejections;
        self.nulls += power - cast;
        Ok(())
    }

    /// Approved iff both quorums are met and approvals strictly exceed rejections.
    /// Nulls count toward the quorums only.
    pub fn verdict(&self, committee_members: u32, committee_votes: u64, rule: &QuorumRule) -> Verdict {
        let state = self.state(committee_members, committee_votes, rule, committee_members);
        if state.quorum_reached && state.weighted_quorum_reached && state.majority_approved {
            Verdict::Approved
        } else {
            Verdict::Rejected
        }
    }

    pub fn state(
        &self,
        committee_members: u32,
        committee_votes: u64,
        rule: &QuorumRule,
        assigned_voters: u32,
    ) -> VotingState {
        let quorum_voters = rule.quorum_voters(committee_members);
        let weighted_quorum_votes = rule.weighted_quorum_votes(committee_votes);
        let total_votes = self.total_votes();

        VotingState {
            quorum_voters,
            weighted_quorum_votes,
            voted_members: self.voted_members,
            total_votes,
            approvals: self.approvals,
            rejections: self.rejections,
            nulls: self.nulls,
            quorum_reached: self.voted_members as u64 >= quorum_voters,
            weighted_quorum_reached: total_votes >= weighted_quorum_votes,
            majority_approved: self.approvals > self.rejections,
            plebiscite: assigned_voters as u64 == quorum_voters,
        }
    }
}

/// Read-only summary of a round against its thresholds.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub struct VotingState {
    pub quorum_voters: u64,
    pub weighted_quorum_votes: u64,
    pub voted_members: u32,
    pub total_votes: u64,
    pub approvals: u64,
    pub rejections: u64,
    pub nulls: u64,
    pub quorum_reached: bool,
    pub weighted_quorum_reached: bool,
    pub majority_approved: bool,
    /// Diagnostic only: assigned voters exactly at the quorum threshold.
    pub plebiscite: bool,
}
