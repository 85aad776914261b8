multiversx_sc::imports!();

use crate::types::{ProposalError, ProposalStatus};

// ============================================================
// Roles and operations
// ============================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Proposer,
    CommitteePublisher,
    Council,
    /// The registry contract that deployed this proposal.
    Registry,
    Anyone,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Submit,
    Update,
    Drop,
    Finalize,
    AssignVoter,
    UnassignVoter,
    UnassignAbsentee,
    Vote,
    Scrutiny,
    Review,
    Fund,
    Decommission,
    Delete,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Access {
    Granted,
    WrongRole,
    WrongStatus,
}

impl Operation {
    /// The single role allowed to invoke the operation.
    pub fn authorized_role(self) -> Role {
        match self {
            Operation::Submit | Operation::Update | Operation::Drop | Operation::Finalize => Role::Proposer,
            Operation::AssignVoter | Operation::UnassignVoter | Operation::Decommission => {
                Role::CommitteePublisher
            },
            Operation::Review => Role::Council,
            Operation::UnassignAbsentee
            | Operation::Vote
            | Operation::Fund
            | Operation::Delete => Role::Registry,
            Operation::Scrutiny => Role::Anyone,
        }
    }

    pub fn permits(self, status: ProposalStatus) -> bool {
        use ProposalStatus::*;

        match self {
            Operation::UnassignVoter => true,
            Operation::Submit => status == Empty,
            Operation::Update | Operation::Drop | Operation::Finalize => status == Draft,
            Operation::AssignVoter => status == Final,
            Operation::UnassignAbsentee => {
                matches!(status, Approved | Rejected | Reviewed | Blocked | Funded)
            },
            Operation::Vote | Operation::Scrutiny => status == Voting,
            Operation::Review => status == Approved,
            Operation::Fund => status == Reviewed,
            Operation::Decommission => status.is_settled(),
            Operation::Delete => status == Decommissioned,
        }
    }
}

/// `role` is the role the caller proved for this call, `Anyone` if none.
pub fn authorize(op: Operation, role: Role, status: ProposalStatus) -> Access {
    let required = op.authorized_role();
    if required != Role::Anyone && role != required {
        return Access::WrongRole;
    }
    if !op.permits(status) {
        return Access::WrongStatus;
    }
    Access::Granted
}

// ============================================================
// Registry capability
// ============================================================

/// Proof that the current call comes from the deploying registry.
/// Only `AuthorizationModule::registry_capability` mints one.
pub struct RegistryCapability<M: ManagedTypeApi> {
    registry: ManagedAddress<M>,
}

impl<M: ManagedTypeApi> RegistryCapability<M> {
    pub fn registry(&self) -> &ManagedAddress<M> {
        &self.registry
    }
}

#[multiversx_sc::module]
pub trait AuthorizationModule {
    fn holds_role(&self, caller: &ManagedAddress, role: Role) -> bool {
        let holder = match role {
            Role::Anyone => return true,
            Role::Proposer => self.proposer_address(),
            Role::CommitteePublisher => self.committee_publisher(),
            Role::Council => self.council(),
            Role::Registry => self.registry_address(),
        };
        !holder.is_empty() && holder.get() == *caller
    }

    /// Role violations abort; a status mismatch is handed back to the caller.
    fn authorize(&self, op: Operation, status: ProposalStatus) -> Result<(), ProposalError> {
        let caller = self.blockchain().get_caller();
        let required = op.authorized_role();
        let role = if self.holds_role(&caller, required) {
            required
        } else {
            Role::Anyone
        };

        match authorize(op, role, status) {
            Access::Granted => Ok(()),
            Access::WrongRole => sc_panic!("Unauthorized caller"),
            Access::WrongStatus => Err(ProposalError::WrongProposalStatus),
        }
    }

    fn registry_capability(&self) -> RegistryCapability<Self::Api> {
        let caller = self.blockchain().get_caller();
        require!(
            self.holds_role(&caller, Role::Registry),
            "Only the registry may call this endpoint"
        );
        RegistryCapability { registry: caller }
    }

    #[view(getRegistry)]
    #[storage_mapper("registryAddress")]
    fn registry_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getProposer)]
    #[storage_mapper("proposerAddress")]
    fn proposer_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getCommitteePublisher)]
    #[storage_mapper("committeePublisher")]
    fn committee_publisher(&self) -> SingleValueMapper<ManagedAddress>;

    #[view(getCouncil)]
    #[storage_mapper("council")]
    fn council(&self) -> SingleValueMapper<ManagedAddress>;
}
