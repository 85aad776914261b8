multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::tally::QuorumRule;
use crate::types::{CommitteeSnapshot, FundingCategory, ProposalError};

/// Numeric configuration published by the registry: durations in seconds, rates in bps.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConfigKey {
    DiscussionDuration(FundingCategory),
    VotingDuration(FundingCategory),
    QuorumBps(FundingCategory),
    WeightedQuorumBps(FundingCategory),
    CommitmentBps,
    PublishingBps,
    CooldownDuration,
}

/// Amount configuration published by the registry, in minimal EGLD units.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AmountKey {
    MinRequestedAmount,
    /// Upper bound of the category, inclusive.
    MaxRequestedAmount(FundingCategory),
    ProposalFee,
}

/// Requested-amount thresholds. An amount on a boundary belongs to the lower category.
#[derive(Clone, PartialEq, Debug)]
pub struct CategoryBounds<T> {
    pub min: T,
    pub max_small: T,
    pub max_medium: T,
    pub max_large: T,
}

impl<T: PartialOrd> CategoryBounds<T> {
    /// `None` when the amount is outside `[min, max_large]`.
    pub fn categorize(&self, amount: &T) -> Option<FundingCategory> {
        if *amount < self.min || *amount > self.max_large {
            None
        } else if *amount <= self.max_small {
            Some(FundingCategory::Small)
        } else if *amount <= self.max_medium {
            Some(FundingCategory::Medium)
        } else {
            Some(FundingCategory::Large)
        }
    }
}

// ============================================================
// Registry config snapshot
// ============================================================

#[multiversx_sc::module]
pub trait RegistryConfigModule: crate::auth::AuthorizationModule {
    #[endpoint(setRoles)]
    fn set_roles(&self, committee_publisher: ManagedAddress, council: ManagedAddress) {
        self.registry_capability();
        self.committee_publisher().set(&committee_publisher);
        self.council().set(&council);

        self.roles_updated_event(&committee_publisher, &council);
    }

    #[endpoint(setParams)]
    fn set_params(&self, entries: MultiValueEncoded<MultiValue2<ConfigKey, u64>>) {
        self.registry_capability();
        for entry in entries.into_iter() {
            let (key, value) = entry.into_tuple();
            self.registry_params().insert(key, value);
            self.param_updated_event(key, value);
        }
    }

    #[endpoint(setAmounts)]
    fn set_amounts(&self, entries: MultiValueEncoded<MultiValue2<AmountKey, BigUint>>) {
        self.registry_capability();
        for entry in entries.into_iter() {
            let (key, value) = entry.into_tuple();
            self.registry_amounts().insert(key, value.clone());
            self.amount_updated_event(key, &value);
        }
    }

    /// The registry's current committee. Copied into the proposal at finalize.
    #[endpoint(declareCommittee)]
    fn declare_committee(&self, committee_id: ManagedBuffer, members: u32, votes: u64) {
        self.registry_capability();
        require!(
            crate::COMMITTEE_ID_LENGTHS.contains(&committee_id.len()),
            "Invalid committee id length"
        );

        let committee = CommitteeSnapshot {
            id: committee_id,
            members,
            votes,
        };
        self.declared_committee().set(&committee);

        self.committee_declared_event(&committee.id, members, votes);
    }

    // ========================================================
    // Reads: fail closed on absent keys
    // ========================================================

    fn config_param(&self, key: ConfigKey) -> Result<u64, ProposalError> {
        self.registry_params()
            .get(&key)
            .ok_or(ProposalError::MissingConfig)
    }

    fn config_amount(&self, key: AmountKey) -> Result<BigUint, ProposalError> {
        self.registry_amounts()
            .get(&key)
            .ok_or(ProposalError::MissingConfig)
    }

    fn quorum_rule(&self, category: FundingCategory) -> Result<QuorumRule, ProposalError> {
        Ok(QuorumRule {
            quorum_bps: self.config_param(ConfigKey::QuorumBps(category))?,
            weighted_quorum_bps: self.config_param(ConfigKey::WeightedQuorumBps(category))?,
        })
    }

    fn category_bounds(&self) -> Result<CategoryBounds<BigUint>, ProposalError> {
        Ok(CategoryBounds {
            min: self.config_amount(AmountKey::MinRequestedAmount)?,
            max_small: self.config_amount(AmountKey::MaxRequestedAmount(FundingCategory::Small))?,
            max_medium: self.config_amount(AmountKey::MaxRequestedAmount(FundingCategory::Medium))?,
            max_large: self.config_amount(AmountKey::MaxRequestedAmount(FundingCategory::Large))?,
        })
    }

    #[view(getConfigParam)]
    fn get_config_param(&self, key: ConfigKey) -> OptionalValue<u64> {
        self.registry_params().get(&key).into()
    }

    #[view(getConfigAmount)]
    fn get_config_amount(&self, key: AmountKey) -> OptionalValue<BigUint> {
        self.registry_amounts().get(&key).into()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("rolesUpdated")]
    fn roles_updated_event(
        &self,
        #[indexed] committee_publisher: &ManagedAddress,
        #[indexed] council: &ManagedAddress,
    );

    #[event("paramUpdated")]
    fn param_updated_event(&self, #[indexed] key: ConfigKey, value: u64);

    #[event("amountUpdated")]
    fn amount_updated_event(&self, #[indexed] key: AmountKey, value: &BigUint);

    #[event("committeeDeclared")]
    fn committee_declared_event(
        &self,
        #[indexed] committee_id: &ManagedBuffer,
        #[indexed] members: u32,
        votes: u64,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("registryParams")]
    fn registry_params(&self) -> MapMapper<ConfigKey, u64>;

    #[storage_mapper("registryAmounts")]
    fn registry_amounts(&self) -> MapMapper<AmountKey, BigUint>;

    #[view(getDeclaredCommittee)]
    #[storage_mapper("declaredCommittee")]
    fn declared_committee(&self) -> SingleValueMapper<CommitteeSnapshot<Self::Api>>;
}
