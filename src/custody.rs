multiversx_sc::imports!();
multiversx_sc::derive_imports!();

use crate::registry_config::{AmountKey, ConfigKey};
use crate::tally::BPS;
use crate::types::{Custody, ProposalError};

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Disposition {
    /// Commitment returned to the proposer.
    Refund,
    /// Commitment forfeited to the registry treasury.
    Slash,
}

/// `floor(requested * commitment_bps / BPS)`
pub fn commitment_lock<M: ManagedTypeApi>(requested: &BigUint<M>, commitment_bps: u64) -> BigUint<M> {
    (requested * commitment_bps) / BPS
}

// ============================================================
// Fund custody: the proposal account's own balance
// ============================================================

#[multiversx_sc::module]
pub trait FundCustodyModule: crate::registry_config::RegistryConfigModule + crate::auth::AuthorizationModule {
    fn required_lock(&self, requested: &BigUint) -> Result<BigUint, ProposalError> {
        let commitment_bps = self.config_param(ConfigKey::CommitmentBps)?;
        Ok(commitment_lock(requested, commitment_bps))
    }

    /// `proposal_fee * publishing_bps / BPS`, owed to the committee publisher at finalize.
    fn publishing_fee(&self) -> Result<BigUint, ProposalError> {
        let proposal_fee = self.config_amount(AmountKey::ProposalFee)?;
        let publishing_bps = self.config_param(ConfigKey::PublishingBps)?;
        Ok((proposal_fee * publishing_bps) / BPS)
    }

    /// Moves the whole lock to `to` and starts the cooldown, in one step.
    /// A released lock can never be released again.
    fn release_lock(
        &self,
        custody: &mut Custody<Self::Api>,
        to: &ManagedAddress,
        disposition: Disposition,
    ) -> BigUint {
        let amount = match custody {
            Custody::Locked { amount } => amount.clone(),
            _ => sc_panic!("No commitment is locked"),
        };

        let now = self.blockchain().get_block_timestamp();
        *custody = Custody::Released { cooldown_start: now };

        if amount > 0u64 {
            self.send().direct_egld(to, &amount);
        }
        self.lock_released_event(to, disposition, &amount);

        amount
    }

    /// False while no cooldown has started.
    fn cooldown_elapsed(&self, custody: &Custody<Self::Api>) -> Result<bool, ProposalError> {
        let cooldown_start = custody.cooldown_start();
        if cooldown_start == 0 {
            return Ok(false);
        }

        let cooldown = self.config_param(ConfigKey::CooldownDuration)?;
        let now = self.blockchain().get_block_timestamp();
        Ok(now >= cooldown_start.saturating_add(cooldown))
    }

    fn custody_balance(&self) -> BigUint {
        self.blockchain()
            .get_sc_balance(&EgldOrEsdtTokenIdentifier::egld(), 0)
    }

    /// Sends whatever is left on the proposal account to `to`.
    fn sweep_residual(&self, to: &ManagedAddress) -> BigUint {
        let residual = self.custody_balance();
        if residual > 0u64 {
            self.send().direct_egld(to, &residual);
            self.residual_swept_event(to, &residual);
        }
        residual
    }

    #[view(getCustodyBalance)]
    fn get_custody_balance(&self) -> BigUint {
        self.custody_balance()
    }

    #[event("lockReleased")]
    fn lock_released_event(
        &self,
        #[indexed] receiver: &ManagedAddress,
        #[indexed] disposition: Disposition,
        amount: &BigUint,
    );

    #[event("residualSwept")]
    fn residual_swept_event(&self, #[indexed] receiver: &ManagedAddress, amount: &BigUint);
}
