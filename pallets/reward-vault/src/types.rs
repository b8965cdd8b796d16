use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame::deps::sp_runtime::{
  DispatchError, DispatchResult, PerThing, Permill, RuntimeDebug,
  traits::{AtLeast32BitUnsigned, CheckedAdd, Saturating, UniqueSaturatedInto, Zero},
};
use primitives::params::PER_MILLE;
use scale_info::TypeInfo;
use scale_info::prelude::{vec, vec::Vec};

// Re-export AssetKind from primitives as the single source of truth
pub use primitives::{AssetKind, TokenClass};

/// Balance type used by the vault and every collaborator it talks to
pub type Balance = u128;

/// Exchange interface consumed by the buyback executor and the price oracle
pub trait ExchangeRouter<AccountId, Balance, BlockNumber> {
  /// Asset pair of the pool whose shares are `share_token`
  fn pool_pair_for_share(share_token: AssetKind) -> Option<(AssetKind, AssetKind)>;

  /// Pool reserves ordered like `pair`
  fn get_reserves(pair: (AssetKind, AssetKind)) -> Option<(Balance, Balance)>;

  /// Amount of `asset` the router may pull from `owner`
  fn allowance(owner: &AccountId, asset: AssetKind) -> Balance;

  /// Let the router pull up to `amount` of `asset` from `owner`
  fn approve(owner: &AccountId, asset: AssetKind, amount: Balance) -> DispatchResult;

  /// Swap along `path`, tolerating tokens that deliver less than the nominal amount.
  ///
  /// The returned value is the router's own accounting and may exceed what
  /// `recipient` actually received.
  fn swap_exact_tokens_supporting_fee(
    who: &AccountId,
    path: Vec<AssetKind>,
    amount_in: Balance,
    min_amount_out: Balance,
    recipient: &AccountId,
    deadline: BlockNumber,
  ) -> Result<Balance, DispatchError>;
}

/// Payout target of a distribution
#[derive(
  Clone,
  Copy,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  RuntimeDebug,
  TypeInfo,
)]
pub enum Beneficiary {
  /// Receives the ratio share
  StakingPool,
  /// Receives the remainder
  Regulator,
}

/// Failures of the pure schedule arithmetic
#[derive(Clone, Copy, Eq, PartialEq, RuntimeDebug)]
pub enum ScheduleError {
  InvalidAmount,
  InvalidDuration,
  Overflow,
}

/// Linear amortisation of bonded rewards.
///
/// `rate_per_block` is derived on every top-up and never set directly. Integer
/// division leaves a residual in `principal`, released by the vest that reaches
/// the end of the schedule.
#[derive(
  Clone, Copy, Decode, Default, Encode, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo,
)]
pub struct BondedSchedule<BlockNumber> {
  /// Bonded rewards not yet vested
  pub principal: Balance,
  /// Amount released per elapsed block
  pub rate_per_block: Balance,
  /// Remaining amortisation window
  pub blocks_remaining: BlockNumber,
}

impl<BlockNumber: AtLeast32BitUnsigned + Copy> BondedSchedule<BlockNumber> {
  /// Add `amount` over `additional_blocks` and re-average the rate.
  pub fn top_up(
    &mut self,
    amount: Balance,
    additional_blocks: BlockNumber,
  ) -> Result<(), ScheduleError> {
    if amount.is_zero() {
      return Err(ScheduleError::InvalidAmount);
    }
    if additional_blocks.is_zero() {
      return Err(ScheduleError::InvalidDuration);
    }
    let principal = self
      .principal
      .checked_add(amount)
      .ok_or(ScheduleError::Overflow)?;
    let blocks_remaining = self
      .blocks_remaining
      .checked_add(&additional_blocks)
      .ok_or(ScheduleError::Overflow)?;
    let blocks: u128 = blocks_remaining.unique_saturated_into();
    self.rate_per_block = principal / blocks;
    self.principal = principal;
    self.blocks_remaining = blocks_remaining;
    Ok(())
  }

  /// Release what vested between `checkpoint` and `now`.
  ///
  /// The checkpoint itself is owned by the caller and is not advanced here.
  pub fn vest(&mut self, now: BlockNumber, checkpoint: BlockNumber) -> Balance {
    if self.principal.is_zero() {
      return 0;
    }
    let elapsed = now.saturating_sub(checkpoint);
    if elapsed.is_zero() {
      return 0;
    }
    let vested = if elapsed >= self.blocks_remaining {
      // Final vest: the window is exhausted, release the residual too
      self.blocks_remaining = Zero::zero();
      self.principal
    } else {
      let delta: u128 = elapsed.unique_saturated_into();
      self.blocks_remaining = self.blocks_remaining.saturating_sub(elapsed);
      self.rate_per_block.saturating_mul(delta).min(self.principal)
    };
    self.principal = self.principal.saturating_sub(vested);
    vested
  }

  pub fn is_drained(&self) -> bool {
    self.principal.is_zero()
  }
}

/// Split `amount` by a per-mille ratio; the second share takes the rounding remainder.
pub fn split_per_mille(amount: Balance, ratio_per_mille: u32) -> (Balance, Balance) {
  if amount.is_zero() {
    return (0, 0);
  }
  let parts = ratio_per_mille.min(PER_MILLE).saturating_mul(1_000);
  let first = Permill::from_parts(parts).mul_floor(amount);
  (first, amount.saturating_sub(first))
}

/// Balance held above the unvested principal, treated as accrued fee revenue.
pub fn fee_skim(balance: Balance, bonded_principal: Balance) -> Balance {
  balance.saturating_sub(bonded_principal)
}

/// Swap path into `asset_out`, routed through the numeraire unless a leg already is it.
pub fn buyback_path(
  asset_in: AssetKind,
  asset_out: AssetKind,
  numeraire: AssetKind,
) -> Vec<AssetKind> {
  if asset_in == numeraire || asset_out == numeraire {
    vec![asset_in, asset_out]
  } else {
    vec![asset_in, numeraire, asset_out]
  }
}

/// Amounts a distribution would move, computed before anything is committed
#[derive(Clone, Copy, Default, Eq, PartialEq, RuntimeDebug)]
pub struct DistributionPlan<BlockNumber> {
  /// Schedule after vesting, written back only if the plan executes
  pub schedule: BondedSchedule<BlockNumber>,
  pub vested: Balance,
  pub fee: Balance,
  pub staking_pool_amount: Balance,
  pub regulator_amount: Balance,
}

impl<BlockNumber> DistributionPlan<BlockNumber> {
  pub fn is_empty(&self) -> bool {
    self.staking_pool_amount.is_zero() && self.regulator_amount.is_zero()
  }

  pub fn total(&self) -> Option<Balance> {
    self.staking_pool_amount.checked_add(self.regulator_amount)
  }
}
