//! Reward Vault Pallet
//!
//! Custodies a fee-bearing reward token, amortises bonded rewards over blocks and
//! splits vested rewards plus skimmed fee revenue between the staking pool and the
//! regulator. Buybacks convert arbitrary collateral into the reward token through
//! an external exchange; the proceeds stay in the vault and are distributed as fee
//! revenue.
//!
//! ## Distribution
//!
//! `distribute` settles at most once per block. It vests the bonded schedule since the
//! last settled block, skims the balance held above the pre-vest principal, splits both
//! by the per-mille ratio and pushes the shares out. All amounts are computed before the
//! first transfer and committed after the last one.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod oracle;
pub mod types;
pub use types::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

/// Log target of this pallet
pub const LOG_TARGET: &str = "runtime::reward-vault";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn ensure_funded(
    who: &AccountId,
    asset: primitives::AssetKind,
    amount: u128,
  ) -> frame::deps::sp_runtime::DispatchResult;
  fn create_asset(asset: primitives::AssetKind) -> frame::deps::sp_runtime::DispatchResult;
  fn create_pool(
    asset1: primitives::AssetKind,
    asset2: primitives::AssetKind,
    reserve1: u128,
    reserve2: u128,
  ) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, WeightInfo};
  use crate::types::{
    AssetKind, Balance, Beneficiary, BondedSchedule, DistributionPlan, ExchangeRouter,
    ScheduleError, buyback_path, fee_skim, split_per_mille,
  };
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{
        Inspect as FungiblesInspect, Mutate as FungiblesMutate, metadata::Inspect as MetadataInspect,
      },
      tokens::Preservation,
    },
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, Saturating, Zero},
    },
  };
  use frame::prelude::*;
  use primitives::params::PER_MILLE;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Fungible assets (AssetKind::Local / AssetKind::Foreign), with metadata for pricing
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>
      + MetadataInspect<Self::AccountId>;

    /// Native currency (AssetKind::Native)
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Exchange used for buybacks and reserve reads
    type Exchange: ExchangeRouter<Self::AccountId, Balance, BlockNumberFor<Self>>;

    /// Pallet ID for the vault account
    #[pallet::constant]
    type PalletId: Get<frame::deps::frame_support::PalletId>;

    /// Token held, bonded and distributed by the vault
    #[pallet::constant]
    type RewardAsset: Get<AssetKind>;

    /// Reference asset for pricing and multi-hop buybacks
    #[pallet::constant]
    type Numeraire: Get<AssetKind>;

    /// Decimals of the native currency
    #[pallet::constant]
    type NativeDecimals: Get<u8>;

    /// Staking pool share in per-mille until governance changes it
    #[pallet::constant]
    type DefaultDistributionRatio: Get<u32>;

    /// Blocks a buyback swap stays valid
    #[pallet::constant]
    type SwapDeadline: Get<BlockNumberFor<Self>>;

    /// Origin that can update the ratio and the beneficiaries
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin that bonds rewards, resolving to the account that funds them
    type BondOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Bonded reward schedule
  #[pallet::storage]
  #[pallet::getter(fn bonded_rewards)]
  pub type BondedRewards<T: Config> =
    StorageValue<_, BondedSchedule<BlockNumberFor<T>>, ValueQuery>;

  /// Staking pool share of each distribution, in per-mille
  #[pallet::storage]
  #[pallet::getter(fn distribution_ratio)]
  pub type DistributionRatio<T: Config> =
    StorageValue<_, u32, ValueQuery, T::DefaultDistributionRatio>;

  /// Last block that settled a distribution
  #[pallet::storage]
  #[pallet::getter(fn last_distribution_block)]
  pub type LastDistributionBlock<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

  /// Reward tokens received from buybacks
  #[pallet::storage]
  #[pallet::getter(fn total_buyback)]
  pub type TotalBuyback<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Reward tokens paid out to both beneficiaries
  #[pallet::storage]
  #[pallet::getter(fn total_distributed)]
  pub type TotalDistributed<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Beneficiary receiving the ratio share
  #[pallet::storage]
  #[pallet::getter(fn staking_pool)]
  pub type StakingPool<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Beneficiary receiving the remainder
  #[pallet::storage]
  #[pallet::getter(fn regulator)]
  pub type Regulator<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A beneficiary account was replaced
    BeneficiaryUpdated {
      beneficiary: Beneficiary,
      old: Option<T::AccountId>,
      new: T::AccountId,
    },
    /// Distribution ratio changed
    DistributionRatioUpdated { old_ratio: u32, new_ratio: u32 },
    /// Collateral converted into the reward token
    BuybackExecuted {
      who: T::AccountId,
      asset_in: AssetKind,
      amount_in: Balance,
      amount_out: Balance,
    },
    /// Vested rewards and fee revenue paid out
    RewardsDistributed {
      caller: T::AccountId,
      staking_pool_amount: Balance,
      regulator_amount: Balance,
    },
    /// Rewards added to the bonded schedule
    RewardsBonded {
      who: T::AccountId,
      amount: Balance,
      duration: BlockNumberFor<T>,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is neither the staking pool nor the regulator
    NotBeneficiary,
    /// A beneficiary has not been configured
    BeneficiaryNotSet,
    /// Beneficiary cannot be the vault itself
    InvalidBeneficiary,
    /// Bonded amount is zero
    InvalidAmount,
    /// Bonding duration is zero
    InvalidDuration,
    /// Ratio above 1000 per-mille
    InvalidRatio,
    /// New value equals the current one
    ValueUnchanged,
    /// Buyback input is already the reward token
    IdenticalAssets,
    /// Pair is unknown or not denominated in the numeraire
    InvalidPair,
    /// Token has more decimals than the oracle can normalise
    UnsupportedDecimals,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
  }

  impl<T> From<ScheduleError> for Error<T> {
    fn from(err: ScheduleError) -> Self {
      match err {
        ScheduleError::InvalidAmount => Error::<T>::InvalidAmount,
        ScheduleError::InvalidDuration => Error::<T>::InvalidDuration,
        ScheduleError::Overflow => Error::<T>::ArithmeticOverflow,
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::DefaultDistributionRatio::get() <= PER_MILLE,
        "DefaultDistributionRatio must not exceed 1000 per-mille"
      );
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Settle vested rewards and fee revenue (beneficiaries only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::distribute())]
    pub fn distribute(origin: OriginFor<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(Self::is_beneficiary(&who), Error::<T>::NotBeneficiary);
      Self::do_distribute(&who, frame_system::Pallet::<T>::block_number())
    }

    /// Convert `amount_in` of `asset_in` from the caller into the reward token
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::buyback())]
    pub fn buyback(origin: OriginFor<T>, asset_in: AssetKind, amount_in: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      if amount_in.is_zero() {
        log::debug!(target: LOG_TARGET, "buyback of zero {:?} ignored", asset_in);
        return Ok(());
      }
      let reward_asset = T::RewardAsset::get();
      ensure!(asset_in != reward_asset, Error::<T>::IdenticalAssets);
      let vault = Self::account_id();
      // Native input is value attached by the caller, who must stay alive
      let preservation = match asset_in {
        AssetKind::Native => Preservation::Preserve,
        _ => Preservation::Expendable,
      };
      let before = Self::asset_balance(asset_in, &vault);
      Self::transfer_asset(asset_in, &who, &vault, amount_in, preservation)?;
      let received_in = Self::asset_balance(asset_in, &vault).saturating_sub(before);
      let amount_out = Self::swap_into(asset_in, reward_asset, received_in)?;
      Self::deposit_event(Event::BuybackExecuted {
        who,
        asset_in,
        amount_in: received_in,
        amount_out,
      });
      Ok(())
    }

    /// Pull `amount` of the reward token from the funder and amortise it over `duration` blocks
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::bond_rewards())]
    pub fn bond_rewards(
      origin: OriginFor<T>,
      amount: Balance,
      duration: BlockNumberFor<T>,
    ) -> DispatchResult {
      let who = T::BondOrigin::ensure_origin(origin)?;
      let now = frame_system::Pallet::<T>::block_number();
      let mut schedule = BondedRewards::<T>::get();
      let restart = schedule.is_drained();
      schedule.top_up(amount, duration).map_err(Error::<T>::from)?;
      Self::transfer_asset(
        T::RewardAsset::get(),
        &who,
        &Self::account_id(),
        amount,
        Preservation::Expendable,
      )?;
      BondedRewards::<T>::put(schedule);
      // A fresh schedule vests from now, not from an old checkpoint
      if restart && LastDistributionBlock::<T>::get() < now {
        LastDistributionBlock::<T>::put(now);
      }
      log::info!(
        target: LOG_TARGET,
        "bonded {} over {:?} blocks, rate {} per block",
        amount,
        duration,
        schedule.rate_per_block,
      );
      Self::deposit_event(Event::RewardsBonded {
        who,
        amount,
        duration,
      });
      Ok(())
    }

    /// Update the staking pool share (governance only)
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_distribution_ratio())]
    pub fn set_distribution_ratio(origin: OriginFor<T>, new_ratio: u32) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(new_ratio <= PER_MILLE, Error::<T>::InvalidRatio);
      let old_ratio = DistributionRatio::<T>::get();
      ensure!(old_ratio != new_ratio, Error::<T>::ValueUnchanged);
      DistributionRatio::<T>::put(new_ratio);
      Self::deposit_event(Event::DistributionRatioUpdated {
        old_ratio,
        new_ratio,
      });
      Ok(())
    }

    /// Replace a beneficiary account (governance only)
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_beneficiary())]
    pub fn set_beneficiary(
      origin: OriginFor<T>,
      beneficiary: Beneficiary,
      account: T::AccountId,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(account != Self::account_id(), Error::<T>::InvalidBeneficiary);
      let old = match beneficiary {
        Beneficiary::StakingPool => StakingPool::<T>::get(),
        Beneficiary::Regulator => Regulator::<T>::get(),
      };
      ensure!(old.as_ref() != Some(&account), Error::<T>::ValueUnchanged);
      match beneficiary {
        Beneficiary::StakingPool => StakingPool::<T>::put(&account),
        Beneficiary::Regulator => Regulator::<T>::put(&account),
      }
      Self::deposit_event(Event::BeneficiaryUpdated {
        beneficiary,
        old,
        new: account,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn is_beneficiary(who: &T::AccountId) -> bool {
      StakingPool::<T>::get().as_ref() == Some(who) || Regulator::<T>::get().as_ref() == Some(who)
    }

    /// Settle the vault at block `now` on behalf of `caller`.
    pub fn do_distribute(caller: &T::AccountId, now: BlockNumberFor<T>) -> DispatchResult {
      if now <= LastDistributionBlock::<T>::get() {
        log::debug!(target: LOG_TARGET, "already settled at {:?}", now);
        return Ok(());
      }
      let principal = BondedRewards::<T>::get().principal;
      let balance = Self::asset_balance(T::RewardAsset::get(), &Self::account_id());
      if balance < principal {
        log::warn!(
          target: LOG_TARGET,
          "vault balance {} below bonded principal {}",
          balance,
          principal,
        );
      }
      let plan = Self::plan_distribution(now)?;
      if plan.is_empty() {
        log::debug!(target: LOG_TARGET, "nothing to distribute at {:?}", now);
        return Ok(());
      }
      let staking_pool = StakingPool::<T>::get().ok_or(Error::<T>::BeneficiaryNotSet)?;
      let regulator = Regulator::<T>::get().ok_or(Error::<T>::BeneficiaryNotSet)?;
      let total = plan.total().ok_or(Error::<T>::ArithmeticOverflow)?;
      let new_total = TotalDistributed::<T>::get()
        .checked_add(total)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      let vault = Self::account_id();
      let reward_asset = T::RewardAsset::get();
      if !plan.staking_pool_amount.is_zero() {
        Self::transfer_asset(
          reward_asset,
          &vault,
          &staking_pool,
          plan.staking_pool_amount,
          Preservation::Expendable,
        )?;
      }
      if !plan.regulator_amount.is_zero() {
        Self::transfer_asset(
          reward_asset,
          &vault,
          &regulator,
          plan.regulator_amount,
          Preservation::Expendable,
        )?;
      }

      BondedRewards::<T>::put(plan.schedule);
      LastDistributionBlock::<T>::put(now);
      TotalDistributed::<T>::put(new_total);
      log::info!(
        target: LOG_TARGET,
        "distributed vested {} and fees {} at {:?}",
        plan.vested,
        plan.fee,
        now,
      );
      Self::deposit_event(Event::RewardsDistributed {
        caller: caller.clone(),
        staking_pool_amount: plan.staking_pool_amount,
        regulator_amount: plan.regulator_amount,
      });
      Ok(())
    }

    /// Amounts a distribution at `now` would move, without side effects.
    ///
    /// Fees are skimmed against the pre-vest principal and the balance before any
    /// payout, since the vested part leaves the vault in the same settlement.
    pub fn plan_distribution(
      now: BlockNumberFor<T>,
    ) -> Result<DistributionPlan<BlockNumberFor<T>>, DispatchError> {
      let last = LastDistributionBlock::<T>::get();
      let mut schedule = BondedRewards::<T>::get();
      if now <= last {
        return Ok(DistributionPlan {
          schedule,
          ..Default::default()
        });
      }
      let ratio = DistributionRatio::<T>::get();
      let principal_before = schedule.principal;

      let vested = schedule.vest(now, last);
      let (vested_staking, vested_regulator) = split_per_mille(vested, ratio);

      let balance = Self::asset_balance(T::RewardAsset::get(), &Self::account_id());
      let fee = fee_skim(balance, principal_before);
      let (fee_staking, fee_regulator) = split_per_mille(fee, ratio);

      Ok(DistributionPlan {
        schedule,
        vested,
        fee,
        staking_pool_amount: vested_staking
          .checked_add(fee_staking)
          .ok_or(Error::<T>::ArithmeticOverflow)?,
        regulator_amount: vested_regulator
          .checked_add(fee_regulator)
          .ok_or(Error::<T>::ArithmeticOverflow)?,
      })
    }

    /// Swap vault-held `asset_in` into `asset_out`, returning what actually arrived.
    ///
    /// The router's reported output is ignored: fee-on-transfer tokens deliver less.
    pub fn swap_into(
      asset_in: AssetKind,
      asset_out: AssetKind,
      amount_in: Balance,
    ) -> Result<Balance, DispatchError> {
      if amount_in.is_zero() {
        return Ok(0);
      }
      let vault = Self::account_id();
      let path = buyback_path(asset_in, asset_out, T::Numeraire::get());
      let before = Self::asset_balance(asset_out, &vault);
      Self::ensure_router_approval(&vault, asset_in)?;
      let deadline = frame_system::Pallet::<T>::block_number().saturating_add(T::SwapDeadline::get());
      let reported = T::Exchange::swap_exact_tokens_supporting_fee(
        &vault, path, amount_in, 0, &vault, deadline,
      )?;
      let received = Self::asset_balance(asset_out, &vault).saturating_sub(before);
      let new_total = TotalBuyback::<T>::get()
        .checked_add(received)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      TotalBuyback::<T>::put(new_total);
      log::info!(
        target: LOG_TARGET,
        "buyback {} {:?} -> {} {:?} (router reported {})",
        amount_in,
        asset_in,
        received,
        asset_out,
        reported,
      );
      Ok(received)
    }

    /// Grant the router unlimited spending of `asset` once
    fn ensure_router_approval(owner: &T::AccountId, asset: AssetKind) -> DispatchResult {
      if asset == AssetKind::Native {
        return Ok(());
      }
      if T::Exchange::allowance(owner, asset).is_zero() {
        T::Exchange::approve(owner, asset, Balance::MAX)?;
      }
      Ok(())
    }

    pub fn asset_balance(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset {
        AssetKind::Native => <T::Currency as NativeInspect<T::AccountId>>::balance(who),
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          <T::Assets as FungiblesInspect<T::AccountId>>::balance(id, who)
        }
      }
    }

    fn transfer_asset(
      asset: AssetKind,
      from: &T::AccountId,
      to: &T::AccountId,
      amount: Balance,
      preservation: Preservation,
    ) -> DispatchResult {
      match asset {
        AssetKind::Native => {
          <T::Currency as NativeMutate<T::AccountId>>::transfer(from, to, amount, preservation)?;
        }
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          <T::Assets as FungiblesMutate<T::AccountId>>::transfer(id, from, to, amount, preservation)?;
        }
      }
      Ok(())
    }

    /// Check ratio bounds, schedule consistency and vault solvency.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      ensure!(
        DistributionRatio::<T>::get() <= PER_MILLE,
        "distribution ratio above 1000 per-mille"
      );
      let schedule = BondedRewards::<T>::get();
      ensure!(
        !schedule.blocks_remaining.is_zero() || schedule.principal.is_zero(),
        "bonded principal left without remaining blocks"
      );
      let balance = Self::asset_balance(T::RewardAsset::get(), &Self::account_id());
      ensure!(
        balance >= schedule.principal,
        "vault balance below bonded principal"
      );
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub staking_pool: Option<T::AccountId>,
    pub regulator: Option<T::AccountId>,
    pub distribution_ratio: Option<u32>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      let vault = Pallet::<T>::account_id();
      if let Some(ratio) = self.distribution_ratio {
        assert!(ratio <= PER_MILLE, "Distribution ratio exceeds 1000 per-mille");
        DistributionRatio::<T>::put(ratio);
      }
      if let Some(ref account) = self.staking_pool {
        assert!(account != &vault, "Staking pool cannot be the vault account");
        StakingPool::<T>::put(account);
      }
      if let Some(ref account) = self.regulator {
        assert!(account != &vault, "Regulator cannot be the vault account");
        Regulator::<T>::put(account);
      }
      // Vault account survives a zero native balance
      frame_system::Pallet::<T>::inc_providers(&vault);
    }
  }
}
