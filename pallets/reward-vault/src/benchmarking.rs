use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::{EnsureOrigin, Get};
use polkadot_sdk::frame_system::{self, RawOrigin, pallet_prelude::BlockNumberFor};
use primitives::AssetKind;

const UNIT: u128 = 1_000_000_000_000;

#[benchmarks]
mod benches {
  use super::*;

  fn setup_beneficiaries<T: Config>() -> (T::AccountId, T::AccountId) {
    let staking_pool: T::AccountId = account("staking_pool", 0, 0);
    let regulator: T::AccountId = account("regulator", 0, 0);
    StakingPool::<T>::put(&staking_pool);
    Regulator::<T>::put(&regulator);
    (staking_pool, regulator)
  }

  #[benchmark]
  fn distribute() {
    let (staking_pool, _) = setup_beneficiaries::<T>();
    let vault = Pallet::<T>::account_id();
    let reward = T::RewardAsset::get();
    T::BenchmarkHelper::create_asset(reward).expect("Failed to create reward asset");

    // Bonded principal plus fee revenue, so both payout legs are non-zero
    let principal = 1_000 * UNIT;
    T::BenchmarkHelper::ensure_funded(&vault, reward, principal * 2)
      .expect("Failed to fund vault");
    BondedRewards::<T>::put(BondedSchedule {
      principal,
      rate_per_block: principal / 100,
      blocks_remaining: 100u32.into(),
    });
    LastDistributionBlock::<T>::put(BlockNumberFor::<T>::from(1u32));
    frame_system::Pallet::<T>::set_block_number(11u32.into());

    #[extrinsic_call]
    distribute(RawOrigin::Signed(staking_pool));

    assert_eq!(
      LastDistributionBlock::<T>::get(),
      BlockNumberFor::<T>::from(11u32)
    );
    assert!(TotalDistributed::<T>::get() > principal);
  }

  #[benchmark]
  fn buyback() {
    let caller: T::AccountId = whitelisted_caller();
    let reward = T::RewardAsset::get();
    let numeraire = T::Numeraire::get();
    let collateral = AssetKind::Local(1_000);

    T::BenchmarkHelper::create_asset(reward).expect("Failed to create reward asset");
    T::BenchmarkHelper::create_asset(collateral).expect("Failed to create collateral");
    // Two hops through the numeraire plus the first approval is the heaviest path
    T::BenchmarkHelper::create_pool(collateral, numeraire, 1_000_000 * UNIT, 1_000_000 * UNIT)
      .expect("Failed to create pool");
    T::BenchmarkHelper::create_pool(numeraire, reward, 1_000_000 * UNIT, 1_000_000 * UNIT)
      .expect("Failed to create pool");

    let amount = 10 * UNIT;
    T::BenchmarkHelper::ensure_funded(&caller, collateral, amount * 2)
      .expect("Failed to fund caller");
    T::BenchmarkHelper::ensure_funded(&caller, AssetKind::Native, amount)
      .expect("Failed to fund caller with native for ED");

    #[extrinsic_call]
    buyback(RawOrigin::Signed(caller), collateral, amount);

    assert!(TotalBuyback::<T>::get() > 0);
  }

  #[benchmark]
  fn bond_rewards() {
    let origin =
      T::BondOrigin::try_successful_origin().expect("BondOrigin must have a successful origin");
    let funder =
      T::BondOrigin::ensure_origin(origin.clone()).expect("BondOrigin must resolve a funder");
    let reward = T::RewardAsset::get();
    T::BenchmarkHelper::create_asset(reward).expect("Failed to create reward asset");
    T::BenchmarkHelper::ensure_funded(&funder, reward, 2_000 * UNIT)
      .expect("Failed to fund bonder");
    // Top-up of a live schedule re-averages the rate
    BondedRewards::<T>::put(BondedSchedule {
      principal: 500 * UNIT,
      rate_per_block: 10 * UNIT,
      blocks_remaining: 50u32.into(),
    });

    #[extrinsic_call]
    bond_rewards(origin, 1_000 * UNIT, 100u32.into());

    assert_eq!(BondedRewards::<T>::get().principal, 1_500 * UNIT);
  }

  #[benchmark]
  fn set_distribution_ratio() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");
    let new_ratio = if DistributionRatio::<T>::get() == 500 { 400 } else { 500 };

    #[extrinsic_call]
    set_distribution_ratio(origin, new_ratio);

    assert_eq!(DistributionRatio::<T>::get(), new_ratio);
  }

  #[benchmark]
  fn set_beneficiary() {
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");
    setup_beneficiaries::<T>();
    let new_account: T::AccountId = account("new_regulator", 0, 0);

    #[extrinsic_call]
    set_beneficiary(
      origin,
      Beneficiary::Regulator,
      new_account.clone(),
    );

    assert_eq!(Regulator::<T>::get(), Some(new_account));
  }

  impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Test);
}
