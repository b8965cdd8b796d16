#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn distribute() -> Weight;
	fn buyback() -> Weight;
	fn bond_rewards() -> Weight;
	fn set_distribution_ratio() -> Weight;
	fn set_beneficiary() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	/// Storage: `RewardVault::LastDistributionBlock`, `RewardVault::BondedRewards`,
	/// `RewardVault::DistributionRatio`, `RewardVault::StakingPool`, `RewardVault::Regulator`,
	/// `RewardVault::TotalDistributed`, `Assets::Account` (r:3 w:3)
	fn distribute() -> Weight {
		Weight::from_parts(75_000_000, 6000)
			.saturating_add(T::DbWeight::get().reads(9))
			.saturating_add(T::DbWeight::get().writes(6))
	}
	/// Storage: `Assets::Account` (r:4 w:4), `System::Account` (r:2 w:2),
	/// `RewardVault::TotalBuyback` (r:1 w:1), exchange pools (r:2 w:2)
	fn buyback() -> Weight {
		Weight::from_parts(120_000_000, 8000)
			.saturating_add(T::DbWeight::get().reads(9))
			.saturating_add(T::DbWeight::get().writes(9))
	}
	/// Storage: `RewardVault::BondedRewards`, `RewardVault::LastDistributionBlock`,
	/// `Assets::Account` (r:2 w:2)
	fn bond_rewards() -> Weight {
		Weight::from_parts(55_000_000, 4000)
			.saturating_add(T::DbWeight::get().reads(4))
			.saturating_add(T::DbWeight::get().writes(4))
	}
	/// Storage: `RewardVault::DistributionRatio` (r:1 w:1)
	fn set_distribution_ratio() -> Weight {
		Weight::from_parts(10_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	/// Storage: `RewardVault::StakingPool` or `RewardVault::Regulator` (r:1 w:1)
	fn set_beneficiary() -> Weight {
		Weight::from_parts(12_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn distribute() -> Weight {
		Weight::from_parts(75_000_000, 6000)
			.saturating_add(RocksDbWeight::get().reads(9))
			.saturating_add(RocksDbWeight::get().writes(6))
	}
	fn buyback() -> Weight {
		Weight::from_parts(120_000_000, 8000)
			.saturating_add(RocksDbWeight::get().reads(9))
			.saturating_add(RocksDbWeight::get().writes(9))
	}
	fn bond_rewards() -> Weight {
		Weight::from_parts(55_000_000, 4000)
			.saturating_add(RocksDbWeight::get().reads(4))
			.saturating_add(RocksDbWeight::get().writes(4))
	}
	fn set_distribution_ratio() -> Weight {
		Weight::from_parts(10_000_000, 1500)
			.saturating_add(RocksDbWeight::get().reads(1))
			.saturating_add(RocksDbWeight::get().writes(1))
	}
	fn set_beneficiary() -> Weight {
		Weight::from_parts(12_000_000, 1500)
			.saturating_add(RocksDbWeight::get().reads(1))
			.saturating_add(RocksDbWeight::get().writes(1))
	}
}
