extern crate alloc;

use crate as pallet_reward_vault;
use crate::ExchangeRouter;
use alloc::vec::Vec;
use polkadot_sdk::frame_support::traits::{
  fungible::Mutate as NativeMutate,
  fungibles::Mutate as FungiblesMutate,
  tokens::{Fortitude, Precision, Preservation},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl, ord_parameter_types,
  traits::{ConstU8, ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system::{self, EnsureRoot, EnsureSignedBy};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetKind, TYPE_LP, make_id,
  pallet_ids::REWARD_VAULT_PALLET_ID,
  params::{DEFAULT_DISTRIBUTION_RATIO, NATIVE_DECIMALS, SWAP_DEADLINE_BLOCKS},
};
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const STAKING_POOL: u64 = 10;
pub const REGULATOR: u64 = 20;
pub const GOVERNOR: u64 = 100;

pub const REWARD_ID: u32 = 1;
pub const COLLATERAL_ID: u32 = 2;
pub const USDC_ID: u32 = 6;
pub const SYMBOL_SHARE_ID: u32 = 7;
pub const WIDE_DECIMALS_ID: u32 = 8;
pub const SHARE_ID: u32 = make_id(TYPE_LP, 1);

pub const REWARD: AssetKind = AssetKind::Local(REWARD_ID);
pub const COLLATERAL: AssetKind = AssetKind::Local(COLLATERAL_ID);

pub const INITIAL_BALANCE: u128 = 1_000_000_000;
pub const SHARE_SUPPLY: u128 = 500;

/// Swap as seen by the mock exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapRecord {
  pub path: Vec<AssetKind>,
  pub amount_in: u128,
  pub min_amount_out: u128,
  pub reported_out: u128,
  pub deadline: u64,
}

// State containers for stateful mocks
thread_local! {
    // AMM Pools: sorted (AssetA, AssetB) -> (ReserveA, ReserveB)
    pub static POOLS: RefCell<BTreeMap<(AssetKind, AssetKind), (u128, u128)>> = const { RefCell::new(BTreeMap::new()) };

    // Pool-share token -> pool pair
    pub static SHARE_POOLS: RefCell<BTreeMap<AssetKind, (AssetKind, AssetKind)>> = const { RefCell::new(BTreeMap::new()) };

    // (owner, asset) -> amount the exchange may pull
    pub static ALLOWANCES: RefCell<BTreeMap<(u64, AssetKind), u128>> = const { RefCell::new(BTreeMap::new()) };

    pub static APPROVE_CALLS: RefCell<u32> = const { RefCell::new(0) };

    // Share of the swap output withheld on delivery (fee-on-transfer simulation)
    pub static OUTPUT_TAX: RefCell<Permill> = const { RefCell::new(Permill::from_parts(0)) };

    pub static LAST_SWAP: RefCell<Option<SwapRecord>> = const { RefCell::new(None) };

    pub static NUMERAIRE: RefCell<AssetKind> = const { RefCell::new(AssetKind::Native) };
}

fn sorted_pair(a: AssetKind, b: AssetKind) -> (AssetKind, AssetKind) {
  if a < b { (a, b) } else { (b, a) }
}

pub fn set_pool(asset_a: AssetKind, asset_b: AssetKind, reserve_a: u128, reserve_b: u128) {
  let key = sorted_pair(asset_a, asset_b);
  let reserves = if asset_a < asset_b {
    (reserve_a, reserve_b)
  } else {
    (reserve_b, reserve_a)
  };
  POOLS.with(|p| p.borrow_mut().insert(key, reserves));
}

pub fn register_share_token(share: AssetKind, asset_a: AssetKind, asset_b: AssetKind) {
  SHARE_POOLS.with(|m| m.borrow_mut().insert(share, sorted_pair(asset_a, asset_b)));
}

pub fn set_output_tax(tax: Permill) {
  OUTPUT_TAX.with(|t| *t.borrow_mut() = tax);
}

pub fn set_numeraire(asset: AssetKind) {
  NUMERAIRE.with(|n| *n.borrow_mut() = asset);
}

pub fn approve_calls() -> u32 {
  APPROVE_CALLS.with(|c| *c.borrow())
}

pub fn last_swap() -> Option<SwapRecord> {
  LAST_SWAP.with(|s| s.borrow().clone())
}

/// XYK output and post-swap reserves of one hop, without touching state
fn quote_hop(
  asset_in: AssetKind,
  asset_out: AssetKind,
  amount_in: u128,
) -> Result<(u128, (u128, u128)), DispatchError> {
  let key = sorted_pair(asset_in, asset_out);
  let (res_a, res_b) = POOLS
    .with(|p| p.borrow().get(&key).cloned())
    .ok_or(DispatchError::Other("Pool not found"))?;
  let (reserve_in, reserve_out) = if asset_in < asset_out {
    (res_a, res_b)
  } else {
    (res_b, res_a)
  };
  if reserve_in == 0 || reserve_out == 0 {
    return Err(DispatchError::Other("Empty reserves"));
  }
  // XYK Swap Math: y_out = (x_in * y_res) / (x_res + x_in)
  let amount_out = amount_in.saturating_mul(reserve_out) / reserve_in.saturating_add(amount_in);
  let reserves = if asset_in < asset_out {
    (
      res_a.saturating_add(amount_in),
      res_b.saturating_sub(amount_out),
    )
  } else {
    (
      res_a.saturating_sub(amount_out),
      res_b.saturating_add(amount_in),
    )
  };
  Ok((amount_out, reserves))
}

/// Expected output of `path` at current reserves
pub fn quote_path(path: &[AssetKind], amount_in: u128) -> u128 {
  let mut amount = amount_in;
  for hop in path.windows(2) {
    amount = quote_hop(hop[0], hop[1], amount)
      .map(|(out, _)| out)
      .unwrap_or(0);
  }
  amount
}

pub fn asset_balance(asset: AssetKind, who: u64) -> u128 {
  RewardVault::asset_balance(asset, &who)
}

fn burn(asset: AssetKind, who: &u64, amount: u128) -> DispatchResult {
  match asset {
    AssetKind::Native => {
      <Balances as NativeMutate<u64>>::burn_from(
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as FungiblesMutate<u64>>::burn_from(
        id,
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
    }
  }
  Ok(())
}

fn mint(asset: AssetKind, who: &u64, amount: u128) -> DispatchResult {
  if amount == 0 {
    return Ok(());
  }
  match asset {
    AssetKind::Native => {
      <Balances as NativeMutate<u64>>::mint_into(who, amount)?;
    }
    AssetKind::Local(id) | AssetKind::Foreign(id) => {
      <Assets as FungiblesMutate<u64>>::mint_into(id, who, amount)?;
    }
  }
  Ok(())
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    RewardVault: pallet_reward_vault,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

pub struct MockExchange;
impl ExchangeRouter<u64, u128, u64> for MockExchange {
  fn pool_pair_for_share(share_token: AssetKind) -> Option<(AssetKind, AssetKind)> {
    SHARE_POOLS.with(|m| m.borrow().get(&share_token).cloned())
  }

  fn get_reserves(pair: (AssetKind, AssetKind)) -> Option<(u128, u128)> {
    let key = sorted_pair(pair.0, pair.1);
    let (res_a, res_b) = POOLS.with(|p| p.borrow().get(&key).cloned())?;
    if pair.0 < pair.1 {
      Some((res_a, res_b))
    } else {
      Some((res_b, res_a))
    }
  }

  fn allowance(owner: &u64, asset: AssetKind) -> u128 {
    ALLOWANCES.with(|a| a.borrow().get(&(*owner, asset)).copied().unwrap_or(0))
  }

  fn approve(owner: &u64, asset: AssetKind, amount: u128) -> DispatchResult {
    APPROVE_CALLS.with(|c| *c.borrow_mut() += 1);
    ALLOWANCES.with(|a| a.borrow_mut().insert((*owner, asset), amount));
    Ok(())
  }

  fn swap_exact_tokens_supporting_fee(
    who: &u64,
    path: Vec<AssetKind>,
    amount_in: u128,
    min_amount_out: u128,
    recipient: &u64,
    deadline: u64,
  ) -> Result<u128, DispatchError> {
    if System::block_number() > deadline {
      return Err(DispatchError::Other("Deadline passed"));
    }
    let asset_in = *path.first().ok_or(DispatchError::Other("Empty path"))?;
    let asset_out = *path.last().ok_or(DispatchError::Other("Empty path"))?;
    if path.len() < 2 {
      return Err(DispatchError::Other("Path too short"));
    }

    // Token inputs are pulled through an allowance, native input is attached value
    if asset_in != AssetKind::Native {
      let allowed = Self::allowance(who, asset_in);
      if allowed < amount_in {
        return Err(DispatchError::Other("Insufficient allowance"));
      }
      if allowed != u128::MAX {
        ALLOWANCES.with(|a| a.borrow_mut().insert((*who, asset_in), allowed - amount_in));
      }
    }

    // Quote every hop before touching reserves
    let mut amount = amount_in;
    let mut updates = Vec::new();
    for hop in path.windows(2) {
      let (out, reserves) = quote_hop(hop[0], hop[1], amount)?;
      updates.push((sorted_pair(hop[0], hop[1]), reserves));
      amount = out;
    }
    if amount < min_amount_out {
      return Err(DispatchError::Other("Slippage exceeded"));
    }
    POOLS.with(|p| {
      let mut pools = p.borrow_mut();
      for (key, reserves) in updates {
        pools.insert(key, reserves);
      }
    });

    burn(asset_in, who, amount_in)?;
    let tax = OUTPUT_TAX.with(|t| *t.borrow()).mul_floor(amount);
    mint(asset_out, recipient, amount.saturating_sub(tax))?;

    LAST_SWAP.with(|s| {
      *s.borrow_mut() = Some(SwapRecord {
        path,
        amount_in,
        min_amount_out,
        reported_out: amount,
        deadline,
      })
    });
    Ok(amount)
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*REWARD_VAULT_PALLET_ID)
  }
}

pub struct RewardAssetStub;
impl Get<AssetKind> for RewardAssetStub {
  fn get() -> AssetKind {
    REWARD
  }
}

pub struct NumeraireStub;
impl Get<AssetKind> for NumeraireStub {
  fn get() -> AssetKind {
    NUMERAIRE.with(|n| *n.borrow())
  }
}

ord_parameter_types! {
  pub const Governor: u64 = GOVERNOR;
}

impl pallet_reward_vault::Config for Test {
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = RewardVaultBenchmarkHelper;
  type Assets = Assets;
  type Currency = Balances;
  type Exchange = MockExchange;
  type PalletId = PalletIdStub;
  type RewardAsset = RewardAssetStub;
  type Numeraire = NumeraireStub;
  type NativeDecimals = ConstU8<NATIVE_DECIMALS>;
  type DefaultDistributionRatio = ConstU32<DEFAULT_DISTRIBUTION_RATIO>;
  type SwapDeadline = ConstU64<{ SWAP_DEADLINE_BLOCKS as u64 }>;
  type AdminOrigin = EnsureRoot<u64>;
  type BondOrigin = EnsureSignedBy<Governor, u64>;
  type WeightInfo = ();
}

#[cfg(feature = "runtime-benchmarks")]
pub struct RewardVaultBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for RewardVaultBenchmarkHelper {
  fn ensure_funded(who: &u64, asset: AssetKind, amount: u128) -> DispatchResult {
    mint(asset, who, amount)
  }

  fn create_asset(asset: AssetKind) -> DispatchResult {
    if let AssetKind::Local(id) = asset {
      let _ = Assets::force_create(RuntimeOrigin::root(), id, 1, true, 1);
    }
    Ok(())
  }

  fn create_pool(
    asset1: AssetKind,
    asset2: AssetKind,
    reserve1: u128,
    reserve2: u128,
  ) -> DispatchResult {
    set_pool(asset1, asset2, reserve1, reserve2);
    Ok(())
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
      (STAKING_POOL, INITIAL_BALANCE),
      (REGULATOR, INITIAL_BALANCE),
      (GOVERNOR, INITIAL_BALANCE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    // (id, owner, is_sufficient, min_balance)
    assets: alloc::vec![
      (REWARD_ID, ALICE, true, 1),
      (COLLATERAL_ID, ALICE, true, 1),
      (USDC_ID, ALICE, true, 1),
      (SYMBOL_SHARE_ID, ALICE, true, 1),
      (WIDE_DECIMALS_ID, ALICE, true, 1),
      (SHARE_ID, ALICE, true, 1),
    ],
    // (id, name, symbol, decimals)
    metadata: alloc::vec![
      (REWARD_ID, b"Reward".to_vec(), b"RWD".to_vec(), 18),
      (COLLATERAL_ID, b"Collateral".to_vec(), b"COL".to_vec(), 18),
      (USDC_ID, b"USD Coin".to_vec(), b"USDC".to_vec(), 6),
      (SYMBOL_SHARE_ID, b"Legacy Pool Share".to_vec(), b"LP-SHARE".to_vec(), 18),
      (WIDE_DECIMALS_ID, b"Wide".to_vec(), b"WIDE".to_vec(), 40),
      (SHARE_ID, b"Pool Share".to_vec(), b"POOL".to_vec(), 18),
    ],
    accounts: alloc::vec![
      (REWARD_ID, GOVERNOR, INITIAL_BALANCE),
      (REWARD_ID, ALICE, INITIAL_BALANCE),
      (COLLATERAL_ID, ALICE, INITIAL_BALANCE),
      (SHARE_ID, BOB, SHARE_SUPPLY),
      (SYMBOL_SHARE_ID, BOB, SHARE_SUPPLY * 2),
    ],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_reward_vault::GenesisConfig::<Test> {
    staking_pool: Some(STAKING_POOL),
    regulator: Some(REGULATOR),
    distribution_ratio: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Reset State
  POOLS.with(|p| p.borrow_mut().clear());
  SHARE_POOLS.with(|p| p.borrow_mut().clear());
  ALLOWANCES.with(|a| a.borrow_mut().clear());
  APPROVE_CALLS.with(|c| *c.borrow_mut() = 0);
  OUTPUT_TAX.with(|t| *t.borrow_mut() = Permill::zero());
  LAST_SWAP.with(|s| *s.borrow_mut() = None);
  NUMERAIRE.with(|n| *n.borrow_mut() = AssetKind::Native);

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
