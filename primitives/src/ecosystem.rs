//! Ecosystem constants for the reward vault.
//!
//! Pallet ids and the economic parameters runtimes and mocks configure the vault
//! with. Keeping them here gives every consumer the same defaults.

/// Balance type alias for consistency across the workspace
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
pub mod pallet_ids {
  /// Reward vault pallet ID (custody of bonded rewards and fee revenue)
  pub const REWARD_VAULT_PALLET_ID: &[u8; 8] = b"rwdvault";
}

/// Economic parameters of the vault.
pub mod params {
  use super::Balance;

  /// Base of all distribution ratios (parts per thousand).
  pub const PER_MILLE: u32 = 1_000;

  /// Default share of distributed rewards sent to the staking pool (70%).
  ///
  /// The regulator receives the remainder.
  pub const DEFAULT_DISTRIBUTION_RATIO: u32 = 700;

  /// Oracle price scale: one numeraire unit is `10^18`.
  pub const PRICE_PRECISION: Balance = 1_000_000_000_000_000_000;

  /// Decimal exponent used to normalise plain-token reserves before inversion.
  ///
  /// Tokens with more decimals than this cannot be priced.
  pub const PRICE_NORMALISATION_EXP: u32 = 36;

  /// Symbol carried by pool-share tokens that live outside the LP id namespace.
  pub const POOL_SHARE_SYMBOL: &[u8] = b"LP-SHARE";

  /// Buyback swap deadline in blocks (~5 minutes at 6s/block).
  pub const SWAP_DEADLINE_BLOCKS: u32 = 50;

  /// Decimals of the native currency.
  pub const NATIVE_DECIMALS: u8 = 12;
}
