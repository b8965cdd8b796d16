use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Asset identifier shared by the vault, its oracle and the exchange adapters.
///
/// - `Native`: the chain's native currency (managed by pallet-balances).
/// - `Local(u32)`: assets issued on this chain (managed by pallet-assets).
/// - `Foreign(u32)`: bridged assets mapped into pallet-assets.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets via XCM mapping
  Foreign(u32),
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    AssetKind::Local(asset_id)
  }
}

// Asset id namespaces
//
// [ 4 bits: Type ] [ 28 bits: Index ]
//
// 0x4... -> Pool-share (LP) tokens
// 0xF... -> Foreign/XCM assets
pub const MASK_TYPE: u32 = 0xF000_0000;
pub const MASK_INDEX: u32 = 0x0FFF_FFFF;

pub const TYPE_LP: u32 = 0x4000_0000;
pub const TYPE_FOREIGN: u32 = 0xF000_0000;

/// Build an asset id inside a namespace.
pub const fn make_id(type_mask: u32, index: u32) -> u32 {
  type_mask | (index & MASK_INDEX)
}

/// Helper trait to inspect AssetKind properties
pub trait AssetInspector {
  fn is_native(&self) -> bool;
  fn local_id(&self) -> Option<u32>;
  /// Id lives in the pool-share namespace
  fn is_lp(&self) -> bool;
  fn is_foreign(&self) -> bool;
}

impl AssetInspector for AssetKind {
  fn is_native(&self) -> bool {
    matches!(self, AssetKind::Native)
  }

  fn local_id(&self) -> Option<u32> {
    match self {
      AssetKind::Local(id) | AssetKind::Foreign(id) => Some(*id),
      AssetKind::Native => None,
    }
  }

  fn is_lp(&self) -> bool {
    match self {
      AssetKind::Local(id) => (id & MASK_TYPE) == TYPE_LP,
      _ => false,
    }
  }

  fn is_foreign(&self) -> bool {
    match self {
      AssetKind::Foreign(_) => true,
      AssetKind::Local(id) => (id & MASK_TYPE) == TYPE_FOREIGN,
      AssetKind::Native => false,
    }
  }
}

/// Pricing class of a token.
///
/// Resolved once per price query and then carried explicitly, so the pricing
/// path never re-derives it.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum TokenClass {
  /// Ordinary asset, priced against a hinted numeraire pair
  Plain,
  /// Liquidity-pool share, priced from its own pool reserves and supply
  PoolShare,
}

/// Classify an asset from the metadata available for it.
///
/// The LP id namespace is authoritative. Assets outside it fall back to matching
/// their symbol against the pool-share marker.
pub fn classify_token(asset: AssetKind, symbol: &[u8], marker: &[u8]) -> TokenClass {
  if asset.is_lp() {
    return TokenClass::PoolShare;
  }
  if !asset.is_native() && !marker.is_empty() && symbol == marker {
    return TokenClass::PoolShare;
  }
  TokenClass::Plain
}
