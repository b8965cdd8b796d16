//! Spot-price oracle derived from pool reserves.
//!
//! Prices are numeraire units per token scaled by `PRICE_PRECISION` (10^18). The
//! oracle only reads; nothing on the distribution path depends on it.

use crate::{Config, Error, Pallet, types::ExchangeRouter};
use frame::deps::{
  frame_support::traits::{
    Get,
    fungibles::{Inspect as FungiblesInspect, metadata::Inspect as MetadataInspect},
  },
  sp_core::U256,
  sp_runtime::{DispatchError, traits::Zero},
};
use primitives::{
  AssetInspector, AssetKind, TokenClass, classify_token,
  params::{POOL_SHARE_SYMBOL, PRICE_NORMALISATION_EXP, PRICE_PRECISION},
};
use scale_info::prelude::vec::Vec;

impl<T: Config> Pallet<T> {
  /// Spot price of `token` in numeraire units, scaled by 10^18.
  ///
  /// `pair_hint` is the numeraire pair used for plain tokens; pool-share tokens are
  /// priced from their own pool. `Ok(0)` means no price is available.
  pub fn price(token: AssetKind, pair_hint: (AssetKind, AssetKind)) -> Result<u128, DispatchError> {
    if token == T::Numeraire::get() {
      return Ok(PRICE_PRECISION);
    }
    let class = Self::classify(token);
    Self::price_with_class(token, class, pair_hint)
  }

  /// Resolve the pricing class of `token` from its id namespace, falling back to its symbol.
  pub fn classify(token: AssetKind) -> TokenClass {
    let symbol = match token.local_id() {
      Some(id) => <T::Assets as MetadataInspect<T::AccountId>>::symbol(id),
      None => Vec::new(),
    };
    classify_token(token, &symbol, POOL_SHARE_SYMBOL)
  }

  /// Price `token` under an already resolved class.
  pub fn price_with_class(
    token: AssetKind,
    class: TokenClass,
    pair_hint: (AssetKind, AssetKind),
  ) -> Result<u128, DispatchError> {
    let numeraire = T::Numeraire::get();
    if token == numeraire {
      return Ok(PRICE_PRECISION);
    }
    let pair = match class {
      TokenClass::PoolShare => {
        T::Exchange::pool_pair_for_share(token).ok_or(Error::<T>::InvalidPair)?
      }
      TokenClass::Plain => pair_hint,
    };
    let (numeraire_reserves, token_reserves, other) = Self::oriented_reserves(pair, numeraire)?;
    if class == TokenClass::Plain && other != token {
      return Err(Error::<T>::InvalidPair.into());
    }
    if token_reserves.is_zero() {
      return Ok(0);
    }
    match class {
      TokenClass::PoolShare => Self::pool_share_price(token, numeraire_reserves),
      TokenClass::Plain => Self::plain_price(token, token_reserves, numeraire_reserves),
    }
  }

  /// Reserves of `pair` as (numeraire side, other side, other asset)
  fn oriented_reserves(
    pair: (AssetKind, AssetKind),
    numeraire: AssetKind,
  ) -> Result<(u128, u128, AssetKind), Error<T>> {
    let (reserve0, reserve1) = T::Exchange::get_reserves(pair).ok_or(Error::<T>::InvalidPair)?;
    if pair.0 == numeraire {
      Ok((reserve0, reserve1, pair.1))
    } else if pair.1 == numeraire {
      Ok((reserve1, reserve0, pair.0))
    } else {
      Err(Error::<T>::InvalidPair)
    }
  }

  /// Redeemable numeraire per share, assuming a balanced pool
  fn pool_share_price(share: AssetKind, numeraire_reserves: u128) -> Result<u128, DispatchError> {
    let supply = match share.local_id() {
      Some(id) => <T::Assets as FungiblesInspect<T::AccountId>>::total_issuance(id),
      None => return Err(Error::<T>::InvalidPair.into()),
    };
    if supply.is_zero() {
      return Ok(0);
    }
    let value = U256::from(numeraire_reserves)
      .checked_mul(U256::from(PRICE_PRECISION.saturating_mul(2)))
      .ok_or(Error::<T>::ArithmeticOverflow)?
      / U256::from(supply);
    Self::to_balance(value)
  }

  /// Normalise reserves by decimals, then invert tokens-per-numeraire
  fn plain_price(
    token: AssetKind,
    token_reserves: u128,
    numeraire_reserves: u128,
  ) -> Result<u128, DispatchError> {
    let decimals = u32::from(Self::decimals(token));
    let adjusted = PRICE_NORMALISATION_EXP
      .checked_sub(decimals)
      .ok_or(Error::<T>::UnsupportedDecimals)?;
    if numeraire_reserves.is_zero() {
      return Ok(0);
    }
    let tokens_per_numeraire = U256::from(token_reserves)
      .checked_mul(U256::exp10(adjusted as usize))
      .ok_or(Error::<T>::ArithmeticOverflow)?
      / U256::from(numeraire_reserves);
    if tokens_per_numeraire.is_zero() {
      // Price above 10^36 per unit cannot be represented
      return Ok(0);
    }
    let price = U256::exp10(PRICE_NORMALISATION_EXP as usize) / tokens_per_numeraire;
    Self::to_balance(price)
  }

  fn decimals(token: AssetKind) -> u8 {
    match token.local_id() {
      Some(id) => <T::Assets as MetadataInspect<T::AccountId>>::decimals(id),
      None => T::NativeDecimals::get(),
    }
  }

  fn to_balance(value: U256) -> Result<u128, DispatchError> {
    if value > U256::from(u128::MAX) {
      return Err(Error::<T>::ArithmeticOverflow.into());
    }
    Ok(value.as_u128())
  }
}
