//! USD valuation of collateral
//!
//! Every function here prices against a fresh oracle quote; floor division
//! keeps all conversions conservative

use solana_program::pubkey::Pubkey;

use crate::error::EngineError;
use crate::ledger::AccountPosition;
use crate::math::mul_div_floor;
use crate::oracle::PriceOracle;
use crate::registry::CollateralRegistry;

fn native_unit(decimals: u8) -> Result<u128, EngineError> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or(EngineError::ArithmeticOverflow)
}

/// Value `amount` native units of `asset` in 18-decimal USD
pub fn usd_value<O: PriceOracle>(
    registry: &CollateralRegistry,
    oracle: &O,
    asset: &Pubkey,
    amount: u128,
) -> Result<u128, EngineError> {
    let config = registry.config(asset)?;
    let price = oracle.latest_quote(&config.feed)?.normalized_price()?;
    mul_div_floor(amount, price, native_unit(config.decimals)?)
}

/// Convert an 18-decimal USD value into native units of `asset`
pub fn asset_amount_from_usd<O: PriceOracle>(
    registry: &CollateralRegistry,
    oracle: &O,
    asset: &Pubkey,
    usd_value: u128,
) -> Result<u128, EngineError> {
    let config = registry.config(asset)?;
    let price = oracle.latest_quote(&config.feed)?.normalized_price()?;
    mul_div_floor(usd_value, native_unit(config.decimals)?, price)
}

/// Total 18-decimal USD value of every approved asset a position holds
///
/// Iterates the registry in insertion order and skips zero balances, so
/// feeds for untouched assets are never queried.
pub fn portfolio_value_usd<O: PriceOracle>(
    registry: &CollateralRegistry,
    oracle: &O,
    position: &AccountPosition,
) -> Result<u128, EngineError> {
    let mut total: u128 = 0;
    for config in registry.configs() {
        let amount = position.collateral(&config.asset);
        if amount == 0 {
            continue;
        }
        let price = oracle.latest_quote(&config.feed)?.normalized_price()?;
        let value = mul_div_floor(amount, price, native_unit(config.decimals)?)?;
        total = total
            .checked_add(value)
            .ok_or(EngineError::ArithmeticOverflow)?;
    }
    Ok(total)
}
