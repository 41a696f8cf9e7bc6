//! Health factor computation
//!
//! A health factor is an 18-decimal fixed-point ratio of
//! threshold-adjusted collateral value to debt. Positions with no debt
//! report `MAX_HEALTH_FACTOR` and can never be liquidated.

use crate::constants::{
    LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD_PCT, MAX_HEALTH_FACTOR, MIN_HEALTH_FACTOR,
    PRECISION,
};
use crate::error::{error_msg, EngineError};
use crate::ledger::AccountPosition;
use crate::math::mul_div_floor;
use crate::oracle::PriceOracle;
use crate::registry::CollateralRegistry;
use crate::valuation::portfolio_value_usd;

/// Health factor from a collateral value and outstanding debt, both in
/// 18-decimal units
pub fn health_factor(collateral_value_usd: u128, dsc_minted: u128) -> Result<u128, EngineError> {
    if dsc_minted == 0 {
        return Ok(MAX_HEALTH_FACTOR);
    }
    let adjusted = mul_div_floor(
        collateral_value_usd,
        LIQUIDATION_THRESHOLD_PCT,
        LIQUIDATION_PRECISION,
    )?;
    mul_div_floor(adjusted, PRECISION, dsc_minted)
}

/// Health factor of a position, valued at fresh oracle quotes
pub fn position_health<O: PriceOracle>(
    registry: &CollateralRegistry,
    oracle: &O,
    position: &AccountPosition,
) -> Result<u128, EngineError> {
    let collateral_value = portfolio_value_usd(registry, oracle, position)?;
    health_factor(collateral_value, position.dsc_minted)
}

/// Fail with `HealthFactorBroken` when `health` sits below the minimum
pub fn assert_safe(health: u128, context: &str) -> Result<(), EngineError> {
    if health < MIN_HEALTH_FACTOR {
        return error_msg(EngineError::HealthFactorBroken, context);
    }
    Ok(())
}
