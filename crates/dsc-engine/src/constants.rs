//! Protocol-wide constants
//!
//! Central location for the fixed-point scale and risk parameters

/// Fixed-point scale for USD values, debt units, and health factors
pub const PRECISION: u128 = 1_000_000_000_000_000_000; // 1e18

/// Decimal precision every oracle price is normalized to
pub const PRICE_DECIMALS: u32 = 18;

/// Share of collateral value counted toward solvency, in percent
pub const LIQUIDATION_THRESHOLD_PCT: u128 = 50; // positions must be 200% collateralized

/// Divisor paired with the threshold and bonus percentages
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Bonus collateral awarded to liquidators, in percent of the seized base
pub const LIQUIDATION_BONUS_PCT: u128 = 10;

/// Minimum health factor a position must hold after any operation
pub const MIN_HEALTH_FACTOR: u128 = PRECISION; // 1.0

/// Health factor reported for positions with no debt
pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;
