//! Price feed interface and normalization
//!
//! The engine consumes an injected oracle adapter and re-validates every
//! quote before it is used; quotes are fetched fresh per valuation and
//! never cached

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::constants::PRICE_DECIMALS;
use crate::error::EngineError;

/// A single price reading from a feed
///
/// The actual price is `price * 10^expo`; feeds commonly report
/// e.g. 3000 USD as `price = 300_000_000_000`, `expo = -8`
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Raw signed feed value
    pub price: i64,
    /// Decimal exponent of the raw value
    pub expo: i32,
}

impl PriceQuote {
    pub const fn new(price: i64, expo: i32) -> Self {
        Self { price, expo }
    }

    /// Scale the raw price to 18-decimal precision
    ///
    /// The shift `18 + expo` may be negative, in which case the price is
    /// floor-divided down. Non-positive prices and prices that collapse to
    /// zero at 18 decimals are rejected rather than consumed.
    pub fn normalized_price(&self) -> Result<u128, EngineError> {
        if self.price <= 0 {
            return Err(EngineError::InvalidPrice);
        }
        let raw = self.price as u128;
        let shift = PRICE_DECIMALS as i32 + self.expo;

        if shift >= 0 {
            let scale = 10u128
                .checked_pow(shift as u32)
                .ok_or(EngineError::ArithmeticOverflow)?;
            raw.checked_mul(scale)
                .ok_or(EngineError::ArithmeticOverflow)
        } else {
            let down = 10u128.checked_pow(shift.unsigned_abs());
            match down {
                Some(scale) if raw / scale > 0 => Ok(raw / scale),
                // So far below 18 decimals the price rounds to nothing
                _ => Err(EngineError::InvalidPrice),
            }
        }
    }
}

/// Price feed adapter injected into the engine
///
/// Implementations fetch the latest reading for a feed and surface
/// unusable data through the engine taxonomy (`InvalidPrice`,
/// `StalePrice`). The engine performs its own validation on top.
pub trait PriceOracle {
    fn latest_quote(&self, feed: &Pubkey) -> Result<PriceQuote, EngineError>;
}

impl<T: PriceOracle + ?Sized> PriceOracle for std::sync::Arc<T> {
    fn latest_quote(&self, feed: &Pubkey) -> Result<PriceQuote, EngineError> {
        (**self).latest_quote(feed)
    }
}
