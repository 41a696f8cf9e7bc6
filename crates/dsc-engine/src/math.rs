//! 256-bit unsigned arithmetic for overflow-safe fixed-point math
//!
//! Valuation multiplies 18-decimal amounts by 18-decimal prices, so every
//! multiply-then-divide runs through a 256-bit intermediate

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::EngineError;

/// 256-bit unsigned integer represented as two u128 values
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

impl U256 {
    /// Zero value
    pub const ZERO: Self = Self { lo: 0, hi: 0 };

    /// Create from low value only
    pub const fn from_u128(val: u128) -> Self {
        Self { lo: val, hi: 0 }
    }

    /// Create from high and low values
    pub const fn new(hi: u128, lo: u128) -> Self {
        Self { lo, hi }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Widening 128x128 -> 256 multiplication
    pub fn from_mul(a: u128, b: u128) -> Self {
        let a_lo = a & u64::MAX as u128;
        let a_hi = a >> 64;
        let b_lo = b & u64::MAX as u128;
        let b_hi = b >> 64;

        let p0 = a_lo * b_lo;
        let p1 = a_lo * b_hi;
        let p2 = a_hi * b_lo;
        let p3 = a_hi * b_hi;

        // a*b = p3*2^128 + (p1 + p2)*2^64 + p0
        let (mid, mid_carry) = p1.overflowing_add(p2);
        let (lo, lo_carry) = p0.overflowing_add(mid << 64);
        // The exact high half is < 2^128, so these adds cannot overflow
        let hi = p3 + (mid >> 64) + ((mid_carry as u128) << 64) + lo_carry as u128;

        Self { lo, hi }
    }

    /// Long division by a u128 divisor, returning (quotient, remainder)
    pub fn div_rem_u128(&self, divisor: u128) -> Option<(Self, u128)> {
        if divisor == 0 {
            return None;
        }
        if self.hi == 0 {
            return Some((Self::from_u128(self.lo / divisor), self.lo % divisor));
        }

        let mut quotient = Self::ZERO;
        let mut remainder: u128 = 0;

        // Invariant: remainder < divisor at the top of every iteration, so
        // the shifted remainder is at most 2*divisor - 1 and a single
        // conditional subtraction restores the invariant
        for i in (0..256).rev() {
            let carry = remainder >> 127;
            remainder = (remainder << 1) | self.bit(i);
            if carry == 1 || remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient.set_bit(i);
            }
        }

        Some((quotient, remainder))
    }

    /// Narrow back to u128 when the high half is clear
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    fn bit(&self, i: u32) -> u128 {
        if i >= 128 {
            (self.hi >> (i - 128)) & 1
        } else {
            (self.lo >> i) & 1
        }
    }

    fn set_bit(&mut self, i: u32) {
        if i >= 128 {
            self.hi |= 1u128 << (i - 128);
        } else {
            self.lo |= 1u128 << i;
        }
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.hi.cmp(&other.hi) {
            std::cmp::Ordering::Equal => self.lo.cmp(&other.lo),
            other => other,
        }
    }
}

/// Compute floor(a * b / divisor) through a 256-bit intermediate
pub fn mul_div_floor(a: u128, b: u128, divisor: u128) -> Result<u128, EngineError> {
    if divisor == 0 {
        return Err(EngineError::DivisionByZero);
    }
    let product = U256::from_mul(a, b);
    let (quotient, _) = product
        .div_rem_u128(divisor)
        .ok_or(EngineError::DivisionByZero)?;
    quotient.to_u128().ok_or(EngineError::ArithmeticOverflow)
}
