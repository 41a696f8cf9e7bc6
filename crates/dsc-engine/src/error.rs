//! Error types for the DSC engine
//!
//! Every failure is fatal to its operation and surfaced verbatim; nothing
//! is retried internally

use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Custom error type for the DSC engine
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum EngineError {
    // Input validation errors (7000-7009)
    #[error("Amount must be greater than zero")]
    ZeroAmount = 7000,

    #[error("Asset is not an approved collateral")]
    UnsupportedAsset = 7001,

    #[error("Asset and oracle configuration lengths differ")]
    ConfigMismatch = 7002,

    // Oracle errors (7010-7019)
    #[error("Oracle reported an unusable price")]
    InvalidPrice = 7010,

    #[error("Oracle price is stale")]
    StalePrice = 7011,

    // External rail errors (7020-7029)
    #[error("Asset transfer reported failure")]
    AssetTransferFailed = 7020,

    #[error("Debt token issuance reported failure")]
    IssuanceFailed = 7021,

    // Position safety errors (7030-7039)
    #[error("Insufficient collateral")]
    InsufficientCollateral = 7030,

    #[error("Health factor below minimum")]
    HealthFactorBroken = 7031,

    #[error("Position healthy - cannot liquidate")]
    PositionHealthy = 7032,

    #[error("Liquidation did not improve health factor")]
    HealthFactorNotImproved = 7033,

    // Arithmetic errors (7040-7049)
    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 7040,

    #[error("Division by zero")]
    DivisionByZero = 7041,
}

impl PrintProgramError for EngineError {
    fn print<E>(&self) {
        msg!("DSC Engine Error: {}", self);
    }
}

impl From<EngineError> for ProgramError {
    fn from(e: EngineError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for EngineError {
    fn type_of() -> &'static str {
        "EngineError"
    }
}

/// Helper function to log and return errors
pub fn error_msg<T>(error: EngineError, message: &str) -> Result<T, EngineError> {
    msg!("Error: {} - {}", error, message);
    Err(error)
}
