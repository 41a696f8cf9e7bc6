//! External token rails
//!
//! Collateral custody and the debt-token mint are host primitives; the
//! engine drives them through these traits. Every call is all-or-nothing
//! at the rail boundary: it either fully happens or reports failure with
//! no partial effect.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// Collateral custody rail
pub trait CollateralGateway {
    /// Move collateral from a user into protocol custody
    fn pull(&self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Move collateral out of protocol custody to a recipient
    fn release(&self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}

/// Debt-token mint rail
pub trait DebtTokenGateway {
    /// Issue freshly minted debt units to a recipient
    fn mint_to(&self, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Destroy debt units held by a payer
    fn burn_from(&self, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}

impl<T: CollateralGateway + ?Sized> CollateralGateway for std::sync::Arc<T> {
    fn pull(&self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        (**self).pull(asset, from, amount)
    }

    fn release(&self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        (**self).release(asset, to, amount)
    }
}

impl<T: DebtTokenGateway + ?Sized> DebtTokenGateway for std::sync::Arc<T> {
    fn mint_to(&self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        (**self).mint_to(to, amount)
    }

    fn burn_from(&self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        (**self).burn_from(from, amount)
    }
}
