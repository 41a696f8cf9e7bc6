//! Position ledger and staged transactions
//!
//! All account state lives in one injected `LedgerState`. Operations never
//! write to it directly: they buffer mutations in a `LedgerTxn` overlay,
//! run their checks against the overlay, and apply the resulting delta
//! only once every step has succeeded. Dropping the transaction discards
//! everything.

use std::collections::{BTreeMap, HashMap};

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::EngineError;

/// A single account's collateral deposits and minted debt
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPosition {
    /// Deposited collateral per asset, native units
    pub deposits: BTreeMap<Pubkey, u128>,
    /// Debt units minted against the collateral, 18 decimals
    pub dsc_minted: u128,
}

impl AccountPosition {
    pub fn collateral(&self, asset: &Pubkey) -> u128 {
        self.deposits.get(asset).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.dsc_minted == 0 && self.deposits.is_empty()
    }

    fn credit_collateral(&mut self, asset: &Pubkey, amount: u128) -> Result<(), EngineError> {
        let balance = self.deposits.entry(*asset).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        Ok(())
    }

    fn debit_collateral(&mut self, asset: &Pubkey, amount: u128) -> Result<(), EngineError> {
        let balance = self.collateral(asset);
        if amount > balance {
            return Err(EngineError::InsufficientCollateral);
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.deposits.remove(asset);
        } else {
            self.deposits.insert(*asset, remaining);
        }
        Ok(())
    }
}

/// The complete protocol ledger
///
/// Invariant: `total_dsc_minted` equals the sum of every position's
/// `dsc_minted`; the two are only ever mutated in lock-step through
/// `LedgerTxn`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub positions: HashMap<Pubkey, AccountPosition>,
    pub total_dsc_minted: u128,
}

impl LedgerState {
    pub fn position(&self, owner: &Pubkey) -> Option<&AccountPosition> {
        self.positions.get(owner)
    }

    pub fn collateral_of(&self, owner: &Pubkey, asset: &Pubkey) -> u128 {
        self.position(owner).map_or(0, |p| p.collateral(asset))
    }

    pub fn debt_of(&self, owner: &Pubkey) -> u128 {
        self.position(owner).map_or(0, |p| p.dsc_minted)
    }

    /// Recompute the supply invariant: true when the protocol total matches
    /// the per-account sum
    pub fn audit_supply(&self) -> bool {
        let mut sum: u128 = 0;
        for position in self.positions.values() {
            match sum.checked_add(position.dsc_minted) {
                Some(next) => sum = next,
                None => return false,
            }
        }
        sum == self.total_dsc_minted
    }
}

/// Copy-on-write overlay over a `LedgerState`
///
/// Reads fall through to the base state until an account is touched;
/// touched accounts are cloned into the overlay and mutated there.
pub struct LedgerTxn<'a> {
    base: &'a LedgerState,
    staged: HashMap<Pubkey, AccountPosition>,
    total_dsc_minted: u128,
}

impl<'a> LedgerTxn<'a> {
    pub fn begin(base: &'a LedgerState) -> Self {
        Self {
            base,
            staged: HashMap::new(),
            total_dsc_minted: base.total_dsc_minted,
        }
    }

    /// Staged-first read of a position
    pub fn position(&self, owner: &Pubkey) -> Option<&AccountPosition> {
        self.staged
            .get(owner)
            .or_else(|| self.base.positions.get(owner))
    }

    pub fn collateral_of(&self, owner: &Pubkey, asset: &Pubkey) -> u128 {
        self.position(owner).map_or(0, |p| p.collateral(asset))
    }

    pub fn debt_of(&self, owner: &Pubkey) -> u128 {
        self.position(owner).map_or(0, |p| p.dsc_minted)
    }

    pub fn total_dsc_minted(&self) -> u128 {
        self.total_dsc_minted
    }

    fn position_mut(&mut self, owner: &Pubkey) -> &mut AccountPosition {
        let base = self.base;
        self.staged
            .entry(*owner)
            .or_insert_with(|| base.positions.get(owner).cloned().unwrap_or_default())
    }

    pub fn credit_collateral(
        &mut self,
        owner: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.position_mut(owner).credit_collateral(asset, amount)
    }

    pub fn debit_collateral(
        &mut self,
        owner: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.position_mut(owner).debit_collateral(asset, amount)
    }

    /// Mint debt against an account; position and protocol total move in
    /// lock-step
    pub fn credit_debt(&mut self, owner: &Pubkey, amount: u128) -> Result<(), EngineError> {
        let new_total = self
            .total_dsc_minted
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        let position = self.position_mut(owner);
        position.dsc_minted = position
            .dsc_minted
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.total_dsc_minted = new_total;
        Ok(())
    }

    /// Retire debt, capped at what the account actually owes; returns the
    /// amount retired
    pub fn debit_debt_capped(
        &mut self,
        owner: &Pubkey,
        amount: u128,
    ) -> Result<u128, EngineError> {
        let position = self.position_mut(owner);
        let burned = amount.min(position.dsc_minted);
        position.dsc_minted -= burned;
        self.total_dsc_minted = self
            .total_dsc_minted
            .checked_sub(burned)
            .ok_or(EngineError::ArithmeticOverflow)?;
        Ok(burned)
    }

    /// Detach the staged mutations for commit
    pub fn into_delta(self) -> LedgerDelta {
        LedgerDelta {
            positions: self.staged,
            total_dsc_minted: self.total_dsc_minted,
        }
    }
}

/// The staged mutations of a completed operation
pub struct LedgerDelta {
    positions: HashMap<Pubkey, AccountPosition>,
    total_dsc_minted: u128,
}

impl LedgerDelta {
    /// Make the staged mutations visible
    pub fn apply(self, state: &mut LedgerState) {
        for (owner, position) in self.positions {
            if position.is_empty() {
                state.positions.remove(&owner);
            } else {
                state.positions.insert(owner, position);
            }
        }
        state.total_dsc_minted = self.total_dsc_minted;
    }
}
