//! Engine orchestration
//!
//! One `DscEngine` owns the ledger and serializes every public operation
//! behind a single lock held for the operation's full duration. Operations
//! stage their ledger effects on a [`LedgerTxn`], publish events, run the
//! external token rails, and only then commit. Any early return discards
//! the staged effects whole.

mod collateral;
mod debt;
mod liquidation;

use std::sync::{Mutex, MutexGuard, PoisonError};

use solana_program::msg;
use solana_program::pubkey::Pubkey;

use crate::error::EngineError;
use crate::events::EventSink;
use crate::health::{health_factor, position_health};
use crate::ledger::{AccountPosition, LedgerState, LedgerTxn};
use crate::oracle::PriceOracle;
use crate::registry::CollateralRegistry;
use crate::tokens::{CollateralGateway, DebtTokenGateway};
use crate::valuation;

/// The over-collateralization engine
///
/// Generic over its price oracle, token rails and event sink so hosts can
/// wire in live adapters or the in-memory doubles from [`crate::testing`].
pub struct DscEngine<O, C, D, E>
where
    O: PriceOracle,
    C: CollateralGateway,
    D: DebtTokenGateway,
    E: EventSink,
{
    registry: CollateralRegistry,
    treasury: Pubkey,
    oracle: O,
    collateral: C,
    debt_token: D,
    events: E,
    ledger: Mutex<LedgerState>,
}

impl<O, C, D, E> DscEngine<O, C, D, E>
where
    O: PriceOracle,
    C: CollateralGateway,
    D: DebtTokenGateway,
    E: EventSink,
{
    /// Build an engine with an empty ledger
    pub fn new(
        registry: CollateralRegistry,
        treasury: Pubkey,
        oracle: O,
        collateral: C,
        debt_token: D,
        events: E,
    ) -> Self {
        Self {
            registry,
            treasury,
            oracle,
            collateral,
            debt_token,
            events,
            ledger: Mutex::new(LedgerState::default()),
        }
    }

    /// Account that receives residual collateral from full liquidations
    pub fn treasury(&self) -> Pubkey {
        self.treasury
    }

    /// Approved collateral assets, in registration order
    pub fn approved_collateral(&self) -> Vec<Pubkey> {
        self.registry
            .configs()
            .iter()
            .map(|config| config.asset)
            .collect()
    }

    /// Price feed backing an approved asset
    pub fn price_feed_of(&self, asset: &Pubkey) -> Result<Pubkey, EngineError> {
        Ok(self.registry.config(asset)?.feed)
    }

    /// Amount of `asset` currently deposited by `account`
    pub fn collateral_deposited(&self, account: &Pubkey, asset: &Pubkey) -> u128 {
        self.lock().collateral_of(account, asset)
    }

    /// Outstanding debt units of `account`
    pub fn dsc_minted_of(&self, account: &Pubkey) -> u128 {
        self.lock().debt_of(account)
    }

    /// Debt units outstanding across every account
    pub fn total_dsc_minted(&self) -> u128 {
        self.lock().total_dsc_minted
    }

    /// 18-decimal USD value of everything `account` has deposited
    pub fn account_collateral_value_usd(&self, account: &Pubkey) -> Result<u128, EngineError> {
        let state = self.lock();
        let empty = AccountPosition::default();
        let position = state.position(account).unwrap_or(&empty);
        valuation::portfolio_value_usd(&self.registry, &self.oracle, position)
    }

    /// Debt units and collateral value of `account`, in one consistent read
    pub fn account_info(&self, account: &Pubkey) -> Result<(u128, u128), EngineError> {
        let state = self.lock();
        let empty = AccountPosition::default();
        let position = state.position(account).unwrap_or(&empty);
        let value = valuation::portfolio_value_usd(&self.registry, &self.oracle, position)?;
        Ok((position.dsc_minted, value))
    }

    /// Health factor of `account` at fresh oracle quotes
    pub fn health_factor_of(&self, account: &Pubkey) -> Result<u128, EngineError> {
        let state = self.lock();
        let empty = AccountPosition::default();
        let position = state.position(account).unwrap_or(&empty);
        position_health(&self.registry, &self.oracle, position)
    }

    /// Convert an 18-decimal USD value into native units of `asset`
    pub fn collateral_amount_from_usd(
        &self,
        asset: &Pubkey,
        usd_value: u128,
    ) -> Result<u128, EngineError> {
        valuation::asset_amount_from_usd(&self.registry, &self.oracle, asset, usd_value)
    }

    /// Check that per-account debt sums to the tracked total supply
    pub fn audit_supply(&self) -> bool {
        self.lock().audit_supply()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Health factor of `account` as staged in `txn`
    fn staged_health(
        &self,
        txn: &LedgerTxn<'_>,
        account: &Pubkey,
    ) -> Result<u128, EngineError> {
        let empty = AccountPosition::default();
        let position = txn.position(account).unwrap_or(&empty);
        let value = valuation::portfolio_value_usd(&self.registry, &self.oracle, position)?;
        health_factor(value, position.dsc_minted)
    }

    fn assert_safe_staged(
        &self,
        txn: &LedgerTxn<'_>,
        account: &Pubkey,
        context: &str,
    ) -> Result<(), EngineError> {
        let health = self.staged_health(txn, account)?;
        crate::health::assert_safe(health, context)
    }

    fn pull_collateral(
        &self,
        asset: &Pubkey,
        from: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.collateral.pull(asset, from, amount).map_err(|source| {
            msg!("Collateral pull failed: {}", source);
            EngineError::AssetTransferFailed
        })
    }

    fn release_collateral(
        &self,
        asset: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.collateral.release(asset, to, amount).map_err(|source| {
            msg!("Collateral release failed: {}", source);
            EngineError::AssetTransferFailed
        })
    }

    fn issue_dsc(&self, to: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.debt_token.mint_to(to, amount).map_err(|source| {
            msg!("Debt token issuance failed: {}", source);
            EngineError::IssuanceFailed
        })
    }

    // A failed burn is a failed pull from the payer's wallet
    fn retire_dsc(&self, from: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.debt_token.burn_from(from, amount).map_err(|source| {
            msg!("Debt token burn failed: {}", source);
            EngineError::AssetTransferFailed
        })
    }
}
