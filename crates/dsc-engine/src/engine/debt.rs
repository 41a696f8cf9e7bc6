//! Debt issuance and retirement

use solana_program::pubkey::Pubkey;

use crate::error::{error_msg, EngineError};
use crate::events::{EngineEvent, EventSink};
use crate::ledger::LedgerTxn;
use crate::oracle::PriceOracle;
use crate::tokens::{CollateralGateway, DebtTokenGateway};

use super::DscEngine;

impl<O, C, D, E> DscEngine<O, C, D, E>
where
    O: PriceOracle,
    C: CollateralGateway,
    D: DebtTokenGateway,
    E: EventSink,
{
    /// Mint debt units against the caller's collateral
    pub fn mint_dsc(&self, caller: &Pubkey, amount: u128) -> Result<(), EngineError> {
        if amount == 0 {
            return error_msg(EngineError::ZeroAmount, "mint amount is zero");
        }

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        txn.credit_debt(caller, amount)?;
        self.assert_safe_staged(&txn, caller, "mint leaves caller under-collateralized")?;
        self.events.publish(&EngineEvent::DscMinted {
            account: *caller,
            amount,
        });
        self.issue_dsc(caller, amount)?;

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Retire debt units from the caller's own position
    ///
    /// Burning more than is owed caps at the outstanding amount and leaves
    /// the debt at exactly zero.
    pub fn burn_dsc(&self, caller: &Pubkey, amount: u128) -> Result<(), EngineError> {
        if amount == 0 {
            return error_msg(EngineError::ZeroAmount, "burn amount is zero");
        }

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        let burned = self.stage_burn(&mut txn, caller, caller, amount)?;
        self.assert_safe_staged(&txn, caller, "burn leaves caller under-collateralized")?;
        if burned > 0 {
            self.retire_dsc(caller, burned)?;
        }

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Deposit collateral and mint against it in one atomic operation
    pub fn deposit_collateral_and_mint_dsc(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        dsc_amount: u128,
    ) -> Result<(), EngineError> {
        if collateral_amount == 0 || dsc_amount == 0 {
            return error_msg(EngineError::ZeroAmount, "composite amount is zero");
        }
        self.registry.config(asset)?;

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        txn.credit_collateral(caller, asset, collateral_amount)?;
        self.events.publish(&EngineEvent::CollateralDeposited {
            account: *caller,
            asset: *asset,
            amount: collateral_amount,
        });
        txn.credit_debt(caller, dsc_amount)?;
        self.assert_safe_staged(&txn, caller, "mint leaves caller under-collateralized")?;
        self.events.publish(&EngineEvent::DscMinted {
            account: *caller,
            amount: dsc_amount,
        });

        self.pull_collateral(asset, caller, collateral_amount)?;
        self.issue_dsc(caller, dsc_amount)?;

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Burn debt and withdraw collateral in one atomic operation
    ///
    /// The burn is staged first so the withdrawal is judged against the
    /// already-reduced debt.
    pub fn redeem_collateral_for_dsc(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        dsc_amount: u128,
    ) -> Result<(), EngineError> {
        if collateral_amount == 0 || dsc_amount == 0 {
            return error_msg(EngineError::ZeroAmount, "composite amount is zero");
        }
        self.registry.config(asset)?;

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        let burned = self.stage_burn(&mut txn, caller, caller, dsc_amount)?;
        self.stage_redeem(&mut txn, caller, caller, asset, collateral_amount)?;
        self.assert_safe_staged(&txn, caller, "redemption leaves caller under-collateralized")?;

        if burned > 0 {
            self.retire_dsc(caller, burned)?;
        }
        self.release_collateral(asset, caller, collateral_amount)?;

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Stage a debt retirement on `account`, surrendered by `payer`
    ///
    /// Returns the amount actually retired after capping at the
    /// outstanding debt. A cap to zero stages nothing and emits nothing.
    pub(super) fn stage_burn(
        &self,
        txn: &mut LedgerTxn<'_>,
        account: &Pubkey,
        payer: &Pubkey,
        amount: u128,
    ) -> Result<u128, EngineError> {
        let burned = txn.debit_debt_capped(account, amount)?;
        if burned > 0 {
            self.events.publish(&EngineEvent::DscBurned {
                account: *account,
                payer: *payer,
                amount: burned,
            });
        }
        Ok(burned)
    }
}
