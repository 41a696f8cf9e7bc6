//! Collateral deposit and redemption

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
    /// Deposit approved collateral into the caller's position
    ///
    /// Depositing never lowers a health factor, so no health check is run.
    pub fn deposit_collateral(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return error_msg(EngineError::ZeroAmount, "deposit amount is zero");
        }
        self.registry.config(asset)?;

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        txn.credit_collateral(caller, asset, amount)?;
        self.events.publish(&EngineEvent::CollateralDeposited {
            account: *caller,
            asset: *asset,
            amount,
        });
        self.pull_collateral(asset, caller, amount)?;

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Withdraw collateral from the caller's own position
    ///
    /// Fails with `HealthFactorBroken` before any tokens move if the
    /// withdrawal would leave the caller under-collateralized.
    pub fn redeem_collateral(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return error_msg(EngineError::ZeroAmount, "redeem amount is zero");
        }
        self.registry.config(asset)?;

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);
        self.stage_redeem(&mut txn, caller, caller, asset, amount)?;
        self.assert_safe_staged(&txn, caller, "redemption leaves caller under-collateralized")?;
        self.release_collateral(asset, caller, amount)?;

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }

    /// Stage a collateral debit from `from` destined for `to`'s wallet
    ///
    /// Publishes the redemption event; the actual release runs after the
    /// calling operation has passed its health checks.
    pub(super) fn stage_redeem(
        &self,
        txn: &mut LedgerTxn<'_>,
        from: &Pubkey,
        to: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        txn.debit_collateral(from, asset, amount)?;
        self.events.publish(&EngineEvent::CollateralRedeemed {
            from: *from,
            to: *to,
            asset: *asset,
            amount,
        });
        Ok(())
    }
}
