//! Liquidation of unhealthy positions

use solana_program::msg;
use solana_program::pubkey::Pubkey;

use crate::constants::{LIQUIDATION_BONUS_PCT, LIQUIDATION_PRECISION, MIN_HEALTH_FACTOR};
use crate::error::{error_msg, EngineError};
use crate::events::{EngineEvent, EventSink};
use crate::ledger::LedgerTxn;
use crate::math::mul_div_floor;
use crate::oracle::PriceOracle;
use crate::tokens::{CollateralGateway, DebtTokenGateway};
use crate::valuation;

use super::DscEngine;

impl<O, C, D, E> DscEngine<O, C, D, E>
where
    O: PriceOracle,
    C: CollateralGateway,
    D: DebtTokenGateway,
    E: EventSink,
{
    /// Close out part of an unhealthy position
    ///
    /// The liquidator surrenders up to `debt_to_cover` debt units against
    /// `target`'s debt and receives the equivalent collateral plus a 10%
    /// bonus. Covering the entire debt additionally sweeps the residual
    /// collateral in `asset` to the treasury. The whole operation either
    /// commits or leaves the ledger untouched.
    pub fn liquidate(
        &self,
        liquidator: &Pubkey,
        target: &Pubkey,
        asset: &Pubkey,
        debt_to_cover: u128,
    ) -> Result<(), EngineError> {
        if debt_to_cover == 0 {
            return error_msg(EngineError::ZeroAmount, "debt to cover is zero");
        }
        self.registry.config(asset)?;

        let mut state = self.lock();
        let mut txn = LedgerTxn::begin(&state);

        let starting_health = self.staged_health(&txn, target)?;
        if starting_health >= MIN_HEALTH_FACTOR {
            return error_msg(EngineError::PositionHealthy, "target position is healthy");
        }

        // A healthy check already rejected zero-debt targets, so the
        // clamped cover is always positive.
        let target_debt = txn.debt_of(target);
        let cover = debt_to_cover.min(target_debt);
        if cover < debt_to_cover {
            msg!("Debt to cover clamped to outstanding debt: {}", cover);
        }

        let base = valuation::asset_amount_from_usd(&self.registry, &self.oracle, asset, cover)?;
        let bonus = mul_div_floor(base, LIQUIDATION_BONUS_PCT, LIQUIDATION_PRECISION)?;
        let seized = base
            .checked_add(bonus)
            .ok_or(EngineError::ArithmeticOverflow)?;

        self.stage_redeem(&mut txn, target, liquidator, asset, seized)?;
        let repaid = self.stage_burn(&mut txn, target, liquidator, cover)?;

        // Full closure leaves no dust behind: whatever the bonus formula
        // stranded goes to the treasury, not the liquidator.
        let mut swept = 0u128;
        if cover == target_debt {
            swept = txn.collateral_of(target, asset);
            if swept > 0 {
                self.stage_redeem(&mut txn, target, &self.treasury, asset, swept)?;
                msg!("Residual collateral swept to treasury: {}", swept);
            }
        }

        let ending_health = self.staged_health(&txn, target)?;
        if ending_health <= starting_health {
            return error_msg(
                EngineError::HealthFactorNotImproved,
                "liquidation did not improve target health",
            );
        }
        self.assert_safe_staged(
            &txn,
            liquidator,
            "liquidation leaves liquidator under-collateralized",
        )?;

        self.events.publish(&EngineEvent::PositionLiquidated {
            liquidator: *liquidator,
            target: *target,
            asset: *asset,
            debt_repaid: repaid,
            collateral_seized: seized,
            starting_health,
            ending_health,
        });

        self.release_collateral(asset, liquidator, seized)?;
        self.retire_dsc(liquidator, repaid)?;
        if swept > 0 {
            self.release_collateral(asset, &self.treasury, swept)?;
        }

        let delta = txn.into_delta();
        delta.apply(&mut state);
        Ok(())
    }
}
