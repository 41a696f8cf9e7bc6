//! Engine event notifications
//!
//! Events describe ledger effects the engine intends to commit. They are
//! published before external token rails run, so a consumer replaying the
//! log must pair each event with a successful operation.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::msg;
use solana_program::pubkey::Pubkey;

/// Everything observable the engine does
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// Collateral entered an account's position
    CollateralDeposited {
        account: Pubkey,
        asset: Pubkey,
        amount: u128,
    },
    /// Collateral left a position, paid out to `to`
    CollateralRedeemed {
        from: Pubkey,
        to: Pubkey,
        asset: Pubkey,
        amount: u128,
    },
    /// New debt units issued to an account
    DscMinted { account: Pubkey, amount: u128 },
    /// Debt units retired from `account`, surrendered by `payer`
    DscBurned {
        account: Pubkey,
        payer: Pubkey,
        amount: u128,
    },
    /// An unhealthy position was partially or fully closed
    PositionLiquidated {
        liquidator: Pubkey,
        target: Pubkey,
        asset: Pubkey,
        debt_repaid: u128,
        collateral_seized: u128,
        starting_health: u128,
        ending_health: u128,
    },
}

impl EngineEvent {
    /// Short name used on log lines
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::CollateralDeposited { .. } => "CollateralDeposited",
            EngineEvent::CollateralRedeemed { .. } => "CollateralRedeemed",
            EngineEvent::DscMinted { .. } => "DscMinted",
            EngineEvent::DscBurned { .. } => "DscBurned",
            EngineEvent::PositionLiquidated { .. } => "PositionLiquidated",
        }
    }
}

/// Event consumer injected into the engine
pub trait EventSink {
    fn publish(&self, event: &EngineEvent);
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn publish(&self, event: &EngineEvent) {
        (**self).publish(event)
    }
}

/// Sink that writes events to the program log, payload bs58-encoded for
/// off-chain indexers
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &EngineEvent) {
        msg!("DSC_ENGINE_EVENT");
        msg!("TYPE:{}", event.kind());
        if let Ok(data) = event.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}
