//! In-memory doubles for exercising the engine without live adapters
//!
//! These live in the library proper (not behind `cfg(test)`) so host crates
//! can drive the engine in their own test suites. All three use interior
//! mutability and are shared with the engine through `Arc`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

use crate::error::EngineError;
use crate::events::{EngineEvent, EventSink};
use crate::oracle::{PriceOracle, PriceQuote};
use crate::tokens::{CollateralGateway, DebtTokenGateway};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Oracle serving fixed quotes set by the test
#[derive(Default)]
pub struct StaticOracle {
    quotes: Mutex<HashMap<Pubkey, PriceQuote>>,
    stale: Mutex<bool>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the quote a feed reports
    pub fn set_price(&self, feed: Pubkey, price: i64, expo: i32) {
        lock(&self.quotes).insert(feed, PriceQuote::new(price, expo));
    }

    /// Make every subsequent read fail with `StalePrice`
    pub fn mark_stale(&self, stale: bool) {
        *lock(&self.stale) = stale;
    }
}

impl PriceOracle for StaticOracle {
    fn latest_quote(&self, feed: &Pubkey) -> Result<PriceQuote, EngineError> {
        if *lock(&self.stale) {
            return Err(EngineError::StalePrice);
        }
        lock(&self.quotes)
            .get(feed)
            .copied()
            .ok_or(EngineError::InvalidPrice)
    }
}

/// Token rails backed by plain balance maps, with switchable failure
/// injection on each rail
#[derive(Default)]
pub struct MemoryBank {
    collateral: Mutex<HashMap<(Pubkey, Pubkey), u128>>,
    dsc: Mutex<HashMap<Pubkey, u128>>,
    fail_collateral: Mutex<bool>,
    fail_dsc: Mutex<bool>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a holder's external wallet with collateral
    pub fn fund_collateral(&self, asset: Pubkey, holder: Pubkey, amount: u128) {
        *lock(&self.collateral).entry((asset, holder)).or_insert(0) += amount;
    }

    /// Collateral sitting in a holder's external wallet
    pub fn collateral_balance(&self, asset: &Pubkey, holder: &Pubkey) -> u128 {
        lock(&self.collateral)
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or(0)
    }

    /// Debt tokens sitting in a holder's external wallet
    pub fn dsc_balance(&self, holder: &Pubkey) -> u128 {
        lock(&self.dsc).get(holder).copied().unwrap_or(0)
    }

    /// Make every subsequent collateral pull or release fail
    pub fn fail_collateral_rail(&self, fail: bool) {
        *lock(&self.fail_collateral) = fail;
    }

    /// Make every subsequent debt-token mint or burn fail
    pub fn fail_dsc_rail(&self, fail: bool) {
        *lock(&self.fail_dsc) = fail;
    }
}

impl CollateralGateway for MemoryBank {
    fn pull(&self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if *lock(&self.fail_collateral) {
            return Err(ProgramError::Custom(77));
        }
        let mut balances = lock(&self.collateral);
        let balance = balances.entry((*asset, *from)).or_insert(0);
        if *balance < amount {
            return Err(ProgramError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(())
    }

    fn release(&self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if *lock(&self.fail_collateral) {
            return Err(ProgramError::Custom(77));
        }
        let mut balances = lock(&self.collateral);
        let balance = balances.entry((*asset, *to)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl DebtTokenGateway for MemoryBank {
    fn mint_to(&self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if *lock(&self.fail_dsc) {
            return Err(ProgramError::Custom(78));
        }
        let mut balances = lock(&self.dsc);
        let balance = balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }

    fn burn_from(&self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if *lock(&self.fail_dsc) {
            return Err(ProgramError::Custom(78));
        }
        let mut balances = lock(&self.dsc);
        let balance = balances.entry(*from).or_insert(0);
        if *balance < amount {
            return Err(ProgramError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(())
    }
}

/// Sink that records published events for later assertions
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far
    pub fn take(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    /// Copy of the recorded events, oldest first
    pub fn snapshot(&self) -> Vec<EngineEvent> {
        lock(&self.events).clone()
    }

    /// Number of recorded events with the given [`EngineEvent::kind`]
    pub fn count_of(&self, kind: &str) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }
}

impl EventSink for RecordingEvents {
    fn publish(&self, event: &EngineEvent) {
        lock(&self.events).push(event.clone());
    }
}
