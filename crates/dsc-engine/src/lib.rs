//! Over-collateralized synthetic-dollar engine
//!
//! `dsc-engine` keeps per-account collateral and debt positions, values
//! collateral through injected price feeds, and enforces a minimum health
//! factor on every state transition. Debt units are only ever issued
//! against at least twice their value in collateral; positions that fall
//! under the threshold can be closed by third-party liquidators for a
//! collateral bonus.
//!
//! The engine is host-embeddable. A host wires in four adapters (price
//! oracle, collateral rail, debt-token rail, event sink) and drives the
//! public operations on [`DscEngine`]. Ledger effects of each operation
//! are staged and committed atomically; any failure leaves the ledger
//! exactly as it was.

pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod health;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod registry;
pub mod testing;
pub mod tokens;
pub mod valuation;

pub use crate::engine::DscEngine;
pub use crate::error::EngineError;
pub use crate::events::{EngineEvent, EventSink, LogEventSink};
pub use crate::ledger::{AccountPosition, LedgerState};
pub use crate::oracle::{PriceOracle, PriceQuote};
pub use crate::registry::{CollateralConfig, CollateralRegistry};
pub use crate::tokens::{CollateralGateway, DebtTokenGateway};
