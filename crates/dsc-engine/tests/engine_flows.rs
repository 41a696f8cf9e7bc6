//! End-to-end flows for deposit, mint, burn and redeem

use std::sync::Arc;

use solana_program::pubkey::Pubkey;

use dsc_engine::constants::{MAX_HEALTH_FACTOR, PRECISION};
use dsc_engine::testing::{MemoryBank, RecordingEvents, StaticOracle};
use dsc_engine::{CollateralRegistry, DscEngine, EngineError, EngineEvent};

const ETH: Pubkey = Pubkey::new_from_array([1; 32]);
const ETH_FEED: Pubkey = Pubkey::new_from_array([11; 32]);
const BTC: Pubkey = Pubkey::new_from_array([2; 32]);
const BTC_FEED: Pubkey = Pubkey::new_from_array([22; 32]);
const TREASURY: Pubkey = Pubkey::new_from_array([99; 32]);
const ALICE: Pubkey = Pubkey::new_from_array([101; 32]);
const BOB: Pubkey = Pubkey::new_from_array([102; 32]);

type TestEngine =
    DscEngine<Arc<StaticOracle>, Arc<MemoryBank>, Arc<MemoryBank>, Arc<RecordingEvents>>;

struct Harness {
    engine: TestEngine,
    oracle: Arc<StaticOracle>,
    bank: Arc<MemoryBank>,
    events: Arc<RecordingEvents>,
}

/// ETH at 3000 USD (18 decimals), BTC at 90000 USD (8 decimals)
fn harness() -> Harness {
    let registry =
        CollateralRegistry::new(&[ETH, BTC], &[ETH_FEED, BTC_FEED], &[18, 8]).unwrap();
    let oracle = Arc::new(StaticOracle::new());
    oracle.set_price(ETH_FEED, 300_000_000_000, -8);
    oracle.set_price(BTC_FEED, 9_000_000_000_000, -8);
    let bank = Arc::new(MemoryBank::new());
    let events = Arc::new(RecordingEvents::new());
    let engine = DscEngine::new(
        registry,
        TREASURY,
        Arc::clone(&oracle),
        Arc::clone(&bank),
        Arc::clone(&bank),
        Arc::clone(&events),
    );
    Harness {
        engine,
        oracle,
        bank,
        events,
    }
}

#[test]
fn test_deposit_tracks_ledger_and_wallet() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 20 * PRECISION);

    h.engine.deposit_collateral(&ALICE, &ETH, 5 * PRECISION).unwrap();
    h.engine.deposit_collateral(&ALICE, &ETH, 10 * PRECISION).unwrap();

    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 15 * PRECISION);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), 5 * PRECISION);
    assert_eq!(
        h.engine.account_collateral_value_usd(&ALICE).unwrap(),
        45_000 * PRECISION
    );
    assert_eq!(h.events.count_of("CollateralDeposited"), 2);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_low_decimal_collateral_valuation() {
    let h = harness();
    h.bank.fund_collateral(BTC, ALICE, 50_000_000);

    // 0.5 BTC at 90000 USD
    h.engine.deposit_collateral(&ALICE, &BTC, 50_000_000).unwrap();
    assert_eq!(
        h.engine.account_collateral_value_usd(&ALICE).unwrap(),
        45_000 * PRECISION
    );
}

#[test]
fn test_deposit_rejections() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);

    assert_eq!(
        h.engine.deposit_collateral(&ALICE, &ETH, 0),
        Err(EngineError::ZeroAmount)
    );
    let unknown = Pubkey::new_from_array([7; 32]);
    assert_eq!(
        h.engine.deposit_collateral(&ALICE, &unknown, 1),
        Err(EngineError::UnsupportedAsset)
    );
    assert_eq!(h.events.count_of("CollateralDeposited"), 0);
}

#[test]
fn test_deposit_rolls_back_when_pull_fails() {
    let h = harness();
    // Alice's wallet holds less than she tries to deposit
    h.bank.fund_collateral(ETH, ALICE, PRECISION);

    assert_eq!(
        h.engine.deposit_collateral(&ALICE, &ETH, 2 * PRECISION),
        Err(EngineError::AssetTransferFailed)
    );
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 0);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), PRECISION);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_mint_issues_and_notifies_once() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();
    h.events.take();

    h.engine.mint_dsc(&ALICE, 100 * PRECISION).unwrap();

    assert_eq!(h.engine.dsc_minted_of(&ALICE), 100 * PRECISION);
    assert_eq!(h.engine.total_dsc_minted(), 100 * PRECISION);
    assert_eq!(h.bank.dsc_balance(&ALICE), 100 * PRECISION);
    assert_eq!(
        h.engine.account_info(&ALICE).unwrap(),
        (100 * PRECISION, 45_000 * PRECISION)
    );
    // 45000 USD of collateral against 100 debt units: health 225.0
    assert_eq!(
        h.engine.health_factor_of(&ALICE).unwrap(),
        225 * PRECISION
    );

    let events = h.events.take();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        EngineEvent::DscMinted {
            account: ALICE,
            amount: 100 * PRECISION,
        }
    );
    assert!(h.engine.audit_supply());
}

#[test]
fn test_mint_maximum_amount_fully_rolls_back() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();

    assert_eq!(
        h.engine.mint_dsc(&ALICE, u128::MAX),
        Err(EngineError::HealthFactorBroken)
    );

    assert_eq!(h.engine.dsc_minted_of(&ALICE), 0);
    assert_eq!(h.engine.total_dsc_minted(), 0);
    assert_eq!(h.bank.dsc_balance(&ALICE), 0);
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 15 * PRECISION);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_mint_without_collateral_is_rejected() {
    let h = harness();
    assert_eq!(
        h.engine.mint_dsc(&ALICE, PRECISION),
        Err(EngineError::HealthFactorBroken)
    );
    assert_eq!(h.engine.mint_dsc(&ALICE, 0), Err(EngineError::ZeroAmount));
}

#[test]
fn test_mint_boundary_at_half_collateral_value() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, PRECISION).unwrap();

    // 3000 USD of collateral supports exactly 1500 debt units
    h.engine.mint_dsc(&ALICE, 1_500 * PRECISION).unwrap();
    assert_eq!(
        h.engine.health_factor_of(&ALICE).unwrap(),
        PRECISION
    );
    // One more unit breaks the minimum
    assert_eq!(
        h.engine.mint_dsc(&ALICE, 1),
        Err(EngineError::HealthFactorBroken)
    );
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 1_500 * PRECISION);
}

#[test]
fn test_issuance_failure_rolls_back_mint() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();

    h.bank.fail_dsc_rail(true);
    assert_eq!(
        h.engine.mint_dsc(&ALICE, 100 * PRECISION),
        Err(EngineError::IssuanceFailed)
    );
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 0);
    assert_eq!(h.engine.total_dsc_minted(), 0);

    h.bank.fail_dsc_rail(false);
    h.engine.mint_dsc(&ALICE, 100 * PRECISION).unwrap();
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 100 * PRECISION);
}

#[test]
fn test_burn_caps_at_outstanding_debt() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();
    h.engine.mint_dsc(&ALICE, 50 * PRECISION).unwrap();
    h.events.take();

    // Requesting double the outstanding amount retires exactly what is owed
    h.engine.burn_dsc(&ALICE, 100 * PRECISION).unwrap();

    assert_eq!(h.engine.dsc_minted_of(&ALICE), 0);
    assert_eq!(h.engine.total_dsc_minted(), 0);
    assert_eq!(h.bank.dsc_balance(&ALICE), 0);
    assert_eq!(h.engine.health_factor_of(&ALICE).unwrap(), MAX_HEALTH_FACTOR);

    let events = h.events.take();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        EngineEvent::DscBurned {
            account: ALICE,
            payer: ALICE,
            amount: 50 * PRECISION,
        }
    );
}

#[test]
fn test_burn_with_no_debt_is_a_no_op() {
    let h = harness();
    h.engine.burn_dsc(&BOB, 5 * PRECISION).unwrap();
    assert_eq!(h.engine.dsc_minted_of(&BOB), 0);
    assert_eq!(h.events.count_of("DscBurned"), 0);
    assert_eq!(h.engine.burn_dsc(&BOB, 0), Err(EngineError::ZeroAmount));
}

#[test]
fn test_redeem_round_trip_restores_wallet() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 20 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();
    h.events.take();

    h.engine.redeem_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();

    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 0);
    assert_eq!(h.engine.account_collateral_value_usd(&ALICE).unwrap(), 0);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), 20 * PRECISION);

    let events = h.events.take();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        EngineEvent::CollateralRedeemed {
            from: ALICE,
            to: ALICE,
            asset: ETH,
            amount: 15 * PRECISION,
        }
    );
}

#[test]
fn test_redeem_blocked_when_it_breaks_health() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();
    h.engine.mint_dsc(&ALICE, 20_000 * PRECISION).unwrap();

    // Dropping to 5 ETH would leave 7500 USD of adjusted collateral
    // against 20000 debt units
    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &ETH, 10 * PRECISION),
        Err(EngineError::HealthFactorBroken)
    );
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 15 * PRECISION);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), 0);
}

#[test]
fn test_redeem_rejections() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, PRECISION).unwrap();

    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &ETH, 0),
        Err(EngineError::ZeroAmount)
    );
    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &ETH, 2 * PRECISION),
        Err(EngineError::InsufficientCollateral)
    );
    let unknown = Pubkey::new_from_array([7; 32]);
    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &unknown, 1),
        Err(EngineError::UnsupportedAsset)
    );
}

#[test]
fn test_stale_price_aborts_valuation_paths() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine.deposit_collateral(&ALICE, &ETH, 15 * PRECISION).unwrap();

    h.oracle.mark_stale(true);
    assert_eq!(
        h.engine.mint_dsc(&ALICE, PRECISION),
        Err(EngineError::StalePrice)
    );
    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &ETH, PRECISION),
        Err(EngineError::StalePrice)
    );
    assert_eq!(
        h.engine.health_factor_of(&ALICE),
        Err(EngineError::StalePrice)
    );
    // Deposits never consult the oracle
    h.bank.fund_collateral(ETH, BOB, PRECISION);
    h.engine.deposit_collateral(&BOB, &ETH, PRECISION).unwrap();

    h.oracle.mark_stale(false);
    h.engine.mint_dsc(&ALICE, PRECISION).unwrap();
    assert_eq!(h.engine.dsc_minted_of(&ALICE), PRECISION);
}

#[test]
fn test_composite_deposit_and_mint() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);

    h.engine
        .deposit_collateral_and_mint_dsc(&ALICE, &ETH, PRECISION, 1_000 * PRECISION)
        .unwrap();

    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), PRECISION);
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 1_000 * PRECISION);
    assert_eq!(h.bank.dsc_balance(&ALICE), 1_000 * PRECISION);

    let events = h.events.take();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], EngineEvent::CollateralDeposited { .. }));
    assert!(matches!(events[1], EngineEvent::DscMinted { .. }));
}

#[test]
fn test_composite_deposit_and_mint_is_all_or_nothing() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);

    // The deposit alone would succeed; the mint leg is too large, so
    // neither side may persist
    assert_eq!(
        h.engine.deposit_collateral_and_mint_dsc(&ALICE, &ETH, PRECISION, 1_600 * PRECISION),
        Err(EngineError::HealthFactorBroken)
    );
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 0);
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 0);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), PRECISION);
    assert_eq!(h.bank.dsc_balance(&ALICE), 0);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_composite_redeem_burns_before_withdrawing() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, 15 * PRECISION);
    h.engine
        .deposit_collateral_and_mint_dsc(&ALICE, &ETH, 15 * PRECISION, 20_000 * PRECISION)
        .unwrap();

    // Withdrawing 10 ETH alone is rejected against the full debt
    assert_eq!(
        h.engine.redeem_collateral(&ALICE, &ETH, 10 * PRECISION),
        Err(EngineError::HealthFactorBroken)
    );

    // Surrendering 18000 debt units first makes the same withdrawal safe
    h.engine
        .redeem_collateral_for_dsc(&ALICE, &ETH, 10 * PRECISION, 18_000 * PRECISION)
        .unwrap();

    assert_eq!(h.engine.dsc_minted_of(&ALICE), 2_000 * PRECISION);
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 5 * PRECISION);
    assert_eq!(h.bank.dsc_balance(&ALICE), 2_000 * PRECISION);
    assert_eq!(h.bank.collateral_balance(&ETH, &ALICE), 10 * PRECISION);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_getters_reflect_registry() {
    let h = harness();
    assert_eq!(h.engine.approved_collateral(), vec![ETH, BTC]);
    assert_eq!(h.engine.price_feed_of(&ETH).unwrap(), ETH_FEED);
    assert_eq!(h.engine.price_feed_of(&BTC).unwrap(), BTC_FEED);
    let unknown = Pubkey::new_from_array([7; 32]);
    assert_eq!(
        h.engine.price_feed_of(&unknown),
        Err(EngineError::UnsupportedAsset)
    );
    assert_eq!(h.engine.treasury(), TREASURY);

    // 100 USD at 3000 USD per ETH
    assert_eq!(
        h.engine
            .collateral_amount_from_usd(&ETH, 100 * PRECISION)
            .unwrap(),
        PRECISION / 30
    );
}

#[test]
fn test_empty_account_reads() {
    let h = harness();
    assert_eq!(h.engine.account_info(&ALICE).unwrap(), (0, 0));
    assert_eq!(h.engine.health_factor_of(&ALICE).unwrap(), MAX_HEALTH_FACTOR);
    assert_eq!(h.engine.collateral_deposited(&ALICE, &ETH), 0);
    assert_eq!(h.engine.dsc_minted_of(&ALICE), 0);
    assert_eq!(h.engine.total_dsc_minted(), 0);
    assert!(h.engine.audit_supply());
}

#[test]
fn test_total_supply_tracks_many_accounts() {
    let h = harness();
    h.bank.fund_collateral(ETH, ALICE, PRECISION);
    h.bank.fund_collateral(BTC, BOB, 50_000_000);

    h.engine
        .deposit_collateral_and_mint_dsc(&ALICE, &ETH, PRECISION, 1_000 * PRECISION)
        .unwrap();
    h.engine
        .deposit_collateral_and_mint_dsc(&BOB, &BTC, 50_000_000, 9_000 * PRECISION)
        .unwrap();

    assert_eq!(h.engine.total_dsc_minted(), 10_000 * PRECISION);
    h.engine.burn_dsc(&BOB, 4_000 * PRECISION).unwrap();
    assert_eq!(h.engine.total_dsc_minted(), 6_000 * PRECISION);
    assert!(h.engine.audit_supply());
}
