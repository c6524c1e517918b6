//! Property-based tests for symbol handling and the trading-hours window.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use proptest::prelude::*;
use std::collections::HashSet;
use tickerwatch_core::config::{JobConfig, TickersConfig};
use tickerwatch_core::quotes::normalize_symbol;
use tickerwatch_core::scheduler::is_trading_hours;

// =============================================================================
// Generators
// =============================================================================

fn arb_symbol() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z][a-zA-Z0-9.]{0,5}[ ]{0,2}"
}

/// Any second of any day in 2024.
fn arb_datetime() -> impl Strategy<Value = chrono::NaiveDateTime> {
    (0u32..366, 0u32..86_400).prop_map(|(day, secs)| {
        let date = NaiveDate::from_yo_opt(2024, day + 1).unwrap();
        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
        date.and_time(time)
    })
}

/// 09:30:00, excluded.
const OPEN_BOUNDARY: u32 = 9 * 3600 + 30 * 60;
/// 09:30:01
const OPEN_FIRST_SECOND: u32 = OPEN_BOUNDARY + 1;
/// 16:00:00, excluded.
const CLOSE_BOUNDARY: u32 = 16 * 3600;
/// 15:59:59
const CLOSE_LAST_SECOND: u32 = CLOSE_BOUNDARY - 1;

/// Any Monday to Friday in 2024.
fn arb_weekday() -> impl Strategy<Value = NaiveDate> {
    (0u32..366)
        .prop_map(|day| NaiveDate::from_yo_opt(2024, day + 1).unwrap())
        .prop_filter("weekday", |d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}

fn at(secs: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in arb_symbol()) {
        let once = normalize_symbol(&raw).unwrap();
        prop_assert_eq!(normalize_symbol(&once), Some(once.clone()));
        prop_assert_eq!(once.trim(), once.as_str());
        prop_assert_eq!(once.to_uppercase(), once);
    }

    #[test]
    fn blank_symbols_never_normalize(raw in "[ \t]{0,6}") {
        prop_assert_eq!(normalize_symbol(&raw), None);
    }

    #[test]
    fn window_edges_are_exclusive(date in arb_weekday()) {
        prop_assert!(!is_trading_hours(date.and_hms_opt(9, 30, 0).unwrap()));
        prop_assert!(is_trading_hours(date.and_hms_opt(9, 30, 1).unwrap()));
        prop_assert!(is_trading_hours(date.and_hms_opt(15, 59, 59).unwrap()));
        prop_assert!(!is_trading_hours(date.and_hms_opt(16, 0, 0).unwrap()));
    }

    #[test]
    fn weekends_are_never_trading_hours(dt in arb_datetime()) {
        if matches!(dt.weekday(), Weekday::Sat | Weekday::Sun) {
            prop_assert!(!is_trading_hours(dt));
        }
    }

    #[test]
    fn weekday_seconds_inside_window_are_trading_hours(
        date in arb_weekday(),
        secs in OPEN_FIRST_SECOND..=CLOSE_LAST_SECOND,
    ) {
        prop_assert!(is_trading_hours(date.and_time(at(secs))));
    }

    #[test]
    fn weekday_seconds_outside_window_are_not_trading_hours(
        date in arb_weekday(),
        secs in prop_oneof![0u32..=OPEN_BOUNDARY, CLOSE_BOUNDARY..86_400],
    ) {
        prop_assert!(!is_trading_hours(date.and_time(at(secs))));
    }

    #[test]
    fn ticker_list_is_deduplicated_in_first_seen_order(
        raw in prop::collection::vec(arb_symbol(), 0..12)
    ) {
        let config = TickersConfig { tickers: raw.clone(), job: JobConfig::default() }
            .normalized()
            .unwrap();

        let unique: HashSet<&String> = config.tickers.iter().collect();
        prop_assert_eq!(unique.len(), config.tickers.len());

        let mut expected = Vec::new();
        for symbol in raw.iter().filter_map(|s| normalize_symbol(s)) {
            if !expected.contains(&symbol) {
                expected.push(symbol);
            }
        }
        prop_assert_eq!(config.tickers, expected);
    }
}
