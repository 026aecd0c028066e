//! Property tests for the simulation core's invariants.

use chrono::{DateTime, Duration, Utc};
use coinlab_core::broker::{Broker, ExecutionConfig};
use coinlab_core::domain::{Candle, Direction, Fill, Order, OrderType, Series};
use coinlab_core::portfolio::Portfolio;
use coinlab_core::refinery::clean_candles;
use coinlab_core::sizer::fixed_fractional;
use proptest::prelude::*;
use std::collections::HashMap;

fn base_time() -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

fn candle_at(hour_offset: i64, price: f64) -> Candle {
    Candle {
        timestamp: base_time() + Duration::hours(hour_offset),
        open: price,
        high: price * 1.01,
        low: price * 0.99,
        close: price,
        volume: 1_000.0,
    }
}

proptest! {
    /// The sizer risks exactly the configured fraction of equity.
    #[test]
    fn sizer_risks_the_configured_fraction(
        equity in 1_000.0..1_000_000.0f64,
        risk_pct in 0.1..5.0f64,
        entry in 1.0..50_000.0f64,
        distance in 0.01..100.0f64,
    ) {
        let stop = entry - distance;
        let quantity = fixed_fractional(equity, risk_pct, entry, stop).unwrap();
        prop_assert!(quantity > 0.0);
        let risked = quantity * (entry - stop).abs();
        prop_assert!((risked - equity * risk_pct / 100.0).abs() < 1e-6 * equity);
    }

    /// Cleaning always yields strictly increasing, unique timestamps and
    /// keeps the first occurrence of any duplicated timestamp.
    #[test]
    fn cleaning_yields_strictly_increasing_timestamps(
        offsets in prop::collection::vec(0i64..48, 1..80),
    ) {
        let rows: Vec<Candle> = offsets
            .iter()
            .enumerate()
            .map(|(i, &off)| candle_at(off, 100.0 + i as f64))
            .collect();
        let first_price_per_offset: HashMap<i64, f64> = {
            let mut map = HashMap::new();
            for (i, &off) in offsets.iter().enumerate() {
                map.entry(off).or_insert(100.0 + i as f64);
            }
            map
        };

        let (cleaned, duplicates) = clean_candles(rows);

        prop_assert_eq!(cleaned.len() + duplicates, offsets.len());
        prop_assert!(cleaned.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        for candle in &cleaned {
            let offset = (candle.timestamp - base_time()).num_hours();
            prop_assert_eq!(candle.open, first_price_per_offset[&offset]);
        }
    }

    /// A fill always lands exactly one candle after its signal candle.
    #[test]
    fn fills_never_precede_their_signal_candle(
        (len, signal_index) in (3usize..60).prop_flat_map(|len| (Just(len), 0..len - 1)),
        seed in any::<u64>(),
    ) {
        let candles: Vec<Candle> = (0..len)
            .map(|i| candle_at(i as i64, 100.0 + (i % 7) as f64))
            .collect();
        let series = Series::new("BTC/USDT", "1h", candles);
        let signal_ts = series.candles()[signal_index].timestamp;

        let mut broker = Broker::from_seed(ExecutionConfig::default(), seed);
        let order = Order {
            timestamp: signal_ts,
            symbol: "BTC/USDT".into(),
            direction: Direction::Buy,
            quantity: 1.0,
            order_type: OrderType::Market,
        };
        let fill = broker.execute(&order, &series, signal_ts).unwrap();

        prop_assert!(fill.timestamp > signal_ts);
        prop_assert_eq!(fill.timestamp, series.candles()[signal_index + 1].timestamp);
    }

    /// After any alternating open/close fill sequence plus a mark-to-market,
    /// the accounting identity holds: equity == cash + open market values.
    #[test]
    fn equity_identity_after_arbitrary_fills(
        fills in prop::collection::vec((1.0..1_000.0f64, 0.01..10.0f64, 0.0..5.0f64), 1..40),
    ) {
        let mut portfolio = Portfolio::new(100_000.0, 1.0);
        let mut last_price = 0.0;

        for (i, (price, quantity, commission)) in fills.iter().enumerate() {
            // Even fills open, odd fills close the single symbol.
            let direction = if i % 2 == 0 { Direction::Buy } else { Direction::Sell };
            portfolio.on_fill(&Fill {
                timestamp: base_time() + Duration::hours(i as i64),
                symbol: "BTC/USDT".into(),
                direction,
                quantity: *quantity,
                fill_price: *price,
                commission: *commission,
            });
            last_price = *price;
        }

        let timestamp = base_time() + Duration::hours(fills.len() as i64);
        let prices = HashMap::from([("BTC/USDT".to_string(), last_price)]);
        portfolio.on_candle(timestamp, &prices);

        let open_value: f64 = portfolio
            .open_positions()
            .values()
            .map(|p| p.quantity * last_price)
            .sum();
        prop_assert!((portfolio.total_equity() - (portfolio.cash() + open_value)).abs() < 1e-6);
    }
}
