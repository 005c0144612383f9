//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. EMA bounds: seeded at the first close, never outside the running range,
//!    exactly constant over constant closes
//! 2. Event uniqueness: strictly increasing dates, one direction per index
//! 3. Alternation: same-direction neighbours are separated by a run break
//! 4. Determinism: identical inputs give identical events
//! 5. Window monotonicity: larger k never fires more or earlier
//! 6. Forecast ordering: lower <= point <= upper for every interval

use chrono::NaiveDate;
use proptest::prelude::*;
use trendcast_core::domain::{PricePoint, PriceSeries, SignalDirection, SignalEvent};
use trendcast_core::forecast::adapter::enforce_ordering;
use trendcast_core::forecast::{ForecastAdapter, ForecastMethod, PredictionRow};
use trendcast_core::indicators::{smooth_all, Ema, Indicator};
use trendcast_core::signals::{CrossoverDetector, Relation};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
        min_len..150,
    )
}

/// Distinct fast < slow spans.
fn arb_spans() -> impl Strategy<Value = (usize, usize)> {
    (1usize..10).prop_flat_map(|fast| (Just(fast), fast + 1..30))
}

fn series_from(closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(base + chrono::Duration::days(i as i64), c))
        .collect();
    PriceSeries::new("PROP", points).unwrap()
}

fn detect(closes: &[f64], fast: usize, slow: usize, k: usize) -> Vec<SignalEvent> {
    let series = series_from(closes);
    let lines = smooth_all(&series, &[fast, slow]).unwrap();
    CrossoverDetector::new(k)
        .detect(&series, &lines[0], &lines[1])
        .unwrap()
}

fn relations(closes: &[f64], fast: usize, slow: usize) -> Vec<Relation> {
    let series = series_from(closes);
    let lines = smooth_all(&series, &[fast, slow]).unwrap();
    lines[0]
        .values()
        .iter()
        .zip(lines[1].values())
        .map(|(&f, &s)| Relation::between(f, s))
        .collect()
}

// ── 1. EMA bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_seeds_and_stays_in_running_range(
        closes in arb_closes(1),
        span in 1usize..50,
    ) {
        let series = series_from(&closes);
        let ema = Ema::new(span).unwrap().compute(&series).unwrap();
        let values = ema.values();

        prop_assert_eq!(values.len(), closes.len());
        prop_assert_eq!(values[0], closes[0]);

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (i, &v) in values.iter().enumerate() {
            lo = lo.min(closes[i]);
            hi = hi.max(closes[i]);
            prop_assert!(v >= lo && v <= hi, "index {}: {} not in [{}, {}]", i, v, lo, hi);
        }
    }

    #[test]
    fn constant_closes_never_signal(
        price in 0.01..1000.0_f64,
        len in 2usize..80,
        (fast, slow) in arb_spans(),
        k in 0usize..6,
    ) {
        prop_assume!(k < len);
        let closes = vec![price; len];
        let series = series_from(&closes);
        let lines = smooth_all(&series, &[fast, slow]).unwrap();
        for line in &lines {
            prop_assert!(line.values().iter().all(|&v| v == price));
        }
        prop_assert!(detect(&closes, fast, slow, k).is_empty());
    }
}

// ── 2. Event uniqueness ──────────────────────────────────────────────

proptest! {
    #[test]
    fn events_have_unique_increasing_dates(
        closes in arb_closes(2),
        (fast, slow) in arb_spans(),
        k in 0usize..6,
    ) {
        prop_assume!(k < closes.len());
        let events = detect(&closes, fast, slow, k);
        for pair in events.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
            prop_assert!(pair[0].index < pair[1].index);
        }
        for e in &events {
            prop_assert_eq!(e.price, closes[e.index]);
        }
    }
}

// ── 3. Alternation ───────────────────────────────────────────────────

proptest! {
    /// Two same-direction neighbours need the run to break in between: by an
    /// exact tie when k <= 1, or by a tie or short counter-run otherwise.
    #[test]
    fn same_direction_neighbours_are_separated_by_a_break(
        closes in arb_closes(2),
        (fast, slow) in arb_spans(),
        k in 0usize..6,
    ) {
        prop_assume!(k < closes.len());
        let events = detect(&closes, fast, slow, k);
        let rel = relations(&closes, fast, slow);

        for pair in events.windows(2) {
            if pair[0].direction != pair[1].direction {
                continue;
            }
            let held = match pair[0].direction {
                SignalDirection::Buy => Relation::Above,
                SignalDirection::Sell => Relation::Below,
            };
            let between = &rel[pair[0].index + 1..pair[1].index];
            prop_assert!(between.iter().any(|r| *r != held));
            if k <= 1 {
                prop_assert!(between.contains(&Relation::Equal));
            }
        }
    }
}

// ── 4. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn detection_is_deterministic(
        closes in arb_closes(2),
        (fast, slow) in arb_spans(),
        k in 0usize..6,
    ) {
        prop_assume!(k < closes.len());
        prop_assert_eq!(detect(&closes, fast, slow, k), detect(&closes, fast, slow, k));
    }
}

// ── 5. Window monotonicity ───────────────────────────────────────────

proptest! {
    /// Every event at the larger window has an earlier-or-equal event of the
    /// same direction at the smaller window.
    #[test]
    fn larger_window_never_fires_more_or_earlier(
        closes in arb_closes(8),
        (fast, slow) in arb_spans(),
        k_small in 0usize..4,
        extra in 1usize..4,
    ) {
        let k_large = k_small + extra;
        prop_assume!(k_large < closes.len());

        let small = detect(&closes, fast, slow, k_small);
        let large = detect(&closes, fast, slow, k_large);
        prop_assert!(large.len() <= small.len());

        for e in &large {
            let matched = small
                .iter()
                .any(|s| s.direction == e.direction && s.index <= e.index);
            prop_assert!(matched, "k={} event at {} has no match at k={}", k_large, e.index, k_small);
        }
    }
}

// ── 6. Forecast ordering ─────────────────────────────────────────────

proptest! {
    #[test]
    fn bundled_forecasters_return_ordered_intervals(
        closes in arb_closes(3),
        horizon in 1usize..60,
        width in 0.5..0.99_f64,
        linear in any::<bool>(),
    ) {
        let method = if linear { ForecastMethod::Linear } else { ForecastMethod::Holt };
        let forecaster = method.build(width);
        let series = series_from(&closes);
        let interval = ForecastAdapter::new(forecaster.as_ref())
            .forecast(&series, horizon)
            .unwrap();
        prop_assert!(interval.is_ordered());
        let last = series.last().unwrap().date;
        prop_assert_eq!(interval.horizon_date, last + chrono::Duration::days(horizon as i64));
    }

    #[test]
    fn enforce_ordering_always_orders(
        lower in -1e6..1e6_f64,
        point in -1e6..1e6_f64,
        upper in -1e6..1e6_f64,
    ) {
        let row = PredictionRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            point,
            lower,
            upper,
        };
        let interval = enforce_ordering(&row).unwrap();
        prop_assert!(interval.is_ordered());
        let was_ordered = lower <= point && point <= upper;
        prop_assert_eq!(interval.adjusted, !was_ordered);
    }
}
