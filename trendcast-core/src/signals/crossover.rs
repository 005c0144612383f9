//! EMA crossover detection with a confirmation window.
//!
//! Fires Buy when the fast line has stayed strictly above the slow line for a
//! full confirmation window that starts right after a period where it was not
//! above. Sell is the mirror image with "below".
//!
//! Equality (fast == slow) is neither above nor below: it never fires and it
//! breaks any run in progress.
//!
//! The effective window is `max(k, 1)`, so k = 0 and k = 1 both reduce to the
//! plain one-step crossover test.

use super::Relation;
use crate::domain::{PriceSeries, SignalDirection, SignalEvent, SmoothedSeries};
use crate::error::{AnalysisError, Result};

/// Crossover detector parameterized by the confirmation window `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverDetector {
    confirmation: usize,
}

impl CrossoverDetector {
    pub fn new(confirmation: usize) -> Self {
        Self { confirmation }
    }

    /// Single-period crossover (k = 0).
    pub fn immediate() -> Self {
        Self::new(0)
    }

    pub fn confirmation(&self) -> usize {
        self.confirmation
    }

    /// Number of consecutive periods the new relation must hold.
    pub fn effective_window(&self) -> usize {
        self.confirmation.max(1)
    }

    /// Scan `fast` against `slow` and return events in index order.
    ///
    /// `source` supplies the event price and must be the series both EMAs were
    /// computed from.
    ///
    /// # Errors
    /// - `MisalignedSeries` if the three series differ in length or dates.
    /// - `InvalidWindow` if `k >= len`.
    pub fn detect(
        &self,
        source: &PriceSeries,
        fast: &SmoothedSeries,
        slow: &SmoothedSeries,
    ) -> Result<Vec<SignalEvent>> {
        fast.ensure_aligned(slow)?;
        if fast.len() != source.len() || fast.dates() != source.dates().as_slice() {
            return Err(AnalysisError::MisalignedSeries(format!(
                "EMA {} is not aligned with the {} source points",
                fast.span(),
                source.len()
            )));
        }

        let len = fast.len();
        if self.confirmation >= len {
            return Err(AnalysisError::InvalidWindow {
                window: self.confirmation,
                len,
            });
        }

        let window = self.effective_window();
        let points = source.points();
        let mut events = Vec::new();
        let mut run_above = 0usize;
        let mut run_below = 0usize;

        for (i, (&f, &s)) in fast.values().iter().zip(slow.values()).enumerate() {
            match Relation::between(f, s) {
                Relation::Above => {
                    run_above += 1;
                    run_below = 0;
                }
                Relation::Below => {
                    run_below += 1;
                    run_above = 0;
                }
                Relation::Equal => {
                    run_above = 0;
                    run_below = 0;
                }
            }

            // A run of exactly `window` ending at i means i-window was not in
            // the same state. Runs that start at index 0 have no prior period.
            if i < window {
                continue;
            }
            let direction = if run_above == window {
                SignalDirection::Buy
            } else if run_below == window {
                SignalDirection::Sell
            } else {
                continue;
            };

            events.push(SignalEvent {
                date: points[i].date,
                index: i,
                price: points[i].close,
                direction,
            });
        }

        tracing::debug!(
            fast = fast.span(),
            slow = slow.span(),
            confirmation = self.confirmation,
            events = events.len(),
            "crossover scan complete"
        );

        Ok(events)
    }
}

impl Default for CrossoverDetector {
    fn default() -> Self {
        Self::immediate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::NaiveDate;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn source(n: usize) -> PriceSeries {
        let points = (0..n)
            .map(|i| PricePoint::new(base_date() + chrono::Duration::days(i as i64), 100.0 + i as f64))
            .collect();
        PriceSeries::new("AAPL", points).unwrap()
    }

    /// Build fast/slow lines from explicit values over a matching source.
    fn lines(fast: Vec<f64>, slow: Vec<f64>) -> (PriceSeries, SmoothedSeries, SmoothedSeries) {
        let src = source(fast.len());
        let f = SmoothedSeries::aligned_with(&src, 5, fast).unwrap();
        let s = SmoothedSeries::aligned_with(&src, 13, slow).unwrap();
        (src, f, s)
    }

    /// Fast line from a pattern of relations: '+' above, '-' below, '=' equal.
    fn pattern(p: &str) -> (PriceSeries, SmoothedSeries, SmoothedSeries) {
        let fast = p
            .chars()
            .map(|c| match c {
                '+' => 105.0,
                '-' => 95.0,
                _ => 100.0,
            })
            .collect::<Vec<_>>();
        let slow = vec![100.0; fast.len()];
        lines(fast, slow)
    }

    fn run(p: &str, k: usize) -> Vec<(usize, SignalDirection)> {
        let (src, f, s) = pattern(p);
        CrossoverDetector::new(k)
            .detect(&src, &f, &s)
            .unwrap()
            .into_iter()
            .map(|e| (e.index, e.direction))
            .collect()
    }

    #[test]
    fn fires_buy_on_golden_cross() {
        assert_eq!(run("--++", 0), vec![(2, SignalDirection::Buy)]);
    }

    #[test]
    fn fires_sell_on_death_cross() {
        assert_eq!(run("++--", 0), vec![(2, SignalDirection::Sell)]);
    }

    #[test]
    fn no_fire_when_trend_continues() {
        assert!(run("++++++", 0).is_empty());
        assert!(run("------", 3).is_empty());
    }

    #[test]
    fn event_carries_source_price_and_date() {
        let (src, f, s) = pattern("--+");
        let events = CrossoverDetector::immediate().detect(&src, &f, &s).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].price, 102.0);
        assert_eq!(events[0].date, base_date() + chrono::Duration::days(2));
    }

    #[test]
    fn k_zero_and_k_one_agree() {
        for p in ["-+-+-+", "==++--", "+-=+=-", "--++==--"] {
            assert_eq!(run(p, 0), run(p, 1), "pattern {p}");
        }
    }

    #[test]
    fn confirmation_delays_buy() {
        // Cross at 2, confirmed after 3 above periods at index 4.
        assert_eq!(run("--+++++", 3), vec![(4, SignalDirection::Buy)]);
    }

    #[test]
    fn short_lived_cross_is_not_confirmed() {
        assert!(run("--++--", 3).is_empty());
    }

    #[test]
    fn equality_is_not_a_signal() {
        assert!(run("======", 0).is_empty());
    }

    #[test]
    fn equality_breaks_confirmation_run() {
        // ++=++ never reaches three consecutive above periods.
        assert!(run("-++=++-", 3).is_empty());
        // After the tie the run restarts and confirms at index 6.
        assert_eq!(run("-++=+++", 3), vec![(6, SignalDirection::Buy)]);
    }

    #[test]
    fn transition_from_equal_fires() {
        assert_eq!(run("=+", 0), vec![(1, SignalDirection::Buy)]);
        assert_eq!(run("=-", 0), vec![(1, SignalDirection::Sell)]);
    }

    #[test]
    fn run_starting_at_first_index_does_not_fire() {
        // No prior period to transition from.
        assert!(run("+++-", 3).is_empty());
        assert!(run("+", 0).is_empty());
    }

    #[test]
    fn direction_flip_fires_both_ways() {
        assert_eq!(
            run("-+-+", 0),
            vec![
                (1, SignalDirection::Buy),
                (2, SignalDirection::Sell),
                (3, SignalDirection::Buy),
            ]
        );
    }

    #[test]
    fn window_must_be_smaller_than_len() {
        let (src, f, s) = pattern("-++");
        let err = CrossoverDetector::new(3).detect(&src, &f, &s).unwrap_err();
        assert_eq!(err.kind(), "InvalidWindow");
        assert!(CrossoverDetector::new(2).detect(&src, &f, &s).is_ok());
    }

    #[test]
    fn k_zero_on_empty_lines_is_invalid_window() {
        let (src, f, s) = lines(vec![], vec![]);
        let err = CrossoverDetector::immediate().detect(&src, &f, &s).unwrap_err();
        assert_eq!(err.kind(), "InvalidWindow");
    }

    #[test]
    fn length_mismatch_is_misaligned() {
        let (src, f, _) = pattern("-+-+");
        let short_src = source(3);
        let s = SmoothedSeries::aligned_with(&short_src, 13, vec![100.0; 3]).unwrap();
        let err = CrossoverDetector::immediate().detect(&src, &f, &s).unwrap_err();
        assert_eq!(err.kind(), "MisalignedSeries");
    }

    #[test]
    fn foreign_source_is_misaligned() {
        let (_, f, s) = pattern("-+-+");
        let other = PriceSeries::new(
            "AAPL",
            (0..4)
                .map(|i| PricePoint::new(base_date() + chrono::Duration::days(7 * i), 1.0))
                .collect(),
        )
        .unwrap();
        let err = CrossoverDetector::immediate().detect(&other, &f, &s).unwrap_err();
        assert_eq!(err.kind(), "MisalignedSeries");
    }

    #[test]
    fn effective_window() {
        assert_eq!(CrossoverDetector::new(0).effective_window(), 1);
        assert_eq!(CrossoverDetector::new(1).effective_window(), 1);
        assert_eq!(CrossoverDetector::new(3).effective_window(), 3);
        assert_eq!(CrossoverDetector::default().confirmation(), 0);
    }
}
