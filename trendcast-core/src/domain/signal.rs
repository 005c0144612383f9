//! Signal events emitted by the crossover detector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossover signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalDirection {
    /// Fast line moved above the slow line.
    Buy,
    /// Fast line moved below the slow line.
    Sell,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Buy => f.pad("Buy"),
            SignalDirection::Sell => f.pad("Sell"),
        }
    }
}

/// An immutable buy/sell event at one index of the source series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub date: NaiveDate,
    /// Position in the source series.
    pub index: usize,
    /// Source close at `index`.
    pub price: f64,
    pub direction: SignalDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display() {
        assert_eq!(SignalDirection::Buy.to_string(), "Buy");
        assert_eq!(SignalDirection::Sell.to_string(), "Sell");
    }

    #[test]
    fn event_serializes_direction_by_name() {
        let event = SignalEvent {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            index: 4,
            price: 9.0,
            direction: SignalDirection::Sell,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"Sell\""));
        assert!(json.contains("2024-03-15"));
    }
}
