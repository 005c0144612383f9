//! Domain records for a single analysis run.
//!
//! All of these are transient: a run creates them, returns them, and nothing
//! outlives the invocation.

pub mod forecast;
pub mod price;
pub mod signal;
pub mod smoothed;

pub use forecast::{ForecastInterval, SuggestedLevels};
pub use price::{validate_points, PricePoint, PriceSeries};
pub use signal::{SignalDirection, SignalEvent};
pub use smoothed::SmoothedSeries;
