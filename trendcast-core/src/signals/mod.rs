//! Signal detection: turns aligned smoothed series into buy/sell events.
//!
//! Detection is a pure function of its inputs: re-running it on identical
//! series must reproduce identical events.

pub mod crossover;

pub use crossover::CrossoverDetector;

/// Relation of the fast line to the slow line at one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Above,
    Below,
    /// Exact tie. Neither above nor below.
    Equal,
}

impl Relation {
    pub fn between(fast: f64, slow: f64) -> Self {
        if fast > slow {
            Relation::Above
        } else if fast < slow {
            Relation::Below
        } else {
            Relation::Equal
        }
    }
}
