// Rating engine: per-position metric weights and the weighted calculator.

pub mod calculator;
pub mod weights;

pub use calculator::{weighted_rating, PlayerMetrics, RatingCalculator};
pub use weights::{CategoryWeights, Metric, MetricWeight, WeightTable};
