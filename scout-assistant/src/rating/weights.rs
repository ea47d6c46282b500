// Per-position metric weights and the default fallback table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::position::PositionKey;

/// A player metric that a weight row can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// General scouting rating (0-10).
    General,
    /// Forward-looking potential rating (0-10).
    Potential,
    /// Age-derived factor (0-10), see `calculator::age_factor`.
    AgeFactor,
    /// Market value estimate. Not on the 0-10 scale, so the default table
    /// never references it.
    MarketValue,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::General => "general",
            Metric::Potential => "potential",
            Metric::AgeFactor => "age_factor",
            Metric::MarketValue => "market_value",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Metric::General),
            "potential" => Ok(Metric::Potential),
            "age_factor" => Ok(Metric::AgeFactor),
            "market_value" => Ok(Metric::MarketValue),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeight {
    pub metric: Metric,
    pub weight: f64,
}

/// Ordered list of `(metric, weight)` pairs for one position.
///
/// Weights are not required to sum to 1; the calculator normalizes by the sum
/// of the weights whose metric is actually present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryWeights(pub Vec<MetricWeight>);

impl CategoryWeights {
    pub fn new(pairs: &[(Metric, f64)]) -> Self {
        CategoryWeights(
            pairs
                .iter()
                .map(|&(metric, weight)| MetricWeight { metric, weight })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricWeight> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Weight rows keyed by position. A missing row means "no weights configured"
/// and the calculator falls back to the raw general rating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightTable {
    rows: HashMap<PositionKey, CategoryWeights>,
}

impl WeightTable {
    /// An empty table: every position falls back to the general rating.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The documented default table used when a club has no override.
    pub fn defaults() -> Self {
        use Metric::*;
        let mut rows = HashMap::new();
        rows.insert(
            PositionKey::Goalkeeper,
            CategoryWeights::new(&[(General, 0.8), (Potential, 0.1), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::CentreBack,
            CategoryWeights::new(&[(General, 0.7), (Potential, 0.2), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::LeftBack,
            CategoryWeights::new(&[(General, 0.6), (Potential, 0.3), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::RightBack,
            CategoryWeights::new(&[(General, 0.6), (Potential, 0.3), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::DefensiveMid,
            CategoryWeights::new(&[(General, 0.7), (Potential, 0.2), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::CentralMid,
            CategoryWeights::new(&[(General, 0.6), (Potential, 0.3), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::AttackingMid,
            CategoryWeights::new(&[(General, 0.6), (Potential, 0.3), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::Winger,
            CategoryWeights::new(&[(General, 0.5), (Potential, 0.4), (AgeFactor, 0.1)]),
        );
        rows.insert(
            PositionKey::Forward,
            CategoryWeights::new(&[(General, 0.6), (Potential, 0.3), (AgeFactor, 0.1)]),
        );
        WeightTable { rows }
    }

    pub fn get(&self, key: PositionKey) -> Option<&CategoryWeights> {
        self.rows.get(&key)
    }

    pub fn set(&mut self, key: PositionKey, weights: CategoryWeights) {
        self.rows.insert(key, weights);
    }

    /// Return a copy of this table with the given rows replacing the
    /// existing ones position by position.
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (PositionKey, &'a CategoryWeights)>,
    {
        let mut table = self.clone();
        for (key, weights) in overrides {
            table.rows.insert(key, weights.clone());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
