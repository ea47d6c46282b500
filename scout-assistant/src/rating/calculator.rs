// Weighted rating calculation with graceful degradation for missing metrics.

use tracing::debug;

use crate::error::RatingIssue;
use crate::player::Player;
use crate::position::{resolve_position, PositionKey};
use crate::rating::weights::{CategoryWeights, Metric, WeightTable};

/// Per-metric player values. Each metric is either present or absent; the
/// calculator skips absent metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMetrics {
    pub general: Option<f64>,
    pub potential: Option<f64>,
    pub age_factor: Option<f64>,
    pub market_value: Option<f64>,
}

impl PlayerMetrics {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let v = match metric {
            Metric::General => self.general,
            Metric::Potential => self.potential,
            Metric::AgeFactor => self.age_factor,
            Metric::MarketValue => self.market_value,
        };
        v.filter(|x| x.is_finite())
    }
}

const PEAK_START: u32 = 24;
const PEAK_END: u32 = 29;

/// Age-derived factor on the 0-10 scale.
///
/// 10.0 through the peak years (24-29), minus 0.5 per year below the peak
/// (floored at 5.0) and minus 1.0 per year above it (floored at 0.0).
pub fn age_factor(age: u32) -> f64 {
    if age < PEAK_START {
        (10.0 - 0.5 * (PEAK_START - age) as f64).max(5.0)
    } else if age > PEAK_END {
        (10.0 - (age - PEAK_END) as f64).max(0.0)
    } else {
        10.0
    }
}

/// Weighted average of the present metrics.
///
/// For each configured `(metric, weight)` whose value is present, `value *
/// weight` accumulates into the numerator and `weight` into the denominator.
/// When no weights are configured, or nothing accumulated (zero denominator),
/// the raw general rating is returned instead. `None` means neither path
/// produced a value.
pub fn weighted_rating(metrics: &PlayerMetrics, weights: Option<&CategoryWeights>) -> Option<f64> {
    let fallback = metrics.value(Metric::General);
    let Some(weights) = weights else {
        return fallback;
    };

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for mw in weights.iter() {
        if !mw.weight.is_finite() {
            continue;
        }
        if let Some(value) = metrics.value(mw.metric) {
            numerator += value * mw.weight;
            denominator += mw.weight;
        }
    }

    if denominator.abs() < f64::EPSILON {
        return fallback;
    }
    let rating = numerator / denominator;
    if rating.is_finite() {
        Some(rating)
    } else {
        fallback
    }
}

/// Rates players against one club's weight table.
#[derive(Debug, Clone)]
pub struct RatingCalculator {
    club: String,
    table: WeightTable,
}

impl RatingCalculator {
    pub fn new(club: impl Into<String>, table: WeightTable) -> Self {
        RatingCalculator {
            club: club.into(),
            table,
        }
    }

    /// Calculator for a club with no overrides.
    pub fn with_defaults(club: impl Into<String>) -> Self {
        Self::new(club, WeightTable::defaults())
    }

    pub fn club(&self) -> &str {
        &self.club
    }

    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Whether the table has a weight row for this key.
    pub fn has_weights(&self, key: PositionKey) -> bool {
        self.table.get(key).is_some_and(|w| !w.is_empty())
    }

    /// `NoWeights` when `key` has no usable weight row and ratings for it
    /// fall back to the general rating.
    pub fn missing_weights(&self, key: PositionKey) -> Option<RatingIssue> {
        (!self.has_weights(key)).then_some(RatingIssue::NoWeights { position: key })
    }

    /// Rate a player in the role given by `slot_label`.
    ///
    /// The slot label, not the player's own listed position, selects the
    /// weight row.
    pub fn rate(&self, player: &Player, slot_label: &str) -> Option<f64> {
        let key = resolve_position(Some(slot_label));
        self.rate_as(player, key)
    }

    /// Rate a player for an already-resolved position key.
    pub fn rate_as(&self, player: &Player, key: PositionKey) -> Option<f64> {
        if let Some(issue) = self.missing_weights(key) {
            debug!(club = %self.club, player = %player.id, "{issue}");
        }
        let weights = self.table.get(key).filter(|w| !w.is_empty());
        weighted_rating(&player.metrics(), weights)
    }

    /// Rate a player at their primary listed position.
    pub fn rate_primary(&self, player: &Player) -> Option<f64> {
        self.rate_as(player, resolve_position(player.primary_position()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
