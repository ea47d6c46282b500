// Squad rating aggregation: per-position, per-line, and overall averages.
//
// Every assignment is rated in the role defined by its slot label. Each
// rating feeds its position bucket and that position's line bucket; the
// overall rating averages each individual rating once.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RatingIssue;
use crate::player::{PlayerId, Roster};
use crate::position::{resolve_position, Line, PositionKey};
use crate::rating::RatingCalculator;
use crate::squad::{Assignment, Formation, Squad};

/// Round half away from zero at one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Running sum/count for one bucket.
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

impl Bucket {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Rounded mean, or 0.0 when the bucket received nothing.
    fn rounded_mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round1(self.sum / self.count as f64)
        }
    }
}

/// An assignment that did not contribute a rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAssignment {
    pub slot: String,
    pub player_id: PlayerId,
    pub reason: RatingIssue,
}

/// A single rated assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedAssignment {
    pub slot: String,
    pub player_id: PlayerId,
    pub position: PositionKey,
    pub rating: f64,
}

/// Aggregated ratings for one set of assignments. Held in memory only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadRating {
    /// Rounded mean of every individual rating, each counted once.
    pub overall: f64,
    /// Rounded mean per position key; 0.0 where nobody was rated.
    pub positions: BTreeMap<PositionKey, f64>,
    /// Rounded mean per line; 0.0 where nobody was rated.
    pub lines: BTreeMap<Line, f64>,
    pub rated: Vec<RatedAssignment>,
    pub skipped: Vec<SkippedAssignment>,
    /// One `NoWeights` per position whose rated players fell back to the
    /// general rating.
    pub fallbacks: Vec<RatingIssue>,
}

impl SquadRating {
    pub fn position(&self, key: PositionKey) -> f64 {
        self.positions.get(&key).copied().unwrap_or(0.0)
    }

    pub fn line(&self, line: Line) -> f64 {
        self.lines.get(&line).copied().unwrap_or(0.0)
    }
}

/// Aggregate ratings for `assignments` drawn from `roster`.
///
/// Returns `None` when there is nothing to compute (no assignments or an
/// empty roster), which is distinct from a computed all-zero result.
/// Assignments whose player is missing from the roster, or who cannot be
/// rated at all, are skipped and listed in `skipped`.
pub fn aggregate(
    assignments: &[Assignment],
    roster: &Roster,
    calculator: &RatingCalculator,
) -> Option<SquadRating> {
    if assignments.is_empty() || roster.is_empty() {
        debug!(
            assignments = assignments.len(),
            roster = roster.len(),
            "{}",
            RatingIssue::EmptyInput
        );
        return None;
    }

    let mut positions: BTreeMap<PositionKey, Bucket> = BTreeMap::new();
    let mut lines: BTreeMap<Line, Bucket> = BTreeMap::new();
    let mut overall = Bucket::default();
    let mut rated = Vec::new();
    let mut skipped = Vec::new();
    let mut fallbacks = Vec::new();

    for assignment in assignments {
        let Some(player) = roster.get(&assignment.player_id) else {
            let reason = RatingIssue::MissingData {
                player_id: assignment.player_id.clone(),
            };
            warn!(slot = %assignment.slot, "skipping assignment: {reason}");
            skipped.push(SkippedAssignment {
                slot: assignment.slot.clone(),
                player_id: assignment.player_id.clone(),
                reason,
            });
            continue;
        };

        let key = resolve_position(Some(&assignment.slot));

        let Some(rating) = calculator.rate_as(player, key) else {
            let reason = RatingIssue::Unrated {
                player_id: player.id.clone(),
            };
            warn!(slot = %assignment.slot, "skipping assignment: {reason}");
            skipped.push(SkippedAssignment {
                slot: assignment.slot.clone(),
                player_id: player.id.clone(),
                reason,
            });
            continue;
        };

        if let Some(issue) = calculator.missing_weights(key) {
            if !fallbacks.contains(&issue) {
                fallbacks.push(issue);
            }
        }
        positions.entry(key).or_default().push(rating);
        lines.entry(key.line()).or_default().push(rating);
        overall.push(rating);
        rated.push(RatedAssignment {
            slot: assignment.slot.clone(),
            player_id: player.id.clone(),
            position: key,
            rating,
        });
    }

    Some(SquadRating {
        overall: overall.rounded_mean(),
        positions: PositionKey::ALL
            .iter()
            .map(|k| (*k, positions.get(k).map_or(0.0, Bucket::rounded_mean)))
            .collect(),
        lines: Line::ALL
            .iter()
            .map(|l| (*l, lines.get(l).map_or(0.0, Bucket::rounded_mean)))
            .collect(),
        rated,
        skipped,
        fallbacks,
    })
}

// ---------------------------------------------------------------------------
// Squad report
// ---------------------------------------------------------------------------

/// Starter and bench ratings for one squad configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadReport {
    pub squad_id: String,
    pub squad_name: String,
    pub formation: Formation,
    pub club: String,
    pub starters: Option<SquadRating>,
    pub bench: Option<SquadRating>,
}

impl SquadReport {
    /// The starter rating, or 0.0 when nothing was computed.
    pub fn starter_rating(&self) -> f64 {
        self.starters.as_ref().map_or(0.0, |r| r.overall)
    }
}

/// Rate a squad's active players and its alternates separately.
pub fn rate_squad(squad: &Squad, roster: &Roster, calculator: &RatingCalculator) -> SquadReport {
    let starters = aggregate(&squad.starter_assignments(), roster, calculator);
    let bench = aggregate(&squad.alternate_assignments(), roster, calculator);
    debug!(
        squad = %squad.id,
        starters = starters.as_ref().map(|r| r.overall),
        bench = bench.as_ref().map(|r| r.overall),
        "rated squad"
    );
    SquadReport {
        squad_id: squad.id.clone(),
        squad_name: squad.name.clone(),
        formation: squad.formation,
        club: calculator.club().to_string(),
        starters,
        bench,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
