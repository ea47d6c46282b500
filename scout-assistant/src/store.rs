// Collaborator interfaces for the rating code: players, weights, squads.
//
// Implementations own all I/O. Failures propagate to the caller; nothing
// here retries.

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::{rate_squad, SquadReport};
use crate::player::{Player, PlayerId, Roster};
use crate::rating::{RatingCalculator, WeightTable};
use crate::squad::{Assignment, Squad};

pub trait PlayerRepository {
    fn fetch_players(&self) -> Result<Vec<Player>>;
    fn fetch_player(&self, id: &PlayerId) -> Result<Option<Player>>;
}

pub trait RatingWeightsStore {
    /// Weight table for `club`: the default table with any club-specific rows
    /// laid over it.
    fn fetch_weights(&self, club: &str) -> Result<WeightTable>;
}

pub trait SquadConfigStore {
    /// Active (slot label, player) pairs for a squad. Unknown squads yield an
    /// empty list.
    fn fetch_assignments(&self, squad_id: &str) -> Result<Vec<Assignment>>;

    /// Full squad with per-slot alternates, if it exists.
    fn fetch_squad(&self, squad_id: &str) -> Result<Option<Squad>>;
}

/// Build a rating calculator for `club` from the weights store.
pub fn load_calculator(weights: &dyn RatingWeightsStore, club: &str) -> Result<RatingCalculator> {
    let table = weights
        .fetch_weights(club)
        .with_context(|| format!("failed to fetch rating weights for club {club}"))?;
    info!("Loaded {} position weight rows for club {}", table.len(), club);
    Ok(RatingCalculator::new(club, table))
}

/// Fetch the whole roster into an indexed collection.
pub fn load_roster(players: &dyn PlayerRepository) -> Result<Roster> {
    let list = players.fetch_players().context("failed to fetch players")?;
    Ok(list.into_iter().collect())
}

/// Fetch a squad and rate it against `roster`. `Ok(None)` if the squad does
/// not exist.
pub fn report_squad(
    squads: &dyn SquadConfigStore,
    roster: &Roster,
    calculator: &RatingCalculator,
    squad_id: &str,
) -> Result<Option<SquadReport>> {
    let squad = squads
        .fetch_squad(squad_id)
        .with_context(|| format!("failed to fetch squad {squad_id}"))?;
    Ok(squad.map(|s| rate_squad(&s, roster, calculator)))
}
