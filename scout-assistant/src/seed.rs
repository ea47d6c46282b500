// Squad seed files and store seeding.
//
// A seed file is TOML with one `[[squads]]` table per squad. `lineup` lists
// player ids in formation slot order; an empty string leaves a slot open.
// Alternates name the slot index they cover.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::error::SquadError;
use crate::player::{Player, PlayerId};
use crate::squad::{Formation, Squad};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse squads file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("squad '{squad}': {source}")]
    Squad { squad: String, source: SquadError },
}

#[derive(Debug, Deserialize)]
struct SquadsFile {
    #[serde(default)]
    squads: Vec<RawSquad>,
}

#[derive(Debug, Deserialize)]
struct RawSquad {
    id: String,
    name: String,
    formation: Formation,
    #[serde(default)]
    lineup: Vec<String>,
    #[serde(default)]
    alternates: Vec<RawAlternate>,
}

#[derive(Debug, Deserialize)]
struct RawAlternate {
    slot: usize,
    player: String,
}

fn build_squad(raw: RawSquad) -> Result<Squad, SquadError> {
    let mut squad = Squad::new(raw.id, raw.name, raw.formation);
    for (index, id) in raw.lineup.iter().enumerate() {
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        squad.assign(index, PlayerId::new(id))?;
    }
    for alt in raw.alternates {
        squad.add_alternate(alt.slot, PlayerId::new(alt.player.trim()))?;
    }
    Ok(squad)
}

fn squads_from_str(text: &str, path: &str) -> Result<Vec<Squad>, SeedError> {
    let file: SquadsFile = toml::from_str(text).map_err(|e| SeedError::Parse {
        path: path.to_string(),
        source: e,
    })?;
    file.squads
        .into_iter()
        .map(|raw| {
            let id = raw.id.clone();
            build_squad(raw).map_err(|source| SeedError::Squad { squad: id, source })
        })
        .collect()
}

/// Load squads from a TOML seed file.
pub fn load_squads(path: &Path) -> Result<Vec<Squad>, SeedError> {
    let text = std::fs::read_to_string(path).map_err(|e| SeedError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    squads_from_str(&text, &path.display().to_string())
}

/// Write players and squads into the database, replacing rows with the same
/// ids.
pub fn seed_database(db: &Database, players: &[Player], squads: &[Squad]) -> anyhow::Result<()> {
    db.upsert_players(players).context("failed to seed players")?;
    for squad in squads {
        db.save_squad(squad)
            .with_context(|| format!("failed to seed squad {}", squad.id))?;
    }
    info!("Seeded {} players and {} squads", players.len(), squads.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
