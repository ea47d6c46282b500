// SQLite-backed implementation of the player, weights, and squad stores.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use crate::player::{ContractStatus, Player, PlayerId};
use crate::position::PositionKey;
use crate::rating::{CategoryWeights, Metric, MetricWeight, WeightTable};
use crate::squad::{Assignment, Formation, Squad, SquadSlot};
use crate::store::{PlayerRepository, RatingWeightsStore, SquadConfigStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed persistence for players, club weight overrides, and squad
/// configurations.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id               TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                club             TEXT,
                age              INTEGER,
                positions        TEXT NOT NULL DEFAULT '[]',
                nationality      TEXT,
                contract_status  TEXT NOT NULL DEFAULT 'unknown',
                contract_expiry  TEXT,
                scouting_rating  REAL,
                potential_rating REAL,
                market_value     REAL
            );

            CREATE TABLE IF NOT EXISTS rating_weights (
                club     TEXT NOT NULL,
                position TEXT NOT NULL,
                ord      INTEGER NOT NULL,
                metric   TEXT NOT NULL,
                weight   REAL NOT NULL,
                PRIMARY KEY (club, position, ord)
            );

            CREATE TABLE IF NOT EXISTS squads (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                formation  TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS squad_slots (
                squad_id   TEXT NOT NULL REFERENCES squads(id) ON DELETE CASCADE,
                slot_index INTEGER NOT NULL,
                label      TEXT NOT NULL,
                player_id  TEXT,
                PRIMARY KEY (squad_id, slot_index)
            );

            CREATE TABLE IF NOT EXISTS squad_alternates (
                squad_id   TEXT NOT NULL REFERENCES squads(id) ON DELETE CASCADE,
                slot_index INTEGER NOT NULL,
                ord        INTEGER NOT NULL,
                player_id  TEXT NOT NULL,
                PRIMARY KEY (squad_id, slot_index, ord)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Insert a player or overwrite the existing row with the same id.
    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        let conn = self.conn();
        upsert_player_on(&conn, player)
    }

    /// Upsert many players in a single transaction.
    pub fn upsert_players(&self, players: &[Player]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        for player in players {
            upsert_player_on(&tx, player)?;
        }
        tx.commit().context("failed to commit player upserts")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Weights
    // ------------------------------------------------------------------

    /// Replace `club`'s weight row for `position`.
    pub fn save_weights(
        &self,
        club: &str,
        position: PositionKey,
        weights: &CategoryWeights,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM rating_weights WHERE club = ?1 AND position = ?2",
            params![club, position.name()],
        )
        .context("failed to clear previous weights")?;
        for (ord, mw) in weights.iter().enumerate() {
            tx.execute(
                "INSERT INTO rating_weights (club, position, ord, metric, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![club, position.name(), ord as i64, mw.metric.as_str(), mw.weight],
            )
            .context("failed to insert weight")?;
        }
        tx.commit().context("failed to commit weights")?;
        Ok(())
    }

    /// Remove `club`'s override for `position`, restoring the default row.
    pub fn clear_weights(&self, club: &str, position: PositionKey) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM rating_weights WHERE club = ?1 AND position = ?2",
            params![club, position.name()],
        )
        .context("failed to clear weights")?;
        Ok(())
    }

    /// Club-specific rows only, without the default table.
    pub fn load_weight_overrides(&self, club: &str) -> Result<HashMap<PositionKey, CategoryWeights>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT position, metric, weight FROM rating_weights
                 WHERE club = ?1 ORDER BY position, ord",
            )
            .context("failed to prepare weights query")?;

        let rows = stmt
            .query_map(params![club], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .context("failed to query weights")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map weight rows")?;

        let mut overrides: HashMap<PositionKey, CategoryWeights> = HashMap::new();
        for (position, metric, weight) in rows {
            let (Ok(key), Ok(metric)) = (position.parse::<PositionKey>(), metric.parse::<Metric>())
            else {
                warn!(
                    "skipping unreadable weight row for club {}: position={}, metric={}",
                    club, position, metric
                );
                continue;
            };
            overrides
                .entry(key)
                .or_default()
                .0
                .push(MetricWeight { metric, weight });
        }
        Ok(overrides)
    }

    // ------------------------------------------------------------------
    // Squads
    // ------------------------------------------------------------------

    /// Persist a squad, replacing any previous slot and alternate rows.
    pub fn save_squad(&self, squad: &Squad) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        tx.execute(
            "INSERT INTO squads (id, name, formation) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                name       = excluded.name,
                formation  = excluded.formation,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![squad.id, squad.name, squad.formation.display_str()],
        )
        .context("failed to upsert squad")?;
        tx.execute("DELETE FROM squad_slots WHERE squad_id = ?1", params![squad.id])
            .context("failed to clear squad slots")?;
        tx.execute(
            "DELETE FROM squad_alternates WHERE squad_id = ?1",
            params![squad.id],
        )
        .context("failed to clear squad alternates")?;

        for (index, slot) in squad.slots.iter().enumerate() {
            tx.execute(
                "INSERT INTO squad_slots (squad_id, slot_index, label, player_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    squad.id,
                    index as i64,
                    slot.label,
                    slot.active.as_ref().map(|p| p.as_str())
                ],
            )
            .context("failed to insert squad slot")?;
            for (ord, alt) in slot.alternates.iter().enumerate() {
                tx.execute(
                    "INSERT INTO squad_alternates (squad_id, slot_index, ord, player_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![squad.id, index as i64, ord as i64, alt.as_str()],
                )
                .context("failed to insert squad alternate")?;
            }
        }

        tx.commit().context("failed to commit squad")?;
        Ok(())
    }

    /// Delete a squad and its slots. Returns `true` if a squad was removed.
    pub fn delete_squad(&self, squad_id: &str) -> Result<bool> {
        let conn = self.conn();
        let n = conn
            .execute("DELETE FROM squads WHERE id = ?1", params![squad_id])
            .context("failed to delete squad")?;
        Ok(n > 0)
    }

    /// Ids of all stored squads, sorted.
    pub fn squad_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id FROM squads ORDER BY id")
            .context("failed to prepare squad_ids query")?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .context("failed to query squads")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .context("failed to map squad rows")?;
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn upsert_player_on(conn: &Connection, player: &Player) -> Result<()> {
    let positions_json =
        serde_json::to_string(&player.positions).context("failed to serialize positions")?;
    let expiry = player
        .contract_expiry
        .map(|d| d.format(DATE_FORMAT).to_string());
    conn.execute(
        "INSERT INTO players (id, name, club, age, positions, nationality, contract_status,
                              contract_expiry, scouting_rating, potential_rating, market_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
            name             = excluded.name,
            club             = excluded.club,
            age              = excluded.age,
            positions        = excluded.positions,
            nationality      = excluded.nationality,
            contract_status  = excluded.contract_status,
            contract_expiry  = excluded.contract_expiry,
            scouting_rating  = excluded.scouting_rating,
            potential_rating = excluded.potential_rating,
            market_value     = excluded.market_value",
        params![
            player.id.as_str(),
            player.name,
            player.club,
            player.age,
            positions_json,
            player.nationality,
            player.contract_status.as_str(),
            expiry,
            player.scouting_rating,
            player.potential_rating,
            player.market_value,
        ],
    )
    .with_context(|| format!("failed to upsert player {}", player.id))?;
    Ok(())
}

const PLAYER_COLUMNS: &str = "id, name, club, age, positions, nationality, contract_status,
    contract_expiry, scouting_rating, potential_rating, market_value";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let id: String = row.get(0)?;
    let positions_json: String = row.get(4)?;
    let positions = match serde_json::from_str::<Vec<String>>(&positions_json) {
        Ok(positions) => positions,
        Err(e) => {
            warn!("player {}: ignoring unreadable positions column: {}", id, e);
            Vec::new()
        }
    };
    let status: String = row.get(6)?;
    let expiry: Option<String> = row.get(7)?;
    Ok(Player {
        id: PlayerId(id),
        name: row.get(1)?,
        club: row.get(2)?,
        age: row.get(3)?,
        positions,
        nationality: row.get(5)?,
        contract_status: ContractStatus::parse(&status),
        contract_expiry: expiry.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
        scouting_rating: row.get(8)?,
        potential_rating: row.get(9)?,
        market_value: row.get(10)?,
    })
}

// ---------------------------------------------------------------------------
// Store implementations
// ---------------------------------------------------------------------------

impl PlayerRepository for Database {
    fn fetch_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY name, id"))
            .context("failed to prepare fetch_players query")?;
        let players = stmt
            .query_map([], player_from_row)
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;
        Ok(players)
    }

    fn fetch_player(&self, id: &PlayerId) -> Result<Option<Player>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
            params![id.as_str()],
            player_from_row,
        )
        .optional()
        .with_context(|| format!("failed to fetch player {id}"))
    }
}

impl RatingWeightsStore for Database {
    fn fetch_weights(&self, club: &str) -> Result<WeightTable> {
        let overrides = self.load_weight_overrides(club)?;
        Ok(WeightTable::defaults().with_overrides(overrides.iter().map(|(k, w)| (*k, w))))
    }
}

impl SquadConfigStore for Database {
    fn fetch_assignments(&self, squad_id: &str) -> Result<Vec<Assignment>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT label, player_id FROM squad_slots
                 WHERE squad_id = ?1 AND player_id IS NOT NULL
                 ORDER BY slot_index",
            )
            .context("failed to prepare fetch_assignments query")?;
        let assignments = stmt
            .query_map(params![squad_id], |row| {
                Ok(Assignment {
                    slot: row.get(0)?,
                    player_id: PlayerId(row.get(1)?),
                })
            })
            .context("failed to query squad slots")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map squad slot rows")?;
        Ok(assignments)
    }

    fn fetch_squad(&self, squad_id: &str) -> Result<Option<Squad>> {
        let conn = self.conn();
        let header: Option<(String, String)> = conn
            .query_row(
                "SELECT name, formation FROM squads WHERE id = ?1",
                params![squad_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to query squad")?;
        let Some((name, formation)) = header else {
            return Ok(None);
        };
        let formation: Formation = formation
            .parse()
            .map_err(|e| anyhow!("squad {squad_id}: {e}"))?;

        let mut slots: Vec<SquadSlot> = conn
            .prepare(
                "SELECT label, player_id FROM squad_slots WHERE squad_id = ?1 ORDER BY slot_index",
            )
            .context("failed to prepare squad slots query")?
            .query_map(params![squad_id], |row| {
                let active: Option<String> = row.get(1)?;
                Ok(SquadSlot {
                    label: row.get(0)?,
                    active: active.map(PlayerId),
                    alternates: Vec::new(),
                })
            })
            .context("failed to query squad slots")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map squad slot rows")?;

        let alternates: Vec<(i64, String)> = conn
            .prepare(
                "SELECT slot_index, player_id FROM squad_alternates
                 WHERE squad_id = ?1 ORDER BY slot_index, ord",
            )
            .context("failed to prepare squad alternates query")?
            .query_map(params![squad_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .context("failed to query squad alternates")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map squad alternate rows")?;

        for (index, player_id) in alternates {
            match slots.get_mut(index as usize) {
                Some(slot) => slot.alternates.push(PlayerId(player_id)),
                None => warn!(
                    "squad {}: alternate {} references missing slot {}",
                    squad_id, player_id, index
                ),
            }
        }

        Ok(Some(Squad {
            id: squad_id.to_string(),
            name,
            formation,
            slots,
        }))
    }
}
