// Player records as handed over by the data store.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::calculator::{age_factor, PlayerMetrics};

/// Opaque player identifier (the hosted store uses UUID strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    UnderContract,
    ExpiringSoon,
    FreeAgent,
    Loan,
    #[default]
    Unknown,
}

impl ContractStatus {
    /// Lenient parse of free-text contract status. Unrecognized text maps to
    /// `Unknown`.
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "under_contract" | "contracted" | "active" => ContractStatus::UnderContract,
            "expiring" | "expiring_soon" => ContractStatus::ExpiringSoon,
            "free_agent" | "free" => ContractStatus::FreeAgent,
            "loan" | "on_loan" => ContractStatus::Loan,
            _ => ContractStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::UnderContract => "under_contract",
            ContractStatus::ExpiringSoon => "expiring_soon",
            ContractStatus::FreeAgent => "free_agent",
            ContractStatus::Loan => "loan",
            ContractStatus::Unknown => "unknown",
        }
    }
}

/// A scouted player. Read-only from the rating code's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Eligible positions, primary first.
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub contract_status: ContractStatus,
    #[serde(default)]
    pub contract_expiry: Option<NaiveDate>,
    /// General scouting rating.
    #[serde(default)]
    pub scouting_rating: Option<f64>,
    #[serde(default)]
    pub potential_rating: Option<f64>,
    #[serde(default)]
    pub market_value: Option<f64>,
}

impl Player {
    /// Minimal player with only identity set; used by tests and loaders.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Player {
            id: PlayerId::new(id),
            name: name.into(),
            club: None,
            age: None,
            positions: Vec::new(),
            nationality: None,
            contract_status: ContractStatus::Unknown,
            contract_expiry: None,
            scouting_rating: None,
            potential_rating: None,
            market_value: None,
        }
    }

    pub fn primary_position(&self) -> Option<&str> {
        self.positions.first().map(|s| s.as_str())
    }

    /// Metric values for the weighted calculator. Non-finite numbers are
    /// treated as absent.
    pub fn metrics(&self) -> PlayerMetrics {
        PlayerMetrics {
            general: finite(self.scouting_rating),
            potential: finite(self.potential_rating),
            age_factor: self.age.map(age_factor),
            market_value: finite(self.market_value),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Indexed player collection. Listing order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a player, replacing any existing entry with the same id.
    pub fn insert(&mut self, player: Player) {
        match self.index.get(&player.id) {
            Some(&i) => self.players[i] = player,
            None => {
                self.index.insert(player.id.clone(), self.players.len());
                self.players.push(player);
            }
        }
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.index.get(id).map(|&i| &self.players[i])
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for player in iter {
            roster.insert(player);
        }
        roster
    }
}
