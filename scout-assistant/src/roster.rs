// Roster loading from CSV exports.
//
// One row per player. `positions` is a `/`-separated list, primary first
// (e.g. `RWB/RB`). Empty numeric cells mean the metric is absent.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::player::{ContractStatus, Player, PlayerId, Roster};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Raw CSV row. Unknown extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    id: String,
    name: String,
    #[serde(default)]
    club: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    positions: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    contract_status: Option<String>,
    #[serde(default)]
    contract_expiry: Option<String>,
    #[serde(default, alias = "rating", alias = "general")]
    scouting_rating: Option<f64>,
    #[serde(default, alias = "potential")]
    potential_rating: Option<f64>,
    #[serde(default)]
    market_value: Option<f64>,
}

/// Trimmed, non-empty text or `None`.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn parse_positions(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(['/', ','])
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_expiry(name: &str, raw: Option<String>) -> Option<NaiveDate> {
    let raw = text(raw)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("player '{}': ignoring unparseable contract_expiry '{}'", name, raw);
            None
        }
    }
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut seen: HashSet<String> = HashSet::new();
    let mut players = Vec::new();

    for result in reader.deserialize::<RawPlayerRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };

        let id = raw.id.trim().to_string();
        let name = raw.name.trim().to_string();
        if id.is_empty() {
            warn!("skipping player '{}': empty id", name);
            continue;
        }
        if !seen.insert(id.clone()) {
            warn!("skipping duplicate player id '{}'", id);
            continue;
        }

        let contract_expiry = parse_expiry(&name, raw.contract_expiry);
        players.push(Player {
            id: PlayerId(id),
            name,
            club: text(raw.club),
            age: raw.age,
            positions: parse_positions(raw.positions),
            nationality: text(raw.nationality),
            contract_status: text(raw.contract_status)
                .map(|s| ContractStatus::parse(&s))
                .unwrap_or_default(),
            contract_expiry,
            scouting_rating: finite(raw.scouting_rating),
            potential_rating: finite(raw.potential_rating),
            market_value: finite(raw.market_value),
        });
    }
    Ok(players)
}

/// Load players from a CSV file.
pub fn load_players(path: &Path) -> Result<Vec<Player>, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_players_from_reader(file).map_err(|e| RosterError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a CSV file into a `Roster`. A file with no valid rows is an error.
pub fn load_roster(path: &Path) -> Result<Roster, RosterError> {
    let players = load_players(path)?;
    if players.is_empty() {
        return Err(RosterError::Validation(format!(
            "{} produced zero valid player rows",
            path.display()
        )));
    }
    info!("Loaded {} players from {}", players.len(), path.display());
    Ok(players.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,club,age,positions,nationality,contract_status,contract_expiry,scouting_rating,potential_rating,market_value";

    #[test]
    fn full_row_parses() {
        let csv_data = format!(
            "{HEADER}\np1,Jamie Rowe,Harbour Town,22,RWB/RB,Wales,under contract,2027-06-30,7.2,8.4,1.5"
        );
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);

        let p = &players[0];
        assert_eq!(p.id, PlayerId::new("p1"));
        assert_eq!(p.name, "Jamie Rowe");
        assert_eq!(p.club.as_deref(), Some("Harbour Town"));
        assert_eq!(p.age, Some(22));
        assert_eq!(p.positions, vec!["RWB".to_string(), "RB".to_string()]);
        assert_eq!(p.contract_status, ContractStatus::UnderContract);
        assert_eq!(p.contract_expiry, NaiveDate::from_ymd_opt(2027, 6, 30));
        assert_eq!(p.scouting_rating, Some(7.2));
        assert_eq!(p.potential_rating, Some(8.4));
        assert_eq!(p.market_value, Some(1.5));
    }

    #[test]
    fn blank_cells_are_absent() {
        let csv_data = format!("{HEADER}\np1,Sam Lee,,,,,,,6.5,,");
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        let p = &players[0];
        assert!(p.club.is_none());
        assert!(p.age.is_none());
        assert!(p.positions.is_empty());
        assert_eq!(p.contract_status, ContractStatus::Unknown);
        assert_eq!(p.scouting_rating, Some(6.5));
        assert!(p.potential_rating.is_none());
        assert!(p.market_value.is_none());
    }

    #[test]
    fn minimal_columns_and_aliases() {
        let csv_data = "\
id,name,rating,potential
p1,A,7.0,8.0";
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players[0].scouting_rating, Some(7.0));
        assert_eq!(players[0].potential_rating, Some(8.0));
    }

    #[test]
    fn malformed_rows_and_duplicates_skipped() {
        let csv_data = format!(
            "{HEADER}\n\
p1,Valid,,24,CB,,,,7.0,,\n\
p2,Bad Age,,not_a_number,CB,,,,7.0,,\n\
p1,Duplicate,,24,CB,,,,9.0,,\n\
p3,Also Valid,,30,ST,,,,6.0,,"
        );
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Valid", "Also Valid"]);
    }

    #[test]
    fn bad_expiry_is_dropped_not_fatal() {
        let csv_data = format!("{HEADER}\np1,A,,,,,,30/06/2027,7.0,,");
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert!(players[0].contract_expiry.is_none());
    }

    #[test]
    fn nan_ratings_are_absent() {
        let csv_data = format!("{HEADER}\np1,A,,,,,,,NaN,7.0,");
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert!(players[0].scouting_rating.is_none());
        assert_eq!(players[0].potential_rating, Some(7.0));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let csv_data = format!("{HEADER}\n  p1 ,  Jamie Rowe  , Harbour Town ,22, rwb / rb ,,,,7.0,,");
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players[0].id, PlayerId::new("p1"));
        assert_eq!(players[0].name, "Jamie Rowe");
        assert_eq!(players[0].club.as_deref(), Some("Harbour Town"));
        assert_eq!(players[0].positions, vec!["RWB".to_string(), "RB".to_string()]);
    }

    #[test]
    fn empty_file_is_a_validation_error() {
        let tmp = std::env::temp_dir().join("roster_test_empty.csv");
        std::fs::write(&tmp, format!("{HEADER}\n")).unwrap();
        let err = load_roster(&tmp).unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
        let _ = std::fs::remove_file(&tmp);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roster(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }
}
