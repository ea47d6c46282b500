// Checks on the files shipped alongside the crate.

use std::path::Path;

use scout_assistant::config::load_config_from;
use scout_assistant::db::Database;
use scout_assistant::roster::{load_players, load_roster};
use scout_assistant::seed::{load_squads, seed_database};
use scout_assistant::store;

/// Verify that defaults/club.toml is valid TOML.
#[test]
fn club_toml_is_valid() {
    let content =
        std::fs::read_to_string("defaults/club.toml").expect("defaults/club.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "defaults/club.toml is not valid TOML: {:?}", parsed.err());
}

/// Verify that defaults/ratings.toml is valid TOML.
#[test]
fn ratings_toml_is_valid() {
    let content = std::fs::read_to_string("defaults/ratings.toml")
        .expect("defaults/ratings.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "defaults/ratings.toml is not valid TOML: {:?}", parsed.err());
}

/// The shipped defaults load and validate as a full config.
#[test]
fn defaults_load_as_config() {
    let tmp = std::env::temp_dir().join("scout_scaffold_defaults");
    let config_dir = tmp.join("config");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(&config_dir).unwrap();
    for name in ["club.toml", "ratings.toml"] {
        std::fs::copy(Path::new("defaults").join(name), config_dir.join(name)).unwrap();
    }

    let config = load_config_from(&tmp).expect("defaults should load");
    assert_eq!(config.club.id, "harbour-town");
    assert_eq!(config.data_paths.roster.as_deref(), Some("data/roster.csv"));

    let _ = std::fs::remove_dir_all(&tmp);
}

/// The sample roster referenced by the default config parses.
#[test]
fn sample_roster_loads() {
    let roster = load_roster(Path::new("data/roster.csv")).expect("data/roster.csv should load");
    assert_eq!(roster.len(), 12);
}

/// Every player named in the shipped squads file is on the sample roster.
#[test]
fn sample_squads_reference_roster_players() {
    let roster = load_roster(Path::new("data/roster.csv")).unwrap();
    let squads = load_squads(Path::new("data/squads.toml")).expect("data/squads.toml should load");
    assert!(!squads.is_empty());

    for squad in &squads {
        let starters = squad.starter_assignments();
        let bench = squad.alternate_assignments();
        for a in starters.iter().chain(bench.iter()) {
            assert!(
                roster.contains(&a.player_id),
                "squad {} names unknown player {}",
                squad.id,
                a.player_id
            );
        }
    }
}

/// A fresh database seeded from the shipped data rates the default squad.
#[test]
fn seeded_store_rates_default_squad() {
    let players = load_players(Path::new("data/roster.csv")).unwrap();
    let squads = load_squads(Path::new("data/squads.toml")).unwrap();
    let db = Database::open(":memory:").unwrap();
    assert!(db.squad_ids().unwrap().is_empty());

    seed_database(&db, &players, &squads).unwrap();
    assert_eq!(db.squad_ids().unwrap(), vec!["cup", "first-team"]);

    let calculator = store::load_calculator(&db, "harbour-town").unwrap();
    let roster = store::load_roster(&db).unwrap();
    let report = store::report_squad(&db, &roster, &calculator, "first-team")
        .unwrap()
        .expect("default squad should be seeded");

    let starters = report.starters.expect("starters are rated");
    assert_eq!(starters.rated.len(), 11);
    assert!(starters.skipped.is_empty());
    assert!(report.bench.is_some());
}

/// Verify that all expected directories exist.
#[test]
fn directory_structure_exists() {
    let expected_dirs = ["src", "src/rating", "defaults", "data", "tests", "tests/fixtures"];
    for dir in expected_dirs {
        assert!(Path::new(dir).is_dir(), "Expected directory '{}' to exist", dir);
    }
}
