// Integration tests for the scouting assistant.
//
// These exercise the library end-to-end through its public API: the SQLite
// store feeding the weights/roster/squad interfaces, the CSV roster loader,
// and the squad aggregator on top.

use std::path::Path;

use scout_assistant::aggregate::{aggregate, round1, rate_squad};
use scout_assistant::db::Database;
use scout_assistant::error::RatingIssue;
use scout_assistant::player::{Player, PlayerId, Roster};
use scout_assistant::position::{resolve_position, Line, PositionKey};
use scout_assistant::rating::{weighted_rating, CategoryWeights, Metric, PlayerMetrics, WeightTable};
use scout_assistant::roster::load_roster;
use scout_assistant::squad::{Assignment, Formation, Squad};
use scout_assistant::store::{self, PlayerRepository, SquadConfigStore};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

const CLUB: &str = "test-club";

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn player(id: &str, general: Option<f64>, potential: Option<f64>) -> Player {
    let mut p = Player::new(id, format!("Player {id}"));
    p.scouting_rating = general;
    p.potential_rating = potential;
    p
}

fn seeded_db() -> Database {
    let db = Database::open(":memory:").expect("in-memory database should open");
    db.upsert_players(&[
        player("cb1", Some(8.0), Some(6.0)),
        player("cb2", Some(7.0), Some(7.0)),
        player("gk1", Some(6.0), Some(8.0)),
        player("st1", Some(7.5), None),
    ])
    .unwrap();
    db.save_weights(
        CLUB,
        PositionKey::CentreBack,
        &CategoryWeights::new(&[(Metric::General, 0.7), (Metric::Potential, 0.3)]),
    )
    .unwrap();

    let mut squad = Squad::new("first-team", "First Team", Formation::F442);
    squad.assign(0, PlayerId::new("gk1")).unwrap();
    squad.assign(2, PlayerId::new("cb1")).unwrap();
    squad.assign(3, PlayerId::new("cb2")).unwrap();
    squad.add_alternate(9, PlayerId::new("st1")).unwrap();
    db.save_squad(&squad).unwrap();
    db
}

// ===========================================================================
// Store-backed pipeline
// ===========================================================================

#[test]
fn db_backed_squad_rating() {
    let db = seeded_db();
    let calculator = store::load_calculator(&db, CLUB).unwrap();
    let roster = store::load_roster(&db).unwrap();
    let assignments = db.fetch_assignments("first-team").unwrap();
    assert_eq!(assignments.len(), 3);

    let rating = aggregate(&assignments, &roster, &calculator).unwrap();

    // CB override: 8.0*0.7 + 6.0*0.3 = 7.4 and 7.0.
    assert!(approx_eq(rating.position(PositionKey::CentreBack), 7.2, 1e-9));
    assert!(approx_eq(rating.line(Line::Defence), 7.2, 1e-9));
    // GK default row with no age: (6.0*0.8 + 8.0*0.1) / 0.9 = 6.22..
    assert!(approx_eq(rating.line(Line::Goalkeeping), 6.2, 1e-9));
    // (7.4 + 7.0 + 6.222) / 3 = 6.874
    assert!(approx_eq(rating.overall, 6.9, 1e-9));
    assert!(rating.skipped.is_empty());
}

#[test]
fn report_squad_rates_starters_and_bench() {
    let db = seeded_db();
    let calculator = store::load_calculator(&db, CLUB).unwrap();
    let roster = store::load_roster(&db).unwrap();

    let report = store::report_squad(&db, &roster, &calculator, "first-team")
        .unwrap()
        .expect("squad exists");
    assert_eq!(report.formation, Formation::F442);
    assert_eq!(report.club, CLUB);
    assert!(approx_eq(report.starter_rating(), 6.9, 1e-9));

    // Bench striker has no potential; forward row renormalizes to general.
    let bench = report.bench.expect("bench has one alternate");
    assert!(approx_eq(bench.overall, 7.5, 1e-9));
    assert!(approx_eq(bench.line(Line::Attack), 7.5, 1e-9));

    assert!(store::report_squad(&db, &roster, &calculator, "missing")
        .unwrap()
        .is_none());
}

#[test]
fn other_clubs_use_default_weights() {
    let db = seeded_db();
    let calculator = store::load_calculator(&db, "someone-else").unwrap();
    assert_eq!(calculator.table(), &WeightTable::defaults());

    let cb1 = db.fetch_player(&PlayerId::new("cb1")).unwrap().unwrap();
    // Default CB row without age: (8.0*0.7 + 6.0*0.2) / 0.9
    let expected = (8.0 * 0.7 + 6.0 * 0.2) / 0.9;
    assert!(approx_eq(calculator.rate(&cb1, "CB").unwrap(), expected, 1e-9));
}

#[test]
fn player_missing_from_store_is_skipped() {
    let db = seeded_db();
    let mut squad = db.fetch_squad("first-team").unwrap().unwrap();
    squad.assign(10, PlayerId::new("ghost")).unwrap();
    db.save_squad(&squad).unwrap();

    let calculator = store::load_calculator(&db, CLUB).unwrap();
    let roster = store::load_roster(&db).unwrap();
    let rating = aggregate(
        &db.fetch_assignments("first-team").unwrap(),
        &roster,
        &calculator,
    )
    .unwrap();

    assert!(approx_eq(rating.overall, 6.9, 1e-9));
    assert_eq!(rating.skipped.len(), 1);
    assert_eq!(rating.skipped[0].slot, "ST");
    assert_eq!(
        rating.skipped[0].reason,
        RatingIssue::MissingData {
            player_id: PlayerId::new("ghost")
        }
    );
}

// ===========================================================================
// CSV roster
// ===========================================================================

#[test]
fn csv_roster_with_stored_squad() {
    let roster = load_roster(&Path::new(FIXTURES).join("roster.csv")).unwrap();
    assert_eq!(roster.len(), 12);

    let mut squad = Squad::new("cup", "Cup XI", Formation::F433);
    let lineup = [
        "gk1", "lb1", "cb1", "cb2", "rb1", "cm1", "cb2", "cm2", "lw1", "st1", "rw1",
    ];
    for (i, id) in lineup.iter().enumerate() {
        squad.assign(i, PlayerId::new(*id)).unwrap();
    }
    squad.add_alternate(0, PlayerId::new("gk2")).unwrap();
    squad.add_alternate(9, PlayerId::new("st2")).unwrap();

    let db = Database::open(":memory:").unwrap();
    db.save_squad(&squad).unwrap();
    let stored = db.fetch_squad("cup").unwrap().unwrap();

    // cb2 was moved from CB into the DM slot, leaving slot 3 empty.
    assert_eq!(stored.filled_slots(), 10);

    let calculator = store::load_calculator(&db, CLUB).unwrap();
    let report = rate_squad(&stored, &roster, &calculator);
    let starters = report.starters.unwrap();

    // Owen Pryce, 27: (7.0*0.8 + 7.0*0.1 + 10.0*0.1) / 1.0
    assert!(approx_eq(starters.line(Line::Goalkeeping), 7.3, 1e-9));

    let mean = starters.rated.iter().map(|r| r.rating).sum::<f64>() / starters.rated.len() as f64;
    assert!(approx_eq(starters.overall, round1(mean), 1e-9));
    assert_eq!(starters.rated.len(), 10);

    let bench = report.bench.unwrap();
    let st2 = bench
        .rated
        .iter()
        .find(|r| r.player_id == PlayerId::new("st2"))
        .unwrap();
    // No general rating: (7.9*0.3 + 7.0*0.1) / 0.4
    assert!(approx_eq(st2.rating, (7.9 * 0.3 + 7.0 * 0.1) / 0.4, 1e-9));
    assert_eq!(st2.position, PositionKey::Forward);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn calculator_is_finite_or_fallback_for_all_metric_subsets() {
    let weights = CategoryWeights::new(&[
        (Metric::General, 0.4),
        (Metric::Potential, 0.35),
        (Metric::AgeFactor, 0.15),
        (Metric::MarketValue, 0.1),
    ]);
    let values = [Some(7.5), None];
    for general in values {
        for potential in values {
            for age_factor in values {
                for market_value in values {
                    let m = PlayerMetrics {
                        general,
                        potential,
                        age_factor,
                        market_value,
                    };
                    let r = weighted_rating(&m, Some(&weights));
                    let any_present = [general, potential, age_factor, market_value]
                        .iter()
                        .any(|v| v.is_some());
                    if any_present {
                        let r = r.expect("some metric present");
                        assert!(r.is_finite());
                        assert!(approx_eq(r, 7.5, 1e-9));
                    } else {
                        assert_eq!(r, None);
                    }
                }
            }
        }
    }
}

#[test]
fn resolution_is_total_over_arbitrary_strings() {
    let inputs = [
        "", " ", "GK", "gk", "RWB", "LWB", "W", "WWW", "CAM", "ST", "S", "??", "4-4-2", "Striker",
        "ÄÖÜ", "rb ", "CB/DM",
    ];
    for input in inputs {
        let key = resolve_position(Some(input));
        assert!(PositionKey::ALL.contains(&key));
        assert_eq!(resolve_position(Some(key.abbreviation())), key);
    }
    assert_eq!(resolve_position(Some("RWB")), PositionKey::RightBack);
    assert_eq!(resolve_position(None), PositionKey::CentralMid);
}

#[test]
fn overall_and_lines_are_per_player_means() {
    let mut table = WeightTable::empty();
    for key in PositionKey::ALL {
        table.set(key, CategoryWeights::new(&[(Metric::General, 1.0)]));
    }
    let calculator = scout_assistant::rating::RatingCalculator::new(CLUB, table);

    let ratings = [6.1, 7.7, 8.3, 5.9, 7.2, 6.6, 9.1];
    let slots = ["GK", "CB", "CB", "LB", "DM", "W", "ST"];
    let roster: Roster = ratings
        .iter()
        .enumerate()
        .map(|(i, r)| player(&format!("p{i}"), Some(*r), None))
        .collect();
    let assignments: Vec<Assignment> = slots
        .iter()
        .enumerate()
        .map(|(i, s)| Assignment::new(*s, format!("p{i}")))
        .collect();

    let rating = aggregate(&assignments, &roster, &calculator).unwrap();
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    assert!(approx_eq(rating.overall, round1(mean), 1e-9));
    assert!(approx_eq(rating.line(Line::Defence), round1((7.7 + 8.3 + 5.9) / 3.0), 1e-9));
    assert!(approx_eq(rating.line(Line::Midfield), 7.2, 1e-9));
    assert!(approx_eq(rating.position(PositionKey::AttackingMid), 0.0, 1e-9));
}

#[test]
fn empty_inputs_yield_no_aggregate() {
    let db = seeded_db();
    let calculator = store::load_calculator(&db, CLUB).unwrap();
    let roster = store::load_roster(&db).unwrap();

    assert!(aggregate(&[], &roster, &calculator).is_none());
    assert!(aggregate(&[Assignment::new("CB", "cb1")], &Roster::new(), &calculator).is_none());

    let empty = Squad::new("empty", "Nobody", Formation::F532);
    let report = rate_squad(&empty, &roster, &calculator);
    assert!(report.starters.is_none());
    assert!(report.bench.is_none());
    assert!(approx_eq(report.starter_rating(), 0.0, 1e-9));
}
