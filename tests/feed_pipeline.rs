use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use doublewin::models::{HalfTimeScore, MatchState};
use doublewin::services::{parse_feed_json, FeedStats, PredictionEngine};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

#[test]
fn normalizes_livescores_fixture() {
    let raw = read_fixture("livescores.json");
    let (matches, stats) = parse_feed_json(&raw, now()).expect("fixture should parse");

    assert_eq!(
        stats,
        FeedStats {
            total: 7,
            with_betting_code: 5,
            future: 1,
            kept: 3
        }
    );

    let mut ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);

    let m2 = matches.iter().find(|m| m.id == "m2").unwrap();
    assert_eq!(m2.score.home, "2");
    assert_eq!(m2.score.ht, Some(HalfTimeScore { home: 1, away: 1 }));
    assert_eq!(m2.betting_code.as_deref(), Some("1002"));

    let m3 = matches.iter().find(|m| m.id == "m3").unwrap();
    assert_eq!(m3.state, MatchState::Pre);
    assert_eq!(m3.score.home, "0");
    assert_eq!(m3.score.ht, None);
    assert_eq!(m3.status, "fixture");
    assert_eq!(m3.betting_code, None);
}

#[test]
fn fixture_feeds_a_prediction() {
    let raw = read_fixture("livescores.json");
    let (matches, _) = parse_feed_json(&raw, now()).unwrap();

    let report = PredictionEngine::new().run(&matches, now());
    assert_eq!(report.predictions.len(), 1);

    let p = &report.predictions[0];
    assert_eq!(p.team, "Alpha");
    assert_eq!(p.match_id, "m3");
    assert_eq!(p.home_team, "Alpha");
    assert_eq!(p.away_team, "Delta");
    assert_eq!(p.last_two_scores, vec!["1-0", "2-1"]);
    assert_eq!(report.stats.with_predictions, 1);
    assert_eq!(report.stats.teams, 4);
}

#[test]
fn null_feed_is_empty() {
    let (matches, stats) = parse_feed_json("null", now()).expect("null should parse");
    assert!(matches.is_empty());
    assert_eq!(stats, FeedStats::default());
}
