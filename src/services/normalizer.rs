//! Turns raw livescores records into [`Match`] values.
//!
//! The feed is loosely typed: every field may be missing, scores come as
//! strings or numbers (sometimes `"1.0"`), and the kickoff is an epoch
//! millisecond value that is itself either a string or a number. Records are
//! therefore read as [`serde_json::Value`] and defaulted field by field.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{HalfTimeScore, Match, MatchState, Score, TeamRef};

/// Fields that carry a bettor-market identifier. One of them (or a
/// non-empty `markets` array) must be present for a record to be kept.
const BETTING_CODE_FIELDS: [&str; 3] = ["iddaaCode", "betCode", "rbId"];

/// `status` values that mark a `post` match as a final result. The feed
/// reports finished matches with the literal `"state"`.
const FINISHED_STATUSES: [&str; 6] = ["state", "finished", "ft", "fulltime", "full-time", "ended"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub total: usize,
    pub with_betting_code: usize,
    pub future: usize,
    pub kept: usize,
}

impl FeedStats {
    pub fn merge(&mut self, other: FeedStats) {
        self.total += other.total;
        self.with_betting_code += other.with_betting_code;
        self.future += other.future;
        self.kept += other.kept;
    }
}

/// Parse a raw response body. Empty and `null` bodies are an empty day.
pub fn parse_feed_json(raw: &str, now: DateTime<Utc>) -> Result<(Vec<Match>, FeedStats), serde_json::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok((Vec::new(), FeedStats::default()));
    }
    let payload: Value = serde_json::from_str(trimmed)?;
    Ok(normalize_payload(&payload, now))
}

/// Normalize every record under `data.matches`, which the feed sends as an
/// object keyed by match id (an array is accepted too).
pub fn normalize_payload(payload: &Value, now: DateTime<Utc>) -> (Vec<Match>, FeedStats) {
    let records: Vec<&Value> = match payload.get("data").and_then(|d| d.get("matches")) {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    };

    let mut stats = FeedStats {
        total: records.len(),
        ..FeedStats::default()
    };
    let mut matches = Vec::with_capacity(records.len());

    for record in records {
        if !has_teams(record) || betting_marker(record).is_none() {
            continue;
        }
        stats.with_betting_code += 1;

        if let Some(m) = normalize_record(record, now) {
            if m.state == MatchState::Pre {
                stats.future += 1;
            }
            matches.push(m);
        }
    }

    stats.kept = matches.len();
    (matches, stats)
}

/// Normalize a single record, or drop it.
///
/// Dropped: records without `homeTeam`/`awayTeam`, records without a betting
/// code, and records that are neither a finished result nor a fixture
/// kicking off after `now`.
pub fn normalize_record(record: &Value, now: DateTime<Utc>) -> Option<Match> {
    let home = record.get("homeTeam").filter(|v| v.is_object())?;
    let away = record.get("awayTeam").filter(|v| v.is_object())?;
    let betting = betting_marker(record)?;

    let kickoff = kickoff_instant(record.get("mstUtc")).unwrap_or(now);
    let state = record.get("state").and_then(Value::as_str).unwrap_or_default();
    let status = record.get("status").and_then(Value::as_str);
    let score = record.get("score").filter(|v| v.is_object());

    let home_team = team_ref(home);
    let away_team = team_ref(away);

    let (score, state, status) = match (state, score) {
        ("post", Some(score)) if status.is_some_and(is_finished_status) => {
            let ht = score
                .get("ht")
                .filter(|v| v.is_object())
                .map(|ht| HalfTimeScore {
                    home: goals(ht.get("home")),
                    away: goals(ht.get("away")),
                });
            let score = Score {
                home: score_text(score.get("home")),
                away: score_text(score.get("away")),
                ht,
            };
            (score, MatchState::Post, status.unwrap_or("unknown").to_string())
        }
        ("pre", _) if kickoff > now => (
            Score::unplayed(),
            MatchState::Pre,
            status.unwrap_or("scheduled").to_string(),
        ),
        _ => return None,
    };

    let match_name = text_field(record.get("matchName")).unwrap_or_else(|| {
        format!(
            "{} vs {}",
            non_empty_or(&home_team.name, "Home"),
            non_empty_or(&away_team.name, "Away")
        )
    });

    Some(Match {
        id: text_field(record.get("id")).unwrap_or_else(|| format!("unknown_{}", Uuid::new_v4())),
        match_name: Some(match_name),
        home_team,
        away_team,
        score,
        date: kickoff,
        time: text_field(record.get("time")),
        status,
        state,
        competition: text_field(record.get("competitionId")),
        betting_code: betting.code,
    })
}

struct BettingMarker {
    code: Option<String>,
}

fn betting_marker(record: &Value) -> Option<BettingMarker> {
    let code = BETTING_CODE_FIELDS
        .iter()
        .find_map(|field| text_field(record.get(*field)));
    let has_markets = record
        .get("markets")
        .and_then(Value::as_array)
        .is_some_and(|markets| !markets.is_empty());

    if code.is_some() || has_markets {
        Some(BettingMarker { code })
    } else {
        None
    }
}

fn has_teams(record: &Value) -> bool {
    record.get("homeTeam").is_some_and(Value::is_object) && record.get("awayTeam").is_some_and(Value::is_object)
}

fn is_finished_status(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase();
    FINISHED_STATUSES.contains(&status.as_str())
}

fn team_ref(v: &Value) -> TeamRef {
    TeamRef {
        id: text_field(v.get("id")).unwrap_or_else(|| "unknown".to_string()),
        name: text_field(v.get("name")).unwrap_or_default(),
        slug: text_field(v.get("slug")).unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Epoch milliseconds, given as a number or a numeric string.
fn kickoff_instant(v: Option<&Value>) -> Option<DateTime<Utc>> {
    let millis = match v? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().split('.').next()?.parse::<i64>().ok()?,
        _ => return None,
    };
    Utc.timestamp_millis_opt(millis).single()
}

/// Goals as the wire string with any decimal part cut off; `"0"` when absent.
fn score_text(v: Option<&Value>) -> String {
    let raw = match v {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return "0".to_string(),
    };
    match raw.split('.').next() {
        Some(whole) if !whole.is_empty() => whole.to_string(),
        _ => "0".to_string(),
    }
}

fn goals(v: Option<&Value>) -> u32 {
    match v {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0) as u32,
        Some(Value::String(s)) => s.trim().split('.').next().and_then(|w| w.parse().ok()).unwrap_or(0),
        _ => 0,
    }
}

/// Non-empty string or non-zero number rendered as text.
fn text_field(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
