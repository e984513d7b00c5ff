use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfTimeScore {
    pub home: u32,
    pub away: u32,
}

/// Final score as carried on the wire: string-encoded goals plus an optional
/// half-time split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub ht: Option<HalfTimeScore>,
}

impl Score {
    pub fn unplayed() -> Self {
        Self {
            home: "0".to_string(),
            away: "0".to_string(),
            ht: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Pre,  // not yet played
    Post, // completed
    #[serde(other)]
    Other,
}

impl MatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchState::Pre => "pre",
            MatchState::Post => "post",
            MatchState::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub match_name: Option<String>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub score: Score,
    pub date: DateTime<Utc>, // kickoff instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub status: String,
    pub state: MatchState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub betting_code: Option<String>,
}

impl Match {
    /// Only `pre` and `post` matches with both team names take part in
    /// team lookups.
    pub fn is_usable(&self) -> bool {
        matches!(self.state, MatchState::Pre | MatchState::Post)
            && !self.home_team.name.trim().is_empty()
            && !self.away_team.name.trim().is_empty()
    }

    pub fn display_name(&self) -> String {
        match &self.match_name {
            Some(name) => name.clone(),
            None => format!("{} vs {}", self.home_team.name, self.away_team.name),
        }
    }
}

/// Final score parsed into goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl Scoreline {
    pub const fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    /// The analyzed team, not necessarily either side of the target fixture's name.
    pub team: String,
    pub home_team: String,
    pub away_team: String,
    pub match_date: DateTime<Utc>,
    #[serde(default)]
    pub match_time: Option<String>,
    pub match_id: String,
    pub prediction: String,
    pub confidence: f64,
    pub last_two_scores: Vec<String>, // oldest first
}

/// A match plus its half-time/full-time code, as listed by the team and
/// recent-matches views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    #[serde(flatten)]
    pub match_info: Match,
    pub ht_ft: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    pub team: String,
    pub past: Vec<MatchSummary>,
    pub future: Vec<MatchSummary>,
}

// Envelope of GET /api/matches
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    pub match_count: usize,
    pub predictions: Vec<MatchPrediction>,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: "error".to_string(),
        }
    }
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn match_round_trips_with_camel_case_fields() {
        let raw = r#"{
            "id": "m1",
            "homeTeam": {"id": "1", "name": "Alpha", "slug": "alpha"},
            "awayTeam": {"id": "2", "name": "Beta", "slug": "beta"},
            "score": {"home": "2", "away": "1", "ht": {"home": 0, "away": 1}},
            "date": "2024-03-01T18:00:00Z",
            "status": "state",
            "state": "post"
        }"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert_eq!(m.home_team.name, "Alpha");
        assert_eq!(m.score.ht, Some(HalfTimeScore { home: 0, away: 1 }));
        assert_eq!(m.date, Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap());
        assert_eq!(m.state, MatchState::Post);
        assert!(m.is_usable());

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["homeTeam"]["slug"], "alpha");
        assert!(json.get("bettingCode").is_none());
    }

    #[test]
    fn unknown_state_is_not_usable() {
        let raw = r#"{
            "id": "m2",
            "homeTeam": {"name": "Alpha"},
            "awayTeam": {"name": "Beta"},
            "score": {"home": "0", "away": "0"},
            "date": "2024-03-01T18:00:00Z",
            "state": "postponed"
        }"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert_eq!(m.state, MatchState::Other);
        assert!(!m.is_usable());
    }

    #[test]
    fn missing_team_name_is_not_usable() {
        let raw = r#"{
            "id": "m3",
            "homeTeam": {"id": "1"},
            "awayTeam": {"name": "Beta"},
            "score": {"home": "1", "away": "0"},
            "date": "2024-03-01T18:00:00Z",
            "state": "post"
        }"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert!(!m.is_usable());
        assert_eq!(m.display_name(), " vs Beta");
    }

    #[test]
    fn scoreline_displays_as_home_dash_away() {
        assert_eq!(Scoreline::new(2, 1).to_string(), "2-1");
    }
}
