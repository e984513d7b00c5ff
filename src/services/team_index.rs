use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

use crate::models::Match;

/// How a queried team name is matched against a fixture's team names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameMatching {
    /// Exact name, or the query contained in the fixture's team name.
    #[default]
    Permissive,
    Exact,
}

impl FromStr for NameMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" | "substring" => Ok(NameMatching::Permissive),
            "exact" => Ok(NameMatching::Exact),
            other => Err(format!("expected `permissive` or `exact`, got `{other}`")),
        }
    }
}

impl NameMatching {
    fn accepts(&self, candidate: &str, query: &str) -> bool {
        match self {
            NameMatching::Exact => candidate == query,
            NameMatching::Permissive => candidate == query || candidate.contains(query),
        }
    }
}

/// A team's matches split around the current instant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamMatches<'a> {
    /// Most recent first.
    pub past: Vec<&'a Match>,
    /// Soonest first.
    pub future: Vec<&'a Match>,
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Every usable match involving `team`, newest first.
pub fn team_matches<'a>(matches: &'a [Match], team: &str, policy: NameMatching) -> Vec<&'a Match> {
    let query = normalize_name(team);
    if query.is_empty() {
        return Vec::new();
    }

    let mut found: Vec<&Match> = matches
        .iter()
        .filter(|m| m.is_usable())
        .filter(|m| {
            policy.accepts(&normalize_name(&m.home_team.name), &query)
                || policy.accepts(&normalize_name(&m.away_team.name), &query)
        })
        .collect();

    found.sort_by(|a, b| b.date.cmp(&a.date));
    found
}

/// Split a team's matches at `now`: kickoff strictly before `now` is past,
/// anything else is future.
pub fn tag_matches_for_team<'a>(
    matches: &'a [Match],
    team: &str,
    policy: NameMatching,
    now: DateTime<Utc>,
) -> TeamMatches<'a> {
    let (past, mut future): (Vec<&Match>, Vec<&Match>) = team_matches(matches, team, policy)
        .into_iter()
        .partition(|m| m.date < now);

    // `past` is already newest first.
    future.sort_by(|a, b| a.date.cmp(&b.date));
    TeamMatches { past, future }
}
