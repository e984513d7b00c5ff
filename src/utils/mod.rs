use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{HalfTimeScore, Match, MatchState, MatchSummary};
use crate::services::pattern::final_score;

/// Every calendar day from `start` to `end`, both included. Empty when
/// `start` is after `end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Parse a `YYYY-MM-DD` query/CLI date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
}

/// Day-first display date, e.g. `09.05.2024`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn outcome_code(home: u32, away: u32) -> char {
    match home.cmp(&away) {
        std::cmp::Ordering::Greater => '1',
        std::cmp::Ordering::Equal => 'X',
        std::cmp::Ordering::Less => '2',
    }
}

/// Half-time/full-time code such as `"1/2"` (home led at the break, away
/// won). `"-"` when the half-time score is unknown.
pub fn half_time_full_time(ht: Option<HalfTimeScore>, ft_home: u32, ft_away: u32) -> String {
    match ht {
        Some(ht) => format!("{}/{}", outcome_code(ht.home, ht.away), outcome_code(ft_home, ft_away)),
        None => "-".to_string(),
    }
}

/// HT/FT code of a completed match; `"-"` for fixtures and unreadable scores.
pub fn ht_ft_code(m: &Match) -> String {
    if m.state != MatchState::Post {
        return "-".to_string();
    }
    match final_score(m) {
        Ok(ft) => half_time_full_time(m.score.ht, ft.home, ft.away),
        Err(_) => "-".to_string(),
    }
}

pub fn summarize(m: &Match) -> MatchSummary {
    MatchSummary {
        match_info: m.clone(),
        ht_ft: ht_ft_code(m),
    }
}

/// Validate team name format
pub fn validate_team_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= 100
}

/// Closest known team names to `query`, best first.
pub fn suggest_team_names<'a>(query: &str, teams: &[&'a str], limit: usize) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    let mut scored: Vec<(f64, &str)> = teams
        .iter()
        .map(|team| (strsim::jaro_winkler(&query, &team.to_lowercase()), *team))
        .filter(|(score, _)| *score > 0.6)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, team)| team).collect()
}

/// The most recent `pre`/`post` matches, newest first. With a search term,
/// the 100 newest are filtered by team name; without one, the first 25 are
/// returned.
pub fn recent_matches<'a>(matches: &'a [Match], search: Option<&str>) -> Vec<&'a Match> {
    let mut recent: Vec<&Match> = matches
        .iter()
        .filter(|m| matches!(m.state, MatchState::Pre | MatchState::Post))
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(100);

    match search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        Some(term) => recent
            .into_iter()
            .filter(|m| {
                m.home_team.name.to_lowercase().contains(&term) || m.away_team.name.to_lowercase().contains(&term)
            })
            .collect(),
        None => {
            recent.truncate(25);
            recent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Score, TeamRef};
    use chrono::{Duration, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn played(id: &str, home: &str, away: &str, ft: (&str, &str), ht: Option<(u32, u32)>, hours_ago: i64) -> Match {
        Match {
            id: id.to_string(),
            match_name: None,
            home_team: TeamRef {
                name: home.to_string(),
                ..TeamRef::default()
            },
            away_team: TeamRef {
                name: away.to_string(),
                ..TeamRef::default()
            },
            score: Score {
                home: ft.0.to_string(),
                away: ft.1.to_string(),
                ht: ht.map(|(home, away)| HalfTimeScore { home, away }),
            },
            date: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() - Duration::hours(hours_ago),
            time: None,
            status: "state".to_string(),
            state: MatchState::Post,
            competition: None,
            betting_code: None,
        }
    }

    #[test]
    fn days_in_range_is_inclusive() {
        let days = days_in_range(day(2024, 2, 27), day(2024, 3, 1));
        assert_eq!(days, vec![day(2024, 2, 27), day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]);
        assert_eq!(days_in_range(day(2024, 3, 1), day(2024, 3, 1)).len(), 1);
        assert!(days_in_range(day(2024, 3, 2), day(2024, 3, 1)).is_empty());
    }

    #[test]
    fn parses_and_formats_dates() {
        assert_eq!(parse_date(" 2024-05-09 ").unwrap(), day(2024, 5, 9));
        assert!(parse_date("09/05/2024").is_err());
        let kickoff = Utc.with_ymd_and_hms(2024, 5, 9, 18, 30, 0).unwrap();
        assert_eq!(format_date(kickoff), "09.05.2024");
    }

    #[test]
    fn half_time_full_time_codes() {
        assert_eq!(half_time_full_time(Some(HalfTimeScore { home: 1, away: 0 }), 1, 2), "1/2");
        assert_eq!(half_time_full_time(Some(HalfTimeScore { home: 0, away: 1 }), 2, 1), "2/1");
        assert_eq!(half_time_full_time(Some(HalfTimeScore { home: 0, away: 0 }), 0, 0), "X/X");
        assert_eq!(half_time_full_time(None, 2, 1), "-");
    }

    #[test]
    fn ht_ft_code_of_match() {
        let m = played("1", "A", "B", ("2.0", "1"), Some((0, 1)), 3);
        assert_eq!(ht_ft_code(&m), "2/1");
        assert_eq!(summarize(&m).ht_ft, "2/1");
        let broken = played("2", "A", "B", ("x", "1"), Some((0, 1)), 3);
        assert_eq!(ht_ft_code(&broken), "-");
    }

    #[test]
    fn suggests_close_names() {
        let teams = ["Galatasaray", "Fenerbahce", "Besiktas"];
        let suggestions = suggest_team_names("galatasray", &teams, 2);
        assert_eq!(suggestions.first(), Some(&"Galatasaray"));
        assert!(suggest_team_names("zzzzzz", &teams, 2).is_empty());
    }

    #[test]
    fn recent_matches_filters_and_caps() {
        let matches: Vec<Match> = (0..30)
            .map(|i| played(&i.to_string(), "Home", &format!("Away {i}"), ("1", "0"), None, i))
            .collect();
        let recent = recent_matches(&matches, None);
        assert_eq!(recent.len(), 25);
        assert_eq!(recent[0].id, "0");

        let found = recent_matches(&matches, Some("away 12"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "12");
    }

    #[test]
    fn validates_team_names() {
        assert!(validate_team_name("Alpha"));
        assert!(!validate_team_name("   "));
        assert!(!validate_team_name(&"x".repeat(101)));
    }
}
