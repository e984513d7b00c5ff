use std::str::FromStr;

use crate::models::{Match, Scoreline};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("match {match_id}: cannot read {side} score {value:?}")]
    InvalidScore {
        match_id: String,
        side: &'static str,
        value: String,
    },
}

/// Which pair of prior results triggers a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternRule {
    /// Older result 1-0/0-1, then the most recent 2-1/1-2.
    #[default]
    Ordered,
    /// Both results in {1-0, 2-1, 0-1, 1-2}, in any order.
    Union,
}

impl FromStr for PatternRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordered" => Ok(PatternRule::Ordered),
            "union" => Ok(PatternRule::Union),
            other => Err(format!("expected `ordered` or `union`, got `{other}`")),
        }
    }
}

const ONE_GOAL_WINS: [Scoreline; 2] = [Scoreline::new(0, 1), Scoreline::new(1, 0)];
const TWO_ONE_WINS: [Scoreline; 2] = [Scoreline::new(1, 2), Scoreline::new(2, 1)];

impl PatternRule {
    pub fn accepts(&self, older: Scoreline, newer: Scoreline) -> bool {
        match self {
            PatternRule::Ordered => ONE_GOAL_WINS.contains(&older) && TWO_ONE_WINS.contains(&newer),
            PatternRule::Union => {
                let narrow = |s: &Scoreline| ONE_GOAL_WINS.contains(s) || TWO_ONE_WINS.contains(s);
                narrow(&older) && narrow(&newer)
            }
        }
    }
}

/// The two results that made a team qualify.
#[derive(Debug, Clone, Copy)]
pub struct Qualification<'a> {
    pub older: &'a Match,
    pub newer: &'a Match,
    pub older_score: Scoreline,
    pub newer_score: Scoreline,
}

/// Goals from a wire score: decimal part dropped, empty means zero.
pub fn parse_goals(raw: &str) -> Option<u32> {
    let whole = raw.trim().split('.').next().unwrap_or_default();
    if whole.is_empty() {
        return Some(0);
    }
    whole.parse().ok()
}

pub fn final_score(m: &Match) -> Result<Scoreline, AnalysisError> {
    let read = |side: &'static str, raw: &str| {
        parse_goals(raw).ok_or_else(|| AnalysisError::InvalidScore {
            match_id: m.id.clone(),
            side,
            value: raw.to_string(),
        })
    };
    Ok(Scoreline::new(read("home", &m.score.home)?, read("away", &m.score.away)?))
}

/// Check a team's two most recent results. `past` must be newest first.
///
/// Only the scoreline counts; which side the team played on does not.
pub fn evaluate<'a>(
    team: &str,
    past: &[&'a Match],
    rule: PatternRule,
) -> Result<Option<Qualification<'a>>, AnalysisError> {
    let (newer, older) = match past {
        [newer, older, ..] => (*newer, *older),
        _ => return Ok(None),
    };

    let older_score = final_score(older)?;
    let newer_score = final_score(newer)?;
    tracing::debug!(
        "{}: last two results {} ({}) then {} ({})",
        team,
        older_score,
        older.id,
        newer_score,
        newer.id
    );

    if !rule.accepts(older_score, newer_score) {
        return Ok(None);
    }

    Ok(Some(Qualification {
        older,
        newer,
        older_score,
        newer_score,
    }))
}
