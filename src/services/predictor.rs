use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Match, MatchPrediction};
use crate::services::fixture_linker::link_fixture;
use crate::services::pattern::{evaluate, AnalysisError, PatternRule};
use crate::services::team_index::{tag_matches_for_team, NameMatching};

pub const DEFAULT_CONFIDENCE: f64 = 0.85;
pub const DEFAULT_LABEL: &str = "HT/FT: 1/2 or 2/1";

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub rule: PatternRule,
    pub name_matching: NameMatching,
    pub confidence: f64,
    pub label: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            rule: PatternRule::default(),
            name_matching: NameMatching::default(),
            confidence: DEFAULT_CONFIDENCE,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

/// Per-run counters, reported next to the predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PredictionStats {
    pub teams: usize,
    pub with_enough_matches: usize,
    pub with_valid_pattern: usize,
    pub with_predictions: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PredictionReport {
    pub predictions: Vec<MatchPrediction>,
    pub stats: PredictionStats,
}

enum TeamOutcome {
    NotEnoughMatches,
    NoPattern,
    Unlinked,
    Predicted(MatchPrediction),
}

#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    config: PredictorConfig,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Predictions for the current instant. Absent input yields none.
    pub fn predict(&self, matches: Option<&[Match]>) -> Vec<MatchPrediction> {
        match matches {
            Some(matches) => self.run(matches, Utc::now()).predictions,
            None => Vec::new(),
        }
    }

    /// Analyze every team in `matches` as of `now`.
    ///
    /// Teams are independent, so they are analyzed on the rayon pool; the
    /// output keeps the order in which teams first appear in `matches`.
    pub fn run(&self, matches: &[Match], now: DateTime<Utc>) -> PredictionReport {
        if matches.is_empty() {
            return PredictionReport::default();
        }

        let teams = distinct_teams(matches);
        tracing::info!("Analyzing {} teams across {} matches", teams.len(), matches.len());

        let outcomes: Vec<(&str, Result<TeamOutcome, AnalysisError>)> = teams
            .par_iter()
            .map(|team| (*team, self.analyze_team(matches, team, now)))
            .collect();

        let mut report = PredictionReport {
            predictions: Vec::new(),
            stats: PredictionStats {
                teams: teams.len(),
                ..PredictionStats::default()
            },
        };

        for (team, outcome) in outcomes {
            match outcome {
                Ok(TeamOutcome::NotEnoughMatches) => {}
                Ok(TeamOutcome::NoPattern) => report.stats.with_enough_matches += 1,
                Ok(TeamOutcome::Unlinked) => {
                    report.stats.with_enough_matches += 1;
                    report.stats.with_valid_pattern += 1;
                    tracing::debug!("{} fits the pattern but has no next fixture", team);
                }
                Ok(TeamOutcome::Predicted(prediction)) => {
                    report.stats.with_enough_matches += 1;
                    report.stats.with_valid_pattern += 1;
                    report.stats.with_predictions += 1;
                    report.predictions.push(prediction);
                }
                Err(e) => {
                    report.stats.failed += 1;
                    tracing::warn!("Analysis failed for {}: {}", team, e);
                }
            }
        }

        tracing::info!(
            "Teams: {} total, {} with two results, {} matching the pattern, {} predicted, {} failed",
            report.stats.teams,
            report.stats.with_enough_matches,
            report.stats.with_valid_pattern,
            report.stats.with_predictions,
            report.stats.failed
        );

        report
    }

    fn analyze_team(&self, matches: &[Match], team: &str, now: DateTime<Utc>) -> Result<TeamOutcome, AnalysisError> {
        let tagged = tag_matches_for_team(matches, team, self.config.name_matching, now);
        if tagged.past.len() < 2 {
            return Ok(TeamOutcome::NotEnoughMatches);
        }

        let Some(qualification) = evaluate(team, &tagged.past, self.config.rule)? else {
            return Ok(TeamOutcome::NoPattern);
        };

        let Some(target) = link_fixture(&tagged.past, &tagged.future, qualification.newer) else {
            return Ok(TeamOutcome::Unlinked);
        };

        tracing::debug!(
            "{}: {} then {} -> {} vs {} on {}",
            team,
            qualification.older_score,
            qualification.newer_score,
            target.home_team.name,
            target.away_team.name,
            target.date.format("%Y-%m-%d %H:%M")
        );

        Ok(TeamOutcome::Predicted(MatchPrediction {
            team: team.to_string(),
            home_team: target.home_team.name.clone(),
            away_team: target.away_team.name.clone(),
            match_date: target.date,
            match_time: target.time.clone(),
            match_id: target.id.clone(),
            prediction: self.config.label.clone(),
            confidence: self.config.confidence,
            last_two_scores: vec![
                qualification.older_score.to_string(),
                qualification.newer_score.to_string(),
            ],
        }))
    }
}

/// Team names as they appear in `matches`, home before away, first
/// appearance first. Blank names are skipped.
pub fn distinct_teams(matches: &[Match]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut teams = Vec::new();
    for m in matches {
        for name in [m.home_team.name.as_str(), m.away_team.name.as_str()] {
            if !name.trim().is_empty() && seen.insert(name) {
                teams.push(name);
            }
        }
    }
    teams
}

/// Predictions with the default configuration, as of now.
pub fn predict<'a>(matches: impl Into<Option<&'a [Match]>>) -> Vec<MatchPrediction> {
    PredictionEngine::new().predict(matches.into())
}
