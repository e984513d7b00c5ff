use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{window_fits, Config, MAX_WINDOW_DAYS};
use crate::models::{Match, MatchPrediction};
use crate::services::{distinct_teams, tag_matches_for_team, DataFetcher, MatchSource, PredictionEngine, StaticSource};
use crate::utils::{format_date, ht_ft_code, parse_date, suggest_team_names};

/// Where matches come from and which days to ask for.
pub struct WindowArgs {
    pub start: Option<String>,
    pub end: Option<String>,
    pub input: Option<PathBuf>,
}

pub struct PredictArgs {
    pub window: WindowArgs,
    pub csv: Option<PathBuf>,
    pub json: bool,
}

fn open_source(config: &Config, input: Option<&Path>) -> Result<Arc<dyn MatchSource>> {
    match input {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
            let source = StaticSource::from_json(&raw).with_context(|| format!("{} is not a match list", path.display()))?;
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(DataFetcher::new(&config.feed)?)),
    }
}

fn resolve_window(config: &Config, window: &WindowArgs) -> Result<(NaiveDate, NaiveDate)> {
    let (default_start, default_end) = config.default_window(Utc::now().date_naive());
    let start = match window.start.as_deref() {
        Some(raw) => parse_date(raw).with_context(|| format!("invalid --start {raw:?}"))?,
        None => default_start,
    };
    let end = match window.end.as_deref() {
        Some(raw) => parse_date(raw).with_context(|| format!("invalid --end {raw:?}"))?,
        None => default_end,
    };
    if !window_fits(start, end) {
        anyhow::bail!("window {start} to {end} is longer than {} days", 2 * MAX_WINDOW_DAYS + 1);
    }
    Ok((start, end))
}

async fn load_matches(config: &Config, window: &WindowArgs) -> Result<(Vec<Match>, NaiveDate, NaiveDate)> {
    let (start, end) = resolve_window(config, window)?;
    let source = open_source(config, window.input.as_deref())?;
    let matches = source.fetch_window(start, end).await;
    Ok((matches, start, end))
}

pub async fn generate_predictions(config: &Config, args: PredictArgs) -> Result<()> {
    let (matches, start, end) = load_matches(config, &args.window).await?;
    println!("📥 {} matches between {} and {}", matches.len(), start, end);

    if matches.is_empty() {
        println!("📭 No matches found. Try a wider window with --start/--end");
        return Ok(());
    }

    let engine = PredictionEngine::with_config(config.predictor.clone());
    let report = engine.run(&matches, Utc::now());

    if let Some(path) = &args.csv {
        write_csv(path, &report.predictions)?;
        println!("💾 Wrote {} predictions to {}", report.predictions.len(), path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.predictions)?);
        return Ok(());
    }

    println!(
        "🔮 {} teams analyzed, {} with two results, {} matching the pattern\n",
        report.stats.teams, report.stats.with_enough_matches, report.stats.with_valid_pattern
    );

    if report.predictions.is_empty() {
        println!("📭 No team fits the pattern right now.");
        return Ok(());
    }

    let mut predictions = report.predictions;
    predictions.sort_by_key(|p| p.match_date);

    println!("🎯 Predictions:");
    for (i, p) in predictions.iter().enumerate() {
        println!(
            "{}. {} {} - {} (analyzed: {})",
            i + 1,
            format_date(p.match_date),
            p.home_team,
            p.away_team,
            p.team
        );
        println!(
            "   {} | last two: {} | confidence {:.0}%",
            p.prediction,
            p.last_two_scores.join(", "),
            p.confidence * 100.0
        );
    }

    Ok(())
}

pub fn write_csv(path: &Path, predictions: &[MatchPrediction]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "team",
        "home_team",
        "away_team",
        "match_date",
        "match_time",
        "match_id",
        "prediction",
        "confidence",
        "last_two_scores",
    ])?;
    for p in predictions {
        let match_date = p.match_date.to_rfc3339();
        let confidence = format!("{:.2}", p.confidence);
        let scores = p.last_two_scores.join(" ");
        writer.write_record([
            p.team.as_str(),
            p.home_team.as_str(),
            p.away_team.as_str(),
            match_date.as_str(),
            p.match_time.as_deref().unwrap_or_default(),
            p.match_id.as_str(),
            p.prediction.as_str(),
            confidence.as_str(),
            scores.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub async fn query_team(config: &Config, team_name: &str, window: WindowArgs) -> Result<()> {
    let (matches, _, _) = load_matches(config, &window).await?;

    println!("🔍 Searching for team: {}", team_name);

    let tagged = tag_matches_for_team(&matches, team_name, config.predictor.name_matching, Utc::now());

    if tagged.past.is_empty() && tagged.future.is_empty() {
        println!("❌ No matches found for '{}'", team_name);

        let teams = distinct_teams(&matches);
        let suggestions = suggest_team_names(team_name, &teams, 5);
        if !suggestions.is_empty() {
            println!("\n💡 Did you mean:");
            for team in suggestions {
                println!("   • {}", team);
            }
        }
        return Ok(());
    }

    println!("\n📅 Recent Matches:");
    if tagged.past.is_empty() {
        println!("   No recent matches found");
    }
    for m in tagged.past.iter().take(10) {
        println!(
            "   {} {} {}-{} {}  (HT/FT {})",
            format_date(m.date),
            m.home_team.name,
            m.score.home,
            m.score.away,
            m.away_team.name,
            ht_ft_code(m)
        );
    }

    println!("\n📅 Upcoming Matches:");
    if tagged.future.is_empty() {
        println!("   No upcoming matches found");
    }
    for m in tagged.future.iter().take(5) {
        println!(
            "   {} {} vs {}{}",
            m.date.format("%d.%m %H:%M"),
            m.home_team.name,
            m.away_team.name,
            m.time.as_deref().map(|t| format!(" ({t})")).unwrap_or_default()
        );
    }

    Ok(())
}
