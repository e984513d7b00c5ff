use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::FeedConfig;
use crate::models::Match;
use crate::services::normalizer::parse_feed_json;
use crate::utils::days_in_range;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for {date} failed: {source}")]
    Request {
        date: NaiveDate,
        #[source]
        source: reqwest::Error,
    },
    #[error("feed returned {status} for {date}")]
    Status { date: NaiveDate, status: StatusCode },
    #[error("malformed feed JSON for {date}: {source}")]
    Json {
        date: NaiveDate,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can hand over the normalized matches of a date window.
///
/// Failures stay inside the source: a day that cannot be fetched is logged
/// and simply contributes no matches.
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Match>;
}

// ── Livescores feed ──────────────────────────────────────────────────────────

pub struct DataFetcher {
    client: Client,
    base_url: String,
    stagger: Duration,
}

impl DataFetcher {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stagger: config.stagger,
        })
    }

    pub fn day_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/perform/p0/ajax/components/competition/livescores/json?sports[]=Soccer&matchDate={}",
            self.base_url,
            date.format("%Y-%m-%d")
        )
    }

    /// Delay before the request for the `index`-th day of a window.
    fn stagger_delay(&self, index: usize) -> Duration {
        self.stagger.saturating_mul(index.try_into().unwrap_or(u32::MAX))
    }

    /// Fetch and normalize one day of the feed.
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Match>, FeedError> {
        let response = self
            .client
            .get(self.day_url(date))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| FeedError::Request { date, source })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                date,
                status: response.status(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FeedError::Request { date, source })?;
        let (matches, stats) = parse_feed_json(&body, Utc::now()).map_err(|source| FeedError::Json { date, source })?;

        tracing::info!(
            "{}: {} records, {} with a betting code, {} kept ({} upcoming)",
            date,
            stats.total,
            stats.with_betting_code,
            stats.kept,
            stats.future
        );
        Ok(matches)
    }
}

#[async_trait]
impl MatchSource for DataFetcher {
    /// One request per calendar day, all in flight together; request `i` is
    /// delayed by `i` times the stagger. Results are concatenated in date order.
    async fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Match> {
        let days = days_in_range(start, end);
        tracing::info!("Fetching {} days of matches ({} to {})", days.len(), start, end);

        let fetches = days.iter().enumerate().map(|(index, &day)| async move {
            tokio::time::sleep(self.stagger_delay(index)).await;
            match self.fetch_day(day).await {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::error!("Feed fetch failed: {}", e);
                    Vec::new()
                }
            }
        });

        let matches: Vec<Match> = join_all(fetches).await.into_iter().flatten().collect();
        log_window_summary(&matches);
        matches
    }
}

// ── In-memory source ─────────────────────────────────────────────────────────

/// Matches loaded up front (a JSON export, a test fixture). The window keeps
/// matches whose kickoff falls on a day inside it.
pub struct StaticSource {
    matches: Vec<Match>,
}

impl StaticSource {
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let matches: Option<Vec<Match>> = serde_json::from_str(raw)?;
        Ok(Self::new(matches.unwrap_or_default()))
    }
}

#[async_trait]
impl MatchSource for StaticSource {
    async fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Match> {
        let matches: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| {
                let day = m.date.date_naive();
                start <= day && day <= end
            })
            .cloned()
            .collect();
        log_window_summary(&matches);
        matches
    }
}

fn log_window_summary(matches: &[Match]) {
    let mut teams = HashSet::new();
    let mut competitions = HashSet::new();
    for m in matches {
        teams.insert(m.home_team.name.as_str());
        teams.insert(m.away_team.name.as_str());
        if let Some(c) = m.competition.as_deref() {
            competitions.insert(c);
        }
    }
    tracing::info!(
        "Window holds {} matches, {} teams, {} competitions",
        matches.len(),
        teams.len(),
        competitions.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode as HttpStatus, routing::get, Router};
    use std::collections::HashMap;

    const DAY_PATH: &str = "/perform/p0/ajax/components/competition/livescores/json";

    fn upcoming_payload(id: &str) -> String {
        let kickoff = (Utc::now() + chrono::Duration::days(3)).timestamp_millis();
        serde_json::json!({
            "data": {"matches": {id: {
                "id": id,
                "homeTeam": {"id": "1", "name": "Alpha"},
                "awayTeam": {"id": "2", "name": "Beta"},
                "mstUtc": kickoff,
                "state": "pre",
                "status": "fixture",
                "iddaaCode": "7001"
            }}}
        })
        .to_string()
    }

    /// Local feed: 500 on the 1st, broken JSON on the 2nd, one fixture on the 3rd.
    async fn spawn_feed() -> String {
        let app = Router::new().route(
            DAY_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("matchDate").map(String::as_str) {
                    Some("2024-05-01") => (HttpStatus::INTERNAL_SERVER_ERROR, "boom".to_string()),
                    Some("2024-05-02") => (HttpStatus::OK, "{not json".to_string()),
                    _ => (HttpStatus::OK, upcoming_payload("ok")),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn failing_days_contribute_nothing() {
        let fetcher = DataFetcher::new(&FeedConfig {
            base_url: spawn_feed().await,
            stagger: Duration::ZERO,
            ..FeedConfig::default()
        })
        .unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(matches!(fetcher.fetch_day(start).await, Err(FeedError::Status { .. })));
        let broken = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert!(matches!(fetcher.fetch_day(broken).await, Err(FeedError::Json { .. })));

        let end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let ids: Vec<String> = fetcher.fetch_window(start, end).await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_feed_yields_empty_window() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = DataFetcher::new(&FeedConfig {
            base_url: format!("http://{addr}"),
            stagger: Duration::ZERO,
            timeout: Duration::from_secs(2),
            ..FeedConfig::default()
        })
        .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(fetcher.fetch_window(day, day).await.is_empty());
    }

    #[test]
    fn stagger_delay_grows_per_day_and_saturates() {
        let fetcher = DataFetcher::new(&FeedConfig::default()).unwrap();
        assert_eq!(fetcher.stagger_delay(0), Duration::ZERO);
        assert_eq!(fetcher.stagger_delay(3), Duration::from_millis(300));

        let slow = DataFetcher::new(&FeedConfig {
            stagger: Duration::from_millis(u64::MAX / 2),
            ..FeedConfig::default()
        })
        .unwrap();
        assert_eq!(slow.stagger_delay(usize::MAX), Duration::MAX);
    }

    #[test]
    fn day_url_targets_livescores_endpoint() {
        let fetcher = DataFetcher::new(&FeedConfig {
            base_url: "http://feed.test/".to_string(),
            ..FeedConfig::default()
        })
        .unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(
            fetcher.day_url(day),
            "http://feed.test/perform/p0/ajax/components/competition/livescores/json?sports[]=Soccer&matchDate=2024-05-09"
        );
    }

    #[tokio::test]
    async fn reversed_window_fetches_nothing() {
        let fetcher = DataFetcher::new(&FeedConfig::default()).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(fetcher.fetch_window(start, end).await.is_empty());
    }

    #[tokio::test]
    async fn static_source_filters_by_kickoff_day() {
        let raw = r#"[
            {"id": "1", "homeTeam": {"name": "A"}, "awayTeam": {"name": "B"},
             "score": {"home": "1", "away": "0"}, "date": "2024-05-01T19:00:00Z", "state": "post"},
            {"id": "2", "homeTeam": {"name": "A"}, "awayTeam": {"name": "C"},
             "score": {"home": "0", "away": "0"}, "date": "2024-05-20T19:00:00Z", "state": "pre"}
        ]"#;
        let source = StaticSource::from_json(raw).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 4, 25).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let window = source.fetch_window(start, end).await;
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, "1");
    }

    #[test]
    fn static_source_accepts_null() {
        assert!(StaticSource::from_json("null").unwrap().matches.is_empty());
    }
}
