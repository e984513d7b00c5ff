//! Double-win HT/FT predictor: pulls daily football results from the
//! livescores feed and flags upcoming fixtures of teams whose last two
//! results were a one-goal win followed by a 2-1.

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use models::{Match, MatchPrediction};
pub use services::predict;
