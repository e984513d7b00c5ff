pub mod data_fetcher;
pub mod fixture_linker;
pub mod normalizer;
pub mod pattern;
pub mod predictor;
pub mod team_index;

pub use data_fetcher::*;
pub use fixture_linker::*;
pub use normalizer::*;
pub use pattern::*;
pub use predictor::*;
pub use team_index::*;
