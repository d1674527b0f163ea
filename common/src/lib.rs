pub mod demo_analysis;

pub use demo_analysis::{MatchSummary, MatchWinner, PlayerSummary, RoundSummary};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchInfo {
    pub map: String,
    pub tick_rate: f64,
}
