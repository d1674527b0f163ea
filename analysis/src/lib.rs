//! Two pass statistics for a recorded match.
//!
//! The first pass over a replay finds the rounds worth counting, the second pass then collects
//! per player statistics inside of those rounds only.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod mapcontrol;
pub mod navigation;
pub mod output;
pub mod player;
pub mod registry;
pub mod rounds;
pub mod scheduler;
pub mod score;
pub mod source;
pub mod tracker;

pub use config::AnalysisConfig;
pub use engine::{MatchAnalyser, Pass, Phase};
pub use error::{AnalysisError, ConfigError, ConsistencyError, SourceError};

use common::demo_analysis::MatchSummary;
use navigation::PlaceGraph;
use source::{EventSource, Replay};

/// Runs both passes over `replay` and summarizes the match.
pub fn analyse<R>(
    replay: &R,
    config: AnalysisConfig,
    places: Option<Box<dyn PlaceGraph>>,
) -> Result<MatchSummary, AnalysisError>
where
    R: Replay,
{
    config.validate()?;

    let header = replay.open()?.header().clone();
    tracing::info!(map = %header.map_name, tick_rate = header.tick_rate, "Analysing demo");

    let mut analyser = MatchAnalyser::new(config, header, places);

    match run_pass(replay, &mut analyser) {
        Ok(()) => {}
        Err(SourceError::UnexpectedEnd) if analyser.match_ended() => {
            tracing::warn!("Demo ended unexpectedly after the final round");
        }
        Err(e) => return Err(e.into()),
    }
    if analyser.valid_rounds().is_empty() {
        return Err(AnalysisError::NoValidRounds);
    }

    analyser.begin_statistics();
    match run_pass(replay, &mut analyser) {
        Ok(()) => {}
        Err(SourceError::UnexpectedEnd) if analyser.is_analysed() => {
            tracing::warn!("Demo ended unexpectedly after the match was analysed");
        }
        Err(e) => return Err(e.into()),
    }

    if analyser.config().check_consistency {
        output::check_consistency(&analyser)?;
    }

    Ok(output::summarize(&analyser))
}

#[tracing::instrument(skip_all, fields(pass = ?analyser.pass()))]
fn run_pass<R>(replay: &R, analyser: &mut MatchAnalyser) -> Result<(), SourceError>
where
    R: Replay,
{
    let mut source = replay.open()?;

    let mut events = 0_usize;
    while let Some(event) = source.next_event()? {
        analyser.handle(&event, source.state());
        events += 1;
    }

    tracing::info!(
        events,
        rounds = analyser.valid_rounds().len(),
        analysed = analyser.is_analysed(),
        "Pass finished"
    );
    Ok(())
}
