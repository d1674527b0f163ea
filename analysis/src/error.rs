use crate::source::Side;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("unexpected end of demo stream")]
    UnexpectedEnd,
    #[error("failed to decode demo: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("team size must be at least 1")]
    TeamSize,
    #[error("max rounds must be a positive even number, got {0}")]
    MaxRounds(i32),
    #[error("overtime max rounds must be a positive even number, got {0}")]
    OvertimeMaxRounds(i32),
    #[error("economic thresholds are out of order (eco {eco}, force buy {force_buy})")]
    EconomyThresholds { eco: i32, force_buy: i32 },
    #[error("{name} must be a finite, non-negative number of seconds")]
    Duration { name: &'static str },
}

/// Failures of the post analysis consistency check, these point at defects in the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("scores {t}:{ct} do not add up to {rounds_played} played rounds")]
    ScoreMismatch { t: i32, ct: i32, rounds_played: i32 },
    #[error("negative score {t}:{ct}")]
    NegativeScore { t: i32, ct: i32 },
    #[error("only {0} rounds were played")]
    TooFewRounds(i32),
    #[error("no side reached the winning score ({t}:{ct})")]
    NoWinner { t: i32, ct: i32 },
    #[error("final score {t}:{ct} does not end the match")]
    MatchNotOver { t: i32, ct: i32 },
    #[error("side {side:?} only had {count} active participants")]
    NotEnoughParticipants { side: Side, count: usize },
    #[error("round {0} is missing from the valid round table")]
    MissingRound(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("consistency check failed: {0}")]
    Inconsistent(#[from] ConsistencyError),
    #[error("no valid round was found in the demo")]
    NoValidRounds,
}
