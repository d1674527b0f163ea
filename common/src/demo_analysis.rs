#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchSummary {
    pub info: crate::MatchInfo,
    pub t_score: i32,
    pub ct_score: i32,
    pub rounds_played: i32,
    pub overtime: bool,
    pub winner: MatchWinner,
    pub rounds: Vec<RoundSummary>,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MatchWinner {
    T,
    CT,
    Draw,
}

impl MatchWinner {
    pub fn label(&self) -> &'static str {
        match self {
            Self::T => "T",
            Self::CT => "CT",
            Self::Draw => "Draw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundSummary {
    pub number: i32,
    pub start_tick: i32,
    pub end_tick: i32,
    pub official_end_tick: Option<i32>,
    pub t_score: i32,
    pub ct_score: i32,
    pub winner: Option<String>,
    pub reason: Option<RoundWinReason>,
    pub t_round_type: RoundType,
    pub ct_round_type: RoundType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum RoundType {
    #[default]
    Normal,
    Pistol,
    Eco,
    ForceBuy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RoundWinReason {
    StillInProgress,
    BombExploded,
    VipEscaped,
    VipKilled,
    TSaved,
    CtStoppedEscape,
    RoundEndReasonTerroristsStopped,
    BombDefused,
    TKilled,
    CTKilled,
    Draw,
    HostageRescued,
    TimeRanOut,
    RoundEndReasonHostagesNotRescued,
    TerroristsNotEscaped,
    VipNotEscaped,
    GameStart,
    TSurrender,
    CTSurrender,
    TPlanted,
    CTReachedHostage,
}

/// One record per player, counters normalized by the rounds the player took part in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerSummary {
    pub id: u64,
    pub name: String,
    pub side: String,
    pub rounds: u32,

    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,

    pub kills_per_round: f64,
    pub deaths_per_round: f64,
    pub assists_per_round: f64,
    pub kd_diff_per_round: f64,
    pub adr: f64,
    pub kast: f64,
    pub headshot_rate: f64,
    pub accuracy: f64,

    pub clutches_per_round: f64,
    pub traders_per_round: f64,
    pub tradees_per_round: f64,
    pub first_kills_per_round: f64,
    pub flash_assists_per_round: f64,
    pub blind_kills_per_round: f64,
    pub blinded_victim_kills_per_round: f64,
    pub he_damage_per_round: f64,
    pub fire_damage_per_round: f64,
    pub time_flashing_per_round: f64,
    pub mvp_per_round: f64,

    pub pistol_win_rate: f64,
    pub eco_win_rate: f64,
    pub force_buy_win_rate: f64,
    pub round_win_rate: f64,

    pub kill_distance_avg: f64,
    pub duck_kills_per_round: f64,
    pub lurker_kills_per_round: f64,
    pub saved_teammates_per_round: f64,
    pub time_to_kill_avg: f64,
    pub sight_to_damage_avg: f64,
    pub damage_cost_per_round: f64,
    pub crosshair_displacement_avg: f64,

    pub bombs_planted: u32,
    pub bombs_defused: u32,
    pub defuse_attempts: u32,

    pub picked_item_value_per_round: f64,
    pub dropped_item_value_per_round: f64,
    pub health_won_per_round: f64,
    pub health_lost_per_round: f64,
    pub round_win_time_avg: f64,
    pub teammate_death_distance_avg: f64,
    pub map_occupancy: f64,

    pub weapon_kills: std::collections::BTreeMap<String, u32>,
    pub hit_groups: std::collections::BTreeMap<String, u32>,

    pub round_history: String,
    pub won_match: u8,
}
