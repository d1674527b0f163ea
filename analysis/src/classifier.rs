//! Economic classification of a round per side.

pub use common::demo_analysis::RoundType;

use crate::config::AnalysisConfig;

/// What a single player put into the round so far.
pub fn committed_spend(
    equipment_value: i32,
    round_start_money: i32,
    money: i32,
    default_pistol_price: i32,
) -> i32 {
    let equipment = (equipment_value - default_pistol_price).max(0);
    let spent = (round_start_money - money).max(0);
    equipment + spent
}

pub fn is_pistol_round(round_number: i32, max_rounds: i32) -> bool {
    let half = max_rounds / 2;
    round_number > 0 && round_number <= max_rounds && round_number % half == 1
}

pub fn classify(round_number: i32, side_spend: i32, config: &AnalysisConfig) -> RoundType {
    if is_pistol_round(round_number, config.max_rounds) {
        return RoundType::Pistol;
    }

    if side_spend <= config.eco_max_spend {
        RoundType::Eco
    } else if side_spend <= config.force_buy_max_spend {
        RoundType::ForceBuy
    } else {
        RoundType::Normal
    }
}

/// Won and lost counters for the rounds that are not normal buy rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialRoundRecord {
    pub pistol_won: u32,
    pub pistol_lost: u32,
    pub eco_won: u32,
    pub eco_lost: u32,
    pub force_buy_won: u32,
    pub force_buy_lost: u32,
}

impl SpecialRoundRecord {
    pub fn record(&mut self, round_type: RoundType, won: bool) {
        let counter = match (round_type, won) {
            (RoundType::Pistol, true) => &mut self.pistol_won,
            (RoundType::Pistol, false) => &mut self.pistol_lost,
            (RoundType::Eco, true) => &mut self.eco_won,
            (RoundType::Eco, false) => &mut self.eco_lost,
            (RoundType::ForceBuy, true) => &mut self.force_buy_won,
            (RoundType::ForceBuy, false) => &mut self.force_buy_lost,
            (RoundType::Normal, _) => return,
        };
        *counter += 1;
    }
}
