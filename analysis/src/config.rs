use crate::error::ConfigError;
use crate::source::{seconds_to_ticks, Tick};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Players per side for a round to count
    pub team_size: usize,
    pub max_rounds: i32,
    /// A match start after this many rounds is treated as a false restart
    pub min_valid_rounds: i32,
    /// Overtime length, both halves together
    pub overtime_max_rounds: i32,

    pub start_money: i32,
    pub overtime_start_money: i32,
    pub default_pistol_price: i32,
    pub eco_max_spend: i32,
    pub force_buy_max_spend: i32,

    pub trade_window_secs: f64,
    pub flash_assist_grace_secs: f64,
    pub map_check_interval_secs: f64,
    pub before_crosshair_secs: f64,
    pub after_first_kill_secs: f64,
    pub before_save_secs: f64,
    pub max_saved_health: i32,
    pub pov_to_damage_max_secs: f64,
    pub time_to_kill_max_secs: f64,

    pub check_consistency: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            team_size: 5,
            max_rounds: 30,
            min_valid_rounds: 5,
            overtime_max_rounds: 6,
            start_money: 800,
            overtime_start_money: 16000,
            default_pistol_price: 200,
            eco_max_spend: 5000,
            force_buy_max_spend: 16000,
            trade_window_secs: 5.0,
            flash_assist_grace_secs: 0.0,
            map_check_interval_secs: 1.0,
            before_crosshair_secs: 0.5,
            after_first_kill_secs: 2.0,
            before_save_secs: 2.0,
            max_saved_health: 30,
            pov_to_damage_max_secs: 3.0,
            time_to_kill_max_secs: 10.0,
            check_consistency: false,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.team_size == 0 {
            return Err(ConfigError::TeamSize);
        }
        if self.max_rounds <= 0 || self.max_rounds % 2 != 0 {
            return Err(ConfigError::MaxRounds(self.max_rounds));
        }
        if self.overtime_max_rounds <= 0 || self.overtime_max_rounds % 2 != 0 {
            return Err(ConfigError::OvertimeMaxRounds(self.overtime_max_rounds));
        }
        if self.eco_max_spend > self.force_buy_max_spend {
            return Err(ConfigError::EconomyThresholds {
                eco: self.eco_max_spend,
                force_buy: self.force_buy_max_spend,
            });
        }

        let durations = [
            ("trade_window_secs", self.trade_window_secs),
            ("flash_assist_grace_secs", self.flash_assist_grace_secs),
            ("map_check_interval_secs", self.map_check_interval_secs),
            ("before_crosshair_secs", self.before_crosshair_secs),
            ("after_first_kill_secs", self.after_first_kill_secs),
            ("before_save_secs", self.before_save_secs),
            ("pov_to_damage_max_secs", self.pov_to_damage_max_secs),
            ("time_to_kill_max_secs", self.time_to_kill_max_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Duration { name });
            }
        }
        if self.map_check_interval_secs == 0.0 {
            return Err(ConfigError::Duration {
                name: "map_check_interval_secs",
            });
        }

        Ok(())
    }

    /// Rounds needed to win in regular time
    pub fn normal_time_win_rounds(&self) -> i32 {
        self.max_rounds / 2 + 1
    }

    pub fn trade_window(&self, tick_rate: f64) -> Tick {
        seconds_to_ticks(self.trade_window_secs, tick_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Ok(()), AnalysisConfig::default().validate());
        assert_eq!(16, AnalysisConfig::default().normal_time_win_rounds());
    }

    #[test]
    fn rejects_odd_overtime() {
        let config = AnalysisConfig {
            overtime_max_rounds: 5,
            ..Default::default()
        };
        assert_eq!(Err(ConfigError::OvertimeMaxRounds(5)), config.validate());
    }

    #[test]
    fn rejects_zero_interval() {
        let config = AnalysisConfig {
            map_check_interval_secs: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Err(ConfigError::Duration {
                name: "map_check_interval_secs"
            }),
            config.validate()
        );
    }
}
