//! Turns the state of a finished analysis into the serializable summary.

use crate::engine::MatchAnalyser;
use crate::error::ConsistencyError;
use crate::player::TrackedPlayer;
use crate::source::Side;
use common::demo_analysis::{MatchSummary, MatchWinner, PlayerSummary, RoundSummary};

fn ratio(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        0.0
    } else {
        value / divisor
    }
}

fn percentage(value: u32, divisor: u32) -> f64 {
    ratio(value as f64, divisor as f64) * 100.0
}

pub fn winner(t: i32, ct: i32) -> MatchWinner {
    match t.cmp(&ct) {
        std::cmp::Ordering::Greater => MatchWinner::T,
        std::cmp::Ordering::Less => MatchWinner::CT,
        std::cmp::Ordering::Equal => MatchWinner::Draw,
    }
}

pub fn summarize(analyser: &MatchAnalyser) -> MatchSummary {
    let ledger = analyser.ledger();
    let winner = winner(ledger.t(), ledger.ct());

    let rounds = analyser
        .valid_rounds()
        .iter()
        .map(|record| {
            let outcome = analyser.outcomes().iter().find(|o| o.number == record.number);
            RoundSummary {
                number: record.number,
                start_tick: record.start_tick,
                end_tick: record.end_tick,
                official_end_tick: record.official_end_tick,
                t_score: record.t_score,
                ct_score: record.ct_score,
                winner: outcome.map(|o| o.winner.label().to_owned()),
                reason: outcome.and_then(|o| o.reason),
                t_round_type: outcome.map(|o| o.t_round_type).unwrap_or_default(),
                ct_round_type: outcome.map(|o| o.ct_round_type).unwrap_or_default(),
            }
        })
        .collect();

    let players = analyser
        .players()
        .all()
        .into_iter()
        .filter(|p| p.rounds() > 0)
        .map(|p| player_summary(p, winner))
        .collect();

    MatchSummary {
        info: common::MatchInfo {
            map: analyser.header().map_name.clone(),
            tick_rate: analyser.tick_rate(),
        },
        t_score: ledger.t(),
        ct_score: ledger.ct(),
        rounds_played: ledger.rounds_played(),
        overtime: analyser.is_overtime(),
        winner,
        rounds,
        players,
    }
}

fn player_summary(player: &TrackedPlayer, winner: MatchWinner) -> PlayerSummary {
    let stats = &player.stats;
    let rounds = player.rounds();
    let per_round = |value: f64| ratio(value, rounds as f64);
    let special = &stats.special_rounds;

    let won_match = match winner {
        MatchWinner::Draw => true,
        other => other.label() == player.side.label(),
    };

    PlayerSummary {
        id: player.id.0,
        name: player.name.clone(),
        side: player.side.label().to_owned(),
        rounds,
        kills: stats.kills,
        deaths: stats.deaths,
        assists: stats.assists,
        kills_per_round: per_round(stats.kills as f64),
        deaths_per_round: per_round(stats.deaths as f64),
        assists_per_round: per_round(stats.assists as f64),
        kd_diff_per_round: per_round(stats.kills as f64 - stats.deaths as f64),
        adr: per_round(stats.damage as f64),
        kast: percentage(stats.kast, rounds),
        headshot_rate: percentage(stats.headshot_kills, stats.kills),
        accuracy: percentage(stats.shots_hit, stats.shots),
        clutches_per_round: per_round(stats.clutches_won as f64),
        traders_per_round: per_round(stats.traders as f64),
        tradees_per_round: per_round(stats.tradees as f64),
        first_kills_per_round: per_round(stats.first_kills as f64),
        flash_assists_per_round: per_round(stats.flash_assists as f64),
        blind_kills_per_round: per_round(stats.blind_kills as f64),
        blinded_victim_kills_per_round: per_round(stats.blinded_victim_kills as f64),
        he_damage_per_round: per_round(stats.he_damage as f64),
        fire_damage_per_round: per_round(stats.fire_damage as f64),
        time_flashing_per_round: per_round(stats.time_flashing_secs),
        mvp_per_round: per_round(stats.mvps as f64),
        pistol_win_rate: percentage(special.pistol_won, special.pistol_won + special.pistol_lost),
        eco_win_rate: percentage(special.eco_won, special.eco_won + special.eco_lost),
        force_buy_win_rate: percentage(
            special.force_buy_won,
            special.force_buy_won + special.force_buy_lost,
        ),
        round_win_rate: percentage(stats.rounds_won, rounds),
        kill_distance_avg: ratio(stats.kill_distance, stats.kills as f64),
        duck_kills_per_round: per_round(stats.duck_kills as f64),
        lurker_kills_per_round: per_round(stats.lurker_kills as f64),
        saved_teammates_per_round: per_round(stats.saved_teammates as f64),
        time_to_kill_avg: ratio(stats.time_to_kill_secs, stats.timed_kills as f64),
        sight_to_damage_avg: ratio(stats.sight_to_damage_secs, stats.first_damages as f64),
        damage_cost_per_round: per_round(stats.damage_cost),
        crosshair_displacement_avg: ratio(
            stats.crosshair_displacement,
            stats.crosshair_samples as f64,
        ),
        bombs_planted: stats.bombs_planted,
        bombs_defused: stats.bombs_defused,
        defuse_attempts: stats.defuse_attempts,
        picked_item_value_per_round: per_round(stats.picked_item_value as f64),
        dropped_item_value_per_round: per_round(stats.dropped_item_value as f64),
        health_won_per_round: per_round(stats.health_won as f64),
        health_lost_per_round: per_round(stats.health_lost as f64),
        round_win_time_avg: ratio(stats.round_win_time_secs, stats.rounds_won as f64),
        teammate_death_distance_avg: per_round(stats.teammate_death_distance),
        map_occupancy: per_round(stats.map_occupancy),
        weapon_kills: stats
            .weapon_kills
            .iter()
            .map(|(category, count)| ((*category).to_owned(), *count))
            .collect(),
        hit_groups: stats
            .hit_groups
            .iter()
            .map(|(group, count)| (group.label().to_owned(), *count))
            .collect(),
        round_history: player
            .round_history
            .iter()
            .map(|won| if *won { '1' } else { '0' })
            .collect(),
        won_match: u8::from(won_match),
    }
}

/// Sanity checks on a finished analysis, a failure means the engine itself went wrong.
pub fn check_consistency(analyser: &MatchAnalyser) -> Result<(), ConsistencyError> {
    let config = analyser.config();
    let ledger = analyser.ledger();
    let (t, ct) = (ledger.t(), ledger.ct());

    if t < 0 || ct < 0 {
        return Err(ConsistencyError::NegativeScore { t, ct });
    }
    if t + ct != ledger.rounds_played() {
        return Err(ConsistencyError::ScoreMismatch {
            t,
            ct,
            rounds_played: ledger.rounds_played(),
        });
    }

    let win_rounds = config.normal_time_win_rounds();
    if ledger.rounds_played() < win_rounds {
        return Err(ConsistencyError::TooFewRounds(ledger.rounds_played()));
    }
    if t < win_rounds && ct < win_rounds {
        return Err(ConsistencyError::NoWinner { t, ct });
    }
    if !ledger.check_match_end(t, ct).0 {
        return Err(ConsistencyError::MatchNotOver { t, ct });
    }

    for side in [Side::Terrorists, Side::CounterTerrorists] {
        let count = analyser
            .players()
            .all()
            .into_iter()
            .filter(|p| p.side == side && p.stats.kills > 0 && p.stats.deaths > 0)
            .count();
        if count < config.team_size {
            return Err(ConsistencyError::NotEnoughParticipants { side, count });
        }
    }

    if let Some(missing) = analyser.valid_rounds().first_gap() {
        return Err(ConsistencyError::MissingRound(missing));
    }

    Ok(())
}
