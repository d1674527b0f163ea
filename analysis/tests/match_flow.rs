mod scripted;

use analysis::equipment::RoundEndReason;
use analysis::source::{DemoEvent, Side};
use analysis::{AnalysisConfig, AnalysisError, SourceError};
use common::demo_analysis::MatchWinner;
use pretty_assertions::assert_eq;
use scripted::{MatchScript, Team};

fn analyse(script: &MatchScript) -> Result<common::MatchSummary, AnalysisError> {
    analysis::analyse(&script.build(), AnalysisConfig::default(), None)
}

#[test]
#[tracing_test::traced_test]
fn regulation_win() {
    let script = scripted::regulation_match();
    let summary = analyse(&script).unwrap();

    assert_eq!(16, summary.rounds_played);
    assert_eq!((0, 16), (summary.t_score, summary.ct_score));
    assert_eq!(MatchWinner::CT, summary.winner);
    assert!(!summary.overtime);
    assert_eq!("de_scripted", summary.info.map);

    let numbers: Vec<i32> = summary.rounds.iter().map(|r| r.number).collect();
    assert_eq!((1..=16).collect::<Vec<_>>(), numbers);
    for round in summary.rounds.iter() {
        assert_eq!(round.number, round.t_score + round.ct_score);
        assert!(round.start_tick <= round.end_tick);
        assert!(round.official_end_tick.is_some_and(|o| o >= round.end_tick));
    }
    assert_eq!(Some("T"), summary.rounds[0].winner.as_deref());
    assert_eq!(Some("CT"), summary.rounds[15].winner.as_deref());

    assert_eq!(10, summary.players.len());
    for player in summary.players.iter() {
        assert_eq!(16, player.rounds);
        if Team::A.members().contains(&player.id) {
            assert_eq!("1".repeat(16), player.round_history);
            assert_eq!(1, player.won_match);
            assert_eq!("CT", player.side);
        } else {
            assert_eq!("0".repeat(16), player.round_history);
            assert_eq!(0, player.won_match);
        }
    }
}

#[test]
#[tracing_test::traced_test]
fn overtime_win() {
    let script = scripted::overtime_match();
    let summary = analyse(&script).unwrap();

    assert_eq!(36, summary.rounds_played);
    assert_eq!((17, 19), (summary.t_score, summary.ct_score));
    assert_eq!(MatchWinner::CT, summary.winner);
    assert!(summary.overtime);
    assert_eq!(36, summary.rounds.len());

    let winner = summary.players.iter().find(|p| p.id == 1).unwrap();
    assert_eq!(1, winner.won_match);
    let loser = summary.players.iter().find(|p| p.id == 6).unwrap();
    assert_eq!(0, loser.won_match);
}

#[test]
#[tracing_test::traced_test]
fn repeated_round_end_counts_once() {
    let mut script = MatchScript::new();
    script.repeat_round_end = true;
    script.begin();
    script.play_match(&[Team::A; 16]);

    let summary = analyse(&script).unwrap();

    assert_eq!(16, summary.rounds_played);
    assert_eq!(16, summary.rounds.len());
    let player = summary.players.iter().find(|p| p.id == 1).unwrap();
    assert_eq!(16, player.rounds);
    assert_eq!("1".repeat(16), player.round_history);
}

#[test]
#[tracing_test::traced_test]
fn warmup_round_without_damage_is_dropped() {
    let mut script = MatchScript::new();
    script.begin();
    script.round_start();
    script.advance(640);
    script.end_round(Team::A);

    script.restart();
    let restart_tick = script.tick();
    script.play_match(&[Team::A; 16]);

    let summary = analyse(&script).unwrap();

    assert_eq!(16, summary.rounds_played);
    assert_eq!(16, summary.rounds.len());
    assert_eq!(restart_tick, summary.rounds[0].start_tick);
    assert_eq!((1, 0), (summary.rounds[0].t_score, summary.rounds[0].ct_score));
}

#[test]
#[tracing_test::traced_test]
fn round_starting_on_the_official_end_tick() {
    let spaced = analyse(&scripted::regulation_match()).unwrap();

    let mut script = MatchScript::new();
    script.same_tick_start = true;
    script.begin();
    script.play_match(&[Team::A; 16]);
    let same_tick = analyse(&script).unwrap();

    assert_eq!(16, same_tick.rounds.len());
    for pair in same_tick.rounds.windows(2) {
        assert_eq!(pair[0].official_end_tick, Some(pair[1].start_tick));
    }
    assert_eq!(spaced.players, same_tick.players);
    let b1 = same_tick.players.iter().find(|p| p.id == 6).unwrap();
    assert_eq!(25.0, b1.kast);
}

#[test]
#[tracing_test::traced_test]
fn round_without_a_result_is_dropped() {
    let regulation = analyse(&scripted::regulation_match()).unwrap();

    for reason in [RoundEndReason::Draw, RoundEndReason::TSurrender] {
        let mut script = MatchScript::new();
        script.begin();
        script.abort_round(reason);
        let start = script.tick();
        script.play_match(&[Team::A; 16]);

        let summary = analyse(&script).unwrap();

        let numbers: Vec<i32> = summary.rounds.iter().map(|r| r.number).collect();
        assert_eq!((1..=16).collect::<Vec<_>>(), numbers, "{:?}", reason);
        assert_eq!(start, summary.rounds[0].start_tick);
        assert_eq!((1, 0), (summary.rounds[0].t_score, summary.rounds[0].ct_score));
        // Shots and damage from the dropped round are not counted
        assert_eq!(regulation.players, summary.players);
    }
    assert!(logs_contain("Round was not played out"));
}

#[test]
#[tracing_test::traced_test]
fn round_without_full_teams_is_dropped() {
    let mut script = MatchScript::new();
    script.begin();
    script.play_match(&[Team::A, Team::A]);

    script.change_team(5, Side::Spectators);
    script.round_start();
    script.advance(640);
    for victim in Team::B.members() {
        script.kill(1, victim);
        script.advance(32);
    }
    script.end_round(Team::A);

    let a_side = script.side_of(Team::A);
    script.change_team(5, a_side);
    script.play_round(Team::A);

    let summary = analyse(&script).unwrap();

    let numbers: Vec<i32> = summary.rounds.iter().map(|r| r.number).collect();
    assert_eq!(vec![1, 2, 4], numbers);
    for id in [1, 5, 6] {
        let player = summary.players.iter().find(|p| p.id == id).unwrap();
        assert_eq!(3, player.rounds, "{}", player.name);
    }
    assert!(logs_contain("Round without full teams"));
}

#[test]
#[tracing_test::traced_test]
fn round_with_unexpected_start_money_is_dropped() {
    let mut script = MatchScript::new();
    script.begin();
    script.emit(DemoEvent::ConVarsChanged(vec![(
        "mp_startmoney".to_owned(),
        "1000".to_owned(),
    )]));
    script.round_start();
    script.advance(640);
    for victim in Team::B.members() {
        script.kill(1, victim);
        script.advance(32);
    }
    script.end_round(Team::A);

    script.emit(DemoEvent::ConVarsChanged(vec![(
        "mp_startmoney".to_owned(),
        "800".to_owned(),
    )]));
    let start = script.tick();
    script.play_round(Team::A);

    let summary = analyse(&script).unwrap();

    let numbers: Vec<i32> = summary.rounds.iter().map(|r| r.number).collect();
    assert_eq!(vec![2], numbers);
    assert_eq!(start, summary.rounds[0].start_tick);
    let kills: u32 = summary.players.iter().map(|p| p.kills).sum();
    assert_eq!(6, kills);
    assert!(logs_contain("Unexpected start money"));
}

#[test]
#[tracing_test::traced_test]
fn match_starts_late_once_the_teams_are_full() {
    let mut script = MatchScript::new();
    script.player_mut(10).side = Side::Spectators;
    script.begin();
    script.change_team(10, Side::CounterTerrorists);
    script.round_start();
    script.advance(640);

    let late = script.tick();
    script.hurt(1, 6, 10);
    script.advance(32);
    for victim in Team::B.members() {
        script.kill(1, victim);
        script.advance(32);
    }
    script.end_round(Team::A);

    let summary = analyse(&script).unwrap();

    assert_eq!(1, summary.rounds_played);
    assert_eq!(late, summary.rounds[0].start_tick);
    let a1 = summary.players.iter().find(|p| p.id == 1).unwrap();
    assert_eq!(5, a1.kills);
    assert_eq!(1, a1.rounds);
    let b5 = summary.players.iter().find(|p| p.id == 10).unwrap();
    assert_eq!(1, b5.rounds);
    assert!(logs_contain("Late match start"));
    assert!(logs_contain("Late round start"));
}

#[derive(Debug, Clone, Copy)]
enum Leave {
    Disconnect,
    Spectate,
}

#[test]
#[tracing_test::traced_test]
fn player_leaving_mid_round_opens_a_clutch() {
    for leave in [Leave::Disconnect, Leave::Spectate] {
        let mut script = MatchScript::new();
        script.begin();
        script.round_start();
        script.advance(640);
        script.hurt(4, 6, 20);
        script.advance(32);
        for victim in [1, 2, 3] {
            script.kill(6, victim);
            script.advance(32);
        }

        match leave {
            Leave::Disconnect => script.disconnect(4),
            Leave::Spectate => script.change_team(4, Side::Spectators),
        };
        script.advance(32);
        for victim in Team::B.members() {
            script.kill(5, victim);
            script.advance(32);
        }
        script.end_round(Team::A);

        let a_side = script.side_of(Team::A);
        match leave {
            Leave::Disconnect => script.reconnect(4, a_side),
            Leave::Spectate => script.change_team(4, a_side),
        };
        script.play_round(Team::A);

        let summary = analyse(&script).unwrap();

        assert_eq!(2, summary.rounds_played, "{:?}", leave);
        let clutcher = summary.players.iter().find(|p| p.id == 5).unwrap();
        assert_eq!(0.5, clutcher.clutches_per_round, "{:?}", leave);
        // Damage from before leaving is kept, only the second round counts as played
        let returning = summary.players.iter().find(|p| p.id == 4).unwrap();
        assert_eq!(1, returning.rounds, "{:?}", leave);
        assert_eq!("1", returning.round_history);
        assert_eq!(120.0, returning.adr, "{:?}", leave);
    }
}

#[test]
#[tracing_test::traced_test]
fn late_restart_is_ignored() {
    let mut script = MatchScript::new();
    script.begin();
    script.play_match(&[Team::A; 7]);
    script.emit(analysis::source::DemoEvent::MatchStart);
    script.play_match(&[Team::A; 9]);

    let summary = analyse(&script).unwrap();

    assert_eq!(16, summary.rounds_played);
    assert_eq!(16, summary.rounds.len());
    assert_eq!(MatchWinner::CT, summary.winner);
}

#[test]
#[tracing_test::traced_test]
fn unexpected_end_after_the_match_is_tolerated() {
    let script = scripted::regulation_match();
    let replay = script.build().truncated();

    let summary = analysis::analyse(&replay, AnalysisConfig::default(), None).unwrap();
    assert_eq!(16, summary.rounds_played);
    assert!(logs_contain("Demo ended unexpectedly"));
}

#[test]
fn unexpected_end_during_the_match_fails() {
    let script = scripted::regulation_match();
    let replay = script.build();
    let half = replay.len() / 2;
    let replay = replay.cut_at(half).truncated();

    let result = analysis::analyse(&replay, AnalysisConfig::default(), None);
    assert!(matches!(
        result,
        Err(AnalysisError::Source(SourceError::UnexpectedEnd))
    ));
}

#[test]
fn demo_without_rounds() {
    let mut script = MatchScript::new();
    script.begin();
    script.advance(6400);

    let result = analyse(&script);
    assert!(matches!(result, Err(AnalysisError::NoValidRounds)));
}

#[test]
fn invalid_config_is_rejected() {
    let script = scripted::regulation_match();
    let config = AnalysisConfig {
        max_rounds: 29,
        ..Default::default()
    };

    let result = analysis::analyse(&script.build(), config, None);
    assert!(matches!(result, Err(AnalysisError::Config(_))));
}

#[test]
#[tracing_test::traced_test]
fn consistency_check_on_a_full_match() {
    let script = scripted::regulation_match();
    let config = AnalysisConfig {
        check_consistency: true,
        ..Default::default()
    };

    let summary = analysis::analyse(&script.build(), config, None).unwrap();
    assert_eq!(16, summary.rounds_played);
}

#[test]
fn consistency_check_on_an_unfinished_match() {
    let mut script = MatchScript::new();
    script.begin();
    script.play_match(&[Team::A; 10]);
    let config = AnalysisConfig {
        check_consistency: true,
        ..Default::default()
    };

    let result = analysis::analyse(&script.build(), config, None);
    assert!(matches!(
        result,
        Err(AnalysisError::Inconsistent(
            analysis::ConsistencyError::TooFewRounds(10)
        ))
    ));
}
