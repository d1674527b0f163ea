use super::{MatchAnalyser, Pass, Phase, RoundOutcome};
use crate::equipment::{self, RoundEndReason};
use crate::registry::ConnectOutcome;
use crate::rounds::RoundRecord;
use crate::source::{GameState, PlayerId, PlayerState, Side, TeamState, Tick};

pub(super) enum RoundEndSignal<'e> {
    /// Scores already include the round
    Score {
        team: &'e TeamState,
        opponent: &'e TeamState,
    },
    /// Scores from before the round was awarded
    End {
        reason: RoundEndReason,
        winner: &'e TeamState,
        loser: &'e TeamState,
    },
}

fn scores_by_side(team: &TeamState, opponent: &TeamState) -> Option<(i32, i32)> {
    match team.side {
        Side::Terrorists => Some((team.score, opponent.score)),
        Side::CounterTerrorists => Some((opponent.score, team.score)),
        _ => None,
    }
}

impl MatchAnalyser {
    pub(super) fn convars_changed(&mut self, vars: &[(String, String)]) {
        for (name, value) in vars {
            match name.as_str() {
                "mp_overtime_maxrounds" => match value.parse::<i32>() {
                    Ok(rounds) if self.ledger.set_overtime_max_rounds(rounds) => {
                        tracing::debug!(rounds, "Overtime length");
                    }
                    _ => tracing::warn!(%value, "Invalid overtime length"),
                },
                "mp_startmoney" => match value.parse::<i32>() {
                    Ok(money) => {
                        self.start_money = money;
                        self.money_set = true;
                        tracing::debug!(money, "Start money");
                    }
                    Err(_) => tracing::warn!(%value, "Invalid start money"),
                },
                _ => {}
            }
        }
    }

    pub(super) fn match_start(&mut self, state: &dyn GameState, tick: Tick) {
        if tick != 0 && self.last_match_start == Some(tick) {
            tracing::debug!(tick, "Match start already handled");
            return;
        }
        self.last_match_start = Some(tick);

        if !self.participants_valid(state, tick) {
            tracing::debug!(tick, "Not enough players to start the match");
            self.cancelled = true;
            if self.pass == Pass::Discovery {
                self.waiting_for_players = true;
            }
            return;
        }

        match self.pass {
            Pass::Discovery => {
                if !self.money_valid() {
                    tracing::debug!(tick, money = self.start_money, "Unexpected start money");
                    self.cancelled = true;
                    return;
                }
                self.round_start = tick;
                self.reset_match();
                self.reset_round(state, tick);
            }
            Pass::Statistics => {
                if !self.locate(tick) || self.current.map(|c| c.start_tick) != Some(tick) {
                    tracing::debug!(tick, "Match start outside of a valid round");
                    return;
                }
                self.reset_round(state, tick);
            }
        }
    }

    pub(super) fn round_start(&mut self, state: &dyn GameState, tick: Tick) {
        match self.pass {
            Pass::Discovery => {
                self.check_match_continuity();
                if !self.money_valid() {
                    tracing::debug!(tick, money = self.start_money, "Unexpected start money");
                    self.cancelled = true;
                    return;
                }
                if !self.match_valid() {
                    tracing::debug!(tick, "Round start outside of a running match");
                    self.cancelled = true;
                    return;
                }

                if self.phase == Phase::InRound && tick != self.round_start {
                    tracing::warn!(
                        tick,
                        previous = self.round_start,
                        "Round started while the previous one is still running"
                    );
                }
                self.round_start = tick;
                self.ledger.swap_sides();
                self.reset_round(state, tick);

                if !self.participants_valid(state, tick) {
                    tracing::debug!(tick, "Round without full teams");
                    self.cancelled = true;
                }
            }
            Pass::Statistics => {
                if !self.locate(tick) || self.current.map(|c| c.start_tick) != Some(tick) {
                    tracing::trace!(tick, "Round start outside of a valid round");
                    return;
                }
                self.reset_round(state, tick);
            }
        }
    }

    pub(super) fn round_end(&mut self, signal: RoundEndSignal<'_>, state: &dyn GameState, tick: Tick) {
        match self.pass {
            Pass::Discovery => self.discover_round_end(signal, tick),
            Pass::Statistics => {
                let (winner, reason) = match signal {
                    RoundEndSignal::Score { team, .. } => (team.side, None),
                    RoundEndSignal::End { reason, winner, .. } => (winner.side, Some(reason)),
                };
                self.commit_round(winner, reason, state, tick);
            }
        }
    }

    fn discover_round_end(&mut self, signal: RoundEndSignal<'_>, tick: Tick) {
        if !self.match_valid() {
            self.cancelled = true;
            return;
        }

        let (new_t, new_ct) = match signal {
            RoundEndSignal::Score { team, opponent } => {
                let (t, ct) = match scores_by_side(team, opponent) {
                    Some(s) => s,
                    None => {
                        tracing::debug!(?team, "Score update for a non playing team");
                        return;
                    }
                };
                if self.phase == Phase::InRound && !self.player_hurt {
                    tracing::debug!(tick, t, ct, "Score echo during a round");
                    self.ledger.update_score(t, ct);
                    return;
                }
                (t, ct)
            }
            RoundEndSignal::End {
                reason,
                winner,
                loser,
            } => {
                if self.phase != Phase::InRound {
                    tracing::debug!(tick, "Round already closed");
                    return;
                }
                if equipment::is_degenerate(reason) {
                    tracing::info!(tick, ?reason, "Round was not played out");
                    self.cancelled = true;
                    self.phase = Phase::RoundEndPending;
                    return;
                }
                if !self.player_hurt {
                    tracing::debug!(tick, "Round ended without any damage");
                    self.cancelled = true;
                }

                match winner.side {
                    Side::Terrorists => (winner.score + 1, loser.score),
                    Side::CounterTerrorists => (loser.score, winner.score + 1),
                    _ => {
                        tracing::debug!(?winner, "Round without a winning side");
                        self.cancelled = true;
                        (self.ledger.t(), self.ledger.ct())
                    }
                }
            }
        };

        if self.phase == Phase::InRound {
            if !self.cancelled && !self.ledger.update_score(new_t, new_ct) {
                self.cancelled = true;
            }
            if self.ledger.is_half_break(new_t, new_ct, self.match_ended) {
                self.money_set = false;
            }
            self.phase = Phase::RoundEndPending;

            if self.cancelled {
                tracing::info!(tick, t = new_t, ct = new_ct, "Round discarded");
            } else {
                self.round_end = tick;
                let record = RoundRecord {
                    number: self.ledger.rounds_played(),
                    start_tick: self.round_start,
                    end_tick: tick,
                    official_end_tick: None,
                    t_score: self.ledger.t(),
                    ct_score: self.ledger.ct(),
                };
                if self.rounds.insert(record) {
                    tracing::info!(
                        round = record.number,
                        start = record.start_tick,
                        end = record.end_tick,
                        t = record.t_score,
                        ct = record.ct_score,
                        "Round has been finished"
                    );
                }
            }
        } else {
            tracing::debug!(tick, phase = ?self.phase, "Round end outside of a round");
        }

        self.check_match_continuity();
    }

    fn commit_round(
        &mut self,
        winner: Side,
        reason: Option<RoundEndReason>,
        state: &dyn GameState,
        tick: Tick,
    ) {
        if !self.locate(tick) {
            return;
        }
        let record = match self.current {
            Some(r) if r.end_tick == tick => r,
            _ => return,
        };

        if record.number <= self.last_round_end_called {
            if let Some(outcome) = self.outcomes.last_mut() {
                if outcome.number == record.number && outcome.reason.is_none() {
                    outcome.reason = reason;
                }
            }
            tracing::trace!(round = record.number, "Round already committed");
            return;
        }
        if !winner.is_playing() {
            tracing::warn!(round = record.number, ?winner, "Round end without a winner");
            return;
        }

        if let Some(id) = self.tracker.clutch_winner(winner, self.players_alive(winner)) {
            if let Some(player) = self.players.get_mut(id, true) {
                player.stats.clutches_won += 1;
                tracing::debug!(round = record.number, player = %player.name, "Clutch won");
            }
        }

        self.ledger.update_score(record.t_score, record.ct_score);

        let duration = (record.end_tick - record.start_tick) as f64 / self.tick_rate();
        for side in [Side::Terrorists, Side::CounterTerrorists] {
            let round_type = self.round_type(side);
            for member in state.team_members(side) {
                let player = match self.players.get_mut(member.id, true) {
                    Some(p) => p,
                    None => continue,
                };
                let won = side == winner;
                if player.end_round(record.number, won, member.health, duration) {
                    player.special_round(round_type, won);
                }
            }
        }

        self.outcomes.push(RoundOutcome {
            number: record.number,
            winner,
            reason,
            t_round_type: self.round_types.0,
            ct_round_type: self.round_types.1,
        });
        self.last_round_end_called = record.number;
        self.phase = Phase::RoundEndPending;
        tracing::info!(
            round = record.number,
            t = record.t_score,
            ct = record.ct_score,
            ?winner,
            "Round committed"
        );

        if record.official_end_tick.is_none() {
            self.close_round(record.number);
        }
    }

    pub(super) fn round_official_end(&mut self, _state: &dyn GameState, tick: Tick) {
        match self.pass {
            Pass::Discovery => self.discover_official_end(tick),
            Pass::Statistics => {
                if !self.locate(tick) {
                    return;
                }
                match self.current {
                    Some(r) if r.official_end_tick == Some(tick) => self.close_round(r.number),
                    _ => tracing::trace!(tick, "Official end of an unknown round"),
                }
            }
        }
    }

    fn discover_official_end(&mut self, tick: Tick) {
        if self.phase == Phase::PreMatch {
            return;
        }
        if self.phase == Phase::RoundOfficiallyEnded && self.last_official_end == Some(tick) {
            tracing::debug!(tick, "Official end already handled");
            return;
        }

        if self.cancelled || self.phase != Phase::RoundEndPending {
            tracing::debug!(tick, "Official end of a discarded round");
            self.cancelled = true;
            return;
        }

        let number = self.ledger.rounds_played();
        let matches = self
            .rounds
            .get(number)
            .map(|r| r.start_tick == self.round_start && r.end_tick == self.round_end)
            .unwrap_or(false);
        if !matches {
            tracing::error!(
                tick,
                round = number,
                start = self.round_start,
                end = self.round_end,
                "Official end does not belong to the recorded round"
            );
            return;
        }

        self.rounds.set_official_end(number, tick);
        self.last_official_end = Some(tick);
        self.phase = Phase::RoundOfficiallyEnded;
        tracing::debug!(round = number, tick, "Round officially ended");
    }

    /// Survival credit, KAST and the check for the last round.
    fn close_round(&mut self, number: i32) {
        if number <= self.last_round_closed {
            return;
        }
        self.last_round_closed = number;

        let (alive_t, alive_ct) = self.players.alive_sets();
        let survivors: Vec<PlayerId> = alive_t.iter().chain(alive_ct.iter()).copied().collect();
        for id in survivors {
            self.tracker.mark_kast(id);
        }

        let kast: Vec<PlayerId> = self.tracker.kast_players().copied().collect();
        for id in kast {
            if let Some(player) = self.players.get_mut(id, true) {
                player.stats.kast += 1;
            }
        }

        self.phase = Phase::RoundOfficiallyEnded;

        if !self.match_ended && Some(number) == self.rounds.last_number() {
            tracing::info!(
                round = number,
                t = self.ledger.t(),
                ct = self.ledger.ct(),
                "Match has been analysed"
            );
            self.match_ended = true;
            self.analysed = true;
            let (_, is_overtime) = self
                .ledger
                .check_match_end(self.ledger.t(), self.ledger.ct());
            self.is_overtime = is_overtime;
        }
    }

    pub(super) fn player_connect(&mut self, player: &PlayerState) {
        match self.players.connect(player) {
            ConnectOutcome::New | ConnectOutcome::Reconnected => {
                tracing::debug!(player = %player.name, side = ?player.side, "Player connected");
                if self.phase == Phase::InRound && player.alive {
                    self.players.add_alive(player.side, player.id);
                }
            }
            ConnectOutcome::AlreadyConnected => {
                tracing::debug!(player = %player.name, "Player is already connected");
            }
            ConnectOutcome::Ignored => {}
        }
    }

    pub(super) fn player_disconnect(&mut self, id: PlayerId, tick: Tick) {
        let side = match self.players.get(id, false) {
            Some(p) => p.side,
            None => {
                tracing::debug!(?id, "Disconnect of an unknown player");
                return;
            }
        };

        if self.players.disconnect(id, tick) {
            tracing::debug!(?id, tick, "Player disconnected");
            self.remove_alive(side, id);
        }
    }

    pub(super) fn player_team_change(
        &mut self,
        player: &PlayerState,
        old_side: Side,
        new_side: Side,
        tick: Tick,
    ) {
        match (old_side.is_playing(), new_side.is_playing()) {
            (false, true) => {
                let mut joined = player.clone();
                joined.side = new_side;
                self.player_connect(&joined);
            }
            (true, false) => self.player_disconnect(player.id, tick),
            (true, true) if old_side != new_side => {
                if let Some(tracked) = self.players.get_mut(player.id, false) {
                    tracked.side = new_side;
                }
                if self.players.remove_alive(old_side, player.id) {
                    self.players.add_alive(new_side, player.id);
                }
            }
            _ => {}
        }
    }

    pub(super) fn round_type(&self, side: Side) -> crate::classifier::RoundType {
        match side {
            Side::Terrorists => self.round_types.0,
            _ => self.round_types.1,
        }
    }

    fn players_alive(&self, side: Side) -> &std::collections::BTreeSet<PlayerId> {
        let (alive_t, alive_ct) = self.players.alive_sets();
        match side {
            Side::Terrorists => alive_t,
            _ => alive_ct,
        }
    }
}
