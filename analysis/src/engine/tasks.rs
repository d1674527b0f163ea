use super::{MatchAnalyser, Pass};
use crate::source::{GameState, PlayerId, Side, Tick};

/// Work deferred through the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Task {
    /// Remembers where the player was aiming shortly before a kill
    CrosshairSnapshot { player: PlayerId },
    /// Credits the opening kill if the killer survived long enough
    OpeningKillCheck { killer: PlayerId, round: i32 },
    MapControlCheck { round: i32 },
}

impl MatchAnalyser {
    /// Feeds every tick since the last pulse to the scheduler, statistics pass only.
    pub(super) fn tick_advanced(&mut self, state: &dyn GameState, tick: Tick) {
        if self.pass != Pass::Statistics {
            return;
        }
        let _span = tracing::trace_span!("Tick", tick).entered();

        for current in self.scheduler.ticks_until(tick) {
            for task in self.scheduler.on_tick(current) {
                if !self.locate(current) {
                    tracing::trace!(tick = current, task = ?task.payload, "Dropping task outside of a valid round");
                    continue;
                }

                self.run_task(&task.payload, state, current);
                if let Some(finished) = self.scheduler.reschedule(task) {
                    self.finish_task(&finished.payload, state);
                }
            }
        }
    }

    fn run_task(&mut self, task: &Task, state: &dyn GameState, tick: Tick) {
        match task {
            Task::CrosshairSnapshot { player } => {
                let view = match state.player(*player) {
                    Some(p) if p.alive => p.view_direction,
                    _ => return,
                };
                if let Some(p) = self.players.get_mut(*player, false) {
                    p.remember_view(view);
                }
            }
            Task::OpeningKillCheck { killer, round } => {
                if self.round_number() != *round || !self.players.is_alive(*killer) {
                    return;
                }
                if let Some(p) = self.players.get_mut(*killer, true) {
                    p.stats.first_kills += 1;
                    tracing::debug!(player = %p.name, round, tick, "Opening kill");
                }
            }
            Task::MapControlCheck { round } => {
                if self.round_number() == *round {
                    self.map_check(state, tick);
                }
            }
        }
    }

    fn finish_task(&mut self, task: &Task, state: &dyn GameState) {
        let round = match task {
            Task::MapControlCheck { round } => *round,
            _ => return,
        };
        let (t, ct) = match self.map_control.as_ref() {
            Some(control) => control.mean_occupancy(),
            None => return,
        };

        for (side, share) in [(Side::Terrorists, t), (Side::CounterTerrorists, ct)] {
            for member in state.team_members(side) {
                if let Some(player) = self.players.get_mut(member.id, true) {
                    player.stats.map_occupancy += share;
                }
            }
        }
        tracing::debug!(round, t, ct, "Map control for the round");
    }

    pub(super) fn start_map_control(&mut self, tick: Tick) {
        let control = match self.map_control.as_mut() {
            Some(c) => c,
            None => return,
        };
        control.reset();

        let record = match self.current {
            Some(r) => r,
            None => return,
        };
        self.scheduler.schedule_periodic(
            tick,
            self.config.map_check_interval_secs,
            record.valid_end(),
            Task::MapControlCheck {
                round: record.number,
            },
        );
    }

    /// Players that moved since the last check are located again, the others keep their place.
    fn map_check(&mut self, state: &dyn GameState, tick: Tick) {
        let control = match self.map_control.as_mut() {
            Some(c) => c,
            None => return,
        };
        let last_check = control.last_check();
        let (alive_t, alive_ct) = self.players.alive_sets();

        for (side, alive) in [(Side::Terrorists, alive_t), (Side::CounterTerrorists, alive_ct)] {
            for id in alive.iter().copied() {
                let moved = self
                    .players
                    .get(id, false)
                    .map(|p| p.last_footstep > last_check)
                    .unwrap_or(false);

                if moved || !control.knows_player(id) {
                    if let Some(player) = state.player(id) {
                        control.assign_player(id, side, &player.position, tick);
                    }
                } else {
                    control.refresh_player(id, side, tick);
                }
            }
        }

        control.set_last_check(tick);
        let (t, ct) = control.sample();
        tracing::trace!(tick, t, ct, "Map control");
    }
}
