use super::{MatchAnalyser, Phase, Task};
use crate::classifier::{self, RoundType};
use crate::equipment::{HitGroup, Weapon};
use crate::source::{seconds_to_ticks, DemoEvent, GameState, ItemId, PlayerId, Side, Tick};

impl MatchAnalyser {
    /// The discovery pass only cares about damage and kills.
    pub(super) fn discovery_player_event(
        &mut self,
        event: &DemoEvent,
        state: &dyn GameState,
        tick: Tick,
    ) {
        match event {
            DemoEvent::PlayerHurt {
                player: Some(_),
                attacker: Some(_),
                ..
            } => {
                if self.waiting_for_players && !self.player_hurt {
                    if self.participants_valid(state, tick) {
                        tracing::info!(tick, "Late match start");
                        self.cancelled = false;
                        self.waiting_for_players = false;
                        self.match_start(state, tick);
                    } else {
                        tracing::debug!(tick, "Still waiting for players");
                    }
                }
                self.player_hurt = true;
            }
            DemoEvent::Kill {
                killer: Some(killer),
                victim: Some(_),
                ..
            } => {
                if self.phase != Phase::InRound {
                    return;
                }
                let offset = -self.config.before_crosshair_secs;
                if let Some(at) = self.scheduler.schedule(
                    tick,
                    offset,
                    Task::CrosshairSnapshot { player: *killer },
                ) {
                    tracing::trace!(player = ?killer, at, "Scheduled crosshair snapshot");
                }
            }
            _ => {}
        }
    }

    pub(super) fn player_event(&mut self, event: &DemoEvent, state: &dyn GameState, tick: Tick) {
        match event {
            DemoEvent::Kill {
                victim,
                killer,
                assister,
                weapon,
                headshot,
            } => match (victim, killer) {
                (Some(victim), Some(killer)) => {
                    self.kill(*victim, *killer, *assister, weapon, *headshot, state, tick)
                }
                _ => tracing::debug!(tick, "Kill without victim or killer"),
            },
            DemoEvent::PlayerHurt {
                player,
                attacker,
                health,
                health_damage,
                weapon,
                hit_group,
            } => match (player, attacker) {
                (Some(victim), Some(attacker)) => self.hurt(
                    *victim,
                    *attacker,
                    *health,
                    *health_damage,
                    weapon,
                    *hit_group,
                    state,
                    tick,
                ),
                _ => tracing::trace!(tick, "Damage without an attacker"),
            },
            DemoEvent::WeaponFire { shooter, weapon } => {
                if !self.weapon_fired {
                    self.classify_round(state);
                }
                self.weapon_fired = true;

                match self.players.get_mut(*shooter, true) {
                    Some(player) => {
                        player.weapon_fired(tick);
                        tracing::trace!(player = %player.name, weapon = %weapon.name, "Weapon fired");
                    }
                    None => tracing::debug!(?shooter, tick, "Unknown player fired a weapon"),
                }
            }
            DemoEvent::BombPlanted { player } => {
                if let Some(p) = self.players.get_mut(*player, true) {
                    p.stats.bombs_planted += 1;
                    tracing::debug!(player = %p.name, tick, "Bomb planted");
                }
            }
            DemoEvent::BombDefuseStart { player } => {
                if let Some(p) = self.players.get_mut(*player, true) {
                    p.stats.defuse_attempts += 1;
                }
            }
            DemoEvent::BombDefused { player } => {
                if let Some(p) = self.players.get_mut(*player, true) {
                    p.stats.bombs_defused += 1;
                    tracing::debug!(player = %p.name, tick, "Bomb defused");
                }
            }
            DemoEvent::PlayerFlashed {
                player: Some(player),
                attacker: Some(attacker),
                duration_secs,
            } => self.flashed(*player, *attacker, *duration_secs, tick),
            DemoEvent::RoundMvpAnnouncement { player: Some(player) } => {
                if let Some(p) = self.players.get_mut(*player, false) {
                    p.stats.mvps += 1;
                }
            }
            DemoEvent::ItemDrop {
                player: Some(player),
                item,
                weapon,
            } => self.item_dropped(*player, *item, weapon, state),
            DemoEvent::ItemPickup {
                player: Some(player),
                item,
                weapon,
            } => self.item_picked_up(*player, *item, weapon, state, tick),
            DemoEvent::Footstep { player } => {
                if let Some(p) = self.players.get_mut(*player, false) {
                    p.last_footstep = tick;
                }
            }
            DemoEvent::PlayerSpottersChanged { spotted } => {
                if self.players.get(*spotted, false).is_none() {
                    return;
                }
                for spotter in state.spotters_of(*spotted) {
                    if let Some(p) = self.players.get_mut(spotter, true) {
                        p.spotted(*spotted, tick);
                    }
                }
            }
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn kill(
        &mut self,
        victim_id: PlayerId,
        killer_id: PlayerId,
        assister: Option<PlayerId>,
        weapon: &Weapon,
        headshot: bool,
        state: &dyn GameState,
        tick: Tick,
    ) {
        let (victim_side, killer_side) = match (
            self.players.get(victim_id, true),
            self.players.get(killer_id, true),
        ) {
            (Some(v), Some(k)) => (v.side, k.side),
            _ => {
                tracing::debug!(?victim_id, ?killer_id, tick, "Kill involving an unknown player");
                return;
            }
        };
        let victim_position = state
            .player(victim_id)
            .map(|p| p.position)
            .unwrap_or_default();

        let grace = seconds_to_ticks(self.config.flash_assist_grace_secs, self.tick_rate());
        let (victim_blinded, flash_assist_window, last_flasher, victim_hurt) =
            match self.players.get_mut(victim_id, true) {
                Some(victim) => {
                    victim.death();
                    let hurt: Vec<_> = victim
                        .last_hurt()
                        .iter()
                        .map(|(id, h)| (*id, *h))
                        .collect();
                    (
                        victim.is_blinded(tick),
                        victim.is_blinded(tick - grace),
                        victim.last_flashed_by(),
                        hurt,
                    )
                }
                None => return,
            };

        self.remove_alive(victim_side, victim_id);

        let teammates: Vec<PlayerId> = self
            .players
            .alive(victim_side)
            .map(|alive| alive.iter().copied().collect())
            .unwrap_or_default();
        for id in teammates {
            let distance = match state.player(id) {
                Some(mate) => mate.position.distance(&victim_position),
                None => continue,
            };
            if let Some(mate) = self.players.get_mut(id, false) {
                mate.teammate_died(distance);
            }
        }

        if killer_id == victim_id || killer_side == victim_side {
            tracing::debug!(?killer_id, ?victim_id, tick, "Team kill, no credit");
            return;
        }

        let killer_state = match state.player(killer_id) {
            Some(s) => s,
            None => {
                tracing::debug!(?killer_id, tick, "Killer is missing from the game state");
                return;
            }
        };
        let spotted_by_victim = state.spotters_of(killer_id).contains(&victim_id);
        let tick_rate = self.tick_rate();
        let before_save = seconds_to_ticks(self.config.before_save_secs, tick_rate);
        let max_saved_health = self.config.max_saved_health;
        let time_to_kill_max = self.config.time_to_kill_max_secs;

        if let Some(killer) = self.players.get_mut(killer_id, true) {
            let killer_blinded = killer.is_blinded(tick);
            killer.kill(killer_state, weapon, headshot);
            killer.kill_distance(&killer_state.position, &victim_position);
            killer.time_to_kill(victim_id, tick, tick_rate, time_to_kill_max);

            if killer_blinded {
                killer.stats.blind_kills += 1;
            }
            if victim_blinded {
                killer.stats.blinded_victim_kills += 1;
            }
            if !spotted_by_victim {
                killer.stats.lurker_kills += 1;
            }

            let saved = victim_hurt
                .iter()
                .filter(|(id, hurt)| {
                    *id != killer_id
                        && tick - hurt.last_tick < before_save
                        && 0 < hurt.remaining_health
                        && hurt.remaining_health < max_saved_health
                })
                .count();
            killer.stats.saved_teammates += saved as u32;

            tracing::debug!(
                killer = %killer.name,
                ?victim_id,
                weapon = %weapon.name,
                headshot,
                tick,
                "Kill"
            );
        }
        self.tracker.mark_kast(killer_id);

        if let Some(trade) = self.tracker.record_kill(killer_id, victim_id, tick) {
            if let Some(trader) = self.players.get_mut(trade.trader, true) {
                trader.stats.traders += 1;
            }
            if let Some(tradee) = self.players.get_mut(trade.tradee, true) {
                tradee.stats.tradees += 1;
            }
        }

        if !self.first_kill_done {
            self.first_kill_done = true;
            let round = self.round_number();
            self.scheduler.schedule(
                tick,
                self.config.after_first_kill_secs,
                Task::OpeningKillCheck {
                    killer: killer_id,
                    round,
                },
            );
        }

        if let Some(flasher_id) = last_flasher.filter(|f| *f != killer_id) {
            let flasher_side = self.players.get(flasher_id, true).map(|p| p.side);
            if flash_assist_window && flasher_side.is_some_and(|s| s != victim_side) {
                if let Some(flasher) = self.players.get_mut(flasher_id, true) {
                    flasher.stats.flash_assists += 1;
                    flasher.stats.assists += 1;
                    tracing::debug!(flasher = %flasher.name, tick, "Flash assist");
                }
                self.tracker.mark_kast(flasher_id);
            }
        }

        if let Some(assister_id) = assister {
            match self.players.get_mut(assister_id, true) {
                Some(assister) if assister.side != victim_side => {
                    assister.stats.assists += 1;
                    self.tracker.mark_kast(assister_id);
                }
                _ => tracing::trace!(?assister_id, "Assist not credited"),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn hurt(
        &mut self,
        victim_id: PlayerId,
        attacker_id: PlayerId,
        health: i32,
        damage: i32,
        weapon: &Weapon,
        hit_group: HitGroup,
        state: &dyn GameState,
        tick: Tick,
    ) {
        let (victim_side, attacker_side) = match (
            self.players.get(victim_id, true),
            self.players.get(attacker_id, true),
        ) {
            (Some(v), Some(a)) => (v.side, a.side),
            _ => {
                tracing::trace!(?victim_id, ?attacker_id, tick, "Damage involving an unknown player");
                return;
            }
        };
        if victim_side == attacker_side {
            tracing::trace!(?victim_id, ?attacker_id, tick, "Team damage");
            return;
        }

        let equipment_value = |id: PlayerId| state.player(id).map(|p| p.equipment_value).unwrap_or(0);
        let victim_value = equipment_value(victim_id);
        let equipment_ratio = if victim_value > 0 {
            equipment_value(attacker_id) as f64 / victim_value as f64
        } else {
            0.0
        };
        let tick_rate = self.tick_rate();
        let sight_max = self.config.pov_to_damage_max_secs;

        if let Some(attacker) = self.players.get_mut(attacker_id, true) {
            if weapon.is_he_grenade() {
                attacker.stats.he_damage += damage.max(0) as u32;
            } else if weapon.is_fire() {
                attacker.stats.fire_damage += damage.max(0) as u32;
            }

            if !weapon.is_known() {
                return;
            }
            attacker.damage_given(
                victim_id,
                damage,
                health,
                hit_group,
                equipment_ratio,
                tick,
                tick_rate,
                sight_max,
            );
        }
        if let Some(victim) = self.players.get_mut(victim_id, true) {
            victim.damage_taken(damage);
        }
    }

    fn flashed(&mut self, player_id: PlayerId, attacker_id: PlayerId, duration_secs: f32, tick: Tick) {
        let attacker_side = match self.players.get(attacker_id, true) {
            Some(a) => a.side,
            None => return,
        };
        let player = match self.players.get_mut(player_id, true) {
            Some(p) => p,
            None => return,
        };

        if player.side == attacker_side {
            player.clear_flash();
            return;
        }
        if duration_secs <= 0.0 {
            tracing::debug!(?player_id, duration_secs, tick, "Flash without a duration");
            return;
        }

        let until = tick + seconds_to_ticks(duration_secs as f64, self.header.tick_rate);
        player.flashed(attacker_id, until);
        tracing::trace!(player = %player.name, ?attacker_id, until, "Player flashed");

        if let Some(attacker) = self.players.get_mut(attacker_id, true) {
            attacker.stats.time_flashing_secs += duration_secs as f64;
        }
    }

    fn item_dropped(&mut self, player: PlayerId, item: ItemId, weapon: &Weapon, state: &dyn GameState) {
        let dropper = match state.player(player) {
            Some(p) if p.alive => p,
            _ => return,
        };
        if weapon.price().is_none() {
            return;
        }
        tracing::trace!(player = %dropper.name, weapon = %weapon.name, ?item, "Item dropped");
        self.dropped_items.insert(item, (player, dropper.side));
    }

    fn item_picked_up(
        &mut self,
        player: PlayerId,
        item: ItemId,
        weapon: &Weapon,
        state: &dyn GameState,
        tick: Tick,
    ) {
        if !state.player(player).is_some_and(|p| p.alive) {
            return;
        }
        let (dropper_id, dropper_side) = match self.dropped_items.get(&item) {
            Some(d) => *d,
            None => return,
        };
        let value = match weapon.price() {
            Some(v) => v as i64,
            None => return,
        };
        if dropper_id == player {
            self.dropped_items.remove(&item);
            return;
        }

        match self.players.get_mut(player, false) {
            Some(picker) if picker.side == dropper_side => {
                picker.stats.picked_item_value += value;
                tracing::debug!(picker = %picker.name, weapon = %weapon.name, tick, "Item picked up from a teammate");
            }
            _ => return,
        }
        if let Some(dropper) = self.players.get_mut(dropper_id, true) {
            dropper.stats.dropped_item_value += value;
        }
        self.dropped_items.remove(&item);
    }

    /// Economic type of both sides, decided on the first shot of the round.
    fn classify_round(&mut self, state: &dyn GameState) {
        let number = self.round_number();
        let pistol_price = self.config.default_pistol_price;

        let mut types = [RoundType::Normal; 2];
        for (slot, side) in [Side::Terrorists, Side::CounterTerrorists].into_iter().enumerate() {
            let spend: i32 = state
                .team_members(side)
                .into_iter()
                .map(|member| {
                    let start_money = self
                        .players
                        .get(member.id, true)
                        .map(|p| p.round_start_money())
                        .unwrap_or(member.money);
                    classifier::committed_spend(
                        member.equipment_value,
                        start_money,
                        member.money,
                        pistol_price,
                    )
                })
                .sum();
            types[slot] = classifier::classify(number, spend, &self.config);
            tracing::debug!(round = number, ?side, spend, round_type = ?types[slot], "Classified round");
        }
        self.round_types = (types[0], types[1]);
    }
}
