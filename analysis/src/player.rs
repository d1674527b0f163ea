use crate::classifier::{RoundType, SpecialRoundRecord};
use crate::equipment::{HitGroup, Weapon};
use crate::source::{PlayerId, PlayerState, Side, Tick, Vector3};

/// Damage this player dealt to an opponent in the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HurtRecord {
    pub first_tick: Tick,
    pub last_tick: Tick,
    pub remaining_health: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub flash_assists: u32,
    pub headshot_kills: u32,
    pub first_kills: u32,
    pub blind_kills: u32,
    pub blinded_victim_kills: u32,
    pub duck_kills: u32,
    pub lurker_kills: u32,
    pub saved_teammates: u32,
    pub clutches_won: u32,
    pub traders: u32,
    pub tradees: u32,
    pub kast: u32,
    pub mvps: u32,

    pub damage: u32,
    pub damage_taken: u32,
    pub he_damage: u32,
    pub fire_damage: u32,
    pub damage_cost: f64,
    pub shots: u32,
    pub shots_hit: u32,
    pub hit_groups: std::collections::BTreeMap<HitGroup, u32>,
    pub weapon_kills: std::collections::BTreeMap<&'static str, u32>,

    pub bombs_planted: u32,
    pub bombs_defused: u32,
    pub defuse_attempts: u32,

    pub time_flashing_secs: f64,
    pub time_to_kill_secs: f64,
    pub timed_kills: u32,
    pub sight_to_damage_secs: f64,
    pub first_damages: u32,
    pub kill_distance: f64,
    pub crosshair_displacement: f64,
    pub crosshair_samples: u32,

    pub picked_item_value: i64,
    pub dropped_item_value: i64,
    pub health_won: i64,
    pub health_lost: i64,
    pub round_win_time_secs: f64,
    pub rounds_won: u32,
    pub teammate_death_distance: f64,
    pub map_occupancy: f64,

    pub special_rounds: SpecialRoundRecord,
}

/// State that only lives for a single round
#[derive(Debug, Clone, Default, PartialEq)]
struct RoundScoped {
    last_flashed_by: Option<PlayerId>,
    flashed_until: Tick,
    last_hurt: std::collections::HashMap<PlayerId, HurtRecord>,
    spotted: std::collections::HashMap<PlayerId, Tick>,
    last_weapon_fire: Option<Tick>,
    start_money: i32,
    teammate_deaths: u32,
    teammate_death_distance: f64,
    view_before_kill: Option<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    pub stats: PlayerStats,
    /// One entry per committed round the player took part in
    pub round_history: Vec<bool>,
    pub last_footstep: Tick,
    last_ended_round: i32,
    round: RoundScoped,
}

impl TrackedPlayer {
    pub fn new(state: &PlayerState) -> Self {
        Self {
            id: state.id,
            name: state.name.clone(),
            side: state.side,
            stats: PlayerStats::default(),
            round_history: Vec::new(),
            last_footstep: -1,
            last_ended_round: 0,
            round: RoundScoped {
                start_money: state.money,
                ..Default::default()
            },
        }
    }

    pub fn update_identity(&mut self, state: &PlayerState) {
        self.name = state.name.clone();
        if state.side.is_playing() {
            self.side = state.side;
        }
    }

    pub fn reset_match(&mut self) {
        self.stats = PlayerStats::default();
        self.round_history.clear();
        self.last_ended_round = 0;
        self.last_footstep = -1;
        self.round = RoundScoped::default();
    }

    pub fn start_round(&mut self, money: i32) {
        self.round = RoundScoped {
            start_money: money,
            ..Default::default()
        };
    }

    pub fn round_start_money(&self) -> i32 {
        self.round.start_money
    }

    pub fn is_blinded(&self, tick: Tick) -> bool {
        self.round.last_flashed_by.is_some() && tick <= self.round.flashed_until
    }

    pub fn last_flashed_by(&self) -> Option<PlayerId> {
        self.round.last_flashed_by
    }

    pub fn flashed(&mut self, by: PlayerId, until: Tick) {
        self.round.last_flashed_by = Some(by);
        self.round.flashed_until = until;
    }

    pub fn clear_flash(&mut self) {
        self.round.last_flashed_by = None;
        self.round.flashed_until = 0;
    }

    pub fn weapon_fired(&mut self, tick: Tick) {
        self.stats.shots += 1;
        self.round.last_weapon_fire = Some(tick);
    }

    pub fn spotted(&mut self, player: PlayerId, tick: Tick) {
        self.round.spotted.entry(player).or_insert(tick);
    }

    pub fn remember_view(&mut self, view: (f32, f32)) {
        self.round.view_before_kill = Some(view);
    }

    pub fn teammate_died(&mut self, distance: f32) {
        self.round.teammate_deaths += 1;
        self.round.teammate_death_distance += distance as f64;
    }

    /// Records damage dealt to `victim`, the weapon fire on the same tick is what makes it a hit.
    #[allow(clippy::too_many_arguments)]
    pub fn damage_given(
        &mut self,
        victim: PlayerId,
        damage: i32,
        remaining_health: i32,
        hit_group: HitGroup,
        equipment_ratio: f64,
        tick: Tick,
        tick_rate: f64,
        sight_max_secs: f64,
    ) {
        let damage = damage.max(0) as u32;
        self.stats.damage += damage;

        if self.round.last_weapon_fire != Some(tick) {
            return;
        }

        self.stats.shots_hit += 1;
        *self.stats.hit_groups.entry(hit_group).or_default() += 1;
        self.stats.damage_cost += damage as f64 * equipment_ratio;

        if let Some(spotted_at) = self.round.spotted.remove(&victim) {
            let secs = (tick - spotted_at) as f64 / tick_rate;
            if secs < sight_max_secs {
                self.stats.sight_to_damage_secs += secs;
                self.stats.first_damages += 1;
            }
        }

        self.round
            .last_hurt
            .entry(victim)
            .and_modify(|h| {
                h.last_tick = tick;
                h.remaining_health = remaining_health;
            })
            .or_insert(HurtRecord {
                first_tick: tick,
                last_tick: tick,
                remaining_health,
            });
    }

    pub fn damage_taken(&mut self, damage: i32) {
        self.stats.damage_taken += damage.max(0) as u32;
    }

    pub fn last_hurt(&self) -> &std::collections::HashMap<PlayerId, HurtRecord> {
        &self.round.last_hurt
    }

    pub fn first_hurt_tick(&self, victim: PlayerId) -> Option<Tick> {
        self.round.last_hurt.get(&victim).map(|h| h.first_tick)
    }

    /// Crediting a kill, `killer` is this players current snapshot.
    pub fn kill(&mut self, killer: &PlayerState, weapon: &Weapon, headshot: bool) {
        self.stats.kills += 1;
        if headshot {
            self.stats.headshot_kills += 1;
        }
        if killer.ducking {
            self.stats.duck_kills += 1;
        }
        *self
            .stats
            .weapon_kills
            .entry(weapon.category().label())
            .or_default() += 1;

        if let Some((yaw, pitch)) = self.round.view_before_kill.take() {
            let (now_yaw, now_pitch) = killer.view_direction;
            let displacement = ((now_yaw - yaw).powi(2) + (now_pitch - pitch).powi(2)).sqrt();
            self.stats.crosshair_displacement += displacement as f64;
            self.stats.crosshair_samples += 1;
        }
    }

    /// Time from the first damage on `victim` to the kill, only counted up to `max_secs`.
    pub fn time_to_kill(&mut self, victim: PlayerId, tick: Tick, tick_rate: f64, max_secs: f64) {
        let first = match self.first_hurt_tick(victim) {
            Some(t) => t,
            None => return,
        };
        let secs = (tick - first) as f64 / tick_rate;
        if secs <= max_secs {
            self.stats.time_to_kill_secs += secs;
            self.stats.timed_kills += 1;
        }
    }

    pub fn death(&mut self) {
        self.stats.deaths += 1;
    }

    pub fn kill_distance(&mut self, from: &Vector3, to: &Vector3) {
        self.stats.kill_distance += from.distance(to) as f64;
    }

    /// Counts the round for this player once, `health` is what they have left.
    pub fn end_round(&mut self, round: i32, won: bool, health: i32, duration_secs: f64) -> bool {
        if round <= self.last_ended_round {
            return false;
        }
        self.last_ended_round = round;

        if won {
            self.stats.rounds_won += 1;
            self.stats.round_win_time_secs += duration_secs;
            self.stats.health_won += health.max(0) as i64;
        } else {
            self.stats.health_lost += health.max(0) as i64;
        }
        self.round_history.push(won);

        if self.round.teammate_deaths > 0 {
            self.stats.teammate_death_distance +=
                self.round.teammate_death_distance / self.round.teammate_deaths as f64;
        }
        true
    }

    pub fn special_round(&mut self, round_type: RoundType, won: bool) {
        self.stats.special_rounds.record(round_type, won);
    }

    pub fn rounds(&self) -> u32 {
        self.round_history.len() as u32
    }
}
