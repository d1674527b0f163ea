//! In memory replays for driving the analysis without a demo file.
#![allow(dead_code)]

use analysis::equipment::{EquipmentClass, HitGroup, RoundEndReason, Weapon};
use analysis::source::{
    DemoEvent, DemoHeader, EventSource, GameState, ItemId, PlayerId, PlayerState, Replay, Side,
    TeamState, Tick, Vector3,
};
use analysis::SourceError;

pub const TICK_RATE: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn members(self) -> [u64; 5] {
        match self {
            Self::A => [1, 2, 3, 4, 5],
            Self::B => [6, 7, 8, 9, 10],
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tick: Tick,
    pub players: Vec<PlayerState>,
    pub teams: Vec<TeamState>,
    pub spotters: Vec<(PlayerId, Vec<PlayerId>)>,
}

impl GameState for Snapshot {
    fn tick(&self) -> Tick {
        self.tick
    }

    fn team_members(&self, side: Side) -> Vec<&PlayerState> {
        self.players.iter().filter(|p| p.side == side).collect()
    }

    fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    fn team(&self, side: Side) -> Option<&TeamState> {
        self.teams.iter().find(|t| t.side == side)
    }

    fn spotters_of(&self, id: PlayerId) -> Vec<PlayerId> {
        self.spotters
            .iter()
            .find(|(spotted, _)| *spotted == id)
            .map(|(_, spotters)| spotters.clone())
            .unwrap_or_default()
    }
}

pub struct ScriptedReplay {
    header: DemoHeader,
    frames: Vec<(Snapshot, DemoEvent)>,
    truncated: bool,
}

impl ScriptedReplay {
    /// The replay ends with a decode error instead of a regular end.
    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    /// Drops every frame after the first `len`.
    pub fn cut_at(mut self, len: usize) -> Self {
        self.frames.truncate(len);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

pub struct ScriptedSource<'r> {
    replay: &'r ScriptedReplay,
    next: usize,
    empty: Snapshot,
}

impl EventSource for ScriptedSource<'_> {
    fn header(&self) -> &DemoHeader {
        &self.replay.header
    }

    fn next_event(&mut self) -> Result<Option<DemoEvent>, SourceError> {
        match self.replay.frames.get(self.next) {
            Some((_, event)) => {
                self.next += 1;
                Ok(Some(event.clone()))
            }
            None if self.replay.truncated => Err(SourceError::UnexpectedEnd),
            None => Ok(None),
        }
    }

    fn state(&self) -> &dyn GameState {
        match self.next.checked_sub(1).and_then(|i| self.replay.frames.get(i)) {
            Some((state, _)) => state,
            None => &self.empty,
        }
    }
}

impl Replay for ScriptedReplay {
    type Source<'r> = ScriptedSource<'r> where Self: 'r;

    fn open(&self) -> Result<Self::Source<'_>, SourceError> {
        Ok(ScriptedSource {
            replay: self,
            next: 0,
            empty: Snapshot::default(),
        })
    }
}

pub fn rifle() -> Weapon {
    Weapon::new("AK-47", EquipmentClass::Rifle)
}

/// Builds a two team match event by event, keeping the game state in sync.
pub struct MatchScript {
    state: Snapshot,
    frames: Vec<(Snapshot, DemoEvent)>,
    a_side: Side,
    loadout: [i32; 2],
    rounds: i32,
    pub max_rounds: i32,
    pub overtime_max_rounds: i32,
    /// Sends every round end twice on the same tick
    pub repeat_round_end: bool,
    /// The next round starts on the tick of the official end
    pub same_tick_start: bool,
}

impl Default for MatchScript {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchScript {
    pub fn new() -> Self {
        let mut players = Vec::new();
        for (team, side) in [(Team::A, Side::Terrorists), (Team::B, Side::CounterTerrorists)] {
            for id in team.members() {
                players.push(PlayerState {
                    id: PlayerId(id),
                    name: format!("player-{}", id),
                    side,
                    alive: true,
                    health: 100,
                    money: 800,
                    equipment_value: 200,
                    ..Default::default()
                });
            }
        }

        let teams = vec![
            TeamState {
                side: Side::Terrorists,
                score: 0,
                clan_name: "Team A".to_owned(),
            },
            TeamState {
                side: Side::CounterTerrorists,
                score: 0,
                clan_name: "Team B".to_owned(),
            },
        ];

        let mut script = Self {
            state: Snapshot {
                tick: 100,
                players,
                teams,
                spotters: Vec::new(),
            },
            frames: Vec::new(),
            a_side: Side::Terrorists,
            loadout: [4700, 4700],
            rounds: 0,
            max_rounds: 30,
            overtime_max_rounds: 6,
            repeat_round_end: false,
            same_tick_start: false,
        };
        script.place_players();
        script
    }

    pub fn tick(&self) -> Tick {
        self.state.tick
    }

    pub fn side_of(&self, team: Team) -> Side {
        match team {
            Team::A => self.a_side,
            Team::B => self.a_side.opponent(),
        }
    }

    pub fn rounds(&self) -> i32 {
        self.rounds
    }

    pub fn player_mut(&mut self, id: u64) -> &mut PlayerState {
        self.state
            .players
            .iter_mut()
            .find(|p| p.id == PlayerId(id))
            .expect("Scripted player")
    }

    pub fn set_loadout(&mut self, team: Team, value: i32) -> &mut Self {
        self.loadout[team.index()] = value;
        self
    }

    pub fn emit(&mut self, event: DemoEvent) -> &mut Self {
        self.frames.push((self.state.clone(), event));
        self
    }

    pub fn advance(&mut self, ticks: Tick) -> &mut Self {
        self.state.tick += ticks;
        self.emit(DemoEvent::TickAdvanced)
    }

    /// Server variables, connects and the match start.
    pub fn begin(&mut self) -> &mut Self {
        self.emit(DemoEvent::ConVarsChanged(vec![
            ("mp_startmoney".to_owned(), "800".to_owned()),
            (
                "mp_overtime_maxrounds".to_owned(),
                self.overtime_max_rounds.to_string(),
            ),
        ]));

        let players = self.state.players.clone();
        for player in players {
            self.emit(DemoEvent::PlayerConnect(player));
        }

        self.advance(64);
        self.emit(DemoEvent::MatchStart)
    }

    /// Starts over with zero scores, like a restart after warmup.
    pub fn restart(&mut self) -> &mut Self {
        for team in self.state.teams.iter_mut() {
            team.score = 0;
        }
        self.rounds = 0;
        self.emit(DemoEvent::MatchStart)
    }

    fn place_players(&mut self) {
        let mut t_offset = 0.0;
        let mut ct_offset = 0.0;
        for player in self.state.players.iter_mut() {
            let (base, offset) = match player.side {
                Side::Terrorists => (10.0, &mut t_offset),
                _ => (410.0, &mut ct_offset),
            };
            player.position = Vector3::new(base + *offset, 50.0, 0.0);
            *offset += 15.0;
        }
    }

    pub fn round_start(&mut self) -> &mut Self {
        let a_side = self.a_side;
        let loadout = self.loadout;
        for player in self.state.players.iter_mut() {
            let team = if player.side == a_side { Team::A } else { Team::B };
            player.alive = true;
            player.health = 100;
            player.money = 800;
            player.equipment_value = loadout[team.index()];
            player.view_direction = (0.0, 0.0);
        }
        self.place_players();
        self.emit(DemoEvent::RoundStart)
    }

    pub fn hurt(&mut self, attacker: u64, victim: u64, damage: i32) -> &mut Self {
        let health = {
            let player = self.player_mut(victim);
            player.health = (player.health - damage).max(0);
            player.health
        };

        self.emit(DemoEvent::WeaponFire {
            shooter: PlayerId(attacker),
            weapon: rifle(),
        });
        self.emit(DemoEvent::PlayerHurt {
            player: Some(PlayerId(victim)),
            attacker: Some(PlayerId(attacker)),
            health,
            health_damage: damage,
            weapon: rifle(),
            hit_group: HitGroup::Head,
        })
    }

    pub fn kill(&mut self, killer: u64, victim: u64) -> &mut Self {
        self.kill_with(killer, victim, None)
    }

    pub fn kill_with(&mut self, killer: u64, victim: u64, assister: Option<u64>) -> &mut Self {
        let remaining = self.player_mut(victim).health;
        self.hurt(killer, victim, remaining);
        self.player_mut(victim).alive = false;
        self.emit(DemoEvent::Kill {
            victim: Some(PlayerId(victim)),
            killer: Some(PlayerId(killer)),
            assister: assister.map(PlayerId),
            weapon: rifle(),
            headshot: true,
        })
    }

    /// A knife kill, no shot is fired.
    pub fn stab(&mut self, killer: u64, victim: u64) -> &mut Self {
        let knife = Weapon::new("Knife", EquipmentClass::Equipment);
        let damage = {
            let player = self.player_mut(victim);
            let damage = player.health;
            player.health = 0;
            player.alive = false;
            damage
        };

        self.emit(DemoEvent::PlayerHurt {
            player: Some(PlayerId(victim)),
            attacker: Some(PlayerId(killer)),
            health: 0,
            health_damage: damage,
            weapon: knife.clone(),
            hit_group: HitGroup::Chest,
        });
        self.emit(DemoEvent::Kill {
            victim: Some(PlayerId(victim)),
            killer: Some(PlayerId(killer)),
            assister: None,
            weapon: knife,
            headshot: false,
        })
    }

    pub fn flash(&mut self, attacker: u64, victim: u64, duration_secs: f32) -> &mut Self {
        self.player_mut(victim).flash_duration_secs = duration_secs;
        self.emit(DemoEvent::PlayerFlashed {
            player: Some(PlayerId(victim)),
            attacker: Some(PlayerId(attacker)),
            duration_secs,
        })
    }

    pub fn drop_item(&mut self, player: u64, item: u64) -> &mut Self {
        self.emit(DemoEvent::ItemDrop {
            player: Some(PlayerId(player)),
            item: ItemId(item),
            weapon: rifle(),
        })
    }

    pub fn pick_up_item(&mut self, player: u64, item: u64) -> &mut Self {
        self.emit(DemoEvent::ItemPickup {
            player: Some(PlayerId(player)),
            item: ItemId(item),
            weapon: rifle(),
        })
    }

    pub fn change_team(&mut self, id: u64, side: Side) -> &mut Self {
        let old_side = self.player_mut(id).side;
        self.player_mut(id).side = side;
        let player = self.player_mut(id).clone();
        self.emit(DemoEvent::PlayerTeamChange {
            player,
            old_side,
            new_side: side,
        })
    }

    /// The player leaves the rosters until [`MatchScript::reconnect`].
    pub fn disconnect(&mut self, id: u64) -> &mut Self {
        let player = {
            let player = self.player_mut(id);
            player.side = Side::Unassigned;
            player.alive = false;
            player.clone()
        };
        self.emit(DemoEvent::PlayerDisconnect(player))
    }

    pub fn reconnect(&mut self, id: u64, side: Side) -> &mut Self {
        let player = {
            let player = self.player_mut(id);
            player.side = side;
            player.clone()
        };
        self.emit(DemoEvent::PlayerConnect(player))
    }

    /// A round with damage that the server ends without a winner, scores stay the same.
    pub fn abort_round(&mut self, reason: RoundEndReason) -> &mut Self {
        let (t, ct) = (self.team_state(Side::Terrorists), self.team_state(Side::CounterTerrorists));

        self.round_start();
        self.advance(640);
        self.hurt(Team::A.members()[0], Team::B.members()[0], 20);
        self.advance(64);
        self.emit(DemoEvent::RoundEnd {
            reason,
            winner: t,
            loser: ct,
        });
        self.advance(320);
        self.emit(DemoEvent::RoundEndOfficial);
        self.advance(64)
    }

    fn team_state(&self, side: Side) -> TeamState {
        self.state
            .teams
            .iter()
            .find(|t| t.side == side)
            .cloned()
            .expect("Scripted team")
    }

    /// Ends the round for `winner`, followed by the official end five seconds later.
    pub fn end_round(&mut self, winner: Team) -> &mut Self {
        let winner_side = self.side_of(winner);
        let reason = match winner_side {
            Side::Terrorists => RoundEndReason::CTKilled,
            _ => RoundEndReason::TKilled,
        };

        let end = DemoEvent::RoundEnd {
            reason,
            winner: self.team_state(winner_side),
            loser: self.team_state(winner_side.opponent()),
        };
        self.emit(end.clone());
        if self.repeat_round_end {
            self.emit(end);
        }

        for team in self.state.teams.iter_mut() {
            if team.side == winner_side {
                team.score += 1;
            }
        }
        self.emit(DemoEvent::ScoreUpdated {
            team: self.team_state(winner_side),
            opponent: self.team_state(winner_side.opponent()),
        });

        self.advance(320);
        self.emit(DemoEvent::RoundEndOfficial);
        if !self.same_tick_start {
            self.advance(64);
        }

        self.rounds += 1;
        if self.swap_due() {
            self.swap_sides();
        }
        self
    }

    fn swap_due(&self) -> bool {
        let played = self.rounds;
        let overtime_played = played - self.max_rounds;
        played == self.max_rounds / 2
            || played == self.max_rounds
            || (overtime_played > 0 && overtime_played % (self.overtime_max_rounds / 2) == 0)
    }

    fn swap_sides(&mut self) {
        self.a_side = self.a_side.opponent();
        for player in self.state.players.iter_mut() {
            player.side = player.side.opponent();
        }
        for team in self.state.teams.iter_mut() {
            team.side = team.side.opponent();
        }
    }

    /// A round where one loser trades a winner before the winners clean up.
    pub fn play_round(&mut self, winner: Team) -> &mut Self {
        let k = (self.rounds % 5) as usize;
        let winners = winner.members();
        let losers = winner.other().members();

        self.round_start();
        for _ in 0..10 {
            self.advance(64);
        }

        self.kill(losers[k], winners[k]);
        self.advance(64);

        let alive_winners: Vec<u64> = (1..5).map(|i| winners[(k + i) % 5]).collect();
        for i in 0..5 {
            self.kill(alive_winners[i % 4], losers[(k + i) % 5]);
            self.advance(64);
        }

        self.advance(128);
        self.end_round(winner)
    }

    pub fn play_match(&mut self, winners: &[Team]) -> &mut Self {
        for winner in winners {
            self.play_round(*winner);
        }
        self
    }

    pub fn build(&self) -> ScriptedReplay {
        ScriptedReplay {
            header: DemoHeader {
                map_name: "de_scripted".to_owned(),
                tick_rate: TICK_RATE,
            },
            frames: self.frames.clone(),
            truncated: false,
        }
    }
}

/// A regulation match won 16:0 by team A.
pub fn regulation_match() -> MatchScript {
    let mut script = MatchScript::new();
    script.begin();
    script.play_match(&[Team::A; 16]);
    script
}

/// 15:15 after regulation, team A wins the first overtime 4:2.
pub fn overtime_match() -> MatchScript {
    let mut winners = vec![Team::A; 15];
    winners.extend([Team::B; 15]);
    winners.extend([Team::A, Team::A, Team::B, Team::A, Team::B, Team::A]);

    let mut script = MatchScript::new();
    script.begin();
    script.play_match(&winners);
    script
}
