//! The boundary towards the replay decoder.
//!
//! The decoder itself is not part of this crate, it only has to hand out events in tick order
//! together with a queryable view of the current game state.

use crate::equipment::{HitGroup, RoundEndReason, Weapon};
use crate::error::SourceError;

pub type Tick = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Unassigned,
    Spectators,
    Terrorists,
    CounterTerrorists,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Terrorists => Self::CounterTerrorists,
            Self::CounterTerrorists => Self::Terrorists,
            other => other,
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, Self::Terrorists | Self::CounterTerrorists)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Terrorists => "T",
            Self::CounterTerrorists => "CT",
            Self::Spectators => "Spectators",
            Self::Unassigned => "Unassigned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }
}

/// Snapshot of a single player as seen by the game state at the current tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    pub is_bot: bool,
    pub alive: bool,
    pub health: i32,
    pub money: i32,
    pub equipment_value: i32,
    pub position: Vector3,
    /// (yaw, pitch) in degrees
    pub view_direction: (f32, f32),
    pub ducking: bool,
    pub flash_duration_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamState {
    pub side: Side,
    pub score: i32,
    pub clan_name: String,
}

pub trait GameState {
    fn tick(&self) -> Tick;

    fn team_members(&self, side: Side) -> Vec<&PlayerState>;

    fn player(&self, id: PlayerId) -> Option<&PlayerState>;

    fn team(&self, side: Side) -> Option<&TeamState>;

    /// The players that currently have `id` in their field of view
    fn spotters_of(&self, id: PlayerId) -> Vec<PlayerId>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    ConVarsChanged(Vec<(String, String)>),
    MatchStart,
    MatchStartedChanged {
        old: bool,
        new: bool,
    },
    PlayerConnect(PlayerState),
    PlayerDisconnect(PlayerState),
    PlayerTeamChange {
        player: PlayerState,
        old_side: Side,
        new_side: Side,
    },
    RoundStart,
    /// `team` is the team whose score changed, the scores are already updated
    ScoreUpdated {
        team: TeamState,
        opponent: TeamState,
    },
    /// Team states are taken before the score of the winner is incremented
    RoundEnd {
        reason: RoundEndReason,
        winner: TeamState,
        loser: TeamState,
    },
    RoundEndOfficial,
    Kill {
        victim: Option<PlayerId>,
        killer: Option<PlayerId>,
        assister: Option<PlayerId>,
        weapon: Weapon,
        headshot: bool,
    },
    PlayerHurt {
        player: Option<PlayerId>,
        attacker: Option<PlayerId>,
        health: i32,
        health_damage: i32,
        weapon: Weapon,
        hit_group: HitGroup,
    },
    WeaponFire {
        shooter: PlayerId,
        weapon: Weapon,
    },
    BombPlanted {
        player: PlayerId,
    },
    BombDefuseStart {
        player: PlayerId,
    },
    BombDefused {
        player: PlayerId,
    },
    PlayerFlashed {
        player: Option<PlayerId>,
        attacker: Option<PlayerId>,
        duration_secs: f32,
    },
    RoundMvpAnnouncement {
        player: Option<PlayerId>,
    },
    ItemDrop {
        player: Option<PlayerId>,
        item: ItemId,
        weapon: Weapon,
    },
    ItemPickup {
        player: Option<PlayerId>,
        item: ItemId,
        weapon: Weapon,
    },
    Footstep {
        player: PlayerId,
    },
    PlayerSpottersChanged {
        spotted: PlayerId,
    },
    TickAdvanced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoHeader {
    pub map_name: String,
    pub tick_rate: f64,
}

pub trait EventSource {
    fn header(&self) -> &DemoHeader;

    /// Advances the replay, `Ok(None)` marks the regular end of the input
    fn next_event(&mut self) -> Result<Option<DemoEvent>, SourceError>;

    fn state(&self) -> &dyn GameState;
}

/// A buffered replay that can be read from the beginning as often as needed.
pub trait Replay {
    type Source<'r>: EventSource
    where
        Self: 'r;

    fn open(&self) -> Result<Self::Source<'_>, SourceError>;
}

pub fn seconds_to_ticks(seconds: f64, tick_rate: f64) -> Tick {
    (seconds * tick_rate) as Tick
}
