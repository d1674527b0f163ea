//! Owns every tracked player, all other collections only hold ids.

use crate::player::TrackedPlayer;
use crate::source::{PlayerId, PlayerState, Side, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    New,
    Reconnected,
    AlreadyConnected,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: std::collections::HashMap<PlayerId, TrackedPlayer>,
    connected: std::collections::BTreeSet<PlayerId>,
    disconnected: std::collections::HashMap<PlayerId, Tick>,
    alive_t: std::collections::BTreeSet<PlayerId>,
    alive_ct: std::collections::BTreeSet<PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.connected.clear();
        self.disconnected.clear();
        self.alive_t.clear();
        self.alive_ct.clear();
    }

    /// Looks up a player, disconnected players only when asked for
    pub fn get(&self, id: PlayerId, include_disconnected: bool) -> Option<&TrackedPlayer> {
        if self.connected.contains(&id) || (include_disconnected && self.disconnected.contains_key(&id)) {
            return self.players.get(&id);
        }
        None
    }

    pub fn get_mut(&mut self, id: PlayerId, include_disconnected: bool) -> Option<&mut TrackedPlayer> {
        if self.connected.contains(&id) || (include_disconnected && self.disconnected.contains_key(&id)) {
            return self.players.get_mut(&id);
        }
        None
    }

    pub fn is_connected(&self, id: PlayerId) -> bool {
        self.connected.contains(&id)
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    pub fn connect(&mut self, state: &PlayerState) -> ConnectOutcome {
        if state.is_bot || !state.side.is_playing() {
            return ConnectOutcome::Ignored;
        }

        if self.disconnected.remove(&state.id).is_some() {
            if let Some(player) = self.players.get_mut(&state.id) {
                player.update_identity(state);
            }
            self.connected.insert(state.id);
            return ConnectOutcome::Reconnected;
        }

        if self.connected.contains(&state.id) {
            return ConnectOutcome::AlreadyConnected;
        }

        self.players.insert(state.id, TrackedPlayer::new(state));
        self.connected.insert(state.id);
        ConnectOutcome::New
    }

    /// Moves a player to the disconnected set, their stats are kept.
    pub fn disconnect(&mut self, id: PlayerId, tick: Tick) -> bool {
        if !self.connected.remove(&id) {
            return false;
        }
        self.disconnected.insert(id, tick);
        true
    }

    /// Makes sure a roster entry is tracked, returns whether the player is usable.
    pub fn ensure(&mut self, state: &PlayerState) -> bool {
        if state.is_bot {
            return false;
        }
        if let Some(player) = self.players.get_mut(&state.id) {
            player.update_identity(state);
            if !self.disconnected.contains_key(&state.id) {
                self.connected.insert(state.id);
            }
            return true;
        }
        matches!(self.connect(state), ConnectOutcome::New | ConnectOutcome::Reconnected)
    }

    pub fn alive(&self, side: Side) -> Option<&std::collections::BTreeSet<PlayerId>> {
        match side {
            Side::Terrorists => Some(&self.alive_t),
            Side::CounterTerrorists => Some(&self.alive_ct),
            _ => None,
        }
    }

    pub fn alive_sets(
        &self,
    ) -> (
        &std::collections::BTreeSet<PlayerId>,
        &std::collections::BTreeSet<PlayerId>,
    ) {
        (&self.alive_t, &self.alive_ct)
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.alive_t.contains(&id) || self.alive_ct.contains(&id)
    }

    pub fn add_alive(&mut self, side: Side, id: PlayerId) {
        match side {
            Side::Terrorists => {
                self.alive_t.insert(id);
            }
            Side::CounterTerrorists => {
                self.alive_ct.insert(id);
            }
            _ => {}
        }
    }

    /// Returns true if the player was part of the alive set of `side`.
    pub fn remove_alive(&mut self, side: Side, id: PlayerId) -> bool {
        match side {
            Side::Terrorists => self.alive_t.remove(&id),
            Side::CounterTerrorists => self.alive_ct.remove(&id),
            _ => false,
        }
    }

    pub fn clear_alive(&mut self) {
        self.alive_t.clear();
        self.alive_ct.clear();
    }

    /// Every player that was ever tracked, connected or not, in id order.
    pub fn all(&self) -> Vec<&TrackedPlayer> {
        let mut players: Vec<_> = self.players.values().collect();
        players.sort_by_key(|p| p.id);
        players
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut TrackedPlayer> {
        self.players.values_mut()
    }
}
