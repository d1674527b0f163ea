//! Territory control per side, derived from where the living players stand.

use crate::navigation::{Place, PlaceGraph};
use crate::source::{PlayerId, Side, Tick, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceAssignment {
    pub controller: Side,
    pub last_update: Tick,
}

impl Default for PlaceAssignment {
    fn default() -> Self {
        Self {
            controller: Side::Unassigned,
            last_update: -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Refreshed,
    Neutralized,
    Transferred,
    Assigned,
    Unchanged,
}

impl PlaceAssignment {
    pub fn claim(&mut self, side: Side, tick: Tick) -> ClaimOutcome {
        if !side.is_playing() {
            return ClaimOutcome::Unchanged;
        }

        if self.controller == side {
            self.last_update = self.last_update.max(tick);
            return ClaimOutcome::Refreshed;
        }

        if self.controller.is_playing() {
            if tick == self.last_update {
                self.controller = Side::Unassigned;
                return ClaimOutcome::Neutralized;
            }
            if tick > self.last_update {
                self.controller = side;
                self.last_update = tick;
                return ClaimOutcome::Transferred;
            }
            return ClaimOutcome::Unchanged;
        }

        if tick > self.last_update {
            self.controller = side;
            self.last_update = tick;
            return ClaimOutcome::Assigned;
        }
        ClaimOutcome::Unchanged
    }
}

struct ControlledPlace {
    place: Place,
    assignment: PlaceAssignment,
}

pub struct MapControl {
    graph: Box<dyn PlaceGraph>,
    places: std::collections::BTreeMap<String, ControlledPlace>,
    total_area: f64,
    last_places: std::collections::HashMap<PlayerId, String>,
    last_check: Tick,
    t_sum: f64,
    ct_sum: f64,
    samples: u32,
}

impl std::fmt::Debug for MapControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapControl")
            .field("places", &self.places.len())
            .field("total_area", &self.total_area)
            .field("last_check", &self.last_check)
            .finish()
    }
}

impl MapControl {
    pub fn new(graph: Box<dyn PlaceGraph>) -> Self {
        let mut places = std::collections::BTreeMap::new();
        let mut total_area = 0.0_f64;

        for name in graph.place_names() {
            let place = match graph.areas(name).and_then(|a| Place::from_areas(name, a)) {
                Some(p) => p,
                None => continue,
            };
            total_area += place.area as f64;
            places.insert(
                name.to_owned(),
                ControlledPlace {
                    place,
                    assignment: PlaceAssignment::default(),
                },
            );
        }
        tracing::debug!(places = places.len(), total_area, "Loaded places");

        Self {
            graph,
            places,
            total_area,
            last_places: std::collections::HashMap::new(),
            last_check: -1,
            t_sum: 0.0,
            ct_sum: 0.0,
            samples: 0,
        }
    }

    pub fn reset(&mut self) {
        for controlled in self.places.values_mut() {
            controlled.assignment = PlaceAssignment::default();
        }
        self.last_places.clear();
        self.last_check = -1;
        self.t_sum = 0.0;
        self.ct_sum = 0.0;
        self.samples = 0;
    }

    pub fn last_check(&self) -> Tick {
        self.last_check
    }

    pub fn set_last_check(&mut self, tick: Tick) {
        self.last_check = tick;
    }

    pub fn knows_player(&self, player: PlayerId) -> bool {
        self.last_places.contains_key(&player)
    }

    pub fn assignment(&self, place: &str) -> Option<PlaceAssignment> {
        self.places.get(place).map(|p| p.assignment)
    }

    /// Locates the player and claims the place if they are close enough to its center.
    pub fn assign_player(
        &mut self,
        player: PlayerId,
        side: Side,
        position: &Vector3,
        tick: Tick,
    ) -> Option<ClaimOutcome> {
        let name = self.graph.place_at(position)?.to_owned();
        let controlled = self.places.get_mut(&name)?;

        if controlled.place.center.distance(position) >= controlled.place.diameter {
            return None;
        }

        let outcome = controlled.assignment.claim(side, tick);
        tracing::trace!(?player, place = %name, ?outcome, tick, "Place claim");
        self.last_places.insert(player, name);
        Some(outcome)
    }

    /// Keeps the last place of a player that did not move fresh.
    pub fn refresh_player(&mut self, player: PlayerId, side: Side, tick: Tick) -> Option<ClaimOutcome> {
        let name = self.last_places.get(&player)?;
        let controlled = self.places.get_mut(name)?;
        if controlled.assignment.controller != side {
            return None;
        }
        Some(controlled.assignment.claim(side, tick))
    }

    /// Share of the total area controlled by (T, CT).
    pub fn occupancy(&self) -> (f64, f64) {
        if self.total_area <= 0.0 {
            return (0.0, 0.0);
        }

        let mut t = 0.0_f64;
        let mut ct = 0.0_f64;
        for controlled in self.places.values() {
            match controlled.assignment.controller {
                Side::Terrorists => t += controlled.place.area as f64,
                Side::CounterTerrorists => ct += controlled.place.area as f64,
                _ => {}
            }
        }

        let total = self.total_area;
        ((t / total).clamp(0.0, 1.0), (ct / total).clamp(0.0, 1.0))
    }

    pub fn sample(&mut self) -> (f64, f64) {
        let (t, ct) = self.occupancy();
        self.t_sum += t;
        self.ct_sum += ct;
        self.samples += 1;
        (t, ct)
    }

    /// Mean of all samples taken since the last reset.
    pub fn mean_occupancy(&self) -> (f64, f64) {
        if self.samples == 0 {
            return (0.0, 0.0);
        }
        let n = self.samples as f64;
        (self.t_sum / n, self.ct_sum / n)
    }
}
