//! The match and round state machine.
//!
//! A demo is read twice. The discovery pass only figures out which rounds are valid and where
//! they start and end, the statistics pass then uses those boundaries to decide which events
//! count.

mod match_events;
mod player_events;
mod tasks;

use crate::classifier::{self, RoundType};
use crate::config::AnalysisConfig;
use crate::equipment::RoundEndReason;
use crate::mapcontrol::MapControl;
use crate::navigation::PlaceGraph;
use crate::registry::PlayerRegistry;
use crate::rounds::{RoundRecord, ValidRounds};
use crate::scheduler::Scheduler;
use crate::score::{MoneyCheckpoint, ScoreLedger};
use crate::source::{DemoEvent, DemoHeader, GameState, ItemId, PlayerId, Side, Tick};
use crate::tracker::RoundTracker;

pub(crate) use tasks::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Discovery,
    Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreMatch,
    InRound,
    RoundEndPending,
    RoundOfficiallyEnded,
}

/// What happened in a committed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub number: i32,
    pub winner: Side,
    pub reason: Option<RoundEndReason>,
    pub t_round_type: RoundType,
    pub ct_round_type: RoundType,
}

pub struct MatchAnalyser {
    config: AnalysisConfig,
    header: DemoHeader,
    pass: Pass,
    phase: Phase,
    match_ended: bool,
    is_overtime: bool,
    analysed: bool,

    ledger: ScoreLedger,
    rounds: ValidRounds,
    players: PlayerRegistry,
    tracker: RoundTracker,
    scheduler: Scheduler<Task>,
    map_control: Option<MapControl>,

    last_match_start: Option<Tick>,

    // Discovery
    round_start: Tick,
    round_end: Tick,
    last_official_end: Option<Tick>,
    cancelled: bool,
    player_hurt: bool,
    waiting_for_players: bool,
    money_set: bool,
    start_money: i32,

    // Statistics
    current: Option<RoundRecord>,
    last_round_reset: i32,
    last_round_end_called: i32,
    last_round_closed: i32,
    weapon_fired: bool,
    first_kill_done: bool,
    round_types: (RoundType, RoundType),
    dropped_items: std::collections::HashMap<ItemId, (PlayerId, Side)>,
    outcomes: Vec<RoundOutcome>,
}

impl std::fmt::Debug for MatchAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchAnalyser")
            .field("pass", &self.pass)
            .field("phase", &self.phase)
            .field("ledger", &self.ledger)
            .field("rounds", &self.rounds.len())
            .field("match_ended", &self.match_ended)
            .finish()
    }
}

impl MatchAnalyser {
    pub fn new(
        config: AnalysisConfig,
        mut header: DemoHeader,
        places: Option<Box<dyn PlaceGraph>>,
    ) -> Self {
        if !(header.tick_rate.is_finite() && header.tick_rate > 0.0) {
            tracing::warn!(tick_rate = header.tick_rate, "Invalid tick rate, assuming 64");
            header.tick_rate = 64.0;
        }

        let ledger = ScoreLedger::new(config.max_rounds, config.overtime_max_rounds);
        let tracker = RoundTracker::new(config.trade_window(header.tick_rate));
        let scheduler = Scheduler::new(header.tick_rate);
        let start_money = config.start_money;

        Self {
            config,
            header,
            pass: Pass::Discovery,
            phase: Phase::PreMatch,
            match_ended: false,
            is_overtime: false,
            analysed: false,
            ledger,
            rounds: ValidRounds::new(),
            players: PlayerRegistry::new(),
            tracker,
            scheduler,
            map_control: places.map(MapControl::new),
            last_match_start: None,
            round_start: 0,
            round_end: 0,
            last_official_end: None,
            cancelled: false,
            player_hurt: false,
            waiting_for_players: false,
            money_set: false,
            start_money,
            current: None,
            last_round_reset: 0,
            last_round_end_called: 0,
            last_round_closed: 0,
            weapon_fired: false,
            first_kill_done: false,
            round_types: (RoundType::Normal, RoundType::Normal),
            dropped_items: std::collections::HashMap::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn valid_rounds(&self) -> &ValidRounds {
        &self.rounds
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    pub fn match_ended(&self) -> bool {
        self.match_ended
    }

    pub fn is_overtime(&self) -> bool {
        self.is_overtime
    }

    /// Set once the statistics pass committed the last valid round
    pub fn is_analysed(&self) -> bool {
        self.analysed
    }

    pub fn tick_rate(&self) -> f64 {
        self.header.tick_rate
    }

    /// Switches to the statistics pass, everything but the discovered rounds starts over.
    pub fn begin_statistics(&mut self) {
        tracing::info!(rounds = self.rounds.len(), "Starting statistics pass");

        self.pass = Pass::Statistics;
        self.phase = Phase::PreMatch;
        self.match_ended = false;
        self.is_overtime = false;
        self.analysed = false;

        self.ledger.reset();
        self.players.clear();
        self.tracker.reset();
        self.scheduler.rewind();
        if let Some(control) = self.map_control.as_mut() {
            control.reset();
        }

        self.last_match_start = None;
        self.cancelled = false;
        self.player_hurt = false;
        self.waiting_for_players = false;

        self.current = None;
        self.last_round_reset = 0;
        self.last_round_end_called = 0;
        self.last_round_closed = 0;
        self.weapon_fired = false;
        self.first_kill_done = false;
        self.round_types = (RoundType::Normal, RoundType::Normal);
        self.dropped_items.clear();
        self.outcomes.clear();
    }

    pub fn handle(&mut self, event: &DemoEvent, state: &dyn GameState) {
        let tick = state.tick();
        if tick < 0 && !matches!(event, DemoEvent::TickAdvanced) {
            tracing::debug!(tick, "Ignoring event before the first tick");
            return;
        }

        match event {
            DemoEvent::ConVarsChanged(vars) => {
                if self.pass == Pass::Discovery {
                    self.convars_changed(vars);
                }
            }
            DemoEvent::MatchStart => self.match_start(state, tick),
            DemoEvent::MatchStartedChanged { new, .. } => {
                if *new {
                    self.match_start(state, tick);
                }
            }
            DemoEvent::PlayerConnect(player) => self.player_connect(player),
            DemoEvent::PlayerDisconnect(player) => self.player_disconnect(player.id, tick),
            DemoEvent::PlayerTeamChange {
                player,
                old_side,
                new_side,
            } => self.player_team_change(player, *old_side, *new_side, tick),
            DemoEvent::RoundStart => self.round_start(state, tick),
            DemoEvent::ScoreUpdated { team, opponent } => self.round_end(
                match_events::RoundEndSignal::Score { team, opponent },
                state,
                tick,
            ),
            DemoEvent::RoundEnd {
                reason,
                winner,
                loser,
            } => self.round_end(
                match_events::RoundEndSignal::End {
                    reason: *reason,
                    winner,
                    loser,
                },
                state,
                tick,
            ),
            DemoEvent::RoundEndOfficial => self.round_official_end(state, tick),
            DemoEvent::TickAdvanced => self.tick_advanced(state, tick),
            other => match self.pass {
                Pass::Discovery => self.discovery_player_event(other, state, tick),
                Pass::Statistics => {
                    self.late_round_start(state, tick);
                    if self.accepts_player_event(tick) {
                        self.player_event(other, state, tick);
                    } else {
                        tracing::trace!(tick, "Player event outside of a valid round");
                    }
                }
            },
        }
    }

    /// Makes the valid round containing `tick` the current one, moving only forward.
    fn locate(&mut self, tick: Tick) -> bool {
        if let Some(current) = self.current {
            if current.contains(tick) {
                // A closed round hands its last tick over to a round starting on it
                if current.number <= self.last_round_closed {
                    if let Some(next) = self.rounds.locate_after(current.number, tick).copied() {
                        tracing::debug!(round = next.number, tick, "Entered round");
                        self.current = Some(next);
                    }
                }
                return true;
            }
        }

        let after = self.current.as_ref().map(|c| c.number).unwrap_or(0);
        match self.rounds.locate_after(after, tick).copied() {
            Some(record) => {
                tracing::debug!(round = record.number, tick, "Entered round");
                self.current = Some(record);
                true
            }
            None => false,
        }
    }

    /// Rounds opened by a late match start have no start event of their own in this pass.
    fn late_round_start(&mut self, state: &dyn GameState, tick: Tick) {
        if !self.locate(tick) {
            return;
        }
        if let Some(current) = self.current {
            if current.start_tick == tick && current.number > self.last_round_reset {
                tracing::debug!(round = current.number, tick, "Late round start");
                self.reset_round(state, tick);
            }
        }
    }

    /// Boundary ticks get events from resets re-emitted, those are never counted.
    fn accepts_player_event(&mut self, tick: Tick) -> bool {
        if !self.locate(tick) {
            return false;
        }
        match self.current.as_ref() {
            Some(current) => tick != current.start_tick && Some(tick) != current.official_end_tick,
            None => false,
        }
    }

    fn round_number(&self) -> i32 {
        match self.pass {
            Pass::Discovery => self.ledger.rounds_played() + 1,
            Pass::Statistics => self.current.as_ref().map(|c| c.number).unwrap_or(0),
        }
    }

    fn match_valid(&self) -> bool {
        self.phase != Phase::PreMatch && !self.match_ended
    }

    fn participants_valid(&self, state: &dyn GameState, tick: Tick) -> bool {
        if tick == 0 {
            return true;
        }
        let t = state.team_members(Side::Terrorists).len();
        let ct = state.team_members(Side::CounterTerrorists).len();
        t == self.config.team_size && ct == self.config.team_size
    }

    fn money_valid(&self) -> bool {
        if !self.money_set {
            return true;
        }
        match self.ledger.money_checkpoint() {
            Some(MoneyCheckpoint::Regular) => self.start_money == self.config.start_money,
            Some(MoneyCheckpoint::Overtime) => self.start_money == self.config.overtime_start_money,
            None => true,
        }
    }

    fn check_match_continuity(&mut self) {
        let (is_over, is_overtime) = self
            .ledger
            .check_match_end(self.ledger.t(), self.ledger.ct());
        self.is_overtime = is_overtime;
        if is_over && !self.match_ended {
            tracing::info!(
                t = self.ledger.t(),
                ct = self.ledger.ct(),
                rounds = self.ledger.rounds_played(),
                "Match has ended"
            );
            self.match_ended = true;
        }
    }

    /// Only rounds played before the minimum count are thrown away by a restart
    fn reset_match(&mut self) {
        if self.ledger.rounds_played() >= self.config.min_valid_rounds {
            tracing::info!(
                rounds = self.ledger.rounds_played(),
                "Ignoring match restart after enough rounds"
            );
            return;
        }

        tracing::info!(rounds = self.ledger.rounds_played(), "Match (re)started");
        self.ledger.reset();
        self.rounds.clear();
        self.match_ended = false;
        self.is_overtime = false;
        self.round_end = 0;
        self.last_official_end = None;
        for player in self.players.all_mut() {
            player.reset_match();
        }
    }

    fn reset_round(&mut self, state: &dyn GameState, tick: Tick) {
        if self.pass == Pass::Statistics {
            let number = self.round_number();
            if number <= self.last_round_reset {
                return;
            }
            self.last_round_reset = number;
        }

        self.phase = Phase::InRound;
        self.cancelled = false;
        self.player_hurt = false;
        self.weapon_fired = false;
        self.first_kill_done = false;
        // Pistol rounds stay pistol rounds even if nobody fires
        let seeded = if classifier::is_pistol_round(self.round_number(), self.config.max_rounds) {
            RoundType::Pistol
        } else {
            RoundType::Normal
        };
        self.round_types = (seeded, seeded);
        self.dropped_items.clear();
        self.tracker.reset();

        self.players.clear_alive();
        for side in [Side::Terrorists, Side::CounterTerrorists] {
            for member in state.team_members(side) {
                if !self.players.ensure(member) {
                    continue;
                }
                if let Some(player) = self.players.get_mut(member.id, true) {
                    player.side = side;
                    player.start_round(member.money);
                }
                self.players.add_alive(side, member.id);
            }
        }

        if self.pass == Pass::Statistics {
            self.start_map_control(tick);
        }
    }

    fn remove_alive(&mut self, side: Side, id: PlayerId) {
        if self.players.remove_alive(side, id) {
            let (alive_t, alive_ct) = self.players.alive_sets();
            self.tracker.check_clutch(alive_t, alive_ct);
        }
    }
}
