//! Round scoped bookkeeping for clutches, trades and KAST.

use crate::source::{PlayerId, Side, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KillRecord {
    tick: Tick,
    victim: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub trader: PlayerId,
    pub tradee: PlayerId,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTracker {
    trade_window: Tick,
    kills: std::collections::HashMap<PlayerId, Vec<KillRecord>>,
    kast: std::collections::HashSet<PlayerId>,
    t_nominee: Option<PlayerId>,
    ct_nominee: Option<PlayerId>,
}

impl RoundTracker {
    pub fn new(trade_window: Tick) -> Self {
        Self {
            trade_window,
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        self.kills.clear();
        self.kast.clear();
        self.t_nominee = None;
        self.ct_nominee = None;
    }

    /// Registers a kill and checks whether it avenged a teammate of `killer`.
    pub fn record_kill(&mut self, killer: PlayerId, victim: PlayerId, tick: Tick) -> Option<Trade> {
        let trade = self
            .kills
            .get(&victim)
            .and_then(|kills| {
                kills
                    .iter()
                    .rev()
                    .find(|k| tick - k.tick <= self.trade_window)
            })
            .map(|k| Trade {
                trader: killer,
                tradee: k.victim,
            });

        self.kills
            .entry(killer)
            .or_default()
            .push(KillRecord { tick, victim });

        if let Some(trade) = trade.as_ref() {
            tracing::trace!(trader = ?trade.trader, tradee = ?trade.tradee, tick, "Trade");
            self.mark_kast(trade.tradee);
        }
        trade
    }

    pub fn mark_kast(&mut self, player: PlayerId) {
        self.kast.insert(player);
    }

    pub fn has_kast(&self, player: PlayerId) -> bool {
        self.kast.contains(&player)
    }

    pub fn kast_players(&self) -> impl Iterator<Item = &PlayerId> {
        self.kast.iter()
    }

    pub fn nominee(&self, side: Side) -> Option<PlayerId> {
        match side {
            Side::Terrorists => self.t_nominee,
            Side::CounterTerrorists => self.ct_nominee,
            _ => None,
        }
    }

    fn nominee_mut(&mut self, side: Side) -> Option<&mut Option<PlayerId>> {
        match side {
            Side::Terrorists => Some(&mut self.t_nominee),
            Side::CounterTerrorists => Some(&mut self.ct_nominee),
            _ => None,
        }
    }

    /// Re-evaluates clutch situations after someone left an alive set.
    pub fn check_clutch(
        &mut self,
        alive_t: &std::collections::BTreeSet<PlayerId>,
        alive_ct: &std::collections::BTreeSet<PlayerId>,
    ) {
        for (side, own, other) in [
            (Side::Terrorists, alive_t, alive_ct),
            (Side::CounterTerrorists, alive_ct, alive_t),
        ] {
            if own.len() != 1 || other.is_empty() {
                continue;
            }

            let nominee = match self.nominee_mut(side) {
                Some(n) if n.is_none() => n,
                _ => continue,
            };
            *nominee = own.iter().next().copied();
            tracing::debug!(?side, player = ?nominee, opponents = other.len(), "Possible clutch");
        }
    }

    /// The nominee of the winning side, if they are still standing.
    pub fn clutch_winner(
        &self,
        winner: Side,
        alive: &std::collections::BTreeSet<PlayerId>,
    ) -> Option<PlayerId> {
        self.nominee(winner).filter(|p| alive.contains(p))
    }
}
