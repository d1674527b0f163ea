use crate::source::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRecord {
    pub number: i32,
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub official_end_tick: Option<Tick>,
    pub t_score: i32,
    pub ct_score: i32,
}

impl RoundRecord {
    pub fn valid_end(&self) -> Tick {
        self.official_end_tick.unwrap_or(self.end_tick)
    }

    pub fn contains(&self, tick: Tick) -> bool {
        self.start_tick <= tick && tick <= self.valid_end()
    }
}

/// The rounds that survived the validity checks of the discovery pass, keyed by round number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidRounds {
    rounds: std::collections::BTreeMap<i32, RoundRecord>,
}

impl ValidRounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: RoundRecord) -> bool {
        if record.end_tick < record.start_tick {
            tracing::error!(?record, "Round ends before it starts");
            return false;
        }
        if let Some(last) = self.last_number() {
            if record.number <= last {
                tracing::error!(number = record.number, last, "Round number is not increasing");
                return false;
            }
        }

        self.rounds.insert(record.number, record);
        true
    }

    pub fn set_official_end(&mut self, number: i32, tick: Tick) -> bool {
        match self.rounds.get_mut(&number) {
            Some(record) if tick >= record.end_tick => {
                record.official_end_tick = Some(tick);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, number: i32) -> Option<&RoundRecord> {
        self.rounds.get(&number)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn last_number(&self) -> Option<i32> {
        self.rounds.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.values()
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }

    /// Finds the round containing `tick`, only looking at rounds after `after`.
    pub fn locate_after(&self, after: i32, tick: Tick) -> Option<&RoundRecord> {
        self.rounds
            .range((after + 1)..)
            .map(|(_, r)| r)
            .find(|r| r.contains(tick))
    }

    /// The first round number that is missing between 1 and the last recorded round
    pub fn first_gap(&self) -> Option<i32> {
        let mut expected = 1;
        for number in self.rounds.keys() {
            if *number != expected {
                return Some(expected);
            }
            expected += 1;
        }
        None
    }
}
