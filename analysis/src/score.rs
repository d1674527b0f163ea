//! Per side scores and the arithmetic around halves and overtime.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyCheckpoint {
    /// First round of a regular half
    Regular,
    /// First round of an overtime half
    Overtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    t: i32,
    ct: i32,
    rounds_played: i32,
    last_swapped: i32,
    max_rounds: i32,
    overtime_max_rounds: i32,
}

impl ScoreLedger {
    pub fn new(max_rounds: i32, overtime_max_rounds: i32) -> Self {
        Self {
            t: 0,
            ct: 0,
            rounds_played: 0,
            last_swapped: 0,
            max_rounds,
            overtime_max_rounds,
        }
    }

    pub fn t(&self) -> i32 {
        self.t
    }

    pub fn ct(&self) -> i32 {
        self.ct
    }

    pub fn rounds_played(&self) -> i32 {
        self.rounds_played
    }

    pub fn overtime_max_rounds(&self) -> i32 {
        self.overtime_max_rounds
    }

    /// Only positive, even lengths are accepted
    pub fn set_overtime_max_rounds(&mut self, rounds: i32) -> bool {
        if rounds <= 0 || rounds % 2 != 0 {
            return false;
        }
        self.overtime_max_rounds = rounds;
        true
    }

    pub fn reset(&mut self) {
        self.t = 0;
        self.ct = 0;
        self.rounds_played = 0;
        self.last_swapped = 0;
    }

    pub fn update_score(&mut self, t: i32, ct: i32) -> bool {
        if t < 0 || ct < 0 {
            tracing::error!(t, ct, "Refusing negative score");
            return false;
        }

        self.t = t;
        self.ct = ct;
        self.rounds_played = t + ct;
        true
    }

    /// Returns `(is_over, is_overtime)` for the given score.
    pub fn check_match_end(&self, t: i32, ct: i32) -> (bool, bool) {
        let win_rounds = self.max_rounds / 2 + 1;
        let overtime_played = t + ct - self.max_rounds;

        if (ct == win_rounds) == (t == win_rounds) && overtime_played < 0 {
            return (false, false);
        }

        let diff = (ct - t).abs();
        let half = self.overtime_max_rounds / 2;
        let x = overtime_played % self.overtime_max_rounds;

        let is_over = overtime_played < 0 || (x == 0 && diff == 2) || (x > half && diff >= half);
        let is_overtime = overtime_played > 0 || (overtime_played == 0 && !is_over);

        (is_over, is_overtime)
    }

    pub fn is_over(&self) -> bool {
        self.check_match_end(self.t, self.ct).0
    }

    pub fn is_half_break(&self, t: i32, ct: i32, match_ended: bool) -> bool {
        let played = t + ct;
        let overtime_played = played - self.max_rounds;

        if overtime_played <= 0 {
            played == self.max_rounds / 2 || (played == self.max_rounds && !match_ended)
        } else {
            overtime_played % (self.overtime_max_rounds / 2) == 0
        }
    }

    /// The starting money expected at the current point of the match, if any is known.
    pub fn money_checkpoint(&self) -> Option<MoneyCheckpoint> {
        let played = self.rounds_played;
        if played == 0 || played == self.max_rounds / 2 {
            return Some(MoneyCheckpoint::Regular);
        }
        if played >= self.max_rounds
            && (played - self.max_rounds) % (self.overtime_max_rounds / 2) == 0
        {
            return Some(MoneyCheckpoint::Overtime);
        }
        None
    }

    /// Swaps the stored scores once the sides switched, at most once per boundary.
    pub fn swap_sides(&mut self) -> bool {
        let played = self.rounds_played;
        let overtime_played = played - self.max_rounds;

        let at_boundary = played == self.max_rounds / 2
            || played == self.max_rounds
            || (overtime_played > 0 && overtime_played % (self.overtime_max_rounds / 2) == 0);
        if !at_boundary || played <= self.last_swapped {
            return false;
        }

        std::mem::swap(&mut self.t, &mut self.ct);
        self.last_swapped = played;
        tracing::debug!(played, t = self.t, ct = self.ct, "Swapped scores");
        true
    }
}
