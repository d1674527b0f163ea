//! Deferred work keyed by game tick instead of wall clock time.

use crate::source::{seconds_to_ticks, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub interval: Tick,
    pub end_tick: Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask<T> {
    pub execution_tick: Tick,
    pub period: Option<Period>,
    pub payload: T,
}

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    task: ScheduledTask<T>,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.task.execution_tick == other.task.execution_tick && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the BinaryHeap pops the earliest tick first, ties in insertion order
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .task
            .execution_tick
            .cmp(&self.task.execution_tick)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    tick_rate: f64,
    queue: std::collections::BinaryHeap<Entry<T>>,
    /// Tasks whose tick already went by in the current pass
    parked: Vec<Entry<T>>,
    next_seq: u64,
    last_checked: Tick,
}

impl<T> Scheduler<T> {
    pub fn new(tick_rate: f64) -> Self {
        Self {
            tick_rate,
            queue: std::collections::BinaryHeap::new(),
            parked: Vec::new(),
            next_seq: 0,
            last_checked: -1,
        }
    }

    /// Schedules `payload` to run `offset_secs` after `current`, returns the execution tick.
    ///
    /// Tasks that would run at a tick `<= 0` are dropped.
    pub fn schedule(&mut self, current: Tick, offset_secs: f64, payload: T) -> Option<Tick> {
        let execution_tick = current + seconds_to_ticks(offset_secs, self.tick_rate);
        self.insert(ScheduledTask {
            execution_tick,
            period: None,
            payload,
        })
    }

    /// Schedules a task that re-registers itself every `interval_secs` until `end_tick`.
    pub fn schedule_periodic(
        &mut self,
        current: Tick,
        interval_secs: f64,
        end_tick: Tick,
        payload: T,
    ) -> Option<Tick> {
        let interval = seconds_to_ticks(interval_secs, self.tick_rate);
        if interval <= 0 {
            tracing::warn!(interval_secs, "Periodic interval is shorter than a tick");
            return None;
        }

        let execution_tick = current + interval;
        if execution_tick >= end_tick {
            return None;
        }

        self.insert(ScheduledTask {
            execution_tick,
            period: Some(Period { interval, end_tick }),
            payload,
        })
    }

    fn insert(&mut self, task: ScheduledTask<T>) -> Option<Tick> {
        let execution_tick = task.execution_tick;
        if execution_tick <= 0 {
            tracing::debug!(execution_tick, "Dropping task scheduled before the first tick");
            return None;
        }

        let entry = Entry {
            seq: self.next_seq,
            task,
        };
        self.next_seq += 1;

        if execution_tick <= self.last_checked {
            self.parked.push(entry);
        } else {
            self.queue.push(entry);
        }
        Some(execution_tick)
    }

    pub fn earliest_pending(&self) -> Option<Tick> {
        self.queue.peek().map(|e| e.task.execution_tick)
    }

    pub fn pending(&self) -> usize {
        self.queue.len() + self.parked.len()
    }

    /// The ticks that still have to be checked to catch up with `current`.
    ///
    /// Tick pulses are only delivered once per frame, so every tick in between has to be fed
    /// to [`Scheduler::on_tick`] on its own.
    pub fn ticks_until(&self, current: Tick) -> std::ops::RangeInclusive<Tick> {
        (self.last_checked + 1)..=current
    }

    /// Removes and returns every task due at exactly `tick`.
    pub fn on_tick(&mut self, tick: Tick) -> Vec<ScheduledTask<T>> {
        if tick > self.last_checked {
            self.last_checked = tick;
        }

        let mut due = Vec::new();

        while let Some(earliest) = self.earliest_pending() {
            if earliest > tick {
                break;
            }

            let entry = match self.queue.pop() {
                Some(e) => e,
                None => break,
            };
            if entry.task.execution_tick < tick {
                tracing::warn!(
                    execution_tick = entry.task.execution_tick,
                    tick,
                    "Task missed its tick"
                );
                self.parked.push(entry);
                continue;
            }
            due.push(entry.task);
        }

        due
    }

    /// Re-registers a fired periodic task, a task that is finished is handed back.
    pub fn reschedule(&mut self, task: ScheduledTask<T>) -> Option<ScheduledTask<T>> {
        let period = match task.period {
            Some(p) => p,
            None => return Some(task),
        };

        let next = task.execution_tick + period.interval;
        if next >= period.end_tick {
            return Some(task);
        }

        self.insert(ScheduledTask {
            execution_tick: next,
            period: task.period,
            payload: task.payload,
        });
        None
    }

    /// Prepares for another pass over the same input, parked tasks get another chance.
    pub fn rewind(&mut self) {
        self.last_checked = -1;
        for entry in self.parked.drain(..) {
            self.queue.push(entry);
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.parked.clear();
    }
}
