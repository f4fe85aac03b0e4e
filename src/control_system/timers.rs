use std::collections::BTreeMap;

/// Whole time-units elapsed since the controller started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalClock {
    now: u64,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }
}

/// The delayed writes a pair transition schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseWrite {
    /// Outgoing pair goes from yellow to red.
    EnterRed,
    /// Handover lands: the target road takes the right-of-way.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledWrite {
    pub due: u64,
    /// Transition identity this write belongs to.
    pub generation: u64,
    pub action: PhaseWrite,
}

/// Pending writes keyed by (due time, insertion sequence), so writes due at the same
/// instant fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    pending: BTreeMap<(u64, u64), ScheduledWrite>,
    next_seq: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, generation: u64, action: PhaseWrite) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(
            (due, seq),
            ScheduledWrite {
                due,
                generation,
                action,
            },
        );
    }

    /// Removes and returns every write due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: u64) -> Vec<ScheduledWrite> {
        let later = self.pending.split_off(&(now.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.pending, later);
        due.into_values().collect()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(due, _)| due)
    }
}
