use std::time::{Duration, Instant};

/// Source of elapsed wall-clock time since the start of an optimization run
pub trait TimeSource {
    fn elapsed(&self) -> Duration;
}

/// [`TimeSource`] backed by the monotonic system clock
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Starts measuring from now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Measures from an earlier instant, e.g. program start
    pub fn since(start: Instant) -> Self {
        Self { start }
    }
}

impl TimeSource for Stopwatch {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Global deadline of a run, shared by all solver invocations of that run.
pub struct TimeBudget<'a> {
    clock: &'a dyn TimeSource,
    deadline: Duration,
    /// Reserved at the end of every solver call for extraction and validation
    margin: Duration,
}

impl<'a> TimeBudget<'a> {
    pub fn new(clock: &'a dyn TimeSource, deadline: Duration, margin: Duration) -> Self {
        Self {
            clock,
            deadline,
            margin,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Time left until the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_sub(self.clock.elapsed())
    }

    /// Time limit for the next solver call: the remaining time minus the safety margin.
    /// `None` if nothing would be left for the solver.
    pub fn solve_limit(&self) -> Option<Duration> {
        self.remaining()
            .checked_sub(self.margin)
            .filter(|limit| !limit.is_zero())
    }
}
