use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Shortest period a task ticks at; zero periods are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A periodic background task.
///
/// The first tick fires one `period` after creation. Ticks missed while the
/// runtime was busy are skipped rather than burst. The task is aborted when
/// the value is cancelled or dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    period: Duration,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Calls `on_tick` every `period` until cancelled.
    pub fn every<F>(period: Duration, on_tick: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                on_tick();
            }
        });
        Self { period, handle }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
