//! Slideshow timer.
//!
//! The gallery never owns a raw timer id. Starting the slideshow asks a
//! [`Scheduler`] for a repeating task and keeps the returned [`TimerHandle`];
//! dropping or cancelling the handle stops the task. Every start bumps a
//! generation number carried by each tick, so ticks that were already queued
//! when the slideshow restarted are recognised as stale and ignored.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2500);
const MIN_INTERVAL: Duration = Duration::from_millis(100);

pub const LABEL_ON: &str = "Slideshow: On";
pub const LABEL_OFF: &str = "Slideshow: Off";

/// Called from the timer task with the generation it was started for.
pub type TickCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Single-owner handle to a repeating task. Dropping it cancels the task.
pub struct TimerHandle {
    id: u64,
    task: Option<AbortHandle>,
}

impl TimerHandle {
    /// Handle with no task behind it.
    #[cfg(test)]
    pub fn detached(id: u64) -> Self {
        Self { id, task: None }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub trait Scheduler {
    /// Start a task firing every `period`, first one period from now.
    fn every(&mut self, period: Duration, generation: u64) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

impl<T: Scheduler + ?Sized> Scheduler for Box<T> {
    fn every(&mut self, period: Duration, generation: u64) -> TimerHandle {
        (**self).every(period, generation)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        (**self).cancel(handle)
    }
}

/// Runs slideshow timers as tasks on a tokio runtime.
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
    on_tick: TickCallback,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new(
        runtime: tokio::runtime::Handle,
        on_tick: impl Fn(u64) + Send + Sync + 'static,
    ) -> Self {
        Self {
            runtime,
            on_tick: Arc::new(on_tick),
            next_id: 0,
        }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&mut self, period: Duration, generation: u64) -> TimerHandle {
        self.next_id += 1;
        let on_tick = Arc::clone(&self.on_tick);
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick(generation);
            }
        });

        TimerHandle {
            id: self.next_id,
            task: Some(task.abort_handle()),
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        tracing::debug!(timer = handle.id(), "slideshow timer cancelled");
        drop(handle);
    }
}

struct RunningTimer {
    generation: u64,
    handle: TimerHandle,
}

/// Autoplay state: running iff a timer handle is held.
pub struct Autoplay<T> {
    scheduler: T,
    period: Duration,
    timer: Option<RunningTimer>,
    generation: u64,
}

impl<T: Scheduler> Autoplay<T> {
    pub fn new(scheduler: T, period: Duration) -> Self {
        Self {
            scheduler,
            period: period.max(MIN_INTERVAL),
            timer: None,
            generation: 0,
        }
    }

    /// Start (or restart) the repeating timer. Any previous timer is cancelled first.
    pub fn start(&mut self) {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        let handle = self.scheduler.every(self.period, self.generation);
        tracing::debug!(
            generation = self.generation,
            period_ms = self.period.as_millis() as u64,
            "slideshow timer started"
        );
        self.timer = Some(RunningTimer {
            generation: self.generation,
            handle,
        });
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::debug!(generation = timer.generation, "slideshow timer stopped");
            self.scheduler.cancel(timer.handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether a tick from `generation` belongs to the live timer.
    pub fn accepts(&self, generation: u64) -> bool {
        self.timer
            .as_ref()
            .map(|t| t.generation == generation)
            .unwrap_or(false)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn label(&self) -> &'static str {
        if self.is_running() {
            LABEL_ON
        } else {
            LABEL_OFF
        }
    }
}

/// Scheduler that only records which timers are live.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<std::sync::Mutex<ManualState>>,
}

#[cfg(test)]
#[derive(Default)]
struct ManualState {
    next_id: u64,
    scheduled: usize,
    active: Vec<(u64, u64)>,
}

#[cfg(test)]
impl ManualScheduler {
    /// Generations of the timers currently live.
    pub fn active_generations(&self) -> Vec<u64> {
        let state = self.state.lock().expect("manual scheduler lock");
        state.active.iter().map(|&(_, g)| g).collect()
    }

    pub fn scheduled_count(&self) -> usize {
        self.state.lock().expect("manual scheduler lock").scheduled
    }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    fn every(&mut self, _period: Duration, generation: u64) -> TimerHandle {
        let mut state = self.state.lock().expect("manual scheduler lock");
        state.next_id += 1;
        state.scheduled += 1;
        let id = state.next_id;
        state.active.push((id, generation));
        TimerHandle::detached(id)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut state = self.state.lock().expect("manual scheduler lock");
        state.active.retain(|&(id, _)| id != handle.id());
    }
}
