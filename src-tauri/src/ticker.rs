use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// The initial loading delay elapsed.
    Loaded,
    /// A recurring update interval elapsed.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerTiming {
    /// `None` once the dashboard has already finished loading.
    pub initial_delay: Option<Duration>,
    pub interval: Duration,
}

pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type TickHandler = Arc<dyn Fn(TickKind) -> TickFuture + Send + Sync>;

struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives the load delay and the recurring update timer. At most one timer task is alive;
/// starting again, stopping, or dropping the last handle cancels the previous one.
#[derive(Clone, Default)]
pub struct UpdateTicker {
    handler: Arc<RwLock<Option<TickHandler>>>,
    reset: Arc<Notify>,
    task: Arc<Mutex<Option<TaskGuard>>>,
}

impl UpdateTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_handler(&self, handler: TickHandler) {
        let mut writer = self.handler.write().expect("ticker handler write lock");
        *writer = Some(handler);
    }

    pub fn start(&self, timing: TickerTiming) {
        let handler = self.handler.clone();
        let reset = self.reset.clone();
        let task = tokio::spawn(async move {
            run_loop(handler, reset, timing).await;
        });

        let mut slot = self.task.lock().expect("ticker task lock");
        // replacing the guard aborts any previous loop
        *slot = Some(TaskGuard(task));
        tracing::debug!(
            initial_delay_ms = timing.initial_delay.map(|delay| delay.as_millis() as u64),
            interval_secs = timing.interval.as_secs(),
            "update ticker started"
        );
    }

    /// Pushes the next update a full interval into the future.
    pub fn reset_interval(&self) {
        self.reset.notify_one();
    }

    pub fn stop(&self) {
        let mut slot = self.task.lock().expect("ticker task lock");
        if slot.take().is_some() {
            tracing::debug!("update ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("ticker task lock")
            .as_ref()
            .map(|guard| !guard.0.is_finished())
            .unwrap_or(false)
    }
}

async fn run_loop(handler: Arc<RwLock<Option<TickHandler>>>, reset: Arc<Notify>, timing: TickerTiming) {
    if let Some(delay) = timing.initial_delay {
        tokio::time::sleep(delay).await;
        dispatch(&handler, TickKind::Loaded).await;
    }

    let mut interval = tokio::time::interval_at(Instant::now() + timing.interval, timing.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                dispatch(&handler, TickKind::Update).await;
            }
            _ = reset.notified() => {
                interval.reset();
            }
        }
    }
}

async fn dispatch(handler: &RwLock<Option<TickHandler>>, kind: TickKind) {
    let handler = handler.read().expect("ticker handler read lock").clone();
    match handler {
        Some(handler) => handler(kind).await,
        None => tracing::warn!(?kind, "tick fired without a handler"),
    }
}
