use crate::core::callbacks::CallbackRegistry;
use crate::domain::ports::NativeBinding;
use crate::utils::error::{Result, ShimError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_CALLBACK_RATE_HZ: u32 = 30;

pub fn interval_for_rate(rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)))
}

struct PumpTask {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Decrements the live-task counter when the pump future is dropped.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Keeps a single fixed-interval task calling `run_callbacks`.
pub struct CallbackPump {
    interval: Duration,
    task: Mutex<Option<PumpTask>>,
    generation: AtomicU64,
    live: Arc<AtomicUsize>,
}

impl CallbackPump {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
            generation: AtomicU64::new(0),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts a pump, aborting the one already running.
    pub fn restart(
        &self,
        binding: Arc<dyn NativeBinding>,
        callbacks: Arc<CallbackRegistry>,
    ) -> Result<u64> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ShimError::NoRuntime {
            task: "callback pump",
        })?;

        let mut slot = self.task.lock();
        if let Some(previous) = slot.take() {
            tracing::debug!("Replacing callback pump generation {}", previous.generation);
            previous.handle.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let period = self.interval;
        let live = Arc::clone(&self.live);
        live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(live);

        let handle = runtime.spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match binding.run_callbacks() {
                    Ok(events) => {
                        for event in &events {
                            let invoked = callbacks.dispatch(event);
                            tracing::trace!("{:?} dispatched to {} handler(s)", event.kind, invoked);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Callback pump tick failed: {}", e);
                    }
                }
            }
        });

        tracing::debug!(
            "Callback pump generation {} started ({:?} interval)",
            generation,
            period
        );
        *slot = Some(PumpTask { generation, handle });
        Ok(generation)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Pump tasks whose futures have not been dropped yet.
    pub fn active_tasks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.handle.abort();
            tracing::debug!("Callback pump generation {} stopped", task.generation);
        }
    }
}

impl Drop for CallbackPump {
    fn drop(&mut self) {
        self.stop();
    }
}
