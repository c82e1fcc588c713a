//! Poller Handle - fixed-cadence sampling loop around the edge detector
//!
//! Owns the gamepad source and the [`EdgeDetector`] behind one lock. The
//! spawned loop and [`PollerHandle::stop`] both take that lock, and every
//! tick re-checks the run generation while holding it, so once `stop`
//! returns the press sink is never called again for that run.
//!
//! ```text
//! GamepadSource ──► EdgeDetector ──► on_press(PressEvent)
//!   (levels)         (edges)          (sink, called under the lock)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::button_map::ButtonMap;
use super::edge_detector::{EdgeDetector, PressEvent};
use super::gamepad_source::GamepadSource;

/// Sink for press events; must not block
pub type PressSink = Box<dyn FnMut(PressEvent) + Send>;

/// Configuration for the sampling loop
///
/// # Examples
///
/// ```rust
/// use quizpad::controller::PollerSettings;
///
/// // roughly one sample per 60Hz frame
/// let settings = PollerSettings { poll_interval_ms: 16 };
/// ```
#[derive(Clone, Debug)]
pub struct PollerSettings {
    /// Sampling period in milliseconds
    ///
    /// Matches the host's frame cadence. Missed ticks are skipped, never
    /// replayed in a burst.
    pub poll_interval_ms: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16, // one 60Hz frame
        }
    }
}

struct PollerCore<S> {
    source: S,
    detector: EdgeDetector,
    sink: Option<PressSink>,
    running: bool,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl<S: GamepadSource> PollerCore<S> {
    // None once the run identified by `generation` has ended.
    fn tick(&mut self, generation: u64) -> Option<usize> {
        if !self.running || self.generation != generation {
            return None;
        }

        let devices = self.source.connected_devices();
        let events = self.detector.sample(&devices);
        let delivered = events.len();
        if let Some(sink) = self.sink.as_mut() {
            for event in events {
                sink(event);
            }
        }
        Some(delivered)
    }
}

fn run_tick<S: GamepadSource>(shared: &Mutex<PollerCore<S>>, generation: u64) -> bool {
    let mut core = shared.lock().unwrap_or_else(PoisonError::into_inner);
    core.tick(generation).is_some()
}

/// Handle for starting and stopping the gamepad sampling loop
///
/// Cloning the handle shares the same loop.
pub struct PollerHandle<S: GamepadSource> {
    core: Arc<Mutex<PollerCore<S>>>,
    settings: PollerSettings,
    runtime: Handle,
}

impl<S: GamepadSource> Clone for PollerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            settings: self.settings.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S: GamepadSource> PollerHandle<S> {
    /// Creates an idle poller. Nothing is sampled until [`start`](Self::start).
    pub fn new(source: S, settings: Option<PollerSettings>, runtime: Handle) -> Self {
        let settings = settings.unwrap_or_default();
        info!("Creating gamepad poller with settings: {:?}", settings);

        Self {
            core: Arc::new(Mutex::new(PollerCore {
                source,
                detector: EdgeDetector::new(ButtonMap::default()),
                sink: None,
                running: false,
                generation: 0,
                cancel: None,
            })),
            settings,
            runtime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PollerCore<S>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts sampling and delivers every rising edge to `on_press`.
    ///
    /// Returns `false` without touching the running loop if the poller is
    /// already running.
    pub fn start<F>(&self, on_press: F) -> bool
    where
        F: FnMut(PressEvent) + Send + 'static,
    {
        let mut core = self.lock();
        if core.running {
            debug!("Gamepad poller already running, ignoring start");
            return false;
        }

        // Levels at start time become the baseline
        let devices = core.source.connected_devices();
        core.detector.prime(&devices);

        core.generation += 1;
        core.running = true;
        core.sink = Some(Box::new(on_press));
        let generation = core.generation;
        let token = CancellationToken::new();
        core.cancel = Some(token.clone());
        drop(core);

        let shared = self.core.clone();
        let period = Duration::from_millis(self.settings.poll_interval_ms.max(1));
        self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if !run_tick(&shared, generation) {
                            break;
                        }
                    }
                }
            }
            debug!("Gamepad poll loop {} finished", generation);
        });

        info!(
            "Gamepad poller started (run {}, every {}ms)",
            generation, self.settings.poll_interval_ms
        );
        true
    }

    /// Stops sampling and clears every device snapshot.
    pub fn stop(&self) {
        let mut core = self.lock();
        if !core.running {
            return;
        }
        core.running = false;
        core.sink = None;
        core.detector.reset();
        if let Some(token) = core.cancel.take() {
            token.cancel();
        }
        info!("Gamepad poller stopped (run {})", core.generation);
    }

    /// Runs one sampling tick right now.
    ///
    /// Returns the number of press events handed to the sink, or 0 when
    /// the poller is not running.
    pub fn poll_once(&self) -> usize {
        let mut core = self.lock();
        let generation = core.generation;
        core.tick(generation).unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
