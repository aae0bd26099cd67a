//! Throttled single-flight scan scheduling.
//!
//! The update loop calls [`ScanScheduler::tick`] once per frame. Every
//! `frame_skip` ticks, if no cycle is running, the scheduler snapshots the
//! frame, marks itself busy and hands the job to a dedicated worker thread
//! over a one-slot channel. The worker publishes the result, adjusts the
//! threshold and returns to idle under a single lock, so a reader never sees
//! a partial result or a threshold from a different cycle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dotscan_core::{
    ColorFrame, FrameArea, FrameAreaError, ImageSize, NormalizedRect, Platform, PointDetector,
    ThresholdController,
};
use parking_lot::{Condvar, Mutex};

use crate::{Detection, DotFinder, ScanConfig, ScanError, ScanResult};

/// Whether a cycle is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A cycle is still running; nothing was dispatched.
    Busy,
    /// Fewer than `frame_skip` ticks since the last dispatch.
    Throttled,
    /// The region of interest clipped to nothing; the cycle was skipped.
    EmptyRegion,
    /// A new cycle was handed to the worker.
    Dispatched { cycle: u64 },
    /// The worker is gone; the scheduler has been shut down.
    Stopped,
}

/// Result of [`ScanScheduler::tick`]: what happened plus the latest complete
/// result, which may be from an earlier cycle.
#[derive(Clone, Debug)]
pub struct Tick {
    pub outcome: TickOutcome,
    pub latest: Arc<ScanResult>,
}

struct ScanJob {
    cycle: u64,
    area: FrameArea,
    frame: Option<ColorFrame>,
    screen: ImageSize,
}

struct Slot {
    state: ScanState,
    latest: Arc<ScanResult>,
    threshold: ThresholdController,
    dispatched: u64,
}

struct Shared {
    slot: Mutex<Slot>,
    settled: Condvar,
}

/// Drives [`DotFinder`] cycles on a background worker.
pub struct ScanScheduler {
    finder: Arc<DotFinder>,
    config: ScanConfig,
    shared: Arc<Shared>,
    jobs: Option<Sender<ScanJob>>,
    worker: Option<JoinHandle<()>>,
    ticks_since_dispatch: u32,
    screen: ImageSize,
}

impl ScanScheduler {
    /// Start the worker thread. The finder is built from the same `config`,
    /// so point limits and cadence share one source. `screen` is the initial
    /// display size used for aspect compensation; update it with
    /// [`ScanScheduler::set_screen`].
    pub fn spawn<D>(
        sensor: ImageSize,
        platform: Platform,
        config: ScanConfig,
        screen: ImageSize,
        detector: D,
    ) -> Result<Self, ScanError>
    where
        D: PointDetector + 'static,
    {
        let finder = Arc::new(DotFinder::new(sensor, platform, &config)?);
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                state: ScanState::Idle,
                latest: Arc::new(ScanResult::default()),
                threshold: ThresholdController::new(config.threshold),
                dispatched: 0,
            }),
            settled: Condvar::new(),
        });

        let (tx, rx) = crossbeam_channel::bounded::<ScanJob>(1);
        let worker = {
            let finder = Arc::clone(&finder);
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("dotscan-worker".into())
                .spawn(move || run_worker(&finder, &detector, &shared, rx))
                .map_err(ScanError::WorkerSpawn)?
        };
        log::debug!(
            "scan worker started (sensor {}, frame_skip {}, max_points {})",
            finder.sensor(),
            config.frame_skip,
            config.max_points
        );

        Ok(Self {
            finder,
            config,
            shared,
            jobs: Some(tx),
            worker: Some(worker),
            ticks_since_dispatch: 0,
            screen,
        })
    }

    pub fn finder(&self) -> &DotFinder {
        &self.finder
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn screen(&self) -> ImageSize {
        self.screen
    }

    /// Display size for subsequent cycles. In-flight cycles keep the size
    /// they were dispatched with.
    pub fn set_screen(&mut self, screen: ImageSize) {
        self.screen = screen;
    }

    /// Advance the scheduler by one update-loop iteration.
    ///
    /// Never blocks on the worker. The frame is copied only when a cycle is
    /// actually dispatched.
    pub fn tick(&mut self, roi: NormalizedRect, frame: Option<&ColorFrame>) -> Tick {
        self.ticks_since_dispatch = self.ticks_since_dispatch.saturating_add(1);

        let Some(jobs) = self.jobs.as_ref() else {
            return Tick {
                outcome: TickOutcome::Stopped,
                latest: self.latest(),
            };
        };

        let latest = {
            let slot = self.shared.slot.lock();
            if slot.state == ScanState::Scanning {
                return Tick {
                    outcome: TickOutcome::Busy,
                    latest: Arc::clone(&slot.latest),
                };
            }
            Arc::clone(&slot.latest)
        };
        if self.ticks_since_dispatch < self.config.frame_skip {
            return Tick {
                outcome: TickOutcome::Throttled,
                latest,
            };
        }

        // Only this thread moves Idle -> Scanning, so the state cannot change
        // under us between the check above and the transition below.
        let area = match self.finder.frame_area(roi) {
            Ok(area) => area,
            Err(FrameAreaError::EmptyRegion) => {
                log::trace!("scan region {roi:?} is empty, skipping cycle");
                return Tick {
                    outcome: TickOutcome::EmptyRegion,
                    latest,
                };
            }
            Err(err) => {
                log::warn!("cannot scan region {roi:?}: {err}");
                return Tick {
                    outcome: TickOutcome::EmptyRegion,
                    latest,
                };
            }
        };

        let frame = frame.map(|f| {
            let mut snapshot = f.clone();
            if self.config.flip_vertically {
                snapshot.flip_vertically();
            }
            snapshot
        });

        let cycle = {
            let mut slot = self.shared.slot.lock();
            slot.state = ScanState::Scanning;
            slot.dispatched += 1;
            slot.dispatched
        };
        self.ticks_since_dispatch = 0;

        let job = ScanJob {
            cycle,
            area,
            frame,
            screen: self.screen,
        };
        match jobs.try_send(job) {
            Ok(()) => Tick {
                outcome: TickOutcome::Dispatched { cycle },
                latest,
            },
            Err(err) => {
                let outcome = match err {
                    TrySendError::Full(_) => {
                        log::warn!("scan job slot unexpectedly full, dropping cycle {cycle}");
                        TickOutcome::Busy
                    }
                    TrySendError::Disconnected(_) => {
                        log::error!("scan worker is gone, stopping scheduler");
                        self.jobs = None;
                        TickOutcome::Stopped
                    }
                };
                self.settle_idle();
                Tick { outcome, latest }
            }
        }
    }

    /// Latest complete result; never blocks on a running cycle.
    pub fn latest(&self) -> Arc<ScanResult> {
        Arc::clone(&self.shared.slot.lock().latest)
    }

    pub fn state(&self) -> ScanState {
        self.shared.slot.lock().state
    }

    /// Threshold the next cycle will run with.
    pub fn threshold(&self) -> u8 {
        self.shared.slot.lock().threshold.value()
    }

    /// Block until no cycle is in flight or `timeout` elapses. Returns `true`
    /// when idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.slot.lock();
        while slot.state == ScanState::Scanning {
            if self.shared.settled.wait_until(&mut slot, deadline).timed_out() {
                return slot.state == ScanState::Idle;
            }
        }
        true
    }

    /// Drop the job channel and join the worker. Idempotent.
    pub fn shutdown(&mut self) {
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("scan worker panicked");
            }
            log::debug!("scan worker stopped");
        }
    }

    fn settle_idle(&self) {
        self.shared.slot.lock().state = ScanState::Idle;
        self.shared.settled.notify_all();
    }
}

impl Drop for ScanScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<D: PointDetector>(
    finder: &DotFinder,
    detector: &D,
    shared: &Shared,
    jobs: Receiver<ScanJob>,
) {
    while let Ok(job) = jobs.recv() {
        let threshold = shared.slot.lock().threshold.value();

        let detection = panic::catch_unwind(AssertUnwindSafe(|| {
            finder.detect(&job.area, job.frame.as_ref(), job.screen, threshold, detector)
        }))
        .unwrap_or_else(|_| {
            log::error!("detector panicked during cycle {}", job.cycle);
            Detection::default()
        });

        let mut slot = shared.slot.lock();
        if let Some(count) = detection.raw_count {
            let next = slot.threshold.update(count);
            if next != threshold {
                log::debug!("cycle {}: {count} points, threshold {threshold} -> {next}", job.cycle);
            }
        }
        slot.latest = Arc::new(ScanResult {
            points: detection.points,
            threshold,
            cycle: job.cycle,
        });
        slot.state = ScanState::Idle;
        drop(slot);
        shared.settled.notify_all();
    }
}
