//! Offline sweeps over a still frame.
//!
//! Replays the interactive loop at a fixed time step: advance the scan line,
//! tick the scheduler with the line's band, and report the dots that were
//! visible at the end. Each dispatched cycle is waited for before the next
//! tick so the outcome does not depend on machine speed.

use std::time::Duration;

use dotscan_core::{ColorFrame, ImageSize, PointDetector};
use dotscan_scan::{ScanError, ScanLine, ScanScheduler, TickOutcome};
use serde::{Deserialize, Serialize};

use crate::DotscanConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct SweepOptions {
    /// Number of update ticks to simulate.
    pub ticks: u32,
    /// Seconds per tick.
    pub dt: f32,
    /// Longest wait for a single cycle.
    pub cycle_timeout: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            ticks: 150,
            dt: 1.0 / 30.0,
            cycle_timeout: Duration::from_secs(10),
        }
    }
}

/// One published dot with its display opacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDot {
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub sensor: ImageSize,
    pub screen: ImageSize,
    pub ticks: u32,
    /// Number of completed cycles.
    pub cycles: u64,
    /// Threshold the reported dots were detected with.
    pub threshold: u8,
    /// Threshold the next cycle would use.
    pub next_threshold: u8,
    pub scan_position: f32,
    pub going_down: bool,
    pub dots: Vec<ReportDot>,
}

/// Run a full sweep over `frame`. The frame size overrides the configured
/// sensor size.
pub fn run_sweep<D>(
    frame: &ColorFrame,
    config: &DotscanConfig,
    options: &SweepOptions,
    detector: D,
) -> Result<SweepReport, ScanError>
where
    D: PointDetector + 'static,
{
    let sensor = frame.size();
    if sensor != config.sensor {
        log::info!(
            "frame is {sensor}, configured sensor is {}; using the frame size",
            config.sensor
        );
    }

    let mut scheduler = ScanScheduler::spawn(
        sensor,
        config.platform,
        config.scan.clone(),
        config.screen,
        detector,
    )?;
    let mut line = ScanLine::new();

    for _ in 0..options.ticks {
        line.advance(options.dt);
        let tick = scheduler.tick(line.scan_area(), Some(frame));
        match tick.outcome {
            TickOutcome::Dispatched { cycle } => {
                if !scheduler.wait_idle(options.cycle_timeout) {
                    log::warn!(
                        "cycle {cycle} still running after {:?}",
                        options.cycle_timeout
                    );
                }
            }
            TickOutcome::Stopped => break,
            TickOutcome::Busy | TickOutcome::Throttled | TickOutcome::EmptyRegion => {}
        }
    }
    scheduler.wait_idle(options.cycle_timeout);

    let latest = scheduler.latest();
    let next_threshold = scheduler.threshold();
    scheduler.shutdown();

    let dots = latest
        .points
        .iter()
        .map(|p| ReportDot {
            x: p.x,
            y: p.y,
            alpha: line.dot_alpha(p.y),
        })
        .collect();
    log::debug!(
        "sweep finished after {} cycles with {} dots",
        latest.cycle,
        latest.count()
    );

    Ok(SweepReport {
        sensor,
        screen: config.screen,
        ticks: options.ticks,
        cycles: latest.cycle,
        threshold: latest.threshold,
        next_threshold,
        scan_position: line.position(),
        going_down: line.going_down(),
        dots,
    })
}
