//! Background dot scanning.
//!
//! [`DotFinder`] runs one detection cycle over a region of a frame.
//! [`ScanScheduler`] drives it from a cooperative update loop: it throttles
//! cycles, keeps at most one job in flight on a dedicated worker thread, and
//! publishes the latest complete [`ScanResult`] under a single lock together
//! with the adaptive threshold. [`ScanLine`] produces the sweeping region of
//! interest and the dot fade used by the visual effect.

mod config;
mod error;
mod finder;
mod result;
mod scan_line;
mod scheduler;

pub use config::ScanConfig;
pub use error::ScanError;
pub use finder::{Detection, DotFinder};
pub use result::ScanResult;
pub use scan_line::{ScanLine, SCAN_AREA_HALF_WIDTH, SCAN_PERIOD_SECS};
pub use scheduler::{ScanScheduler, ScanState, Tick, TickOutcome};
