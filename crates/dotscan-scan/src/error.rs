/// Errors raised while setting up scanning.
///
/// Per-cycle conditions (empty region, missing frame, detector failure) are
/// never errors; they show up as an empty cycle instead.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid sensor size {width}x{height}")]
    InvalidSensorSize { width: u32, height: u32 },

    #[error("failed to spawn scan worker")]
    WorkerSpawn(#[source] std::io::Error),
}
