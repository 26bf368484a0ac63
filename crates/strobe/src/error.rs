use thiserror::Error;

/// Fatal conditions that abort a co-simulation run. Ordinary expectation
/// mismatches are not errors; they are collected in the run report.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unsolicited output beat at t={time}: no expectation queued")]
    UnsolicitedOutput { time: u64 },

    #[error("trace file error: {0}")]
    Trace(#[from] std::io::Error),
}
