//! Session-level measurement results.

use std::time::{Duration, SystemTime};

use crate::{Error, Result};
use crate::config::ResolvedSettings;
use crate::decode::WaveMatrix;

/// When a sweep was triggered and how long its eight trace reads took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepTiming {
    pub started: SystemTime,
    pub duration: Duration,
}

/// One complete measurement cycle: incident (A) and reflected/transmitted (B)
/// wave matrices, plus timing. Only complete sweeps are ever constructed; a
/// sweep interrupted mid-read is discarded by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub a: WaveMatrix,
    pub b: WaveMatrix,
    pub timing: SweepTiming,
}

/// Everything one session produced: the shared frequency axis, the ordered
/// sweeps (possibly fewer than requested, after cancellation), and the
/// settings that were in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepLog {
    pub frequencies: Vec<f64>,
    pub sweeps: Vec<SweepResult>,
    pub settings: ResolvedSettings,
}

/// Package per-sweep results into a session log.
///
/// Purely structural; a sweep whose matrices do not match the frequency axis
/// indicates an engine or decoder bug and is rejected as an invariant
/// violation, not a runtime error.
pub fn assemble(frequencies: Vec<f64>, sweeps: Vec<SweepResult>,
        settings: ResolvedSettings) -> Result<SweepLog> {
    for (index, sweep) in sweeps.iter().enumerate() {
        if sweep.a.points() != frequencies.len() || sweep.b.points() != frequencies.len() {
            return Err(Error::Invariant(format!(
                "sweep {} has {}/{} points for {} frequencies",
                index, sweep.a.points(), sweep.b.points(), frequencies.len())));
        }
    }
    Ok(SweepLog { frequencies, sweeps, settings })
}
