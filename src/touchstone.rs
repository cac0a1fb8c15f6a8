//! Writes a session's sweeps as 2-port Touchstone (`.s2p`) files, one file
//! per sweep per wave parameter, with the session provenance in the comment
//! block.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::Result;
use crate::config::ResolvedSettings;
use crate::decode::WaveMatrix;
use crate::sweep::{SweepLog, SweepTiming};

/// Write every sweep of `log` into `directory` (created if missing).
///
/// Filenames are `{basename}_{A|B}_{index}.s2p` with the index zero-padded
/// to the width of the sweep count, so the files sort in acquisition order.
pub fn write_session(directory: &Path, basename: &str, log: &SweepLog) -> Result<()> {
    fs::create_dir_all(directory)?;
    let width = log.sweeps.len().to_string().len();
    for (index, sweep) in log.sweeps.iter().enumerate() {
        for (tag, matrix) in [("A", &sweep.a), ("B", &sweep.b)] {
            let filename = format!("{}_{}_{:0width$}.s2p",
                basename, tag, index + 1, width = width);
            let file = File::create(directory.join(&filename))?;
            write_sweep(BufWriter::new(file), tag, matrix,
                &log.frequencies, &sweep.timing, &log.settings)?;
            log::debug!("wrote {}", filename);
        }
    }
    Ok(())
}

fn write_sweep(mut out: impl Write, tag: &str, matrix: &WaveMatrix,
        frequencies: &[f64], timing: &SweepTiming,
        settings: &ResolvedSettings) -> Result<()> {
    writeln!(out, "! Parameter type: {}", tag)?;
    let started: DateTime<Local> = timing.started.into();
    writeln!(out, "! Timestamp formatted (sweep start): {}",
        started.format("%Y-%m-%d %H:%M:%S%.6f"))?;
    let epoch = timing.started.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    writeln!(out, "! Timestamp (sweep start) [sec]: {}", epoch.as_secs_f64())?;
    writeln!(out, "! Sweep duration [sec]: {}", timing.duration.as_secs_f64())?;
    for (label, value) in settings.entries() {
        writeln!(out, "! {}: {}", label, value)?;
    }
    writeln!(out, "# GHz S RI R 50")?;
    for (point, &frequency) in frequencies.iter().enumerate() {
        let m = matrix.port_matrix(point);
        write!(out, "{}", frequency / 1e9)?;
        // touchstone 2-port column order: s11 s21 s12 s22
        for value in [m[0][0], m[1][0], m[0][1], m[1][1]] {
            write!(out, " {} {}", value.re, value.im)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
