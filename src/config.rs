//! High-level configuration of a measurement session.

use std::time::Duration;

use crate::transport::DEFAULT_TIMEOUT;

/// Requested sweep configuration. Every override is optional: an unset field
/// leaves the corresponding instrument parameter at its current value.
///
/// Numeric ranges are not validated here; the stop frequency must exceed the
/// start frequency and the point count must be at least 2, and values the
/// instrument rejects surface as instrument-reported errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Number of sweeps to acquire.
    pub num_sweeps: usize,
    /// IF bandwidth in Hz.
    pub if_bandwidth: Option<f64>,
    /// Start frequency in Hz.
    pub freq_start: Option<f64>,
    /// Stop frequency in Hz.
    pub freq_stop: Option<f64>,
    /// Number of frequency points per sweep.
    pub points: Option<u32>,
    /// Power level of the standalone VNA (below 54 GHz), both ports, in dBm.
    pub power_standard: Option<f64>,
    /// Power level of the broadband extender (above 54 GHz), both ports, in dBm.
    pub power_extended: Option<f64>,
    /// Maximum duration of one protocol exchange, sweep completion included.
    pub timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            num_sweeps: 1,
            if_bandwidth: None,
            freq_start: None,
            freq_stop: None,
            points: None,
            power_standard: None,
            power_extended: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The configuration actually in effect during the session, read back from
/// the instrument after all overrides were applied. The instrument may clamp
/// or round requested values, so this is the authoritative record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSettings {
    pub power_port1_dbm: f64,
    pub power_port2_dbm: f64,
    pub power_extended_port1_dbm: f64,
    pub power_extended_port2_dbm: f64,
    pub if_bandwidth_hz: f64,
    pub freq_start_hz: f64,
    pub freq_stop_hz: f64,
    pub points: i64,
}

impl ResolvedSettings {
    /// Labelled values for logging provenance alongside measurement data.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("Power level port1 (standard) [dbm]", self.power_port1_dbm),
            ("Power level port2 (standard) [dbm]", self.power_port2_dbm),
            ("Power level port1 (extended >54GHz) [dbm]", self.power_extended_port1_dbm),
            ("Power level port2 (extended >54GHz) [dbm]", self.power_extended_port2_dbm),
            ("IF bandwidth [Hz]", self.if_bandwidth_hz),
            ("Start frequency [Hz]", self.freq_start_hz),
            ("Stop frequency [Hz]", self.freq_stop_hz),
            ("Sweep points", self.points as f64),
        ]
    }
}
