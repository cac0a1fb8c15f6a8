//! The sweep session controller.
//!
//! A session runs as one strictly sequential conversation with the
//! instrument: capture the pre-session state, apply the requested
//! configuration, trigger and read back sweeps, and put every captured
//! parameter back, whether the session succeeded, failed, or was cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime};

use crate::{Error, RestoreError, Result};
use crate::config::{ResolvedSettings, SweepConfig};
use crate::decode::{decode_complex, decode_doubles, ByteOrder, WaveMatrix};
use crate::scpi;
use crate::state::InstrumentState;
use crate::sweep::{self, SweepLog, SweepResult, SweepTiming};
use crate::transport::{TcpTransport, Transport};

/// Cooperative cancellation flag, shared between the sweep loop and whatever
/// reacts to the user (a signal handler, another thread, a UI).
///
/// The sweep loop polls the token between protocol exchanges only; an
/// in-flight exchange always completes or times out on its own, so the
/// transport is never left with a half-written command.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Vna<T: Transport> {
    transport: T,
}

impl Vna<TcpTransport> {
    /// Connect to a VectorStar at `resource`, with the session's exchange
    /// timeout.
    pub fn connect(resource: &str, config: &SweepConfig) -> Result<Vna<TcpTransport>> {
        Ok(Vna::new(TcpTransport::connect(resource, config.timeout)?))
    }
}

impl<T: Transport> Vna<T> {
    pub fn new(transport: T) -> Vna<T> {
        Vna { transport }
    }

    /// Acquire `config.num_sweeps` raw wave-parameter sweeps.
    ///
    /// The instrument configuration is captured before the first write and
    /// restored on every exit path. Cancellation through `cancel` is not an
    /// error: the log contains the sweeps completed so far. Any other abort
    /// surfaces the triggering error, with restore failures (if any) attached
    /// rather than dropped.
    pub fn raw_sweep(&mut self, config: &SweepConfig, cancel: &CancelToken)
            -> Result<SweepLog> {
        self.prepare()?;
        let state = match InstrumentState::capture(&mut self.transport) {
            Ok(state) => state,
            Err(error) => return Err(Error::Snapshot(Box::new(error))),
        };

        let outcome = self.run_session(config, cancel);

        let mut failures = state.restore(&mut self.transport);
        // leave the instrument in ASCII readout, free-running, and in local
        // control even when the session itself failed
        for command in [scpi::FORMAT_ASCII, scpi::SWEEP_CONTINUOUS,
                scpi::RETURN_TO_LOCAL] {
            if let Err(error) = self.transport.write(command) {
                failures.push((command.to_owned(), error));
            }
        }

        if failures.is_empty() {
            outcome
        } else {
            Err(Error::Restore(RestoreError {
                primary: outcome.err().map(Box::new),
                failures,
            }))
        }
    }

    /// Switch to the native command set and clear the error queue.
    fn prepare(&mut self) -> Result<()> {
        self.transport.write(scpi::LANG_NATIVE)?;
        self.transport.write(scpi::ERROR_CLEAR)?;
        Ok(())
    }

    /// Everything between snapshot and restore. Errors propagate to
    /// `raw_sweep`, which restores before surfacing them.
    fn run_session(&mut self, config: &SweepConfig, cancel: &CancelToken)
            -> Result<SweepLog> {
        let settings = self.configure(config)?;
        let points = settings.points as usize;

        self.transport.write(scpi::FORMAT_BINARY_LSB)?;
        let order = ByteOrder::Lsb;

        let total = config.num_sweeps;
        let width = total.to_string().len();
        let mut sweeps = Vec::with_capacity(total);
        log::info!("sweep started: {} sweep(s) of {} points", total, points);
        'sweeps: for index in 0..total {
            if cancel.is_cancelled() {
                log::info!("sweep cancelled by user");
                break;
            }
            self.transport.write(scpi::SWEEP_HOLD)?;
            let started = SystemTime::now();
            let tic = Instant::now();
            self.transport.write(scpi::TRIGGER_SINGLE)?;

            let mut traces = Vec::with_capacity(scpi::TRACE_SLOTS);
            for slot in 0..scpi::TRACE_SLOTS {
                if cancel.is_cancelled() {
                    // a partially read sweep never becomes a result
                    log::info!("sweep {} cancelled mid-read, discarding partial sweep",
                        index + 1);
                    break 'sweeps;
                }
                self.transport.write(&scpi::trace_select(slot))?;
                let payload = self.transport.query_binary(scpi::TRACE_DATA)?;
                let samples = decode_complex(&payload, order)?;
                if samples.len() != points {
                    return Err(Error::MalformedData(format!(
                        "trace {} returned {} points, expected {}",
                        slot + 1, samples.len(), points)));
                }
                traces.push(samples);
            }
            let duration = tic.elapsed();

            let a = WaveMatrix::from_traces(&traces[..4])?;
            let b = WaveMatrix::from_traces(&traces[4..])?;
            sweeps.push(SweepResult { a, b, timing: SweepTiming { started, duration } });

            let remaining = duration.mul_f64((total - index - 1) as f64);
            log::info!("sweep {:0width$}/{} ({:.2} s, est. remaining {:.0?})",
                index + 1, total, duration.as_secs_f64(), remaining, width = width);
        }

        let payload = self.transport.query_binary(scpi::FREQUENCY_DATA)?;
        let frequencies = decode_doubles(&payload, order)?;

        sweep::assemble(frequencies, sweeps, settings)
    }

    /// Apply the requested overrides and arm the eight wave-parameter traces,
    /// then read the effective settings back from the instrument.
    fn configure(&mut self, config: &SweepConfig) -> Result<ResolvedSettings> {
        let transport = &mut self.transport;
        transport.write(scpi::WINDOW_ACTIVATE)?;
        transport.write(scpi::PHASE_SYNC_ON)?;

        // automatic correction would contaminate the raw wave data
        transport.write(&scpi::FACTORY_CAL_RECEIVER.set_command("0"))?;
        transport.write(&scpi::FACTORY_CAL_SOURCE.set_command("0"))?;
        transport.write(&scpi::USER_CORRECTION.set_command("0"))?;

        // overrides only; an unset field leaves the snapshotted value alone
        if let Some(power) = config.power_standard {
            transport.write(&scpi::POWER_PORT1.set_command(&power.to_string()))?;
            transport.write(&scpi::POWER_PORT2.set_command(&power.to_string()))?;
        }
        if let Some(power) = config.power_extended {
            transport.write(&scpi::POWER_EXTENDED_PORT1.set_command(&power.to_string()))?;
            transport.write(&scpi::POWER_EXTENDED_PORT2.set_command(&power.to_string()))?;
        }
        if let Some(bandwidth) = config.if_bandwidth {
            transport.write(&scpi::IF_BANDWIDTH.set_command(&bandwidth.to_string()))?;
        }
        if let Some(start) = config.freq_start {
            transport.write(&scpi::FREQUENCY_START.set_command(&start.to_string()))?;
        }
        if let Some(stop) = config.freq_stop {
            transport.write(&scpi::FREQUENCY_STOP.set_command(&stop.to_string()))?;
        }
        if let Some(points) = config.points {
            transport.write(&scpi::SWEEP_POINTS.set_command(&points.to_string()))?;
        }

        transport.write(&scpi::TRACE_COUNT.set_command(&scpi::TRACE_SLOTS.to_string()))?;
        for (slot, definition) in scpi::WAVE_TRACES.iter().enumerate() {
            transport.write(&scpi::trace_format_set(slot, scpi::FORMAT_REAL_IMAGINARY))?;
            transport.write(&scpi::trace_define_set(slot, definition))?;
        }

        // read back what actually took effect; the instrument may clamp or
        // round requested values
        let settings = ResolvedSettings {
            power_port1_dbm: transport.query_f64(scpi::POWER_PORT1.query)?,
            power_port2_dbm: transport.query_f64(scpi::POWER_PORT2.query)?,
            power_extended_port1_dbm: transport.query_f64(scpi::POWER_EXTENDED_PORT1.query)?,
            power_extended_port2_dbm: transport.query_f64(scpi::POWER_EXTENDED_PORT2.query)?,
            if_bandwidth_hz: transport.query_f64(scpi::IF_BANDWIDTH.query)?,
            freq_start_hz: transport.query_f64(scpi::FREQUENCY_START.query)?,
            freq_stop_hz: transport.query_f64(scpi::FREQUENCY_STOP.query)?,
            points: transport.query_i64(scpi::SWEEP_POINTS.query)?,
        };
        log::debug!("resolved settings: {:?}", settings);
        Ok(settings)
    }
}
