//! Snapshot and restore of the instrument parameters the session mutates.
//!
//! Values are captured as the opaque strings the instrument reports and
//! written back verbatim, so a restore reproduces the pre-session
//! configuration even for values the session never interprets.

use crate::{Error, Result};
use crate::scpi;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TraceState {
    format: String,
    definition: String,
}

/// The pre-session value of every parameter the session writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentState {
    scalars: Vec<(scpi::Param, String)>,
    traces: Vec<TraceState>,
}

impl InstrumentState {
    /// Read the current value of every session parameter.
    ///
    /// Nothing is written; a failed read aborts the capture, leaving the
    /// instrument untouched.
    pub fn capture(transport: &mut impl Transport) -> Result<InstrumentState> {
        let mut scalars = Vec::with_capacity(scpi::SESSION_PARAMS.len());
        for &param in scpi::SESSION_PARAMS {
            let value = transport.query(param.query)?;
            log::debug!("captured {}: {:?}", param.name, value);
            scalars.push((param, value));
        }
        let mut traces = Vec::with_capacity(scpi::TRACE_SLOTS);
        for slot in 0..scpi::TRACE_SLOTS {
            traces.push(TraceState {
                format: transport.query(&scpi::trace_format_query(slot))?,
                definition: transport.query(&scpi::trace_define_query(slot))?,
            });
        }
        Ok(InstrumentState { scalars, traces })
    }

    /// Write every captured value back.
    ///
    /// Best-effort-complete: a failed write does not stop the remaining
    /// writes, because leaving more parameters unrestored is worse than a
    /// partial restore. Returns the failures, with the attempted command.
    pub fn restore(&self, transport: &mut impl Transport) -> Vec<(String, Error)> {
        let mut failures = Vec::new();
        for command in self.restore_commands() {
            if let Err(error) = transport.write(&command) {
                log::warn!("restore of {:?} failed: {}", command, error);
                failures.push((command, error));
            }
        }
        failures
    }

    fn restore_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        // trace slots first: each slot's format goes back before its
        // definition so formats are never applied to the wrong parameter
        for (slot, trace) in self.traces.iter().enumerate() {
            commands.push(scpi::trace_format_set(slot, &trace.format));
            commands.push(scpi::trace_define_set(slot, &trace.definition));
        }
        // scalars unwind in reverse capture order
        for (param, value) in self.scalars.iter().rev() {
            commands.push(param.set_command(value));
        }
        commands
    }
}
