//! Simulated VectorStar used by the session tests: answers every parameter
//! query from a mutable table, serves deterministic trace data, and can
//! inject failures or trip a cancellation token at an exact exchange.

use std::collections::HashMap;
use std::io;

use num_complex::Complex64;

use crate::{Error, Result};
use crate::decode::ByteOrder;
use crate::decode::test::{encode_complex, encode_doubles};
use crate::device::CancelToken;
use crate::scpi;
use super::Transport;

pub(crate) struct SimVna {
    params: HashMap<String, String>,
    /// Every command, in arrival order.
    pub log: Vec<String>,
    selected: Option<usize>,
    binary: bool,
    order: ByteOrder,
    exchanges: usize,
    binary_queries: usize,
    /// Trip this token once the exchange counter reaches the given value.
    pub cancel_at: Option<(usize, CancelToken)>,
    /// Fail the nth binary query (1-based) with a timeout.
    pub fail_binary_at: Option<usize>,
    /// Fail any write whose full command equals this string.
    pub fail_write: Option<String>,
    /// Serve trace data with this many points instead of the configured count.
    pub trace_points_override: Option<usize>,
}

/// Deterministic sample for trace `slot` (0-based) at `point`.
pub(crate) fn sample(slot: usize, point: usize) -> Complex64 {
    Complex64::new((slot * 100 + point) as f64, -((slot * 10 + point) as f64) / 2.0)
}

fn timeout() -> Error {
    Error::Io(io::Error::new(io::ErrorKind::TimedOut, "simulated timeout"))
}

impl SimVna {
    pub fn new(points: usize) -> SimVna {
        let mut params = HashMap::new();
        let seed = [
            ("FRCVCALON", "1"),
            ("FRFCALON", "1"),
            (":SENSe1:CORRection:STATe", "1"),
            (":SOURce1:POWer:PORT1", "-5"),
            (":SOURce1:POWer:PORT2", "-5"),
            (":SOURce1:MODBB:POWer:PORT1", "-8"),
            (":SOURce1:MODBB:POWer:PORT2", "-8"),
            (":SENSe1:BWIDth", "1000"),
            (":SENSe1:FREQuency:STARt", "1000000000"),
            (":SENSe1:FREQuency:STOP", "9000000000"),
            (":CALCulate1:PARameter:COUNt", "4"),
        ];
        for (key, value) in seed {
            params.insert(key.to_owned(), value.to_owned());
        }
        params.insert(":SENSe1:SWEep:POINt".to_owned(), points.to_string());
        for slot in 0..scpi::TRACE_SLOTS {
            params.insert(format!(":CALCulate1:PARameter{}:FORMat", slot + 1),
                "MLOGarithmic".to_owned());
            params.insert(format!(":CALCulate1:PARameter{}:DEFine", slot + 1),
                format!("S{}{}", slot % 2 + 1, slot / 4 + 1));
        }
        SimVna {
            params,
            log: Vec::new(),
            selected: None,
            binary: false,
            order: ByteOrder::Lsb,
            exchanges: 0,
            binary_queries: 0,
            cancel_at: None,
            fail_binary_at: None,
            fail_write: None,
            trace_points_override: None,
        }
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.params
    }

    fn on_exchange(&mut self, command: &str) {
        self.exchanges += 1;
        self.log.push(command.to_owned());
        if let Some((at, token)) = &self.cancel_at {
            if self.exchanges >= *at {
                token.cancel();
            }
        }
    }

    fn points(&self) -> usize {
        self.params[":SENSe1:SWEep:POINt"].parse().unwrap()
    }
}

impl Transport for SimVna {
    fn write(&mut self, command: &str) -> Result<()> {
        self.on_exchange(command);
        if self.fail_write.as_deref() == Some(command) {
            return Err(timeout());
        }
        match command {
            scpi::FORMAT_BINARY_LSB => {
                self.binary = true;
                self.order = ByteOrder::Lsb;
            }
            scpi::FORMAT_ASCII => self.binary = false,
            // action commands do not touch the parameter table
            scpi::LANG_NATIVE | scpi::ERROR_CLEAR | scpi::RETURN_TO_LOCAL
                | scpi::WINDOW_ACTIVATE | scpi::PHASE_SYNC_ON
                | scpi::SWEEP_HOLD | scpi::SWEEP_CONTINUOUS
                | scpi::TRIGGER_SINGLE => {}
            _ if command.ends_with(":SELect") => {
                let slot: usize = command
                    .trim_start_matches(":CALCulate1:PARameter")
                    .trim_end_matches(":SELect")
                    .parse().unwrap();
                self.selected = Some(slot - 1);
            }
            _ => {
                if let Some((key, value)) = command.split_once(' ') {
                    self.params.insert(key.to_owned(), value.to_owned());
                }
                // bare action commands fall through
            }
        }
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.on_exchange(command);
        let key = command.strip_suffix('?').expect("query without '?'");
        match self.params.get(key) {
            Some(value) => Ok(value.clone()),
            None => Err(Error::BadResponse {
                command: command.to_owned(),
                detail: "unknown parameter".to_owned(),
            }),
        }
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>> {
        self.on_exchange(command);
        self.binary_queries += 1;
        if self.fail_binary_at == Some(self.binary_queries) {
            return Err(timeout());
        }
        assert!(self.binary, "binary query without LSB;FMB");
        let points = self.points();
        match command {
            scpi::TRACE_DATA => {
                let slot = self.selected.expect("no trace selected");
                let points = self.trace_points_override.unwrap_or(points);
                let values: Vec<Complex64> =
                    (0..points).map(|point| sample(slot, point)).collect();
                Ok(encode_complex(&values, self.order))
            }
            scpi::FREQUENCY_DATA => {
                let start: f64 = self.params[":SENSe1:FREQuency:STARt"].parse().unwrap();
                let stop: f64 = self.params[":SENSe1:FREQuency:STOP"].parse().unwrap();
                let step = if points > 1 {
                    (stop - start) / (points - 1) as f64
                } else {
                    0.0
                };
                let values: Vec<f64> =
                    (0..points).map(|point| start + step * point as f64).collect();
                Ok(encode_doubles(&values, self.order))
            }
            _ => panic!("unexpected binary query {:?}", command),
        }
    }
}
