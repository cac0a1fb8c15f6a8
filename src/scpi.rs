//! SCPI command set for the VectorStar MS464xB series, as documented in the
//! Anritsu programming manual. Everything runs on channel 1.

/// Switch the remote language to the native command set.
pub const LANG_NATIVE: &str = "LANG NATIVE";

/// Clear the instrument error queue.
pub const ERROR_CLEAR: &str = ":SYSTem:ERRor:CLEar";

/// Make display window 1 the active window.
pub const WINDOW_ACTIVATE: &str = ":DISPlay:WINDow1:ACTivate 1";

/// Force source 1 and source 2 phases to stay in sync.
pub const PHASE_SYNC_ON: &str = ":SENSe1:OFFSet:PHASe:SYNChronization ON";

/// Hold the sweep so the instrument does not free-run between triggers.
pub const SWEEP_HOLD: &str = ":SENSe:HOLD:FUNCtion HOLD";

/// Resume continuous sweeping.
pub const SWEEP_CONTINUOUS: &str = ":SENSe:HOLD:FUNCtion CONTinuous";

/// Run a single sweep. The next data query blocks until it completes.
pub const TRIGGER_SINGLE: &str = ":TRIG:SING";

/// Switch trace readout to least-significant-byte-first binary doubles.
pub const FORMAT_BINARY_LSB: &str = "LSB;FMB";

/// Switch trace readout back to ASCII.
pub const FORMAT_ASCII: &str = "FMA";

/// Return the instrument to local control.
pub const RETURN_TO_LOCAL: &str = "RTL";

/// Read the active trace of channel 1 as formatted binary data.
pub const TRACE_DATA: &str = ":CALCulate1:DATA:FDATa?";

/// Read the frequency axis of channel 1 as binary data.
pub const FREQUENCY_DATA: &str = ":SENSe1:FREQuency:DATA?";

/// One mutable instrument scalar: a query command paired with the write
/// command the value is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub query: &'static str,
    pub set: &'static str,
}

impl Param {
    /// Build the write command restoring or overriding this parameter.
    pub fn set_command(&self, value: &str) -> String {
        format!("{} {}", self.set, value)
    }
}

/// Receiver factory calibration enable.
pub const FACTORY_CAL_RECEIVER: Param = Param {
    name: "receiver factory cal",
    query: "FRCVCALON?",
    set: "FRCVCALON",
};

/// Source factory calibration enable.
pub const FACTORY_CAL_SOURCE: Param = Param {
    name: "source factory cal",
    query: "FRFCALON?",
    set: "FRFCALON",
};

/// User calibration (error-term correction) enable.
pub const USER_CORRECTION: Param = Param {
    name: "user correction",
    query: ":SENSe1:CORRection:STATe?",
    set: ":SENSe1:CORRection:STATe",
};

/// Port 1 power level of the standalone VNA (below 54 GHz), in dBm.
pub const POWER_PORT1: Param = Param {
    name: "standard power port 1",
    query: ":SOURce1:POWer:PORT1?",
    set: ":SOURce1:POWer:PORT1",
};

/// Port 2 power level of the standalone VNA (below 54 GHz), in dBm.
pub const POWER_PORT2: Param = Param {
    name: "standard power port 2",
    query: ":SOURce1:POWer:PORT2?",
    set: ":SOURce1:POWer:PORT2",
};

/// Port 1 power level of the broadband extender (above 54 GHz), in dBm.
pub const POWER_EXTENDED_PORT1: Param = Param {
    name: "extended power port 1",
    query: ":SOURce1:MODBB:POWer:PORT1?",
    set: ":SOURce1:MODBB:POWer:PORT1",
};

/// Port 2 power level of the broadband extender (above 54 GHz), in dBm.
pub const POWER_EXTENDED_PORT2: Param = Param {
    name: "extended power port 2",
    query: ":SOURce1:MODBB:POWer:PORT2?",
    set: ":SOURce1:MODBB:POWer:PORT2",
};

/// IF bandwidth in Hz.
pub const IF_BANDWIDTH: Param = Param {
    name: "IF bandwidth",
    query: ":SENSe1:BWIDth?",
    set: ":SENSe1:BWIDth",
};

/// Start frequency in Hz.
pub const FREQUENCY_START: Param = Param {
    name: "start frequency",
    query: ":SENSe1:FREQuency:STARt?",
    set: ":SENSe1:FREQuency:STARt",
};

/// Stop frequency in Hz.
pub const FREQUENCY_STOP: Param = Param {
    name: "stop frequency",
    query: ":SENSe1:FREQuency:STOP?",
    set: ":SENSe1:FREQuency:STOP",
};

/// Number of frequency points in one sweep.
pub const SWEEP_POINTS: Param = Param {
    name: "sweep points",
    query: ":SENSe1:SWEep:POINt?",
    set: ":SENSe1:SWEep:POINt",
};

/// Number of traces displayed on channel 1.
pub const TRACE_COUNT: Param = Param {
    name: "trace count",
    query: ":CALCulate1:PARameter:COUNt?",
    set: ":CALCulate1:PARameter:COUNt",
};

/// Every scalar the session mutates, in capture order. Each one is read
/// before configuration and written back verbatim afterwards.
pub const SESSION_PARAMS: &[Param] = &[
    FACTORY_CAL_RECEIVER,
    FACTORY_CAL_SOURCE,
    USER_CORRECTION,
    POWER_PORT1,
    POWER_PORT2,
    POWER_EXTENDED_PORT1,
    POWER_EXTENDED_PORT2,
    IF_BANDWIDTH,
    FREQUENCY_START,
    FREQUENCY_STOP,
    SWEEP_POINTS,
    TRACE_COUNT,
];

/// Number of hardware trace slots the session repurposes.
pub const TRACE_SLOTS: usize = 8;

/// The fixed wave-parameter trace set: receivers A1/A2 then B1/B2, each
/// driven from port 1 then port 2. Slot order determines matrix layout.
pub const WAVE_TRACES: [&str; TRACE_SLOTS] = [
    "USR,A1,1,PORT1", "USR,A1,1,PORT2", "USR,A2,1,PORT1", "USR,A2,1,PORT2",
    "USR,B1,1,PORT1", "USR,B1,1,PORT2", "USR,B2,1,PORT1", "USR,B2,1,PORT2",
];

/// Display format readable directly as interleaved real/imaginary pairs.
pub const FORMAT_REAL_IMAGINARY: &str = "REIMaginary";

/// Query the display format of trace slot `slot` (0-based).
pub fn trace_format_query(slot: usize) -> String {
    format!(":CALCulate1:PARameter{}:FORMat?", slot + 1)
}

/// Set the display format of trace slot `slot` (0-based).
pub fn trace_format_set(slot: usize, format: &str) -> String {
    format!(":CALCulate1:PARameter{}:FORMat {}", slot + 1, format)
}

/// Query the measurement definition of trace slot `slot` (0-based).
pub fn trace_define_query(slot: usize) -> String {
    format!(":CALCulate1:PARameter{}:DEFine?", slot + 1)
}

/// Set the measurement definition of trace slot `slot` (0-based).
pub fn trace_define_set(slot: usize, definition: &str) -> String {
    format!(":CALCulate1:PARameter{}:DEFine {}", slot + 1, definition)
}

/// Make trace slot `slot` (0-based) the active trace for data queries.
pub fn trace_select(slot: usize) -> String {
    format!(":CALCulate1:PARameter{}:SELect", slot + 1)
}
