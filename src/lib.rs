mod scpi;
mod transport;
mod config;
mod state;
mod decode;
mod sweep;
mod device;
mod touchstone;

#[derive(Debug)]
pub enum Error {
    /// Link-level failure: connect error, broken socket, or a read that did not
    /// complete within the transport timeout.
    Io(std::io::Error),
    /// The resource address could not be interpreted.
    BadAddress(String),
    /// The instrument answered, but the response could not be interpreted as
    /// the type the caller asked for.
    BadResponse { command: String, detail: String },
    /// Structurally invalid binary payload (truncated doubles, odd pair count,
    /// wrong element count for the configured sweep).
    MalformedData(String),
    /// A snapshot read failed before any configuration write; the instrument
    /// was left untouched.
    Snapshot(Box<Error>),
    /// A shape or bookkeeping invariant was violated. Indicates a bug in the
    /// decoder or the sweep engine, not a runtime condition.
    Invariant(String),
    /// One or more restore writes failed; the instrument may be left
    /// misconfigured. Carries the error that ended the session, if any.
    Restore(RestoreError),
}

#[derive(Debug)]
pub struct RestoreError {
    /// The failure that ended the session before restore ran, if the session
    /// itself did not complete.
    pub primary: Option<Box<Error>>,
    /// Restore writes that failed, with the command that was attempted.
    pub failures: Vec<(String, Error)>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(io_error) =>
                write!(f, "I/O error: {}", io_error),
            Self::BadAddress(address) =>
                write!(f, "unsupported resource address {:?}", address),
            Self::BadResponse { command, detail } =>
                write!(f, "malformed response to {:?}: {}", command, detail),
            Self::MalformedData(detail) =>
                write!(f, "malformed trace data: {}", detail),
            Self::Snapshot(error) =>
                write!(f, "instrument state capture failed: {}", error),
            Self::Invariant(detail) =>
                write!(f, "internal invariant violated: {}", detail),
            Self::Restore(restore_error) =>
                write!(f, "{}", restore_error),
        }
    }
}

impl std::fmt::Display for RestoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(error) = &self.primary {
            write!(f, "sweep session failed: {}; additionally, ", error)?;
        }
        write!(f, "{} restore write(s) failed, instrument may be misconfigured:",
            self.failures.len())?;
        for (command, error) in &self.failures {
            write!(f, "\n  {:?}: {}", command, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(ref io_error) => Some(io_error),
            Self::Snapshot(ref error) => Some(error),
            _ => None
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use transport::{
    Transport,
    TcpTransport,
    DEFAULT_TIMEOUT,
    DEFAULT_BUFFER_SIZE,
};

pub use config::{
    SweepConfig,
    ResolvedSettings,
};

pub use state::InstrumentState;

pub use decode::{
    ByteOrder,
    WaveMatrix,
    decode_doubles,
    decode_complex,
};

pub use sweep::{
    SweepTiming,
    SweepResult,
    SweepLog,
};

pub use device::{
    Vna,
    CancelToken,
};

pub use touchstone::write_session;

/// A VNA session over the shipped TCP transport.
pub type TcpVna = device::Vna<transport::TcpTransport>;
