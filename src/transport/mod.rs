//! Request/response transport to the instrument.
//!
//! The protocol is strictly one exchange in flight at a time: every command is
//! written in full, and a query's response is read in full, before the next
//! command is issued. A session owns its transport exclusively.

use std::io::BufRead;

use crate::{Error, Result};

mod tcp;
pub use tcp::{TcpTransport, DEFAULT_TIMEOUT, DEFAULT_BUFFER_SIZE};

#[cfg(test)]
pub(crate) mod sim;

pub trait Transport {
    /// Send a command that produces no response.
    fn write(&mut self, command: &str) -> Result<()>;

    /// Send a query and read back one line, with the terminator stripped.
    fn query(&mut self, command: &str) -> Result<String>;

    /// Send a query and read back a binary block payload.
    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>>;

    /// Query a parameter and parse the response as a float.
    fn query_f64(&mut self, command: &str) -> Result<f64> {
        let response = self.query(command)?;
        response.trim().parse().map_err(|_| Error::BadResponse {
            command: command.to_owned(),
            detail: format!("expected a number, got {:?}", response),
        })
    }

    /// Query a parameter and parse the response as an integer. Accepts an
    /// integral float, which some firmware revisions produce for counts.
    fn query_i64(&mut self, command: &str) -> Result<i64> {
        let response = self.query(command)?;
        let trimmed = response.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 => Ok(value as i64),
            _ => Err(Error::BadResponse {
                command: command.to_owned(),
                detail: format!("expected an integer, got {:?}", response),
            }),
        }
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn query(&mut self, command: &str) -> Result<String> {
        (**self).query(command)
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>> {
        (**self).query_binary(command)
    }
}

/// Read an IEEE 488.2 arbitrary block: `#<n><len><payload>` for definite
/// length, or `#0<payload>\n` for indefinite length.
pub(crate) fn read_block(reader: &mut impl BufRead, command: &str) -> Result<Vec<u8>> {
    let bad = |detail: String| Error::BadResponse {
        command: command.to_owned(),
        detail,
    };

    let mut byte = [0u8; 1];
    std::io::Read::read_exact(reader, &mut byte)?;
    if byte[0] != b'#' {
        return Err(bad(format!("binary block does not start with '#', got {:?}",
            byte[0] as char)));
    }

    std::io::Read::read_exact(reader, &mut byte)?;
    let digits = (byte[0] as char).to_digit(10)
        .ok_or_else(|| bad(format!("bad block digit count {:?}", byte[0] as char)))?
        as usize;

    if digits == 0 {
        // indefinite length: data runs until the line terminator
        let mut payload = Vec::new();
        reader.read_until(b'\n', &mut payload)?;
        if payload.last() == Some(&b'\n') {
            payload.pop();
        }
        return Ok(payload);
    }

    let mut header = vec![0u8; digits];
    std::io::Read::read_exact(reader, &mut header)?;
    let length: usize = std::str::from_utf8(&header).ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| bad(format!("bad block length {:?}",
            String::from_utf8_lossy(&header))))?;

    let mut payload = vec![0u8; length];
    std::io::Read::read_exact(reader, &mut payload)?;
    // consume the trailing terminator; some firmware omits it, and the
    // payload in hand is already complete, so a timeout here is not an error
    let mut rest = Vec::new();
    match reader.read_until(b'\n', &mut rest) {
        Ok(_) => {}
        Err(error) if matches!(error.kind(),
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock) => {}
        Err(error) => return Err(error.into()),
    }
    Ok(payload)
}
