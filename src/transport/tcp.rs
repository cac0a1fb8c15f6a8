use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::{Error, Result};
use super::Transport;

/// Default exchange timeout. Long enough to cover a narrow-bandwidth sweep.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30000);

/// Default read buffer size, sized for large sweeps: 25k points of 8 traces
/// of 16-byte complex doubles fit with room to spare.
pub const DEFAULT_BUFFER_SIZE: usize = 1_600_000;

/// TCP port of the VectorStar's raw SCPI socket.
const SCPI_PORT: u16 = 5001;

/// Newline-terminated SCPI over a TCP socket.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TcpTransport {
    /// Connect to `resource` with the default buffer size.
    ///
    /// Accepts VISA-style resources (`TCPIP::<host>::INSTR`,
    /// `TCPIP::<host>::<port>::SOCKET`) as well as plain `host:port`.
    pub fn connect(resource: &str, timeout: Duration) -> Result<TcpTransport> {
        Self::connect_with_buffer_size(resource, timeout, DEFAULT_BUFFER_SIZE)
    }

    pub fn connect_with_buffer_size(resource: &str, timeout: Duration,
            buffer_size: usize) -> Result<TcpTransport> {
        let (host, port) = parse_resource(resource)?;
        log::debug!("connecting to {}:{} (timeout {:?})", host, port, timeout);
        let address = (host.as_str(), port).to_socket_addrs()?.next()
            .ok_or_else(|| Error::BadAddress(resource.to_owned()))?;
        let stream = TcpStream::connect_timeout(&address, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        let reader = BufReader::with_capacity(buffer_size, stream.try_clone()?);
        Ok(TcpTransport { stream, reader })
    }

    /// Change the exchange timeout of an open connection.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.stream.set_read_timeout(Some(timeout))?;
        self.stream.set_write_timeout(Some(timeout))?;
        Ok(())
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        log::debug!("write({:?})", command);
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.write(command)?;
        let mut response = String::new();
        self.reader.read_line(&mut response)?;
        let response = response.trim_end_matches(['\n', '\r']).to_owned();
        log::debug!("query({:?}) = {:?}", command, response);
        Ok(response)
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>> {
        self.write(command)?;
        let payload = super::read_block(&mut self.reader, command)?;
        log::debug!("query_binary({:?}) = {} bytes", command, payload.len());
        log::trace!("query_binary({:?}) payload {:02x?}", command, payload);
        Ok(payload)
    }
}

/// Split a resource address into host and port.
fn parse_resource(resource: &str) -> Result<(String, u16)> {
    let bad = || Error::BadAddress(resource.to_owned());
    let fields: Vec<&str> = resource.split("::").collect();
    match fields.as_slice() {
        // TCPIP::<host>::INSTR, TCPIP0::<host>::INSTR
        [visa, host, "INSTR"] if visa.starts_with("TCPIP") =>
            Ok((host.to_string(), SCPI_PORT)),
        // TCPIP::<host>::<port>::SOCKET
        [visa, host, port, "SOCKET"] if visa.starts_with("TCPIP") =>
            Ok((host.to_string(), port.parse().map_err(|_| bad())?)),
        // plain host:port
        [direct] => {
            let (host, port) = direct.rsplit_once(':').ok_or_else(bad)?;
            Ok((host.to_string(), port.parse().map_err(|_| bad())?))
        }
        _ => Err(bad()),
    }
}
