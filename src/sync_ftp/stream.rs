//! # Stream
//!
//! This module exposes the control and data transports bytes are written to/read from
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::{FtpError, FtpResult};

use super::passive::Endpoint;

/// Transport of the control connection.
pub struct CommandStream {
    inner: BufReader<TcpStream>,
}

impl CommandStream {
    /// Try to connect to the remote server
    pub fn connect(host: &str, port: u16, timeout: Option<Duration>) -> FtpResult<Self> {
        trace!("Connecting to server {host}:{port}");
        let addrs = resolve(host, port)?;
        let stream = tcp_connect(&addrs, timeout).map_err(FtpError::control)?;
        stream.set_read_timeout(timeout).map_err(FtpError::control)?;

        Ok(Self {
            inner: BufReader::new(stream),
        })
    }

    pub fn local_addr(&self) -> FtpResult<SocketAddr> {
        self.get_stream_ref().local_addr().map_err(FtpError::control)
    }

    pub fn peer_addr(&self) -> FtpResult<SocketAddr> {
        self.get_stream_ref().peer_addr().map_err(FtpError::control)
    }

    /// Returns a reference to the underlying TcpStream.
    pub fn get_stream_ref(&self) -> &TcpStream {
        self.inner.get_ref()
    }

    /// Write one line terminated by `\r\n` and flush it
    pub fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        let stream = self.inner.get_mut();
        stream.write_all(format!("{line}\r\n").as_bytes())?;
        stream.flush()
    }

    /// Close both directions of the connection
    pub fn shutdown(&self) -> std::io::Result<()> {
        self.get_stream_ref().shutdown(Shutdown::Both)
    }
}

impl std::fmt::Debug for CommandStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("CommandStream");
        if let Ok(peer) = self.peer_addr() {
            d.field("peer", &peer);
        }
        if let Ok(local) = self.local_addr() {
            d.field("local", &local);
        }
        d.finish()
    }
}

impl Read for CommandStream {
    #[inline(always)]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CommandStream {
    #[inline(always)]
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    #[inline(always)]
    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Transport of a single passive-mode transfer. Closed when dropped.
pub struct DataStream {
    stream: TcpStream,
}

impl DataStream {
    /// Open the data connection announced by the server
    pub fn connect(endpoint: &Endpoint, timeout: Option<Duration>) -> FtpResult<Self> {
        let addrs = resolve(endpoint.host(), endpoint.port())?;
        let stream = tcp_connect(&addrs, timeout).map_err(FtpError::data)?;
        stream.set_read_timeout(timeout).map_err(FtpError::data)?;
        trace!("TCP Stream to data socket {endpoint} opened");
        Ok(Self { stream })
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.local_addr()
    }
}

impl std::fmt::Debug for DataStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("DataStream");
        if let Ok(peer) = self.peer_addr() {
            d.field("peer", &peer);
        }
        if let Ok(local) = self.local_addr() {
            d.field("local", &local);
        }
        d.finish()
    }
}

impl Read for DataStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

/// Resolve `host:port`; a host that yields no address is a connection error
fn resolve(host: &str, port: u16) -> FtpResult<Vec<SocketAddr>> {
    let endpoint = format!("{host}:{port}");
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| FtpError::ConnectionError {
            endpoint: endpoint.clone(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(FtpError::ConnectionError {
            endpoint,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not resolve to any addresses",
            ),
        });
    }

    Ok(addrs)
}

/// Try each address in turn and return the first connection made
fn tcp_connect(addrs: &[SocketAddr], timeout: Option<Duration>) -> std::io::Result<TcpStream> {
    let mut result = std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "could not resolve to any addresses",
    );
    for addr in addrs {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => result = e,
        }
    }

    Err(result)
}
