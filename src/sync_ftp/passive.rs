//! # Passive
//!
//! Derives the data connection endpoint from a `227` reply.

use std::fmt;
use std::net::Ipv4Addr;

use super::Reply;
use crate::regex::PASV_PORT_RE;
use crate::{FtpError, FtpResult};

/// Host and port the server listens on for the next transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The announced address, if it is an IPv4 literal
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.host.parse().ok()
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse `(h1,h2,h3,h4,p1,p2)` out of a passive-mode reply.
///
/// The host is `h1.h2.h3.h4` and the port is `p1 * 256 + p2`.
pub fn parse_endpoint(reply: &Reply) -> FtpResult<Endpoint> {
    let malformed = || FtpError::ProtocolError(format!("malformed passive-mode reply: {reply}"));

    let caps = PASV_PORT_RE.captures(reply.as_str()).ok_or_else(malformed)?;
    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1].parse::<u8>().map_err(|_| malformed())?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) | u16::from(octets[5]);

    Ok(Endpoint::new(ip.to_string(), port))
}
