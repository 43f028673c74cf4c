//! # Builder
//!
//! Connection settings of a session

use crate::console::{Console, Silent};
use crate::sync_ftp::{CommandStream, FtpStream};
use crate::FtpResult;

use std::time::Duration;

/// Port used when none is given
pub const DEFAULT_PORT: u16 = 21;

pub struct FtpBuilder {
    host: String,
    port: u16,
    timeout: Option<Duration>,
    nat_workaround: bool,
    console: Box<dyn Console>,
}

impl std::fmt::Debug for FtpBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("nat_workaround", &self.nat_workaround)
            .finish()
    }
}

impl FtpBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: None,
            nat_workaround: false,
            console: Box::new(Silent),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Deadline for connects and reads on both channels. `None` blocks indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connect to the control peer instead of a private address announced by `PASV`
    pub fn passive_nat_workaround(mut self, nat_workaround: bool) -> Self {
        self.nat_workaround = nat_workaround;
        self
    }

    /// Where exchanged lines are surfaced, starting with the greeting
    pub fn console(mut self, console: impl Console + 'static) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Open the control connection and read the server greeting
    pub fn connect(self) -> FtpResult<FtpStream> {
        let cmd_stream = CommandStream::connect(&self.host, self.port, self.timeout)?;
        FtpStream::open(cmd_stream, self.timeout, self.nat_workaround, self.console)
    }
}
