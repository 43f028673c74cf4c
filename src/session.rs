//! # Session
//!
//! Runs prompt commands against a connected server, one at a time and start
//! to finish. Wrong arity and unknown verbs are rejected before anything is
//! sent; a broken control connection ends the session.

use crate::input::{UserCommand, Verb};
use crate::sync_ftp::{FtpStream, LocalStorage, Reply};
use crate::{FtpError, FtpResult};

/// What the prompt loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    stream: Option<FtpStream>,
    storage: Box<dyn LocalStorage>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("stream", &self.stream)
            .finish()
    }
}

impl Session {
    pub fn new(stream: FtpStream, storage: impl LocalStorage + 'static) -> Self {
        Self {
            stream: Some(stream),
            storage: Box::new(storage),
        }
    }

    /// Whether the control connection is still held
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn welcome_msg(&self) -> Option<&str> {
        self.stream.as_ref().and_then(FtpStream::get_welcome_msg)
    }

    /// Run one command
    pub fn execute(&mut self, command: &UserCommand) -> FtpResult<Flow> {
        let verb = command.validate()?;
        let arg = command.args().first().map(String::as_str).unwrap_or_default();
        debug!("Executing '{}'", verb.name());

        let result = match verb {
            Verb::Quit => {
                self.quit();
                return Ok(Flow::Quit);
            }
            Verb::User => self.connected()?.user(arg).map(drop),
            Verb::Pw => self.connected()?.pass(arg).map(drop),
            Verb::Cd => self.connected()?.cwd(arg).map(drop),
            Verb::Features => self.connected()?.feat().map(drop),
            Verb::Dir => self.connected()?.list(None).map(drop),
            Verb::Get => {
                let stream = self.stream.as_mut().ok_or_else(not_connected)?;
                stream.retr(arg, self.storage.as_mut()).map(drop)
            }
        };

        if let Err(err) = &result {
            if err.is_fatal() {
                warn!("Control connection lost: {err}");
                self.stream = None;
            }
        }

        result.map(|_| Flow::Continue)
    }

    /// Send `QUIT` and release the control connection.
    ///
    /// Does nothing once the connection has been released.
    pub fn quit(&mut self) -> Option<Reply> {
        let Some(stream) = self.stream.take() else {
            debug!("Session already closed");
            return None;
        };

        match stream.quit() {
            Ok(reply) => Some(reply),
            Err(err) => {
                warn!("QUIT failed: {err}");
                None
            }
        }
    }

    fn connected(&mut self) -> FtpResult<&mut FtpStream> {
        self.stream.as_mut().ok_or_else(not_connected)
    }
}

fn not_connected() -> FtpError {
    FtpError::control(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "control connection is closed",
    ))
}
