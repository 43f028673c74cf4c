//! # Sync
//!
//! This module contains the blocking implementation of the client: the control
//! channel and the exchanges that run over it.

mod file;
mod lines;
mod passive;
mod response;
mod stream;
#[cfg(test)]
pub(crate) mod test;

pub use file::{FileDownload, LocalDirectory, LocalStorage};
pub use lines::{Line, ReadLine, ReadLineIter};
pub use passive::{parse_endpoint, Endpoint};
pub use response::{Reply, FEATURES_END, FILE_UNAVAILABLE};
pub use stream::{CommandStream, DataStream};

use crate::builder::FtpBuilder;
use crate::command::Command;
use crate::console::Console;
use crate::{FtpError, FtpResult};

use std::io::BufReader;
use std::net::SocketAddr;
use std::time::Duration;

/// Control replies `LIST` is answered with before the listing is drained:
/// the acknowledgement and the transfer notice.
const LIST_CONTROL_REPLIES: usize = 2;

/// Stream to interface with the FTP server. This interface is only for the command stream;
/// data streams are opened per transfer and never outlive the call that opened them.
pub struct FtpStream {
    timeout: Option<Duration>,
    cmd_stream: CommandStream,
    nat_workaround: bool,
    welcome_msg: Option<Reply>,
    console: Box<dyn Console>,
}

impl std::fmt::Debug for FtpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpStream")
            .field("timeout", &self.timeout)
            .field("cmd_stream", &self.cmd_stream)
            .field("nat_workaround", &self.nat_workaround)
            .field("welcome_msg", &self.welcome_msg)
            .finish()
    }
}

impl FtpStream {
    /// Try to connect to the remote server
    pub fn connect(host: &str, port: u16) -> FtpResult<Self> {
        FtpBuilder::new(host).port(port).connect()
    }

    /// Try to connect to the remote server but with the specified timeout
    /// applied to connects and reads on both channels
    pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> FtpResult<Self> {
        FtpBuilder::new(host)
            .port(port)
            .timeout(Some(timeout))
            .connect()
    }

    pub(crate) fn open(
        cmd_stream: CommandStream,
        timeout: Option<Duration>,
        nat_workaround: bool,
        console: Box<dyn Console>,
    ) -> FtpResult<Self> {
        let mut this = Self {
            timeout,
            cmd_stream,
            nat_workaround,
            welcome_msg: None,
            console,
        };
        this.initialise_stream()?;
        Ok(this)
    }

    fn initialise_stream(&mut self) -> FtpResult<()> {
        trace!("Reading server greeting...");
        let greeting = self.read_reply()?;
        trace!("Server READY; greeting: {:?}", greeting.as_str());
        self.welcome_msg = Some(greeting);
        Ok(())
    }

    /// Set NAT workaround for passive mode
    pub fn set_passive_nat_workaround(&mut self, nat_workaround: bool) {
        self.nat_workaround = nat_workaround;
    }

    /// Returns welcome message retrieved from server (if available)
    pub fn get_welcome_msg(&self) -> Option<&str> {
        self.welcome_msg.as_ref().map(Reply::as_str)
    }

    pub fn peer_addr(&self) -> FtpResult<SocketAddr> {
        self.cmd_stream.peer_addr()
    }

    /// Send the user name to log in as
    pub fn user(&mut self, name: &str) -> FtpResult<Reply> {
        debug!("Signing in with user '{name}'");
        self.perform(Command::User(name))?;
        self.read_reply()
    }

    /// Send the login password
    pub fn pass(&mut self, secret: &str) -> FtpResult<Reply> {
        debug!("Sending password");
        self.perform(Command::Pass(secret))?;
        self.read_reply()
    }

    /// Change the current directory to the path specified.
    pub fn cwd(&mut self, path: &str) -> FtpResult<Reply> {
        debug!("Changing working directory to {path}");
        self.perform(Command::Cwd(path))?;
        self.read_reply()
    }

    /// Ask the server for its extensions.
    ///
    /// Replies are read up to and including the first one containing `End`.
    /// The server closing the connection first ends the listing as well.
    pub fn feat(&mut self) -> FtpResult<Vec<Reply>> {
        debug!("Listing server features");
        self.perform(Command::Feat)?;

        let mut replies = Vec::new();
        while let Some(reply) = self.try_read_reply()? {
            let last = reply.is_end_of_features();
            replies.push(reply);
            if last {
                break;
            }
        }
        if replies.last().map_or(true, |r| !r.is_end_of_features()) {
            debug!("Feature listing ended without an end marker");
        }

        Ok(replies)
    }

    /// Execute `LIST` command which returns the detailed file listing in human readable format.
    /// If `pathname` is omited then the list of files in the current directory will be
    /// returned otherwise it will the list of files on `pathname`.
    ///
    /// Exactly two control replies are read before the data stream is drained.
    pub fn list(&mut self, pathname: Option<&str>) -> FtpResult<Vec<String>> {
        debug!(
            "Reading {} directory content",
            pathname.unwrap_or("working")
        );

        let mut data_stream = BufReader::new(self.data_command(Command::List(pathname))?);
        for _ in 0..LIST_CONTROL_REPLIES {
            self.read_reply()?;
        }

        let mut lines = Vec::new();
        for line in data_stream.read_lines() {
            let line = line.map_err(FtpError::data)?;
            self.console.listing(&line);
            lines.push(line);
        }
        trace!("Lines from stream {:?}", lines);

        drop(data_stream);
        trace!("dropped stream");
        Ok(lines)
    }

    /// The implementation of `RETR` command: `file_name` is downloaded into a
    /// resource of the same name created through `storage`.
    ///
    /// Returns the amount of bytes written. A `550` reply aborts the transfer
    /// before anything is created locally.
    pub fn retr(&mut self, file_name: &str, storage: &mut dyn LocalStorage) -> FtpResult<u64> {
        debug!("Retrieving '{file_name}'");
        let data_stream = self.data_command(Command::Retr(file_name))?;
        let reply = self.read_reply()?;
        if reply.is_file_unavailable() {
            debug!("'{file_name}' is unavailable");
            drop(data_stream);
            trace!("dropped stream");
            return Err(FtpError::NotFoundError(reply));
        }

        let mut download = FileDownload::new(data_stream);
        let saved = download.save(file_name, storage);
        self.finalize_retr_stream(download)?;
        saved
    }

    /// Read the transfer completion reply, then close the data stream
    fn finalize_retr_stream(&mut self, download: FileDownload) -> FtpResult<Reply> {
        debug!("Finalizing retr stream");
        let reply = self.read_reply();
        download.finish();
        reply
    }

    /// Quits the current FTP session. The control connection is closed whatever
    /// the outcome of the exchange.
    pub fn quit(mut self) -> FtpResult<Reply> {
        debug!("Quitting stream");
        let reply = self
            .perform(Command::Quit)
            .and_then(|_| self.read_reply());
        if let Err(e) = self.cmd_stream.shutdown() {
            trace!("Control stream already closed: {e}");
        }
        reply
    }

    // -- private

    /// Write data to stream with command to perform
    fn perform(&mut self, command: Command) -> FtpResult<()> {
        trace!("CC OUT: {}", command.redacted());

        let line = command.to_string();
        self.console.request(&line);
        self.cmd_stream.send_line(&line).map_err(FtpError::control)
    }

    /// Read one reply line; a closed connection is an error
    fn read_reply(&mut self) -> FtpResult<Reply> {
        self.try_read_reply()?.ok_or_else(|| {
            FtpError::control(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            ))
        })
    }

    /// Read one reply line, or `None` if the server closed the connection
    fn try_read_reply(&mut self) -> FtpResult<Option<Reply>> {
        let Some(line) = self
            .cmd_stream
            .next_line()
            .map_err(FtpError::control)?
            .into_text()
        else {
            trace!("CC IN: EOF");
            return Ok(None);
        };

        trace!("CC IN: {:?}", line);
        let reply = Reply::new(line);
        self.console.reply(&reply);
        Ok(Some(reply))
    }

    /// Negotiate a data stream, then send the command that uses it.
    /// The stream is connected before the command is sent.
    fn data_command(&mut self, cmd: Command) -> FtpResult<DataStream> {
        let endpoint = self.pasv()?;
        let stream = DataStream::connect(&endpoint, self.timeout)?;
        self.perform(cmd)?;
        Ok(stream)
    }

    /// Runs the PASV command to enter passive mode.
    fn pasv(&mut self) -> FtpResult<Endpoint> {
        debug!("PASV command");
        self.perform(Command::Pasv)?;
        let reply = self.read_reply()?;
        let mut endpoint = parse_endpoint(&reply)?;
        trace!("Passive address: {}", endpoint);

        if self.nat_workaround && endpoint.ipv4().map_or(false, |ip| ip.is_private()) {
            let remote = self.cmd_stream.peer_addr()?;
            trace!("Replacing site local address {} with {}", endpoint, remote.ip());
            endpoint.set_host(remote.ip().to_string());
        }

        Ok(endpoint)
    }
}
