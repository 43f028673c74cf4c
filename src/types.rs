//! # Types
//!
//! Errors and shared values used across the client

use crate::sync_ftp::Reply;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A shorthand for a Result whose error type is always an FtpError.
pub type FtpResult<T> = std::result::Result<T, FtpError>;

/// The connection an I/O failure happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// The long lived command/reply connection
    Control,
    /// The per-transfer connection opened after `PASV`
    Data,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Control => f.pad("control"),
            Channel::Data => f.pad("data"),
        }
    }
}

impl Channel {
    /// Diagnostic code printed in front of an I/O failure on this channel
    pub fn error_code(&self) -> &'static str {
        match self {
            Channel::Control => "0xFFFF",
            Channel::Data => "0x3A7",
        }
    }
}

/// `FtpError` is a library-global error type to describe the different kinds of
/// errors that might occur while running a client session.
#[derive(Debug, Error)]
pub enum FtpError {
    /// The command was given the wrong number of arguments. Nothing was sent.
    #[error("0x002 Incorrect number of arguments for '{command}': expected {expected}, got {given}")]
    ArgumentCountError {
        command: String,
        expected: usize,
        given: usize,
    },
    /// The command is not one the client knows. Nothing was sent.
    #[error("0x001 Invalid command: {0}")]
    UnknownCommandError(String),
    /// The server reply does not have the shape the exchange requires
    #[error("0xFFFF Processing error: {0}")]
    ProtocolError(String),
    /// The remote endpoint could not be resolved
    #[error("0x3A2 Connection to {endpoint} failed to open: {source}")]
    ConnectionError {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    /// A socket failed while connecting, reading or writing
    #[error("{} I/O error on {channel} channel: {source}", .channel.error_code())]
    IoError {
        channel: Channel,
        #[source]
        source: std::io::Error,
    },
    /// The server reported the requested file as unavailable.
    /// Contains the reply.
    #[error("File unavailable: {0}")]
    NotFoundError(Reply),
    /// The local destination could not be created or written
    #[error("0x38E Access to local file {} denied: {source}", .path.display())]
    LocalResourceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FtpError {
    /// Wrap an I/O failure on the control connection
    pub fn control(source: std::io::Error) -> Self {
        Self::IoError {
            channel: Channel::Control,
            source,
        }
    }

    /// Wrap an I/O failure on a data connection
    pub fn data(source: std::io::Error) -> Self {
        Self::IoError {
            channel: Channel::Data,
            source,
        }
    }

    /// Whether the session can no longer be used after this error.
    /// Only a broken control connection ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IoError {
                channel: Channel::Control,
                ..
            }
        )
    }
}
