//! # csftp
//!
//! csftp is a minimal interactive FTP client.
//!
//! A session keeps one control connection open for its whole lifetime and
//! opens a short lived passive-mode data connection for each directory
//! listing or file retrieval.
//!
//! ## Get started
//!
//! ```rust,no_run
//! use csftp::{FtpBuilder, LocalDirectory, Session, StdConsole, UserCommand};
//!
//! let stream = FtpBuilder::new("127.0.0.1")
//!     .port(21)
//!     .console(StdConsole)
//!     .connect()
//!     .unwrap();
//! let mut session = Session::new(stream, LocalDirectory::default());
//! for line in ["user anonymous", "pw guest", "dir", "get readme.txt", "quit"] {
//!     if let Err(err) = session.execute(&UserCommand::parse(line).unwrap()) {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

#[macro_use]
extern crate log;

// -- private
mod regex;

// -- public
pub mod builder;
pub mod command;
pub mod console;
pub mod input;
pub mod session;
pub mod sync_ftp;
pub mod types;

// -- export
pub use builder::{FtpBuilder, DEFAULT_PORT};
pub use console::{Console, StdConsole};
pub use input::{UserCommand, Verb};
pub use session::{Flow, Session};
pub use sync_ftp::{Endpoint, FtpStream, LocalDirectory, LocalStorage, Reply};
pub use types::{Channel, FtpError, FtpResult};

// -- test logging
#[cfg(test)]
pub fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
