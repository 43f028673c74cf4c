//! # Console
//!
//! Where the session surfaces the lines it exchanges with the server

use crate::sync_ftp::Reply;

const REQUEST_PREFIX: &str = " --> ";
const RESPONSE_PREFIX: &str = " <-- ";

/// Receives every line sent or received by a session, in wire order
pub trait Console {
    /// A command line written to the control channel
    fn request(&mut self, line: &str);
    /// A reply read from the control channel
    fn reply(&mut self, reply: &Reply);
    /// A line of directory listing read from the data channel
    fn listing(&mut self, line: &str);
}

/// Prints the exchange on standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn request(&mut self, line: &str) {
        println!("{REQUEST_PREFIX}{line}");
    }

    fn reply(&mut self, reply: &Reply) {
        println!("{RESPONSE_PREFIX}{reply}");
    }

    fn listing(&mut self, line: &str) {
        println!("{RESPONSE_PREFIX}{line}");
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Console for Silent {
    fn request(&mut self, _line: &str) {}

    fn reply(&mut self, _reply: &Reply) {}

    fn listing(&mut self, _line: &str) {}
}
