//! # Response
//!
//! A single reply line received from the server.
//!
//! The client does not parse reply codes into a status model. Control
//! decisions are plain substring checks tied to the handful of exchanges the
//! client performs.

use std::fmt;

/// Marker of a `550 Requested action not taken. File unavailable` reply
pub const FILE_UNAVAILABLE: &str = "550";
/// Marker of the closing line of a `FEAT` reply (`211 End`)
pub const FEATURES_END: &str = "End";

/// One newline terminated line of server text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    line: String,
}

impl Reply {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    pub fn into_string(self) -> String {
        self.line
    }

    /// The numeric prefix of the reply, when the line starts with three digits
    pub fn code(&self) -> Option<u16> {
        let prefix = self.line.get(..3)?;
        if prefix.bytes().all(|b| b.is_ascii_digit()) {
            prefix.parse().ok()
        } else {
            None
        }
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.line.contains(marker)
    }

    /// True when the reply reports the requested file as unavailable
    pub fn is_file_unavailable(&self) -> bool {
        self.contains(FILE_UNAVAILABLE)
    }

    /// True for the last line of a feature listing
    pub fn is_end_of_features(&self) -> bool {
        self.contains(FEATURES_END)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.line)
    }
}
