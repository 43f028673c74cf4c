//! # Regex
//!
//! Lazily compiled patterns for parsing server replies

use lazy_regex::{lazy_regex, Lazy, Regex};

/// PASV response format : 227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).
pub static PASV_PORT_RE: Lazy<Regex> = lazy_regex!(
    r"\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)"
);
