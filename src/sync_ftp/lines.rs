//! # Lines
//!
//! Newline terminated line reading, shared by the control channel and the
//! listing drain of the data channel.

use std::io::BufRead;

/// The outcome of a single line read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// The next line, with the end of line marker (\r\n or \n) stripped
    Line(String),
    /// The bytes received right before EOF, which were not terminated by a newline
    LastLine(String),
    /// End of data stream
    Eof,
}

impl Line {
    /// The text of the line, or `None` at end of stream
    pub fn into_text(self) -> Option<String> {
        match self {
            Line::Line(s) | Line::LastLine(s) => Some(s),
            Line::Eof => None,
        }
    }
}

pub trait ReadLine {
    /// Blocks until a full line, the final unterminated bytes, or EOF are available
    fn next_line(&mut self) -> std::io::Result<Line>;

    fn read_lines(&mut self) -> ReadLineIter<&mut Self>
    where
        Self: Sized,
    {
        ReadLineIter { reader: self }
    }
}

impl<R: BufRead> ReadLine for R {
    fn next_line(&mut self) -> std::io::Result<Line> {
        let mut buf = Vec::new();
        self.read_until(b'\n', &mut buf)?;

        if buf.is_empty() {
            return Ok(Line::Eof);
        }

        let terminated = buf.last() == Some(&b'\n');
        if terminated {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        let text = String::from_utf8_lossy(&buf).into_owned();
        Ok(if terminated {
            Line::Line(text)
        } else {
            Line::LastLine(text)
        })
    }
}

/// Iterates over the lines of a reader until EOF.
pub struct ReadLineIter<R> {
    reader: R,
}

impl<R: ReadLine> std::iter::Iterator for ReadLineIter<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_line().map(Line::into_text).transpose()
    }
}
