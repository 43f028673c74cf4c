//! # Input
//!
//! Commands typed at the prompt

use crate::{FtpError, FtpResult};

use std::str::FromStr;

/// The commands accepted at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    User,
    Pw,
    Cd,
    Dir,
    Get,
    Features,
    Quit,
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::User => "user",
            Verb::Pw => "pw",
            Verb::Cd => "cd",
            Verb::Dir => "dir",
            Verb::Get => "get",
            Verb::Features => "features",
            Verb::Quit => "quit",
        }
    }

    /// Number of arguments the command takes
    pub fn arity(&self) -> usize {
        match self {
            Verb::User | Verb::Pw | Verb::Cd | Verb::Get => 1,
            Verb::Dir | Verb::Features | Verb::Quit => 0,
        }
    }
}

impl FromStr for Verb {
    type Err = FtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Verb::User),
            "pw" => Ok(Verb::Pw),
            "cd" => Ok(Verb::Cd),
            "dir" => Ok(Verb::Dir),
            "get" => Ok(Verb::Get),
            "features" => Ok(Verb::Features),
            "quit" => Ok(Verb::Quit),
            other => Err(FtpError::UnknownCommandError(other.to_string())),
        }
    }
}

/// A line of input split into its verb and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCommand {
    verb: String,
    args: Vec<String>,
}

impl UserCommand {
    pub fn new<S: Into<String>>(verb: S, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            verb: verb.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a line on whitespace. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next()?;
        Some(Self::new(verb, tokens))
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolve the verb and check the argument count
    pub fn validate(&self) -> FtpResult<Verb> {
        let verb: Verb = self.verb.parse()?;
        if self.args.len() != verb.arity() {
            return Err(FtpError::ArgumentCountError {
                command: verb.name().to_string(),
                expected: verb.arity(),
                given: self.args.len(),
            });
        }
        Ok(verb)
    }
}
