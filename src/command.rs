//! # Command
//!
//! The set of FTP commands understood by the client

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ftp commands with their arguments
pub enum Command<'a> {
    /// Change working directory
    Cwd(&'a str),
    /// List the extensions supported by the server
    Feat,
    /// List entries at specified path. If path is not provided list entries at current working directory
    List(Option<&'a str>),
    /// Provide login password
    Pass(&'a str),
    /// Passive mode
    Pasv,
    /// Quit
    Quit,
    /// Retrieve file
    Retr(&'a str),
    /// Provide user to login as
    User(&'a str),
}

impl Command<'_> {
    /// The command line as it may be written to logs: secrets are masked
    pub fn redacted(&self) -> String {
        match self {
            Self::Pass(_) => "PASS ******".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cwd(d) => write!(f, "CWD {d}"),
            Self::Feat => write!(f, "FEAT"),
            Self::List(Some(p)) => write!(f, "LIST {p}"),
            Self::List(None) => write!(f, "LIST"),
            Self::Pass(p) => write!(f, "PASS {p}"),
            Self::Pasv => write!(f, "PASV"),
            Self::Quit => write!(f, "QUIT"),
            Self::Retr(p) => write!(f, "RETR {p}"),
            Self::User(u) => write!(f, "USER {u}"),
        }
    }
}
