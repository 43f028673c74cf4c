//! # File
//!
//! Local destination of retrieved files and the byte-exact download copy

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::DataStream;
use crate::{FtpError, FtpResult};

/// Where `get` writes what it retrieves
pub trait LocalStorage {
    /// Create (or truncate) the resource called `name`
    fn create(&mut self, name: &str) -> std::io::Result<Box<dyn Write>>;

    /// Path reported in diagnostics for `name`
    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

/// Files created inside a local directory. Only the final component of a
/// remote name is used, so retrievals never land outside the directory.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    root: PathBuf,
}

impl LocalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for LocalDirectory {
    fn default() -> Self {
        Self::new(".")
    }
}

impl LocalStorage for LocalDirectory {
    fn create(&mut self, name: &str) -> std::io::Result<Box<dyn Write>> {
        if Path::new(name).file_name().is_none() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a file name",
            ));
        }
        let file = File::create(self.location(name))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn location(&self, name: &str) -> PathBuf {
        match Path::new(name).file_name() {
            Some(file_name) => self.root.join(file_name),
            None => self.root.join(name),
        }
    }
}

/// A retrieval in progress. Dropping it closes the data connection.
#[derive(Debug)]
#[must_use = "The file download must be terminated with `FileDownload::finish()`"]
pub struct FileDownload {
    data_stream: DataStream,
}

enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
}

impl FileDownload {
    pub fn new(data_stream: DataStream) -> Self {
        Self { data_stream }
    }

    /// Copy every byte of the data connection into `name` until EOF.
    ///
    /// If the local resource fails, the rest of the transfer is drained so the
    /// server can complete it, and `LocalResourceError` is returned.
    pub fn save(&mut self, name: &str, storage: &mut dyn LocalStorage) -> FtpResult<u64> {
        let path = storage.location(name);
        let local_error = |source: std::io::Error| FtpError::LocalResourceError {
            path: path.clone(),
            source,
        };

        let mut writer = match storage.create(name) {
            Ok(w) => w,
            Err(e) => {
                let error = local_error(e);
                self.drain()?;
                return Err(error);
            }
        };

        match copy_exact(&mut self.data_stream, &mut writer) {
            Ok(bytes) => {
                writer.flush().map_err(local_error)?;
                debug!("Saved {bytes} bytes to {}", path.display());
                Ok(bytes)
            }
            Err(CopyError::Read(e)) => Err(FtpError::data(e)),
            Err(CopyError::Write(e)) => {
                let error = local_error(e);
                self.drain()?;
                Err(error)
            }
        }
    }

    /// Discard whatever is left on the data connection
    fn drain(&mut self) -> FtpResult<u64> {
        let skipped =
            std::io::copy(&mut self.data_stream, &mut std::io::sink()).map_err(FtpError::data)?;
        trace!("Drained {skipped} bytes from data stream");
        Ok(skipped)
    }

    /// Close the data connection
    pub fn finish(self) {
        drop(self.data_stream);
        trace!("dropped stream");
    }
}

/// `std::io::copy` that keeps read and write failures apart
fn copy_exact<R: Read, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
) -> Result<u64, CopyError> {
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
}
