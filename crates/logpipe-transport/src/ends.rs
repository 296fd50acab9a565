use std::fs::File;
use std::io::{Read, Write};

use crate::error::{Result, TransportError};

/// Read side of an anonymous pipe.
///
/// Reads block until data is available. Once every write end is closed,
/// `read` returns `Ok(0)`.
pub struct PipeReader {
    inner: File,
}

/// Write side of an anonymous pipe.
///
/// Dropping the last `PipeWriter` for a pipe closes it, which unblocks the
/// reader with end-of-stream.
pub struct PipeWriter {
    inner: File,
}

impl PipeReader {
    /// Wrap an already-open file handle referring to a pipe read end.
    pub fn from_file(file: File) -> Self {
        Self { inner: file }
    }

    /// Duplicate the underlying descriptor.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = self.inner.try_clone().map_err(TransportError::Clone)?;
        Ok(Self { inner })
    }

    /// Consume the pipe end and return the underlying file handle.
    pub fn into_file(self) -> File {
        self.inner
    }
}

impl PipeWriter {
    /// Wrap an already-open file handle referring to a pipe write end.
    pub fn from_file(file: File) -> Self {
        Self { inner: file }
    }

    /// Duplicate the underlying descriptor.
    ///
    /// The pipe stays open until every clone has been dropped.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = self.inner.try_clone().map_err(TransportError::Clone)?;
        Ok(Self { inner })
    }

    /// Consume the pipe end and return the underlying file handle.
    pub fn into_file(self) -> File {
        self.inner
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(unix)]
mod unix {
    use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

    use super::{PipeReader, PipeWriter};

    impl From<OwnedFd> for PipeReader {
        fn from(fd: OwnedFd) -> Self {
            Self::from_file(fd.into())
        }
    }

    impl From<OwnedFd> for PipeWriter {
        fn from(fd: OwnedFd) -> Self {
            Self::from_file(fd.into())
        }
    }

    impl From<PipeReader> for OwnedFd {
        fn from(reader: PipeReader) -> Self {
            reader.into_file().into()
        }
    }

    impl From<PipeWriter> for OwnedFd {
        fn from(writer: PipeWriter) -> Self {
            writer.into_file().into()
        }
    }

    impl AsFd for PipeReader {
        fn as_fd(&self) -> BorrowedFd<'_> {
            self.inner.as_fd()
        }
    }

    impl AsFd for PipeWriter {
        fn as_fd(&self) -> BorrowedFd<'_> {
            self.inner.as_fd()
        }
    }

    impl AsRawFd for PipeReader {
        fn as_raw_fd(&self) -> RawFd {
            self.inner.as_raw_fd()
        }
    }

    impl AsRawFd for PipeWriter {
        fn as_raw_fd(&self) -> RawFd {
            self.inner.as_raw_fd()
        }
    }
}

impl std::fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeReader").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeWriter").finish_non_exhaustive()
    }
}
