//! Writer side of a log pipe.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use logpipe_frame::{FrameConfig, FrameError, FrameWriter};
use logpipe_marshal::Marshalizer;
use tracing::trace;

use crate::error::{ForwardError, Result};
use crate::record::LogLine;

/// Frames serialized log records onto a pipe.
///
/// The length prefix and the payload of a frame are written under one lock,
/// so an observer can be shared between threads without interleaving frames.
pub struct PipeObserver<W> {
    writer: Mutex<FrameWriter<W>>,
    marshalizer: Arc<dyn Marshalizer>,
}

impl<W: Write> PipeObserver<W> {
    pub fn new(inner: W, marshalizer: Arc<dyn Marshalizer>) -> Self {
        Self::with_config(inner, marshalizer, FrameConfig::default())
    }

    pub fn with_config(inner: W, marshalizer: Arc<dyn Marshalizer>, config: FrameConfig) -> Self {
        Self {
            writer: Mutex::new(FrameWriter::with_config(inner, config)),
            marshalizer,
        }
    }

    /// Write one already-serialized payload as a frame.
    ///
    /// Returns the number of payload bytes written. If the length prefix
    /// cannot be written the payload is not attempted.
    pub fn write_log_line(&self, payload: &[u8]) -> Result<usize> {
        let written = self.lock()?.send(payload)?;
        trace!(bytes = written, "log frame written");
        Ok(written)
    }

    /// Project, marshal and frame a record.
    pub fn log(&self, line: &LogLine) -> Result<usize> {
        let wrapper = line.to_wrapper();
        let payload = self.marshalizer.marshal(Some(&wrapper))?;
        self.write_log_line(&payload)
    }

    pub fn marshalizer(&self) -> &Arc<dyn Marshalizer> {
        &self.marshalizer
    }

    /// Consume the observer and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map(FrameWriter::into_inner)
            .map_err(|_| ForwardError::WriterPoisoned)
    }

    fn lock(&self) -> Result<MutexGuard<'_, FrameWriter<W>>> {
        self.writer.lock().map_err(|_| ForwardError::WriterPoisoned)
    }
}

fn to_io_error(err: ForwardError) -> io::Error {
    match err {
        ForwardError::Frame(FrameError::Io(io)) => io,
        ForwardError::Frame(FrameError::ConnectionClosed) => {
            io::Error::new(io::ErrorKind::WriteZero, "log pipe closed")
        }
        other => io::Error::other(other),
    }
}

/// Each `write` call becomes exactly one frame.
impl<W: Write> Write for &PipeObserver<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_log_line(buf).map_err(to_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()
            .map_err(to_io_error)?
            .flush()
            .map_err(|err| to_io_error(err.into()))
    }
}

impl<W: Write> Write for PipeObserver<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl<W> std::fmt::Debug for PipeObserver<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeObserver")
            .field("marshalizer", &self.marshalizer.name())
            .finish()
    }
}
