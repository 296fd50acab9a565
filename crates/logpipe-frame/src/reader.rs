use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::codec::{decode_length, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads length-prefixed frames from any `Read` stream.
///
/// Each frame is read as exactly `HEADER_SIZE` bytes followed by exactly
/// `length` bytes; nothing beyond the current frame is consumed, and callers
/// only ever see complete frames.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
    cancel: Option<CancellationToken>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            config,
            cancel: None,
        }
    }

    /// Observe `token` before each frame and between the length prefix and
    /// the payload.
    ///
    /// A read that is already blocked on the pipe is not interrupted; close
    /// the write side to unblock it.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends
    /// between frames and `Err(FrameError::Truncated)` when it ends inside
    /// one.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.check_cancelled()?;

        let mut header = [0u8; HEADER_SIZE];
        self.read_exact_retrying(&mut header, true)?;
        let length = decode_length(header) as usize;

        self.check_cancelled()?;

        let max = self.config.effective_max();
        if length > max {
            return Err(FrameError::PayloadTooLarge { size: length, max });
        }

        let mut payload = BytesMut::zeroed(length);
        self.read_exact_retrying(&mut payload, false)?;

        trace!(len = length, "frame read");
        Ok(Frame {
            payload: payload.freeze(),
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(FrameError::Cancelled),
            _ => Ok(()),
        }
    }

    fn read_exact_retrying(&mut self, buf: &mut [u8], frame_start: bool) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if frame_start && filled == 0 => return Err(FrameError::ConnectionClosed),
                Ok(0) => {
                    return Err(FrameError::Truncated {
                        expected: buf.len(),
                        received: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for FrameReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("config", &self.config)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}
