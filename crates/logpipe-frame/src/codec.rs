use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: little-endian payload length.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the wire format can describe.
pub const MAX_PAYLOAD: usize = u32::MAX as usize;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One length-prefixed unit on the pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The value carried in the length prefix.
    pub fn length(&self) -> u32 {
        // Frames are only built from payloads that passed `encode_length`
        // or were read after a 4-byte prefix.
        u32::try_from(self.payload.len()).unwrap_or(u32::MAX)
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode the length prefix for a payload of `len` bytes.
///
/// Fails when `len` does not fit in a `u32` or exceeds `max_payload`.
pub fn encode_length(len: usize, max_payload: usize) -> Result<[u8; HEADER_SIZE]> {
    let max = max_payload.min(MAX_PAYLOAD);
    if len > max {
        return Err(FrameError::PayloadTooLarge { size: len, max });
    }
    let length = u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
        size: len,
        max: MAX_PAYLOAD,
    })?;
    Ok(length.to_le_bytes())
}

/// Decode a length prefix.
pub fn decode_length(header: [u8; HEADER_SIZE]) -> u32 {
    u32::from_le_bytes(header)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────────────┐
/// │ Length       │ Payload         │
/// │ (4B LE)      │ (Length bytes)  │
/// └──────────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header = encode_length(payload.len(), MAX_PAYLOAD)?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&header);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    let payload_len = decode_length(header) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { payload }))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB. Values above
    /// [`MAX_PAYLOAD`] are clamped to it.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl FrameConfig {
    /// Accept any payload the wire format can describe.
    pub fn unlimited() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }

    pub(crate) fn effective_max(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = b"hello, logpipe!";

        encode_frame(payload, &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + payload.len());

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(frame.payload.as_ref(), payload);
        assert_eq!(frame.length() as usize, payload.len());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_header_is_little_endian_length() {
        let mut buf = BytesMut::new();
        encode_frame(&[0u8; 0x0102], &mut buf).unwrap();
        assert_eq!(&buf[..HEADER_SIZE], &[0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x05, 0x00, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"hello", &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1024 * 1024 * 32);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_encode_length_limits() {
        assert_eq!(encode_length(7, 16).unwrap(), [7, 0, 0, 0]);
        assert!(matches!(
            encode_length(17, 16),
            Err(FrameError::PayloadTooLarge { size: 17, max: 16 })
        ));
        assert_eq!(
            encode_length(MAX_PAYLOAD, usize::MAX).unwrap(),
            [0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_encode_length_overflow() {
        let err = encode_length(MAX_PAYLOAD + 1, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { max: MAX_PAYLOAD, .. }
        ));
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", &mut buf).unwrap();
        encode_frame(b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f2.payload.as_ref(), b"second");

        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0, 0, 0, 0]);

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.length(), 0);
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);
    }

    #[test]
    fn test_config_clamps_to_wire_limit() {
        let cfg = FrameConfig {
            max_payload_size: usize::MAX,
        };
        assert_eq!(cfg.effective_max(), MAX_PAYLOAD);
        assert_eq!(FrameConfig::unlimited().effective_max(), MAX_PAYLOAD);
    }
}
