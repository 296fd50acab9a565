use std::os::fd::{FromRawFd, OwnedFd};

use tracing::debug;

use crate::ends::{PipeReader, PipeWriter};
use crate::error::{Result, TransportError};

/// Create a new anonymous pipe.
///
/// Both descriptors are created with close-on-exec set; hand them to a child
/// process explicitly (for example as its stdin/stdout) when needed.
pub fn anonymous_pipe() -> Result<(PipeReader, PipeWriter)> {
    let mut fds = [0 as libc::c_int; 2];

    create_pipe(&mut fds)?;

    // SAFETY: `create_pipe` succeeded, so both descriptors are open, valid,
    // and exclusively owned by us from this point on.
    let (read_fd, write_fd) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    debug!(read_fd = fds[0], write_fd = fds[1], "created anonymous pipe");
    Ok((PipeReader::from(read_fd), PipeWriter::from(write_fd)))
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn create_pipe(fds: &mut [libc::c_int; 2]) -> Result<()> {
    // SAFETY: `fds` points to two writable `c_int` slots as `pipe2` requires.
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if rc != 0 {
        return Err(TransportError::Create(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn create_pipe(fds: &mut [libc::c_int; 2]) -> Result<()> {
    // SAFETY: `fds` points to two writable `c_int` slots as `pipe` requires.
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(TransportError::Create(std::io::Error::last_os_error()));
    }

    for fd in fds.iter().copied() {
        // SAFETY: `fd` was just returned by `pipe` and is still open.
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) };
        if rc == -1 {
            let err = std::io::Error::last_os_error();
            // SAFETY: both descriptors are open and not yet wrapped, so closing
            // them here cannot double-close.
            unsafe {
                libc::close(fds[0]);
                libc::close(fds[1]);
            }
            return Err(TransportError::Create(err));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn bytes_flow_from_writer_to_reader() {
        let (mut reader, mut writer) = anonymous_pipe().unwrap();

        writer.write_all(b"hello").unwrap();
        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).unwrap();

        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn dropping_writer_signals_end_of_stream() {
        let (mut reader, writer) = anonymous_pipe().unwrap();
        drop(writer);

        let mut buf = [0u8; 1];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn cloned_writer_keeps_pipe_open() {
        let (mut reader, writer) = anonymous_pipe().unwrap();
        let mut clone = writer.try_clone().unwrap();
        drop(writer);

        clone.write_all(b"x").unwrap();
        drop(clone);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"x");
    }

    #[test]
    fn descriptors_are_close_on_exec() {
        use std::os::fd::AsRawFd;

        let (reader, writer) = anonymous_pipe().unwrap();
        for fd in [reader.as_raw_fd(), writer.as_raw_fd()] {
            // SAFETY: `fd` is open for the lifetime of `reader`/`writer`.
            let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
            assert!(flags & libc::FD_CLOEXEC != 0);
        }
    }

    #[test]
    fn writes_cross_threads() {
        let (mut reader, mut writer) = anonymous_pipe().unwrap();

        let producer = std::thread::spawn(move || {
            for i in 0..32u8 {
                writer.write_all(&[i]).unwrap();
            }
        });

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        producer.join().unwrap();

        assert_eq!(out, (0..32u8).collect::<Vec<_>>());
    }
}
