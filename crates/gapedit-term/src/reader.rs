// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin reader — collects raw bytes from the terminal on the calling thread.
//
// The editor is single-threaded: the event loop asks for input, handles it
// completely, paints, and only then asks again. `poll()` with a short
// timeout keeps the loop responsive to SIGWINCH (which interrupts poll with
// EINTR) and lets it give up on a dangling escape prefix, without a
// background thread or channel.

use std::io;
#[cfg(unix)]
use std::os::unix::io::RawFd;

/// Byte chunk read per call.
///
/// A single keypress is 1-6 bytes, a paste can be kilobytes. 4 KB handles
/// both without waste.
const READ_BUF_SIZE: usize = 4096;

/// Default wait for input before reporting a timeout (milliseconds).
pub const POLL_TIMEOUT_MS: i32 = 50;

/// What one [`StdinReader::poll_read`] call produced.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadEvent<'a> {
    /// A non-empty chunk of raw input.
    Bytes(&'a [u8]),
    /// Nothing arrived in time, or a signal interrupted the wait.
    Timeout,
    /// The input stream is closed.
    Eof,
}

/// Poll-based reader over a file descriptor (stdin by default).
pub struct StdinReader {
    #[cfg(unix)]
    fd: RawFd,
    buf: Box<[u8; READ_BUF_SIZE]>,
}

impl StdinReader {
    /// Reader over the process's stdin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDIN_FILENO,
            buf: Box::new([0u8; READ_BUF_SIZE]),
        }
    }

    /// Reader over an arbitrary descriptor. The caller keeps ownership.
    #[cfg(unix)]
    #[must_use]
    pub fn from_fd(fd: RawFd) -> Self {
        Self {
            fd,
            buf: Box::new([0u8; READ_BUF_SIZE]),
        }
    }

    /// Wait up to `timeout_ms` for input and read what is available.
    ///
    /// # Errors
    ///
    /// Returns an error if `poll` or `read` fails for a reason other than
    /// signal interruption.
    #[cfg(unix)]
    pub fn poll_read(&mut self, timeout_ms: i32) -> io::Result<ReadEvent<'_>> {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, timeout_ms)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(ReadEvent::Timeout)
            } else {
                Err(err)
            };
        }
        if ready == 0 {
            return Ok(ReadEvent::Timeout);
        }

        let n = unsafe { libc::read(self.fd, self.buf.as_mut_ptr().cast(), self.buf.len()) };
        match n {
            0 => Ok(ReadEvent::Eof),
            n if n < 0 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(ReadEvent::Timeout)
                } else {
                    Err(err)
                }
            }
            #[allow(clippy::cast_sign_loss)] // n > 0 here.
            n => Ok(ReadEvent::Bytes(&self.buf[..n as usize])),
        }
    }

    /// Non-unix fallback: a blocking read with no timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin fails.
    #[cfg(not(unix))]
    pub fn poll_read(&mut self, _timeout_ms: i32) -> io::Result<ReadEvent<'_>> {
        use std::io::Read;

        match io::stdin().lock().read(&mut self.buf[..])? {
            0 => Ok(ReadEvent::Eof),
            n => Ok(ReadEvent::Bytes(&self.buf[..n])),
        }
    }
}

impl Default for StdinReader {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Pipe {
        read: RawFd,
        write: RawFd,
    }

    impl Pipe {
        fn new() -> Self {
            let mut fds = [0 as RawFd; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            Self {
                read: fds[0],
                write: fds[1],
            }
        }

        fn send(&self, bytes: &[u8]) {
            let n = unsafe { libc::write(self.write, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(usize::try_from(n).unwrap(), bytes.len());
        }

        fn close_write(&mut self) {
            unsafe { libc::close(self.write) };
            self.write = -1;
        }
    }

    impl Drop for Pipe {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.read);
                if self.write >= 0 {
                    libc::close(self.write);
                }
            }
        }
    }

    #[test]
    fn read_buf_size_reasonable() {
        assert!(READ_BUF_SIZE >= 1024);
        assert!(READ_BUF_SIZE <= 65536);
    }

    #[test]
    fn timeout_when_nothing_arrives() {
        let pipe = Pipe::new();
        let mut reader = StdinReader::from_fd(pipe.read);
        assert_eq!(reader.poll_read(0).unwrap(), ReadEvent::Timeout);
    }

    #[test]
    fn reads_available_bytes() {
        let pipe = Pipe::new();
        pipe.send(b"\x1b[Ax");
        let mut reader = StdinReader::from_fd(pipe.read);
        assert_eq!(reader.poll_read(100).unwrap(), ReadEvent::Bytes(b"\x1b[Ax"));
        assert_eq!(reader.poll_read(0).unwrap(), ReadEvent::Timeout);
    }

    #[test]
    fn eof_after_writer_closes() {
        let mut pipe = Pipe::new();
        pipe.send(b"q");
        pipe.close_write();
        let mut reader = StdinReader::from_fd(pipe.read);
        assert_eq!(reader.poll_read(100).unwrap(), ReadEvent::Bytes(b"q"));
        assert_eq!(reader.poll_read(100).unwrap(), ReadEvent::Eof);
    }
}
