// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources: where the key decoder gets its input.
//
// In raw mode we configure the tty with VMIN=0 / VTIME=1, so a `read()` on
// stdin returns after at most 100ms, with zero bytes if the user typed
// nothing. That bounded wait is the only suspension point in the whole
// program: the session loop stays single-threaded and never blocks forever.
//
// The decoder only needs "give me one byte, or tell me none arrived in
// time", which is the `ByteSource` trait. `StdinSource` is the real tty;
// `ScriptedSource` replays a fixed byte script so the decoder and the
// session can be driven deterministically in tests.

use std::collections::VecDeque;
use std::io;

/// A source of single input bytes with a bounded wait.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// Returns `Ok(None)` when no byte arrived within the source's timeout.
    /// That is the normal idle condition, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── StdinSource ────────────────────────────────────────────────────────────

/// Reads stdin one byte at a time, relying on the tty's VTIME timeout.
///
/// Bypasses Rust's buffered `Stdin`: the key decoder needs to see exactly
/// what the terminal delivered and when, not whatever a read-ahead buffer
/// happened to collect.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    /// Create a source reading from fd 0.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                // EAGAIN (Cygwin reports the timeout this way) and EINTR
                // both mean "nothing yet".
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ─── ScriptedSource ─────────────────────────────────────────────────────────

/// A byte source that replays a fixed script.
///
/// Each step is either a byte or a timeout. Once the script is exhausted,
/// reads fail with [`io::ErrorKind::UnexpectedEof`], so a test that forgets
/// to send its quit key fails instead of spinning forever.
///
/// ```
/// use tilde_term::reader::{ByteSource, ScriptedSource};
///
/// let mut src = ScriptedSource::new(b"\x1b").timeout().bytes(b"q");
/// assert_eq!(src.read_byte().unwrap(), Some(0x1b));
/// assert_eq!(src.read_byte().unwrap(), None);
/// assert_eq!(src.read_byte().unwrap(), Some(b'q'));
/// assert!(src.read_byte().is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    steps: VecDeque<Option<u8>>,
}

impl ScriptedSource {
    /// Start a script with the given bytes.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self::default().bytes(bytes)
    }

    /// Append more bytes to the script.
    #[must_use]
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.steps.extend(bytes.iter().copied().map(Some));
        self
    }

    /// Append one read timeout (a read that returns no byte).
    #[must_use]
    pub fn timeout(mut self) -> Self {
        self.steps.push_back(None);
        self
    }

    /// Steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.steps.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted")
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
