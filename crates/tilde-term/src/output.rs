// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Frame output buffering.
//
// Every byte of a frame (cursor hide, row text, erase-line sequences, the
// final cursor placement) goes into one `OutputBuffer`. A single flush at
// frame end hands the whole frame to the terminal in one `write()`, so the
// user never sees a half-drawn screen.
//
// The buffer is owned by the session and reused: `clear()` keeps the
// allocation, so after the first frame no further allocation happens unless
// the terminal grows.
//
// `TtyOut` is the other half: Rust's `Stdout` is line-buffered and would
// split a frame at its last `\r\n`, so frames go straight to fd 1 instead.

use std::io::{self, Write};

/// Default capacity: 16 KB, a full 200×50 screen of text plus escapes.
const DEFAULT_CAPACITY: usize = 16_384;

/// A byte buffer that accumulates one frame for a single `write()` syscall.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Current allocation size. Stable across frames of the same size.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Append raw bytes (row content is passed through unmodified).
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` in one call, then clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── TtyOut ──────────────────────────────────────────────────────────────────

/// Unbuffered writer on stdout's file descriptor.
///
/// One `write_all` of a frame is one `write()` syscall unless the kernel
/// accepts only part of it, in which case the rest follows immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyOut;

impl TtyOut {
    /// Create a writer on fd 1.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl Write for TtyOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        // Negative means failure, with the reason in errno.
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for TtyOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
