// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII restoration.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control, with no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// `RawMode` is a scoped guard: constructing it captures the original
// termios and switches the tty to raw input; dropping it puts the original
// attributes back. Because the guard is owned by the session, every way out
// of the program (quit key, a fatal error propagating through `?`, a panic
// unwinding the stack) passes through `Drop` exactly once.
//
// A panic hook covers the case where unwinding never reaches the guard
// (panic = "abort", or a panic while the guard is being dropped). The saved
// attributes live in one mutex-guarded slot that both paths take from, so
// whichever runs first restores and the other finds the slot empty.

use std::io::{self, Write};
use std::sync::{Mutex, Once, PoisonError};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::reader::ByteSource;

/// How far the size fallback pushes the cursor right and down. Terminals
/// clamp at the edge, so any value larger than a real screen works.
const FAR_CORNER: u16 = 999;

/// Longest cursor position report we accept (`ESC [ rows ; cols R`).
const REPORT_MAX: usize = 31;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    /// Build a size from rows and columns.
    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Whether both dimensions are non-zero.
    #[inline]
    #[must_use]
    pub const fn is_usable(self) -> bool {
        self.rows > 0 && self.cols > 0
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    let size = Size::new(ws.ws_row, ws.ws_col);
    (result == 0 && size.is_usable()).then_some(size)
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Determine the window size.
///
/// Tries `TIOCGWINSZ` first. If that is unavailable, pushes the cursor to
/// the bottom-right corner and asks the terminal where it ended up. The
/// reply is read through `input`, so raw mode must already be enabled.
///
/// # Errors
///
/// Returns [`TermError::WindowSize`] if neither method yields a usable size,
/// or an I/O error if writing the query or reading the reply fails.
pub fn window_size(input: &mut impl ByteSource, output: &mut impl Write) -> Result<Size> {
    if let Some(size) = ioctl_size() {
        tracing::info!(rows = size.rows, cols = size.cols, "window size from ioctl");
        return Ok(size);
    }

    tracing::warn!("TIOCGWINSZ unavailable, asking the terminal for its cursor position");
    let size = size_from_cursor_report(input, output)?;
    tracing::info!(rows = size.rows, cols = size.cols, "window size from cursor report");
    Ok(size)
}

/// The fallback half of [`window_size`]: move far, ask, parse.
///
/// # Errors
///
/// Returns [`TermError::WindowSize`] if the reply is missing or malformed.
pub fn size_from_cursor_report(
    input: &mut impl ByteSource,
    output: &mut impl Write,
) -> Result<Size> {
    ansi::cursor_far_corner(output, FAR_CORNER)?;
    ansi::request_cursor_position(output)?;
    output.flush()?;

    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => reply.push(byte),
        }
    }

    parse_cursor_report(&reply).ok_or(TermError::WindowSize)
}

/// Parse a cursor position report body: `ESC [ rows ; cols`, with or
/// without the terminating `R`.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;

    let size = Size::new(rows.parse().ok()?, cols.parse().ok()?);
    size.is_usable().then_some(size)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Original termios, present while raw mode is in effect.
///
/// This is the only copy. The [`RawMode`] guard and the panic hook both
/// take from it, so the attributes are written back at most once.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn lock_backup() -> std::sync::MutexGuard<'static, Option<libc::termios>> {
    TERMIOS_BACKUP.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Take the saved attributes, leaving the slot empty.
#[cfg(unix)]
fn take_backup() -> Option<libc::termios> {
    lock_backup().take()
}

/// Restore termios from the global backup and clear it. Best-effort.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Some(original) = take_backup() {
        unsafe {
            let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original);
        }
    }
}

/// Screen cleanup written by the panic hook: clear, home, show cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard. Ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// The cleanup bytes go straight to fd 1, bypassing Rust's stdout lock in
/// case the panic happened while a frame was being flushed.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Exclusive raw-mode control of the terminal, released on drop.
///
/// # Example
///
/// ```no_run
/// use tilde_term::terminal::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... read keys, draw frames ...
/// drop(raw); // original attributes are back
/// # Ok::<(), tilde_term::TermError>(())
/// ```
pub struct RawMode {
    _private: (),
}

impl RawMode {
    /// Capture the current attributes and switch stdin to raw mode.
    ///
    /// Input: no break-to-SIGINT, no CR→NL, no parity check, no bit
    /// stripping, no XON/XOFF. Output: no post-processing (we emit `\r\n`
    /// ourselves). Local: no echo, no canonical line editing, no Ctrl-V, no
    /// signal keys. Reads return after 100ms with whatever arrived.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::NotATty`] if stdin is not a terminal, or
    /// [`TermError::Attributes`] if `tcgetattr`/`tcsetattr` fails.
    #[cfg(unix)]
    pub fn enable() -> Result<Self> {
        if !is_tty() {
            return Err(TermError::NotATty);
        }

        install_panic_hook();

        let fd = libc::STDIN_FILENO;
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(TermError::Attributes {
                call: "tcgetattr",
                source: io::Error::last_os_error(),
            });
        }

        *lock_backup() = Some(termios);

        termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        termios.c_oflag &= !libc::OPOST;
        termios.c_cflag |= libc::CS8;
        termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

        // VMIN=0, VTIME=1: read() returns after 100ms even with no input.
        termios.c_cc[libc::VMIN] = 0;
        termios.c_cc[libc::VTIME] = 1;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            let source = io::Error::last_os_error();
            restore_termios_from_backup();
            return Err(TermError::Attributes {
                call: "tcsetattr",
                source,
            });
        }

        tracing::debug!("raw mode enabled");
        Ok(Self { _private: () })
    }

    #[cfg(not(unix))]
    pub fn enable() -> Result<Self> {
        Err(TermError::NotATty)
    }

    /// Whether the original attributes are still waiting to be restored.
    ///
    /// False once either [`restore`](Self::restore) or the panic hook has
    /// put them back.
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            lock_backup().is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Restore the original attributes now instead of at drop.
    ///
    /// Idempotent: the second and later calls do nothing, and so does a
    /// call after the panic hook has already restored the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Attributes`] if `tcsetattr` fails. The guard
    /// is considered released either way.
    #[cfg(unix)]
    pub fn restore(&mut self) -> Result<()> {
        let Some(original) = take_backup() else {
            return Ok(());
        };

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) }
            != 0
        {
            return Err(TermError::Attributes {
                call: "tcsetattr",
                source: io::Error::last_os_error(),
            });
        }

        tracing::debug!("raw mode disabled");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn restore(&mut self) -> Result<()> {
        Ok(())
    }
}

// libc::termios has no Debug without libc's `extra_traits`.
impl std::fmt::Debug for RawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!(error = %e, "failed to restore terminal attributes");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
