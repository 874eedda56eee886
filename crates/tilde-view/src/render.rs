//! Frame rendering: one full screen image per refresh.
//!
//! A frame is composed into the session's [`OutputBuffer`] and handed to the
//! terminal in a single write:
//!
//! ```text
//! ESC[?25l  ESC[H                 hide cursor, go home
//! <row 0> ESC[K \r\n              for each screen row:
//! <row 1> ESC[K \r\n                buffer slice, '~', or welcome banner
//! ...                               then erase the rest of the line
//! <row n-1> ESC[K                 no line break after the last row
//! ESC[y;xH  ESC[?25h              place cursor, show it
//! ```
//!
//! Cost is bounded by the screen size: only the rows in the viewport are
//! touched, however long the file is.

use std::io::{self, Write};

use tilde_term::ansi;
use tilde_term::output::OutputBuffer;

use crate::buffer::LineBuffer;
use crate::cursor::Cursor;
use crate::view::Viewport;

/// Everything a frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub buffer: &'a LineBuffer,
    pub cursor: &'a Cursor,
    pub viewport: &'a Viewport,
    /// Banner for the empty-buffer screen.
    pub welcome: &'a str,
}

impl Frame<'_> {
    /// Append the visible rows to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out` (none for an in-memory buffer).
    pub fn draw_rows(&self, out: &mut OutputBuffer) -> io::Result<()> {
        let rows = self.viewport.rows();
        let cols = self.viewport.cols();
        let banner_row = rows / 3;

        for y in 0..rows {
            let filerow = y + self.viewport.rowoff();

            if let Some(row) = self.buffer.row(filerow) {
                out.push_bytes(row.visible(self.viewport.coloff(), cols));
            } else if self.buffer.is_empty() && y == banner_row {
                self.draw_welcome(out, cols);
            } else {
                out.push(b'~');
            }

            ansi::erase_line(out)?;
            if y + 1 < rows {
                out.push_bytes(b"\r\n");
            }
        }

        Ok(())
    }

    /// Centered banner, truncated to the screen width, with the row's `~`
    /// kept in the first column when there is room for it.
    fn draw_welcome(&self, out: &mut OutputBuffer, cols: usize) {
        let text = self.welcome.as_bytes();
        let text = &text[..text.len().min(cols)];

        let mut padding = (cols - text.len()) / 2;
        if padding > 0 {
            out.push(b'~');
            padding -= 1;
        }
        for _ in 0..padding {
            out.push(b' ');
        }
        out.push_bytes(text);
    }

    /// Compose a complete frame into `out`, replacing whatever it held.
    ///
    /// The viewport should already have been scrolled to the cursor.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out` (none for an in-memory buffer).
    pub fn compose(&self, out: &mut OutputBuffer) -> io::Result<()> {
        out.clear();
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(out)?;

        let (x, y) = self.viewport.screen_position(self.cursor);
        ansi::cursor_to(out, x, y)?;
        ansi::cursor_show(out)
    }
}

/// Compose a frame and write it to `w` in one call.
///
/// `out` is the session's reusable frame buffer; it is empty again when
/// this returns successfully.
///
/// # Errors
///
/// Returns an error if writing to `w` fails.
pub fn refresh_screen(frame: &Frame<'_>, out: &mut OutputBuffer, w: &mut impl Write) -> io::Result<()> {
    frame.compose(out)?;
    out.flush_to(w)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
