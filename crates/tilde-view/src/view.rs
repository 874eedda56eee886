//! Viewport: which part of the buffer is on screen.
//!
//! The viewport is the rectangle of buffer cells the terminal shows: its
//! top-left corner is `(coloff, rowoff)` in buffer coordinates and its size
//! is the terminal's. The only policy here is [`Viewport::scroll`], run once
//! per frame before drawing, which moves the rectangle the minimum distance
//! needed to contain the cursor.
//!
//! ```text
//!   buffer                       screen
//!   ┌──────────────────────┐
//!   │ row 0                │
//!   │ ...     rowoff ──────┼──▶ ┌──────────┐ y = 0
//!   │         ┊ coloff     │    │          │
//!   │         ┊            │    │  cursor  │
//!   │         ┊            │    └──────────┘ y = rows - 1
//!   │ row n-1              │
//!   └──────────────────────┘
//! ```

use tilde_term::terminal::Size;

use crate::cursor::Cursor;

/// Scroll offsets plus the screen dimensions they apply to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible buffer row.
    rowoff: usize,

    /// First visible byte column.
    coloff: usize,

    /// Screen height in rows.
    rows: usize,

    /// Screen width in columns.
    cols: usize,
}

impl Viewport {
    /// A viewport of `rows × cols` cells scrolled to the origin.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            rowoff: 0,
            coloff: 0,
            rows,
            cols,
        }
    }

    /// A viewport matching the terminal size.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(size.rows as usize, size.cols as usize)
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible buffer row.
    #[inline]
    #[must_use]
    pub const fn rowoff(&self) -> usize {
        self.rowoff
    }

    /// First visible byte column.
    #[inline]
    #[must_use]
    pub const fn coloff(&self) -> usize {
        self.coloff
    }

    /// Screen height in rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Screen width in columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Set both scroll offsets directly.
    pub const fn set_offsets(&mut self, rowoff: usize, coloff: usize) {
        self.rowoff = rowoff;
        self.coloff = coloff;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the offsets so the cursor is inside the viewport.
    ///
    /// Afterwards `rowoff <= cy < rowoff + rows` and
    /// `coloff <= cx < coloff + cols`. Offsets move only as far as needed,
    /// so calling this again without moving the cursor changes nothing.
    /// A zero-sized viewport is left alone.
    pub fn scroll(&mut self, cursor: &Cursor) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }

        let before = (self.rowoff, self.coloff);
        let (cx, cy) = (cursor.cx(), cursor.cy());

        // Vertical: cursor must be within [rowoff, rowoff + rows)
        if cy < self.rowoff {
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.rows {
            self.rowoff = cy - self.rows + 1;
        }

        // Horizontal: cursor must be within [coloff, coloff + cols)
        if cx < self.coloff {
            self.coloff = cx;
        }
        if cx >= self.coloff + self.cols {
            self.coloff = cx - self.cols + 1;
        }

        if before != (self.rowoff, self.coloff) {
            tracing::debug!(rowoff = self.rowoff, coloff = self.coloff, "viewport scrolled");
        }
    }

    /// Where the cursor lands on screen, 0-indexed `(x, y)`.
    ///
    /// Only meaningful after [`scroll`](Self::scroll).
    #[must_use]
    pub const fn screen_position(&self, cursor: &Cursor) -> (usize, usize) {
        (
            cursor.cx().saturating_sub(self.coloff),
            cursor.cy().saturating_sub(self.rowoff),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
