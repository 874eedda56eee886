//! Cursor: position tracking and movement within the line buffer.
//!
//! The cursor lives in buffer coordinates: `cy` is a row index, `cx` a byte
//! column within that row. Two positions are allowed past the content:
//!
//! - `cx == row.len()`: just after the last byte of the row.
//! - `cy == num_rows`: the line after the last row, where `cx` is always 0.
//!
//! Movement never wraps across lines. After a vertical move the column
//! snaps back to the new row's length if it would otherwise sit beyond it,
//! so `cx <= row_len(cy)` holds after every operation.

use crate::buffer::LineBuffer;

/// Direction of a single-step cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor in a line buffer.
///
/// Lightweight value type. It does not own or reference the buffer; the
/// buffer is passed to movement methods as a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    cx: usize,
    cy: usize,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { cx: 0, cy: 0 }
    }

    /// Create a cursor at column `cx` of row `cy`.
    ///
    /// The caller is responsible for the position being valid for the
    /// buffer it will be used with.
    #[must_use]
    pub const fn at(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }

    // -- Accessors ----------------------------------------------------------

    /// Column (byte offset within the row).
    #[inline]
    #[must_use]
    pub const fn cx(&self) -> usize {
        self.cx
    }

    /// Row index.
    #[inline]
    #[must_use]
    pub const fn cy(&self) -> usize {
        self.cy
    }

    // -- Movement -----------------------------------------------------------

    /// Move one step in `dir`, clamped to the buffer.
    ///
    /// - Left stops at column 0.
    /// - Right stops at the row's length, and doesn't move at all past the
    ///   last row.
    /// - Up stops at row 0; Down stops at `num_rows`.
    pub fn step(&mut self, dir: Direction, buf: &LineBuffer) {
        match dir {
            Direction::Left => {
                self.cx = self.cx.saturating_sub(1);
            }
            Direction::Right => {
                if let Some(row) = buf.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    }
                }
            }
            Direction::Up => {
                self.cy = self.cy.saturating_sub(1);
            }
            Direction::Down => {
                if self.cy < buf.num_rows() {
                    self.cy += 1;
                }
            }
        }

        if matches!(dir, Direction::Up | Direction::Down) {
            self.snap_to_row(buf);
        }
    }

    /// Move `count` vertical steps. Used for Page Up / Page Down, where
    /// `count` is the viewport height.
    pub fn step_n(&mut self, dir: Direction, count: usize, buf: &LineBuffer) {
        for _ in 0..count {
            self.step(dir, buf);
        }
    }

    /// Jump to column 0.
    pub const fn home(&mut self) {
        self.cx = 0;
    }

    /// Jump to the end of the current row (0 past the last row).
    pub fn end(&mut self, buf: &LineBuffer) {
        self.cx = buf.row_len(self.cy);
    }

    /// Pull `cx` back inside the current row.
    fn snap_to_row(&mut self, buf: &LineBuffer) {
        self.cx = self.cx.min(buf.row_len(self.cy));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
