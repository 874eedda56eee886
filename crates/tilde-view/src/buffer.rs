//! Line buffer: the file's lines, held in memory.
//!
//! A `LineBuffer` is an ordered list of [`Row`]s in file order. Rows are raw
//! bytes: no UTF-8 validation, no tab expansion, nothing but the line
//! terminator stripped. The viewer never edits text, so rows are immutable
//! once appended.
//!
//! # Loading
//!
//! [`LineBuffer::from_reader`] splits on `\n` and strips every trailing
//! `\n` / `\r`, so LF and CRLF files (and stray CRs before the newline) all
//! load the same way. Every line becomes a row, including a final line with
//! no terminator; a trailing terminator does not add an empty row.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ViewError;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the source file, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    bytes: Vec<u8>,
}

impl Row {
    /// Create a row from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The row's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes. Also the largest valid cursor column on this row.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the row is an empty line.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The part of the row visible through a window starting at column
    /// `start` and `width` columns wide.
    ///
    /// Clamped to the row: a window entirely past the end yields an empty
    /// slice rather than panicking.
    #[must_use]
    pub fn visible(&self, start: usize, width: usize) -> &[u8] {
        let start = start.min(self.bytes.len());
        let end = start.saturating_add(width).min(self.bytes.len());
        &self.bytes[start..end]
    }
}

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// The file's rows, in file order.
///
/// Index `i` is valid iff `i < num_rows()`.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    rows: Vec<Row>,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Load rows from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut buf = Self::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            buf.append_row(&line);
        }

        Ok(buf)
    }

    /// Load a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::File`] if the file cannot be opened, or
    /// [`ViewError::Io`] if reading it fails partway.
    pub fn open(path: &Path) -> Result<Self, ViewError> {
        let file = File::open(path).map_err(|source| ViewError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let buf = Self::from_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), rows = buf.num_rows(), "file loaded");
        Ok(buf)
    }

    /// Append one row at the end.
    pub fn append_row(&mut self, bytes: &[u8]) {
        self.rows.push(Row::new(bytes));
    }

    // -- Access -------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were loaded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Length of the row at `index`, or 0 if there is no such row.
    #[inline]
    #[must_use]
    pub fn row_len(&self, index: usize) -> usize {
        self.row(index).map_or(0, Row::len)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn load(text: &[u8]) -> LineBuffer {
        LineBuffer::from_reader(text).unwrap()
    }

    fn contents(buf: &LineBuffer) -> Vec<String> {
        buf.rows()
            .iter()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
            .collect()
    }

    // -- Row ----------------------------------------------------------------

    #[test]
    fn row_len_and_bytes() {
        let row = Row::new(&b"hello"[..]);
        assert_eq!(row.len(), 5);
        assert_eq!(row.as_bytes(), b"hello");
        assert!(!row.is_empty());
    }

    #[test]
    fn visible_inside_row() {
        let row = Row::new(&b"0123456789"[..]);
        assert_eq!(row.visible(0, 4), b"0123");
        assert_eq!(row.visible(3, 4), b"3456");
    }

    #[test]
    fn visible_clamps_at_end() {
        let row = Row::new(&b"0123456789"[..]);
        assert_eq!(row.visible(8, 80), b"89");
    }

    #[test]
    fn visible_scrolled_past_is_empty() {
        let row = Row::new(&b"short"[..]);
        assert_eq!(row.visible(5, 80), b"");
        assert_eq!(row.visible(40, 80), b"");
    }

    #[test]
    fn visible_huge_width_does_not_overflow() {
        let row = Row::new(&b"abc"[..]);
        assert_eq!(row.visible(1, usize::MAX), b"bc");
    }

    // -- Loading ------------------------------------------------------------

    #[test]
    fn empty_input_has_no_rows() {
        let buf = load(b"");
        assert!(buf.is_empty());
        assert_eq!(buf.num_rows(), 0);
    }

    #[test]
    fn lf_lines() {
        let buf = load(b"one\ntwo\nthree\n");
        assert_eq!(contents(&buf), vec!["one", "two", "three"]);
    }

    #[test]
    fn first_line_is_kept() {
        let buf = load(b"first\nsecond\n");
        assert_eq!(buf.row(0).unwrap().as_bytes(), b"first");
    }

    #[test]
    fn crlf_lines() {
        let buf = load(b"one\r\ntwo\r\n");
        assert_eq!(contents(&buf), vec!["one", "two"]);
    }

    #[test]
    fn trailing_cr_run_is_stripped() {
        let buf = load(b"x\r\r\n");
        assert_eq!(contents(&buf), vec!["x"]);
    }

    #[test]
    fn last_line_without_newline() {
        let buf = load(b"a\nb");
        assert_eq!(contents(&buf), vec!["a", "b"]);
    }

    #[test]
    fn blank_lines_are_rows() {
        let buf = load(b"\n\n\n");
        assert_eq!(buf.num_rows(), 3);
        assert!(buf.rows().iter().all(Row::is_empty));
    }

    #[test]
    fn binary_bytes_pass_through() {
        let buf = load(b"\x00\xff\x1b[31m\n");
        assert_eq!(buf.row(0).unwrap().as_bytes(), b"\x00\xff\x1b[31m");
    }

    #[test]
    fn n_lines_make_n_rows() {
        let text: String = (0..137).map(|i| format!("line {i}\r\n")).collect();
        let buf = load(text.as_bytes());
        assert_eq!(buf.num_rows(), 137);
        for i in 0..137 {
            assert_eq!(buf.row(i).unwrap().as_bytes(), format!("line {i}").as_bytes());
        }
    }

    #[test]
    fn row_out_of_range() {
        let buf = load(b"only\n");
        assert!(buf.row(1).is_none());
        assert_eq!(buf.row_len(0), 4);
        assert_eq!(buf.row_len(1), 0);
    }

    #[test]
    fn append_row_grows_by_one() {
        let mut buf = LineBuffer::new();
        buf.append_row(b"a");
        buf.append_row(b"a");
        assert_eq!(buf.num_rows(), 2);
        assert_eq!(contents(&buf), vec!["a", "a"]);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"alpha\nbeta\n").unwrap();

        let buf = LineBuffer::open(file.path()).unwrap();
        assert_eq!(contents(&buf), vec!["alpha", "beta"]);
    }

    #[test]
    fn open_missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        match LineBuffer::open(&missing) {
            Err(ViewError::File { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected file error, got {other:?}"),
        }
    }
}
