// SPDX-License-Identifier: MIT
//
// tilde: a minimal raw-mode terminal text viewer.
//
// This is the main binary that wires together the two crates:
//
//   tilde-term → raw mode, window size, key decoding, frame output
//   tilde-view → line buffer, cursor, viewport, frame composition
//
// The Session owns every piece of state and runs one cycle per key:
//
//   scroll viewport → compose frame → one write() → read key → dispatch
//
// Exit paths: Ctrl-Q clears the screen and exits 0. Any error clears the
// screen, drops the raw-mode guard (restoring the tty), prints
// `tilde: <error>` and exits 1. A panic is covered by the guard's drop
// during unwinding and by the panic hook it installs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::Parser;

use tilde_term::TermError;
use tilde_term::ansi;
use tilde_term::input::{Decoder, Key};
use tilde_term::output::{OutputBuffer, TtyOut};
use tilde_term::reader::{ByteSource, StdinSource};
use tilde_term::terminal::{self, RawMode, Size};
use tilde_view::ViewError;
use tilde_view::buffer::LineBuffer;
use tilde_view::cursor::{Cursor, Direction};
use tilde_view::options::Options;
use tilde_view::render::{self, Frame};
use tilde_view::view::Viewport;

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal raw-mode terminal text viewer. Arrow keys, Home/End and
/// Page Up/Down move the cursor; Ctrl-Q quits.
#[derive(Debug, Parser)]
#[command(name = "tilde", about)]
struct Args {
    /// File to view. Without one, an empty buffer is shown. Names that
    /// start with `-` go after `--`.
    file: Option<PathBuf>,

    /// Write diagnostic logs to this file.
    #[arg(long, value_name = "PATH", hide = true)]
    log_file: Option<PathBuf>,
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Anything that ends the program with status 1.
#[derive(Debug, thiserror::Error)]
enum FatalError {
    #[error(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

// ─── Session ────────────────────────────────────────────────────────────────

/// What the loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Quit,
}

/// One interactive viewing session.
///
/// Generic over the byte source and output so tests can script keystrokes
/// and capture frames.
struct Session<S, W> {
    buffer: LineBuffer,
    cursor: Cursor,
    viewport: Viewport,
    options: Options,
    /// Reused for every frame.
    frame: OutputBuffer,
    keys: Decoder<S>,
    out: W,
}

impl<S: ByteSource, W: Write> Session<S, W> {
    fn new(buffer: LineBuffer, size: Size, options: Options, source: S, out: W) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(),
            viewport: Viewport::from_size(size),
            options,
            frame: OutputBuffer::new(),
            keys: Decoder::new(source),
            out,
        }
    }

    /// Scroll to the cursor and draw one frame.
    fn refresh(&mut self) -> io::Result<()> {
        self.viewport.scroll(&self.cursor);

        let frame = Frame {
            buffer: &self.buffer,
            cursor: &self.cursor,
            viewport: &self.viewport,
            welcome: &self.options.welcome,
        };
        render::refresh_screen(&frame, &mut self.frame, &mut self.out)
    }

    /// Apply one key.
    fn dispatch(&mut self, key: Key) -> io::Result<Action> {
        tracing::debug!(?key, "key");

        if key == self.options.quit_key {
            ansi::clear_and_home(&mut self.out)?;
            self.out.flush()?;
            return Ok(Action::Quit);
        }

        let buf = &self.buffer;
        match key {
            Key::Up => self.cursor.step(Direction::Up, buf),
            Key::Down => self.cursor.step(Direction::Down, buf),
            Key::Left => self.cursor.step(Direction::Left, buf),
            Key::Right => self.cursor.step(Direction::Right, buf),
            Key::PageUp => self.cursor.step_n(Direction::Up, self.viewport.rows(), buf),
            Key::PageDown => self.cursor.step_n(Direction::Down, self.viewport.rows(), buf),
            Key::Home => self.cursor.home(),
            Key::End => self.cursor.end(buf),
            // Viewing only: everything else is ignored.
            Key::Delete | Key::Escape | Key::Char(_) => {}
        }

        Ok(Action::Continue)
    }

    /// Render, read one key, dispatch it.
    fn step(&mut self) -> io::Result<Action> {
        self.refresh()?;
        let key = self.keys.read_key()?;
        self.dispatch(key)
    }

    /// Loop until the quit key.
    fn run(&mut self) -> io::Result<()> {
        while self.step()? == Action::Continue {}
        Ok(())
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Install a file-backed subscriber. The terminal itself is in raw mode and
/// owned by the frame renderer, so logs never go to stdout or stderr.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(io::Error::other)
}

/// Run the viewer on the real terminal.
fn run(args: &Args) -> Result<(), FatalError> {
    let mut out = TtyOut::new();
    clear_on_error(&mut out, |out| run_raw(args, out))
}

/// Run `body`, clearing the screen if it fails.
///
/// Anything `body` owns, the raw-mode guard included, is dropped before the
/// screen is cleared.
fn clear_on_error<W: Write>(
    out: &mut W,
    body: impl FnOnce(&mut W) -> Result<(), FatalError>,
) -> Result<(), FatalError> {
    let result = body(out);
    if result.is_err() {
        let _ = ansi::clear_and_home(out);
        let _ = out.flush();
    }
    result
}

/// Enter raw mode and view the file on stdin/stdout.
///
/// The raw-mode guard lives for the whole function, so the terminal is
/// restored on every return path.
fn run_raw(args: &Args, out: &mut TtyOut) -> Result<(), FatalError> {
    let _raw = RawMode::enable()?;
    view(args.file.as_deref(), StdinSource::new(), out)
}

/// Measure the window, load the file, run the session.
fn view<S: ByteSource, W: Write>(
    file: Option<&Path>,
    mut source: S,
    mut out: W,
) -> Result<(), FatalError> {
    let size = terminal::window_size(&mut source, &mut out)?;

    let buffer = match file {
        Some(path) => LineBuffer::open(path)?,
        None => LineBuffer::new(),
    };

    let mut session = Session::new(buffer, size, Options::default(), source, out);
    session.run()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("tilde: {}: {e}", path.display());
            process::exit(1);
        }
    }

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "fatal");
        eprintln!("tilde: {e}");
        process::exit(1);
    }

    tracing::info!("session ended");
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tilde_term::reader::ScriptedSource;

    const UP: &[u8] = b"\x1b[A";
    const DOWN: &[u8] = b"\x1b[B";
    const RIGHT: &[u8] = b"\x1b[C";
    const QUIT: &[u8] = b"\x11";

    // ── Helpers ───────────────────────────────────────────────────────────

    fn numbered(n: usize) -> LineBuffer {
        let mut buf = LineBuffer::new();
        for i in 0..n {
            buf.append_row(format!("line {i}").as_bytes());
        }
        buf
    }

    fn session(
        buffer: LineBuffer,
        rows: u16,
        cols: u16,
        script: ScriptedSource,
    ) -> Session<ScriptedSource, Vec<u8>> {
        Session::new(
            buffer,
            Size::new(rows, cols),
            Options::default(),
            script,
            Vec::new(),
        )
    }

    fn repeat(seq: &[u8], n: usize) -> Vec<u8> {
        seq.repeat(n)
    }

    /// Split the captured output into frames (each starts by hiding the cursor).
    fn frames(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out)
            .split("\x1b[?25l")
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    // ── Quit ──────────────────────────────────────────────────────────────

    #[test]
    fn quit_clears_screen_and_homes_cursor() {
        let mut s = session(LineBuffer::new(), 24, 80, ScriptedSource::new(QUIT));
        s.run().unwrap();

        assert!(s.out.ends_with(b"\x1b[?25h\x1b[2J\x1b[H"));
        assert_eq!(frames(&s.out).len(), 1);
    }

    #[test]
    fn quit_after_idle_timeouts() {
        let script = ScriptedSource::default().timeout().timeout().bytes(QUIT);
        let mut s = session(LineBuffer::new(), 24, 80, script);
        s.run().unwrap();
        assert!(s.out.ends_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn input_failure_ends_the_session_with_an_error() {
        let mut s = session(LineBuffer::new(), 24, 80, ScriptedSource::new(b"j"));
        let err = s.run().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    // ── Frames ────────────────────────────────────────────────────────────

    #[test]
    fn empty_buffer_frame_shows_welcome() {
        let mut s = session(LineBuffer::new(), 24, 80, ScriptedSource::new(QUIT));
        s.run().unwrap();

        let all = frames(&s.out);
        let body = all[0].strip_prefix("\x1b[H").unwrap();
        let rows: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(rows.len(), 24);

        for (y, row) in rows.iter().enumerate() {
            if y == 8 {
                assert!(row.contains(&s.options.welcome), "row 8: {row:?}");
            } else {
                assert!(row.starts_with("~\x1b[K"), "row {y}: {row:?}");
            }
        }
    }

    #[test]
    fn one_frame_per_key() {
        let script = ScriptedSource::new(b"abc").bytes(QUIT);
        let mut s = session(numbered(3), 5, 20, script);
        s.run().unwrap();
        assert_eq!(frames(&s.out).len(), 4);
    }

    #[test]
    fn fifty_lines_fifteen_downs() {
        let mut keys = repeat(DOWN, 15);
        keys.extend_from_slice(QUIT);
        let mut s = session(numbered(50), 10, 80, ScriptedSource::new(&keys));
        s.run().unwrap();

        assert_eq!(s.cursor.cy(), 15);
        assert_eq!(s.viewport.rowoff(), 6);

        let last = frames(&s.out).pop().unwrap();
        assert!(last.starts_with("\x1b[Hline 6\x1b[K\r\n"));
        assert!(last.contains("line 15\x1b[K\x1b[10;1H"));
    }

    #[test]
    fn cursor_stays_visible_through_a_walk() {
        let mut buffer = LineBuffer::new();
        for i in 0..40 {
            buffer.append_row("x".repeat(i * 3).as_bytes());
        }
        let mut s = session(buffer, 6, 16, ScriptedSource::default());

        let walk = [
            (Key::Down, 30),
            (Key::End, 1),
            (Key::Right, 5),
            (Key::Up, 12),
            (Key::PageDown, 2),
            (Key::Home, 1),
            (Key::PageUp, 9),
        ];
        for (key, n) in walk {
            for _ in 0..n {
                assert_eq!(s.dispatch(key).unwrap(), Action::Continue);
                s.refresh().unwrap();
                let (c, v) = (s.cursor, s.viewport);
                assert!(v.rowoff() <= c.cy() && c.cy() < v.rowoff() + v.rows());
                assert!(v.coloff() <= c.cx() && c.cx() < v.coloff() + v.cols());
            }
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn arrows_move_cursor() {
        let mut keys = repeat(DOWN, 2);
        keys.extend(repeat(RIGHT, 3));
        keys.extend_from_slice(UP);
        keys.extend_from_slice(QUIT);
        let mut s = session(numbered(5), 10, 40, ScriptedSource::new(&keys));
        s.run().unwrap();
        assert_eq!((s.cursor.cx(), s.cursor.cy()), (3, 1));
    }

    #[test]
    fn page_down_moves_a_screen() {
        let keys = [b"\x1b[6~".as_slice(), QUIT].concat();
        let mut s = session(numbered(100), 10, 40, ScriptedSource::new(&keys));
        s.run().unwrap();
        assert_eq!(s.cursor.cy(), 10);
        assert_eq!(s.viewport.rowoff(), 1);
    }

    #[test]
    fn page_up_stops_at_top() {
        let keys = [repeat(DOWN, 4).as_slice(), b"\x1b[5~".as_slice(), QUIT].concat();
        let mut s = session(numbered(100), 10, 40, ScriptedSource::new(&keys));
        s.run().unwrap();
        assert_eq!(s.cursor.cy(), 0);
    }

    #[test]
    fn home_and_end() {
        let mut s = session(numbered(3), 10, 40, ScriptedSource::default());
        s.dispatch(Key::End).unwrap();
        assert_eq!(s.cursor.cx(), "line 0".len());
        s.dispatch(Key::Home).unwrap();
        assert_eq!(s.cursor.cx(), 0);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut s = session(numbered(3), 10, 40, ScriptedSource::default());
        for key in [Key::Char(b'x'), Key::Char(b'\r'), Key::Delete, Key::Escape] {
            assert_eq!(s.dispatch(key).unwrap(), Action::Continue);
        }
        assert_eq!(s.cursor, Cursor::new());
        assert!(s.out.is_empty());
    }

    #[test]
    fn unrecognized_sequence_is_harmless() {
        let keys = [b"\x1b[Z".as_slice(), DOWN, QUIT].concat();
        let mut s = session(numbered(3), 10, 40, ScriptedSource::new(&keys));
        s.run().unwrap();
        assert_eq!(s.cursor.cy(), 1);
    }

    // ── Fatal path ────────────────────────────────────────────────────────

    // Cursor position report for the window-size fallback when the test
    // runner has no tty.
    const SIZE_REPLY: &[u8] = b"\x1b[24;80R";

    #[test]
    fn missing_file_clears_screen_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let source = ScriptedSource::new(SIZE_REPLY);

        let mut out = Vec::new();
        let err = clear_on_error(&mut out, |out| view(Some(&missing), source, out)).unwrap_err();

        match &err {
            FatalError::View(ViewError::File { path, source }) => {
                assert_eq!(path, &missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected file error, got {other:?}"),
        }
        assert!(err.to_string().starts_with(&missing.display().to_string()));
        assert!(out.ends_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn input_failure_clears_screen() {
        // The script runs dry after the size reply: the first key read fails.
        let source = ScriptedSource::new(SIZE_REPLY);

        let mut out = Vec::new();
        let err = clear_on_error(&mut out, |out| view(None, source, out)).unwrap_err();

        assert!(matches!(err, FatalError::Io(_)));
        assert!(out.ends_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn success_leaves_screen_alone() {
        let mut out = Vec::new();
        clear_on_error(&mut out, |_| Ok(())).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn view_file_then_quit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first line\nsecond line\n").unwrap();
        let source = ScriptedSource::new(SIZE_REPLY).bytes(QUIT);

        let mut out = Vec::new();
        clear_on_error(&mut out, |out| view(Some(file.path()), source, out)).unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("first line"));
        assert!(out.ends_with(b"\x1b[2J\x1b[H"));
    }

    // ── Command line ──────────────────────────────────────────────────────

    #[test]
    fn args_without_file() {
        let args = Args::try_parse_from(["tilde"]).unwrap();
        assert!(args.file.is_none());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn args_with_file() {
        let args = Args::try_parse_from(["tilde", "notes.txt"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn args_file_with_leading_hyphen_after_separator() {
        let args = Args::try_parse_from(["tilde", "--", "-notes.txt"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("-notes.txt")));
    }

    #[test]
    fn args_have_no_version_flag() {
        assert!(Args::try_parse_from(["tilde", "--version"]).is_err());
    }

    #[test]
    fn args_reject_extra_positionals() {
        assert!(Args::try_parse_from(["tilde", "a", "b"]).is_err());
    }

    #[test]
    fn args_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
