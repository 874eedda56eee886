// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys. Every byte except ESC is a key
// on its own (printable characters and control codes alike). ESC starts a
// short escape sequence that may name a composite key:
//
//   ESC [ A/B/C/D        arrows
//   ESC [ H / ESC [ F    Home / End
//   ESC O H / ESC O F    Home / End (application cursor mode)
//   ESC [ n ~            1/7 Home, 3 Delete, 4/8 End, 5 PageUp, 6 PageDown
//
// # Design
//
// Classification is a pure function over the bytes seen after ESC
// ([`decode_sequence`]), which answers either "this is key K" or "I need
// another byte". The I/O side ([`Decoder::read_key`]) feeds it one byte at
// a time from a [`ByteSource`]. If the source times out while the machine
// still wants a byte, the sequence resolves to a bare [`Key::Escape`]. The
// lookahead is at most three bytes, so a sequence can never stall the loop
// for more than three read timeouts.

use std::io;

use crate::reader::ByteSource;

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1b;

/// Longest escape tail we ever look at: `[`, a digit, `~`.
const MAX_LOOKAHEAD: usize = 3;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any single byte other than ESC: printable characters, control codes
    /// (Ctrl-letter arrives as `letter & 0x1f`), and non-ASCII bytes.
    Char(u8),
    /// A bare ESC, or an escape sequence we don't recognize.
    Escape,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
}

impl Key {
    /// The key produced by holding Ctrl with `letter`.
    ///
    /// ```
    /// use tilde_term::input::Key;
    /// assert_eq!(Key::ctrl(b'q'), Key::Char(0x11));
    /// ```
    #[inline]
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self::Char(letter & 0x1f)
    }
}

// ─── Pure classification ────────────────────────────────────────────────────

/// What the decoder knows after looking at the bytes following an ESC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    /// The sequence is resolved.
    Key(Key),
    /// One more byte is needed before anything can be decided.
    NeedMore,
}

/// Classify the bytes that followed an ESC.
///
/// `tail` excludes the ESC itself. Two bytes are always consumed before a
/// decision; a third is needed only for `ESC [ digit`. Anything we don't
/// recognize resolves to [`Key::Escape`].
#[must_use]
pub const fn decode_sequence(tail: &[u8]) -> Lookahead {
    match *tail {
        [] | [_] => Lookahead::NeedMore,

        [b'[', b'0'..=b'9'] => Lookahead::NeedMore,
        [b'[', b'0'..=b'9', b'~'] => Lookahead::Key(tilde_key(tail[1])),
        [b'[', b'0'..=b'9', _] => Lookahead::Key(Key::Escape),

        [b'[', final_byte] => Lookahead::Key(match final_byte {
            b'A' => Key::Up,
            b'B' => Key::Down,
            b'C' => Key::Right,
            b'D' => Key::Left,
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        }),

        [b'O', b'H'] => Lookahead::Key(Key::Home),
        [b'O', b'F'] => Lookahead::Key(Key::End),

        _ => Lookahead::Key(Key::Escape),
    }
}

/// Map the digit of an `ESC [ n ~` sequence.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Reads logical keys from a byte source.
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
}

impl<S: ByteSource> Decoder<S> {
    /// Wrap a byte source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Direct access to the underlying source, for reading bytes the
    /// decoder has not consumed.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Wait for and decode one key.
    ///
    /// Timeouts before the first byte are retried indefinitely: that is
    /// the idle loop. A timeout inside an escape sequence ends the sequence
    /// as [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// Returns any read error other than "no data yet".
    pub fn read_key(&mut self) -> io::Result<Key> {
        let first = loop {
            if let Some(byte) = self.source.read_byte()? {
                break byte;
            }
        };

        if first != ESC {
            return Ok(Key::Char(first));
        }

        let mut tail = [0u8; MAX_LOOKAHEAD];
        let mut len = 0;

        loop {
            match decode_sequence(&tail[..len]) {
                Lookahead::Key(key) => {
                    if key == Key::Escape {
                        tracing::trace!(tail = ?&tail[..len], "unrecognized escape sequence");
                    }
                    return Ok(key);
                }
                Lookahead::NeedMore => {
                    debug_assert!(len < MAX_LOOKAHEAD);
                    match self.source.read_byte()? {
                        Some(byte) => {
                            tail[len] = byte;
                            len += 1;
                        }
                        None => return Ok(Key::Escape),
                    }
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
