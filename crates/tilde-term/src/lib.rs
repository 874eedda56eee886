// SPDX-License-Identifier: MIT
//
// tilde-term: terminal layer for the tilde viewer.
//
// Direct terminal control via raw termios and ANSI escape sequences: a
// scoped raw-mode guard, window size discovery, a byte-at-a-time input
// source with a bounded wait, a key decoder for the escape sequences
// terminals send for navigation keys, and a frame buffer that reaches the
// terminal in one write.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::TermError;
