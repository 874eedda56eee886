// SPDX-License-Identifier: MIT
//
// Terminal-layer errors.
//
// Every failure here is fatal to the viewer: the binary clears the screen,
// restores the terminal, prints the error and exits 1. The variants exist so
// that diagnostic reads well, not so callers can recover.

use std::io;

/// Errors raised while controlling the terminal device.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// `tcgetattr` / `tcsetattr` failed.
    #[error("{call}: {source}")]
    Attributes {
        /// The libc call that failed.
        call: &'static str,
        #[source]
        source: io::Error,
    },

    /// Neither `TIOCGWINSZ` nor the cursor position report produced a size.
    #[error("unable to determine window size")]
    WindowSize,

    /// stdin is not connected to a terminal, so raw mode is meaningless.
    #[error("stdin is not a terminal")]
    NotATty,

    /// A read or write failed for a reason other than "no data yet".
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, TermError>;
