//! Viewer errors.
//!
//! Like the terminal layer, nothing here is recoverable: the binary reports
//! the error and exits with status 1.

use std::io;
use std::path::PathBuf;

/// Errors raised by the viewer core.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The file named on the command line could not be opened.
    #[error("{}: {source}", path.display())]
    File {
        /// The path as given.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading file content or writing a frame failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
