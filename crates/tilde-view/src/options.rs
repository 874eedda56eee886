//! Viewer options.
//!
//! The handful of knobs the session consults instead of scattering literals
//! through the key dispatch and the renderer. There is no config file and no
//! environment lookup; [`Options::default`] is what the binary uses.
//!
//! | Option        | Default                              |
//! |---------------|--------------------------------------|
//! | `quit_key`    | Ctrl-Q                               |
//! | `welcome`     | `tilde viewer -- version <version>`  |

use tilde_term::input::Key;

/// Tunable viewer behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// The key that ends the session.
    pub quit_key: Key,

    /// Banner shown a third of the way down an empty buffer.
    pub welcome: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quit_key: Key::ctrl(b'q'),
            welcome: format!("tilde viewer -- version {}", env!("CARGO_PKG_VERSION")),
        }
    }
}
