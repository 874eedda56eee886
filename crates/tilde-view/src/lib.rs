//! # tilde-view: viewer core for tilde
//!
//! The pieces between the terminal and the file:
//!
//! - **[`buffer`]**: `LineBuffer` of immutable byte `Row`s, loaded from a file
//! - **[`cursor`]**: `Cursor` with clamped single-step movement
//! - **[`view`]**: `Viewport` scroll offsets that follow the cursor
//! - **[`render`]**: composes one full frame into an output buffer
//! - **[`options`]**: the quit key and welcome banner

pub mod buffer;
pub mod cursor;
pub mod error;
pub mod options;
pub mod render;
pub mod view;

pub use error::ViewError;
