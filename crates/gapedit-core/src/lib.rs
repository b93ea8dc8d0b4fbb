//! # gapedit-core — Editing core for gapedit
//!
//! Pure editing logic with no device I/O:
//!
//! - **[`gap_buffer`]** — `GapBuffer`, one line's bytes around a movable gap
//! - **[`document`]** — `Document`, an arena-backed doubly-linked list of lines
//! - **[`cursor`]** — `Cursor` navigation and cursor-relative edits
//! - **[`viewport`]** — `Viewport` scroll offsets that follow the cursor
//! - **[`render`]** — `RenderPlanner` producing a `FrameModel` for the terminal
//! - **[`input`]** — byte-stream decoding into `Input` events
//! - **[`editor`]** — `Editor`, the session tying the pieces together
//! - **[`options`]** — display options and the fixed tab width
//! - **[`position`]** — `Position` and `ScreenPos`, 0-indexed
//! - **[`error`]** — `EditError` and the crate `Result`

pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod gap_buffer;
pub mod input;
pub mod options;
pub mod position;
pub mod render;
pub mod viewport;

pub use error::{EditError, Result};
