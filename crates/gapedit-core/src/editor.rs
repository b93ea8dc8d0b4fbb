//! Editor session — document, cursor, and viewport driven by input.
//!
//! An [`Editor`] owns the [`Document`] and the non-owning [`Cursor`] and
//! [`Viewport`] that look into it. [`apply`](Editor::apply) processes one
//! decoded [`Input`] to completion: mutate, reclamp the viewport, and report
//! whether a re-render is due. Nothing here touches a device; the terminal
//! layer asks for a [`FrameModel`] via [`frame`](Editor::frame).

use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::document::Document;
use crate::error::Result;
use crate::input::{Input, InputDecoder};
use crate::options::Options;
use crate::position::Position;
use crate::render::{FrameModel, RenderPlanner};
use crate::viewport::Viewport;

/// Outcome of applying one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// State changed; the screen should be redrawn.
    Redraw,
    /// Nothing changed (boundary no-op or ignored input).
    Unchanged,
    /// The session should end.
    Quit,
}

/// A single editing session.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    cursor: Cursor,
    viewport: Viewport,
    options: Options,
    decoder: InputDecoder,
}

impl Editor {
    /// Start a session on `doc` with the cursor at the origin.
    #[must_use]
    pub fn new(doc: Document, width: u16, height: u16, options: Options) -> Self {
        let cursor = Cursor::new(&doc);
        let viewport = Viewport::new(width, height, options.effective_gutter());
        Self {
            doc,
            cursor,
            viewport,
            options,
            decoder: InputDecoder::new(),
        }
    }

    /// Load `text` and start a session on it.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`](crate::error::EditError::Allocation) if a
    /// line buffer could not be allocated.
    pub fn from_text(text: &[u8], width: u16, height: u16, options: Options) -> Result<Self> {
        let doc = Document::load_with_gap(text, options.initial_gap)?;
        debug!(bytes = text.len(), lines = doc.line_count(), "document loaded");
        Ok(Self::new(doc, width, height, options))
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Cursor position in document coordinates.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.cursor.position()
    }

    // -- Input --------------------------------------------------------------

    /// Apply one decoded input.
    ///
    /// Boundary conditions (moving past an edge, backspace at the very start)
    /// yield [`Effect::Unchanged`]. The viewport is reclamped to the cursor
    /// whether or not the input succeeded.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`](crate::error::EditError::Allocation) when an
    /// edit could not grow a line. The document is left valid and the cursor
    /// consistent with it; a tab may have inserted some of its spaces.
    pub fn apply(&mut self, input: Input) -> Result<Effect> {
        let effect = self.dispatch(input);
        self.viewport.follow_cursor(&self.cursor);
        effect
    }

    fn dispatch(&mut self, input: Input) -> Result<Effect> {
        let changed = match input {
            Input::Quit => return Ok(Effect::Quit),
            Input::Up => self.cursor.move_up(&self.doc),
            Input::Down => self.cursor.move_down(&self.doc),
            Input::Left => self.cursor.move_left(),
            Input::Right => self.cursor.move_right(&self.doc),
            Input::Backspace => self.cursor.backspace(&mut self.doc)?,
            Input::Enter => {
                self.cursor.enter(&mut self.doc)?;
                debug!(line = self.cursor.line_index(), "line split");
                true
            }
            Input::Tab => self.cursor.tab(&mut self.doc)? > 0,
            Input::Char(byte) => {
                self.cursor.insert_char(&mut self.doc, byte)?;
                debug!(byte, at = %self.cursor.position(), "inserted");
                true
            }
            Input::Control(byte) => {
                warn!(byte, "ignored control byte");
                false
            }
            Input::UnknownEscape(seq) => {
                warn!(?seq, "unknown escape sequence");
                false
            }
            Input::IncompleteEscape(next) => {
                warn!(?next, "incomplete escape sequence");
                false
            }
        };
        Ok(if changed {
            Effect::Redraw
        } else {
            Effect::Unchanged
        })
    }

    /// Decode `bytes` and apply every complete input, stopping at the first
    /// [`Effect::Quit`]. Returns the strongest effect seen.
    ///
    /// An input that fails is logged and abandoned; the rest of the chunk
    /// is still applied.
    ///
    /// # Errors
    ///
    /// The first failure in the chunk, unless the chunk also quits.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Effect> {
        let mut effect = Effect::Unchanged;
        let mut failure = None;
        for input in self.decoder.advance(bytes) {
            match self.apply(input) {
                Ok(Effect::Quit) => {
                    effect = Effect::Quit;
                    break;
                }
                Ok(Effect::Redraw) => effect = Effect::Redraw,
                Ok(Effect::Unchanged) => {}
                Err(e) => {
                    warn!(error = %e, ?input, "input abandoned");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }
        match failure {
            Some(e) if effect != Effect::Quit => Err(e),
            _ => Ok(effect),
        }
    }

    /// Give up on an escape prefix that input went idle in the middle of.
    pub fn finish_input(&mut self) {
        if let Some(input) = self.decoder.flush() {
            warn!(?input, "incomplete escape sequence abandoned");
        }
    }

    /// The terminal changed size. Dimensions update and the viewport is
    /// reclamped to the cursor.
    pub fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "resize");
        self.viewport.resize(width, height);
        self.viewport.follow_cursor(&self.cursor);
    }

    /// Plan the current frame.
    #[must_use]
    pub fn frame(&self) -> FrameModel {
        RenderPlanner::plan(&self.doc, &self.cursor, &self.viewport)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
