//! Cursor — position tracking, navigation, and cursor-relative edits.
//!
//! The `Cursor` remembers which line it is on (as a [`LineId`]), that line's
//! index in the document, and a byte offset within it. It never owns or
//! borrows the document; every method takes the [`Document`] as a parameter
//! and resolves the id against it.
//!
//! # Boundaries
//!
//! Motion and edits at a structural boundary are no-ops, not faults:
//!
//! - left at column 0 and right at end of line do not wrap,
//! - up on the first line and down on the last line stay put,
//! - backspace at column 0 of the first line does nothing.
//!
//! Navigation methods return `true` when the cursor moved. Edit methods
//! return `Ok(true)` when the document changed, `Ok(false)` for a boundary
//! no-op, and `Err` only for [`EditError::Allocation`].
//!
//! # Stale ids
//!
//! A line id goes stale once its line is merged away. The cursor's own
//! edits keep it on a live line, but [`revalidate`](Cursor::revalidate)
//! re-resolves the cursor from its line index if anything else changed the
//! document underneath it.

use tracing::debug;

use crate::document::{Document, LineId};
use crate::error::{EditError, Result};
use crate::options::TAB_WIDTH;
use crate::position::Position;

/// A cursor in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// The line the cursor is on. Non-owning.
    line: LineId,
    /// 0-based index of `line` in the document.
    index: usize,
    /// Byte offset within the line, `0..=line.len()`.
    offset: usize,
}

impl Cursor {
    /// A cursor at the start of the document's first line.
    #[must_use]
    pub const fn new(doc: &Document) -> Self {
        Self {
            line: doc.head(),
            index: 0,
            offset: 0,
        }
    }

    /// A cursor at `pos`, clamped to the document.
    #[must_use]
    pub fn at(doc: &Document, pos: Position) -> Self {
        let index = pos.line.min(doc.line_count().saturating_sub(1));
        let line = doc.line_id_at(index).unwrap_or_else(|| doc.head());
        let offset = pos.col.min(doc.line_len(line).unwrap_or(0));
        Self {
            line,
            index,
            offset,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn line_id(&self) -> LineId {
        self.line
    }

    /// 0-based line index.
    #[inline]
    #[must_use]
    pub const fn line_index(&self) -> usize {
        self.index
    }

    /// Byte offset within the current line.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.index, self.offset)
    }

    fn line_len(&self, doc: &Document) -> usize {
        doc.line_len(self.line).unwrap_or(0)
    }

    /// Re-resolve a stale line id from the line index and clamp the offset.
    ///
    /// Returns `true` if anything had to change.
    pub fn revalidate(&mut self, doc: &Document) -> bool {
        let fixed = if doc.contains(self.line) && doc.index_of(self.line) == Some(self.index) {
            Self {
                offset: self.offset.min(self.line_len(doc)),
                ..*self
            }
        } else {
            Self::at(doc, self.position())
        };
        let changed = fixed != *self;
        *self = fixed;
        changed
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move one byte left. No wrap to the previous line.
    pub const fn move_left(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset -= 1;
        true
    }

    /// Move one byte right. No wrap to the next line.
    pub fn move_right(&mut self, doc: &Document) -> bool {
        if self.offset >= self.line_len(doc) {
            return false;
        }
        self.offset += 1;
        true
    }

    // -- Vertical movement --------------------------------------------------

    /// Move to the previous line, clamping the offset to its length.
    pub fn move_up(&mut self, doc: &Document) -> bool {
        let Some(prev) = doc.prev(self.line) else {
            return false;
        };
        self.enter_line(doc, prev, self.index - 1);
        true
    }

    /// Move to the next line, clamping the offset to its length. A no-op on
    /// the last line.
    pub fn move_down(&mut self, doc: &Document) -> bool {
        let Ok(next) = doc.descend(self.line) else {
            return false;
        };
        self.enter_line(doc, next, self.index + 1);
        true
    }

    fn enter_line(&mut self, doc: &Document, line: LineId, index: usize) {
        self.line = line;
        self.index = index;
        self.offset = self.offset.min(self.line_len(doc));
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `byte` at the cursor and advance past it.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`] if the line could not grow; the cursor and
    /// document are unchanged.
    pub fn insert_char(&mut self, doc: &mut Document, byte: u8) -> Result<()> {
        doc.insert(self.line, self.offset, byte)?;
        self.offset += 1;
        Ok(())
    }

    /// Delete the byte before the cursor, or join this line onto the previous
    /// one when the cursor is at column 0.
    ///
    /// Returns `Ok(false)` at column 0 of the first line.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`] if the merge could not grow the previous
    /// line.
    pub fn backspace(&mut self, doc: &mut Document) -> Result<bool> {
        if self.offset > 0 {
            doc.delete(self.line, self.offset - 1)?;
            self.offset -= 1;
            return Ok(true);
        }

        match doc.merge_with_previous(self.line) {
            Ok((prev, join_at)) => {
                self.line = prev;
                self.index -= 1;
                self.offset = join_at;
                Ok(true)
            }
            Err(EditError::InvalidMerge) => {
                debug!("backspace at start of document ignored");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Split the line at the cursor; the cursor moves to the start of the
    /// new line.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`] if the new line could not be created.
    pub fn enter(&mut self, doc: &mut Document) -> Result<()> {
        let new_line = doc.split(self.line, self.offset)?;
        self.line = new_line;
        self.index += 1;
        self.offset = 0;
        Ok(())
    }

    /// Insert spaces up to the next multiple of [`TAB_WIDTH`]. Returns the
    /// number of spaces inserted.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`]; spaces inserted before the failure stay.
    pub fn tab(&mut self, doc: &mut Document) -> Result<usize> {
        let spaces = TAB_WIDTH - self.offset % TAB_WIDTH;
        for _ in 0..spaces {
            self.insert_char(doc, b' ')?;
        }
        Ok(spaces)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
