//! Document — the ordered, doubly-linked sequence of lines.
//!
//! Lines live in an arena of slots and are addressed by stable [`LineId`]s.
//! Each [`Line`] stores its neighbours as `Option<LineId>`, which gives the
//! O(1) splice of a linked list without reference cycles or shared
//! ownership. Slots freed by a merge are recycled by the next split.
//!
//! A document always holds at least one line: loading empty text yields a
//! single empty line, and the first line can never be merged away.
//!
//! # Invariants
//!
//! - `line_count()` equals the number of lines reachable from `head()`.
//! - The chain is acyclic; for every non-tail line, `next.prev == line`.
//! - The head has no `prev`, the tail has no `next`.
//!
//! [`is_consistent`](Document::is_consistent) checks all of these and is
//! used heavily by the tests.

use std::fmt;

use tracing::debug;

use crate::error::{EditError, Result};
use crate::gap_buffer::{GapBuffer, INITIAL_GAP};
use crate::options::TAB_WIDTH;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// Stable handle to a line in a [`Document`].
///
/// Ids stay valid until the line is merged away. A stale id is never
/// dereferenced blindly; lookups return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

/// One row of the document: its bytes plus its links.
#[derive(Debug, Clone)]
pub struct Line {
    text: GapBuffer,
    prev: Option<LineId>,
    next: Option<LineId>,
}

impl Line {
    #[inline]
    #[must_use]
    pub const fn text(&self) -> &GapBuffer {
        &self.text
    }

    /// Content length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn prev(&self) -> Option<LineId> {
        self.prev
    }

    #[inline]
    #[must_use]
    pub const fn next(&self) -> Option<LineId> {
        self.next
    }
}

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

/// Replace every tab byte with [`TAB_WIDTH`] spaces.
#[must_use]
pub fn expand_tabs(raw: &[u8]) -> Vec<u8> {
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut out = Vec::with_capacity(raw.len() + tabs * (TAB_WIDTH - 1));
    for &byte in raw {
        if byte == b'\t' {
            out.extend(std::iter::repeat_n(b' ', TAB_WIDTH));
        } else {
            out.push(byte);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The full ordered sequence of lines being edited.
#[derive(Clone)]
pub struct Document {
    slots: Vec<Option<Line>>,
    free: Vec<usize>,
    head: LineId,
    line_count: usize,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// A document with a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Line {
                text: GapBuffer::default(),
                prev: None,
                next: None,
            })],
            free: Vec::new(),
            head: LineId(0),
            line_count: 1,
        }
    }

    /// Build a document from whole-file content.
    ///
    /// Splits on `\n`; the end of the text is an implicit final boundary, so
    /// `"a\nb"` and `"a\nb\n"` yield two and three lines respectively. Tabs
    /// are expanded to spaces before each line's buffer is created.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`] if a line's storage cannot be reserved.
    pub fn load(text: &[u8]) -> Result<Self> {
        Self::load_with_gap(text, INITIAL_GAP)
    }

    /// [`load`](Self::load) with a custom per-line slack.
    ///
    /// # Errors
    ///
    /// [`EditError::Allocation`] if a line's storage cannot be reserved.
    pub fn load_with_gap(text: &[u8], gap: usize) -> Result<Self> {
        let mut slots: Vec<Option<Line>> = Vec::new();
        for (i, raw) in text.split(|&b| b == b'\n').enumerate() {
            let line = Line {
                text: GapBuffer::with_slack(&expand_tabs(raw), gap)?,
                prev: i.checked_sub(1).map(LineId),
                next: None,
            };
            if let Some(Some(last)) = slots.last_mut() {
                last.next = Some(LineId(i));
            }
            slots.push(Some(line));
        }

        let line_count = slots.len();
        debug!(bytes = text.len(), lines = line_count, "loaded document");
        Ok(Self {
            slots,
            free: Vec::new(),
            head: LineId(0),
            line_count,
        })
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines. O(1).
    #[inline]
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    /// The first line.
    #[inline]
    #[must_use]
    pub const fn head(&self) -> LineId {
        self.head
    }

    /// Look up a line by id. `None` for ids whose line was merged away.
    #[inline]
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// True if `id` refers to a live line.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: LineId) -> bool {
        self.line(id).is_some()
    }

    #[must_use]
    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.line(id).and_then(Line::prev)
    }

    #[must_use]
    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.line(id).and_then(Line::next)
    }

    /// The line after `id`, for moving down.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidDescend`] when `id` is the last line or stale.
    pub fn descend(&self, id: LineId) -> Result<LineId> {
        self.next(id).ok_or(EditError::InvalidDescend)
    }

    /// True if `id` is the last line. Stale ids report `false`.
    #[must_use]
    pub fn is_last(&self, id: LineId) -> bool {
        self.line(id).is_some_and(|line| line.next.is_none())
    }

    /// Content length of a line, or `None` for a stale id.
    #[must_use]
    pub fn line_len(&self, id: LineId) -> Option<usize> {
        self.line(id).map(Line::len)
    }

    /// Id of the line at 0-based `index`, found by walking from the head.
    #[must_use]
    pub fn line_id_at(&self, index: usize) -> Option<LineId> {
        self.lines().nth(index).map(|(id, _)| id)
    }

    /// 0-based position of `id` in the document, found by walking.
    #[must_use]
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines().position(|(line_id, _)| line_id == id)
    }

    /// Iterate lines from head to tail.
    #[must_use]
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            doc: self,
            next: Some(self.head),
            remaining: self.line_count,
        }
    }

    /// Whole document as bytes, lines joined by `\n`.
    #[must_use]
    pub fn render_all(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, (_, line)) in self.lines().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&line.text.render());
        }
        out
    }

    /// Check the structural invariants listed in the module docs.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let Some(head) = self.line(self.head) else {
            return false;
        };
        if head.prev.is_some() {
            return false;
        }

        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        let mut seen = 0;
        let mut cursor = Some(self.head);
        while let Some(id) = cursor {
            seen += 1;
            // More hops than live lines means a cycle.
            if seen > live {
                return false;
            }
            let Some(line) = self.line(id) else {
                return false;
            };
            if let Some(next) = line.next {
                if self.prev(next) != Some(id) {
                    return false;
                }
            }
            cursor = line.next;
        }
        seen == self.line_count && live == self.line_count
    }

    // -- Text edits within a line --------------------------------------------

    /// Insert one byte into line `id` at `offset`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] for a bad offset or stale id, or
    /// [`EditError::Allocation`] if the line could not grow.
    pub fn insert(&mut self, id: LineId, offset: usize, byte: u8) -> Result<()> {
        self.line_mut(id)
            .ok_or(EditError::OutOfRange { offset, len: 0 })?
            .text
            .insert(offset, byte)
    }

    /// Remove the byte at `offset` in line `id` and return it.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] for a bad offset or stale id.
    pub fn delete(&mut self, id: LineId, offset: usize) -> Result<u8> {
        self.line_mut(id)
            .ok_or(EditError::OutOfRange { offset, len: 0 })?
            .text
            .delete(offset)
    }

    // -- Structural edits ---------------------------------------------------

    /// Split line `id` at `offset`. Everything from `offset` onward moves to
    /// a new line linked directly after `id`; returns the new line's id.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] for a bad offset or stale id, or
    /// [`EditError::Allocation`]. The document is unchanged on error.
    pub fn split(&mut self, id: LineId, offset: usize) -> Result<LineId> {
        let line = self
            .line_mut(id)
            .ok_or(EditError::OutOfRange { offset, len: 0 })?;
        let tail = line.text.split_off(offset)?;
        let after = line.next;

        let new_id = self.alloc(Line {
            text: tail,
            prev: Some(id),
            next: after,
        });
        if let Some(line) = self.line_mut(id) {
            line.next = Some(new_id);
        }
        if let Some(after) = after.and_then(|next| self.line_mut(next)) {
            after.prev = Some(new_id);
        }
        self.line_count += 1;

        debug!(offset, lines = self.line_count, "split line");
        Ok(new_id)
    }

    /// Append line `id` to the end of its previous line and remove it.
    ///
    /// Returns the previous line's id and its length *before* the merge,
    /// which is where a cursor on the removed line should land.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidMerge`] if `id` is the first line (or stale), or
    /// [`EditError::Allocation`] if the previous line could not grow. The
    /// document is unchanged on error.
    pub fn merge_with_previous(&mut self, id: LineId) -> Result<(LineId, usize)> {
        let (prev_id, next, content) = match self.line(id) {
            Some(line) => match line.prev {
                Some(prev) => (prev, line.next, line.text.render()),
                None => return Err(EditError::InvalidMerge),
            },
            None => return Err(EditError::InvalidMerge),
        };

        let prev = self.line_mut(prev_id).ok_or(EditError::InvalidMerge)?;
        let join_at = prev.text.len();
        prev.text.insert_chunk(join_at, &content)?;
        prev.next = next;

        if let Some(after) = next.and_then(|n| self.line_mut(n)) {
            after.prev = Some(prev_id);
        }
        self.slots[id.0] = None;
        self.free.push(id.0);
        self.line_count -= 1;

        debug!(join_at, lines = self.line_count, "merged line into previous");
        Ok((prev_id, join_at))
    }

    fn alloc(&mut self, line: Line) -> LineId {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(line);
            LineId(slot)
        } else {
            self.slots.push(Some(line));
            LineId(self.slots.len() - 1)
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.lines()
                    .map(|(_, line)| String::from_utf8_lossy(&line.text.render()).into_owned()),
            )
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.render_all()))
    }
}

/// Iterator over a document's lines in order.
#[derive(Debug)]
pub struct Lines<'a> {
    doc: &'a Document,
    next: Option<LineId>,
    remaining: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (LineId, &'a Line);

    fn next(&mut self) -> Option<Self::Item> {
        // `remaining` bounds the walk even if the links were ever corrupted.
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let line = self.doc.line(id)?;
        self.next = line.next;
        self.remaining -= 1;
        Some((id, line))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
