//! Gap buffer — the storage primitive behind every line.
//!
//! A `GapBuffer` holds one line's bytes in a single `Vec<u8>` with a movable
//! hole (the gap) somewhere inside it:
//!
//! ```text
//!  [ text before gap | gap (unused) | text after gap ]
//!    0..gap_start      gap_start..gap_end   gap_end..cap
//! ```
//!
//! Edits always happen at the gap. Each mutation first moves the gap to the
//! edit offset, which costs time proportional to the distance travelled, so
//! a run of edits near the cursor is effectively O(1) per byte.
//!
//! # Growth
//!
//! When the gap is too small, capacity doubles. The new storage is reserved
//! with `try_reserve_exact` and fully populated (prefix at the start, suffix
//! at the end, fresh gap in the middle) before it replaces the old storage.
//! A failed reservation reports [`EditError::Allocation`] and leaves the
//! buffer untouched.
//!
//! All offsets are byte offsets into the logical content (the content with
//! the gap removed).

use std::collections::TryReserveError;
use std::fmt;

use tracing::trace;

use crate::error::{EditError, Result};

/// Slack reserved after the initial content of a new buffer.
pub const INITIAL_GAP: usize = 5;

/// Smallest capacity a growing buffer will double from. Keeps a zero-capacity
/// buffer (empty content, zero slack) from doubling forever.
const MIN_GROW_CAPACITY: usize = 4;

/// A single line's byte storage with a movable gap.
#[derive(Clone)]
pub struct GapBuffer {
    /// Backing store. `buf.len()` is the capacity; gap bytes are filler.
    buf: Vec<u8>,
    /// First byte of the gap.
    gap_start: usize,
    /// One past the last byte of the gap.
    gap_end: usize,
}

impl GapBuffer {
    // -- Construction -------------------------------------------------------

    /// Create a buffer holding `initial`, with [`INITIAL_GAP`] bytes of slack
    /// after it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Allocation`] if the storage cannot be reserved.
    pub fn new(initial: &[u8]) -> Result<Self> {
        Self::with_slack(initial, INITIAL_GAP)
    }

    /// Create a buffer holding `initial` with `slack` bytes of gap after it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Allocation`] if the storage cannot be reserved.
    pub fn with_slack(initial: &[u8], slack: usize) -> Result<Self> {
        let cap = initial.len().saturating_add(slack);
        let buf = allocate(cap, |buf| {
            buf.extend_from_slice(initial);
            buf.resize(cap, 0);
        })?;
        Ok(Self {
            buf,
            gap_start: initial.len(),
            gap_end: cap,
        })
    }

    // -- Queries ------------------------------------------------------------

    /// Number of content bytes (the logical size).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - self.gap_len()
    }

    /// True when the line holds no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total storage size, content plus gap.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub const fn gap_start(&self) -> usize {
        self.gap_start
    }

    #[inline]
    #[must_use]
    pub const fn gap_end(&self) -> usize {
        self.gap_end
    }

    /// Number of free bytes in the gap.
    #[inline]
    #[must_use]
    pub const fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// The byte at logical `offset`, or `None` past the end.
    #[must_use]
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset >= self.len() {
            return None;
        }
        if offset < self.gap_start {
            Some(self.buf[offset])
        } else {
            Some(self.buf[offset + self.gap_len()])
        }
    }

    /// Content as a fresh contiguous vector: the pre-gap bytes followed by
    /// the post-gap bytes. Never aliases internal storage.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.buf[..self.gap_start]);
        out.extend_from_slice(&self.buf[self.gap_end..]);
        out
    }

    // -- Gap movement -------------------------------------------------------

    /// Move the gap so that it starts at logical `target`.
    ///
    /// `target` is clamped to `0..=len()`. Bytes between the old and new gap
    /// positions are shifted across the gap in the direction of travel.
    pub fn move_gap(&mut self, target: usize) {
        let target = target.min(self.len());
        let gap = self.gap_len();

        if target < self.gap_start {
            // Bytes [target, gap_start) move to the far side of the gap.
            let count = self.gap_start - target;
            self.buf.copy_within(target..self.gap_start, target + gap);
            self.gap_start -= count;
            self.gap_end -= count;
        } else if target > self.gap_start {
            // Bytes [gap_end, gap_end + count) move to the near side.
            let count = target - self.gap_start;
            self.buf.copy_within(self.gap_end..self.gap_end + count, self.gap_start);
            self.gap_start += count;
            self.gap_end += count;
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Insert one byte at `offset`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `offset > len()`, or
    /// [`EditError::Allocation`] if the buffer needed to grow and could not.
    /// On error the buffer is unchanged.
    pub fn insert(&mut self, offset: usize, byte: u8) -> Result<()> {
        self.check_insert_offset(offset)?;
        self.ensure_gap(1)?;
        self.move_gap(offset);
        self.buf[self.gap_start] = byte;
        self.gap_start += 1;
        Ok(())
    }

    /// Insert a run of bytes at `offset` in one pass.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn insert_chunk(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check_insert_offset(offset)?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.ensure_gap(bytes.len())?;
        self.move_gap(offset);
        let end = self.gap_start + bytes.len();
        self.buf[self.gap_start..end].copy_from_slice(bytes);
        self.gap_start = end;
        Ok(())
    }

    /// Remove the byte at `offset` and return it.
    ///
    /// The gap is positioned just after the byte and then widened leftward
    /// over it.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `offset >= len()`. The buffer is
    /// unchanged on error.
    pub fn delete(&mut self, offset: usize) -> Result<u8> {
        let len = self.len();
        if offset >= len {
            return Err(EditError::OutOfRange { offset, len });
        }
        self.move_gap(offset + 1);
        self.gap_start -= 1;
        Ok(self.buf[self.gap_start])
    }

    /// Split the buffer at `offset`: everything from `offset` onward moves
    /// into a new buffer, which is returned. `self` keeps `[0, offset)`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfRange`] if `offset > len()`, or
    /// [`EditError::Allocation`] if the new buffer cannot be created. On
    /// error `self` holds the same content as before.
    pub fn split_off(&mut self, offset: usize) -> Result<Self> {
        self.check_insert_offset(offset)?;
        self.move_gap(offset);
        let tail = Self::new(&self.buf[self.gap_end..])?;
        // Truncate: the whole post-gap region joins the gap.
        self.gap_end = self.buf.len();
        Ok(tail)
    }

    // -- Internals ----------------------------------------------------------

    fn check_insert_offset(&self, offset: usize) -> Result<()> {
        let len = self.len();
        if offset > len {
            return Err(EditError::OutOfRange { offset, len });
        }
        Ok(())
    }

    /// Grow storage by doubling until the gap holds at least `needed` bytes.
    ///
    /// The new storage is reserved and filled before the old one is dropped.
    fn ensure_gap(&mut self, needed: usize) -> Result<()> {
        if self.gap_len() >= needed {
            return Ok(());
        }

        let old_cap = self.buf.len();
        let content = self.len();
        let mut new_cap = old_cap.max(MIN_GROW_CAPACITY);
        while new_cap - content < needed {
            new_cap = new_cap.saturating_mul(2);
            if new_cap == usize::MAX {
                break;
            }
        }

        let suffix = &self.buf[self.gap_end..];
        let new_gap_end = new_cap - suffix.len();
        let new_buf = allocate(new_cap, |buf| {
            buf.extend_from_slice(&self.buf[..self.gap_start]);
            buf.resize(new_gap_end, 0);
            buf.extend_from_slice(suffix);
        })?;

        trace!(old_cap, new_cap, gap_start = self.gap_start, "grew gap buffer");
        self.buf = new_buf;
        self.gap_end = new_gap_end;
        Ok(())
    }
}

/// Reserve exactly `cap` bytes and hand the empty vector to `fill`.
fn allocate(cap: usize, fill: impl FnOnce(&mut Vec<u8>)) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reserve(&mut buf, cap).map_err(|source| EditError::Allocation {
        requested: cap,
        source,
    })?;
    fill(&mut buf);
    debug_assert_eq!(buf.len(), cap);
    Ok(buf)
}

#[cfg(not(test))]
fn reserve(buf: &mut Vec<u8>, cap: usize) -> std::result::Result<(), TryReserveError> {
    buf.try_reserve_exact(cap)
}

#[cfg(test)]
fn reserve(buf: &mut Vec<u8>, cap: usize) -> std::result::Result<(), TryReserveError> {
    if growth_limit::exceeded(cap) {
        // Anything past `isize::MAX` bytes fails with a capacity overflow.
        return buf.try_reserve_exact(usize::MAX);
    }
    buf.try_reserve_exact(cap)
}

/// Per-thread cap on reservations, so tests can make growth fail on demand.
#[cfg(test)]
pub(crate) mod growth_limit {
    use std::cell::Cell;

    thread_local! {
        static LIMIT: Cell<Option<usize>> = const { Cell::new(None) };
    }

    /// While alive, every reservation above `bytes` on this thread fails.
    pub(crate) struct GrowthLimit(());

    impl GrowthLimit {
        pub(crate) fn new(bytes: usize) -> Self {
            LIMIT.with(|limit| limit.set(Some(bytes)));
            Self(())
        }
    }

    impl Drop for GrowthLimit {
        fn drop(&mut self) {
            LIMIT.with(|limit| limit.set(None));
        }
    }

    pub(super) fn exceeded(cap: usize) -> bool {
        LIMIT.with(|limit| limit.get().is_some_and(|bytes| cap > bytes))
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self {
            buf: vec![0; INITIAL_GAP],
            gap_start: 0,
            gap_end: INITIAL_GAP,
        }
    }
}

impl PartialEq for GapBuffer {
    /// Two buffers are equal when their content is, wherever their gaps sit.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.render() == other.render()
    }
}

impl Eq for GapBuffer {}

impl fmt::Debug for GapBuffer {
    /// Shows the gap in place as underscores, e.g. `"he_____llo"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(self.buf.len());
        text.push_str(&String::from_utf8_lossy(&self.buf[..self.gap_start]));
        text.extend(std::iter::repeat_n('_', self.gap_len()));
        text.push_str(&String::from_utf8_lossy(&self.buf[self.gap_end..]));
        f.debug_struct("GapBuffer")
            .field("text", &text)
            .field("cap", &self.buf.len())
            .field("gap", &(self.gap_start..self.gap_end))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
