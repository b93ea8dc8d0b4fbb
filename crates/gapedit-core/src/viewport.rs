//! Viewport — the scrolled window onto the document.
//!
//! The viewport holds only scroll state and terminal dimensions. It does not
//! own the document or the cursor; [`follow_cursor`](Viewport::follow_cursor)
//! takes the cursor as a parameter and scrolls just enough to keep it
//! visible.
//!
//! ```text
//!            col_offset
//!               │◀──── width - gutter ────▶│
//! ┌──────┬──────┼──────────────────────────┤ ◀ row_offset
//! │gutter│      │      visible text        │
//! │      │      │                          │  height rows
//! └──────┴──────┴──────────────────────────┘
//! ```

use crate::cursor::Cursor;
use crate::position::Position;

/// Visible window: scroll offsets plus terminal and gutter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line index.
    row_offset: usize,
    /// First visible byte column.
    col_offset: usize,
    width: u16,
    height: u16,
    gutter: u16,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u16, height: u16, gutter: u16) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            width,
            height,
            gutter,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn gutter(&self) -> u16 {
        self.gutter
    }

    /// Columns available for text once the gutter is taken out.
    #[inline]
    #[must_use]
    pub const fn text_width(&self) -> usize {
        self.width.saturating_sub(self.gutter) as usize
    }

    /// True when `pos` falls inside the visible rectangle.
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.line >= self.row_offset
            && pos.line < self.row_offset + self.height as usize
            && pos.col >= self.col_offset
            && pos.col < self.col_offset + self.text_width()
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll just enough that the cursor is inside the viewport.
    ///
    /// Returns `true` if either offset changed. A zero-sized text area
    /// leaves the offsets alone.
    pub fn follow_cursor(&mut self, cursor: &Cursor) -> bool {
        let height = self.height as usize;
        let text_width = self.text_width();
        if height == 0 || text_width == 0 {
            return false;
        }

        let before = (self.row_offset, self.col_offset);
        let Position { line, col } = cursor.position();

        // Vertical: line must be within [row_offset, row_offset + height).
        if line < self.row_offset {
            self.row_offset = line;
        } else if line >= self.row_offset + height {
            self.row_offset = line - height + 1;
        }

        // Horizontal: col must be within [col_offset, col_offset + text_width).
        if col < self.col_offset {
            self.col_offset = col;
        } else if col >= self.col_offset + text_width {
            self.col_offset = col - text_width + 1;
        }

        before != (self.row_offset, self.col_offset)
    }

    /// Update the terminal dimensions. Offsets are reclamped by the next
    /// [`follow_cursor`](Self::follow_cursor).
    pub const fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn tall_doc(lines: usize, width: usize) -> Document {
        let line = "x".repeat(width);
        let text = vec![line; lines].join("\n");
        Document::load(text.as_bytes()).unwrap()
    }

    #[test]
    fn text_width_excludes_gutter() {
        let vp = Viewport::new(80, 24, 5);
        assert_eq!(vp.text_width(), 75);
        assert_eq!(Viewport::new(3, 24, 5).text_width(), 0);
    }

    #[test]
    fn scrolls_down_one_line_at_a_time() {
        let doc = tall_doc(50, 3);
        let mut vp = Viewport::new(20, 10, 5);
        let mut c = Cursor::new(&doc);
        for _ in 0..10 {
            c.move_down(&doc);
            vp.follow_cursor(&c);
        }
        assert_eq!(c.line_index(), 10);
        assert_eq!(vp.row_offset(), 1);
    }

    #[test]
    fn scrolls_up_to_cursor() {
        let doc = tall_doc(50, 3);
        let mut vp = Viewport::new(20, 10, 5);
        let mut c = Cursor::at(&doc, Position::new(30, 0));
        vp.follow_cursor(&c);
        assert_eq!(vp.row_offset(), 21);
        for _ in 0..25 {
            c.move_up(&doc);
        }
        assert!(vp.follow_cursor(&c));
        assert_eq!(vp.row_offset(), 5);
    }

    #[test]
    fn scrolls_horizontally() {
        let doc = tall_doc(1, 100);
        let mut vp = Viewport::new(15, 5, 5);
        let mut c = Cursor::new(&doc);
        for _ in 0..10 {
            c.move_right(&doc);
        }
        vp.follow_cursor(&c);
        assert_eq!(vp.col_offset(), 1);

        for _ in 0..10 {
            c.move_left();
        }
        vp.follow_cursor(&c);
        assert_eq!(vp.col_offset(), 0);
    }

    #[test]
    fn containment_after_arbitrary_motion() {
        let text = b"short\na much longer line of text here\n\nmid length\nz";
        let doc = Document::load(text).unwrap();
        let mut vp = Viewport::new(12, 2, 5);
        let mut c = Cursor::new(&doc);
        // A fixed but irregular walk over all four directions.
        let walk = "RRRRDRRRRRRRRRRRRRRRRRDDULLLLDDDRRRRRRRRUUUUURRRRRRRRRRRRRRRRRRRRRD";
        for step in walk.chars() {
            match step {
                'L' => {
                    c.move_left();
                }
                'R' => {
                    c.move_right(&doc);
                }
                'U' => {
                    c.move_up(&doc);
                }
                _ => {
                    c.move_down(&doc);
                }
            }
            vp.follow_cursor(&c);
            assert!(
                vp.contains(c.position()),
                "{:?} outside {vp:?}",
                c.position()
            );
        }
    }

    #[test]
    fn resize_does_not_reclamp() {
        let doc = tall_doc(50, 3);
        let mut vp = Viewport::new(20, 10, 5);
        let c = Cursor::at(&doc, Position::new(9, 0));
        vp.follow_cursor(&c);
        assert_eq!(vp.row_offset(), 0);

        vp.resize(20, 4);
        assert_eq!(vp.row_offset(), 0);
        assert_eq!(vp.height(), 4);
        assert!(!vp.contains(c.position()));

        vp.follow_cursor(&c);
        assert_eq!(vp.row_offset(), 6);
        assert!(vp.contains(c.position()));
    }

    #[test]
    fn zero_area_leaves_offsets() {
        let doc = tall_doc(5, 5);
        let mut vp = Viewport::new(5, 0, 5);
        let c = Cursor::at(&doc, Position::new(4, 4));
        assert!(!vp.follow_cursor(&c));
        assert_eq!((vp.row_offset(), vp.col_offset()), (0, 0));
    }
}
