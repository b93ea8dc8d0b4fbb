//! Render planner — the bridge from document to frame.
//!
//! [`RenderPlanner::plan`] turns a document, cursor, and viewport into a
//! [`FrameModel`]: the visible slice of each on-screen line, its gutter
//! label, and where the hardware cursor should sit. The planner performs no
//! I/O; turning the model into escape sequences is the terminal layer's job.
//!
//! ```text
//! Document            Viewport           FrameModel
//! ┌──────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ line 0   │   │ row_offset   │   │ "   1 " "fn main"│
//! │ line 1   │──▶│ col_offset   │──▶│ "   2 " "  x"    │
//! │ ...      │   │ width/height │   │ cursor (1, 8)    │
//! └──────────┘   └──────────────┘   └──────────────────┘
//! ```

use crate::cursor::Cursor;
use crate::document::Document;
use crate::position::ScreenPos;
use crate::viewport::Viewport;

/// One planned screen row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRow {
    /// 1-based line number shown in the gutter.
    pub line_number: usize,
    /// Gutter text: the right-aligned line number plus a separator space.
    /// Empty when the gutter is disabled.
    pub gutter_label: String,
    /// The visible bytes of the line. Empty when the line ends left of the
    /// horizontal scroll offset.
    pub text: Vec<u8>,
    /// True for the row holding the cursor.
    pub is_cursor_row: bool,
}

/// Everything the terminal layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameModel {
    /// Rows from the top of the screen. Shorter than the viewport height
    /// when the document ends early.
    pub rows: Vec<FrameRow>,
    /// Screen position of the cursor, gutter included.
    pub cursor: ScreenPos,
}

/// Format a gutter label: `number` right-aligned in `gutter - 1` columns,
/// followed by one space. Returns an empty string for a zero-width gutter.
#[must_use]
pub fn gutter_label(number: usize, gutter: u16) -> String {
    match gutter {
        0 => String::new(),
        g => format!("{number:>width$} ", width = usize::from(g - 1)),
    }
}

/// Stateless planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPlanner;

impl RenderPlanner {
    /// Plan the frame for the current state.
    ///
    /// Only lines in `[row_offset, row_offset + height)` that exist produce
    /// rows. The cursor position is reported relative to the scroll offsets;
    /// callers normally run [`Viewport::follow_cursor`] first so that it is
    /// on screen.
    #[must_use]
    pub fn plan(doc: &Document, cursor: &Cursor, viewport: &Viewport) -> FrameModel {
        let height = usize::from(viewport.height());
        let text_width = viewport.text_width();
        let col_offset = viewport.col_offset();
        let row_offset = viewport.row_offset();

        let rows = doc
            .lines()
            .enumerate()
            .skip(row_offset)
            .take(height)
            .map(|(index, (_, line))| {
                let content = line.text().render();
                let text = if content.len() < col_offset {
                    Vec::new()
                } else {
                    let visible = text_width.min(content.len() - col_offset);
                    content[col_offset..col_offset + visible].to_vec()
                };
                FrameRow {
                    line_number: index + 1,
                    gutter_label: gutter_label(index + 1, viewport.gutter()),
                    text,
                    is_cursor_row: index == cursor.line_index(),
                }
            })
            .collect();

        let cursor = ScreenPos::new(
            cursor.line_index().saturating_sub(row_offset),
            cursor.offset().saturating_sub(col_offset) + usize::from(viewport.gutter()),
        );

        FrameModel { rows, cursor }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn texts(frame: &FrameModel) -> Vec<String> {
        frame
            .rows
            .iter()
            .map(|row| String::from_utf8(row.text.clone()).unwrap())
            .collect()
    }

    // -- gutter_label -------------------------------------------------------

    #[test]
    fn gutter_label_matches_fixed_width() {
        assert_eq!(gutter_label(1, 5), "   1 ");
        assert_eq!(gutter_label(42, 5), "  42 ");
        assert_eq!(gutter_label(1234, 5), "1234 ");
    }

    #[test]
    fn gutter_label_disabled() {
        assert_eq!(gutter_label(7, 0), "");
    }

    // -- plan ---------------------------------------------------------------

    #[test]
    fn plans_all_lines_when_they_fit() {
        let doc = Document::load(b"ab\ncd").unwrap();
        let cursor = Cursor::new(&doc);
        let vp = Viewport::new(20, 10, 5);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);

        assert_eq!(texts(&frame), vec!["ab", "cd"]);
        assert_eq!(frame.rows[0].gutter_label, "   1 ");
        assert_eq!(frame.rows[1].line_number, 2);
        assert!(frame.rows[0].is_cursor_row);
        assert!(!frame.rows[1].is_cursor_row);
        assert_eq!(frame.cursor, ScreenPos::new(0, 5));
    }

    #[test]
    fn truncates_to_text_width() {
        let doc = Document::load(b"0123456789abcdef").unwrap();
        let cursor = Cursor::new(&doc);
        let vp = Viewport::new(13, 3, 5);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        assert_eq!(texts(&frame), vec!["01234567"]);
    }

    #[test]
    fn respects_scroll_offsets() {
        let text = b"l0\nl1 long line\nl2\nlong l3 line\nl4";
        let doc = Document::load(text).unwrap();
        let mut cursor = Cursor::at(&doc, Position::new(3, 10));
        let mut vp = Viewport::new(10, 2, 5);
        vp.follow_cursor(&cursor);
        assert_eq!(vp.row_offset(), 2);
        assert_eq!(vp.col_offset(), 6);

        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        // "l2" is shorter than col_offset: blank row, gutter still present.
        assert_eq!(texts(&frame), vec!["", "3 lin"]);
        assert_eq!(frame.rows[0].gutter_label, "   3 ");
        assert!(frame.rows[1].is_cursor_row);
        assert_eq!(frame.cursor, ScreenPos::new(1, 10 - 6 + 5));

        cursor.move_down(&doc);
        vp.follow_cursor(&cursor);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[1].line_number, 5);
    }

    #[test]
    fn short_line_left_of_scroll_is_blank() {
        let doc = Document::load(b"abc\nabcdefgh").unwrap();
        let cursor = Cursor::at(&doc, Position::new(1, 8));
        let mut vp = Viewport::new(10, 5, 5);
        vp.follow_cursor(&cursor);
        assert_eq!(vp.col_offset(), 4);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        assert_eq!(texts(&frame), vec!["", "efgh"]);
    }

    #[test]
    fn cursor_in_gutterless_view() {
        let doc = Document::load(b"hello").unwrap();
        let cursor = Cursor::at(&doc, Position::new(0, 3));
        let vp = Viewport::new(10, 1, 0);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        assert_eq!(frame.rows[0].gutter_label, "");
        assert_eq!(frame.cursor, ScreenPos::new(0, 3));
    }

    #[test]
    fn empty_document_plans_one_row() {
        let doc = Document::new();
        let cursor = Cursor::new(&doc);
        let vp = Viewport::new(80, 24, 5);
        let frame = RenderPlanner::plan(&doc, &cursor, &vp);
        assert_eq!(frame.rows.len(), 1);
        assert!(frame.rows[0].text.is_empty());
    }
}
