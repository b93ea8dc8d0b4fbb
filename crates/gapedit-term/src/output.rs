// SPDX-License-Identifier: MIT
//
// Output buffering and frame painting.
//
// Two components work together to keep terminal I/O to one write per frame:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall.
//
//   FramePainter — serializes a planned `FrameModel` into that buffer. Every
//   screen row is addressed with CUP and wiped with EL before drawing, so
//   rows the document no longer reaches come out blank. The gutter is styled
//   bright yellow + bold on the cursor row and dark gray elsewhere.

use std::io::{self, Write};

use gapedit_core::render::{FrameModel, FrameRow};

use crate::ansi::{self, Attr, Color, Style};
use crate::terminal::Size;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append document bytes for display. Control bytes would move the
    /// terminal cursor, so they are shown as `?` to keep columns aligned.
    pub fn write_text(&mut self, text: &[u8]) {
        self.buf.extend(
            text.iter()
                .map(|&b| if b < 0x20 || b == 0x7f { b'?' } else { b }),
        );
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing goes through flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── FramePainter ────────────────────────────────────────────────────────────

/// Gutter style on the cursor's row.
pub const GUTTER_CURSOR_STYLE: Style = Style::new(Color::BRIGHT_YELLOW, Attr::BOLD);

/// Gutter style on every other row.
pub const GUTTER_STYLE: Style = Style::new(Color::DARK_GRAY, Attr::empty());

/// Serializes frames into an [`OutputBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct FramePainter {
    gutter_cursor: Style,
    gutter: Style,
}

impl FramePainter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gutter_cursor: GUTTER_CURSOR_STYLE,
            gutter: GUTTER_STYLE,
        }
    }

    /// Paint `frame` over a screen of `size`, ending with the hardware
    /// cursor at the frame's cursor position.
    ///
    /// The whole frame sits inside a synchronized-output block with the
    /// cursor hidden, so the terminal never shows a half-drawn screen.
    ///
    /// # Errors
    ///
    /// Only if `out` fails, which an [`OutputBuffer`] never does.
    pub fn paint(&self, out: &mut OutputBuffer, frame: &FrameModel, size: Size) -> io::Result<()> {
        ansi::begin_sync(out)?;
        ansi::cursor_hide(out)?;

        for y in 0..size.rows {
            ansi::cursor_to(out, 0, y)?;
            ansi::clear_line(out)?;
            if let Some(row) = frame.rows.get(usize::from(y)) {
                self.paint_row(out, row)?;
            }
        }

        let row = clamp_u16(frame.cursor.row);
        let col = clamp_u16(frame.cursor.col);
        ansi::cursor_to(out, col, row)?;
        ansi::cursor_show(out)?;
        ansi::end_sync(out)
    }

    fn paint_row(&self, out: &mut OutputBuffer, row: &FrameRow) -> io::Result<()> {
        if !row.gutter_label.is_empty() {
            let style = if row.is_cursor_row {
                self.gutter_cursor
            } else {
                self.gutter
            };
            ansi::style(out, style)?;
            out.write_all(row.gutter_label.as_bytes())?;
            ansi::reset(out)?;
        }
        out.write_text(&row.text);
        Ok(())
    }
}

impl Default for FramePainter {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gapedit_core::position::ScreenPos;
    use pretty_assertions::assert_eq;

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn output_buffer_write_text_masks_controls() {
        let mut buf = OutputBuffer::new();
        buf.write_text(b"a\rb\x7fc\xc3\xa9");
        assert_eq!(buf.as_bytes(), b"a?b?c\xc3\xa9");
    }

    #[test]
    fn output_buffer_clear_keeps_capacity() {
        let mut buf = OutputBuffer::new();
        buf.write_all(&[b'x'; 1000]).unwrap();
        let cap = buf.buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), cap);
    }

    #[test]
    fn output_buffer_flush_to() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"frame").unwrap();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"frame");
        assert!(buf.is_empty());
    }

    #[test]
    fn output_buffer_flush_to_empty_is_noop() {
        let mut buf = OutputBuffer::new();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    // ── FramePainter ────────────────────────────────────────────────────

    fn row(n: usize, text: &str, is_cursor_row: bool) -> FrameRow {
        FrameRow {
            line_number: n,
            gutter_label: format!("{n:>4} "),
            text: text.as_bytes().to_vec(),
            is_cursor_row,
        }
    }

    fn paint(frame: &FrameModel, cols: u16, rows: u16) -> String {
        let mut out = OutputBuffer::new();
        FramePainter::new()
            .paint(&mut out, frame, Size { cols, rows })
            .unwrap();
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn paints_rows_with_styled_gutter() {
        let frame = FrameModel {
            rows: vec![row(1, "ab", true), row(2, "cd", false)],
            cursor: ScreenPos::new(0, 6),
        };
        let expected = concat!(
            "\x1b[?2026h\x1b[?25l",
            "\x1b[1;1H\x1b[K\x1b[93;1m   1 \x1b[0mab",
            "\x1b[2;1H\x1b[K\x1b[90m   2 \x1b[0mcd",
            "\x1b[1;7H\x1b[?25h\x1b[?2026l",
        );
        assert_eq!(paint(&frame, 20, 2), expected);
    }

    #[test]
    fn rows_past_document_are_cleared() {
        let frame = FrameModel {
            rows: vec![row(1, "x", true)],
            cursor: ScreenPos::new(0, 5),
        };
        let out = paint(&frame, 20, 3);
        assert!(out.contains("\x1b[2;1H\x1b[K\x1b[3;1H\x1b[K"));
    }

    #[test]
    fn gutterless_row_has_no_style() {
        let frame = FrameModel {
            rows: vec![FrameRow {
                line_number: 1,
                gutter_label: String::new(),
                text: b"plain".to_vec(),
                is_cursor_row: true,
            }],
            cursor: ScreenPos::new(0, 0),
        };
        let out = paint(&frame, 10, 1);
        assert!(out.contains("\x1b[1;1H\x1b[Kplain"));
        assert!(!out.contains("\x1b[93"));
    }

    #[test]
    fn zero_height_screen_only_places_cursor() {
        let frame = FrameModel {
            rows: vec![row(1, "x", true)],
            cursor: ScreenPos::new(0, 5),
        };
        assert_eq!(
            paint(&frame, 10, 0),
            "\x1b[?2026h\x1b[?25l\x1b[1;6H\x1b[?25h\x1b[?2026l"
        );
    }
}
