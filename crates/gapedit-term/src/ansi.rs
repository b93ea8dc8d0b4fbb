// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the frame painter in `output` decides
// that. This module just knows the byte-level encoding of every terminal
// command the editor needs.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Move home and clear the entire screen (CUP + ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Style ───────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR parameters. Combine with bitwise OR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD = 1 << 0;
    }
}

/// Foreground color from the terminal palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The terminal's default foreground.
    #[default]
    Default,
    /// Palette index. 0-7 standard, 8-15 bright, 16-255 extended.
    Ansi(u8),
}

impl Color {
    pub const DARK_GRAY: Self = Self::Ansi(8);
    pub const BRIGHT_YELLOW: Self = Self::Ansi(11);

    /// SGR parameter for this color as a foreground.
    ///
    /// Uses compact codes for standard colors (30-37, 90-97) and the
    /// 256-color extended form for indices 16-255.
    fn write_fg_param(self, w: &mut impl Write) -> io::Result<()> {
        match self {
            Self::Default => w.write_all(b"39"),
            Self::Ansi(idx) if idx < 8 => write!(w, "{}", 30 + u16::from(idx)),
            Self::Ansi(idx) if idx < 16 => write!(w, "{}", 82 + u16::from(idx)),
            Self::Ansi(idx) => write!(w, "38;5;{idx}"),
        }
    }
}

/// A foreground color plus attributes, emitted as one SGR sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub attrs: Attr,
}

impl Style {
    #[must_use]
    pub const fn new(fg: Color, attrs: Attr) -> Self {
        Self { fg, attrs }
    }
}

/// Emit a style as a single CSI sequence, color first:
/// `\x1b[93;1m` for bright yellow + bold.
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    style.fg.write_fg_param(w)?;

    if style.attrs.contains(Attr::BOLD) {
        w.write_all(b";1")?;
    }

    w.write_all(b"m")
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// Tells the terminal to buffer all subsequent output until [`end_sync`].
/// Terminals that do not know the mode ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output — terminal renders the buffered frame.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Cursor Shape ───────────────────────────────────────────────────────────

/// Terminal cursor shape (DECSCUSR — Set Cursor Style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Terminal default (usually blinking block).
    #[default]
    Default,
    /// Blinking bar (I-beam) cursor. Used while editing.
    BlinkBar,
}

/// Set the cursor shape using DECSCUSR.
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let n: u8 = match shape {
        CursorShape::Default => 0,
        CursorShape::BlinkBar => 5,
    };
    write!(w, "\x1b[{n} q")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_position() {
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_max_does_not_overflow() {
        assert_eq!(
            emit(|w| cursor_to(w, u16::MAX, u16::MAX)),
            "\x1b[65536;65536H"
        );
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[H\x1b[2J");
    }

    #[test]
    fn clear_line_sequence() {
        assert_eq!(emit(|w| clear_line(w)), "\x1b[K");
    }

    #[test]
    fn reset_sequence() {
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
    }

    // ── Style ───────────────────────────────────────────────────────────

    #[test]
    fn style_cursor_row_gutter() {
        let s = Style::new(Color::BRIGHT_YELLOW, Attr::BOLD);
        assert_eq!(emit(|w| style(w, s)), "\x1b[93;1m");
    }

    #[test]
    fn style_plain_gutter() {
        let s = Style::new(Color::DARK_GRAY, Attr::empty());
        assert_eq!(emit(|w| style(w, s)), "\x1b[90m");
    }

    #[test]
    fn style_standard_and_extended_colors() {
        let red = Style::new(Color::Ansi(1), Attr::empty());
        assert_eq!(emit(|w| style(w, red)), "\x1b[31m");
        let extended = Style::new(Color::Ansi(42), Attr::empty());
        assert_eq!(emit(|w| style(w, extended)), "\x1b[38;5;42m");
        assert_eq!(emit(|w| style(w, Style::default())), "\x1b[39m");
    }

    #[test]
    fn style_bold_default_color() {
        let s = Style::new(Color::Default, Attr::BOLD);
        assert_eq!(emit(|w| style(w, s)), "\x1b[39;1m");
    }

    // ── Modes ───────────────────────────────────────────────────────────

    #[test]
    fn sync_sequences() {
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
    }

    #[test]
    fn alt_screen_sequences() {
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
    }

    // ── Cursor Shape ────────────────────────────────────────────────────

    #[test]
    fn cursor_shapes() {
        assert_eq!(
            emit(|w| set_cursor_shape(w, CursorShape::Default)),
            "\x1b[0 q"
        );
        assert_eq!(
            emit(|w| set_cursor_shape(w, CursorShape::BlinkBar)),
            "\x1b[5 q"
        );
    }

    // ── Composition ─────────────────────────────────────────────────────

    #[test]
    fn multiple_sequences_compose() {
        let mut buf = Vec::new();
        cursor_to(&mut buf, 5, 3).unwrap();
        clear_line(&mut buf).unwrap();
        let gray = Style::new(Color::DARK_GRAY, Attr::empty());
        style(&mut buf, gray).unwrap();
        reset(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "\x1b[4;6H\x1b[K\x1b[90m\x1b[0m");
    }
}
