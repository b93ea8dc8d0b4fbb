//! Input decoding.
//!
//! Turns the raw byte stream from a terminal in raw mode into [`Input`]
//! values. The decoder understands exactly what the editor acts on:
//!
//! | bytes              | input                         |
//! |--------------------|-------------------------------|
//! | `ESC [ A/B/C/D`    | arrow up / down / right / left |
//! | `127`              | backspace                     |
//! | `13`               | enter                         |
//! | `9`                | tab                           |
//! | `q`                | quit                          |
//! | other `0..=31`     | ignored control byte          |
//! | any other byte     | insert that byte              |
//!
//! An escape sequence is always read as `ESC` plus two bytes. Anything other
//! than the four arrows decodes to [`Input::UnknownEscape`], which the editor
//! reports and ignores.
//!
//! # Split reads
//!
//! A sequence may arrive across several reads. The decoder keeps the
//! incomplete tail in a small internal buffer and resumes on the next call
//! to [`advance`](InputDecoder::advance). [`flush`](InputDecoder::flush)
//! gives up on a pending tail at end of input and reports it as
//! [`Input::IncompleteEscape`].

use tracing::trace;

const ESC: u8 = 0x1b;
const BACKSPACE: u8 = 127;
const ENTER: u8 = 13;
const TAB: u8 = 9;
const QUIT: u8 = b'q';

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Enter,
    Tab,
    Quit,
    /// A byte to insert at the cursor.
    Char(u8),
    /// A control byte the editor does not handle.
    Control(u8),
    /// `ESC` followed by two bytes that are not an arrow key.
    UnknownEscape([u8; 2]),
    /// `ESC`, and the byte after it if one arrived, abandoned before the
    /// sequence completed.
    IncompleteEscape(Option<u8>),
}

impl Input {
    /// Classify a single byte that is not part of an escape sequence.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            QUIT => Self::Quit,
            BACKSPACE => Self::Backspace,
            ENTER => Self::Enter,
            TAB => Self::Tab,
            0..=31 => Self::Control(byte),
            _ => Self::Char(byte),
        }
    }

    const fn from_escape(seq: [u8; 2]) -> Self {
        match seq {
            [b'[', b'A'] => Self::Up,
            [b'[', b'B'] => Self::Down,
            [b'[', b'C'] => Self::Right,
            [b'[', b'D'] => Self::Left,
            _ => Self::UnknownEscape(seq),
        }
    }
}

/// Incremental byte-stream decoder.
#[derive(Debug, Default)]
pub struct InputDecoder {
    /// Bytes of an escape sequence still waiting for completion.
    pending: Vec<u8>,
}

impl InputDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// True while an escape sequence is incomplete.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed raw bytes and collect the complete inputs they finish.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Input> {
        let mut out = Vec::new();
        for &byte in bytes {
            if self.pending.is_empty() {
                if byte == ESC {
                    self.pending.push(byte);
                } else {
                    out.push(Input::from_byte(byte));
                }
                continue;
            }

            self.pending.push(byte);
            if let [ESC, first, second] = self.pending[..] {
                self.pending.clear();
                out.push(Input::from_escape([first, second]));
            }
        }
        trace!(read = bytes.len(), decoded = out.len(), "decoded input");
        out
    }

    /// Abandon an incomplete escape sequence, if there is one.
    pub fn flush(&mut self) -> Option<Input> {
        let input = match self.pending[..] {
            [] => None,
            [_] => Some(Input::IncompleteEscape(None)),
            [_, next, ..] => Some(Input::IncompleteEscape(Some(next))),
        };
        self.pending.clear();
        input
    }
}
