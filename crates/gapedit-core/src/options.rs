//! Editor options.
//!
//! A small, validated set of display knobs shared by the viewport and the
//! render planner. Tab width is not an option: tabs become spaces at load
//! time and from the tab key, both using the fixed [`TAB_WIDTH`].
//!
//! | Option              | Default | Meaning                                  |
//! |---------------------|---------|------------------------------------------|
//! | `gutter_width`      | 5       | Columns reserved for line numbers        |
//! | `show_line_numbers` | true    | When false the gutter collapses to 0     |
//! | `initial_gap`       | 5       | Slack bytes given to each loaded line    |

use thiserror::Error;

use crate::gap_buffer::INITIAL_GAP;

/// Spaces per tab stop, both for load-time expansion and the tab key.
pub const TAB_WIDTH: usize = 4;

/// Default gutter width: four digits plus a separator space.
pub const LINE_NUMBER_WIDTH: u16 = 5;

/// Narrowest gutter that still fits one digit and the separator.
pub const MIN_GUTTER_WIDTH: u16 = 2;

/// Widest gutter accepted.
pub const MAX_GUTTER_WIDTH: u16 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error(
        "gutter width {0} is outside {min}..={max}",
        min = MIN_GUTTER_WIDTH,
        max = MAX_GUTTER_WIDTH
    )]
    GutterWidth(u16),
}

/// Display options for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub gutter_width: u16,
    pub show_line_numbers: bool,
    pub initial_gap: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gutter_width: LINE_NUMBER_WIDTH,
            show_line_numbers: true,
            initial_gap: INITIAL_GAP,
        }
    }
}

impl Options {
    /// Check that the options describe a usable layout.
    ///
    /// # Errors
    ///
    /// [`OptionsError::GutterWidth`] when line numbers are on and the gutter
    /// is too narrow for a label or unreasonably wide.
    pub const fn validate(&self) -> Result<(), OptionsError> {
        if self.show_line_numbers
            && (self.gutter_width < MIN_GUTTER_WIDTH || self.gutter_width > MAX_GUTTER_WIDTH)
        {
            return Err(OptionsError::GutterWidth(self.gutter_width));
        }
        Ok(())
    }

    /// Gutter width actually used for layout.
    #[inline]
    #[must_use]
    pub const fn effective_gutter(&self) -> u16 {
        if self.show_line_numbers {
            self.gutter_width
        } else {
            0
        }
    }
}
