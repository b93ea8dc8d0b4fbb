// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal session — raw input and the editing screen.
//
// Entering a session switches stdin's line discipline to raw bytes
// (`RawMode`) and sets the screen up for drawing: alternate buffer, cleared,
// blinking bar cursor. Leaving reverses both, and dropping an entered
// `Terminal` leaves it.
//
// A panic mid-session would otherwise strand the shell without echo. The
// panic hook writes `SCREEN_RESTORE` straight to fd 1, since the painter may
// be holding the stdout lock, then reapplies the saved termios before the
// previous hook prints the message.

use std::io::{self, Write};
use std::sync::Once;
#[cfg(unix)]
use std::sync::Mutex;

use tracing::debug;

use crate::ansi;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when stdout is not a terminal.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Window size of stdout via `TIOCGWINSZ`. `None` when stdout is not a
    /// terminal or reports a zero dimension.
    #[cfg(unix)]
    #[must_use]
    pub fn query() -> Option<Self> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
            return None;
        }
        (ws.ws_col > 0 && ws.ws_row > 0).then_some(Self {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn query() -> Option<Self> {
        None
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Alternate buffer, cleared, blinking bar cursor.
fn write_enter_screen(out: &mut impl Write) -> io::Result<()> {
    ansi::enter_alt_screen(out)?;
    ansi::clear_screen(out)?;
    ansi::set_cursor_shape(out, ansi::CursorShape::BlinkBar)
}

/// Undo whatever a frame or [`write_enter_screen`] may have left set. The
/// alternate buffer goes last so the shell's screen returns unstyled.
fn write_leave_screen(out: &mut impl Write) -> io::Result<()> {
    ansi::end_sync(out)?;
    ansi::reset(out)?;
    ansi::set_cursor_shape(out, ansi::CursorShape::Default)?;
    ansi::cursor_show(out)?;
    ansi::exit_alt_screen(out)
}

/// The bytes of [`write_leave_screen`], for the panic hook.
const SCREEN_RESTORE: &[u8] = b"\x1b[?2026l\x1b[0m\x1b[0 q\x1b[?25h\x1b[?1049l";

// ─── Raw Mode ────────────────────────────────────────────────────────────────

/// Saved termios for the panic hook, which cannot reach the `Terminal`.
#[cfg(unix)]
static PANIC_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Byte-at-a-time input with no echo, no signal keys, and no CR/NL or output
/// translation. Enter arrives as 13, Ctrl-C as 3.
#[cfg(unix)]
fn make_raw(t: &mut libc::termios) {
    t.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
    t.c_cflag |= libc::CS8;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
}

/// A descriptor switched to raw mode, with the settings to put back.
#[cfg(unix)]
struct RawMode {
    fd: libc::c_int,
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch `fd` to raw mode. `Ok(None)` when `fd` is not a terminal.
    fn enable(fd: libc::c_int) -> io::Result<Option<Self>> {
        if unsafe { libc::isatty(fd) } == 0 {
            return Ok(None);
        }

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut attrs = saved;
        make_raw(&mut attrs);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut slot) = PANIC_TERMIOS.lock() {
            *slot = Some(saved);
        }
        debug!(fd, "raw mode on");
        Ok(Some(Self { fd, saved }))
    }

    fn restore(self) -> io::Result<()> {
        if let Ok(mut slot) = PANIC_TERMIOS.lock() {
            *slot = None;
        }
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &raw const self.saved) } != 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(fd = self.fd, "raw mode off");
        Ok(())
    }
}

// ─── Panic Hook ──────────────────────────────────────────────────────────────

static PANIC_HOOK: Once = Once::new();

fn install_panic_restore() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

/// Best effort; errors are ignored.
#[cfg(unix)]
fn restore_after_panic() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            SCREEN_RESTORE.as_ptr().cast::<libc::c_void>(),
            SCREEN_RESTORE.len(),
        );
    }
    if let Ok(slot) = PANIC_TERMIOS.lock() {
        if let Some(saved) = slot.as_ref() {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved);
            }
        }
    }
}

#[cfg(not(unix))]
fn restore_after_panic() {
    let mut out = io::stdout();
    let _ = out.write_all(SCREEN_RESTORE);
    let _ = out.flush();
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// The editing session's hold on the terminal.
///
/// [`enter`](Self::enter) and [`leave`](Self::leave) only act on a change of
/// state, so repeated calls are harmless.
pub struct Terminal {
    size: Size,
    active: bool,
    #[cfg(unix)]
    raw: Option<RawMode>,
}

impl Terminal {
    /// A handle sized to the current window, or [`Size::FALLBACK`].
    #[must_use]
    pub fn new() -> Self {
        let size = Size::query().unwrap_or(Size::FALLBACK);
        debug!(cols = size.cols, rows = size.rows, "terminal size");
        Self {
            size,
            active: false,
            #[cfg(unix)]
            raw: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-read the window size after SIGWINCH. The last known size is kept
    /// if the query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = Size::query() {
            self.size = size;
        }
        self.size
    }

    /// Raw mode on, then the editing screen.
    ///
    /// # Errors
    ///
    /// Returns an error if termios cannot be changed or stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_restore();

        #[cfg(unix)]
        {
            self.raw = RawMode::enable(libc::STDIN_FILENO)?;
        }
        self.active = true;

        let mut out = io::stdout().lock();
        write_enter_screen(&mut out)?;
        out.flush()
    }

    /// The shell's screen back, then cooked mode.
    ///
    /// Termios is restored even if writing the screen sequences fails.
    ///
    /// # Errors
    ///
    /// The first failure of either step.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut out = io::stdout().lock();
        let screen = write_leave_screen(&mut out).and_then(|()| out.flush());
        drop(out);

        #[cfg(unix)]
        {
            if let Some(raw) = self.raw.take() {
                raw.restore()?;
            }
        }
        debug!("terminal restored");
        screen
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
