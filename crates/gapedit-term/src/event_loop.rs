// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — read, dispatch, paint, repeat.
//
// Everything happens on the calling thread. Each iteration waits briefly for
// stdin, hands any bytes to the application, and repaints when the
// application reports a change. One input chunk is handled completely before
// the next read, so the application never sees interleaved work.
//
// # SIGWINCH Handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The signal also interrupts the poll, so the loop notices the
// flag immediately, re-queries the size, tells the application, and repaints.
//
// # Idle
//
// When the poll times out with no input the application gets `on_idle`,
// which is where an incomplete escape prefix can be abandoned.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use gapedit_core::render::FrameModel;
use tracing::{debug, info};

use crate::output::{FramePainter, OutputBuffer};
use crate::reader::{POLL_TIMEOUT_MS, ReadEvent, StdinReader};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only sets [`SIGWINCH_RECEIVED`]; writing an atomic is
/// async-signal-safe. No `SA_RESTART`, so a blocked `poll` returns `EINTR`.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running; nothing visible changed.
    Continue,
    /// Keep running and repaint.
    Redraw,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Only [`on_input`](App::on_input) and [`frame`](App::frame) are required.
pub trait App {
    /// Handle a chunk of raw stdin bytes.
    ///
    /// # Errors
    ///
    /// An error stops the loop and is returned from [`EventLoop::run`].
    fn on_input(&mut self, bytes: &[u8]) -> io::Result<Action>;

    /// No input arrived within the poll timeout.
    fn on_idle(&mut self) {}

    /// The terminal changed size. A repaint follows.
    fn on_resize(&mut self, _size: Size) {}

    /// The frame to draw for the current state.
    fn frame(&self) -> FrameModel;
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Configuration for the event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long each poll waits for input before reporting idle
    /// (milliseconds).
    pub poll_timeout_ms: i32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: POLL_TIMEOUT_MS,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue { dirty: bool },
    Quit,
}

/// The terminal event loop.
///
/// Owns the terminal, the stdin reader, and the output buffer. Call
/// [`run`](Self::run) to enter the loop; it returns when the application
/// signals [`Action::Quit`] or stdin closes.
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use gapedit_core::render::FrameModel;
/// use gapedit_core::position::ScreenPos;
/// use gapedit_term::event_loop::{Action, App, EventLoop};
///
/// struct Blank;
///
/// impl App for Blank {
///     fn on_input(&mut self, bytes: &[u8]) -> io::Result<Action> {
///         Ok(if bytes.contains(&b'q') { Action::Quit } else { Action::Continue })
///     }
///
///     fn frame(&self) -> FrameModel {
///         FrameModel { rows: Vec::new(), cursor: ScreenPos::default() }
///     }
/// }
///
/// let mut event_loop = EventLoop::new();
/// event_loop.run(&mut Blank)?;
/// # Ok::<(), io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    reader: StdinReader,
    painter: FramePainter,
    out: OutputBuffer,
    config: LoopConfig,
}

impl EventLoop {
    /// Create a new event loop with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Create a new event loop with custom timing configuration.
    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self::with_reader(config, StdinReader::new())
    }

    /// Create an event loop that reads from `reader` instead of stdin.
    #[must_use]
    pub fn with_reader(config: LoopConfig, reader: StdinReader) -> Self {
        Self {
            terminal: Terminal::new(),
            reader,
            painter: FramePainter::new(),
            out: OutputBuffer::new(),
            config,
        }
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application quits or stdin closes.
    ///
    /// Enters editing mode and installs the SIGWINCH handler first; the
    /// terminal is restored on exit even if the loop errored.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave, reading, painting, or the
    /// application fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = self.run_inner(app);

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        self.paint(&*app)?; // First frame always renders.
        loop {
            match self.step(app)? {
                Step::Quit => return Ok(()),
                Step::Continue { dirty: true } => self.paint(&*app)?,
                Step::Continue { dirty: false } => {}
            }
        }
    }

    /// Wait for one batch of input and let the application handle it.
    fn step(&mut self, app: &mut impl App) -> io::Result<Step> {
        let mut dirty = false;

        match self.reader.poll_read(self.config.poll_timeout_ms)? {
            ReadEvent::Bytes(bytes) => match app.on_input(bytes)? {
                Action::Quit => return Ok(Step::Quit),
                Action::Redraw => dirty = true,
                Action::Continue => {}
            },
            ReadEvent::Timeout => app.on_idle(),
            ReadEvent::Eof => {
                info!("stdin closed");
                return Ok(Step::Quit);
            }
        }

        if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
            let size = self.terminal.refresh_size();
            debug!(cols = size.cols, rows = size.rows, "SIGWINCH");
            app.on_resize(size);
            dirty = true;
        }

        Ok(Step::Continue { dirty })
    }

    /// Plan, serialize, and write one frame with a single write.
    fn paint(&mut self, app: &impl App) -> io::Result<()> {
        let frame = app.frame();
        self.painter
            .paint(&mut self.out, &frame, self.terminal.size())?;
        self.out.flush_stdout()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gapedit_core::position::ScreenPos;

    /// Records what the loop hands it.
    #[derive(Default)]
    struct Recorder {
        input: Vec<u8>,
        idles: usize,
    }

    impl App for Recorder {
        fn on_input(&mut self, bytes: &[u8]) -> io::Result<Action> {
            self.input.extend_from_slice(bytes);
            Ok(if bytes.contains(&b'q') {
                Action::Quit
            } else {
                Action::Redraw
            })
        }

        fn on_idle(&mut self) {
            self.idles += 1;
        }

        fn frame(&self) -> FrameModel {
            FrameModel {
                rows: Vec::new(),
                cursor: ScreenPos::default(),
            }
        }
    }

    // ── LoopConfig ──────────────────────────────────────────────

    #[test]
    fn default_config_uses_reader_timeout() {
        assert_eq!(LoopConfig::default().poll_timeout_ms, POLL_TIMEOUT_MS);
    }

    // ── App trait defaults ─────────────────────────────────────

    #[test]
    fn app_default_hooks_are_noops() {
        struct Minimal;
        impl App for Minimal {
            fn on_input(&mut self, _bytes: &[u8]) -> io::Result<Action> {
                Ok(Action::Continue)
            }
            fn frame(&self) -> FrameModel {
                FrameModel {
                    rows: Vec::new(),
                    cursor: ScreenPos::default(),
                }
            }
        }
        let mut app = Minimal;
        app.on_idle();
        app.on_resize(Size { cols: 100, rows: 50 });
        assert!(app.frame().rows.is_empty());
    }

    // ── step ───────────────────────────────────────────────────

    #[cfg(unix)]
    mod stepping {
        use super::*;
        use std::os::unix::io::RawFd;

        fn pipe() -> (RawFd, RawFd) {
            let mut fds = [0 as RawFd; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            (fds[0], fds[1])
        }

        fn send(fd: RawFd, bytes: &[u8]) {
            let n = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(usize::try_from(n).unwrap(), bytes.len());
        }

        fn event_loop(fd: RawFd) -> EventLoop {
            let config = LoopConfig { poll_timeout_ms: 0 };
            EventLoop::with_reader(config, StdinReader::from_fd(fd))
        }

        #[test]
        fn input_then_idle_then_quit() {
            let (rx, tx) = pipe();
            let mut ev = event_loop(rx);
            let mut app = Recorder::default();

            send(tx, b"ab");
            assert_eq!(ev.step(&mut app).unwrap(), Step::Continue { dirty: true });
            assert_eq!(app.input, b"ab");

            // A concurrent SIGWINCH may mark the step dirty; only the idle
            // callback is certain.
            assert!(matches!(ev.step(&mut app).unwrap(), Step::Continue { .. }));
            assert_eq!(app.idles, 1);

            send(tx, b"q");
            assert_eq!(ev.step(&mut app).unwrap(), Step::Quit);

            unsafe {
                libc::close(rx);
                libc::close(tx);
            }
        }

        #[test]
        fn eof_quits() {
            let (rx, tx) = pipe();
            unsafe { libc::close(tx) };
            let mut ev = event_loop(rx);
            let mut app = Recorder::default();
            assert_eq!(ev.step(&mut app).unwrap(), Step::Quit);
            unsafe { libc::close(rx) };
        }
    }
}
