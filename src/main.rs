// SPDX-License-Identifier: MIT
//
// gapedit — a small terminal text editor built on per-line gap buffers.
//
// This is the main binary that wires the two crates together:
//
//   gapedit-term → raw mode, stdin polling, frame output, event loop
//   gapedit-core → document, cursor, viewport, input decoding, frame planning
//
// `Session` implements gapedit-term's App trait around the core `Editor`.
// Each chunk of input flows through:
//
//   stdin → on_input → Editor::feed → decode → cursor/document mutation
//   frame → RenderPlanner::plan → FramePainter → one write to the terminal
//
// Logs go to a file (never the screen being drawn). The filter comes from
// GAPEDIT_LOG and defaults to `info`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gapedit_core::editor::{Editor, Effect};
use gapedit_core::options::{LINE_NUMBER_WIDTH, Options};
use gapedit_core::render::FrameModel;
use gapedit_term::event_loop::{Action, App, EventLoop};
use gapedit_term::terminal::Size;

const LOG_ENV: &str = "GAPEDIT_LOG";
const DEFAULT_LOG_FILE: &str = "debug.log";

// ─── CLI ─────────────────────────────────────────────────────────────────────

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "gapedit", version, about = "A small terminal text editor")]
struct Cli {
    /// File to open. Starts with an empty document when omitted.
    path: Option<PathBuf>,

    /// Where to write the log.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Disable logging entirely.
    #[arg(long)]
    no_log: bool,

    /// Width of the line-number gutter, separator space included.
    #[arg(long, value_name = "N", default_value_t = LINE_NUMBER_WIDTH)]
    gutter: u16,

    /// Hide line numbers and give the gutter's columns to text.
    #[arg(long)]
    no_numbers: bool,
}

impl Cli {
    fn options(&self) -> Result<Options> {
        let options = Options {
            gutter_width: self.gutter,
            show_line_numbers: !self.no_numbers,
            ..Options::default()
        };
        options.validate().context("invalid --gutter")?;
        Ok(options)
    }
}

// ─── Startup ─────────────────────────────────────────────────────────────────

/// Install the file logger. The returned guard flushes pending records when
/// dropped, so it must live until the session ends.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    if cli.no_log {
        return Ok(None);
    }

    let dir = match cli.log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Some(file_name) = cli.log_file.file_name() else {
        bail!("log file path {} has no file name", cli.log_file.display());
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install the log subscriber")?;

    Ok(Some(guard))
}

/// Read the file to edit, or nothing when no path was given.
fn read_source(path: Option<&Path>) -> Result<Vec<u8>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "file read");
    Ok(bytes)
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The core editor as seen by the event loop.
struct Session {
    editor: Editor,
}

impl Session {
    fn new(text: &[u8], size: Size, options: Options) -> Result<Self> {
        let editor = Editor::from_text(text, size.cols, size.rows, options)
            .context("failed to load the document")?;
        Ok(Self { editor })
    }
}

impl App for Session {
    fn on_input(&mut self, bytes: &[u8]) -> io::Result<Action> {
        match self.editor.feed(bytes) {
            Ok(Effect::Quit) => Ok(Action::Quit),
            Ok(Effect::Redraw) => Ok(Action::Redraw),
            Ok(Effect::Unchanged) => Ok(Action::Continue),
            // Only the failing input was dropped; keep the session alive.
            Err(e) => {
                error!(error = %e, "edit failed");
                Ok(Action::Redraw)
            }
        }
    }

    fn on_idle(&mut self) {
        self.editor.finish_input();
    }

    fn on_resize(&mut self, size: Size) {
        self.editor.resize(size.cols, size.rows);
    }

    fn frame(&self) -> FrameModel {
        self.editor.frame()
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;
    let options = cli.options()?;
    let text = read_source(cli.path.as_deref())?;

    let mut event_loop = EventLoop::new();
    let mut session = Session::new(&text, event_loop.size(), options)?;
    info!(
        lines = session.editor.document().line_count(),
        cols = event_loop.size().cols,
        rows = event_loop.size().rows,
        "session start"
    );

    event_loop
        .run(&mut session)
        .context("terminal session failed")?;
    info!("session end");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
