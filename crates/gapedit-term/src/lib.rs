// SPDX-License-Identifier: MIT
//
// gapedit-term — terminal boundary for gapedit.
//
// Everything that touches the device lives here: raw mode and size queries
// (`terminal`), escape sequence encoding (`ansi`), serialization of a planned
// frame into a single buffered write (`output`), non-blocking stdin reads
// (`reader`), and the single-threaded read → dispatch → paint loop
// (`event_loop`). The editing core never sees a file descriptor.
//
// No TUI framework sits underneath. Escape sequences are written directly
// and termios is driven through libc.

pub mod ansi;
pub mod event_loop;
pub mod output;
pub mod reader;
pub mod terminal;
