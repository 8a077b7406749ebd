//! src/view/terminal.rs
//! ============================================================================
//! # Crossterm Console
//!
//! [`Console`] implementation for a real terminal: cursor-addressed line
//! writes, reverse video for the highlighted row, blocking key reads.
//! [`TerminalSession`] owns raw mode and the alternate screen for as long as
//! the selector is shown.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tracing::{info, warn};

use crate::controller::keymap::{KeyBindings, NavKey};
use crate::error::AppError;
use crate::view::console::{Console, RowView, ScreenLayout, centered, pad_row};

pub struct CrosstermConsole<W: Write> {
    out: W,
    keys: KeyBindings,
    layout: ScreenLayout,
}

impl CrosstermConsole<Stdout> {
    #[must_use]
    pub fn stdout(keys: KeyBindings, layout: ScreenLayout) -> Self {
        Self::new(io::stdout(), keys, layout)
    }
}

impl<W: Write> CrosstermConsole<W> {
    pub const fn new(out: W, keys: KeyBindings, layout: ScreenLayout) -> Self {
        Self { out, keys, layout }
    }

    /// Clear the screen and print `title` centered on the first line.
    pub fn begin(&mut self, title: &str) -> Result<(), AppError> {
        let width = usize::from(self.layout.column_width);
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(centered(title, width))
        )
        .map_err(|e| AppError::terminal(&e))?;
        self.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush(&mut self) -> Result<(), AppError> {
        self.out.flush().map_err(|e| AppError::terminal(&e))
    }
}

impl<W: Write> Console for CrosstermConsole<W> {
    fn render_header(
        &mut self,
        label: &str,
        total: usize,
        page_no: usize,
        page_count: usize,
    ) -> Result<(), AppError> {
        let top = self.layout.top_line;
        queue!(
            self.out,
            line_start(top),
            Clear(ClearType::UntilNewLine),
            Print(format!("{label} found: {total}. Page {page_no} of {page_count}")),
            line_start(top.saturating_add(1)),
            Clear(ClearType::UntilNewLine)
        )
        .map_err(|e| AppError::terminal(&e))?;
        self.flush()
    }

    fn render_row(&mut self, row: &RowView<'_>, highlighted: bool) -> Result<(), AppError> {
        let text = pad_row(row.name, usize::from(self.layout.column_width));

        queue!(self.out, line_start(row.screen_line)).map_err(|e| AppError::terminal(&e))?;
        if highlighted {
            queue!(self.out, SetAttribute(Attribute::Reverse))
                .map_err(|e| AppError::terminal(&e))?;
        }
        queue!(self.out, Clear(ClearType::UntilNewLine), Print(text))
            .map_err(|e| AppError::terminal(&e))?;
        if highlighted {
            queue!(self.out, SetAttribute(Attribute::NoReverse))
                .map_err(|e| AppError::terminal(&e))?;
        }
        self.flush()
    }

    fn clear_row(&mut self, screen_line: u16) -> Result<(), AppError> {
        queue!(
            self.out,
            line_start(screen_line),
            Clear(ClearType::UntilNewLine)
        )
        .map_err(|e| AppError::terminal(&e))?;
        self.flush()
    }

    fn render_help(&mut self, text: &str) -> Result<(), AppError> {
        for (offset, chunk) in text.lines().enumerate() {
            let line = u16::try_from(offset)
                .ok()
                .and_then(|offset| self.layout.help_line.checked_add(offset))
                .filter(|&line| line <= LAST_LINE);
            let Some(line) = line else {
                break;
            };
            queue!(
                self.out,
                MoveTo(0, line),
                Clear(ClearType::UntilNewLine),
                Print(chunk.trim_end_matches('\r'))
            )
            .map_err(|e| AppError::terminal(&e))?;
        }
        self.flush()
    }

    fn read_key(&mut self) -> Result<NavKey, AppError> {
        loop {
            match event::read().map_err(|e| AppError::terminal(&e))? {
                // Windows also reports releases; act on presses only.
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    return Ok(self.keys.resolve(key_event));
                }
                _ => {}
            }
        }
    }
}

/// Highest line a cursor move can address.
const LAST_LINE: u16 = u16::MAX - 1;

/// Cursor to column 0 of `line`, clamped to the addressable range.
const fn line_start(line: u16) -> MoveTo {
    MoveTo(0, if line < LAST_LINE { line } else { LAST_LINE })
}

/// Raw mode + alternate screen, restored on drop.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(&e))?;
        execute!(io::stdout(), EnterAlternateScreen, Hide).map_err(|e| AppError::terminal(&e))?;

        info!("Terminal setup complete");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

/// Leave raw mode and the alternate screen. Also used by the panic hook.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), Show, LeaveAlternateScreen)
}
