//! src/view/console.rs
//! ============================================================================
//! # Console Collaborator
//!
//! The navigator never talks to a terminal directly. Everything it draws and
//! every key it reads goes through [`Console`], so the selection logic runs
//! the same against crossterm and against a scripted test double.

use serde::{Deserialize, Serialize};

use crate::controller::keymap::NavKey;
use crate::error::AppError;

/// One list row as handed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowView<'a> {
    /// Position in the full list (0-based).
    pub index: usize,

    /// Absolute screen line the row occupies.
    pub screen_line: u16,

    /// Raw name bytes; decoded only when drawn.
    pub name: &'a [u8],
}

/// Rendering and input surface used by the navigator.
pub trait Console {
    /// Summary line: "<label> found: <total>. Page <page_no> of <page_count>".
    /// `page_no` is 1-based.
    fn render_header(
        &mut self,
        label: &str,
        total: usize,
        page_no: usize,
        page_count: usize,
    ) -> Result<(), AppError>;

    fn render_row(&mut self, row: &RowView<'_>, highlighted: bool) -> Result<(), AppError>;

    /// Blank out a row line left over from a fuller page.
    fn clear_row(&mut self, screen_line: u16) -> Result<(), AppError>;

    /// Static usage text below the list.
    fn render_help(&mut self, _text: &str) -> Result<(), AppError> {
        Ok(())
    }

    /// Block until the next key is available.
    fn read_key(&mut self) -> Result<NavKey, AppError>;
}

/// Fixed screen geometry of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLayout {
    /// Line of the summary header; rows start two lines below.
    pub top_line: u16,

    pub help_line: u16,

    /// Every row is padded to this many columns.
    pub column_width: u16,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            top_line: 2,
            help_line: 22,
            column_width: 80,
        }
    }
}

impl ScreenLayout {
    #[must_use]
    pub const fn first_row_line(&self) -> u16 {
        self.top_line.saturating_add(2)
    }

    /// Screen line of the row in `slot` (0-based position on the page).
    #[must_use]
    pub fn row_line(&self, slot: usize) -> u16 {
        let slot = u16::try_from(slot).unwrap_or(u16::MAX);
        self.first_row_line().saturating_add(slot)
    }

    /// Rows that fit between the header and the help text.
    #[must_use]
    pub const fn max_rows(&self) -> u16 {
        self.help_line.saturating_sub(self.first_row_line())
    }
}

/// Left-align `name` in exactly `width` columns, truncating longer names,
/// so a redraw overwrites whatever the line held before. Bytes that are not
/// UTF-8 are drawn as U+FFFD.
#[must_use]
pub fn pad_row(name: &[u8], width: usize) -> String {
    let mut line: String = String::from_utf8_lossy(name).chars().take(width).collect();
    let used = line.chars().count();
    line.extend(std::iter::repeat_n(' ', width - used));
    line
}

pub const HELP_TEXT: &str = "Use [UP] and [DOWN] arrows to select. [LEFT] and [RIGHT] to paginate.\r\n\
Press [ENTER] to load it. [ESC] to return to main menu.";

/// Center `text` in `width` columns by left padding. Text as wide as the
/// screen or wider is returned unchanged.
#[must_use]
pub fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat((width - len) / 2))
}
