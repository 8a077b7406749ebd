//! src/controller/navigator.rs
//! ============================================================================
//! # `PageNavigator`: Interactive Select-One-of-N Loop
//!
//! Reads keys from a [`Console`], feeds them to [`PageState`] and redraws only
//! what a transition invalidated:
//! - cursor move: the old row loses its highlight
//! - page change: header and all rows are redrawn, stale lines cleared
//! - before every read: the current row is highlighted
//!
//! The loop ends with exactly one [`SelectionOutcome`].

use tracing::{debug, info, instrument};

use crate::controller::keymap::NavKey;
use crate::error::AppError;
use crate::model::file_list::FileListModel;
use crate::model::page_state::{PageState, Transition};
use crate::view::console::{Console, HELP_TEXT, RowView, ScreenLayout};

/// Terminal result of a selection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// 1-based position of the chosen item.
    Selected(usize),

    Cancelled,

    /// Nothing to choose from: empty list or a start index past its end.
    NoContent,
}

impl SelectionOutcome {
    /// 0-based list index of the selection, if any.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Selected(position) => position.checked_sub(1),
            Self::Cancelled | Self::NoContent => None,
        }
    }
}

pub struct PageNavigator<'a, C: Console> {
    list: &'a FileListModel,
    console: &'a mut C,
    page_size: usize,
    label: &'a str,
    layout: ScreenLayout,
    start_index: usize,
}

impl<'a, C: Console> PageNavigator<'a, C> {
    pub fn new(
        list: &'a FileListModel,
        console: &'a mut C,
        page_size: usize,
        label: &'a str,
    ) -> Result<Self, AppError> {
        if page_size == 0 {
            return Err(AppError::invalid_input(
                "page_size",
                "must hold at least one item",
            ));
        }

        Ok(Self {
            list,
            console,
            page_size,
            label,
            layout: ScreenLayout::default(),
            start_index: 0,
        })
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: ScreenLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Open on `index` (0-based) instead of the first item.
    #[must_use]
    pub const fn starting_at(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(
            operation_type = "selection",
            items = self.list.item_count(),
            page_size = self.page_size
        )
    )]
    pub fn run(mut self) -> Result<SelectionOutcome, AppError> {
        let mut state = match PageState::at(self.list.item_count(), self.page_size, self.start_index)
        {
            Ok(state) => state,
            Err(AppError::IndexOutOfRange { index, count }) => {
                info!(
                    marker = "NAVIGATOR_NO_CONTENT",
                    operation_type = "selection",
                    "No content for start index {index} ({count} items)"
                );
                return Ok(SelectionOutcome::NoContent);
            }
            Err(e) => return Err(e),
        };

        self.console.render_help(HELP_TEXT)?;
        self.draw_page(&state)?;

        loop {
            self.draw_row(&state, state.current_index(), true)?;

            let key: NavKey = self.console.read_key()?;
            let transition = state.apply(key);

            debug!(
                marker = "NAVIGATOR_TRANSITION",
                operation_type = "selection",
                page = state.page_number(),
                index = state.current_index(),
                "{key:?} -> {transition:?}"
            );

            match transition {
                Transition::Unchanged => {}

                Transition::Moved { from } => self.draw_row(&state, from, false)?,

                Transition::PageChanged { .. } => self.draw_page(&state)?,

                Transition::Selected(position) => {
                    info!(
                        marker = "NAVIGATOR_SELECTED",
                        operation_type = "selection",
                        position,
                        "Item selected"
                    );
                    return Ok(SelectionOutcome::Selected(position));
                }

                Transition::Cancelled => {
                    info!(
                        marker = "NAVIGATOR_CANCELLED",
                        operation_type = "selection",
                        "Selection cancelled"
                    );
                    return Ok(SelectionOutcome::Cancelled);
                }
            }
        }
    }

    fn draw_page(&mut self, state: &PageState) -> Result<(), AppError> {
        self.console.render_header(
            self.label,
            state.item_count(),
            state.page_number() + 1,
            state.page_count(),
        )?;

        for index in state.visible() {
            self.draw_row(state, index, false)?;
        }

        let shown = state.page_end() - state.page_start() + 1;
        for slot in shown..state.page_size() {
            self.console.clear_row(self.layout.row_line(slot))?;
        }

        Ok(())
    }

    fn draw_row(&mut self, state: &PageState, index: usize, highlighted: bool) -> Result<(), AppError> {
        // Rows of another page are not on screen.
        let Some(slot) = state.slot_of(index) else {
            return Ok(());
        };

        let row = RowView {
            index,
            screen_line: self.layout.row_line(slot),
            name: self.list.name_bytes_at(index)?,
        };
        self.console.render_row(&row, highlighted)
    }
}

/// Parse `buffer` and let the operator pick one item, starting on the first.
pub fn select<C: Console>(
    console: &mut C,
    buffer: &[u8],
    page_size: usize,
    item_label: &str,
) -> Result<SelectionOutcome, AppError> {
    select_from(console, buffer, page_size, item_label, 0)
}

/// Like [`select`], opening on `start_index` (0-based).
pub fn select_from<C: Console>(
    console: &mut C,
    buffer: &[u8],
    page_size: usize,
    item_label: &str,
    start_index: usize,
) -> Result<SelectionOutcome, AppError> {
    let list = FileListModel::parse(buffer)?;
    PageNavigator::new(&list, console, page_size, item_label)?
        .starting_at(start_index)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Help,
        Header {
            total: usize,
            page_no: usize,
            page_count: usize,
        },
        Row {
            index: usize,
            line: u16,
            highlighted: bool,
        },
        Clear(u16),
        Read,
    }

    /// Console double that replays keys and records every call.
    #[derive(Default)]
    struct ScriptedConsole {
        keys: VecDeque<NavKey>,
        calls: Vec<Call>,
    }

    impl ScriptedConsole {
        fn with_keys(keys: &[NavKey]) -> Self {
            Self {
                keys: keys.iter().copied().collect(),
                calls: Vec::new(),
            }
        }

        fn reads(&self) -> usize {
            self.calls.iter().filter(|c| **c == Call::Read).count()
        }

        /// Calls recorded after the n-th key read.
        fn after_read(&self, n: usize) -> &[Call] {
            let pos = self
                .calls
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == Call::Read)
                .nth(n - 1)
                .map_or(self.calls.len(), |(i, _)| i + 1);
            &self.calls[pos..]
        }
    }

    impl Console for ScriptedConsole {
        fn render_header(
            &mut self,
            _label: &str,
            total: usize,
            page_no: usize,
            page_count: usize,
        ) -> Result<(), AppError> {
            self.calls.push(Call::Header {
                total,
                page_no,
                page_count,
            });
            Ok(())
        }

        fn render_row(&mut self, row: &RowView<'_>, highlighted: bool) -> Result<(), AppError> {
            self.calls.push(Call::Row {
                index: row.index,
                line: row.screen_line,
                highlighted,
            });
            Ok(())
        }

        fn clear_row(&mut self, screen_line: u16) -> Result<(), AppError> {
            self.calls.push(Call::Clear(screen_line));
            Ok(())
        }

        fn render_help(&mut self, _text: &str) -> Result<(), AppError> {
            self.calls.push(Call::Help);
            Ok(())
        }

        fn read_key(&mut self) -> Result<NavKey, AppError> {
            self.calls.push(Call::Read);
            self.keys
                .pop_front()
                .ok_or_else(|| AppError::Terminal("key script exhausted".into()))
        }
    }

    fn list_of(count: usize) -> FileListModel {
        FileListModel::from_names((0..count).map(|i| format!("GAME{i}.STC")))
    }

    fn row(index: usize, line: u16, highlighted: bool) -> Call {
        Call::Row {
            index,
            line,
            highlighted,
        }
    }

    #[test]
    fn test_empty_list_is_no_content_without_input() {
        let mut console = ScriptedConsole::with_keys(&[NavKey::Confirm]);
        let outcome = select(&mut console, b"\0\0", 4, "ROM images").unwrap();
        assert_eq!(outcome, SelectionOutcome::NoContent);
        assert!(console.calls.is_empty());
    }

    #[test]
    fn test_start_past_end_is_no_content() {
        let mut console = ScriptedConsole::with_keys(&[NavKey::Confirm]);
        let outcome = select_from(&mut console, b"A\0BB\0\0", 2, "ROM images", 2).unwrap();
        assert_eq!(outcome, SelectionOutcome::NoContent);
        assert_eq!(console.reads(), 0);
    }

    #[test]
    fn test_parse_errors_abort_before_loop() {
        let mut console = ScriptedConsole::with_keys(&[NavKey::Confirm]);
        let err = select(&mut console, b"A\0BB", 2, "ROM images").unwrap_err();
        assert!(err.is_list_error());
        assert!(console.calls.is_empty());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let list = list_of(3);
        let mut console = ScriptedConsole::default();
        assert!(matches!(
            PageNavigator::new(&list, &mut console, 0, "ROM images"),
            Err(AppError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_position_has_no_index() {
        assert_eq!(SelectionOutcome::Selected(0).index(), None);
        assert_eq!(SelectionOutcome::Selected(3).index(), Some(2));
        assert_eq!(SelectionOutcome::NoContent.index(), None);
    }

    #[test]
    fn test_immediate_confirm_selects_first() {
        let mut console = ScriptedConsole::with_keys(&[NavKey::Confirm]);
        let outcome = select(&mut console, b"A\0BB\0\0", 2, "ROM images").unwrap();

        assert_eq!(outcome, SelectionOutcome::Selected(1));
        assert_eq!(outcome.index(), Some(0));
        assert_eq!(
            console.calls,
            vec![
                Call::Help,
                Call::Header {
                    total: 2,
                    page_no: 1,
                    page_count: 1
                },
                row(0, 4, false),
                row(1, 5, false),
                row(0, 4, true),
                Call::Read,
            ]
        );
    }

    #[test]
    fn test_down_moves_highlight() {
        let list = list_of(3);
        let mut console = ScriptedConsole::with_keys(&[NavKey::Down, NavKey::Confirm]);
        let outcome = PageNavigator::new(&list, &mut console, 5, "ROM images")
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome, SelectionOutcome::Selected(2));
        assert_eq!(
            console.after_read(1),
            &[row(0, 4, false), row(1, 5, true), Call::Read]
        );
        // Rows 3 and 4 of the page are empty and cleared.
        assert!(console.calls.contains(&Call::Clear(7)));
        assert!(console.calls.contains(&Call::Clear(8)));
    }

    #[test]
    fn test_paging_clamps_and_clears_last_page() {
        let list = list_of(5);
        let keys = [NavKey::Right, NavKey::Right, NavKey::Right, NavKey::Confirm];
        let mut console = ScriptedConsole::with_keys(&keys);
        let outcome = PageNavigator::new(&list, &mut console, 2, "ROM images")
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome, SelectionOutcome::Selected(5));

        // Second RIGHT lands on page 3 of 3 holding a single item.
        assert_eq!(
            console.after_read(2)[..4],
            [
                Call::Header {
                    total: 5,
                    page_no: 3,
                    page_count: 3
                },
                row(4, 4, false),
                Call::Clear(5),
                row(4, 4, true),
            ]
        );

        // Third RIGHT is clamped: only the highlight is refreshed.
        assert_eq!(console.after_read(3), &[row(4, 4, true), Call::Read]);
    }

    #[test]
    fn test_cancel_and_other_keys() {
        let list = list_of(4);
        let mut console =
            ScriptedConsole::with_keys(&[NavKey::Other, NavKey::Up, NavKey::Cancel]);
        let outcome = PageNavigator::new(&list, &mut console, 2, "ROM images")
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome, SelectionOutcome::Cancelled);
        assert_eq!(outcome.index(), None);
        assert_eq!(console.reads(), 3);
    }

    #[test]
    fn test_left_returns_to_previous_page() {
        let list = list_of(6);
        let keys = [NavKey::Left, NavKey::Down, NavKey::Confirm];
        let mut console = ScriptedConsole::with_keys(&keys);
        let outcome = PageNavigator::new(&list, &mut console, 3, "ROM images")
            .unwrap()
            .starting_at(5)
            .run()
            .unwrap();

        assert_eq!(outcome, SelectionOutcome::Selected(2));
    }

    #[test]
    fn test_custom_layout() {
        let list = list_of(1);
        let layout = ScreenLayout {
            top_line: 0,
            help_line: 10,
            column_width: 40,
        };
        let mut console = ScriptedConsole::with_keys(&[NavKey::Confirm]);
        PageNavigator::new(&list, &mut console, 2, "ROM images")
            .unwrap()
            .with_layout(layout)
            .run()
            .unwrap();

        assert!(console.calls.contains(&row(0, 2, true)));
        assert!(console.calls.contains(&Call::Clear(3)));
    }

    #[test]
    fn test_console_errors_propagate() {
        let list = list_of(2);
        let mut console = ScriptedConsole::default();
        let err = PageNavigator::new(&list, &mut console, 2, "ROM images")
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, AppError::Terminal(_)));
    }
}
