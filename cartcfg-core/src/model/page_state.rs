//! ``src/model/page_state.rs``
//! ============================================================================
//! # `PageState`: Pagination and Selection Cursor
//!
//! Pure state machine behind the selector: which page is shown and which
//! item on it is highlighted. No rendering happens here; every key yields a
//! [`Transition`] that tells the navigator what must be redrawn.
//!
//! Invariant kept after every transition:
//! `page_start() <= current_index() <= page_end()`.

use std::ops::RangeInclusive;

use crate::controller::keymap::NavKey;
use crate::error::AppError;

/// Index of the last page for `item_count` items, 0 for an empty list.
#[must_use]
pub const fn max_page(item_count: usize, page_size: usize) -> usize {
    if item_count == 0 || page_size == 0 {
        0
    } else {
        (item_count - 1) / page_size
    }
}

/// Effect of a single key on the page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed, including clamped moves at a boundary.
    Unchanged,

    /// Cursor moved within the page; `from` is the previously highlighted index.
    Moved { from: usize },

    /// A different page is shown; the cursor sits on its first item.
    PageChanged { from_page: usize },

    /// Item chosen; carries the 1-based position.
    Selected(usize),

    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    item_count: usize,
    page_size: usize,
    page_number: usize,
    current_index: usize,
}

impl PageState {
    /// Start with the cursor on `start_index`, showing the page that holds it.
    ///
    /// Fails with `InvalidInput` for a zero page size and `IndexOutOfRange`
    /// when `start_index` is not an item (which covers the empty list).
    pub fn at(item_count: usize, page_size: usize, start_index: usize) -> Result<Self, AppError> {
        if page_size == 0 {
            return Err(AppError::invalid_input(
                "page_size",
                "must hold at least one item",
            ));
        }

        if start_index >= item_count {
            return Err(AppError::IndexOutOfRange {
                index: start_index,
                count: item_count,
            });
        }

        Ok(Self {
            item_count,
            page_size,
            page_number: start_index / page_size,
            current_index: start_index,
        })
    }

    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn max_page(&self) -> usize {
        max_page(self.item_count, self.page_size)
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.max_page() + 1
    }

    #[must_use]
    pub const fn page_start(&self) -> usize {
        self.page_number * self.page_size
    }

    #[must_use]
    pub const fn page_end(&self) -> usize {
        let end = self.page_start() + self.page_size - 1;
        if end < self.item_count {
            end
        } else {
            self.item_count - 1
        }
    }

    /// Item indices shown on the current page.
    #[must_use]
    pub fn visible(&self) -> RangeInclusive<usize> {
        self.page_start()..=self.page_end()
    }

    /// Row slot (0-based, relative to the first row) of a visible item.
    #[must_use]
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.visible()
            .contains(&index)
            .then(|| index - self.page_start())
    }

    pub fn apply(&mut self, key: NavKey) -> Transition {
        match key {
            NavKey::Up if self.current_index > self.page_start() => {
                let from = self.current_index;
                self.current_index -= 1;
                Transition::Moved { from }
            }

            NavKey::Down if self.current_index < self.page_end() => {
                let from = self.current_index;
                self.current_index += 1;
                Transition::Moved { from }
            }

            NavKey::Left if self.page_number > 0 => self.turn_to(self.page_number - 1),

            NavKey::Right if self.page_number < self.max_page() => {
                self.turn_to(self.page_number + 1)
            }

            NavKey::Confirm => Transition::Selected(self.current_index + 1),

            NavKey::Cancel => Transition::Cancelled,

            NavKey::Up | NavKey::Down | NavKey::Left | NavKey::Right | NavKey::Other => {
                Transition::Unchanged
            }
        }
    }

    fn turn_to(&mut self, page: usize) -> Transition {
        let from_page = self.page_number;
        self.page_number = page;
        self.current_index = page * self.page_size;
        Transition::PageChanged { from_page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(state: &PageState) {
        assert!(state.page_start() <= state.current_index());
        assert!(state.current_index() <= state.page_end());
        assert!(state.page_number() <= state.max_page());
    }

    #[test]
    fn test_max_page_formula() {
        assert_eq!(max_page(0, 3), 0);
        assert_eq!(max_page(2, 2), 0);
        assert_eq!(max_page(4, 2), 1);
        assert_eq!(max_page(5, 2), 2);
        assert_eq!(max_page(1, 1), 0);
        assert_eq!(max_page(17, 17), 0);
        assert_eq!(max_page(18, 17), 1);

        for count in 1..40 {
            for size in 1..9 {
                assert_eq!(max_page(count, size), count.div_ceil(size) - 1);
            }
        }
    }

    #[test]
    fn test_rejects_bad_construction() {
        assert!(matches!(
            PageState::at(3, 0, 0),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(matches!(
            PageState::at(0, 4, 0),
            Err(AppError::IndexOutOfRange { index: 0, count: 0 })
        ));
        assert!(matches!(
            PageState::at(3, 4, 3),
            Err(AppError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_start_index_selects_page() {
        let state = PageState::at(10, 4, 6).unwrap();
        assert_eq!(state.page_number(), 1);
        assert_eq!(state.current_index(), 6);
        assert_eq!(state.visible(), 4..=7);
        assert_eq!(state.slot_of(6), Some(2));
        assert_eq!(state.slot_of(8), None);
    }

    #[test]
    fn test_right_clamps_at_last_page() {
        let mut state = PageState::at(5, 2, 0).unwrap();
        assert_eq!(state.apply(NavKey::Right), Transition::PageChanged { from_page: 0 });
        assert_eq!(state.apply(NavKey::Right), Transition::PageChanged { from_page: 1 });
        assert_eq!(state.apply(NavKey::Right), Transition::Unchanged);
        assert_eq!(state.page_number(), 2);
        assert_eq!(state.current_index(), 4);
        assert_eq!(state.visible(), 4..=4);
    }

    #[test]
    fn test_boundary_keys_are_noops() {
        let mut state = PageState::at(5, 2, 0).unwrap();
        assert_eq!(state.apply(NavKey::Up), Transition::Unchanged);
        assert_eq!(state.apply(NavKey::Left), Transition::Unchanged);

        assert_eq!(state.apply(NavKey::Down), Transition::Moved { from: 0 });
        assert_eq!(state.apply(NavKey::Down), Transition::Unchanged);
        assert_eq!(state.current_index(), 1);

        // UP at the top of page 1 does not wrap back to page 0.
        state.apply(NavKey::Right);
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.apply(NavKey::Up), Transition::Unchanged);
        assert_eq!(state.page_number(), 1);
    }

    #[test]
    fn test_left_resets_cursor_to_page_start() {
        let mut state = PageState::at(9, 3, 8).unwrap();
        assert_eq!(state.apply(NavKey::Left), Transition::PageChanged { from_page: 2 });
        assert_eq!(state.current_index(), 3);
    }

    #[test]
    fn test_confirm_is_one_based() {
        let mut state = PageState::at(3, 2, 0).unwrap();
        assert_eq!(state.apply(NavKey::Confirm), Transition::Selected(1));

        let mut state = PageState::at(7, 3, 0).unwrap();
        state.apply(NavKey::Right);
        state.apply(NavKey::Down);
        assert_eq!(state.apply(NavKey::Confirm), Transition::Selected(5));
    }

    #[test]
    fn test_other_and_cancel() {
        let mut state = PageState::at(3, 2, 1).unwrap();
        assert_eq!(state.apply(NavKey::Other), Transition::Unchanged);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.apply(NavKey::Cancel), Transition::Cancelled);
    }

    #[test]
    fn test_invariant_holds_over_key_sequences() {
        let keys = [
            NavKey::Down,
            NavKey::Right,
            NavKey::Down,
            NavKey::Down,
            NavKey::Up,
            NavKey::Right,
            NavKey::Down,
            NavKey::Left,
            NavKey::Other,
            NavKey::Right,
            NavKey::Right,
            NavKey::Down,
        ];

        for count in 1..12 {
            for size in 1..6 {
                let mut state = PageState::at(count, size, 0).unwrap();
                assert_invariant(&state);
                for key in keys {
                    state.apply(key);
                    assert_invariant(&state);
                }
            }
        }
    }
}
