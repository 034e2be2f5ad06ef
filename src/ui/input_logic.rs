//! Cyclic cursor movement shared by the menu and the selector dialogs.

/// Move the cursor one item back, wrapping to the last item.
pub fn wrap_prev(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    (selected + item_count - 1) % item_count
}

/// Move the cursor one item forward, wrapping to the first item.
pub fn wrap_next(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    (selected + 1) % item_count
}
