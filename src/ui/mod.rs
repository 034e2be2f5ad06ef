//! User interface subsystem - 128x32 OLED + selector dialogs.
//!
//! ## Components
//!
//! - **Display**: text-only drawing surface, 16 columns by 3 rows
//! - **Dialogs**: yes/no, option picker and character-by-character entry
//! - **Menu**: top-level action carousel

pub mod dialog;
pub mod input_logic;
pub mod menu;

use heapless::String;

use crate::config::{DISPLAY_COLUMNS, DISPLAY_ROWS, ROW_PITCH, TEXT_LEN};
use crate::text::wrap;

/// Text drawing surface.
///
/// `draw_text` writes into a frame buffer; nothing is visible until
/// `present`.
pub trait Display {
    fn clear(&mut self);

    /// Draw one row with its top edge at `y` pixels.
    fn draw_text(&mut self, text: &str, y: i32);

    fn present(&mut self);
}

/// Replace the screen with up to [`DISPLAY_ROWS`] lines.
pub fn show_lines<D: Display + ?Sized>(display: &mut D, lines: &[&str]) {
    display.clear();
    for (row, line) in lines.iter().take(DISPLAY_ROWS).enumerate() {
        display.draw_text(line, row as i32 * ROW_PITCH);
    }
    display.present();
}

/// Replace the screen with `text` wrapped to the display width.
///
/// Rows past the bottom of the screen are cut off.
pub fn show_long_text<D: Display + ?Sized>(display: &mut D, text: &str) {
    display.clear();
    for (row, line) in wrap(text, DISPLAY_COLUMNS).take(DISPLAY_ROWS).enumerate() {
        display.draw_text(line, row as i32 * ROW_PITCH);
    }
    display.present();
}

/// Render a message as `from: body`.
pub fn show_message<D: Display + ?Sized>(display: &mut D, from: &str, body: &str) {
    let mut line: String<{ TEXT_LEN * 2 }> = String::new();
    for part in [from, ": ", body] {
        let _ = line.push_str(part);
    }
    show_long_text(display, &line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FrameLog;

    #[test]
    fn lines_are_stacked_by_row_pitch() {
        let mut d = FrameLog::default();
        show_lines(&mut d, &["Message", "Published!"]);
        assert_eq!(
            d.frames[0],
            vec![(0, "Message".to_string()), (10, "Published!".to_string())]
        );
    }

    #[test]
    fn long_text_wraps_at_sixteen_columns() {
        let mut d = FrameLog::default();
        show_long_text(&mut d, "Q:Tea at four? R:Yes");
        assert_eq!(d.last_text(), ["Q:Tea at four? R", ":Yes"]);
    }

    #[test]
    fn long_text_is_cut_after_three_rows() {
        let mut d = FrameLog::default();
        show_long_text(&mut d, &"x".repeat(100));
        assert_eq!(d.last_text().len(), 3);
    }

    #[test]
    fn message_is_prefixed_with_sender() {
        let mut d = FrameLog::default();
        show_message(&mut d, "Bob", "hi");
        assert_eq!(d.last_text(), ["Bob: hi"]);
    }
}
