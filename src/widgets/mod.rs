//! Stock widgets.
//!
//! Text is drawn as a monospace grid of [`CHAR_WIDTH`] by [`LINE_HEIGHT`] cells; glyph rendering
//! itself is up to the display service.

mod button;
mod file_list;
mod label;
mod panel;
mod text_field;
mod text_view;

pub use button::{Button, Clicked};
pub use file_list::{read_dir, FileEntry, FileList, FileSelected, FILE_SELECTED};
pub use label::Label;
pub use panel::Panel;
pub use text_field::TextField;
pub use text_view::{TextHandle, TextView};

use crate::color::Color;

/// Width of one text cell.
pub const CHAR_WIDTH: i32 = 8;

/// Height of one line of text.
pub const LINE_HEIGHT: i32 = 16;

/// Space between a widget's edge and its text.
pub const PADDING: i32 = 4;

pub(crate) const TEXT: Color = Color::rgb(0.1, 0.1, 0.1);
pub(crate) const BACKGROUND: Color = Color::rgb(1., 1., 1.);
pub(crate) const CONTROL: Color = Color::rgb(0.9, 0.9, 0.92);
pub(crate) const CONTROL_PRESSED: Color = Color::rgb(0.75, 0.75, 0.8);
pub(crate) const BORDER: Color = Color::rgb(0.6, 0.6, 0.6);
pub(crate) const FOCUS_RING: Color = Color::rgb(0.2, 0.45, 0.9);
pub(crate) const SELECTION: Color = Color::rgb(0.8, 0.87, 1.);

/// Cuts text to the number of cells that fit into `width`.
pub(crate) fn fit_text(text: &str, width: i32) -> &str {
    let cells = (width.max(0) / CHAR_WIDTH) as usize;
    match text.char_indices().nth(cells) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[test]
fn fit_text_counts_characters() {
    assert_eq!(fit_text("hello", 5 * CHAR_WIDTH), "hello");
    assert_eq!(fit_text("hello", 3 * CHAR_WIDTH + 1), "hel");
    assert_eq!(fit_text("héllo", 2 * CHAR_WIDTH), "hé");
    assert_eq!(fit_text("hello", -4), "");
}
