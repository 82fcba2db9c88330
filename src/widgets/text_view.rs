use super::{fit_text, BACKGROUND, BORDER, FOCUS_RING, LINE_HEIGHT, PADDING, TEXT};
use crate::display::Canvas;
use crate::events::{Event, KeyCode};
use crate::rect::Rect;
use crate::widget::{EventCx, Handled, Widget};
use cgmath::Point2;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Contents {
    text: String,
    /// First visible line.
    scroll: usize,
}

/// Shared access to a [`TextView`]'s text.
///
/// Setting text through a handle does not schedule a repaint; pair the handle with an
/// [`Invalidator`](crate::Invalidator) for that.
#[derive(Debug, Clone, Default)]
pub struct TextHandle(Arc<Mutex<Contents>>);

impl TextHandle {
    /// Replaces the text and scrolls back to the top.
    pub fn set_text(&self, text: impl Into<String>) {
        let mut contents = self.0.lock();
        contents.text = text.into();
        contents.scroll = 0;
    }

    pub fn text(&self) -> String {
        self.0.lock().text.clone()
    }

    pub fn scroll(&self) -> usize {
        self.0.lock().scroll
    }

    pub fn line_count(&self) -> usize {
        self.0.lock().text.lines().count()
    }
}

/// A read-only, scrollable block of text.
#[derive(Debug, Default)]
pub struct TextView {
    contents: TextHandle,
    focused: bool,
}

impl TextView {
    pub fn new(text: impl Into<String>) -> TextView {
        let view = TextView::default();
        view.contents.set_text(text);
        view
    }

    /// Returns a handle sharing this view's text.
    pub fn handle(&self) -> TextHandle {
        self.contents.clone()
    }

    fn visible_lines(bounds: Rect) -> usize {
        ((bounds.size.y - 2 * PADDING) / LINE_HEIGHT).max(1) as usize
    }

    /// Scrolls by `lines` and returns true if the position changed.
    fn scroll_by(&self, lines: isize) -> bool {
        let mut contents = self.contents.0.lock();
        let max = contents.text.lines().count().saturating_sub(1);
        let target = if lines < 0 {
            contents.scroll.saturating_sub(lines.wrapping_neg() as usize)
        } else {
            contents.scroll.saturating_add(lines as usize).min(max)
        };
        let changed = target != contents.scroll;
        contents.scroll = target;
        changed
    }
}

impl Widget for TextView {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.fill_rect(bounds, BACKGROUND);
        if self.focused {
            canvas.stroke_rect(bounds, 2, FOCUS_RING);
        } else {
            canvas.stroke_rect(bounds, 1, BORDER);
        }

        let contents = self.contents.0.lock();
        let lines = contents
            .text
            .lines()
            .skip(contents.scroll)
            .take(TextView::visible_lines(bounds));
        for (i, line) in lines.enumerate() {
            let origin = Point2::new(
                bounds.origin.x + PADDING,
                bounds.origin.y + PADDING + i as i32 * LINE_HEIGHT,
            );
            canvas.draw_text(origin, fit_text(line, bounds.size.x - 2 * PADDING), TEXT);
        }
    }

    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        let key = match event {
            Event::KeyDown(key) if cx.is_focused() => key,
            _ => return Handled::No,
        };
        let page = TextView::visible_lines(cx.bounds()) as isize;
        let lines = match key.code {
            KeyCode::UpArrow => -1,
            KeyCode::DownArrow => 1,
            KeyCode::PageUp => -page,
            KeyCode::PageDown => page,
            KeyCode::Home => isize::min_value(),
            KeyCode::End => isize::max_value(),
            _ => return Handled::No,
        };
        if self.scroll_by(lines) {
            cx.mark_dirty();
        }
        Handled::Yes
    }

    fn focusable(&self) -> bool {
        true
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) {
        self.focused = focused;
        cx.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Key;
    use crate::headless::{DrawOp, RecordingCanvas};
    use crate::tree::WidgetTree;

    fn drawn_text(view: &TextView, bounds: Rect) -> Vec<String> {
        let mut canvas = RecordingCanvas::default();
        view.paint(&mut canvas, bounds);
        canvas
            .ops
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, text, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn paints_visible_lines_from_scroll() {
        let view = TextView::new("one\ntwo\nthree\nfour");
        let bounds = Rect::new(0, 0, 100, 2 * LINE_HEIGHT + 2 * PADDING);
        assert_eq!(drawn_text(&view, bounds), vec!["one", "two"]);

        assert!(view.scroll_by(2));
        assert_eq!(drawn_text(&view, bounds), vec!["three", "four"]);
        assert!(view.scroll_by(5));
        assert_eq!(view.handle().scroll(), 3, "clamped to the last line");
    }

    #[test]
    fn handle_shares_text_and_resets_scroll() {
        let view = TextView::new("a\nb\nc");
        let handle = view.handle();
        view.scroll_by(2);
        handle.set_text("fresh");
        assert_eq!(handle.scroll(), 0);
        assert_eq!(
            drawn_text(&view, Rect::new(0, 0, 100, 100)),
            vec!["fresh"]
        );
    }

    #[test]
    fn keys_scroll_while_focused() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut tree = WidgetTree::new();
        let view = TextView::new(text);
        let handle = view.handle();
        let id = tree.create(view, Rect::new(0, 0, 100, 10 * LINE_HEIGHT + 2 * PADDING));
        tree.set_root(id).unwrap();

        tree.dispatch(&Event::KeyDown(Key::new(KeyCode::DownArrow)));
        assert_eq!(handle.scroll(), 0, "not focused");

        tree.set_focus(id).unwrap();
        tree.dispatch(&Event::KeyDown(Key::new(KeyCode::DownArrow)));
        tree.dispatch(&Event::KeyDown(Key::new(KeyCode::PageDown)));
        assert_eq!(handle.scroll(), 11);
        tree.dispatch(&Event::KeyDown(Key::new(KeyCode::End)));
        assert_eq!(handle.scroll(), 49);
        tree.dispatch(&Event::KeyDown(Key::new(KeyCode::Home)));
        assert_eq!(handle.scroll(), 0);
    }
}
