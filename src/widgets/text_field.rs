use super::{BACKGROUND, BORDER, CHAR_WIDTH, FOCUS_RING, LINE_HEIGHT, PADDING, TEXT};
use crate::display::Canvas;
use crate::events::{Event, KeyCode};
use crate::rect::Rect;
use crate::signal::Signal;
use crate::widget::{EventCx, Handled, Widget};
use cgmath::Point2;

/// A single-line text input.
///
/// While focused it inserts printable keys at the caret and understands Delete, Forward Delete,
/// the horizontal arrows, Home and End. Return emits the current text on [`TextField::submitted`].
#[derive(Debug)]
pub struct TextField {
    text: String,
    /// Caret position in characters.
    caret: usize,
    /// First visible character.
    scroll: usize,
    focused: bool,
    submitted: Signal<String>,
}

impl Default for TextField {
    fn default() -> Self {
        TextField::new("")
    }
}

impl TextField {
    pub fn new(text: impl Into<String>) -> TextField {
        let text = text.into();
        let caret = text.chars().count();
        TextField {
            text,
            caret,
            scroll: 0,
            focused: false,
            submitted: Signal::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.char_count();
        self.scroll = 0;
    }

    pub fn submitted(&self) -> &Signal<String> {
        &self.submitted
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.caret);
        self.text.insert(at, c);
        self.caret += 1;
    }

    fn delete_backward(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret -= 1;
        let at = self.byte_index(self.caret);
        self.text.remove(at);
        true
    }

    fn delete_forward(&mut self) -> bool {
        if self.caret >= self.char_count() {
            return false;
        }
        let at = self.byte_index(self.caret);
        self.text.remove(at);
        true
    }

    /// Keeps the caret inside the visible cells.
    fn scroll_to_caret(&mut self, bounds: Rect) {
        let cells = ((bounds.size.x - 2 * PADDING) / CHAR_WIDTH).max(1) as usize;
        if self.caret < self.scroll {
            self.scroll = self.caret;
        } else if self.caret >= self.scroll + cells {
            self.scroll = self.caret + 1 - cells;
        }
    }

    fn handle_key(&mut self, code: KeyCode, c: Option<char>, cx: &mut EventCx) -> bool {
        match code {
            KeyCode::Delete => self.delete_backward(),
            KeyCode::ForwardDelete => self.delete_forward(),
            KeyCode::LeftArrow => {
                self.caret = self.caret.saturating_sub(1);
                true
            }
            KeyCode::RightArrow => {
                self.caret = (self.caret + 1).min(self.char_count());
                true
            }
            KeyCode::Home => {
                self.caret = 0;
                true
            }
            KeyCode::End => {
                self.caret = self.char_count();
                true
            }
            KeyCode::Return => {
                if let Err(err) = self.submitted.emit(&self.text) {
                    cx.report(&err);
                }
                false
            }
            _ => match c {
                Some(c) => {
                    self.insert(c);
                    true
                }
                None => false,
            },
        }
    }
}

impl Widget for TextField {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.fill_rect(bounds, BACKGROUND);
        if self.focused {
            canvas.stroke_rect(bounds, 2, FOCUS_RING);
        } else {
            canvas.stroke_rect(bounds, 1, BORDER);
        }

        let visible: String = self.text.chars().skip(self.scroll).collect();
        let text = super::fit_text(&visible, bounds.size.x - 2 * PADDING);
        let origin = Point2::new(bounds.origin.x + PADDING, bounds.origin.y + PADDING);
        canvas.draw_text(origin, text, TEXT);

        if self.focused {
            let x = origin.x + self.caret.saturating_sub(self.scroll) as i32 * CHAR_WIDTH;
            canvas.fill_rect(Rect::new(x, origin.y, 1, LINE_HEIGHT), TEXT);
        }
    }

    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        match event {
            Event::PointerDown(point) => {
                let bounds = cx.bounds();
                let cell = (point.x - bounds.origin.x - PADDING + CHAR_WIDTH / 2) / CHAR_WIDTH;
                self.caret = (self.scroll + cell.max(0) as usize).min(self.char_count());
                cx.mark_dirty();
                Handled::Yes
            }
            Event::KeyDown(key) if cx.is_focused() => {
                if key.modifiers.command || key.modifiers.control {
                    return Handled::No;
                }
                let code = key.code;
                let c = key.to_char();
                if self.handle_key(code, c, cx) {
                    self.scroll_to_caret(cx.bounds());
                    cx.mark_dirty();
                }
                if code == KeyCode::Tab || code == KeyCode::Escape {
                    Handled::No
                } else {
                    Handled::Yes
                }
            }
            _ => Handled::No,
        }
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
    use crate::events::{Key, KeyModifiers};
    use crate::tree::WidgetTree;
    use crate::widget::WidgetId;
    use crate::widgets::Panel;

    fn key(code: KeyCode) -> Event {
        Event::KeyDown(Key::new(code))
    }

    fn focused_field(text: &str) -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::with_root(Panel::default(), Rect::new(0, 0, 300, 100));
        let root = tree.root().unwrap();
        let field = tree
            .insert(root, TextField::new(text), Rect::new(10, 10, 200, 24))
            .unwrap();
        tree.set_focus(field).unwrap();
        (tree, field)
    }

    fn text(tree: &WidgetTree, id: WidgetId) -> (String, usize) {
        let field = tree.widget::<TextField>(id).unwrap();
        (field.text().to_string(), field.caret())
    }

    #[test]
    fn typing_edits_at_the_caret() {
        let (mut tree, field) = focused_field("ac");
        tree.dispatch(&key(KeyCode::LeftArrow));
        tree.dispatch(&key(KeyCode::B));
        assert_eq!(text(&tree, field), ("abc".to_string(), 2));

        let shift = KeyModifiers {
            shift: true,
            ..KeyModifiers::default()
        };
        tree.dispatch(&Event::KeyDown(Key {
            code: KeyCode::D,
            modifiers: shift,
        }));
        tree.dispatch(&key(KeyCode::End));
        tree.dispatch(&key(KeyCode::Space));
        assert_eq!(text(&tree, field), ("abDc ".to_string(), 5));

        tree.dispatch(&key(KeyCode::Home));
        tree.dispatch(&key(KeyCode::Delete));
        tree.dispatch(&key(KeyCode::ForwardDelete));
        assert_eq!(text(&tree, field), ("bDc ".to_string(), 0));
    }

    #[test]
    fn ignores_keys_without_focus() {
        let (mut tree, field) = focused_field("x");
        tree.clear_focus();
        tree.dispatch(&key(KeyCode::A));
        assert_eq!(text(&tree, field), ("x".to_string(), 1));
    }

    #[test]
    fn press_moves_the_caret() {
        let (mut tree, field) = focused_field("hello");
        let x = 10 + PADDING + 2 * CHAR_WIDTH;
        tree.dispatch(&Event::PointerDown(Point2::new(x, 15)));
        assert_eq!(tree.focused(), Some(field));
        assert_eq!(text(&tree, field).1, 2);
    }

    #[test]
    fn return_submits() {
        let (mut tree, field) = focused_field("query");
        let submitted = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = submitted.clone();
        tree.widget::<TextField>(field)
            .unwrap()
            .submitted()
            .connect(move |text: &String| sink.lock().push(text.clone()));

        tree.dispatch(&key(KeyCode::Return));
        assert_eq!(*submitted.lock(), vec!["query".to_string()]);
    }
}
