use super::{fit_text, BORDER, CONTROL, CONTROL_PRESSED, FOCUS_RING, PADDING, TEXT};
use crate::display::Canvas;
use crate::events::{Event, KeyCode};
use crate::rect::Rect;
use crate::signal::Signal;
use crate::widget::{EventCx, Handled, Widget, WidgetId};
use cgmath::Point2;

/// Emitted when a button is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clicked {
    pub button: WidgetId,
}

/// A push button.
///
/// A button is activated by releasing the pointer inside it after pressing it, or by Return or
/// Space while it has focus.
/// Releasing the pointer elsewhere only clears the press.
#[derive(Debug)]
pub struct Button {
    label: String,
    pressed: bool,
    focused: bool,
    clicked: Signal<Clicked>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Button {
        Button::with_signal(label, Signal::new())
    }

    /// Creates a button that emits on an existing signal.
    pub fn with_signal(label: impl Into<String>, clicked: Signal<Clicked>) -> Button {
        Button {
            label: label.into(),
            pressed: false,
            focused: false,
            clicked,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// The signal activations are emitted on.
    pub fn clicked(&self) -> &Signal<Clicked> {
        &self.clicked
    }

    fn activate(&self, cx: &mut EventCx) {
        if let Err(err) = self.clicked.emit(&Clicked { button: cx.id() }) {
            cx.report(&err);
        }
    }
}

impl Widget for Button {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        let fill = if self.pressed { CONTROL_PRESSED } else { CONTROL };
        canvas.fill_rect(bounds, fill);
        if self.focused {
            canvas.stroke_rect(bounds, 2, FOCUS_RING);
        } else {
            canvas.stroke_rect(bounds, 1, BORDER);
        }

        let text = fit_text(&self.label, bounds.size.x - 2 * PADDING);
        let text_width = text.chars().count() as i32 * super::CHAR_WIDTH;
        let origin = Point2::new(
            bounds.origin.x + (bounds.size.x - text_width) / 2,
            bounds.origin.y + (bounds.size.y - super::LINE_HEIGHT) / 2,
        );
        canvas.draw_text(origin, text, TEXT);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        match event {
            Event::PointerDown(_) => {
                self.pressed = true;
                cx.mark_dirty();
                Handled::Yes
            }
            Event::PointerUp(point) => {
                if !self.pressed {
                    return Handled::No;
                }
                self.pressed = false;
                cx.mark_dirty();
                if cx.bounds().contains(*point) {
                    self.activate(cx);
                }
                Handled::Yes
            }
            Event::KeyDown(key) if cx.is_focused() => match key.code {
                KeyCode::Return | KeyCode::Space => {
                    self.activate(cx);
                    Handled::Yes
                }
                _ => Handled::No,
            },
            _ => Handled::No,
        }
    }

    fn focusable(&self) -> bool {
        true
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) {
        self.focused = focused;
        if !focused {
            self.pressed = false;
        }
        cx.mark_dirty();
    }
}
