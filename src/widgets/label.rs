use super::{fit_text, PADDING, TEXT};
use crate::color::Color;
use crate::display::Canvas;
use crate::rect::Rect;
use crate::widget::Widget;
use cgmath::Point2;

/// A single line of static text.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    pub color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Label {
        Label {
            text: text.into(),
            color: TEXT,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text. Use [`WidgetTree::update`](crate::WidgetTree::update) so the label gets
    /// repainted.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Label {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        let origin = Point2::new(bounds.origin.x + PADDING, bounds.origin.y + PADDING);
        let text = fit_text(&self.text, bounds.size.x - 2 * PADDING);
        canvas.draw_text(origin, text, self.color);
    }
}
