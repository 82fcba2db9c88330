use crate::color::Color;
use crate::display::Canvas;
use crate::rect::Rect;
use crate::widget::Widget;

/// A plain container that fills its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    /// Background color.
    pub background: Color,

    /// Border (width, color).
    pub border: Option<(i32, Color)>,
}

impl Default for Panel {
    fn default() -> Self {
        Panel {
            background: super::BACKGROUND,
            border: None,
        }
    }
}

impl Panel {
    pub fn new(background: Color) -> Panel {
        Panel {
            background,
            border: None,
        }
    }

    pub fn with_border(self, width: i32, color: Color) -> Panel {
        Panel {
            border: Some((width, color)),
            ..self
        }
    }
}

impl Widget for Panel {
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.fill_rect(bounds, self.background);
        if let Some((width, color)) = self.border {
            canvas.stroke_rect(bounds, width, color);
        }
    }
}
