//! Fixtures shared by the unit tests.

use crate::display::Canvas;
use crate::events::Event;
use crate::rect::Rect;
use crate::widget::{EventCx, Handled, Widget};
use parking_lot::Mutex;
use std::sync::Arc;

/// A shared, ordered record of what probes observed.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

/// A widget that writes everything that happens to it into a journal.
#[derive(Debug)]
pub(crate) struct Probe {
    pub(crate) name: &'static str,
    pub(crate) focusable: bool,
    pub(crate) handles: bool,
    pub(crate) journal: Journal,
}

impl Probe {
    pub(crate) fn new(name: &'static str) -> Probe {
        Probe {
            name,
            focusable: false,
            handles: false,
            journal: Journal::default(),
        }
    }

    pub(crate) fn focusable(mut self) -> Probe {
        self.focusable = true;
        self
    }

    pub(crate) fn handling(mut self) -> Probe {
        self.handles = true;
        self
    }

    pub(crate) fn journal(mut self, journal: &Journal) -> Probe {
        self.journal = Arc::clone(journal);
        self
    }
}

impl Widget for Probe {
    fn paint(&self, _canvas: &mut dyn Canvas, _bounds: Rect) {
        self.journal.lock().push(format!("paint {}", self.name));
    }

    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        self.journal
            .lock()
            .push(format!("{:?} {}", event.kind(), self.name));
        if let Event::PointerDown(_) = event {
            cx.mark_dirty();
        }
        self.handles.into()
    }

    fn focusable(&self) -> bool {
        self.focusable
    }

    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) {
        let change = if focused { "gained" } else { "lost" };
        self.journal
            .lock()
            .push(format!("focus {} {}", change, self.name));
        cx.mark_dirty();
    }
}

/// A canvas that ignores everything.
#[derive(Debug, Default)]
pub(crate) struct NullCanvas;

impl Canvas for NullCanvas {
    fn fill_rect(&mut self, _rect: Rect, _color: crate::Color) {}
    fn stroke_rect(&mut self, _rect: Rect, _width: i32, _color: crate::Color) {}
    fn draw_text(&mut self, _origin: cgmath::Point2<i32>, _text: &str, _color: crate::Color) {}
}

pub(crate) fn take(journal: &Journal) -> Vec<String> {
    std::mem::replace(&mut *journal.lock(), Vec::new())
}
