//! An in-process display service.
//!
//! Native events are fed through a channel (see [`HeadlessDisplay::sender`]) and everything
//! widgets draw is recorded per surface. Useful for tests and for driving a UI from a script.

use crate::color::Color;
use crate::display::{Canvas, Display, DisplayError, SurfaceId};
use crate::raw_events::RawEvent;
use crate::rect::Rect;
use cgmath::Point2;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect(Rect, Color),
    StrokeRect(Rect, i32, Color),
    Text(Point2<i32>, String, Color),
}

/// A canvas that records what is drawn onto it.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, width: i32, color: Color) {
        self.ops.push(DrawOp::StrokeRect(rect, width, color));
    }

    fn draw_text(&mut self, origin: Point2<i32>, text: &str, color: Color) {
        self.ops.push(DrawOp::Text(origin, text.to_string(), color));
    }
}

#[derive(Debug)]
struct Surface {
    bounds: Rect,
    ops: Vec<DrawOp>,
}

/// A display service without a screen.
#[derive(Debug)]
pub struct HeadlessDisplay {
    event_send: Mutex<Option<Sender<RawEvent>>>,
    event_recv: Receiver<RawEvent>,
    surfaces: Mutex<HashMap<SurfaceId, Surface>>,
    flushes: AtomicUsize,
    refuse_surfaces: AtomicBool,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        HeadlessDisplay::new()
    }
}

impl HeadlessDisplay {
    pub fn new() -> HeadlessDisplay {
        let (event_send, event_recv) = channel::unbounded();
        HeadlessDisplay {
            event_send: Mutex::new(Some(event_send)),
            event_recv,
            surfaces: Mutex::new(HashMap::new()),
            flushes: AtomicUsize::new(0),
            refuse_surfaces: AtomicBool::new(false),
        }
    }

    /// Returns a sender for native events, or None once the display has been closed.
    ///
    /// The connection only reports [`DisplayError::Disconnected`] after every sender is dropped.
    pub fn sender(&self) -> Option<Sender<RawEvent>> {
        self.event_send.lock().clone()
    }

    /// Queues a native event.
    pub fn push(&self, event: RawEvent) {
        if let Some(sender) = &*self.event_send.lock() {
            // the receiver lives as long as self
            let _ = sender.send(event);
        }
    }

    /// Drops the display's own sender: once the queue drains, waiting reports disconnection.
    pub fn close(&self) {
        self.event_send.lock().take();
    }

    /// Makes subsequent surface creation fail.
    pub fn refuse_surfaces(&self, refuse: bool) {
        self.refuse_surfaces.store(refuse, Ordering::SeqCst);
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.surfaces.lock().keys().copied().collect()
    }

    pub fn surface_bounds(&self, surface: SurfaceId) -> Option<Rect> {
        self.surfaces.lock().get(&surface).map(|s| s.bounds)
    }

    /// Takes everything drawn onto the surface so far.
    pub fn take_ops(&self, surface: SurfaceId) -> Vec<DrawOp> {
        self.surfaces
            .lock()
            .get_mut(&surface)
            .map(|s| std::mem::replace(&mut s.ops, Vec::new()))
            .unwrap_or_default()
    }
}

impl Display for HeadlessDisplay {
    fn create_surface(&self, bounds: Rect) -> Result<SurfaceId, DisplayError> {
        if self.refuse_surfaces.load(Ordering::SeqCst) {
            return Err(DisplayError::SurfaceCreation(
                "headless display refuses new surfaces".to_string(),
            ));
        }
        if bounds.is_empty() {
            return Err(DisplayError::SurfaceCreation(format!(
                "empty surface bounds {:?}",
                bounds
            )));
        }
        let id = SurfaceId::new();
        self.surfaces.lock().insert(
            id,
            Surface {
                bounds,
                ops: Vec::new(),
            },
        );
        Ok(id)
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        self.surfaces.lock().remove(&surface);
    }

    fn paint(
        &self,
        surface: SurfaceId,
        paint: &mut dyn FnMut(&mut dyn Canvas),
    ) -> Result<(), DisplayError> {
        if !self.surfaces.lock().contains_key(&surface) {
            return Err(DisplayError::UnknownSurface(surface));
        }

        // widgets paint without the lock held
        let mut canvas = RecordingCanvas::default();
        paint(&mut canvas);

        match self.surfaces.lock().get_mut(&surface) {
            Some(s) => {
                s.ops.append(&mut canvas.ops);
                Ok(())
            }
            None => Err(DisplayError::UnknownSurface(surface)),
        }
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn wait_event(&self) -> Result<RawEvent, DisplayError> {
        self.event_recv
            .recv()
            .map_err(|_| DisplayError::Disconnected)
    }
}
