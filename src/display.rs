//! The display service boundary.
//!
//! Surface creation and pixel drawing belong to the platform; the toolkit only needs to create
//! and destroy surfaces, wait for native events, hand a [`Canvas`] to widgets during a repaint
//! pass and flush afterwards.

use crate::color::Color;
use crate::raw_events::RawEvent;
use crate::rect::Rect;
use cgmath::Point2;
use thiserror::Error;
use uuid::Uuid;

/// A unique identifier for a native surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u32, u16, u16, [u8; 8]);

impl SurfaceId {
    pub fn new() -> SurfaceId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        SurfaceId(a, b, c, *d)
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        SurfaceId::new()
    }
}

/// Errors reported by a display service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisplayError {
    #[error("surface creation failed: {0}")]
    SurfaceCreation(String),

    #[error("no such surface: {0:?}")]
    UnknownSurface(SurfaceId),

    #[error("display connection closed")]
    Disconnected,
}

/// The drawing context handed to widgets while they paint.
///
/// Widgets only ever see it for the duration of one repaint pass.
pub trait Canvas {
    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Strokes the outline of a rectangle.
    fn stroke_rect(&mut self, rect: Rect, width: i32, color: Color);

    /// Draws a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, origin: Point2<i32>, text: &str, color: Color);
}

/// A native display connection.
pub trait Display: Send + Sync {
    /// Creates a new drawable surface with the given window bounds.
    fn create_surface(&self, bounds: Rect) -> Result<SurfaceId, DisplayError>;

    /// Destroys a surface. Unknown surfaces are ignored.
    fn destroy_surface(&self, surface: SurfaceId);

    /// Runs `paint` with a drawing context for the surface.
    ///
    /// The canvas cannot outlive the call.
    fn paint(
        &self,
        surface: SurfaceId,
        paint: &mut dyn FnMut(&mut dyn Canvas),
    ) -> Result<(), DisplayError>;

    /// Pushes pending drawing to the screen.
    fn flush(&self);

    /// Blocks until the next native event arrives.
    fn wait_event(&self) -> Result<RawEvent, DisplayError>;
}

#[test]
fn surface_ids_are_unique() {
    let a = SurfaceId::new();
    let b = SurfaceId::new();
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}
