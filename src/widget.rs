use crate::display::Canvas;
use crate::events::Event;
use crate::logger::Diagnostics;
use crate::rect::Rect;
use core::any::Any;
use core::fmt;
use uuid::Uuid;

/// A unique identifier for a widget.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u32, u16, u16, [u8; 8]);

impl WidgetId {
    pub(crate) fn new() -> WidgetId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        WidgetId(a, b, c, *d)
    }
}

/// Whether a widget consumed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The event stops here.
    Yes,
    /// The event bubbles up to the parent.
    No,
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled {
            Handled::Yes
        } else {
            Handled::No
        }
    }
}

/// Widgets are the nodes of a [`WidgetTree`](crate::WidgetTree).
///
/// The tree owns each widget along with its geometry, visibility and dirty flag; the widget itself
/// only holds the state specific to its kind (label text, caret position, ...). A widget paints
/// *itself only*: its children are painted by the repaint traversal, after it, in child order.
///
/// Widgets never see the tree. Anything they need to touch from event handlers goes through the
/// [`EventCx`], and anything they publish goes through signals they own.
pub trait Widget: AsAny + fmt::Debug + Send + 'static {
    /// Paints the widget into `bounds`.
    fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect);

    /// Handles an event targeted at this widget or bubbling up from a descendant.
    ///
    /// Returning [`Handled::No`] lets the event continue to the parent.
    fn handle_event(&mut self, event: &Event, cx: &mut EventCx) -> Handled {
        let _ = (event, cx);
        Handled::No
    }

    /// Whether a pointer press should give this widget keyboard focus.
    fn focusable(&self) -> bool {
        false
    }

    /// Called when the widget loses or gains focus.
    ///
    /// The previous holder is always notified before the new one.
    fn focus_changed(&mut self, focused: bool, cx: &mut EventCx) {
        let _ = (focused, cx);
    }
}

/// For downcasting; implemented for every widget.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Widget> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a widget may do while handling an event.
pub struct EventCx<'a> {
    id: WidgetId,
    bounds: Rect,
    focused: bool,
    pub(crate) dirty: bool,
    pub(crate) resign_focus: bool,
    diagnostics: &'a Diagnostics,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(
        id: WidgetId,
        bounds: Rect,
        focused: bool,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        EventCx {
            id,
            bounds,
            focused,
            dirty: false,
            resign_focus: false,
            diagnostics,
        }
    }

    /// The widget receiving the event.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The receiving widget's bounds in window coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether the receiving widget holds focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Schedules the receiving widget for repaint.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Gives up focus once the handler returns, if the receiving widget holds it.
    pub fn resign_focus(&mut self) {
        self.resign_focus = true;
    }

    /// Reports a failure the widget cannot do anything about.
    pub fn report(&self, error: &dyn std::error::Error) {
        let id = self.id;
        self.diagnostics
            .error(|| format!("widget {:?}: {}", id, error));
    }
}

impl<'a> fmt::Debug for EventCx<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EventCx")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("focused", &self.focused)
            .field("dirty", &self.dirty)
            .finish()
    }
}
