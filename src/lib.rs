//! A small widget toolkit core.
//!
//! Widgets live in a [`WidgetTree`]. Native events pulled by the [`EventLoop`] are handed to the
//! [`Window`] owning the target surface, which routes them through its tree (hit-testing, focus,
//! bubbling) and then lets its [`RepaintScheduler`] repaint whatever was marked dirty. Long-lived
//! services such as the [`Display`] connection and the [`Logger`] are shared through a
//! [`Registry`]; widgets talk to each other through [`Signal`]s.

pub mod color;
mod config;
pub mod display;
pub mod event_loop;
pub mod events;
pub mod headless;
mod logger;
pub mod preview;
pub mod raw_events;
mod rect;
mod registry;
mod repaint;
mod router;
pub mod signal;
#[cfg(test)]
mod testing;
mod tree;
mod widget;
pub mod widgets;
mod window;

pub use color::Color;
pub use config::Config;
pub use display::{Canvas, Display, DisplayError, SurfaceId};
pub use event_loop::{EventHandler, EventLoop, HandleEvent, LoopError, LoopProxy, LoopState};
pub use events::{Event, EventKind, Key, KeyCode, KeyModifiers};
pub use logger::{LogFacade, Logger};
pub use rect::Rect;
pub use registry::{Registry, RegistryError};
pub use repaint::RepaintScheduler;
pub use router::{Dispatch, FocusPolicy};
pub use signal::{Connection, Signal, SignalBus, SignalError};
pub use tree::{Invalidator, TreeError, WidgetTree};
pub use widget::{AsAny, EventCx, Handled, Widget, WidgetId};
pub use window::{Window, WindowError};
