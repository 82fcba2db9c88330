//! Windows tie a widget tree to a display surface.

use crate::config::Config;
use crate::display::{Display, DisplayError, SurfaceId};
use crate::event_loop::{EventHandler, HandleEvent, LoopProxy};
use crate::events::Event;
use crate::logger::{Diagnostics, Logger};
use crate::rect::Rect;
use crate::registry::{Registry, RegistryError};
use crate::repaint::RepaintScheduler;
use crate::router::Dispatch;
use crate::tree::WidgetTree;
use crate::widget::{Widget, WidgetId};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Errors that may occur when creating a window from a registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WindowError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// A surface together with the widgets shown on it.
///
/// Every event is routed through the tree and followed by a repaint pass. The surface is destroyed
/// when the window is dropped.
pub struct Window {
    display: Arc<dyn Display>,
    surface: SurfaceId,
    bounds: Rect,
    tree: WidgetTree,
    scheduler: RepaintScheduler,
    diagnostics: Diagnostics,
}

impl Window {
    /// Creates a window with a new surface.
    pub fn new(
        display: Arc<dyn Display>,
        bounds: Rect,
        config: &Config,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Window, DisplayError> {
        let surface = display.create_surface(bounds)?;

        let mut tree = WidgetTree::new();
        tree.set_focus_policy(config.focus_policy);
        tree.set_logger(logger.clone());
        let mut scheduler = RepaintScheduler::new(config.initial_render);
        scheduler.set_logger(logger.clone());

        let diagnostics = Diagnostics::new(logger);
        diagnostics.debug(|| format!("created surface {:?} at {:?}", surface, bounds));

        Ok(Window {
            display,
            surface,
            bounds,
            tree,
            scheduler,
            diagnostics,
        })
    }

    /// Creates a window on the registered `dyn Display`, logging to the registered `dyn Logger`.
    pub fn from_registry(
        registry: &Registry,
        bounds: Rect,
        config: &Config,
    ) -> Result<Window, WindowError> {
        let display = registry.resolve::<dyn Display>()?;
        let logger = registry.try_resolve::<dyn Logger>();
        Ok(Window::new(display, bounds, config, logger)?)
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Window bounds on screen.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Window contents bounds, in window coordinates.
    pub fn content_bounds(&self) -> Rect {
        self.bounds.with_origin(cgmath::Point2::new(0, 0))
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    /// Makes `widget` the root, covering the whole window.
    ///
    /// The previous root and its subtree are destroyed.
    pub fn set_content(&mut self, widget: impl Widget) -> WidgetId {
        if let Some(previous) = self.tree.root() {
            // the root is always present in its own tree
            let _ = self.tree.remove(previous);
        }
        let id = self.tree.create(widget, self.content_bounds());
        let _ = self.tree.set_root(id);
        id
    }

    /// Routes an event through the tree, then repaints what became dirty.
    pub fn process_event(&mut self, event: &Event) -> Result<Dispatch, DisplayError> {
        let dispatch = self.tree.dispatch(event);
        self.render()?;
        Ok(dispatch)
    }

    /// Runs a repaint pass and returns the number of widgets painted.
    pub fn render(&mut self) -> Result<usize, DisplayError> {
        self.scheduler
            .repaint_surface(&self.tree, &*self.display, self.surface)
    }

    /// Draws the window for the first time, installs it as its surface's event handler and returns
    /// the shared window.
    ///
    /// A failed first draw is logged; the window is installed anyway and retries on the next event.
    pub fn install(mut self, proxy: &LoopProxy) -> Arc<Mutex<Window>> {
        if let Err(err) = self.render() {
            let surface = self.surface;
            self.diagnostics
                .error(|| format!("window {:?}: first draw failed: {}", surface, err));
        }
        let surface = self.surface;
        let window = Arc::new(Mutex::new(self));
        proxy.register_event_handler(surface, EventHandler::shared(Arc::clone(&window)));
        window
    }
}

impl HandleEvent for Window {
    fn handle_event(&mut self, event: &Event, _proxy: &LoopProxy) {
        if let Err(err) = self.process_event(event) {
            let surface = self.surface;
            self.diagnostics
                .error(|| format!("window {:?}: {}", surface, err));
        }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.display.destroy_surface(self.surface);
    }
}

impl core::fmt::Debug for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Window")
            .field("surface", &self.surface)
            .field("bounds", &self.bounds)
            .field("tree", &self.tree)
            .finish()
    }
}
