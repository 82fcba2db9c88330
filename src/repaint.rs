//! Selective repaint.
//!
//! The dirty set is just the per-widget flags. A pass walks the tree from the root in pre-order
//! and paints each dirty visible widget, then clears its flag. Children are visited whether their
//! parent was dirty or not, so the cost of a pass follows the number of dirty widgets rather than
//! the size of the tree. Hidden subtrees are cleared without painting.

use crate::display::{Canvas, Display, DisplayError, SurfaceId};
use crate::logger::{Diagnostics, Logger};
use crate::tree::WidgetTree;
use crate::widget::WidgetId;
use std::sync::Arc;

/// Repaints dirty widgets of a tree.
#[derive(Debug)]
pub struct RepaintScheduler {
    /// The next pass paints every visible widget regardless of its flag.
    force_full: bool,
    passes: u64,
    diagnostics: Diagnostics,
}

impl Default for RepaintScheduler {
    fn default() -> Self {
        RepaintScheduler::new(true)
    }
}

impl RepaintScheduler {
    /// Creates a scheduler. With `initial_render`, the first pass paints everything.
    pub fn new(initial_render: bool) -> RepaintScheduler {
        RepaintScheduler {
            force_full: initial_render,
            passes: 0,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn set_logger(&mut self, logger: Option<Arc<dyn Logger>>) {
        self.diagnostics = Diagnostics::new(logger);
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Returns true if the next pass will paint every visible widget.
    pub fn is_initial_pending(&self) -> bool {
        self.force_full
    }

    /// Runs one pass over the tree and returns the number of widgets painted.
    ///
    /// Afterwards no widget reachable from the root is dirty.
    pub fn repaint(&mut self, tree: &WidgetTree, canvas: &mut dyn Canvas) -> usize {
        let force = self.force_full;
        self.force_full = false;
        self.passes += 1;

        let mut painted = 0;
        if let Some(root) = tree.root() {
            painted = paint_subtree(tree, root, canvas, force, true);
        }
        self.diagnostics.debug(|| {
            format!(
                "repaint pass {}: {} widget(s) painted{}",
                self.passes,
                painted,
                if force { " (full)" } else { "" }
            )
        });
        painted
    }

    /// Runs one pass against a display surface and flushes if anything was painted.
    pub fn repaint_surface(
        &mut self,
        tree: &WidgetTree,
        display: &dyn Display,
        surface: SurfaceId,
    ) -> Result<usize, DisplayError> {
        let mut painted = 0;
        display.paint(surface, &mut |canvas| {
            painted = self.repaint(tree, canvas);
        })?;
        if painted > 0 {
            display.flush();
        }
        Ok(painted)
    }
}

fn paint_subtree(
    tree: &WidgetTree,
    id: WidgetId,
    canvas: &mut dyn Canvas,
    force: bool,
    visible: bool,
) -> usize {
    let node = match tree.node(id) {
        Ok(node) => node,
        Err(_) => return 0,
    };
    let visible = visible && node.visible;

    let mut painted = 0;
    if visible && (force || node.is_dirty()) {
        node.widget.paint(canvas, node.bounds);
        painted += 1;
    }
    node.set_dirty(false);

    for child in &node.children {
        painted += paint_subtree(tree, *child, canvas, force, visible);
    }
    painted
}
