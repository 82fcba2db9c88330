//! Event routing and focus.
//!
//! Pointer events go to the topmost visible widget under the pointer: the tree is searched
//! depth-first with later siblings first, so whatever is painted last is hit first. If nothing
//! matches, the root gets the event. From the target the event bubbles up through the parents
//! until some widget reports [`Handled::Yes`].
//!
//! Key events go to the focused widget only and are dropped when nothing is focused. Paint events
//! are not dispatched at all; they invalidate the whole tree so that the next repaint pass redraws
//! everything.
//!
//! A pointer press moves focus to the nearest focusable widget at or above the hit target. The
//! old holder is told it lost focus before the new one is told it gained it. What happens when a
//! press lands on nothing focusable is decided by the tree's [`FocusPolicy`].

use crate::events::Event;
use crate::tree::{TreeError, WidgetTree};
use crate::widget::{EventCx, Handled, WidgetId};
use cgmath::Point2;

/// What a pointer press outside every focusable widget does to focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPolicy {
    /// Clear focus, unless the press landed inside the focused widget's bounds.
    ClearOnMiss,
    /// Keep focus where it is.
    PreserveOnMiss,
}

impl Default for FocusPolicy {
    fn default() -> Self {
        FocusPolicy::ClearOnMiss
    }
}

/// The outcome of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event reached `target`. `handled_by` is the widget that consumed it, if any.
    Delivered {
        target: WidgetId,
        handled_by: Option<WidgetId>,
    },
    /// Nobody could receive the event.
    Dropped,
    /// Every widget was marked dirty.
    RepaintAll,
}

impl WidgetTree {
    pub fn focus_policy(&self) -> FocusPolicy {
        self.focus_policy
    }

    pub fn set_focus_policy(&mut self, policy: FocusPolicy) {
        self.focus_policy = policy;
    }

    /// The focused widget, if any.
    pub fn focused(&self) -> Option<WidgetId> {
        self.focus
    }

    /// Moves focus to a widget, notifying the previous holder first.
    ///
    /// The widget must be attached under the root and visible; focusability is not required.
    pub fn set_focus(&mut self, id: WidgetId) -> Result<(), TreeError> {
        self.node(id)?;
        if !self.is_reachable(id) {
            return Err(TreeError::NoSuchWidget(id));
        }
        self.transfer_focus(Some(id));
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.transfer_focus(None);
    }

    /// Returns true if the widget is attached under the root and it and all its ancestors are
    /// visible.
    fn is_reachable(&self, id: WidgetId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = match self.nodes.get(&current) {
                Some(node) => node,
                None => return false,
            };
            if !node.visible {
                return false;
            }
            if node.parent.is_none() {
                return self.root == Some(current);
            }
            cursor = node.parent;
        }
        false
    }

    /// Returns the topmost visible widget containing the point.
    pub fn hit_test(&self, point: Point2<i32>) -> Option<WidgetId> {
        self.hit_test_from(self.root?, point)
    }

    fn hit_test_from(&self, id: WidgetId, point: Point2<i32>) -> Option<WidgetId> {
        let node = self.nodes.get(&id)?;
        if !node.visible {
            return None;
        }
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test_from(*child, point) {
                return Some(hit);
            }
        }
        if node.bounds.contains(point) {
            Some(id)
        } else {
            None
        }
    }

    /// Routes one event through the tree.
    pub fn dispatch(&mut self, event: &Event) -> Dispatch {
        match event {
            Event::PointerMove(point) => self.dispatch_pointer(event, *point),
            Event::PointerDown(point) => {
                let hit = self.hit_test(*point);
                self.focus_for_press(hit, *point);
                let dispatch = self.dispatch_pointer(event, *point);
                self.pointer_owner = match dispatch {
                    Dispatch::Delivered { handled_by, .. } => handled_by,
                    _ => None,
                };
                dispatch
            }
            Event::PointerUp(point) => {
                let dispatch = self.dispatch_pointer(event, *point);
                // whoever took the press also sees its release
                if let Some(owner) = self.pointer_owner.take() {
                    if !self.reached(&dispatch, owner) {
                        self.deliver(owner, event);
                    }
                }
                dispatch
            }
            Event::KeyDown(key) => match self.focus {
                Some(focus) => {
                    let handled = self.deliver(focus, event);
                    Dispatch::Delivered {
                        target: focus,
                        handled_by: if handled == Handled::Yes {
                            Some(focus)
                        } else {
                            None
                        },
                    }
                }
                None => {
                    let code = key.code;
                    self.diagnostics
                        .debug(|| format!("dropping {:?} key: nothing focused", code));
                    Dispatch::Dropped
                }
            },
            Event::Paint => {
                self.invalidate_all();
                Dispatch::RepaintAll
            }
            Event::Other => match self.root {
                Some(root) => {
                    let handled = self.deliver(root, event);
                    Dispatch::Delivered {
                        target: root,
                        handled_by: if handled == Handled::Yes {
                            Some(root)
                        } else {
                            None
                        },
                    }
                }
                None => Dispatch::Dropped,
            },
        }
    }

    fn dispatch_pointer(&mut self, event: &Event, point: Point2<i32>) -> Dispatch {
        let target = match self.hit_test(point).or(self.root) {
            Some(target) => target,
            None => return Dispatch::Dropped,
        };

        let mut cursor = Some(target);
        while let Some(id) = cursor {
            if self.deliver(id, event) == Handled::Yes {
                return Dispatch::Delivered {
                    target,
                    handled_by: Some(id),
                };
            }
            cursor = self.parent(id);
        }
        Dispatch::Delivered {
            target,
            handled_by: None,
        }
    }

    /// Returns true if bubbling for `dispatch` delivered the event to `id`.
    fn reached(&self, dispatch: &Dispatch, id: WidgetId) -> bool {
        let (target, handled_by) = match *dispatch {
            Dispatch::Delivered { target, handled_by } => (target, handled_by),
            _ => return false,
        };
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            if Some(current) == handled_by {
                return false;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Updates focus for a pointer press at `point` that hit `hit`.
    fn focus_for_press(&mut self, hit: Option<WidgetId>, point: Point2<i32>) {
        let mut cursor = hit;
        while let Some(id) = cursor {
            let node = &self.nodes[&id];
            // children are not clipped, so an ancestor may not cover the press
            if node.widget.focusable() && node.bounds.contains(point) {
                self.transfer_focus(Some(id));
                return;
            }
            cursor = node.parent;
        }

        let focus = match self.focus {
            Some(focus) => focus,
            None => return,
        };
        let inside_focus = self
            .bounds(focus)
            .map_or(false, |bounds| bounds.contains(point));
        if !inside_focus && self.focus_policy == FocusPolicy::ClearOnMiss {
            self.transfer_focus(None);
        }
    }

    /// Moves focus, notifying the old holder before the new one.
    pub(crate) fn transfer_focus(&mut self, to: Option<WidgetId>) {
        if self.focus == to {
            return;
        }

        if let Some(old) = self.focus.take() {
            self.notify_focus(old, false);
            self.diagnostics.debug(|| format!("focus lost: {:?}", old));
        }
        self.focus = to;
        if let Some(new) = to {
            self.notify_focus(new, true);
            self.diagnostics.debug(|| format!("focus gained: {:?}", new));
        }
    }

    fn notify_focus(&mut self, id: WidgetId, focused: bool) {
        let diagnostics = &self.diagnostics;
        let node = match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => return,
        };
        let mut cx = EventCx::new(id, node.bounds, focused, diagnostics);
        node.widget.focus_changed(focused, &mut cx);
        if cx.dirty {
            node.set_dirty(true);
        }
    }

    /// Hands an event to a single widget and applies what it asked for.
    fn deliver(&mut self, id: WidgetId, event: &Event) -> Handled {
        let focused = self.focus == Some(id);
        let diagnostics = &self.diagnostics;
        let node = match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => return Handled::No,
        };
        let mut cx = EventCx::new(id, node.bounds, focused, diagnostics);
        let handled = node.widget.handle_event(event, &mut cx);
        if cx.dirty {
            node.set_dirty(true);
        }
        let resign = cx.resign_focus;

        if resign && focused {
            self.transfer_focus(None);
        }
        handled
    }
}
