use crate::logger::{Diagnostics, Logger};
use crate::rect::Rect;
use crate::router::FocusPolicy;
use crate::widget::{Widget, WidgetId};
use cgmath::{Point2, Vector2};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Errors returned by tree mutations. The tree is left untouched whenever one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no such widget: {0:?}")]
    NoSuchWidget(WidgetId),

    /// The widget already has a parent (or is the root); detach it first.
    #[error("widget {0:?} is already attached")]
    AlreadyAttached(WidgetId),

    /// Attaching would make a widget its own ancestor.
    #[error("attaching {child:?} to {parent:?} would create a cycle")]
    WouldCycle { parent: WidgetId, child: WidgetId },
}

/// A node in the widget tree.
pub(crate) struct Node {
    pub(crate) widget: Box<dyn Widget>,
    /// Window coordinates.
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    /// Shared with [`Invalidator`]s, which only hold weak references.
    pub(crate) dirty: Arc<AtomicBool>,
    /// Non-owning back reference.
    pub(crate) parent: Option<WidgetId>,
    /// Owned children, in paint order (last is topmost).
    pub(crate) children: Vec<WidgetId>,
}

impl Node {
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }
}

/// A hierarchy of widgets.
///
/// Nodes live in an arena keyed by [`WidgetId`]. Ownership runs strictly from parent to children
/// through each node's child list; the parent link is an id and never keeps anything alive.
/// Widgets created with [`create`](WidgetTree::create) start out detached and are attached with
/// [`add_child`](WidgetTree::add_child) or [`set_root`](WidgetTree::set_root). A widget can only
/// be attached once; moving a subtree means detaching it first, so the tree stays acyclic.
///
/// Geometry is never computed: positions and sizes are whatever callers set, in window
/// coordinates.
pub struct WidgetTree {
    pub(crate) nodes: HashMap<WidgetId, Node>,
    pub(crate) root: Option<WidgetId>,
    pub(crate) focus: Option<WidgetId>,
    /// The widget that handled the last pointer press, until the matching release.
    pub(crate) pointer_owner: Option<WidgetId>,
    pub(crate) focus_policy: FocusPolicy,
    pub(crate) diagnostics: Diagnostics,
}

impl Default for WidgetTree {
    fn default() -> Self {
        WidgetTree::new()
    }
}

impl WidgetTree {
    /// Creates an empty tree.
    pub fn new() -> WidgetTree {
        WidgetTree {
            nodes: HashMap::new(),
            root: None,
            focus: None,
            pointer_owner: None,
            focus_policy: FocusPolicy::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Creates a tree whose root is the given widget.
    pub fn with_root(widget: impl Widget, bounds: Rect) -> WidgetTree {
        let mut tree = WidgetTree::new();
        let root = tree.create(widget, bounds);
        tree.root = Some(root);
        tree
    }

    /// Sets the logger used for focus and routing diagnostics.
    pub fn set_logger(&mut self, logger: Option<Arc<dyn Logger>>) {
        self.diagnostics = Diagnostics::new(logger);
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Number of widgets, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn node(&self, id: WidgetId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::NoSuchWidget(id))
    }

    fn node_mut(&mut self, id: WidgetId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NoSuchWidget(id))
    }

    /// Adds a detached widget. It is dirty until first painted.
    pub fn create(&mut self, widget: impl Widget, bounds: Rect) -> WidgetId {
        self.create_boxed(Box::new(widget), bounds)
    }

    pub fn create_boxed(&mut self, widget: Box<dyn Widget>, bounds: Rect) -> WidgetId {
        let id = WidgetId::new();
        self.nodes.insert(
            id,
            Node {
                widget,
                bounds,
                visible: true,
                dirty: Arc::new(AtomicBool::new(true)),
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Creates a widget and appends it to `parent`'s children.
    pub fn insert(
        &mut self,
        parent: WidgetId,
        widget: impl Widget,
        bounds: Rect,
    ) -> Result<WidgetId, TreeError> {
        self.node(parent)?;
        let id = self.create(widget, bounds);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Makes a detached widget the root.
    ///
    /// The previous root, if any, is detached (not destroyed) and returned.
    pub fn set_root(&mut self, id: WidgetId) -> Result<Option<WidgetId>, TreeError> {
        let node = self.node(id)?;
        if node.parent.is_some() || self.root == Some(id) {
            return Err(self.violation(TreeError::AlreadyAttached(id)));
        }

        let previous = self.root.take();
        if let (Some(previous), Some(focus)) = (previous, self.focus) {
            if self.is_ancestor_or_self(previous, focus) {
                self.transfer_focus(None);
            }
        }
        self.root = Some(id);
        self.mark_subtree_dirty(id);
        Ok(previous)
    }

    /// Appends a detached widget (with its subtree) to `parent`'s children.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent.is_some() || self.root == Some(child) {
            return Err(self.violation(TreeError::AlreadyAttached(child)));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(self.violation(TreeError::WouldCycle { parent, child }));
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.mark_subtree_dirty(child);
        Ok(())
    }

    /// Detaches a widget from its parent (or from the root slot). The subtree stays alive and can
    /// be attached again. Focus inside the subtree is cleared.
    pub fn detach(&mut self, id: WidgetId) -> Result<(), TreeError> {
        let parent = self.node(id)?.parent;
        if let Some(focus) = self.focus {
            if self.is_ancestor_or_self(id, focus) {
                self.transfer_focus(None);
            }
        }

        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent)?;
                parent_node.children.retain(|c| *c != id);
                // whatever was beneath the widget needs repainting
                parent_node.set_dirty(true);
                self.node_mut(id)?.parent = None;
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }
        Ok(())
    }

    /// Detaches and destroys a widget together with all of its descendants.
    pub fn remove(&mut self, id: WidgetId) -> Result<(), TreeError> {
        self.detach(id)?;
        self.destroy(id);
        Ok(())
    }

    fn destroy(&mut self, id: WidgetId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.destroy(child);
            }
        }
    }

    /// Returns true if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|node| node.parent);
        }
        false
    }

    /// The ordered children of a widget. Empty for unknown widgets.
    ///
    /// The slice borrows the tree, so the child sequence cannot change while it is traversed.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// All widgets of the subtree at `id`, in pre-order.
    pub fn pre_order(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    pub fn bounds(&self, id: WidgetId) -> Option<Rect> {
        self.nodes.get(&id).map(|node| node.bounds)
    }

    /// Moves a widget. Nothing else is laid out again.
    pub fn set_position(&mut self, id: WidgetId, x: i32, y: i32) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.bounds = node.bounds.with_origin(Point2::new(x, y));
        node.set_dirty(true);
        Ok(())
    }

    /// Resizes a widget. Nothing else is laid out again.
    pub fn set_size(&mut self, id: WidgetId, width: i32, height: i32) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.bounds = node.bounds.with_size(Vector2::new(width, height));
        node.set_dirty(true);
        Ok(())
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.nodes.get(&id).map_or(false, |node| node.visible)
    }

    /// Shows or hides a widget and its subtree.
    ///
    /// Hiding marks the parent dirty so the uncovered area gets repainted, and drops focus held
    /// inside the subtree.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        node.set_dirty(true);
        let parent = node.parent;

        if !visible {
            if let Some(parent) = parent {
                self.node(parent)?.set_dirty(true);
            }
            if let Some(focus) = self.focus {
                if self.is_ancestor_or_self(id, focus) {
                    self.transfer_focus(None);
                }
            }
        } else {
            self.mark_subtree_dirty(id);
        }
        Ok(())
    }

    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.nodes.get(&id).map_or(false, |node| node.is_dirty())
    }

    /// Flags exactly this widget for repaint; neither parent nor children are affected.
    pub fn mark_dirty(&mut self, id: WidgetId) -> Result<(), TreeError> {
        self.node(id)?.set_dirty(true);
        Ok(())
    }

    fn mark_subtree_dirty(&self, id: WidgetId) {
        for id in self.pre_order(id) {
            if let Some(node) = self.nodes.get(&id) {
                node.set_dirty(true);
            }
        }
    }

    /// Marks every widget dirty.
    pub fn invalidate_all(&mut self) {
        for node in self.nodes.values() {
            node.set_dirty(true);
        }
    }

    /// Returns a handle that can mark this widget dirty without access to the tree.
    pub fn invalidator(&self, id: WidgetId) -> Option<Invalidator> {
        self.nodes.get(&id).map(|node| Invalidator {
            flag: Arc::downgrade(&node.dirty),
        })
    }

    /// Borrows a widget as its concrete type.
    pub fn widget<T: Widget>(&self, id: WidgetId) -> Option<&T> {
        let widget: &dyn Widget = &*self.nodes.get(&id)?.widget;
        widget.as_any().downcast_ref::<T>()
    }

    /// Mutably borrows a widget as its concrete type.
    ///
    /// This does not mark the widget dirty; see [`update`](WidgetTree::update).
    pub fn widget_mut<T: Widget>(&mut self, id: WidgetId) -> Option<&mut T> {
        let widget: &mut dyn Widget = &mut *self.nodes.get_mut(&id)?.widget;
        widget.as_any_mut().downcast_mut::<T>()
    }

    /// Mutates a widget as its concrete type and marks it dirty.
    pub fn update<T, R, F>(&mut self, id: WidgetId, f: F) -> Option<R>
    where
        T: Widget,
        F: FnOnce(&mut T) -> R,
    {
        let node = self.nodes.get_mut(&id)?;
        let widget: &mut dyn Widget = &mut *node.widget;
        let result = f(widget.as_any_mut().downcast_mut::<T>()?);
        node.set_dirty(true);
        Some(result)
    }

    pub(crate) fn violation(&self, error: TreeError) -> TreeError {
        self.diagnostics
            .error(|| format!("widget tree invariant violated: {}", error));
        error
    }
}

impl core::fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("WidgetTree")
            .field("root", &self.root)
            .field("widgets", &self.nodes.len())
            .field("focus", &self.focus)
            .field("focus_policy", &self.focus_policy)
            .finish()
    }
}

/// Marks one widget dirty from outside the tree, e.g. from a signal subscriber.
///
/// Holds no ownership: once the widget is destroyed, invalidating does nothing.
#[derive(Debug, Clone)]
pub struct Invalidator {
    flag: Weak<AtomicBool>,
}

impl Invalidator {
    /// Marks the widget dirty. Returns false if the widget no longer exists.
    pub fn invalidate(&self) -> bool {
        match self.flag.upgrade() {
            Some(flag) => {
                flag.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;

    fn tree_with_two() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::with_root(Probe::new("root"), Rect::new(0, 0, 200, 100));
        let root = tree.root().unwrap();
        let a = tree
            .insert(root, Probe::new("a"), Rect::new(0, 0, 50, 50))
            .unwrap();
        let b = tree
            .insert(root, Probe::new("b"), Rect::new(60, 0, 50, 50))
            .unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn add_child_links_both_ways() {
        let (tree, root, a, b) = tree_with_two();
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.pre_order(root), vec![root, a, b]);
        assert_eq!(tree.widget::<Probe>(b).map(|p| p.name), Some("b"));
    }

    #[test]
    fn double_attach_is_rejected() {
        let (mut tree, root, a, b) = tree_with_two();
        assert_eq!(tree.add_child(b, a), Err(TreeError::AlreadyAttached(a)));
        assert_eq!(tree.add_child(a, root), Err(TreeError::AlreadyAttached(root)));
        assert_eq!(tree.children(b), &[] as &[WidgetId], "tree must be unchanged");
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut tree, _root, a, _b) = tree_with_two();
        let grandchild = tree.insert(a, Probe::new("c"), Rect::zero()).unwrap();
        tree.detach(a).unwrap();
        assert_eq!(
            tree.add_child(grandchild, a),
            Err(TreeError::WouldCycle {
                parent: grandchild,
                child: a
            })
        );
        assert_eq!(
            tree.add_child(a, a),
            Err(TreeError::WouldCycle { parent: a, child: a })
        );
    }

    #[test]
    fn detached_subtrees_can_move() {
        let (mut tree, root, a, b) = tree_with_two();
        let grandchild = tree.insert(a, Probe::new("c"), Rect::zero()).unwrap();
        tree.detach(a).unwrap();
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.parent(a), None);
        assert!(tree.contains(grandchild), "detaching keeps the subtree alive");

        tree.add_child(b, a).unwrap();
        assert_eq!(tree.pre_order(root), vec![root, b, a, grandchild]);
    }

    #[test]
    fn remove_destroys_descendants() {
        let (mut tree, root, a, _b) = tree_with_two();
        let grandchild = tree.insert(a, Probe::new("c"), Rect::zero()).unwrap();
        let invalidator = tree.invalidator(grandchild).unwrap();

        tree.remove(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children(root).len(), 1);
        assert!(!invalidator.invalidate(), "widget is gone");
        assert_eq!(tree.remove(a), Err(TreeError::NoSuchWidget(a)));
    }

    #[test]
    fn mark_dirty_does_not_cascade() {
        let (mut tree, root, a, b) = tree_with_two();
        for id in tree.pre_order(root) {
            tree.nodes[&id].set_dirty(false);
        }

        tree.mark_dirty(a).unwrap();
        assert!(tree.is_dirty(a));
        assert!(!tree.is_dirty(root));
        assert!(!tree.is_dirty(b));
    }

    #[test]
    fn geometry_changes_touch_only_the_widget() {
        let (mut tree, root, a, b) = tree_with_two();
        for id in tree.pre_order(root) {
            tree.nodes[&id].set_dirty(false);
        }

        tree.set_position(a, 5, 6).unwrap();
        tree.set_size(a, 7, 8).unwrap();
        assert_eq!(tree.bounds(a), Some(Rect::new(5, 6, 7, 8)));
        assert_eq!(tree.bounds(b), Some(Rect::new(60, 0, 50, 50)));
        assert!(tree.is_dirty(a));
        assert!(!tree.is_dirty(b));
        assert!(!tree.is_dirty(root));
    }

    #[test]
    fn hiding_marks_the_parent() {
        let (mut tree, root, a, b) = tree_with_two();
        for id in tree.pre_order(root) {
            tree.nodes[&id].set_dirty(false);
        }

        tree.set_visible(a, false).unwrap();
        assert!(!tree.is_visible(a));
        assert!(tree.is_dirty(root));
        assert!(!tree.is_dirty(b));
    }

    #[test]
    fn invalidator_marks_dirty() {
        let (tree, _root, a, _b) = tree_with_two();
        tree.nodes[&a].set_dirty(false);
        let invalidator = tree.invalidator(a).unwrap();
        assert!(invalidator.clone().invalidate());
        assert!(tree.is_dirty(a));
    }

    #[test]
    fn update_marks_dirty() {
        let (mut tree, _root, a, _b) = tree_with_two();
        tree.nodes[&a].set_dirty(false);
        assert_eq!(tree.update(a, |probe: &mut Probe| probe.name), Some("a"));
        assert!(tree.is_dirty(a));
        assert!(tree.widget_mut::<crate::widgets::Label>(a).is_none());
    }

    #[test]
    fn set_root_swaps_roots() {
        let (mut tree, root, _a, _b) = tree_with_two();
        let other = tree.create(Probe::new("other"), Rect::zero());
        assert_eq!(tree.set_root(other), Ok(Some(root)));
        assert_eq!(tree.root(), Some(other));
        assert!(tree.contains(root), "old root is detached, not destroyed");
        assert_eq!(tree.set_root(other), Err(TreeError::AlreadyAttached(other)));
    }
}
