//! Widget tree
//!
//! Widgets live in a slotmap arena addressed by generational [`WidgetId`]s,
//! so a stale id held by a trigger target or a trailing-item list simply
//! stops resolving once its widget is removed. Traversal order (roots in
//! insertion order, each followed depth-first by its children in insertion
//! order) is the order widgets are updated and drawn, and therefore the
//! order in which they compete for the mouse and focus tokens.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tessera_animation::{Animatable, AnimationTargets};

use crate::error::{Result, ViewError};
use crate::trigger::TargetRef;
use crate::widget::Widget;

new_key_type! {
    /// Handle to a widget in a [`WidgetTree`]
    pub struct WidgetId;
}

impl WidgetId {
    /// Convert to a raw u64, e.g. for the input snapshot's trailing-item list
    pub fn to_raw(self) -> u64 {
        self.0.as_ffi()
    }

    /// Reconstruct from a value produced by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        WidgetId::from(slotmap::KeyData::from_ffi(raw))
    }
}

struct WidgetNode {
    widget: Box<dyn Widget>,
    parent: Option<WidgetId>,
    children: SmallVec<[WidgetId; 4]>,
}

/// Arena of widgets plus the name index
#[derive(Default)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetNode>,
    roots: SmallVec<[WidgetId; 8]>,
    names: FxHashMap<String, WidgetId>,
}

impl std::fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetTree")
            .field("len", &self.nodes.len())
            .field("roots", &self.roots)
            .field("names", &self.names)
            .finish()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level widget
    pub fn insert(&mut self, widget: impl Widget + 'static) -> Result<WidgetId> {
        self.insert_boxed(None, Box::new(widget))
    }

    /// Add a widget as the last child of `parent`
    pub fn insert_child(&mut self, parent: WidgetId, widget: impl Widget + 'static) -> Result<WidgetId> {
        self.insert_boxed(Some(parent), Box::new(widget))
    }

    pub fn insert_boxed(
        &mut self,
        parent: Option<WidgetId>,
        mut widget: Box<dyn Widget>,
    ) -> Result<WidgetId> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(ViewError::UnknownWidget(parent));
            }
        }
        let name = widget.element().name.clone();
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(ViewError::DuplicateName(name.clone()));
            }
        }

        let id = self.nodes.insert_with_key(|id| {
            widget.element_mut().set_id(id);
            WidgetNode {
                widget,
                parent,
                children: SmallVec::new(),
            }
        });

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        if let Some(name) = name {
            self.names.insert(name, id);
        }
        tracing::trace!("WidgetTree: inserted {:?} under {:?}", id, parent);
        Ok(id)
    }

    /// Remove `id` and its whole subtree; returns every removed id
    pub fn remove(&mut self, id: WidgetId) -> Result<Vec<WidgetId>> {
        let parent = self
            .nodes
            .get(id)
            .ok_or(ViewError::UnknownWidget(id))?
            .parent;

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }

        let removed = self.subtree(id);
        for rid in &removed {
            if let Some(node) = self.nodes.remove(*rid) {
                if let Some(name) = &node.widget.element().name {
                    if self.names.get(name) == Some(rid) {
                        self.names.remove(name);
                    }
                }
            }
        }
        tracing::debug!("WidgetTree: removed {} widget(s) rooted at {:?}", removed.len(), id);
        Ok(removed)
    }

    /// `id` followed by its descendants in traversal order
    fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut order = Vec::new();
        let mut stack: SmallVec<[WidgetId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            order.push(current);
            // Reverse so the first child is visited first
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Every widget in update/draw order
    pub fn traversal_order(&self) -> Vec<WidgetId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            order.extend(self.subtree(*root));
        }
        order
    }

    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.nodes.get(id).map(|node| node.widget.as_ref())
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.nodes.get_mut(id).map(|node| node.widget.as_mut())
    }

    /// Look up a widget by its element name
    pub fn get_element_by_id(&self, name: &str) -> Option<WidgetId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[WidgetId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deliver `sender`'s trigger targets; returns how many were delivered
    ///
    /// Name targets are resolved and cached on first use. Targets that do
    /// not resolve, or whose widget has since been removed, are dropped
    /// with a warning. Targets with a required state only fire while the
    /// sender's `state_num` matches.
    pub fn send_triggers(&mut self, sender: WidgetId) -> Result<usize> {
        let node = self
            .nodes
            .get_mut(sender)
            .ok_or(ViewError::UnknownWidget(sender))?;
        let state = node.widget.element().state_num;
        let mut targets = node.widget.element_mut().take_trigger_targets();

        let mut delivered = 0;
        for target in &mut targets {
            if !target.applies_to(state) {
                continue;
            }
            let receiver = match &target.target {
                TargetRef::Resolved(id) => *id,
                TargetRef::Unresolved(tag) => match self.names.get(tag) {
                    Some(id) => {
                        let id = *id;
                        target.target = TargetRef::Resolved(id);
                        id
                    }
                    None => {
                        tracing::warn!(
                            "Trigger '{}' from {:?}: no widget named '{}'",
                            target.signal,
                            sender,
                            tag
                        );
                        continue;
                    }
                },
            };

            match self.nodes.get_mut(receiver) {
                Some(node) => {
                    node.widget
                        .element_mut()
                        .receive_trigger(target.signal.clone());
                    delivered += 1;
                }
                None => tracing::warn!(
                    "Trigger '{}' from {:?}: target {:?} no longer exists",
                    target.signal,
                    sender,
                    receiver
                ),
            }
        }

        if let Some(node) = self.nodes.get_mut(sender) {
            node.widget.element_mut().restore_trigger_targets(targets);
        }
        tracing::trace!("WidgetTree: {:?} delivered {} trigger(s)", sender, delivered);
        Ok(delivered)
    }
}

impl AnimationTargets<WidgetId> for WidgetTree {
    fn target_mut(&mut self, key: WidgetId) -> Option<&mut dyn Animatable> {
        self.nodes
            .get_mut(key)
            .map(|node| node.widget.element_mut() as &mut dyn Animatable)
    }
}
