//! Arena of transform nodes.
//!
//! Every node stores its local [`Trs`] plus lazily rebuilt local and world
//! matrices. Parent links are plain ids; the parent's `children` list is the
//! only ownership path. Cached matrices live in [`Cell`]s so that readers
//! (renderers, physics) only need a shared reference.
//!
//! # Example
//!
//! ```
//! use scenegraph_scene::TransformTree;
//! use glam::Vec3;
//!
//! let mut tree = TransformTree::new();
//! let parent = tree.create();
//! let child = tree.create();
//!
//! tree.translate_to(parent, Vec3::new(10.0, 0.0, 0.0));
//! tree.translate_to(child, Vec3::new(0.0, 5.0, 0.0));
//! tree.set_parent(child, Some(parent)).unwrap();
//!
//! assert!((tree.position(child) - Vec3::new(10.0, 5.0, 0.0)).length() < 1e-5);
//! ```

use std::cell::Cell;

use glam::{Mat4, Quat, Vec3};
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::change::{ChangeEvent, ChangeFlags, Listeners, SubscriptionId};
use crate::config::TreeConfig;
use crate::error::{HierarchyError, HierarchyResult};
use crate::math;
use crate::trs::Trs;

new_key_type! {
    /// Generational handle to a node in a [`TransformTree`].
    pub struct TransformId;
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) trs: Trs,
    pub(crate) parent: Option<TransformId>,
    pub(crate) children: Vec<TransformId>,
    local_matrix: Cell<Mat4>,
    local_dirty: Cell<bool>,
    world_matrix: Cell<Mat4>,
    world_dirty: Cell<bool>,
    listeners: Listeners,
}

impl Node {
    fn new(trs: Trs) -> Self {
        Self {
            trs,
            parent: None,
            children: Vec::new(),
            local_matrix: Cell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
            world_matrix: Cell::new(Mat4::IDENTITY),
            world_dirty: Cell::new(true),
            listeners: Listeners::default(),
        }
    }

    fn local_matrix(&self) -> Mat4 {
        if self.local_dirty.get() {
            self.local_matrix.set(self.trs.to_matrix());
            self.local_dirty.set(false);
        }
        self.local_matrix.get()
    }
}

/// Hierarchy of transforms with cached matrices and change notification.
#[derive(Debug)]
pub struct TransformTree {
    nodes: SlotMap<TransformId, Node>,
    config: TreeConfig,
    next_subscription: u64,
}

impl Default for TransformTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformTree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(config.initial_capacity),
            config,
            next_subscription: 0,
        }
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of live transforms.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no transforms.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live transform.
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Create a root transform at the origin.
    pub fn create(&mut self) -> TransformId {
        self.create_with(Trs::IDENTITY)
    }

    /// Create a root transform with the given local pose.
    ///
    /// The rotation is normalized; a zero or non-finite one becomes identity.
    pub fn create_with(&mut self, trs: Trs) -> TransformId {
        let trs = Trs {
            rotation: math::sanitize_rotation(trs.rotation),
            ..trs
        };
        let id = self.nodes.insert(Node::new(trs));
        debug!(?id, "created transform");
        id
    }

    // ---------------------------------------------------------------------
    // Local state
    // ---------------------------------------------------------------------

    /// Local pose of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was removed. Every accessor taking a [`TransformId`]
    /// behaves the same way; use [`get`](Self::get) when the handle may be
    /// stale.
    pub fn local(&self, id: TransformId) -> &Trs {
        &self.nodes[id].trs
    }

    /// Local pose of `id`, or `None` if it was removed.
    pub fn get(&self, id: TransformId) -> Option<&Trs> {
        self.nodes.get(id).map(|node| &node.trs)
    }

    /// Position relative to the parent.
    pub fn local_position(&self, id: TransformId) -> Vec3 {
        self.nodes[id].trs.position
    }

    /// Rotation relative to the parent.
    pub fn local_rotation(&self, id: TransformId) -> Quat {
        self.nodes[id].trs.rotation
    }

    /// Scale relative to the parent.
    pub fn local_scale(&self, id: TransformId) -> Vec3 {
        self.nodes[id].trs.scale
    }

    // ---------------------------------------------------------------------
    // Matrix composition
    // ---------------------------------------------------------------------

    /// Local matrix, rebuilt from the TRS state only if it changed since the
    /// last read.
    pub fn local_matrix(&self, id: TransformId) -> Mat4 {
        self.nodes[id].local_matrix()
    }

    /// World matrix: `parent_world * local`, or `local` for roots.
    ///
    /// Walks up to the nearest ancestor with a clean cache and rebuilds the
    /// chain top-down. A clean node never has a dirty ancestor.
    pub fn world_matrix(&self, id: TransformId) -> Mat4 {
        let node = &self.nodes[id];
        if !node.world_dirty.get() {
            return node.world_matrix.get();
        }

        let mut chain = Vec::new();
        let mut base = None;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            if !node.world_dirty.get() {
                base = Some(node.world_matrix.get());
                break;
            }
            chain.push(current);
            cursor = node.parent;
        }

        let mut world = Mat4::IDENTITY;
        for &current in chain.iter().rev() {
            let node = &self.nodes[current];
            let local = node.local_matrix();
            world = match base {
                Some(parent_world) => parent_world * local,
                None => local,
            };
            node.world_matrix.set(world);
            node.world_dirty.set(false);
            base = Some(world);
        }
        world
    }

    /// World-space position (translation of the world matrix).
    pub fn position(&self, id: TransformId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// World-space rotation: the local rotation composed with every
    /// ancestor's, root last.
    pub fn rotation(&self, id: TransformId) -> Quat {
        let node = &self.nodes[id];
        let mut rotation = node.trs.rotation;
        let mut cursor = node.parent;
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            rotation = node.trs.rotation * rotation;
            cursor = node.parent;
        }
        rotation.normalize()
    }

    /// Unit world-space right vector (+X of the rotation block).
    pub fn right(&self, id: TransformId) -> Vec3 {
        math::basis(&self.world_matrix(id)).0
    }

    /// Unit world-space up vector (+Y of the rotation block).
    pub fn up(&self, id: TransformId) -> Vec3 {
        math::basis(&self.world_matrix(id)).1
    }

    /// Unit world-space forward vector (-Z of the rotation block).
    pub fn forward(&self, id: TransformId) -> Vec3 {
        math::basis(&self.world_matrix(id)).2
    }

    /// Get the normal matrix (inverse transpose of the world matrix).
    ///
    /// If the world matrix is not invertible (e.g., contains zero scale),
    /// the identity matrix is returned to avoid NaN/Inf values.
    pub fn normal_matrix(&self, id: TransformId) -> Mat4 {
        math::normal_matrix(&self.world_matrix(id), self.config.singular_epsilon)
    }

    // ---------------------------------------------------------------------
    // Structure queries
    // ---------------------------------------------------------------------

    /// Parent of `id`, if any.
    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.nodes[id].parent
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: TransformId) -> &[TransformId] {
        &self.nodes[id].children
    }

    /// All transforms without a parent.
    pub fn roots(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: TransformId, id: TransformId) -> bool {
        let mut cursor = self.nodes.get(id).and_then(|node| node.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent);
        }
        false
    }

    /// Strict descendants of `id`, depth-first pre-order, children in
    /// insertion order.
    pub fn descendants(&self, id: TransformId) -> Descendants<'_> {
        let stack = self.nodes[id].children.iter().rev().copied().collect();
        Descendants { tree: self, stack }
    }

    // ---------------------------------------------------------------------
    // Change notification
    // ---------------------------------------------------------------------

    /// Register a listener for change events on `id`.
    ///
    /// Listeners run after the mutation has fully updated the tree, in
    /// subscription order.
    pub fn subscribe<F>(&mut self, id: TransformId, listener: F) -> HierarchyResult<SubscriptionId>
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(HierarchyError::StaleHandle(id))?;
        self.next_subscription += 1;
        Ok(node.listeners.push(self.next_subscription, Box::new(listener)))
    }

    /// Remove a listener. Returns `false` if it was not registered on `id`.
    pub fn unsubscribe(&mut self, id: TransformId, subscription: SubscriptionId) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.listeners.remove(subscription))
    }

    /// Number of listeners registered on `id`.
    pub fn listener_count(&self, id: TransformId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.listeners.len())
    }

    /// Invalidate `id` and its subtree, then notify.
    ///
    /// `id` gets `flags | WORLD`; every descendant gets `WORLD | FROM_PARENT`
    /// exactly once. Only TRS flags dirty the local cache.
    pub(crate) fn propagate(&mut self, id: TransformId, flags: ChangeFlags) {
        let mut events = Vec::new();

        let node = &self.nodes[id];
        if flags.intersects(ChangeFlags::POSITION | ChangeFlags::ROTATION | ChangeFlags::SCALE) {
            node.local_dirty.set(true);
        }
        node.world_dirty.set(true);
        if !node.listeners.is_empty() {
            events.push(ChangeEvent {
                transform: id,
                flags: flags | ChangeFlags::WORLD,
            });
        }

        let mut stack: Vec<TransformId> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            node.world_dirty.set(true);
            if !node.listeners.is_empty() {
                events.push(ChangeEvent {
                    transform: current,
                    flags: ChangeFlags::WORLD | ChangeFlags::FROM_PARENT,
                });
            }
            stack.extend(node.children.iter().rev().copied());
        }

        for event in &events {
            if let Some(node) = self.nodes.get_mut(event.transform) {
                node.listeners.dispatch(event);
            }
        }
    }

    pub(crate) fn node(&self, id: TransformId) -> HierarchyResult<&Node> {
        self.nodes.get(id).ok_or(HierarchyError::StaleHandle(id))
    }

    pub(crate) fn node_mut(&mut self, id: TransformId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub(crate) fn remove_node(&mut self, id: TransformId) -> Option<Node> {
        self.nodes.remove(id)
    }
}

/// Iterator returned by [`TransformTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a TransformTree,
    stack: Vec<TransformId>,
}

impl Iterator for Descendants<'_> {
    type Item = TransformId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(node) = self.tree.nodes.get(current) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    fn chain(tree: &mut TransformTree, depth: usize) -> Vec<TransformId> {
        let mut ids = vec![tree.create()];
        for _ in 1..depth {
            let id = tree.create();
            tree.set_parent(id, ids.last().copied()).unwrap();
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_new_node_is_identity() {
        let mut tree = TransformTree::new();
        let id = tree.create();

        assert_eq!(tree.local_matrix(id), Mat4::IDENTITY);
        assert_eq!(tree.world_matrix(id), Mat4::IDENTITY);
        assert_eq!(tree.position(id), Vec3::ZERO);
        assert_eq!(tree.rotation(id), Quat::IDENTITY);
        assert_eq!(tree.right(id), Vec3::X);
        assert_eq!(tree.up(id), Vec3::Y);
        assert_eq!(tree.forward(id), Vec3::NEG_Z);
    }

    #[test]
    fn test_create_with_pose() {
        let mut tree = TransformTree::new();
        let id = tree.create_with(Trs::new().with_position(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(tree.position(id), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(tree.len(), 1);
        assert!(tree.contains(id));
    }

    #[test]
    fn test_create_with_normalizes_rotation() {
        let mut tree = TransformTree::new();

        let zero = tree.create_with(Trs {
            rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            ..Trs::IDENTITY
        });
        assert_eq!(tree.local_rotation(zero), Quat::IDENTITY);
        assert_eq!(tree.rotation(zero), Quat::IDENTITY);
        assert!(tree.world_matrix(zero).is_finite());

        let long = tree.create_with(Trs {
            rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 2.0),
            ..Trs::IDENTITY
        });
        assert!((tree.local_rotation(long).length() - 1.0).abs() < EPSILON);
        assert_eq!(tree.local_matrix(long), Mat4::IDENTITY);
    }

    #[test]
    fn test_world_cache_cleared_along_chain() {
        let mut tree = TransformTree::new();
        let ids = chain(&mut tree, 4);
        for &id in &ids {
            tree.translate_to(id, Vec3::X);
        }

        assert!(approx_eq_vec3(tree.position(ids[3]), Vec3::new(4.0, 0.0, 0.0)));
        for &id in &ids {
            assert!(!tree.nodes[id].world_dirty.get());
        }

        tree.translate_to(ids[1], Vec3::new(2.0, 0.0, 0.0));
        assert!(!tree.nodes[ids[0]].world_dirty.get());
        assert!(tree.nodes[ids[1]].world_dirty.get());
        assert!(tree.nodes[ids[3]].world_dirty.get());
        assert!(approx_eq_vec3(tree.position(ids[3]), Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reading_child_leaves_grandchild_dirty() {
        let mut tree = TransformTree::new();
        let ids = chain(&mut tree, 3);
        tree.translate_to(ids[0], Vec3::Y);

        let _ = tree.world_matrix(ids[1]);
        assert!(!tree.nodes[ids[1]].world_dirty.get());
        assert!(tree.nodes[ids[2]].world_dirty.get());
        assert!(approx_eq_vec3(tree.position(ids[2]), Vec3::Y));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut tree = TransformTree::new();
        let ids = chain(&mut tree, 5_000);
        tree.translate_to(ids[0], Vec3::Z);

        let leaf = *ids.last().unwrap();
        assert!(approx_eq_vec3(tree.position(leaf), Vec3::Z));
        assert_eq!(tree.descendants(ids[0]).count(), 4_999);
    }

    #[test]
    fn test_rotation_composes_root_last() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Trs::new().with_rotation(Quat::from_rotation_y(FRAC_PI_2)));
        let child = tree.create_with(Trs::new().with_rotation(Quat::from_rotation_x(FRAC_PI_2)));
        tree.set_parent(child, Some(parent)).unwrap();

        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
        assert!(tree.rotation(child).dot(expected).abs() > 1.0 - EPSILON);

        let (_, from_matrix, _) = tree.world_matrix(child).to_scale_rotation_translation();
        assert!(tree.rotation(child).dot(from_matrix).abs() > 1.0 - EPSILON);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut tree = TransformTree::new();
        let root = tree.create();
        let a = tree.create();
        let b = tree.create();
        let a1 = tree.create();
        tree.set_parent(a, Some(root)).unwrap();
        tree.set_parent(b, Some(root)).unwrap();
        tree.set_parent(a1, Some(a)).unwrap();

        let order: Vec<_> = tree.descendants(root).collect();
        assert_eq!(order, vec![a, a1, b]);
        assert!(tree.is_ancestor_of(root, a1));
        assert!(!tree.is_ancestor_of(a1, root));
        assert!(!tree.is_ancestor_of(b, a1));
    }

    #[test]
    fn test_roots() {
        let mut tree = TransformTree::new();
        let a = tree.create();
        let b = tree.create();
        let c = tree.create();
        tree.set_parent(c, Some(a)).unwrap();

        let mut roots: Vec<_> = tree.roots().collect();
        roots.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(roots, expected);
    }

    #[test]
    fn test_get_survives_removal() {
        let mut tree = TransformTree::new();
        let id = tree.create_with(Trs::new().with_position(Vec3::Y));
        assert_eq!(tree.get(id).map(|trs| trs.position), Some(Vec3::Y));

        tree.remove(id).unwrap();
        assert!(tree.get(id).is_none());
        assert!(!tree.contains(id));
    }

    #[test]
    fn test_subscribe_stale_handle() {
        let mut tree = TransformTree::new();
        let id = tree.create();
        tree.remove(id).unwrap();
        assert_eq!(
            tree.subscribe(id, |_| {}).unwrap_err(),
            HierarchyError::StaleHandle(id)
        );
        assert_eq!(tree.listener_count(id), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let mut tree = TransformTree::new();
        let id = tree.create();
        let sub = tree.subscribe(id, |_| {}).unwrap();
        assert_eq!(tree.listener_count(id), 1);
        assert!(tree.unsubscribe(id, sub));
        assert!(!tree.unsubscribe(id, sub));
        assert_eq!(tree.listener_count(id), 0);
    }

    #[test]
    fn test_normal_matrix_with_parent() {
        let mut tree = TransformTree::new();
        let parent = tree.create_with(Trs::new().with_scale(Vec3::new(2.0, 1.0, 1.0)));
        let child = tree.create_with(Trs::new().with_scale(Vec3::new(1.0, 3.0, 1.0)));
        tree.set_parent(child, Some(parent)).unwrap();

        let expected = tree.world_matrix(child).inverse().transpose();
        assert_eq!(tree.normal_matrix(child), expected);
    }

    #[test]
    fn test_normal_matrix_non_invertible() {
        let mut tree = TransformTree::new();
        let id = tree.create_with(Trs::new().with_scale(Vec3::ZERO));
        let normal = tree.normal_matrix(id);

        assert_eq!(normal, Mat4::IDENTITY);
        assert!(normal.is_finite());
    }

    #[test]
    fn test_normal_matrix_small_scale() {
        let mut tree = TransformTree::new();
        let id = tree.create_with(Trs::new().with_scale(Vec3::splat(0.01)));
        let normal = tree.normal_matrix(id);

        assert!(approx_eq_vec3(normal.x_axis.truncate(), Vec3::new(100.0, 0.0, 0.0)));
        assert!(approx_eq_vec3(normal.z_axis.truncate(), Vec3::new(0.0, 0.0, 100.0)));
    }
}
