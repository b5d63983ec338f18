//! Parenting, re-parenting and removal.
//!
//! The default policy keeps the child's local pose verbatim, so its world
//! pose follows the new parent. [`TransformTree::set_parent_keep_world`]
//! re-bases the local pose instead. Removing a node orphans its children
//! with their world pose frozen into their local pose.

use glam::Mat4;
use tracing::{debug, trace};

use crate::change::ChangeFlags;
use crate::entity::Entity;
use crate::error::{HierarchyError, HierarchyResult};
use crate::math;
use crate::tree::{TransformId, TransformTree};
use crate::trs::Trs;

const POSE: ChangeFlags = ChangeFlags::POSITION
    .union(ChangeFlags::ROTATION)
    .union(ChangeFlags::SCALE);

impl TransformTree {
    /// Attach `child` to `parent`, or detach it with `None`.
    ///
    /// Local position, rotation and scale are preserved; the world pose is
    /// recomputed under the new parent. Setting the current parent again is
    /// a no-op and fires nothing.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::SelfParent`] or [`HierarchyError::Cycle`] if the
    /// edit would make the tree cyclic, [`HierarchyError::StaleHandle`] if
    /// either id was removed. The tree is unchanged on error.
    pub fn set_parent(
        &mut self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> HierarchyResult<()> {
        if !self.validate_parent(child, parent)? {
            return Ok(());
        }

        self.relink(child, parent);
        trace!(?child, ?parent, "re-parented transform");
        self.propagate(child, ChangeFlags::HIERARCHY);
        Ok(())
    }

    /// Attach `child` to the transform owned by `parent`.
    pub fn set_parent_entity(
        &mut self,
        child: TransformId,
        parent: &Entity,
    ) -> HierarchyResult<()> {
        self.set_parent(child, Some(parent.transform()))
    }

    /// Attach `child` to `parent` while keeping its world pose.
    ///
    /// The local pose is recomputed as `inverse(parent_world) * world`. Shear
    /// that a non-uniformly scaled parent would require is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`set_parent`](Self::set_parent), plus
    /// [`HierarchyError::SingularParent`] if the parent's world matrix cannot
    /// be inverted.
    pub fn set_parent_keep_world(
        &mut self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> HierarchyResult<()> {
        if !self.validate_parent(child, parent)? {
            return Ok(());
        }

        let world = self.world_matrix(child);
        let local = match parent {
            Some(parent) => {
                let parent_world = self.world_matrix(parent);
                let inverse = math::try_inverse(&parent_world, self.config().singular_epsilon)
                    .ok_or(HierarchyError::SingularParent(parent))?;
                inverse * world
            }
            None => world,
        };

        self.relink(child, parent);
        self.node_mut(child).trs = Trs::from_matrix(&local);
        trace!(?child, ?parent, "re-parented transform, world pose kept");
        self.propagate(child, POSE | ChangeFlags::HIERARCHY);
        Ok(())
    }

    /// Remove `id` from the tree.
    ///
    /// The node is detached from its parent. Its children become roots whose
    /// local pose equals their previous world pose; each fires a change event.
    pub fn remove(&mut self, id: TransformId) -> HierarchyResult<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.orphan_keep_world(child);
        }

        self.relink(id, None);
        self.remove_node(id);
        debug!(?id, "removed transform");
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns the number of removed nodes.
    pub fn remove_recursive(&mut self, id: TransformId) -> HierarchyResult<usize> {
        self.node(id)?;
        let doomed: Vec<_> = std::iter::once(id).chain(self.descendants(id)).collect();

        self.relink(id, None);
        for &node in &doomed {
            self.remove_node(node);
        }
        debug!(?id, count = doomed.len(), "removed transform subtree");
        Ok(doomed.len())
    }

    /// Check a proposed edit. Returns `Ok(false)` when it would change nothing.
    fn validate_parent(
        &self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> HierarchyResult<bool> {
        let current = self.node(child)?.parent;

        if let Some(parent) = parent {
            self.node(parent)?;
            if parent == child {
                debug!(?child, "rejected self-parenting");
                return Err(HierarchyError::SelfParent(child));
            }
            if self.is_ancestor_of(child, parent) {
                debug!(?child, ?parent, "rejected cyclic parenting");
                return Err(HierarchyError::Cycle { child, parent });
            }
        }

        Ok(current != parent)
    }

    /// Move `child` from its current parent's list to `parent`'s.
    fn relink(&mut self, child: TransformId, parent: Option<TransformId>) {
        if let Some(old) = self.node_mut(child).parent.take() {
            self.node_mut(old).children.retain(|&c| c != child);
        }
        if let Some(new) = parent {
            self.node_mut(new).children.push(child);
        }
        self.node_mut(child).parent = parent;
    }

    fn orphan_keep_world(&mut self, child: TransformId) {
        let world: Mat4 = self.world_matrix(child);
        self.relink(child, None);
        self.node_mut(child).trs = Trs::from_matrix(&world);
        self.propagate(child, POSE | ChangeFlags::HIERARCHY);
    }
}
