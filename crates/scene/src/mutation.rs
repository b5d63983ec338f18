//! TRS mutators.
//!
//! Every call writes the local pose, dirties the local cache of the node and
//! the world cache of its whole subtree, and fires exactly one change event
//! per affected node.

use glam::{Quat, Vec3};
use tracing::error;

use crate::change::ChangeFlags;
use crate::error::{HierarchyError, HierarchyResult};
use crate::math;
use crate::tree::{TransformId, TransformTree};
use crate::trs::{Space, Trs};

impl TransformTree {
    /// Set the local position.
    pub fn translate_to(&mut self, id: TransformId, position: Vec3) {
        self.node_mut(id).trs.position = position;
        self.propagate(id, ChangeFlags::POSITION);
    }

    /// Offset the local position by `delta`.
    ///
    /// A [`Space::World`] delta is a direction: it is mapped through the
    /// parent's inverse world matrix (rotation and scale only) first. Roots
    /// take it as is.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the parent's world matrix is singular. Release
    /// builds log an error and zero the delta along the collapsed axes.
    pub fn translate_by(&mut self, id: TransformId, delta: Vec3, space: Space) {
        let delta = match (space, self.parent(id)) {
            (Space::World, Some(parent)) => self.world_direction_to_local(parent, delta),
            _ => delta,
        };
        self.node_mut(id).trs.position += delta;
        self.propagate(id, ChangeFlags::POSITION);
    }

    /// Move `id` so that its world position becomes `position`.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::SingularParent`] if the parent's world matrix cannot
    /// be inverted. Nothing changes in that case.
    pub fn translate_to_world(&mut self, id: TransformId, position: Vec3) -> HierarchyResult<()> {
        let local = match self.parent(id) {
            Some(parent) => {
                let parent_world = self.world_matrix(parent);
                math::try_inverse(&parent_world, self.config().singular_epsilon)
                    .ok_or(HierarchyError::SingularParent(parent))?
                    .transform_point3(position)
            }
            None => position,
        };
        self.translate_to(id, local);
        Ok(())
    }

    /// Compose `delta` into the rotation.
    ///
    /// [`Space::Local`] applies `delta` in the node's own frame, before the
    /// existing local rotation. [`Space::World`] applies it about the world
    /// axes: the local rotation is back-solved so that the new world rotation
    /// is `delta * world`. Non-unit input is normalized.
    pub fn rotate_by(&mut self, id: TransformId, delta: Quat, space: Space) {
        let delta = math::sanitize_rotation(delta);
        let local = self.local_rotation(id);

        let rotation = match space {
            Space::Local => local * delta,
            Space::World => match self.parent(id) {
                Some(parent) => {
                    let parent_rotation = self.rotation(parent);
                    parent_rotation.inverse() * delta * parent_rotation * local
                }
                None => delta * local,
            },
        };

        self.node_mut(id).trs.rotation = rotation.normalize();
        self.propagate(id, ChangeFlags::ROTATION);
    }

    /// Rotate by Euler radians `(x = pitch, y = yaw, z = roll)`.
    pub fn rotate_euler_by(&mut self, id: TransformId, radians: Vec3, space: Space) {
        self.rotate_by(id, math::yaw_pitch_roll(radians), space);
    }

    /// Set the local rotation.
    pub fn rotate_to(&mut self, id: TransformId, rotation: Quat) {
        self.node_mut(id).trs.rotation = math::sanitize_rotation(rotation);
        self.propagate(id, ChangeFlags::ROTATION);
    }

    /// Set the local rotation so that the world rotation becomes `rotation`.
    pub fn rotate_to_world(&mut self, id: TransformId, rotation: Quat) {
        let rotation = math::sanitize_rotation(rotation);
        let local = match self.parent(id) {
            Some(parent) => self.rotation(parent).inverse() * rotation,
            None => rotation,
        };
        self.rotate_to(id, local);
    }

    /// Set the local scale.
    pub fn scale_to(&mut self, id: TransformId, scale: Vec3) {
        self.node_mut(id).trs.scale = scale;
        self.propagate(id, ChangeFlags::SCALE);
    }

    /// Multiply the local scale uniformly.
    pub fn scale_by(&mut self, id: TransformId, factor: f32) {
        self.scale_by_vec(id, Vec3::splat(factor));
    }

    /// Multiply the local scale per axis.
    pub fn scale_by_vec(&mut self, id: TransformId, factors: Vec3) {
        self.node_mut(id).trs.scale *= factors;
        self.propagate(id, ChangeFlags::SCALE);
    }

    /// Replace the whole local pose in one step.
    pub fn set_local(&mut self, id: TransformId, trs: Trs) {
        let trs = Trs {
            rotation: math::sanitize_rotation(trs.rotation),
            ..trs
        };
        self.node_mut(id).trs = trs;
        self.propagate(
            id,
            ChangeFlags::POSITION | ChangeFlags::ROTATION | ChangeFlags::SCALE,
        );
    }

    fn world_direction_to_local(&self, parent: TransformId, delta: Vec3) -> Vec3 {
        let parent_world = self.world_matrix(parent);
        let epsilon = self.config().singular_epsilon;

        match math::inverse_transform_vector(&parent_world, delta, epsilon) {
            Some(local) => local,
            None => {
                if cfg!(debug_assertions) {
                    panic!("world-space translation under non-invertible parent {parent:?}");
                }
                error!(
                    ?parent,
                    "parent world matrix is singular, translating along surviving axes"
                );
                math::pseudo_inverse_transform_vector(&parent_world, delta, epsilon)
            }
        }
    }
}
