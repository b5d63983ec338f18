//! Entity handle.
//!
//! The scene-graph only needs one thing from the entity container: every
//! entity owns exactly one transform. [`Entity`] models that relationship
//! and surfaces rejected hierarchy edits as warnings, the way game code
//! expects speculative re-parenting to behave.

use tracing::warn;

use crate::error::HierarchyResult;
use crate::tree::{TransformId, TransformTree};
use crate::trs::Trs;

/// A named scene object owning one transform.
#[derive(Debug, PartialEq, Eq)]
pub struct Entity {
    name: String,
    transform: TransformId,
}

impl Entity {
    /// Create an entity with a new transform at the origin.
    pub fn spawn(tree: &mut TransformTree, name: impl Into<String>) -> Self {
        Self::spawn_with(tree, name, Trs::IDENTITY)
    }

    /// Create an entity with a new transform using `trs` as its local pose.
    pub fn spawn_with(tree: &mut TransformTree, name: impl Into<String>, trs: Trs) -> Self {
        Self {
            name: name.into(),
            transform: tree.create_with(trs),
        }
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The transform owned by this entity.
    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// Parent this entity under `parent`, or detach it with `None`.
    ///
    /// Invalid edits (cycles, self-parenting, removed entities) are logged and
    /// ignored. Returns whether the tree accepted the edit.
    pub fn set_parent(&self, tree: &mut TransformTree, parent: Option<&Entity>) -> bool {
        let result = match parent {
            Some(parent) => tree.set_parent_entity(self.transform, parent),
            None => tree.set_parent(self.transform, None),
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    entity = %self.name,
                    parent = parent.map(Entity::name),
                    %err,
                    "ignoring hierarchy change"
                );
                false
            }
        }
    }

    /// Destroy the entity's transform. Children are kept, frozen at their
    /// current world pose.
    pub fn despawn(self, tree: &mut TransformTree) -> HierarchyResult<()> {
        tree.remove(self.transform)
    }
}

impl From<&Entity> for TransformId {
    fn from(entity: &Entity) -> Self {
        entity.transform
    }
}
