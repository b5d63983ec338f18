//! Local translation / rotation / scale state.
//!
//! [`Trs`] is the raw, uncached pose of a node relative to its parent. The
//! tree owns one per node and rebuilds the local matrix from it lazily.
//!
//! # Example
//!
//! ```
//! use scenegraph_scene::Trs;
//! use glam::{Mat4, Vec3};
//!
//! let trs = Trs::new()
//!     .with_position(Vec3::new(1.0, 2.0, 3.0))
//!     .with_scale(Vec3::splat(2.0));
//!
//! assert_eq!(trs.to_matrix().w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
//! assert_eq!(Trs::default().to_matrix(), Mat4::IDENTITY);
//! ```

use glam::{Mat4, Quat, Vec3};

/// Coordinate frame a delta is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Space {
    /// Relative to the node's parent (or the world origin for roots).
    #[default]
    Local,
    /// Relative to the scene's global origin.
    World,
}

/// Position, rotation and scale relative to the parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    /// Offset relative to the parent
    pub position: Vec3,
    /// Orientation relative to the parent, kept normalized
    pub rotation: Quat,
    /// Per-axis scale relative to the parent
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Trs {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create an identity pose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pose with the given position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Create a pose with the given rotation. The rotation is normalized.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = crate::math::sanitize_rotation(rotation);
        self
    }

    /// Create a pose with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Decompose an affine matrix into a pose.
    ///
    /// Shear cannot be represented and is dropped.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: crate::math::sanitize_rotation(rotation),
            scale,
        }
    }

    /// Build the local matrix: scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
