//! Small math helpers shared by the tree.

use glam::{Mat4, Quat, Vec3};
use tracing::warn;

/// Normalize a rotation, falling back to identity for zero or non-finite input.
pub(crate) fn sanitize_rotation(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq <= f32::EPSILON {
        warn!(rotation = ?q, "degenerate rotation replaced with identity");
        return Quat::IDENTITY;
    }
    if (len_sq - 1.0).abs() <= 1e-7 {
        q
    } else {
        q.normalize()
    }
}

/// Build a rotation from Euler radians `(x = pitch, y = yaw, z = roll)`.
///
/// Roll is applied first, then pitch, then yaw.
pub fn yaw_pitch_roll(radians: Vec3) -> Quat {
    Quat::from_rotation_y(radians.y)
        * Quat::from_rotation_x(radians.x)
        * Quat::from_rotation_z(radians.z)
}

/// Orthonormal right / up / forward extracted from a matrix's rotation block.
///
/// Scale is stripped and any shear introduced by non-uniform ancestor scale is
/// removed with Gram-Schmidt, so the result is always a right-handed basis.
pub(crate) fn basis(matrix: &Mat4) -> (Vec3, Vec3, Vec3) {
    let right = matrix.x_axis.truncate().try_normalize().unwrap_or(Vec3::X);
    let y = matrix.y_axis.truncate();
    let up = (y - right * right.dot(y))
        .try_normalize()
        .unwrap_or_else(|| right.any_orthonormal_vector());
    let back = right.cross(up);
    (right, up, -back)
}

/// Whether the rotation-scale block of `matrix` is degenerate.
///
/// The determinant is measured against the product of the axis lengths, so
/// the test ignores overall magnitude: a parent scaled by `0.01` is fine, a
/// parent with a zero or non-finite axis or two parallel axes is not.
pub(crate) fn is_singular(matrix: &Mat4, epsilon: f32) -> bool {
    let volume = matrix.x_axis.truncate().length()
        * matrix.y_axis.truncate().length()
        * matrix.z_axis.truncate().length();
    let det = matrix.determinant().abs();
    // negated so NaN counts as singular
    !(volume > 0.0 && det > epsilon * volume)
}

/// Inverse of `matrix`, or `None` when it is singular.
pub(crate) fn try_inverse(matrix: &Mat4, epsilon: f32) -> Option<Mat4> {
    (!is_singular(matrix, epsilon)).then(|| matrix.inverse())
}

/// Map a world-space direction into the local space of `parent_world`.
///
/// Returns `None` when the matrix cannot be inverted.
pub(crate) fn inverse_transform_vector(
    parent_world: &Mat4,
    v: Vec3,
    epsilon: f32,
) -> Option<Vec3> {
    try_inverse(parent_world, epsilon).map(|inverse| inverse.transform_vector3(v))
}

/// Best-effort inverse for a parent with a collapsed axis.
///
/// Undoes the rotation, divides by the scale on axes that still have one and
/// zeroes the rest.
pub(crate) fn pseudo_inverse_transform_vector(
    parent_world: &Mat4,
    v: Vec3,
    epsilon: f32,
) -> Vec3 {
    let (scale, rotation, _) = parent_world.to_scale_rotation_translation();
    let rotation = if rotation.is_finite() && rotation.length_squared() > f32::EPSILON {
        rotation.normalize()
    } else {
        Quat::IDENTITY
    };
    let local = rotation.inverse() * v;
    let cutoff = epsilon * scale.abs().max_element();
    let div = |c: f32, s: f32| if s.abs() > cutoff { c / s } else { 0.0 };
    Vec3::new(div(local.x, scale.x), div(local.y, scale.y), div(local.z, scale.z))
}

/// Inverse-transpose of `model`, or identity when `model` is singular.
pub(crate) fn normal_matrix(model: &Mat4, epsilon: f32) -> Mat4 {
    try_inverse(model, epsilon).map_or(Mat4::IDENTITY, |inverse| inverse.transpose())
}
