//! Approximate assertions for vectors, rotations and matrices.

#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};

/// Default tolerance, absolute or relative.
pub const EPSILON: f32 = 1e-4;

fn close(expected: f32, actual: f32, eps: f32) -> bool {
    let abs = (actual - expected).abs();
    abs <= eps || abs / expected.abs().max(1.0) <= eps
}

#[track_caller]
pub fn assert_f32_eq(expected: f32, actual: f32) {
    assert!(
        close(expected, actual, EPSILON),
        "expected {expected}, got {actual} (abs err {})",
        (actual - expected).abs()
    );
}

#[track_caller]
pub fn assert_vec3_eq(expected: Vec3, actual: Vec3) {
    let ok = close(expected.x, actual.x, EPSILON)
        && close(expected.y, actual.y, EPSILON)
        && close(expected.z, actual.z, EPSILON);
    assert!(
        ok,
        "expected {expected:?}, got {actual:?} (delta {:?})",
        actual - expected
    );
}

/// Compares rotations, treating `q` and `-q` as equal.
#[track_caller]
pub fn assert_quat_eq(expected: Quat, actual: Quat) {
    let dot = expected.normalize().dot(actual.normalize()).abs().min(1.0);
    let angle = 2.0 * dot.acos();
    assert!(
        angle.to_degrees() < 0.01,
        "expected {expected:?}, got {actual:?} (angle error {:.6} deg)",
        angle.to_degrees()
    );
}

#[track_caller]
pub fn assert_mat4_eq(expected: Mat4, actual: Mat4) {
    let ok = expected
        .to_cols_array()
        .iter()
        .zip(actual.to_cols_array().iter())
        .all(|(e, a)| close(*e, *a, EPSILON));
    assert!(ok, "matrices differ\nexpected: {expected:?}\nactual:   {actual:?}");
}

#[track_caller]
pub fn assert_nearly_zero(v: Vec3) {
    assert!(v.length() <= EPSILON, "expected ~0, got {v:?} (|v| = {})", v.length());
}

/// The rotation block must have unit, pairwise orthogonal columns and
/// determinant +1.
#[track_caller]
pub fn assert_orthogonal(m: Mat4) {
    let r = m.x_axis.truncate();
    let u = m.y_axis.truncate();
    let b = m.z_axis.truncate();

    for (name, axis) in [("right", r), ("up", u), ("back", b)] {
        assert!(
            (axis.length() - 1.0).abs() <= EPSILON,
            "{name} axis not unit length: {}",
            axis.length()
        );
    }

    assert!(
        r.dot(u).abs() <= EPSILON && r.dot(b).abs() <= EPSILON && u.dot(b).abs() <= EPSILON,
        "axes not orthogonal: ru={} rb={} ub={}",
        r.dot(u),
        r.dot(b),
        u.dot(b)
    );

    let det = r.dot(u.cross(b));
    assert!(
        (r.cross(u) - b).length() <= 5.0 * EPSILON && det >= 1.0 - 5.0 * EPSILON,
        "not right-handed: |r x u - b| = {}, det = {det}",
        (r.cross(u) - b).length()
    );
}
