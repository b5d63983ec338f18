//! Tree configuration.

/// Tuning knobs for a [`TransformTree`](crate::TransformTree).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeConfig {
    /// Singular-matrix threshold, relative to axis lengths.
    ///
    /// A world matrix counts as singular when `|det|` is at or below this
    /// fraction of the product of its axis lengths. Orthogonal axes score `1`
    /// at any scale; a collapsed or parallel axis scores `0`.
    pub singular_epsilon: f32,
    /// Number of nodes to reserve up front.
    pub initial_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            singular_epsilon: 1e-6,
            initial_capacity: 0,
        }
    }
}

impl TreeConfig {
    /// Set the singular-matrix threshold.
    pub fn with_singular_epsilon(mut self, epsilon: f32) -> Self {
        self.singular_epsilon = epsilon;
        self
    }

    /// Reserve room for `capacity` nodes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
