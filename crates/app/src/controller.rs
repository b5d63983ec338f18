//! Per-frame animation controllers.
//!
//! Controllers sample a curve from the frame time they are handed and push
//! the result into the tree through the regular mutators.

use glam::Vec3;
use scenegraph_core::FrameTime;
use scenegraph_scene::{Space, TransformId, TransformTree};

/// Something that animates one transform.
pub trait Controller {
    /// Advance the animation by one frame.
    fn update(&mut self, tree: &mut TransformTree, time: &FrameTime);
}

/// Constant angular velocity, incremental.
#[derive(Debug)]
pub struct Spin {
    pub target: TransformId,
    /// Radians per second about each Euler axis `(pitch, yaw, roll)`.
    pub rate: Vec3,
    pub space: Space,
}

impl Controller for Spin {
    fn update(&mut self, tree: &mut TransformTree, time: &FrameTime) {
        tree.rotate_euler_by(self.target, self.rate * time.delta_secs, self.space);
    }
}

/// Vertical sine wave around a rest position, absolute.
#[derive(Debug)]
pub struct Bob {
    pub target: TransformId,
    pub rest: Vec3,
    pub amplitude: f32,
    /// Oscillations per second.
    pub frequency: f32,
}

impl Controller for Bob {
    fn update(&mut self, tree: &mut TransformTree, time: &FrameTime) {
        let phase = time.elapsed_secs * self.frequency * std::f32::consts::TAU;
        let offset = Vec3::Y * self.amplitude * phase.sin();
        tree.translate_to(self.target, self.rest + offset);
    }
}
