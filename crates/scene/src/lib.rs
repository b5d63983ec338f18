//! Scene-graph transform core.
//!
//! This crate gives every scene object a position, rotation and scale,
//! composes them hierarchically and tells dependents when they change:
//! - [`Trs`]: local translation / rotation / scale state
//! - [`TransformTree`]: arena of nodes with cached local and world matrices
//! - Hierarchy edits with cycle rejection and orphaning on removal
//! - [`ChangeFlags`] events propagated depth-first to descendants
//!
//! Matrices follow glam's column-vector convention: `world = parent_world * local`
//! and `local = translate * rotate * scale`. Forward is `-Z`, right `+X`, up `+Y`.

mod change;
mod config;
mod entity;
mod error;
mod hierarchy;
mod math;
mod mutation;
mod tree;
mod trs;

pub use change::{ChangeEvent, ChangeFlags, SubscriptionId};
pub use config::TreeConfig;
pub use entity::Entity;
pub use error::{HierarchyError, HierarchyResult};
pub use math::yaw_pitch_roll;
pub use tree::{Descendants, TransformId, TransformTree};
pub use trs::{Space, Trs};
