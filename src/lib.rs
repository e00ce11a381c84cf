//! # bevy_spline_chain
//!
//! A Bevy plugin for node-based cubic Bézier splines and path followers.
//!
//! ## Features
//!
//! - Chains of user-placed nodes with incoming/outgoing tangent handles
//! - Incremental re-tessellation driven by dirty flags, one tick at a time
//! - Arc length, node link distance and closest-point queries
//! - Followers that walk an entity along the chain at constant speed
//! - Optional gizmo debug drawing (`debug-draw` feature)
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_spline_chain::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins((SplinePlugin, SplineFollowPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     let mut spline = Spline::new(16);
//!     let a = spline.chain.append_node(Vec3::ZERO);
//!     let b = spline.chain.append_node(Vec3::ZERO);
//!     spline.chain.set_position(b, Vec3::new(10.0, 0.0, 0.0));
//!     spline.chain.set_out_tangent(a, Vec3::new(0.0, 4.0, 0.0));
//!     let spline_entity = commands.spawn(spline).id();
//!
//!     commands.spawn((
//!         Transform::default(),
//!         SplineFollower::new(spline_entity).with_speed(3.0).moving(),
//!     ));
//! }
//! ```
//!
//! ## Plugins
//!
//! - [`SplinePlugin`]: Chain ticking, node entities and type registration (required)
//! - [`SplineFollowPlugin`]: Move entities along spline chains (optional)
//! - [`SplineDebugDrawPlugin`]: Gizmo visualization of nodes and samples (optional)

pub mod error;
pub mod path_follow;
pub mod spline;

#[cfg(feature = "debug-draw")]
pub mod debug;

pub use error::{SplineError, SplineResult};
pub use path_follow::SplineFollowPlugin;
pub use spline::SplinePlugin;

#[cfg(feature = "debug-draw")]
pub use debug::SplineDebugDrawPlugin;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::error::{SplineError, SplineResult};
    pub use crate::path_follow::{
        FollowerEvent, FollowerEventKind, FollowerState, FollowerStep, SplineFollowPlugin,
        SplineFollower,
    };
    pub use crate::spline::{
        cubic_bezier, AppendSplineNode, ChainClosestPoint, ChainNode, NodeId, NodePositions,
        PathLocation, SegmentClosestPoint, Spline, SplineChain, SplineNodeHandle, SplinePlugin,
        SplinePoint, SplineSegment, SplineSettings, SplineSystems,
    };

    #[cfg(feature = "debug-draw")]
    pub use crate::debug::{DebugDrawSettings, SplineDebugDraw, SplineDebugDrawPlugin};
}
