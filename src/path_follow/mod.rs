//! Path following plugin for walking entities along spline chains.
//!
//! A [`SplineFollower`] targets the tessellated samples of each node along
//! the `next` links, emitting a [`FollowerEvent`] at every node it passes and
//! at the end of the path.
//!
//! # Example
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use bevy_spline_chain::prelude::*;
//!
//! fn setup(mut commands: Commands) {
//!     let mut spline = Spline::new(16);
//!     for x in [0.0, 5.0, 10.0] {
//!         let node = spline.chain.append_node(Vec3::ZERO);
//!         spline.chain.set_position(node, Vec3::new(x, 0.0, 0.0));
//!     }
//!     let spline_entity = commands.spawn(spline).id();
//!
//!     commands.spawn((
//!         Transform::default(),
//!         SplineFollower::new(spline_entity).with_speed(2.0).moving(),
//!     ));
//! }
//! ```

mod components;
mod systems;

pub use components::*;
pub use systems::update_spline_followers;

use bevy::prelude::*;

use crate::spline::SplineSystems;

/// Plugin that enables entities to follow spline chains.
///
/// Requires [`SplinePlugin`](crate::spline::SplinePlugin).
pub struct SplineFollowPlugin;

impl Plugin for SplineFollowPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SplineFollower>()
            .register_type::<FollowerState>()
            .add_message::<FollowerEvent>()
            .add_systems(
                Update,
                update_spline_followers.in_set(SplineSystems::Follow),
            );
    }
}
