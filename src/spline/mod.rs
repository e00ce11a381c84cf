mod arc_length;
mod bezier;
mod chain;
mod components;
mod segment;
mod systems;

pub use arc_length::PathLocation;
pub use bezier::cubic_bezier;
pub use chain::*;
pub use components::*;
pub use segment::*;
pub use systems::{append_spline_nodes, sync_spline_nodes};

use bevy::prelude::*;

/// Ordering of the per-frame spline work.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineSystems {
    /// Handle [`AppendSplineNode`] requests.
    AppendNodes,
    /// Pull node transforms and rebuild dirty segments.
    SyncNodes,
    /// Move followers along the refreshed chains.
    Follow,
}

/// Plugin that ticks spline chains and registers their types.
pub struct SplinePlugin;

impl Plugin for SplinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SplineSettings>()
            .register_type::<SplineSettings>()
            .register_type::<Spline>()
            .register_type::<SplineNodeHandle>()
            .add_message::<AppendSplineNode>()
            .configure_sets(
                Update,
                (
                    SplineSystems::AppendNodes,
                    SplineSystems::SyncNodes,
                    SplineSystems::Follow,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    append_spline_nodes.in_set(SplineSystems::AppendNodes),
                    sync_spline_nodes.in_set(SplineSystems::SyncNodes),
                ),
            );
    }
}
