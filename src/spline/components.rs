use bevy::prelude::*;

use super::chain::{NodeId, SplineChain, DEFAULT_SEGMENTS};

/// Global spline configuration.
///
/// Insert a customised copy before adding [`SplinePlugin`](super::SplinePlugin)
/// to override the defaults.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource, Default)]
pub struct SplineSettings {
    /// Tessellation steps for splines created with [`Spline::from_settings`].
    pub default_segments: u32,
    /// Distance under which a follower counts a sample as reached.
    pub arrival_epsilon: f32,
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self {
            default_segments: DEFAULT_SEGMENTS,
            arrival_epsilon: 0.27,
        }
    }
}

/// A spline made of a chain of Bézier-connected nodes.
///
/// The component owns its [`SplineChain`]; despawning the entity drops every
/// node with it. Node positions may be driven by entities carrying a
/// [`SplineNodeHandle`].
#[derive(Component, Debug, Clone, Reflect, Default)]
#[reflect(Component, Default)]
pub struct Spline {
    pub chain: SplineChain,
}

impl Spline {
    /// Create an empty spline whose nodes use `segments` tessellation steps.
    pub fn new(segments: u32) -> Self {
        Self {
            chain: SplineChain::with_segments(segments),
        }
    }

    pub fn from_settings(settings: &SplineSettings) -> Self {
        Self::new(settings.default_segments)
    }

    /// Components for an entity that drives `node` through its transform.
    pub fn node_bundle(
        &self,
        spline: Entity,
        node: NodeId,
    ) -> Option<(Name, Transform, SplineNodeHandle)> {
        let position = self.chain.node(node)?.position();
        Some((
            Name::new(format!("Node_{}", node.index())),
            Transform::from_translation(position),
            SplineNodeHandle { spline, node },
        ))
    }
}

/// Links an entity's transform to a node of a [`Spline`].
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SplineNodeHandle {
    /// The entity that owns the spline.
    pub spline: Entity,
    /// The node driven by this entity.
    pub node: NodeId,
}

/// Request to append a node to a spline and spawn an entity for it.
#[derive(Message, Debug, Clone, Copy)]
pub struct AppendSplineNode {
    pub spline: Entity,
}
