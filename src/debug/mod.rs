//! Debug visualization of spline chains through Bevy gizmos.
//!
//! Add [`SplineDebugDraw`] next to a [`Spline`] to choose what gets drawn.
//! Only cached segments are read, so drawing never triggers a rebuild.

use bevy::{gizmos::config::GizmoConfigStore, prelude::*};

use crate::spline::{Spline, SplineChain};

/// Per-spline debug toggles.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component, Default)]
pub struct SplineDebugDraw {
    /// Spheres at node positions.
    pub nodes: bool,
    /// Spheres at every tessellation sample.
    pub points: bool,
    /// Polyline through the tessellation samples.
    pub segments: bool,
    /// Straight lines between linked nodes.
    pub nodes_link: bool,
    /// Outgoing tangent handles.
    pub out_handler: bool,
    /// Incoming tangent handles.
    pub in_handler: bool,
}

impl Default for SplineDebugDraw {
    fn default() -> Self {
        Self {
            nodes: true,
            points: false,
            segments: true,
            nodes_link: false,
            out_handler: false,
            in_handler: false,
        }
    }
}

impl SplineDebugDraw {
    /// Everything enabled.
    pub fn all() -> Self {
        Self {
            nodes: true,
            points: true,
            segments: true,
            nodes_link: true,
            out_handler: true,
            in_handler: true,
        }
    }
}

/// Colours and sizes for spline debug drawing.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource, Default)]
pub struct DebugDrawSettings {
    /// Master switch for all spline debug drawing.
    pub enabled: bool,
    pub line_width: f32,
    pub node_radius: f32,
    pub point_radius: f32,
    pub node_color: Color,
    pub point_color: Color,
    /// Segment edges alternate between these two colours.
    pub segment_colors: [Color; 2],
    pub link_color: Color,
    pub out_handler_color: Color,
    pub in_handler_color: Color,
}

impl Default for DebugDrawSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            line_width: 2.0,
            node_radius: 0.4,
            point_radius: 0.2,
            node_color: Color::srgb(0.53, 0.81, 0.98),
            point_color: Color::srgb(1.0, 0.85, 0.73),
            segment_colors: [Color::srgb(1.0, 0.65, 0.0), Color::srgb(1.0, 0.27, 0.0)],
            link_color: Color::srgba(0.6, 0.6, 0.6, 0.5),
            out_handler_color: Color::srgb(0.2, 0.9, 0.2),
            in_handler_color: Color::srgb(0.9, 0.2, 0.9),
        }
    }
}

impl DebugDrawSettings {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// Lines and spheres to draw for one chain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DebugShapes {
    pub lines: Vec<(Vec3, Vec3, Color)>,
    pub spheres: Vec<(Vec3, f32, Color)>,
}

/// Collect the debug shapes of a chain for the enabled toggles.
pub fn collect_debug_shapes(
    chain: &SplineChain,
    draw: &SplineDebugDraw,
    settings: &DebugDrawSettings,
) -> DebugShapes {
    let mut shapes = DebugShapes::default();

    for (_, node) in chain.nodes() {
        let position = node.position();

        if draw.nodes {
            shapes
                .spheres
                .push((position, settings.node_radius, settings.node_color));
        }
        if draw.out_handler {
            shapes
                .lines
                .push((position, node.out_handle(), settings.out_handler_color));
        }
        if draw.in_handler {
            shapes
                .lines
                .push((position, node.in_handle(), settings.in_handler_color));
        }
        if draw.nodes_link {
            if let Some(next) = node.next().and_then(|id| chain.node(id)) {
                shapes
                    .lines
                    .push((position, next.position(), settings.link_color));
            }
        }

        let Some(segment) = node.segment() else {
            continue;
        };
        let samples = segment.samples();

        if draw.segments {
            for (i, pair) in samples.windows(2).enumerate() {
                let color = settings.segment_colors[i % 2];
                shapes.lines.push((pair[0].position, pair[1].position, color));
            }
        }
        if draw.points {
            shapes.spheres.extend(
                samples
                    .iter()
                    .map(|s| (s.position, settings.point_radius, settings.point_color)),
            );
        }
    }

    shapes
}

/// System to sync debug settings to the gizmo config.
fn sync_gizmo_config(settings: Res<DebugDrawSettings>, mut config_store: ResMut<GizmoConfigStore>) {
    if !settings.is_changed() {
        return;
    }
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = settings.line_width;
}

/// System to draw spline debug shapes.
pub fn draw_spline_debug(
    settings: Res<DebugDrawSettings>,
    splines: Query<(&Spline, &SplineDebugDraw)>,
    mut gizmos: Gizmos,
) {
    if !settings.enabled {
        return;
    }

    for (spline, draw) in &splines {
        let shapes = collect_debug_shapes(&spline.chain, draw, &settings);
        for (start, end, color) in shapes.lines {
            gizmos.line(start, end, color);
        }
        for (center, radius, color) in shapes.spheres {
            gizmos.sphere(Isometry3d::from_translation(center), radius, color);
        }
    }
}

/// Plugin that draws [`SplineDebugDraw`] splines with gizmos.
///
/// Requires `SplinePlugin` and Bevy's gizmo support.
pub struct SplineDebugDrawPlugin;

impl Plugin for SplineDebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugDrawSettings>()
            .register_type::<DebugDrawSettings>()
            .register_type::<SplineDebugDraw>()
            .add_systems(Update, (sync_gizmo_config, draw_spline_debug));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SplineChain {
        let mut chain = SplineChain::with_segments(4);
        let a = chain.append_node(Vec3::ZERO);
        let b = chain.append_node(Vec3::ZERO);
        chain.set_position(b, Vec3::new(4.0, 0.0, 0.0));
        chain.set_out_tangent(a, Vec3::new(0.0, 1.0, 0.0));
        chain.refresh_all();
        chain
    }

    #[test]
    fn test_default_draws_nodes_and_segments() {
        let shapes = collect_debug_shapes(
            &chain(),
            &SplineDebugDraw::default(),
            &DebugDrawSettings::default(),
        );
        assert_eq!(shapes.spheres.len(), 2);
        assert_eq!(shapes.lines.len(), 4);
    }

    #[test]
    fn test_segment_colors_alternate() {
        let settings = DebugDrawSettings::default();
        let shapes = collect_debug_shapes(&chain(), &SplineDebugDraw::default(), &settings);
        assert_eq!(shapes.lines[0].2, settings.segment_colors[0]);
        assert_eq!(shapes.lines[1].2, settings.segment_colors[1]);
    }

    #[test]
    fn test_all_toggles() {
        let settings = DebugDrawSettings::default();
        let shapes = collect_debug_shapes(&chain(), &SplineDebugDraw::all(), &settings);
        // 2 nodes + 5 samples
        assert_eq!(shapes.spheres.len(), 7);
        // 4 segment edges + 1 link + 2 out + 2 in handles
        assert_eq!(shapes.lines.len(), 9);
        let out_handle = (
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            settings.out_handler_color,
        );
        assert!(shapes.lines.contains(&out_handle));
    }
}
