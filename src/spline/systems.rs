use std::collections::HashMap;

use bevy::prelude::*;

use super::{AppendSplineNode, NodeId, Spline, SplineNodeHandle};

/// System that appends requested nodes and spawns their entities.
pub fn append_spline_nodes(
    mut commands: Commands,
    mut requests: MessageReader<AppendSplineNode>,
    mut splines: Query<(&mut Spline, Option<&GlobalTransform>)>,
) {
    for request in requests.read() {
        let Ok((mut spline, transform)) = splines.get_mut(request.spline) else {
            warn!("Cannot append node: {:?} has no Spline", request.spline);
            continue;
        };

        let anchor = transform.map_or(Vec3::ZERO, |t| t.translation());
        let node = spline.chain.append_node(anchor);
        if let Some(bundle) = spline.node_bundle(request.spline, node) {
            commands.spawn(bundle);
        }
    }
}

/// System that pulls node entity positions into their chains and ticks them.
///
/// Root node entities are read from [`Transform`] so a freshly spawned node
/// is correct before transform propagation; parented ones use
/// [`GlobalTransform`].
pub fn sync_spline_nodes(
    nodes: Query<(
        &SplineNodeHandle,
        &Transform,
        Option<&GlobalTransform>,
        Has<ChildOf>,
    )>,
    mut splines: Query<(Entity, &mut Spline)>,
) {
    let mut positions: HashMap<Entity, HashMap<NodeId, Vec3>> = HashMap::new();
    for (handle, transform, global, has_parent) in &nodes {
        let position = match global {
            Some(global) if has_parent => global.translation(),
            _ => transform.translation,
        };
        positions
            .entry(handle.spline)
            .or_default()
            .insert(handle.node, position);
    }

    for (entity, mut spline) in &mut splines {
        let external = positions.remove(&entity).unwrap_or_default();
        spline.chain.tick(&external);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;

    use super::*;
    use crate::spline::SplinePlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(SplinePlugin);
        app
    }

    #[test]
    fn test_node_entities_drive_chain() {
        let mut app = app();

        let mut spline = Spline::new(4);
        let a = spline.chain.append_node(Vec3::ZERO);
        let b = spline.chain.append_node(Vec3::ZERO);
        spline.chain.set_position(b, Vec3::new(10.0, 0.0, 0.0));

        let spline_entity = app.world_mut().spawn(spline.clone()).id();
        let node_b = app
            .world_mut()
            .spawn(spline.node_bundle(spline_entity, b).unwrap())
            .id();

        app.update();
        let length = app.world().get::<Spline>(spline_entity).unwrap().chain.total_length();
        assert!((length - 10.0).abs() < 1e-3);

        app.world_mut()
            .get_mut::<Transform>(node_b)
            .unwrap()
            .translation = Vec3::new(20.0, 0.0, 0.0);
        app.update();
        app.update();

        let chain = &app.world().get::<Spline>(spline_entity).unwrap().chain;
        assert_eq!(chain.node(b).unwrap().position(), Vec3::new(20.0, 0.0, 0.0));
        assert!((chain.total_length() - 20.0).abs() < 1e-3);
        assert!(chain.segment(a).is_some());
    }

    #[test]
    fn test_append_message_spawns_node_entity() {
        let mut app = app();
        let spline_entity = app
            .world_mut()
            .spawn((Spline::new(4), GlobalTransform::from_xyz(1.0, 2.0, 3.0)))
            .id();

        app.world_mut()
            .resource_mut::<Messages<AppendSplineNode>>()
            .write(AppendSplineNode {
                spline: spline_entity,
            });
        app.update();

        let chain = &app.world().get::<Spline>(spline_entity).unwrap().chain;
        assert_eq!(chain.len(), 1);
        assert_eq!(
            chain.node(NodeId::from_raw(0)).unwrap().position(),
            Vec3::new(1.0, 2.0, 3.0)
        );

        let world = app.world_mut();
        let mut handles = world.query::<(&SplineNodeHandle, &Name)>();
        let (handle, name) = handles.single(world).unwrap();
        assert_eq!(handle.spline, spline_entity);
        assert_eq!(name.as_str(), "Node_0");
    }
}
