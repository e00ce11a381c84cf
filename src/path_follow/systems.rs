use avian3d::prelude::LinearVelocity;
use bevy::math::Affine3A;
use bevy::prelude::*;

use crate::spline::{Spline, SplineSettings};

use super::{FollowerEvent, SplineFollower};

/// System that updates all spline followers.
///
/// Splines are sampled in world space. A parented follower is moved in world
/// space and its local `Transform` is solved against the parent's transform
/// from the last propagation.
pub fn update_spline_followers(
    mut followers: Query<(
        Entity,
        &mut SplineFollower,
        &mut Transform,
        Option<&GlobalTransform>,
        Has<ChildOf>,
        Option<&mut LinearVelocity>,
    )>,
    mut splines: Query<&mut Spline>,
    settings: Res<SplineSettings>,
    time: Res<Time>,
    mut events: MessageWriter<FollowerEvent>,
) {
    let delta = time.delta_secs();

    for (entity, mut follower, mut transform, global, parented, linear_velocity) in &mut followers
    {
        let Some(spline_entity) = follower.spline() else {
            continue;
        };

        // The spline may have been despawned; the follower just waits.
        let Ok(mut spline) = splines.get_mut(spline_entity) else {
            continue;
        };

        let to_world = match global {
            Some(global) if parented => global.affine() * transform.compute_affine().inverse(),
            _ => Affine3A::IDENTITY,
        };
        let to_local = to_world.inverse();
        let mut position = to_world.transform_point3(transform.translation);

        if let Some(percentage) = follower.pending_seek() {
            if let Some(seeked) = follower.set_percentage(&mut spline.chain, percentage) {
                position = seeked;
                transform.translation = to_local.transform_point3(seeked);
            }
        }

        let Some(step) = follower.advance(
            &mut spline.chain,
            position,
            delta,
            settings.arrival_epsilon,
            &mut |kind| {
                events.write(FollowerEvent { entity, kind });
            },
        ) else {
            continue;
        };

        if follower.use_physics {
            match linear_velocity {
                Some(mut linear_velocity) => linear_velocity.0 = step.velocity,
                None => {
                    warn_once!(
                        "Physics-driven spline follower {:?} has no LinearVelocity",
                        entity
                    );
                }
            }
        } else {
            transform.translation = to_local.transform_point3(step.position);
        }

        let direction = to_local.transform_vector3(step.velocity);
        if follower.align_to_path && direction.length_squared() > 1e-6 {
            transform.look_to(direction, Vec3::Y);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::ecs::message::Messages;

    use super::*;
    use crate::path_follow::{FollowerEventKind, SplineFollowPlugin};
    use crate::spline::SplinePlugin;

    #[test]
    fn test_follower_system_moves_entity() {
        let mut app = App::new();
        app.add_plugins((SplinePlugin, SplineFollowPlugin))
            .init_resource::<Time>();

        let mut spline = Spline::new(4);
        let a = spline.chain.append_node(Vec3::ZERO);
        let b = spline.chain.append_node(Vec3::ZERO);
        spline.chain.set_position(a, Vec3::ZERO);
        spline.chain.set_position(b, Vec3::new(10.0, 0.0, 0.0));
        let spline_entity = app.world_mut().spawn(spline).id();

        let follower = app
            .world_mut()
            .spawn((
                Transform::from_xyz(3.0, 3.0, 3.0),
                SplineFollower::new(spline_entity).with_speed(5.0).moving(),
            ))
            .id();

        for _ in 0..3 {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_secs(1));
            app.update();
        }

        let transform = app.world().get::<Transform>(follower).unwrap();
        assert!(transform.translation.distance(Vec3::new(10.0, 0.0, 0.0)) < 0.27);
        assert!(!app.world().get::<SplineFollower>(follower).unwrap().is_moving());

        let messages = app.world().resource::<Messages<FollowerEvent>>();
        let mut cursor = messages.get_cursor();
        let kinds: Vec<_> = cursor.read(messages).map(|e| e.kind).collect();
        assert_eq!(kinds, vec![FollowerEventKind::PathEndReached]);
    }

    #[test]
    fn test_parented_follower_lands_in_world_space() {
        let mut app = App::new();
        app.add_plugins((SplinePlugin, SplineFollowPlugin))
            .init_resource::<Time>();

        let mut spline = Spline::new(4);
        let a = spline.chain.append_node(Vec3::ZERO);
        let b = spline.chain.append_node(Vec3::ZERO);
        spline.chain.set_position(a, Vec3::ZERO);
        spline.chain.set_position(b, Vec3::new(10.0, 0.0, 0.0));
        let spline_entity = app.world_mut().spawn(spline).id();

        let parent = app.world_mut().spawn(Transform::from_xyz(0.0, 5.0, 0.0)).id();
        let follower = app
            .world_mut()
            .spawn((
                Transform::IDENTITY,
                GlobalTransform::from_translation(Vec3::new(0.0, 5.0, 0.0)),
                ChildOf(parent),
                SplineFollower::new(spline_entity).moving(),
            ))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(follower).unwrap();
        assert!(transform.translation.distance(Vec3::new(0.0, -5.0, 0.0)) < 1e-4);
    }
}
