//! Example spline chain application.
//!
//! Run with: `cargo run`

use bevy::prelude::*;
use bevy_spline_chain::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins((SplinePlugin, SplineFollowPlugin, SplineDebugDrawPlugin))
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, log_follower_events))
        .run();
}

#[derive(Component)]
struct DemoSpline;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<SplineSettings>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 18.0, 22.0).looking_at(Vec3::new(0.0, 0.0, 0.0), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut spline = Spline::from_settings(&settings);
    let nodes = [
        (Vec3::new(-9.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0)),
        (Vec3::new(-3.0, 1.0, -4.0), Vec3::new(3.0, 0.0, 0.0)),
        (Vec3::new(3.0, 0.0, 4.0), Vec3::new(3.0, 0.0, 0.0)),
        (Vec3::new(9.0, 2.0, 0.0), Vec3::new(0.0, 0.0, -4.0)),
    ];
    for (position, tangent) in nodes {
        let node = spline.chain.append_node(Vec3::ZERO);
        spline.chain.set_position(node, position);
        spline.chain.set_out_tangent(node, tangent);
        spline.chain.set_in_tangent(node, -tangent);
    }

    let spline_entity = commands
        .spawn((spline.clone(), SplineDebugDraw::all(), DemoSpline))
        .id();
    for (node, _) in spline.chain.nodes() {
        if let Some(bundle) = spline.node_bundle(spline_entity, node) {
            commands.spawn(bundle);
        }
    }

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(0.8, 0.8, 1.2))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.2, 0.2),
            ..default()
        })),
        Transform::default(),
        SplineFollower::new(spline_entity)
            .with_speed(4.0)
            .with_align_to_path(true)
            .moving(),
    ));

    println!("\n=== Spline Chain Example ===");
    println!("Controls:");
    println!("  Space  - Start/stop the follower");
    println!("  R      - Restart from the first node");
    println!("  M      - Restart from the middle of the path");
    println!("  N      - Append a node");
    println!("  D      - Toggle debug drawing");
    println!("============================\n");
}

fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut followers: Query<&mut SplineFollower>,
    splines: Query<Entity, With<DemoSpline>>,
    mut append: MessageWriter<AppendSplineNode>,
    mut debug: ResMut<DebugDrawSettings>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        for mut follower in &mut followers {
            if follower.is_moving() {
                follower.stop();
            } else {
                follower.start();
            }
        }
    }

    if keyboard.just_pressed(KeyCode::KeyR) || keyboard.just_pressed(KeyCode::KeyM) {
        let percentage = if keyboard.just_pressed(KeyCode::KeyM) {
            50.0
        } else {
            0.0
        };
        for mut follower in &mut followers {
            follower.seek(percentage);
            follower.start();
        }
    }

    if keyboard.just_pressed(KeyCode::KeyN) {
        for spline in &splines {
            append.write(AppendSplineNode { spline });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyD) {
        debug.toggle();
    }
}

fn log_follower_events(mut events: MessageReader<FollowerEvent>) {
    for event in events.read() {
        match event.kind {
            FollowerEventKind::NodeReached(node) => {
                info!("{:?} reached node {}", event.entity, node.index());
            }
            FollowerEventKind::PathEndReached => {
                info!("{:?} reached the end of its path", event.entity);
            }
        }
    }
}
