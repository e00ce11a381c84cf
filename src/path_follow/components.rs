use bevy::prelude::*;

use crate::spline::{NodeId, SplineChain};

/// Current state of a spline follower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum FollowerState {
    /// Follower is not moving.
    #[default]
    Idle,
    /// Follower is advancing towards its target sample.
    Moving,
}

/// Movement produced by one [`SplineFollower::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerStep {
    /// Position the entity should be placed at.
    ///
    /// Physics-driven followers leave this at the current position.
    pub position: Vec3,
    /// Velocity in world units per second.
    pub velocity: Vec3,
}

/// Component that walks an entity along the nodes of a spline.
///
/// The follower targets the tessellated samples of each node's segment,
/// following the `next` links from the head of the chain, and moves towards
/// them at a constant speed.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct SplineFollower {
    spline: Option<Entity>,

    /// Movement speed in world units per second.
    pub speed: f32,

    /// Current movement state.
    pub state: FollowerState,

    /// Hand the velocity to the physics integrator instead of moving the
    /// transform directly.
    pub use_physics: bool,

    /// Travel from the last node towards the first.
    ///
    /// Not supported yet: followers always travel forward.
    pub reverse: bool,

    /// Orient the entity's forward (-Z) along its direction of travel.
    pub align_to_path: bool,

    node: Option<NodeId>,
    sample_index: usize,
    target: Vec3,
    percentage: f32,
    pending_seek: Option<f32>,
}

impl Default for SplineFollower {
    fn default() -> Self {
        Self {
            spline: None,
            speed: 1.0,
            state: FollowerState::Idle,
            use_physics: false,
            reverse: false,
            align_to_path: false,
            node: None,
            sample_index: 0,
            target: Vec3::ZERO,
            percentage: 0.0,
            pending_seek: None,
        }
    }
}

impl SplineFollower {
    /// Create a follower for the given spline, starting at its first node.
    pub fn new(spline: Entity) -> Self {
        let mut follower = Self::default();
        follower.attach(spline);
        follower
    }

    /// Set the movement speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Drive the entity through its physics velocity.
    pub fn with_physics(mut self, use_physics: bool) -> Self {
        self.use_physics = use_physics;
        self
    }

    /// Enable or disable orientation along the travel direction.
    pub fn with_align_to_path(mut self, align: bool) -> Self {
        self.align_to_path = align;
        self
    }

    /// Start in the moving state.
    pub fn moving(mut self) -> Self {
        self.state = FollowerState::Moving;
        self
    }

    /// The followed spline entity, if attached.
    pub fn spline(&self) -> Option<Entity> {
        self.spline
    }

    /// Follow another spline. The follower restarts at its first node.
    pub fn attach(&mut self, spline: Entity) {
        self.spline = Some(spline);
        self.pending_seek = Some(0.0);
    }

    /// Drop the spline reference and stop immediately.
    pub fn detach_from_spline(&mut self) {
        self.spline = None;
        self.state = FollowerState::Idle;
        self.pending_seek = None;
    }

    /// Request a jump to `percentage` (0 to 100) of the path on the next update.
    pub fn seek(&mut self, percentage: f32) {
        self.pending_seek = Some(percentage.clamp(0.0, 100.0));
    }

    pub fn pending_seek(&self) -> Option<f32> {
        self.pending_seek
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn start(&mut self) {
        self.state = FollowerState::Moving;
    }

    pub fn stop(&mut self) {
        self.state = FollowerState::Idle;
    }

    pub fn is_moving(&self) -> bool {
        self.state == FollowerState::Moving
    }

    /// Node whose segment is currently being travelled.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Index of the targeted sample in the current node's segment.
    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    /// Sample position the follower is heading for.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Reset to the chain start and resume from `percentage` of its length.
    ///
    /// Returns the position the entity must be placed at, or `None` when the
    /// chain has fewer than two nodes or no segment yet. The movement state
    /// is left untouched.
    pub fn set_percentage(&mut self, chain: &mut SplineChain, percentage: f32) -> Option<Vec3> {
        let percentage = percentage.clamp(0.0, 100.0);
        self.percentage = percentage;
        if chain.len() < 2 {
            return None;
        }

        chain.refresh_all();
        let location = chain.locate_fraction(percentage / 100.0)?;
        let samples = chain.samples(location.node);

        self.node = Some(location.node);
        self.sample_index = (location.sample_index + 1).min(samples.len() - 1);
        self.target = samples[self.sample_index].position;
        self.pending_seek = None;

        Some(location.position)
    }

    /// Advance one tick from `position`.
    ///
    /// Without physics the follower spends `speed * delta` along consecutive
    /// samples and never overshoots one. With physics the step only carries
    /// a velocity for the external integrator. Node and path-end events are
    /// reported through `on_event` in path order.
    pub fn advance(
        &mut self,
        chain: &mut SplineChain,
        position: Vec3,
        delta: f32,
        epsilon: f32,
        on_event: &mut impl FnMut(FollowerEventKind),
    ) -> Option<FollowerStep> {
        if self.state != FollowerState::Moving || chain.len() < 2 {
            return None;
        }
        if self.reverse {
            warn_once!("Reverse spline travel is not supported, following forward");
        }

        if self.use_physics {
            let velocity = (self.target - position).normalize_or_zero() * self.speed;
            if position.distance(self.target) < epsilon {
                self.set_next_target(chain, on_event);
            }
            return Some(FollowerStep { position, velocity });
        }

        let mut budget = (self.speed * delta).max(0.0);
        let mut current = position;
        loop {
            let offset = self.target - current;
            let distance = offset.length();
            if distance <= budget {
                current = self.target;
                budget -= distance;
            } else {
                current += offset / distance * budget;
                budget = 0.0;
            }

            if current.distance(self.target) >= epsilon {
                break;
            }
            if !self.set_next_target(chain, on_event) || budget <= 0.0 {
                break;
            }
        }

        let velocity = if delta > 0.0 {
            (current - position) / delta
        } else {
            Vec3::ZERO
        };
        Some(FollowerStep {
            position: current,
            velocity,
        })
    }

    /// Move the target to the next sample, crossing into the next node when
    /// the current segment is exhausted. Returns whether the follower is
    /// still moving.
    fn set_next_target(
        &mut self,
        chain: &mut SplineChain,
        on_event: &mut impl FnMut(FollowerEventKind),
    ) -> bool {
        if let Some(node) = self.node {
            let len = chain.get_segment(node).map_or(0, |s| s.samples().len());
            if self.sample_index + 1 < len {
                self.sample_index += 1;
                self.target = chain.samples(node)[self.sample_index].position;
                return true;
            }

            if let Some(next) = chain.node(node).and_then(|n| n.next()) {
                let has_segment = chain
                    .get_segment(next)
                    .is_some_and(|s| !s.samples().is_empty());
                if has_segment {
                    on_event(FollowerEventKind::NodeReached(next));
                    self.node = Some(next);
                    self.sample_index = 0;
                    self.target = chain.samples(next)[0].position;
                    return true;
                }
            }
        }

        self.state = FollowerState::Idle;
        on_event(FollowerEventKind::PathEndReached);
        false
    }
}

/// Message emitted when a follower reaches a node or the end of its path.
#[derive(Message, Debug, Clone)]
pub struct FollowerEvent {
    /// The entity with the SplineFollower component.
    pub entity: Entity,
    /// The type of event.
    pub kind: FollowerEventKind,
}

/// Types of follower events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerEventKind {
    /// The follower arrived at a node and continues along its segment.
    NodeReached(NodeId),
    /// The follower arrived at the last node and stopped.
    PathEndReached,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.27;

    fn chain(points: &[Vec3]) -> SplineChain {
        let mut chain = SplineChain::with_segments(4);
        for point in points {
            let id = chain.append_node(Vec3::ZERO);
            chain.set_position(id, *point);
        }
        chain
    }

    fn started(chain: &mut SplineChain, speed: f32) -> (SplineFollower, Vec3) {
        let mut follower = SplineFollower::default().with_speed(speed).moving();
        let position = follower.set_percentage(chain, 0.0).unwrap();
        (follower, position)
    }

    #[test]
    fn test_reaches_end_of_two_node_chain() {
        let mut chain = chain(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
        let (mut follower, mut position) = started(&mut chain, 5.0);
        assert_eq!(position, Vec3::ZERO);

        let mut events = Vec::new();
        for _ in 0..2 {
            let step = follower
                .advance(&mut chain, position, 1.0, EPSILON, &mut |e| events.push(e))
                .unwrap();
            position = step.position;
        }

        assert!(position.distance(Vec3::new(10.0, 0.0, 0.0)) < EPSILON);
        assert_eq!(events, vec![FollowerEventKind::PathEndReached]);
        assert_eq!(follower.state, FollowerState::Idle);

        let idle = follower.advance(&mut chain, position, 1.0, EPSILON, &mut |e| events.push(e));
        assert!(idle.is_none());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_moves_at_constant_speed() {
        let mut chain = chain(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
        let (mut follower, position) = started(&mut chain, 5.0);

        let step = follower
            .advance(&mut chain, position, 0.5, EPSILON, &mut |_| {})
            .unwrap();
        assert!((step.position.x - 2.5).abs() < 1e-4);
        assert!((step.velocity.length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_node_events_in_chain_order() {
        let mut chain = chain(&[
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
        ]);
        let (mut follower, position) = started(&mut chain, 100.0);

        let mut events = Vec::new();
        let step = follower
            .advance(&mut chain, position, 1.0, EPSILON, &mut |e| events.push(e))
            .unwrap();

        assert_eq!(
            events,
            vec![
                FollowerEventKind::NodeReached(NodeId::from_raw(1)),
                FollowerEventKind::PathEndReached,
            ]
        );
        assert!((step.position - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_follows_links_not_insertion_order() {
        let mut chain = chain(&[
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
        ]);
        let [n0, n2] = [NodeId::from_raw(0), NodeId::from_raw(2)];
        chain.link(n0, n2).unwrap();
        let (mut follower, position) = started(&mut chain, 100.0);

        let mut events = Vec::new();
        let step = follower
            .advance(&mut chain, position, 1.0, EPSILON, &mut |e| events.push(e))
            .unwrap();

        assert_eq!(
            events,
            vec![
                FollowerEventKind::NodeReached(n2),
                FollowerEventKind::PathEndReached,
            ]
        );
        assert!((step.position - Vec3::new(30.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_percentage_resumes_mid_path() {
        let mut chain = chain(&[
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
        ]);
        let mut follower = SplineFollower::default();
        follower.seek(75.0);

        let position = follower.set_percentage(&mut chain, 75.0).unwrap();
        assert!((position - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(follower.node(), Some(NodeId::from_raw(1)));
        assert!(follower.target().x >= position.x);
        assert_eq!(follower.pending_seek(), None);
        assert_eq!(follower.percentage(), 75.0);
    }

    #[test]
    fn test_short_chain_is_noop() {
        let mut chain = chain(&[Vec3::ZERO]);
        let mut follower = SplineFollower::default().moving();

        assert!(follower.set_percentage(&mut chain, 0.0).is_none());
        assert!(follower
            .advance(&mut chain, Vec3::ZERO, 1.0, EPSILON, &mut |_| {})
            .is_none());
    }

    #[test]
    fn test_physics_step_reports_velocity_only() {
        let mut chain = chain(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 8.0)]);
        let (mut follower, position) = started(&mut chain, 3.0);
        follower.use_physics = true;

        let step = follower
            .advance(&mut chain, position, 0.1, EPSILON, &mut |_| {})
            .unwrap();
        assert_eq!(step.position, position);
        assert!((step.velocity - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
    }

    #[test]
    fn test_detach_stops_immediately() {
        let mut follower = SplineFollower::new(Entity::PLACEHOLDER).moving();
        assert_eq!(follower.pending_seek(), Some(0.0));

        follower.detach_from_spline();
        assert_eq!(follower.spline(), None);
        assert!(!follower.is_moving());
        assert_eq!(follower.pending_seek(), None);
    }
}
