//! Node chain with lazily rebuilt segments.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. `next`/`previous`
//! links are optional handles, so the chain never owns itself and cycle
//! checks are a simple walk along `next`.
//!
//! Dirtiness is resolved by [`SplineChain::tick`]: a node that was itself
//! edited marks its `previous` dirty, then every dirty node rebuilds the
//! segment to its `next` and becomes clean. A previous node that was already
//! scanned in the same tick is rebuilt on the following tick, so a segment is
//! never more than one tick stale.
//!
//! Path order follows the links from the head node, which need not match
//! arena order once nodes have been relinked.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::error::{SplineError, SplineResult};

use super::segment::{SplinePoint, SplineSegment, MIN_SEGMENTS};

/// Tessellation steps used for new nodes unless configured otherwise.
pub const DEFAULT_SEGMENTS: u32 = 8;

/// Stable handle to a node inside a [`SplineChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct NodeId(u32);

impl NodeId {
    /// Build a handle from its raw arena slot.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Arena slot of this node, i.e. its insertion order.
    ///
    /// After [`SplineChain::link`] this may differ from its position along the path.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source of externally owned node positions, read once per tick.
///
/// Returning `None` keeps the position already stored in the chain.
pub trait NodePositions {
    fn world_position(&self, node: NodeId) -> Option<Vec3>;
}

impl<F> NodePositions for F
where
    F: Fn(NodeId) -> Option<Vec3>,
{
    fn world_position(&self, node: NodeId) -> Option<Vec3> {
        self(node)
    }
}

impl NodePositions for HashMap<NodeId, Vec3> {
    fn world_position(&self, node: NodeId) -> Option<Vec3> {
        self.get(&node).copied()
    }
}

/// One user-placed node of the chain.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ChainNode {
    position: Vec3,
    last_tick_position: Vec3,
    out_tangent: Vec3,
    in_tangent: Vec3,
    segments: u32,
    dirty: bool,
    changed: bool,
    next: Option<NodeId>,
    previous: Option<NodeId>,
    segment: Option<SplineSegment>,
}

impl ChainNode {
    fn new(position: Vec3, segments: u32) -> Self {
        Self {
            position,
            last_tick_position: position,
            out_tangent: Vec3::ZERO,
            in_tangent: Vec3::ZERO,
            segments: segments.max(MIN_SEGMENTS),
            dirty: true,
            changed: false,
            next: None,
            previous: None,
            segment: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Offset of the outgoing handle, relative to the node.
    pub fn out_tangent(&self) -> Vec3 {
        self.out_tangent
    }

    /// Offset of the incoming handle, relative to the node.
    pub fn in_tangent(&self) -> Vec3 {
        self.in_tangent
    }

    /// World position of the outgoing handle.
    pub fn out_handle(&self) -> Vec3 {
        self.position + self.out_tangent
    }

    /// World position of the incoming handle.
    pub fn in_handle(&self) -> Vec3 {
        self.position + self.in_tangent
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    /// Cached segment towards `next`, as of the last refresh.
    pub fn segment(&self) -> Option<&SplineSegment> {
        self.segment.as_ref()
    }
}

/// Closest point on a whole chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainClosestPoint {
    /// Node owning the segment the point lies on.
    pub node: NodeId,
    /// Closest point.
    pub point: Vec3,
    /// Nearest sample index in the node's segment.
    pub index: usize,
    /// Neighbouring sample the point was projected towards.
    pub neighbor: usize,
    /// Distance from the query to `point`.
    pub distance: f32,
}

/// Ordered chain of spline nodes.
///
/// Appending keeps insertion order and path order equal; [`link`](Self::link)
/// can reorder the path, which is then walked through [`path`](Self::path).
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct SplineChain {
    nodes: Vec<ChainNode>,
    default_segments: u32,
}

impl Default for SplineChain {
    fn default() -> Self {
        Self::with_segments(DEFAULT_SEGMENTS)
    }
}

impl SplineChain {
    /// Create an empty chain whose new nodes use `segments` tessellation steps.
    pub fn with_segments(segments: u32) -> Self {
        Self {
            nodes: Vec::new(),
            default_segments: segments.max(MIN_SEGMENTS),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&ChainNode> {
        self.nodes.get(id.index())
    }

    /// Node at `index` in insertion order.
    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then(|| NodeId(index as u32))
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1).map(|i| NodeId(i as u32))
    }

    /// First node of the path: the first node in insertion order without a
    /// `previous` that has a `next`, or the first node when nothing is linked.
    pub fn head(&self) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.previous.is_none() && node.next.is_some())
            .or_else(|| self.nodes().next())
            .map(|(id, _)| id)
    }

    /// Iterate the path from [`head`](Self::head) following `next` links.
    pub fn path(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.head(), |id| self.nodes[id.index()].next)
            .take(self.nodes.len())
    }

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ChainNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Append a node at the last node's position, or at `anchor` when empty,
    /// and link it after the former last node.
    pub fn append_node(&mut self, anchor: Vec3) -> NodeId {
        let previous = self.last();
        let position = previous
            .and_then(|id| self.node(id))
            .map_or(anchor, |node| node.position);

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ChainNode::new(position, self.default_segments));

        if let Some(previous) = previous {
            self.connect(previous, id);
        }

        debug!("Appended spline node {:?} at {}", id, position);
        id
    }

    /// Move a node. Returns whether a rebuild is needed.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        self.update_node(id, |node| {
            let changed = node.position != position;
            node.position = position;
            node.last_tick_position = position;
            changed
        })
    }

    /// Set the outgoing handle offset. Returns whether a rebuild is needed.
    pub fn set_out_tangent(&mut self, id: NodeId, tangent: Vec3) -> bool {
        self.update_node(id, |node| {
            let changed = node.out_tangent != tangent;
            node.out_tangent = tangent;
            changed
        })
    }

    /// Set the incoming handle offset. Returns whether a rebuild is needed.
    pub fn set_in_tangent(&mut self, id: NodeId, tangent: Vec3) -> bool {
        self.update_node(id, |node| {
            let changed = node.in_tangent != tangent;
            node.in_tangent = tangent;
            changed
        })
    }

    /// Set the tessellation steps, clamped to [`MIN_SEGMENTS`].
    /// Returns whether a rebuild is needed.
    pub fn set_segments(&mut self, id: NodeId, segments: u32) -> bool {
        let segments = segments.max(MIN_SEGMENTS);
        self.update_node(id, |node| {
            let changed = node.segments != segments;
            node.segments = segments;
            changed
        })
    }

    /// Flag a node for rebuild on the next refresh.
    pub fn mark_dirty(&mut self, id: NodeId) -> bool {
        self.update_node(id, |_| true)
    }

    fn update_node(&mut self, id: NodeId, f: impl FnOnce(&mut ChainNode) -> bool) -> bool {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return false;
        };
        let changed = f(node);
        node.dirty |= changed;
        node.changed |= changed;
        changed
    }

    /// Make `to` the successor of `from`.
    ///
    /// Any previous successor of `from` and predecessor of `to` are detached.
    /// Links that would close a cycle are rejected.
    pub fn link(&mut self, from: NodeId, to: NodeId) -> SplineResult<()> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(SplineError::SelfLink(from));
        }
        if self.reaches(to, from) {
            debug!("Rejected spline link {:?} -> {:?}: cycle", from, to);
            return Err(SplineError::CycleDetected { from, to });
        }
        if self.nodes[from.index()].next != Some(to) {
            self.connect(from, to);
        }
        Ok(())
    }

    /// Remove the successor of `from`. Returns whether a link was removed.
    pub fn unlink(&mut self, from: NodeId) -> SplineResult<bool> {
        self.check(from)?;
        let Some(next) = self.nodes[from.index()].next.take() else {
            return Ok(false);
        };
        self.nodes[next.index()].previous = None;
        self.nodes[from.index()].dirty = true;
        Ok(true)
    }

    fn check(&self, id: NodeId) -> SplineResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SplineError::UnknownNode(id))
        }
    }

    /// Whether following `next` links from `start` reaches `target`.
    fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut current = Some(start);
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == target => return true,
                Some(id) => current = self.nodes[id.index()].next,
                None => return false,
            }
        }
        false
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if let Some(old_next) = self.nodes[from.index()].next {
            self.nodes[old_next.index()].previous = None;
        }
        if let Some(old_previous) = self.nodes[to.index()].previous {
            let old = &mut self.nodes[old_previous.index()];
            old.next = None;
            old.dirty = true;
        }

        self.nodes[from.index()].next = Some(to);
        self.nodes[to.index()].previous = Some(from);
        self.nodes[from.index()].dirty = true;
    }

    /// Advance the chain by one tick.
    ///
    /// Pulls external positions, marks moved nodes dirty and refreshes every
    /// dirty node in insertion order. Returns the number of refreshed nodes.
    pub fn tick(&mut self, positions: &impl NodePositions) -> usize {
        let mut refreshed = 0;

        for index in 0..self.nodes.len() {
            let id = NodeId(index as u32);
            let node = &mut self.nodes[index];
            if let Some(position) = positions.world_position(id) {
                node.position = position;
            }
            if node.position != node.last_tick_position {
                node.dirty = true;
                node.changed = true;
            }
            node.last_tick_position = node.position;

            if self.refresh(index) {
                refreshed += 1;
            }
        }

        if refreshed > 0 {
            trace!("Refreshed {} spline node(s)", refreshed);
        }
        refreshed
    }

    fn refresh(&mut self, index: usize) -> bool {
        let node = &self.nodes[index];
        if !node.dirty {
            return false;
        }

        let previous = node.previous.filter(|_| node.changed);
        let segment = node.next.map(|next| {
            let target = &self.nodes[next.index()];
            SplineSegment::new(
                node.segments,
                node.position,
                node.out_handle(),
                target.position,
                target.in_handle(),
            )
        });

        if let Some(previous) = previous {
            self.nodes[previous.index()].dirty = true;
        }

        let node = &mut self.nodes[index];
        node.segment = segment;
        node.dirty = false;
        node.changed = false;
        true
    }

    /// Refresh every dirty node until the whole chain is clean.
    ///
    /// Unlike [`tick`](Self::tick) this does not pull external positions and
    /// leaves no node stale.
    pub fn refresh_all(&mut self) -> usize {
        let mut refreshed = 0;
        while self.nodes.iter().any(|node| node.dirty) {
            for index in (0..self.nodes.len()).rev() {
                if self.refresh(index) {
                    refreshed += 1;
                }
            }
        }
        refreshed
    }

    /// Segment from `id` to its successor, rebuilding it first if dirty.
    pub fn get_segment(&mut self, id: NodeId) -> Option<&SplineSegment> {
        self.check(id).ok()?;
        self.refresh(id.index());
        self.nodes[id.index()].segment.as_ref()
    }

    /// Cached segment from `id` to its successor, without rebuilding.
    pub fn segment(&self, id: NodeId) -> Option<&SplineSegment> {
        self.node(id)?.segment.as_ref()
    }

    /// Cached samples of a node's segment. Empty when it has none.
    pub fn samples(&self, id: NodeId) -> &[SplinePoint] {
        self.segment(id)
            .map(SplineSegment::samples)
            .unwrap_or_default()
    }

    /// Sum of all segment arc lengths.
    pub fn total_length(&self) -> f32 {
        self.nodes
            .iter()
            .filter_map(|node| node.segment.as_ref())
            .map(SplineSegment::length)
            .sum()
    }

    /// Sum of straight-line distances between linked nodes.
    pub fn total_node_link_distance(&self) -> f32 {
        self.nodes
            .iter()
            .filter_map(|node| node.segment.as_ref())
            .map(SplineSegment::endpoint_distance)
            .sum()
    }

    /// Closest point on one node's segment. A node without a segment
    /// degenerates to its own position.
    pub fn closest_point_on_node(&self, id: NodeId, query: Vec3) -> Option<ChainClosestPoint> {
        let node = self.node(id)?;
        let Some(segment) = node.segment.as_ref() else {
            return Some(ChainClosestPoint {
                node: id,
                point: node.position,
                index: 0,
                neighbor: 0,
                distance: node.position.distance(query),
            });
        };

        segment.closest_point(query).map(|closest| ChainClosestPoint {
            node: id,
            point: closest.point,
            index: closest.index,
            neighbor: closest.neighbor,
            distance: closest.distance,
        })
    }

    /// Closest point across the whole chain, `None` when the chain is empty.
    pub fn closest_point(&self, query: Vec3) -> Option<ChainClosestPoint> {
        self.nodes()
            .filter_map(|(id, _)| self.closest_point_on_node(id, query))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
