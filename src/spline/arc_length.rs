//! Distance-based lookups along a whole chain.
//!
//! Walks the cached segments along the linked path and their cumulative sample
//! distances to turn a travelled distance into a place on the path.

use bevy::prelude::*;

use super::{NodeId, SplineChain};

/// A point on the chain addressed by travelled distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLocation {
    /// Node whose segment contains the point.
    pub node: NodeId,
    /// Sample at or before the point.
    pub sample_index: usize,
    /// Interpolated world position.
    pub position: Vec3,
}

impl SplineChain {
    /// Locate the point `distance` units from the chain start.
    ///
    /// The distance is clamped to `[0, total_length]`. Returns `None` when
    /// no node has a segment yet.
    pub fn locate_distance(&self, distance: f32) -> Option<PathLocation> {
        let mut remaining = distance.max(0.0);
        let mut last = None;

        for node in self.path() {
            let Some(segment) = self.segment(node) else {
                break;
            };
            let samples = segment.samples();
            let Some(end) = samples.last() else {
                continue;
            };

            if remaining <= segment.length() {
                let sample_index = samples
                    .windows(2)
                    .position(|pair| pair[1].total_distance >= remaining)
                    .unwrap_or(0);
                let from = samples[sample_index];
                let position = match samples.get(sample_index + 1) {
                    Some(to) if to.distance > 0.0 => {
                        let alpha = (remaining - from.total_distance) / to.distance;
                        from.position.lerp(to.position, alpha.clamp(0.0, 1.0))
                    }
                    _ => from.position,
                };

                return Some(PathLocation {
                    node,
                    sample_index,
                    position,
                });
            }

            remaining -= segment.length();
            last = Some(PathLocation {
                node,
                sample_index: samples.len() - 1,
                position: end.position,
            });
        }

        last
    }

    /// Locate the point at `fraction` (0 to 1) of the total length.
    pub fn locate_fraction(&self, fraction: f32) -> Option<PathLocation> {
        self.locate_distance(fraction.clamp(0.0, 1.0) * self.total_length())
    }
}
