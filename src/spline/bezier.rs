use bevy::prelude::*;

/// Evaluate a cubic Bézier curve in Bernstein form.
///
/// `p0` and `p3` are the endpoints, `p1` and `p2` the handle points.
/// `t` is not clamped, values outside `[0, 1]` extrapolate the curve.
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    p0 * mt3 + p1 * 3.0 * mt2 * t + p2 * 3.0 * mt * t2 + p3 * t3
}
