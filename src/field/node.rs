use std::f32::consts::TAU;

use glam::Vec2;

use super::{reflect, symmetric, uniform, FieldStyle};
use crate::palette;

/// Fraction of the offset to the anchor closed every tick.
pub const SPRING: f32 = 0.01;

/// Pulse angular rate, radians per millisecond of pulse time.
const PULSE_RATE: f64 = 0.002;

/// Larger point tethered to a grid anchor by a weak spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkNode {
    pub pos: Vec2,
    /// Resting point, fixed at creation.
    pub anchor: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Pulse phase offset in radians.
    pub phase: f32,
    pub color: u32,
}

impl NetworkNode {
    /// Jitter `grid_point` and anchor the node there.
    pub fn spawn(grid_point: Vec2, style: &FieldStyle, rng: &mut fastrand::Rng) -> Self {
        let half_jitter = style.jitter * 0.5;
        let pos = grid_point
            + Vec2::new(symmetric(rng, half_jitter), symmetric(rng, half_jitter));
        Self {
            pos,
            anchor: pos,
            vel: Vec2::new(symmetric(rng, style.node_speed), symmetric(rng, style.node_speed)),
            radius: uniform(rng, style.node_radius),
            phase: rng.f32() * TAU,
            color: palette::random_node_color(rng),
        }
    }

    /// Outer radius of the pulsing halo at `time_ms` of pulse time.
    pub fn glow_radius(&self, time_ms: f64, amplitude: f32) -> f32 {
        let pulse = ((time_ms * PULSE_RATE + self.phase as f64).sin() * 0.5 + 0.5) as f32;
        self.radius + pulse * amplitude
    }

    #[cfg(test)]
    pub fn distance_to_anchor(&self) -> f32 {
        self.pos.distance(self.anchor)
    }
}

/// One tick: drift, spring pull toward the anchor, then edge reflection.
pub fn advance_node(n: NetworkNode, extent: Vec2) -> NetworkNode {
    let drifted = n.pos + n.vel;
    let pos = drifted + (n.anchor - drifted) * SPRING;
    NetworkNode {
        pos,
        vel: reflect(pos, n.vel, extent),
        ..n
    }
}

/// Evenly spaced grid inside `extent`, one cell of margin on every side.
/// Column-major: all rows of the first column come first.
pub fn grid_anchors(extent: Vec2, columns: usize, rows: usize) -> impl Iterator<Item = Vec2> {
    let step = Vec2::new(
        extent.x / (columns + 1) as f32,
        extent.y / (rows + 1) as f32,
    );
    (0..columns).flat_map(move |i| {
        (0..rows).map(move |j| Vec2::new(step.x * (i + 1) as f32, step.y * (j + 1) as f32))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Section;

    fn still_node(pos: Vec2, anchor: Vec2) -> NetworkNode {
        NetworkNode {
            pos,
            anchor,
            vel: Vec2::ZERO,
            radius: 3.0,
            phase: 0.0,
            color: palette::NODE_COLORS[0],
        }
    }

    #[test]
    fn spring_pulls_toward_anchor_monotonically() {
        let extent = Vec2::new(1000.0, 1000.0);
        let mut n = still_node(Vec2::new(600.0, 420.0), Vec2::new(500.0, 500.0));
        let mut last = n.distance_to_anchor();
        for _ in 0..2_000 {
            n = advance_node(n, extent);
            let d = n.distance_to_anchor();
            assert!(d <= last, "distance grew from {last} to {d}");
            last = d;
        }
        assert!(last < 0.01, "did not converge: {last}");
    }

    #[test]
    fn drifting_node_stays_tethered() {
        let style = Section::Hero.style();
        let extent = Vec2::new(1280.0, 800.0);
        let mut rng = fastrand::Rng::with_seed(11);
        // Steady-state offset of constant drift v against pull k is v(1-k)/k per axis.
        let tether = style.node_speed * (1.0 - SPRING) / SPRING * 2.0_f32.sqrt() + 1.0;
        for point in grid_anchors(extent, 8, 6) {
            let mut n = NetworkNode::spawn(point, &style, &mut rng);
            for _ in 0..3_000 {
                n = advance_node(n, extent);
            }
            assert!(n.distance_to_anchor() <= tether, "{n:?}");
        }
    }

    #[test]
    fn reflection_applies_after_spring() {
        let extent = Vec2::new(100.0, 100.0);
        let mut n = still_node(Vec2::new(100.0, 50.0), Vec2::new(100.0, 50.0));
        n.vel = Vec2::new(0.5, 0.0);
        let next = advance_node(n, extent);
        assert!(next.pos.x > 100.0);
        assert_eq!(next.vel.x, -0.5);
    }

    #[test]
    fn grid_is_evenly_spaced_with_margins() {
        let points: Vec<Vec2> = grid_anchors(Vec2::new(700.0, 500.0), 6, 4).collect();
        assert_eq!(points.len(), 24);
        assert_eq!(points[0], Vec2::new(100.0, 100.0));
        assert_eq!(points[1], Vec2::new(100.0, 200.0));
        assert_eq!(points[23], Vec2::new(600.0, 400.0));
    }

    #[test]
    fn spawn_jitter_is_bounded() {
        let style = Section::Experience.style();
        let mut rng = fastrand::Rng::with_seed(2);
        let point = Vec2::new(300.0, 300.0);
        for _ in 0..500 {
            let n = NetworkNode::spawn(point, &style, &mut rng);
            assert_eq!(n.pos, n.anchor);
            assert!((n.pos.x - point.x).abs() <= style.jitter * 0.5);
            assert!((n.pos.y - point.y).abs() <= style.jitter * 0.5);
            assert!(n.phase >= 0.0 && n.phase < TAU);
            assert!(palette::NODE_COLORS.contains(&n.color));
        }
    }

    #[test]
    fn glow_pulses_between_radius_and_amplitude() {
        let n = still_node(Vec2::ZERO, Vec2::ZERO);
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for tick in 0..1_000 {
            let r = n.glow_radius(tick as f64 * 16.0, 8.0);
            lo = lo.min(r);
            hi = hi.max(r);
        }
        assert!(lo >= 3.0 - 1e-4 && lo < 3.1);
        assert!(hi <= 11.0 + 1e-4 && hi > 10.9);
        // sin(0) = 0 -> half pulse
        assert!((n.glow_radius(0.0, 8.0) - 7.0).abs() < 1e-5);
    }
}
