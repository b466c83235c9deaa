use glam::Vec2;

/// Opacity of a link between two nodes `dist` apart.
///
/// Linear falloff from `max_opacity` at zero distance to exactly zero at
/// `threshold` and beyond.
pub fn link_opacity(dist: f32, threshold: f32, max_opacity: f32) -> f32 {
    if threshold <= 0.0 || dist >= threshold {
        return 0.0;
    }
    (1.0 - dist / threshold).max(0.0) * max_opacity
}

/// Visit every unordered pair closer than `threshold` with its link opacity.
///
/// Brute force over all pairs; node counts are kept small enough (tens) that
/// this stays cheap per tick.
pub fn for_each_link(
    positions: &[Vec2],
    threshold: f32,
    max_opacity: f32,
    mut visit: impl FnMut(Vec2, Vec2, f32),
) {
    let threshold_sq = threshold * threshold;
    for (i, &a) in positions.iter().enumerate() {
        for &b in &positions[i + 1..] {
            let dist_sq = a.distance_squared(b);
            if dist_sq >= threshold_sq {
                continue;
            }
            let opacity = link_opacity(dist_sq.sqrt(), threshold, max_opacity);
            if opacity > 0.0 {
                visit(a, b, opacity);
            }
        }
    }
}
