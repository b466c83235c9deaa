use glam::Vec2;

use super::{reflect, symmetric, uniform, FieldStyle};

/// Small free-drifting point with no anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParticle {
    pub pos: Vec2,
    /// Units per tick.
    pub vel: Vec2,
    pub radius: f32,
    /// Fixed at creation.
    pub opacity: f32,
}

impl AmbientParticle {
    /// Random particle anywhere inside `extent`.
    pub fn spawn(extent: Vec2, style: &FieldStyle, rng: &mut fastrand::Rng) -> Self {
        Self {
            pos: Vec2::new(rng.f32() * extent.x, rng.f32() * extent.y),
            vel: Vec2::new(
                symmetric(rng, style.particle_speed),
                symmetric(rng, style.particle_speed),
            ),
            radius: uniform(rng, style.particle_radius),
            opacity: uniform(rng, style.particle_opacity),
        }
    }
}

/// One tick of free drift with elastic edge reflection.
///
/// The step is not scaled by elapsed time, so on-screen speed follows the
/// display refresh rate. A particle may overshoot an edge by one step before
/// its reflected velocity brings it back.
pub fn advance_particle(p: AmbientParticle, extent: Vec2) -> AmbientParticle {
    let pos = p.pos + p.vel;
    AmbientParticle {
        pos,
        vel: reflect(pos, p.vel, extent),
        ..p
    }
}
