pub mod links;
pub mod node;
pub mod particle;

use glam::Vec2;

use crate::surface::SurfaceBounds;
use node::NetworkNode;
use particle::AmbientParticle;

/// Viewport width below which sections switch to their compact density.
pub const COMPACT_BREAKPOINT: u32 = 768;

/// How many entities to seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityProfile {
    pub particle_count: usize,
    pub grid_columns: usize,
    pub grid_rows: usize,
}

impl DensityProfile {
    pub fn node_count(&self) -> usize {
        self.grid_columns * self.grid_rows
    }
}

/// Per-section look and motion parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStyle {
    /// Max absolute particle velocity component (units/tick).
    pub particle_speed: f32,
    pub particle_radius: (f32, f32),
    pub particle_opacity: (f32, f32),
    /// Max absolute node velocity component (units/tick).
    pub node_speed: f32,
    pub node_radius: (f32, f32),
    /// Full width of the uniform jitter applied to grid anchors.
    pub jitter: f32,
    /// Extra glow radius at the top of the pulse.
    pub glow_amplitude: f32,
    pub link_threshold: f32,
    pub link_opacity: f32,
    /// Alpha of the trail-fade fill.
    pub fade_alpha: f32,
}

/// Uniform sample in `[min, max)`.
pub fn uniform(rng: &mut fastrand::Rng, (min, max): (f32, f32)) -> f32 {
    min + rng.f32() * (max - min)
}

/// Symmetric uniform sample in `[-half, half)`.
pub fn symmetric(rng: &mut fastrand::Rng, half: f32) -> f32 {
    (rng.f32() - 0.5) * 2.0 * half
}

/// Flip each velocity component whose position coordinate left `[0, extent]`.
pub fn reflect(pos: Vec2, mut vel: Vec2, extent: Vec2) -> Vec2 {
    if pos.x < 0.0 || pos.x > extent.x {
        vel.x = -vel.x;
    }
    if pos.y < 0.0 || pos.y > extent.y {
        vel.y = -vel.y;
    }
    vel
}

/// All moving entities of one backdrop.
///
/// Each particle and node is a single-component entity; the two kinds live in
/// separate archetypes so queries never mix them.
pub struct Population {
    world: hecs::World,
    particle_count: usize,
    node_count: usize,
    /// Node positions, refreshed for each link pass.
    snapshot: Vec<Vec2>,
}

impl Population {
    pub fn empty() -> Self {
        Self {
            world: hecs::World::new(),
            particle_count: 0,
            node_count: 0,
            snapshot: Vec::new(),
        }
    }

    /// Seed a fresh population sized to `bounds`.
    #[cfg(test)]
    pub fn seed(
        bounds: SurfaceBounds,
        density: DensityProfile,
        style: &FieldStyle,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut population = Self::empty();
        population.reseed(bounds, density, style, rng);
        population
    }

    /// Replace every entity. A zero-size surface yields an empty population.
    pub fn reseed(
        &mut self,
        bounds: SurfaceBounds,
        density: DensityProfile,
        style: &FieldStyle,
        rng: &mut fastrand::Rng,
    ) {
        self.world.clear();
        self.particle_count = 0;
        self.node_count = 0;

        if bounds.is_empty() {
            return;
        }

        let extent = bounds.extent();
        for _ in 0..density.particle_count {
            let particle = AmbientParticle::spawn(extent, style, rng);
            self.world.spawn((particle,));
        }
        self.particle_count = density.particle_count;

        let anchors: Vec<Vec2> =
            node::grid_anchors(extent, density.grid_columns, density.grid_rows).collect();
        self.node_count = anchors.len();
        self.snapshot.reserve(density.node_count());
        for anchor in anchors {
            let node = NetworkNode::spawn(anchor, style, rng);
            self.world.spawn((node,));
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particle_count == 0 && self.node_count == 0
    }

    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut AmbientParticle> + '_ {
        self.world
            .query_mut::<&mut AmbientParticle>()
            .into_iter()
            .map(|(_, p)| p)
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NetworkNode> + '_ {
        self.world
            .query_mut::<&mut NetworkNode>()
            .into_iter()
            .map(|(_, n)| n)
    }

    /// Copy out current node positions in a stable order.
    pub fn node_positions(&mut self) -> &[Vec2] {
        self.snapshot.clear();
        for (_, node) in self.world.query::<&NetworkNode>().iter() {
            self.snapshot.push(node.pos);
        }
        &self.snapshot
    }

    #[cfg(test)]
    pub fn particles(&self) -> Vec<AmbientParticle> {
        self.world
            .query::<&AmbientParticle>()
            .iter()
            .map(|(_, p)| *p)
            .collect()
    }

    #[cfg(test)]
    pub fn nodes(&self) -> Vec<NetworkNode> {
        self.world
            .query::<&NetworkNode>()
            .iter()
            .map(|(_, n)| *n)
            .collect()
    }
}
