use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Shape kinds understood by `shape.wgsl`.
pub mod kind {
    /// Solid disc.
    pub const DISC: u32 = 0;
    /// Radial gradient halo.
    pub const GLOW: u32 = 1;
    /// Full-surface fill; position and radius are ignored.
    pub const FILL: u32 = 2;
}

/// Per-instance data for one circle, glow or fill.
/// Stride = 20 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    /// Center in surface pixels.
    pub position: [f32; 2],
    /// Outer radius in pixels.
    pub radius: f32,
    /// RGBA packed as u32 (0xRRGGBBAA).
    pub color: u32,
    pub kind: u32,
}

impl ShapeInstance {
    pub fn disc(center: Vec2, radius: f32, color: u32) -> Self {
        Self {
            position: center.into(),
            radius,
            color,
            kind: kind::DISC,
        }
    }

    pub fn glow(center: Vec2, radius: f32, color: u32) -> Self {
        Self {
            position: center.into(),
            radius,
            color,
            kind: kind::GLOW,
        }
    }

    pub fn fill(color: u32) -> Self {
        Self {
            position: [0.0, 0.0],
            radius: 0.0,
            color,
            kind: kind::FILL,
        }
    }
}

/// Per-vertex data for link line segments.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4], // premultiplied RGBA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<ShapeInstance>(), 20);
        assert_eq!(std::mem::size_of::<LineVertex>(), 24);
    }
}
