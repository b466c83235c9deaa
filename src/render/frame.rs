use glam::Vec2;

use super::instance::{LineVertex, ShapeInstance};
use crate::backdrop::Canvas;
use crate::palette;

/// Which buffer a batch draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Shapes,
    Lines,
}

/// Contiguous run of same-kind draws. `start..end` indexes shape instances
/// or line vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub kind: BatchKind,
    pub start: u32,
    pub end: u32,
}

/// Canvas that records one tick's draw calls as GPU-ready data, keeping the
/// order they were issued in.
pub struct FrameBuilder {
    pub shapes: Vec<ShapeInstance>,
    pub lines: Vec<LineVertex>,
    pub batches: Vec<Batch>,
}

impl FrameBuilder {
    pub fn with_capacity(shapes: usize, line_vertices: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(shapes),
            lines: Vec::with_capacity(line_vertices),
            batches: Vec::with_capacity(8),
        }
    }

    /// Reset for the next tick, keeping allocations.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.lines.clear();
        self.batches.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    fn push_shape(&mut self, shape: ShapeInstance) {
        let index = self.shapes.len() as u32;
        self.shapes.push(shape);
        self.extend_batch(BatchKind::Shapes, index, index + 1);
    }

    fn extend_batch(&mut self, kind: BatchKind, start: u32, end: u32) {
        match self.batches.last_mut() {
            Some(last) if last.kind == kind && last.end == start => last.end = end,
            _ => self.batches.push(Batch { kind, start, end }),
        }
    }
}

impl Canvas for FrameBuilder {
    fn fade(&mut self, color: u32) {
        self.push_shape(ShapeInstance::fill(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32) {
        self.push_shape(ShapeInstance::disc(center, radius, color));
    }

    // Lines rasterize at one pixel; `width` is accepted for API parity.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: u32) {
        let color = palette::premultiplied(color);
        let start = self.lines.len() as u32;
        self.lines.push(LineVertex {
            position: from.into(),
            color,
        });
        self.lines.push(LineVertex {
            position: to.into(),
            color,
        });
        self.extend_batch(BatchKind::Lines, start, start + 2);
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, color: u32) {
        self.push_shape(ShapeInstance::glow(center, radius, color));
    }
}
