use glam::Vec2;
use winit::dpi::PhysicalSize;

use crate::host::{Host, ListenerHandle};

/// Size of the drawable area in logical (DPI-independent) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceBounds {
    pub width: u32,
    pub height: u32,
}

impl SurfaceBounds {
    pub const ZERO: Self = Self { width: 0, height: 0 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Logical bounds of a window area measured in device pixels.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<u32>(scale_factor);
        Self::new(logical.width, logical.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bounds as a float extent for the motion rules.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Tracks the current bounds and the resize subscription that keeps them fresh.
///
/// Resizes are coalesced: only the latest bounds are kept, and `take_stale`
/// hands them out once so the population is reseeded exactly once per change.
pub struct SurfaceManager {
    bounds: SurfaceBounds,
    listener: Option<ListenerHandle>,
    stale: bool,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self {
            bounds: SurfaceBounds::ZERO,
            listener: None,
            stale: false,
        }
    }

    /// Read the initial size from the host.
    pub fn initialize<H: Host>(&mut self, host: &H) -> SurfaceBounds {
        self.bounds = host.surface_size();
        self.stale = true;
        self.bounds
    }

    /// Subscribe to resize notifications. Replaces any earlier subscription.
    pub fn on_resize<H: Host>(&mut self, host: &mut H) -> ListenerHandle {
        self.detach(host);
        let listener = host.add_resize_listener();
        self.listener = Some(listener);
        listener
    }

    /// Record new bounds. Events from any listener but the active one are ignored.
    pub fn handle_resize(&mut self, listener: ListenerHandle, bounds: SurfaceBounds) -> bool {
        if self.listener != Some(listener) {
            return false;
        }
        self.bounds = bounds;
        self.stale = true;
        true
    }

    /// Bounds that have not been seeded against yet.
    pub fn take_stale(&mut self) -> Option<SurfaceBounds> {
        if std::mem::take(&mut self.stale) {
            Some(self.bounds)
        } else {
            None
        }
    }

    pub fn detach<H: Host>(&mut self, host: &mut H) {
        if let Some(listener) = self.listener.take() {
            host.remove_resize_listener(listener);
        }
    }

    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    #[cfg(test)]
    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;
    use crate::section::Section;

    #[test]
    fn resize_from_active_listener_marks_stale() {
        let mut host = ManualHost::new(SurfaceBounds::new(800, 600));
        let mut surface = SurfaceManager::new();
        assert_eq!(surface.initialize(&host), SurfaceBounds::new(800, 600));
        assert_eq!(surface.take_stale(), Some(SurfaceBounds::new(800, 600)));
        assert_eq!(surface.take_stale(), None);

        let listener = surface.on_resize(&mut host);
        assert!(surface.handle_resize(listener, SurfaceBounds::new(500, 300)));
        assert!(surface.handle_resize(listener, SurfaceBounds::new(640, 480)));
        // Coalesced: one reseed with the latest size.
        assert_eq!(surface.take_stale(), Some(SurfaceBounds::new(640, 480)));
        assert_eq!(surface.take_stale(), None);
    }

    #[test]
    fn stale_listener_is_ignored() {
        let mut host = ManualHost::new(SurfaceBounds::new(800, 600));
        let mut surface = SurfaceManager::new();
        surface.initialize(&host);
        let old = surface.on_resize(&mut host);
        let new = surface.on_resize(&mut host);
        assert_ne!(old, new);
        assert_eq!(host.listeners(), &[new]);

        surface.take_stale();
        assert!(!surface.handle_resize(old, SurfaceBounds::new(1, 1)));
        assert_eq!(surface.take_stale(), None);
        assert_eq!(surface.bounds(), SurfaceBounds::new(800, 600));
    }

    #[test]
    fn detach_removes_subscription() {
        let mut host = ManualHost::new(SurfaceBounds::ZERO);
        let mut surface = SurfaceManager::new();
        let listener = surface.on_resize(&mut host);
        surface.detach(&mut host);
        assert!(host.listeners().is_empty());
        assert_eq!(surface.listener(), None);
        assert!(!surface.handle_resize(listener, SurfaceBounds::new(5, 5)));
    }

    #[test]
    fn hidpi_window_uses_logical_size() {
        let bounds = SurfaceBounds::from_physical(PhysicalSize::new(1000, 1600), 2.0);
        assert_eq!(bounds, SurfaceBounds::new(500, 800));
        assert_eq!(
            SurfaceBounds::from_physical(PhysicalSize::new(1280, 800), 1.0),
            SurfaceBounds::new(1280, 800)
        );
    }

    #[test]
    fn density_tier_follows_logical_width() {
        // 1000 device pixels at 2x is a 500px viewport: compact About grid.
        let bounds = SurfaceBounds::from_physical(PhysicalSize::new(1000, 1400), 2.0);
        assert_eq!(Section::About.density(bounds.width).node_count(), 6);
        assert_eq!(Section::About.density(1000).node_count(), 24);
    }

    #[test]
    fn zero_bounds_are_empty() {
        assert!(SurfaceBounds::ZERO.is_empty());
        assert!(SurfaceBounds::new(100, 0).is_empty());
        assert!(!SurfaceBounds::new(1, 1).is_empty());
    }
}
