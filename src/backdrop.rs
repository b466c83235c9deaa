use glam::Vec2;

use crate::debug::timer::{PhaseTimers, TickPhase};
use crate::field::links;
use crate::field::node::advance_node;
use crate::field::particle::advance_particle;
use crate::field::{FieldStyle, Population};
use crate::host::{FrameHandle, Host, ListenerHandle};
use crate::palette;
use crate::section::Section;
use crate::surface::{SurfaceBounds, SurfaceManager};

/// Nominal frame step fed to the pulse clock. Motion itself is per tick.
pub const FRAME_STEP_MS: f64 = 16.0;

/// Link stroke width in pixels.
pub const LINK_WIDTH: f32 = 1.0;

/// Drawing operations a tick needs. Nothing is cleared between ticks.
pub trait Canvas {
    /// Paint `color` (with its alpha) over the whole surface.
    fn fade(&mut self, color: u32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: u32);

    /// Radial gradient: opaque `color` at the center, 0x66 alpha halfway,
    /// transparent at `radius`.
    fn radial_glow(&mut self, center: Vec2, radius: f32, color: u32);
}

/// One animated section background: surface tracking, population and the
/// per-frame loop that advances and draws it.
pub struct Backdrop {
    section: Section,
    style: FieldStyle,
    surface: SurfaceManager,
    population: Population,
    rng: fastrand::Rng,
    /// Pulse clock in milliseconds.
    time_ms: f64,
    frame: Option<FrameHandle>,
    ticks: u64,
    timers: PhaseTimers,
}

impl Backdrop {
    pub fn new(section: Section, rng: fastrand::Rng) -> Self {
        Self {
            section,
            style: section.style(),
            surface: SurfaceManager::new(),
            population: Population::empty(),
            rng,
            time_ms: 0.0,
            frame: None,
            ticks: 0,
            timers: PhaseTimers::new(),
        }
    }

    /// Start: size to the host surface, seed, listen for resizes and
    /// schedule the first frame. Mounting twice is a no-op.
    pub fn mount<H: Host>(&mut self, host: &mut H) {
        if self.is_mounted() {
            return;
        }
        let bounds = self.surface.initialize(host);
        self.reseed_if_stale();
        self.surface.on_resize(host);
        self.frame = Some(host.request_frame());
        log::info!(
            "{} backdrop mounted at {}x{}: {} particles, {} nodes",
            self.section.label(),
            bounds.width,
            bounds.height,
            self.population.particle_count(),
            self.population.node_count(),
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.frame.is_some()
    }

    /// Resize notification. Bounds are applied and the population reseeded
    /// right away, before any further tick.
    pub fn on_resize(&mut self, listener: ListenerHandle, bounds: SurfaceBounds) -> bool {
        if !self.surface.handle_resize(listener, bounds) {
            log::trace!("ignoring resize from inactive listener {listener:?}");
            return false;
        }
        self.reseed_if_stale();
        true
    }

    /// Frame callback. Runs one tick if `frame` is the one this backdrop
    /// scheduled, then schedules the next. Returns whether a tick ran.
    pub fn on_frame<H: Host, C: Canvas>(
        &mut self,
        frame: FrameHandle,
        host: &mut H,
        canvas: &mut C,
    ) -> bool {
        if self.frame != Some(frame) {
            return false;
        }
        self.reseed_if_stale();
        self.tick(canvas);
        self.frame = Some(host.request_frame());
        true
    }

    /// Advance and draw one frame, in paint order: fade, particles, links,
    /// nodes.
    pub fn tick<C: Canvas>(&mut self, canvas: &mut C) {
        self.time_ms += FRAME_STEP_MS;
        self.ticks += 1;
        let extent = self.surface.bounds().extent();
        let style = self.style;

        self.timers.begin();
        canvas.fade(palette::with_alpha(palette::FADE, style.fade_alpha));
        self.timers.lap(TickPhase::Fade);

        for p in self.population.particles_mut() {
            *p = advance_particle(*p, extent);
            canvas.fill_circle(p.pos, p.radius, palette::with_alpha(palette::TINT, p.opacity));
        }
        self.timers.lap(TickPhase::Particles);

        // Links use node positions from before this tick's node advance.
        links::for_each_link(
            self.population.node_positions(),
            style.link_threshold,
            style.link_opacity,
            |a, b, opacity| {
                canvas.stroke_line(a, b, LINK_WIDTH, palette::with_alpha(palette::TINT, opacity));
            },
        );
        self.timers.lap(TickPhase::Links);

        let time_ms = self.time_ms;
        for n in self.population.nodes_mut() {
            *n = advance_node(*n, extent);
            canvas.radial_glow(n.pos, n.glow_radius(time_ms, style.glow_amplitude), n.color);
            canvas.fill_circle(n.pos, n.radius, n.color);
        }
        self.timers.lap(TickPhase::Nodes);
    }

    /// Stop: cancel the pending frame and drop the resize listener together.
    /// Safe to call more than once.
    pub fn unmount<H: Host>(&mut self, host: &mut H) {
        let was_mounted = self.is_mounted();
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.surface.detach(host);
        if was_mounted {
            log::info!(
                "{} backdrop unmounted after {} ticks",
                self.section.label(),
                self.ticks
            );
        }
    }

    fn reseed_if_stale(&mut self) {
        let Some(bounds) = self.surface.take_stale() else {
            return;
        };
        let density = self.section.density(bounds.width);
        self.population
            .reseed(bounds, density, &self.style, &mut self.rng);
        log::debug!(
            "{} reseeded for {}x{}: {} particles, {} nodes",
            self.section.label(),
            bounds.width,
            bounds.height,
            self.population.particle_count(),
            self.population.node_count(),
        );
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn bounds(&self) -> SurfaceBounds {
        self.surface.bounds()
    }

    #[cfg(test)]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[cfg(test)]
    pub fn scheduled_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    #[cfg(test)]
    pub fn listener(&self) -> Option<ListenerHandle> {
        self.surface.listener()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[cfg(test)]
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn timers(&self) -> &PhaseTimers {
        &self.timers
    }

    pub fn entity_count(&self) -> usize {
        self.population.particle_count() + self.population.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ManualHost;

    #[derive(Debug, Clone, PartialEq)]
    enum Draw {
        Fade(u32),
        Circle(Vec2, f32, u32),
        Line(Vec2, Vec2, u32),
        Glow(Vec2, f32, u32),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        calls: Vec<Draw>,
    }

    impl Canvas for RecordingCanvas {
        fn fade(&mut self, color: u32) {
            self.calls.push(Draw::Fade(color));
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32) {
            self.calls.push(Draw::Circle(center, radius, color));
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: u32) {
            self.calls.push(Draw::Line(from, to, color));
        }

        fn radial_glow(&mut self, center: Vec2, radius: f32, color: u32) {
            self.calls.push(Draw::Glow(center, radius, color));
        }
    }

    fn mounted(section: Section, size: SurfaceBounds) -> (Backdrop, ManualHost) {
        let mut host = ManualHost::new(size);
        let mut backdrop = Backdrop::new(section, fastrand::Rng::with_seed(7));
        backdrop.mount(&mut host);
        (backdrop, host)
    }

    /// Pop the pending frame and run it.
    fn pump(backdrop: &mut Backdrop, host: &mut ManualHost, canvas: &mut RecordingCanvas) -> bool {
        match host.take_due_frame() {
            Some(frame) => backdrop.on_frame(frame, host, canvas),
            None => false,
        }
    }

    #[test]
    fn mount_seeds_and_schedules() {
        let (backdrop, host) = mounted(Section::Experience, SurfaceBounds::new(1200, 800));
        assert_eq!(backdrop.population().particle_count(), 50);
        assert_eq!(backdrop.population().node_count(), 24);
        assert_eq!(host.pending_frame(), backdrop.scheduled_frame());
        assert_eq!(host.listeners().len(), 1);
        assert_eq!(host.listeners()[0], backdrop.listener().unwrap());
    }

    #[test]
    fn tick_draws_in_paint_order() {
        let (mut backdrop, mut host) = mounted(Section::Hero, SurfaceBounds::new(1280, 800));
        let mut canvas = RecordingCanvas::default();
        assert!(pump(&mut backdrop, &mut host, &mut canvas));

        let calls = &canvas.calls;
        assert_eq!(calls[0], Draw::Fade(palette::with_alpha(palette::FADE, 0.1)));

        // 80 tinted particle circles follow the fade.
        for call in &calls[1..81] {
            match call {
                Draw::Circle(_, _, color) => assert_eq!(color & 0xFFFFFF00, palette::TINT & 0xFFFFFF00),
                other => panic!("expected particle circle, got {other:?}"),
            }
        }

        // Then any links, then glow + core for each of the 48 nodes.
        let rest = &calls[81..];
        let links = rest.iter().take_while(|c| matches!(c, Draw::Line(..))).count();
        let nodes = &rest[links..];
        assert_eq!(nodes.len(), 48 * 2);
        for pair in nodes.chunks(2) {
            match (&pair[0], &pair[1]) {
                (Draw::Glow(gc, gr, gcol), Draw::Circle(cc, cr, ccol)) => {
                    assert_eq!(gc, cc);
                    assert_eq!(gcol, ccol);
                    assert!(gr >= cr);
                    assert!(palette::NODE_COLORS.contains(ccol));
                }
                other => panic!("expected glow then core, got {other:?}"),
            }
        }
    }

    #[test]
    fn links_use_positions_before_node_advance() {
        let (mut backdrop, mut host) = mounted(Section::Contact, SurfaceBounds::new(1200, 800));
        let before: Vec<Vec2> = backdrop.population().nodes().iter().map(|n| n.pos).collect();
        let mut canvas = RecordingCanvas::default();
        pump(&mut backdrop, &mut host, &mut canvas);

        for call in &canvas.calls {
            if let Draw::Line(a, b, _) = call {
                assert!(before.contains(a));
                assert!(before.contains(b));
                assert!(a.distance(*b) < 150.0);
            }
        }
    }

    #[test]
    fn link_alpha_fades_with_distance() {
        let (mut backdrop, mut host) = mounted(Section::Contact, SurfaceBounds::new(600, 500));
        let mut canvas = RecordingCanvas::default();
        pump(&mut backdrop, &mut host, &mut canvas);

        let mut drawn = 0;
        for call in &canvas.calls {
            if let Draw::Line(a, b, color) = call {
                let opacity = links::link_opacity(a.distance(*b), 150.0, 0.2);
                assert_eq!(*color, palette::with_alpha(palette::TINT, opacity));
                assert!(palette::alpha(*color) <= 0.2 + 1.0 / 255.0);
                drawn += 1;
            }
        }
        // A 6x4 grid over 600x500 puts neighbours well inside 150px.
        assert!(drawn > 0);
    }

    #[test]
    fn each_frame_reschedules() {
        let (mut backdrop, mut host) = mounted(Section::About, SurfaceBounds::new(1024, 768));
        let mut canvas = RecordingCanvas::default();
        for _ in 0..10 {
            assert!(pump(&mut backdrop, &mut host, &mut canvas));
        }
        assert_eq!(backdrop.ticks(), 10);
        assert_eq!(backdrop.time_ms(), 160.0);
        assert!(host.pending_frame().is_some());
    }

    #[test]
    fn teardown_cancels_frame_and_listener() {
        let (mut backdrop, mut host) = mounted(Section::Hero, SurfaceBounds::new(800, 600));
        let frame = host.pending_frame().expect("frame scheduled on mount");
        let listener = host.listeners()[0];

        backdrop.unmount(&mut host);
        assert_eq!(host.pending_frame(), None);
        assert!(host.listeners().is_empty());
        assert!(!backdrop.is_mounted());

        // Forcing the captured frame or resize afterwards changes nothing.
        let snapshot = backdrop.population().particles();
        let mut canvas = RecordingCanvas::default();
        assert!(!backdrop.on_frame(frame, &mut host, &mut canvas));
        assert!(!backdrop.on_resize(listener, SurfaceBounds::new(10, 10)));
        assert!(canvas.calls.is_empty());
        assert_eq!(backdrop.population().particles(), snapshot);
        assert_eq!(backdrop.ticks(), 0);
        assert_eq!(host.pending_frame(), None);

        // Idempotent.
        backdrop.unmount(&mut host);
    }

    #[test]
    fn remount_after_teardown_starts_clean() {
        let (mut backdrop, mut host) = mounted(Section::Projects, SurfaceBounds::new(900, 700));
        backdrop.unmount(&mut host);
        backdrop.mount(&mut host);
        assert!(backdrop.is_mounted());
        assert_eq!(host.listeners().len(), 1);
        let mut canvas = RecordingCanvas::default();
        assert!(pump(&mut backdrop, &mut host, &mut canvas));
    }

    #[test]
    fn resize_reseeds_before_next_tick() {
        let (mut backdrop, mut host) = mounted(Section::About, SurfaceBounds::new(1200, 800));
        assert_eq!(backdrop.population().node_count(), 24);

        let small = SurfaceBounds::new(600, 400);
        for listener in host.set_size(small) {
            assert!(backdrop.on_resize(listener, small));
        }
        assert_eq!(backdrop.bounds(), small);
        // Compact tier below 768px.
        assert_eq!(backdrop.population().node_count(), 6);
        assert_eq!(backdrop.population().particle_count(), 25);
        for p in backdrop.population().particles() {
            assert!(p.pos.x <= 600.0 && p.pos.y <= 400.0);
        }

        let mut canvas = RecordingCanvas::default();
        pump(&mut backdrop, &mut host, &mut canvas);
        let circles = canvas.calls.iter().filter(|c| matches!(c, Draw::Circle(..))).count();
        assert_eq!(circles, 25 + 6);
    }

    #[test]
    fn zero_surface_only_fades() {
        let (mut backdrop, mut host) = mounted(Section::Hero, SurfaceBounds::ZERO);
        assert!(backdrop.population().is_empty());
        let mut canvas = RecordingCanvas::default();
        assert!(pump(&mut backdrop, &mut host, &mut canvas));
        assert_eq!(canvas.calls, vec![Draw::Fade(palette::with_alpha(palette::FADE, 0.1))]);
    }

    #[test]
    fn stale_frame_handle_is_ignored() {
        let (mut backdrop, mut host) = mounted(Section::Hero, SurfaceBounds::new(800, 600));
        let first = host.take_due_frame().unwrap();
        let mut canvas = RecordingCanvas::default();
        assert!(backdrop.on_frame(first, &mut host, &mut canvas));
        // Replaying the already-consumed handle does not tick again.
        assert!(!backdrop.on_frame(first, &mut host, &mut canvas));
        assert_eq!(backdrop.ticks(), 1);
    }

    #[test]
    fn seeded_backdrops_draw_identically() {
        let (mut a, mut host_a) = mounted(Section::Hero, SurfaceBounds::new(1280, 800));
        let (mut b, mut host_b) = mounted(Section::Hero, SurfaceBounds::new(1280, 800));
        let mut canvas_a = RecordingCanvas::default();
        let mut canvas_b = RecordingCanvas::default();
        for _ in 0..5 {
            pump(&mut a, &mut host_a, &mut canvas_a);
            pump(&mut b, &mut host_b, &mut canvas_b);
        }
        assert_eq!(canvas_a.calls, canvas_b.calls);
    }
}
