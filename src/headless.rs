use std::fmt;

use glam::Vec2;
use instant::Instant;

use crate::backdrop::{Backdrop, Canvas};
use crate::cli::Args;
use crate::debug::FrameStats;
use crate::host::ManualHost;

/// Canvas that only counts what would have been drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TallyCanvas {
    pub fades: u64,
    pub circles: u64,
    pub lines: u64,
    pub glows: u64,
}

impl Canvas for TallyCanvas {
    fn fade(&mut self, _color: u32) {
        self.fades += 1;
    }

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: u32) {
        self.circles += 1;
    }

    fn stroke_line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: u32) {
        self.lines += 1;
    }

    fn radial_glow(&mut self, _center: Vec2, _radius: f32, _color: u32) {
        self.glows += 1;
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub draws: TallyCanvas,
    pub mean_tick_us: f64,
}

impl HeadlessReport {
    /// Every requested frame fired. A shortfall means the loop lost its
    /// scheduled frame somewhere.
    pub fn completed(&self, frames: u32) -> bool {
        self.ticks >= u64::from(frames)
    }
}

impl fmt::Display for HeadlessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {:.1}us/tick | fades: {} | circles: {} | lines: {} | glows: {}",
            self.ticks,
            self.mean_tick_us,
            self.draws.fades,
            self.draws.circles,
            self.draws.lines,
            self.draws.glows,
        )
    }
}

/// Mount a backdrop on an in-memory host and pump `args.frames` frames
/// through it as fast as possible.
pub fn run(args: &Args) -> HeadlessReport {
    let mut host = ManualHost::new(args.surface_size());
    let mut backdrop = Backdrop::new(args.section, args.rng());
    let mut canvas = TallyCanvas::default();
    let mut stats = FrameStats::new();

    backdrop.mount(&mut host);
    let started = Instant::now();
    for _ in 0..args.frames {
        let Some(frame) = host.take_due_frame() else {
            break;
        };
        let tick_start = Instant::now();
        backdrop.on_frame(frame, &mut host, &mut canvas);
        stats.record_frame(
            tick_start.elapsed().as_secs_f64(),
            backdrop.timers(),
            backdrop.entity_count(),
        );
    }
    backdrop.unmount(&mut host);

    let ticks = backdrop.ticks();
    let mean_tick_us = if ticks > 0 {
        started.elapsed().as_secs_f64() * 1_000_000.0 / ticks as f64
    } else {
        0.0
    };
    let report = HeadlessReport {
        ticks,
        draws: canvas,
        mean_tick_us,
    };
    log::info!(
        "headless {}: {} | {}",
        backdrop.section().label(),
        report,
        backdrop.timers().summary(),
    );
    report
}
