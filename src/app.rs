use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::backdrop::Backdrop;
use crate::cli::Args;
use crate::debug::FrameStats;
use crate::error::AppError;
use crate::host::{FrameHandle, Host, ListenerHandle, Registry};
use crate::render::frame::FrameBuilder;
use crate::render::GpuState;
use crate::section::Section;
use crate::surface::SurfaceBounds;

/// Shape instances reserved per frame (particles + node glows and cores + fade).
const INITIAL_SHAPE_CAPACITY: usize = 256;
/// Line vertices reserved per frame.
const INITIAL_LINE_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Host backed by a winit window: a scheduled frame is a redraw request and
/// `WindowEvent::Resized` is the resize notification. Sizes are logical
/// pixels, the same units a page layout uses.
struct WinitHost {
    window: Arc<Window>,
    registry: Registry,
}

impl WinitHost {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            registry: Registry::new(),
        }
    }

    fn take_due_frame(&mut self) -> Option<FrameHandle> {
        self.registry.take_due()
    }

    /// Ask winit for a redraw if a frame is pending and there is something
    /// to draw on. A minimized window parks its frame until the next resize.
    fn wake(&self) {
        if self.registry.wants_redraw(self.surface_size()) {
            self.window.request_redraw();
        }
    }

    fn listeners(&self) -> Vec<ListenerHandle> {
        self.registry.listeners().to_vec()
    }
}

impl Host for WinitHost {
    fn surface_size(&self) -> SurfaceBounds {
        SurfaceBounds::from_physical(self.window.inner_size(), self.window.scale_factor())
    }

    fn request_frame(&mut self) -> FrameHandle {
        let frame = self.registry.schedule();
        self.wake();
        frame
    }

    fn cancel_frame(&mut self, frame: FrameHandle) {
        self.registry.cancel(frame);
    }

    fn add_resize_listener(&mut self) -> ListenerHandle {
        self.registry.subscribe()
    }

    fn remove_resize_listener(&mut self, listener: ListenerHandle) {
        self.registry.unsubscribe(listener);
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Everything that exists only while the window is open.
struct Running {
    window: Arc<Window>,
    gpu: GpuState,
    host: WinitHost,
    backdrop: Backdrop,
}

/// Top-level application state.
struct App {
    section: Section,
    seed: Option<u64>,
    initial_size: LogicalSize<u32>,

    running: Option<Running>,

    // Reusable draw recording (avoid per-frame allocation)
    frame: FrameBuilder,

    // Frame timing
    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,

    /// Startup failure surfaced from inside the event loop.
    error: Option<AppError>,
}

impl App {
    fn new(args: &Args) -> Self {
        Self {
            section: args.section,
            seed: args.seed,
            initial_size: LogicalSize::new(args.width.max(1), args.height.max(1)),
            running: None,
            frame: FrameBuilder::with_capacity(INITIAL_SHAPE_CAPACITY, INITIAL_LINE_CAPACITY),
            last_frame_time: None,
            frame_stats: FrameStats::new(),
            error: None,
        }
    }

    /// Fresh RNG per backdrop. Seeded runs stay reproducible across section switches.
    fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, AppError> {
        let attrs = WindowAttributes::default()
            .with_title(window_title(self.section))
            .with_inner_size(self.initial_size);

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + backdrop pipelines initialized");

        let mut host = WinitHost::new(window.clone());
        let mut backdrop = Backdrop::new(self.section, self.rng());
        backdrop.mount(&mut host);

        Ok(Running {
            window,
            gpu,
            host,
            backdrop,
        })
    }

    /// Tear down the current backdrop and mount the next section's in its place.
    fn cycle_section(&mut self) {
        self.section = self.section.next();
        let rng = self.rng();
        let Some(running) = &mut self.running else {
            return;
        };
        running.backdrop.unmount(&mut running.host);
        running.backdrop = Backdrop::new(self.section, rng);
        running.backdrop.mount(&mut running.host);
        running.window.set_title(&window_title(self.section));
        // Start from a clean page background.
        running.gpu.accum.needs_clear = true;
        log::info!("Switched to {} section", self.section.label());
    }

    /// Resize the GPU surface and tell every resize listener the new
    /// logical bounds, then fire any frame parked while minimized.
    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(running) = &mut self.running else {
            return;
        };
        let bounds = SurfaceBounds::from_physical(size, running.window.scale_factor());
        running.gpu.resize(size, bounds);
        for listener in running.host.listeners() {
            running.backdrop.on_resize(listener, bounds);
        }
        running.host.wake();
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(running) = &mut self.running {
            running.backdrop.unmount(&mut running.host);
        }
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let Some(running) = &mut self.running else {
            return;
        };
        let Some(frame) = running.host.take_due_frame() else {
            return;
        };

        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            self.frame_stats.record_frame(
                now.duration_since(last).as_secs_f64(),
                running.backdrop.timers(),
                running.backdrop.entity_count(),
            );
        }
        self.last_frame_time = Some(now);

        self.frame.clear();
        if !running.backdrop.on_frame(frame, &mut running.host, &mut self.frame) {
            return;
        }
        if running.backdrop.bounds().is_empty() {
            return;
        }
        running.gpu.render(&self.frame);
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                log::info!("ESC pressed, exiting");
                self.shutdown(event_loop);
            }
            Key::Named(NamedKey::Tab) => self.cycle_section(),
            _ => {}
        }
    }
}

fn window_title(section: Section) -> String {
    format!("nodefield - {}", section.label())
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                // Redraws are requested only while a frame is scheduled.
                event_loop.set_control_flow(ControlFlow::Wait);
                self.running = Some(running);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.host.wake();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::ScaleFactorChanged { .. } => {
                // Same device pixels can mean a new logical size.
                if let Some(size) = self.running.as_ref().map(|r| r.window.inner_size()) {
                    self.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Entry point: create the event loop and run until the window closes.
pub fn run(args: &Args) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(args);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
