use crate::surface::SurfaceBounds;

/// Ticket for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Ticket for one registered resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// The environment a backdrop is mounted into: something that knows the
/// drawable size, can schedule a frame callback, and can notify on resize.
pub trait Host {
    fn surface_size(&self) -> SurfaceBounds;

    /// Schedule the next frame. At most one frame is pending; a new request
    /// supersedes the previous one.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, frame: FrameHandle);

    fn add_resize_listener(&mut self) -> ListenerHandle;

    fn remove_resize_listener(&mut self, listener: ListenerHandle);
}

/// Handle bookkeeping shared by host implementations.
#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    pending_frame: Option<FrameHandle>,
    listeners: Vec<ListenerHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn schedule(&mut self) -> FrameHandle {
        let frame = FrameHandle(self.next_id());
        self.pending_frame = Some(frame);
        frame
    }

    /// Drop `frame` if it is the pending one. Cancelling a stale handle is a no-op.
    pub fn cancel(&mut self, frame: FrameHandle) {
        if self.pending_frame == Some(frame) {
            self.pending_frame = None;
        }
    }

    /// Pop the pending frame so the host can fire it.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending_frame.take()
    }

    #[cfg(test)]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn subscribe(&mut self) -> ListenerHandle {
        let listener = ListenerHandle(self.next_id());
        self.listeners.push(listener);
        listener
    }

    pub fn unsubscribe(&mut self, listener: ListenerHandle) {
        self.listeners.retain(|l| *l != listener);
    }

    pub fn listeners(&self) -> &[ListenerHandle] {
        &self.listeners
    }

    /// Whether the host should wake up to fire a frame. Frames stay parked
    /// while the surface has no area, so a minimized window does not spin.
    pub fn wants_redraw(&self, size: SurfaceBounds) -> bool {
        self.pending_frame.is_some() && !size.is_empty()
    }
}

/// In-memory host. Frames only fire when the owner pops them, which makes
/// the loop steppable without a display.
pub struct ManualHost {
    size: SurfaceBounds,
    registry: Registry,
}

impl ManualHost {
    pub fn new(size: SurfaceBounds) -> Self {
        Self {
            size,
            registry: Registry::new(),
        }
    }

    /// Change the surface size. Returns the listeners that must be notified.
    #[cfg(test)]
    pub fn set_size(&mut self, size: SurfaceBounds) -> Vec<ListenerHandle> {
        self.size = size;
        self.registry.listeners().to_vec()
    }

    pub fn take_due_frame(&mut self) -> Option<FrameHandle> {
        self.registry.take_due()
    }

    #[cfg(test)]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.registry.pending_frame()
    }

    #[cfg(test)]
    pub fn listeners(&self) -> &[ListenerHandle] {
        self.registry.listeners()
    }
}

impl Host for ManualHost {
    fn surface_size(&self) -> SurfaceBounds {
        self.size
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.registry.schedule()
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
