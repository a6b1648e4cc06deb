use std::sync::Arc;
use std::time::Duration;

use crate::config::PumpConfig;
use crate::environment::Environment;
use crate::error::{BridgeError, BridgeResult};
use crate::event::{Coordinates, Event, FrameSize};
use crate::native::{NativeHandle, NativeLibrary, WindowDesc};
use crate::queue::QueueHandle;

/// How `advance` processes native events.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PumpMode {
    pub poll_events: bool,
    pub wait_events: bool,
    pub wait_timeout: Option<Duration>,
}

impl PumpMode {
    /// Host drives `Environment::poll_events` itself.
    pub const MANUAL: Self = Self {
        poll_events: false,
        wait_events: false,
        wait_timeout: None,
    };
}

impl Default for PumpMode {
    fn default() -> Self {
        Self::from(&PumpConfig::default())
    }
}

impl From<&PumpConfig> for PumpMode {
    fn from(cfg: &PumpConfig) -> Self {
        Self {
            poll_events: cfg.poll_events,
            wait_events: cfg.wait_events,
            wait_timeout: cfg.wait_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// A native window plus its event queue.
///
/// Dropping the window destroys the native window and releases the queue.
pub struct Window<N: NativeLibrary> {
    env: Arc<Environment<N>>,
    handle: Option<NativeHandle>,
    queue: QueueHandle,
    pump: PumpMode,
}

impl<N: NativeLibrary> Window<N> {
    /// Window built from the environment's configured defaults.
    pub fn new(env: &Arc<Environment<N>>) -> BridgeResult<Self> {
        let desc = WindowDesc::from(&env.config().window);
        Self::with_desc(env, &desc)
    }

    pub fn with_desc(env: &Arc<Environment<N>>, desc: &WindowDesc) -> BridgeResult<Self> {
        let (handle, queue) = env.create_window(desc)?;
        Ok(Self {
            env: env.clone(),
            handle: Some(handle),
            queue,
            pump: PumpMode::from(&env.config().pump),
        })
    }

    #[inline]
    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    #[inline]
    pub fn environment(&self) -> &Arc<Environment<N>> {
        &self.env
    }

    /// Oldest pending event, if any.
    #[inline]
    pub fn poll(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    /// Pops until the queue is empty.
    pub fn events(&mut self) -> impl Iterator<Item = Event> + '_ {
        std::iter::from_fn(move || self.poll())
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run native event processing per the pump mode, then report whether
    /// the window should keep running.
    ///
    /// Call once per loop iteration; events produced by the processing step
    /// are available through `poll` when this returns.
    pub fn advance(&mut self) -> bool {
        let Some(handle) = self.handle else {
            return false;
        };

        if self.pump.wait_events {
            self.env.wait_events(self.pump.wait_timeout);
        }
        if self.pump.poll_events {
            self.env.poll_events();
        }

        !self.env.with_native(|n| n.should_close(handle))
    }

    #[inline]
    pub fn pump(&self) -> PumpMode {
        self.pump
    }

    pub fn set_pump(&mut self, pump: PumpMode) {
        self.pump = pump;
    }

    pub fn set_poll_events(&mut self, enabled: bool) {
        self.pump.poll_events = enabled;
    }

    pub fn set_wait_events(&mut self, enabled: bool) {
        self.pump.wait_events = enabled;
    }

    pub fn set_wait_timeout(&mut self, timeout: Option<Duration>) {
        self.pump.wait_timeout = timeout;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Destroy the native window now. Pending events are discarded.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.env.destroy_window(handle);
        }
    }

    fn live(&self) -> BridgeResult<NativeHandle> {
        self.handle.ok_or(BridgeError::WindowClosed)
    }

    pub fn should_close(&self) -> BridgeResult<bool> {
        let h = self.live()?;
        Ok(self.env.with_native(|n| n.should_close(h)))
    }

    pub fn set_should_close(&self, value: bool) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.set_should_close(h, value));
        Ok(())
    }

    pub fn size(&self) -> BridgeResult<FrameSize> {
        let h = self.live()?;
        Ok(self.env.with_native(|n| n.window_size(h)))
    }

    pub fn resize(&self, size: FrameSize) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.set_window_size(h, size));
        Ok(())
    }

    pub fn framebuffer_size(&self) -> BridgeResult<FrameSize> {
        let h = self.live()?;
        Ok(self.env.with_native(|n| n.framebuffer_size(h)))
    }

    pub fn position(&self) -> BridgeResult<Coordinates<i32>> {
        let h = self.live()?;
        Ok(self.env.with_native(|n| n.window_position(h)))
    }

    pub fn set_position(&self, pos: Coordinates<i32>) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.set_window_position(h, pos));
        Ok(())
    }

    pub fn set_title(&self, title: &str) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.set_title(h, title));
        Ok(())
    }

    pub fn show(&self) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.show(h));
        Ok(())
    }

    pub fn hide(&self) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.hide(h));
        Ok(())
    }

    pub fn minimize(&self) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.iconify(h));
        Ok(())
    }

    pub fn restore(&self) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.restore(h));
        Ok(())
    }

    pub fn cursor_position(&self) -> BridgeResult<Coordinates<f64>> {
        let h = self.live()?;
        Ok(self.env.with_native(|n| n.cursor_position(h)))
    }

    pub fn set_cursor_position(&self, pos: Coordinates<f64>) -> BridgeResult<()> {
        let h = self.live()?;
        self.env.with_native(|n| n.set_cursor_position(h, pos));
        Ok(())
    }
}

impl<N: NativeLibrary> Drop for Window<N> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<N: NativeLibrary> PartialEq for Window<N> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<N: NativeLibrary> std::fmt::Debug for Window<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("handle", &self.handle)
            .field("pending", &self.queue.len())
            .field("pump", &self.pump)
            .finish()
    }
}
