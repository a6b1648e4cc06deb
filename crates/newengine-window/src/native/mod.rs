mod headless;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::callbacks::CallbackSet;
use crate::config::WindowConfig;
use crate::error::BridgeResult;
use crate::event::{Coordinates, FrameSize};

pub use headless::{EventInjector, HeadlessNative, RawEvent};

/// Opaque identity of a native window.
///
/// Only compared and hashed, never dereferenced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    #[inline]
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    #[inline]
    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

/// Creation parameters (window hints).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDesc {
    pub title: String,
    pub size: FrameSize,
    pub resizable: bool,
    pub visible: bool,
    pub decorated: bool,
}

impl WindowDesc {
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            size: FrameSize::new(width, height),
            ..Self::default()
        }
    }
}

impl Default for WindowDesc {
    fn default() -> Self {
        Self {
            title: "NewEngine".to_string(),
            size: FrameSize::new(1280, 720),
            resizable: true,
            visible: true,
            decorated: true,
        }
    }
}

impl From<&WindowConfig> for WindowDesc {
    fn from(cfg: &WindowConfig) -> Self {
        Self {
            title: cfg.title.clone(),
            size: FrameSize::new(cfg.width, cfg.height),
            resizable: cfg.resizable,
            visible: cfg.visible,
            decorated: cfg.decorated,
        }
    }
}

/// The callback-driven windowing library the bridge sits on.
///
/// Implementations must invoke the installed callbacks synchronously from
/// inside `poll_events`/`wait_events`, on the calling thread, and only for
/// windows that are still alive.
pub trait NativeLibrary {
    fn create_window(&mut self, desc: &WindowDesc) -> BridgeResult<NativeHandle>;
    fn destroy_window(&mut self, window: NativeHandle);

    /// Replaces every per-category callback at once.
    fn install_callbacks(&mut self, callbacks: CallbackSet);

    /// Process pending events without blocking.
    fn poll_events(&mut self);
    /// Block until at least one event is processed or `timeout` elapses.
    fn wait_events(&mut self, timeout: Option<Duration>);

    /// Handle that interrupts a blocking `wait_events` from any thread.
    fn waker(&self) -> Option<Arc<dyn Waker>> {
        None
    }

    fn should_close(&self, window: NativeHandle) -> bool;
    fn set_should_close(&mut self, window: NativeHandle, value: bool);

    fn window_size(&self, window: NativeHandle) -> FrameSize;
    fn set_window_size(&mut self, window: NativeHandle, size: FrameSize);
    fn framebuffer_size(&self, window: NativeHandle) -> FrameSize;
    fn window_position(&self, window: NativeHandle) -> Coordinates<i32>;
    fn set_window_position(&mut self, window: NativeHandle, pos: Coordinates<i32>);
    fn set_title(&mut self, window: NativeHandle, title: &str);
    fn show(&mut self, window: NativeHandle);
    fn hide(&mut self, window: NativeHandle);
    fn iconify(&mut self, window: NativeHandle);
    fn restore(&mut self, window: NativeHandle);
    fn cursor_position(&self, window: NativeHandle) -> Coordinates<f64>;
    fn set_cursor_position(&mut self, window: NativeHandle, pos: Coordinates<f64>);
}

/// Thread-safe wake-up for a blocked `wait_events`.
///
/// Handed out by native libraries that support posting an empty event.
pub trait Waker: Send + Sync {
    fn wake(&self);
}
