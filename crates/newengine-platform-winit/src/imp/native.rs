use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use newengine_window::callbacks::CallbackSet;
use newengine_window::native::Waker;
use newengine_window::{
    BridgeError, BridgeResult, Coordinates, FrameSize, NativeHandle, NativeLibrary, WindowDesc,
};
use parking_lot::Mutex;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event_loop::{EventLoop, EventLoopProxy};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use super::dispatch::{Dispatch, PendingResize, SlotState, Windows};

/// Wakes a blocked pump by sending an empty user event through the loop proxy.
struct ProxyWaker(Mutex<EventLoopProxy<()>>);

impl Waker for ProxyWaker {
    fn wake(&self) {
        if self.0.lock().send_event(()).is_err() {
            debug!("wake ignored: event loop already closed");
        }
    }
}

/// [`NativeLibrary`] over a winit event loop that is pumped in place.
///
/// Owns the loop, so there is at most one per process.
pub struct WinitNative {
    event_loop: EventLoop<()>,
    waker: Arc<ProxyWaker>,
    native: HashMap<NativeHandle, Window>,
    by_id: HashMap<WindowId, NativeHandle>,
    windows: Windows,
    next_handle: usize,
}

impl WinitNative {
    pub fn new() -> BridgeResult<Self> {
        let event_loop = EventLoop::new().map_err(|e| BridgeError::Native(e.to_string()))?;
        let waker = Arc::new(ProxyWaker(Mutex::new(event_loop.create_proxy())));

        info!("winit event loop ready");
        Ok(Self {
            event_loop,
            waker,
            native: HashMap::new(),
            by_id: HashMap::new(),
            windows: Windows::default(),
            next_handle: 0,
        })
    }

    /// True once winit reported the loop as finished. Further pumps are no-ops.
    #[inline]
    pub fn exited(&self) -> bool {
        self.windows.exited
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if self.windows.exited {
            return;
        }

        let mut dispatch = Dispatch {
            native: &self.native,
            by_id: &self.by_id,
            windows: &mut self.windows,
        };
        let status = self.event_loop.pump_app_events(timeout, &mut dispatch);
        if let PumpStatus::Exit(code) = status {
            warn!("winit event loop exited with code {}", code);
            self.windows.exited = true;
        }

        self.windows.flush_pending();
    }

    fn window(&self, handle: NativeHandle) -> Option<&Window> {
        self.native.get(&handle)
    }

    fn alloc_handle(&mut self) -> BridgeResult<NativeHandle> {
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or_else(|| BridgeError::Native("window handles exhausted".to_string()))?;
        NativeHandle::from_raw(self.next_handle)
            .ok_or_else(|| BridgeError::Native("invalid window handle".to_string()))
    }
}

impl NativeLibrary for WinitNative {
    fn create_window(&mut self, desc: &WindowDesc) -> BridgeResult<NativeHandle> {
        if desc.size.width <= 0 || desc.size.height <= 0 {
            return Err(BridgeError::Native(format!(
                "invalid window size {}x{}",
                desc.size.width, desc.size.height
            )));
        }

        let attrs = Window::default_attributes()
            .with_title(desc.title.clone())
            .with_inner_size(LogicalSize::new(desc.size.width, desc.size.height))
            .with_resizable(desc.resizable)
            .with_visible(desc.visible)
            .with_decorations(desc.decorated);

        // Creating outside `resumed` is deprecated but still supported on desktop
        // targets, and keeps creation synchronous.
        #[allow(deprecated)]
        let window = self
            .event_loop
            .create_window(attrs)
            .map_err(|e| BridgeError::Native(e.to_string()))?;

        let handle = self.alloc_handle()?;
        self.by_id.insert(window.id(), handle);
        self.native.insert(handle, window);
        self.windows.slots.insert(handle, SlotState::default());

        debug!("winit window {:?} created as {:?}", desc.title, handle);
        Ok(handle)
    }

    fn destroy_window(&mut self, window: NativeHandle) {
        let Some(w) = self.native.remove(&window) else {
            return;
        };
        self.by_id.remove(&w.id());
        self.windows.forget(window);
        debug!("winit window {:?} destroyed", window);
    }

    fn install_callbacks(&mut self, callbacks: CallbackSet) {
        self.windows.callbacks = Some(callbacks);
    }

    fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        self.pump(timeout);
    }

    fn waker(&self) -> Option<Arc<dyn Waker>> {
        let waker: Arc<dyn Waker> = self.waker.clone();
        Some(waker)
    }

    fn should_close(&self, window: NativeHandle) -> bool {
        self.windows
            .slots
            .get(&window)
            .map_or(true, |s| s.should_close)
    }

    fn set_should_close(&mut self, window: NativeHandle, value: bool) {
        if let Some(slot) = self.windows.slots.get_mut(&window) {
            slot.should_close = value;
        }
    }

    fn window_size(&self, window: NativeHandle) -> FrameSize {
        self.window(window).map_or(FrameSize::default(), |w| {
            let logical: LogicalSize<i32> = w.inner_size().to_logical(w.scale_factor());
            FrameSize::new(logical.width, logical.height)
        })
    }

    fn set_window_size(&mut self, window: NativeHandle, size: FrameSize) {
        let Some(w) = self.native.get(&window) else {
            return;
        };
        // `Some` means the size was applied now and `Resized` may never come.
        if let Some(physical) = w.request_inner_size(LogicalSize::new(size.width, size.height)) {
            self.windows.pending_resize.push(PendingResize {
                handle: window,
                physical,
                scale_factor: w.scale_factor(),
            });
        }
    }

    fn framebuffer_size(&self, window: NativeHandle) -> FrameSize {
        self.window(window).map_or(FrameSize::default(), |w| {
            let PhysicalSize { width, height } = w.inner_size();
            FrameSize::new(
                i32::try_from(width).unwrap_or(i32::MAX),
                i32::try_from(height).unwrap_or(i32::MAX),
            )
        })
    }

    fn window_position(&self, window: NativeHandle) -> Coordinates<i32> {
        self.window(window)
            .and_then(|w| w.outer_position().ok())
            .map_or(Coordinates::default(), |p| Coordinates::new(p.x, p.y))
    }

    fn set_window_position(&mut self, window: NativeHandle, pos: Coordinates<i32>) {
        if let Some(w) = self.window(window) {
            w.set_outer_position(PhysicalPosition::new(pos.x, pos.y));
        }
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) {
        if let Some(w) = self.window(window) {
            w.set_title(title);
        }
    }

    fn show(&mut self, window: NativeHandle) {
        if let Some(w) = self.window(window) {
            w.set_visible(true);
        }
    }

    fn hide(&mut self, window: NativeHandle) {
        if let Some(w) = self.window(window) {
            w.set_visible(false);
        }
    }

    fn iconify(&mut self, window: NativeHandle) {
        if let Some(w) = self.window(window) {
            w.set_minimized(true);
            self.windows.pending_iconify.push((window, true));
        }
    }

    fn restore(&mut self, window: NativeHandle) {
        if let Some(w) = self.window(window) {
            w.set_minimized(false);
            self.windows.pending_iconify.push((window, false));
        }
    }

    fn cursor_position(&self, window: NativeHandle) -> Coordinates<f64> {
        self.windows
            .slots
            .get(&window)
            .map_or(Coordinates::default(), |s| s.cursor)
    }

    fn set_cursor_position(&mut self, window: NativeHandle, pos: Coordinates<f64>) {
        let (Some(w), Some(slot)) = (self.native.get(&window), self.windows.slots.get_mut(&window))
        else {
            return;
        };
        match w.set_cursor_position(PhysicalPosition::new(pos.x, pos.y)) {
            Ok(()) => slot.cursor = pos,
            Err(e) => warn!("set_cursor_position on {:?} failed: {}", window, e),
        }
    }
}
