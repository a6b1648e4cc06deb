//! In-process native library without a display server.
//!
//! Raw events are injected from any thread through an [`EventInjector`] and
//! dispatched through the installed callbacks when events are processed,
//! the same way a real windowing library reports OS events. Used by tests
//! and by hosts that run without a window system.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::{Condvar, Mutex};

use super::{NativeHandle, NativeLibrary, WindowDesc, Waker};
use crate::callbacks::CallbackSet;
use crate::error::{BridgeError, BridgeResult};
use crate::event::{Action, ButtonState, Coordinates, FrameSize, Key, Modifiers, MouseButton};

/// Decoded native notification, before it reaches a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Key {
        key: Key,
        scancode: i32,
        action: Action,
        mods: Modifiers,
    },
    Char(u32),
    MouseButton {
        button: MouseButton,
        state: ButtonState,
        mods: Modifiers,
    },
    CursorPos { x: f64, y: f64 },
    Scroll { dx: f64, dy: f64 },
    WindowSize { width: i32, height: i32 },
    FramebufferSize { width: i32, height: i32 },
    WindowPos { x: i32, y: i32 },
    Close,
    Focus(bool),
    CursorEnter(bool),
    Iconify(bool),
    Refresh,
}

#[derive(Default)]
struct Inbox {
    pending: VecDeque<(NativeHandle, RawEvent)>,
    woken: bool,
}

#[derive(Default)]
struct Shared {
    inbox: Mutex<Inbox>,
    ready: Condvar,
}

/// Producer side of the headless library. Cheap to clone, usable from any thread.
#[derive(Clone, Default)]
pub struct EventInjector {
    shared: Arc<Shared>,
}

impl EventInjector {
    pub fn inject(&self, window: NativeHandle, event: RawEvent) {
        self.shared.inbox.lock().pending.push_back((window, event));
        self.shared.ready.notify_all();
    }

    /// Wake a blocked `wait_events` without queuing anything.
    pub fn post_empty_event(&self) {
        self.shared.inbox.lock().woken = true;
        self.shared.ready.notify_all();
    }

    pub fn pending(&self) -> usize {
        self.shared.inbox.lock().pending.len()
    }
}

impl Waker for EventInjector {
    fn wake(&self) {
        self.post_empty_event();
    }
}

#[derive(Debug, Clone)]
struct HeadlessWindow {
    title: String,
    size: FrameSize,
    position: Coordinates<i32>,
    cursor: Coordinates<f64>,
    should_close: bool,
    visible: bool,
    iconified: bool,
}

pub struct HeadlessNative {
    windows: HashMap<NativeHandle, HeadlessWindow>,
    next_handle: usize,
    callbacks: Option<CallbackSet>,
    install_count: usize,
    injector: EventInjector,
    framebuffer_scale: i32,
}

impl HeadlessNative {
    pub fn new() -> Self {
        Self::with_framebuffer_scale(1)
    }

    /// Framebuffer pixels per window unit, as on a HiDPI display.
    pub fn with_framebuffer_scale(scale: i32) -> Self {
        Self {
            windows: HashMap::new(),
            next_handle: 1,
            callbacks: None,
            install_count: 0,
            injector: EventInjector::default(),
            framebuffer_scale: scale.max(1),
        }
    }

    #[inline]
    pub fn injector(&self) -> EventInjector {
        self.injector.clone()
    }

    /// How many times a callback table was installed.
    #[inline]
    pub fn install_count(&self) -> usize {
        self.install_count
    }

    #[inline]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn title(&self, window: NativeHandle) -> Option<&str> {
        self.windows.get(&window).map(|w| w.title.as_str())
    }

    pub fn is_visible(&self, window: NativeHandle) -> Option<bool> {
        self.windows.get(&window).map(|w| w.visible)
    }

    pub fn is_iconified(&self, window: NativeHandle) -> Option<bool> {
        self.windows.get(&window).map(|w| w.iconified)
    }

    /// Saturates at `i32::MAX` per axis.
    fn scaled(&self, size: FrameSize) -> FrameSize {
        FrameSize::new(
            size.width.saturating_mul(self.framebuffer_scale),
            size.height.saturating_mul(self.framebuffer_scale),
        )
    }

    fn dispatch(&mut self) -> usize {
        let batch = std::mem::take(&mut self.injector.shared.inbox.lock().pending);
        let mut delivered = 0usize;

        for (handle, event) in batch {
            let Some(window) = self.windows.get_mut(&handle) else {
                debug!("headless: dropping {:?} for destroyed window {:?}", event, handle);
                continue;
            };

            match event {
                RawEvent::Close => window.should_close = true,
                RawEvent::WindowSize { width, height } => window.size = FrameSize::new(width, height),
                RawEvent::WindowPos { x, y } => window.position = Coordinates::new(x, y),
                RawEvent::CursorPos { x, y } => window.cursor = Coordinates::new(x, y),
                RawEvent::Iconify(iconified) => window.iconified = iconified,
                _ => {}
            }

            let Some(cb) = self.callbacks.as_ref() else {
                continue;
            };

            match event {
                RawEvent::Key { key, scancode, action, mods } => cb.key(handle, key, scancode, action, mods),
                RawEvent::Char(cp) => cb.character(handle, cp),
                RawEvent::MouseButton { button, state, mods } => cb.mouse_button(handle, button, state, mods),
                RawEvent::CursorPos { x, y } => cb.cursor_pos(handle, x, y),
                RawEvent::Scroll { dx, dy } => cb.scroll(handle, dx, dy),
                RawEvent::WindowSize { width, height } => cb.window_size(handle, width, height),
                RawEvent::FramebufferSize { width, height } => cb.framebuffer_size(handle, width, height),
                RawEvent::WindowPos { x, y } => cb.window_pos(handle, x, y),
                RawEvent::Close => cb.window_close(handle),
                RawEvent::Focus(focused) => cb.window_focus(handle, focused),
                RawEvent::CursorEnter(entered) => cb.cursor_enter(handle, entered),
                RawEvent::Iconify(iconified) => cb.window_iconify(handle, iconified),
                RawEvent::Refresh => cb.window_refresh(handle),
            }
            delivered += 1;
        }

        delivered
    }
}

impl Default for HeadlessNative {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeLibrary for HeadlessNative {
    fn create_window(&mut self, desc: &WindowDesc) -> BridgeResult<NativeHandle> {
        if desc.size.width <= 0 || desc.size.height <= 0 {
            return Err(BridgeError::Native(format!(
                "invalid window size {}x{}",
                desc.size.width, desc.size.height
            )));
        }

        let handle = NativeHandle::from_raw(self.next_handle)
            .ok_or_else(|| BridgeError::Native("window handles exhausted".to_string()))?;
        self.next_handle += 1;

        self.windows.insert(
            handle,
            HeadlessWindow {
                title: desc.title.clone(),
                size: desc.size,
                position: Coordinates::default(),
                cursor: Coordinates::default(),
                should_close: false,
                visible: desc.visible,
                iconified: false,
            },
        );
        Ok(handle)
    }

    fn destroy_window(&mut self, window: NativeHandle) {
        self.windows.remove(&window);
    }

    fn install_callbacks(&mut self, callbacks: CallbackSet) {
        self.callbacks = Some(callbacks);
        self.install_count += 1;
    }

    fn poll_events(&mut self) {
        self.dispatch();
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        {
            let shared = &self.injector.shared;
            let mut inbox = shared.inbox.lock();
            let deadline = timeout.map(|t| Instant::now() + t);

            while inbox.pending.is_empty() && !inbox.woken {
                match deadline {
                    Some(d) => {
                        if shared.ready.wait_until(&mut inbox, d).timed_out() {
                            break;
                        }
                    }
                    None => shared.ready.wait(&mut inbox),
                }
            }
            inbox.woken = false;
        }

        self.dispatch();
    }

    fn waker(&self) -> Option<Arc<dyn Waker>> {
        Some(Arc::new(self.injector.clone()))
    }

    fn should_close(&self, window: NativeHandle) -> bool {
        self.windows.get(&window).map_or(true, |w| w.should_close)
    }

    fn set_should_close(&mut self, window: NativeHandle, value: bool) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.should_close = value;
        }
    }

    fn window_size(&self, window: NativeHandle) -> FrameSize {
        self.windows.get(&window).map(|w| w.size).unwrap_or_default()
    }

    fn set_window_size(&mut self, window: NativeHandle, size: FrameSize) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.size = size;

        let fb = self.scaled(size);
        self.injector.inject(window, RawEvent::WindowSize { width: size.width, height: size.height });
        self.injector.inject(window, RawEvent::FramebufferSize { width: fb.width, height: fb.height });
    }

    fn framebuffer_size(&self, window: NativeHandle) -> FrameSize {
        self.scaled(self.window_size(window))
    }

    fn window_position(&self, window: NativeHandle) -> Coordinates<i32> {
        self.windows.get(&window).map(|w| w.position).unwrap_or_default()
    }

    fn set_window_position(&mut self, window: NativeHandle, pos: Coordinates<i32>) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.position = pos;
            self.injector.inject(window, RawEvent::WindowPos { x: pos.x, y: pos.y });
        }
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.title = title.to_string();
        }
    }

    fn show(&mut self, window: NativeHandle) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.visible = true;
        }
    }

    fn hide(&mut self, window: NativeHandle) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.visible = false;
        }
    }

    fn iconify(&mut self, window: NativeHandle) {
        if let Some(w) = self.windows.get_mut(&window) {
            if !w.iconified {
                w.iconified = true;
                self.injector.inject(window, RawEvent::Iconify(true));
            }
        }
    }

    fn restore(&mut self, window: NativeHandle) {
        if let Some(w) = self.windows.get_mut(&window) {
            if w.iconified {
                w.iconified = false;
                self.injector.inject(window, RawEvent::Iconify(false));
            }
        }
    }

    fn cursor_position(&self, window: NativeHandle) -> Coordinates<f64> {
        self.windows.get(&window).map(|w| w.cursor).unwrap_or_default()
    }

    fn set_cursor_position(&mut self, window: NativeHandle, pos: Coordinates<f64>) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.cursor = pos;
        }
    }
}
