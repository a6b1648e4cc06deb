use std::collections::HashMap;

use log::{debug, trace};
use newengine_window::callbacks::CallbackSet;
use newengine_window::{Coordinates, Modifiers, NativeHandle};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use super::keys;

/// Pixels per scroll line when converting touchpad pixel deltas.
const PIXELS_PER_LINE: f64 = 16.0;

/// Bridge-side state of one window, kept apart from the winit window.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SlotState {
    pub should_close: bool,
    pub cursor: Coordinates<f64>,
    pub minimized: bool,
}

/// What translation needs to know about the live window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowView {
    pub scale_factor: f64,
    pub minimized: Option<bool>,
}

impl WindowView {
    pub fn of(window: &Window) -> Self {
        Self {
            scale_factor: window.scale_factor(),
            minimized: window.is_minimized(),
        }
    }
}

/// A size winit applied without a `Resized` event, reported on the next pump.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PendingResize {
    pub handle: NativeHandle,
    pub physical: PhysicalSize<u32>,
    pub scale_factor: f64,
}

/// Everything the translated callbacks touch while the loop is pumped.
#[derive(Default)]
pub struct Windows {
    pub slots: HashMap<NativeHandle, SlotState>,
    pub callbacks: Option<CallbackSet>,
    pub modifiers: Modifiers,
    pub exited: bool,
    /// Iconify transitions requested through the API.
    pub pending_iconify: Vec<(NativeHandle, bool)>,
    pub pending_resize: Vec<PendingResize>,
}

impl Windows {
    pub fn forget(&mut self, handle: NativeHandle) {
        self.slots.remove(&handle);
        self.pending_iconify.retain(|(h, _)| *h != handle);
        self.pending_resize.retain(|r| r.handle != handle);
    }

    /// Record a minimize state and report it once if it changed.
    pub fn set_minimized(&mut self, handle: NativeHandle, minimized: bool) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };
        if slot.minimized == minimized {
            return;
        }
        slot.minimized = minimized;
        if let Some(cb) = self.callbacks.as_ref() {
            cb.window_iconify(handle, minimized);
        }
    }

    fn report_resize(&self, handle: NativeHandle, physical: PhysicalSize<u32>, scale_factor: f64) {
        let Some(cb) = self.callbacks.as_ref() else {
            return;
        };
        let logical: LogicalSize<i32> = physical.to_logical(scale_factor);
        cb.window_size(handle, logical.width, logical.height);
        cb.framebuffer_size(handle, clamp_i32(physical.width), clamp_i32(physical.height));
    }

    /// Report what API calls changed since the last pump.
    pub fn flush_pending(&mut self) {
        for r in std::mem::take(&mut self.pending_resize) {
            if self.slots.contains_key(&r.handle) {
                self.report_resize(r.handle, r.physical, r.scale_factor);
            }
        }
        for (handle, minimized) in std::mem::take(&mut self.pending_iconify) {
            self.set_minimized(handle, minimized);
        }
    }

    /// Translate one winit event for `handle` into callback calls.
    pub fn translate(&mut self, handle: NativeHandle, event: WindowEvent, view: WindowView) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            return;
        };

        match &event {
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = keys::map_modifiers(m.state());
                return;
            }
            WindowEvent::CloseRequested => slot.should_close = true,
            WindowEvent::CursorMoved { position, .. } => {
                slot.cursor = Coordinates::new(position.x, position.y);
            }
            _ => {}
        }

        let Some(cb) = self.callbacks.as_ref() else {
            return;
        };
        let mods = self.modifiers;

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let key = keys::map_key(event.physical_key);
                let scancode = keys::scancode(event.physical_key);
                let action = keys::map_action(event.state, event.repeat);
                cb.key(handle, key, scancode, action, mods);

                if event.state.is_pressed() {
                    if let Some(text) = event.text.as_ref() {
                        for ch in text.chars().filter(|c| !c.is_control()) {
                            cb.character(handle, ch as u32);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                cb.mouse_button(
                    handle,
                    keys::map_mouse_button(button),
                    keys::map_button_state(state),
                    mods,
                );
            }
            WindowEvent::CursorMoved { position, .. } => {
                cb.cursor_pos(handle, position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x as f64, y as f64),
                    MouseScrollDelta::PixelDelta(p) => (p.x / PIXELS_PER_LINE, p.y / PIXELS_PER_LINE),
                };
                cb.scroll(handle, dx, dy);
            }
            WindowEvent::Resized(physical) => {
                // A resize supersedes a size still waiting to be reported.
                self.pending_resize.retain(|r| r.handle != handle);
                self.report_resize(handle, physical, view.scale_factor);
                if let Some(minimized) = view.minimized {
                    self.set_minimized(handle, minimized);
                }
            }
            WindowEvent::Moved(PhysicalPosition { x, y }) => {
                cb.window_pos(handle, x, y);
            }
            WindowEvent::CloseRequested => {
                cb.window_close(handle);
            }
            WindowEvent::Focused(focused) => {
                cb.window_focus(handle, focused);
            }
            WindowEvent::CursorEntered { .. } => {
                cb.cursor_enter(handle, true);
            }
            WindowEvent::CursorLeft { .. } => {
                cb.cursor_enter(handle, false);
            }
            WindowEvent::RedrawRequested => {
                cb.window_refresh(handle);
            }
            _ => {}
        }
    }
}

/// Short-lived handler fed to `pump_app_events`.
pub struct Dispatch<'a> {
    pub native: &'a HashMap<NativeHandle, Window>,
    pub by_id: &'a HashMap<WindowId, NativeHandle>,
    pub windows: &'a mut Windows,
}

impl ApplicationHandler for Dispatch<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        // Events can still arrive for a window dropped earlier in the same pump.
        let (native, by_id) = (self.native, self.by_id);
        let Some((&handle, window)) = by_id.get(&id).and_then(|h| native.get_key_value(h)) else {
            trace!("winit event for released window {:?} dropped", id);
            return;
        };

        self.windows.translate(handle, event, WindowView::of(window));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        debug!("winit event loop exiting");
        self.windows.exited = true;
    }
}

#[inline]
fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
