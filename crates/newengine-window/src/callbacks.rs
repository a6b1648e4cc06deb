//! Callback adapters: native notification in, [`Event`] out.
//!
//! Every adapter builds one event from already-decoded arguments, resolves the
//! owning queue through the [`Registry`] and appends to it. Nothing else.

use std::sync::Arc;

use log::error;

use crate::environment::Registry;
use crate::event::{
    Action, ButtonState, Coordinates, Event, FrameSize, Key, KeyInput, Modifiers, MouseButton,
    MouseButtonInput,
};
use crate::native::NativeHandle;

pub type KeyFn = fn(&Registry, NativeHandle, Key, i32, Action, Modifiers);
pub type CharFn = fn(&Registry, NativeHandle, u32);
pub type MouseButtonFn = fn(&Registry, NativeHandle, MouseButton, ButtonState, Modifiers);
pub type PairF64Fn = fn(&Registry, NativeHandle, f64, f64);
pub type PairI32Fn = fn(&Registry, NativeHandle, i32, i32);
pub type FlagFn = fn(&Registry, NativeHandle, bool);
pub type UnitFn = fn(&Registry, NativeHandle);

/// One function per native callback category.
#[derive(Copy, Clone)]
pub struct CallbackTable {
    pub key: KeyFn,
    pub character: CharFn,
    pub mouse_button: MouseButtonFn,
    pub cursor_pos: PairF64Fn,
    pub scroll: PairF64Fn,
    pub window_size: PairI32Fn,
    pub framebuffer_size: PairI32Fn,
    pub window_pos: PairI32Fn,
    pub window_close: UnitFn,
    pub window_focus: FlagFn,
    pub cursor_enter: FlagFn,
    pub window_iconify: FlagFn,
    pub window_refresh: UnitFn,
}

impl Default for CallbackTable {
    fn default() -> Self {
        Self {
            key: key_callback,
            character: char_callback,
            mouse_button: mouse_button_callback,
            cursor_pos: cursor_pos_callback,
            scroll: scroll_callback,
            window_size: window_size_callback,
            framebuffer_size: framebuffer_size_callback,
            window_pos: window_pos_callback,
            window_close: window_close_callback,
            window_focus: window_focus_callback,
            cursor_enter: cursor_enter_callback,
            window_iconify: window_iconify_callback,
            window_refresh: window_refresh_callback,
        }
    }
}

/// What a native library receives on installation: the table plus the
/// registry every entry routes through.
#[derive(Clone)]
pub struct CallbackSet {
    registry: Arc<Registry>,
    table: CallbackTable,
}

impl CallbackSet {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_table(registry, CallbackTable::default())
    }

    pub fn with_table(registry: Arc<Registry>, table: CallbackTable) -> Self {
        Self { registry, table }
    }

    #[inline]
    pub fn key(&self, w: NativeHandle, key: Key, scancode: i32, action: Action, mods: Modifiers) {
        (self.table.key)(&self.registry, w, key, scancode, action, mods);
    }

    #[inline]
    pub fn character(&self, w: NativeHandle, codepoint: u32) {
        (self.table.character)(&self.registry, w, codepoint);
    }

    #[inline]
    pub fn mouse_button(
        &self,
        w: NativeHandle,
        button: MouseButton,
        state: ButtonState,
        mods: Modifiers,
    ) {
        (self.table.mouse_button)(&self.registry, w, button, state, mods);
    }

    #[inline]
    pub fn cursor_pos(&self, w: NativeHandle, x: f64, y: f64) {
        (self.table.cursor_pos)(&self.registry, w, x, y);
    }

    #[inline]
    pub fn scroll(&self, w: NativeHandle, dx: f64, dy: f64) {
        (self.table.scroll)(&self.registry, w, dx, dy);
    }

    #[inline]
    pub fn window_size(&self, w: NativeHandle, width: i32, height: i32) {
        (self.table.window_size)(&self.registry, w, width, height);
    }

    #[inline]
    pub fn framebuffer_size(&self, w: NativeHandle, width: i32, height: i32) {
        (self.table.framebuffer_size)(&self.registry, w, width, height);
    }

    #[inline]
    pub fn window_pos(&self, w: NativeHandle, x: i32, y: i32) {
        (self.table.window_pos)(&self.registry, w, x, y);
    }

    #[inline]
    pub fn window_close(&self, w: NativeHandle) {
        (self.table.window_close)(&self.registry, w);
    }

    #[inline]
    pub fn window_focus(&self, w: NativeHandle, focused: bool) {
        (self.table.window_focus)(&self.registry, w, focused);
    }

    #[inline]
    pub fn cursor_enter(&self, w: NativeHandle, entered: bool) {
        (self.table.cursor_enter)(&self.registry, w, entered);
    }

    #[inline]
    pub fn window_iconify(&self, w: NativeHandle, iconified: bool) {
        (self.table.window_iconify)(&self.registry, w, iconified);
    }

    #[inline]
    pub fn window_refresh(&self, w: NativeHandle) {
        (self.table.window_refresh)(&self.registry, w);
    }
}

pub fn key_callback(
    registry: &Registry,
    w: NativeHandle,
    key: Key,
    scancode: i32,
    action: Action,
    modifiers: Modifiers,
) {
    let input = KeyInput { key, modifiers, scancode };
    let event = match action {
        Action::Press => Event::KeyPressed(input),
        Action::Release => Event::KeyReleased(input),
        Action::Repeat => Event::KeyRepeated(input),
    };
    deliver(registry, w, event);
}

pub fn char_callback(registry: &Registry, w: NativeHandle, codepoint: u32) {
    deliver(registry, w, Event::Character(codepoint));
}

pub fn mouse_button_callback(
    registry: &Registry,
    w: NativeHandle,
    button: MouseButton,
    state: ButtonState,
    modifiers: Modifiers,
) {
    let input = MouseButtonInput { button, modifiers };
    let event = match state {
        ButtonState::Pressed => Event::MouseButtonPressed(input),
        ButtonState::Released => Event::MouseButtonReleased(input),
    };
    deliver(registry, w, event);
}

pub fn cursor_pos_callback(registry: &Registry, w: NativeHandle, x: f64, y: f64) {
    deliver(registry, w, Event::CursorMoved(Coordinates::new(x, y)));
}

pub fn scroll_callback(registry: &Registry, w: NativeHandle, dx: f64, dy: f64) {
    deliver(registry, w, Event::Scrolled(Coordinates::new(dx, dy)));
}

pub fn window_size_callback(registry: &Registry, w: NativeHandle, width: i32, height: i32) {
    deliver(registry, w, Event::WindowResized(FrameSize::new(width, height)));
}

pub fn framebuffer_size_callback(registry: &Registry, w: NativeHandle, width: i32, height: i32) {
    deliver(registry, w, Event::FramebufferResized(FrameSize::new(width, height)));
}

pub fn window_pos_callback(registry: &Registry, w: NativeHandle, x: i32, y: i32) {
    deliver(registry, w, Event::WindowMoved(Coordinates::new(x, y)));
}

pub fn window_close_callback(registry: &Registry, w: NativeHandle) {
    deliver(registry, w, Event::CloseRequested);
}

pub fn window_focus_callback(registry: &Registry, w: NativeHandle, focused: bool) {
    let event = if focused { Event::FocusGained } else { Event::FocusLost };
    deliver(registry, w, event);
}

pub fn cursor_enter_callback(registry: &Registry, w: NativeHandle, entered: bool) {
    let event = if entered { Event::CursorEntered } else { Event::CursorLeft };
    deliver(registry, w, event);
}

pub fn window_iconify_callback(registry: &Registry, w: NativeHandle, iconified: bool) {
    let event = if iconified { Event::Iconified } else { Event::Restored };
    deliver(registry, w, event);
}

pub fn window_refresh_callback(registry: &Registry, w: NativeHandle) {
    deliver(registry, w, Event::Refresh);
}

fn deliver(registry: &Registry, w: NativeHandle, event: Event) {
    match registry.lookup(w) {
        Some(queue) => queue.lock().push(event),
        None => {
            // The native side only reports windows it created for us, so a miss
            // means the registry and the native library disagree about lifetimes.
            error!(
                "callback {:?} for unregistered window {:?}: registry out of sync",
                event.kind(),
                w
            );
            panic!("window registry desync: no queue for native handle {w:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: usize) -> NativeHandle {
        NativeHandle::from_raw(raw).unwrap()
    }

    #[test]
    fn test_key_action_selects_variant() {
        let registry = Registry::new(8);
        let w = handle(1);
        let queue = registry.register(w).unwrap();

        key_callback(&registry, w, Key::A, 30, Action::Press, Modifiers::SHIFT);
        key_callback(&registry, w, Key::A, 30, Action::Repeat, Modifiers::SHIFT);
        key_callback(&registry, w, Key::A, 30, Action::Release, Modifiers::empty());

        let input = |modifiers| KeyInput { key: Key::A, modifiers, scancode: 30 };
        assert_eq!(queue.pop(), Some(Event::KeyPressed(input(Modifiers::SHIFT))));
        assert_eq!(queue.pop(), Some(Event::KeyRepeated(input(Modifiers::SHIFT))));
        assert_eq!(queue.pop(), Some(Event::KeyReleased(input(Modifiers::empty()))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_flag_callbacks_pick_both_sides() {
        let registry = Registry::new(8);
        let w = handle(2);
        let queue = registry.register(w).unwrap();

        window_focus_callback(&registry, w, true);
        window_focus_callback(&registry, w, false);
        cursor_enter_callback(&registry, w, true);
        cursor_enter_callback(&registry, w, false);
        window_iconify_callback(&registry, w, true);
        window_iconify_callback(&registry, w, false);

        let got: Vec<Event> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(
            got,
            vec![
                Event::FocusGained,
                Event::FocusLost,
                Event::CursorEntered,
                Event::CursorLeft,
                Event::Iconified,
                Event::Restored,
            ]
        );
    }

    #[test]
    fn test_callback_set_routes_through_table() {
        let registry = Arc::new(Registry::new(8));
        let w = handle(3);
        let queue = registry.register(w).unwrap();
        let set = CallbackSet::new(registry.clone());

        set.mouse_button(w, MouseButton::Middle, ButtonState::Pressed, Modifiers::ALT);
        set.scroll(w, 0.0, -2.5);
        set.window_pos(w, -10, 40);
        set.framebuffer_size(w, 1600, 1200);
        set.character(w, 'q' as u32);
        set.window_close(w);
        set.window_refresh(w);

        assert_eq!(
            queue.pop(),
            Some(Event::MouseButtonPressed(MouseButtonInput {
                button: MouseButton::Middle,
                modifiers: Modifiers::ALT,
            }))
        );
        assert_eq!(queue.pop(), Some(Event::Scrolled(Coordinates::new(0.0, -2.5))));
        assert_eq!(queue.pop(), Some(Event::WindowMoved(Coordinates::new(-10, 40))));
        assert_eq!(queue.pop(), Some(Event::FramebufferResized(FrameSize::new(1600, 1200))));
        assert_eq!(queue.pop(), Some(Event::Character('q' as u32)));
        assert_eq!(queue.pop(), Some(Event::CloseRequested));
        assert_eq!(queue.pop(), Some(Event::Refresh));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    #[should_panic(expected = "window registry desync")]
    fn test_unregistered_handle_panics() {
        let registry = Registry::new(8);
        cursor_pos_callback(&registry, handle(99), 1.0, 1.0);
    }
}
