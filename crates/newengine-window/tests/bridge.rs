use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use newengine_window::native::{HeadlessNative, RawEvent};
use newengine_window::{
    Action, BridgeConfig, BridgeError, ButtonState, Coordinates, Environment, Event, EventKind,
    FrameSize, Key, KeyInput, Modifiers, MouseButton, MouseButtonInput, NativeLibrary, PumpMode,
    Window, WindowDesc,
};

fn headless_env() -> Arc<Environment<HeadlessNative>> {
    Environment::new(HeadlessNative::new())
}

fn key(key: Key, scancode: i32, action: Action) -> RawEvent {
    RawEvent::Key { key, scancode, action, mods: Modifiers::empty() }
}

#[test]
fn test_key_cursor_resize_scenario() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();
    let inject = env.with_native(|n| n.injector());

    inject.inject(w, key(Key::K, 30, Action::Press));
    inject.inject(w, RawEvent::CursorPos { x: 12.5, y: 7.0 });
    inject.inject(w, RawEvent::WindowSize { width: 800, height: 600 });

    assert!(window.advance());

    assert_eq!(
        window.poll(),
        Some(Event::KeyPressed(KeyInput {
            key: Key::K,
            modifiers: Modifiers::empty(),
            scancode: 30,
        }))
    );
    assert_eq!(window.poll(), Some(Event::CursorMoved(Coordinates::new(12.5, 7.0))));
    assert_eq!(window.poll(), Some(Event::WindowResized(FrameSize::new(800, 600))));
    assert_eq!(window.poll(), None);
}

#[test]
fn test_events_arrive_in_firing_order() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();
    let inject = env.with_native(|n| n.injector());

    for cp in 0..100u32 {
        inject.inject(w, RawEvent::Char(cp));
    }
    window.advance();

    let got: Vec<u32> = window
        .events()
        .map(|e| match e {
            Event::Character(cp) => cp,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(got, (0..100).collect::<Vec<_>>());
}

#[test]
fn test_events_not_visible_before_processing() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();

    env.with_native(|n| n.injector()).inject(w, RawEvent::Focus(true));
    assert_eq!(window.poll(), None);
    assert_eq!(window.pending(), 0);

    window.advance();
    assert_eq!(window.pending(), 1);
    assert_eq!(window.poll(), Some(Event::FocusGained));
}

#[test]
fn test_windows_are_isolated() {
    let env = headless_env();
    let mut a = Window::new(&env).unwrap();
    let mut b = Window::new(&env).unwrap();
    let (ha, hb) = (a.handle().unwrap(), b.handle().unwrap());
    let inject = env.with_native(|n| n.injector());

    inject.inject(ha, RawEvent::Scroll { dx: 0.0, dy: 1.0 });
    inject.inject(hb, RawEvent::MouseButton {
        button: MouseButton::Right,
        state: ButtonState::Pressed,
        mods: Modifiers::CONTROL,
    });
    inject.inject(ha, RawEvent::Refresh);
    env.poll_events();

    assert_eq!(
        a.events().collect::<Vec<_>>(),
        vec![Event::Scrolled(Coordinates::new(0.0, 1.0)), Event::Refresh]
    );
    assert_eq!(
        b.events().collect::<Vec<_>>(),
        vec![Event::MouseButtonPressed(MouseButtonInput {
            button: MouseButton::Right,
            modifiers: Modifiers::CONTROL,
        })]
    );
    assert_ne!(a, b);
}

#[test]
fn test_poll_on_empty_queue_changes_nothing() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();

    for _ in 0..3 {
        assert_eq!(window.poll(), None);
    }
    assert_eq!(window.pending(), 0);
    assert!(window.advance());
    assert_eq!(window.poll(), None);
}

#[test]
fn test_interleaved_steps_deliver_each_event_once() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();
    let inject = env.with_native(|n| n.injector());

    let mut seen = Vec::new();
    let mut next = 0u32;
    for step in 0..20 {
        for _ in 0..(step % 4) {
            inject.inject(w, RawEvent::Char(next));
            next += 1;
        }
        window.advance();
        // Drain only part of the queue on odd steps.
        if step % 2 == 1 {
            seen.extend(window.poll());
        } else {
            seen.extend(window.events());
        }
    }
    seen.extend(window.events());

    let expected: Vec<Event> = (0..next).map(Event::Character).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_destroyed_window_is_unregistered() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();
    let registry = env.registry().clone();
    assert!(registry.lookup(w).is_some());

    window.close();
    assert!(!window.is_open());
    assert!(registry.lookup(w).is_none());
    assert!(!window.advance());
    assert_eq!(window.poll(), None);
    assert!(matches!(window.size(), Err(BridgeError::WindowClosed)));
    assert_eq!(env.with_native(|n| n.window_count()), 0);
}

#[test]
fn test_drop_releases_registration() {
    let env = headless_env();
    let w = {
        let window = Window::new(&env).unwrap();
        window.handle().unwrap()
    };
    assert!(!env.registry().contains(w));
    assert!(env.registry().is_empty());

    // Late events for the dead handle never reach the callbacks.
    env.with_native(|n| n.injector()).inject(w, RawEvent::Close);
    env.poll_events();
}

#[test]
fn test_callbacks_installed_once() {
    let env = headless_env();
    assert!(!env.callbacks_installed());

    let windows: Vec<_> = (0..4).map(|_| Window::new(&env).unwrap()).collect();
    assert!(env.callbacks_installed());
    assert_eq!(env.with_native(|n| n.install_count()), 1);

    drop(windows);
    let _again = Window::new(&env).unwrap();
    assert_eq!(env.with_native(|n| n.install_count()), 1);
}

#[test]
fn test_duplicate_native_handle_rejected() {
    let env = headless_env();
    let window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();

    let err = env.register_window(w).unwrap_err();
    assert!(matches!(err, BridgeError::DuplicateHandle(h) if h == w));
    assert_eq!(env.registry().len(), 1);
}

#[test]
#[should_panic(expected = "window registry desync")]
fn test_callback_for_unregistered_handle_panics() {
    let env = headless_env();
    let window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();

    // Break the invariant behind the native library's back.
    assert!(env.unregister_window(w));
    env.with_native(|n| n.injector()).inject(w, RawEvent::Refresh);
    env.poll_events();
}

#[test]
fn test_close_request_ends_advance() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();

    env.with_native(|n| n.injector()).inject(w, RawEvent::Close);
    assert!(!window.advance());
    assert_eq!(window.poll(), Some(Event::CloseRequested));
    assert!(window.should_close().unwrap());

    window.set_should_close(false).unwrap();
    assert!(window.advance());
}

#[test]
fn test_manual_pump_leaves_processing_to_host() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    window.set_pump(PumpMode::MANUAL);
    let w = window.handle().unwrap();

    env.with_native(|n| n.injector()).inject(w, RawEvent::CursorEnter(true));
    assert!(window.advance());
    assert_eq!(window.poll(), None);

    env.poll_events();
    assert_eq!(window.poll().map(|e| e.kind()), Some(EventKind::CursorEntered));
}

#[test]
fn test_wait_mode_blocks_until_injection() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    window.set_poll_events(false);
    window.set_wait_events(true);
    let w = window.handle().unwrap();
    let inject = env.with_native(|n| n.injector());

    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        inject.inject(w, RawEvent::Iconify(true));
    });

    assert!(window.advance());
    producer.join().unwrap();
    assert_eq!(window.poll(), Some(Event::Iconified));
}

#[test]
fn test_wait_then_poll_when_both_enabled() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    window.set_pump(PumpMode {
        poll_events: true,
        wait_events: true,
        wait_timeout: Some(Duration::from_millis(500)),
    });
    let w = window.handle().unwrap();
    let inject = env.with_native(|n| n.injector());

    inject.inject(w, RawEvent::Focus(false));
    let started = Instant::now();
    assert!(window.advance());
    // Pending input satisfies the wait immediately.
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(window.poll(), Some(Event::FocusLost));
}

#[test]
fn test_wait_timeout_elapses_without_events() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    window.set_pump(PumpMode {
        poll_events: false,
        wait_events: true,
        wait_timeout: Some(Duration::from_millis(15)),
    });

    let started = Instant::now();
    assert!(window.advance());
    assert!(started.elapsed() >= Duration::from_millis(15));
    assert_eq!(window.poll(), None);
}

#[test]
fn test_waker_interrupts_indefinite_wait() {
    let env = headless_env();
    let mut window = Window::new(&env).unwrap();
    window.set_pump(PumpMode {
        poll_events: false,
        wait_events: true,
        wait_timeout: None,
    });

    let waker = env.waker().unwrap();
    let t = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        waker.wake();
    });

    assert!(window.advance());
    t.join().unwrap();
    assert_eq!(window.poll(), None);
}

#[test]
fn test_pass_through_setters_report_through_queue() {
    let env = Environment::new(HeadlessNative::with_framebuffer_scale(2));
    let mut window = Window::with_desc(&env, &WindowDesc::new("sample", 320, 200)).unwrap();
    let w = window.handle().unwrap();

    assert_eq!(window.size().unwrap(), FrameSize::new(320, 200));
    assert_eq!(window.framebuffer_size().unwrap(), FrameSize::new(640, 400));

    window.resize(FrameSize::new(100, 50)).unwrap();
    window.set_position(Coordinates::new(5, 6)).unwrap();
    window.minimize().unwrap();
    window.restore().unwrap();
    window.set_title("renamed").unwrap();
    window.hide().unwrap();
    window.set_cursor_position(Coordinates::new(1.5, 2.5)).unwrap();
    window.advance();

    assert_eq!(
        window.events().collect::<Vec<_>>(),
        vec![
            Event::WindowResized(FrameSize::new(100, 50)),
            Event::FramebufferResized(FrameSize::new(200, 100)),
            Event::WindowMoved(Coordinates::new(5, 6)),
            Event::Iconified,
            Event::Restored,
        ]
    );
    assert_eq!(window.position().unwrap(), Coordinates::new(5, 6));
    assert_eq!(window.cursor_position().unwrap(), Coordinates::new(1.5, 2.5));
    env.with_native(|n| {
        assert_eq!(n.title(w), Some("renamed"));
        assert_eq!(n.is_visible(w), Some(false));
        assert_eq!(n.is_iconified(w), Some(false));
        assert!(!n.should_close(w));
    });
}

#[test]
fn test_config_drives_window_and_pump() {
    let cfg = BridgeConfig::from_toml_str(
        r#"
        queue_capacity = 8

        [window]
        title = "configured"
        width = 64
        height = 48

        [pump]
        poll_events = false
        wait_events = true
        wait_timeout_ms = 5
        "#,
    )
    .unwrap();

    let env = Environment::with_config(HeadlessNative::new(), cfg);
    let window = Window::new(&env).unwrap();
    let w = window.handle().unwrap();

    assert_eq!(window.size().unwrap(), FrameSize::new(64, 48));
    assert_eq!(env.with_native(|n| n.title(w).map(str::to_owned)), Some("configured".to_string()));
    assert_eq!(
        window.pump(),
        PumpMode {
            poll_events: false,
            wait_events: true,
            wait_timeout: Some(Duration::from_millis(5)),
        }
    );
}

#[test]
fn test_failed_native_creation_registers_nothing() {
    let env = headless_env();
    let err = Window::with_desc(&env, &WindowDesc::new("bad", -1, 10)).unwrap_err();
    assert!(matches!(err, BridgeError::Native(_)));
    assert!(env.registry().is_empty());
    assert!(!env.callbacks_installed());
}
