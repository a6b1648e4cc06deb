use bitflags::bitflags;

/// Discriminant of an [`Event`]. One value per native callback category.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    KeyPressed,
    KeyReleased,
    KeyRepeated,
    Character,
    MouseButtonPressed,
    MouseButtonReleased,
    CursorMoved,
    Scrolled,
    WindowResized,
    FramebufferResized,
    WindowMoved,
    CloseRequested,
    FocusGained,
    FocusLost,
    CursorEntered,
    CursorLeft,
    Iconified,
    Restored,
    Refresh,
}

/// A single window event, as produced by the callback adapters.
///
/// Each variant carries exactly the payload of its category, so reading the
/// payload of another kind is not expressible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    KeyPressed(KeyInput),
    KeyReleased(KeyInput),
    KeyRepeated(KeyInput),
    /// Unicode code point of the produced text.
    Character(u32),
    MouseButtonPressed(MouseButtonInput),
    MouseButtonReleased(MouseButtonInput),
    /// Cursor position in screen coordinates relative to the client area.
    CursorMoved(Coordinates<f64>),
    Scrolled(Coordinates<f64>),
    WindowResized(FrameSize),
    FramebufferResized(FrameSize),
    WindowMoved(Coordinates<i32>),
    CloseRequested,
    FocusGained,
    FocusLost,
    CursorEntered,
    CursorLeft,
    Iconified,
    Restored,
    Refresh,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::KeyPressed(_) => EventKind::KeyPressed,
            Event::KeyReleased(_) => EventKind::KeyReleased,
            Event::KeyRepeated(_) => EventKind::KeyRepeated,
            Event::Character(_) => EventKind::Character,
            Event::MouseButtonPressed(_) => EventKind::MouseButtonPressed,
            Event::MouseButtonReleased(_) => EventKind::MouseButtonReleased,
            Event::CursorMoved(_) => EventKind::CursorMoved,
            Event::Scrolled(_) => EventKind::Scrolled,
            Event::WindowResized(_) => EventKind::WindowResized,
            Event::FramebufferResized(_) => EventKind::FramebufferResized,
            Event::WindowMoved(_) => EventKind::WindowMoved,
            Event::CloseRequested => EventKind::CloseRequested,
            Event::FocusGained => EventKind::FocusGained,
            Event::FocusLost => EventKind::FocusLost,
            Event::CursorEntered => EventKind::CursorEntered,
            Event::CursorLeft => EventKind::CursorLeft,
            Event::Iconified => EventKind::Iconified,
            Event::Restored => EventKind::Restored,
            Event::Refresh => EventKind::Refresh,
        }
    }

    /// Character payload as a `char`, if it is a valid scalar value.
    pub fn as_char(&self) -> Option<char> {
        match *self {
            Event::Character(cp) => char::from_u32(cp),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Platform-specific scancode, passed through untouched.
    pub scancode: i32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MouseButtonInput {
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Coordinates<T> {
    pub x: T,
    pub y: T,
}

impl<T> Coordinates<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FrameSize {
    pub width: i32,
    pub height: i32,
}

impl FrameSize {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// What happened to a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

/// What happened to a mouse button. Buttons have no repeat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

bitflags! {
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CONTROL = 0x02;
        const ALT = 0x04;
        const SUPER = 0x08;
        const CAPS_LOCK = 0x10;
        const NUM_LOCK = 0x20;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Keyboard keys, numbered after the US layout like the native key tokens.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum Key {
    Unknown = -1,
    Space = 32,
    Apostrophe = 39,
    Comma = 44,
    Minus = 45,
    Period = 46,
    Slash = 47,
    Num0 = 48,
    Num1 = 49,
    Num2 = 50,
    Num3 = 51,
    Num4 = 52,
    Num5 = 53,
    Num6 = 54,
    Num7 = 55,
    Num8 = 56,
    Num9 = 57,
    Semicolon = 59,
    Equal = 61,
    A = 65,
    B = 66,
    C = 67,
    D = 68,
    E = 69,
    F = 70,
    G = 71,
    H = 72,
    I = 73,
    J = 74,
    K = 75,
    L = 76,
    M = 77,
    N = 78,
    O = 79,
    P = 80,
    Q = 81,
    R = 82,
    S = 83,
    T = 84,
    U = 85,
    V = 86,
    W = 87,
    X = 88,
    Y = 89,
    Z = 90,
    LeftBracket = 91,
    Backslash = 92,
    RightBracket = 93,
    GraveAccent = 96,
    Escape = 256,
    Enter = 257,
    Tab = 258,
    Backspace = 259,
    Insert = 260,
    Delete = 261,
    Right = 262,
    Left = 263,
    Down = 264,
    Up = 265,
    PageUp = 266,
    PageDown = 267,
    Home = 268,
    End = 269,
    CapsLock = 280,
    ScrollLock = 281,
    NumLock = 282,
    PrintScreen = 283,
    Pause = 284,
    F1 = 290,
    F2 = 291,
    F3 = 292,
    F4 = 293,
    F5 = 294,
    F6 = 295,
    F7 = 296,
    F8 = 297,
    F9 = 298,
    F10 = 299,
    F11 = 300,
    F12 = 301,
    Kp0 = 320,
    Kp1 = 321,
    Kp2 = 322,
    Kp3 = 323,
    Kp4 = 324,
    Kp5 = 325,
    Kp6 = 326,
    Kp7 = 327,
    Kp8 = 328,
    Kp9 = 329,
    KpDecimal = 330,
    KpDivide = 331,
    KpMultiply = 332,
    KpSubtract = 333,
    KpAdd = 334,
    KpEnter = 335,
    KpEqual = 336,
    LeftShift = 340,
    LeftControl = 341,
    LeftAlt = 342,
    LeftSuper = 343,
    RightShift = 344,
    RightControl = 345,
    RightAlt = 346,
    RightSuper = 347,
    Menu = 348,
}

impl Key {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}
