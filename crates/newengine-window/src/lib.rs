//! Window layer: turns the callbacks of a native windowing library into a
//! pull-style event queue per window.
//!
//! ```text
//! native event -> callback adapter -> registry lookup -> EventQueue -> Window::poll
//! ```

pub mod callbacks;
pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod native;
pub mod queue;
pub mod window;

pub use crate::config::{BridgeConfig, PumpConfig, WindowConfig};
pub use crate::environment::{Environment, Registry};
pub use crate::error::{BridgeError, BridgeResult};
pub use crate::event::{
    Action, ButtonState, Coordinates, Event, EventKind, FrameSize, Key, KeyInput, Modifiers,
    MouseButton, MouseButtonInput,
};
pub use crate::native::{NativeHandle, NativeLibrary, WindowDesc};
pub use crate::queue::{EventQueue, QueueHandle};
pub use crate::window::{PumpMode, Window};
