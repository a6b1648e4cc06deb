use thiserror::Error;

use crate::native::NativeHandle;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("native error: {0}")]
    Native(String),

    #[error("config error: {0}")]
    Config(String),

    /// Two windows claimed the same native handle.
    #[error("native handle {0:?} is already registered")]
    DuplicateHandle(NativeHandle),

    #[error("window is closed")]
    WindowClosed,
}
