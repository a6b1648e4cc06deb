//! winit backend for the NewEngine window layer.
//!
//! Event processing pumps the winit loop in place instead of handing control
//! to `run_app`, so the host keeps its own frame loop.

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
))]
mod imp {
    pub mod dispatch;
    pub mod keys;
    pub mod native;
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
))]
pub use imp::native::WinitNative;
