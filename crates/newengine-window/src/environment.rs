use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;

use crate::callbacks::CallbackSet;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::native::{NativeHandle, NativeLibrary, WindowDesc, Waker};
use crate::queue::{EventQueue, QueueHandle, SharedQueue};

/// Native handle -> event queue of the window that owns it.
///
/// A handle is present exactly while its window is alive.
pub struct Registry {
    windows: Mutex<HashMap<NativeHandle, SharedQueue>>,
    queue_capacity: usize,
}

impl Registry {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            queue_capacity,
        }
    }

    /// Allocate a queue for `window`. A handle can only be registered once.
    pub fn register(&self, window: NativeHandle) -> BridgeResult<QueueHandle> {
        let mut windows = self.windows.lock();
        if windows.contains_key(&window) {
            return Err(BridgeError::DuplicateHandle(window));
        }

        let queue: SharedQueue = Arc::new(Mutex::new(EventQueue::with_capacity(self.queue_capacity)));
        let handle = QueueHandle::new(&queue);
        windows.insert(window, queue);
        Ok(handle)
    }

    #[inline]
    pub fn lookup(&self, window: NativeHandle) -> Option<SharedQueue> {
        self.windows.lock().get(&window).cloned()
    }

    /// Drop the association and release the queue. Returns false if the
    /// handle was not registered.
    pub fn unregister(&self, window: NativeHandle) -> bool {
        self.windows.lock().remove(&window).is_some()
    }

    #[inline]
    pub fn contains(&self, window: NativeHandle) -> bool {
        self.windows.lock().contains_key(&window)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owner of the native library and the window registry.
///
/// Created once by the host and passed to every window; callbacks are
/// installed on the native library when the first window registers.
///
/// Lock order is native -> registry -> queue. Adapters run under the native
/// lock and take the other two.
pub struct Environment<N: NativeLibrary> {
    native: Mutex<N>,
    registry: Arc<Registry>,
    callbacks_installed: AtomicBool,
    config: BridgeConfig,
}

impl<N: NativeLibrary> Environment<N> {
    pub fn new(native: N) -> Arc<Self> {
        Self::with_config(native, BridgeConfig::default())
    }

    pub fn with_config(native: N, config: BridgeConfig) -> Arc<Self> {
        Arc::new(Self {
            native: Mutex::new(native),
            registry: Arc::new(Registry::new(config.queue_capacity)),
            callbacks_installed: AtomicBool::new(false),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[inline]
    pub fn callbacks_installed(&self) -> bool {
        self.callbacks_installed.load(Ordering::Acquire)
    }

    /// Register a freshly created native window and hand back its queue.
    ///
    /// The first successful registration installs the callback table.
    pub fn register_window(&self, window: NativeHandle) -> BridgeResult<QueueHandle> {
        let queue = self.registry.register(window)?;

        let mut native = self.native.lock();
        if !self.callbacks_installed.load(Ordering::Acquire) {
            native.install_callbacks(CallbackSet::new(self.registry.clone()));
            self.callbacks_installed.store(true, Ordering::Release);
            info!("window callbacks installed");
        }
        drop(native);

        debug!("window {:?} registered", window);
        Ok(queue)
    }

    pub fn unregister_window(&self, window: NativeHandle) -> bool {
        let removed = self.registry.unregister(window);
        if removed {
            debug!("window {:?} unregistered", window);
        }
        removed
    }

    pub(crate) fn create_window(&self, desc: &WindowDesc) -> BridgeResult<(NativeHandle, QueueHandle)> {
        let window = self.native.lock().create_window(desc)?;

        match self.register_window(window) {
            Ok(queue) => Ok((window, queue)),
            Err(e) => {
                self.native.lock().destroy_window(window);
                Err(e)
            }
        }
    }

    /// Native destroy and unregistration under one native lock, so no
    /// dispatch can run between them.
    pub(crate) fn destroy_window(&self, window: NativeHandle) {
        let mut native = self.native.lock();
        native.destroy_window(window);
        self.unregister_window(window);
    }

    /// Process pending native events without blocking. Callbacks run before
    /// this returns.
    pub fn poll_events(&self) {
        self.native.lock().poll_events();
    }

    /// Block until the native library processes at least one event or the
    /// timeout elapses.
    pub fn wait_events(&self, timeout: Option<Duration>) {
        self.native.lock().wait_events(timeout);
    }

    pub fn waker(&self) -> Option<Arc<dyn Waker>> {
        self.native.lock().waker()
    }

    /// Direct access to the native library for pass-through calls.
    pub fn with_native<R>(&self, f: impl FnOnce(&mut N) -> R) -> R {
        let mut native = self.native.lock();
        f(&mut *native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn handle(raw: usize) -> NativeHandle {
        NativeHandle::from_raw(raw).unwrap()
    }

    #[test]
    fn test_register_lookup_unregister() {
        let registry = Registry::new(4);
        let w = handle(7);

        let queue = registry.register(w).unwrap();
        assert!(registry.contains(w));
        assert_eq!(registry.len(), 1);

        registry.lookup(w).unwrap().lock().push(Event::Refresh);
        assert_eq!(queue.pop(), Some(Event::Refresh));

        assert!(registry.unregister(w));
        assert!(registry.lookup(w).is_none());
        assert!(!queue.is_live());
        assert!(registry.is_empty());
        assert!(!registry.unregister(w));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let registry = Registry::new(4);
        let w = handle(7);
        let first = registry.register(w).unwrap();

        let err = registry.register(w).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateHandle(h) if h == w));
        // The first queue survives the rejected attempt.
        assert!(first.is_live());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregistration_after_release_gets_fresh_queue() {
        let registry = Registry::new(4);
        let w = handle(11);

        let old = registry.register(w).unwrap();
        registry.lookup(w).unwrap().lock().push(Event::FocusLost);
        registry.unregister(w);

        let new = registry.register(w).unwrap();
        assert!(!old.is_live());
        assert!(new.is_empty());
    }
}
