use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::event::Event;

/// FIFO of events for one window.
///
/// Producer: the callback adapters, during native event processing.
/// Consumer: the owning window's `poll`.
#[derive(Debug, Default)]
pub struct EventQueue {
    buf: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { buf: VecDeque::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: VecDeque::with_capacity(cap) }
    }

    #[inline]
    pub fn push(&mut self, event: Event) {
        self.buf.push_back(event);
    }

    /// Oldest event, or `None` without touching the queue.
    #[inline]
    pub fn pop(&mut self) -> Option<Event> {
        self.buf.pop_front()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Take everything queued so far, oldest first.
    #[inline]
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, Event> {
        self.buf.drain(..)
    }
}

/// Shared slot owned by the registry.
pub type SharedQueue = Arc<Mutex<EventQueue>>;

/// Non-owning reference to a window's queue.
///
/// The registry holds the only strong reference; once the window is
/// unregistered the handle stops resolving.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    inner: Weak<Mutex<EventQueue>>,
}

impl QueueHandle {
    pub(crate) fn new(queue: &SharedQueue) -> Self {
        Self { inner: Arc::downgrade(queue) }
    }

    pub fn pop(&self) -> Option<Event> {
        self.inner.upgrade().and_then(|q| q.lock().pop())
    }

    /// Pending events; zero once the queue has been released.
    pub fn len(&self) -> usize {
        self.inner.upgrade().map_or(0, |q| q.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the registry still owns the queue.
    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
