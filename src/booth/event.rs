//! Events passed from input sources to the capture loop.
//!
//! Producers run on GPIO interrupt threads, the Ctrl-C handler thread and
//! the console reader; the only thing they share with the loop is the
//! [`EventQueue`]. Handles never touch the camera or the display.

use crate::signal::Button;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Requests delivered to the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Save the current camera image.
    CaptureRequested,
    /// Stop the camera, close the display and leave the loop.
    QuitRequested,
}

impl From<Button> for Event {
    fn from(button: Button) -> Self {
        match button {
            Button::Capture => Event::CaptureRequested,
            Button::Quit => Event::QuitRequested,
        }
    }
}

/// Ordered multi-producer, single-consumer event queue.
///
/// Unbounded; debouncing at the source keeps it short in practice.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<Event>>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking producer cannot leave the deque half-written, so a
    // poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an event.
    pub fn push(&self, event: Event) {
        self.lock().push_back(event);
    }

    /// Takes every queued event, oldest first.
    ///
    /// Returns immediately when the queue is empty. Events pushed while the
    /// caller processes the batch land in the next drain.
    pub fn drain(&self) -> Vec<Event> {
        let batch = std::mem::take(&mut *self.lock());
        Vec::from(batch)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Cloneable entry point for input sources.
#[derive(Debug, Clone)]
pub struct BoothHandle {
    queue: EventQueue,
}

impl BoothHandle {
    pub(crate) fn new(queue: EventQueue) -> Self {
        Self { queue }
    }

    /// Requests a capture. Never blocks on the loop.
    pub fn capture(&self) {
        self.queue.push(Event::CaptureRequested);
    }

    /// Requests shutdown. Never blocks on the loop.
    pub fn exit(&self) {
        self.queue.push(Event::QuitRequested);
    }

    /// Forwards a button press.
    pub fn signal(&self, button: Button) {
        self.queue.push(button.into());
    }
}
