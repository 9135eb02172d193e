// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-connection outbound queue.
//!
//! Each connection drains its own queue from a dedicated sender task, so a
//! stalled client backs up only its own stream. On overflow the oldest
//! buffered frame is dropped; the hub separately marks the connection as
//! needing a re-fetch.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A bounded FIFO of serialized frames shared between `publish` call sites
/// and one draining sender task.
///
/// `push` never blocks and never waits on the consumer: when the queue is
/// full the oldest frame is discarded to make room.
pub struct OutboundQueue {
    frames: Mutex<VecDeque<std::sync::Arc<str>>>,
    capacity: usize,
    notify: Notify,
    closed: AtomicBool,
}

impl OutboundQueue {
    /// Create a queue bounded at `capacity` frames. Capacity must be >= 1
    /// (enforced by config validation).
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueue a frame, returning `true` if the oldest buffered frame was
    /// dropped to make room.
    pub fn push(&self, frame: std::sync::Arc<str>) -> bool {
        let dropped = {
            let mut frames = self.frames.lock().expect("queue lock poisoned");
            let dropped = if frames.len() >= self.capacity {
                frames.pop_front();
                true
            } else {
                false
            };
            frames.push_back(frame);
            dropped
        };
        self.notify.notify_one();
        dropped
    }

    /// Dequeue the next frame, waiting until one is available.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<std::sync::Arc<str>> {
        loop {
            {
                let mut frames = self.frames.lock().expect("queue lock poisoned");
                if let Some(frame) = frames.pop_front() {
                    return Some(frame);
                }
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Close the queue. Pending frames are still drained; `pop` then
    /// returns `None`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    /// Number of frames currently buffered.
    pub fn len(&self) -> usize {
        self.frames.lock().expect("queue lock poisoned").len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
