//! The mailbox between the UI thread and the consumer (render/native) thread.
//!
//! Any number of producers may [`enqueue`](EventQueue::enqueue) events without
//! ever blocking on the consumer. Exactly one consumer thread drains the
//! queue and runs each event, in the order it was enqueued, exactly once.
//! Producers that need to be sure the consumer has caught up (such as a surface
//! being destroyed) can block in [`wait_until_drained`](EventQueue::wait_until_drained).

use std::mem;
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::input::{GamepadAxisEvent, KeyEvent, PointerEvent};
use crate::surface::SurfaceHandle;
use crate::Rect;

/// Activity lifecycle changes forwarded to the consumer thread
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    Resume,
    Pause { screen_locked: bool },
    Stop,
    Destroy,
    LowMemory,
    FocusChanged { focused: bool },
}

/// A unit of deferred work for the consumer thread
#[derive(Clone, Debug, PartialEq)]
pub enum QueuedEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    GamepadAxis(GamepadAxisEvent),
    SurfaceCreated(SurfaceHandle),
    SurfaceChanged {
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    },
    SurfaceDestroyed(SurfaceHandle),
    Lifecycle(LifecycleEvent),
    VisibleFrameChanged(Rect),

    /// Work posted by other platform services (notifications, preferences,
    /// web views, ...) that needs to run in order with the native thread
    Posted {
        tag: u32,
        data: u64,
    },
}

#[derive(Debug, Default)]
struct QueueState {
    events: Vec<QueuedEvent>,

    /// Total number of events ever enqueued
    enqueued: u64,
    /// Total number of events whose drain cycle has completed
    executed: u64,

    /// The thread that drains this queue, recorded on first drain
    consumer: Option<ThreadId>,
    /// Set while a consumer thread has been spawned but not yet started
    consumer_claimed: bool,

    woken: bool,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    mutex: Mutex<QueueState>,
    cond: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the tail of the queue.
    ///
    /// Never blocks on the consumer.
    pub fn enqueue(&self, event: QueuedEvent) {
        let mut guard = self.mutex.lock().unwrap();
        log::trace!("Enqueue: {:?}", event);
        guard.events.push(event);
        guard.enqueued += 1;
        self.cond.notify_all();
    }

    /// Take every currently queued event and run `handler` on each of them, in
    /// order, on the calling thread.
    ///
    /// Producers may keep enqueueing while the handler runs; those events are
    /// left for the next drain. Once the captured events have all been run,
    /// any producer blocked in [`wait_until_drained()`](Self::wait_until_drained)
    /// for them is released.
    ///
    /// Returns the number of events that were executed.
    pub fn drain_and_execute<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(QueuedEvent),
    {
        let (batch, target) = {
            let mut guard = self.mutex.lock().unwrap();
            let current = thread::current().id();
            match guard.consumer {
                None => guard.consumer = Some(current),
                Some(consumer) if consumer != current => {
                    log::error!(
                        "EventQueue drained from {:?} but its consumer is {:?}",
                        current,
                        consumer
                    );
                    debug_assert!(false, "EventQueue only supports a single consumer thread");
                }
                Some(_) => {}
            }
            (mem::take(&mut guard.events), guard.enqueued)
        };

        let count = batch.len();
        for event in batch {
            log::trace!("Execute: {:?}", event);
            handler(event);
        }

        if count > 0 {
            let mut guard = self.mutex.lock().unwrap();
            guard.executed = target;
            self.cond.notify_all();
        }
        count
    }

    /// Block until every event enqueued before this call has been executed by
    /// the consumer.
    ///
    /// Returns immediately if there is nothing pending. There is no timeout: a
    /// stalled consumer stalls the caller.
    ///
    /// Must not be called from the consumer thread, which could never make
    /// progress; such calls are refused and logged.
    pub fn wait_until_drained(&self) {
        let mut guard = self.mutex.lock().unwrap();
        if guard.executed == guard.enqueued {
            return;
        }
        if guard.consumer == Some(thread::current().id()) {
            log::error!(
                "wait_until_drained() called from the consumer thread, refusing to deadlock"
            );
            return;
        }

        let target = guard.enqueued;
        log::trace!(
            "Waiting for consumer: executed = {}, target = {}",
            guard.executed,
            target
        );
        while guard.executed < target {
            guard = self.cond.wait(guard).unwrap();
        }
    }

    /// For the consumer: block until there is something to drain, [`wake()`](Self::wake)
    /// is called, or `timeout` elapses.
    ///
    /// Returns `true` if events are pending.
    pub fn wait_for_work(&self, timeout: Option<Duration>) -> bool {
        let mut guard = self.mutex.lock().unwrap();
        match timeout {
            None => {
                while guard.events.is_empty() && !guard.woken {
                    guard = self.cond.wait(guard).unwrap();
                }
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while guard.events.is_empty() && !guard.woken {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    let (next, _) = self.cond.wait_timeout(guard, deadline - now).unwrap();
                    guard = next;
                }
            }
        }
        guard.woken = false;
        !guard.events.is_empty()
    }

    /// Interrupt a consumer blocked in [`wait_for_work()`](Self::wait_for_work)
    pub fn wake(&self) {
        let mut guard = self.mutex.lock().unwrap();
        guard.woken = true;
        self.cond.notify_all();
    }

    /// Number of events waiting for the next drain
    pub fn len(&self) -> usize {
        self.mutex.lock().unwrap().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutex.lock().unwrap().events.is_empty()
    }

    /// `true` while events are queued or a drain that captured events is still
    /// executing them
    pub fn has_pending(&self) -> bool {
        let guard = self.mutex.lock().unwrap();
        guard.executed != guard.enqueued
    }

    ////////////////////////////
    // Consumer thread ownership
    ////////////////////////////

    pub(crate) fn claim_consumer(&self) -> bool {
        let mut guard = self.mutex.lock().unwrap();
        if guard.consumer.is_some() || guard.consumer_claimed {
            false
        } else {
            guard.consumer_claimed = true;
            true
        }
    }

    pub(crate) fn bind_consumer(&self) {
        let mut guard = self.mutex.lock().unwrap();
        debug_assert!(guard.consumer_claimed, "Consumer bound without a claim");
        guard.consumer = Some(thread::current().id());
    }

    pub(crate) fn release_consumer(&self) {
        let mut guard = self.mutex.lock().unwrap();
        guard.consumer = None;
        guard.consumer_claimed = false;
    }
}
