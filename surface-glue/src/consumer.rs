//! A dedicated consumer thread that drains an [`EventQueue`] into a
//! [`NativeEngine`] and drives its frames.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::ConfigRef;
use crate::engine::NativeEngine;
use crate::error::{GlueError, Result};
use crate::queue::{EventQueue, QueuedEvent};

/// The status of the consumer thread
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConsumerThreadState {
    /// The thread hasn't started running yet
    Init,
    /// The thread has been spawned and started running
    Running,
    /// The thread has finished
    Stopped,
}

#[derive(Debug)]
struct Shared {
    mutex: Mutex<ConsumerThreadState>,
    cond: Condvar,
    quit: AtomicBool,
}

impl Shared {
    fn set_state(&self, state: ConsumerThreadState) {
        let mut guard = self.mutex.lock().unwrap();
        *guard = state;
        self.cond.notify_all();
    }
}

#[derive(Debug)]
pub struct ConsumerThread<E> {
    queue: Arc<EventQueue>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<Option<E>>>,
}

impl<E> ConsumerThread<E>
where
    E: NativeEngine + Send + 'static,
{
    /// Spawn the consumer thread for `queue`, taking ownership of `engine`.
    ///
    /// Returns once the thread is running. Fails if the queue already has a
    /// consumer.
    pub fn spawn(queue: Arc<EventQueue>, config: ConfigRef, engine: E) -> Result<Self> {
        if !queue.claim_consumer() {
            return Err(GlueError::ConsumerRunning);
        }

        let shared = Arc::new(Shared {
            mutex: Mutex::new(ConsumerThreadState::Init),
            cond: Condvar::new(),
            quit: AtomicBool::new(false),
        });

        let thread_queue = queue.clone();
        let thread_shared = shared.clone();
        let spawned = thread::Builder::new()
            .name("surface-glue-consumer".into())
            .spawn(move || {
                thread_queue.bind_consumer();
                thread_shared.set_state(ConsumerThreadState::Running);

                let result = catch_unwind(AssertUnwindSafe(|| {
                    run(&thread_queue, &thread_shared, &config, engine)
                }));
                let engine = match result {
                    Ok(engine) => Some(engine),
                    Err(panic) => {
                        log_panic(panic);
                        None
                    }
                };

                thread_queue.release_consumer();
                thread_shared.set_state(ConsumerThreadState::Stopped);
                engine
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                queue.release_consumer();
                return Err(GlueError::ThreadSpawn(err));
            }
        };

        // Wait for thread to start.
        //
        // Don't specifically wait for `Running` just in case the thread
        // stops immediately
        let mut guard = shared.mutex.lock().unwrap();
        while *guard == ConsumerThreadState::Init {
            guard = shared.cond.wait(guard).unwrap();
        }
        drop(guard);

        Ok(Self {
            queue,
            shared,
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> ConsumerThreadState {
        *self.shared.mutex.lock().unwrap()
    }

    /// Ask the thread to exit and wait for it.
    ///
    /// Everything enqueued before this call is still executed. Returns the
    /// engine, or `None` if the thread panicked.
    pub fn stop(mut self) -> Option<E> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<E> {
        let handle = self.handle.take()?;
        self.shared.quit.store(true, Ordering::Release);
        self.queue.wake();
        match handle.join() {
            Ok(engine) => engine,
            Err(_) => {
                log::error!("Consumer thread panicked outside of the engine");
                None
            }
        }
    }
}

impl<E> Drop for ConsumerThread<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("Stopping consumer thread on drop");
            self.shared.quit.store(true, Ordering::Release);
            self.queue.wake();
            let _ = handle.join();
        }
    }
}

fn run<E: NativeEngine>(
    queue: &EventQueue,
    shared: &Shared,
    config: &ConfigRef,
    mut engine: E,
) -> E {
    log::debug!("Consumer thread running");

    // Tracks the surface as the engine sees it, which may lag behind the UI thread
    let mut sized = false;
    loop {
        let quit = shared.quit.load(Ordering::Acquire);

        queue.drain_and_execute(|event| {
            match &event {
                QueuedEvent::SurfaceChanged { .. } => sized = true,
                QueuedEvent::SurfaceCreated(_) | QueuedEvent::SurfaceDestroyed(_) => sized = false,
                _ => {}
            }
            event.dispatch(&mut engine);
        });

        if quit {
            break;
        }
        if sized {
            engine.process_frame();
        }

        let timeout = if sized { config.frame_interval() } else { None };
        queue.wait_for_work(timeout);
    }

    log::debug!("Consumer thread stopped");
    engine
}

fn log_panic(panic: Box<dyn std::any::Any + Send>) {
    if let Some(panic) = panic.downcast_ref::<String>() {
        log::error!("Consumer thread panicked: {}", panic);
    } else if let Some(panic) = panic.downcast_ref::<&str>() {
        log::error!("Consumer thread panicked: {}", panic);
    } else {
        log::error!("Consumer thread panicked with a non-string payload");
    }
}
