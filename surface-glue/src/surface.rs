//! Serializes surface create/change/destroy callbacks from the UI thread so
//! that the consumer thread never sees a stale or already destroyed surface.

use std::sync::{Arc, Mutex};

use crate::config::ConfigRef;
use crate::host::Host;
use crate::queue::{EventQueue, QueuedEvent};

/// An opaque reference to a platform drawing surface
///
/// The glue only compares handles for identity; resolving a handle back to a
/// native window is up to the platform adapter and the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize as u64)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfacePhase {
    /// No surface tracked
    Absent,
    /// A surface is tracked but its size is not known yet
    Created,
    /// A surface is tracked with a known, non-zero size
    Sized,
}

/// The UI thread's view of the current surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub handle: Option<SurfaceHandle>,
    pub width: u32,
    pub height: u32,
    pub ready: bool,
}

impl SurfaceState {
    pub fn phase(&self) -> SurfacePhase {
        match self.handle {
            None => SurfacePhase::Absent,
            Some(_) if self.width == 0 || self.height == 0 => SurfacePhase::Created,
            Some(_) => SurfacePhase::Sized,
        }
    }

    fn tracks(&self, handle: SurfaceHandle) -> bool {
        self.handle == Some(handle)
    }
}

pub struct SurfaceCoordinator {
    queue: Arc<EventQueue>,
    host: Arc<dyn Host>,
    config: ConfigRef,
    state: Mutex<SurfaceState>,
}

impl std::fmt::Debug for SurfaceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceCoordinator")
            .field("state", &*self.state.lock().unwrap())
            .finish_non_exhaustive()
    }
}

impl SurfaceCoordinator {
    pub fn new(queue: Arc<EventQueue>, host: Arc<dyn Host>, config: ConfigRef) -> Self {
        Self {
            queue,
            host,
            config,
            state: Mutex::new(SurfaceState::default()),
        }
    }

    pub fn state(&self) -> SurfaceState {
        *self.state.lock().unwrap()
    }

    pub fn phase(&self) -> SurfacePhase {
        self.state.lock().unwrap().phase()
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().unwrap().ready
    }

    /// Whether `handle` is the surface currently being tracked
    pub fn tracks(&self, handle: SurfaceHandle) -> bool {
        self.state.lock().unwrap().tracks(handle)
    }

    /// A new surface exists.
    ///
    /// If the platform never told us the previous surface was destroyed, a
    /// destroy for it is queued first and the caller waits for it to be
    /// processed before the new surface is announced to anyone else.
    pub fn on_surface_created(&self, handle: SurfaceHandle) {
        let stale = {
            let mut guard = self.state.lock().unwrap();
            let stale = guard.handle.filter(|old| *old != handle);
            if let Some(old) = stale {
                log::warn!(
                    "Surface {:?} created while {:?} was never destroyed",
                    handle,
                    old
                );
                self.queue.enqueue(QueuedEvent::SurfaceDestroyed(old));
            } else if guard.tracks(handle) {
                log::debug!("Ignoring repeated create for surface {:?}", handle);
                return;
            }

            *guard = SurfaceState {
                handle: Some(handle),
                width: 0,
                height: 0,
                ready: true,
            };
            self.queue.enqueue(QueuedEvent::SurfaceCreated(handle));
            stale
        };

        if stale.is_some() {
            self.queue.wait_until_drained();
        }
    }

    /// The tracked surface changed size.
    ///
    /// Returns once the consumer thread has processed the change (or
    /// immediately if `handle` is not the tracked surface).
    pub fn on_surface_changed(&self, handle: SurfaceHandle, width: u32, height: u32) {
        let orientation = self.host.requested_orientation();
        let resized = {
            let mut guard = self.state.lock().unwrap();
            if !guard.tracks(handle) {
                log::debug!(
                    "Ignoring resize of stale surface {:?} (current = {:?})",
                    handle,
                    guard.handle
                );
                return;
            }

            if width == 0 || height == 0 {
                log::debug!("Ignoring empty surface size {}x{}", width, height);
                false
            } else if !orientation.accepts(width, height) {
                log::info!(
                    "Skipping surface size {}x{} inconsistent with {:?}",
                    width,
                    height,
                    orientation
                );
                false
            } else if guard.width == width
                && guard.height == height
                && self.config.skip_redundant_resize()
            {
                log::trace!("Surface size unchanged: {}x{}", width, height);
                false
            } else {
                guard.width = width;
                guard.height = height;
                self.queue.enqueue(QueuedEvent::SurfaceChanged {
                    handle,
                    width,
                    height,
                });
                true
            }
        };

        self.queue.wait_until_drained();
        if resized {
            self.host.surface_resized(width, height);
        }
    }

    /// The tracked surface is going away.
    ///
    /// Does not return until the consumer thread has processed every event
    /// queued before the destroy, including the destroy itself, so the
    /// platform can safely release the surface afterwards.
    pub fn on_surface_destroyed(&self, handle: SurfaceHandle) {
        {
            let mut guard = self.state.lock().unwrap();
            if !guard.tracks(handle) {
                log::debug!(
                    "Ignoring destroy of stale surface {:?} (current = {:?})",
                    handle,
                    guard.handle
                );
                return;
            }
            *guard = SurfaceState::default();
            self.queue.enqueue(QueuedEvent::SurfaceDestroyed(handle));
        }

        self.queue.wait_until_drained();
        log::debug!("Surface {:?} released by consumer", handle);
    }
}
