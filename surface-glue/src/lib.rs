//! Glue between a platform UI thread and a single native/render thread.
//!
//! Platform callbacks (touch, keys, gamepad axes, surface and activity
//! lifecycle) arrive on the UI thread through a [`SurfaceView`] and are turned
//! into [`QueuedEvent`]s on an [`EventQueue`]. A single consumer thread (see
//! [`ConsumerThread`]) drains the queue into a [`NativeEngine`], in order.
//!
//! Surface changes and destruction block the UI thread until the consumer has
//! caught up, so the engine never touches a surface after the platform has
//! reclaimed it.

mod config;
pub use config::{ConfigRef, GlueConfig};

mod error;
pub use error::{GlueError, Result};

pub mod input;

mod queue;
pub use queue::{EventQueue, LifecycleEvent, QueuedEvent};

mod surface;
pub use surface::{SurfaceCoordinator, SurfaceHandle, SurfacePhase, SurfaceState};

mod engine;
pub use engine::NativeEngine;

mod consumer;
pub use consumer::{ConsumerThread, ConsumerThreadState};

mod host;
pub use host::{Host, NullHost, Orientation};

mod listener;
pub use listener::{LifecycleListener, ListenerId, ListenerRegistry};

mod view;
pub use view::SurfaceView;

#[cfg(target_os = "android")]
pub mod android;

// Note: this has signed components (consistent with Android's ARect) which
// allows for representing rectangles with a negative/off-screen origin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[test]
fn test_glue_is_send_sync() {
    fn needs_send_sync<T: Send + Sync>() {}
    needs_send_sync::<EventQueue>();
    needs_send_sync::<SurfaceCoordinator>();
    needs_send_sync::<SurfaceView>();
    needs_send_sync::<ConfigRef>();
}
