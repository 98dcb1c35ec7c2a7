//! The UI-thread front end: platform view and activity callbacks come in here
//! and leave as ordered [`QueuedEvent`]s.

use std::sync::{Arc, Mutex};

use crate::config::ConfigRef;
use crate::host::Host;
use crate::input::{
    AxisTracker, KeySample, KeyTracker, MotionSample, PointerSource, PointerTracker, Source,
};
use crate::listener::{LifecycleListener, ListenerRegistry};
use crate::queue::{EventQueue, LifecycleEvent, QueuedEvent};
use crate::surface::{SurfaceCoordinator, SurfaceHandle};
use crate::Rect;

#[derive(Debug, Default)]
struct InputState {
    pointers: PointerTracker,
    keys: KeyTracker,
    axes: AxisTracker,
}

pub struct SurfaceView {
    queue: Arc<EventQueue>,
    surface: SurfaceCoordinator,
    host: Arc<dyn Host>,
    config: ConfigRef,

    // Held while translated events are enqueued so concurrent callers can't
    // interleave a single sample's events
    input: Mutex<InputState>,

    listeners: ListenerRegistry<dyn LifecycleListener>,
}

impl std::fmt::Debug for SurfaceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceView")
            .field("queue", &self.queue)
            .field("surface", &self.surface)
            .field("config", &self.config)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl SurfaceView {
    pub fn new(host: Arc<dyn Host>, config: ConfigRef) -> Self {
        let queue = Arc::new(EventQueue::new());
        let surface = SurfaceCoordinator::new(queue.clone(), host.clone(), config.clone());
        Self {
            queue,
            surface,
            host,
            config,
            input: Mutex::new(InputState::default()),
            listeners: ListenerRegistry::new(),
        }
    }

    /// The queue to hand to the consumer thread
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn surface(&self) -> &SurfaceCoordinator {
        &self.surface
    }

    pub fn config(&self) -> &ConfigRef {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry<dyn LifecycleListener> {
        &self.listeners
    }

    ////////////////////////////
    // Input
    ////////////////////////////

    /// A touch event from the view. Returns `true` if it was consumed.
    pub fn on_touch(&self, sample: &MotionSample) -> bool {
        match PointerSource::from(sample.source) {
            PointerSource::Touchscreen | PointerSource::Mouse | PointerSource::Pointer => {
                self.queue_pointers(sample);
                true
            }
            _ => false,
        }
    }

    /// A generic (non-touch) motion event, such as joystick axes or a mouse
    /// hovering. Returns `true` if it was consumed.
    pub fn on_generic_motion(&self, sample: &MotionSample) -> bool {
        if sample.source.contains(Source::CLASS_JOYSTICK) || sample.source.is_gamepad() {
            let mut guard = self.input.lock().unwrap();
            for event in guard.axes.translate(sample) {
                self.queue.enqueue(QueuedEvent::GamepadAxis(event));
            }
            true
        } else if PointerSource::from(sample.source) == PointerSource::Mouse {
            self.queue_pointers(sample);
            true
        } else {
            false
        }
    }

    /// A key event from the view. Returns `true` if it was consumed.
    pub fn on_key(&self, sample: &KeySample) -> bool {
        let max_key_code = self.config.max_key_code();
        let forward_repeats = self.config.forward_key_repeats();
        let mut guard = self.input.lock().unwrap();
        match guard.keys.translate(sample, max_key_code, forward_repeats) {
            Some(event) => {
                self.queue.enqueue(QueuedEvent::Key(event));
                true
            }
            None => sample.key_code < max_key_code,
        }
    }

    /// Forget the cached axis values for a disconnected input device
    pub fn on_input_device_removed(&self, device_id: i32) {
        self.input.lock().unwrap().axes.forget_device(device_id);
    }

    fn queue_pointers(&self, sample: &MotionSample) {
        let multitouch = self.config.multitouch();
        let mut guard = self.input.lock().unwrap();
        for event in guard.pointers.translate(sample, multitouch) {
            self.queue.enqueue(QueuedEvent::Pointer(event));
        }
    }

    ////////////////////////////
    // Surface
    ////////////////////////////

    /// Contacts still down on a surface that is replaced without a destroy
    /// are cancelled ahead of its destroy.
    pub fn surface_created(&self, handle: SurfaceHandle) {
        log::info!("Surface created: {:?}", handle);
        if self.surface.state().handle.is_some_and(|old| old != handle) {
            self.cancel_contacts();
        }
        self.surface.on_surface_created(handle);
    }

    pub fn surface_changed(&self, handle: SurfaceHandle, width: u32, height: u32) {
        log::info!("Surface changed: {:?} {}x{}", handle, width, height);
        self.surface.on_surface_changed(handle, width, height);
    }

    /// Blocks until the consumer thread has let go of the surface.
    ///
    /// Contacts still down on the surface are cancelled first.
    pub fn surface_destroyed(&self, handle: SurfaceHandle) {
        log::info!("Surface destroyed: {:?}", handle);
        if self.surface.tracks(handle) {
            self.cancel_contacts();
        }
        self.surface.on_surface_destroyed(handle);
    }

    fn cancel_contacts(&self) {
        let mut guard = self.input.lock().unwrap();
        for event in guard.pointers.cancel_all() {
            self.queue.enqueue(QueuedEvent::Pointer(event));
        }
    }

    pub fn visible_frame_changed(&self, frame: Rect) {
        self.queue.enqueue(QueuedEvent::VisibleFrameChanged(frame));
    }

    ////////////////////////////
    // Activity lifecycle
    ////////////////////////////

    pub fn on_start(&self) {
        self.listeners.notify(|l| l.on_start());
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::Start));
    }

    pub fn on_resume(&self) {
        self.listeners.notify(|l| l.on_resume());
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::Resume));
    }

    pub fn on_pause(&self) {
        self.listeners.notify(|l| l.on_pause());
        let screen_locked = self.host.is_screen_locked();
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::Pause { screen_locked }));
    }

    pub fn on_stop(&self) {
        self.listeners.notify(|l| l.on_stop());
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::Stop));
    }

    /// Blocks until the consumer thread has seen the destroy
    pub fn on_destroy(&self) {
        self.listeners.notify(|l| l.on_destroy());
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::Destroy));
        self.queue.wait_until_drained();
    }

    pub fn on_low_memory(&self) {
        self.listeners.notify(|l| l.on_low_memory());
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::LowMemory));
    }

    pub fn on_focus_changed(&self, focused: bool) {
        self.listeners.notify(|l| l.on_focus_changed(focused));
        self.queue.enqueue(QueuedEvent::Lifecycle(LifecycleEvent::FocusChanged { focused }));
    }

    /// Fire-and-forget delivery of a tagged value to the consumer thread, in
    /// order with input and surface events
    pub fn post(&self, tag: u32, data: u64) {
        self.queue.enqueue(QueuedEvent::Posted { tag, data });
    }
}
