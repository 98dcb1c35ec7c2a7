use crate::input::{GamepadAxisEvent, KeyEvent, PointerEvent};
use crate::queue::{LifecycleEvent, QueuedEvent};
use crate::surface::SurfaceHandle;
use crate::Rect;

/// The native side of the glue: callbacks run synchronously on the consumer
/// thread while the queue is drained.
pub trait NativeEngine {
    fn on_pointer_event(&mut self, event: &PointerEvent);
    fn on_key_event(&mut self, event: &KeyEvent);
    fn on_gamepad_axis(&mut self, event: &GamepadAxisEvent);

    fn on_surface_created(&mut self, handle: SurfaceHandle);
    /// May be called with unchanged dimensions and must tolerate that
    fn on_surface_changed(&mut self, handle: SurfaceHandle, width: u32, height: u32);
    /// The surface must not be touched after this returns
    fn on_surface_destroyed(&mut self);

    fn on_lifecycle(&mut self, _event: LifecycleEvent) {}

    fn on_visible_frame_changed(&mut self, _frame: Rect) {}

    fn on_posted(&mut self, _tag: u32, _data: u64) {}

    /// Called by [`ConsumerThread`](crate::ConsumerThread) once per loop
    /// iteration while a sized surface exists
    fn process_frame(&mut self) {}
}

impl QueuedEvent {
    /// Route this event to the matching engine callback
    pub fn dispatch<E: NativeEngine + ?Sized>(self, engine: &mut E) {
        match self {
            QueuedEvent::Pointer(event) => engine.on_pointer_event(&event),
            QueuedEvent::Key(event) => engine.on_key_event(&event),
            QueuedEvent::GamepadAxis(event) => engine.on_gamepad_axis(&event),
            QueuedEvent::SurfaceCreated(handle) => engine.on_surface_created(handle),
            QueuedEvent::SurfaceChanged {
                handle,
                width,
                height,
            } => engine.on_surface_changed(handle, width, height),
            QueuedEvent::SurfaceDestroyed(_) => engine.on_surface_destroyed(),
            QueuedEvent::Lifecycle(event) => engine.on_lifecycle(event),
            QueuedEvent::VisibleFrameChanged(frame) => engine.on_visible_frame_changed(frame),
            QueuedEvent::Posted { tag, data } => engine.on_posted(tag, data),
        }
    }
}
