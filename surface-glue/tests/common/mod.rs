#![allow(dead_code)]

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use surface_glue::input::{GamepadAxisEvent, KeyEvent, PointerAction, PointerEvent};
use surface_glue::{LifecycleEvent, NativeEngine, SurfaceHandle};

pub const RENDER: u32 = u32::MAX;

#[derive(Clone, Debug, PartialEq)]
pub enum Seen {
    Pointer(PointerAction, u32, f32, f32),
    Key(KeyEvent),
    Axis(u32, f32),
    Created(SurfaceHandle),
    Changed(SurfaceHandle, u32, u32),
    Destroyed,
    Lifecycle(LifecycleEvent),
    Posted(u32, u64),
    RenderFinished,
}

/// Records every callback; a `Posted { tag: RENDER, data: millis }` event
/// simulates a long running render.
#[derive(Default)]
pub struct Recorder {
    pub seen: Arc<Mutex<Vec<Seen>>>,
    pub render_started: Option<Sender<()>>,
    pub frames: usize,
}

impl Recorder {
    pub fn new() -> (Self, Arc<Mutex<Vec<Seen>>>) {
        let recorder = Self::default();
        let seen = recorder.seen.clone();
        (recorder, seen)
    }

    fn push(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
    }
}

impl NativeEngine for Recorder {
    fn on_pointer_event(&mut self, event: &PointerEvent) {
        self.push(Seen::Pointer(event.action, event.touch_id, event.x, event.y));
    }

    fn on_key_event(&mut self, event: &KeyEvent) {
        self.push(Seen::Key(*event));
    }

    fn on_gamepad_axis(&mut self, event: &GamepadAxisEvent) {
        self.push(Seen::Axis(event.axis, event.value));
    }

    fn on_surface_created(&mut self, handle: SurfaceHandle) {
        self.push(Seen::Created(handle));
    }

    fn on_surface_changed(&mut self, handle: SurfaceHandle, width: u32, height: u32) {
        self.push(Seen::Changed(handle, width, height));
    }

    fn on_surface_destroyed(&mut self) {
        self.push(Seen::Destroyed);
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.push(Seen::Lifecycle(event));
    }

    fn on_posted(&mut self, tag: u32, data: u64) {
        self.push(Seen::Posted(tag, data));
        if tag == RENDER {
            if let Some(started) = &self.render_started {
                let _ = started.send(());
            }
            thread::sleep(Duration::from_millis(data));
            self.push(Seen::RenderFinished);
        }
    }

    fn process_frame(&mut self) {
        self.frames += 1;
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
