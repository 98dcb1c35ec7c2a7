//! Adapter from `NativeActivity` callbacks and NDK input events to a
//! [`SurfaceView`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ndk::event::{KeyEvent, MotionEvent};
use ndk::native_window::NativeWindow;

use crate::input::{self, axis, KeyAction, KeySample, MetaState, MotionSample, Source};
use crate::{ConfigRef, Host, Result, SurfaceHandle, SurfaceView};

pub fn surface_handle(window: &NativeWindow) -> SurfaceHandle {
    SurfaceHandle::from_ptr(window.ptr().as_ptr())
}

/// Convert an NDK motion event into a [`MotionSample`]
pub fn motion_sample(event: &MotionEvent) -> Result<MotionSample> {
    let ptr = event.ptr().as_ptr();

    // XXX: we read the raw action and source with ndk_sys directly since we
    // decode them with our own types, which also handle values added in newer
    // versions of Android.
    let (raw_action, raw_source, device_id, timestamp, meta_state, pointer_count) = unsafe {
        (
            ndk_sys::AMotionEvent_getAction(ptr) as u32,
            ndk_sys::AInputEvent_getSource(ptr) as u32,
            ndk_sys::AInputEvent_getDeviceId(ptr),
            ndk_sys::AMotionEvent_getEventTime(ptr),
            ndk_sys::AMotionEvent_getMetaState(ptr) as u32,
            ndk_sys::AMotionEvent_getPointerCount(ptr) as usize,
        )
    };
    let (action, action_index) = input::decode_motion_action(raw_action)?;
    let source = Source::from_bits_retain(raw_source);

    let mut sample = MotionSample::new(action, source)
        .action_index(action_index)
        .device(device_id)
        .at(timestamp)
        .meta(MetaState::from_bits_retain(meta_state));

    for index in 0..pointer_count {
        let (pointer_id, x, y) = unsafe {
            (
                ndk_sys::AMotionEvent_getPointerId(ptr, index as _),
                ndk_sys::AMotionEvent_getX(ptr, index as _),
                ndk_sys::AMotionEvent_getY(ptr, index as _),
            )
        };
        sample = sample.pointer(pointer_id, x, y);
    }

    if source.contains(Source::CLASS_JOYSTICK) && pointer_count > 0 {
        for &gamepad_axis in axis::GAMEPAD {
            let value = unsafe {
                ndk_sys::AMotionEvent_getAxisValue(ptr, gamepad_axis as _, action_index as _)
            };
            sample = sample.axis(gamepad_axis, value);
        }
    }

    Ok(sample)
}

/// Convert an NDK key event into a [`KeySample`]
pub fn key_sample(event: &KeyEvent) -> Result<KeySample> {
    let ptr = event.ptr().as_ptr();
    let (raw_action, key_code, raw_source, meta_state, repeat_count) = unsafe {
        (
            ndk_sys::AKeyEvent_getAction(ptr) as u32,
            ndk_sys::AKeyEvent_getKeyCode(ptr) as u32,
            ndk_sys::AInputEvent_getSource(ptr) as u32,
            ndk_sys::AKeyEvent_getMetaState(ptr) as u32,
            ndk_sys::AKeyEvent_getRepeatCount(ptr) as u32,
        )
    };

    let mut sample = KeySample::new(
        KeyAction::from_raw(raw_action)?,
        key_code,
        Source::from_bits_retain(raw_source),
    );
    sample.meta_state = MetaState::from_bits_retain(meta_state);
    sample.repeat_count = repeat_count;
    Ok(sample)
}

/// A [`SurfaceView`] fed from `NativeActivity` callbacks.
///
/// Each [`NativeWindow`] is kept acquired until its destroy handshake has
/// completed, so engines can resolve a [`SurfaceHandle`] back to the window
/// for as long as they are allowed to use it.
#[derive(Debug)]
pub struct AndroidSurfaceView {
    view: SurfaceView,
    windows: Mutex<HashMap<SurfaceHandle, NativeWindow>>,
}

impl AndroidSurfaceView {
    pub fn new(host: Arc<dyn Host>, config: ConfigRef) -> Self {
        Self {
            view: SurfaceView::new(host, config),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn view(&self) -> &SurfaceView {
        &self.view
    }

    /// Look up the window behind a handle received by the engine
    pub fn native_window(&self, handle: SurfaceHandle) -> Option<NativeWindow> {
        self.windows.lock().unwrap().get(&handle).cloned()
    }

    pub fn native_window_created(&self, window: NativeWindow) {
        let handle = surface_handle(&window);
        self.windows.lock().unwrap().insert(handle, window);

        self.view.surface_created(handle);

        // Any window replaced without a destroy has now been released by the
        // consumer
        self.windows
            .lock()
            .unwrap()
            .retain(|tracked, _| *tracked == handle);
    }

    pub fn native_window_resized(&self, window: &NativeWindow) {
        let width = window.width().max(0) as u32;
        let height = window.height().max(0) as u32;
        self.view.surface_changed(surface_handle(window), width, height);
    }

    pub fn native_window_destroyed(&self, window: &NativeWindow) {
        let handle = surface_handle(window);
        self.view.surface_destroyed(handle);
        if !self.view.surface().tracks(handle) {
            self.windows.lock().unwrap().remove(&handle);
        }
    }

    /// Returns `true` if the event was consumed
    pub fn motion_event(&self, event: &MotionEvent) -> bool {
        match motion_sample(event) {
            Ok(sample) => self.view.on_touch(&sample) || self.view.on_generic_motion(&sample),
            Err(err) => {
                log::warn!("Dropping motion event: {}", err);
                false
            }
        }
    }

    /// Returns `true` if the event was consumed
    pub fn key_event(&self, event: &KeyEvent) -> bool {
        match key_sample(event) {
            Ok(sample) => self.view.on_key(&sample),
            Err(err) => {
                log::warn!("Dropping key event: {}", err);
                false
            }
        }
    }
}
