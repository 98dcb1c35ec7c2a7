use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{GlueError, Result};

mod state;
pub use state::{AxisTracker, KeyTracker, PointerTracker};

bitflags! {
    /// The raw source of a motion or key event, as reported by the platform.
    ///
    /// Device sources are composed of a class (the low byte) and device
    /// specific bits, so a single event may match several of the named sources
    /// (a gamepad commonly also reports itself as a keyboard).
    ///
    /// See [the InputDevice docs](https://developer.android.com/reference/android/view/InputDevice#SOURCE_ANY)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Source: u32 {
        const CLASS_BUTTON = 0x00000001;
        const CLASS_POINTER = 0x00000002;
        const CLASS_TRACKBALL = 0x00000004;
        const CLASS_POSITION = 0x00000008;
        const CLASS_JOYSTICK = 0x00000010;

        const KEYBOARD = 0x00000101;
        const DPAD = 0x00000201;
        const GAMEPAD = 0x00000401;
        const TOUCHSCREEN = 0x00001002;
        const MOUSE = 0x00002002;
        const STYLUS = 0x00004002;
        const TRACKBALL = 0x00010004;
        const TOUCHPAD = 0x00100008;
        const JOYSTICK = 0x01000010;
    }
}

impl Source {
    /// Gamepad buttons and dpads are routed as gamepad elements rather than
    /// keyboard keys
    pub fn is_gamepad(&self) -> bool {
        self.contains(Source::GAMEPAD) || self.contains(Source::DPAD)
    }
}

/// Coarse classification of where a [`PointerEvent`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Touchscreen,
    Mouse,
    Joystick,
    /// Any other pointing device (stylus, trackball, touchpad)
    Pointer,
    Unknown,
}

impl From<Source> for PointerSource {
    fn from(source: Source) -> Self {
        if source.contains(Source::TOUCHSCREEN) {
            PointerSource::Touchscreen
        } else if source.contains(Source::MOUSE) {
            PointerSource::Mouse
        } else if source.contains(Source::CLASS_JOYSTICK) {
            PointerSource::Joystick
        } else if source.intersects(
            Source::CLASS_POINTER | Source::CLASS_TRACKBALL | Source::CLASS_POSITION,
        ) {
            PointerSource::Pointer
        } else {
            PointerSource::Unknown
        }
    }
}

bitflags! {
    /// Modifier key state at the time of an event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MetaState: u32 {
        const SHIFT_ON = 0x00000001;
        const ALT_ON = 0x00000002;
        const SYM_ON = 0x00000004;
        const FUNCTION_ON = 0x00000008;
        const CTRL_ON = 0x00001000;
        const META_ON = 0x00010000;
        const CAPS_LOCK_ON = 0x00100000;
        const NUM_LOCK_ON = 0x00200000;
        const SCROLL_LOCK_ON = 0x00400000;
    }
}

/// A motion action, as delivered by the platform
///
/// See [the MotionEvent docs](https://developer.android.com/reference/android/view/MotionEvent#ACTION_MASK)
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum MotionAction {
    Down = 0,
    Up = 1,
    Move = 2,
    Cancel = 3,
    Outside = 4,
    PointerDown = 5,
    PointerUp = 6,
    HoverMove = 7,
    Scroll = 8,
    HoverEnter = 9,
    HoverExit = 10,
    ButtonPress = 11,
    ButtonRelease = 12,
}

const ACTION_MASK: u32 = 0xff;
const ACTION_POINTER_INDEX_MASK: u32 = 0xff00;
const ACTION_POINTER_INDEX_SHIFT: u32 = 8;

/// Splits a raw (unmasked) motion action into the action and the index of the
/// pointer it applies to
pub fn decode_motion_action(raw: u32) -> Result<(MotionAction, usize)> {
    let action = MotionAction::try_from(raw & ACTION_MASK)
        .map_err(|_| GlueError::UnknownMotionAction(raw))?;
    let index = (raw & ACTION_POINTER_INDEX_MASK) >> ACTION_POINTER_INDEX_SHIFT;
    Ok((action, index as usize))
}

/// A key action, as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum KeyAction {
    Down = 0,
    Up = 1,
    Multiple = 2,
}

impl KeyAction {
    pub fn from_raw(raw: u32) -> Result<Self> {
        KeyAction::try_from(raw).map_err(|_| GlueError::UnknownKeyAction(raw))
    }
}

/// Gamepad axis identifiers, matching the platform `AXIS_*` values
pub mod axis {
    pub const X: u32 = 0;
    pub const Y: u32 = 1;
    pub const Z: u32 = 11;
    pub const RX: u32 = 12;
    pub const RY: u32 = 13;
    pub const RZ: u32 = 14;
    pub const HAT_X: u32 = 15;
    pub const HAT_Y: u32 = 16;
    pub const LTRIGGER: u32 = 17;
    pub const RTRIGGER: u32 = 18;
    pub const GAS: u32 = 22;
    pub const BRAKE: u32 = 23;

    /// The axes polled from gamepad motion events
    pub const GAMEPAD: &[u32] = &[
        X, Y, Z, RX, RY, RZ, HAT_X, HAT_Y, LTRIGGER, RTRIGGER, GAS, BRAKE,
    ];
}

/// The phase of a single contact reported to the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer update as seen by the native engine.
///
/// `touch_id` is stable from `Down` through `Move`s to `Up`/`Cancel` for the
/// same physical contact, and is never `0` (which the engine reserves for
/// "no touch").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub touch_id: u32,
    pub x: f32,
    pub y: f32,
    pub action: PointerAction,
    pub source: PointerSource,
    /// Number of pointers reported in the same batch
    pub group_size: usize,
    /// Event time in nanoseconds
    pub timestamp: i64,
    pub meta_state: MetaState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub key_code: u32,
    pub meta_state: MetaState,
    /// Set for presses that arrive while the key is already held
    pub repeat: bool,
    /// The key is a gamepad/dpad button rather than a keyboard key
    pub gamepad: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadAxisEvent {
    pub device_id: i32,
    pub axis: u32,
    pub value: f32,
    pub timestamp: i64,
}

/// A single pointer within a [`MotionSample`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Platform pointer id, starting from `0`
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
}

/// A motion event as delivered to the UI thread, before translation
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSample {
    pub action: MotionAction,
    /// Index into `pointers` of the pointer that went up or down
    pub action_index: usize,
    pub source: Source,
    pub device_id: i32,
    pub timestamp: i64,
    pub meta_state: MetaState,
    pub pointers: Vec<PointerSample>,
    /// `(axis, value)` pairs for joystick/gamepad sources
    pub axes: Vec<(u32, f32)>,
}

impl MotionSample {
    pub fn new(action: MotionAction, source: Source) -> Self {
        Self {
            action,
            action_index: 0,
            source,
            device_id: 0,
            timestamp: 0,
            meta_state: MetaState::empty(),
            pointers: Vec::new(),
            axes: Vec::new(),
        }
    }

    pub fn pointer(mut self, pointer_id: i32, x: f32, y: f32) -> Self {
        self.pointers.push(PointerSample { pointer_id, x, y });
        self
    }

    pub fn action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn axis(mut self, axis: u32, value: f32) -> Self {
        self.axes.push((axis, value));
        self
    }

    pub fn device(mut self, device_id: i32) -> Self {
        self.device_id = device_id;
        self
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn meta(mut self, meta_state: MetaState) -> Self {
        self.meta_state = meta_state;
        self
    }
}

/// A key event as delivered to the UI thread, before translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySample {
    pub action: KeyAction,
    pub key_code: u32,
    pub source: Source,
    pub meta_state: MetaState,
    pub repeat_count: u32,
}

impl KeySample {
    pub fn new(action: KeyAction, key_code: u32, source: Source) -> Self {
        Self {
            action,
            key_code,
            source,
            meta_state: MetaState::empty(),
            repeat_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pointer_index_from_raw_action() {
        // ACTION_POINTER_UP for the pointer at index 2
        let (action, index) = decode_motion_action(0x0206).unwrap();
        assert_eq!(action, MotionAction::PointerUp);
        assert_eq!(index, 2);

        assert!(matches!(
            decode_motion_action(0x00ee),
            Err(GlueError::UnknownMotionAction(0xee))
        ));
    }

    #[test]
    fn classifies_sources() {
        assert_eq!(
            PointerSource::from(Source::TOUCHSCREEN),
            PointerSource::Touchscreen
        );
        assert_eq!(PointerSource::from(Source::MOUSE), PointerSource::Mouse);
        assert_eq!(
            PointerSource::from(Source::JOYSTICK | Source::GAMEPAD),
            PointerSource::Joystick
        );
        assert_eq!(PointerSource::from(Source::STYLUS), PointerSource::Pointer);
        assert_eq!(PointerSource::from(Source::KEYBOARD), PointerSource::Unknown);

        assert!((Source::GAMEPAD | Source::KEYBOARD).is_gamepad());
        assert!(!Source::KEYBOARD.is_gamepad());
    }
}
