//! Per-view input state used to turn platform samples into the event stream
//! the native engine expects.

use std::collections::{HashMap, HashSet};

use super::{
    GamepadAxisEvent, KeyAction, KeyEvent, KeySample, MotionAction, MotionSample, PointerAction,
    PointerEvent, PointerSample, PointerSource, Source,
};

// Touch id 0 means "no touch" to the engine so platform pointer ids are shifted
fn touch_id_for_pointer_id(pointer_id: i32) -> u32 {
    (pointer_id as u32).wrapping_add(1)
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    touch_id: u32,
    x: f32,
    y: f32,
    source: PointerSource,
}

/// Tracks which contacts are currently down so that each touch id follows a
/// strict down -> move* -> up/cancel sequence.
#[derive(Debug, Default)]
pub struct PointerTracker {
    active: Vec<Contact>,
    last_timestamp: i64,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, touch_id: u32) -> bool {
        self.active.iter().any(|c| c.touch_id == touch_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Translate one motion sample into zero or more pointer events.
    ///
    /// `Move` and `Cancel` report every pointer in the sample (only the
    /// primary one when `multitouch` is off), while the down/up family only
    /// reports the pointer at the action index. Without `multitouch` secondary
    /// pointers never go down, but a lift of any tracked contact is reported.
    pub fn translate(&mut self, sample: &MotionSample, multitouch: bool) -> Vec<PointerEvent> {
        let source = PointerSource::from(sample.source);
        if source == PointerSource::Joystick {
            return Vec::new();
        }

        self.last_timestamp = sample.timestamp;
        let mut events = Vec::new();
        match sample.action {
            MotionAction::Move | MotionAction::Cancel => {
                let pointers = if multitouch {
                    &sample.pointers[..]
                } else {
                    &sample.pointers[..sample.pointers.len().min(1)]
                };
                let group_size = pointers.len();
                for pointer in pointers {
                    let touch_id = touch_id_for_pointer_id(pointer.pointer_id);
                    if !self.is_active(touch_id) {
                        log::trace!("Ignoring {:?} for inactive touch {}", sample.action, touch_id);
                        continue;
                    }
                    let action = if sample.action == MotionAction::Move {
                        self.moved(touch_id, pointer);
                        PointerAction::Move
                    } else {
                        self.release(touch_id);
                        PointerAction::Cancel
                    };
                    events.push(Self::event(sample, pointer, source, action, group_size));
                }
            }
            MotionAction::Down | MotionAction::PointerDown => {
                let index = if sample.action == MotionAction::Down {
                    0
                } else if multitouch {
                    sample.action_index
                } else {
                    return events;
                };
                let Some(pointer) = sample.pointers.get(index) else {
                    log::warn!("Pointer index {} out of range for {:?}", index, sample.action);
                    return events;
                };
                let touch_id = touch_id_for_pointer_id(pointer.pointer_id);
                if self.is_active(touch_id) {
                    // The platform never delivered an up for the previous
                    // contact with this id
                    log::warn!("Touch {} reused while still active, cancelling it", touch_id);
                    events.push(Self::event(sample, pointer, source, PointerAction::Cancel, 1));
                    self.moved(touch_id, pointer);
                } else {
                    self.active.push(Contact {
                        touch_id,
                        x: pointer.x,
                        y: pointer.y,
                        source,
                    });
                }
                events.push(Self::event(sample, pointer, source, PointerAction::Down, 1));
            }
            MotionAction::Up | MotionAction::PointerUp => {
                // Always honoured, even without multitouch: the primary
                // contact may be the first one to lift
                let index = if sample.action == MotionAction::Up {
                    0
                } else {
                    sample.action_index
                };
                let Some(pointer) = sample.pointers.get(index) else {
                    log::warn!("Pointer index {} out of range for {:?}", index, sample.action);
                    return events;
                };
                let touch_id = touch_id_for_pointer_id(pointer.pointer_id);
                if self.release(touch_id) {
                    events.push(Self::event(sample, pointer, source, PointerAction::Up, 1));
                } else {
                    log::debug!("Ignoring up for unknown touch {}", touch_id);
                }
            }
            other => {
                log::trace!("Ignoring motion action {:?}", other);
            }
        }
        events
    }

    /// Cancel every active contact at its last known position, for when the
    /// surface goes away underneath them
    pub fn cancel_all(&mut self) -> Vec<PointerEvent> {
        let group_size = self.active.len();
        let timestamp = self.last_timestamp;
        self.active
            .drain(..)
            .map(|contact| PointerEvent {
                touch_id: contact.touch_id,
                x: contact.x,
                y: contact.y,
                action: PointerAction::Cancel,
                source: contact.source,
                group_size,
                timestamp,
                meta_state: Default::default(),
            })
            .collect()
    }

    fn moved(&mut self, touch_id: u32, pointer: &PointerSample) {
        if let Some(contact) = self.active.iter_mut().find(|c| c.touch_id == touch_id) {
            contact.x = pointer.x;
            contact.y = pointer.y;
        }
    }

    fn release(&mut self, touch_id: u32) -> bool {
        if let Some(pos) = self.active.iter().position(|c| c.touch_id == touch_id) {
            self.active.remove(pos);
            true
        } else {
            false
        }
    }

    fn event(
        sample: &MotionSample,
        pointer: &PointerSample,
        source: PointerSource,
        action: PointerAction,
        group_size: usize,
    ) -> PointerEvent {
        PointerEvent {
            touch_id: touch_id_for_pointer_id(pointer.pointer_id),
            x: pointer.x,
            y: pointer.y,
            action,
            source,
            group_size,
            timestamp: sample.timestamp,
            meta_state: sample.meta_state,
        }
    }
}

/// Collapses held keys so the engine sees one down per press
#[derive(Debug, Default)]
pub struct KeyTracker {
    pressed: HashSet<u32>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key_code: u32) -> bool {
        self.pressed.contains(&key_code)
    }

    pub fn translate(
        &mut self,
        sample: &KeySample,
        max_key_code: u32,
        forward_repeats: bool,
    ) -> Option<KeyEvent> {
        if sample.key_code >= max_key_code {
            log::trace!("Ignoring out of range key code {}", sample.key_code);
            return None;
        }

        let repeat = match sample.action {
            KeyAction::Down => {
                let held = !self.pressed.insert(sample.key_code);
                if held && !forward_repeats {
                    return None;
                }
                held || sample.repeat_count > 0
            }
            KeyAction::Up => {
                self.pressed.remove(&sample.key_code);
                false
            }
            KeyAction::Multiple => return None,
        };

        Some(KeyEvent {
            action: sample.action,
            key_code: sample.key_code,
            meta_state: sample.meta_state,
            repeat,
            gamepad: sample.source.is_gamepad(),
        })
    }
}

/// Remembers the last reported value of each gamepad axis so only changes
/// are forwarded
#[derive(Debug, Default)]
pub struct AxisTracker {
    values: HashMap<(i32, u32), f32>,
}

impl AxisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, sample: &MotionSample) -> Vec<GamepadAxisEvent> {
        let is_gamepad =
            sample.source.contains(Source::CLASS_JOYSTICK) || sample.source.is_gamepad();
        if !is_gamepad || sample.action != MotionAction::Move {
            return Vec::new();
        }

        let mut events = Vec::new();
        for &(axis, value) in &sample.axes {
            let last = self.values.insert((sample.device_id, axis), value);
            if last != Some(value) {
                events.push(GamepadAxisEvent {
                    device_id: sample.device_id,
                    axis,
                    value,
                    timestamp: sample.timestamp,
                });
            }
        }
        events
    }

    /// Drop the remembered values for a disconnected device
    pub fn forget_device(&mut self, device_id: i32) {
        self.values.retain(|(device, _), _| *device != device_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::axis;

    fn touch(action: MotionAction) -> MotionSample {
        MotionSample::new(action, Source::TOUCHSCREEN)
    }

    #[test]
    fn single_contact_keeps_its_id() {
        let mut tracker = PointerTracker::new();

        let down = tracker.translate(&touch(MotionAction::Down).pointer(2, 10.0, 20.0), true);
        let moved = tracker.translate(&touch(MotionAction::Move).pointer(2, 12.0, 21.0), true);
        let up = tracker.translate(&touch(MotionAction::Up).pointer(2, 12.0, 21.0), true);

        let seen: Vec<_> = [down, moved, up]
            .concat()
            .into_iter()
            .map(|e| (e.action, e.touch_id, e.x, e.y))
            .collect();
        assert_eq!(
            seen,
            vec![
                (PointerAction::Down, 3, 10.0, 20.0),
                (PointerAction::Move, 3, 12.0, 21.0),
                (PointerAction::Up, 3, 12.0, 21.0),
            ]
        );
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn move_reports_whole_group() {
        let mut tracker = PointerTracker::new();
        tracker.translate(&touch(MotionAction::Down).pointer(0, 1.0, 1.0), true);
        tracker.translate(
            &touch(MotionAction::PointerDown)
                .pointer(0, 1.0, 1.0)
                .pointer(1, 5.0, 5.0)
                .action_index(1),
            true,
        );

        let events = tracker.translate(
            &touch(MotionAction::Move)
                .pointer(0, 2.0, 2.0)
                .pointer(1, 6.0, 6.0),
            true,
        );
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.group_size == 2));
        assert_eq!(events[1].touch_id, 2);

        let single = tracker.translate(
            &touch(MotionAction::Move)
                .pointer(0, 3.0, 3.0)
                .pointer(1, 7.0, 7.0),
            false,
        );
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].group_size, 1);
    }

    #[test]
    fn reused_id_is_cancelled_first() {
        let mut tracker = PointerTracker::new();
        tracker.translate(&touch(MotionAction::Down).pointer(0, 1.0, 1.0), true);

        let events = tracker.translate(&touch(MotionAction::Down).pointer(0, 9.0, 9.0), true);
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![PointerAction::Cancel, PointerAction::Down]);
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn cancel_releases_contacts() {
        let mut tracker = PointerTracker::new();
        tracker.translate(&touch(MotionAction::Down).pointer(4, 1.0, 1.0), true);

        let events = tracker.translate(&touch(MotionAction::Cancel).pointer(4, 1.0, 1.0), true);
        assert_eq!(events[0].action, PointerAction::Cancel);
        assert!(!tracker.is_active(5));

        // An up for a contact that was already cancelled goes nowhere
        assert!(tracker
            .translate(&touch(MotionAction::Up).pointer(4, 1.0, 1.0), true)
            .is_empty());
    }

    #[test]
    fn single_touch_releases_primary_lifted_first() {
        let mut tracker = PointerTracker::new();
        let two_fingers = |action, index| {
            touch(action)
                .pointer(0, 1.0, 1.0)
                .pointer(1, 5.0, 5.0)
                .action_index(index)
        };

        let samples = [
            touch(MotionAction::Down).pointer(0, 1.0, 1.0),
            two_fingers(MotionAction::PointerDown, 1),
            two_fingers(MotionAction::PointerUp, 0),
            touch(MotionAction::Move).pointer(1, 6.0, 6.0),
            touch(MotionAction::Up).pointer(1, 6.0, 6.0),
        ];
        let seen: Vec<_> = samples
            .iter()
            .flat_map(|sample| tracker.translate(sample, false))
            .map(|e| (e.action, e.touch_id))
            .collect();

        assert_eq!(seen, vec![(PointerAction::Down, 1), (PointerAction::Up, 1)]);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn cancel_all_drains_active_set() {
        let mut tracker = PointerTracker::new();
        tracker.translate(&touch(MotionAction::Down).pointer(0, 1.0, 1.0), true);
        tracker.translate(
            &touch(MotionAction::PointerDown)
                .pointer(0, 1.0, 1.0)
                .pointer(3, 2.0, 2.0)
                .action_index(1),
            true,
        );

        tracker.translate(
            &touch(MotionAction::Move)
                .pointer(0, 1.0, 1.0)
                .pointer(3, 8.0, 9.0)
                .at(42),
            true,
        );

        let cancelled = tracker.cancel_all();
        let seen: Vec<_> = cancelled
            .iter()
            .map(|e| (e.touch_id, e.x, e.y, e.timestamp))
            .collect();
        assert_eq!(seen, vec![(1, 1.0, 1.0, 42), (4, 8.0, 9.0, 42)]);
        assert!(cancelled.iter().all(|e| e.action == PointerAction::Cancel));
        assert_eq!(tracker.active_count(), 0);
        assert!(tracker.cancel_all().is_empty());
    }

    #[test]
    fn held_keys_are_collapsed() {
        let mut keys = KeyTracker::new();
        let down = KeySample::new(KeyAction::Down, 30, Source::KEYBOARD);

        assert!(keys.translate(&down, 256, false).is_some());
        assert!(keys.translate(&down, 256, false).is_none());
        let repeated = keys.translate(&down, 256, true).unwrap();
        assert!(repeated.repeat);

        let up = keys
            .translate(&KeySample::new(KeyAction::Up, 30, Source::KEYBOARD), 256, false)
            .unwrap();
        assert_eq!(up.action, KeyAction::Up);
        assert!(!keys.is_pressed(30));

        assert!(keys
            .translate(&KeySample::new(KeyAction::Down, 300, Source::KEYBOARD), 256, false)
            .is_none());
    }

    #[test]
    fn gamepad_buttons_are_flagged() {
        let mut keys = KeyTracker::new();
        let event = keys
            .translate(
                &KeySample::new(KeyAction::Down, 96, Source::GAMEPAD | Source::KEYBOARD),
                256,
                false,
            )
            .unwrap();
        assert!(event.gamepad);
    }

    #[test]
    fn unchanged_axes_are_filtered() {
        let mut axes = AxisTracker::new();
        let sample = MotionSample::new(MotionAction::Move, Source::JOYSTICK)
            .device(7)
            .axis(axis::X, 0.5)
            .axis(axis::Y, 0.0);

        assert_eq!(axes.translate(&sample).len(), 2);
        assert!(axes.translate(&sample).is_empty());

        let moved = MotionSample::new(MotionAction::Move, Source::JOYSTICK)
            .device(7)
            .axis(axis::X, 0.5)
            .axis(axis::Y, -1.0);
        let events = axes.translate(&moved);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].axis, axis::Y);

        axes.forget_device(7);
        assert_eq!(axes.translate(&moved).len(), 2);
    }
}
