mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use surface_glue::input::{
    axis, KeyAction, KeySample, MotionAction, MotionSample, PointerAction, Source,
};
use surface_glue::{
    ConfigRef, ConsumerThread, GlueConfig, Host, LifecycleEvent, LifecycleListener, NullHost,
    SurfaceHandle, SurfaceView,
};

use common::{init_logging, Recorder, Seen};

const SURFACE: SurfaceHandle = SurfaceHandle::from_raw(0x51);

fn touch(action: MotionAction) -> MotionSample {
    MotionSample::new(action, Source::TOUCHSCREEN)
}

#[test]
fn touches_are_translated_and_cancelled_on_destroy() {
    init_logging();
    let view = SurfaceView::new(Arc::new(NullHost), ConfigRef::default());
    let (engine, seen) = Recorder::new();
    let consumer =
        ConsumerThread::spawn(view.queue().clone(), view.config().clone(), engine).unwrap();

    view.surface_created(SURFACE);
    view.surface_changed(SURFACE, 1280, 720);

    assert!(view.on_touch(&touch(MotionAction::Down).pointer(0, 10.0, 20.0)));
    assert!(view.on_touch(
        &touch(MotionAction::PointerDown)
            .pointer(0, 10.0, 20.0)
            .pointer(1, 30.0, 40.0)
            .action_index(1)
    ));
    assert!(view.on_touch(
        &touch(MotionAction::PointerUp)
            .pointer(0, 10.0, 20.0)
            .pointer(1, 31.0, 41.0)
            .action_index(1)
    ));
    view.surface_destroyed(SURFACE);

    consumer.stop().unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Seen::Created(SURFACE),
            Seen::Changed(SURFACE, 1280, 720),
            Seen::Pointer(PointerAction::Down, 1, 10.0, 20.0),
            Seen::Pointer(PointerAction::Down, 2, 30.0, 40.0),
            Seen::Pointer(PointerAction::Up, 2, 31.0, 41.0),
            Seen::Pointer(PointerAction::Cancel, 1, 10.0, 20.0),
            Seen::Destroyed,
        ]
    );
}

#[test]
fn touches_are_cancelled_before_replaced_surface_is_destroyed() {
    init_logging();
    let replacement = SurfaceHandle::from_raw(0x52);
    let view = SurfaceView::new(Arc::new(NullHost), ConfigRef::default());
    let (engine, seen) = Recorder::new();
    let consumer =
        ConsumerThread::spawn(view.queue().clone(), view.config().clone(), engine).unwrap();

    view.surface_created(SURFACE);
    view.surface_changed(SURFACE, 100, 100);
    assert!(view.on_touch(&touch(MotionAction::Down).pointer(0, 5.0, 6.0)));
    // No destroy for the first surface
    view.surface_created(replacement);
    view.surface_destroyed(replacement);

    consumer.stop().unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Seen::Created(SURFACE),
            Seen::Changed(SURFACE, 100, 100),
            Seen::Pointer(PointerAction::Down, 1, 5.0, 6.0),
            Seen::Pointer(PointerAction::Cancel, 1, 5.0, 6.0),
            Seen::Destroyed,
            Seen::Created(replacement),
            Seen::Destroyed,
        ]
    );
}

#[test]
fn keys_and_axes_are_deduplicated() {
    init_logging();
    let config = ConfigRef::new(GlueConfig {
        max_key_code: 128,
        ..GlueConfig::default()
    });
    let view = SurfaceView::new(Arc::new(NullHost), config);
    let (engine, seen) = Recorder::new();
    let consumer =
        ConsumerThread::spawn(view.queue().clone(), view.config().clone(), engine).unwrap();

    let down = KeySample::new(KeyAction::Down, 62, Source::KEYBOARD);
    assert!(view.on_key(&down));
    assert!(view.on_key(&down));
    assert!(view.on_key(&KeySample::new(KeyAction::Up, 62, Source::KEYBOARD)));
    assert!(!view.on_key(&KeySample::new(KeyAction::Down, 200, Source::KEYBOARD)));

    let stick = |x: f32| {
        MotionSample::new(MotionAction::Move, Source::JOYSTICK)
            .device(3)
            .axis(axis::X, x)
    };
    assert!(view.on_generic_motion(&stick(0.25)));
    assert!(view.on_generic_motion(&stick(0.25)));
    assert!(view.on_generic_motion(&stick(-0.5)));
    view.post(9, 99);

    view.queue().wait_until_drained();
    consumer.stop().unwrap();

    let seen = seen.lock().unwrap();
    let keys: Vec<_> = seen
        .iter()
        .filter_map(|s| match s {
            Seen::Key(event) => Some((event.action, event.key_code)),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec![(KeyAction::Down, 62), (KeyAction::Up, 62)]);

    let axes: Vec<_> = seen
        .iter()
        .filter_map(|s| match s {
            Seen::Axis(axis, value) => Some((*axis, *value)),
            _ => None,
        })
        .collect();
    assert_eq!(axes, vec![(axis::X, 0.25), (axis::X, -0.5)]);
    assert_eq!(seen.last(), Some(&Seen::Posted(9, 99)));
}

#[test]
fn lifecycle_reaches_listeners_and_engine() {
    init_logging();

    struct LockedHost;
    impl Host for LockedHost {
        fn is_screen_locked(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct Paused(AtomicUsize);
    impl LifecycleListener for Paused {
        fn on_pause(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let view = SurfaceView::new(Arc::new(LockedHost), ConfigRef::default());
    let listener = Arc::new(Paused::default());
    let id = view.listeners().add(listener.clone());

    let (engine, seen) = Recorder::new();
    let consumer =
        ConsumerThread::spawn(view.queue().clone(), view.config().clone(), engine).unwrap();

    view.on_resume();
    view.on_pause();
    assert!(view.listeners().remove(id));
    view.on_pause();
    view.on_destroy();

    assert_eq!(listener.0.load(Ordering::SeqCst), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Seen::Lifecycle(LifecycleEvent::Resume),
            Seen::Lifecycle(LifecycleEvent::Pause {
                screen_locked: true
            }),
            Seen::Lifecycle(LifecycleEvent::Pause {
                screen_locked: true
            }),
            Seen::Lifecycle(LifecycleEvent::Destroy),
        ]
    );
    consumer.stop().unwrap();
}
