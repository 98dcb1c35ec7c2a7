//! The hosting environment, passed explicitly into the glue instead of being
//! looked up through process-wide singletons.

/// The orientation the hosting activity asked for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
}

impl Orientation {
    /// Whether a surface of the given size is consistent with this orientation.
    ///
    /// Some devices briefly report the surface with the wrong aspect while the
    /// lock screen is shown, before reporting the real dimensions.
    pub fn accepts(&self, width: u32, height: u32) -> bool {
        match self {
            Orientation::Unspecified => true,
            Orientation::Portrait => width <= height,
            Orientation::Landscape => width >= height,
        }
    }
}

/// Queries and hooks the glue needs from the platform UI toolkit.
///
/// All methods are called on the UI (producer) thread.
pub trait Host: Send + Sync {
    fn requested_orientation(&self) -> Orientation {
        Orientation::Unspecified
    }

    /// Whether the screen is currently locked, reported along with pause
    fn is_screen_locked(&self) -> bool {
        false
    }

    /// Called after a resize has been processed by the consumer thread, for
    /// layout work that depends on the native side seeing the new size
    fn surface_resized(&self, _width: u32, _height: u32) {}
}

/// A [`Host`] with no orientation preference and no hooks
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl Host for NullHost {}
