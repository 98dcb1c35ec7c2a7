use core::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Tunables for the glue layer.
///
/// Values are read at the point of use, so changes made through a
/// [`ConfigRef`] apply to the next callback without needing to rebuild
/// the view or the consumer thread.
#[derive(Clone, Debug, PartialEq)]
pub struct GlueConfig {
    /// Drop `surface_changed` callbacks whose dimensions match the last
    /// accepted dimensions.
    pub skip_redundant_resize: bool,

    /// When disabled only the primary pointer of a move/cancel batch is
    /// reported.
    pub multitouch: bool,

    /// Key codes at or above this value are not forwarded.
    pub max_key_code: u32,

    /// Forward auto-repeated key downs instead of collapsing them into the
    /// initial press.
    pub forward_key_repeats: bool,

    /// How long the consumer thread sleeps waiting for events before running
    /// a frame anyway. `None` means the consumer only wakes for new events.
    pub frame_interval: Option<Duration>,
}

impl Default for GlueConfig {
    fn default() -> Self {
        Self {
            skip_redundant_resize: true,
            multitouch: true,
            max_key_code: 256,
            forward_key_repeats: false,
            frame_interval: Some(Duration::from_millis(16)),
        }
    }
}

/// A (cheaply clonable) reference to a [`GlueConfig`]
///
/// This provides a thread-safe way to share the latest configuration between
/// the UI thread callbacks and the consumer thread.
///
/// Updates made via [`ConfigRef::replace`] or [`ConfigRef::update`] become
/// visible via pre-existing references.
#[derive(Clone)]
pub struct ConfigRef {
    config: Arc<RwLock<GlueConfig>>,
}

impl PartialEq for ConfigRef {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.config, &other.config) {
            true
        } else {
            let other_guard = other.config.read().unwrap();
            self.config.read().unwrap().eq(&*other_guard)
        }
    }
}

impl fmt::Debug for ConfigRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config.read().unwrap().fmt(f)
    }
}

impl Default for ConfigRef {
    fn default() -> Self {
        Self::new(GlueConfig::default())
    }
}

impl From<GlueConfig> for ConfigRef {
    fn from(config: GlueConfig) -> Self {
        Self::new(config)
    }
}

impl ConfigRef {
    pub fn new(config: GlueConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn replace(&self, src: GlueConfig) {
        log::debug!("Config: {:#?}", src);
        *self.config.write().unwrap() = src;
    }

    /// Modify the shared configuration in place
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut GlueConfig),
    {
        let mut guard = self.config.write().unwrap();
        f(&mut guard);
        log::debug!("Config: {:#?}", *guard);
    }

    /// Returns a copy of the full configuration
    pub fn copy(&self) -> GlueConfig {
        self.config.read().unwrap().clone()
    }

    pub fn skip_redundant_resize(&self) -> bool {
        self.config.read().unwrap().skip_redundant_resize
    }

    pub fn multitouch(&self) -> bool {
        self.config.read().unwrap().multitouch
    }

    pub fn max_key_code(&self) -> u32 {
        self.config.read().unwrap().max_key_code
    }

    pub fn forward_key_repeats(&self) -> bool {
        self.config.read().unwrap().forward_key_repeats
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.config.read().unwrap().frame_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_are_visible_through_clones() {
        let config = ConfigRef::default();
        let other = config.clone();

        config.update(|c| c.multitouch = false);
        assert!(!other.multitouch());

        other.replace(GlueConfig {
            max_key_code: 64,
            ..GlueConfig::default()
        });
        assert_eq!(config.max_key_code(), 64);
        assert!(config.multitouch());
    }

    #[test]
    fn distinct_refs_compare_by_value() {
        let a = ConfigRef::default();
        let b = ConfigRef::new(GlueConfig::default());
        assert_eq!(a, b);

        b.update(|c| c.skip_redundant_resize = false);
        assert_ne!(a, b);
    }
}
