//! User-tunable settings and the store that owns them.
//!
//! The store is an explicit context object: the application root creates one
//! [`SettingsStore`], hands `&Settings` to whatever needs to read it, and
//! routes every change through [`SettingsStore::update`]. An update merges a
//! [`SettingsPatch`], persists the result, and synchronously notifies every
//! subscriber, so the next frame already sees the new values.
//!
//! Persisted settings are a flat camelCase JSON object. Loading merges the
//! stored object key by key over the defaults, so unknown keys are ignored
//! and missing or malformed keys keep their default.
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let mut settings = SettingsStore::new(StoredSettings::new(store));
//! settings.update(SettingsPatch { animation_speed: Some(1.5), ..Default::default() });
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SettingsError;
use crate::storage::BlobStore;

/// Key the settings blob is stored under.
pub const SETTINGS_KEY: &str = "atomic-settings";

pub const ANIMATION_SPEED_RANGE: (f32, f32) = (0.5, 2.0);
pub const QUANTUM_INTENSITY_RANGE: (f32, f32) = (0.5, 1.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomMode {
    #[default]
    Realistic,
    Simplified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LoggingLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LoggingLevel::Debug => log::LevelFilter::Debug,
            LoggingLevel::Info => log::LevelFilter::Info,
            LoggingLevel::Warn => log::LevelFilter::Warn,
            LoggingLevel::Error => log::LevelFilter::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    #[default]
    Bohr,
    Quantum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub language: String,
    pub logging_level: LoggingLevel,
    /// Global animation time multiplier in `[0.5, 2]`.
    pub animation_speed: f32,
    pub atom_mode: AtomMode,
    pub enable_logging: bool,
    pub visualization_mode: VisualizationMode,
    /// Quantum field intensity in `[0.5, 1.5]`.
    pub quantum_animation_intensity: f32,
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "en".to_string(),
            logging_level: LoggingLevel::Info,
            animation_speed: 1.0,
            atom_mode: AtomMode::Realistic,
            enable_logging: true,
            visualization_mode: VisualizationMode::Bohr,
            quantum_animation_intensity: 1.0,
            reduced_motion: false,
        }
    }
}

fn clamp_or(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl Settings {
    /// Force numeric fields into their documented ranges.
    pub fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        self.animation_speed = clamp_or(self.animation_speed, ANIMATION_SPEED_RANGE, defaults.animation_speed);
        self.quantum_animation_intensity = clamp_or(
            self.quantum_animation_intensity,
            QUANTUM_INTENSITY_RANGE,
            defaults.quantum_animation_intensity,
        );
        if self.language.trim().is_empty() {
            self.language = defaults.language;
        }
        self
    }

    /// `0.5` under reduced motion, `1.0` otherwise.
    #[inline]
    pub fn motion_damping(&self) -> f32 {
        if self.reduced_motion {
            0.5
        } else {
            1.0
        }
    }

    /// Merge a stored JSON object over the defaults, key by key.
    ///
    /// Keys `Settings` does not know are dropped. A known key whose value
    /// does not deserialize keeps the default value.
    pub fn merged_over_defaults(stored: &Value) -> Settings {
        let defaults = Settings::default();
        let (Ok(Value::Object(mut merged)), Value::Object(stored)) = (serde_json::to_value(&defaults), stored) else {
            return defaults;
        };

        for (key, value) in stored {
            if !merged.contains_key(key) {
                log::debug!(target: "settings", "ignoring unknown settings key {:?}", key);
                continue;
            }
            let previous = merged.insert(key.clone(), value.clone());
            if serde_json::from_value::<Settings>(Value::Object(merged.clone())).is_err() {
                log::warn!(target: "settings", "stored value for {:?} is invalid, keeping default", key);
                if let Some(previous) = previous {
                    merged.insert(key.clone(), previous);
                }
            }
        }

        serde_json::from_value::<Settings>(Value::Object(merged))
            .map(Settings::sanitized)
            .unwrap_or(defaults)
    }
}

/// A partial update: every `Some` field replaces the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub logging_level: Option<LoggingLevel>,
    pub animation_speed: Option<f32>,
    pub atom_mode: Option<AtomMode>,
    pub enable_logging: Option<bool>,
    pub visualization_mode: Option<VisualizationMode>,
    pub quantum_animation_intensity: Option<f32>,
    pub reduced_motion: Option<bool>,
}

impl SettingsPatch {
    pub fn apply_to(&self, settings: &Settings) -> Settings {
        let mut next = settings.clone();
        if let Some(v) = self.theme {
            next.theme = v;
        }
        if let Some(v) = &self.language {
            next.language = v.clone();
        }
        if let Some(v) = self.logging_level {
            next.logging_level = v;
        }
        if let Some(v) = self.animation_speed {
            next.animation_speed = v;
        }
        if let Some(v) = self.atom_mode {
            next.atom_mode = v;
        }
        if let Some(v) = self.enable_logging {
            next.enable_logging = v;
        }
        if let Some(v) = self.visualization_mode {
            next.visualization_mode = v;
        }
        if let Some(v) = self.quantum_animation_intensity {
            next.quantum_animation_intensity = v;
        }
        if let Some(v) = self.reduced_motion {
            next.reduced_motion = v;
        }
        next.sanitized()
    }

    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

/// Where settings are loaded from and saved to.
pub trait SettingsProvider {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Settings>, SettingsError>;
    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings persisted as JSON in a [`BlobStore`] under [`SETTINGS_KEY`].
#[derive(Debug, Clone, Default)]
pub struct StoredSettings<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> StoredSettings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: BlobStore> SettingsProvider for StoredSettings<S> {
    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        let Some(raw) = self.store.get(SETTINGS_KEY)? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&raw)?;
        Ok(Some(Settings::merged_over_defaults(&value)))
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_KEY, &json)?;
        Ok(())
    }
}

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Settings)>;

/// Owner of the live [`Settings`] value.
pub struct SettingsStore<P: SettingsProvider> {
    provider: P,
    state: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<P: SettingsProvider> SettingsStore<P> {
    /// Load persisted settings over the defaults. Load failures are logged
    /// and fall back to defaults.
    pub fn new(provider: P) -> Self {
        let state = match provider.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!(target: "settings", "{}; using defaults", e);
                Settings::default()
            }
        };
        Self {
            provider,
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Merge `patch`, persist, and notify subscribers.
    ///
    /// A failed save is logged; the in-memory value still changes.
    pub fn update(&mut self, patch: SettingsPatch) -> &Settings {
        let next = patch.apply_to(&self.state);
        self.commit(next)
    }

    /// Replace the whole settings value.
    pub fn replace(&mut self, settings: Settings) -> &Settings {
        self.commit(settings.sanitized())
    }

    fn commit(&mut self, next: Settings) -> &Settings {
        self.state = next;
        if let Err(e) = self.provider.save(&self.state) {
            log::error!(target: "settings", "failed to persist settings: {}", e);
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
        &self.state
    }

    /// Register a listener. It is called right away with the current value
    /// and again after every update.
    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&Settings) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        listener(&self.state);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with(json: &str) -> StoredSettings<MemoryStore> {
        let mut mem = MemoryStore::new();
        mem.set(SETTINGS_KEY, json).unwrap();
        StoredSettings::new(mem)
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let store = SettingsStore::new(StoredSettings::new(MemoryStore::new()));
        assert_eq!(*store.settings(), Settings::default());
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["animationSpeed"], 1.0);
        assert_eq!(json["visualizationMode"], "bohr");
        assert_eq!(json["atomMode"], "realistic");
        assert_eq!(json["quantumAnimationIntensity"], 1.0);
        assert_eq!(json["reducedMotion"], false);
    }

    #[test]
    fn test_stored_values_win_key_by_key() {
        let store = SettingsStore::new(store_with(r#"{"theme":"dark","animationSpeed":1.5}"#));
        let s = store.settings();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.animation_speed, 1.5);
        assert_eq!(s.language, "en");
        assert_eq!(s.visualization_mode, VisualizationMode::Bohr);
    }

    #[test]
    fn test_unknown_and_invalid_keys_fall_back() {
        let store = SettingsStore::new(store_with(
            r#"{"theme":"neon","futureFlag":true,"atomMode":"simplified","animationSpeed":"fast"}"#,
        ));
        let s = store.settings();
        assert_eq!(s.theme, Theme::System);
        assert_eq!(s.atom_mode, AtomMode::Simplified);
        assert_eq!(s.animation_speed, 1.0);
    }

    #[test]
    fn test_corrupt_blob_uses_defaults() {
        let store = SettingsStore::new(store_with("{not json"));
        assert_eq!(*store.settings(), Settings::default());
    }

    #[test]
    fn test_ranges_are_clamped() {
        let mut store = SettingsStore::new(StoredSettings::new(MemoryStore::new()));
        store.update(SettingsPatch {
            animation_speed: Some(9.0),
            quantum_animation_intensity: Some(0.1),
            ..Default::default()
        });
        assert_eq!(store.settings().animation_speed, 2.0);
        assert_eq!(store.settings().quantum_animation_intensity, 0.5);
        store.update(SettingsPatch {
            animation_speed: Some(f32::NAN),
            ..Default::default()
        });
        assert_eq!(store.settings().animation_speed, 1.0);
    }

    #[test]
    fn test_update_round_trip_through_persistence() {
        let mut store = SettingsStore::new(StoredSettings::new(MemoryStore::new()));
        store.update(SettingsPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        let before = store.settings().clone();
        store.update(SettingsPatch {
            animation_speed: Some(1.5),
            ..Default::default()
        });

        let reloaded = SettingsStore::new(store.into_provider());
        let after = reloaded.settings();
        assert_eq!(after.animation_speed, 1.5);
        assert_eq!(Settings { animation_speed: 1.5, ..before }, *after);
    }

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let mut store = SettingsStore::new(StoredSettings::new(MemoryStore::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = store.subscribe(move |s| sink.borrow_mut().push(s.animation_speed));
        assert_eq!(*seen.borrow(), vec![1.0]);

        store.update(SettingsPatch {
            animation_speed: Some(0.5),
            ..Default::default()
        });
        assert_eq!(*seen.borrow(), vec![1.0, 0.5]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.update(SettingsPatch {
            animation_speed: Some(2.0),
            ..Default::default()
        });
        assert_eq!(seen.borrow().len(), 2);
    }

    struct FailingProvider;

    impl SettingsProvider for FailingProvider {
        fn load(&self) -> Result<Option<Settings>, SettingsError> {
            Err(StorageError::NoLocation.into())
        }

        fn save(&mut self, _: &Settings) -> Result<(), SettingsError> {
            Err(StorageError::NoLocation.into())
        }
    }

    #[test]
    fn test_persistence_failures_are_not_fatal() {
        let mut store = SettingsStore::new(FailingProvider);
        assert_eq!(*store.settings(), Settings::default());
        let updated = store.update(SettingsPatch {
            reduced_motion: Some(true),
            ..Default::default()
        });
        assert!(updated.reduced_motion);
    }

    #[test]
    fn test_patch_deserializes_partially() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"reducedMotion":true}"#).unwrap();
        assert_eq!(patch.reduced_motion, Some(true));
        assert!(patch.theme.is_none());
        assert!(SettingsPatch::default().is_empty());
    }
}
