//! Per-module logging backend for the [`log`] facade.
//!
//! Every log call in the crate names its module as the `target`
//! (`log::debug!(target: "atom", ...)`). [`ModuleLogger`] keeps a level per
//! target, starting from a fixed table, and a global mute switch driven by
//! [`Settings::enable_logging`].
//!
//! # Example
//!
//! ```ignore
//! atomscope::logging::init();
//! settings.subscribe(|s| atomscope::logging::apply_settings(s));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::settings::Settings;

/// Known targets and their starting levels.
pub const DEFAULT_LEVELS: [(&str, LevelFilter); 10] = [
    ("app", LevelFilter::Info),
    ("layout", LevelFilter::Info),
    ("home", LevelFilter::Debug),
    ("atom", LevelFilter::Debug),
    ("molecule", LevelFilter::Debug),
    ("settings", LevelFilter::Info),
    ("i18n", LevelFilter::Warn),
    ("quantum", LevelFilter::Info),
    ("bond", LevelFilter::Info),
    ("scene", LevelFilter::Info),
];

/// Level for targets missing from the table.
pub const FALLBACK_LEVEL: LevelFilter = LevelFilter::Info;

pub struct ModuleLogger {
    levels: RwLock<HashMap<String, LevelFilter>>,
    enabled: AtomicBool,
}

impl ModuleLogger {
    pub fn new() -> Self {
        let levels = DEFAULT_LEVELS
            .iter()
            .map(|(target, level)| (target.to_string(), *level))
            .collect();
        Self {
            levels: RwLock::new(levels),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn level_for(&self, target: &str) -> LevelFilter {
        let Ok(levels) = self.levels.read() else {
            return FALLBACK_LEVEL;
        };
        levels.get(target).copied().unwrap_or(FALLBACK_LEVEL)
    }

    pub fn set_level(&self, target: &str, level: LevelFilter) {
        if let Ok(mut levels) = self.levels.write() {
            levels.insert(target.to_string(), level);
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self, target: &str, level: Level) -> bool {
        self.enabled.load(Ordering::Relaxed) && level <= self.level_for(target)
    }

    /// Mute everything when logging is off, otherwise put every known
    /// target at `settings.logging_level`.
    pub fn apply_settings(&self, settings: &Settings) {
        self.set_enabled(settings.enable_logging);
        if !settings.enable_logging {
            return;
        }
        let level = settings.logging_level.to_level_filter();
        if let Ok(mut levels) = self.levels.write() {
            for value in levels.values_mut() {
                *value = level;
            }
        }
    }
}

impl Default for ModuleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for ModuleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.is_enabled(metadata.target(), metadata.level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<ModuleLogger> = OnceLock::new();

/// The process-wide logger instance.
pub fn logger() -> &'static ModuleLogger {
    LOGGER.get_or_init(ModuleLogger::new)
}

/// Install [`logger`] as the `log` backend.
///
/// Returns `false` if some other logger was installed first. Calling it
/// again after a successful install is harmless.
pub fn init() -> bool {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.load(Ordering::Acquire) {
        return true;
    }
    match log::set_logger(logger()) {
        Ok(()) => {
            log::set_max_level(LevelFilter::Trace);
            INSTALLED.store(true, Ordering::Release);
            true
        }
        Err(_) => false,
    }
}

pub fn apply_settings(settings: &Settings) {
    logger().apply_settings(settings);
}

pub fn is_enabled(target: &str, level: Level) -> bool {
    logger().is_enabled(target, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LoggingLevel;

    #[test]
    fn test_default_table() {
        let logger = ModuleLogger::new();
        assert!(logger.is_enabled("home", Level::Debug));
        assert!(logger.is_enabled("atom", Level::Debug));
        assert!(!logger.is_enabled("app", Level::Debug));
        assert!(logger.is_enabled("app", Level::Info));
        assert!(!logger.is_enabled("i18n", Level::Info));
        assert!(logger.is_enabled("i18n", Level::Error));
        assert_eq!(logger.level_for("somewhere-else"), FALLBACK_LEVEL);
    }

    #[test]
    fn test_disabled_mutes_everything() {
        let logger = ModuleLogger::new();
        logger.apply_settings(&Settings {
            enable_logging: false,
            ..Settings::default()
        });
        assert!(!logger.is_enabled("app", Level::Error));
        assert!(!logger.is_enabled("home", Level::Error));
    }

    #[test]
    fn test_settings_level_applies_to_every_target() {
        let logger = ModuleLogger::new();
        logger.apply_settings(&Settings {
            logging_level: LoggingLevel::Warn,
            ..Settings::default()
        });
        for (target, _) in DEFAULT_LEVELS {
            assert!(logger.is_enabled(target, Level::Warn));
            assert!(!logger.is_enabled(target, Level::Info));
        }

        logger.apply_settings(&Settings::default());
        assert!(logger.is_enabled("i18n", Level::Info));
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init();
        assert_eq!(init(), first);
    }
}
