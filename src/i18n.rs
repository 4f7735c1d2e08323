//! Localization for the presentation layer.
//!
//! Catalogs are nested JSON objects addressed with dot paths
//! (`"settings.speed"`), embedded at compile time from `locales/`. Missing
//! keys fall back to English, then to the key itself. Values may contain
//! `{{name}}` placeholders filled from the params passed to
//! [`Translate::translate`].
//!
//! The animation engines never translate anything; only UI code does.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::StorageError;
use crate::storage::BlobStore;

/// Key the selected language is stored under.
pub const LANGUAGE_KEY: &str = "atomic-lang";
pub const FALLBACK_LANGUAGE: &str = "en";

const EMBEDDED: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en.json")),
    ("ua", include_str!("../locales/ua.json")),
];

pub trait Translate {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;

    fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }
}

/// Replace `{{name}}` placeholders. Unknown placeholders are left as they are.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = rest[open + 2..open + 2 + close].trim();
        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + 4 + close]),
        }
        rest = &rest[open + 4 + close..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    resources: HashMap<String, Value>,
}

impl Catalog {
    /// All embedded languages, starting in English.
    pub fn new() -> Self {
        let mut resources = HashMap::new();
        for (lang, source) in EMBEDDED {
            match serde_json::from_str::<Value>(source) {
                Ok(value) => {
                    resources.insert(lang.to_string(), value);
                }
                Err(e) => log::error!(target: "i18n", "catalog {} failed to parse: {}", lang, e),
            }
        }
        log::info!(target: "i18n", "loaded {} catalogs", resources.len());
        Self {
            language: FALLBACK_LANGUAGE.to_string(),
            resources,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    pub fn supports(&self, language: &str) -> bool {
        self.resources.contains_key(language)
    }

    /// Switch language. Unsupported languages are refused and the current
    /// one is kept.
    pub fn set_language(&mut self, language: &str) -> bool {
        if !self.supports(language) {
            log::warn!(target: "i18n", "unsupported language {:?}, keeping {:?}", language, self.language);
            return false;
        }
        self.language = language.to_string();
        true
    }

    /// Raw string at `key` in `language`, if present.
    pub fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        let mut node = self.resources.get(language)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let found = self
            .lookup(&self.language, key)
            .or_else(|| self.lookup(FALLBACK_LANGUAGE, key));
        match found {
            Some(template) => interpolate(template, params),
            None => {
                log::error!(target: "i18n", "missing translation for {:?}", key);
                key.to_string()
            }
        }
    }
}

/// A [`Catalog`] whose language choice is persisted under [`LANGUAGE_KEY`].
#[derive(Debug, Clone)]
pub struct Localization<S: BlobStore> {
    catalog: Catalog,
    store: S,
}

impl<S: BlobStore> Localization<S> {
    /// Restore the stored language, or start in English.
    pub fn new(store: S) -> Self {
        let mut catalog = Catalog::new();
        match store.get(LANGUAGE_KEY) {
            Ok(Some(lang)) => {
                catalog.set_language(lang.trim());
            }
            Ok(None) => {}
            Err(e) => log::warn!(target: "i18n", "could not read stored language: {}", e),
        }
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn language(&self) -> &str {
        self.catalog.language()
    }

    /// Switch and persist. Returns `Ok(false)` for unsupported languages.
    pub fn set_language(&mut self, language: &str) -> Result<bool, StorageError> {
        if !self.catalog.set_language(language) {
            return Ok(false);
        }
        self.store.set(LANGUAGE_KEY, language)?;
        Ok(true)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: BlobStore> Translate for Localization<S> {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.catalog.translate(key, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomPreset;
    use crate::storage::MemoryStore;

    #[test]
    fn test_embedded_catalogs() {
        let catalog = Catalog::new();
        assert_eq!(catalog.languages(), vec!["en", "ua"]);
        assert_eq!(catalog.t("nav.home"), "Home");
    }

    #[test]
    fn test_every_preset_has_a_label() {
        let mut catalog = Catalog::new();
        for lang in ["en", "ua"] {
            catalog.set_language(lang);
            for preset in AtomPreset::ALL {
                let key = format!("atom.presets.{}.label", preset.key());
                assert_ne!(catalog.t(&key), key, "{} {}", lang, key);
            }
        }
    }

    #[test]
    fn test_fallback_to_english_then_key() {
        let mut catalog = Catalog::new();
        assert!(catalog.set_language("ua"));
        assert_eq!(catalog.t("nav.home"), "Головна");
        assert_eq!(catalog.t("settings.reducedMotion"), "Reduce motion");
        assert_eq!(catalog.t("no.such.key"), "no.such.key");
        assert_eq!(catalog.t("atom.presets"), "atom.presets");
    }

    #[test]
    fn test_unsupported_language_is_refused() {
        let mut catalog = Catalog::new();
        assert!(!catalog.set_language("xx"));
        assert_eq!(catalog.language(), "en");
    }

    #[test]
    fn test_interpolation() {
        let catalog = Catalog::new();
        let text = catalog.translate("molecule.bond", &[("from", "O"), ("to", "H"), ("strength", "80")]);
        assert_eq!(text, "O–H (80%)");
        assert_eq!(interpolate("{{ a }}-{{b}}", &[("a", "1")]), "1-{{b}}");
        assert_eq!(interpolate("open {{ only", &[]), "open {{ only");
    }

    #[test]
    fn test_language_persists() {
        let mut loc = Localization::new(MemoryStore::new());
        assert_eq!(loc.language(), "en");
        assert!(loc.set_language("ua").unwrap());
        assert!(!loc.set_language("xx").unwrap());

        let store = loc.into_store();
        assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("ua"));
        let restored = Localization::new(store);
        assert_eq!(restored.language(), "ua");
        assert_eq!(restored.t("nav.atom"), "Атом");
    }
}
