//! Locale-aware text lookup
//!
//! The simulation only ever produces semantic keys with parameters. A
//! [`Translator`] turns them into display text; [`Catalog`] is the bundled
//! implementation backed by TOML tables.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Vi];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_lowercase();
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| SimError::InvalidConfig(format!("unknown locale '{}'", s)))
    }
}

/// Key-to-text lookup shared by all evaluation threads
pub trait Translator: Send + Sync {
    /// Never fails; unknown keys come back as the key itself
    fn translate(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> String;
}

/// Replace `{name}` placeholders
pub fn fill_template(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

const BUILTIN_EN: &[(&str, &str)] = &[
    ("narrative.wandering", "A {species} wanders nearby."),
    ("narrative.hunting", "A {species} stalks toward you."),
    ("narrative.fleeing", "A {species} bolts away in fright."),
    ("narrative.foraging", "A {species} grazes on the undergrowth."),
    ("narrative.regrouping", "A {species} hurries to rejoin its pack."),
    ("narrative.defending", "A {species} bristles, ready to defend itself."),
    ("narrative.attack", "The {species} strikes you for {damage} damage!"),
    ("event.birth", "A {species} appears in the wild."),
    ("event.death_starvation", "A {species} has starved to death."),
    ("event.death_predation", "A {predator} has brought down a {species}."),
    ("event.chase_started", "A {species} begins a chase."),
    ("event.pack_separation", "A pack is scattering across the land."),
    ("event.member_lost", "A {species} has lost its pack."),
];

const BUILTIN_VI: &[(&str, &str)] = &[
    ("narrative.wandering", "Một con {species} lang thang gần đó."),
    ("narrative.hunting", "Một con {species} đang rình rập tiến về phía bạn."),
    ("narrative.fleeing", "Một con {species} hoảng sợ bỏ chạy."),
    ("narrative.foraging", "Một con {species} đang gặm cỏ."),
    ("narrative.regrouping", "Một con {species} vội vã quay về đàn."),
    ("narrative.defending", "Một con {species} xù lông, sẵn sàng tự vệ."),
    ("narrative.attack", "Con {species} tấn công bạn, gây {damage} sát thương!"),
    ("event.birth", "Một con {species} xuất hiện giữa hoang dã."),
    ("event.death_starvation", "Một con {species} đã chết đói."),
    ("event.death_predation", "Một con {predator} đã hạ gục một con {species}."),
    ("event.chase_started", "Một con {species} bắt đầu cuộc rượt đuổi."),
    ("event.pack_separation", "Một bầy đàn đang tản mác khắp nơi."),
    ("event.member_lost", "Một con {species} đã lạc khỏi đàn."),
];

/// Translation tables per locale
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: AHashMap<Locale, AHashMap<String, String>>,
}

impl Catalog {
    /// Empty catalog; every lookup falls back to the key
    pub fn new() -> Self {
        Self::default()
    }

    /// English and Vietnamese texts for every key the engine emits
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (locale, entries) in [(Locale::En, BUILTIN_EN), (Locale::Vi, BUILTIN_VI)] {
            for (key, template) in entries {
                catalog.insert(locale, *key, *template);
            }
        }
        catalog
    }

    pub fn insert(&mut self, locale: Locale, key: impl Into<String>, template: impl Into<String>) {
        self.tables
            .entry(locale)
            .or_default()
            .insert(key.into(), template.into());
    }

    /// Overlay TOML tables (`[en]`, `[vi]`) on the built-in texts
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document: BTreeMap<String, BTreeMap<String, String>> = toml::from_str(content)?;
        let mut catalog = Self::builtin();
        for (code, entries) in document {
            let locale: Locale = code.parse()?;
            for (key, template) in entries {
                catalog.insert(locale, key, template);
            }
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

impl Translator for Catalog {
    fn translate(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> String {
        match self.get(locale, key).or_else(|| self.get(Locale::En, key)) {
            Some(template) => fill_template(template, params),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fills_params() {
        let catalog = Catalog::builtin();
        let text = catalog.translate(Locale::En, "narrative.hunting", &[("species", "wolf")]);
        assert_eq!(text, "A wolf stalks toward you.");

        let vi = catalog.translate(Locale::Vi, "narrative.hunting", &[("species", "sói")]);
        assert!(vi.contains("sói"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.translate(Locale::Vi, "no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn test_every_english_key_has_vietnamese_text() {
        let catalog = Catalog::builtin();
        for (key, _) in BUILTIN_EN {
            assert!(catalog.get(Locale::Vi, key).is_some(), "missing vi text for {}", key);
        }
    }

    #[test]
    fn test_toml_overrides_builtin() {
        let catalog = Catalog::from_toml_str(
            r#"
            [en]
            "narrative.fleeing" = "The {species} scarpers."
            "#,
        )
        .unwrap();

        assert_eq!(
            catalog.translate(Locale::En, "narrative.fleeing", &[("species", "hare")]),
            "The hare scarpers."
        );
        // Untouched keys keep the built-in text
        assert!(catalog.get(Locale::En, "narrative.hunting").is_some());
    }

    #[test]
    fn test_toml_rejects_unknown_locale() {
        let result = Catalog::from_toml_str("[fr]\n\"narrative.hunting\" = \"Un loup\"\n");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(" VI ".parse::<Locale>().unwrap(), Locale::Vi);
        assert!("de".parse::<Locale>().is_err());
    }
}
