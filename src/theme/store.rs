//! Theme store: style resolution through a strict cascade.
//!
//! `instance override > active theme (kind entry, then *) > kind default > global fallback`.
//! Loading themes and switching the active one are the only mutations; both
//! report which keys changed so the caller can restyle registered widgets.

use std::collections::{BTreeMap, HashMap};

use crate::config::value::Value;
use crate::error::{Error, Result};
use crate::widget::kind::{KeySpec, WidgetKind};

use super::{defaults, parser};

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// What a theme entry applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    /// `*`: every kind.
    Any,
    Kind(WidgetKind),
}

impl Selector {
    fn label(self) -> String {
        match self {
            Selector::Any => "*".to_string(),
            Selector::Kind(kind) => kind.name().to_string(),
        }
    }
}

/// A named set of style overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Theme {
    name: String,
    entries: BTreeMap<(Selector, String), Value>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entry (builder).
    pub fn with(mut self, selector: Selector, key: &str, value: impl Into<Value>) -> Self {
        self.insert(selector, key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, selector: Selector, key: String, value: Value) {
        self.entries.insert((selector, key), value);
    }

    /// The entry stored for exactly this selector.
    pub fn get(&self, selector: Selector, key: &str) -> Option<&Value> {
        self.entries.get(&(selector, key.to_string()))
    }

    /// The value this theme gives `kind`: its own entry, else the `*` entry.
    pub fn lookup(&self, kind: WidgetKind, key: &str) -> Option<&Value> {
        self.get(Selector::Kind(kind), key)
            .or_else(|| self.get(Selector::Any, key))
    }

    pub fn entries(&self) -> impl Iterator<Item = (Selector, &str, &Value)> {
        self.entries.iter().map(|((s, k), v)| (*s, k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Which layer of the cascade produced a resolved value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Instance,
    Theme,
    KindDefault,
    Fallback,
}

// ---------------------------------------------------------------------------
// ThemeStore
// ---------------------------------------------------------------------------

/// Kind defaults, fallbacks and named themes, plus the active theme name.
#[derive(Debug)]
pub struct ThemeStore {
    kind_defaults: HashMap<(WidgetKind, String), Value>,
    fallbacks: HashMap<String, Value>,
    themes: BTreeMap<String, Theme>,
    active: Option<String>,
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeStore {
    /// A store with the built-in tables and the `light` and `dark` themes.
    /// No theme is active yet.
    pub fn new() -> Self {
        let mut store = Self::empty();
        store.fallbacks = defaults::fallbacks()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        store.kind_defaults = defaults::kind_defaults()
            .into_iter()
            .map(|(kind, k, v)| ((kind, k.to_string()), v))
            .collect();
        for theme in [defaults::light(), defaults::dark()] {
            store.themes.insert(theme.name().to_string(), theme);
        }
        store
    }

    /// A store with no defaults, fallbacks or themes.
    pub fn empty() -> Self {
        Self {
            kind_defaults: HashMap::new(),
            fallbacks: HashMap::new(),
            themes: BTreeMap::new(),
            active: None,
        }
    }

    /// Add a kind default (builder, for stores assembled by hand).
    pub fn with_kind_default(mut self, kind: WidgetKind, key: &str, value: impl Into<Value>) -> Self {
        self.kind_defaults.insert((kind, key.to_string()), value.into());
        self
    }

    /// Add a global fallback (builder).
    pub fn with_fallback(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fallbacks.insert(key.to_string(), value.into());
        self
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Resolve `key` for a widget of `kind` with the given instance overrides.
    pub fn resolve(&self, kind: WidgetKind, key: &str, overrides: &BTreeMap<String, Value>) -> Result<Value> {
        self.resolve_with_source(kind, key, overrides)
            .map(|(value, _)| value)
    }

    /// Like [`resolve`](Self::resolve), also naming the layer that answered.
    pub fn resolve_with_source(
        &self,
        kind: WidgetKind,
        key: &str,
        overrides: &BTreeMap<String, Value>,
    ) -> Result<(Value, Source)> {
        if let Some(v) = overrides.get(key) {
            return Ok((v.clone(), Source::Instance));
        }
        self.resolve_default(kind, key)
    }

    /// Resolution without instance overrides.
    pub fn resolve_default(&self, kind: WidgetKind, key: &str) -> Result<(Value, Source)> {
        if let Some(v) = self.active_theme().and_then(|t| t.lookup(kind, key)) {
            return Ok((v.clone(), Source::Theme));
        }
        if let Some(v) = self.kind_defaults.get(&(kind, key.to_string())) {
            return Ok((v.clone(), Source::KindDefault));
        }
        if let Some(v) = self.fallbacks.get(key) {
            return Ok((v.clone(), Source::Fallback));
        }
        Err(Error::StyleKeyUnknown {
            selector: kind.name().to_string(),
            key: key.to_string(),
        })
    }

    // ── Themes ───────────────────────────────────────────────────────

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_theme(&self) -> Option<&Theme> {
        self.active.as_ref().and_then(|n| self.themes.get(n))
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Check every entry's key and value type against the schemas.
    pub fn validate(&self, theme: &Theme) -> Result<()> {
        for (selector, key, value) in theme.entries() {
            let specs: Vec<&KeySpec> = match selector {
                Selector::Kind(kind) => kind.spec(key).into_iter().collect(),
                Selector::Any => WidgetKind::ALL.iter().filter_map(|k| k.spec(key)).collect(),
            };
            let known = !specs.is_empty() || self.fallbacks.contains_key(key);
            if !known {
                return Err(Error::StyleKeyUnknown {
                    selector: selector.label(),
                    key: key.to_string(),
                });
            }
            if let Some(spec) = specs.iter().find(|s| !s.ty.accepts(value)) {
                return Err(Error::InvalidConfigValue {
                    key: key.to_string(),
                    expected: spec.ty.name(),
                    found: value.type_name(),
                });
            }
        }
        Ok(())
    }

    /// Register (or replace) a theme.
    ///
    /// Returns the previous definition when the replaced theme is the active
    /// one, so the caller can restyle against it.
    pub fn load_theme(&mut self, theme: Theme) -> Result<Option<Theme>> {
        self.validate(&theme)?;
        let name = theme.name().to_string();
        tracing::debug!(theme = %name, entries = theme.len(), "theme loaded");
        let previous = self.themes.insert(name.clone(), theme);
        if self.active.as_deref() == Some(name.as_str()) {
            Ok(previous)
        } else {
            Ok(None)
        }
    }

    /// Parse `source` and register every theme in it. Nothing is registered
    /// if any block fails to parse or validate.
    pub fn load_source(&mut self, source: &str) -> Result<Vec<(String, Option<Theme>)>> {
        let themes = parser::parse_themes(source)?;
        for theme in &themes {
            self.validate(theme)?;
        }
        let mut loaded = Vec::with_capacity(themes.len());
        for theme in themes {
            let name = theme.name().to_string();
            let previous = self.load_theme(theme)?;
            loaded.push((name, previous));
        }
        Ok(loaded)
    }

    /// Switch the active theme; returns the previously active theme.
    pub fn set_active(&mut self, name: &str) -> Result<Option<Theme>> {
        if !self.themes.contains_key(name) {
            return Err(Error::ThemeNotFound(name.to_string()));
        }
        let previous = self.active_theme().cloned();
        self.active = Some(name.to_string());
        Ok(previous)
    }

    /// Schema keys of `kind` whose theme-level value differs between
    /// `previous` and the active theme.
    pub fn changed_keys(&self, kind: WidgetKind, previous: Option<&Theme>) -> Vec<&'static KeySpec> {
        let current = self.active_theme();
        kind.keys()
            .filter(|spec| {
                let before = previous.and_then(|t| t.lookup(kind, spec.key));
                let after = current.and_then(|t| t.lookup(kind, spec.key));
                before != after
            })
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
