//! The configure/cget mediator.
//!
//! A [`ConfigBatch`] is checked against the widget's schema in full before a
//! single override is written. Each key whose resolved value actually changes
//! is looked up in the kind's affects table: geometry keys re-mark the node
//! and its ancestors for layout, paint keys mark the node for repaint.

use crate::dom::node::NodeId;
use crate::dom::registry::WidgetRegistry;
use crate::error::{Error, Result};
use crate::invalidation::Invalidation;
use crate::theme::ThemeStore;
use crate::widget::kind::{Affects, KeySpec, WidgetKind};

use super::value::Value;

// ---------------------------------------------------------------------------
// ConfigBatch
// ---------------------------------------------------------------------------

/// An ordered set of key/value assignments applied as one unit.
///
/// Later assignments to the same key win.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigBatch {
    entries: Vec<(String, Value)>,
}

impl ConfigBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment (builder).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ConfigBatch
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        let mut batch = ConfigBatch::new();
        for (k, v) in pairs {
            batch.push(k, v);
        }
        batch
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConfigBatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut batch = ConfigBatch::new();
        for (k, v) in iter {
            batch.push(k, v);
        }
        batch
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Check every key and value of `batch` against the schema of `kind`.
///
/// Returns the schema entry for each assignment, in batch order.
pub fn validate_batch(kind: WidgetKind, batch: &ConfigBatch) -> Result<Vec<&'static KeySpec>> {
    batch
        .iter()
        .map(|(key, value)| {
            let spec = kind.spec(key).ok_or_else(|| Error::InvalidConfigKey {
                kind,
                key: key.to_string(),
            })?;
            if !spec.ty.accepts(value) {
                return Err(Error::InvalidConfigValue {
                    key: key.to_string(),
                    expected: spec.ty.name(),
                    found: value.type_name(),
                });
            }
            Ok(spec)
        })
        .collect()
}

/// Apply `batch` to `id` all-or-nothing and mark the resulting invalidation.
///
/// Returns the keys whose resolved value changed.
pub fn configure(
    registry: &mut WidgetRegistry,
    themes: &ThemeStore,
    invalidation: &mut Invalidation,
    id: NodeId,
    batch: &ConfigBatch,
) -> Result<Vec<&'static str>> {
    let node = registry.lookup_mut(id)?;
    let kind = node.kind;
    let specs = validate_batch(kind, batch)?;

    let mut changed: Vec<&'static KeySpec> = Vec::new();
    for (spec, (key, value)) in specs.into_iter().zip(batch.iter()) {
        let before = themes.resolve(kind, key, &node.config).ok();
        node.config.insert(key.to_string(), value.clone());
        if before.as_ref() != Some(value) && !changed.iter().any(|s| s.key == spec.key) {
            changed.push(spec);
        }
    }

    let geometry = changed.iter().any(|s| s.affects == Affects::Geometry);
    let paint = changed.iter().any(|s| s.affects == Affects::Paint);
    if geometry {
        invalidation.mark_geometry(registry, id);
    } else if paint {
        invalidation.mark_paint(registry, id);
    }
    tracing::trace!(?id, %kind, changed = changed.len(), geometry, paint, "configured");
    Ok(changed.into_iter().map(|s| s.key).collect())
}

/// The resolved value of `key` on `id`: the instance override if set,
/// otherwise the theme cascade.
pub fn cget(registry: &WidgetRegistry, themes: &ThemeStore, id: NodeId, key: &str) -> Result<Value> {
    let node = registry.lookup(id)?;
    if node.kind.spec(key).is_none() {
        return Err(Error::UnknownConfigKey {
            kind: node.kind,
            key: key.to_string(),
        });
    }
    themes.resolve(node.kind, key, &node.config)
}

// ===========================================================================
// Tests
// ===========================================================================
