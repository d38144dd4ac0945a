//! Crate-wide error type.
//!
//! Configuration and style errors are reported at the offending call and never
//! leave partially applied state behind. Layout divergence is reported by the
//! layout pass and absorbed by the frame driver.

use crate::dom::node::NodeId;
use crate::widget::kind::WidgetKind;

/// Errors produced by the toolkit core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `configure` batch contained a key outside the kind's schema.
    #[error("invalid configuration key '{key}' for {kind}")]
    InvalidConfigKey { kind: WidgetKind, key: String },

    /// `cget` was asked for a key outside the kind's schema.
    #[error("unknown configuration key '{key}' for {kind}")]
    UnknownConfigKey { kind: WidgetKind, key: String },

    /// A `configure` value did not match the schema's declared type.
    #[error("configuration key '{key}' expects {expected}, got {found}")]
    InvalidConfigValue {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A style key is registered neither for the kind nor as a global fallback.
    /// `selector` is a kind name, or `*` for theme-wide entries.
    #[error("style key '{key}' is unknown for {selector}")]
    StyleKeyUnknown { selector: String, key: String },

    /// No theme with this name has been loaded.
    #[error("theme '{0}' not found")]
    ThemeNotFound(String),

    /// A grid cell span extends past the declared grid bounds.
    #[error(
        "span at row {row}, column {column} ({rowspan}x{columnspan}) exceeds a {rows}x{columns} grid"
    )]
    InvalidSpan {
        row: usize,
        column: usize,
        rowspan: usize,
        columnspan: usize,
        rows: usize,
        columns: usize,
    },

    /// The layout pass did not settle within the iteration cap.
    #[error("layout did not converge after {iterations} iterations (container {container:?})")]
    LayoutDivergence { container: NodeId, iterations: usize },

    /// Registry lookup miss (destroyed or foreign handle).
    #[error("widget {0:?} not found")]
    NotFound(NodeId),

    /// Layout options do not match the parent's geometry manager.
    #[error("widget {0:?} has no geometry manager accepting these options")]
    NotAContainer(NodeId),

    /// The window root can only be torn down by shutting the toolkit down.
    #[error("the root widget cannot be destroyed")]
    RootNode,

    /// Theme source text failed to parse.
    #[error("theme parse error on line {line}: {message}")]
    ThemeParse { line: usize, message: String },

    /// Drawing backend or input source failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_key() {
        let err = Error::InvalidConfigKey {
            kind: WidgetKind::Button,
            key: "colour".into(),
        };
        assert_eq!(err.to_string(), "invalid configuration key 'colour' for Button");
    }

    #[test]
    fn display_theme_not_found() {
        assert_eq!(
            Error::ThemeNotFound("neon".into()).to_string(),
            "theme 'neon' not found"
        );
    }

    #[test]
    fn io_converts() {
        let err: Error = std::io::Error::other("tty gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
