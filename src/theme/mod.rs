//! Themes: per-kind defaults, named overrides, and the resolution cascade.

pub mod defaults;
pub mod parser;
pub mod store;
pub mod tokenizer;

pub use store::{Selector, Source, Theme, ThemeStore};
