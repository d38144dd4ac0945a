//! Uniform `configure`/`cget` over every widget kind.

pub mod mediator;
pub mod value;

pub use mediator::{cget, configure, validate_batch, ConfigBatch};
pub use value::{Color, Value, ValueType};
