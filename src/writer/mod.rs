//! Writer registry and tree walker
//!
//! A dialect registers up to four hooks per field (`open`, `open_item`,
//! `close_item`, `close`). The walker visits the value tree in insertion
//! order and lets those hooks either collapse a subtree into one directive
//! or expand it into nested blocks.

pub mod emitter;
pub mod registry;
pub mod walker;

pub use emitter::{Emitter, Visit};
pub use registry::{CloseFn, FieldBuilder, FieldWriters, OpenFn, OpenWriter, WriterRegistry};
pub use walker::{walk, Walker};
