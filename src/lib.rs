/// Handles argument parsing and the command-line workflow.
pub mod cli;

/// The end-to-end compilation pipeline.
pub mod compiler;

pub mod constants;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// Line numbers for every node of a parsed tree.
pub mod origins;

/// Structural parser for configuration sources.
pub mod parser;

/// Conditional blocks, inline conditions and placeholder substitution.
pub mod preprocess;

/// Dialect template rendering.
pub mod renderer;

/// Tree rewrites applied between parsing and rendering.
pub mod transform;

pub mod value;

/// Writer registry and tree walker.
pub mod writer;

pub use compiler::{compile, Compiler};
pub use error::{Error, Result};
