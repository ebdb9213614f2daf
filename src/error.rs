use crate::origins::LineRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to render template. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YAMLParseError(#[from] serde_yaml::Error),

    #[error("Cannot proceed: configuration source '{path}' does not exist.")]
    SourceNotFound { path: String },

    #[error("Cannot proceed: template '{path}' does not exist.")]
    TemplateNotFound { path: String },

    /// The ifdef or placeholder pass changed the number of lines, which would
    /// make every later line number wrong.
    #[error("Preprocessing '{source_name}' ({stage}) changed its line count from {before} to {after}.")]
    PreprocessorLineCountMismatch {
        source_name: String,
        stage: &'static str,
        before: usize,
        after: usize,
    },

    #[error("Unbalanced conditional at line {line}: {reason}.")]
    UnbalancedConditional { line: LineRef, reason: String },

    #[error("Undefined placeholder '@@{name}@@' at line {line}.")]
    UndefinedPlaceholder { name: String, line: LineRef },

    #[error("Syntax error at line {line}: {message}.")]
    Syntax { line: LineRef, message: String },

    #[error("Duplicate definition of '{key_path}' at line {line}, first defined at line {first_line}.")]
    DuplicateDefinition { key_path: String, line: LineRef, first_line: LineRef },

    #[error("Cannot resolve reference '{reference}' at line {line}.")]
    ReferenceResolutionFailure { reference: String, line: LineRef },

    #[error("No writer registered for '{key_path}' (line {line}).")]
    NoWriterForKey { key_path: String, line: LineRef },

    #[error("Writer failed while visiting '{key_path}' (line {line}): {message}")]
    TemplateExecutionFailure { key_path: String, line: LineRef, message: String },

    #[error("Invalid placeholder definition '{0}'. Expected KEY=VALUE.")]
    PlaceholderParseError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with servgen's Error as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that reports the error and exits the program.
///
/// Callers own presentation; the library only describes what went wrong.
pub fn default_error_handler(err: Error) {
    log::error!("{err}");
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
