use crate::constants::DEFAULT_INDENT;
use crate::origins::LineRef;
use crate::value::ConfigValue;

/// Output sink for one compilation run.
///
/// Created per run and handed to every writer callback; nothing is shared
/// between runs.
#[derive(Debug, Clone)]
pub struct Emitter {
    out: String,
    indent_unit: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self::with_indent(DEFAULT_INDENT)
    }

    pub fn with_indent(unit: impl Into<String>) -> Self {
        Self { out: String::new(), indent_unit: unit.into() }
    }

    /// Writes `text` as one line indented to `level`.
    pub fn line(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.out.push_str(&self.indent_unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `text` verbatim.
    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

/// The node a writer callback is invoked for.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'t> {
    /// Field name the writer is registered under.
    pub key: &'t str,
    pub value: &'t ConfigValue,
    pub key_path: &'t str,
    pub level: usize,
    pub line: LineRef,
}

impl Visit<'_> {
    /// Writes an indented line at this visit's level.
    pub fn line(&self, emitter: &mut Emitter, text: &str) {
        emitter.line(self.level, text);
    }
}
