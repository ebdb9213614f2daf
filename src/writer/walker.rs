use super::emitter::{Emitter, Visit};
use super::registry::{OpenWriter, WriterRegistry};
use crate::error::{Error, Result};
use crate::origins::NodeOrigins;
use crate::value::{child_path, index_path, ConfigValue};
use log::trace;

/// Visits the value tree in insertion order and dispatches to the dialect's
/// writers.
pub struct Walker<'r, 'a> {
    registry: &'r WriterRegistry<'a>,
    origins: &'r NodeOrigins,
}

impl<'r, 'a> Walker<'r, 'a> {
    pub fn new(registry: &'r WriterRegistry<'a>, origins: &'r NodeOrigins) -> Self {
        Self { registry, origins }
    }

    /// Walks the whole tree starting at level 0.
    pub fn walk(&self, emitter: &mut Emitter, tree: &ConfigValue) -> Result<()> {
        self.walk_value(emitter, tree, 0, "")
    }

    pub fn walk_value(
        &self,
        emitter: &mut Emitter,
        value: &ConfigValue,
        level: usize,
        key_path: &str,
    ) -> Result<()> {
        match value {
            ConfigValue::Mapping(map) => {
                for (key, child) in map {
                    self.visit_field(emitter, key, child, level, &child_path(key_path, key))?;
                }
                Ok(())
            }
            ConfigValue::Sequence(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.walk_value(emitter, item, level, &index_path(key_path, idx))?;
                }
                Ok(())
            }
            ConfigValue::Scalar(_) => Ok(()),
        }
    }

    fn visit_field(
        &self,
        emitter: &mut Emitter,
        key: &str,
        value: &ConfigValue,
        level: usize,
        key_path: &str,
    ) -> Result<()> {
        let line = self.origins.line_of(key_path);
        let visit = Visit { key, value, key_path, level, line };
        let writers = self.registry.get(key);
        trace!("visiting {key_path} (line {line}) at level {level}");

        let (handled, inner) = match writers.and_then(|w| w.open.as_ref()) {
            Some(OpenWriter::Noop) => (false, level),
            Some(OpenWriter::Write(open)) => {
                (annotate(open(&mut *emitter, &visit), &visit)?, level + 1)
            }
            None if value.is_plain_scalar() => (false, level),
            None => {
                return Err(Error::NoWriterForKey { key_path: key_path.to_string(), line });
            }
        };

        if !handled {
            let open_item = writers.and_then(|w| w.open_item.as_ref());
            match (open_item, value) {
                (Some(open_item), ConfigValue::Sequence(items)) => {
                    let close_item = writers.and_then(|w| w.close_item.as_ref());
                    for (idx, item) in items.iter().enumerate() {
                        let item_path = index_path(key_path, idx);
                        let item_visit = Visit {
                            key,
                            value: item,
                            key_path: &item_path,
                            level: inner,
                            line: self.origins.line_of(&item_path),
                        };
                        if !annotate(open_item(&mut *emitter, &item_visit), &item_visit)? {
                            self.walk_value(emitter, item, inner + 1, &item_path)?;
                        }
                        if let Some(close_item) = close_item {
                            annotate(close_item(&mut *emitter, &item_visit), &item_visit)?;
                        }
                    }
                }
                _ => self.walk_value(emitter, value, inner, key_path)?,
            }
        }

        if let Some(close) = writers.and_then(|w| w.close.as_ref()) {
            annotate(close(&mut *emitter, &visit), &visit)?;
        }
        Ok(())
    }
}

/// Attaches the visited node's KeyPath and line to a failing writer.
fn annotate<T>(result: Result<T>, visit: &Visit<'_>) -> Result<T> {
    result.map_err(|err| match err {
        Error::TemplateExecutionFailure { .. } => err,
        other => Error::TemplateExecutionFailure {
            key_path: visit.key_path.to_string(),
            line: visit.line,
            message: other.to_string(),
        },
    })
}

/// Walks `tree` with `registry` into a fresh sink and returns its text.
pub fn walk(
    registry: &WriterRegistry<'_>,
    tree: &ConfigValue,
    origins: &NodeOrigins,
) -> Result<String> {
    let mut emitter = Emitter::new();
    Walker::new(registry, origins).walk(&mut emitter, tree)?;
    Ok(emitter.into_string())
}
