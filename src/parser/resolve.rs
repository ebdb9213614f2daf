use super::ast::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::origins::{LineRef, NodeOrigins};
use crate::value::{child_path, index_path, ConfigValue, Scalar};
use indexmap::IndexMap;
use log::trace;

/// Walks the parse tree depth-first, assigning KeyPaths, recording origins
/// and resolving back-references against the constants seen so far.
#[derive(Default)]
pub struct Resolver {
    constants: IndexMap<String, Scalar>,
    origins: NodeOrigins,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, root: &Node) -> Result<(ConfigValue, NodeOrigins)> {
        let tree = self.visit(root, "", root.line)?;
        Ok((tree, self.origins))
    }

    /// `line` is the line that introduced `key_path`: the key of a mapping
    /// entry, or the item itself inside a sequence.
    fn visit(&mut self, node: &Node, key_path: &str, line: usize) -> Result<ConfigValue> {
        match &node.kind {
            NodeKind::Mapping(entries) => {
                self.origins.record(key_path, line);
                let mut map = IndexMap::with_capacity(entries.len());
                for entry in entries {
                    let path = child_path(key_path, &entry.key);
                    if map.contains_key(&entry.key) {
                        return Err(Error::DuplicateDefinition {
                            first_line: self.origins.line_of(&path),
                            key_path: path,
                            line: LineRef::at(entry.key_line),
                        });
                    }
                    let value = self.visit(&entry.value, &path, entry.key_line)?;
                    map.insert(entry.key.clone(), value);
                }
                Ok(ConfigValue::Mapping(map))
            }
            NodeKind::Sequence(items) => {
                self.origins.record(key_path, line);
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.visit(item, &index_path(key_path, idx), item.line))
                    .collect::<Result<Vec<_>>>()
                    .map(ConfigValue::Sequence)
            }
            NodeKind::Constant(_) | NodeKind::Negate(_) => {
                let scalar = evaluate(node)?;
                self.define(key_path, line, scalar)
            }
            NodeKind::Reference(segments) => {
                let target = format!(".{}", segments.join("."));
                let scalar = self.constants.get(&target).cloned().ok_or_else(|| {
                    Error::ReferenceResolutionFailure {
                        reference: segments.join("."),
                        line: LineRef::at(node.line),
                    }
                })?;
                trace!("resolved {target} -> {scalar} for {key_path}");
                self.define(key_path, line, scalar)
            }
        }
    }

    fn define(&mut self, key_path: &str, line: usize, scalar: Scalar) -> Result<ConfigValue> {
        if self.constants.contains_key(key_path) {
            return Err(Error::DuplicateDefinition {
                key_path: key_path.to_string(),
                line: LineRef::at(line),
                first_line: self.origins.line_of(key_path),
            });
        }
        self.origins.record(key_path, line);
        self.constants.insert(key_path.to_string(), scalar.clone());
        Ok(ConfigValue::Scalar(scalar))
    }
}

fn evaluate(node: &Node) -> Result<Scalar> {
    match &node.kind {
        NodeKind::Constant(scalar) => Ok(scalar.clone()),
        NodeKind::Negate(operand) => match evaluate(operand)? {
            Scalar::Int(n) => n.checked_neg().map(Scalar::Int).ok_or_else(|| Error::Syntax {
                line: LineRef::at(node.line),
                message: format!("cannot negate {n}"),
            }),
            other => Err(Error::Syntax {
                line: LineRef::at(node.line),
                message: format!("only numbers can be negated, found '{other}'"),
            }),
        },
        _ => Err(Error::Syntax {
            line: LineRef::at(node.line),
            message: "only numeric constants can be negated".into(),
        }),
    }
}
