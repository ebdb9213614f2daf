use crate::value::Scalar;

/// A parse node, before KeyPaths are assigned and references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mapping(Vec<Entry>),
    Sequence(Vec<Node>),
    Constant(Scalar),
    /// Unary minus applied to a numeric constant (or another negation).
    Negate(Box<Node>),
    /// Dotted back-reference such as `a.b` or `servers.0.port`.
    Reference(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub key_line: usize,
    pub value: Node,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self { kind, line }
    }
}
