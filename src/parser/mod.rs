//! Structural parser for the configuration literal
//!
//! - `lexer`: characters to tokens, with line numbers
//! - `grammar`: tokens to parse nodes
//! - `resolve`: parse nodes to the value tree, KeyPaths and origins

pub mod ast;
pub mod grammar;
pub mod lexer;
pub mod resolve;

use crate::error::Result;
use crate::origins::NodeOrigins;
use crate::value::ConfigValue;
use grammar::Grammar;
use lexer::Lexer;
use log::debug;
use resolve::Resolver;

/// A parsed configuration: the value tree plus where each node came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    pub tree: ConfigValue,
    pub origins: NodeOrigins,
}

/// Parses preprocessed configuration text.
pub fn parse(text: &str) -> Result<ParsedConfig> {
    let tokens = Lexer::new(text).tokenize()?;
    debug!("Lexed {} tokens", tokens.len());
    let root = Grammar::new(tokens).parse_document()?;
    let (tree, origins) = Resolver::new().build(&root)?;
    debug!("Parsed configuration with {} key paths", origins.len());
    Ok(ParsedConfig { tree, origins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::origins::LineRef;
    use serde_json::json;

    fn to_json(parsed: &ParsedConfig) -> serde_json::Value {
        serde_json::to_value(&parsed.tree).unwrap()
    }

    #[test]
    fn resolves_back_references() {
        let parsed = parse("{a: {b: 1}, c: a.b}").unwrap();
        assert_eq!(to_json(&parsed), json!({"a": {"b": 1}, "c": 1}));
    }

    #[test]
    fn undefined_reference_fails() {
        let err = parse("{a: {b: 1},\n c: a.z}").unwrap_err();
        match err {
            Error::ReferenceResolutionFailure { reference, line } => {
                assert_eq!(reference, "a.z");
                assert_eq!(line, LineRef::at(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn forward_references_fail() {
        let err = parse("{c: a.b, a: {b: 1}}").unwrap_err();
        assert!(matches!(err, Error::ReferenceResolutionFailure { .. }));
    }

    #[test]
    fn references_chain_and_index_sequences() {
        let parsed = parse("{ports: [80, 443], tls: ports.1, again: tls}").unwrap();
        assert_eq!(
            to_json(&parsed),
            json!({"ports": [80, 443], "tls": 443, "again": 443})
        );
    }

    #[test]
    fn references_to_containers_fail() {
        let err = parse("{a: {b: 1}, c: a}").unwrap_err();
        assert!(matches!(err, Error::ReferenceResolutionFailure { .. }));
    }

    #[test]
    fn duplicate_keys_fail_with_first_line() {
        let err = parse("{a: {\n  b: 1,\n  b: 2,\n}}").unwrap_err();
        match err {
            Error::DuplicateDefinition { key_path, line, first_line } => {
                assert_eq!(key_path, ".a.b");
                assert_eq!(line, LineRef::at(3));
                assert_eq!(first_line, LineRef::at(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn colliding_key_paths_fail() {
        let err = parse("{'a.b': 1,\n a: {b: 2}}").unwrap_err();
        assert!(matches!(err, Error::Syntax { line, .. } if line == LineRef::at(1)));

        let err = parse("{a: {b: {c: 2}},\n 'a.b': 1}").unwrap_err();
        assert!(matches!(err, Error::Syntax { line, .. } if line == LineRef::at(2)));

        let err = parse("{a: {b: 1},\n a: {b: 2}}").unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateDefinition { ref key_path, first_line, .. }
                if key_path == ".a" && first_line == LineRef::at(1)
        ));
    }

    #[test]
    fn negation_applies_to_numbers_only() {
        let parsed = parse("{a: -5, b: - -2}").unwrap();
        assert_eq!(to_json(&parsed), json!({"a": -5, "b": 2}));
        assert!(matches!(parse("{a: -'x'}").unwrap_err(), Error::Syntax { .. }));
        assert!(matches!(parse("{a: 1, b: -a}").unwrap_err(), Error::Syntax { .. }));
    }

    #[test]
    fn records_origin_for_every_key_path() {
        let source = "{\n  servers: [\n    {name: 's1',\n     port: 80},\n  ],\n}";
        let parsed = parse(source).unwrap();
        let origins = &parsed.origins;
        assert_eq!(origins.line_of(""), LineRef::at(1));
        assert_eq!(origins.line_of(".servers"), LineRef::at(2));
        assert_eq!(origins.line_of(".servers.0"), LineRef::at(3));
        assert_eq!(origins.line_of(".servers.0.name"), LineRef::at(3));
        assert_eq!(origins.line_of(".servers.0.port"), LineRef::at(4));
        assert_eq!(origins.len(), 5);
    }

    #[test]
    fn preserves_key_order() {
        let parsed = parse("{zeta: 1, alpha: 2, mid: 3}").unwrap();
        let keys: Vec<&String> = parsed.tree.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }
}
