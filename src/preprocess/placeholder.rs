use crate::error::{Error, Result};
use crate::origins::LineRef;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@@([A-Za-z0-9_]+)@@").expect("placeholder pattern is valid")
});

/// A substitution value; numbers are written without quotes.
///
/// Floats come from placeholder files. The configuration grammar only knows
/// integers, so a float has to be substituted inside a quoted string there;
/// templates take it anywhere.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlaceholderValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl PlaceholderValue {
    /// Reads a value from the command line: integers become numbers, the rest
    /// stays text.
    pub fn from_cli(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(PlaceholderValue::Int)
            .unwrap_or_else(|_| PlaceholderValue::Str(raw.to_string()))
    }
}

impl fmt::Display for PlaceholderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderValue::Int(n) => write!(f, "{n}"),
            PlaceholderValue::Float(n) => write!(f, "{n}"),
            PlaceholderValue::Str(s) => f.write_str(s),
        }
    }
}

pub type Placeholders = IndexMap<String, PlaceholderValue>;

/// Replaces every `@@NAME@@` with the string form of its value.
pub fn substitute_placeholders(text: &str, placeholders: &Placeholders) -> Result<String> {
    let mut out = String::with_capacity(text.len());

    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = placeholders.get(name.as_str()).ok_or_else(|| {
                Error::UndefinedPlaceholder {
                    name: name.as_str().to_string(),
                    line: LineRef::at(idx + 1),
                }
            })?;
            out.push_str(&line[last..whole.start()]);
            out.push_str(&value.to_string());
            last = whole.end();
        }
        out.push_str(&line[last..]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, PlaceholderValue)]) -> Placeholders {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn substitutes_strings_and_numbers() {
        let placeholders = table(&[
            ("HOST", PlaceholderValue::Str("example.com".into())),
            ("PORT", PlaceholderValue::Int(8080)),
        ]);
        let out = substitute_placeholders(
            "name: \"@@HOST@@:@@PORT@@\",\nport: @@PORT@@",
            &placeholders,
        )
        .unwrap();
        assert_eq!(out, "name: \"example.com:8080\",\nport: 8080");
    }

    #[test]
    fn undefined_placeholder_reports_line() {
        let err = substitute_placeholders("a\nb: @@MISSING@@", &Placeholders::new()).unwrap_err();
        match err {
            Error::UndefinedPlaceholder { name, line } => {
                assert_eq!(name, "MISSING");
                assert_eq!(line, LineRef::at(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn lone_markers_are_left_alone() {
        let out = substitute_placeholders("a @@ b @@@@", &Placeholders::new()).unwrap();
        assert_eq!(out, "a @@ b @@@@");
    }

    #[test]
    fn cli_values_prefer_integers() {
        assert_eq!(PlaceholderValue::from_cli("42"), PlaceholderValue::Int(42));
        assert_eq!(PlaceholderValue::from_cli("-7"), PlaceholderValue::Int(-7));
        assert_eq!(
            PlaceholderValue::from_cli("4.2"),
            PlaceholderValue::Str("4.2".into())
        );
    }

    #[test]
    fn deserializes_from_json() {
        let parsed: Placeholders =
            serde_json::from_str(r#"{"PORT": 80, "RATIO": 0.5, "HOST": "h"}"#).unwrap();
        assert_eq!(parsed["PORT"], PlaceholderValue::Int(80));
        assert_eq!(parsed["RATIO"], PlaceholderValue::Float(0.5));
        assert_eq!(parsed["HOST"], PlaceholderValue::Str("h".into()));
    }
}
