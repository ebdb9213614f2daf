use super::Conditions;
use crate::error::{Error, Result};
use crate::origins::LineRef;
use log::trace;

#[derive(Debug, PartialEq)]
enum Directive<'a> {
    Ifdef(&'a str),
    Ifndef(&'a str),
    Endif,
}

impl<'a> Directive<'a> {
    fn parse(line: &'a str, lineno: usize) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if let Some(rest) = keyword(trimmed, "#ifdef") {
            return Ok(Some(Directive::Ifdef(condition_name(rest, lineno)?)));
        }
        if let Some(rest) = keyword(trimmed, "#ifndef") {
            return Ok(Some(Directive::Ifndef(condition_name(rest, lineno)?)));
        }
        if keyword(trimmed, "#endif").is_some() {
            return Ok(Some(Directive::Endif));
        }
        Ok(None)
    }
}

/// Strips `word` when it stands alone at the start of `line`.
fn keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn condition_name(rest: &str, lineno: usize) -> Result<&str> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(name), None) => Ok(name),
        _ => Err(Error::Syntax {
            line: LineRef::at(lineno),
            message: "conditional directive takes exactly one condition name".into(),
        }),
    }
}

/// Resolves `#ifdef NAME`, `#ifndef NAME` and `#endif` blocks.
///
/// Directive lines and lines inside an inactive block are replaced by empty
/// lines rather than removed, keeping every surviving line on its original
/// line number.
pub fn resolve_ifdefs(text: &str, conditions: &Conditions) -> Result<String> {
    // Each open block remembers the line that opened it for diagnostics.
    let mut stack: Vec<(bool, usize)> = vec![(true, 0)];
    let mut lines = Vec::new();

    for (idx, line) in text.split('\n').enumerate() {
        let lineno = idx + 1;
        match Directive::parse(line, lineno)? {
            Some(Directive::Ifdef(name)) => {
                trace!("line {lineno}: #ifdef {name}");
                stack.push((conditions.contains(name), lineno));
                lines.push("");
            }
            Some(Directive::Ifndef(name)) => {
                trace!("line {lineno}: #ifndef {name}");
                stack.push((!conditions.contains(name), lineno));
                lines.push("");
            }
            Some(Directive::Endif) => {
                if stack.len() == 1 {
                    return Err(Error::UnbalancedConditional {
                        line: LineRef::at(lineno),
                        reason: "#endif without a matching #ifdef or #ifndef".into(),
                    });
                }
                stack.pop();
                lines.push("");
            }
            None if stack.iter().all(|(active, _)| *active) => lines.push(line),
            None => lines.push(""),
        }
    }

    if let Some((_, opened_at)) = stack.get(1) {
        return Err(Error::UnbalancedConditional {
            line: LineRef::at(*opened_at),
            reason: format!("{} conditional block(s) never closed", stack.len() - 1),
        });
    }

    Ok(lines.join("\n"))
}
