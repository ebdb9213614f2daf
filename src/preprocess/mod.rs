//! Text-level preprocessing shared by configuration sources and templates
//!
//! This module contains the three passes run over raw text:
//! - `ifdef`: `#ifdef` / `#ifndef` / `#endif` blocks
//! - `inline`: single-line `#cond1,!cond2 rest` conditionals
//! - `placeholder`: `@@NAME@@` substitution

pub mod ifdef;
pub mod inline;
pub mod placeholder;

use crate::error::Result;
use indexmap::IndexSet;

pub use ifdef::resolve_ifdefs;
pub use inline::apply_inline_conditions;
pub use placeholder::{substitute_placeholders, PlaceholderValue, Placeholders};

/// Named conditions active for one compilation run.
pub type Conditions = IndexSet<String>;

/// One of the preprocessing passes, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Ifdef,
    Inline,
    Placeholders,
}

impl Pass {
    pub fn as_str(self) -> &'static str {
        match self {
            Pass::Ifdef => "ifdef",
            Pass::Inline => "inline",
            Pass::Placeholders => "placeholders",
        }
    }
}

/// Runs all three passes over `text`.
///
/// Blocks and directives dropped by the ifdef pass leave empty lines behind,
/// so the number of lines only changes when a placeholder value itself
/// spans lines. Callers that rely on line numbers check with [`line_count`]
/// through [`preprocess_inspected`].
pub fn preprocess(
    text: &str,
    conditions: &Conditions,
    placeholders: &Placeholders,
) -> Result<String> {
    preprocess_inspected(text, conditions, placeholders, |_, _| Ok(()))
}

/// Like [`preprocess`], handing the output of every pass to `inspect`.
/// An error from `inspect` stops the run.
pub fn preprocess_inspected<F>(
    text: &str,
    conditions: &Conditions,
    placeholders: &Placeholders,
    mut inspect: F,
) -> Result<String>
where
    F: FnMut(Pass, &str) -> Result<()>,
{
    let text = resolve_ifdefs(text, conditions)?;
    inspect(Pass::Ifdef, &text)?;

    let text = apply_inline_conditions(&text, conditions);
    inspect(Pass::Inline, &text)?;

    let text = substitute_placeholders(&text, placeholders)?;
    inspect(Pass::Placeholders, &text)?;
    Ok(text)
}

/// Number of lines as seen by the passes, trailing newline included.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}
