use super::Conditions;
use regex::Regex;
use std::sync::LazyLock;

/// `<indent>#<cond>[,<cond>...] <rest>` where a condition may be negated with `!`.
static INLINE_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)#(!?[A-Za-z0-9_][\w.-]*(?:,!?[A-Za-z0-9_][\w.-]*)*)[ \t](.*)$")
        .expect("inline condition pattern is valid")
});

fn is_satisfied(token: &str, conditions: &Conditions) -> bool {
    match token.strip_prefix('!') {
        Some(name) => !conditions.contains(name),
        None => conditions.contains(token),
    }
}

/// Rewrites single-line conditionals.
///
/// A line whose conditions all hold is replaced by its indentation followed
/// by the rest of the line. Any other line, including one whose conditions
/// fail, is left untouched; a failed conditional keeps its leading `#` and is
/// read as a comment later. No line is ever added or removed.
pub fn apply_inline_conditions(text: &str, conditions: &Conditions) -> String {
    text.split('\n')
        .map(|line| match INLINE_CONDITION.captures(line) {
            Some(caps) if caps[2].split(',').all(|token| is_satisfied(token, conditions)) => {
                format!("{}{}", &caps[1], &caps[3])
            }
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
