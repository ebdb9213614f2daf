use log::warn;
use minijinja::Environment;
use regex::Regex;

// Case conversions let one tree feed dialects that spell directives
// differently (`proxy_pass` vs `ProxyPass`).
pub use cruet::case::{
    camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
    screaming_snake::to_screaming_snake_case, snake::to_snake_case,
};

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern is logged and treated as no match.
pub fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}

/// Wraps a value in double quotes, escaping embedded quotes and backslashes.
pub fn quote_filter(val: &str) -> String {
    format!("\"{}\"", val.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Registers every filter dialect templates can rely on.
pub fn register(env: &mut Environment<'_>) {
    env.add_filter("camel_case", to_camel_case);
    env.add_filter("kebab_case", to_kebab_case);
    env.add_filter("pascal_case", to_pascal_case);
    env.add_filter("screaming_snake_case", to_screaming_snake_case);
    env.add_filter("snake_case", to_snake_case);
    env.add_filter("regex", regex_filter);
    env.add_filter("quote", quote_filter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_filter_matches() {
        assert!(regex_filter("/static/app.js", r"^/static/"));
    }

    #[test]
    fn test_regex_filter_invalid_regex() {
        assert!(!regex_filter("anything", r"([unclosed"));
    }

    #[test]
    fn test_quote_filter_escapes() {
        assert_eq!(quote_filter(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn test_case_filters_render() {
        let mut env = Environment::new();
        register(&mut env);
        let rendered = env
            .render_str(
                "{{ 'proxy_pass' | pascal_case }} {{ 'ProxyPass' | snake_case }}",
                minijinja::context! {},
            )
            .unwrap();
        assert_eq!(rendered, "ProxyPass proxy_pass");
    }
}
