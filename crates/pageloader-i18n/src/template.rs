//! Placeholder templating
//!
//! `solve` replaces `{{dotted.key}}` placeholders and remembers, per page,
//! which key produced which text. `hot_reload` walks that list in the same
//! order and swaps each previously rendered value for the value the new
//! bundle gives the same key. The list order is fixed by the first pass and
//! never re-derived from the markup.

use crate::PageStrings;
use std::collections::HashMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One placeholder occurrence and the text it currently renders as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderBinding {
    /// Dotted key, without braces
    pub key: String,
    /// Last text written for this occurrence
    pub value: String,
}

impl PlaceholderBinding {
    /// The placeholder as it appears in raw markup
    pub fn literal(&self) -> String {
        format!("{OPEN}{}{CLOSE}", self.key)
    }
}

/// Per-page binding cache
#[derive(Debug, Default)]
pub struct TemplateEngine {
    bindings: HashMap<String, Vec<PlaceholderBinding>>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings recorded for `page_id`, in encounter order
    pub fn bindings(&self, page_id: &str) -> &[PlaceholderBinding] {
        self.bindings.get(page_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First-time localization of raw markup.
    ///
    /// Replaces every placeholder in document order and records a binding
    /// for each. Unresolved keys render as the placeholder literal so a later
    /// hot reload can still fill them in. Any previous binding list for the
    /// page is replaced.
    pub fn solve(&mut self, raw_markup: &str, page_id: &str, strings: &PageStrings) -> String {
        let mut out = String::with_capacity(raw_markup.len());
        let mut bindings = Vec::new();
        let mut rest = raw_markup;

        while let Some((start, end, key)) = next_placeholder(rest) {
            out.push_str(&rest[..start]);
            let value = strings
                .lookup(key)
                .unwrap_or_else(|| format!("{OPEN}{key}{CLOSE}"));
            out.push_str(&value);
            bindings.push(PlaceholderBinding { key: key.to_string(), value });
            rest = &rest[end..];
        }
        out.push_str(rest);

        let unresolved = bindings.iter().filter(|b| b.value == b.literal()).count();
        if unresolved > 0 {
            tracing::debug!("Page {}: {} placeholder(s) left unresolved", page_id, unresolved);
        }
        tracing::debug!("Solved {} placeholder(s) for page {}", bindings.len(), page_id);

        self.bindings.insert(page_id.to_string(), bindings);
        out
    }

    /// Re-localize already rendered markup against new strings.
    ///
    /// Each binding's previous value is searched for after the point where
    /// the previous binding was written (falling back to the start of the
    /// markup), so two bindings that rendered identical text are matched
    /// first-come first-served. Best effort, not a precision guarantee.
    pub fn hot_reload(&mut self, rendered_markup: &str, page_id: &str, strings: &PageStrings) -> String {
        let Some(bindings) = self.bindings.get_mut(page_id) else {
            return rendered_markup.to_string();
        };

        let mut markup = rendered_markup.to_string();
        let mut cursor = 0;
        let mut replaced = 0;
        for binding in bindings.iter_mut() {
            let new_value = strings.lookup(&binding.key).unwrap_or_else(|| binding.literal());
            if binding.value.is_empty() {
                tracing::debug!("Page {}: cannot relocate empty value of {}", page_id, binding.key);
                continue;
            }

            let Some((at, len)) = find_rendered(&markup, &binding.value, cursor)
                .or_else(|| find_rendered(&markup, &binding.value, 0))
            else {
                tracing::debug!("Page {}: rendered text for {} not found", page_id, binding.key);
                continue;
            };

            markup.replace_range(at..at + len, &new_value);
            cursor = at + new_value.len();
            binding.value = new_value;
            replaced += 1;
        }

        tracing::debug!("Hot reloaded {}/{} binding(s) for page {}", replaced, bindings.len(), page_id);
        markup
    }
}

/// Find the next `{{key}}` in `text`: (start, end, trimmed key).
///
/// Matching is non-greedy and a placeholder never spans a newline.
fn next_placeholder(text: &str) -> Option<(usize, usize, &str)> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(OPEN) {
        let start = from + rel;
        let body_start = start + OPEN.len();
        if let Some(close) = text[body_start..].find(CLOSE) {
            let body = &text[body_start..body_start + close];
            if !body.contains('\n') {
                return Some((start, body_start + close + CLOSE.len(), body.trim()));
            }
        }
        from = start + 1;
    }
    None
}

/// Locate `value` in `markup` at or after `from`, either verbatim or in the
/// escaped form a markup round trip turns it into. Returns (offset, length).
fn find_rendered(markup: &str, value: &str, from: usize) -> Option<(usize, usize)> {
    let haystack = markup.get(from..)?;
    if let Some(at) = haystack.find(value) {
        return Some((from + at, value.len()));
    }
    let escaped = escape(value);
    if escaped != value {
        if let Some(at) = haystack.find(&escaped) {
            return Some((from + at, escaped.len()));
        }
    }
    None
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(value: serde_json::Value) -> PageStrings {
        PageStrings(value)
    }

    #[test]
    fn test_next_placeholder() {
        assert_eq!(next_placeholder("a {{ b.c }} d"), Some((2, 11, "b.c")));
        assert_eq!(next_placeholder("{{a\n}} {{b}}"), Some((7, 12, "b")));
        assert_eq!(next_placeholder("no braces"), None);
        assert_eq!(next_placeholder("{{open"), None);
    }

    #[test]
    fn test_solve_records_bindings_in_order() {
        let mut engine = TemplateEngine::new();
        let out = engine.solve(
            "<p>{{b}}</p><p>{{a}}</p><p>{{b}}</p>",
            "home",
            &strings(json!({ "a": "A", "b": "B" })),
        );

        assert_eq!(out, "<p>B</p><p>A</p><p>B</p>");
        let keys: Vec<_> = engine.bindings("home").iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_unresolved_renders_literal() {
        let mut engine = TemplateEngine::new();
        let out = engine.solve("<p>{{missing.key}}</p>", "home", &strings(json!({})));
        assert_eq!(out, "<p>{{missing.key}}</p>");
        assert_eq!(engine.bindings("home")[0].value, "{{missing.key}}");
    }

    #[test]
    fn test_hot_reload_fills_previously_unresolved() {
        let mut engine = TemplateEngine::new();
        let rendered = engine.solve("<p>{{later}}</p>", "home", &strings(json!({})));
        let out = engine.hot_reload(&rendered, "home", &strings(json!({ "later": "Now" })));
        assert_eq!(out, "<p>Now</p>");
    }

    #[test]
    fn test_hot_reload_identical_values_first_come() {
        let mut engine = TemplateEngine::new();
        let rendered = engine.solve(
            "<a>{{x}}</a><b>{{y}}</b>",
            "home",
            &strings(json!({ "x": "Same", "y": "Same" })),
        );
        let out = engine.hot_reload(&rendered, "home", &strings(json!({ "x": "One", "y": "Two" })));
        assert_eq!(out, "<a>One</a><b>Two</b>");
    }

    #[test]
    fn test_hot_reload_does_not_rematch_new_text() {
        let mut engine = TemplateEngine::new();
        let rendered = engine.solve(
            "<a>{{x}}</a><b>{{y}}</b>",
            "home",
            &strings(json!({ "x": "Old", "y": "Yes" })),
        );
        let out = engine.hot_reload(&rendered, "home", &strings(json!({ "x": "Yes sir", "y": "Sim" })));
        assert_eq!(out, "<a>Yes sir</a><b>Sim</b>");
    }

    #[test]
    fn test_hot_reload_escaped_value() {
        let mut engine = TemplateEngine::new();
        engine.solve("<p>{{t}}</p>", "home", &strings(json!({ "t": "A & B" })));
        // The live markup went through a parse/serialize round trip
        let out = engine.hot_reload("<p>A &amp; B</p>", "home", &strings(json!({ "t": "C" })));
        assert_eq!(out, "<p>C</p>");
    }

    #[test]
    fn test_hot_reload_without_solve_is_noop() {
        let mut engine = TemplateEngine::new();
        let out = engine.hot_reload("<p>{{t}}</p>", "home", &strings(json!({ "t": "x" })));
        assert_eq!(out, "<p>{{t}}</p>");
        assert!(engine.bindings("home").is_empty());
    }

    #[test]
    fn test_solve_twice_replaces_bindings() {
        let mut engine = TemplateEngine::new();
        let s = strings(json!({ "a": "A" }));
        engine.solve("{{a}}", "home", &s);
        engine.solve("{{a}}", "home", &s);
        assert_eq!(engine.bindings("home").len(), 1);
    }
}
