//! Template Engine
//!
//! Pure text transformations for `{{variable}}` placeholders: extraction,
//! single-brace normalization, and substitution. No I/O.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::VariableBinding;

/// Non-greedy `{{ ... }}` matcher; non-greedy so adjacent placeholders
/// don't merge into one.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").unwrap())
}

/// Lone `{ ... }` matcher used by brace normalization.
fn single_brace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*?)\}").unwrap())
}

/// Extract distinct placeholder names from a template.
///
/// Names are trimmed, empty names dropped, duplicates collapsed, and
/// first-seen order preserved.
pub fn extract_variables(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_re().captures_iter(text) {
        let name = caps[1].trim();
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Convert lone `{name}` occurrences to `{{name}}`.
///
/// A match is left alone when the character immediately before it is `{` or
/// the character immediately after it is `}`, so existing double-brace pairs
/// survive. Idempotent.
pub fn normalize_braces(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;
    for m in single_brace_re().find_iter(text) {
        out.push_str(&text[last..m.start()]);

        let preceded_by_brace = text[..m.start()].ends_with('{');
        let followed_by_brace = text[m.end()..].starts_with('}');
        if preceded_by_brace || followed_by_brace {
            out.push_str(m.as_str());
        } else {
            // m.as_str() is "{name}"; wrap it into "{{name}}"
            out.push('{');
            out.push_str(m.as_str());
            out.push('}');
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Substitute bound values into a template.
///
/// One left-to-right scan: every `{{ name }}` occurrence (inner whitespace
/// tolerated) whose trimmed name has a binding is replaced by the binding's
/// value; unmatched placeholders stay literal. Replacement values are never
/// re-scanned, so the result does not depend on binding order and nested
/// expansion cannot occur. Names are compared verbatim; regex metacharacters
/// in a name have no special meaning.
pub fn substitute(text: &str, bindings: &[VariableBinding]) -> String {
    if text.is_empty() || bindings.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in placeholder_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let name = caps[1].trim();

        out.push_str(&text[last..whole.start()]);
        match bindings.iter().find(|b| b.name == name) {
            Some(binding) => out.push_str(&binding.value),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Re-derive a prompt's bindings from its (already normalized) template text.
///
/// The result is exactly the set of distinct placeholder names in the text:
/// stale bindings are pruned, values of surviving bindings are kept, and new
/// names get empty values. Order follows first occurrence in the text.
pub fn sync_bindings(text: &str, existing: &[VariableBinding]) -> Vec<VariableBinding> {
    extract_variables(text)
        .into_iter()
        .map(|name| {
            existing
                .iter()
                .find(|b| b.name == name)
                .cloned()
                .unwrap_or_else(|| VariableBinding::unset(name))
        })
        .collect()
}
