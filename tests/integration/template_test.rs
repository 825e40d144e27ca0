//! Variable Engine Property Tests
//!
//! Verifies the documented properties of extraction, normalization, and
//! substitution over whole-flow scenarios.

use promptdeck_desktop::template::{extract_variables, normalize_braces, substitute, sync_bindings};
use promptdeck_desktop::VariableBinding;

#[test]
fn test_extract_after_normalize_counts_distinct_names() {
    let inputs = [
        ("no placeholders here", 0),
        ("{one}", 1),
        ("{{one}} {one} {two}", 2),
        ("{{ a }}{{b}}{{ a }}", 2),
    ];
    for (text, expected) in inputs {
        let normalized = normalize_braces(text);
        assert_eq!(
            extract_variables(&normalized).len(),
            expected,
            "input: {text:?}"
        );
    }
}

#[test]
fn test_substitute_with_no_bindings_is_identity() {
    for text in ["", "plain", "{{a}} {{b}}", "{x}"] {
        assert_eq!(substitute(text, &[]), text);
    }
}

#[test]
fn test_substitute_idempotent_on_fully_resolved_text() {
    let bindings = vec![
        VariableBinding::new("a", "1"),
        VariableBinding::new("b", "2"),
    ];
    let resolved = substitute("{{a}}-{{b}}", &bindings);
    assert_eq!(resolved, "1-2");
    assert_eq!(substitute(&resolved, &bindings), resolved);
}

#[test]
fn test_documented_scenario() {
    let template = "Hello {name}, your {{ role }} starts at {{role}}";
    let normalized = normalize_braces(template);

    let names = extract_variables(&normalized);
    assert_eq!(names, vec!["name", "role"]);

    let bindings = vec![
        VariableBinding::new("name", "Ann"),
        VariableBinding::new("role", "9am"),
    ];
    assert_eq!(
        substitute(&normalized, &bindings),
        "Hello Ann, your 9am starts at 9am"
    );
}

#[test]
fn test_binding_order_does_not_matter() {
    let text = "{{a}} {{b}} {{a}}";
    let forward = vec![
        VariableBinding::new("a", "x"),
        VariableBinding::new("b", "y"),
    ];
    let reversed = vec![
        VariableBinding::new("b", "y"),
        VariableBinding::new("a", "x"),
    ];
    assert_eq!(substitute(text, &forward), substitute(text, &reversed));
}

#[test]
fn test_sync_bindings_tracks_template_edits() {
    // A prompt whose template loses one placeholder and gains another
    let before = sync_bindings("{{old}} {{kept}}", &[]);
    assert_eq!(before.len(), 2);

    let mut with_values = before.clone();
    with_values[1].value = "v".to_string();

    let after = sync_bindings("{{kept}} {{new}}", &with_values);
    let names: Vec<&str> = after.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["kept", "new"]);
    assert_eq!(after[0].value, "v");
    assert_eq!(after[1].value, "");
}
