//! Path classifiers.
//!
//! Pure string predicates: each is a function of the path and the configured
//! rules only. Roots are matched anywhere in the path, so transcripts'
//! absolute paths classify without knowing the workspace location.

use crate::config::PathRules;
use std::borrow::Cow;

fn normalize(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

fn contains_any(path: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && path.contains(n.as_str()))
}

fn has_source_suffix(path: &str, rules: &PathRules) -> bool {
    rules
        .source_suffixes
        .iter()
        .any(|s| !s.is_empty() && path.ends_with(s.as_str()))
}

fn is_source_under(path: &str, roots: &[String], rules: &PathRules) -> bool {
    let path = normalize(path);
    contains_any(&path, roots)
        && has_source_suffix(&path, rules)
        && !contains_any(&path, &rules.excluded)
}

pub fn is_library_source(path: &str, rules: &PathRules) -> bool {
    is_source_under(path, &rules.library_roots, rules)
}

pub fn is_app_source(path: &str, rules: &PathRules) -> bool {
    is_source_under(path, &rules.app_roots, rules)
}

/// Library or application source, excluding tests and config files
pub fn is_source(path: &str, rules: &PathRules) -> bool {
    is_library_source(path, rules) || is_app_source(path, rules)
}

/// Any path carrying a test marker, whatever its suffix
pub fn is_test_file(path: &str, rules: &PathRules) -> bool {
    contains_any(&normalize(path), &rules.test_markers)
}

/// UI library component or admin component
pub fn is_ui_component(path: &str, rules: &PathRules) -> bool {
    let normalized = normalize(path);
    let under_ui = contains_any(&normalized, &rules.ui_roots)
        || contains_any(&normalized, &rules.admin_ui_roots);
    under_ui
        && has_source_suffix(&normalized, rules)
        && !is_test_file(path, rules)
}
