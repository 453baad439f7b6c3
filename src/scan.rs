use crate::config::{GateConfig, Markers, Signature};
use crate::paths;
use serde_json::Value;

/// Actions observed anywhere in the session. Flags only ever go from false to true.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionFlags {
    pub wrote_code: bool,
    pub wrote_tests: bool,
    pub wrote_ui: bool,
    pub ran_code_review: bool,
    pub ran_test_review: bool,
    pub ran_accessibility_review: bool,
    pub ran_lint: bool,
    pub ran_build: bool,
    pub ran_unit_tests: bool,
    pub mentioned_e2e: bool,
}

impl SessionFlags {
    /// Fold one serialized record into the flags.
    ///
    /// Detection is substring co-occurrence over the record text, not a walk of
    /// the record schema. Coincidental matches count.
    pub fn observe(&mut self, text: &str, config: &GateConfig) {
        let markers = &config.markers;
        let rules = &config.paths;

        if contains_any(text, &markers.tool_keys) && contains_any(text, &markers.write_tools) {
            for candidate in string_tokens(text) {
                self.wrote_code |= paths::is_source(&candidate, rules);
                self.wrote_tests |= paths::is_test_file(&candidate, rules);
                self.wrote_ui |= paths::is_ui_component(&candidate, rules);
            }
        }

        self.ran_code_review |= reviewer_invoked(text, &markers.code_reviewer, markers);
        self.ran_test_review |= reviewer_invoked(text, &markers.test_reviewer, markers);
        self.ran_accessibility_review |=
            reviewer_invoked(text, &markers.accessibility_reviewer, markers);

        self.ran_lint |= matches_signature(text, &markers.lint);
        self.ran_build |= matches_signature(text, &markers.build);
        self.ran_unit_tests |= matches_signature(text, &markers.unit_tests);

        if !self.mentioned_e2e && !markers.e2e.is_empty() {
            self.mentioned_e2e = text
                .to_lowercase()
                .contains(&markers.e2e.to_lowercase());
        }
    }
}

/// Scan every record once and return the accumulated flags.
pub fn scan(records: &[Value], config: &GateConfig) -> SessionFlags {
    let mut flags = SessionFlags::default();
    for record in records {
        flags.observe(&record.to_string(), config);
    }
    tracing::debug!(?flags, "scanned {} records", records.len());
    flags
}

fn contains_any(text: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| !p.is_empty() && text.contains(p.as_str()))
}

/// True when every part of at least one signature occurs in the text
fn matches_signature(text: &str, signatures: &[Signature]) -> bool {
    signatures.iter().any(|parts| {
        !parts.is_empty()
            && parts
                .iter()
                .all(|part| !part.is_empty() && text.contains(part.as_str()))
    })
}

fn reviewer_invoked(text: &str, keyword: &str, markers: &Markers) -> bool {
    !keyword.is_empty()
        && !markers.role_marker.is_empty()
        && text.contains(keyword)
        && text.contains(markers.role_marker.as_str())
}

/// Quote-delimited pieces of serialized JSON, with escaped backslashes undone
/// so Windows paths classify the same as they would unserialized.
fn string_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split('"')
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.replace(r"\\", r"\"))
}
