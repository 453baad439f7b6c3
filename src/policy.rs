use crate::config::Require;
use crate::scan::SessionFlags;

/// An implication over the session flags: if `applies` then `satisfied`, else `message`
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&SessionFlags) -> bool,
    pub satisfied: fn(&SessionFlags) -> bool,
    pub enabled: fn(&Require) -> bool,
    pub message: &'static str,
}

/// Evaluated in this order; the missing-actions list follows it. Every
/// code-written reminder comes before the test and UI reviews.
pub const RULES: &[Rule] = &[
    Rule {
        name: "code-review",
        applies: |f| f.wrote_code,
        satisfied: |f| f.ran_code_review,
        enabled: |r| r.code_review,
        message: "Run the code-quality agent to check for DRY/KISS/SRP/Angular violations: Task tool with subagent_type='code-quality'",
    },
    Rule {
        name: "lint-or-build",
        applies: |f| f.wrote_code,
        satisfied: |f| f.ran_lint || f.ran_build,
        enabled: |r| r.lint_or_build,
        message: "Run verification: `nx affected -t lint && nx affected -t build`",
    },
    Rule {
        name: "unit-tests",
        applies: |f| f.wrote_code,
        satisfied: |f| f.ran_unit_tests,
        enabled: |r| r.unit_tests,
        message: "Run unit tests: `nx affected -t test`",
    },
    Rule {
        name: "e2e",
        applies: |f| f.wrote_code,
        satisfied: |f| f.mentioned_e2e,
        enabled: |r| r.e2e,
        message: "Consider: Do e2e tests need to be run? (`nx e2e` or relevant e2e project)",
    },
    Rule {
        name: "test-review",
        applies: |f| f.wrote_tests,
        satisfied: |f| f.ran_test_review,
        enabled: |r| r.test_review,
        message: "Run the test-reviewer agent to verify test integrity: Task tool with subagent_type='test-reviewer'",
    },
    Rule {
        name: "accessibility-review",
        applies: |f| f.wrote_ui,
        satisfied: |f| f.ran_accessibility_review,
        enabled: |r| r.accessibility_review,
        message: "Run the a11y-auditor agent for WCAG 2.1 AA / ADA compliance: Task tool with subagent_type='a11y-auditor'",
    },
];

/// Messages for every enabled rule that applies and is not satisfied, in rule order.
pub fn missing_actions(flags: &SessionFlags, require: &Require) -> Vec<String> {
    let mut missing = Vec::new();

    for rule in RULES {
        if !(rule.enabled)(require) || !(rule.applies)(flags) {
            continue;
        }
        if (rule.satisfied)(flags) {
            tracing::debug!("rule {}: pass", rule.name);
        } else {
            tracing::debug!("rule {}: missing", rule.name);
            missing.push(rule.message.to_string());
        }
    }

    missing
}
