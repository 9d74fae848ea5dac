//! Semantic checks of a rule against the component that owns it.
//!
//! Nothing here fails: every problem found is returned as a
//! [`SemanticViolation`] so an editor can show them all at once.

use crate::byrule::ByRuleKind;
use crate::error::SemanticViolation;
use crate::rule::RecurrenceRule;
use crate::stream::until_hint;
use crate::temporal::Temporal;

/// What the owning component contributes to validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentContext {
    /// The component's DTSTART.
    pub start: Temporal,
}

impl ParentContext {
    pub fn new(start: Temporal) -> Self {
        Self { start }
    }
}

impl RecurrenceRule {
    /// Every semantic problem of this rule relative to `parent`; empty when valid.
    pub fn errors(&self, parent: &ParentContext) -> Vec<SemanticViolation> {
        let start = &parent.start;
        let mut violations = Vec::new();

        for value in self.recurrence_overrides() {
            if value.kind() != start.kind() {
                violations.push(SemanticViolation::OverrideKindMismatch {
                    value: value.to_string(),
                    found: value.kind(),
                    expected: start.kind(),
                });
            }
        }

        if let Some(until) = self.until() {
            match until.convert(start.kind(), &until_hint(start)) {
                Ok(converted) if converted < *start => {
                    violations.push(SemanticViolation::UntilBeforeStart {
                        until: converted.to_string(),
                        start: start.to_string(),
                    });
                }
                Ok(_) => {}
                Err(error) => violations.push(SemanticViolation::UntilNotComparable {
                    until: until.to_string(),
                    reason: error.to_string(),
                }),
            }
        }

        if self.count() < 0 {
            violations.push(SemanticViolation::NegativeCount {
                count: self.count(),
            });
        }

        if self.by_rule(ByRuleKind::SetPos).is_some() && self.by_rules().len() == 1 {
            violations.push(SemanticViolation::LoneSetPosition);
        }

        violations
    }

    /// [`RecurrenceRule::errors`] rendered for display.
    pub fn error_messages(&self, parent: &ParentContext) -> Vec<String> {
        self.errors(parent)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Whether [`RecurrenceRule::errors`] is empty.
    pub fn is_valid(&self, parent: &ParentContext) -> bool {
        self.errors(parent).is_empty()
    }
}
