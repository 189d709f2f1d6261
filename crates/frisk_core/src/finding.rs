//! Per-payload scan outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rule::Rule;

/// Outcome attached to a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingStatus {
    /// A rule matched at a specific line.
    Found,
    /// The payload's matching budget expired; any partial matches for the
    /// payload were discarded.
    PayloadTimeout,
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::PayloadTimeout => write!(f, "payload_timeout"),
        }
    }
}

/// One reported outcome (match or timeout) for a payload.
///
/// Findings are created once and never mutated. Within a response they are
/// ordered by payload position, then rule evaluation order, then match
/// occurrence order. The raw matched text is deliberately absent: it is
/// captured internally for exclusion filtering and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the payload this finding belongs to, echoed unchanged
    /// from the input.
    pub payload_id: Box<str>,
    /// Whether a rule matched or the payload timed out.
    pub status: FindingStatus,
    /// 1-based line number of the match, shifted by the payload's offset.
    /// `None` for timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    /// Identifier of the rule that matched. `None` for timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<Box<str>>,
    /// Description inherited from the matching rule. `None` for timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
}

impl Finding {
    /// Creates a `Found` finding for a rule match.
    #[must_use]
    pub fn found(payload_id: &str, line_number: u32, rule: &Rule) -> Self {
        Self {
            payload_id: payload_id.into(),
            status: FindingStatus::Found,
            line_number: Some(line_number),
            rule_id: Some(rule.id.as_ref().into()),
            description: Some(rule.description.clone()),
        }
    }

    /// Creates the single timeout finding a timed-out payload reports.
    #[must_use]
    pub fn payload_timeout(payload_id: &str) -> Self {
        Self {
            payload_id: payload_id.into(),
            status: FindingStatus::PayloadTimeout,
            line_number: None,
            rule_id: None,
            description: None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.rule_id, self.line_number) {
            (Some(rule_id), Some(line)) => {
                write!(f, "{}:{line}: {rule_id}", self.payload_id)
            }
            _ => write!(f, "{}: {}", self.payload_id, self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_rule;

    #[test]
    fn found_carries_rule_id_and_description() {
        let rule = make_rule("test/token", r"TOKEN", &[]);
        let finding = Finding::found("blob-1", 3, &rule);

        assert_eq!(finding.status, FindingStatus::Found);
        assert_eq!(finding.payload_id.as_ref(), "blob-1");
        assert_eq!(finding.line_number, Some(3));
        assert_eq!(finding.rule_id.as_deref(), Some("test/token"));
        assert!(finding.description.is_some());
    }

    #[test]
    fn payload_timeout_has_no_rule_fields() {
        let finding = Finding::payload_timeout("blob-1");

        assert_eq!(finding.status, FindingStatus::PayloadTimeout);
        assert_eq!(finding.line_number, None);
        assert_eq!(finding.rule_id, None);
        assert_eq!(finding.description, None);
    }

    #[test]
    fn findings_from_the_same_match_are_value_equal() {
        let rule = make_rule("test/token", r"TOKEN", &[]);
        assert_eq!(Finding::found("blob-1", 1, &rule), Finding::found("blob-1", 1, &rule));
        assert_ne!(Finding::found("blob-1", 1, &rule), Finding::found("blob-1", 2, &rule));
    }

    #[test]
    fn status_serializes_to_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&FindingStatus::Found).unwrap(), r#""FOUND""#);
        assert_eq!(
            serde_json::to_string(&FindingStatus::PayloadTimeout).unwrap(),
            r#""PAYLOAD_TIMEOUT""#
        );
    }

    #[test]
    fn timeout_finding_serializes_without_null_fields() {
        let json = serde_json::to_string(&Finding::payload_timeout("blob-1")).unwrap();
        assert_eq!(json, r#"{"payload_id":"blob-1","status":"PAYLOAD_TIMEOUT"}"#);
    }

    #[test]
    fn finding_round_trips_through_json() {
        let rule = make_rule("test/token", r"TOKEN", &[]);
        let finding = Finding::found("blob-1", 7, &rule);

        let json = serde_json::to_string(&finding).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();

        assert_eq!(finding, back);
    }

    #[test]
    fn display_shows_location_for_matches() {
        let rule = make_rule("test/token", r"TOKEN", &[]);
        let finding = Finding::found("blob-1", 7, &rule);
        assert_eq!(format!("{finding}"), "blob-1:7: test/token");
    }

    #[test]
    fn display_shows_status_for_timeouts() {
        let finding = Finding::payload_timeout("blob-1");
        assert_eq!(format!("{finding}"), "blob-1: payload_timeout");
    }
}
