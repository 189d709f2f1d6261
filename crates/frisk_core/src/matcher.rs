//! Regex evaluation for a single payload under a cooperative deadline.

use std::fmt;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::finding::Finding;
use crate::payload::Payload;
use crate::rule::CompiledRuleset;
use crate::text::mask_secret;

/// A matched finding plus the raw matched text.
///
/// The raw value stays internal so the exclusion filter can compare exact
/// secret values without ever exposing them in the public [`Finding`].
pub(crate) struct Candidate {
    pub(crate) finding: Finding,
    pub(crate) raw: Option<Box<str>>,
}

impl Candidate {
    pub(crate) fn timed_out(payload_id: &str) -> Self {
        Self {
            finding: Finding::payload_timeout(payload_id),
            raw: None,
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("finding", &self.finding)
            .field("raw", &self.raw.as_deref().map(mask_secret))
            .finish()
    }
}

/// Result of matching one payload.
#[derive(Debug)]
pub(crate) enum MatchOutcome {
    /// Every candidate rule was evaluated; the matches (possibly none).
    Completed(Vec<Candidate>),
    /// The deadline expired mid-payload; partial matches were discarded.
    TimedOut,
}

/// Runs the candidate rules against one payload, in ruleset order.
///
/// Each non-overlapping regex match yields one candidate, left to right.
/// The deadline is checked between rule evaluations, not only at entry; a
/// single rule's evaluation can still overrun it, which is bounded by the
/// regex crate's linear-time engine. On expiry the payload's partial
/// matches are discarded so the payload reports exactly one timeout
/// finding instead of a mix.
pub(crate) fn match_payload(
    ruleset: &CompiledRuleset,
    payload: &Payload,
    rule_indices: &[usize],
    deadline: Option<Instant>,
) -> MatchOutcome {
    let mut candidates = Vec::new();

    for &rule_idx in rule_indices {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return MatchOutcome::TimedOut;
        }

        let Some(rule) = ruleset.rule(rule_idx) else {
            continue;
        };

        for mat in rule.regex.find_iter(payload.data()) {
            let line_number = payload.line_number_at(mat.start());

            #[cfg(feature = "tracing")]
            trace!(rule_id = %rule.id, payload_id = %payload.id(), line = line_number, "match");

            candidates.push(Candidate {
                finding: Finding::found(payload.id(), line_number, rule),
                raw: Some(mat.as_str().into()),
            });
        }
    }

    MatchOutcome::Completed(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_rule, make_ruleset};

    fn all_indices(ruleset: &CompiledRuleset) -> Vec<usize> {
        (0..ruleset.len()).collect()
    }

    fn completed(outcome: MatchOutcome) -> Vec<Candidate> {
        match outcome {
            MatchOutcome::Completed(candidates) => candidates,
            MatchOutcome::TimedOut => unreachable!("payload unexpectedly timed out"),
        }
    }

    #[test]
    fn single_match_reports_rule_and_line() {
        let ruleset = make_ruleset(vec![make_rule("test/token", r"TOKEN_[A-Z]{4}", &[])]);
        let payload = Payload::new("blob-1", "line1\nkey = TOKEN_ABCD\n");

        let candidates = completed(match_payload(&ruleset, &payload, &all_indices(&ruleset), None));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].finding.rule_id.as_deref(), Some("test/token"));
        assert_eq!(candidates[0].finding.line_number, Some(2));
        assert_eq!(candidates[0].raw.as_deref(), Some("TOKEN_ABCD"));
    }

    #[test]
    fn payload_offset_shifts_reported_lines() {
        let ruleset = make_ruleset(vec![make_rule("test/token", r"TOKEN", &[])]);
        let payload = Payload::new("blob-1", "a\nb\nTOKEN").with_offset(100);

        let candidates = completed(match_payload(&ruleset, &payload, &all_indices(&ruleset), None));

        assert_eq!(candidates[0].finding.line_number, Some(103));
    }

    #[test]
    fn matches_are_ordered_by_rule_then_occurrence() {
        let ruleset = make_ruleset(vec![
            make_rule("test/a", r"AAA", &[]),
            make_rule("test/b", r"BBB", &[]),
        ]);
        let payload = Payload::new("blob-1", "BBB AAA BBB AAA");

        let candidates = completed(match_payload(&ruleset, &payload, &all_indices(&ruleset), None));

        let ids: Vec<_> = candidates
            .iter()
            .map(|c| (c.finding.rule_id.as_deref().unwrap(), c.finding.line_number.unwrap()))
            .collect();
        assert_eq!(ids, vec![("test/a", 1), ("test/a", 1), ("test/b", 1), ("test/b", 1)]);
    }

    #[test]
    fn only_candidate_rules_are_evaluated() {
        let ruleset = make_ruleset(vec![
            make_rule("test/a", r"SHARED", &[]),
            make_rule("test/b", r"SHARED", &[]),
        ]);
        let payload = Payload::new("blob-1", "SHARED");

        let candidates = completed(match_payload(&ruleset, &payload, &[1], None));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].finding.rule_id.as_deref(), Some("test/b"));
    }

    #[test]
    fn expired_deadline_times_out_before_any_rule_runs() {
        let ruleset = make_ruleset(vec![make_rule("test/token", r"TOKEN", &[])]);
        let payload = Payload::new("blob-1", "TOKEN");
        let expired = Instant::now();

        let outcome = match_payload(&ruleset, &payload, &all_indices(&ruleset), Some(expired));

        assert!(matches!(outcome, MatchOutcome::TimedOut));
    }

    #[test]
    fn no_matches_completes_with_empty_candidates() {
        let ruleset = make_ruleset(vec![make_rule("test/token", r"TOKEN", &[])]);
        let payload = Payload::new("blob-1", "nothing here");

        let candidates = completed(match_payload(&ruleset, &payload, &all_indices(&ruleset), None));

        assert!(candidates.is_empty());
    }

    #[test]
    fn candidate_debug_masks_the_raw_value() {
        let ruleset = make_ruleset(vec![make_rule("test/token", r"TOKEN_[A-Z_]{16}", &[])]);
        let payload = Payload::new("blob-1", "TOKEN_AAAABBBBCCCCDDDD");

        let candidates = completed(match_payload(&ruleset, &payload, &all_indices(&ruleset), None));

        let debug = format!("{:?}", candidates[0]);
        assert!(!debug.contains("AAAABBBBCCCCDDDD"));
    }
}
