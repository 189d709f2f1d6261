//! Test utilities for `frisk_core` (compiled only during testing).

use regex::Regex;

use crate::payload::Payload;
use crate::rule::{CompiledRuleset, Rule};

pub fn make_rule(id: &str, regex: &str, keywords: &[&str]) -> Rule {
    Rule {
        id: id.into(),
        description: format!("{id} description").into(),
        regex: Regex::new(regex).unwrap(),
        tags: Box::default(),
        keywords: keywords.iter().map(|&k| k.into()).collect(),
    }
}

pub fn make_ruleset(rules: Vec<Rule>) -> CompiledRuleset {
    CompiledRuleset::new("test ruleset", rules)
}

pub fn make_payload(id: &str, data: &str) -> Payload {
    Payload::new(id, data)
}
