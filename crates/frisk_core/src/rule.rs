//! Rule definitions and the compiled, keyword-indexed ruleset.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Plain-data definition of a single detection rule.
///
/// Definitions arrive from an external config-loading collaborator; they
/// derive serde traits so a ruleset parsed from TOML, YAML, or JSON can be
/// handed to [`CompiledRuleset::compile`] without the engine owning any
/// file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Stable identifier (e.g. `"gitlab_personal_access_token"`).
    pub id: String,
    /// Human-readable description of what the rule detects.
    #[serde(default)]
    pub description: String,
    /// Regular expression source that matches the secret.
    pub regex: String,
    /// Free-form labels carried through for downstream tooling.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lower-cased literal substrings used for keyword pre-filtering. If
    /// non-empty, the rule is only evaluated against payloads that contain
    /// at least one keyword.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// An ordered collection of rule definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesetDef {
    /// Display title of the ruleset.
    #[serde(default)]
    pub title: String,
    /// The rules, in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// A compiled detection rule ready for scanning.
///
/// Immutable once compiled; shared read-only across all workers with no
/// per-call mutable state.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier echoed into findings.
    pub id: Arc<str>,
    /// Description inherited by findings from this rule.
    pub description: Box<str>,
    /// Compiled regular expression that matches the secret.
    pub regex: Regex,
    /// Free-form labels carried through for downstream tooling.
    pub tags: Box<[Box<str>]>,
    /// Keyword pre-filter literals. Rules without keywords are evaluated
    /// against every payload.
    pub keywords: Box<[Box<str>]>,
}

impl Rule {
    fn from_def(def: &RuleDef) -> Result<Self, CompileError> {
        let regex = Regex::new(&def.regex).map_err(|source| CompileError::InvalidRegex {
            id: def.id.clone(),
            source,
        })?;

        Ok(Self {
            id: def.id.as_str().into(),
            description: def.description.as_str().into(),
            regex,
            tags: def.tags.iter().map(|t| t.as_str().into()).collect(),
            keywords: def.keywords.iter().map(|k| k.as_str().into()).collect(),
        })
    }
}

/// A compiled ruleset with an Aho-Corasick keyword index.
///
/// The index is built once at compile time so the scanner can cheaply
/// decide which rules are worth evaluating against a given payload. The
/// whole structure is read-only after construction and safe to share
/// across worker threads.
pub struct CompiledRuleset {
    title: Box<str>,
    rules: Vec<Rule>,
    keyword_automaton: Option<AhoCorasick>,
    keyword_to_rules: Vec<Vec<usize>>,
    rules_without_keywords: Vec<usize>,
}

impl fmt::Debug for CompiledRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRuleset")
            .field("title", &self.title)
            .field("rules", &self.rules.len())
            .field("rules_without_keywords", &self.rules_without_keywords.len())
            .finish_non_exhaustive()
    }
}

impl CompiledRuleset {
    /// Compiles every rule definition, failing on the first invalid regex.
    pub fn compile(def: &RulesetDef) -> Result<Self, CompileError> {
        let rules = def.rules.iter().map(Rule::from_def).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(def.title.as_str(), rules))
    }

    /// Creates a ruleset from already-compiled rules, building the keyword index.
    #[must_use]
    pub fn new(title: impl Into<Box<str>>, rules: Vec<Rule>) -> Self {
        let keyword_index = build_keyword_index(&rules);
        let keyword_automaton = build_automaton(&keyword_index.keywords);

        Self {
            title: title.into(),
            rules,
            keyword_automaton,
            keyword_to_rules: keyword_index.keyword_to_rules,
            rules_without_keywords: keyword_index.rules_without_keywords,
        }
    }

    /// Returns the ruleset title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns all rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by its positional index.
    #[must_use]
    pub fn rule(&self, idx: usize) -> Option<&Rule> {
        self.rules.get(idx)
    }

    /// Looks up a rule by its identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.as_ref() == id)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the ruleset contains no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns, in evaluation order, the indices of rules worth running
    /// against `content`: rules with at least one keyword present, plus
    /// rules without keywords (which cannot be pre-filtered).
    ///
    /// An empty result means `content` cannot match any rule and the
    /// expensive regex pass can be skipped entirely. Keyword search is
    /// ASCII case-insensitive, so the pre-filter can only widen the
    /// candidate set, never drop a payload a rule could match.
    #[must_use]
    pub fn candidate_rules(&self, content: &str) -> Vec<usize> {
        let mut should_run = vec![false; self.rules.len()];

        for &idx in &self.rules_without_keywords {
            should_run[idx] = true;
        }

        if let Some(automaton) = &self.keyword_automaton {
            for mat in automaton.find_iter(content) {
                let keyword_idx = mat.pattern().as_usize();
                for &rule_idx in &self.keyword_to_rules[keyword_idx] {
                    should_run[rule_idx] = true;
                }
            }
        }

        should_run
            .iter()
            .enumerate()
            .filter_map(|(idx, &run)| run.then_some(idx))
            .collect()
    }
}

struct KeywordIndex {
    keywords: Vec<String>,
    keyword_to_rules: Vec<Vec<usize>>,
    rules_without_keywords: Vec<usize>,
}

fn build_keyword_index(rules: &[Rule]) -> KeywordIndex {
    let mut keywords = Vec::new();
    let mut keyword_to_rules: Vec<Vec<usize>> = Vec::new();
    let mut rules_without_keywords = Vec::new();
    let mut keyword_positions: HashMap<&str, usize> = HashMap::new();

    for (rule_idx, rule) in rules.iter().enumerate() {
        if rule.keywords.is_empty() {
            rules_without_keywords.push(rule_idx);
            continue;
        }

        for keyword in &rule.keywords {
            if let Some(&existing_idx) = keyword_positions.get(keyword.as_ref()) {
                keyword_to_rules[existing_idx].push(rule_idx);
            } else {
                let new_idx = keywords.len();
                keyword_positions.insert(keyword.as_ref(), new_idx);
                keywords.push(keyword.to_string());
                keyword_to_rules.push(vec![rule_idx]);
            }
        }
    }

    KeywordIndex {
        keywords,
        keyword_to_rules,
        rules_without_keywords,
    }
}

fn build_automaton(keywords: &[String]) -> Option<AhoCorasick> {
    if keywords.is_empty() {
        return None;
    }

    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(aho_corasick::MatchKind::LeftmostLongest)
        .build(keywords)
        .ok()
}
