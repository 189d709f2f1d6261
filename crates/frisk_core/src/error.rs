use thiserror::Error;

/// Errors that can occur when compiling a detection ruleset.
///
/// Compilation is the only fallible step in the engine: a ruleset with a
/// malformed regex cannot be partially used, so the whole scan call is
/// refused. Every runtime failure mode (payload timeouts, the whole-scan
/// deadline, worker crashes) degrades to typed outcome values instead.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A rule's regular expression failed to parse.
    #[error("invalid regex in rule '{id}': {source}")]
    InvalidRegex {
        /// Identifier of the rule that failed (e.g. `"gitlab_personal_access_token"`).
        id: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },
}
