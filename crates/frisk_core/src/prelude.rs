//! Convenience re-exports of the most commonly used types.

pub use crate::error::CompileError;
pub use crate::exclusion::{Exclusion, ExclusionKind};
pub use crate::finding::{Finding, FindingStatus};
pub use crate::options::ScanOptions;
pub use crate::payload::Payload;
pub use crate::response::{Response, Status};
pub use crate::rule::{CompiledRuleset, Rule, RuleDef, RulesetDef};
pub use crate::scanner::Scanner;
