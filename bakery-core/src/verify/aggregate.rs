use serde::{Deserialize, Serialize};

use super::VerificationFragment;

/// Reduce verifier outcomes to a single pass/fail decision.
///
/// A document passes when no fragment is `INVALID` or `ERROR` and at least
/// one is `VALID`. `SKIPPED` fragments (checks that do not apply to this
/// kind of document) are ignored, so an empty or all-skipped list fails.
pub fn is_valid(fragments: &[VerificationFragment]) -> bool {
    !fragments.iter().any(VerificationFragment::is_failure)
        && fragments.iter().any(VerificationFragment::is_success)
}

/// Summary of a verification for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Verdict {
    /// No fragments yet.
    Pending,
    Valid,
    /// Names of the fragments that failed. When nothing failed but nothing
    /// passed either, the skipped checks are listed.
    Invalid { failed: Vec<String> },
}

impl Verdict {
    /// Build a verdict from a fragment list.
    ///
    /// Agrees with [`is_valid`]: an empty list is `Pending`, never `Valid`.
    pub fn from_fragments(fragments: &[VerificationFragment]) -> Self {
        if fragments.is_empty() {
            return Self::Pending;
        }
        if is_valid(fragments) {
            return Self::Valid;
        }
        let mut failed: Vec<String> = fragments
            .iter()
            .filter(|f| f.is_failure())
            .map(|f| f.name.clone())
            .collect();
        if failed.is_empty() {
            failed = fragments.iter().map(|f| f.name.clone()).collect();
        }
        Self::Invalid { failed }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}
