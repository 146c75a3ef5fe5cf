//! Issuer/subject name linkage.
//!
//! Compares DN summary strings under progressively looser rules and reports
//! which rule matched, so callers can tell a solid link from a tentative one.

use serde::Serialize;
use std::collections::BTreeSet;

/// Shared `Key=Value` tokens needed for a [`LinkStrength::Partial`] match.
pub const DEFAULT_PARTIAL_MATCH_THRESHOLD: usize = 2;

/// Outcome of comparing an issuer name against a candidate subject name.
///
/// Variants are listed from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStrength {
    /// Identical after trimming surrounding whitespace.
    Exact,
    /// Same attribute set in a different order or spacing.
    Normalized,
    /// Common names agree.
    CommonName,
    /// Enough attributes overlap to suggest the same entity.
    Partial,
    Broken,
    /// One of the names was empty.
    InsufficientData,
}

impl LinkStrength {
    /// True for [`LinkStrength::Partial`] and anything stronger.
    pub fn is_strong(self) -> bool {
        matches!(
            self,
            LinkStrength::Exact
                | LinkStrength::Normalized
                | LinkStrength::CommonName
                | LinkStrength::Partial
        )
    }
}

impl std::fmt::Display for LinkStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LinkStrength::Exact => "exact",
            LinkStrength::Normalized => "normalized",
            LinkStrength::CommonName => "common name",
            LinkStrength::Partial => "partial",
            LinkStrength::Broken => "broken",
            LinkStrength::InsufficientData => "insufficient data",
        };
        write!(f, "{}", label)
    }
}

/// Name comparison with a configurable partial-match threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatcher {
    partial_threshold: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PARTIAL_MATCH_THRESHOLD)
    }
}

impl NameMatcher {
    pub fn new(partial_threshold: usize) -> Self {
        Self { partial_threshold }
    }

    pub fn partial_threshold(&self) -> usize {
        self.partial_threshold
    }

    /// Classify how `issuer` (from certificate *i*) relates to `subject`
    /// (from certificate *i+1*). The first matching rule wins.
    ///
    /// The normalized rule only applies when the names carry at least one
    /// `Key=Value` token: free text such as `foo` against `bar` is Broken
    /// rather than an equal pair of empty token lists. Summaries built from
    /// certificates always carry tokens, so this only shows up through
    /// [`classify_link`] and the `match` command.
    pub fn classify(&self, issuer: &str, subject: &str) -> LinkStrength {
        let issuer = issuer.trim();
        let subject = subject.trim();

        if issuer.is_empty() || subject.is_empty() {
            return LinkStrength::InsufficientData;
        }
        if issuer == subject {
            return LinkStrength::Exact;
        }

        let issuer_tokens = normalized_tokens(issuer);
        let subject_tokens = normalized_tokens(subject);
        if !issuer_tokens.is_empty() && issuer_tokens == subject_tokens {
            return LinkStrength::Normalized;
        }

        if let (Some(a), Some(b)) = (common_name(issuer), common_name(subject)) {
            if !a.is_empty() && a == b {
                return LinkStrength::CommonName;
            }
        }

        let issuer_set: BTreeSet<&String> = issuer_tokens.iter().collect();
        let shared = subject_tokens
            .iter()
            .collect::<BTreeSet<_>>()
            .intersection(&issuer_set)
            .count();
        if shared > 0 && shared >= self.partial_threshold {
            return LinkStrength::Partial;
        }

        LinkStrength::Broken
    }
}

/// Classify with the default partial-match threshold.
pub fn classify_link(issuer: &str, subject: &str) -> LinkStrength {
    NameMatcher::default().classify(issuer, subject)
}

/// Sorted `Key=Value` tokens with key and value trimmed. Pieces without `=`
/// are ignored.
fn normalized_tokens(name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = name
        .split(',')
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| format!("{}={}", key.trim(), value.trim()))
        .collect();
    tokens.sort();
    tokens
}

/// Value of the first `CN=` token, matching the key case-insensitively.
fn common_name(name: &str) -> Option<&str> {
    name.split(',').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.eq_ignore_ascii_case("CN").then(|| value.trim())
    })
}
