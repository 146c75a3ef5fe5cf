//! Chain assembly and classification.
//!
//! Text bundles are assumed to be in issuance order (leaf first) and every
//! adjacent pair is checked with the [`NameMatcher`]. PKCS#12 archives carry
//! no ordering, so a leaf is picked heuristically and the chain is grown from
//! it by exact name equality.

use crate::fields::CertificateRecord;
use crate::matcher::{LinkStrength, NameMatcher};
use serde::Serialize;

/// Overall chain classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// Only one certificate; there is no chain to evaluate.
    Single,
    /// Every link holds and the last certificate is self-signed.
    Complete,
    Incomplete,
    /// A bundle member after the leaf could not be decoded.
    Failed,
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainStatus::Single => write!(f, "Single certificate"),
            ChainStatus::Complete => write!(f, "Complete chain"),
            ChainStatus::Incomplete => write!(f, "Incomplete chain"),
            ChainStatus::Failed => write!(f, "Chain check failed"),
        }
    }
}

/// One evaluated issuer-to-subject link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    /// Position of the issued certificate (0 = leaf).
    pub from: usize,
    /// Position of the candidate issuer certificate.
    pub to: usize,
    pub strength: LinkStrength,
    /// Issuer summary of the certificate at `from`.
    pub issuer: String,
    /// Subject summary of the certificate at `to`.
    pub subject: String,
}

/// Aggregate result of chain assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerdict {
    pub status: ChainStatus,
    /// Human-readable narrative, in evaluation order.
    pub findings: Vec<String>,
    pub links: Vec<ChainLink>,
    /// Whether the last certificate in the chain names itself as issuer.
    /// `None` when no certificate could be examined.
    pub final_self_signed: Option<bool>,
    /// Number of certificates considered.
    pub certificate_count: usize,
}

impl ChainVerdict {
    pub fn is_complete(&self) -> bool {
        self.status == ChainStatus::Complete
    }

    /// Verdict for a bundle in which some member after the leaf could not be
    /// decoded. `failures` pairs zero-based block positions with the reason.
    pub fn failed(certificate_count: usize, failures: &[(usize, String)]) -> Self {
        let findings = failures
            .iter()
            .map(|(index, reason)| {
                format!(
                    "Certificate {}: could not be decoded: {}",
                    index + 1,
                    reason
                )
            })
            .collect();
        ChainVerdict {
            status: ChainStatus::Failed,
            findings,
            links: Vec::new(),
            final_self_signed: None,
            certificate_count,
        }
    }

    fn single(record: Option<&CertificateRecord>, finding: &str) -> Self {
        ChainVerdict {
            status: ChainStatus::Single,
            findings: vec![finding.to_string()],
            links: Vec::new(),
            final_self_signed: record.map(CertificateRecord::is_self_signed),
            certificate_count: usize::from(record.is_some()),
        }
    }
}

/// Result of assembling an unordered certificate set.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub verdict: ChainVerdict,
    /// Input positions in assembled order: chain first, then leftovers in
    /// input order.
    pub order: Vec<usize>,
}

/// Assess certificates supplied in issuance order, leaf first.
///
/// Every adjacent pair is checked and reported; a weak link marks the chain
/// incomplete but does not stop evaluation.
pub fn assess_ordered(records: &[CertificateRecord], matcher: &NameMatcher) -> ChainVerdict {
    if records.len() < 2 {
        return ChainVerdict::single(
            records.first(),
            "Single certificate (no chain); an intermediate certificate may be required",
        );
    }

    let mut findings = Vec::new();
    let mut links = Vec::new();
    let mut all_strong = true;

    for (i, pair) in records.windows(2).enumerate() {
        let (Some(current), Some(next)) = (pair.first(), pair.get(1)) else {
            continue;
        };
        let issuer = current.issuer_summary();
        let subject = next.subject_summary();
        let strength = matcher.classify(&issuer, &subject);

        if strength.is_strong() {
            findings.push(format!(
                "Certificate {} -> {}: linked ({})",
                i + 1,
                i + 2,
                strength
            ));
        } else {
            all_strong = false;
            findings.push(format!(
                "Certificate {} -> {}: cannot be linked ({})",
                i + 1,
                i + 2,
                strength
            ));
            findings.push(format!("  Issuer:  {}", issuer));
            findings.push(format!("  Subject: {}", subject));
        }

        links.push(ChainLink {
            from: i,
            to: i + 1,
            strength,
            issuer,
            subject,
        });
    }

    let final_self_signed = records.last().map(CertificateRecord::is_self_signed);
    if final_self_signed == Some(true) {
        findings.push("Root CA: self-signed".to_string());
    } else {
        findings.push("Root CA: not self-signed (a higher CA may be required)".to_string());
    }

    let status = if all_strong && final_self_signed == Some(true) {
        ChainStatus::Complete
    } else {
        ChainStatus::Incomplete
    };

    ChainVerdict {
        status,
        findings,
        links,
        final_self_signed,
        certificate_count: records.len(),
    }
}

/// Assemble an unordered set, `certificates[0]` being the container's
/// primary certificate.
///
/// CA-marked certificates become candidates. The first certificate without
/// a CA marking is the leaf and later ones are candidates too; when every
/// certificate is CA-marked the primary is the leaf. The chain then grows
/// from the leaf by exact issuer/subject summary equality only.
pub fn assess_unordered(certificates: &[CertificateRecord]) -> Assembly {
    if certificates.len() < 2 {
        return Assembly {
            verdict: ChainVerdict::single(
                certificates.first(),
                "Single certificate (no intermediate CA in container)",
            ),
            order: (0..certificates.len()).collect(),
        };
    }

    let mut leaf: Option<usize> = None;
    let mut candidates = Vec::new();
    for (i, record) in certificates.iter().enumerate() {
        if !record.is_ca() && leaf.is_none() {
            leaf = Some(i);
        } else {
            candidates.push(i);
        }
    }
    let leaf = match leaf {
        Some(i) => i,
        None => {
            candidates = (1..certificates.len()).collect();
            0
        }
    };

    let mut findings = vec![format!("Leaf: certificate {}", leaf + 1)];
    let mut links = Vec::new();
    let mut chain = vec![leaf];
    let mut current = leaf;

    while !candidates.is_empty() {
        let Some(issuer) = certificates.get(current).map(CertificateRecord::issuer_summary) else {
            break;
        };
        let found = candidates.iter().position(|&c| {
            certificates
                .get(c)
                .is_some_and(|cand| cand.subject_summary() == issuer)
        });
        let Some(pos) = found else {
            break;
        };
        let next = candidates.remove(pos);
        let subject = certificates
            .get(next)
            .map(CertificateRecord::subject_summary)
            .unwrap_or_default();

        findings.push(format!(
            "Certificate {} -> {}: linked ({})",
            current + 1,
            next + 1,
            LinkStrength::Exact
        ));
        links.push(ChainLink {
            from: chain.len() - 1,
            to: chain.len(),
            strength: LinkStrength::Exact,
            issuer,
            subject,
        });
        chain.push(next);
        current = next;
    }

    let final_self_signed = certificates.get(current).map(CertificateRecord::is_self_signed);
    let status = if !candidates.is_empty() {
        findings.push(format!(
            "Incomplete chain (link error): {} certificate(s) could not be linked",
            candidates.len()
        ));
        ChainStatus::Incomplete
    } else if final_self_signed == Some(true) {
        findings.push("Root CA: self-signed".to_string());
        ChainStatus::Complete
    } else {
        findings.push("Incomplete chain (root CA missing)".to_string());
        ChainStatus::Incomplete
    };

    let certificate_count = certificates.len();
    let mut order = chain;
    order.extend(candidates);

    Assembly {
        verdict: ChainVerdict {
            status,
            findings,
            links,
            final_self_signed,
            certificate_count,
        },
        order,
    }
}
