//! certlink-lib: offline analysis of X.509 certificate chains.
//!
//! Loads certificates from PEM bundles, single DER files, or password-protected
//! PKCS#12 containers, extracts a readable summary of each certificate, and
//! classifies whether the supplied material forms a complete chain of trust.
//!
//! The analysis is name based: it checks issuer/subject linkage and
//! self-signature by name only. It does not verify signatures, consult a trust
//! store, or check revocation.

mod analysis;
mod chain;
mod decode;
mod display;
mod fields;
mod fingerprint;
mod matcher;
mod oid;
mod parser;
mod util;

pub use analysis::{
    analyze, analyze_many, analyze_many_parallel, analyze_many_with_progress,
    analyze_with_options, AnalysisResult, AnalyzeOptions, BatchEntry, BatchInput, BatchProgress,
    BatchSummary, ContainerInfo, SourceFormat, DEFAULT_EXPIRING_SOON_DAYS,
};
pub use chain::{
    assess_ordered, assess_unordered, Assembly, ChainLink, ChainStatus, ChainVerdict,
};
pub use display::{batch_to_json, render_error, render_text, to_json};
pub use fields::{
    CaMarking, CertificateRecord, DateTime, DigestAlgorithm, DistinguishedName, ExtensionEntry,
    ExtensionValue, KeyFamily, PublicKeyDescriptor, Validity, ValidityStatus,
};
pub use fingerprint::compute_fingerprint;
pub use matcher::{classify_link, LinkStrength, NameMatcher, DEFAULT_PARTIAL_MATCH_THRESHOLD};
pub use parser::{classify_validity, parse_record};

/// Errors returned by certlink-lib.
#[derive(Debug, thiserror::Error)]
pub enum CertlinkError {
    #[error("No certificate found: the input contains no BEGIN/END CERTIFICATE block")]
    NoCertificateFound,

    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("Invalid passphrase or corrupt container")]
    InvalidPassphraseOrCorrupt,

    #[error("Container holds no certificate")]
    EmptyContainer,

    #[error("Extension value could not be parsed: {0}")]
    ExtensionParseFailure(String),

    #[error("Validity dates could not be compared")]
    DateComparisonFailure,

    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
