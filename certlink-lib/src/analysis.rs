//! Analysis entry points and the result model handed to renderers.

use crate::chain::{self, ChainVerdict};
use crate::decode;
use crate::fields::CertificateRecord;
use crate::matcher::{NameMatcher, DEFAULT_PARTIAL_MATCH_THRESHOLD};
use crate::parser;
use crate::CertlinkError;
use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Days before expiry at which a certificate counts as expiring soon.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

/// Declared container format of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Base64 text with one or more certificate blocks.
    TextBundle,
    /// One binary DER certificate.
    BinarySingle,
    /// Passphrase-protected PKCS#12 archive.
    Pkcs12,
}

impl SourceFormat {
    /// Format for a file extension (without the dot), case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pem" | "crt" | "cer" => Some(SourceFormat::TextBundle),
            "der" => Some(SourceFormat::BinarySingle),
            "pfx" | "p12" => Some(SourceFormat::Pkcs12),
            _ => None,
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::TextBundle => write!(f, "PEM text bundle"),
            SourceFormat::BinarySingle => write!(f, "DER certificate"),
            SourceFormat::Pkcs12 => write!(f, "PKCS#12 archive"),
        }
    }
}

/// Options controlling analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Evaluate validity at a specific Unix timestamp instead of the current
    /// time.
    pub at_time: Option<i64>,
    /// Fewer whole days than this before expiry is reported as expiring soon.
    pub expiring_soon_days: i64,
    /// Shared name attributes required for a partial issuer match.
    pub partial_match_threshold: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            at_time: None,
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            partial_match_threshold: DEFAULT_PARTIAL_MATCH_THRESHOLD,
        }
    }
}

impl AnalyzeOptions {
    /// Unix timestamp validity is evaluated against.
    pub fn evaluation_time(&self) -> i64 {
        self.at_time
            .unwrap_or_else(|| ::time::OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn matcher(&self) -> NameMatcher {
        NameMatcher::new(self.partial_match_threshold)
    }
}

/// Container-level facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    /// Whether a private key was found. Only known for PKCS#12 archives.
    pub private_key_present: Option<bool>,
    /// Certificates bundled alongside the leaf.
    pub extra_certificates: usize,
}

/// Everything learned from one input.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub format: SourceFormat,
    /// Decoded certificates, leaf first.
    pub certificates: Vec<CertificateRecord>,
    pub chain: ChainVerdict,
    pub container: ContainerInfo,
}

impl AnalysisResult {
    pub fn leaf(&self) -> Option<&CertificateRecord> {
        self.certificates.first()
    }

    pub fn is_complete(&self) -> bool {
        self.chain.is_complete()
    }
}

/// Analyze one input with default options.
pub fn analyze(
    data: &[u8],
    format: SourceFormat,
    passphrase: Option<&str>,
) -> Result<AnalysisResult, CertlinkError> {
    analyze_with_options(data, format, passphrase, &AnalyzeOptions::default())
}

/// Analyze one input.
///
/// The passphrase is only consulted for PKCS#12 archives.
pub fn analyze_with_options(
    data: &[u8],
    format: SourceFormat,
    passphrase: Option<&str>,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, CertlinkError> {
    match format {
        SourceFormat::TextBundle => analyze_text_bundle(data, options),
        SourceFormat::BinarySingle => analyze_binary(data, options),
        SourceFormat::Pkcs12 => analyze_pkcs12(data, passphrase, options),
    }
}

fn analyze_text_bundle(
    data: &[u8],
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, CertlinkError> {
    let blocks = decode::scan_text_bundle(data)?;
    let block_count = blocks.len();

    let mut certificates = Vec::with_capacity(block_count);
    let mut failures = Vec::new();
    for block in blocks {
        let parsed = block
            .der
            .and_then(|der| parser::parse_record(&der, options));
        match parsed {
            Ok(record) => certificates.push(record),
            Err(e) if block.index == 0 => return Err(into_malformed(e)),
            Err(e) => {
                warn!(block = block.index + 1, error = %e, "bundle member could not be decoded");
                failures.push((block.index, e.to_string()));
            }
        }
    }

    let chain = if failures.is_empty() {
        chain::assess_ordered(&certificates, &options.matcher())
    } else {
        ChainVerdict::failed(block_count, &failures)
    };

    Ok(AnalysisResult {
        format: SourceFormat::TextBundle,
        container: ContainerInfo {
            private_key_present: None,
            extra_certificates: block_count - 1,
        },
        certificates,
        chain,
    })
}

fn analyze_binary(
    data: &[u8],
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, CertlinkError> {
    let der = decode::binary_single(data)?;
    let record = parser::parse_record(der, options)?;
    let certificates = vec![record];
    let chain = chain::assess_ordered(&certificates, &options.matcher());

    Ok(AnalysisResult {
        format: SourceFormat::BinarySingle,
        certificates,
        chain,
        container: ContainerInfo {
            private_key_present: None,
            extra_certificates: 0,
        },
    })
}

fn analyze_pkcs12(
    data: &[u8],
    passphrase: Option<&str>,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, CertlinkError> {
    let contents = decode::open_pkcs12(data, passphrase)?;
    let extra_certificates = contents.extras.len();

    let mut records = Vec::with_capacity(extra_certificates + 1);
    records.push(parser::parse_record(&contents.primary, options)?);
    for der in &contents.extras {
        records.push(parser::parse_record(der, options)?);
    }

    let assembly = chain::assess_unordered(&records);
    let certificates = assembly
        .order
        .iter()
        .filter_map(|&i| records.get(i).cloned())
        .collect();

    Ok(AnalysisResult {
        format: SourceFormat::Pkcs12,
        certificates,
        chain: assembly.verdict,
        container: ContainerInfo {
            private_key_present: Some(contents.private_key_present),
            extra_certificates,
        },
    })
}

fn into_malformed(err: CertlinkError) -> CertlinkError {
    match err {
        CertlinkError::MalformedCertificate(_) => err,
        other => CertlinkError::MalformedCertificate(other.to_string()),
    }
}

// ── Batch analysis ───────────────────────────────────────────────────────

/// One file queued for batch analysis.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub path: PathBuf,
    pub data: Vec<u8>,
    pub format: SourceFormat,
    pub passphrase: Option<String>,
}

/// Outcome for one batch input.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: Result<AnalysisResult, CertlinkError>,
}

impl BatchEntry {
    /// Entry for a path whose bytes never reached the analyzer, so it still
    /// takes its place in batch output and counts.
    pub fn unreadable(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        BatchEntry {
            path: path.into(),
            outcome: Err(CertlinkError::Io(error)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Serialize for BatchEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BatchEntry", 3)?;
        s.serialize_field("path", &self.path.display().to_string())?;
        match &self.outcome {
            Ok(result) => {
                s.serialize_field("status", "success")?;
                s.serialize_field("result", result)?;
            }
            Err(e) => {
                s.serialize_field("status", "error")?;
                s.serialize_field("error", &e.to_string())?;
            }
        }
        s.end()
    }
}

/// Progress report passed to the batch callback after each input.
#[derive(Debug)]
pub struct BatchProgress<'a> {
    /// Inputs finished so far, including this one.
    pub completed: usize,
    pub total: usize,
    pub entry: &'a BatchEntry,
}

/// Counts shown after a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Successful inputs whose chain is complete.
    pub complete_chains: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = BatchSummary {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match &entry.outcome {
                Ok(result) => {
                    summary.succeeded += 1;
                    if result.is_complete() {
                        summary.complete_chains += 1;
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files analyzed: {} succeeded, {} failed, {} complete chains",
            self.total, self.succeeded, self.failed, self.complete_chains
        )
    }
}

/// Analyze inputs sequentially with default options, preserving order.
pub fn analyze_many(inputs: &[BatchInput]) -> Vec<BatchEntry> {
    analyze_many_with_progress(inputs, &AnalyzeOptions::default(), |_| {})
}

/// Analyze inputs sequentially, calling `on_progress` after each one.
/// A failing input is recorded and the batch continues.
pub fn analyze_many_with_progress<F>(
    inputs: &[BatchInput],
    options: &AnalyzeOptions,
    mut on_progress: F,
) -> Vec<BatchEntry>
where
    F: FnMut(&BatchProgress<'_>),
{
    let total = inputs.len();
    let mut entries = Vec::with_capacity(total);
    for (i, input) in inputs.iter().enumerate() {
        let entry = analyze_entry(input, options);
        on_progress(&BatchProgress {
            completed: i + 1,
            total,
            entry: &entry,
        });
        entries.push(entry);
    }
    entries
}

/// Analyze inputs on the rayon thread pool. Results keep input order.
pub fn analyze_many_parallel(inputs: &[BatchInput], options: &AnalyzeOptions) -> Vec<BatchEntry> {
    inputs
        .par_iter()
        .map(|input| analyze_entry(input, options))
        .collect()
}

fn analyze_entry(input: &BatchInput, options: &AnalyzeOptions) -> BatchEntry {
    let outcome = analyze_with_options(
        &input.data,
        input.format,
        input.passphrase.as_deref(),
        options,
    );
    match &outcome {
        Ok(result) => info!(
            path = %input.path.display(),
            certificates = result.certificates.len(),
            chain = %result.chain.status,
            "analyzed"
        ),
        Err(e) => info!(path = %input.path.display(), error = %e, "analysis failed"),
    }
    BatchEntry {
        path: input.path.clone(),
        outcome,
    }
}
