//! Human-readable and JSON renderings of analysis results.

use crate::analysis::{AnalysisResult, BatchEntry, SourceFormat};
use crate::chain::ChainStatus;
use crate::fields::{CertificateRecord, DistinguishedName};
use crate::CertlinkError;

/// SAN entries listed in the summary before the rest are counted.
const MAX_LISTED_DOMAINS: usize = 10;

/// Format an analysis result as text.
///
/// The summary covers the container, the chain narrative and the leaf.
/// With `details`, every certificate is listed in full with its extensions.
pub fn render_text(result: &AnalysisResult, details: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("Format: {}\n", result.format));
    if result.format == SourceFormat::Pkcs12 {
        let key = match result.container.private_key_present {
            Some(true) => "present",
            _ => "absent",
        };
        out.push_str(&format!("Private Key: {}\n", key));
        out.push_str(&format!(
            "Extra Certificates: {}\n",
            result.container.extra_certificates
        ));
    }

    let chain = &result.chain;
    match chain.status {
        ChainStatus::Single => out.push_str(&format!("Chain: {}\n", chain.status)),
        _ => out.push_str(&format!(
            "Chain: {} ({} certificates)\n",
            chain.status, chain.certificate_count
        )),
    }
    for finding in &chain.findings {
        out.push_str(&format!("  {}\n", finding));
    }

    if let Some(leaf) = result.leaf() {
        out.push('\n');
        render_summary(&mut out, leaf);
    }

    if details {
        for (i, record) in result.certificates.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("Certificate {}:\n", i + 1));
            render_details(&mut out, record);
        }
    }

    out
}

/// Format an analysis failure as text.
pub fn render_error(err: &CertlinkError) -> String {
    let hint = match err {
        CertlinkError::InvalidPassphraseOrCorrupt => {
            Some("check the password, or whether the file is damaged")
        }
        CertlinkError::NoCertificateFound => Some("is this a PEM file?"),
        _ => None,
    };
    match hint {
        Some(hint) => format!("Error: {} ({})\n", err, hint),
        None => format!("Error: {}\n", err),
    }
}

fn render_summary(out: &mut String, cert: &CertificateRecord) {
    out.push_str(&format!("Subject: {}\n", cert.subject_summary()));
    out.push_str(&format!("Issuer: {}\n", cert.issuer_summary()));
    out.push_str(&format!("Serial: {}\n", cert.serial));
    out.push_str("Validity:\n");
    out.push_str(&format!("  Not Before: {}\n", cert.validity.not_before));
    out.push_str(&format!("  Not After:  {}\n", cert.validity.not_after));
    out.push_str(&format!("  Status: {}\n", cert.validity.status));
    out.push_str(&format!("Public Key: {}\n", cert.public_key));

    if !cert.san_dns.is_empty() {
        out.push_str("Domains (SAN):\n");
        for name in cert.san_dns.iter().take(MAX_LISTED_DOMAINS) {
            out.push_str(&format!("  - {}\n", name));
        }
        if cert.san_dns.len() > MAX_LISTED_DOMAINS {
            out.push_str(&format!(
                "  ... and {} more\n",
                cert.san_dns.len() - MAX_LISTED_DOMAINS
            ));
        }
    }

    out.push_str(&format!("Usage: {}\n", cert.usage_summary()));
}

fn render_details(out: &mut String, cert: &CertificateRecord) {
    out.push_str(&format!("  Version: v{}\n", cert.version));
    out.push_str(&format!("  Serial: {}\n", cert.serial));
    out.push_str(&format!("  Signature Algorithm: {}\n", cert.signature_algorithm));
    render_dn(out, "Issuer", &cert.issuer);
    render_dn(out, "Subject", &cert.subject);
    out.push_str("  Validity:\n");
    out.push_str(&format!("    Not Before: {}\n", cert.validity.not_before));
    out.push_str(&format!("    Not After:  {}\n", cert.validity.not_after));
    out.push_str(&format!("  Public Key: {}\n", cert.public_key));
    out.push_str(&format!("  Fingerprint (SHA-256): {}\n", cert.fingerprint_sha256));

    if !cert.extensions.is_empty() {
        out.push_str("  Extensions:\n");
        for ext in &cert.extensions {
            let critical = if ext.critical { "critical" } else { "non-critical" };
            out.push_str(&format!("    {} ({})\n", ext.name, critical));
            out.push_str(&format!("      Value: {}\n", ext.value));
        }
    }
}

fn render_dn(out: &mut String, label: &str, dn: &DistinguishedName) {
    out.push_str(&format!("  {}:\n", label));
    for (key, value) in &dn.components {
        out.push_str(&format!("    {}: {}\n", key, value));
    }
}

/// Serialize an analysis result to a pretty-printed JSON string.
pub fn to_json(result: &AnalysisResult) -> Result<String, CertlinkError> {
    serde_json::to_string_pretty(result).map_err(CertlinkError::Json)
}

/// Serialize batch entries to a pretty-printed JSON array.
pub fn batch_to_json(entries: &[BatchEntry]) -> Result<String, CertlinkError> {
    serde_json::to_string_pretty(entries).map_err(CertlinkError::Json)
}
