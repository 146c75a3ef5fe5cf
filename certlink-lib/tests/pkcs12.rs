#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! PKCS#12 archives and unordered chain assembly.

mod common;

use certlink_lib::*;
use common::{chain, params, pkcs12, self_signed};
use rcgen::{DnType, IsCa};

fn cn(record: &CertificateRecord) -> &str {
    record.subject.get("CN").unwrap()
}

#[test]
fn full_chain_in_archive_is_complete() {
    let c = chain();
    let data = pkcs12(
        Some(&c.leaf),
        Some(&c.leaf),
        &[&c.root, &c.intermediate],
        "secret",
    );
    let result = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap();

    assert_eq!(result.format, SourceFormat::Pkcs12);
    assert_eq!(result.container.private_key_present, Some(true));
    assert_eq!(result.container.extra_certificates, 2);
    assert_eq!(result.chain.status, ChainStatus::Complete);
    assert_eq!(result.chain.certificate_count, 3);
    assert_eq!(result.chain.final_self_signed, Some(true));

    let order: Vec<&str> = result.certificates.iter().map(cn).collect();
    assert_eq!(
        order,
        ["leaf.example.com", "Example Intermediate CA", "Example Root CA"]
    );
    assert!(result
        .chain
        .links
        .iter()
        .all(|l| l.strength == LinkStrength::Exact));
}

#[test]
fn missing_root_is_reported() {
    let c = chain();
    let data = pkcs12(Some(&c.leaf), Some(&c.leaf), &[&c.intermediate], "secret");
    let result = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap();

    assert_eq!(result.chain.status, ChainStatus::Incomplete);
    assert_eq!(result.chain.final_self_signed, Some(false));
    assert!(result
        .chain
        .findings
        .iter()
        .any(|f| f.contains("root CA missing")));
}

#[test]
fn leftover_candidates_are_reported_and_listed_last() {
    let c = chain();
    let stray = self_signed(params(&[(DnType::CommonName, "Stray Root")], common::ca()));
    let data = pkcs12(
        Some(&c.leaf),
        Some(&c.leaf),
        &[&stray, &c.intermediate, &c.root],
        "secret",
    );
    let result = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap();

    assert_eq!(result.chain.status, ChainStatus::Incomplete);
    assert!(result
        .chain
        .findings
        .iter()
        .any(|f| f.contains("1 certificate(s) could not be linked")));
    assert_eq!(result.certificates.len(), 4);
    assert_eq!(cn(&result.certificates[0]), "leaf.example.com");
    assert_eq!(cn(&result.certificates[3]), "Stray Root");
}

#[test]
fn archive_without_extras_is_single() {
    let leaf = chain().leaf;
    let data = pkcs12(Some(&leaf), Some(&leaf), &[], "secret");
    let result = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap();

    assert_eq!(result.chain.status, ChainStatus::Single);
    assert_eq!(result.container.extra_certificates, 0);
    assert_eq!(result.container.private_key_present, Some(true));
}

#[test]
fn wrong_passphrase() {
    let leaf = chain().leaf;
    let data = pkcs12(Some(&leaf), Some(&leaf), &[], "secret");
    let err = analyze(&data, SourceFormat::Pkcs12, Some("wrong")).unwrap_err();
    assert!(matches!(err, CertlinkError::InvalidPassphraseOrCorrupt));
}

#[test]
fn missing_passphrase_is_tried_as_empty() {
    let leaf = chain().leaf;
    let data = pkcs12(Some(&leaf), Some(&leaf), &[], "");
    let result = analyze(&data, SourceFormat::Pkcs12, None).unwrap();
    assert_eq!(cn(&result.certificates[0]), "leaf.example.com");

    let protected = pkcs12(Some(&leaf), Some(&leaf), &[], "secret");
    let err = analyze(&protected, SourceFormat::Pkcs12, None).unwrap_err();
    assert!(matches!(err, CertlinkError::InvalidPassphraseOrCorrupt));
}

#[test]
fn corrupt_archive_looks_like_bad_passphrase() {
    let err = analyze(b"definitely not pkcs12", SourceFormat::Pkcs12, Some("x")).unwrap_err();
    assert!(matches!(err, CertlinkError::InvalidPassphraseOrCorrupt));

    let leaf = chain().leaf;
    let mut data = pkcs12(Some(&leaf), Some(&leaf), &[], "secret");
    data.truncate(data.len() / 2);
    let err = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap_err();
    assert!(matches!(err, CertlinkError::InvalidPassphraseOrCorrupt));
}

#[test]
fn certificate_only_archive_has_no_primary() {
    let c = chain();
    let data = pkcs12(None, None, &[&c.intermediate, &c.root], "secret");
    let err = analyze(&data, SourceFormat::Pkcs12, Some("secret")).unwrap_err();

    assert!(matches!(err, CertlinkError::EmptyContainer));
    assert_eq!(render_error(&err), "Error: Container holds no certificate\n");
}

// ---------------------------------------------------------------------------
// Unordered assembly heuristic
// ---------------------------------------------------------------------------

fn records(certs: &[&common::Generated]) -> Vec<CertificateRecord> {
    let options = AnalyzeOptions::default();
    certs
        .iter()
        .map(|g| parse_record(&g.der, &options).unwrap())
        .collect()
}

#[test]
fn first_non_ca_becomes_leaf() {
    let c = chain();
    let assembly = assess_unordered(&records(&[&c.root, &c.leaf, &c.intermediate]));

    assert_eq!(assembly.order, [1, 2, 0]);
    assert_eq!(assembly.verdict.status, ChainStatus::Complete);
    assert_eq!(assembly.verdict.findings[0], "Leaf: certificate 2");
}

#[test]
fn later_non_ca_certificates_become_candidates() {
    let c = chain();
    let other = self_signed(params(&[(DnType::CommonName, "other leaf")], IsCa::NoCa));
    let assembly = assess_unordered(&records(&[&c.leaf, &other, &c.intermediate, &c.root]));

    assert_eq!(assembly.order, [0, 2, 3, 1]);
    assert_eq!(assembly.verdict.status, ChainStatus::Incomplete);
}

#[test]
fn all_ca_set_uses_primary_as_leaf() {
    let c = chain();
    let assembly = assess_unordered(&records(&[&c.intermediate, &c.root]));

    assert_eq!(assembly.order, [0, 1]);
    assert_eq!(assembly.verdict.status, ChainStatus::Complete);
}

#[test]
fn unordered_assembly_uses_exact_names_only() {
    let root = self_signed(params(
        &[(DnType::OrganizationName, "Y"), (DnType::CommonName, "X")],
        common::ca(),
    ));
    let leaf = common::issued_under(
        params(&[(DnType::CommonName, "leaf")], IsCa::NoCa),
        &[(DnType::CommonName, "X"), (DnType::OrganizationName, "Y")],
    );
    let assembly = assess_unordered(&records(&[&leaf, &root]));

    assert_eq!(assembly.verdict.status, ChainStatus::Incomplete);
    assert!(assembly.verdict.links.is_empty());
    assert_eq!(assembly.order, [0, 1]);
}

#[test]
fn single_record_is_single() {
    let c = chain();
    let assembly = assess_unordered(&records(&[&c.leaf]));
    assert_eq!(assembly.verdict.status, ChainStatus::Single);
    assert_eq!(assembly.order, [0]);
}
