#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Batch analysis, progress reporting and summaries.

mod common;

use certlink_lib::*;
use std::path::{Path, PathBuf};

fn inputs() -> Vec<BatchInput> {
    let c = common::chain();
    vec![
        BatchInput {
            path: PathBuf::from("chain.pem"),
            data: common::bundle(&[&c.leaf, &c.intermediate, &c.root]),
            format: SourceFormat::TextBundle,
            passphrase: None,
        },
        BatchInput {
            path: PathBuf::from("broken.der"),
            data: b"not a certificate".to_vec(),
            format: SourceFormat::BinarySingle,
            passphrase: None,
        },
        BatchInput {
            path: PathBuf::from("leaf.der"),
            data: c.leaf.der.clone(),
            format: SourceFormat::BinarySingle,
            passphrase: None,
        },
    ]
}

#[test]
fn failures_do_not_stop_the_batch() {
    let entries = analyze_many(&inputs());

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].path, Path::new("chain.pem"));
    assert!(entries[0].is_success());
    assert!(matches!(
        entries[1].outcome,
        Err(CertlinkError::MalformedCertificate(_))
    ));
    assert_eq!(entries[2].path, Path::new("leaf.der"));
    assert!(entries[2].is_success());
}

#[test]
fn progress_is_reported_after_each_input() {
    let mut seen = Vec::new();
    let entries = analyze_many_with_progress(&inputs(), &AnalyzeOptions::default(), |p| {
        seen.push((p.completed, p.total, p.entry.is_success()));
    });

    assert_eq!(entries.len(), 3);
    assert_eq!(seen, [(1, 3, true), (2, 3, false), (3, 3, true)]);
}

#[test]
fn parallel_batch_keeps_input_order() {
    let entries = analyze_many_parallel(&inputs(), &AnalyzeOptions::default());

    let paths: Vec<&Path> = entries.iter().map(|e| e.path.as_path()).collect();
    assert_eq!(
        paths,
        [Path::new("chain.pem"), Path::new("broken.der"), Path::new("leaf.der")]
    );
    assert!(entries[1].outcome.is_err());
}

#[test]
fn batch_options_apply_to_every_input() {
    let options = AnalyzeOptions {
        at_time: Some(common::NOW),
        ..Default::default()
    };
    let entries = analyze_many_parallel(&inputs(), &options);
    let result = entries[2].outcome.as_ref().unwrap();
    assert!(matches!(
        result.certificates[0].validity.status,
        ValidityStatus::Valid(_)
    ));
}

#[test]
fn summary_counts() {
    let entries = analyze_many(&inputs());
    let summary = BatchSummary::from_entries(&entries);

    assert_eq!(
        summary,
        BatchSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            complete_chains: 1,
        }
    );
    assert_eq!(
        summary.to_string(),
        "3 files analyzed: 2 succeeded, 1 failed, 1 complete chains"
    );
}

#[test]
fn unreadable_files_are_counted_and_serialized() {
    let mut entries = analyze_many(&inputs());
    entries.insert(
        1,
        BatchEntry::unreadable(
            "missing.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ),
    );

    let summary = BatchSummary::from_entries(&entries);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.failed, 2);
    assert!(matches!(entries[1].outcome, Err(CertlinkError::Io(_))));

    let json: serde_json::Value = serde_json::from_str(&batch_to_json(&entries).unwrap()).unwrap();
    assert_eq!(json[1]["path"], "missing.pem");
    assert_eq!(json[1]["status"], "error");
    assert_eq!(json[1]["error"], "Could not read input: no such file");
}

#[test]
fn empty_batch() {
    let entries = analyze_many(&[]);
    assert!(entries.is_empty());
    assert_eq!(BatchSummary::from_entries(&entries), BatchSummary::default());
}

#[test]
fn batch_json_marks_status() {
    let entries = analyze_many(&inputs());
    let json: serde_json::Value = serde_json::from_str(&batch_to_json(&entries).unwrap()).unwrap();

    assert_eq!(json[0]["status"], "success");
    assert_eq!(json[0]["path"], "chain.pem");
    assert_eq!(json[0]["result"]["chain"]["status"], "complete");
    assert_eq!(json[1]["status"], "error");
    assert!(json[1]["error"]
        .as_str()
        .unwrap()
        .starts_with("Malformed certificate"));
    assert_eq!(json[2]["status"], "success");
}

#[test]
fn format_from_path() {
    assert_eq!(
        SourceFormat::from_path(Path::new("a/chain.pem")),
        Some(SourceFormat::TextBundle)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("chain.CRT")),
        Some(SourceFormat::TextBundle)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("chain.cer")),
        Some(SourceFormat::TextBundle)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("leaf.der")),
        Some(SourceFormat::BinarySingle)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("server.PFX")),
        Some(SourceFormat::Pkcs12)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("server.p12")),
        Some(SourceFormat::Pkcs12)
    );
    assert_eq!(SourceFormat::from_path(Path::new("notes.txt")), None);
    assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
}
