#![no_main]

use certlink_lib::{analyze, AnalyzeOptions, DigestAlgorithm, SourceFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Analysis must never panic, whatever the bytes and declared format.
    let options = AnalyzeOptions {
        at_time: Some(1_700_000_000),
        ..Default::default()
    };
    for format in [
        SourceFormat::TextBundle,
        SourceFormat::BinarySingle,
        SourceFormat::Pkcs12,
    ] {
        let passphrase = (format == SourceFormat::Pkcs12).then_some("");
        let _ = analyze(data, format, passphrase);

        if let Ok(result) =
            certlink_lib::analyze_with_options(data, format, passphrase, &options)
        {
            for cert in &result.certificates {
                let _ = cert.subject_summary();
                let _ = cert.issuer_summary();
                let _ = cert.usage_summary();
                let _ = cert.fingerprint(DigestAlgorithm::Sha1);
            }
            let _ = certlink_lib::render_text(&result, true);
            let _ = certlink_lib::to_json(&result);
        }
    }

    // Name matching over arbitrary text.
    if let Ok(text) = std::str::from_utf8(data) {
        if let Some((issuer, subject)) = text.split_once('|') {
            let _ = certlink_lib::classify_link(issuer, subject);
        }
    }
});
