//! Container decoding: raw file bytes to DER certificates.
//!
//! Three container shapes are understood: text bundles holding one or more
//! base64 certificate blocks, a single binary DER certificate, and
//! passphrase-protected PKCS#12 archives.

use crate::CertlinkError;
use base64::Engine;
use openssl::pkcs12::Pkcs12;
use tracing::debug;

/// Begin/end marker pairs recognized in text bundles.
const BLOCK_MARKERS: [(&str, &str); 3] = [
    ("-----BEGIN CERTIFICATE-----", "-----END CERTIFICATE-----"),
    (
        "-----BEGIN TRUSTED CERTIFICATE-----",
        "-----END TRUSTED CERTIFICATE-----",
    ),
    (
        "-----BEGIN X509 CERTIFICATE-----",
        "-----END X509 CERTIFICATE-----",
    ),
];

/// One certificate block found in a text bundle, in file order.
#[derive(Debug)]
pub struct TextBlock {
    /// Zero-based position of the block in the bundle.
    pub index: usize,
    /// Decoded DER bytes, or the reason the body could not be decoded.
    pub der: Result<Vec<u8>, CertlinkError>,
}

/// Contents of an opened PKCS#12 archive.
#[derive(Debug)]
pub struct Pkcs12Contents {
    /// DER of the certificate paired with the private key.
    pub primary: Vec<u8>,
    /// DER of every other bundled certificate, in archive order.
    pub extras: Vec<Vec<u8>>,
    pub private_key_present: bool,
}

/// Split a text bundle into certificate blocks.
///
/// Lines are scanned one at a time: a begin marker opens a block, the
/// matching end marker closes it, and everything in between is the base64
/// body. An unterminated trailing block is dropped. Each block body is
/// decoded independently so one bad block does not hide the others.
pub fn scan_text_bundle(data: &[u8]) -> Result<Vec<TextBlock>, CertlinkError> {
    let mut bodies: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<(&str, Vec<u8>)> = None;

    for raw_line in data.split(|&b| b == b'\n') {
        let line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);

        if let Some((_, end)) = BLOCK_MARKERS
            .iter()
            .find(|(begin, _)| contains(line, begin.as_bytes()))
        {
            current = Some((end, Vec::new()));
            continue;
        }

        if let Some((end, body)) = current.as_mut() {
            if contains(line, end.as_bytes()) {
                bodies.push(std::mem::take(body));
                current = None;
            } else {
                body.extend_from_slice(line);
            }
        }
    }

    if current.is_some() {
        debug!("discarding unterminated trailing certificate block");
    }
    if bodies.is_empty() {
        return Err(CertlinkError::NoCertificateFound);
    }
    debug!(blocks = bodies.len(), "text bundle scanned");

    Ok(bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| TextBlock {
            index,
            der: decode_base64_body(&body).map_err(|reason| {
                CertlinkError::MalformedCertificate(format!(
                    "certificate block {}: {}",
                    index + 1,
                    reason
                ))
            }),
        })
        .collect())
}

/// Accept a binary single certificate. Parsing happens later; this only
/// rejects input that cannot possibly hold one.
pub fn binary_single(data: &[u8]) -> Result<&[u8], CertlinkError> {
    if data.is_empty() {
        return Err(CertlinkError::MalformedCertificate("empty input".into()));
    }
    Ok(data)
}

/// Open a PKCS#12 archive. A missing passphrase is tried as the empty
/// password. A wrong passphrase and a damaged archive are reported the same way.
pub fn open_pkcs12(
    data: &[u8],
    passphrase: Option<&str>,
) -> Result<Pkcs12Contents, CertlinkError> {
    let archive = Pkcs12::from_der(data).map_err(|e| {
        debug!(error = %e, "PKCS#12 structure rejected");
        CertlinkError::InvalidPassphraseOrCorrupt
    })?;
    let parsed = archive.parse2(passphrase.unwrap_or("")).map_err(|e| {
        debug!(error = %e, "PKCS#12 decryption failed");
        CertlinkError::InvalidPassphraseOrCorrupt
    })?;

    let mut extras = Vec::new();
    if let Some(stack) = parsed.ca {
        for cert in stack.iter() {
            extras.push(cert.to_der().map_err(|e| {
                debug!(error = %e, "bundled certificate could not be re-encoded");
                CertlinkError::InvalidPassphraseOrCorrupt
            })?);
        }
    }

    let primary = match parsed.cert {
        Some(cert) => cert.to_der().map_err(|e| {
            debug!(error = %e, "primary certificate could not be re-encoded");
            CertlinkError::InvalidPassphraseOrCorrupt
        })?,
        None => {
            debug!(extras = extras.len(), "no key-paired certificate in archive");
            return Err(CertlinkError::EmptyContainer);
        }
    };

    let private_key_present = parsed.pkey.is_some();
    debug!(
        extras = extras.len(),
        private_key_present, "PKCS#12 archive opened"
    );

    Ok(Pkcs12Contents {
        primary,
        extras,
        private_key_present,
    })
}

fn decode_base64_body(body: &[u8]) -> Result<Vec<u8>, String> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err("empty block".into());
    }
    base64::engine::general_purpose::STANDARD
        .decode(&compact)
        .map_err(|e| format!("invalid base64: {}", e))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
