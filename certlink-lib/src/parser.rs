//! Field extraction: DER certificate to [`CertificateRecord`].

use crate::analysis::AnalyzeOptions;
use crate::fields::{
    CaMarking, CertificateRecord, DateTime, DigestAlgorithm, DistinguishedName, ExtensionEntry,
    ExtensionValue, KeyFamily, PublicKeyDescriptor, Validity, ValidityStatus,
};
use crate::oid;
use crate::util;
use crate::CertlinkError;
use tracing::{debug, warn};
use x509_parser::prelude::*;

const SECONDS_PER_DAY: i64 = 86_400;

/// Longest extension value (in characters) kept before truncation.
pub(crate) const EXTENSION_VALUE_LIMIT: usize = 100;

/// Parse one DER-encoded certificate into a [`CertificateRecord`].
///
/// Validity is classified against `options.at_time`, or the current time when
/// unset. Trailing bytes after the certificate are ignored.
pub fn parse_record(
    der: &[u8],
    options: &AnalyzeOptions,
) -> Result<CertificateRecord, CertlinkError> {
    if der.is_empty() {
        return Err(CertlinkError::MalformedCertificate("empty input".into()));
    }

    let (remaining, x509) = X509Certificate::from_der(der)
        .map_err(|e| CertlinkError::MalformedCertificate(format!("{}", e)))?;

    if !remaining.is_empty() {
        debug!(trailing = remaining.len(), "ignoring bytes after certificate");
    }
    let cert_len = der.len() - remaining.len();
    let cert_der = der.get(..cert_len).unwrap_or(der);
    build_record(&x509, cert_der, options)
}

fn build_record(
    x509: &X509Certificate,
    raw_der: &[u8],
    options: &AnalyzeOptions,
) -> Result<CertificateRecord, CertlinkError> {
    let tbs = &x509.tbs_certificate;

    let raw_version = tbs.version.0;
    if raw_version > 2 {
        return Err(CertlinkError::MalformedCertificate(format!(
            "unsupported X.509 version {} (expected v1, v2, or v3)",
            raw_version + 1
        )));
    }

    let not_before = DateTime::from_timestamp(tbs.validity.not_before.timestamp());
    let not_after = DateTime::from_timestamp(tbs.validity.not_after.timestamp());
    let status = classify_validity(
        not_after.timestamp,
        options.evaluation_time(),
        options.expiring_soon_days,
    );

    Ok(CertificateRecord {
        version: raw_version + 1,
        serial: format!("{:X}", tbs.serial),
        signature_algorithm: oid::signature_algorithm_name(
            &x509.signature_algorithm.algorithm.to_id_string(),
        ),
        subject: build_dn(&tbs.subject),
        issuer: build_dn(&tbs.issuer),
        validity: Validity {
            not_before,
            not_after,
            status,
        },
        public_key: describe_public_key(&tbs.subject_pki),
        san_dns: extract_san_dns(x509),
        usage: extract_usage(x509),
        ca: extract_ca_marking(x509),
        extensions: tbs.extensions().iter().map(build_extension).collect(),
        fingerprint_sha256: crate::fingerprint::compute_fingerprint(
            raw_der,
            DigestAlgorithm::Sha256,
        ),
        raw_der: raw_der.to_vec(),
    })
}

/// Classify an expiry instant against `now` (both Unix timestamps, UTC).
///
/// Expired certificates report whole days since expiry. Otherwise fewer than
/// `expiring_soon_days` whole days left is "expiring soon". Instants that
/// cannot be represented or compared yield [`ValidityStatus::Unknown`].
pub fn classify_validity(not_after: i64, now: i64, expiring_soon_days: i64) -> ValidityStatus {
    let representable = ::time::OffsetDateTime::from_unix_timestamp(not_after).is_ok()
        && ::time::OffsetDateTime::from_unix_timestamp(now).is_ok();
    let remaining = if representable {
        not_after.checked_sub(now)
    } else {
        None
    };

    let Some(remaining) = remaining else {
        debug!(
            not_after,
            now,
            error = %CertlinkError::DateComparisonFailure,
            "validity status unknown"
        );
        return ValidityStatus::Unknown;
    };

    if remaining < 0 {
        ValidityStatus::Expired(-remaining / SECONDS_PER_DAY)
    } else {
        let days_left = remaining / SECONDS_PER_DAY;
        if days_left < expiring_soon_days {
            ValidityStatus::ExpiringSoon(days_left)
        } else {
            ValidityStatus::Valid(days_left)
        }
    }
}

pub(crate) fn build_dn(name: &X509Name) -> DistinguishedName {
    let mut components = Vec::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            let key = oid::attribute_short_name(&attr.attr_type().to_id_string());
            components.push((key, attribute_text(attr)));
        }
    }
    DistinguishedName { components }
}

/// Text of one name attribute. String types x509-parser cannot borrow as
/// `str` are decoded here; anything else is written as `#` and the hex of its
/// DER encoding so distinct values never collapse into the same text.
fn attribute_text(attr: &AttributeTypeAndValue) -> String {
    use x509_parser::der_parser::asn1_rs::{Tag, ToDer};

    let value = attr.attr_value();
    let tag = value.header.tag();
    let decoded = match tag {
        Tag::BmpString => decode_utf16_be(value.data),
        Tag::UniversalString => decode_utf32_be(value.data),
        _ => match attr.as_str() {
            Ok(text) => Some(text.to_string()),
            Err(_) if tag == Tag::T61String => {
                Some(value.data.iter().map(|&b| char::from(b)).collect())
            }
            Err(_) => None,
        },
    };
    decoded.unwrap_or_else(|| match value.to_der_vec() {
        Ok(der) => format!("#{}", hex::encode(der)),
        Err(_) => format!("#{:02x}{}", tag.0, hex::encode(value.data)),
    })
}

fn decode_utf16_be(data: &[u8]) -> Option<String> {
    let chunks = data.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return None;
    }
    let units: Vec<u16> = chunks
        .map(|c| <[u8; 2]>::try_from(c).map(u16::from_be_bytes))
        .collect::<Result<_, _>>()
        .ok()?;
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

fn decode_utf32_be(data: &[u8]) -> Option<String> {
    let chunks = data.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return None;
    }
    chunks
        .map(|c| {
            let unit = u32::from_be_bytes(<[u8; 4]>::try_from(c).ok()?);
            char::from_u32(unit)
        })
        .collect()
}

fn describe_public_key(spki: &SubjectPublicKeyInfo) -> PublicKeyDescriptor {
    let oid_str = spki.algorithm.algorithm.to_id_string();
    let key_data: &[u8] = &spki.subject_public_key.data;

    match oid_str.as_str() {
        oid::RSA_ENCRYPTION => PublicKeyDescriptor {
            family: KeyFamily::Rsa,
            bits: rsa_modulus_bits(key_data),
            curve: None,
        },
        oid::EC_PUBLIC_KEY => {
            let (curve, bits) = ec_curve(&spki.algorithm, key_data);
            PublicKeyDescriptor {
                family: KeyFamily::Ec,
                bits,
                curve: Some(curve),
            }
        }
        oid::DSA => PublicKeyDescriptor {
            family: KeyFamily::Dsa,
            bits: dsa_prime_bits(&spki.algorithm),
            curve: None,
        },
        oid::ED25519 => other_key("Ed25519", 256),
        oid::ED448 => other_key("Ed448", 456),
        oid::X25519 => other_key("X25519", 256),
        oid::X448 => other_key("X448", 448),
        other => PublicKeyDescriptor {
            family: KeyFamily::Other(other.to_string()),
            bits: None,
            curve: None,
        },
    }
}

fn other_key(name: &str, bits: u32) -> PublicKeyDescriptor {
    PublicKeyDescriptor {
        family: KeyFamily::Other(name.into()),
        bits: Some(bits),
        curve: None,
    }
}

/// Bit length of the modulus in an RSAPublicKey structure.
fn rsa_modulus_bits(data: &[u8]) -> Option<u32> {
    let (_, parsed) = x509_parser::der_parser::parse_der(data).ok()?;
    let seq = parsed.as_sequence().ok()?;
    let modulus = seq.first().and_then(|m| m.as_bigint().ok())?;
    Some(util::significant_bits(&modulus.to_bytes_be().1))
}

/// Curve name and size. Unknown curves fall back to the dotted OID and a size
/// derived from the uncompressed point length.
fn ec_curve(algo: &AlgorithmIdentifier, point: &[u8]) -> (String, Option<u32>) {
    let curve_oid = algo
        .parameters
        .as_ref()
        .and_then(|params| params.as_oid().ok())
        .map(|o| o.to_id_string());

    match curve_oid {
        Some(id) => match oid::curve_info(&id) {
            Some((name, bits)) => (name.to_string(), Some(bits)),
            None => (id, point_bits(point)),
        },
        None => ("unknown".into(), point_bits(point)),
    }
}

fn point_bits(point: &[u8]) -> Option<u32> {
    match point.first() {
        Some(0x04) if point.len() > 1 => Some(((point.len() as u32 - 1) / 2) * 8),
        _ => None,
    }
}

/// Bit length of the prime `p` in DSA domain parameters.
fn dsa_prime_bits(algo: &AlgorithmIdentifier) -> Option<u32> {
    use x509_parser::der_parser::asn1_rs::ToDer;

    let params_der = algo.parameters.as_ref()?.to_der_vec().ok()?;
    let (_, parsed) = x509_parser::der_parser::parse_der(&params_der).ok()?;
    let seq = parsed.as_sequence().ok()?;
    let prime = seq.first().and_then(|p| p.as_bigint().ok())?;
    Some(util::significant_bits(&prime.to_bytes_be().1))
}

fn extract_san_dns(x509: &X509Certificate) -> Vec<String> {
    match x509.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|gn| match gn {
                GeneralName::DNSName(name) => Some(name.to_string()),
                _ => None,
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "subject alternative names unreadable");
            Vec::new()
        }
    }
}

fn extract_usage(x509: &X509Certificate) -> Vec<String> {
    let mut labels = Vec::new();

    match x509.key_usage() {
        Ok(Some(ku)) => {
            if ku.value.digital_signature() {
                labels.push("Digital Signature".to_string());
            }
            if ku.value.key_encipherment() {
                labels.push("Key Encipherment".to_string());
            }
            if ku.value.key_agreement() {
                labels.push("Key Agreement".to_string());
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "key usage unreadable"),
    }

    match x509.extended_key_usage() {
        Ok(Some(eku)) => {
            if eku.value.server_auth {
                labels.push("Server Authentication".to_string());
            }
            if eku.value.client_auth {
                labels.push("Client Authentication".to_string());
            }
            if eku.value.code_signing {
                labels.push("Code Signing".to_string());
            }
            if eku.value.email_protection {
                labels.push("Email Protection".to_string());
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "extended key usage unreadable"),
    }

    labels
}

fn extract_ca_marking(x509: &X509Certificate) -> CaMarking {
    match x509.basic_constraints() {
        Ok(Some(bc)) if bc.value.ca => CaMarking::Ca,
        Ok(Some(_)) => CaMarking::NotCa,
        Ok(None) => CaMarking::Absent,
        Err(e) => {
            warn!(error = %e, "basic constraints unreadable");
            CaMarking::Absent
        }
    }
}

fn build_extension(ext: &X509Extension) -> ExtensionEntry {
    let oid = ext.oid.to_id_string();
    let name = oid::extension_name(&oid);

    let value = match describe_extension(ext) {
        Ok(text) => {
            ExtensionValue::Text(util::truncate_with_marker(&text, EXTENSION_VALUE_LIMIT))
        }
        Err(e) => {
            warn!(oid = %oid, error = %e, "extension value replaced by placeholder");
            match e {
                CertlinkError::ExtensionParseFailure(reason) => ExtensionValue::Error(reason),
                other => ExtensionValue::Error(other.to_string()),
            }
        }
    };

    ExtensionEntry {
        oid,
        name,
        critical: ext.critical,
        value,
    }
}

/// Render an extension value as one line of text.
fn describe_extension(ext: &X509Extension) -> Result<String, CertlinkError> {
    let text = match ext.parsed_extension() {
        ParsedExtension::BasicConstraints(bc) => {
            let ca = if bc.ca { "CA:TRUE" } else { "CA:FALSE" };
            match bc.path_len_constraint {
                Some(n) => format!("{}, pathlen:{}", ca, n),
                None => ca.to_string(),
            }
        }
        ParsedExtension::KeyUsage(ku) => {
            let flags = [
                (ku.digital_signature(), "Digital Signature"),
                (ku.non_repudiation(), "Non Repudiation"),
                (ku.key_encipherment(), "Key Encipherment"),
                (ku.data_encipherment(), "Data Encipherment"),
                (ku.key_agreement(), "Key Agreement"),
                (ku.key_cert_sign(), "Certificate Sign"),
                (ku.crl_sign(), "CRL Sign"),
                (ku.encipher_only(), "Encipher Only"),
                (ku.decipher_only(), "Decipher Only"),
            ];
            flags
                .iter()
                .filter(|(set, _)| *set)
                .map(|(_, label)| *label)
                .collect::<Vec<_>>()
                .join(", ")
        }
        ParsedExtension::ExtendedKeyUsage(eku) => {
            let mut usages = Vec::new();
            if eku.any {
                usages.push("Any Extended Key Usage".to_string());
            }
            if eku.server_auth {
                usages.push("TLS Web Server Authentication".to_string());
            }
            if eku.client_auth {
                usages.push("TLS Web Client Authentication".to_string());
            }
            if eku.code_signing {
                usages.push("Code Signing".to_string());
            }
            if eku.email_protection {
                usages.push("E-mail Protection".to_string());
            }
            if eku.time_stamping {
                usages.push("Time Stamping".to_string());
            }
            if eku.ocsp_signing {
                usages.push("OCSP Signing".to_string());
            }
            for other in &eku.other {
                usages.push(other.to_id_string());
            }
            usages.join(", ")
        }
        ParsedExtension::SubjectAlternativeName(san) => san
            .general_names
            .iter()
            .map(format_general_name)
            .collect::<Vec<_>>()
            .join(", "),
        ParsedExtension::SubjectKeyIdentifier(ski) => util::hex_colon_upper(ski.0),
        ParsedExtension::AuthorityKeyIdentifier(aki) => match &aki.key_identifier {
            Some(kid) => format!("keyid:{}", util::hex_colon_upper(kid.0)),
            None => String::new(),
        },
        ParsedExtension::AuthorityInfoAccess(aia) => aia
            .accessdescs
            .iter()
            .map(|desc| {
                let method = match desc.access_method.to_id_string().as_str() {
                    oid::ACCESS_OCSP => "OCSP".to_string(),
                    oid::ACCESS_CA_ISSUERS => "CA Issuers".to_string(),
                    other => other.to_string(),
                };
                format!("{} - {}", method, format_general_name(&desc.access_location))
            })
            .collect::<Vec<_>>()
            .join(", "),
        ParsedExtension::CRLDistributionPoints(cdp) => {
            let mut names = Vec::new();
            for point in &cdp.points {
                if let Some(x509_parser::extensions::DistributionPointName::FullName(full)) =
                    &point.distribution_point
                {
                    names.extend(full.iter().map(format_general_name));
                }
            }
            names.join(", ")
        }
        ParsedExtension::CertificatePolicies(policies) => policies
            .iter()
            .map(|p| p.policy_id.to_id_string())
            .collect::<Vec<_>>()
            .join(", "),
        ParsedExtension::NsCertComment(comment) => comment.to_string(),
        ParsedExtension::ParseError { error } => {
            return Err(CertlinkError::ExtensionParseFailure(format!("{:?}", error)));
        }
        _ => hex::encode(ext.value),
    };
    Ok(text)
}

fn format_general_name(gn: &GeneralName) -> String {
    match gn {
        GeneralName::DNSName(name) => format!("DNS:{}", name),
        GeneralName::RFC822Name(email) => format!("email:{}", email),
        GeneralName::URI(uri) => format!("URI:{}", uri),
        GeneralName::IPAddress(bytes) => format!("IP:{}", format_ip_bytes(bytes)),
        GeneralName::DirectoryName(dn) => format!("DirName:{}", build_dn(dn).summary()),
        other => format!("{:?}", other),
    }
}

fn format_ip_bytes(bytes: &[u8]) -> String {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        std::net::Ipv4Addr::from(octets).to_string()
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        std::net::Ipv6Addr::from(octets).to_string()
    } else {
        hex::encode(bytes)
    }
}
