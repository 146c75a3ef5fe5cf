//! Certificate record types produced by field extraction.

use serde::ser::SerializeStruct;
use serde::Serialize;

/// Digest algorithm for fingerprint computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha1,
}

/// The facts extracted from one decoded certificate.
///
/// Records are built once by [`crate::parse_record`] and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    /// Certificate version (1, 2, or 3).
    pub version: u32,
    /// Serial number as uppercase hex without separators or leading zeros.
    pub serial: String,
    /// Signature algorithm name.
    pub signature_algorithm: String,
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Validity window and its classification at analysis time.
    pub validity: Validity,
    /// Public key descriptor.
    pub public_key: PublicKeyDescriptor,
    /// DNS names from the Subject Alternative Name extension.
    pub san_dns: Vec<String>,
    /// Key usage and extended key usage labels.
    pub usage: Vec<String>,
    /// Basic constraints CA marking.
    pub ca: CaMarking,
    /// Every extension, in certificate order.
    pub extensions: Vec<ExtensionEntry>,
    /// SHA-256 fingerprint, colon-separated uppercase hex.
    pub fingerprint_sha256: String,

    /// DER bytes of the certificate, for detail rendering and fingerprints.
    #[serde(skip)]
    pub raw_der: Vec<u8>,
}

impl CertificateRecord {
    /// Subject summary string (e.g. `CN=example.com, O=Example`).
    pub fn subject_summary(&self) -> String {
        self.subject.summary()
    }

    /// Issuer summary string.
    pub fn issuer_summary(&self) -> String {
        self.issuer.summary()
    }

    /// True when the subject summary equals the issuer summary exactly.
    pub fn is_self_signed(&self) -> bool {
        self.subject.summary() == self.issuer.summary()
    }

    /// True when basic constraints are present and mark a certificate authority.
    pub fn is_ca(&self) -> bool {
        self.ca == CaMarking::Ca
    }

    /// Usage labels joined by `, `, or `Unspecified` when there are none.
    pub fn usage_summary(&self) -> String {
        if self.usage.is_empty() {
            "Unspecified".into()
        } else {
            self.usage.join(", ")
        }
    }

    /// Compute the fingerprint of the certificate using the given digest algorithm.
    pub fn fingerprint(&self, algorithm: DigestAlgorithm) -> String {
        crate::fingerprint::compute_fingerprint(&self.raw_der, algorithm)
    }
}

/// Distinguished name with ordered components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistinguishedName {
    /// Ordered list of (attribute_type, value) pairs.
    /// Attribute types use short names where known (e.g., "CN", "O", "C").
    pub components: Vec<(String, String)>,
}

/// Attribute types kept by [`DistinguishedName::summary`].
const SUMMARY_KEYS: [&str; 6] = ["CN", "O", "OU", "C", "ST", "L"];

impl DistinguishedName {
    /// Compact `Key=Value, Key=Value` form built from the common name,
    /// organization, organizational unit, country, state and locality
    /// attributes, in encoded order. Every other attribute is dropped.
    pub fn summary(&self) -> String {
        self.components
            .iter()
            .filter(|(k, _)| SUMMARY_KEYS.contains(&k.as_str()))
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Value of the first component with the given short name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl Serialize for DistinguishedName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DistinguishedName", 2)?;
        s.serialize_field("summary", &self.summary())?;
        s.serialize_field("components", &self.components)?;
        s.end()
    }
}

/// Date-time representation, always UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTime {
    /// ISO 8601 formatted string.
    pub iso8601: String,
    /// Unix timestamp.
    pub timestamp: i64,
}

impl DateTime {
    /// Build from a Unix timestamp. Unrepresentable timestamps keep the raw
    /// number as their text form.
    pub fn from_timestamp(timestamp: i64) -> Self {
        let iso8601 = match ::time::OffsetDateTime::from_unix_timestamp(timestamp) {
            Ok(dt) => format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            Err(_) => format!("{}", timestamp),
        };
        DateTime { iso8601, timestamp }
    }

    /// Format as `2025-01-31 12:00:00 UTC`.
    pub fn to_display(&self) -> String {
        match ::time::OffsetDateTime::from_unix_timestamp(self.timestamp) {
            Ok(dt) => format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            Err(_) => self.iso8601.clone(),
        }
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display())
    }
}

/// Validity window of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validity {
    pub not_before: DateTime,
    pub not_after: DateTime,
    /// Classification of `not_after` against the evaluation time.
    pub status: ValidityStatus,
}

/// Expiry classification. Day counts are whole days, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum ValidityStatus {
    Expired(i64),
    ExpiringSoon(i64),
    Valid(i64),
    Unknown,
}

impl std::fmt::Display for ValidityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidityStatus::Expired(days) => write!(f, "Expired, {} days ago", days),
            ValidityStatus::ExpiringSoon(days) => write!(f, "Expiring soon, {} days left", days),
            ValidityStatus::Valid(days) => write!(f, "Valid, {} days left", days),
            ValidityStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Public key algorithm family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name")]
pub enum KeyFamily {
    Rsa,
    Ec,
    Dsa,
    /// Any other algorithm, carrying a display name or dotted OID.
    Other(String),
}

/// Descriptive summary of the subject public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicKeyDescriptor {
    pub family: KeyFamily,
    /// Key size in bits, when it could be determined.
    pub bits: Option<u32>,
    /// Named curve for EC keys (e.g. "secp256r1").
    pub curve: Option<String>,
}

impl std::fmt::Display for PublicKeyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = match self.bits {
            Some(b) => b.to_string(),
            None => "?".to_string(),
        };
        match &self.family {
            KeyFamily::Rsa => write!(f, "RSA {}bit", bits),
            KeyFamily::Ec => write!(
                f,
                "ECC {} ({}bit)",
                self.curve.as_deref().unwrap_or("unknown"),
                bits
            ),
            KeyFamily::Dsa => write!(f, "DSA {}bit", bits),
            KeyFamily::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Basic constraints marking of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaMarking {
    /// No basic constraints extension (or it could not be read).
    Absent,
    /// Basic constraints present with `CA:TRUE`.
    Ca,
    /// Basic constraints present with `CA:FALSE`.
    NotCa,
}

/// One certificate extension, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionEntry {
    /// OID as a dotted-decimal string.
    pub oid: String,
    /// Human-readable name (or OID string if unknown).
    pub name: String,
    /// Whether this extension is marked critical.
    pub critical: bool,
    pub value: ExtensionValue,
}

/// Best-effort extension value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExtensionValue {
    /// Stringified value, at most 100 characters plus a truncation marker.
    Text(String),
    /// The value could not be parsed; carries the parse error.
    Error(String),
}

impl std::fmt::Display for ExtensionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionValue::Text(text) => write!(f, "{}", text),
            ExtensionValue::Error(err) => write!(f, "<unparseable: {}>", err),
        }
    }
}
