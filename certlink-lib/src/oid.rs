//! OID string constants and the display names certlink derives from them.
//!
//! Object Identifiers come from RFC 5280 (X.509), RFC 3279 (RSA/DSA/EC
//! algorithms), RFC 5480 and RFC 5639 (named curves), and RFC 8410 (EdDSA and
//! X25519/X448).

// ── Distinguished Name attributes (RFC 4519 / X.520) ────────────────────

pub const COMMON_NAME: &str = "2.5.4.3";
pub const SURNAME: &str = "2.5.4.4";
pub const SERIAL_NUMBER: &str = "2.5.4.5";
pub const COUNTRY: &str = "2.5.4.6";
pub const LOCALITY: &str = "2.5.4.7";
pub const STATE_OR_PROVINCE: &str = "2.5.4.8";
pub const STREET_ADDRESS: &str = "2.5.4.9";
pub const ORGANIZATION: &str = "2.5.4.10";
pub const ORGANIZATIONAL_UNIT: &str = "2.5.4.11";
pub const TITLE: &str = "2.5.4.12";
pub const POSTAL_CODE: &str = "2.5.4.17";
pub const GIVEN_NAME: &str = "2.5.4.42";
pub const EMAIL_ADDRESS: &str = "1.2.840.113549.1.9.1"; // PKCS#9
pub const DOMAIN_COMPONENT: &str = "0.9.2342.19200300.100.1.25";

// ── Signature algorithms ─────────────────────────────────────────────────

pub const MD5_WITH_RSA: &str = "1.2.840.113549.1.1.4";
pub const SHA1_WITH_RSA: &str = "1.2.840.113549.1.1.5";
pub const RSASSA_PSS: &str = "1.2.840.113549.1.1.10";
pub const SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
pub const SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
pub const SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
pub const DSA_WITH_SHA1: &str = "1.2.840.10040.4.3";
pub const DSA_WITH_SHA256: &str = "2.16.840.1.101.3.4.3.2";
pub const ECDSA_WITH_SHA1: &str = "1.2.840.10045.4.1";
pub const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
pub const ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
pub const ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";
pub const ED25519: &str = "1.3.101.112";
pub const ED448: &str = "1.3.101.113";

// ── Public key types ─────────────────────────────────────────────────────

pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
pub const DSA: &str = "1.2.840.10040.4.1";
pub const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
pub const X25519: &str = "1.3.101.110";
pub const X448: &str = "1.3.101.111";

// ── Named elliptic curves ────────────────────────────────────────────────

pub const CURVE_P192: &str = "1.2.840.10045.3.1.1";
pub const CURVE_P224: &str = "1.3.132.0.33";
pub const CURVE_P256: &str = "1.2.840.10045.3.1.7";
pub const CURVE_P384: &str = "1.3.132.0.34";
pub const CURVE_P521: &str = "1.3.132.0.35";
pub const CURVE_SECP256K1: &str = "1.3.132.0.10";
pub const CURVE_BRAINPOOL_P256R1: &str = "1.3.36.3.3.2.8.1.1.7";
pub const CURVE_BRAINPOOL_P384R1: &str = "1.3.36.3.3.2.8.1.1.11";
pub const CURVE_BRAINPOOL_P512R1: &str = "1.3.36.3.3.2.8.1.1.13";

// ── X.509v3 extensions (RFC 5280 Section 4.2) ───────────────────────────

pub const EXT_SUBJECT_KEY_ID: &str = "2.5.29.14";
pub const EXT_KEY_USAGE: &str = "2.5.29.15";
pub const EXT_SUBJECT_ALT_NAME: &str = "2.5.29.17";
pub const EXT_ISSUER_ALT_NAME: &str = "2.5.29.18";
pub const EXT_BASIC_CONSTRAINTS: &str = "2.5.29.19";
pub const EXT_NAME_CONSTRAINTS: &str = "2.5.29.30";
pub const EXT_CRL_DISTRIBUTION_POINTS: &str = "2.5.29.31";
pub const EXT_CERTIFICATE_POLICIES: &str = "2.5.29.32";
pub const EXT_POLICY_MAPPINGS: &str = "2.5.29.33";
pub const EXT_AUTHORITY_KEY_ID: &str = "2.5.29.35";
pub const EXT_POLICY_CONSTRAINTS: &str = "2.5.29.36";
pub const EXT_EXTENDED_KEY_USAGE: &str = "2.5.29.37";
pub const EXT_FRESHEST_CRL: &str = "2.5.29.46";
pub const EXT_INHIBIT_ANY_POLICY: &str = "2.5.29.54";
pub const EXT_AUTHORITY_INFO_ACCESS: &str = "1.3.6.1.5.5.7.1.1";
pub const EXT_SUBJECT_INFO_ACCESS: &str = "1.3.6.1.5.5.7.1.11";
pub const EXT_TLS_FEATURE: &str = "1.3.6.1.5.5.7.1.12";
pub const EXT_SCT_LIST: &str = "1.3.6.1.4.1.11129.2.4.2";
pub const EXT_CT_POISON: &str = "1.3.6.1.4.1.11129.2.4.3";
pub const EXT_NETSCAPE_CERT_TYPE: &str = "2.16.840.1.113730.1.1";
pub const EXT_NETSCAPE_COMMENT: &str = "2.16.840.1.113730.1.13";

pub const ACCESS_OCSP: &str = "1.3.6.1.5.5.7.48.1";
pub const ACCESS_CA_ISSUERS: &str = "1.3.6.1.5.5.7.48.2";

/// Short attribute name for a DN attribute OID, or the OID itself.
pub fn attribute_short_name(oid_str: &str) -> String {
    match oid_str {
        COMMON_NAME => "CN".into(),
        SURNAME => "SN".into(),
        SERIAL_NUMBER => "serialNumber".into(),
        COUNTRY => "C".into(),
        LOCALITY => "L".into(),
        STATE_OR_PROVINCE => "ST".into(),
        STREET_ADDRESS => "street".into(),
        ORGANIZATION => "O".into(),
        ORGANIZATIONAL_UNIT => "OU".into(),
        TITLE => "title".into(),
        POSTAL_CODE => "postalCode".into(),
        GIVEN_NAME => "GN".into(),
        EMAIL_ADDRESS => "emailAddress".into(),
        DOMAIN_COMPONENT => "DC".into(),
        other => other.to_string(),
    }
}

pub fn signature_algorithm_name(oid_str: &str) -> String {
    match oid_str {
        MD5_WITH_RSA => "md5WithRSAEncryption".into(),
        SHA1_WITH_RSA => "sha1WithRSAEncryption".into(),
        RSASSA_PSS => "rsassaPss".into(),
        SHA256_WITH_RSA => "sha256WithRSAEncryption".into(),
        SHA384_WITH_RSA => "sha384WithRSAEncryption".into(),
        SHA512_WITH_RSA => "sha512WithRSAEncryption".into(),
        DSA_WITH_SHA1 => "dsaWithSHA1".into(),
        DSA_WITH_SHA256 => "dsa_with_SHA256".into(),
        ECDSA_WITH_SHA1 => "ecdsa-with-SHA1".into(),
        ECDSA_WITH_SHA256 => "ecdsa-with-SHA256".into(),
        ECDSA_WITH_SHA384 => "ecdsa-with-SHA384".into(),
        ECDSA_WITH_SHA512 => "ecdsa-with-SHA512".into(),
        ED25519 => "Ed25519".into(),
        ED448 => "Ed448".into(),
        other => other.to_string(),
    }
}

/// SEC / Brainpool name and field size in bits for a named-curve OID.
pub fn curve_info(oid_str: &str) -> Option<(&'static str, u32)> {
    match oid_str {
        CURVE_P192 => Some(("secp192r1", 192)),
        CURVE_P224 => Some(("secp224r1", 224)),
        CURVE_P256 => Some(("secp256r1", 256)),
        CURVE_P384 => Some(("secp384r1", 384)),
        CURVE_P521 => Some(("secp521r1", 521)),
        CURVE_SECP256K1 => Some(("secp256k1", 256)),
        CURVE_BRAINPOOL_P256R1 => Some(("brainpoolP256r1", 256)),
        CURVE_BRAINPOOL_P384R1 => Some(("brainpoolP384r1", 384)),
        CURVE_BRAINPOOL_P512R1 => Some(("brainpoolP512r1", 512)),
        _ => None,
    }
}

pub fn extension_name(oid_str: &str) -> String {
    match oid_str {
        EXT_SUBJECT_KEY_ID => "Subject Key Identifier".into(),
        EXT_KEY_USAGE => "Key Usage".into(),
        EXT_SUBJECT_ALT_NAME => "Subject Alternative Name".into(),
        EXT_ISSUER_ALT_NAME => "Issuer Alternative Name".into(),
        EXT_BASIC_CONSTRAINTS => "Basic Constraints".into(),
        EXT_NAME_CONSTRAINTS => "Name Constraints".into(),
        EXT_CRL_DISTRIBUTION_POINTS => "CRL Distribution Points".into(),
        EXT_CERTIFICATE_POLICIES => "Certificate Policies".into(),
        EXT_POLICY_MAPPINGS => "Policy Mappings".into(),
        EXT_AUTHORITY_KEY_ID => "Authority Key Identifier".into(),
        EXT_POLICY_CONSTRAINTS => "Policy Constraints".into(),
        EXT_EXTENDED_KEY_USAGE => "Extended Key Usage".into(),
        EXT_FRESHEST_CRL => "Freshest CRL".into(),
        EXT_INHIBIT_ANY_POLICY => "Inhibit Any-Policy".into(),
        EXT_AUTHORITY_INFO_ACCESS => "Authority Information Access".into(),
        EXT_SUBJECT_INFO_ACCESS => "Subject Information Access".into(),
        EXT_TLS_FEATURE => "TLS Feature".into(),
        EXT_SCT_LIST => "CT Precertificate SCTs".into(),
        EXT_CT_POISON => "CT Precertificate Poison".into(),
        EXT_NETSCAPE_CERT_TYPE => "Netscape Cert Type".into(),
        EXT_NETSCAPE_COMMENT => "Netscape Comment".into(),
        other => other.to_string(),
    }
}
