//! Certificate fixtures generated at test time.
#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use rcgen::{CertificateParams, DistinguishedName, DnType, IsCa, Issuer, KeyPair};
use time::OffsetDateTime;

/// Fixed evaluation time: 2025-06-15T14:13:20Z.
pub const NOW: i64 = 1_750_000_000;
pub const DAY: i64 = 86_400;

/// A generated certificate plus what is needed to issue from it.
pub struct Generated {
    pub der: Vec<u8>,
    pub pem: String,
    /// PKCS#8 DER of the certificate's private key.
    pub key_der: Vec<u8>,
    issuer: Issuer<'static, KeyPair>,
}

/// Certificate parameters with the given subject attributes, in order.
pub fn params(names: &[(DnType, &str)], ca: IsCa) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("params");
    params.distinguished_name = dn(names);
    params.is_ca = ca;
    params
}

pub fn dn(names: &[(DnType, &str)]) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    for (ty, value) in names {
        dn.push(ty.clone(), *value);
    }
    dn
}

pub fn ca() -> IsCa {
    IsCa::Ca(rcgen::BasicConstraints::Unconstrained)
}

pub fn self_signed(params: CertificateParams) -> Generated {
    let key = KeyPair::generate().expect("key");
    self_signed_with(params, key)
}

pub fn self_signed_with(params: CertificateParams, key: KeyPair) -> Generated {
    let cert = params.clone().self_signed(&key).expect("self-signed");
    Generated {
        der: cert.der().to_vec(),
        pem: cert.pem(),
        key_der: key.serialize_der(),
        issuer: Issuer::<'static>::new(params, key),
    }
}

pub fn signed_by(params: CertificateParams, parent: &Generated) -> Generated {
    let key = KeyPair::generate().expect("key");
    let cert = params.clone().signed_by(&key, &parent.issuer).expect("signed");
    Generated {
        der: cert.der().to_vec(),
        pem: cert.pem(),
        key_der: key.serialize_der(),
        issuer: Issuer::<'static>::new(params, key),
    }
}

/// Issue `params` under an issuer name that no generated certificate
/// carries. Chain analysis compares names only, so the signing key is a
/// throwaway.
pub fn issued_under(params: CertificateParams, issuer_names: &[(DnType, &str)]) -> Generated {
    let phantom = self_signed(self::params(issuer_names, ca()));
    signed_by(params, &phantom)
}

/// `leaf.example.com` <- `Example Intermediate CA` <- `Example Root CA`.
pub struct Chain {
    pub root: Generated,
    pub intermediate: Generated,
    pub leaf: Generated,
}

pub fn chain() -> Chain {
    let root = self_signed(params(
        &[
            (DnType::CommonName, "Example Root CA"),
            (DnType::OrganizationName, "Example"),
            (DnType::CountryName, "US"),
        ],
        ca(),
    ));
    let intermediate = signed_by(
        params(
            &[
                (DnType::CommonName, "Example Intermediate CA"),
                (DnType::OrganizationName, "Example"),
                (DnType::CountryName, "US"),
            ],
            ca(),
        ),
        &root,
    );
    let leaf = signed_by(
        params(
            &[
                (DnType::CommonName, "leaf.example.com"),
                (DnType::OrganizationName, "Example"),
            ],
            IsCa::ExplicitNoCa,
        ),
        &intermediate,
    );
    Chain {
        root,
        intermediate,
        leaf,
    }
}

pub fn bundle(certs: &[&Generated]) -> Vec<u8> {
    certs
        .iter()
        .map(|c| c.pem.as_str())
        .collect::<String>()
        .into_bytes()
}

pub fn at(timestamp: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(timestamp).expect("timestamp")
}

// ---------------------------------------------------------------------------
// openssl-built fixtures
// ---------------------------------------------------------------------------

/// Self-signed certificate for an arbitrary openssl key, signed with SHA-256.
pub fn openssl_self_signed(pkey: &PKey<Private>, common_name: &str) -> Vec<u8> {
    let mut name = X509NameBuilder::new().expect("name builder");
    name.append_entry_by_text("CN", common_name).expect("CN");
    let name = name.build();

    let mut builder = X509Builder::new().expect("builder");
    builder.set_version(2).expect("version");
    let serial = BigNum::from_u32(7)
        .and_then(|bn| bn.to_asn1_integer())
        .expect("serial");
    builder.set_serial_number(&serial).expect("serial");
    builder.set_subject_name(&name).expect("subject");
    builder.set_issuer_name(&name).expect("issuer");
    builder.set_pubkey(pkey).expect("pubkey");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("time"))
        .expect("not before");
    builder
        .set_not_after(&Asn1Time::days_from_now(365).expect("time"))
        .expect("not after");
    builder.sign(pkey, MessageDigest::sha256()).expect("sign");
    builder.build().to_der().expect("der")
}

/// Build a PKCS#12 archive. `key` pairs with `cert`; either may be absent.
pub fn pkcs12(
    cert: Option<&Generated>,
    key: Option<&Generated>,
    extras: &[&Generated],
    password: &str,
) -> Vec<u8> {
    let mut builder = Pkcs12::builder();
    builder.name("certlink test");

    let pkey = key.map(|k| PKey::private_key_from_pkcs8(&k.key_der).expect("pkcs8"));
    if let Some(pkey) = &pkey {
        builder.pkey(pkey);
    }
    let x509 = cert.map(|c| X509::from_der(&c.der).expect("x509"));
    if let Some(x509) = &x509 {
        builder.cert(x509);
    }
    if !extras.is_empty() {
        let mut stack = Stack::new().expect("stack");
        for extra in extras {
            stack
                .push(X509::from_der(&extra.der).expect("x509"))
                .expect("push");
        }
        builder.ca(stack);
    }

    builder
        .build2(password)
        .and_then(|p12| p12.to_der())
        .expect("pkcs12")
}
