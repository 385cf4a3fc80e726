//! Certificate pinning against a bundled credential.
//!
//! # Design
//! The host's TLS stack performs the handshake and hands the server's leaf
//! certificate (DER) to the core. The core compares its SHA-256 fingerprint
//! with the bundled certificate's. Only one credential is pinned; there is no
//! rotation or fallback list.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::http::{TransportError, TransportErrorKind};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Errors loading a pinning credential.
#[derive(Debug, Error)]
pub enum PinningError {
    #[error("cannot read certificate {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("certificate {0} is empty")]
    Empty(String),

    #[error("certificate {name} is not valid PEM: {reason}")]
    InvalidPem { name: String, reason: String },

    #[error("invalid SHA-256 fingerprint: {0}")]
    InvalidFingerprint(String),
}

/// SHA-256 fingerprint of the one certificate the server must present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedCertificate {
    name: String,
    fingerprint: [u8; 32],
}

impl PinnedCertificate {
    pub fn from_der(name: &str, der: &[u8]) -> Result<Self, PinningError> {
        if der.is_empty() {
            return Err(PinningError::Empty(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            fingerprint: Sha256::digest(der).into(),
        })
    }

    /// Decode the first `CERTIFICATE` block of a PEM document.
    pub fn from_pem(name: &str, pem: &str) -> Result<Self, PinningError> {
        let invalid = |reason: &str| PinningError::InvalidPem {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let start = pem.find(PEM_BEGIN).ok_or_else(|| invalid("missing BEGIN line"))?;
        let rest = &pem[start + PEM_BEGIN.len()..];
        let end = rest.find(PEM_END).ok_or_else(|| invalid("missing END line"))?;
        let body: String = rest[..end].split_whitespace().collect();
        let der = STANDARD
            .decode(body.as_bytes())
            .map_err(|e| invalid(&e.to_string()))?;
        Self::from_der(name, &der)
    }

    /// Accept either encoding, as bundled `.cer` files come in both.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, PinningError> {
        match std::str::from_utf8(bytes) {
            Ok(text) if text.contains(PEM_BEGIN) => Self::from_pem(name, text),
            _ => Self::from_der(name, bytes),
        }
    }

    pub fn from_fingerprint_hex(name: &str, fingerprint: &str) -> Result<Self, PinningError> {
        let cleaned: String = fingerprint.chars().filter(|c| *c != ':').collect();
        let bytes = hex::decode(&cleaned)
            .map_err(|e| PinningError::InvalidFingerprint(e.to_string()))?;
        let fingerprint: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PinningError::InvalidFingerprint(format!("expected 32 bytes in {fingerprint:?}")))?;
        Ok(Self {
            name: name.to_string(),
            fingerprint,
        })
    }

    /// Load the credential named `name` from the host's bundle directory.
    pub fn load(bundle_dir: &Path, name: &str) -> Result<Self, PinningError> {
        let bytes = fs::read(bundle_dir.join(name)).map_err(|source| PinningError::Io {
            name: name.to_string(),
            source,
        })?;
        Self::from_bytes(name, &bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }

    /// Check the server's leaf certificate against the pin.
    pub fn verify(&self, peer_der: &[u8]) -> Result<(), TransportError> {
        let actual: [u8; 32] = Sha256::digest(peer_der).into();
        if actual == self.fingerprint {
            return Ok(());
        }
        warn!(
            certificate = %self.name,
            expected = %self.fingerprint_hex(),
            actual = %hex::encode(actual),
            "server certificate does not match pin"
        );
        Err(TransportError::new(
            TransportErrorKind::Tls,
            "server certificate rejected",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DER: &[u8] = b"\x30\x82\x01\x0aexample-certificate-bytes";

    fn pem_of(der: &[u8]) -> String {
        let b64 = STANDARD.encode(der);
        let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");
        for chunk in b64.as_bytes().chunks(64) {
            pem.push_str(std::str::from_utf8(chunk).unwrap());
            pem.push('\n');
        }
        pem.push_str("-----END CERTIFICATE-----\n");
        pem
    }

    #[test]
    fn matching_certificate_is_accepted() {
        let pin = PinnedCertificate::from_der("server.cer", DER).unwrap();
        assert!(pin.verify(DER).is_ok());
    }

    #[test]
    fn other_certificate_is_a_tls_failure() {
        let pin = PinnedCertificate::from_der("server.cer", DER).unwrap();
        let err = pin.verify(b"someone else").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Tls);
    }

    #[test]
    fn pem_and_der_pin_the_same_certificate() {
        let from_der = PinnedCertificate::from_der("a", DER).unwrap();
        let from_pem = PinnedCertificate::from_bytes("a", pem_of(DER).as_bytes()).unwrap();
        assert_eq!(from_der, from_pem);
    }

    #[test]
    fn raw_bytes_are_treated_as_der() {
        let pin = PinnedCertificate::from_bytes("a", DER).unwrap();
        assert!(pin.verify(DER).is_ok());
    }

    #[test]
    fn fingerprint_hex_round_trips() {
        let pin = PinnedCertificate::from_der("a", DER).unwrap();
        let colons: String = pin
            .fingerprint_hex()
            .as_bytes()
            .chunks(2)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join(":");
        let again = PinnedCertificate::from_fingerprint_hex("a", &colons).unwrap();
        assert_eq!(pin, again);
    }

    #[test]
    fn short_fingerprint_is_rejected() {
        let err = PinnedCertificate::from_fingerprint_hex("a", "abcd").unwrap_err();
        assert!(matches!(err, PinningError::InvalidFingerprint(_)));
    }

    #[test]
    fn truncated_pem_is_rejected() {
        let err = PinnedCertificate::from_pem("a", "-----BEGIN CERTIFICATE-----\nAAAA").unwrap_err();
        assert!(matches!(err, PinningError::InvalidPem { .. }));
    }

    #[test]
    fn empty_credential_is_rejected() {
        assert!(matches!(
            PinnedCertificate::from_der("a", &[]),
            Err(PinningError::Empty(_))
        ));
    }

    #[test]
    fn missing_bundle_file_is_io_error() {
        let err = PinnedCertificate::load(Path::new("/nonexistent"), "server.cer").unwrap_err();
        assert!(matches!(err, PinningError::Io { .. }));
    }
}
