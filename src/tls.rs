//! TLS certificate loading
//!
//! warp's TLS server reads the PEM files itself, but it only reports bad
//! material once the listener is already starting. Loading the pair here
//! first turns a wrong path, an empty file, or a key that does not belong to
//! the certificate into a startup `ConfigError`.

use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use rustls::{Certificate, PrivateKey, ServerConfig as RustlsServerConfig, SignatureScheme};
use rustls_pemfile::Item;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use crate::error::{PostboardError, Result};

/// Signed with the private key and verified against the certificate
const KEY_CHECK_MESSAGE: &[u8] = b"postboard certificate key pairing check";

/// Schemes offered to the key for the pairing check, one per key family
const KEY_CHECK_SCHEMES: &[SignatureScheme] = &[
    SignatureScheme::RSA_PKCS1_SHA256,
    SignatureScheme::ECDSA_NISTP256_SHA256,
    SignatureScheme::ECDSA_NISTP384_SHA384,
    SignatureScheme::ED25519,
];

/// Loads a certificate chain and private key into a rustls server config
pub struct TlsConfigBuilder {
    cert_path: String,
    key_path: String,
}

impl TlsConfigBuilder {
    pub fn new(cert_path: String, key_path: String) -> Self {
        Self { cert_path, key_path }
    }

    pub fn build(self) -> Result<Arc<RustlsServerConfig>> {
        let cert_chain = self.load_certificates()?;
        let private_key = self.load_private_key()?;
        self.check_key_matches_certificate(&cert_chain[0], &private_key)?;

        let config = RustlsServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)
            .map_err(|e| PostboardError::ConfigError(format!("Failed to build TLS configuration: {}", e)))?;

        log::info!("TLS certificate loaded from {}", self.cert_path);
        Ok(Arc::new(config))
    }

    fn load_certificates(&self) -> Result<Vec<Certificate>> {
        let file = File::open(&self.cert_path).map_err(|e| {
            PostboardError::ConfigError(format!(
                "Failed to open certificate file '{}': {}",
                self.cert_path, e
            ))
        })?;

        let certs: Vec<Certificate> = rustls_pemfile::certs(&mut BufReader::new(file))
            .map_err(|e| {
                PostboardError::ConfigError(format!(
                    "Failed to parse certificate file '{}': {}",
                    self.cert_path, e
                ))
            })?
            .into_iter()
            .map(Certificate)
            .collect();

        if certs.is_empty() {
            return Err(PostboardError::ConfigError(format!(
                "No certificates found in '{}'",
                self.cert_path
            )));
        }
        log::debug!("Certificate chain contains {} certificate(s)", certs.len());
        Ok(certs)
    }

    /// First PKCS8, PKCS1 RSA or SEC1 EC key in the file, the formats warp serves
    fn load_private_key(&self) -> Result<PrivateKey> {
        let file = File::open(&self.key_path).map_err(|e| {
            PostboardError::ConfigError(format!(
                "Failed to open private key file '{}': {}",
                self.key_path, e
            ))
        })?;
        let mut reader = BufReader::new(file);

        loop {
            match rustls_pemfile::read_one(&mut reader)? {
                Some(Item::PKCS8Key(key)) | Some(Item::RSAKey(key)) | Some(Item::ECKey(key)) => {
                    return Ok(PrivateKey(key));
                }
                Some(_) => continue,
                None => break,
            }
        }

        Err(PostboardError::ConfigError(format!(
            "No private keys found in '{}'",
            self.key_path
        )))
    }

    /// Sign with the key and verify with the leaf certificate's public key.
    ///
    /// rustls only parses the key, so a key from another pair would otherwise
    /// load fine and fail every handshake.
    fn check_key_matches_certificate(&self, leaf: &Certificate, key: &PrivateKey) -> Result<()> {
        let signing_key = rustls::sign::any_supported_type(key).map_err(|_| {
            PostboardError::ConfigError(format!("Unsupported private key type in '{}'", self.key_path))
        })?;
        let signer = signing_key.choose_scheme(KEY_CHECK_SCHEMES).ok_or_else(|| {
            PostboardError::ConfigError(format!("Unsupported private key algorithm in '{}'", self.key_path))
        })?;

        let algorithm: &'static dyn VerificationAlgorithm = match signer.scheme() {
            SignatureScheme::RSA_PKCS1_SHA256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256 => &signature::ECDSA_P256_SHA256_ASN1,
            SignatureScheme::ECDSA_NISTP384_SHA384 => &signature::ECDSA_P384_SHA384_ASN1,
            SignatureScheme::ED25519 => &signature::ED25519,
            other => {
                return Err(PostboardError::ConfigError(format!(
                    "Unsupported signature scheme {:?} for '{}'",
                    other, self.key_path
                )))
            }
        };

        let signed = signer.sign(KEY_CHECK_MESSAGE).map_err(|e| {
            PostboardError::ConfigError(format!("Failed to sign with key '{}': {}", self.key_path, e))
        })?;

        let (_, certificate) = x509_parser::parse_x509_certificate(&leaf.0).map_err(|e| {
            PostboardError::ConfigError(format!(
                "Failed to parse certificate '{}': {}",
                self.cert_path, e
            ))
        })?;
        let public_key = &*certificate.public_key().subject_public_key.data;

        UnparsedPublicKey::new(algorithm, public_key)
            .verify(KEY_CHECK_MESSAGE, &signed)
            .map_err(|_| {
                PostboardError::ConfigError(format!(
                    "Private key '{}' does not belong to certificate '{}'",
                    self.key_path, self.cert_path
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("postboard-tls-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn path_str(path: &PathBuf) -> String {
        path.to_string_lossy().into_owned()
    }

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/tls/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn build_fixture_pair(cert: &str, key: &str) -> Result<Arc<RustlsServerConfig>> {
        TlsConfigBuilder::new(fixture(cert), fixture(key)).build()
    }

    #[test]
    fn test_pkcs8_rsa_pair_loads() {
        assert!(build_fixture_pair("rsa.crt", "rsa.key").is_ok());
    }

    #[test]
    fn test_legacy_rsa_key_loads() {
        assert!(build_fixture_pair("rsa.crt", "rsa_legacy.key").is_ok());
    }

    #[test]
    fn test_sec1_ec_pair_loads() {
        assert!(build_fixture_pair("ec.crt", "ec.key").is_ok());
    }

    #[test]
    fn test_key_from_another_pair_rejected() {
        for (cert, key) in [("rsa.crt", "other_rsa.key"), ("ec.crt", "rsa.key"), ("rsa.crt", "ec.key")] {
            match build_fixture_pair(cert, key) {
                Err(PostboardError::ConfigError(msg)) => {
                    assert!(msg.contains("does not belong"), "{} + {}: {}", cert, key, msg)
                }
                _ => panic!("{} + {} should be rejected", cert, key),
            }
        }
    }

    #[test]
    fn test_missing_certificate_file() {
        let result = TlsConfigBuilder::new(
            "/nonexistent/cert.pem".to_string(),
            "/nonexistent/key.pem".to_string(),
        )
        .build();

        match result {
            Err(PostboardError::ConfigError(msg)) => assert!(msg.contains("certificate")),
            _ => panic!("expected ConfigError"),
        }
    }

    #[test]
    fn test_empty_certificate_file() {
        let cert = temp_file("empty-cert.pem", "");
        let key = temp_file("empty-cert-key.pem", "");

        let result = TlsConfigBuilder::new(path_str(&cert), path_str(&key)).build();
        match result {
            Err(PostboardError::ConfigError(msg)) => assert!(msg.contains("No certificates")),
            _ => panic!("expected ConfigError"),
        }

        let _ = std::fs::remove_file(cert);
        let _ = std::fs::remove_file(key);
    }

    #[test]
    fn test_certificate_without_key() {
        // Structurally valid PEM framing is enough to get past certificate parsing
        let cert = temp_file(
            "nokey-cert.pem",
            "-----BEGIN CERTIFICATE-----\nMIIBAA==\n-----END CERTIFICATE-----\n",
        );
        let key = temp_file("nokey-key.pem", "not a key\n");

        let result = TlsConfigBuilder::new(path_str(&cert), path_str(&key)).build();
        match result {
            Err(PostboardError::ConfigError(msg)) => assert!(msg.contains("No private keys")),
            _ => panic!("expected ConfigError"),
        }

        let _ = std::fs::remove_file(cert);
        let _ = std::fs::remove_file(key);
    }
}
