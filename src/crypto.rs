//! Crypto module for password transport encryption
//!
//! Encrypts document-unlock passwords under the backend's RSA public key
//! before they leave the client. Uses RSA-OAEP with SHA-256, so repeated
//! encryptions of the same password produce different ciphertexts.
//!
//! Security properties:
//! - Plaintext passwords never cross the wire or appear in logs
//! - Ciphertext length equals the key modulus size (256 bytes for 2048-bit)
//! - Fallback to plain base64 is tagged with a scheme discriminator so the
//!   backend can detect degraded transport
//! - Zeroize for secure memory cleanup of plaintext secrets

use base64::Engine;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

/// OAEP overhead for SHA-256: two hash blocks plus two bytes of framing
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

/// Pinned backend public key. Versioned artifact: rotating it requires a
/// coordinated client/server deploy (there is no key discovery protocol).
pub const SERVER_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAu1SU1LfVLfHCozMxH2Mo
4lgOP+IJEPh5/G9y93Mid7t3VNcyyYDS7lbOaUvZ9/tv0t8vCeniRBwgnrxFgGio
8BQI2N1U0A8lSsDyJOwV5HCaRFqYhVtn9WSW6oMYD8b2F7y5wFTKc+q6xllq+DLg
iT5eaSocROi5BvCvUVNRxCeW0KkGb7R1Yb6lfA5NKd2IwWVbxFfvM+CkyR/CwNGq
JbFl2L6SL1OeEA8RZSflQXDkVr0bWGSI3mVPQmVVo8+tqn/BwQxEX+oY1dFBBp5y
XxGtJLe7LIRIMLnJ6hWM9fNpNQk3q8DfXwdvpTKhL2kJ0mP7KxQXQfr1OiEhDILp
/8dHdWQjAgMBAAE=
-----END PUBLIC KEY-----";

// ============================================================================
// Data Types
// ============================================================================

/// How a transport payload was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionScheme {
    /// Real RSA-OAEP-SHA-256 ciphertext under the pinned server key
    RsaOaepSha256,
    /// Plain base64 of the secret. Not confidential; emitted only when the
    /// cryptographic path is unavailable, and tagged so the backend can
    /// reject or flag degraded transport.
    PlainFallback,
}

impl EncryptionScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionScheme::RsaOaepSha256 => "rsa-oaep-sha256",
            EncryptionScheme::PlainFallback => "plain-fallback",
        }
    }
}

/// Transport-safe form of a user-entered secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub scheme: EncryptionScheme,
    /// Base64 of the ciphertext (or of the raw secret in fallback mode)
    pub data: String,
}

impl EncryptedPayload {
    pub fn is_confidential(&self) -> bool {
        self.scheme == EncryptionScheme::RsaOaepSha256
    }
}

/// Wrapper for a plaintext secret that zeroizes on drop
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(***)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("secret exceeds the {limit}-byte OAEP bound for this key")]
    TooLarge { limit: usize },
}

// ============================================================================
// Credential Encryptor
// ============================================================================

/// Wraps the backend's RSA public key and turns plaintext secrets into
/// transport payloads. Key material is loaded once; a key that fails to
/// parse puts the encryptor permanently into fallback mode.
pub struct CredentialEncryptor {
    public_key: Option<RsaPublicKey>,
}

impl CredentialEncryptor {
    /// Build an encryptor from a PEM-encoded SPKI public key. A malformed
    /// key is logged and degrades every subsequent encrypt call to the
    /// tagged plain-base64 fallback instead of failing the caller.
    pub fn from_pem(pem: &str) -> Self {
        let public_key = match RsaPublicKey::from_public_key_pem(pem) {
            Ok(key) => Some(key),
            Err(e) => {
                log::warn!(
                    "RSA public key import failed, falling back to plain encoding: {}",
                    e
                );
                None
            }
        };
        Self { public_key }
    }

    /// Maximum plaintext size the key can carry under OAEP-SHA-256
    /// (190 bytes for a 2048-bit key). None in fallback mode.
    pub fn plaintext_limit(&self) -> Option<usize> {
        self.public_key.as_ref().map(|k| k.size() - OAEP_OVERHEAD)
    }

    /// Encrypt a secret for transport.
    ///
    /// Oversized secrets fail fast with [`CryptoError::TooLarge`]; they are
    /// never truncated and never fall back. Any other cryptographic failure
    /// degrades to the tagged fallback encoding, so callers must treat the
    /// result as best-effort obfuscation and rely on TLS as the real
    /// confidentiality boundary.
    pub fn encrypt(&self, secret: &SecretString) -> Result<EncryptedPayload, CryptoError> {
        let plaintext = secret.expose().as_bytes();

        let key = match &self.public_key {
            Some(key) => key,
            None => return Ok(Self::fallback(plaintext)),
        };

        let limit = key.size() - OAEP_OVERHEAD;
        if plaintext.len() > limit {
            return Err(CryptoError::TooLarge { limit });
        }

        let padding = Oaep::new::<Sha256>();
        match key.encrypt(&mut rand::thread_rng(), padding, plaintext) {
            Ok(ciphertext) => Ok(EncryptedPayload {
                scheme: EncryptionScheme::RsaOaepSha256,
                data: base64::engine::general_purpose::STANDARD.encode(ciphertext),
            }),
            Err(e) => {
                log::warn!(
                    "RSA-OAEP encryption failed, falling back to plain encoding: {}",
                    e
                );
                Ok(Self::fallback(plaintext))
            }
        }
    }

    fn fallback(plaintext: &[u8]) -> EncryptedPayload {
        EncryptedPayload {
            scheme: EncryptionScheme::PlainFallback,
            data: base64::engine::general_purpose::STANDARD.encode(plaintext),
        }
    }
}

impl Default for CredentialEncryptor {
    fn default() -> Self {
        Self::from_pem(SERVER_PUBLIC_KEY_PEM)
    }
}

lazy_static::lazy_static! {
    static ref SHARED_ENCRYPTOR: CredentialEncryptor = CredentialEncryptor::default();
}

/// Process-wide encryptor over the pinned server key
pub fn shared_encryptor() -> &'static CredentialEncryptor {
    &SHARED_ENCRYPTOR
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::RsaPrivateKey;

    fn test_keypair() -> (RsaPrivateKey, CredentialEncryptor) {
        let private_key =
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("keygen failed");
        let pem = private_key
            .to_public_key()
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .expect("pem encode failed");
        (private_key, CredentialEncryptor::from_pem(&pem))
    }

    fn decrypt(private_key: &RsaPrivateKey, payload: &EncryptedPayload) -> String {
        assert_eq!(payload.scheme, EncryptionScheme::RsaOaepSha256);
        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(&payload.data)
            .expect("invalid base64");
        let plaintext = private_key
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .expect("decrypt failed");
        String::from_utf8(plaintext).expect("invalid utf-8")
    }

    #[test]
    fn test_encrypt_round_trip() {
        let (private_key, encryptor) = test_keypair();
        let payload = encryptor
            .encrypt(&SecretString::new("hunter2 unlock"))
            .unwrap();

        assert!(payload.is_confidential());
        assert_eq!(decrypt(&private_key, &payload), "hunter2 unlock");
    }

    #[test]
    fn test_ciphertext_length_is_fixed_by_modulus() {
        let (_, encryptor) = test_keypair();
        let short = encryptor.encrypt(&SecretString::new("a")).unwrap();
        let long = encryptor
            .encrypt(&SecretString::new("a much longer password value"))
            .unwrap();

        // 2048-bit key: 256-byte ciphertext regardless of plaintext length
        let decoded_len = |p: &EncryptedPayload| {
            base64::engine::general_purpose::STANDARD
                .decode(&p.data)
                .unwrap()
                .len()
        };
        assert_eq!(decoded_len(&short), 256);
        assert_eq!(decoded_len(&long), 256);
    }

    #[test]
    fn test_repeated_encryption_differs_but_decrypts_equal() {
        let (private_key, encryptor) = test_keypair();
        let secret = SecretString::new("same secret");

        let first = encryptor.encrypt(&secret).unwrap();
        let second = encryptor.encrypt(&secret).unwrap();

        // OAEP randomness: ciphertexts differ, plaintexts agree
        assert_ne!(first.data, second.data);
        assert_eq!(decrypt(&private_key, &first), "same secret");
        assert_eq!(decrypt(&private_key, &second), "same secret");
    }

    #[test]
    fn test_oversized_secret_fails_fast() {
        let (_, encryptor) = test_keypair();
        assert_eq!(encryptor.plaintext_limit(), Some(190));

        let oversized = SecretString::new("x".repeat(191));
        match encryptor.encrypt(&oversized) {
            Err(CryptoError::TooLarge { limit }) => assert_eq!(limit, 190),
            Ok(payload) => panic!("expected TooLarge, got {:?}", payload.scheme),
        }

        // Exactly at the bound still encrypts
        let at_bound = SecretString::new("x".repeat(190));
        assert!(encryptor.encrypt(&at_bound).unwrap().is_confidential());
    }

    #[test]
    fn test_bad_key_degrades_to_tagged_fallback() {
        let encryptor = CredentialEncryptor::from_pem("not a pem at all");
        assert!(encryptor.plaintext_limit().is_none());

        let payload = encryptor.encrypt(&SecretString::new("abc")).unwrap();
        assert_eq!(payload.scheme, EncryptionScheme::PlainFallback);
        assert!(!payload.is_confidential());

        // Fallback is reversible base64 of the original secret
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&payload.data)
            .unwrap();
        assert_eq!(decoded, b"abc");
    }

    #[test]
    fn test_pinned_key_parses() {
        let encryptor = CredentialEncryptor::default();
        assert_eq!(encryptor.plaintext_limit(), Some(190));
    }
}
