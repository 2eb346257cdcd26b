//! Password-encryption certificate for remote desktop accounts.
//!
//! The certificate secret is generated once per project and kept under
//! `.remote-access/certificate.key`. Its SHA1 thumbprint is what the service
//! configuration references; the account password is stored encrypted with
//! AES-256-GCM under the secret.

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha1::{Digest, Sha1};

use crate::error::ServiceError;

const CERTIFICATE_DIR: &str = ".remote-access";
const CERTIFICATE_FILE: &str = "certificate.key";
const NONCE_LEN: usize = 12;

pub struct RemoteAccessCertificate {
    secret: [u8; 32],
    thumbprint: String,
}

impl RemoteAccessCertificate {
    pub fn generate() -> Self {
        Self::from_secret(rand::random())
    }

    fn from_secret(secret: [u8; 32]) -> Self {
        let thumbprint = Sha1::digest(secret)
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        Self { secret, thumbprint }
    }

    pub fn path(root: &Path) -> PathBuf {
        root.join(CERTIFICATE_DIR).join(CERTIFICATE_FILE)
    }

    /// Reuse the project's certificate, creating it on first use.
    pub fn load_or_create(root: &Path) -> Result<Self, ServiceError> {
        let path = Self::path(root);
        if path.is_file() {
            let encoded = fs::read_to_string(&path)?;
            let bytes = BASE64
                .decode(encoded.trim())
                .map_err(|e| ServiceError::Certificate(format!("corrupt certificate file: {}", e)))?;
            let secret: [u8; 32] = bytes.try_into().map_err(|_| {
                ServiceError::Certificate("certificate secret must be 32 bytes".to_string())
            })?;
            return Ok(Self::from_secret(secret));
        }

        let certificate = Self::generate();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, BASE64.encode(certificate.secret))?;
        tracing::info!(thumbprint = %certificate.thumbprint, "Generated remote access certificate");
        Ok(certificate)
    }

    /// Upper-case hex SHA1 of the secret.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// Base64 of `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, ServiceError> {
        let cipher = self.cipher()?;
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| ServiceError::Certificate(format!("encryption failed: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(payload))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, ServiceError> {
        let payload = BASE64
            .decode(encoded)
            .map_err(|e| ServiceError::Certificate(format!("base64 decode failed: {}", e)))?;
        if payload.len() <= NONCE_LEN {
            return Err(ServiceError::Certificate("payload too short".to_string()));
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| ServiceError::Certificate("decryption failed".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| ServiceError::Certificate("invalid UTF-8 in password".to_string()))
    }

    fn cipher(&self) -> Result<Aes256Gcm, ServiceError> {
        Aes256Gcm::new_from_slice(&self.secret)
            .map_err(|e| ServiceError::Certificate(format!("invalid key: {}", e)))
    }
}
