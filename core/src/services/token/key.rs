//! HMAC signing key decoded from provisioned configuration

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use jsonwebtoken::EncodingKey;
use rand::{rngs::OsRng, RngCore};
use std::fmt;

use crate::domain::SigningAlgorithm;
use crate::errors::SetupError;

/// Length in bytes of secrets produced by [`SigningKey::generate_secret`]
pub const GENERATED_SECRET_LEN: usize = 64;

/// Symmetric key used to sign and verify tokens
///
/// Built once from the base64 secret at startup. The raw bytes are not
/// retained outside the derived key, and there is no way to get them back out.
#[derive(Clone)]
pub struct SigningKey {
    encoding_key: EncodingKey,
    len: usize,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Decodes a standard base64 secret
    ///
    /// # Errors
    ///
    /// * `SetupError::InvalidSecret` - Not valid base64
    /// * `SetupError::EmptySecret` - Decodes to zero bytes
    pub fn from_base64(secret: &str) -> Result<Self, SetupError> {
        let bytes = BASE64.decode(secret.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Builds a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SetupError> {
        if bytes.is_empty() {
            return Err(SetupError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            len: bytes.len(),
        })
    }

    /// Generates a new random secret, base64-encoded, for provisioning
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; GENERATED_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        BASE64.encode(bytes)
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fails if the key is shorter than `algorithm` requires
    pub fn check_strength(&self, algorithm: SigningAlgorithm) -> Result<(), SetupError> {
        let required = algorithm.min_key_len();
        if self.len < required {
            return Err(SetupError::KeyTooShort {
                algorithm,
                required,
                actual: self.len,
            });
        }
        Ok(())
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}
