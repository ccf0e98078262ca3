//! Shareable-id codec
//!
//! Reversible obfuscation of the aggregator's internal account id into the
//! public token users hand to each other when receiving a transfer. This is
//! id obfuscation, not confidentiality: the keystream is derived from a
//! configured secret with SHA-256 and XORed over the id, then hex-encoded.
//! Anyone holding the secret can decode; nobody without it can read raw
//! account ids out of a shared token.

use sha2::{Digest, Sha256};

/// Encodes and decodes shareable account ids.
#[derive(Clone)]
pub struct ShareableIdCodec {
    keystream: [u8; 32],
}

/// Errors from decoding a shareable id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareableIdError {
    #[error("Shareable id is not valid hex")]
    InvalidEncoding,

    #[error("Shareable id does not decode to a valid account id")]
    InvalidPayload,
}

impl ShareableIdCodec {
    pub fn new(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        Self {
            keystream: hasher.finalize().into(),
        }
    }

    fn xor(&self, bytes: &mut [u8]) {
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte ^= self.keystream[i % self.keystream.len()];
        }
    }

    /// Obfuscate an account id into its shareable form.
    pub fn encode(&self, account_id: &str) -> String {
        let mut bytes = account_id.as_bytes().to_vec();
        self.xor(&mut bytes);
        hex::encode(bytes)
    }

    /// Recover the account id from a shareable id.
    pub fn decode(&self, shareable_id: &str) -> Result<String, ShareableIdError> {
        let mut bytes =
            hex::decode(shareable_id).map_err(|_| ShareableIdError::InvalidEncoding)?;
        self.xor(&mut bytes);
        String::from_utf8(bytes).map_err(|_| ShareableIdError::InvalidPayload)
    }
}
