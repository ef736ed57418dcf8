use crate::encoding::{Address, ADDRESS_LEN};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid secret key material")]
pub struct InvalidKey;

/// An unlocked account credential: an Ed25519 keypair held in memory only.
pub struct KeyPair {
    signing: SigningKey,
}

// Secret material stays out of debug output.
impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl KeyPair {
    /// Generate a fresh keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        KeyPair {
            signing: SigningKey::generate(&mut csprng),
        }
    }

    /// Restore a keypair from its 32-byte secret
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, InvalidKey> {
        let secret: [u8; 32] = bytes.try_into().map_err(|_| InvalidKey)?;
        Ok(KeyPair {
            signing: SigningKey::from_bytes(&secret),
        })
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing.verifying_key().as_bytes())
    }

    /// Account address: last 20 bytes of SHA-256 over the public key.
    pub fn address(&self) -> Address {
        let digest = Sha256::digest(self.signing.verifying_key().as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Address::from_bytes(bytes)
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }
}
