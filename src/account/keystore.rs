//! Encrypted key files and the vault the unlock controller talks to.
//!
//! Each key file is a small JSON document holding the account address and
//! the AES-256-GCM ciphertext of the 32-byte secret key, with the cipher
//! key derived from the password via PBKDF2-HMAC-SHA256.

use crate::crypto::KeyPair;
use crate::encoding::Address;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const KDF_ROUNDS: u32 = 100_000;
const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("no key for account {0}")]
    NotFound(String),
    #[error("could not decrypt key with given password")]
    BadPassword,
    #[error("multiple keys match address {address}")]
    Ambiguous {
        address: Address,
        candidates: Vec<KeyFile>,
    },
    #[error("corrupt key file {0}")]
    Corrupt(PathBuf),
    #[error("key encryption failed")]
    Crypto,
    #[error("keystore error: {0}")]
    Storage(#[from] std::io::Error),
}

/// One candidate key record: where it lives and which address it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFile {
    pub address: Address,
    pub path: PathBuf,
}

/// Credential storage as the console sees it. The file-backed vault below
/// is the shipped implementation; tests substitute their own.
pub trait KeyVault {
    /// Known accounts in stable order, deduplicated.
    fn accounts(&self) -> Result<Vec<Address>, VaultError>;
    /// Unlock by address. Several files claiming the same address yield
    /// [`VaultError::Ambiguous`] with the candidates in scan order.
    fn unlock(&self, address: &Address, password: &str) -> Result<KeyPair, VaultError>;
    /// Probe a single candidate file, used during disambiguation.
    fn unlock_key(&self, key: &KeyFile, password: &str) -> Result<KeyPair, VaultError>;
}

#[derive(Serialize, Deserialize)]
struct StoredKey {
    address: String,
    salt: String,
    nonce: String,
    ciphertext: String,
    kdf_rounds: u32,
}

pub struct FileVault {
    dir: PathBuf,
}

impl FileVault {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        FileVault {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Generate a fresh keypair and store it encrypted under `password`.
    pub fn create(&self, password: &str) -> Result<KeyFile, VaultError> {
        self.import(&KeyPair::generate(), password)
    }

    /// Encrypt and store an existing keypair. The file name carries a random
    /// suffix so the same address may legitimately appear more than once.
    pub fn import(&self, key: &KeyPair, password: &str) -> Result<KeyFile, VaultError> {
        fs::create_dir_all(&self.dir)?;

        let mut salt = [0u8; 16];
        thread_rng().fill(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        thread_rng().fill(&mut nonce_bytes);

        let cipher = Aes256Gcm::new(&derive_key(password, &salt, KDF_ROUNDS).into());
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, key.secret_bytes().as_slice())
            .map_err(|_| VaultError::Crypto)?;

        let address = key.address();
        let stored = StoredKey {
            address: address.to_string(),
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
            kdf_rounds: KDF_ROUNDS,
        };

        let path = self
            .dir
            .join(format!("{}-{:08x}.json", address, thread_rng().gen::<u32>()));
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|_| VaultError::Corrupt(path.clone()))?;
        fs::write(&path, json)?;
        Ok(KeyFile { address, path })
    }

    /// All key files in the directory, in file-name order.
    fn scan(&self) -> Result<Vec<KeyFile>, VaultError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        paths.sort();

        let mut keys = Vec::with_capacity(paths.len());
        for path in paths {
            let stored = read_stored(&path)?;
            let address: Address = stored
                .address
                .parse()
                .map_err(|_| VaultError::Corrupt(path.clone()))?;
            keys.push(KeyFile { address, path });
        }
        Ok(keys)
    }
}

fn read_stored(path: &Path) -> Result<StoredKey, VaultError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|_| VaultError::Corrupt(path.to_path_buf()))
}

fn derive_key(password: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, &mut key);
    key
}

impl KeyVault for FileVault {
    fn accounts(&self) -> Result<Vec<Address>, VaultError> {
        let mut seen = Vec::new();
        for key in self.scan()? {
            if !seen.contains(&key.address) {
                seen.push(key.address);
            }
        }
        Ok(seen)
    }

    fn unlock(&self, address: &Address, password: &str) -> Result<KeyPair, VaultError> {
        let matches: Vec<KeyFile> = self
            .scan()?
            .into_iter()
            .filter(|k| k.address == *address)
            .collect();
        match matches.len() {
            0 => Err(VaultError::NotFound(address.to_string())),
            1 => self.unlock_key(&matches[0], password),
            _ => Err(VaultError::Ambiguous {
                address: *address,
                candidates: matches,
            }),
        }
    }

    fn unlock_key(&self, key: &KeyFile, password: &str) -> Result<KeyPair, VaultError> {
        let stored = read_stored(&key.path)?;
        let salt =
            hex::decode(&stored.salt).map_err(|_| VaultError::Corrupt(key.path.clone()))?;
        let nonce_bytes =
            hex::decode(&stored.nonce).map_err(|_| VaultError::Corrupt(key.path.clone()))?;
        let ciphertext =
            hex::decode(&stored.ciphertext).map_err(|_| VaultError::Corrupt(key.path.clone()))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(VaultError::Corrupt(key.path.clone()));
        }

        let cipher = Aes256Gcm::new(&derive_key(password, &salt, stored.kdf_rounds).into());
        let nonce = Nonce::from_slice(&nonce_bytes);
        let secret = cipher
            .decrypt(nonce, ciphertext.as_slice())
            .map_err(|_| VaultError::BadPassword)?;

        KeyPair::from_secret_bytes(&secret).map_err(|_| VaultError::Corrupt(key.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_unlock() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path());
        let created = vault.create("open sesame").unwrap();

        let accounts = vault.accounts().unwrap();
        assert_eq!(accounts, vec![created.address]);

        let key = vault.unlock(&created.address, "open sesame").unwrap();
        assert_eq!(key.address(), created.address);
    }

    #[test]
    fn test_wrong_password_is_bad_password() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path());
        let created = vault.create("right").unwrap();
        assert!(matches!(
            vault.unlock(&created.address, "wrong"),
            Err(VaultError::BadPassword)
        ));
    }

    #[test]
    fn test_unknown_address_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path());
        vault.create("pw").unwrap();
        let other = KeyPair::generate().address();
        assert!(matches!(
            vault.unlock(&other, "pw"),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_address_reports_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path());
        let key = KeyPair::generate();
        vault.import(&key, "first").unwrap();
        vault.import(&key, "second").unwrap();

        match vault.unlock(&key.address(), "first") {
            Err(VaultError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                // Each candidate is still individually unlockable.
                let probes: Vec<bool> = candidates
                    .iter()
                    .map(|c| vault.unlock_key(c, "second").is_ok())
                    .collect();
                assert_eq!(probes.iter().filter(|ok| **ok).count(), 1);
            }
            other => panic!("expected ambiguous, got {:?}", other.map(|_| ())),
        }

        // accounts() still lists the address once.
        assert_eq!(vault.accounts().unwrap(), vec![key.address()]);
    }

    #[test]
    fn test_corrupt_file_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path());
        let created = vault.create("pw").unwrap();
        fs::write(&created.path, "{ not json").unwrap();
        assert!(matches!(
            vault.unlock(&created.address, "pw"),
            Err(VaultError::Corrupt(_))
        ));
    }
}
