//! Bounded-retry account unlock with ambiguous-address disambiguation.
//!
//! The controller never terminates the process; every fatal condition is
//! returned as an [`UnlockFailure`] and the startup orchestrator decides
//! what to do with it.

use crate::account::keystore::{KeyFile, KeyVault, VaultError};
use crate::crypto::KeyPair;
use crate::encoding::Address;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const MAX_TRIALS: u32 = 3;

#[derive(Error, Debug)]
pub enum UnlockFailure {
    #[error("unknown account to unlock: {0}")]
    UnknownAccount(String),
    #[error("no password supplied for account {0}")]
    NoPassword(String),
    #[error("failed to unlock account {account} after {attempts} attempts: {reason}")]
    ExhaustedRetries {
        account: String,
        attempts: u32,
        reason: VaultError,
    },
    #[error("none of the keys matching {account} accept the password; candidates: {candidates:?}")]
    NoMatchingKey {
        account: String,
        candidates: Vec<PathBuf>,
    },
    #[error("{0}")]
    Vault(VaultError),
    #[error("could not read password: {0}")]
    Io(#[from] io::Error),
}

/// Where trial passwords come from: a pre-supplied list indexed by the
/// unlock request's position (clamped to the last entry), or the operator.
pub enum PasswordSource {
    List(Vec<String>),
    Prompt,
}

impl PasswordSource {
    fn password(
        &self,
        account: &str,
        position: usize,
        trial: u32,
    ) -> Result<String, UnlockFailure> {
        match self {
            PasswordSource::List(list) => list
                .get(position)
                .or_else(|| list.last())
                .cloned()
                .ok_or_else(|| UnlockFailure::NoPassword(account.to_string())),
            PasswordSource::Prompt => {
                print!(
                    "Unlocking account {} (attempt {}/{})\nPassword: ",
                    account,
                    trial + 1,
                    MAX_TRIALS
                );
                io::stdout().flush()?;
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                Ok(line.trim_end_matches(['\r', '\n']).to_string())
            }
        }
    }
}

/// A successfully unlocked credential and the password that opened it.
pub struct Unlocked {
    pub address: Address,
    pub key: KeyPair,
    pub password: String,
}

// The password never appears in debug output.
impl std::fmt::Debug for Unlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unlocked")
            .field("address", &self.address)
            .field("key", &self.key)
            .field("password", &"<redacted>")
            .finish()
    }
}

enum Attempt {
    Trying(u32),
    Ambiguous {
        candidates: Vec<KeyFile>,
        password: String,
    },
}

pub struct UnlockController<'a, V> {
    vault: &'a V,
    source: PasswordSource,
}

impl<'a, V: KeyVault> UnlockController<'a, V> {
    pub fn new(vault: &'a V, source: PasswordSource) -> Self {
        UnlockController { vault, source }
    }

    /// Unlock `identifier` (an address or a decimal index into the known
    /// accounts), taking `position` as the index into a pre-supplied
    /// password list. At most [`MAX_TRIALS`] trials.
    pub fn unlock(&self, identifier: &str, position: usize) -> Result<Unlocked, UnlockFailure> {
        let address = self.resolve(identifier)?;
        let mut last_reason = VaultError::BadPassword;
        let mut state = Attempt::Trying(0);

        loop {
            state = match state {
                Attempt::Trying(trial) => {
                    if trial >= MAX_TRIALS {
                        return Err(UnlockFailure::ExhaustedRetries {
                            account: identifier.to_string(),
                            attempts: MAX_TRIALS,
                            reason: last_reason,
                        });
                    }
                    let password = self.source.password(identifier, position, trial)?;
                    match self.vault.unlock(&address, &password) {
                        Ok(key) => {
                            info!(%address, "account unlocked");
                            return Ok(Unlocked {
                                address,
                                key,
                                password,
                            });
                        }
                        Err(VaultError::Ambiguous { candidates, .. }) => Attempt::Ambiguous {
                            candidates,
                            password,
                        },
                        Err(VaultError::BadPassword) => {
                            debug!(%address, trial, "password rejected");
                            last_reason = VaultError::BadPassword;
                            Attempt::Trying(trial + 1)
                        }
                        // Storage-class failures abort the remaining trials.
                        Err(other) => return Err(UnlockFailure::Vault(other)),
                    }
                }
                Attempt::Ambiguous {
                    candidates,
                    password,
                } => {
                    // First candidate that accepts the password wins. Not
                    // retried across trials: failing here is final.
                    for candidate in &candidates {
                        match self.vault.unlock_key(candidate, &password) {
                            Ok(key) => {
                                info!(%address, path = %candidate.path.display(),
                                    "ambiguous address resolved");
                                return Ok(Unlocked {
                                    address,
                                    key,
                                    password,
                                });
                            }
                            Err(VaultError::BadPassword) => continue,
                            Err(other) => return Err(UnlockFailure::Vault(other)),
                        }
                    }
                    return Err(UnlockFailure::NoMatchingKey {
                        account: identifier.to_string(),
                        candidates: candidates.into_iter().map(|c| c.path).collect(),
                    });
                }
            };
        }
    }

    fn resolve(&self, identifier: &str) -> Result<Address, UnlockFailure> {
        if identifier.starts_with("0x") {
            return identifier
                .parse()
                .map_err(|_| UnlockFailure::UnknownAccount(identifier.to_string()));
        }
        if let Ok(index) = identifier.parse::<usize>() {
            let accounts = self.vault.accounts().map_err(UnlockFailure::Vault)?;
            return accounts
                .get(index)
                .copied()
                .ok_or_else(|| UnlockFailure::UnknownAccount(identifier.to_string()));
        }
        Err(UnlockFailure::UnknownAccount(identifier.to_string()))
    }
}
