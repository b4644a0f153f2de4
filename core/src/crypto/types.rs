// ## 📂 File: `src/crypto/types.rs`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::tokens;

/// Which way the cipher runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward transform (plaintext → ciphertext).
    Encrypt,
    /// Inverse transform (ciphertext → plaintext).
    Decrypt,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Encrypt)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Encrypt => tokens::ENCRYPT,
            Direction::Decrypt => tokens::DECRYPT,
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            tokens::ENCRYPT => Ok(Direction::Encrypt),
            tokens::DECRYPT => Ok(Direction::Decrypt),
            other => Err(format!(
                "invalid operation '{other}', use '{}' or '{}'",
                tokens::ENCRYPT,
                tokens::DECRYPT
            )),
        }
    }
}

/// Cipher mode for a run.
///
/// - `Chained`: AES-128-CBC over each worker's whole chunk (sequential inside the chunk).
/// - `BlockIndependent`: AES-128-ECB, every 16-byte block transformed on its own,
///   which is what lets a worker fan blocks out across execution units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherMode {
    Chained,
    BlockIndependent,
}

impl CipherMode {
    /// Canonical CLI token.
    pub fn token(self) -> &'static str {
        match self {
            CipherMode::Chained => tokens::MODE_CHAINED[0],
            CipherMode::BlockIndependent => tokens::MODE_INDEPENDENT[0],
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CipherMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if tokens::MODE_CHAINED.contains(&s) {
            Ok(CipherMode::Chained)
        } else if tokens::MODE_INDEPENDENT.contains(&s) {
            Ok(CipherMode::BlockIndependent)
        } else {
            Err(format!(
                "invalid mode '{s}', use '{}' or '{}'",
                tokens::MODE_CHAINED[0],
                tokens::MODE_INDEPENDENT[0]
            ))
        }
    }
}

/// Failures surfaced by the underlying block-cipher primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The primitive could not be keyed (wrong key or IV length).
    #[error("cipher init failed: {reason}")]
    Init { reason: String },

    /// The primitive could not complete the operation; on the inverse path this
    /// covers padding validation.
    #[error("cipher finalize failed: {reason}")]
    Finalize { reason: String },
}

impl CipherError {
    pub fn init(reason: impl Into<String>) -> Self {
        CipherError::Init { reason: reason.into() }
    }

    pub fn finalize(reason: impl Into<String>) -> Self {
        CipherError::Finalize { reason: reason.into() }
    }
}
