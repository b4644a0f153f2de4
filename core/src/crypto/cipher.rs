// ## 📂 File: `src/crypto/cipher.rs`

//! src/crypto/cipher.rs
//! Adapter over AES-128 for the two transform paths the protocol needs.
//!
//! Design notes:
//! - Block path: one 16-byte block, no padding, no chaining. Input length is the
//!   caller's responsibility.
//! - Buffer path (chained): AES-128-CBC with PKCS#7 over an arbitrary-length buffer.
//!   The IV is supplied per call, so no chaining state survives between calls.
//! - Tail path (block-independent): AES-128-ECB with PKCS#7 over the final partial
//!   segment of a chunk.

use std::fmt;

use aes::{Aes128, Block};
use cbc::cipher::{
    block_padding::Pkcs7, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit,
    KeyIvInit,
};

use crate::constants::{BLOCK_SIZE, KEY_LEN_16};
use crate::crypto::types::{CipherError, Direction};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// Transform exactly one block under `key`.
pub fn transform_block(
    input: &[u8; BLOCK_SIZE],
    key: &[u8],
    direction: Direction,
) -> Result<[u8; BLOCK_SIZE], CipherError> {
    let adapter = CipherAdapter::new(key)?;
    let mut out = [0u8; BLOCK_SIZE];
    adapter.transform_block_into(input, &mut out, direction);
    Ok(out)
}

/// Chained-mode transform of a whole buffer under `key` and `iv`.
pub fn transform_buffer(
    input: &[u8],
    key: &[u8],
    iv: &[u8],
    direction: Direction,
) -> Result<Vec<u8>, CipherError> {
    CipherAdapter::new(key)?.transform_buffer(input, iv, direction)
}

/// Block-independent padded transform of a final segment under `key`.
pub fn transform_tail(input: &[u8], key: &[u8], direction: Direction) -> Result<Vec<u8>, CipherError> {
    CipherAdapter::new(key)?.transform_tail(input, direction)
}

/// Keyed AES-128 context.
///
/// Holds the expanded key schedule once; execution units share it by reference
/// (read-only), so no per-block re-keying happens in the hot loop.
#[derive(Clone)]
pub struct CipherAdapter {
    key: [u8; KEY_LEN_16],
    block: Aes128,
}

impl fmt::Debug for CipherAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        f.debug_struct("CipherAdapter").finish_non_exhaustive()
    }
}

impl CipherAdapter {
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        if key.len() != KEY_LEN_16 {
            return Err(CipherError::init(format!(
                "invalid key length: expected={}, actual={}",
                KEY_LEN_16,
                key.len()
            )));
        }
        let block = Aes128::new_from_slice(key)
            .map_err(|_| CipherError::init("AES-128 key schedule rejected the key"))?;

        let mut arr = [0u8; KEY_LEN_16];
        arr.copy_from_slice(key);
        Ok(Self { key: arr, block })
    }

    /// Transform one block from `input` into `output`.
    ///
    /// Both slices must be exactly `BLOCK_SIZE` long.
    pub fn transform_block_into(&self, input: &[u8], output: &mut [u8], direction: Direction) {
        debug_assert_eq!(input.len(), BLOCK_SIZE);
        debug_assert_eq!(output.len(), BLOCK_SIZE);

        output.copy_from_slice(input);
        let block = Block::from_mut_slice(output);
        match direction {
            Direction::Encrypt => self.block.encrypt_block(block),
            Direction::Decrypt => self.block.decrypt_block(block),
        }
    }

    /// Transform every whole block of `input` into `output`, block by block.
    ///
    /// Returns the number of bytes written. Trailing bytes short of a block are ignored.
    pub fn transform_blocks(&self, input: &[u8], output: &mut [u8], direction: Direction) -> usize {
        let mut written = 0;
        for (src, dst) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            self.transform_block_into(src, dst, direction);
            written += BLOCK_SIZE;
        }
        written
    }

    /// Padded single-shot ECB transform used for a chunk's final segment.
    ///
    /// Forward: any length in, padded to the next block boundary (an empty input
    /// yields one full padding block). Inverse: input must be block-aligned and end
    /// in valid PKCS#7 padding, which is stripped.
    pub fn transform_tail(&self, input: &[u8], direction: Direction) -> Result<Vec<u8>, CipherError> {
        match direction {
            Direction::Encrypt => {
                let enc = Aes128EcbEnc::new_from_slice(&self.key)
                    .map_err(|_| CipherError::init("AES-128-ECB init failed"))?;
                Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(input))
            }
            Direction::Decrypt => {
                let dec = Aes128EcbDec::new_from_slice(&self.key)
                    .map_err(|_| CipherError::init("AES-128-ECB init failed"))?;
                dec.decrypt_padded_vec_mut::<Pkcs7>(input).map_err(|_| {
                    CipherError::finalize(format!(
                        "AES-128-ECB padding check failed on {} byte segment",
                        input.len()
                    ))
                })
            }
        }
    }

    /// Chained (CBC + PKCS#7) transform of the whole buffer, seeded by `iv`.
    pub fn transform_buffer(
        &self,
        input: &[u8],
        iv: &[u8],
        direction: Direction,
    ) -> Result<Vec<u8>, CipherError> {
        if iv.len() != BLOCK_SIZE {
            return Err(CipherError::init(format!(
                "invalid iv length: expected={}, actual={}",
                BLOCK_SIZE,
                iv.len()
            )));
        }

        match direction {
            Direction::Encrypt => {
                let enc = Aes128CbcEnc::new_from_slices(&self.key, iv)
                    .map_err(|_| CipherError::init("AES-128-CBC init failed"))?;
                Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(input))
            }
            Direction::Decrypt => {
                let dec = Aes128CbcDec::new_from_slices(&self.key, iv)
                    .map_err(|_| CipherError::init("AES-128-CBC init failed"))?;
                dec.decrypt_padded_vec_mut::<Pkcs7>(input).map_err(|_| {
                    CipherError::finalize(format!(
                        "AES-128-CBC padding check failed on {} byte buffer",
                        input.len()
                    ))
                })
            }
        }
    }
}
