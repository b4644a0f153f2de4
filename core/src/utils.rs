use std::path::{Path, PathBuf};

use crate::constants::{suffixes, KEY_LEN_16};
use crate::crypto::Direction;
use crate::types::RunError;

/// Output path for `input`: the file stem plus a direction suffix, in the input's directory.
///
/// `photos/cat.bmp` + encrypt → `photos/cat_output.bin`
/// `photos/cat_output.bin` + decrypt → `photos/cat_output_outputdecrypted.bmp`
pub fn derive_output_path(input: &Path, direction: Direction) -> PathBuf {
    let suffix = match direction {
        Direction::Encrypt => suffixes::ENCRYPT,
        Direction::Decrypt => suffixes::DECRYPT,
    };

    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(suffix);

    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Decode the key argument: raw bytes of `text`, or hex when `hex` is set.
pub fn parse_key(text: &str, hex: bool) -> Result<Vec<u8>, RunError> {
    if hex {
        hex::decode(text.trim()).map_err(|e| RunError::Usage(format!("invalid hex key: {e}")))
    } else {
        Ok(text.as_bytes().to_vec())
    }
}

/// Fixed-size copy of a key that must be exactly 16 bytes.
pub fn key_array(key: &[u8]) -> Result<[u8; KEY_LEN_16], RunError> {
    key.try_into().map_err(|_| {
        RunError::Usage(format!(
            "key must be exactly {KEY_LEN_16} bytes, got {}",
            key.len()
        ))
    })
}

/// Render a byte count the way the CLI reports sizes.
pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}
