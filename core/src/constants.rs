
/// AES block length in bytes. Every "block" in this crate is this size.
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key length. Keys of any other length are rejected before bring-up.
pub const KEY_LEN_16: usize = 16;

/// Initialization vector for the chained mode.
///
/// Fixed and caller-invisible. Every chunk is chained from this same vector,
/// and nothing about it is stored in the output.
pub const FIXED_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Rank of the coordinating worker (reads input, reassembles, writes output).
pub const COORDINATOR_RANK: usize = 0;

/// Worker count when the caller leaves it unset.
pub const DEFAULT_WORKERS: usize = 4;
/// Sanity bound on the worker set size.
pub const MAX_WORKERS: usize = 256;

/// Output file suffixes, appended after stripping the input's last extension.
pub mod suffixes {
    pub const ENCRYPT: &str = "_output.bin";
    pub const DECRYPT: &str = "_outputdecrypted.bmp";
}

/// Accepted CLI tokens (canonical name first, legacy alias second).
pub mod tokens {
    pub const ENCRYPT: &str = "encrypt";
    pub const DECRYPT: &str = "decrypt";

    pub const MODE_CHAINED: &[&str] = &["block-chained-128", "aes-128-cbc"];
    pub const MODE_INDEPENDENT: &[&str] = &["block-independent-128", "aes-128-ecb"];
}

/// Temp suffix used while the coordinator persists output.
pub const PARTIAL_SUFFIX: &str = "partial";
