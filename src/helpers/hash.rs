//! Content hashing and hash type detection

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use strum_macros::{Display, EnumString};

/// Kind of content hash a search can filter on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HashType {
    Md5,
    Sha1,
    Sha256,
}

/// Classifies a hash by its length only. The characters are not inspected.
/// * `value` - The hash as sent by the client
pub fn guess_hash_type(value: &str) -> Option<HashType> {
    match value.len() {
        32 => Some(HashType::Md5),
        40 => Some(HashType::Sha1),
        64 => Some(HashType::Sha256),
        _ => None,
    }
}

/// The three digests that identify a file, lower case hex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHashes {
    pub sha256: String,
    pub sha1: String,
    pub md5: String,
}

/// Calculates all digests of `content` in one pass.
pub fn hash_bytes(content: &[u8]) -> FileHashes {
    let mut sha256 = Sha256::new();
    let mut sha1 = Sha1::new();
    let mut md5 = Md5::new();
    sha256.update(content);
    sha1.update(content);
    md5.update(content);
    FileHashes {
        sha256: hex::encode(sha256.finalize()),
        sha1: hex::encode(sha1.finalize()),
        md5: hex::encode(md5.finalize()),
    }
}
