//! Content digests and stored-file naming for uploaded receipts.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of hex characters of the content digest kept in stored file names.
const DIGEST_PREFIX_LEN: usize = 16;

/// Maximum extension length carried over from the uploaded file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Computes the SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Returns the lowercase extension of a client-supplied file name, if it is a
/// short alphanumeric token.
pub fn file_extension(original_filename: &str) -> Option<String> {
    let (_, ext) = original_filename.rsplit_once('.')?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Builds the on-disk name for a receipt: `<uuid>-<digest prefix>[.<ext>]`.
///
/// The client file name never reaches the filesystem, only its sanitised
/// extension does.
pub fn stored_receipt_filename(original_filename: &str, content: &[u8]) -> String {
    let digest = sha256_hex(content);
    let stem = format!("{}-{}", Uuid::new_v4(), &digest[..DIGEST_PREFIX_LEN]);
    match file_extension(original_filename) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}
