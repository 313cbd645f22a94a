//! Content hashing for download verification.

use digest::Digest;
use sha2::Sha512;

/// Hash `bytes` with the digest `D` and return the lowercase hex encoding.
pub fn hex_digest<D: Digest>(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(&D::digest(bytes))
}

/// The SHA-512 hex digest of `bytes`, as served by the Derpibooru API for
/// every image.
pub fn sha512_hex(bytes: &[u8]) -> String {
    hex_digest::<Sha512>(bytes)
}
