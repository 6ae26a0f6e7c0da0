//! Stable query identity.

use std::fmt::Write;

use serde::Serialize;
use sha2::{Digest, Sha224};

/// Hex SHA-224 digest of the query parameters' canonical JSON form.
///
/// `serde_json` objects are key-sorted, so two parameter sets that differ only
/// in field or map insertion order hash the same on every replica.
pub fn query_hash<T: Serialize + ?Sized>(params: &T) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_value(params)?.to_string();
    let digest = Sha224::digest(canonical.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    Ok(out)
}
