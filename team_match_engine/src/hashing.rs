/// Team Match Engine: Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing of a
/// `MatchScoreResult`. Produces byte-identical output across platforms.
///
/// Rules:
///   - engine_version first, then the result
///   - struct fields in declaration order, maps sorted by key
///   - UTF-8 JSON, no whitespace, no float

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::MatchScoreResult;
use crate::ENGINE_VERSION;

#[derive(Serialize)]
struct CanonicalResult<'a> {
    engine_version: u32,
    result: &'a MatchScoreResult,
}

/// Canonical serialization of a result to UTF-8 JSON bytes.
pub fn canonical_serialize(result: &MatchScoreResult) -> Vec<u8> {
    let canonical = CanonicalResult {
        engine_version: ENGINE_VERSION,
        result,
    };
    serde_json::to_vec(&canonical)
        .expect("canonical_serialize: result types always serialize to JSON")
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(result: &MatchScoreResult) -> String {
    let digest = Sha256::digest(canonical_serialize(result));
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
