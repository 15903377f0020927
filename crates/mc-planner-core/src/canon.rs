// crates/mc-planner-core/src/canon.rs
// ============================================================================
// Module: Canonicalizer + Hasher
// Description: Deterministic JSON canonical form and content-addressed hashing.
// Purpose: Provide the single canonicalization rule set used pervasively by
//          solve bundles, plan digests, and specialized domain hashers.
// Dependencies: serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! This module is a total function from JSON-compatible values to bytes,
//! plus the truncated SHA-256 content hash built on top of it. Every
//! normalization rule applied by the canonicalizer is documented here, not
//! hidden inside a specialized hasher.
//!
//! Canonicalization rules:
//! - `null` and absent object values collapse to the same thing: absent
//!   object keys are dropped entirely before serialization; `null` inside an
//!   array is preserved (arrays are never filtered).
//! - Booleans and strings use standard JSON encoding.
//! - Numbers reject NaN and +/-infinity; `-0` normalizes to `0`.
//! - Arrays encode elements in insertion order; they are never sorted.
//! - Objects sort keys by lexicographic byte order and recurse (enforced by
//!   `serde_jcs`'s RFC 8785 serialization, not by this module's own tree
//!   walk, which only filters and recurses).

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while canonicalizing a value.
#[derive(Debug, Error, PartialEq)]
pub enum CanonicalizeError {
    /// A number was NaN or +/-infinity.
    #[error("canonical form cannot represent NaN or infinite numbers")]
    NonFiniteNumber,
    /// The value could not be converted to a JSON value at all (functions,
    /// symbols, and arbitrary-precision integers outside the representable
    /// range have no Rust equivalent reachable through `serde_json::Value`,
    /// so this variant only fires for serializer failures on the caller's
    /// own type).
    #[error("value is not representable in canonical form: {0}")]
    Unrepresentable(String),
}

// ============================================================================
// SECTION: Content Hash
// ============================================================================

/// A 16-character lowercase hex content hash: the first 16 hex characters of
/// SHA-256 over a canonical JSON string.
///
/// # Invariants
/// - Always matches `^[0-9a-f]{16}$` by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Parses a content hash from an already-hex-encoded string, validating
    /// its shape.
    ///
    /// # Errors
    ///
    /// Returns [`ContentHashError`] when `value` is not exactly 16 lowercase
    /// hex characters.
    pub fn parse(value: impl Into<String>) -> Result<Self, ContentHashError> {
        let value = value.into();
        if value.len() == 16 && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            Ok(Self(value))
        } else {
            Err(ContentHashError::InvalidShape(value))
        }
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised when constructing a [`ContentHash`] from an untrusted string.
#[derive(Debug, Error, PartialEq)]
pub enum ContentHashError {
    /// The string was not exactly 16 lowercase hex characters.
    #[error("invalid content hash shape: {0:?}")]
    InvalidShape(String),
}

// ============================================================================
// SECTION: Canonical Form
// ============================================================================

/// Recursively canonicalizes a JSON value per the rules documented above.
///
/// # Errors
///
/// Returns [`CanonicalizeError::NonFiniteNumber`] when a number is NaN or
/// infinite. This cannot occur for well-formed `serde_json::Value`s built
/// through safe constructors, but defends against numbers built via
/// `arbitrary_precision`-enabled deserialization of out-of-range literals.
pub fn canonicalize_value(value: &Value) -> Result<Value, CanonicalizeError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value.clone()),
        Value::Number(number) => canonicalize_number(number),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(canonicalize_value(item)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => canonicalize_object(map),
    }
}

/// Canonicalizes a JSON number: rejects non-finite values, normalizes `-0`.
fn canonicalize_number(number: &serde_json::Number) -> Result<Value, CanonicalizeError> {
    if let Some(f) = number.as_f64()
        && !f.is_finite()
    {
        return Err(CanonicalizeError::NonFiniteNumber);
    }
    if let Some(f) = number.as_f64()
        && f == 0.0_f64
        && f.is_sign_negative()
    {
        return Ok(Value::from(0));
    }
    Ok(Value::Number(number.clone()))
}

/// Canonicalizes a JSON object: recurses and drops `null` values. Key
/// ordering is left to [`canonical_bytes`]'s RFC 8785 serialization step,
/// not reordered here.
fn canonicalize_object(map: &Map<String, Value>) -> Result<Value, CanonicalizeError> {
    let mut out = Map::new();
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        out.insert(key.clone(), canonicalize_value(value)?);
    }
    Ok(Value::Object(out))
}

/// Serializes `value` to canonical bytes: converts to a JSON value, applies
/// this module's own normalization rules (NaN/Infinity rejection, `-0`
/// folding, absent-key dropping — none of which RFC 8785 defines), then
/// hands the normalized tree to `serde_jcs` for RFC 8785 (JCS) object-key
/// ordering and number formatting.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when `value` cannot be represented in
/// canonical form.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalizeError> {
    let raw = serde_json::to_value(value)
        .map_err(|err| CanonicalizeError::Unrepresentable(err.to_string()))?;
    let canonical = canonicalize_value(&raw)?;
    serde_jcs::to_vec(&canonical).map_err(|err| CanonicalizeError::Unrepresentable(err.to_string()))
}

// ============================================================================
// SECTION: Hashing
// ============================================================================

/// Hashes raw bytes with SHA-256 and truncates to the first 16 hex chars.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let hex = hex_encode(&digest);
    ContentHash(hex[..16].to_string())
}

/// Canonicalizes and hashes `value` in one step.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when `value` cannot be canonicalized.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, CanonicalizeError> {
    let bytes = canonical_bytes(value)?;
    Ok(hash_bytes(&bytes))
}

/// Hashes a plain string directly, without canonicalization — used when the
/// input is already the exact string to hash (e.g. the sterling-binding join
/// key), rather than a JSON-compatible value that needs canonical form.
#[must_use]
pub fn content_hash_str(s: &str) -> ContentHash {
    hash_bytes(s.as_bytes())
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Specialized Domain Hashers
// ============================================================================

/// A domain operator/recipe/module definition, as hashed by
/// [`hash_definition`]. Unknown fields round-trip via `extra`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Definition {
    /// Module identifier, used as the sort-key fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Action name, the primary sort key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Remaining, domain-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Definition {
    /// Returns the sort key used by [`hash_definition`]: `action`, falling
    /// back to `module_id`, falling back to the empty string.
    #[must_use]
    fn sort_key(&self) -> &str {
        self.action
            .as_deref()
            .or(self.module_id.as_deref())
            .unwrap_or("")
    }
}

/// A single executed plan step, as hashed by [`hash_steps`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    /// The action identifier for this step.
    pub action: String,
    /// Remaining, domain-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hashes a set of definitions: sorts a copy by `action` (falling back to
/// `module_id`, then the empty string), then canonicalizes. The input slice
/// is never mutated.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when canonicalization fails.
pub fn hash_definition(defs: &[Definition]) -> Result<ContentHash, CanonicalizeError> {
    let mut sorted: Vec<&Definition> = defs.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    content_hash(&sorted)
}

/// Hashes an inventory snapshot for audit identity: drops zero-valued
/// entries and clamps each remaining count to [`INVENTORY_HASH_CAP`].
///
/// This capped value is for audit identity only; it must never be used for
/// correctness-critical memoization (two states differing only above the cap
/// hash identically).
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when canonicalization fails.
pub fn hash_inventory_state(
    inventory: &HashMap<String, u64>,
) -> Result<ContentHash, CanonicalizeError> {
    let mut filtered: std::collections::BTreeMap<&str, u64> = std::collections::BTreeMap::new();
    for (item, count) in inventory {
        if *count == 0 {
            continue;
        }
        filtered.insert(item.as_str(), (*count).min(INVENTORY_HASH_CAP));
    }
    content_hash(&filtered)
}

/// The audit-identity clamp applied by [`hash_inventory_state`]. Fixed as a
/// protocol constant rather than sourced from runtime configuration, so hash
/// semantics never drift with a host's tuning.
pub const INVENTORY_HASH_CAP: u64 = 64;

/// Hashes a goal value with plain canonicalization (no filtering beyond the
/// canonical-form rules).
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when canonicalization fails.
pub fn hash_goal(goal: &Value) -> Result<ContentHash, CanonicalizeError> {
    content_hash(goal)
}

/// Hashes a nearby-blocks observation with plain canonicalization.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when canonicalization fails.
pub fn hash_nearby_blocks(blocks: &Value) -> Result<ContentHash, CanonicalizeError> {
    content_hash(blocks)
}

/// Hashes an ordered list of executed steps by their `action` strings only.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when canonicalization fails.
pub fn hash_steps(steps: &[Step]) -> Result<ContentHash, CanonicalizeError> {
    let actions: Vec<&str> = steps.iter().map(|step| step.action.as_str()).collect();
    content_hash(&actions)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
