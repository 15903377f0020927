// crates/mc-planner-core/src/primitives.rs
// ============================================================================
// Module: Primitive Namespace
// Description: Qualified primitive identifiers and engine-dependency map.
// Purpose: Distinguish capability-backplane (CB) from scripted-tool (ST)
//          primitives and declare which ST engines a CB primitive requires.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Qualified primitive IDs match `^(CB|ST)-P\d{2}$`. `CB-P01..CB-P21` and
//! `ST-P01..ST-P05` are the recognized primitives. Bare forms (`p01`, `P01`,
//! `01`, `CB-P1`, `CB-P001`) are rejected with a message naming both
//! namespaces, grounded on the validated-newtype-constructor pattern used
//! throughout the identifier model.

use std::fmt;
use thiserror::Error;

/// The two recognized primitive namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Capability-backplane primitive.
    Cb,
    /// Scripted-tool primitive.
    St,
}

impl Namespace {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Cb => "CB",
            Self::St => "ST",
        }
    }

    /// The highest recognized two-digit number in this namespace.
    const fn max_number(self) -> u8 {
        match self {
            Self::Cb => 21,
            Self::St => 5,
        }
    }
}

/// A validated, qualified primitive identifier (`CB-Pnn` or `ST-Pnn`).
///
/// # Invariants
/// - `namespace` and `number` always form a string matching `^(CB|ST)-P\d{2}$`.
/// - `number` is within the recognized range for its namespace (`01..21` for
///   `CB`, `01..05` for `ST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId {
    namespace: Namespace,
    number: u8,
}

impl PrimitiveId {
    /// Parses and validates a qualified primitive id string.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveIdError`] when `raw` is not a qualified, recognized
    /// primitive id.
    pub fn parse(raw: &str) -> Result<Self, PrimitiveIdError> {
        let namespace = if let Some(rest) = raw.strip_prefix("CB-P") {
            (Namespace::Cb, rest)
        } else if let Some(rest) = raw.strip_prefix("ST-P") {
            (Namespace::St, rest)
        } else {
            return Err(PrimitiveIdError::NotQualified(raw.to_string()));
        };
        let (namespace, digits) = namespace;

        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrimitiveIdError::NotQualified(raw.to_string()));
        }
        let number: u8 = digits.parse().map_err(|_| PrimitiveIdError::NotQualified(raw.to_string()))?;
        if number == 0 || number > namespace.max_number() {
            return Err(PrimitiveIdError::OutOfRange(raw.to_string()));
        }
        Ok(Self { namespace, number })
    }

    /// Returns the primitive's namespace.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        self.namespace
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-P{:02}", self.namespace.prefix(), self.number)
    }
}

/// Errors raised while validating a primitive identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimitiveIdError {
    /// The string is not a qualified `CB-Pnn` or `ST-Pnn` identifier. Message
    /// mentions both namespaces, per spec.
    #[error("\"{0}\" is not a qualified primitive id; expected CB-Pnn or ST-Pnn")]
    NotQualified(String),
    /// The string is qualified but the number is outside the recognized range.
    #[error("\"{0}\" is outside the recognized primitive range")]
    OutOfRange(String),
}

/// Returns `true` when `raw` is a qualified, recognized primitive id.
#[must_use]
pub fn is_qualified_primitive_id(raw: &str) -> bool {
    PrimitiveId::parse(raw).is_ok()
}

/// Validates a batch of primitive id strings, rejecting the first bare or
/// unrecognized form encountered.
///
/// # Errors
///
/// Returns [`PrimitiveIdError`] naming the first invalid id.
pub fn assert_qualified_primitive_ids(ids: &[String]) -> Result<Vec<PrimitiveId>, PrimitiveIdError> {
    ids.iter().map(|id| PrimitiveId::parse(id)).collect()
}

/// A `(CB primitive, required ST primitives)` pair in the engine-dependency
/// map. Kept as a sorted static table (searched with `binary_search_by_key`)
/// rather than a `HashMap` behind a lazy-static, keeping the lookup
/// explicit and allocation-free for a small fixed table.
type Dependency = (&'static str, &'static [&'static str]);

/// Declares which ST engine(s) a CB primitive depends on.
///
/// No closed list of engine dependencies is given; this is a
/// representative, documented subset a host can extend. Entries must stay
/// sorted by CB id for `binary_search_by_key` to work.
const CB_REQUIRES_ST: &[Dependency] = &[
    ("CB-P01", &["ST-P01"]),
    ("CB-P02", &["ST-P01", "ST-P02"]),
    ("CB-P05", &["ST-P02"]),
    ("CB-P09", &["ST-P03"]),
    ("CB-P10", &["ST-P03", "ST-P04"]),
    ("CB-P13", &["ST-P04"]),
];

/// Returns the ST primitives a CB primitive requires, or an empty slice when
/// the primitive declares no engine dependency.
#[must_use]
pub fn engine_dependencies(id: PrimitiveId) -> &'static [&'static str] {
    if id.namespace() != Namespace::Cb {
        return &[];
    }
    let key = id.to_string();
    CB_REQUIRES_ST
        .binary_search_by_key(&key.as_str(), |(cb, _)| *cb)
        .map_or(&[], |index| CB_REQUIRES_ST[index].1)
}
