// crates/mc-planner-core/src/lib.rs
// ============================================================================
// Crate: mc-planner-core
// Description: Content-addressed identity, solve-bundle audit envelopes,
//              the qualified primitive namespace, and the reasoner
//              interface shared by every planning component.
// ============================================================================

//! ## Overview
//! This crate hosts the identity and audit primitives every other planning
//! crate builds on: deterministic JSON canonicalization and content hashing
//! ([`canon`]), the solve-bundle audit envelope ([`bundle`]), the qualified
//! `CB-Pnn` / `ST-Pnn` primitive namespace ([`primitives`]), the caller-
//! supplied timestamp model ([`time`]), and the backend-agnostic reasoner
//! interface ([`interfaces`]).
//!
//! Invariants:
//! - Canonicalization and hashing are pure functions of their input; nothing
//!   in this crate reads wall-clock time or external state.
//! - Nondeterministic fields (timestamps, external identity bindings) never
//!   enter a bundle's content hash.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bundle;
pub mod canon;
pub mod interfaces;
pub mod primitives;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bundle::SolveBundle;
pub use canon::ContentHash;
pub use primitives::PrimitiveId;
pub use time::Timestamp;
