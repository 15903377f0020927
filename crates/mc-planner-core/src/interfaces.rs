// crates/mc-planner-core/src/interfaces.rs
// ============================================================================
// Module: Reasoner Service Interface
// Description: Backend-agnostic interface to the backing reasoner process.
// Purpose: Define the capability surface the core consumes for solve /
//          report_episode / domain-declaration registration, without
//          assuming a specific transport or scheduler.
// Dependencies: crate::canon, serde, serde_json
// ============================================================================

//! ## Overview
//! The reasoner is a separate process the core talks to through this one
//! capability trait. Implementations may be a synchronous call with a
//! timeout, a task returning a future, or message passing — the core itself
//! never assumes a scheduler.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::canon::CanonicalizeError;
use crate::canon::ContentHash;
use crate::canon::Step;
use crate::canon::content_hash;
use crate::primitives::PrimitiveId;

// ============================================================================
// SECTION: Domain Declaration
// ============================================================================

/// A domain declaration registered with the reasoner once per connection
/// epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDeclaration {
    /// Declaration schema version.
    pub declaration_version: u32,
    /// Identifier of the declaring solver.
    pub solver_id: String,
    /// Contract version this declaration targets.
    pub contract_version: String,
    /// Primitives this solver implements. Must contain only qualified ids.
    pub implements_primitives: Vec<PrimitiveId>,
    /// Wire fields this solver consumes.
    pub consumes_fields: Vec<String>,
    /// Wire fields this solver produces.
    pub produces_fields: Vec<String>,
}

impl DomainDeclaration {
    /// Computes the registration digest: a pure function of the
    /// declaration, so differing declarations always produce differing
    /// digests.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError`] when the declaration fails to
    /// canonicalize (practically unreachable for this type, but the
    /// signature is kept honest rather than panicking).
    pub fn digest(&self) -> Result<ContentHash, CanonicalizeError> {
        content_hash(&DigestableDeclaration {
            declaration_version: self.declaration_version,
            solver_id: &self.solver_id,
            contract_version: &self.contract_version,
            implements_primitives: self.implements_primitives.iter().map(ToString::to_string).collect(),
            consumes_fields: &self.consumes_fields,
            produces_fields: &self.produces_fields,
        })
    }
}

#[derive(Serialize)]
struct DigestableDeclaration<'a> {
    declaration_version: u32,
    solver_id: &'a str,
    contract_version: &'a str,
    implements_primitives: Vec<String>,
    consumes_fields: &'a [String],
    produces_fields: &'a [String],
}

// ============================================================================
// SECTION: Declaration Registration
// ============================================================================

/// How registration failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationMode {
    /// Failure returns a negative result and resets state; the next call
    /// retries.
    Dev,
    /// Failure raises a structured [`RegistrationFailure::Certifying`].
    Certifying,
}

/// Outcome of a single registration attempt against the reasoner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Registration succeeded for this connection epoch.
    Success,
    /// Registration failed; `cause` is the reasoner-reported reason. Only
    /// ever returned in [`DeclarationMode::Dev`] — [`DeclarationMode::Certifying`]
    /// converts the same failure into [`RegistrationFailure::Certifying`].
    Failure(String),
}

/// Per-connection registration state, keyed by `(solver_id, connection_nonce)`.
/// Owned by the caller; reset automatically when the nonce changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    registered_epoch: Option<(String, u64)>,
}

impl RegistrationState {
    /// Returns whether this exact `(solver_id, nonce)` epoch is registered.
    #[must_use]
    pub fn is_registered(&self, solver_id: &str, nonce: u64) -> bool {
        self.registered_epoch.as_ref().is_some_and(|(s, n)| s == solver_id && *n == nonce)
    }
}

/// Errors raised while ensuring a domain declaration is registered.
#[derive(Debug, Error)]
pub enum RegistrationFailure {
    /// The declaration itself failed to canonicalize for digesting.
    #[error("failed to compute registration digest: {0}")]
    Canonicalize(#[from] CanonicalizeError),
    /// Registration failed under [`DeclarationMode::Certifying`].
    #[error("registration failed for solver {solver_id} (nonce {nonce}, digest {digest}): {cause}")]
    Certifying {
        /// Declaring solver's id.
        solver_id: String,
        /// Registration digest that was rejected.
        digest: ContentHash,
        /// Connection nonce at the time of the attempt.
        nonce: u64,
        /// Underlying cause reported by the reasoner or transport.
        cause: String,
    },
}

/// Ensures `declaration` is registered with `client` for the current
/// connection epoch, calling through at most once per `(solver_id, nonce)`
/// pair. Reconnects (a changed nonce) force re-registration.
///
/// # Errors
///
/// Returns [`RegistrationFailure::Certifying`] under
/// [`DeclarationMode::Certifying`] when registration fails.
/// [`DeclarationMode::Dev`] failures are reported as
/// `Ok(RegistrationOutcome::Failure(..))` instead, with `state` reset so the
/// next call retries.
pub fn ensure_declaration_registered<C: ReasonerClient>(
    client: &C,
    state: &mut RegistrationState,
    declaration: &DomainDeclaration,
    mode: DeclarationMode,
) -> Result<RegistrationOutcome, RegistrationFailure> {
    let nonce = client.connection_nonce();
    if state.is_registered(&declaration.solver_id, nonce) {
        return Ok(RegistrationOutcome::Success);
    }

    let digest = declaration.digest()?;
    let attempt = client.register_domain_declaration(declaration, &digest);

    match attempt {
        Ok(()) => {
            state.registered_epoch = Some((declaration.solver_id.clone(), nonce));
            Ok(RegistrationOutcome::Success)
        }
        Err(cause) => match mode {
            DeclarationMode::Dev => {
                state.registered_epoch = None;
                Ok(RegistrationOutcome::Failure(cause.to_string()))
            }
            DeclarationMode::Certifying => Err(RegistrationFailure::Certifying {
                solver_id: declaration.solver_id.clone(),
                digest,
                nonce,
                cause: cause.to_string(),
            }),
        },
    }
}

// ============================================================================
// SECTION: Solve / Report-Episode Payloads
// ============================================================================

/// Which reasoner command a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveCommand {
    /// Solve a planning problem.
    Solve,
    /// Report the outcome of a prior episode back to the reasoner.
    ReportEpisode,
}

/// Wire payload sent to the reasoner's `solve` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvePayload {
    /// Which command this payload carries.
    pub command: SolveCommand,
    /// Domain identifier.
    pub domain: String,
    /// Contract version.
    pub contract_version: String,
    /// Optional execution mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<String>,
    /// Identifier of the requesting solver.
    pub solver_id: String,
    /// Wire inventory (may include injected context tokens).
    pub inventory: HashMap<String, u64>,
    /// Goal payload.
    pub goal: Value,
    /// Nearby-blocks observation.
    pub nearby_blocks: Value,
    /// Domain-specific rule set.
    pub rules: Value,
    /// Node-expansion cap for this solve.
    pub max_nodes: u64,
    /// Whether the reasoner should apply learned priors.
    pub use_learning: bool,
}

/// Result returned by the reasoner's `solve` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Whether a solution was found.
    pub solution_found: bool,
    /// The solution path, if found.
    pub solution_path: Vec<Step>,
    /// Total nodes discovered during search.
    pub discovered_nodes: u64,
    /// Total search edges traversed.
    pub search_edges: u64,
    /// Opaque metrics payload, possibly embedding search health and/or
    /// reasoner identity fields (`trace_bundle_hash`, `engine_commitment`,
    /// `operator_registry_hash`, `completeness_declaration`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    /// Wall-clock duration of the solve, in milliseconds.
    pub duration_ms: u64,
}

// ============================================================================
// SECTION: Reasoner Client
// ============================================================================

/// Errors a [`ReasonerClient`] implementation may raise.
#[derive(Debug, Error)]
pub enum ReasonerError {
    /// The reasoner did not respond within its configured timeout.
    #[error("reasoner timed out")]
    Timeout,
    /// The reasoner (or the transport to it) is not reachable.
    #[error("reasoner unavailable: {0}")]
    Unavailable(String),
    /// The reasoner returned a structured error response.
    #[error("reasoner error: {0}")]
    Reasoner(String),
}

/// Backend-agnostic capability interface to the backing reasoner process.
///
/// Implementations must not assume a specific scheduler: a synchronous call
/// with a timeout, a task returning a future, or message passing are all
/// valid. Internal core algorithms never suspend mid-invariant — this trait
/// is the only suspension point.
pub trait ReasonerClient {
    /// Returns whether the reasoner is currently reachable.
    fn is_available(&self) -> bool;

    /// Returns the current connection nonce. Monotonic; increments on
    /// reconnect.
    fn connection_nonce(&self) -> u64;

    /// Initializes the connection to the reasoner.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError`] when initialization fails.
    fn initialize(&self) -> Result<(), ReasonerError>;

    /// Tears down the connection to the reasoner.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError`] when teardown fails.
    fn destroy(&self) -> Result<(), ReasonerError>;

    /// Registers a domain declaration with the reasoner.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError`] when the reasoner rejects or cannot accept
    /// the declaration.
    fn register_domain_declaration(
        &self,
        declaration: &DomainDeclaration,
        digest: &ContentHash,
    ) -> Result<(), ReasonerError>;

    /// Invokes the reasoner's `solve` operation (covers both the `solve` and
    /// `report_episode` commands, distinguished by `payload.command`).
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError`] on timeout, unavailability, or a reasoner-
    /// reported error.
    fn solve(&self, payload: &SolvePayload) -> Result<SolveResult, ReasonerError>;
}

/// Outcome of calling through to the reasoner with timeout/unavailability
/// collapsed into a value rather than an error, per the error-handling
/// design: timeouts and unavailability are expected outcomes that flow
/// through returns, never exceptions.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The reasoner responded.
    Responded(SolveResult),
    /// The reasoner was unavailable or timed out; callers surface this as
    /// `solved: false, error: "unavailable"`.
    Unavailable(String),
}

/// Calls `client.solve(payload)`, collapsing timeout/unavailability into
/// [`SolveOutcome::Unavailable`] instead of propagating an error.
pub fn solve_or_unavailable<C: ReasonerClient>(client: &C, payload: &SolvePayload) -> SolveOutcome {
    match client.solve(payload) {
        Ok(result) => SolveOutcome::Responded(result),
        Err(ReasonerError::Timeout) => SolveOutcome::Unavailable("unavailable".to_string()),
        Err(ReasonerError::Unavailable(detail)) => SolveOutcome::Unavailable(detail),
        Err(ReasonerError::Reasoner(detail)) => SolveOutcome::Unavailable(detail),
    }
}
