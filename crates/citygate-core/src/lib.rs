#![deny(missing_docs)]

//! # citygate-core — Decision Core for the CityGate Platform Gate
//!
//! This crate holds everything the gate needs to make an authentication or
//! authorization decision, and nothing that performs I/O. The API crate wires
//! these pieces into an Axum middleware; this crate stays framework-free so
//! the decision logic can be tested without spinning up a router.
//!
//! ## Pieces
//!
//! 1. **[`TokenVerifier`]** — validates a signed bearer credential and decodes
//!    it into an [`Identity`]. Pure function of the token, the process-wide
//!    verification key, and the clock.
//!
//! 2. **[`IdentityContext`]** — the per-request, write-once holder for the
//!    authenticated identity. First writer wins; nested pipeline invocations
//!    never overwrite an already-authenticated context.
//!
//! 3. **[`RuleEngine`]** — an ordered list of [`AccessRule`]s evaluated
//!    first-match-wins against method + path + identity. Routes matching no
//!    rule fall through to an authenticated catch-all, never to public.
//!
//! ## Crate Policy
//!
//! - No internal crate dependencies; only `serde`, `thiserror`, `http`, and
//!   `jsonwebtoken` from the external ecosystem.
//! - Structured errors with `thiserror` — no `.unwrap()` outside tests.

pub mod identity;
pub mod role;
pub mod rules;
pub mod token;

// Re-export primary types at crate root for ergonomic imports.
pub use identity::{Identity, IdentityContext};
pub use role::{Role, RoleParseError};
pub use rules::{
    AccessRule, Decision, DenyReason, MethodPattern, PathPattern, PatternError, RouteRequirement,
    RuleEngine,
};
pub use token::{Claims, TokenVerifier, VerifyError};
