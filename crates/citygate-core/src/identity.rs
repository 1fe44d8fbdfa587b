//! # Identity & Identity Context
//!
//! [`Identity`] is the decoded result of a successfully verified credential.
//! [`IdentityContext`] is its per-request, write-once carrier: the pipeline
//! installs one context per request, and nested pipeline invocations must not
//! overwrite an identity that an outer invocation already established.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// The authenticated caller.
///
/// Produced by [`crate::TokenVerifier::verify`] — the pipeline never builds
/// an `Identity` from anything but a verified credential, so an `Identity`
/// in a request context is never partially valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject identifier from the credential payload.
    pub subject: String,
    /// The caller's role.
    pub role: Role,
}

/// Per-request, write-once slot holding the authenticated identity, if any.
///
/// Lives in the request's extension map; strictly request-local, so no
/// synchronization is involved. The slot follows first-writer-wins
/// semantics: once an identity is recorded, later writes are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Option<Identity>,
}

impl IdentityContext {
    /// An unauthenticated context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record the authentication outcome, unless one is already recorded.
    ///
    /// A no-op when a non-empty identity is present — at most one
    /// authentication decision takes effect per request, even when the
    /// pipeline runs through nested dispatch layers. An empty outcome never
    /// displaces anything and never blocks a later genuine one.
    pub fn set_if_absent(&mut self, identity: Option<Identity>) {
        if self.identity.is_none() {
            self.identity = identity;
        }
    }

    /// The recorded identity, if the request is authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether an identity has been recorded.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
