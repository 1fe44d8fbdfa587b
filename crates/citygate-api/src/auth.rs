//! # Request Pipeline
//!
//! The gate middleware orchestrates the per-request flow: extract the bearer
//! credential, verify it, install the request-scoped [`IdentityContext`],
//! evaluate the access-rule engine, and either forward to the inner handler
//! or short-circuit with 401/403.
//!
//! ## Failure posture
//!
//! A credential that fails verification is treated exactly like no
//! credential at all: the request proceeds anonymously and public routes
//! stay reachable with a garbage token. The verifier's internal reason is
//! logged, never surfaced to the caller. A bad token is never promoted to a
//! valid identity, and never a panic.
//!
//! ## Downstream access
//!
//! Handlers read the forwarded identity through the [`Caller`] extractor and
//! guard protected operations with [`require_any_role`], which runs the same
//! [`RouteRequirement`] primitive the route-level engine uses.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use citygate_core::{
    AccessRule, Decision, DenyReason, Identity, IdentityContext, MethodPattern, PatternError, Role,
    RouteRequirement, RuleEngine, TokenVerifier,
};

use crate::error::AppError;

/// The immutable gate configuration shared by every request.
///
/// Built once at startup; the verifier key and the rule list are never
/// mutated afterward, so concurrent reads need no synchronization beyond
/// the `Arc`s.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    rules: Arc<RuleEngine>,
}

impl AuthGate {
    /// Build a gate from a verifier and an ordered rule list.
    pub fn new(verifier: TokenVerifier, rules: Vec<AccessRule>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            rules: Arc::new(RuleEngine::new(rules)),
        }
    }

    /// The credential verifier.
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// The rule engine.
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }
}

/// The default rule list, in authoritative declaration order.
///
/// Mirrors the platform's access policy: documentation, CORS preflight,
/// health probes, demo seeding, and the issuer's auth endpoints are public;
/// sensor reads are open to every declared role; everything else falls
/// through to the engine's authenticated catch-all. The public entries MUST
/// stay ahead of narrower rules — the engine does not reorder by
/// specificity.
pub fn default_rules() -> Result<Vec<AccessRule>, PatternError> {
    Ok(vec![
        AccessRule::public(MethodPattern::Any, "/openapi.json")?,
        AccessRule::public(MethodPattern::Any, "/docs/**")?,
        AccessRule::public(MethodPattern::One(Method::OPTIONS), "/**")?,
        AccessRule::public(MethodPattern::One(Method::GET), "/health/**")?,
        AccessRule::public(MethodPattern::One(Method::GET), "/api/v1/seed/**")?,
        // Token issuance lives with the external issuer; the gate passes
        // these requests through untouched.
        AccessRule::public(MethodPattern::Any, "/api/v1/auth/**")?,
        AccessRule::one_of(
            MethodPattern::One(Method::GET),
            "/api/v1/sensors/**",
            Role::all(),
        )?,
    ])
}

/// Extract the token following the `Bearer ` prefix, if any.
///
/// A missing header, a non-UTF-8 value, or a different scheme all mean
/// "no credential supplied" — not an error.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The gate middleware. Runs once per request, ahead of every handler.
pub async fn gate_middleware(mut request: Request, next: Next) -> Response {
    let Some(gate) = request.extensions().get::<AuthGate>().cloned() else {
        // Wiring bug: the router was assembled without the gate extension.
        tracing::error!("auth gate missing from request extensions");
        return AppError::Internal("auth gate not configured".to_string()).into_response();
    };

    let identity = bearer_token(request.headers()).and_then(|token| {
        match gate.verifier().verify(token) {
            Ok(identity) => Some(identity),
            Err(reason) => {
                tracing::debug!(%reason, "bearer credential rejected, proceeding anonymous");
                None
            }
        }
    });

    // First-writer-wins: nested dispatch must not overwrite an identity an
    // outer pipeline invocation already established.
    let mut context = request
        .extensions()
        .get::<IdentityContext>()
        .cloned()
        .unwrap_or_default();
    context.set_if_absent(identity);

    let decision = gate
        .rules()
        .authorize(request.method(), request.uri().path(), context.identity());

    match decision {
        Decision::Allow => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Decision::Deny(DenyReason::Unauthenticated) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "request denied: authentication required"
            );
            AppError::Unauthorized("authentication required".to_string()).into_response()
        }
        Decision::Deny(DenyReason::Forbidden) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "request denied: insufficient role"
            );
            AppError::Forbidden("insufficient role for this route".to_string()).into_response()
        }
    }
}

/// The authenticated caller, extracted from the identity context the gate
/// attached to the request.
///
/// Rejects with 401 when the context carries no identity — which only
/// happens on routes the rule list leaves reachable anonymously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Identity);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .and_then(|context| context.identity().cloned())
            .map(Caller)
            .ok_or_else(|| {
                AppError::Unauthorized("no authenticated identity in request context".to_string())
            })
    }
}

/// Method-level capability check for protected operations.
///
/// Invoked at the top of handlers that demand more than their route rule,
/// reusing the rule engine's [`RouteRequirement::OneOf`] predicate so route
/// and method checks cannot drift apart.
pub fn require_any_role(caller: &Caller, roles: &[Role]) -> Result<(), AppError> {
    match RouteRequirement::OneOf(roles.to_vec()).evaluate(Some(&caller.0)) {
        Decision::Allow => Ok(()),
        Decision::Deny(_) => Err(AppError::Forbidden(format!(
            "role {} is not permitted for this operation",
            caller.0.role
        ))),
    }
}
