//! # Access Rule Engine
//!
//! An ordered list of route-matching rules evaluated first-match-wins against
//! the request's method, path, and resolved identity. Declaration order is
//! authoritative: the engine never reorders rules by specificity, so a public
//! rule must be declared before any catch-all it is meant to shadow.
//!
//! Requests matching no rule fall through to a default-deny safety net that
//! requires *some* valid identity (but no specific role). Nothing is ever
//! public by omission.

use http::Method;
use thiserror::Error;

use crate::identity::Identity;
use crate::role::Role;

/// Error raised when a path pattern fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Patterns are absolute; a leading `/` is required.
    #[error("path pattern must start with '/': {0:?}")]
    MissingLeadingSlash(String),
    /// `**` swallows every remaining segment, so it can only close a pattern.
    #[error("'**' is only valid as the final segment: {0:?}")]
    TrailingWildcardNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` — exactly one path segment.
    AnyOne,
    /// `**` — any number of trailing segments, including zero.
    AnyTrailing,
}

/// A glob-style pattern over path segments.
///
/// `*` matches exactly one segment; `**` matches any suffix of segments and
/// is only valid in final position. `**` also matches the empty suffix, so
/// `/api/v1/auth/**` covers `/api/v1/auth` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern such as `/api/v1/sensors/**`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.iter().enumerate() {
                let segment = match *part {
                    "**" => {
                        if i != last {
                            return Err(PatternError::TrailingWildcardNotLast(
                                pattern.to_string(),
                            ));
                        }
                        Segment::AnyTrailing
                    }
                    "*" => Segment::AnyOne,
                    literal => Segment::Literal(literal.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Whether `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::AnyTrailing => return true,
                Segment::AnyOne => {
                    if i >= parts.len() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.len() == self.segments.len()
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Which HTTP methods a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    /// Every method.
    Any,
    /// Exactly one method.
    One(Method),
}

impl MethodPattern {
    /// Whether `method` matches this pattern.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::One(expected) => method == expected,
        }
    }
}

/// What a matched route demands of the caller.
///
/// This is the single evaluation primitive for the whole gate: the rule
/// engine applies it per route, and protected operations invoke the same
/// [`RouteRequirement::evaluate`] for their method-level checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Always allowed, authenticated or not.
    Public,
    /// Any valid identity, regardless of role.
    AnyAuthenticated,
    /// A valid identity holding one of the listed roles.
    OneOf(Vec<Role>),
}

impl RouteRequirement {
    /// Evaluate this requirement against the resolved identity.
    pub fn evaluate(&self, identity: Option<&Identity>) -> Decision {
        match self {
            Self::Public => Decision::Allow,
            Self::AnyAuthenticated => match identity {
                Some(_) => Decision::Allow,
                None => Decision::Deny(DenyReason::Unauthenticated),
            },
            Self::OneOf(roles) => match identity {
                None => Decision::Deny(DenyReason::Unauthenticated),
                Some(identity) if roles.contains(&identity.role) => Decision::Allow,
                Some(_) => Decision::Deny(DenyReason::Forbidden),
            },
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request.
    Allow,
    /// Reject the request.
    Deny(DenyReason),
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No valid identity present — surfaced as HTTP 401.
    Unauthenticated,
    /// Identity present, but its role is not permitted — surfaced as HTTP 403.
    Forbidden,
}

/// One entry in the ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    methods: MethodPattern,
    path: PathPattern,
    requirement: RouteRequirement,
}

impl AccessRule {
    /// Build a rule from a method pattern, a path pattern, and a requirement.
    pub fn new(
        methods: MethodPattern,
        pattern: &str,
        requirement: RouteRequirement,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            methods,
            path: PathPattern::parse(pattern)?,
            requirement,
        })
    }

    /// A rule marking matched routes public.
    pub fn public(methods: MethodPattern, pattern: &str) -> Result<Self, PatternError> {
        Self::new(methods, pattern, RouteRequirement::Public)
    }

    /// A rule requiring any valid identity.
    pub fn authenticated(methods: MethodPattern, pattern: &str) -> Result<Self, PatternError> {
        Self::new(methods, pattern, RouteRequirement::AnyAuthenticated)
    }

    /// A rule requiring one of the listed roles.
    pub fn one_of(
        methods: MethodPattern,
        pattern: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self, PatternError> {
        Self::new(
            methods,
            pattern,
            RouteRequirement::OneOf(roles.into_iter().collect()),
        )
    }

    /// Whether this rule applies to the given method and path.
    pub fn applies_to(&self, method: &Method, path: &str) -> bool {
        self.methods.matches(method) && self.path.matches(path)
    }

    /// The requirement this rule imposes.
    pub fn requirement(&self) -> &RouteRequirement {
        &self.requirement
    }
}

/// The ordered rule list plus the default-deny safety net.
///
/// Built once at startup from static configuration, then shared read-only
/// across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEngine {
    rules: Vec<AccessRule>,
}

impl RuleEngine {
    /// Build an engine over the given rules. Order is preserved verbatim.
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Decide whether the request is permitted.
    ///
    /// Walks the rules in declaration order; the first rule whose method and
    /// path patterns both match determines the requirement. When nothing
    /// matches, the request falls through to [`RouteRequirement::AnyAuthenticated`]:
    /// unmatched routes demand some valid identity but no specific role.
    pub fn authorize(&self, method: &Method, path: &str, identity: Option<&Identity>) -> Decision {
        for rule in &self.rules {
            if rule.applies_to(method, path) {
                return rule.requirement().evaluate(identity);
            }
        }
        RouteRequirement::AnyAuthenticated.evaluate(identity)
    }

    /// Number of configured rules (the safety net is not counted).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the rule list is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn identity(role: Role) -> Identity {
        Identity {
            subject: "subject-1".to_string(),
            role,
        }
    }

    // -- PathPattern ----------------------------------------------------------

    #[test]
    fn literal_pattern_matches_exact_path_only() {
        let pattern = PathPattern::parse("/api/v1/sensors").unwrap();
        assert!(pattern.matches("/api/v1/sensors"));
        assert!(!pattern.matches("/api/v1/sensors/abc"));
        assert!(!pattern.matches("/api/v1"));
    }

    #[test]
    fn single_star_matches_exactly_one_segment() {
        let pattern = PathPattern::parse("/api/*/sensors").unwrap();
        assert!(pattern.matches("/api/v1/sensors"));
        assert!(pattern.matches("/api/v2/sensors"));
        assert!(!pattern.matches("/api/sensors"));
        assert!(!pattern.matches("/api/v1/v2/sensors"));
    }

    #[test]
    fn double_star_matches_any_suffix_including_empty() {
        let pattern = PathPattern::parse("/api/v1/auth/**").unwrap();
        assert!(pattern.matches("/api/v1/auth"));
        assert!(pattern.matches("/api/v1/auth/login"));
        assert!(pattern.matches("/api/v1/auth/token/refresh"));
        assert!(!pattern.matches("/api/v1/sensors"));
    }

    #[test]
    fn root_double_star_matches_everything() {
        let pattern = PathPattern::parse("/**").unwrap();
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything"));
        assert!(pattern.matches("/a/b/c"));
    }

    #[test]
    fn pattern_requires_leading_slash() {
        assert!(matches!(
            PathPattern::parse("api/v1"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn double_star_must_be_final_segment() {
        assert!(matches!(
            PathPattern::parse("/api/**/sensors"),
            Err(PatternError::TrailingWildcardNotLast(_))
        ));
    }

    proptest! {
        #[test]
        fn any_suffix_matches_trailing_wildcard(
            suffix in proptest::collection::vec("[a-z0-9]{1,8}", 0..5)
        ) {
            let pattern = PathPattern::parse("/api/v1/seed/**").unwrap();
            let mut path = "/api/v1/seed".to_string();
            for segment in &suffix {
                path.push('/');
                path.push_str(segment);
            }
            prop_assert!(pattern.matches(&path));
        }

        #[test]
        fn single_star_never_spans_segments(
            a in "[a-z]{1,8}", b in "[a-z]{1,8}"
        ) {
            let pattern = PathPattern::parse("/api/*").unwrap();
            let single = format!("/api/{}", a);
            let double = format!("/api/{}/{}", a, b);
            prop_assert!(pattern.matches(&single));
            prop_assert!(!pattern.matches(&double));
        }
    }

    // -- RouteRequirement -----------------------------------------------------

    #[test]
    fn public_allows_anonymous() {
        assert_eq!(RouteRequirement::Public.evaluate(None), Decision::Allow);
    }

    #[test]
    fn any_authenticated_denies_anonymous() {
        assert_eq!(
            RouteRequirement::AnyAuthenticated.evaluate(None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            RouteRequirement::AnyAuthenticated.evaluate(Some(&identity(Role::Citizen))),
            Decision::Allow
        );
    }

    #[test]
    fn one_of_distinguishes_unauthenticated_from_forbidden() {
        let requirement = RouteRequirement::OneOf(vec![Role::Admin]);
        assert_eq!(
            requirement.evaluate(None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            requirement.evaluate(Some(&identity(Role::Citizen))),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            requirement.evaluate(Some(&identity(Role::Admin))),
            Decision::Allow
        );
    }

    // -- RuleEngine -----------------------------------------------------------

    #[test]
    fn first_matching_rule_wins() {
        // Public sensors rule declared before a role-restricted catch-all:
        // anonymous GET is allowed.
        let engine = RuleEngine::new(vec![
            AccessRule::public(MethodPattern::One(Method::GET), "/api/v1/sensors/**").unwrap(),
            AccessRule::one_of(MethodPattern::Any, "/api/v1/sensors/**", [Role::Admin]).unwrap(),
        ]);
        assert_eq!(
            engine.authorize(&Method::GET, "/api/v1/sensors/s1", None),
            Decision::Allow
        );
    }

    #[test]
    fn reversed_declaration_order_reverses_the_outcome() {
        let engine = RuleEngine::new(vec![
            AccessRule::one_of(MethodPattern::Any, "/api/v1/sensors/**", [Role::Admin]).unwrap(),
            AccessRule::public(MethodPattern::One(Method::GET), "/api/v1/sensors/**").unwrap(),
        ]);
        assert_eq!(
            engine.authorize(&Method::GET, "/api/v1/sensors/s1", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn method_pattern_must_match_for_rule_to_apply() {
        let engine = RuleEngine::new(vec![AccessRule::public(
            MethodPattern::One(Method::GET),
            "/api/v1/seed/**",
        )
        .unwrap()]);
        // POST is not covered by the public rule; the safety net demands identity.
        assert_eq!(
            engine.authorize(&Method::POST, "/api/v1/seed/sensors", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn unmatched_route_requires_some_identity() {
        let engine = RuleEngine::new(vec![]);
        assert_eq!(
            engine.authorize(&Method::GET, "/api/v1/anything", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            engine.authorize(&Method::GET, "/api/v1/anything", Some(&identity(Role::Citizen))),
            Decision::Allow
        );
    }

    #[test]
    fn restricted_route_rejects_wrong_role_as_forbidden() {
        let engine = RuleEngine::new(vec![AccessRule::one_of(
            MethodPattern::Any,
            "/api/v1/admin/**",
            [Role::Admin],
        )
        .unwrap()]);
        assert_eq!(
            engine.authorize(&Method::GET, "/api/v1/admin/users", Some(&identity(Role::Citizen))),
            Decision::Deny(DenyReason::Forbidden)
        );
    }
}
