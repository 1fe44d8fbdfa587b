//! # Credential Verifier
//!
//! Validates the signed bearer credential (a three-part JWT envelope) and
//! decodes it into an [`Identity`]. Verification is a pure computation over
//! the token, the process-wide verification key, and the clock — no network
//! or disk access, no side effects.
//!
//! All failure modes collapse to "no identity" at the pipeline boundary, but
//! they stay distinguished here so rejections can be diagnosed from logs.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Identity;
use crate::role::Role;

/// Payload shape shared with the external token issuer.
///
/// The issuer signs with the same key this verifier holds and embeds exactly
/// these claims: subject identifier, role string, expiry, and issue instant
/// (both as Unix timestamps).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    pub sub: String,
    /// Role string; must be a member of the closed [`Role`] enumeration.
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
}

/// Why a credential was rejected.
///
/// Every variant maps to the same externally visible outcome — the request
/// proceeds unauthenticated — so none of this detail reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Not a structurally valid three-part token, or the payload does not
    /// deserialize into the expected claim shape.
    #[error("credential is not a structurally valid token")]
    Malformed,
    /// The signature does not validate against the configured key.
    #[error("credential signature does not validate")]
    BadSignature,
    /// The embedded expiry is in the past.
    #[error("credential is expired")]
    Expired,
    /// The role claim is not in the closed role enumeration.
    #[error("credential carries an unknown role: {0}")]
    UnknownRole(String),
}

/// Verifies bearer credentials against the issuer's shared key.
///
/// Constructed once at startup and shared read-only across requests; safe
/// for unsynchronized concurrent use.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("TokenVerifier")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenVerifier {
    /// Build a verifier over the issuer's shared HS256 key.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a hard boundary; no clock-skew grace window.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate `token` and decode it into an [`Identity`].
    ///
    /// Succeeds only when the token parses structurally, the signature
    /// validates against the configured key, the expiry is in the future,
    /// and the role claim names a declared [`Role`].
    pub fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyError::BadSignature
                }
                _ => VerifyError::Malformed,
            }
        })?;

        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|err| VerifyError::UnknownRole(err.0))?;

        Ok(Identity {
            subject: data.claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-verification-key";

    /// Mint a token the way the external issuer would.
    fn mint(sub: &str, role: &str, expires_in_secs: i64) -> String {
        mint_with_key(sub, role, expires_in_secs, SECRET)
    }

    fn mint_with_key(sub: &str, role: &str, expires_in_secs: i64, key: &[u8]) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: now + expires_in_secs,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(key))
            .expect("token encoding")
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET)
    }

    #[test]
    fn valid_token_yields_exact_subject_and_role() {
        let token = mint("resident-42", "CITIZEN", 3600);
        let identity = verifier().verify(&token).unwrap();
        assert_eq!(identity.subject, "resident-42");
        assert_eq!(identity.role, Role::Citizen);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint("resident-42", "CITIZEN", -3600);
        assert_eq!(verifier().verify(&token), Err(VerifyError::Expired));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = mint_with_key("resident-42", "CITIZEN", 3600, b"some-other-key");
        assert_eq!(verifier().verify(&token), Err(VerifyError::BadSignature));
    }

    #[test]
    fn altered_signature_byte_is_rejected() {
        let token = mint("resident-42", "ADMIN", 3600);
        let signature_start = token.rfind('.').unwrap() + 1;
        // Flip one character in the middle of the signature segment.
        let target = signature_start + 10;
        let mut bytes = token.into_bytes();
        bytes[target] = if bytes[target] == b'x' { b'y' } else { b'x' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(verifier().verify(&tampered), Err(VerifyError::BadSignature));
    }

    #[test]
    fn garbage_string_is_malformed() {
        assert_eq!(
            verifier().verify("not-a-token"),
            Err(VerifyError::Malformed)
        );
    }

    #[test]
    fn two_part_envelope_is_malformed() {
        let token = mint("resident-42", "CITIZEN", 3600);
        let truncated = token.rsplit_once('.').unwrap().0;
        assert_eq!(verifier().verify(truncated), Err(VerifyError::Malformed));
    }

    #[test]
    fn unknown_role_is_rejected_without_panicking() {
        let token = mint("intruder", "SUPERUSER", 3600);
        assert_eq!(
            verifier().verify(&token),
            Err(VerifyError::UnknownRole("SUPERUSER".to_string()))
        );
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let rendered = format!("{:?}", verifier());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("test-verification-key"));
    }
}
