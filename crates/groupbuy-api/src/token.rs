use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Password-reset tokens are stateless: the signed claims carry the
/// account email and an expiry one hour out. Changing the password does
/// not invalidate an outstanding token before it expires.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    exp: i64,
}

pub fn issue_reset_token(secret: &str, email: &str) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS)).timestamp();
    issue_with_expiry(secret, email, exp)
}

/// Expiry-injectable variant for tests.
fn issue_with_expiry(secret: &str, email: &str, exp: i64) -> Result<String, ApiError> {
    let claims = ResetClaims {
        sub: email.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

/// Verify a reset token and return the email it was issued for. Expired
/// and tampered tokens fail with distinct, user-visible errors.
pub fn verify_reset_token(secret: &str, token: &str) -> Result<String, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    match decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims.sub),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(ApiError::TokenExpired),
        Err(_) => Err(ApiError::TokenInvalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip_returns_email() {
        let token = issue_reset_token(SECRET, "amy@x.com").unwrap();
        assert_eq!(verify_reset_token(SECRET, &token).unwrap(), "amy@x.com");
    }

    #[test]
    fn expired_token_is_distinct() {
        let past = Utc::now().timestamp() - 2 * RESET_TOKEN_TTL_SECS;
        let token = issue_with_expiry(SECRET, "amy@x.com", past).unwrap();
        assert!(matches!(
            verify_reset_token(SECRET, &token),
            Err(ApiError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let token = issue_reset_token(SECRET, "amy@x.com").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            verify_reset_token(SECRET, &tampered),
            Err(ApiError::TokenInvalid)
        ));
        assert!(matches!(
            verify_reset_token("other-secret", &token),
            Err(ApiError::TokenInvalid)
        ));
    }
}
