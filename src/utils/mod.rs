use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ApiError;
use crate::store::UserRow;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

/// Constant-time comparison against the stored bcrypt hash. Login always goes
/// through here; a plaintext secret is never compared to a hash directly.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// Identity carried inside a token. This is the only user data a token holds;
/// everything else is re-fetched from the store when needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: i64,
}

/// Signs a claim for `user` expiring after the configured TTL. Returns the
/// token together with its expiry timestamp.
pub fn generate_token(
    user: &UserRow,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.token_ttl().as_secs() as i64))
        .map(|t| t.timestamp())
        .ok_or(jsonwebtoken::errors::ErrorKind::InvalidToken)?;

    let claims = Claims {
        user: TokenUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        },
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_key.as_bytes()),
    )?;

    Ok((token, expiration))
}

/// Verifies an `Authorization` header value and returns the claim it carries.
///
/// Every failure mode collapses to [`ApiError::Unauthorized`]: missing
/// `Bearer ` scheme, undecodable token, bad signature, and expiry alike. A
/// token is valid strictly while `exp > now`; at `now == exp` it is already
/// expired.
pub fn verify_token(header: &str, config: &Config) -> Result<Claims, ApiError> {
    verify_token_at(header, config, Utc::now().timestamp())
}

pub(crate) fn verify_token_at(header: &str, config: &Config, now: i64) -> Result<Claims, ApiError> {
    let (scheme, token) = header.split_once(' ').ok_or(ApiError::Unauthorized)?;
    if scheme != "Bearer" {
        return Err(ApiError::Unauthorized);
    }

    // Expiry is checked by hand below; jsonwebtoken's own exp validation uses
    // a leeway window that would accept a just-expired token.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.token_key.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        tracing::debug!("token rejected: {err}");
        ApiError::Unauthorized
    })?;

    if data.claims.exp > now {
        Ok(data.claims)
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Decodes a claim without checking the signature or expiry. Only for
/// inspecting what a token says about itself; never a basis for access
/// control.
pub fn decode_unverified(token: &str) -> Result<TokenUser, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| ApiError::Unauthorized)?;
    Ok(data.claims.user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: None,
            token_key: "test-signing-key".into(),
            token_ttl_secs: 30 * 60,
            server_host: "127.0.0.1".into(),
            server_port: 0,
        }
    }

    fn test_user() -> UserRow {
        UserRow {
            id: 7,
            username: "curator".into(),
            password: "irrelevant".into(),
            fullname: "Cura Tor".into(),
            email: Some("curator@museum.test".into()),
            phone: None,
            staff: true,
        }
    }

    #[test]
    fn round_trip_preserves_identity_claims() {
        let config = test_config();
        let (token, exp) = generate_token(&test_user(), &config).unwrap();

        let claims = verify_token(&format!("Bearer {token}"), &config).unwrap();
        assert_eq!(claims.user.id, 7);
        assert_eq!(claims.user.username, "curator");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn token_is_expired_exactly_at_expiry() {
        let config = test_config();
        let (token, exp) = generate_token(&test_user(), &config).unwrap();
        let header = format!("Bearer {token}");

        // valid strictly while exp > now
        assert!(verify_token_at(&header, &config, exp - 1).is_ok());
        assert!(matches!(
            verify_token_at(&header, &config, exp),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            verify_token_at(&header, &config, exp + 1),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn header_without_bearer_scheme_is_rejected() {
        let config = test_config();
        let (token, _) = generate_token(&test_user(), &config).unwrap();

        assert!(matches!(
            verify_token(&token, &config),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            verify_token(&format!("Basic {token}"), &config),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let config = test_config();
        let (token, _) = generate_token(&test_user(), &config).unwrap();
        let tampered = format!("Bearer {token}x");
        assert!(matches!(
            verify_token(&tampered, &config),
            Err(ApiError::Unauthorized)
        ));

        let mut other_key = test_config();
        other_key.token_key = "some-other-key".into();
        assert!(matches!(
            verify_token(&format!("Bearer {token}"), &other_key),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn unverified_decode_exposes_the_claimed_user() {
        let config = test_config();
        let (token, _) = generate_token(&test_user(), &config).unwrap();
        let user = decode_unverified(&token).unwrap();
        assert_eq!(user.username, "curator");
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong pony", &hashed).unwrap());
    }
}
