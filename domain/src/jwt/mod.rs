//! Bearer credential validation shared by the REST API and the push-channel
//! handshake.
//!
//! Credentials are HS256 JSON Web Tokens signed with `JWT_SECRET` by the
//! identity subsystem. This module only ever validates them; issuing tokens
//! belongs to that subsystem.
//!
//! # Example
//!
//! ```rust,no_run
//! use domain::jwt::authenticate;
//! use service::config::Config;
//!
//! fn example(config: &Config, credential: &str) {
//!     match authenticate(config, credential) {
//!         Ok(user_id) => println!("Authenticated as {user_id}"),
//!         Err(e) => eprintln!("Rejected credential: {e:?}"),
//!     }
//! }
//! ```

use crate::error::Error;
use claims::AccessClaims;
use entity::Id;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::*;
use service::config::Config;

pub(crate) mod claims;

/// Resolves a bearer credential to the id of the user it was issued for.
///
/// Fails with `Unauthenticated` when the credential is malformed, has a bad
/// signature or has expired, and with `Config` when no secret is configured.
pub fn authenticate(config: &Config, credential: &str) -> Result<Id, Error> {
    let secret = config.jwt_secret().ok_or_else(|| {
        warn!("Failed to get JWT secret from config");
        Error::config()
    })?;

    let credential = credential.trim();
    if credential.is_empty() {
        debug!("Empty bearer credential");
        return Err(Error::unauthenticated());
    }

    let token_data = decode::<AccessClaims>(
        credential,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        debug!("Rejected bearer credential: {e}");
        Error::from(e)
    })?;

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn config() -> Config {
        Config::default().set_jwt_secret(SECRET.to_string())
    }

    fn now() -> usize {
        chrono::Utc::now().timestamp() as usize
    }

    fn token(sub: Id, exp: usize, secret: &str) -> String {
        let claims = AccessClaims {
            sub,
            email: Some("student@example.com".to_string()),
            role: Some("student".to_string()),
            exp,
            iat: now(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn unauthenticated() -> DomainErrorKind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthenticated))
    }

    #[test]
    fn valid_credential_resolves_to_its_subject() {
        let user_id = Id::new_v4();
        let credential = token(user_id, now() + 3600, SECRET);

        assert_eq!(authenticate(&config(), &credential).unwrap(), user_id);
    }

    #[test]
    fn credential_with_id_claim_is_accepted() {
        let user_id = Id::new_v4();
        let claims = serde_json::json!({
            "id": user_id,
            "email": "student@example.com",
            "role": "student",
            "exp": now() + 3600,
        });
        let credential = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(authenticate(&config(), &credential).unwrap(), user_id);
    }

    #[test]
    fn expired_credential_is_unauthenticated() {
        let credential = token(Id::new_v4(), now() - 3600, SECRET);

        let err = authenticate(&config(), &credential).unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }

    #[test]
    fn credential_signed_with_another_secret_is_unauthenticated() {
        let credential = token(Id::new_v4(), now() + 3600, "someone-else");

        let err = authenticate(&config(), &credential).unwrap_err();
        assert_eq!(err.error_kind, unauthenticated());
    }

    #[test]
    fn garbage_and_empty_credentials_are_unauthenticated() {
        for credential in ["", "   ", "not.a.jwt"] {
            let err = authenticate(&config(), credential).unwrap_err();
            assert_eq!(err.error_kind, unauthenticated(), "{credential:?}");
        }
    }
}
