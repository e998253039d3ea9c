use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::claims::Claims, config::JwtConfig, state::AppState};

/// Lifetime of every session token.
pub const TOKEN_TTL: Duration = Duration::hours(24);

/// Only symmetric HMAC algorithms are ever accepted; tokens are issued with HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Why a presented token was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("disallowed signing algorithm")]
    DisallowedAlgorithm,
}

impl From<&ErrorKind> for TokenError {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::DisallowedAlgorithm,
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies session tokens with the process-wide HMAC secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self::from_secret(config.secret.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + TOKEN_TTL;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::from(e.kind()))?;

        // Zero leeway still admits exp == now; the token is dead at its expiry instant.
        if data.claims.exp as i64 <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(TokenError::Expired);
        }

        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig::new(secret.into()).unwrap())
    }

    fn segments(token: &str) -> Vec<&str> {
        token.split('.').collect()
    }

    #[test]
    fn issue_and_verify_returns_subject() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn token_is_a_three_part_hs256_jwt() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(Uuid::new_v4()).unwrap();
        assert_eq!(segments(&token).len(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn rejects_token_issued_more_than_a_day_ago() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - Duration::hours(25);
        let token = keys.issue_at(Uuid::new_v4(), issued).unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_token_at_its_expiry_instant() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - TOKEN_TTL;
        let token = keys.issue_at(Uuid::new_v4(), issued).unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn accepts_token_just_before_expiry() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - Duration::hours(23);
        let user_id = Uuid::new_v4();
        let token = keys.issue_at(user_id, issued).unwrap();
        assert_eq!(keys.verify(&token).unwrap().sub, user_id);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let issuer = make_keys("secret-a");
        let verifier = make_keys("secret-b");
        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn rejects_swapped_payload() {
        let keys = make_keys("dev-secret");
        let victim = keys.issue(Uuid::new_v4()).unwrap();
        let attacker = keys.issue(Uuid::new_v4()).unwrap();
        let v = segments(&victim);
        let a = segments(&attacker);

        let forged = format!("{}.{}.{}", v[0], a[1], v[2]);
        assert_eq!(keys.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn rejects_asymmetric_algorithm_header() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(Uuid::new_v4()).unwrap();
        let parts = segments(&token);
        let rs256 = Base64UrlUnpadded::encode_string(br#"{"alg":"RS256","typ":"JWT"}"#);

        let forged = format!("{}.{}.{}", rs256, parts[1], parts[2]);
        assert_eq!(keys.verify(&forged), Err(TokenError::DisallowedAlgorithm));
    }

    #[test]
    fn rejects_unsigned_none_algorithm() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(Uuid::new_v4()).unwrap();
        let parts = segments(&token);
        let none = Base64UrlUnpadded::encode_string(br#"{"alg":"none","typ":"JWT"}"#);

        let forged = format!("{}.{}.", none, parts[1]);
        assert!(keys.verify(&forged).is_err());
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let keys = make_keys("dev-secret");
        assert_eq!(keys.verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(keys.verify(""), Err(TokenError::Malformed));
        assert_eq!(keys.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn maps_library_error_kinds() {
        assert_eq!(TokenError::from(&ErrorKind::ExpiredSignature), TokenError::Expired);
        assert_eq!(TokenError::from(&ErrorKind::InvalidSignature), TokenError::BadSignature);
        assert_eq!(
            TokenError::from(&ErrorKind::InvalidAlgorithm),
            TokenError::DisallowedAlgorithm
        );
        assert_eq!(TokenError::from(&ErrorKind::InvalidToken), TokenError::Malformed);
    }
}
