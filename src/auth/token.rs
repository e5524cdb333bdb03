use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Identity claims carried by an access token.
///
/// On the wire the fields are `sub`, `id`, `role` and `exp`. Decoding fails if `sub`, `id`
/// or `exp` is absent, so a `Claims` value is always complete.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the token holder.
    #[serde(rename = "sub")]
    pub username: String,
    /// Id of the token holder in the `users` table.
    #[serde(rename = "id")]
    pub user_id: i64,
    #[serde(default)]
    pub role: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs and verifies access tokens with a symmetric HS256 secret.
///
/// Built once from [`crate::config::Config`] and shared as `web::Data<TokenService>`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_token_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_token_ttl,
        }
    }

    /// Issues a token that expires `ttl` from now.
    pub fn issue_token(
        &self,
        username: &str,
        user_id: i64,
        role: &str,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?
            .timestamp()
            .max(0) as usize;

        let claims = Claims {
            username: username.to_string(),
            user_id,
            role: role.to_string(),
            exp: expiration,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Issues a token with the configured access-token lifetime.
    pub fn issue_access_token(
        &self,
        username: &str,
        user_id: i64,
        role: &str,
    ) -> Result<String, AppError> {
        self.issue_token(username, user_id, role, self.access_token_ttl)
    }

    /// Verifies the signature, algorithm and expiry of `token` and returns its claims.
    ///
    /// Every failure, including a malformed token or a missing claim, is `Unauthorized`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test_secret_for_tokens";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(30))
    }

    fn sign(claims: &serde_json::Value, algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn assert_unauthorized(result: Result<Claims, AppError>) {
        match result {
            Err(AppError::Unauthorized(_)) => {}
            Ok(claims) => panic!("token should have been rejected, got {:?}", claims),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue_access_token("alice", 1, "user").unwrap();
        let claims = tokens.verify_token(&token).unwrap();

        assert_eq!(claims.username, "alice");
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.role, "user");

        let now = Utc::now().timestamp() as usize;
        let thirty_minutes = 30 * 60;
        assert!(claims.exp > now + thirty_minutes - 5);
        assert!(claims.exp <= now + thirty_minutes + 5);
    }

    #[test]
    fn test_wire_claim_names() {
        let tokens = service();
        let token = tokens.issue_access_token("bob", 9, "admin").unwrap();

        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(ALGORITHM),
        )
        .unwrap()
        .claims;
        assert_eq!(raw["sub"], "bob");
        assert_eq!(raw["id"], 9);
        assert_eq!(raw["role"], "admin");
        assert!(raw["exp"].is_number());
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let expired = tokens
            .issue_token("alice", 2, "user", Duration::hours(-2))
            .unwrap();
        assert_unauthorized(tokens.verify_token(&expired));

        // One second in the past is already expired; there is no leeway.
        let just_expired = tokens
            .issue_token("alice", 2, "user", Duration::seconds(-1))
            .unwrap();
        assert_unauthorized(tokens.verify_token(&just_expired));
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new("a_completely_different_secret", Duration::minutes(30));
        let token = other.issue_access_token("mallory", 3, "admin").unwrap();
        assert_unauthorized(service().verify_token(&token));
    }

    #[test]
    fn test_algorithm_mismatch_is_rejected() {
        let exp = (Utc::now() + Duration::minutes(10)).timestamp();
        let token = sign(
            &json!({ "sub": "alice", "id": 1, "role": "user", "exp": exp }),
            Algorithm::HS384,
        );
        assert_unauthorized(service().verify_token(&token));
    }

    #[test]
    fn test_missing_claims_are_rejected() {
        let exp = (Utc::now() + Duration::minutes(10)).timestamp();

        let without_id = sign(&json!({ "sub": "alice", "role": "user", "exp": exp }), ALGORITHM);
        assert_unauthorized(service().verify_token(&without_id));

        let without_sub = sign(&json!({ "id": 1, "role": "user", "exp": exp }), ALGORITHM);
        assert_unauthorized(service().verify_token(&without_sub));

        let without_exp = sign(&json!({ "sub": "alice", "id": 1, "role": "user" }), ALGORITHM);
        assert_unauthorized(service().verify_token(&without_exp));
    }

    #[test]
    fn test_missing_role_defaults_to_empty() {
        let exp = (Utc::now() + Duration::minutes(10)).timestamp();
        let token = sign(&json!({ "sub": "alice", "id": 1, "exp": exp }), ALGORITHM);
        let claims = service().verify_token(&token).unwrap();
        assert_eq!(claims.role, "");
    }

    #[test]
    fn test_malformed_token() {
        assert_unauthorized(service().verify_token("not-a-jwt"));
        assert_unauthorized(service().verify_token(""));
    }
}
