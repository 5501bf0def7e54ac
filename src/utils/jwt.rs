use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";
const RESET: &str = "reset";
/// 重置密码链接有效期
const RESET_TOKEN_TTL: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // profile id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access", "refresh" or "reset"
    /// 重置令牌的一次性随机数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthError("Malformed token subject".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        token_type: &str,
        ttl: i64,
        nonce: Option<String>,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
            nonce,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.issue(user_id, email, ACCESS, self.access_token_expires_in, None)
    }

    pub fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.issue(user_id, email, REFRESH, self.refresh_token_expires_in, None)
    }

    pub fn generate_reset_token(&self, user_id: Uuid, email: &str, nonce: &str) -> AppResult<String> {
        self.issue(user_id, email, RESET, RESET_TOKEN_TTL, Some(nonce.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != ACCESS {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != REFRESH {
            return Err(AppError::AuthError("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_reset_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != RESET || claims.nonce.is_none() {
            return Err(AppError::Rejected("invalid_reset_token"));
        }

        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = JwtService::new("secret", 60, 120);
        let id = Uuid::new_v4();
        let token = jwt.generate_access_token(id, "a@b.fr").unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.email, "a@b.fr");
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = JwtService::new("secret", 60, 120);
        let id = Uuid::new_v4();
        let refresh = jwt.generate_refresh_token(id, "a@b.fr").unwrap();
        assert!(jwt.verify_access_token(&refresh).is_err());
        assert!(jwt.verify_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_reset_token_carries_nonce() {
        let jwt = JwtService::new("secret", 60, 120);
        let id = Uuid::new_v4();
        let token = jwt.generate_reset_token(id, "a@b.fr", "n0nce").unwrap();
        let claims = jwt.verify_reset_token(&token).unwrap();
        assert_eq!(claims.nonce.as_deref(), Some("n0nce"));
        assert!(jwt.verify_access_token(&token).is_err());

        let access = jwt.generate_access_token(id, "a@b.fr").unwrap();
        let err = jwt.verify_reset_token(&access).unwrap_err();
        assert_eq!(err.wire_code(), "invalid_reset_token");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("one", 60, 120);
        let verifier = JwtService::new("two", 60, 120);
        let token = issuer.generate_access_token(Uuid::new_v4(), "a@b.fr").unwrap();
        assert!(verifier.verify_access_token(&token).is_err());
    }
}
