use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("VIP membership required")]
    NotVip,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Rewards pool not found")]
    PoolNotFound,

    #[error("Prize not found")]
    PrizeNotFound,

    #[error("Reward not found")]
    RewardNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    /// 资源不存在（404），携带前端识别的错误码
    #[error("Missing: {0}")]
    Missing(&'static str),

    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Shipping address required")]
    AddressRequired,

    /// 业务拒绝（400），携带前端识别的错误码
    #[error("Rejected: {0}")]
    Rejected(&'static str),

    /// 状态冲突（409）
    #[error("Conflict: {0}")]
    Conflict(&'static str),

    /// 限频 / 冷却中（429）
    #[error("Rate limited: {0}")]
    RateLimited(&'static str),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),
}

impl AppError {
    /// 前端按该字段（snake_case）匹配错误类型
    pub fn wire_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "invalid_payload",
            AppError::AuthError(_) | AppError::JwtError(_) => "not_authenticated",
            AppError::Forbidden => "forbidden",
            AppError::NotVip => "not_vip",
            AppError::ProfileNotFound => "profile_not_found",
            AppError::PoolNotFound => "pool_not_found",
            AppError::PrizeNotFound => "cadeau_not_found",
            AppError::RewardNotFound => "reward_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::InsufficientBalance { .. } => "insufficient_points",
            AppError::AddressRequired => "address_required",
            AppError::Rejected(code)
            | AppError::Conflict(code)
            | AppError::RateLimited(code)
            | AppError::Missing(code) => *code,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) | AppError::StripeError(_) => {
                "upstream_error"
            }
            _ => "internal_error",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InsufficientBalance { .. }
            | AppError::AddressRequired
            | AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::NotVip => StatusCode::FORBIDDEN,
            AppError::ProfileNotFound
            | AppError::PoolNotFound
            | AppError::PrizeNotFound
            | AppError::RewardNotFound
            | AppError::NotFound(_)
            | AppError::Missing(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) | AppError::StripeError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                ("AUTH_ERROR", "Invalid token".to_string())
            }
            AppError::Forbidden | AppError::NotVip => {
                log::warn!("Forbidden access: {self}");
                ("FORBIDDEN", self.to_string())
            }
            AppError::ProfileNotFound
            | AppError::PoolNotFound
            | AppError::PrizeNotFound
            | AppError::RewardNotFound
            | AppError::NotFound(_)
            | AppError::Missing(_) => ("NOT_FOUND", self.to_string()),
            AppError::InsufficientBalance { .. } | AppError::AddressRequired | AppError::Rejected(_) => {
                log::warn!("Request rejected: {self}");
                ("BAD_REQUEST", self.to_string())
            }
            AppError::Conflict(_) => {
                log::warn!("Conflict: {self}");
                ("CONFLICT", self.to_string())
            }
            AppError::RateLimited(_) => {
                log::warn!("Rate limited: {self}");
                ("RATE_LIMITED", self.to_string())
            }
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) | AppError::StripeError(_) => {
                log::error!("Upstream error: {self}");
                ("EXTERNAL_API_ERROR", self.to_string())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.http_status()).json(json!({
            "success": false,
            "message": self.wire_code(),
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_and_status() {
        let err = AppError::InsufficientBalance {
            required: 10,
            available: 2,
        };
        assert_eq!(err.wire_code(), "insufficient_points");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let err = AppError::RateLimited("hour_limit");
        assert_eq!(err.wire_code(), "hour_limit");
        assert_eq!(err.http_status(), StatusCode::TOO_MANY_REQUESTS);

        let err = AppError::Conflict("already_referred");
        assert_eq!(err.wire_code(), "already_referred");
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        assert_eq!(AppError::PrizeNotFound.wire_code(), "cadeau_not_found");
        assert_eq!(
            AppError::AuthError("x".into()).http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::DatabaseError(DbErr::Custom("secret table".into()));
        assert_eq!(err.wire_code(), "internal_error");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
