use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};
use rand::Rng;
use rand::distributions::Alphanumeric;

const RESET_NONCE_LEN: usize = 32;

/// 密码规则：8-128 位，至少包含一个字母和一个数字
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::ValidationError(
            "Password must be between 8 and 128 characters".to_string(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(AppError::ValidationError(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

/// 重置密码令牌的随机数
pub fn reset_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_NONCE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("cadeau2024").is_ok());
        assert!(validate_password("Motdepasse").is_err()); // 无数字
        assert!(validate_password("12345678").is_err()); // 无字母
        assert!(validate_password("ab12").is_err()); // 太短
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("cadeau2024").unwrap();
        assert!(verify_password("cadeau2024", &hashed).unwrap());
        assert!(!verify_password("cadeau2025", &hashed).unwrap());
    }
}
