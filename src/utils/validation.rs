use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// 统一小写并校验邮箱格式
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if email.len() > 255 || !email_regex().is_match(&email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(email)
}

/// 必填文本字段：去空格后非空
pub fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Jean@Exemple.FR ").unwrap(), "jean@exemple.fr");
        assert!(normalize_email("jean@").is_err());
        assert!(normalize_email("jean exemple@x.fr").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("nom", "  iPhone ").unwrap(), "iPhone");
        assert!(require_text("nom", "   ").is_err());
    }
}
