use crate::entities::profile_entity;
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const REFERRAL_CODE_LEN: usize = 8;

/// 随机 8 位推荐码（去掉易混淆的 I/O/0/1）
pub fn random_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// 用户输入的推荐码：去空格并转大写
pub fn normalize_referral_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 生成数据库中不存在的推荐码
pub async fn generate_unique_referral_code<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    loop {
        let code = random_referral_code();
        let exists = profile_entity::Entity::find()
            .filter(profile_entity::Column::ReferralCode.eq(code.as_str()))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        for _ in 0..50 {
            let code = random_referral_code();
            assert_eq!(code.len(), REFERRAL_CODE_LEN);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_referral_code("  ab12cd34 "), "AB12CD34");
        assert_eq!(normalize_referral_code("   "), "");
    }
}
