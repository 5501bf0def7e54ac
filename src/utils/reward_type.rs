/// 根据奖池 / 奖品名称推导奖励类型（用于后台发货分类）
pub fn reward_type_for(name: &str) -> String {
    let lower = name.to_lowercase();

    if lower.contains("iphone") {
        return "iphone".to_string();
    }
    if lower.contains("samsung") {
        return "samsung".to_string();
    }
    if lower.contains("ps5") || lower.contains("playstation") {
        return "ps5".to_string();
    }
    if lower.contains("nintendo") || lower.contains("switch") {
        return "nintendo_switch".to_string();
    }
    if lower.contains("amazon") {
        return if lower.contains("20") {
            "gift_card_amazon_20".to_string()
        } else {
            "gift_card_amazon".to_string()
        };
    }
    if lower.contains("google") || lower.contains("play") {
        return if lower.contains("10") {
            "gift_card_google_10".to_string()
        } else {
            "gift_card_google".to_string()
        };
    }
    if lower.contains("psn") {
        return if lower.contains('5') {
            "gift_card_psn_5".to_string()
        } else {
            "gift_card_psn".to_string()
        };
    }

    // 其它：转 snake_case，仅保留 [a-z0-9_]
    let mut out = String::with_capacity(lower.len());
    for c in lower.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if c.is_whitespace() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_brands() {
        assert_eq!(reward_type_for("iPhone 15 Pro"), "iphone");
        assert_eq!(reward_type_for("PlayStation 5"), "ps5");
        assert_eq!(reward_type_for("Nintendo Switch OLED"), "nintendo_switch");
        assert_eq!(reward_type_for("Carte Amazon 20€"), "gift_card_amazon_20");
        assert_eq!(reward_type_for("Google Play 10€"), "gift_card_google_10");
        assert_eq!(reward_type_for("Carte PSN 5€"), "gift_card_psn_5");
    }

    #[test]
    fn test_fallback_snake_case() {
        assert_eq!(reward_type_for("Casque  Audio Pro"), "casque_audio_pro");
        assert_eq!(reward_type_for("Écouteurs!"), "couteurs");
    }
}
