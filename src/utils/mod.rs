pub mod cooldown;
pub mod jwt;
pub mod password;
pub mod referral_code;
pub mod reward_type;
pub mod validation;

pub use jwt::*;
pub use password::*;
pub use referral_code::{generate_unique_referral_code, normalize_referral_code};
pub use reward_type::reward_type_for;
pub use validation::{normalize_email, require_text};
