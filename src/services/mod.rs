pub mod admin_service;
pub mod auth_service;
pub mod draw_service;
pub mod earning_service;
pub mod ledger_service;
pub mod prize_service;
pub mod profile_service;
pub mod referral_service;
pub mod reward_pool_service;
pub mod season_service;
pub mod settings_service;
pub mod subscription_service;
pub mod tap_tap_service;
pub mod vip_service;

pub use admin_service::*;
pub use auth_service::*;
pub use draw_service::*;
pub use earning_service::*;
pub use ledger_service::LedgerService;
pub use prize_service::*;
pub use profile_service::*;
pub use referral_service::*;
pub use reward_pool_service::*;
pub use season_service::*;
pub use settings_service::SettingsService;
pub use subscription_service::SubscriptionService;
pub use tap_tap_service::*;
pub use vip_service::*;
