pub mod admin;
pub mod auth;
pub mod game;
pub mod prize;
pub mod referral;
pub mod reward_pool;
pub mod season;
pub mod subscription;
pub mod user;
pub mod webhook;

pub use admin::admin_config;
pub use auth::auth_config;
pub use game::game_config;
pub use prize::prize_config;
pub use referral::referral_config;
pub use reward_pool::reward_pool_config;
pub use season::season_config;
pub use subscription::subscription_config;
pub use user::user_config;
pub use webhook::webhook_config;

use actix_web::web;

/// 全部 /api 路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth_config)
            .configure(user_config)
            .configure(prize_config)
            .configure(reward_pool_config)
            .configure(referral_config)
            .configure(game_config)
            .configure(subscription_config)
            .configure(webhook_config)
            .configure(season_config)
            .configure(admin_config),
    );
}
