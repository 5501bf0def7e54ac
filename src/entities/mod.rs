pub mod ad_views;
pub mod app_settings;
pub mod contributions;
pub mod leaderboard_history;
pub mod point_transactions;
pub mod prizes;
pub mod profiles;
pub mod reward_pool_views;
pub mod reward_pools;
pub mod rewards;
pub mod seasons;
pub mod stripe_events;
pub mod tap_tap_scores;
pub mod tickets;
pub mod winners;

pub use ad_views as ad_view_entity;
pub use app_settings as app_settings_entity;
pub use contributions as contribution_entity;
pub use leaderboard_history as leaderboard_history_entity;
pub use point_transactions as point_transaction_entity;
pub use prizes as prize_entity;
pub use profiles as profile_entity;
pub use reward_pool_views as reward_pool_view_entity;
pub use reward_pools as reward_pool_entity;
pub use rewards as reward_entity;
pub use seasons as season_entity;
pub use stripe_events as stripe_event_entity;
pub use tap_tap_scores as tap_tap_score_entity;
pub use tickets as ticket_entity;
pub use winners as winner_entity;

pub use point_transactions::LedgerEntryKind;
pub use prizes::PrizeStatus;
pub use rewards::RewardStatus;
