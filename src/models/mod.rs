pub mod admin;
pub mod auth;
pub mod common;
pub mod earning;
pub mod pagination;
pub mod prize;
pub mod profile;
pub mod referral;
pub mod reward;
pub mod reward_pool;
pub mod season;
pub mod subscription;
pub mod tap_tap;

pub use admin::*;
pub use auth::*;
pub use common::*;
pub use earning::*;
pub use pagination::*;
pub use prize::*;
pub use profile::*;
pub use referral::*;
pub use reward::*;
pub use reward_pool::*;
pub use season::*;
pub use subscription::*;
pub use tap_tap::*;
