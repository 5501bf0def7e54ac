pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, AuthUser, SESSION_COOKIE, current_user, optional_user};
pub use cors::create_cors;
