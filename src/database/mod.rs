pub mod connection;

pub use connection::{DbPool, create_pool, is_unique_violation, run_migrations};
