pub mod auth;
pub mod body_limit;
pub mod rate_limit;
