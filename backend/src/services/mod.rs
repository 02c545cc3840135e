pub mod activity_log;
pub mod identity;
pub mod rate_limit;
