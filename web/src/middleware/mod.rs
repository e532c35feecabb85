pub(crate) mod auth;
pub(crate) mod rate_limit;
