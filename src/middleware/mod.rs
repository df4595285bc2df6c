//! Middleware module - request throttling

pub mod rate_limit;
