//! Authentication service
//!
//! Registers users, issues RS256 access and refresh tokens, and keeps
//! sessions and revoked token ids in Redis.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
