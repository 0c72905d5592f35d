//! Room management API
//!
//! Exposes the current user's rooms under `/api/users/me/rooms`. Requests
//! must carry an access token issued by the auth service.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;
