//! Common library for the chat rooms backend
//!
//! This crate provides functionality shared by the auth and API services:
//! database connectivity and migrations, the Redis cache, role tags,
//! access token verification and revocation, and listener configuration.

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod revocation;
pub mod role;
pub mod token;
