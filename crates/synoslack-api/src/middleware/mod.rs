//! HTTP middleware for authentication.
//!
//! Every relay path is wrapped in the shared-secret check; health checks
//! are not.
pub mod auth;
