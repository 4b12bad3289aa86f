//! Request extractors: bearer-token authentication and role gating.

pub mod auth;
pub mod rbac;
