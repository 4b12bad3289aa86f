//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod file;
pub mod profile;
pub mod project;
