//! Atelier domain core.
//!
//! Everything with a real invariant lives here: who is signed in and what
//! their role authorizes ([`session`], [`profile`], [`gate`]), how a project
//! moves through its five delivery stages ([`lifecycle`]), and which files a
//! given actor may see ([`files`]). The crate performs no I/O of its own;
//! the identity provider and profile source are injected behind traits.

pub mod error;
pub mod files;
pub mod gate;
pub mod lifecycle;
pub mod profile;
pub mod roles;
pub mod session;
pub mod types;
