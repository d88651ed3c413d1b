//! Domain logic for note templates.
//!
//! Everything in this crate is free of I/O: positioning arithmetic, field
//! validation, and the visibility filter that consults an injected
//! [`access::PermissionOracle`]. The `ntpl-db` crate provides the Postgres
//! implementations of the collaborator traits.

pub mod access;
pub mod error;
pub mod note_template;
pub mod permissions;
pub mod positioning;
pub mod types;
