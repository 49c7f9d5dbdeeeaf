//! Domain logic for the kintree family-tree service.
//!
//! This crate has zero internal dependencies so the repository layer, the
//! HTTP API, and any future tooling can all share the same vocabulary:
//! the error taxonomy, the permission engine, the relationship-type rules,
//! the layout engine, invitation rules, and media validation.

pub mod error;
pub mod invitations;
pub mod layout;
pub mod media;
pub mod permissions;
pub mod relationships;
pub mod types;
