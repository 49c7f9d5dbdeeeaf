//! Kintree API server library.
//!
//! Exposes the building blocks (config, state, error handling, access
//! control, routes, storage) so integration tests and the binary
//! entrypoint can both access them.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod storage;
