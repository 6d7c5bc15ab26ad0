//! Tech Commerce identity service library.
//!
//! Account registration, password sign-in and credential issuing. The CLI
//! reuses [`services::auth`] to seed admin accounts.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
