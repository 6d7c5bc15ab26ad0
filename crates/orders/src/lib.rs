//! Tech Commerce order service library.
//!
//! This crate provides the order service as a library, allowing the router
//! to be driven in tests without a network listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
