//! Tidewater Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! The console has write access to the catalog and no login of its own.
//! Bind it to a private interface only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
