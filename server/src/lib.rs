//! Mini social feed server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod accounts;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod posts;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod views;
