//! `SaverSpot` web library.
//!
//! This crate provides the web server functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pocketbase;
pub mod pod;
pub mod routes;
pub mod services;
pub mod state;
